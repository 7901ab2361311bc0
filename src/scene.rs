pub mod draped_line;
pub mod loader;
pub mod mesh;
