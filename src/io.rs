pub mod config;
pub mod obj_loader;
pub mod report;
