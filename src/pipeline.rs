pub mod layout;
pub mod processor;
pub mod terrain;
