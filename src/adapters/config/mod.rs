pub mod env_config;
pub mod file_store;

pub use env_config::*;
pub use file_store::*;
