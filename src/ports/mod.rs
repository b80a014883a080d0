pub mod config_store;
pub mod todo_api;
pub mod todo_store;

pub use config_store::*;
pub use todo_api::*;
pub use todo_store::*;
