pub mod error;
pub mod todo_sync;

pub use error::*;
pub use todo_sync::*;
