pub mod error;
pub mod priority;
pub mod todo;

pub use error::*;
pub use priority::*;
pub use todo::*;
