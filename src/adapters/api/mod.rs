pub mod client;
pub mod dto;

pub use client::*;
pub use dto::*;
