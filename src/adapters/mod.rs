pub mod api;
pub mod config;
pub mod edge;
pub mod http;
pub mod tui;
