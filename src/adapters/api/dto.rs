use serde::{Deserialize, Serialize};

use crate::domain::Priority;

// Body the client sends for POST and PUT on /api/todos
#[derive(Debug, Serialize)]
pub struct TodoRequest<'a> {
    pub todo: &'a str,
    pub priority: Priority,
}

// Body the proxy accepts. Priority stays a raw string until the handler normalizes it.
#[derive(Debug, Deserialize)]
pub struct TodoBody {
    pub todo: String,
    #[serde(default)]
    pub priority: Option<String>,
}
