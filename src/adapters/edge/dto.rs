use serde::Serialize;

use crate::domain::{Priority, TodoId};

// Body sent to the Edge Function. The row id travels in the body, not the path.
#[derive(Debug, Serialize)]
pub struct StoreRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<TodoId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub todo: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
}
