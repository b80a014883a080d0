use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::RepositoryResult;
use crate::domain::{Priority, Todo, TodoId};

/// Response body for every successful mutation on the proxy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TodoEnvelope {
    pub success: bool,
    pub message: String,
    pub todo: Todo,
}

/// Response body for every failed request on the proxy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    pub message: String,
}

/// The proxy's `/api/todos` surface as seen by a client.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TodoApi: Send + Sync {
    async fn fetch_todos(&self) -> RepositoryResult<Vec<Todo>>;
    async fn create_todo(&self, todo: &str, priority: Priority) -> RepositoryResult<TodoEnvelope>;
    async fn update_todo(
        &self,
        id: TodoId,
        todo: &str,
        priority: Priority,
    ) -> RepositoryResult<TodoEnvelope>;
    async fn delete_todo(&self, id: TodoId) -> RepositoryResult<TodoEnvelope>;
}
