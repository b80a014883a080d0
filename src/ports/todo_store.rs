use async_trait::async_trait;
use thiserror::Error;

use crate::domain::{Priority, Todo, TodoId};

#[derive(Error, Debug)]
pub enum RepositoryError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Rate limited: retry after {0} seconds")]
    RateLimit(u64),

    #[error("API error: {0}")]
    Api(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// The external task store the proxy relays to. It owns ids and persistence.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TodoStore: Send + Sync {
    async fn list_todos(&self) -> RepositoryResult<Vec<Todo>>;
    async fn create_todo(&self, todo: &str, priority: Priority) -> RepositoryResult<Todo>;
    async fn update_todo(
        &self,
        id: TodoId,
        todo: &str,
        priority: Priority,
    ) -> RepositoryResult<Todo>;
    async fn delete_todo(&self, id: TodoId) -> RepositoryResult<Todo>;
}
