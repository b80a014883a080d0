use chrono::{DateTime, Utc};
use std::sync::Arc;

use crate::domain::{validate_todo_text, Priority, PriorityFilter, Todo, TodoId};
use crate::ports::TodoApi;

/// Client-side owner of the task list.
///
/// The list is never patched locally. Every acknowledged mutation is followed by a full
/// refresh, so `tasks` is always a snapshot the server has handed out.
pub struct TodoSync {
    api: Arc<dyn TodoApi>,
    tasks: Vec<Todo>,
    loading: bool,
    error: Option<String>,
    last_synced: Option<DateTime<Utc>>,
}

impl TodoSync {
    pub fn new(api: Arc<dyn TodoApi>) -> Self {
        Self {
            api,
            tasks: Vec::new(),
            loading: true,
            error: None,
            last_synced: None,
        }
    }

    pub async fn initialize(&mut self) {
        self.refresh().await;
    }

    pub fn tasks(&self) -> &[Todo] {
        &self.tasks
    }

    pub fn visible(&self, filter: PriorityFilter) -> Vec<&Todo> {
        self.tasks().iter().filter(|t| t.matches(filter)).collect()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn last_synced(&self) -> Option<DateTime<Utc>> {
        self.last_synced
    }

    pub async fn refresh(&mut self) {
        self.loading = true;

        match self.api.fetch_todos().await {
            Ok(tasks) => {
                tracing::debug!("Fetched {} To-Dos", tasks.len());
                self.tasks = tasks;
                self.error = None;
                self.last_synced = Some(Utc::now());
            }
            Err(e) => {
                tracing::error!("Error fetching To-Dos: {}", e);
                self.tasks.clear();
                self.error = Some(e.to_string());
            }
        }

        self.loading = false;
    }

    /// Returns whether the server acknowledged the new task.
    pub async fn create(&mut self, text: &str, priority: Priority) -> bool {
        let todo = match validate_todo_text(text) {
            Ok(todo) => todo,
            Err(e) => {
                self.error = Some(e.to_string());
                return false;
            }
        };

        match self.api.create_todo(&todo, priority).await {
            Ok(envelope) if envelope.success => {
                tracing::info!("Created To-Do {}", envelope.todo.id);
                self.refresh().await;
                true
            }
            Ok(envelope) => {
                tracing::warn!("Create not acknowledged: {}", envelope.message);
                false
            }
            Err(e) => {
                tracing::error!("Error adding To-Do: {}", e);
                false
            }
        }
    }

    /// Returns whether the server acknowledged the edit.
    pub async fn update(&mut self, id: TodoId, text: &str, priority: Priority) -> bool {
        let todo = match validate_todo_text(text) {
            Ok(todo) => todo,
            Err(e) => {
                self.error = Some(e.to_string());
                return false;
            }
        };

        match self.api.update_todo(id, &todo, priority).await {
            Ok(envelope) if envelope.success => {
                tracing::info!("Updated To-Do {}", id);
                self.refresh().await;
                true
            }
            Ok(envelope) => {
                tracing::warn!("Update of {} not acknowledged: {}", id, envelope.message);
                false
            }
            Err(e) => {
                tracing::error!("Error updating To-Do {}: {}", id, e);
                false
            }
        }
    }

    /// Returns whether the server acknowledged the removal.
    pub async fn delete(&mut self, id: TodoId) -> bool {
        match self.api.delete_todo(id).await {
            Ok(envelope) if envelope.success => {
                tracing::info!("Deleted To-Do {}", id);
                self.refresh().await;
                true
            }
            Ok(envelope) => {
                tracing::warn!("Delete of {} not acknowledged: {}", id, envelope.message);
                false
            }
            Err(e) => {
                tracing::error!("Error deleting To-Do {}: {}", id, e);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::{MockTodoApi, RepositoryError, TodoEnvelope};
    use mockall::predicate::eq;
    use mockall::Sequence;

    fn todo(id: i64, text: &str, priority: Priority) -> Todo {
        Todo {
            id: TodoId(id),
            todo: text.to_string(),
            priority,
        }
    }

    fn envelope(todo: Todo) -> TodoEnvelope {
        TodoEnvelope {
            success: true,
            message: "ok".to_string(),
            todo,
        }
    }

    fn two_tasks() -> Vec<Todo> {
        vec![
            todo(1, "Test todo 1", Priority::Low),
            todo(2, "Test todo 2", Priority::Medium),
        ]
    }

    #[tokio::test]
    async fn test_new_sync_starts_loading_and_empty() {
        let sync = TodoSync::new(Arc::new(MockTodoApi::new()));
        assert!(sync.is_loading());
        assert!(sync.tasks().is_empty());
        assert_eq!(sync.error(), None);
        assert_eq!(sync.last_synced(), None);
    }

    #[tokio::test]
    async fn test_initialize_replaces_tasks() {
        let mut api = MockTodoApi::new();
        api.expect_fetch_todos().times(1).returning(|| Ok(two_tasks()));

        let mut sync = TodoSync::new(Arc::new(api));
        sync.initialize().await;

        assert_eq!(sync.tasks(), two_tasks().as_slice());
        assert!(!sync.is_loading());
        assert_eq!(sync.error(), None);
        assert!(sync.last_synced().is_some());
    }

    #[tokio::test]
    async fn test_refresh_failure_clears_list_and_sets_error() {
        let mut seq = Sequence::new();
        let mut api = MockTodoApi::new();
        api.expect_fetch_todos()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|| Ok(two_tasks()));
        api.expect_fetch_todos()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|| {
                Err(RepositoryError::Api(
                    "HTTP 503 Service Unavailable: upstream down".to_string(),
                ))
            });

        let mut sync = TodoSync::new(Arc::new(api));
        sync.refresh().await;
        assert_eq!(sync.tasks().len(), 2);

        sync.refresh().await;
        assert!(sync.tasks().is_empty());
        assert!(!sync.is_loading());
        let error = sync.error().expect("error should be set");
        assert!(!error.is_empty());
        assert!(error.contains("503"));
    }

    #[tokio::test]
    async fn test_create_rejects_invalid_text_without_network() {
        let mut api = MockTodoApi::new();
        api.expect_fetch_todos().times(1).returning(|| Ok(two_tasks()));
        api.expect_create_todo().never();

        let mut sync = TodoSync::new(Arc::new(api));
        sync.initialize().await;

        let too_long = "x".repeat(101);
        for text in ["", "   ", "ab", "  ab ", too_long.as_str()] {
            assert!(!sync.create(text, Priority::High).await);
            assert_eq!(sync.tasks(), two_tasks().as_slice());
            assert!(sync.error().is_some());
        }
    }

    #[tokio::test]
    async fn test_create_posts_once_then_refreshes_once() {
        let mut seq = Sequence::new();
        let mut api = MockTodoApi::new();
        api.expect_create_todo()
            .withf(|text, priority| text == "Buy milk" && *priority == Priority::High)
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(envelope(todo(3, "Buy milk", Priority::High))));
        api.expect_fetch_todos()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|| {
                let mut tasks = two_tasks();
                tasks.push(todo(3, "Buy milk", Priority::High));
                Ok(tasks)
            });

        let mut sync = TodoSync::new(Arc::new(api));
        assert!(sync.create("Buy milk", Priority::High).await);

        assert!(sync
            .tasks()
            .iter()
            .any(|t| t.todo == "Buy milk" && t.priority == Priority::High));
        assert_eq!(sync.error(), None);
    }

    #[tokio::test]
    async fn test_create_sends_trimmed_text() {
        let mut api = MockTodoApi::new();
        api.expect_create_todo()
            .withf(|text, _| text == "Water plants")
            .times(1)
            .returning(|_, _| Ok(envelope(todo(9, "Water plants", Priority::Low))));
        api.expect_fetch_todos().times(1).returning(|| Ok(vec![]));

        let mut sync = TodoSync::new(Arc::new(api));
        assert!(sync.create("  Water plants  ", Priority::Low).await);
    }

    #[tokio::test]
    async fn test_create_failure_is_logged_not_surfaced() {
        let mut api = MockTodoApi::new();
        api.expect_fetch_todos().times(1).returning(|| Ok(two_tasks()));
        api.expect_create_todo()
            .times(1)
            .returning(|_, _| Err(RepositoryError::Network("connection refused".to_string())));

        let mut sync = TodoSync::new(Arc::new(api));
        sync.initialize().await;

        assert!(!sync.create("Buy milk", Priority::Low).await);
        assert_eq!(sync.error(), None);
        assert_eq!(sync.tasks(), two_tasks().as_slice());
    }

    #[tokio::test]
    async fn test_create_unacknowledged_skips_refresh() {
        let mut api = MockTodoApi::new();
        api.expect_create_todo().times(1).returning(|_, _| {
            Ok(TodoEnvelope {
                success: false,
                message: "rejected".to_string(),
                todo: todo(3, "Buy milk", Priority::Low),
            })
        });
        api.expect_fetch_todos().never();

        let mut sync = TodoSync::new(Arc::new(api));
        assert!(!sync.create("Buy milk", Priority::Low).await);
    }

    #[tokio::test]
    async fn test_update_success_refreshes() {
        let mut seq = Sequence::new();
        let mut api = MockTodoApi::new();
        api.expect_update_todo()
            .withf(|id, text, priority| {
                *id == TodoId(2) && text == "Edited" && *priority == Priority::High
            })
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _, _| Ok(envelope(todo(2, "Edited", Priority::High))));
        api.expect_fetch_todos()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|| {
                Ok(vec![
                    todo(1, "Test todo 1", Priority::Low),
                    todo(2, "Edited", Priority::High),
                ])
            });

        let mut sync = TodoSync::new(Arc::new(api));
        assert!(sync.update(TodoId(2), "Edited", Priority::High).await);
        assert_eq!(sync.tasks()[1].todo, "Edited");
    }

    #[tokio::test]
    async fn test_update_rejects_invalid_text_without_network() {
        let mut api = MockTodoApi::new();
        api.expect_update_todo().never();

        let mut sync = TodoSync::new(Arc::new(api));
        assert!(!sync.update(TodoId(1), "  ", Priority::Low).await);
        assert!(!sync.update(TodoId(1), "no", Priority::Low).await);
        assert!(sync.error().is_some());
    }

    #[tokio::test]
    async fn test_update_failure_is_logged_only() {
        let mut api = MockTodoApi::new();
        api.expect_update_todo()
            .times(1)
            .returning(|_, _, _| Err(RepositoryError::Api("HTTP 500: boom".to_string())));
        api.expect_fetch_todos().never();

        let mut sync = TodoSync::new(Arc::new(api));
        assert!(!sync.update(TodoId(1), "Valid text", Priority::Low).await);
        assert_eq!(sync.error(), None);
    }

    #[tokio::test]
    async fn test_delete_calls_once_with_id() {
        let mut seq = Sequence::new();
        let mut api = MockTodoApi::new();
        api.expect_fetch_todos()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|| Ok(two_tasks()));
        api.expect_delete_todo()
            .with(eq(TodoId(1)))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(envelope(todo(1, "Test todo 1", Priority::Low))));
        api.expect_fetch_todos()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|| Ok(vec![todo(2, "Test todo 2", Priority::Medium)]));

        let mut sync = TodoSync::new(Arc::new(api));
        sync.initialize().await;
        assert!(sync.delete(TodoId(1)).await);

        assert_eq!(sync.tasks().len(), 1);
        assert_eq!(sync.tasks()[0].todo, "Test todo 2");
    }

    #[tokio::test]
    async fn test_failed_delete_leaves_list_untouched() {
        let mut api = MockTodoApi::new();
        api.expect_fetch_todos().times(1).returning(|| Ok(two_tasks()));
        api.expect_delete_todo()
            .with(eq(TodoId(1)))
            .times(1)
            .returning(|_| Err(RepositoryError::NotFound("Resource not found".to_string())));

        let mut sync = TodoSync::new(Arc::new(api));
        sync.initialize().await;
        assert!(!sync.delete(TodoId(1)).await);

        assert_eq!(sync.tasks(), two_tasks().as_slice());
        assert_eq!(sync.error(), None);
    }

    #[tokio::test]
    async fn test_visible_applies_priority_filter() {
        let mut api = MockTodoApi::new();
        api.expect_fetch_todos().times(1).returning(|| {
            Ok(vec![
                todo(1, "a low one", Priority::Low),
                todo(2, "a high one", Priority::High),
                todo(3, "another low", Priority::Low),
            ])
        });

        let mut sync = TodoSync::new(Arc::new(api));
        sync.initialize().await;

        assert_eq!(sync.visible(PriorityFilter::All).len(), 3);

        for priority in [Priority::Low, Priority::Medium, Priority::High] {
            let visible = sync.visible(PriorityFilter::Only(priority));
            let expected: Vec<&Todo> = sync
                .tasks()
                .iter()
                .filter(|t| t.priority == priority)
                .collect();
            assert_eq!(visible, expected);
        }
        assert!(sync.visible(PriorityFilter::Only(Priority::Medium)).is_empty());
    }
}
