use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;

use super::dto::TodoRequest;
use crate::domain::{Priority, Todo, TodoId};
use crate::ports::{ErrorBody, RepositoryError, RepositoryResult, TodoApi, TodoEnvelope};

const TODOS_PATH: &str = "/api/todos";

/// HTTP client for the relay's own `/api/todos` routes.
pub struct ProxyClient {
    client: Client,
    base_url: String,
}

impl ProxyClient {
    pub fn new(base_url: &str) -> RepositoryResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(concat!("todo-relay/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| RepositoryError::Network(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn handle_response<T: DeserializeOwned>(&self, response: Response) -> RepositoryResult<T> {
        let status = response.status();
        let response_text = response
            .text()
            .await
            .map_err(|e| RepositoryError::Network(e.to_string()))?;

        if !status.is_success() {
            // Proxy failures carry {error, message}; anything else is reported raw.
            let detail = serde_json::from_str::<ErrorBody>(&response_text)
                .map(|body| format!("{}: {}", body.error, body.message))
                .unwrap_or(response_text);
            return Err(RepositoryError::Api(format!("HTTP error! Status: {status}: {detail}")));
        }

        tracing::debug!("Proxy response: {}", response_text);

        serde_json::from_str(&response_text).map_err(|e| {
            RepositoryError::Serialization(format!(
                "Failed to parse response: {}. Response was: {}",
                e, response_text
            ))
        })
    }
}

#[async_trait]
impl TodoApi for ProxyClient {
    async fn fetch_todos(&self) -> RepositoryResult<Vec<Todo>> {
        let response = self
            .client
            .get(self.url(TODOS_PATH))
            .send()
            .await
            .map_err(|e| RepositoryError::Network(e.to_string()))?;

        self.handle_response(response).await
    }

    async fn create_todo(&self, todo: &str, priority: Priority) -> RepositoryResult<TodoEnvelope> {
        let response = self
            .client
            .post(self.url(TODOS_PATH))
            .json(&TodoRequest { todo, priority })
            .send()
            .await
            .map_err(|e| RepositoryError::Network(e.to_string()))?;

        self.handle_response(response).await
    }

    async fn update_todo(
        &self,
        id: TodoId,
        todo: &str,
        priority: Priority,
    ) -> RepositoryResult<TodoEnvelope> {
        let response = self
            .client
            .put(self.url(&format!("{TODOS_PATH}/{id}")))
            .json(&TodoRequest { todo, priority })
            .send()
            .await
            .map_err(|e| RepositoryError::Network(e.to_string()))?;

        self.handle_response(response).await
    }

    async fn delete_todo(&self, id: TodoId) -> RepositoryResult<TodoEnvelope> {
        let response = self
            .client
            .delete(self.url(&format!("{TODOS_PATH}/{id}")))
            .send()
            .await
            .map_err(|e| RepositoryError::Network(e.to_string()))?;

        self.handle_response(response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::http::{handlers::AppState, router};
    use crate::ports::MockTodoStore;
    use std::sync::Arc;

    // Serves the real proxy router over a mocked store on an ephemeral port.
    async fn spawn_proxy(store: MockTodoStore) -> String {
        let app = router(AppState::new(Arc::new(store)));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    #[tokio::test]
    async fn test_fetch_todos_through_proxy() {
        let mut store = MockTodoStore::new();
        store.expect_list_todos().times(1).returning(|| {
            Ok(vec![Todo {
                id: TodoId(1),
                todo: "Test todo 1".to_string(),
                priority: Priority::Low,
            }])
        });

        let client = ProxyClient::new(&spawn_proxy(store).await).unwrap();
        let todos = client.fetch_todos().await.unwrap();

        assert_eq!(todos.len(), 1);
        assert_eq!(todos[0].todo, "Test todo 1");
    }

    #[tokio::test]
    async fn test_create_round_trip_through_proxy() {
        let mut store = MockTodoStore::new();
        store
            .expect_create_todo()
            .withf(|text, priority| text == "Buy milk" && *priority == Priority::High)
            .times(1)
            .returning(|text, priority| {
                Ok(Todo {
                    id: TodoId(5),
                    todo: text.to_string(),
                    priority,
                })
            });

        let client = ProxyClient::new(&spawn_proxy(store).await).unwrap();
        let envelope = client.create_todo("Buy milk", Priority::High).await.unwrap();

        assert!(envelope.success);
        assert_eq!(envelope.todo.id, TodoId(5));
        assert_eq!(envelope.todo.priority, Priority::High);
    }

    #[tokio::test]
    async fn test_upstream_failure_surfaces_status() {
        let mut store = MockTodoStore::new();
        store
            .expect_list_todos()
            .times(1)
            .returning(|| Err(RepositoryError::Api("HTTP 503: down".to_string())));

        let client = ProxyClient::new(&spawn_proxy(store).await).unwrap();
        let err = client.fetch_todos().await.unwrap_err();

        match err {
            RepositoryError::Api(message) => {
                assert!(message.contains("500"), "{message}");
                assert!(message.contains("Failed to fetch To-Dos"), "{message}");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_unreachable_proxy_is_network_error() {
        let client = ProxyClient::new("http://127.0.0.1:9").unwrap();
        let err = client.delete_todo(TodoId(1)).await.unwrap_err();
        assert!(matches!(err, RepositoryError::Network(_)));
    }
}
