use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;

use super::dto::StoreRequest;
use crate::adapters::config::ProxyConfig;
use crate::domain::{Priority, Todo, TodoId};
use crate::ports::{RepositoryError, RepositoryResult, TodoStore};

/// Talks to the Supabase Edge Function that owns the list.
pub struct EdgeFunctionClient {
    client: Client,
    endpoint: String,
    api_key: String,
}

impl EdgeFunctionClient {
    pub fn new(config: &ProxyConfig) -> RepositoryResult<Self> {
        Self::with_endpoint(config.function_url(), config.api_key.clone())
    }

    pub fn with_endpoint(endpoint: String, api_key: String) -> RepositoryResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(concat!("todo-relay/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| RepositoryError::Network(e.to_string()))?;

        Ok(Self {
            client,
            endpoint,
            api_key,
        })
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> RepositoryResult<T> {
        let response = request
            .bearer_auth(&self.api_key)
            .send()
            .await
            .map_err(|e| RepositoryError::Network(e.to_string()))?;

        self.handle_response(response).await
    }

    async fn handle_response<T: DeserializeOwned>(&self, response: Response) -> RepositoryResult<T> {
        let status = response.status();

        match status.as_u16() {
            200..=299 => {
                let response_text = response
                    .text()
                    .await
                    .map_err(|e| RepositoryError::Network(e.to_string()))?;

                tracing::debug!("Edge function response: {}", response_text);

                serde_json::from_str(&response_text).map_err(|e| {
                    RepositoryError::Serialization(format!(
                        "Failed to parse response: {}. Response was: {}",
                        e, response_text
                    ))
                })
            }
            401 => Err(RepositoryError::Authentication(
                "Edge function rejected the API key".to_string(),
            )),
            404 => Err(RepositoryError::NotFound("Resource not found".to_string())),
            429 => {
                let retry_after = response
                    .headers()
                    .get("retry-after")
                    .and_then(|v| v.to_str().ok())
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(60);
                Err(RepositoryError::RateLimit(retry_after))
            }
            _ => {
                let error_text = response
                    .text()
                    .await
                    .unwrap_or_else(|_| "Unknown error".to_string());
                Err(RepositoryError::Api(format!(
                    "Edge function error: {}: {}",
                    status, error_text
                )))
            }
        }
    }
}

#[async_trait]
impl TodoStore for EdgeFunctionClient {
    async fn list_todos(&self) -> RepositoryResult<Vec<Todo>> {
        self.send(self.client.get(&self.endpoint)).await
    }

    async fn create_todo(&self, todo: &str, priority: Priority) -> RepositoryResult<Todo> {
        let body = StoreRequest {
            id: None,
            todo: Some(todo),
            priority: Some(priority),
        };
        self.send(self.client.post(&self.endpoint).json(&body)).await
    }

    async fn update_todo(
        &self,
        id: TodoId,
        todo: &str,
        priority: Priority,
    ) -> RepositoryResult<Todo> {
        let body = StoreRequest {
            id: Some(id),
            todo: Some(todo),
            priority: Some(priority),
        };
        self.send(self.client.put(&self.endpoint).json(&body)).await
    }

    async fn delete_todo(&self, id: TodoId) -> RepositoryResult<Todo> {
        let body = StoreRequest {
            id: Some(id),
            todo: None,
            priority: None,
        };
        self.send(self.client.delete(&self.endpoint).json(&body)).await
    }
}
