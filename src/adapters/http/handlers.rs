//! Route handlers for the relay.
//!
//! Each handler validates what it can, makes exactly one call against the
//! [`TodoStore`], and wraps the result:
//!
//! - reads return the upstream list as-is;
//! - mutations return a [`TodoEnvelope`];
//! - validation failures are 400, every upstream failure is 500.

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};
use std::sync::Arc;

use super::error::ApiError;
use crate::adapters::api::TodoBody;
use crate::domain::{validate_todo_text, Priority, Todo, TodoId};
use crate::ports::{TodoEnvelope, TodoStore};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn TodoStore>,
}

impl AppState {
    pub fn new(store: Arc<dyn TodoStore>) -> Self {
        Self { store }
    }
}

pub async fn index() -> &'static str {
    "todo-relay is running. Use the /api/todos routes or run `todo-relay tui`."
}

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

pub async fn list_todos(State(state): State<AppState>) -> Result<Json<Vec<Todo>>, ApiError> {
    let todos = state
        .store
        .list_todos()
        .await
        .map_err(|e| ApiError::upstream("Failed to fetch To-Dos", e))?;

    Ok(Json(todos))
}

pub async fn create_todo(
    State(state): State<AppState>,
    body: Result<Json<TodoBody>, JsonRejection>,
) -> Result<(StatusCode, Json<TodoEnvelope>), ApiError> {
    let Json(body) = body?;
    let (text, priority) = validate_body(&body)?;

    let created = state
        .store
        .create_todo(&text, priority)
        .await
        .map_err(|e| ApiError::upstream("Failed to create To-Do", e))?;

    tracing::info!("Created To-Do {}", created.id);

    Ok((
        StatusCode::CREATED,
        Json(TodoEnvelope {
            success: true,
            message: "To-Do created successfully".to_string(),
            todo: created,
        }),
    ))
}

pub async fn update_todo(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
    body: Result<Json<TodoBody>, JsonRejection>,
) -> Result<Json<TodoEnvelope>, ApiError> {
    let Path(id) = id?;
    let Json(body) = body?;
    let (text, priority) = validate_body(&body)?;

    let updated = state
        .store
        .update_todo(TodoId(id), &text, priority)
        .await
        .map_err(|e| ApiError::upstream("Failed to update To-Do", e))?;

    Ok(Json(TodoEnvelope {
        success: true,
        message: "To-Do updated successfully".to_string(),
        todo: updated,
    }))
}

pub async fn delete_todo(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<TodoEnvelope>, ApiError> {
    let Path(id) = id?;

    let deleted = state
        .store
        .delete_todo(TodoId(id))
        .await
        .map_err(|e| ApiError::upstream("Failed to delete To-Do", e))?;

    Ok(Json(TodoEnvelope {
        success: true,
        message: "To-Do deleted successfully".to_string(),
        todo: deleted,
    }))
}

/// Shared by create and update: trimmed text in bounds, priority defaulting to low.
fn validate_body(body: &TodoBody) -> Result<(String, Priority), ApiError> {
    let text = validate_todo_text(&body.todo)?;

    let priority = match body.priority.as_deref().map(str::trim) {
        None | Some("") => Priority::Low,
        Some(raw) => raw.parse()?,
    };

    Ok((text, priority))
}
