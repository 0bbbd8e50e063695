//! HTTP surface of the todo collection.
//!
//! Handlers only unwrap the request and pick the response envelope; all
//! rules live in `TodoService`. Body rejections from axum are converted into
//! `TodoError::Validation` so that every failure has the same JSON shape.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    routing::{get, patch},
    Json, Router,
};
use serde::Serialize;
use serde_json::Value;
use tracing::info;

use crate::error::TodoError;
use crate::model::{Todo, COMPLETED_FIELD, TEXT_FIELD};
use crate::service::{Deleted, TodoService};

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<TodoService>,
}

impl AppState {
    pub fn new(service: TodoService) -> Self {
        Self {
            service: Arc::new(service),
        }
    }
}

#[derive(Serialize)]
struct TodoEnvelope {
    message: &'static str,
    todo: Todo,
}

#[derive(Serialize)]
struct UpdatedEnvelope {
    message: &'static str,
    updated: Todo,
}

#[derive(Serialize)]
struct DeletedEnvelope {
    message: &'static str,
    #[serde(flatten)]
    result: Deleted,
}

type JsonBody = Result<Json<Value>, JsonRejection>;

/// Mounts the collection at `base_path` (`""` or `"/"` mounts at the root).
pub fn router(state: AppState, base_path: &str) -> Router {
    let todos = Router::new()
        .route("/", get(list_todos).post(create_todo))
        .route("/{id}", get(get_todo).put(update_todo).delete(delete_todo))
        .route("/{id}/check", patch(set_completed))
        .route("/{id}/text", patch(set_text));

    let base = base_path.trim_end_matches('/');
    let routes = if base.is_empty() {
        todos
    } else {
        Router::new().nest(base, todos)
    };
    routes.with_state(state)
}

async fn list_todos(State(state): State<AppState>) -> Result<Json<Vec<Todo>>, TodoError> {
    Ok(Json(state.service.list().await?))
}

async fn create_todo(
    State(state): State<AppState>,
    body: JsonBody,
) -> Result<(StatusCode, Json<Todo>), TodoError> {
    let Json(payload) = body?;
    let todo = state.service.create(&payload).await?;
    Ok((StatusCode::CREATED, Json(todo)))
}

async fn get_todo(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<TodoEnvelope>, TodoError> {
    let todo = state.service.get(&id).await?;
    Ok(Json(TodoEnvelope {
        message: "todo fetched",
        todo,
    }))
}

async fn update_todo(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: JsonBody,
) -> Result<Json<UpdatedEnvelope>, TodoError> {
    let Json(payload) = body?;
    let updated = state.service.update(&id, &payload).await?;
    Ok(Json(UpdatedEnvelope {
        message: "todo updated",
        updated,
    }))
}

async fn delete_todo(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DeletedEnvelope>, TodoError> {
    let result = state.service.delete(&id).await?;
    info!(remaining = result.todos.len(), "delete served");
    Ok(Json(DeletedEnvelope {
        message: "todo deleted",
        result,
    }))
}

async fn set_completed(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: JsonBody,
) -> Result<Json<TodoEnvelope>, TodoError> {
    let Json(payload) = body?;
    let todo = state
        .service
        .set_completed(&id, field(&payload, COMPLETED_FIELD))
        .await?;
    Ok(Json(TodoEnvelope {
        message: "todo updated",
        todo,
    }))
}

async fn set_text(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: JsonBody,
) -> Result<Json<TodoEnvelope>, TodoError> {
    let Json(payload) = body?;
    let todo = state
        .service
        .set_text(&id, field(&payload, TEXT_FIELD))
        .await?;
    Ok(Json(TodoEnvelope {
        message: "todo updated",
        todo,
    }))
}

/// A missing field reads as `null`, which every field validator rejects.
fn field<'a>(payload: &'a Value, name: &str) -> &'a Value {
    payload.get(name).unwrap_or(&Value::Null)
}
