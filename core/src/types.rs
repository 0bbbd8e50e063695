//! Client-side DTOs for the todo API.
//!
//! # Design
//! These mirror the server's schema but are defined independently so the
//! client does not link axum. The integration test catches schema drift.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// A single todo item returned by the API.
///
/// `text` falls back to empty when the server omits it or sends `null`,
/// which is what the list filter treats a missing text as.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    pub id: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub text: String,
    #[serde(default)]
    pub is_completed: bool,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

fn null_as_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Request payload for creating a new todo.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTodo {
    pub text: String,
    #[serde(default)]
    pub is_completed: bool,
}

/// Request payload for a full update. Only the fields present in the JSON
/// are applied; omitted fields remain unchanged on the server.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTodo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_completed: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetCompleted {
    pub is_completed: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetText {
    pub text: String,
}

/// Delete response: the removed id and what is left, newest first.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct Deleted {
    pub deleted: String,
    pub todos: Vec<Todo>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TodoEnvelope {
    pub todo: Todo,
}

#[derive(Debug, Deserialize)]
pub(crate) struct UpdatedEnvelope {
    pub updated: Todo,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ErrorEnvelope {
    pub error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ErrorDetail {
    pub kind: String,
    pub message: String,
}
