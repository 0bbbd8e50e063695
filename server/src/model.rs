//! The todo record and the field rules applied to incoming payloads.
//!
//! Payloads arrive as raw JSON so that type mistakes (a string where a
//! boolean belongs, a missing `text`) surface as `TodoError::Validation`
//! with a field name instead of a generic decoding failure.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::TodoError;
use crate::id::TodoId;

pub const TEXT_FIELD: &str = "text";
pub const COMPLETED_FIELD: &str = "isCompleted";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    pub id: TodoId,
    pub text: String,
    pub is_completed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Todo {
    pub fn new(id: TodoId, input: NewTodo, now: DateTime<Utc>) -> Self {
        Self {
            id,
            text: input.text,
            is_completed: input.is_completed,
            created_at: now,
            updated_at: now,
        }
    }

    /// Writes the fields present in `patch`; `id` and `created_at` never change.
    pub fn apply(&mut self, patch: &TodoPatch, now: DateTime<Utc>) {
        if let Some(text) = &patch.text {
            self.text = text.clone();
        }
        if let Some(is_completed) = patch.is_completed {
            self.is_completed = is_completed;
        }
        self.updated_at = now;
    }
}

/// Validated input for a new todo.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTodo {
    pub text: String,
    pub is_completed: bool,
}

impl NewTodo {
    /// `text` is required; `isCompleted` defaults to false.
    pub fn from_payload(payload: &Value) -> Result<Self, TodoError> {
        let fields = as_object(payload)?;
        let text = match fields.get(TEXT_FIELD) {
            Some(value) => validate_text(value)?,
            None => return Err(TodoError::validation(TEXT_FIELD, "is required")),
        };
        let is_completed = fields
            .get(COMPLETED_FIELD)
            .map(validate_completed)
            .transpose()?
            .unwrap_or(false);
        Ok(Self { text, is_completed })
    }
}

/// Validated field changes for an existing todo.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TodoPatch {
    pub text: Option<String>,
    pub is_completed: Option<bool>,
}

impl TodoPatch {
    pub fn text(text: String) -> Self {
        Self {
            text: Some(text),
            ..Self::default()
        }
    }

    pub fn completed(is_completed: bool) -> Self {
        Self {
            is_completed: Some(is_completed),
            ..Self::default()
        }
    }

    /// Any subset of the mutable fields. Immutable and unknown keys are
    /// dropped the way a strict document schema drops them.
    pub fn from_payload(payload: &Value) -> Result<Self, TodoError> {
        let fields = as_object(payload)?;
        Ok(Self {
            text: fields.get(TEXT_FIELD).map(validate_text).transpose()?,
            is_completed: fields
                .get(COMPLETED_FIELD)
                .map(validate_completed)
                .transpose()?,
        })
    }
}

/// Non-empty after trimming; the trimmed value is what gets stored.
pub fn validate_text(value: &Value) -> Result<String, TodoError> {
    let text = value
        .as_str()
        .ok_or_else(|| TodoError::validation(TEXT_FIELD, "must be a string"))?
        .trim();
    if text.is_empty() {
        return Err(TodoError::validation(TEXT_FIELD, "must not be empty"));
    }
    Ok(text.to_string())
}

/// Only a JSON boolean is accepted: no `"true"`, `1` or `null`.
pub fn validate_completed(value: &Value) -> Result<bool, TodoError> {
    value
        .as_bool()
        .ok_or_else(|| TodoError::validation(COMPLETED_FIELD, "must be a boolean"))
}

fn as_object(payload: &Value) -> Result<&Map<String, Value>, TodoError> {
    payload
        .as_object()
        .ok_or_else(|| TodoError::validation("body", "expected a JSON object"))
}
