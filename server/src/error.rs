//! Failure taxonomy for todo operations and its HTTP rendering.
//!
//! Every failure leaves the service as a `TodoError` and reaches the client
//! as `{"error": {"kind": ..., "message": ...}}` with a matching status code.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TodoError {
    #[error("invalid identifier: '{id}'")]
    InvalidIdentifier { id: String },

    #[error("todo not found: {id}")]
    NotFound { id: String },

    #[error("{field}: {message}")]
    Validation { field: String, message: String },

    #[error("persistence failure: {message}")]
    Persistence { message: String },
}

impl TodoError {
    pub fn invalid_identifier(id: impl Into<String>) -> Self {
        Self::InvalidIdentifier { id: id.into() }
    }

    pub fn not_found(id: impl Into<String>) -> Self {
        Self::NotFound { id: id.into() }
    }

    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Store failures carry the full `anyhow` chain for the log.
    pub fn persistence(err: anyhow::Error) -> Self {
        Self::Persistence {
            message: format!("{err:#}"),
        }
    }

    /// Machine-readable kind reported to clients.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidIdentifier { .. } => "invalid_identifier",
            Self::NotFound { .. } => "not_found",
            Self::Validation { .. } => "validation_error",
            Self::Persistence { .. } => "persistence_error",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::InvalidIdentifier { .. } | Self::Validation { .. } => StatusCode::BAD_REQUEST,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::Persistence { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<JsonRejection> for TodoError {
    fn from(rejection: JsonRejection) -> Self {
        Self::validation("body", rejection.body_text())
    }
}

impl IntoResponse for TodoError {
    fn into_response(self) -> Response {
        let message = match &self {
            Self::Persistence { .. } => {
                // Internal details stay in the log
                tracing::error!(error = %self, "store operation failed");
                "an internal storage error occurred".to_string()
            }
            other => {
                tracing::debug!(error = %other, kind = other.kind(), "request rejected");
                other.to_string()
            }
        };
        let body = json!({ "error": { "kind": self.kind(), "message": message } });
        (self.status(), Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_map_to_conventional_statuses() {
        assert_eq!(
            TodoError::invalid_identifier("x").status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(TodoError::not_found("x").status(), StatusCode::NOT_FOUND);
        assert_eq!(
            TodoError::validation("text", "required").status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            TodoError::persistence(anyhow::anyhow!("disk full")).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn validation_message_names_the_field() {
        let err = TodoError::validation("isCompleted", "must be a boolean");
        assert_eq!(err.to_string(), "isCompleted: must be a boolean");
        assert_eq!(err.kind(), "validation_error");
    }

    #[test]
    fn persistence_keeps_context_chain() {
        let err = anyhow::anyhow!("permission denied").context("writing snapshot");
        let err = TodoError::persistence(err);
        assert_eq!(
            err.to_string(),
            "persistence failure: writing snapshot: permission denied"
        );
    }
}
