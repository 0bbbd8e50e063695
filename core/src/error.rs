//! Error types for the todo API client.
//!
//! # Design
//! The server reports failures as `{"error": {"kind", "message"}}`. Kinds the
//! caller usually branches on get their own variant; any other structured
//! error lands in `Server`, and bodies that are not in that shape land in
//! `HttpError` with the raw status and body.

use thiserror::Error;

/// Errors returned by `TodoClient` build and parse methods.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The requested todo does not exist.
    #[error("resource not found")]
    NotFound,

    /// The server refused the id as malformed.
    #[error("invalid identifier: {0}")]
    InvalidIdentifier(String),

    /// A field in the payload broke a validation rule.
    #[error("validation failed: {0}")]
    Validation(String),

    /// Any other structured error from the server.
    #[error("HTTP {status} ({kind}): {message}")]
    Server {
        status: u16,
        kind: String,
        message: String,
    },

    /// A non-success status without a structured error body.
    #[error("HTTP {status}: {body}")]
    HttpError { status: u16, body: String },

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    DeserializationError(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    SerializationError(String),
}
