//! Synchronous client core for the todo service.
//!
//! # Overview
//! Builds `HttpRequest` values and parses `HttpResponse` values without
//! touching the network (host-does-IO pattern), and provides the list view
//! model that filters todos by search text and wires item callbacks.
//!
//! # Design
//! - `TodoClient` is stateless; it holds only the service URL.
//! - Each operation is split into `build_*` (produces request) and
//!   `parse_*` (consumes response), so the I/O boundary is explicit.
//! - DTOs are defined independently from the server crate; integration
//!   tests catch schema drift.
//! - `TodoListView` never calls the server; mutations go through the
//!   caller's `TodoActions`.

pub mod client;
pub mod error;
pub mod http;
pub mod types;
pub mod view;

pub use client::TodoClient;
pub use error::ApiError;
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use types::{CreateTodo, Deleted, SetCompleted, SetText, Todo, UpdateTodo};
pub use view::{filter_todos, TodoActions, TodoItem, TodoListView};
