//! REST service owning a single collection of todos.
//!
//! # Overview
//! Create, list, fetch, replace, delete, and two single-field updates
//! (`check`, `text`) over one resource, mounted under a configurable base
//! path (default `/todos`).
//!
//! # Design
//! - `TodoService` holds the rules and is handed its store and id format
//!   explicitly; there is no global connection.
//! - `TodoStore` is the persistence port: `MemoryStore` for tests and
//!   ephemeral runs, `FileStore` for a JSON snapshot on disk.
//! - Every failure leaves as `TodoError`, rendered as
//!   `{"error": {"kind", "message"}}`.

pub mod config;
pub mod error;
pub mod id;
pub mod logging;
pub mod model;
pub mod routes;
pub mod service;
pub mod store;

use std::future::Future;
use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub use config::{AppConfig, ServerConfig};
pub use error::TodoError;
pub use id::{IdentifierValidator, ObjectIdFormat, TodoId};
pub use model::{NewTodo, Todo, TodoPatch};
pub use routes::AppState;
pub use service::{Deleted, TodoService};
pub use store::{DuplicateId, FileStore, MemoryStore, TodoStore};

/// Router with default server settings.
pub fn app(service: TodoService) -> Router {
    build_app(service, &ServerConfig::default())
}

pub fn build_app(service: TodoService, server: &ServerConfig) -> Router {
    let router =
        routes::router(AppState::new(service), &server.base_path).layer(TraceLayer::new_for_http());
    if server.cors {
        router.layer(CorsLayer::permissive())
    } else {
        router
    }
}

/// Build the service for `config`: snapshot-backed when a storage path is set.
pub async fn service_from_config(config: &AppConfig) -> anyhow::Result<TodoService> {
    let store: Arc<dyn TodoStore> = match &config.storage.path {
        Some(path) => Arc::new(FileStore::open(path).await?),
        None => Arc::new(MemoryStore::new()),
    };
    Ok(TodoService::new(store, Arc::new(ObjectIdFormat)))
}

pub async fn run(listener: TcpListener, service: TodoService) -> Result<(), std::io::Error> {
    axum::serve(listener, app(service)).await
}

/// Serve `router` until `shutdown` resolves, letting in-flight requests finish.
pub async fn serve(
    listener: TcpListener,
    router: Router,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<(), std::io::Error> {
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown)
        .await
}
