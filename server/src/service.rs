//! Todo operations: validation, id checks, ordering and store calls.
//!
//! # Design
//! `TodoService` depends only on the `TodoStore` and `IdentifierValidator`
//! ports, both injected through the constructor. Ids are checked before the
//! store is consulted. The full update and both single-field updates funnel
//! through `apply_patch`, so they share one not-found and persistence path
//! and differ only in which field validators build the patch.

use std::cmp::Reverse;
use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use crate::error::TodoError;
use crate::id::{IdentifierValidator, ObjectIdFormat, TodoId};
use crate::model::{validate_completed, validate_text, NewTodo, Todo, TodoPatch};
use crate::store::{DuplicateId, MemoryStore, TodoStore};

/// Fresh ids tried before a create gives up on collisions.
const CREATE_ATTEMPTS: usize = 3;

/// Result of a delete: the removed id plus the remaining collection, newest first.
#[derive(Debug, Clone, Serialize)]
pub struct Deleted {
    pub deleted: TodoId,
    pub todos: Vec<Todo>,
}

#[derive(Clone)]
pub struct TodoService {
    store: Arc<dyn TodoStore>,
    ids: Arc<dyn IdentifierValidator>,
}

impl TodoService {
    pub fn new(store: Arc<dyn TodoStore>, ids: Arc<dyn IdentifierValidator>) -> Self {
        Self { store, ids }
    }

    /// Memory-only service with document-store ids.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()), Arc::new(ObjectIdFormat))
    }

    /// An id collision is retried with a fresh id; persistent collisions
    /// surface as a persistence error.
    #[instrument(name = "todos.service.create", skip_all)]
    pub async fn create(&self, payload: &Value) -> Result<Todo, TodoError> {
        let input = NewTodo::from_payload(payload)?;
        let mut attempt = 1;
        loop {
            let todo = Todo::new(self.ids.generate(), input.clone(), Utc::now());
            match self.store.insert(todo.clone()).await {
                Ok(()) => {
                    info!(todo_id = %todo.id, "todo created");
                    return Ok(todo);
                }
                Err(e) if e.is::<DuplicateId>() && attempt < CREATE_ATTEMPTS => {
                    warn!(todo_id = %todo.id, attempt, "generated id already in use");
                    attempt += 1;
                }
                Err(e) => return Err(TodoError::persistence(e)),
            }
        }
    }

    /// Every todo, most recently created first.
    #[instrument(name = "todos.service.list", skip_all)]
    pub async fn list(&self) -> Result<Vec<Todo>, TodoError> {
        let mut todos = self.store.list().await.map_err(TodoError::persistence)?;
        todos.sort_by_key(|t| Reverse((t.created_at, t.id.clone())));
        debug!(count = todos.len(), "todos listed");
        Ok(todos)
    }

    #[instrument(name = "todos.service.get", skip(self))]
    pub async fn get(&self, id: &str) -> Result<Todo, TodoError> {
        let id = self.parse_id(id)?;
        self.store
            .find_by_id(&id)
            .await
            .map_err(TodoError::persistence)?
            .ok_or_else(|| TodoError::not_found(id.as_str()))
    }

    /// Applies every mutable field present in `payload`.
    #[instrument(name = "todos.service.update", skip(self, payload))]
    pub async fn update(&self, id: &str, payload: &Value) -> Result<Todo, TodoError> {
        let id = self.parse_id(id)?;
        let patch = TodoPatch::from_payload(payload)?;
        self.apply_patch(&id, patch).await
    }

    /// The remaining list is read after the delete commits. If that read
    /// fails the caller gets a persistence error although the record is
    /// already gone; a retried delete then reports not-found.
    #[instrument(name = "todos.service.delete", skip(self))]
    pub async fn delete(&self, id: &str) -> Result<Deleted, TodoError> {
        let id = self.parse_id(id)?;
        let removed = self
            .store
            .delete(&id)
            .await
            .map_err(TodoError::persistence)?;
        if !removed {
            return Err(TodoError::not_found(id.as_str()));
        }
        info!(todo_id = %id, "todo deleted");

        let todos = self.list().await?;
        Ok(Deleted { deleted: id, todos })
    }

    #[instrument(name = "todos.service.set_completed", skip(self, value))]
    pub async fn set_completed(&self, id: &str, value: &Value) -> Result<Todo, TodoError> {
        let id = self.parse_id(id)?;
        let patch = TodoPatch::completed(validate_completed(value)?);
        self.apply_patch(&id, patch).await
    }

    #[instrument(name = "todos.service.set_text", skip(self, value))]
    pub async fn set_text(&self, id: &str, value: &Value) -> Result<Todo, TodoError> {
        let id = self.parse_id(id)?;
        let patch = TodoPatch::text(validate_text(value)?);
        self.apply_patch(&id, patch).await
    }

    fn parse_id(&self, raw: &str) -> Result<TodoId, TodoError> {
        self.ids
            .validate(raw)
            .ok_or_else(|| TodoError::invalid_identifier(raw))
    }

    async fn apply_patch(&self, id: &TodoId, patch: TodoPatch) -> Result<Todo, TodoError> {
        let updated = self
            .store
            .update(id, &patch, Utc::now())
            .await
            .map_err(TodoError::persistence)?
            .ok_or_else(|| TodoError::not_found(id.as_str()))?;
        info!(todo_id = %id, "todo updated");
        Ok(updated)
    }
}
