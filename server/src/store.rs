//! Persistence port for todos and its two implementations.
//!
//! # Design
//! The service computes ids, timestamps and validation; a store only keeps
//! records. Each call touches at most one record and is atomic with respect
//! to it. Concurrent updates of the same record are last-write-wins. An insert
//! never replaces an existing record; an occupied id fails with `DuplicateId`.
//!
//! `MemoryStore` is the plain shared map. `FileStore` keeps the same map but
//! rewrites a JSON snapshot after every mutation while still holding the
//! write lock, and rolls the record back if the snapshot cannot be written.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::id::TodoId;
use crate::model::{Todo, TodoPatch};

/// Returned (inside `anyhow::Error`) when an insert hits an id already in use.
#[derive(Debug, thiserror::Error)]
#[error("duplicate id: {0}")]
pub struct DuplicateId(pub TodoId);

#[async_trait]
pub trait TodoStore: Send + Sync {
    /// Insert a fully-formed todo. Fails with `DuplicateId` if the id is taken.
    async fn insert(&self, todo: Todo) -> anyhow::Result<()>;
    async fn find_by_id(&self, id: &TodoId) -> anyhow::Result<Option<Todo>>;
    /// All records, in no particular order.
    async fn list(&self) -> anyhow::Result<Vec<Todo>>;
    /// Find-and-modify. Returns the updated record, or `None` if absent.
    async fn update(
        &self,
        id: &TodoId,
        patch: &TodoPatch,
        at: DateTime<Utc>,
    ) -> anyhow::Result<Option<Todo>>;
    /// Returns true if a record was removed.
    async fn delete(&self, id: &TodoId) -> anyhow::Result<bool>;
}

type Todos = HashMap<TodoId, Todo>;

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    todos: Arc<RwLock<Todos>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TodoStore for MemoryStore {
    async fn insert(&self, todo: Todo) -> anyhow::Result<()> {
        match self.todos.write().await.entry(todo.id.clone()) {
            Entry::Occupied(e) => Err(DuplicateId(e.key().clone()).into()),
            Entry::Vacant(e) => {
                e.insert(todo);
                Ok(())
            }
        }
    }

    async fn find_by_id(&self, id: &TodoId) -> anyhow::Result<Option<Todo>> {
        Ok(self.todos.read().await.get(id).cloned())
    }

    async fn list(&self) -> anyhow::Result<Vec<Todo>> {
        Ok(self.todos.read().await.values().cloned().collect())
    }

    async fn update(
        &self,
        id: &TodoId,
        patch: &TodoPatch,
        at: DateTime<Utc>,
    ) -> anyhow::Result<Option<Todo>> {
        let mut todos = self.todos.write().await;
        Ok(todos.get_mut(id).map(|todo| {
            todo.apply(patch, at);
            todo.clone()
        }))
    }

    async fn delete(&self, id: &TodoId) -> anyhow::Result<bool> {
        Ok(self.todos.write().await.remove(id).is_some())
    }
}

/// Snapshot-backed store. The file holds a JSON array of todos, oldest first.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    todos: RwLock<Todos>,
}

impl FileStore {
    /// Load the snapshot at `path`; a missing file is an empty collection.
    pub async fn open(path: impl Into<PathBuf>) -> anyhow::Result<Self> {
        let path = path.into();
        let todos = match tokio::fs::read(&path).await {
            Ok(bytes) => {
                let list: Vec<Todo> = serde_json::from_slice(&bytes)
                    .with_context(|| format!("parsing snapshot {}", path.display()))?;
                list.into_iter().map(|t| (t.id.clone(), t)).collect()
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Todos::new(),
            Err(e) => {
                return Err(e).with_context(|| format!("reading snapshot {}", path.display()))
            }
        };
        tracing::debug!(path = %path.display(), count = todos.len(), "snapshot loaded");
        Ok(Self {
            path,
            todos: RwLock::new(todos),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn persist(&self, todos: &Todos) -> anyhow::Result<()> {
        let mut snapshot: Vec<&Todo> = todos.values().collect();
        snapshot.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        let bytes = serde_json::to_vec_pretty(&snapshot).context("encoding snapshot")?;

        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(dir)
                .await
                .with_context(|| format!("creating {}", dir.display()))?;
        }
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);
        tokio::fs::write(&tmp, bytes)
            .await
            .with_context(|| format!("writing {}", tmp.display()))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .with_context(|| format!("replacing snapshot {}", self.path.display()))
    }
}

#[async_trait]
impl TodoStore for FileStore {
    async fn insert(&self, todo: Todo) -> anyhow::Result<()> {
        let mut todos = self.todos.write().await;
        let id = todo.id.clone();
        match todos.entry(id.clone()) {
            Entry::Occupied(_) => return Err(DuplicateId(id).into()),
            Entry::Vacant(e) => {
                e.insert(todo);
            }
        }
        if let Err(e) = self.persist(&todos).await {
            todos.remove(&id);
            return Err(e);
        }
        Ok(())
    }

    async fn find_by_id(&self, id: &TodoId) -> anyhow::Result<Option<Todo>> {
        Ok(self.todos.read().await.get(id).cloned())
    }

    async fn list(&self) -> anyhow::Result<Vec<Todo>> {
        Ok(self.todos.read().await.values().cloned().collect())
    }

    async fn update(
        &self,
        id: &TodoId,
        patch: &TodoPatch,
        at: DateTime<Utc>,
    ) -> anyhow::Result<Option<Todo>> {
        let mut todos = self.todos.write().await;
        let Some(todo) = todos.get_mut(id) else {
            return Ok(None);
        };
        let previous = todo.clone();
        todo.apply(patch, at);
        let updated = todo.clone();

        if let Err(e) = self.persist(&todos).await {
            todos.insert(id.clone(), previous);
            return Err(e);
        }
        Ok(Some(updated))
    }

    async fn delete(&self, id: &TodoId) -> anyhow::Result<bool> {
        let mut todos = self.todos.write().await;
        let Some(removed) = todos.remove(id) else {
            return Ok(false);
        };
        if let Err(e) = self.persist(&todos).await {
            todos.insert(id.clone(), removed);
            return Err(e);
        }
        Ok(true)
    }
}
