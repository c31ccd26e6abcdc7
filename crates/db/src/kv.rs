//! Process-wide key-value cache.
//!
//! Holds small memoized values next to the library, such as the last seen
//! latest chapter of a novel and its per-page "has updates" flags. Values are
//! stored as JSON text; [`KeyValueExt`] adds typed access on top of the raw
//! string interface.

use crate::Database;
use crate::error::{ErrorKind, Result};
use async_trait::async_trait;
use exn::ResultExt;
use serde::Serialize;
use serde::de::DeserializeOwned;
use sqlx::SqlitePool;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

pub type KeyValueHandle = Arc<dyn KeyValueStore>;

/// Raw string storage. Writes are idempotent and last-writer-wins.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get_raw(&self, key: &str) -> Result<Option<String>>;
    async fn set_raw(&self, key: &str, value: &str) -> Result<()>;
}

/// Typed JSON access for every [`KeyValueStore`].
#[async_trait]
pub trait KeyValueExt: KeyValueStore {
    /// Read and decode a value. A value that does not decode as `T` is an
    /// [`ErrorKind::InvalidData`] error, not a miss.
    async fn get<T: DeserializeOwned + Send>(&self, key: &str) -> Result<Option<T>>;
    async fn set<T: Serialize + Sync + ?Sized>(&self, key: &str, value: &T) -> Result<()>;
}

#[async_trait]
impl<S: KeyValueStore + ?Sized> KeyValueExt for S {
    async fn get<T: DeserializeOwned + Send>(&self, key: &str) -> Result<Option<T>> {
        let Some(raw) = self.get_raw(key).await? else {
            return Ok(None);
        };
        serde_json::from_str(&raw).map(Some).or_raise(|| ErrorKind::InvalidData("key-value entry"))
    }

    async fn set<T: Serialize + Sync + ?Sized>(&self, key: &str, value: &T) -> Result<()> {
        let raw = serde_json::to_string(value).or_raise(|| ErrorKind::InvalidData("key-value entry"))?;
        self.set_raw(key, &raw).await
    }
}

/// Non-persistent store, for tests and ephemeral sessions.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, String>>,
}
impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get_raw(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.read().unwrap_or_else(PoisonError::into_inner).get(key).cloned())
    }

    async fn set_raw(&self, key: &str, value: &str) -> Result<()> {
        self.entries.write().unwrap_or_else(PoisonError::into_inner).insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Store backed by the `kv` table of the library database.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}
impl From<&Database> for SqliteStore {
    fn from(db: &Database) -> Self {
        Self { pool: db.pool().clone() }
    }
}

#[async_trait]
impl KeyValueStore for SqliteStore {
    async fn get_raw(&self, key: &str) -> Result<Option<String>> {
        sqlx::query_scalar::<_, String>(include_str!("../queries/kv_get.sql"))
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)
    }

    async fn set_raw(&self, key: &str, value: &str) -> Result<()> {
        sqlx::query(include_str!("../queries/kv_set.sql"))
            .bind(key)
            .bind(value)
            .execute(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)?;
        Ok(())
    }
}
