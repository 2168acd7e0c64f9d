//! Local store: the scoped key-value state a browser profile would hold.
//!
//! Session record, credential cache, endpoint override and the fallback
//! collections all live here. Values are JSON documents under `resumate_*` keys.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::info;

pub mod file;
pub mod memory;
pub mod redis_kv;

pub use file::FileBackend;
pub use memory::MemoryBackend;
pub use redis_kv::RedisBackend;

/// Prefix shared by every key this service writes.
pub const KEY_PREFIX: &str = "resumate_";

pub const SESSION_KEY: &str = "resumate_session";
pub const AUTH_DB_KEY: &str = "resumate_auth_db";
pub const SCRIPT_URL_KEY: &str = "resumate_script_url";
pub const USERS_KEY: &str = "resumate_users";
pub const RESUMES_KEY: &str = "resumate_resumes";
pub const ANSWERS_KEY: &str = "resumate_answers";

#[derive(Debug, Error)]
pub enum LocalStoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Corrupt value under '{key}': {source}")]
    Corrupt {
        key: String,
        source: serde_json::Error,
    },

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Raw string storage. Implementations own their own write serialization.
#[async_trait]
pub trait KeyValueBackend: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, LocalStoreError>;
    async fn set(&self, key: &str, value: String) -> Result<(), LocalStoreError>;
    async fn remove(&self, key: &str) -> Result<(), LocalStoreError>;
    async fn keys(&self) -> Result<Vec<String>, LocalStoreError>;
}

/// Typed handle over a backend. Cheap to clone; every clone shares the backend
/// and the write lock.
///
/// Every write goes through `write_lock`, so a read-modify-write done with
/// [`LocalStore::update`] cannot interleave with any other write.
#[derive(Clone)]
pub struct LocalStore {
    backend: Arc<dyn KeyValueBackend>,
    write_lock: Arc<Mutex<()>>,
}

impl LocalStore {
    pub fn new(backend: Arc<dyn KeyValueBackend>) -> Self {
        Self {
            backend,
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryBackend::default()))
    }

    /// Opens the backend named by `location`: `memory`, a `redis://` URL, or a file path.
    pub async fn open(location: &str) -> anyhow::Result<Self> {
        if location == "memory" {
            info!("Local store: in-memory");
            return Ok(Self::in_memory());
        }
        if location.starts_with("redis://") || location.starts_with("rediss://") {
            let backend = RedisBackend::connect(location).await?;
            info!("Local store: redis");
            return Ok(Self::new(Arc::new(backend)));
        }
        let backend = FileBackend::open(location).await?;
        info!("Local store: file {location}");
        Ok(Self::new(Arc::new(backend)))
    }

    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, LocalStoreError> {
        match self.backend.get(key).await? {
            Some(raw) => serde_json::from_str(&raw)
                .map(Some)
                .map_err(|source| LocalStoreError::Corrupt {
                    key: key.to_string(),
                    source,
                }),
            None => Ok(None),
        }
    }

    /// Reads a collection, treating a missing key as empty.
    pub async fn get_list<T: DeserializeOwned>(&self, key: &str) -> Result<Vec<T>, LocalStoreError> {
        Ok(self.get::<Vec<T>>(key).await?.unwrap_or_default())
    }

    pub async fn set<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<(), LocalStoreError> {
        let raw = serde_json::to_string(value)?;
        let _guard = self.write_lock.lock().await;
        self.backend.set(key, raw).await
    }

    /// Reads the value under `key` (default when missing), applies `apply` and
    /// writes the result back, all under the write lock. Returns what `apply` returned.
    pub async fn update<T, R, F>(&self, key: &str, apply: F) -> Result<R, LocalStoreError>
    where
        T: DeserializeOwned + Serialize + Default,
        F: FnOnce(&mut T) -> R,
    {
        let _guard = self.write_lock.lock().await;
        let mut value: T = self.get(key).await?.unwrap_or_default();
        let result = apply(&mut value);
        let raw = serde_json::to_string(&value)?;
        self.backend.set(key, raw).await?;
        Ok(result)
    }

    pub async fn remove(&self, key: &str) -> Result<(), LocalStoreError> {
        let _guard = self.write_lock.lock().await;
        self.backend.remove(key).await
    }

    /// Drops every key owned by this service.
    pub async fn clear(&self) -> Result<(), LocalStoreError> {
        let _guard = self.write_lock.lock().await;
        for key in self.backend.keys().await? {
            if key.starts_with(KEY_PREFIX) {
                self.backend.remove(&key).await?;
            }
        }
        Ok(())
    }
}
