use std::collections::HashMap;

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use tokio::sync::RwLock;
use tracing::warn;

use crate::utils::errors::app_error::AppError;

/// Server-side store for cached page representations. Redis in production,
/// `InMemoryPageCache` in tests.
#[async_trait]
pub trait PageCache: Send + Sync {
    async fn get_raw(&self, key: &str) -> Result<Option<String>, AppError>;

    async fn set_raw(&self, key: &str, value: String, ttl_seconds: u64) -> Result<(), AppError>;

    async fn invalidate(&self, key: &str) -> Result<(), AppError>;

    /// Atomically increments a counter, starting from 0, and returns the new value.
    async fn increment(&self, key: &str) -> Result<u64, AppError>;
}

/// Reads a JSON value. An entry that no longer decodes is treated as a miss.
pub async fn get_cached<T: DeserializeOwned>(
    cache: &dyn PageCache,
    key: &str,
) -> Result<Option<T>, AppError> {
    match cache.get_raw(key).await? {
        Some(data) => match serde_json::from_str(&data) {
            Ok(value) => Ok(Some(value)),
            Err(e) => {
                warn!("Discarding undecodable cache entry {}: {}", key, e);
                Ok(None)
            }
        },
        None => Ok(None),
    }
}

pub async fn set_cached<T: Serialize>(
    cache: &dyn PageCache,
    key: &str,
    value: &T,
    ttl_seconds: u64,
) -> Result<(), AppError> {
    let serialized =
        serde_json::to_string(value).map_err(|e| AppError::InternalServerError(e.to_string()))?;
    cache.set_raw(key, serialized, ttl_seconds).await
}

/// Process-local cache. TTLs are ignored.
#[derive(Default)]
pub struct InMemoryPageCache {
    entries: RwLock<HashMap<String, String>>,
}

impl InMemoryPageCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn contains(&self, key: &str) -> bool {
        self.entries.read().await.contains_key(key)
    }
}

#[async_trait]
impl PageCache for InMemoryPageCache {
    async fn get_raw(&self, key: &str) -> Result<Option<String>, AppError> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn set_raw(&self, key: &str, value: String, _ttl_seconds: u64) -> Result<(), AppError> {
        self.entries.write().await.insert(key.to_string(), value);
        Ok(())
    }

    async fn invalidate(&self, key: &str) -> Result<(), AppError> {
        self.entries.write().await.remove(key);
        Ok(())
    }

    async fn increment(&self, key: &str) -> Result<u64, AppError> {
        let mut entries = self.entries.write().await;
        let current = entries
            .get(key)
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(0);
        entries.insert(key.to_string(), (current + 1).to_string());
        Ok(current + 1)
    }
}
