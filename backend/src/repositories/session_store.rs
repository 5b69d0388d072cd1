//! Key-value session store adapters.
//!
//! The session manager talks to the store only through [`SessionStore`]:
//! single-key `put`/`get`/`delete` plus an absolute-expiry setter. Each call is
//! atomic at the key level and nothing is cached in process.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use redis::{AsyncCommands, aio::ConnectionManager};
use std::collections::HashMap;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::Mutex;
use tokio::time::Instant;

/// Errors raised by a session store backend.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("redis error: {0}")]
    Redis(#[from] redis::RedisError),
    #[error("session ttl of {0:?} is out of range")]
    TtlOutOfRange(Duration),
}

/// Thin key-value contract over the external session store.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Writes `value` under `key`, replacing any previous value, expiring after `ttl`.
    async fn put(&self, key: &str, value: &str, ttl: Duration) -> Result<(), StoreError>;

    /// Reads the live value under `key`.
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Removes `key`, reporting whether anything was removed.
    async fn delete(&self, key: &str) -> Result<bool, StoreError>;

    /// Moves the expiry of an existing key to `at`. Returns `false` if the key is absent.
    async fn expire_at(&self, key: &str, at: DateTime<Utc>) -> Result<bool, StoreError>;
}

/// Session store backed by Redis through an auto-reconnecting connection manager.
#[derive(Clone)]
pub struct RedisSessionStore {
    conn: ConnectionManager,
}

impl RedisSessionStore {
    /// Opens a managed connection to the Redis server at `url`.
    pub async fn connect(url: &str) -> Result<Self, StoreError> {
        let client = redis::Client::open(url)?;
        let conn = client.get_connection_manager().await?;
        tracing::info!("Connected to Redis session store");
        Ok(Self { conn })
    }
}

#[async_trait]
impl SessionStore for RedisSessionStore {
    async fn put(&self, key: &str, value: &str, ttl: Duration) -> Result<(), StoreError> {
        let mut conn = self.conn.clone();
        // SET EX rejects a zero expiry.
        let _: () = conn.set_ex(key, value, ttl.as_secs().max(1)).await?;
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let mut conn = self.conn.clone();
        let value: Option<String> = conn.get(key).await?;
        Ok(value)
    }

    async fn delete(&self, key: &str) -> Result<bool, StoreError> {
        let mut conn = self.conn.clone();
        let removed: u64 = conn.del(key).await?;
        Ok(removed > 0)
    }

    async fn expire_at(&self, key: &str, at: DateTime<Utc>) -> Result<bool, StoreError> {
        let mut conn = self.conn.clone();
        let applied: bool = conn.expire_at(key, at.timestamp()).await?;
        Ok(applied)
    }
}

struct MemoryEntry {
    value: String,
    deadline: Instant,
}

/// Process-local session store. Expired entries are invisible to reads and
/// swept out on every write.
#[derive(Default)]
pub struct MemorySessionStore {
    entries: Mutex<HashMap<String, MemoryEntry>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn put(&self, key: &str, value: &str, ttl: Duration) -> Result<(), StoreError> {
        let now = Instant::now();
        let deadline = now.checked_add(ttl).ok_or(StoreError::TtlOutOfRange(ttl))?;

        let mut entries = self.entries.lock().await;
        entries.retain(|_, entry| entry.deadline > now);
        entries.insert(
            key.to_string(),
            MemoryEntry {
                value: value.to_string(),
                deadline,
            },
        );
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let mut entries = self.entries.lock().await;
        match entries.get(key) {
            Some(entry) if entry.deadline > Instant::now() => Ok(Some(entry.value.clone())),
            Some(_) => {
                entries.remove(key);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn delete(&self, key: &str) -> Result<bool, StoreError> {
        let mut entries = self.entries.lock().await;
        let removed = entries.remove(key);
        Ok(matches!(removed, Some(entry) if entry.deadline > Instant::now()))
    }

    async fn expire_at(&self, key: &str, at: DateTime<Utc>) -> Result<bool, StoreError> {
        let mut entries = self.entries.lock().await;
        let now = Instant::now();

        let live = matches!(entries.get(key), Some(entry) if entry.deadline > now);
        if !live {
            entries.remove(key);
            return Ok(false);
        }

        match (at - Utc::now()).to_std() {
            Ok(remaining) if !remaining.is_zero() => {
                if let Some(entry) = entries.get_mut(key) {
                    entry.deadline = now + remaining;
                }
            }
            // A deadline already in the past expires the key immediately.
            _ => {
                entries.remove(key);
            }
        }
        Ok(true)
    }
}
