//! Redis adapter for the identity cache.
//!
//! Entries are JSON envelopes that carry their own expiry timestamp in
//! addition to the Redis per-key TTL; a drifted or persisted key can never
//! serve a stale user past its recorded expiry.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use redis::AsyncCommands;
use redis::aio::ConnectionManager;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{CacheError, UserCache};
use crate::model::User;

impl From<redis::RedisError> for CacheError {
    fn from(err: redis::RedisError) -> Self {
        CacheError(err.to_string())
    }
}

impl From<serde_json::Error> for CacheError {
    fn from(err: serde_json::Error) -> Self {
        CacheError(err.to_string())
    }
}

#[derive(Serialize, Deserialize)]
struct CacheEntry {
    user: User,
    expires_at: DateTime<Utc>,
}

impl CacheEntry {
    fn new(user: &User, ttl: Duration) -> Self {
        Self {
            user: user.clone(),
            expires_at: Utc::now()
                + chrono::Duration::from_std(ttl).unwrap_or(chrono::Duration::zero()),
        }
    }

    fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }
}

#[derive(Clone)]
pub struct RedisUserCache {
    conn: ConnectionManager,
}

impl RedisUserCache {
    pub fn new(conn: ConnectionManager) -> Self {
        Self { conn }
    }

    fn key(user_id: Uuid) -> String {
        format!("user:{user_id}")
    }
}

#[async_trait]
impl UserCache for RedisUserCache {
    async fn get(&self, user_id: Uuid) -> Result<Option<User>, CacheError> {
        let key = Self::key(user_id);
        let mut conn = self.conn.clone();

        let raw: Option<String> = conn.get(&key).await?;
        let Some(raw) = raw else {
            return Ok(None);
        };

        let entry: CacheEntry = serde_json::from_str(&raw)?;
        if entry.is_expired(Utc::now()) {
            // Evict in the background; the caller already treats this as a
            // miss and should not wait on Redis.
            let mut conn = self.conn.clone();
            tokio::spawn(async move {
                let evicted: redis::RedisResult<()> = conn.del(&key).await;
                if let Err(err) = evicted {
                    tracing::warn!(%key, error = %err, "failed to evict expired cache entry");
                }
            });
            return Ok(None);
        }

        Ok(Some(entry.user))
    }

    async fn set(&self, user_id: Uuid, user: &User, ttl: Duration) -> Result<(), CacheError> {
        let key = Self::key(user_id);
        let payload = serde_json::to_string(&CacheEntry::new(user, ttl))?;
        let seconds = ttl.as_secs().max(1);

        let mut conn = self.conn.clone();
        let _: () = conn.set_ex(&key, payload, seconds).await?;
        Ok(())
    }

    async fn delete(&self, user_id: Uuid) -> Result<(), CacheError> {
        let mut conn = self.conn.clone();
        let _: () = conn.del(&Self::key(user_id)).await?;
        Ok(())
    }
}
