//! Redis-backed key-value store.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use redis::AsyncCommands;
use redis::aio::ConnectionManager;
use tracing::{debug, error, info};

use super::KeyValueStore;
use crate::errors::StoreError;

/// Redis store for course cache hashes and rankings.
///
/// `ConnectionManager` is cheap to clone; each command runs on its own clone.
#[derive(Clone)]
pub struct RedisStore {
    manager: ConnectionManager,
}

impl RedisStore {
    /// Opens a managed connection to `url`.
    pub async fn connect(url: &str) -> Result<Self, StoreError> {
        info!("Connecting to key-value store at {}", url);

        let client = redis::Client::open(url)?;
        let manager = ConnectionManager::new(client).await.map_err(|e| {
            error!("Redis connection failed: {}", e);
            e
        })?;

        info!("Connected to key-value store");
        Ok(Self { manager })
    }
}

/// Maps a TTL reply to a duration. Redis answers -2 for a missing key and -1
/// for a key without expiry.
fn ttl_from_reply(seconds: i64) -> Option<Duration> {
    u64::try_from(seconds).ok().map(Duration::from_secs)
}

#[async_trait]
impl KeyValueStore for RedisStore {
    async fn cache_put_fields(
        &self,
        key: &str,
        fields: &[(String, String)],
    ) -> Result<(), StoreError> {
        // HSET rejects an empty field list
        if fields.is_empty() {
            return Ok(());
        }

        let mut conn = self.manager.clone();
        conn.hset_multiple::<_, _, _, ()>(key, fields).await?;

        debug!("HSET {} ({} fields)", key, fields.len());
        Ok(())
    }

    async fn cache_set_ttl(&self, key: &str, ttl: Duration) -> Result<bool, StoreError> {
        let seconds = i64::try_from(ttl.as_secs()).unwrap_or(i64::MAX);
        let mut conn = self.manager.clone();
        let applied: bool = conn.expire(key, seconds).await?;

        debug!("EXPIRE {} {} -> {}", key, seconds, applied);
        Ok(applied)
    }

    async fn ranking_set_score(
        &self,
        ranking: &str,
        member: &str,
        score: f64,
    ) -> Result<(), StoreError> {
        let mut conn = self.manager.clone();
        conn.zadd::<_, _, _, ()>(ranking, member, score).await?;

        debug!("ZADD {} {} {}", ranking, score, member);
        Ok(())
    }

    async fn cache_fields(&self, key: &str) -> Result<HashMap<String, String>, StoreError> {
        let mut conn = self.manager.clone();
        let fields: HashMap<String, String> = conn.hgetall(key).await?;
        Ok(fields)
    }

    async fn cache_ttl(&self, key: &str) -> Result<Option<Duration>, StoreError> {
        let mut conn = self.manager.clone();
        let seconds: i64 = conn.ttl(key).await?;
        Ok(ttl_from_reply(seconds))
    }

    async fn ranking(&self, ranking: &str) -> Result<Vec<(String, f64)>, StoreError> {
        let mut conn = self.manager.clone();
        let members: Vec<(String, f64)> = conn.zrange_withscores(ranking, 0, -1).await?;
        Ok(members)
    }
}
