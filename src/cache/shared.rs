// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Redis cache backend.
//!
//! Values are stored as JSON text. The connection is opened on first use and
//! reconnects on its own afterwards; every command is bounded by a timeout.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use serde_json::Value;
use tokio::sync::OnceCell;

use super::{CacheError, CacheStore};

/// Cache shared between gateway instances through Redis.
pub struct RedisCache {
    client: redis::Client,
    conn: OnceCell<ConnectionManager>,
    default_ttl: Duration,
    timeout: Duration,
}

impl RedisCache {
    /// Validate `url` and prepare a client. Does not connect.
    pub fn new(url: &str, default_ttl: Duration, timeout: Duration) -> Result<Self, CacheError> {
        let client = redis::Client::open(url)?;
        Ok(Self {
            client,
            conn: OnceCell::new(),
            default_ttl,
            timeout,
        })
    }

    async fn bounded<T, F>(&self, op: F) -> Result<T, CacheError>
    where
        F: Future<Output = Result<T, CacheError>>,
    {
        tokio::time::timeout(self.timeout, op)
            .await
            .map_err(|_| CacheError::Timeout)?
    }

    async fn connection(&self) -> Result<ConnectionManager, CacheError> {
        let conn = self
            .bounded(self.conn.get_or_try_init(|| async {
                let conn = ConnectionManager::new(self.client.clone()).await?;
                tracing::info!("Connected to Redis");
                Ok::<_, CacheError>(conn)
            }))
            .await?;
        Ok(conn.clone())
    }

    async fn try_get(&self, key: &str) -> Result<Option<Value>, CacheError> {
        let mut conn = self.connection().await?;
        let raw: Option<String> = self
            .bounded(async { Ok::<_, CacheError>(conn.get(key).await?) })
            .await?;
        match raw {
            Some(text) => Ok(Some(serde_json::from_str(&text)?)),
            None => Ok(None),
        }
    }

    async fn try_set(&self, key: &str, value: &Value, ttl: Duration) -> Result<(), CacheError> {
        let json = serde_json::to_string(value)?;
        let mut conn = self.connection().await?;
        self.bounded(async {
            if ttl.is_zero() {
                let _: () = conn.set(key, &json).await?;
            } else {
                let _: () = conn.set_ex(key, &json, ttl.as_secs().max(1)).await?;
            }
            Ok::<(), CacheError>(())
        })
        .await
    }

    async fn try_delete(&self, key: &str) -> Result<(), CacheError> {
        let mut conn = self.connection().await?;
        self.bounded(async {
            let _: () = conn.del(key).await?;
            Ok::<(), CacheError>(())
        })
        .await
    }

    async fn try_flush(&self) -> Result<(), CacheError> {
        let mut conn = self.connection().await?;
        self.bounded(async {
            let _: () = redis::cmd("FLUSHALL").query_async(&mut conn).await?;
            Ok::<(), CacheError>(())
        })
        .await
    }

    async fn try_ping(&self) -> Result<(), CacheError> {
        let mut conn = self.connection().await?;
        self.bounded(async {
            let _: String = redis::cmd("PING").query_async(&mut conn).await?;
            Ok::<(), CacheError>(())
        })
        .await
    }
}

#[async_trait]
impl CacheStore for RedisCache {
    fn backend(&self) -> &'static str {
        "redis"
    }

    async fn get(&self, key: &str) -> Option<Value> {
        match self.try_get(key).await {
            Ok(value) => value,
            Err(e) => {
                tracing::error!(key, error = %e, "Cache get failed");
                None
            }
        }
    }

    async fn set(&self, key: &str, value: &Value, ttl: Option<Duration>) -> bool {
        let ttl = ttl.unwrap_or(self.default_ttl);
        match self.try_set(key, value, ttl).await {
            Ok(()) => true,
            Err(e) => {
                tracing::error!(key, error = %e, "Cache set failed");
                false
            }
        }
    }

    async fn delete(&self, key: &str) -> bool {
        match self.try_delete(key).await {
            Ok(()) => true,
            Err(e) => {
                tracing::error!(key, error = %e, "Cache delete failed");
                false
            }
        }
    }

    async fn flush(&self) -> bool {
        match self.try_flush().await {
            Ok(()) => true,
            Err(e) => {
                tracing::error!(error = %e, "Cache flush failed");
                false
            }
        }
    }

    async fn ping(&self) -> bool {
        match self.try_ping().await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(error = %e, "Cache ping failed");
                false
            }
        }
    }
}
