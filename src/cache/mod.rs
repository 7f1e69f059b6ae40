// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Result Cache
//!
//! A small key/value cache for JSON values with per-entry TTLs. Two backends
//! implement [`CacheStore`]:
//!
//! - [`LocalCache`]: in-process LRU map with lazy expiry and a periodic sweep
//! - [`RedisCache`]: shared Redis instance, values stored as JSON text
//!
//! The backend is picked once at startup from [`CacheConfig`]. Callers never
//! see cache failures: a broken backend reads as a miss and writes report
//! `false`, so an outage degrades to "always fetch live".
//!
//! ## Key Layout
//!
//! | Data | Key | TTL |
//! |------|-----|-----|
//! | Native balance | `balance:{address}` | default |
//! | Token balance | `token:{address}:{token}` | default |
//! | Daily usage | `analytics:{api_key}:{yyyy-mm-dd}` | 24h |

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use serde_json::Value;
use tokio_util::sync::CancellationToken;

use crate::config::{CacheBackend, CacheConfig};

pub mod keys;
pub mod local;
pub mod shared;

pub use local::LocalCache;
pub use shared::RedisCache;

/// Uniform cache interface shared by all backends.
///
/// `ttl = None` stores the entry with the backend's default TTL. A zero TTL
/// stores the entry without expiry.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Short backend name for logs and health output.
    fn backend(&self) -> &'static str;

    /// Fetch a value. Absent, expired and unreadable entries are all `None`.
    async fn get(&self, key: &str) -> Option<Value>;

    /// Store a value, overwriting any previous entry.
    async fn set(&self, key: &str, value: &Value, ttl: Option<Duration>) -> bool;

    /// Remove a single entry.
    async fn delete(&self, key: &str) -> bool;

    /// Remove every entry.
    async fn flush(&self) -> bool;

    /// Whether the backend is currently reachable.
    async fn ping(&self) -> bool {
        true
    }
}

/// Errors raised inside cache backends. They are logged and never leave the
/// backend, except when constructing it.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Cache operation timed out")]
    Timeout,
}

/// Build the configured backend.
///
/// The local backend gets a sweep task that stops when `shutdown` is
/// cancelled. Must be called inside a Tokio runtime.
pub fn build_cache(
    config: &CacheConfig,
    shutdown: CancellationToken,
) -> Result<Arc<dyn CacheStore>, CacheError> {
    match &config.backend {
        CacheBackend::Local => {
            let cache = Arc::new(LocalCache::new(config.max_entries, config.default_ttl));
            cache.spawn_sweeper(config.check_period, shutdown);
            tracing::info!(
                capacity = config.max_entries,
                ttl_secs = config.default_ttl.as_secs(),
                "Using in-process cache"
            );
            Ok(cache)
        }
        CacheBackend::Redis { url } => {
            let cache = RedisCache::new(url, config.default_ttl, config.redis_timeout)?;
            tracing::info!(ttl_secs = config.default_ttl.as_secs(), "Using Redis cache");
            Ok(Arc::new(cache))
        }
    }
}
