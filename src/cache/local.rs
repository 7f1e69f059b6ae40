// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! In-process LRU cache with per-entry TTL.
//!
//! Expired entries are dropped lazily on read and periodically by a sweep
//! task. The map is bounded; the least recently used entry is evicted when
//! it is full.

use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use lru::LruCache;
use serde_json::Value;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use super::CacheStore;

/// Cached value + expiry deadline (`None` never expires).
struct CacheEntry {
    value: Value,
    expires_at: Option<Instant>,
}

impl CacheEntry {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|deadline| now >= deadline)
    }
}

/// Process-local cache backend. Never fails.
pub struct LocalCache {
    cache: Mutex<LruCache<String, CacheEntry>>,
    default_ttl: Duration,
}

impl LocalCache {
    /// Create a new cache with the given capacity and default TTL.
    ///
    /// - `capacity`: Max number of entries kept.
    /// - `default_ttl`: Lifetime used when `set` is called without a TTL.
    pub fn new(capacity: usize, default_ttl: Duration) -> Self {
        Self {
            cache: Mutex::new(LruCache::new(
                NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN),
            )),
            default_ttl,
        }
    }

    /// Number of entries currently held, expired ones included.
    pub fn len(&self) -> usize {
        self.cache.lock().map(|c| c.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every expired entry. Returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        let Ok(mut cache) = self.cache.lock() else {
            return 0;
        };
        let now = Instant::now();
        let expired: Vec<String> = cache
            .iter()
            .filter(|(_, entry)| entry.is_expired(now))
            .map(|(key, _)| key.clone())
            .collect();
        for key in &expired {
            cache.pop(key);
        }
        expired.len()
    }

    /// Run `purge_expired` every `period` until `shutdown` is cancelled.
    pub fn spawn_sweeper(self: &Arc<Self>, period: Duration, shutdown: CancellationToken) {
        let cache = Arc::clone(self);
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.tick().await;
            loop {
                tokio::select! {
                    _ = interval.tick() => {
                        let removed = cache.purge_expired();
                        if removed > 0 {
                            tracing::debug!(removed, "Swept expired cache entries");
                        }
                    }
                    _ = shutdown.cancelled() => {
                        tracing::debug!("Cache sweeper shutting down");
                        return;
                    }
                }
            }
        });
    }
}

#[async_trait]
impl CacheStore for LocalCache {
    fn backend(&self) -> &'static str {
        "local"
    }

    async fn get(&self, key: &str) -> Option<Value> {
        let mut cache = self.cache.lock().ok()?;
        if let Some(entry) = cache.get(key) {
            if !entry.is_expired(Instant::now()) {
                return Some(entry.value.clone());
            }
            cache.pop(key);
        }
        None
    }

    async fn set(&self, key: &str, value: &Value, ttl: Option<Duration>) -> bool {
        let ttl = ttl.unwrap_or(self.default_ttl);
        let expires_at = (!ttl.is_zero()).then(|| Instant::now() + ttl);
        match self.cache.lock() {
            Ok(mut cache) => {
                cache.put(
                    key.to_string(),
                    CacheEntry {
                        value: value.clone(),
                        expires_at,
                    },
                );
                true
            }
            Err(_) => false,
        }
    }

    async fn delete(&self, key: &str) -> bool {
        match self.cache.lock() {
            Ok(mut cache) => {
                cache.pop(key);
                true
            }
            Err(_) => false,
        }
    }

    async fn flush(&self) -> bool {
        match self.cache.lock() {
            Ok(mut cache) => {
                cache.clear();
                true
            }
            Err(_) => false,
        }
    }
}
