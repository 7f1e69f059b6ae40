// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Fixed-window request quotas per API key.
//!
//! Each key gets `max_requests` per window. The window starts with the key's
//! first request and resets once it has elapsed. Responses carry the
//! `RateLimit-*` headers; rejected requests also get `Retry-After`.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    extract::{Request, State},
    http::{HeaderMap, HeaderName, HeaderValue},
    middleware::Next,
    response::{IntoResponse, Response},
};
use chrono::{DateTime, SecondsFormat, Utc};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::{auth::ApiKey, config::RateLimitConfig, error::ApiError, state::AppState};

const RATE_LIMIT_LIMIT: HeaderName = HeaderName::from_static("ratelimit-limit");
const RATE_LIMIT_REMAINING: HeaderName = HeaderName::from_static("ratelimit-remaining");
const RATE_LIMIT_RESET: HeaderName = HeaderName::from_static("ratelimit-reset");

#[derive(Debug, Clone, Copy)]
struct Window {
    started_at: Instant,
    count: u32,
}

/// Outcome of a quota check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateDecision {
    pub allowed: bool,
    pub limit: u32,
    pub remaining: u32,
    /// Time until the window resets
    pub reset_after: Duration,
    /// Wall-clock time of the reset
    pub reset_at: DateTime<Utc>,
}

impl RateDecision {
    /// Whole seconds until reset, rounded up.
    pub fn reset_secs(&self) -> u64 {
        let secs = self.reset_after.as_secs();
        if self.reset_after.subsec_nanos() > 0 {
            secs + 1
        } else {
            secs
        }
    }

    fn write_headers(&self, headers: &mut HeaderMap) {
        headers.insert(RATE_LIMIT_LIMIT, HeaderValue::from(self.limit));
        headers.insert(RATE_LIMIT_REMAINING, HeaderValue::from(self.remaining));
        headers.insert(RATE_LIMIT_RESET, HeaderValue::from(self.reset_secs()));
    }
}

/// In-process fixed-window counter keyed by API key.
pub struct RateLimiter {
    windows: Mutex<HashMap<String, Window>>,
    config: RateLimitConfig,
}

impl RateLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            windows: Mutex::new(HashMap::new()),
            config,
        }
    }

    /// Count one request for `key` and decide whether it may proceed.
    pub fn check(&self, key: &str) -> RateDecision {
        let now = Instant::now();
        let limit = self.config.max_requests;
        let window_len = self.config.window;

        let window = match self.windows.lock() {
            Ok(mut windows) => {
                let window = windows.entry(key.to_string()).or_insert(Window {
                    started_at: now,
                    count: 0,
                });
                if now.duration_since(window.started_at) >= window_len {
                    *window = Window {
                        started_at: now,
                        count: 0,
                    };
                }
                window.count = window.count.saturating_add(1);
                *window
            }
            Err(_) => {
                tracing::error!("Rate limiter lock poisoned, allowing request");
                Window {
                    started_at: now,
                    count: 1,
                }
            }
        };

        let reset_after = window_len.saturating_sub(now.duration_since(window.started_at));
        let reset_at = Utc::now()
            + chrono::Duration::from_std(reset_after).unwrap_or(chrono::Duration::zero());

        RateDecision {
            allowed: window.count <= limit,
            limit,
            remaining: limit.saturating_sub(window.count),
            reset_after,
            reset_at,
        }
    }

    /// Drop windows that have fully elapsed. Returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        let Ok(mut windows) = self.windows.lock() else {
            return 0;
        };
        let now = Instant::now();
        let before = windows.len();
        windows.retain(|_, window| now.duration_since(window.started_at) < self.config.window);
        before - windows.len()
    }

    /// Number of keys currently tracked.
    pub fn tracked_keys(&self) -> usize {
        self.windows.lock().map(|w| w.len()).unwrap_or(0)
    }

    /// Purge elapsed windows once per window length until `shutdown`.
    pub fn spawn_sweeper(self: &Arc<Self>, shutdown: CancellationToken) {
        let limiter = Arc::clone(self);
        let period = self.config.window.max(Duration::from_secs(1));
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.tick().await;
            loop {
                tokio::select! {
                    _ = interval.tick() => {
                        let removed = limiter.purge_expired();
                        if removed > 0 {
                            tracing::debug!(removed, "Purged expired rate limit windows");
                        }
                    }
                    _ = shutdown.cancelled() => return,
                }
            }
        });
    }
}

/// Enforce the quota of the authenticated key.
///
/// Requests without an [`ApiKey`] extension are passed through uncounted.
pub async fn rate_limit(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let Some(key) = request.extensions().get::<ApiKey>().cloned() else {
        return next.run(request).await;
    };

    let decision = state.limiter.check(key.as_str());

    if !decision.allowed {
        tracing::warn!(
            key = %key,
            path = %request.uri().path(),
            limit = decision.limit,
            "Rate limit exceeded"
        );
        let retry_after = decision.reset_at.to_rfc3339_opts(SecondsFormat::Millis, true);
        let mut response = ApiError::too_many_requests(retry_after).into_response();
        decision.write_headers(response.headers_mut());
        response.headers_mut().insert(
            axum::http::header::RETRY_AFTER,
            HeaderValue::from(decision.reset_secs()),
        );
        return response;
    }

    let mut response = next.run(request).await;
    decision.write_headers(response.headers_mut());
    response
}
