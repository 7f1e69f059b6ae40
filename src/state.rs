// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use crate::{
    auth::ApiKeySet,
    blockchain::ChainReader,
    cache::CacheStore,
    config::{AppConfig, Environment},
    error::ApiError,
    middleware::RateLimiter,
    service::{AnalyticsService, BalanceError, BalanceService},
};

/// Shared handles passed to every handler and middleware.
#[derive(Clone)]
pub struct AppState {
    pub balances: Arc<BalanceService>,
    pub analytics: Arc<AnalyticsService>,
    pub limiter: Arc<RateLimiter>,
    pub keys: Arc<ApiKeySet>,
    pub environment: Environment,
}

impl AppState {
    /// Wire the services around an already-built cache and chain reader.
    pub fn new(config: &AppConfig, cache: Arc<dyn CacheStore>, chain: Arc<dyn ChainReader>) -> Self {
        Self {
            balances: Arc::new(BalanceService::new(cache.clone(), chain)),
            analytics: Arc::new(AnalyticsService::new(cache)),
            limiter: Arc::new(RateLimiter::new(config.rate_limit)),
            keys: Arc::new(ApiKeySet::new(
                config.api_keys.iter().cloned(),
                config.admin_api_keys.iter().cloned(),
            )),
            environment: config.environment,
        }
    }

    /// Translate a service failure, logging it with the request route.
    pub fn service_error(&self, method: &str, path: &str, err: BalanceError) -> ApiError {
        tracing::error!(method, path, error = %err, "Balance lookup failed");
        ApiError::from_service(err, self.environment.is_development())
    }
}
