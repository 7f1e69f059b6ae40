// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Test doubles and router helpers.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use alloy::primitives::{Address, U256};
use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    response::Response,
    Router,
};
use serde_json::Value;
use tower::ServiceExt;

use crate::{
    api,
    auth::API_KEY_HEADER,
    blockchain::{ChainError, ChainReader, NetworkConfig, CRONOS_MAINNET},
    cache::{CacheStore, LocalCache},
    config::{AppConfig, RateLimitConfig, ADMIN_API_KEYS_ENV, API_KEYS_ENV},
    state::AppState,
};

/// Chain reader returning canned results and counting calls.
pub(crate) struct MockChain {
    network: NetworkConfig,
    native: Result<U256, ChainError>,
    token_balance: Result<U256, ChainError>,
    decimals: Result<u8, ChainError>,
    symbol: Result<String, ChainError>,
    name: Result<String, ChainError>,
    block: Result<u64, ChainError>,
    pub native_calls: AtomicUsize,
    pub token_balance_calls: AtomicUsize,
    pub metadata_calls: AtomicUsize,
}

impl Default for MockChain {
    fn default() -> Self {
        Self {
            network: CRONOS_MAINNET,
            native: Ok(U256::ZERO),
            token_balance: Ok(U256::ZERO),
            decimals: Ok(18),
            symbol: Ok("TKN".to_string()),
            name: Ok("Token".to_string()),
            block: Ok(1),
            native_calls: AtomicUsize::new(0),
            token_balance_calls: AtomicUsize::new(0),
            metadata_calls: AtomicUsize::new(0),
        }
    }
}

impl MockChain {
    pub fn with_native(mut self, balance: U256) -> Self {
        self.native = Ok(balance);
        self
    }

    pub fn with_native_error(mut self, err: ChainError) -> Self {
        self.native = Err(err);
        self
    }

    pub fn with_token(mut self, balance: U256, decimals: u8, symbol: &str, name: &str) -> Self {
        self.token_balance = Ok(balance);
        self.decimals = Ok(decimals);
        self.symbol = Ok(symbol.to_string());
        self.name = Ok(name.to_string());
        self
    }

    pub fn with_token_balance_error(mut self, err: ChainError) -> Self {
        self.token_balance = Err(err);
        self
    }

    pub fn with_decimals_error(mut self, err: ChainError) -> Self {
        self.decimals = Err(err);
        self
    }

    pub fn with_symbol_error(mut self, err: ChainError) -> Self {
        self.symbol = Err(err);
        self
    }

    pub fn with_name_error(mut self, err: ChainError) -> Self {
        self.name = Err(err);
        self
    }

    pub fn with_block(mut self, block: u64) -> Self {
        self.block = Ok(block);
        self
    }

    /// Balance and metadata reads made so far (readiness probes excluded).
    pub fn total_calls(&self) -> usize {
        self.native_calls.load(Ordering::SeqCst)
            + self.token_balance_calls.load(Ordering::SeqCst)
            + self.metadata_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ChainReader for MockChain {
    fn network(&self) -> &NetworkConfig {
        &self.network
    }

    async fn native_balance(&self, _address: Address) -> Result<U256, ChainError> {
        self.native_calls.fetch_add(1, Ordering::SeqCst);
        self.native.clone()
    }

    async fn token_balance_of(&self, _token: Address, _holder: Address) -> Result<U256, ChainError> {
        self.token_balance_calls.fetch_add(1, Ordering::SeqCst);
        self.token_balance.clone()
    }

    async fn token_decimals(&self, _token: Address) -> Result<u8, ChainError> {
        self.metadata_calls.fetch_add(1, Ordering::SeqCst);
        self.decimals.clone()
    }

    async fn token_symbol(&self, _token: Address) -> Result<String, ChainError> {
        self.metadata_calls.fetch_add(1, Ordering::SeqCst);
        self.symbol.clone()
    }

    async fn token_name(&self, _token: Address) -> Result<String, ChainError> {
        self.metadata_calls.fetch_add(1, Ordering::SeqCst);
        self.name.clone()
    }

    async fn block_number(&self) -> Result<u64, ChainError> {
        self.block.clone()
    }
}

/// Cache whose backend is permanently unreachable.
pub(crate) struct FailingCache;

#[async_trait]
impl CacheStore for FailingCache {
    fn backend(&self) -> &'static str {
        "failing"
    }

    async fn get(&self, _key: &str) -> Option<Value> {
        None
    }

    async fn set(&self, _key: &str, _value: &Value, _ttl: Option<Duration>) -> bool {
        false
    }

    async fn delete(&self, _key: &str) -> bool {
        false
    }

    async fn flush(&self) -> bool {
        false
    }

    async fn ping(&self) -> bool {
        false
    }
}

/// Config with `test-key` (regular) and `admin-key` (admin) configured.
pub(crate) fn test_config(rate_limit: RateLimitConfig) -> AppConfig {
    let mut config = AppConfig::from_lookup(|name| match name {
        API_KEYS_ENV => Some("test-key,admin-key".to_string()),
        ADMIN_API_KEYS_ENV => Some("admin-key".to_string()),
        _ => None,
    })
    .unwrap();
    config.rate_limit = rate_limit;
    config
}

/// State over `chain` with a fresh local cache and default limits.
pub(crate) fn state_with(chain: MockChain) -> AppState {
    let cache = Arc::new(LocalCache::new(1_000, Duration::from_secs(300)));
    AppState::new(&test_config(RateLimitConfig::default()), cache, Arc::new(chain))
}

pub(crate) fn router_with(
    chain: Arc<MockChain>,
    cache: Arc<dyn CacheStore>,
    rate_limit: RateLimitConfig,
) -> Router {
    api::router(AppState::new(&test_config(rate_limit), cache, chain))
}

pub(crate) fn request(method: &str, path: &str, api_key: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(path);
    if let Some(key) = api_key {
        builder = builder.header(API_KEY_HEADER, key);
    }
    builder.body(Body::empty()).unwrap()
}

pub(crate) fn get_req(path: &str, api_key: Option<&str>) -> Request<Body> {
    request("GET", path, api_key)
}

pub(crate) async fn call(app: Router, request: Request<Body>) -> Response {
    app.oneshot(request).await.unwrap()
}

pub(crate) async fn read_json(response: Response) -> (StatusCode, Value) {
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

pub(crate) async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    read_json(call(app, request).await).await
}
