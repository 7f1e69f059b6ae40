// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Balance resolution.
//!
//! Every lookup reads the cache first and falls back to the chain on a miss,
//! writing the fresh value back with the default TTL. Identical concurrent
//! misses each hit the chain; the last write wins.

use std::sync::Arc;

use alloy::primitives::Address;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

use crate::{
    blockchain::{format_units, ChainError, ChainReader, NetworkConfig},
    cache::{keys, CacheStore},
};

/// Symbol reported when the token's `symbol()` call fails.
pub const UNKNOWN_SYMBOL: &str = "UNKNOWN";

/// Name reported when the token's `name()` call fails.
pub const UNKNOWN_NAME: &str = "Unknown Token";

/// Token balance as stored in the cache.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TokenBalance {
    /// Balance shifted by `decimals`
    #[schema(example = "1000.5")]
    pub balance: String,
    /// Token decimals
    #[schema(example = 6)]
    pub decimals: u8,
    /// Token symbol, or `UNKNOWN`
    #[schema(example = "USDC")]
    pub symbol: String,
    /// Token name, or `Unknown Token`
    #[schema(example = "USD Coin")]
    pub name: String,
    /// Balance in the token's base unit
    #[schema(example = "1000500000")]
    pub raw_balance: String,
}

/// Balance lookup failures.
#[derive(Debug, Clone, thiserror::Error)]
pub enum BalanceError {
    /// The chain node could not be reached.
    #[error("Blockchain RPC unavailable: {0}")]
    Unavailable(String),

    /// The token address is not a readable ERC-20 contract.
    #[error("Invalid token contract: {0}")]
    InvalidContract(String),

    #[error("Chain read failed: {0}")]
    Chain(String),
}

impl From<ChainError> for BalanceError {
    fn from(err: ChainError) -> Self {
        match err {
            ChainError::Unavailable(msg) => BalanceError::Unavailable(msg),
            ChainError::Contract(msg) => BalanceError::InvalidContract(msg),
            ChainError::InvalidRpcUrl(msg) | ChainError::Rpc(msg) => BalanceError::Chain(msg),
        }
    }
}

/// How a failed token field read is handled.
enum FieldPolicy<T> {
    /// The failure aborts the lookup.
    Required,
    /// The failure is logged and replaced by the given value.
    OrDefault(T),
}

impl<T> FieldPolicy<T> {
    fn apply(
        self,
        field: &'static str,
        token: &Address,
        result: Result<T, ChainError>,
    ) -> Result<T, ChainError> {
        match (result, self) {
            (Ok(value), _) => Ok(value),
            (Err(err), FieldPolicy::Required) => Err(err),
            (Err(err), FieldPolicy::OrDefault(fallback)) => {
                tracing::warn!(%token, field, error = %err, "Token metadata read failed, using fallback");
                Ok(fallback)
            }
        }
    }
}

/// Cache-first balance lookups against one network.
pub struct BalanceService {
    cache: Arc<dyn CacheStore>,
    chain: Arc<dyn ChainReader>,
}

impl BalanceService {
    pub fn new(cache: Arc<dyn CacheStore>, chain: Arc<dyn ChainReader>) -> Self {
        Self { cache, chain }
    }

    pub fn network(&self) -> &NetworkConfig {
        self.chain.network()
    }

    /// Native balance of `address`, formatted with the network's decimals.
    ///
    /// A cached string is returned as-is (the empty string included). Any
    /// other cached JSON type counts as a miss.
    pub async fn get_native_balance(&self, address: Address) -> Result<String, BalanceError> {
        let key = keys::native_balance(&address);

        if let Some(Value::String(balance)) = self.cache.get(&key).await {
            tracing::debug!(%address, "Native balance cache hit");
            return Ok(balance);
        }

        let raw = self.chain.native_balance(address).await?;
        let balance = format_units(raw, self.network().native_decimals);

        if !self.cache.set(&key, &Value::String(balance.clone()), None).await {
            tracing::debug!(%address, "Native balance not cached");
        }
        Ok(balance)
    }

    /// Balance of `holder` in the ERC-20 token at `token`.
    ///
    /// Balance and decimals are required; a failed symbol or name read is
    /// replaced by [`UNKNOWN_SYMBOL`] / [`UNKNOWN_NAME`].
    pub async fn get_token_balance(
        &self,
        holder: Address,
        token: Address,
    ) -> Result<TokenBalance, BalanceError> {
        let key = keys::token_balance(&holder, &token);

        if let Some(cached) = self.cached_token_balance(&key).await {
            tracing::debug!(%holder, %token, "Token balance cache hit");
            return Ok(cached);
        }

        let (raw, decimals, symbol, name) = tokio::join!(
            self.chain.token_balance_of(token, holder),
            self.chain.token_decimals(token),
            self.chain.token_symbol(token),
            self.chain.token_name(token),
        );

        let raw = FieldPolicy::Required.apply("balanceOf", &token, raw)?;
        let decimals = FieldPolicy::Required.apply("decimals", &token, decimals)?;
        let symbol = FieldPolicy::OrDefault(UNKNOWN_SYMBOL.to_string()).apply("symbol", &token, symbol)?;
        let name = FieldPolicy::OrDefault(UNKNOWN_NAME.to_string()).apply("name", &token, name)?;

        let balance = TokenBalance {
            balance: format_units(raw, decimals),
            decimals,
            symbol,
            name,
            raw_balance: raw.to_string(),
        };

        match serde_json::to_value(&balance) {
            Ok(value) => {
                self.cache.set(&key, &value, None).await;
            }
            Err(e) => tracing::error!(error = %e, "Failed to encode token balance for cache"),
        }
        Ok(balance)
    }

    async fn cached_token_balance(&self, key: &str) -> Option<TokenBalance> {
        match self.cache.get(key).await? {
            Value::Object(map) if !map.is_empty() => {
                serde_json::from_value(Value::Object(map)).ok()
            }
            _ => None,
        }
    }

    /// Drop every cached entry. Returns whether the backend confirmed it.
    pub async fn clear_cache(&self) -> bool {
        let cleared = self.cache.flush().await;
        tracing::info!(backend = self.cache.backend(), cleared, "Cache cleared");
        cleared
    }

    /// Latest block number, for readiness checks.
    pub async fn probe_chain(&self) -> Result<u64, BalanceError> {
        Ok(self.chain.block_number().await?)
    }

    /// Whether the cache backend answers, for readiness checks.
    pub async fn probe_cache(&self) -> bool {
        self.cache.ping().await
    }

    pub fn cache_backend(&self) -> &'static str {
        self.cache.backend()
    }
}
