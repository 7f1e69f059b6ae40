// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Chain node client for read-only balance queries.

use std::{future::Future, time::Duration};

use alloy::{
    network::Ethereum,
    primitives::{Address, U256},
    providers::{
        fillers::{BlobGasFiller, ChainIdFiller, FillProvider, GasFiller, JoinFill, NonceFiller},
        Identity, Provider, ProviderBuilder, RootProvider,
    },
    transports::{RpcError, TransportError},
};
use async_trait::async_trait;

use super::erc20::Erc20Contract;
use super::types::NetworkConfig;

/// JSON-RPC error code returned by nodes for reverted `eth_call`s.
const EXECUTION_REVERTED_CODE: i64 = 3;

/// HTTP provider type (with the default fillers).
type HttpProvider = FillProvider<
    JoinFill<
        Identity,
        JoinFill<GasFiller, JoinFill<BlobGasFiller, JoinFill<NonceFiller, ChainIdFiller>>>,
    >,
    RootProvider<Ethereum>,
>;

/// Read operations the balance service needs from a chain node.
///
/// `ChainClient` is the production implementation; tests substitute
/// in-memory doubles.
#[async_trait]
pub trait ChainReader: Send + Sync {
    /// Network this reader is connected to.
    fn network(&self) -> &NetworkConfig;

    /// Native currency balance in base units.
    async fn native_balance(&self, address: Address) -> Result<U256, ChainError>;

    /// `balanceOf(holder)` on a token contract.
    async fn token_balance_of(&self, token: Address, holder: Address) -> Result<U256, ChainError>;

    /// `decimals()` on a token contract.
    async fn token_decimals(&self, token: Address) -> Result<u8, ChainError>;

    /// `symbol()` on a token contract.
    async fn token_symbol(&self, token: Address) -> Result<String, ChainError>;

    /// `name()` on a token contract.
    async fn token_name(&self, token: Address) -> Result<String, ChainError>;

    /// Latest block number, used as a reachability probe.
    async fn block_number(&self) -> Result<u64, ChainError>;
}

/// Chain node client backed by an alloy HTTP provider.
pub struct ChainClient {
    /// Network configuration
    network: NetworkConfig,
    /// Alloy HTTP provider
    provider: HttpProvider,
    /// Upper bound for a single RPC round trip
    timeout: Duration,
}

impl ChainClient {
    /// Create a client for `network` talking to `rpc_url`.
    ///
    /// No request is sent here; an unreachable node only shows up on the
    /// first read.
    pub fn new(network: NetworkConfig, rpc_url: &str, timeout: Duration) -> Result<Self, ChainError> {
        let url: url::Url = rpc_url
            .parse()
            .map_err(|e: url::ParseError| ChainError::InvalidRpcUrl(e.to_string()))?;

        let provider = ProviderBuilder::new().connect_http(url);

        Ok(Self {
            network,
            provider,
            timeout,
        })
    }

    fn token(&self, token: Address) -> Erc20Contract<HttpProvider> {
        Erc20Contract::new(&self.provider, token)
    }

    /// Run a read with the configured timeout.
    async fn bounded<T>(
        &self,
        request: impl Future<Output = Result<T, ChainError>>,
    ) -> Result<T, ChainError> {
        tokio::time::timeout(self.timeout, request)
            .await
            .map_err(|_| {
                ChainError::Unavailable(format!(
                    "request timed out after {}ms",
                    self.timeout.as_millis()
                ))
            })?
    }
}

#[async_trait]
impl ChainReader for ChainClient {
    fn network(&self) -> &NetworkConfig {
        &self.network
    }

    async fn native_balance(&self, address: Address) -> Result<U256, ChainError> {
        self.bounded(async {
            self.provider
                .get_balance(address)
                .await
                .map_err(|e| ChainError::from_transport(e, false))
        })
        .await
    }

    async fn token_balance_of(&self, token: Address, holder: Address) -> Result<U256, ChainError> {
        self.bounded(self.token(token).balance_of(holder)).await
    }

    async fn token_decimals(&self, token: Address) -> Result<u8, ChainError> {
        self.bounded(self.token(token).decimals()).await
    }

    async fn token_symbol(&self, token: Address) -> Result<String, ChainError> {
        self.bounded(self.token(token).symbol()).await
    }

    async fn token_name(&self, token: Address) -> Result<String, ChainError> {
        self.bounded(self.token(token).name()).await
    }

    async fn block_number(&self) -> Result<u64, ChainError> {
        self.bounded(async {
            self.provider
                .get_block_number()
                .await
                .map_err(|e| ChainError::from_transport(e, false))
        })
        .await
    }
}

/// Errors that can occur during blockchain reads.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ChainError {
    #[error("Invalid RPC URL: {0}")]
    InvalidRpcUrl(String),

    /// The node could not be reached or did not answer in time.
    #[error("RPC endpoint unavailable: {0}")]
    Unavailable(String),

    /// The call reached the node but the target is not a usable contract.
    #[error("Contract error: {0}")]
    Contract(String),

    #[error("RPC error: {0}")]
    Rpc(String),
}

impl ChainError {
    /// Classify a transport-level failure.
    ///
    /// `contract_call` marks `eth_call` requests, where a revert response
    /// means the target address does not behave like the expected contract.
    pub fn from_transport(err: TransportError, contract_call: bool) -> Self {
        match &err {
            RpcError::Transport(_) => ChainError::Unavailable(err.to_string()),
            RpcError::ErrorResp(payload) if contract_call && is_revert(payload.code, &payload.message) => {
                ChainError::Contract(payload.message.to_string())
            }
            _ => ChainError::Rpc(err.to_string()),
        }
    }
}

fn is_revert(code: i64, message: &str) -> bool {
    code == EXECUTION_REVERTED_CODE || message.to_ascii_lowercase().contains("revert")
}

impl From<alloy::contract::Error> for ChainError {
    fn from(err: alloy::contract::Error) -> Self {
        match err {
            alloy::contract::Error::TransportError(e) => ChainError::from_transport(e, true),
            // Empty or undecodable return data: nothing ERC-20 shaped lives there.
            other => ChainError::Contract(other.to_string()),
        }
    }
}
