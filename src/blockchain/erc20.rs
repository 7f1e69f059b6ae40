// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! ERC-20 (CRC-20 on Cronos) read-only contract interactions.

use alloy::{
    primitives::{Address, U256},
    providers::Provider,
    sol,
};

use super::client::ChainError;

// Only the view functions the gateway reads.
sol! {
    #[sol(rpc)]
    interface IERC20 {
        function name() external view returns (string);
        function symbol() external view returns (string);
        function decimals() external view returns (uint8);
        function balanceOf(address account) external view returns (uint256);
    }
}

/// ERC-20 contract wrapper.
pub struct Erc20Contract<P> {
    contract: IERC20::IERC20Instance<P>,
}

impl<P: Provider + Clone> Erc20Contract<P> {
    /// Bind the interface to a token contract address.
    pub fn new(provider: &P, token: Address) -> Self {
        Self {
            contract: IERC20::new(token, provider.clone()),
        }
    }

    /// Get the token name.
    pub async fn name(&self) -> Result<String, ChainError> {
        let result = self.contract.name().call().await?;
        Ok(result.to_string())
    }

    /// Get the token symbol.
    pub async fn symbol(&self) -> Result<String, ChainError> {
        let result = self.contract.symbol().call().await?;
        Ok(result.to_string())
    }

    /// Get the token decimals.
    pub async fn decimals(&self) -> Result<u8, ChainError> {
        Ok(self.contract.decimals().call().await?)
    }

    /// Get the raw balance of a holder in the token's base unit.
    pub async fn balance_of(&self, holder: Address) -> Result<U256, ChainError> {
        Ok(self.contract.balanceOf(holder).call().await?)
    }
}
