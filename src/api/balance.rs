// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Balance query endpoints.

use axum::{
    extract::{OriginalUri, State},
    http::Method,
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

use super::timestamp;
use crate::{
    error::ApiError,
    service::TokenBalance,
    state::AppState,
    validation::{ValidatedAddress, ValidatedTokenPair},
};

/// Native balance response.
#[derive(Debug, Serialize, ToSchema)]
pub struct NativeBalanceResponse {
    /// Address as supplied in the request
    #[schema(example = "0x742d35Cc6634C0532925a3b844Bc9e7595f89026")]
    pub address: String,
    /// Balance in whole units
    #[schema(example = "1.5")]
    pub balance: String,
    #[schema(example = "CRO")]
    pub symbol: String,
    pub timestamp: String,
}

/// Token balance response.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TokenBalanceResponse {
    pub address: String,
    pub token_address: String,
    #[serde(flatten)]
    pub token: TokenBalance,
    pub timestamp: String,
}

/// Get the native CRO balance of an address.
#[utoipa::path(
    get,
    path = "/api/v1/balance/{address}",
    tag = "Balances",
    params(
        ("address" = String, Path, description = "Wallet address (0x + 40 hex)")
    ),
    security(("api_key" = [])),
    responses(
        (status = 200, description = "Balance retrieved successfully", body = NativeBalanceResponse),
        (status = 400, description = "Invalid address format", body = crate::error::ErrorBody),
        (status = 401, description = "Missing or invalid API key"),
        (status = 429, description = "Rate limit exceeded", body = crate::error::ErrorBody),
        (status = 503, description = "Blockchain RPC unavailable", body = crate::error::ErrorBody)
    )
)]
pub async fn get_native_balance(
    State(state): State<AppState>,
    method: Method,
    OriginalUri(uri): OriginalUri,
    ValidatedAddress(address): ValidatedAddress,
) -> Result<Json<NativeBalanceResponse>, ApiError> {
    let balance = state
        .balances
        .get_native_balance(address.address)
        .await
        .map_err(|e| state.service_error(method.as_str(), uri.path(), e))?;

    Ok(Json(NativeBalanceResponse {
        address: address.raw,
        balance,
        symbol: state.balances.network().native_symbol.to_string(),
        timestamp: timestamp(),
    }))
}

/// Get the ERC-20 token balance of an address.
///
/// Symbol and name fall back to `UNKNOWN` / `Unknown Token` when the
/// contract does not provide them.
#[utoipa::path(
    get,
    path = "/api/v1/token-balance/{address}/{token_address}",
    tag = "Balances",
    params(
        ("address" = String, Path, description = "Wallet address (0x + 40 hex)"),
        ("token_address" = String, Path, description = "Token contract address (0x + 40 hex)")
    ),
    security(("api_key" = [])),
    responses(
        (status = 200, description = "Balance retrieved successfully", body = TokenBalanceResponse),
        (status = 400, description = "Invalid address format or token contract", body = crate::error::ErrorBody),
        (status = 401, description = "Missing or invalid API key"),
        (status = 429, description = "Rate limit exceeded", body = crate::error::ErrorBody),
        (status = 503, description = "Blockchain RPC unavailable", body = crate::error::ErrorBody)
    )
)]
pub async fn get_token_balance(
    State(state): State<AppState>,
    method: Method,
    OriginalUri(uri): OriginalUri,
    pair: ValidatedTokenPair,
) -> Result<Json<TokenBalanceResponse>, ApiError> {
    let token = state
        .balances
        .get_token_balance(pair.holder.address, pair.token.address)
        .await
        .map_err(|e| state.service_error(method.as_str(), uri.path(), e))?;

    Ok(Json(TokenBalanceResponse {
        address: pair.holder.raw,
        token_address: pair.token.raw,
        token,
        timestamp: timestamp(),
    }))
}
