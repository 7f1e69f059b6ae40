// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Path parameter validation.
//!
//! Addresses must be `0x` followed by exactly 40 hex digits, in any case.
//! Checksums are not verified. Validation runs before any cache or chain
//! access.

use std::str::FromStr;

use alloy::primitives::Address;
use axum::{
    extract::{FromRequestParts, Path},
    http::request::Parts,
};

use crate::error::ApiError;

const ADDRESS_HEX_LEN: usize = 40;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Invalid Ethereum address format for {field}")]
    InvalidAddress { field: &'static str },
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::validation(err.to_string())
    }
}

/// Parse an EVM address, naming `field` in the error.
pub fn parse_evm_address(field: &'static str, raw: &str) -> Result<Address, ValidationError> {
    let invalid = || ValidationError::InvalidAddress { field };

    let hex = raw.strip_prefix("0x").ok_or_else(invalid)?;
    if hex.len() != ADDRESS_HEX_LEN || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(invalid());
    }
    Address::from_str(raw).map_err(|_| invalid())
}

/// An address as supplied by the client, plus its parsed form.
#[derive(Debug, Clone)]
pub struct CheckedAddress {
    pub raw: String,
    pub address: Address,
}

impl CheckedAddress {
    fn parse(field: &'static str, raw: String) -> Result<Self, ValidationError> {
        let address = parse_evm_address(field, &raw)?;
        Ok(Self { raw, address })
    }
}

/// `/{address}` path parameter.
#[derive(Debug, Clone)]
pub struct ValidatedAddress(pub CheckedAddress);

impl<S: Send + Sync> FromRequestParts<S> for ValidatedAddress {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|e| ApiError::validation(e.body_text()))?;
        Ok(Self(CheckedAddress::parse("address", raw)?))
    }
}

/// `/{address}/{token_address}` path parameters.
#[derive(Debug, Clone)]
pub struct ValidatedTokenPair {
    pub holder: CheckedAddress,
    pub token: CheckedAddress,
}

impl<S: Send + Sync> FromRequestParts<S> for ValidatedTokenPair {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path((holder, token)) = Path::<(String, String)>::from_request_parts(parts, state)
            .await
            .map_err(|e| ApiError::validation(e.body_text()))?;
        Ok(Self {
            holder: CheckedAddress::parse("address", holder)?,
            token: CheckedAddress::parse("tokenAddress", token)?,
        })
    }
}
