// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Cache key builders.
//!
//! Addresses are rendered as lowercase hex so that checksummed and
//! lowercase spellings of one address share an entry.

use std::time::Duration;

use alloy::primitives::Address;
use chrono::NaiveDate;

/// Lifetime of a daily usage record.
pub const ANALYTICS_TTL: Duration = Duration::from_secs(86_400);

fn lower(address: &Address) -> String {
    address.to_string().to_lowercase()
}

/// `balance:{address}`
pub fn native_balance(address: &Address) -> String {
    format!("balance:{}", lower(address))
}

/// `token:{address}:{token}`
pub fn token_balance(address: &Address, token: &Address) -> String {
    format!("token:{}:{}", lower(address), lower(token))
}

/// `analytics:{api_key}:{yyyy-mm-dd}`
pub fn daily_usage(api_key: &str, date: NaiveDate) -> String {
    format!("analytics:{api_key}:{}", date.format("%Y-%m-%d"))
}
