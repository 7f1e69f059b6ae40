// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Request gate layers that run after authentication.
//!
//! Order on `/api/v1`: [`crate::auth::require_api_key`] → [`rate_limit`] →
//! [`record_usage`] → handler.

pub mod rate_limit;
pub mod usage;

pub use rate_limit::{rate_limit, RateDecision, RateLimiter};
pub use usage::{endpoint_id, record_usage};
