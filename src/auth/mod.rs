// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Authentication Module
//!
//! Static API key authentication for the gateway API.
//!
//! ## Auth Flow
//!
//! 1. Client sends `x-api-key: <key>`
//! 2. [`middleware::require_api_key`] checks it against `API_KEYS`:
//!    - missing or empty header → 401 `API key is required`
//!    - unknown key → 401 `Invalid API key` (logged, key masked)
//! 3. The accepted [`ApiKey`] is stored in request extensions, where rate
//!    limiting, usage tracking and the [`Auth`] / [`AdminOnly`] extractors
//!    pick it up
//!
//! Health endpoints are mounted outside the authenticated subtree.

pub mod api_key;
pub mod error;
pub mod extractor;
pub mod middleware;

pub use api_key::{mask_key, ApiKey, ApiKeySet};
pub use error::AuthError;
pub use extractor::{AdminOnly, Auth};
pub use middleware::{require_api_key, API_KEY_HEADER};
