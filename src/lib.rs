// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Balance Gateway - read-only Cronos / EVM balance API
//!
//! Serves native and ERC-20 balances over HTTP, behind API-key
//! authentication and per-key rate limiting, with a local or Redis result
//! cache and per-key usage statistics.
//!
//! ## Modules
//!
//! - `api` - HTTP API handlers and router (Axum)
//! - `auth` - API key authentication
//! - `blockchain` - Cronos JSON-RPC reads (alloy)
//! - `cache` - Result cache backends (LRU / Redis)
//! - `middleware` - Rate limiting and usage recording
//! - `service` - Balance resolution and usage analytics

pub mod api;
pub mod auth;
pub mod blockchain;
pub mod cache;
pub mod config;
pub mod error;
pub mod middleware;
pub mod service;
pub mod state;
pub mod validation;

#[cfg(test)]
pub(crate) mod testing;
