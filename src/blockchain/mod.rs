// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Blockchain integration module for Cronos (EVM).
//!
//! This module provides functionality for:
//! - Querying native CRO balances
//! - Reading ERC-20 / CRC-20 token balances and metadata
//! - Probing node reachability

pub mod client;
pub mod erc20;
pub mod types;

pub use client::{ChainClient, ChainError, ChainReader};
pub use types::*;
