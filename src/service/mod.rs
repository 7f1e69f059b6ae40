// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Services
//!
//! Business logic shared by the HTTP handlers and middleware.
//!
//! - [`BalanceService`]: cache-first native and token balance lookups
//! - [`AnalyticsService`]: per-key daily request counters and usage reports

pub mod analytics;
pub mod balance;

pub use analytics::{AnalyticsService, DailyUsage, EndpointCount, UsageRecord, UsageReport, UsageSummary};
pub use balance::{BalanceError, BalanceService, TokenBalance, UNKNOWN_NAME, UNKNOWN_SYMBOL};
