// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Per-key usage analytics.
//!
//! Each authenticated request increments a daily record stored in the cache
//! under `analytics:{api_key}:{yyyy-mm-dd}` for 24 hours. A process-local
//! mirror keeps the same counters so reports still work when the cache is
//! unavailable. Both are best effort: concurrent increments may be lost.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};

use chrono::{Days, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::auth::mask_key;
use crate::cache::{keys, CacheStore};

/// Longest report window, in days.
pub const MAX_REPORT_DAYS: u32 = 90;

/// Report window used when the caller does not pick one.
pub const DEFAULT_REPORT_DAYS: u32 = 7;

/// Number of endpoints listed in a report summary.
const TOP_ENDPOINTS: usize = 5;

/// Request counters for one key on one day.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct UsageRecord {
    /// Requests made that day
    pub total: u64,
    /// Requests per endpoint (`"{METHOD} {route}"`)
    pub endpoints: BTreeMap<String, u64>,
}

impl UsageRecord {
    fn increment(&mut self, endpoint: &str) {
        self.total += 1;
        *self.endpoints.entry(endpoint.to_string()).or_insert(0) += 1;
    }
}

/// One day of a usage report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct DailyUsage {
    /// UTC day (`YYYY-MM-DD`)
    #[schema(value_type = String, example = "2024-01-15")]
    pub date: NaiveDate,
    #[serde(flatten)]
    pub usage: UsageRecord,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct EndpointCount {
    pub endpoint: String,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UsageSummary {
    /// Requests over the whole window
    pub total_requests: u64,
    /// `total_requests / days`, rounded to the nearest integer
    pub average_per_day: u64,
    /// Busiest endpoints, most used first
    pub most_used_endpoints: Vec<EndpointCount>,
}

/// Usage statistics for one API key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UsageReport {
    /// Masked API key
    #[schema(example = "abcd****")]
    pub api_key: String,
    #[schema(example = "7 days")]
    pub period: String,
    /// One entry per day, oldest first
    pub stats: Vec<DailyUsage>,
    pub summary: UsageSummary,
}

/// Records and reports per-key request counts.
pub struct AnalyticsService {
    cache: Arc<dyn CacheStore>,
    mirror: Mutex<HashMap<(String, NaiveDate), UsageRecord>>,
}

impl AnalyticsService {
    pub fn new(cache: Arc<dyn CacheStore>) -> Self {
        Self {
            cache,
            mirror: Mutex::new(HashMap::new()),
        }
    }

    /// Count one request by `api_key` against `endpoint` for today (UTC).
    ///
    /// Never fails; problems are logged.
    pub async fn track_request(&self, api_key: &str, endpoint: &str) {
        self.track_request_on(api_key, endpoint, Utc::now().date_naive()).await;
    }

    async fn track_request_on(&self, api_key: &str, endpoint: &str, date: NaiveDate) {
        let key = keys::daily_usage(api_key, date);

        let mut record = self.cached_record(&key).await.unwrap_or_default();
        record.increment(endpoint);

        match serde_json::to_value(&record) {
            Ok(value) => {
                if !self.cache.set(&key, &value, Some(keys::ANALYTICS_TTL)).await {
                    tracing::warn!(api_key = %mask_key(api_key), "Usage record not persisted");
                }
            }
            Err(e) => tracing::error!(error = %e, "Failed to encode usage record"),
        }

        match self.mirror.lock() {
            Ok(mut mirror) => {
                let oldest = date.checked_sub_days(Days::new(u64::from(MAX_REPORT_DAYS)));
                mirror.retain(|(_, day), _| oldest.map_or(true, |oldest| *day > oldest));
                mirror
                    .entry((api_key.to_string(), date))
                    .or_default()
                    .increment(endpoint);
            }
            Err(_) => tracing::error!("Usage mirror lock poisoned"),
        }
    }

    async fn cached_record(&self, key: &str) -> Option<UsageRecord> {
        let value = self.cache.get(key).await?;
        match serde_json::from_value(value) {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::warn!(error = %e, "Ignoring malformed usage record");
                None
            }
        }
    }

    fn mirrored_record(&self, api_key: &str, date: NaiveDate) -> Option<UsageRecord> {
        self.mirror
            .lock()
            .ok()?
            .get(&(api_key.to_string(), date))
            .cloned()
    }

    /// Usage of `api_key` over the last `days` days, today included.
    pub async fn usage_report(&self, api_key: &str, days: u32) -> UsageReport {
        self.usage_report_until(api_key, days, Utc::now().date_naive()).await
    }

    async fn usage_report_until(&self, api_key: &str, days: u32, today: NaiveDate) -> UsageReport {
        let days = days.clamp(1, MAX_REPORT_DAYS);

        let mut stats = Vec::with_capacity(days as usize);
        for offset in (0..days).rev() {
            let Some(date) = today.checked_sub_days(Days::new(u64::from(offset))) else {
                continue;
            };
            let usage = match self.cached_record(&keys::daily_usage(api_key, date)).await {
                Some(record) => record,
                None => self.mirrored_record(api_key, date).unwrap_or_default(),
            };
            stats.push(DailyUsage { date, usage });
        }

        let summary = summarize(&stats, days);
        UsageReport {
            api_key: mask_key(api_key),
            period: format!("{days} days"),
            stats,
            summary,
        }
    }
}

fn summarize(stats: &[DailyUsage], days: u32) -> UsageSummary {
    let total_requests: u64 = stats.iter().map(|day| day.usage.total).sum();
    let days = u64::from(days.max(1));
    let average_per_day = (total_requests + days / 2) / days;

    let mut totals: BTreeMap<&str, u64> = BTreeMap::new();
    for day in stats {
        for (endpoint, count) in &day.usage.endpoints {
            *totals.entry(endpoint.as_str()).or_insert(0) += count;
        }
    }

    let mut ranked: Vec<EndpointCount> = totals
        .into_iter()
        .map(|(endpoint, count)| EndpointCount {
            endpoint: endpoint.to_string(),
            count,
        })
        .collect();
    // Stable sort keeps the name order for ties.
    ranked.sort_by(|a, b| b.count.cmp(&a.count));
    ranked.truncate(TOP_ENDPOINTS);

    UsageSummary {
        total_requests,
        average_per_day,
        most_used_endpoints: ranked,
    }
}
