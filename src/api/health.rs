// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use utoipa::ToSchema;

use super::timestamp;
use crate::state::AppState;

/// Liveness response.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    #[schema(example = "ok")]
    pub status: String,
    /// Server time, RFC 3339 with milliseconds
    pub timestamp: String,
    #[schema(example = "production")]
    pub environment: String,
}

/// Readiness response with individual component status.
#[derive(Debug, Serialize, ToSchema)]
pub struct ReadyResponse {
    /// Overall status ("ok" or "degraded").
    pub status: String,
    pub timestamp: String,
    pub checks: HealthChecks,
}

/// Individual readiness check results.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthChecks {
    /// Chain RPC reachability ("ok" or "unavailable").
    pub chain: String,
    /// Latest block seen by the probe.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block_number: Option<u64>,
    /// Cache reachability ("ok" or "unavailable").
    pub cache: String,
    /// Cache backend in use ("local" or "redis").
    pub cache_backend: String,
}

fn status_label(ok: bool) -> String {
    if ok { "ok" } else { "unavailable" }.to_string()
}

/// Health check endpoint handler.
///
/// Always returns 200 while the process is serving requests.
#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    responses(
        (status = 200, description = "Service is running", body = HealthResponse)
    )
)]
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        timestamp: timestamp(),
        environment: state.environment.to_string(),
    })
}

/// Readiness probe handler.
///
/// Returns 200 only if the chain node and the cache both answer.
#[utoipa::path(
    get,
    path = "/health/ready",
    tag = "Health",
    responses(
        (status = 200, description = "Service is ready", body = ReadyResponse),
        (status = 503, description = "Service is not ready", body = ReadyResponse)
    )
)]
pub async fn readiness(State(state): State<AppState>) -> (StatusCode, Json<ReadyResponse>) {
    let (chain, cache_ok) = tokio::join!(state.balances.probe_chain(), state.balances.probe_cache());

    let block_number = match chain {
        Ok(block) => Some(block),
        Err(e) => {
            tracing::warn!(error = %e, "Readiness: chain probe failed");
            None
        }
    };
    let all_ok = block_number.is_some() && cache_ok;

    let response = ReadyResponse {
        status: if all_ok { "ok" } else { "degraded" }.to_string(),
        timestamp: timestamp(),
        checks: HealthChecks {
            chain: status_label(block_number.is_some()),
            block_number,
            cache: status_label(cache_ok),
            cache_backend: state.balances.cache_backend().to_string(),
        },
    };

    let status = if all_ok {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status, Json(response))
}
