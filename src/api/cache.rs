// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Cache administration.

use axum::{extract::State, Json};
use serde::Serialize;
use utoipa::ToSchema;

use super::timestamp;
use crate::{auth::AdminOnly, state::AppState};

#[derive(Debug, Serialize, ToSchema)]
pub struct ClearCacheResponse {
    /// Whether the backend confirmed the flush
    pub cleared: bool,
    pub timestamp: String,
}

/// Remove every cached entry, usage records included.
#[utoipa::path(
    delete,
    path = "/api/v1/cache",
    tag = "Admin",
    security(("api_key" = [])),
    responses(
        (status = 200, description = "Flush attempted", body = ClearCacheResponse),
        (status = 401, description = "Missing or invalid API key"),
        (status = 403, description = "Key is not an admin key")
    )
)]
pub async fn clear_cache(
    State(state): State<AppState>,
    AdminOnly(key): AdminOnly,
) -> Json<ClearCacheResponse> {
    tracing::info!(key = %key, "Cache clear requested");
    let cleared = state.balances.clear_cache().await;
    Json(ClearCacheResponse {
        cleared,
        timestamp: timestamp(),
    })
}
