// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Usage statistics endpoint.

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    Json,
};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::{
    auth::Auth,
    error::ApiError,
    service::{
        analytics::{DEFAULT_REPORT_DAYS, MAX_REPORT_DAYS},
        UsageReport,
    },
    state::AppState,
};

/// Query parameters for the usage report.
#[derive(Debug, Deserialize, IntoParams)]
pub struct UsageQuery {
    /// Days to report, today included (1-90)
    #[param(default = 7, minimum = 1, maximum = 90)]
    pub days: Option<u32>,
}

/// Get request statistics for the calling API key.
#[utoipa::path(
    get,
    path = "/api/v1/analytics/usage",
    tag = "Analytics",
    params(UsageQuery),
    security(("api_key" = [])),
    responses(
        (status = 200, description = "Usage statistics", body = UsageReport),
        (status = 400, description = "Invalid days parameter", body = crate::error::ErrorBody),
        (status = 401, description = "Missing or invalid API key")
    )
)]
pub async fn get_usage(
    State(state): State<AppState>,
    Auth(key): Auth,
    query: Result<Query<UsageQuery>, QueryRejection>,
) -> Result<Json<UsageReport>, ApiError> {
    let Query(query) = query.map_err(|e| ApiError::validation(e.body_text()))?;
    let days = query.days.unwrap_or(DEFAULT_REPORT_DAYS);

    if !(1..=MAX_REPORT_DAYS).contains(&days) {
        return Err(ApiError::validation(format!(
            "days must be between 1 and {MAX_REPORT_DAYS}"
        )));
    }

    Ok(Json(state.analytics.usage_report(key.as_str(), days).await))
}
