// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Per-request usage recording.

use axum::{
    extract::{MatchedPath, Request, State},
    middleware::Next,
    response::Response,
};

use crate::{auth::ApiKey, state::AppState};

/// Endpoint identifier used in usage records: `"{METHOD} {route}"`.
///
/// The route template is used when the request matched one, so
/// `/api/v1/balance/0xabc...` counts as `GET /api/v1/balance/{address}`.
pub fn endpoint_id(request: &Request) -> String {
    let path = request
        .extensions()
        .get::<MatchedPath>()
        .map(|matched| matched.as_str().to_string())
        .unwrap_or_else(|| request.uri().path().to_string());
    format!("{} {}", request.method(), path)
}

/// Record the request against the caller's key without delaying it.
pub async fn record_usage(State(state): State<AppState>, request: Request, next: Next) -> Response {
    if let Some(key) = request.extensions().get::<ApiKey>().cloned() {
        let endpoint = endpoint_id(&request);
        let analytics = state.analytics.clone();
        tokio::spawn(async move {
            analytics.track_request(key.as_str(), &endpoint).await;
        });
    }
    next.run(request).await
}
