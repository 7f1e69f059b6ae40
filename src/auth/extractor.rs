// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Axum extractors for authenticated callers.
//!
//! ```rust,ignore
//! async fn my_handler(Auth(key): Auth) -> impl IntoResponse {
//!     // key is the caller's ApiKey
//! }
//! ```

use axum::{extract::FromRequestParts, http::request::Parts};

use super::{ApiKey, AuthError};
use crate::state::AppState;

/// The caller's API key, as set by [`super::middleware::require_api_key`].
///
/// Rejects with 401 when the middleware did not run for this route.
pub struct Auth(pub ApiKey);

impl FromRequestParts<AppState> for Auth {
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &AppState) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<ApiKey>()
            .cloned()
            .map(Auth)
            .ok_or(AuthError::MissingApiKey)
    }
}

/// Extractor that requires an admin key (`ADMIN_API_KEYS`).
pub struct AdminOnly(pub ApiKey);

impl FromRequestParts<AppState> for AdminOnly {
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let Auth(key) = Auth::from_request_parts(parts, state).await?;

        if !state.keys.is_admin(&key) {
            tracing::warn!(key = %key, "Admin route called without admin key");
            return Err(AuthError::InsufficientPermissions);
        }

        Ok(AdminOnly(key))
    }
}
