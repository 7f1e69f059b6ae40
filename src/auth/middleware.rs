// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! API key authentication middleware.
//!
//! Applied to the whole `/api/v1` subtree with
//! `axum::middleware::from_fn_with_state`. On success the [`ApiKey`] is added
//! to the request extensions for the layers and handlers behind it.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};

use super::{mask_key, ApiKey, AuthError};
use crate::state::AppState;

/// Header carrying the client's API key.
pub const API_KEY_HEADER: &str = "x-api-key";

/// Reject requests without a configured `x-api-key`.
pub async fn require_api_key(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let header = match request.headers().get(API_KEY_HEADER) {
        Some(value) if !value.is_empty() => value,
        _ => return AuthError::MissingApiKey.into_response(),
    };

    let key = match header.to_str() {
        Ok(key) if state.keys.is_valid(key) => ApiKey::new(key),
        Ok(key) => {
            tracing::warn!(
                key = %mask_key(key),
                path = %request.uri().path(),
                "Invalid API key attempt"
            );
            return AuthError::InvalidApiKey.into_response();
        }
        Err(_) => {
            tracing::warn!(path = %request.uri().path(), "Non-ASCII API key header");
            return AuthError::InvalidApiKey.into_response();
        }
    };

    request.extensions_mut().insert(key);
    next.run(request).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{state_with, MockChain};
    use axum::{body::Body, http::StatusCode, middleware, routing::get, Extension, Router};
    use tower::ServiceExt;

    async fn echo(Extension(key): Extension<ApiKey>) -> String {
        key.as_str().to_string()
    }

    fn app() -> Router {
        let state = state_with(MockChain::default());
        Router::new()
            .route("/protected", get(echo))
            .layer(middleware::from_fn_with_state(state.clone(), require_api_key))
            .with_state(state)
    }

    fn request(key: Option<&str>) -> axum::http::Request<Body> {
        let mut builder = axum::http::Request::builder().uri("/protected");
        if let Some(key) = key {
            builder = builder.header(API_KEY_HEADER, key);
        }
        builder.body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn valid_key_reaches_handler() {
        let response = app().oneshot(request(Some("test-key"))).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"test-key");
    }

    #[tokio::test]
    async fn missing_or_empty_key_is_rejected() {
        let response = app().oneshot(request(None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let response = app().oneshot(request(Some(""))).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn unknown_key_is_rejected() {
        let response = app().oneshot(request(Some("nope"))).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
