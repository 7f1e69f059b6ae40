// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authentication errors.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Authentication error type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    /// No `x-api-key` header present
    #[error("API key is required")]
    MissingApiKey,
    /// Header present but the key is not configured
    #[error("Invalid API key")]
    InvalidApiKey,
    /// Key is valid but not allowed on this route
    #[error("Admin API key required")]
    InsufficientPermissions,
}

#[derive(Serialize)]
struct AuthErrorBody {
    error: &'static str,
    message: String,
    error_code: &'static str,
}

impl AuthError {
    /// Get the error code for this error.
    pub fn error_code(&self) -> &'static str {
        match self {
            AuthError::MissingApiKey => "missing_api_key",
            AuthError::InvalidApiKey => "invalid_api_key",
            AuthError::InsufficientPermissions => "insufficient_permissions",
        }
    }

    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::MissingApiKey | AuthError::InvalidApiKey => StatusCode::UNAUTHORIZED,
            AuthError::InsufficientPermissions => StatusCode::FORBIDDEN,
        }
    }

    fn title(&self) -> &'static str {
        match self.status_code() {
            StatusCode::FORBIDDEN => "Forbidden",
            _ => "Unauthorized",
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(AuthErrorBody {
            error: self.title(),
            message: self.to_string(),
            error_code: self.error_code(),
        });
        (status, body).into_response()
    }
}
