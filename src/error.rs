// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! HTTP error responses.
//!
//! Every failure leaves the API as `{error, message}` where `error` is a
//! short title for the status. Rate-limit rejections add `retryAfter`;
//! internal errors add `details` in development mode only.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::service::BalanceError;

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub title: &'static str,
    pub message: String,
    pub retry_after: Option<String>,
    pub details: Option<String>,
}

/// Error response body.
#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    #[schema(example = "Validation Error")]
    error: String,
    #[schema(example = "Invalid Ethereum address format")]
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    retry_after: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl ApiError {
    pub fn new(status: StatusCode, title: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            title,
            message: message.into(),
            retry_after: None,
            details: None,
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "Validation Error", message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, "Not Found", message)
    }

    /// 429 with the RFC 3339 time at which the quota resets.
    pub fn too_many_requests(retry_after: impl Into<String>) -> Self {
        Self {
            retry_after: Some(retry_after.into()),
            ..Self::new(
                StatusCode::TOO_MANY_REQUESTS,
                "Too Many Requests",
                "Rate limit exceeded. Please try again later.",
            )
        }
    }

    pub fn service_unavailable() -> Self {
        Self::new(
            StatusCode::SERVICE_UNAVAILABLE,
            "Service Unavailable",
            "Unable to connect to blockchain RPC",
        )
    }

    pub fn contract() -> Self {
        Self::new(
            StatusCode::BAD_REQUEST,
            "Contract Error",
            "Invalid contract address or contract call failed",
        )
    }

    /// 500. `details` is only rendered when given.
    pub fn internal(details: Option<String>) -> Self {
        Self {
            details,
            ..Self::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal Server Error",
                "An unexpected error occurred",
            )
        }
    }

    /// Map a service failure to its HTTP response.
    ///
    /// Internal error text is only included when `expose_details` is set.
    pub fn from_service(err: BalanceError, expose_details: bool) -> Self {
        match err {
            BalanceError::Unavailable(_) => Self::service_unavailable(),
            BalanceError::InvalidContract(_) => Self::contract(),
            BalanceError::Chain(_) => Self::internal(expose_details.then(|| err.to_string())),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(ErrorBody {
            error: self.title.to_string(),
            message: self.message,
            retry_after: self.retry_after,
            details: self.details,
        });
        (self.status, body).into_response()
    }
}
