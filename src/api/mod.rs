// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    http::{HeaderName, Method, Uri},
    middleware::from_fn_with_state,
    routing::{delete, get},
    Router,
};
use chrono::{SecondsFormat, Utc};
use tower::ServiceBuilder;
use tower_http::{
    cors::CorsLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use utoipa::{
    openapi::security::{ApiKey, ApiKeyValue, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    auth::{require_api_key, API_KEY_HEADER},
    error::{ApiError, ErrorBody},
    middleware::{rate_limit, record_usage},
    service::{DailyUsage, EndpointCount, TokenBalance, UsageRecord, UsageReport, UsageSummary},
    state::AppState,
};

pub mod analytics;
pub mod balance;
pub mod cache;
pub mod health;

const REQUEST_ID_HEADER: HeaderName = HeaderName::from_static("x-request-id");

/// Current time as RFC 3339 with millisecond precision and a `Z` suffix.
pub fn timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

async fn not_found(method: Method, uri: Uri) -> ApiError {
    ApiError::not_found(format!("Cannot {method} {}", uri.path()))
}

pub fn router(state: AppState) -> Router {
    // Layers run bottom-up: auth, then quota, then usage recording.
    let v1_routes = Router::new()
        .route("/balance/{address}", get(balance::get_native_balance))
        .route(
            "/token-balance/{address}/{token_address}",
            get(balance::get_token_balance),
        )
        .route("/analytics/usage", get(analytics::get_usage))
        .route("/cache", delete(cache::clear_cache))
        .fallback(not_found)
        .layer(from_fn_with_state(state.clone(), record_usage))
        .layer(from_fn_with_state(state.clone(), rate_limit))
        .layer(from_fn_with_state(state.clone(), require_api_key));

    Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        .nest("/api/v1", v1_routes)
        .fallback(not_found)
        .with_state(state)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(REQUEST_ID_HEADER, MakeRequestUuid))
                .layer(TraceLayer::new_for_http())
                .layer(PropagateRequestIdLayer::new(REQUEST_ID_HEADER))
                .layer(CorsLayer::permissive()),
        )
}

struct ApiKeyAddon;

impl Modify for ApiKeyAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_key",
            SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::new(API_KEY_HEADER))),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health,
        health::readiness,
        balance::get_native_balance,
        balance::get_token_balance,
        analytics::get_usage,
        cache::clear_cache
    ),
    components(
        schemas(
            ErrorBody,
            TokenBalance,
            UsageRecord,
            DailyUsage,
            EndpointCount,
            UsageSummary,
            UsageReport,
            balance::NativeBalanceResponse,
            balance::TokenBalanceResponse,
            cache::ClearCacheResponse,
            health::HealthResponse,
            health::ReadyResponse,
            health::HealthChecks
        )
    ),
    modifiers(&ApiKeyAddon),
    tags(
        (name = "Health", description = "Liveness and readiness"),
        (name = "Balances", description = "Native and token balance lookups"),
        (name = "Analytics", description = "Per-key usage statistics"),
        (name = "Admin", description = "Cache administration")
    )
)]
struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RateLimitConfig;
    use crate::testing::{call, get_req, read_json, request, router_with, send, state_with, FailingCache, MockChain};
    use alloy::primitives::U256;
    use axum::http::StatusCode;
    use std::sync::atomic::Ordering;
    use std::sync::Arc;
    use std::time::Duration;

    const HOLDER: &str = "0x742d35Cc6634C0532925a3b844Bc9e7595f89026";
    const TOKEN: &str = "0xc21223249CA28397B4B6541dfFaEcC539BfF0c59";

    #[tokio::test]
    async fn router_builds_with_all_routes() {
        let app = router(state_with(MockChain::default()));
        // Ensure the router can be converted into a service without panicking.
        let _ = app.into_make_service();
    }

    #[test]
    fn openapi_lists_gateway_paths() {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key("/api/v1/balance/{address}"));
        assert!(doc
            .paths
            .paths
            .contains_key("/api/v1/token-balance/{address}/{token_address}"));
        assert!(doc.paths.paths.contains_key("/health"));
    }

    #[tokio::test]
    async fn native_balance_success() {
        let chain = MockChain::default().with_native(U256::from(1_500_000_000_000_000_000u128));
        let app = router(state_with(chain));

        let (status, body) = send(app, get_req(&format!("/api/v1/balance/{HOLDER}"), Some("test-key"))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["address"], HOLDER);
        assert_eq!(body["balance"], "1.5");
        assert_eq!(body["symbol"], "CRO");
        assert!(body["timestamp"].as_str().unwrap().ends_with('Z'));
    }

    #[tokio::test]
    async fn token_balance_success() {
        let chain = MockChain::default().with_token(U256::from(1_000_500_000u64), 6, "USDC", "USD Coin");
        let app = router(state_with(chain));

        let (status, body) = send(
            app,
            get_req(&format!("/api/v1/token-balance/{HOLDER}/{TOKEN}"), Some("test-key")),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["address"], HOLDER);
        assert_eq!(body["tokenAddress"], TOKEN);
        assert_eq!(body["balance"], "1000.5");
        assert_eq!(body["decimals"], 6);
        assert_eq!(body["symbol"], "USDC");
        assert_eq!(body["name"], "USD Coin");
        assert_eq!(body["rawBalance"], "1000500000");
    }

    #[tokio::test]
    async fn token_metadata_failures_use_sentinels() {
        let chain = MockChain::default()
            .with_token(U256::from(1u64), 0, "X", "X")
            .with_symbol_error(crate::blockchain::ChainError::Rpc("boom".into()))
            .with_name_error(crate::blockchain::ChainError::Rpc("boom".into()));
        let app = router(state_with(chain));

        let (status, body) = send(
            app,
            get_req(&format!("/api/v1/token-balance/{HOLDER}/{TOKEN}"), Some("test-key")),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["symbol"], "UNKNOWN");
        assert_eq!(body["name"], "Unknown Token");
    }

    #[tokio::test]
    async fn non_contract_token_is_contract_error() {
        let chain = MockChain::default()
            .with_token(U256::ZERO, 18, "X", "X")
            .with_token_balance_error(crate::blockchain::ChainError::Contract("execution reverted".into()));
        let app = router(state_with(chain));

        let (status, body) = send(
            app,
            get_req(&format!("/api/v1/token-balance/{HOLDER}/{TOKEN}"), Some("test-key")),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Contract Error");
        assert_eq!(body["message"], "Invalid contract address or contract call failed");
    }

    #[tokio::test]
    async fn rpc_outage_is_503() {
        let chain = MockChain::default()
            .with_native_error(crate::blockchain::ChainError::Unavailable("connection refused".into()));
        let app = router(state_with(chain));

        let (status, body) = send(app, get_req(&format!("/api/v1/balance/{HOLDER}"), Some("test-key"))).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["error"], "Service Unavailable");
        assert_eq!(body["message"], "Unable to connect to blockchain RPC");
    }

    #[tokio::test]
    async fn generic_rpc_failure_hides_details_in_production() {
        let chain = MockChain::default().with_native_error(crate::blockchain::ChainError::Rpc("weird".into()));
        let app = router(state_with(chain));

        let (status, body) = send(app, get_req(&format!("/api/v1/balance/{HOLDER}"), Some("test-key"))).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["message"], "An unexpected error occurred");
        assert!(body.get("details").is_none());
    }

    #[tokio::test]
    async fn missing_key_is_401_even_for_invalid_paths() {
        for path in [
            format!("/api/v1/balance/{HOLDER}"),
            "/api/v1/balance/0xinvalid".to_string(),
            "/api/v1/does-not-exist".to_string(),
        ] {
            let app = router(state_with(MockChain::default()));
            let (status, body) = send(app, get_req(&path, None)).await;
            assert_eq!(status, StatusCode::UNAUTHORIZED, "{path}");
            assert_eq!(body["message"], "API key is required");
        }
    }

    #[tokio::test]
    async fn invalid_key_is_401() {
        let app = router(state_with(MockChain::default()));
        let (status, body) = send(app, get_req(&format!("/api/v1/balance/{HOLDER}"), Some("wrong"))).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "Unauthorized");
        assert_eq!(body["message"], "Invalid API key");
    }

    #[tokio::test]
    async fn invalid_address_is_400_without_chain_access() {
        let chain = Arc::new(MockChain::default());
        let app = router_with(chain.clone(), Arc::new(FailingCache), RateLimitConfig::default());

        let (status, body) = send(app, get_req("/api/v1/balance/0xinvalid", Some("test-key"))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Validation Error");
        assert_eq!(chain.total_calls(), 0);
    }

    #[tokio::test]
    async fn invalid_token_address_is_400() {
        let app = router(state_with(MockChain::default()));
        let (status, body) = send(
            app,
            get_req(&format!("/api/v1/token-balance/{HOLDER}/0x123"), Some("test-key")),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["message"].as_str().unwrap().contains("tokenAddress"));
    }

    #[tokio::test]
    async fn unknown_route_with_key_is_404() {
        let app = router(state_with(MockChain::default()));
        let (status, _) = send(app, get_req("/api/v1/nope", Some("test-key"))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn broken_cache_still_serves_fresh_balances() {
        let chain = Arc::new(MockChain::default().with_native(U256::from(1_500_000_000_000_000_000u128)));
        let app = router_with(chain.clone(), Arc::new(FailingCache), RateLimitConfig::default());

        for _ in 0..2 {
            let (status, body) =
                send(app.clone(), get_req(&format!("/api/v1/balance/{HOLDER}"), Some("test-key"))).await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(body["balance"], "1.5");
        }
        assert_eq!(chain.native_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn quota_is_enforced_per_window() {
        let chain = Arc::new(MockChain::default().with_native(U256::from(1u64)));
        let limits = RateLimitConfig {
            window: Duration::from_secs(60),
            max_requests: 2,
        };
        let app = router_with(chain, Arc::new(FailingCache), limits);
        let path = format!("/api/v1/balance/{HOLDER}");

        for remaining in ["1", "0"] {
            let response = call(app.clone(), get_req(&path, Some("test-key"))).await;
            assert_eq!(response.status(), StatusCode::OK);
            assert_eq!(response.headers()["ratelimit-limit"], "2");
            assert_eq!(response.headers()["ratelimit-remaining"], remaining);
        }

        let response = call(app.clone(), get_req(&path, Some("test-key"))).await;
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert!(response.headers().contains_key("retry-after"));
        let (_, body) = read_json(response).await;
        assert_eq!(body["error"], "Too Many Requests");
        assert!(body["retryAfter"].is_string());

        // A different key has its own quota.
        let response = call(app.clone(), get_req(&path, Some("admin-key"))).await;
        assert_eq!(response.status(), StatusCode::OK);

        tokio::time::advance(Duration::from_secs(61)).await;
        let response = call(app, get_req(&path, Some("test-key"))).await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn health_is_public() {
        let app = router(state_with(MockChain::default()));
        let (status, body) = send(app, get_req("/health", None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["environment"], "production");
    }

    #[tokio::test]
    async fn readiness_reports_degraded_dependencies() {
        let app = router(state_with(MockChain::default().with_block(42)));
        let (status, body) = send(app, get_req("/health/ready", None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["checks"]["block_number"], 42);
        assert_eq!(body["checks"]["cache_backend"], "local");

        let app = router_with(
            Arc::new(MockChain::default().with_block(42)),
            Arc::new(FailingCache),
            RateLimitConfig::default(),
        );
        let (status, body) = send(app, get_req("/health/ready", None)).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["status"], "degraded");
        assert_eq!(body["checks"]["cache"], "unavailable");
    }

    #[tokio::test]
    async fn cache_clear_requires_admin_key() {
        let app = router(state_with(MockChain::default()));

        let (status, body) = send(app.clone(), request("DELETE", "/api/v1/cache", Some("test-key"))).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["error"], "Forbidden");

        let (status, body) = send(app, request("DELETE", "/api/v1/cache", Some("admin-key"))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["cleared"], true);
    }

    #[tokio::test]
    async fn usage_report_counts_own_requests() {
        let chain = MockChain::default().with_native(U256::from(1u64));
        let state = state_with(chain);
        let app = router(state.clone());
        let path = format!("/api/v1/balance/{HOLDER}");

        for _ in 0..3 {
            send(app.clone(), get_req(&path, Some("test-key"))).await;
        }
        send(app.clone(), get_req(&path, Some("admin-key"))).await;

        // Recording is fire-and-forget; wait until the spawned tasks land.
        for _ in 0..50 {
            let report = state.analytics.usage_report("test-key", 1).await;
            if report.summary.total_requests >= 3 {
                break;
            }
            tokio::task::yield_now().await;
        }

        let (status, body) = send(app, get_req("/api/v1/analytics/usage?days=1", Some("test-key"))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["period"], "1 days");
        let top = &body["summary"]["mostUsedEndpoints"][0];
        assert_eq!(top["endpoint"], "GET /api/v1/balance/{address}");
        assert_eq!(top["count"], 3);
        assert_eq!(body["apiKey"], "test****");
    }

    #[tokio::test]
    async fn usage_report_rejects_out_of_range_days() {
        let app = router(state_with(MockChain::default()));
        for query in ["days=0", "days=91", "days=abc"] {
            let (status, body) = send(
                app.clone(),
                get_req(&format!("/api/v1/analytics/usage?{query}"), Some("test-key")),
            )
            .await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{query}");
            assert_eq!(body["error"], "Validation Error");
        }
    }
}
