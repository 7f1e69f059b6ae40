// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::{net::SocketAddr, sync::Arc, time::Duration};

use axum_server::{tls_rustls::RustlsConfig, Handle};
use balance_gateway::{
    api::router,
    blockchain::ChainClient,
    cache::build_cache,
    config::{AppConfig, DEFAULT_LOG_FILTER, LOG_FORMAT_ENV},
    state::AppState,
};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Time allowed for in-flight requests after Ctrl-C.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(10);

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let json = std::env::var(LOG_FORMAT_ENV).is_ok_and(|v| v.eq_ignore_ascii_case("json"));

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer().pretty()).init();
    }
}

#[tokio::main]
async fn main() {
    // A missing .env file is fine; real environment variables still apply.
    let dotenv_loaded = dotenv::dotenv().is_ok();
    init_tracing();

    let config = AppConfig::from_env().expect("Invalid configuration");
    tracing::info!(
        network = config.network.name,
        chain_id = config.network.chain_id,
        environment = %config.environment,
        api_keys = config.api_keys.len(),
        dotenv = dotenv_loaded,
        "Configuration loaded"
    );
    if config.api_keys.is_empty() {
        tracing::warn!("API_KEYS is empty; every /api/v1 request will be rejected");
    }

    let shutdown = CancellationToken::new();

    let cache = build_cache(&config.cache, shutdown.clone()).expect("Failed to initialize cache");
    let chain = ChainClient::new(config.network.clone(), &config.rpc_url, config.rpc_timeout)
        .expect("Failed to create chain client");

    let state = AppState::new(&config, cache, Arc::new(chain));
    state.limiter.spawn_sweeper(shutdown.clone());
    let app = router(state);

    let addr: SocketAddr = config
        .bind_address()
        .parse()
        .expect("Failed to parse bind address");

    let handle = Handle::new();
    tokio::spawn(shutdown_signal(handle.clone(), shutdown.clone()));

    match &config.tls {
        Some(tls) => {
            // Install the ring crypto provider for rustls (must be done before any TLS operations)
            rustls::crypto::ring::default_provider()
                .install_default()
                .expect("Failed to install rustls crypto provider");

            let tls_config = RustlsConfig::from_pem_file(&tls.cert, &tls.key)
                .await
                .expect("Failed to load TLS certificate");

            tracing::info!(%addr, "Balance gateway listening on https (docs at /docs)");
            axum_server::bind_rustls(addr, tls_config)
                .handle(handle)
                .serve(app.into_make_service())
                .await
                .expect("HTTPS server failed");
        }
        None => {
            tracing::info!(%addr, "Balance gateway listening on http (docs at /docs)");
            axum_server::bind(addr)
                .handle(handle)
                .serve(app.into_make_service())
                .await
                .expect("HTTP server failed");
        }
    }

    shutdown.cancel();
    tracing::info!("Server stopped");
}

async fn shutdown_signal(handle: Handle<SocketAddr>, shutdown: CancellationToken) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for Ctrl-C");
        return;
    }
    tracing::info!("Shutdown signal received");
    shutdown.cancel();
    handle.graceful_shutdown(Some(SHUTDOWN_GRACE));
}
