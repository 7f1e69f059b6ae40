// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! Configuration is read once from the environment at startup (a `.env`
//! file is honoured by `main`) and handed to the components that need it.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `3000` |
//! | `API_KEYS` | Comma-separated list of accepted API keys | empty |
//! | `ADMIN_API_KEYS` | Comma-separated keys allowed on admin routes | empty |
//! | `CRONOS_NETWORK` | `mainnet` or `testnet` | `mainnet` |
//! | `CRONOS_RPC_URL` | JSON-RPC endpoint of the chain node | network's public RPC |
//! | `RPC_TIMEOUT_SECS` | Upper bound for a single RPC read | `10` |
//! | `USE_REDIS` | Use Redis instead of the in-process cache | `false` |
//! | `REDIS_URL` | Redis connection URL | `redis://localhost:6379` |
//! | `REDIS_TIMEOUT_MS` | Upper bound for a single Redis command | `2000` |
//! | `CACHE_TTL_SECONDS` | Default cache entry lifetime | `300` |
//! | `CACHE_CHECK_PERIOD` | Sweep interval of the in-process cache | `60` |
//! | `CACHE_MAX_ENTRIES` | Capacity of the in-process cache | `10000` |
//! | `RATE_LIMIT_WINDOW_MS` | Rate limit window length | `3600000` |
//! | `RATE_LIMIT_MAX_REQUESTS` | Requests allowed per key and window | `100` |
//! | `APP_ENV` | `development`, `production` or `test` | `production` |
//! | `TLS_CERT_PATH` / `TLS_KEY_PATH` | PEM files enabling HTTPS | unset |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use std::{fmt, str::FromStr, time::Duration};

use crate::blockchain::{network_by_name, NetworkConfig, CRONOS_MAINNET};

pub const HOST_ENV: &str = "HOST";
pub const PORT_ENV: &str = "PORT";
pub const API_KEYS_ENV: &str = "API_KEYS";
pub const ADMIN_API_KEYS_ENV: &str = "ADMIN_API_KEYS";
pub const NETWORK_ENV: &str = "CRONOS_NETWORK";
pub const RPC_URL_ENV: &str = "CRONOS_RPC_URL";
pub const RPC_TIMEOUT_ENV: &str = "RPC_TIMEOUT_SECS";
pub const USE_REDIS_ENV: &str = "USE_REDIS";
pub const REDIS_URL_ENV: &str = "REDIS_URL";
pub const REDIS_TIMEOUT_ENV: &str = "REDIS_TIMEOUT_MS";
pub const CACHE_TTL_ENV: &str = "CACHE_TTL_SECONDS";
pub const CACHE_CHECK_PERIOD_ENV: &str = "CACHE_CHECK_PERIOD";
pub const CACHE_MAX_ENTRIES_ENV: &str = "CACHE_MAX_ENTRIES";
pub const RATE_LIMIT_WINDOW_ENV: &str = "RATE_LIMIT_WINDOW_MS";
pub const RATE_LIMIT_MAX_ENV: &str = "RATE_LIMIT_MAX_REQUESTS";
pub const APP_ENV_ENV: &str = "APP_ENV";
pub const TLS_CERT_ENV: &str = "TLS_CERT_PATH";
pub const TLS_KEY_ENV: &str = "TLS_KEY_PATH";

/// Environment variable selecting the log output format.
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

/// Filter used when `RUST_LOG` is not set.
pub const DEFAULT_LOG_FILTER: &str = "info,tower_http=debug";

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 3000;
const DEFAULT_REDIS_URL: &str = "redis://localhost:6379";

/// Deployment environment. Only `Development` exposes internal error details.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    Development,
    #[default]
    Production,
    Test,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Development => "development",
            Environment::Production => "production",
            Environment::Test => "test",
        }
    }

    pub fn is_development(&self) -> bool {
        matches!(self, Environment::Development)
    }
}

impl FromStr for Environment {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(Environment::Development),
            "production" | "prod" => Ok(Environment::Production),
            "test" => Ok(Environment::Test),
            other => Err(ConfigError::Invalid {
                name: APP_ENV_ENV,
                value: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which cache backend to construct at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheBackend {
    Local,
    Redis { url: String },
}

/// Cache settings shared by both backends.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    pub backend: CacheBackend,
    pub default_ttl: Duration,
    pub check_period: Duration,
    pub max_entries: usize,
    pub redis_timeout: Duration,
}

/// Fixed-window rate limit settings.
#[derive(Debug, Clone, Copy)]
pub struct RateLimitConfig {
    pub window: Duration,
    pub max_requests: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            window: Duration::from_millis(3_600_000),
            max_requests: 100,
        }
    }
}

/// Optional TLS material for HTTPS termination.
#[derive(Debug, Clone)]
pub struct TlsPaths {
    pub cert: String,
    pub key: String,
}

/// Complete process configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub api_keys: Vec<String>,
    pub admin_api_keys: Vec<String>,
    pub network: NetworkConfig,
    pub rpc_url: String,
    pub rpc_timeout: Duration,
    pub cache: CacheConfig,
    pub rate_limit: RateLimitConfig,
    pub environment: Environment,
    pub tls: Option<TlsPaths>,
}

impl AppConfig {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let network = match get(NETWORK_ENV) {
            Some(raw) => network_by_name(&raw).ok_or(ConfigError::Invalid {
                name: NETWORK_ENV,
                value: raw,
            })?,
            None => CRONOS_MAINNET,
        };

        let rpc_url = get(RPC_URL_ENV).unwrap_or_else(|| network.default_rpc_url.to_string());
        url::Url::parse(&rpc_url).map_err(|e| ConfigError::Invalid {
            name: RPC_URL_ENV,
            value: format!("{rpc_url} ({e})"),
        })?;

        let environment = match get(APP_ENV_ENV) {
            Some(raw) => raw.parse()?,
            None => Environment::default(),
        };

        let backend = if parse_bool(get(USE_REDIS_ENV).as_deref()) {
            CacheBackend::Redis {
                url: get(REDIS_URL_ENV).unwrap_or_else(|| DEFAULT_REDIS_URL.to_string()),
            }
        } else {
            CacheBackend::Local
        };

        let tls = match (get(TLS_CERT_ENV), get(TLS_KEY_ENV)) {
            (Some(cert), Some(key)) => Some(TlsPaths { cert, key }),
            (None, None) => None,
            _ => return Err(ConfigError::IncompleteTls),
        };

        let defaults = RateLimitConfig::default();
        let max_requests = number_or(RATE_LIMIT_MAX_ENV, get(RATE_LIMIT_MAX_ENV), defaults.max_requests);

        Ok(Self {
            host: get(HOST_ENV).unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port: number_or(PORT_ENV, get(PORT_ENV), DEFAULT_PORT),
            api_keys: split_list(get(API_KEYS_ENV).as_deref()),
            admin_api_keys: split_list(get(ADMIN_API_KEYS_ENV).as_deref()),
            network,
            rpc_url,
            rpc_timeout: Duration::from_secs(number_or(RPC_TIMEOUT_ENV, get(RPC_TIMEOUT_ENV), 10)),
            cache: CacheConfig {
                backend,
                default_ttl: Duration::from_secs(number_or(CACHE_TTL_ENV, get(CACHE_TTL_ENV), 300)),
                check_period: Duration::from_secs(
                    number_or(CACHE_CHECK_PERIOD_ENV, get(CACHE_CHECK_PERIOD_ENV), 60).max(1),
                ),
                max_entries: number_or(CACHE_MAX_ENTRIES_ENV, get(CACHE_MAX_ENTRIES_ENV), 10_000),
                redis_timeout: Duration::from_millis(number_or(
                    REDIS_TIMEOUT_ENV,
                    get(REDIS_TIMEOUT_ENV),
                    2_000,
                )),
            },
            rate_limit: RateLimitConfig {
                window: Duration::from_millis(
                    number_or(RATE_LIMIT_WINDOW_ENV, get(RATE_LIMIT_WINDOW_ENV), 3_600_000u64).max(1),
                ),
                max_requests,
            },
            environment,
            tls,
        })
    }

    /// `host:port` string for binding the listener.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Parse a number, falling back to `default` (with a warning) when malformed.
fn number_or<T>(name: &str, raw: Option<String>, default: T) -> T
where
    T: FromStr + Copy + fmt::Display,
{
    match raw {
        Some(value) => value.parse().unwrap_or_else(|_| {
            tracing::warn!(variable = name, value = %value, default = %default, "Ignoring malformed numeric setting");
            default
        }),
        None => default,
    }
}

fn parse_bool(raw: Option<&str>) -> bool {
    matches!(
        raw.map(|v| v.to_ascii_lowercase()).as_deref(),
        Some("true") | Some("1") | Some("yes")
    )
}

fn split_list(raw: Option<&str>) -> Vec<String> {
    raw.map(|list| {
        list.split(',')
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .map(str::to_string)
            .collect()
    })
    .unwrap_or_default()
}

/// Errors raised while loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {name}: {value}")]
    Invalid { name: &'static str, value: String },

    #[error("TLS_CERT_PATH and TLS_KEY_PATH must be set together")]
    IncompleteTls,
}
