use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use crate::revalidation::BodyPolicy;
use crate::site::DEFAULT_RENDER_CACHE_CAPACITY;
use crate::tenancy::DEFAULT_MEMO_CAPACITY;

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub tenancy: TenancyConfig,
    pub revalidation: RevalidationConfig,
    /// Public base URL, used for canonical links when a tenant has no domain.
    pub site_url: Option<String>,
    pub render_cache_capacity: usize,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let seed_path = non_empty_var("TENANT_SEED_PATH").map(PathBuf::from);
        let cache_ttl = env::var("TENANT_CACHE_TTL_SECS")
            .unwrap_or_else(|_| "60".to_string())
            .trim()
            .parse::<u64>()
            .map(Duration::from_secs)
            .map_err(|_| ConfigError::InvalidCacheTtl)?;
        let memo_capacity = capacity_var("TENANT_CACHE_MAX_ENTRIES", DEFAULT_MEMO_CAPACITY)?;
        let render_cache_capacity =
            capacity_var("RENDER_CACHE_MAX_ENTRIES", DEFAULT_RENDER_CACHE_CAPACITY)?;

        let tokens = env::var("REVALIDATE_TOKENS")
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .map(str::to_string)
            .collect();
        let session_cookie = non_empty_var("REVALIDATE_SESSION_COOKIE")
            .unwrap_or_else(|| "payload-token".to_string());
        let body_policy = match non_empty_var("REVALIDATE_BODY_POLICY") {
            Some(value) => value
                .parse::<BodyPolicy>()
                .map_err(|_| ConfigError::InvalidBodyPolicy { value })?,
            None => BodyPolicy::default(),
        };

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            tenancy: TenancyConfig {
                seed_path,
                cache_ttl,
                memo_capacity,
            },
            revalidation: RevalidationConfig {
                tokens,
                session_cookie,
                body_policy,
            },
            site_url: non_empty_var("SITE_URL"),
            render_cache_capacity,
        })
    }
}

fn capacity_var(key: &'static str, default: usize) -> Result<usize, ConfigError> {
    match non_empty_var(key) {
        Some(value) => value
            .parse::<usize>()
            .map_err(|_| ConfigError::InvalidCapacity { key }),
        None => Ok(default),
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Where tenant records come from and how long host lookups are memoized.
#[derive(Debug, Clone)]
pub struct TenancyConfig {
    pub seed_path: Option<PathBuf>,
    pub cache_ttl: Duration,
    pub memo_capacity: usize,
}

/// Operator credentials and body handling for `POST /api/revalidate`.
#[derive(Clone)]
pub struct RevalidationConfig {
    pub tokens: Vec<String>,
    pub session_cookie: String,
    pub body_policy: BodyPolicy,
}

impl fmt::Debug for RevalidationConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RevalidationConfig")
            .field("tokens", &format_args!("[{} redacted]", self.tokens.len()))
            .field("session_cookie", &self.session_cookie)
            .field("body_policy", &self.body_policy)
            .finish()
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidCacheTtl,
    InvalidCapacity { key: &'static str },
    InvalidBodyPolicy { value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidCacheTtl => {
                write!(f, "TENANT_CACHE_TTL_SECS must be a whole number of seconds")
            }
            ConfigError::InvalidCapacity { key } => {
                write!(f, "{key} must be a whole number of entries")
            }
            ConfigError::InvalidBodyPolicy { value } => write!(
                f,
                "REVALIDATE_BODY_POLICY must be 'lenient' or 'strict' (got '{value}')"
            ),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidPort
            | ConfigError::InvalidCacheTtl
            | ConfigError::InvalidCapacity { .. }
            | ConfigError::InvalidBodyPolicy { .. } => None,
        }
    }
}
