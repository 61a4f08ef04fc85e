use crate::auth::jwt::JwtConfig;

/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development.
/// In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Graceful shutdown timeout in seconds (default: `30`).
    #[allow(dead_code)]
    pub shutdown_timeout_secs: u64,
    /// JWT token configuration (secret, expiry durations).
    pub jwt: JwtConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                    |
    /// |------------------------|----------------------------|
    /// | `HOST`                 | `0.0.0.0`                  |
    /// | `PORT`                 | `3000`                     |
    /// | `CORS_ORIGINS`         | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS` | `30`                       |
    /// | `SHUTDOWN_TIMEOUT_SECS`| `30`                       |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let shutdown_timeout_secs: u64 = std::env::var("SHUTDOWN_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("SHUTDOWN_TIMEOUT_SECS must be a valid u64");

        let jwt = JwtConfig::from_env();

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            shutdown_timeout_secs,
            jwt,
        }
    }
}

/// Which record store backend to run against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreMode {
    /// In-memory store, optionally seeded with demo data. No persistence.
    Memory,
    /// Remote REST/SSE store.
    Rest,
}

/// Record store configuration.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub mode: StoreMode,
    /// Base URL of the remote store. Required when `mode` is [`StoreMode::Rest`].
    pub base_url: Option<String>,
    /// Optional auth token appended to every store request.
    pub auth_token: Option<String>,
    /// Seed the in-memory store with demo records (memory mode only).
    pub seed_demo_data: bool,
}

impl StoreConfig {
    /// Load store configuration from environment variables.
    ///
    /// | Env Var            | Default  |
    /// |--------------------|----------|
    /// | `STORE_MODE`       | `memory` |
    /// | `STORE_BASE_URL`   | --       |
    /// | `STORE_AUTH_TOKEN` | --       |
    /// | `SEED_DEMO_DATA`   | `true`   |
    ///
    /// # Panics
    ///
    /// Panics if `STORE_MODE` is not `memory` or `rest`.
    pub fn from_env() -> Self {
        let mode = match std::env::var("STORE_MODE")
            .unwrap_or_else(|_| "memory".into())
            .to_lowercase()
            .as_str()
        {
            "memory" => StoreMode::Memory,
            "rest" => StoreMode::Rest,
            other => panic!("STORE_MODE must be 'memory' or 'rest', got '{other}'"),
        };

        let base_url = std::env::var("STORE_BASE_URL").ok();
        let auth_token = std::env::var("STORE_AUTH_TOKEN").ok();

        let seed_demo_data: bool = std::env::var("SEED_DEMO_DATA")
            .unwrap_or_else(|_| "true".into())
            .parse()
            .expect("SEED_DEMO_DATA must be 'true' or 'false'");

        Self {
            mode,
            base_url,
            auth_token,
            seed_demo_data,
        }
    }
}

/// Notes-refinement client configuration.
#[derive(Debug, Clone)]
pub struct RefinerConfig {
    pub base_url: String,
    /// Bearer token for the provider. Left empty when unset; calls then fail
    /// at request time, which the refine endpoint reports per call.
    pub api_key: String,
    pub model: String,
    pub timeout_secs: u64,
}

impl RefinerConfig {
    /// Load refiner configuration from environment variables.
    ///
    /// | Env Var                | Default                     |
    /// |------------------------|-----------------------------|
    /// | `REFINER_BASE_URL`     | `https://api.openai.com/v1` |
    /// | `REFINER_API_KEY`      | (empty)                     |
    /// | `REFINER_MODEL`        | `gpt-4o-mini`               |
    /// | `REFINER_TIMEOUT_SECS` | `30`                        |
    pub fn from_env() -> Self {
        let base_url = std::env::var("REFINER_BASE_URL")
            .unwrap_or_else(|_| "https://api.openai.com/v1".into());

        let api_key = std::env::var("REFINER_API_KEY").unwrap_or_default();

        let model = std::env::var("REFINER_MODEL").unwrap_or_else(|_| "gpt-4o-mini".into());

        let timeout_secs: u64 = std::env::var("REFINER_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REFINER_TIMEOUT_SECS must be a valid u64");

        Self {
            base_url,
            api_key,
            model,
            timeout_secs,
        }
    }
}
