//! Application configuration.

use serde::Deserialize;
use std::path::Path;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Server configuration.
    pub server: ServerConfig,
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Redis configuration.
    pub redis: RedisConfig,
    /// Voting pipeline configuration.
    pub voting: VotingConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to bind to.
    #[serde(default = "default_port")]
    pub port: u16,
}

/// Database connection configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// `PostgreSQL` connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

/// Redis configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct RedisConfig {
    /// Redis connection URL.
    pub url: String,
    /// Key prefix for all Redis keys.
    #[serde(default = "default_redis_prefix")]
    pub prefix: String,
}

/// Voting pipeline configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct VotingConfig {
    /// Minimum number of candidates a ballot must place in tiers.
    #[serde(default = "default_min_selections")]
    pub min_selections: usize,
    /// Whether ballot submission requires a challenge token.
    #[serde(default)]
    pub challenge_required: bool,
    /// Challenge verifier secret. When unset, verification passes (dev).
    #[serde(default)]
    pub challenge_secret: Option<String>,
    /// Upper bound on a single storage round-trip, in seconds.
    #[serde(default = "default_storage_timeout_secs")]
    pub storage_timeout_secs: u64,
    /// How often the snapshot scheduler runs, in seconds.
    #[serde(default = "default_snapshot_interval_secs")]
    pub snapshot_interval_secs: u64,
    /// Poll slugs subject to the strict (1/min) submission quota.
    #[serde(default)]
    pub strict_polls: Vec<String>,
    /// Rate limiting configuration.
    #[serde(default)]
    pub rate_limit: RateLimitSettings,
}

/// Rate limiting configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct RateLimitSettings {
    /// Accepted ballot submissions per window for the default action.
    #[serde(default = "default_ballot_max")]
    pub ballot_max: u64,
    /// Window length for the default action, in seconds.
    #[serde(default = "default_window_secs")]
    pub ballot_window_secs: i64,
    /// Accepted submissions per window for the strict action.
    #[serde(default = "default_strict_max")]
    pub strict_max: u64,
    /// Window length for the strict action, in seconds.
    #[serde(default = "default_window_secs")]
    pub strict_window_secs: i64,
    /// When the counter store is unreachable: allow (true) or reject (false).
    #[serde(default)]
    pub fail_open: bool,
}

impl Default for RateLimitSettings {
    fn default() -> Self {
        Self {
            ballot_max: default_ballot_max(),
            ballot_window_secs: default_window_secs(),
            strict_max: default_strict_max(),
            strict_window_secs: default_window_secs(),
            fail_open: false,
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

const fn default_port() -> u16 {
    3000
}

const fn default_max_connections() -> u32 {
    100
}

const fn default_min_connections() -> u32 {
    5
}

fn default_redis_prefix() -> String {
    "tierboard".to_string()
}

const fn default_min_selections() -> usize {
    3
}

const fn default_storage_timeout_secs() -> u64 {
    5
}

const fn default_snapshot_interval_secs() -> u64 {
    300
}

const fn default_ballot_max() -> u64 {
    10
}

const fn default_strict_max() -> u64 {
    1
}

const fn default_window_secs() -> i64 {
    60
}

impl Config {
    /// Load configuration from files and environment variables.
    ///
    /// Configuration is loaded in the following order:
    /// 1. `config/default.toml`
    /// 2. `config/{environment}.toml` (based on `TIERBOARD_ENV`)
    /// 3. Environment variables with `TIERBOARD_` prefix
    pub fn load() -> Result<Self, config::ConfigError> {
        dotenvy::dotenv().ok();

        let env = std::env::var("TIERBOARD_ENV").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("TIERBOARD")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Load configuration from a specific file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::from(path.as_ref()))
            .add_source(
                config::Environment::with_prefix("TIERBOARD")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}
