//! Server configuration.
//!
//! Settings layer in this order: built-in defaults, an optional config file
//! (TOML, JSON or YAML), `SKIRMISH__`-prefixed environment variables, then
//! CLI flags applied by `main`.

use std::net::SocketAddr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use skirmish_core::EngineConfig;

/// Root configuration for the Skirmish server.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Server binding configuration
    #[serde(default)]
    pub server: ServerSettings,

    /// Matchmaking engine tunables
    #[serde(default)]
    pub matchmaking: MatchmakingSettings,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Metrics configuration
    #[serde(default)]
    pub metrics: MetricsConfig,

    /// Demo data configuration
    #[serde(default)]
    pub demo: DemoConfig,
}

/// Server binding settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSettings {
    /// Host to bind to
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,

    /// Shutdown drain timeout in seconds
    #[serde(default = "default_shutdown_timeout")]
    pub shutdown_timeout_secs: u64,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            shutdown_timeout_secs: default_shutdown_timeout(),
        }
    }
}

impl ServerSettings {
    /// Get the socket address to bind to
    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        Ok(format!("{}:{}", self.host, self.port).parse()?)
    }

    /// Get the shutdown drain timeout
    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.shutdown_timeout_secs)
    }
}

/// Matchmaking engine settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchmakingSettings {
    /// Wait before the deadline task widens the level search, milliseconds
    #[serde(default = "default_match_wait_ms")]
    pub match_wait_ms: u64,

    /// Widening retry period, milliseconds
    #[serde(default = "default_match_retry_interval_ms")]
    pub match_retry_interval_ms: u64,

    /// Widening retries before a queued player's ticker gives up
    #[serde(default = "default_match_retry_limit")]
    pub match_retry_limit: u32,

    /// Scoring window of a started competition, seconds
    #[serde(default = "default_competition_duration_secs")]
    pub competition_duration_secs: u64,

    /// Ended competitions retained in memory beyond this count are evicted
    #[serde(default = "default_max_competitions_in_memory")]
    pub max_competitions_in_memory: usize,

    /// A competition starts immediately at this size
    #[serde(default = "default_max_players")]
    pub max_players_for_competition: usize,

    /// A competition may not start below this size
    #[serde(default = "default_min_players")]
    pub min_players_for_competition: usize,

    /// Lowest valid skill level
    #[serde(default = "default_min_level")]
    pub min_level: u8,

    /// Highest valid skill level
    #[serde(default = "default_max_level")]
    pub max_level: u8,
}

impl Default for MatchmakingSettings {
    fn default() -> Self {
        Self {
            match_wait_ms: default_match_wait_ms(),
            match_retry_interval_ms: default_match_retry_interval_ms(),
            match_retry_limit: default_match_retry_limit(),
            competition_duration_secs: default_competition_duration_secs(),
            max_competitions_in_memory: default_max_competitions_in_memory(),
            max_players_for_competition: default_max_players(),
            min_players_for_competition: default_min_players(),
            min_level: default_min_level(),
            max_level: default_max_level(),
        }
    }
}

impl MatchmakingSettings {
    /// Translate to the engine's configuration.
    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            match_wait: Duration::from_millis(self.match_wait_ms),
            match_retry_interval: Duration::from_millis(self.match_retry_interval_ms),
            match_retry_limit: self.match_retry_limit,
            competition_duration: Duration::from_secs(self.competition_duration_secs),
            max_competitions_in_memory: self.max_competitions_in_memory,
            max_players_for_competition: self.max_players_for_competition,
            min_players_for_competition: self.min_players_for_competition,
            min_level: self.min_level,
            max_level: self.max_level,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format (json, pretty)
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

/// Metrics configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsConfig {
    /// Serve Prometheus counters at /metrics
    #[serde(default = "default_metrics_enabled")]
    pub enabled: bool,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: default_metrics_enabled(),
        }
    }
}

/// Demo data configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DemoConfig {
    /// Load the built-in demo player fixture at startup
    #[serde(default = "default_seed_players")]
    pub seed_players: bool,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            seed_players: default_seed_players(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from an optional file plus environment overrides.
    pub fn load(path: Option<&str>) -> anyhow::Result<Self> {
        let mut builder = config::Config::builder()
            .add_source(config::Config::try_from(&ServerConfig::default())?);

        if let Some(path) = path {
            builder = builder.add_source(config::File::with_name(path));
        }

        builder = builder.add_source(
            config::Environment::with_prefix("SKIRMISH")
                .separator("__")
                .try_parsing(true),
        );

        Ok(builder.build()?.try_deserialize()?)
    }
}

// =============================================================================
// Default Functions
// =============================================================================

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_shutdown_timeout() -> u64 {
    5
}

fn default_match_wait_ms() -> u64 {
    30_000
}

fn default_match_retry_interval_ms() -> u64 {
    1_000
}

fn default_match_retry_limit() -> u32 {
    300
}

fn default_competition_duration_secs() -> u64 {
    3600
}

fn default_max_competitions_in_memory() -> usize {
    100
}

fn default_max_players() -> usize {
    10
}

fn default_min_players() -> usize {
    2
}

fn default_min_level() -> u8 {
    1
}

fn default_max_level() -> u8 {
    10
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

fn default_metrics_enabled() -> bool {
    true
}

fn default_seed_players() -> bool {
    true
}
