use serde::Deserialize;
use std::collections::HashMap;
use std::env;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    #[serde(default)]
    pub redis: Option<RedisConfig>,
    #[serde(default)]
    pub kafka: Option<KafkaConfig>,
    #[serde(default)]
    pub rate_limit: RateLimitConfig,
    #[serde(default)]
    pub holds: HoldsConfig,
    #[serde(default)]
    pub access: AccessConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_true")]
    pub run_migrations: bool,
}

fn default_max_connections() -> u32 { 5 }
fn default_true() -> bool { true }

#[derive(Debug, Deserialize, Clone)]
pub struct RedisConfig {
    pub url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct KafkaConfig {
    pub brokers: String,
    #[serde(default = "default_topic")]
    pub topic: String,
}

fn default_topic() -> String { "frontdesk.events".to_string() }

#[derive(Debug, Deserialize, Clone)]
pub struct RateLimitConfig {
    pub requests: i64,
    pub window_seconds: i64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self { requests: 100, window_seconds: 60 }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct HoldsConfig {
    pub sweep_interval_seconds: u64,
}

impl Default for HoldsConfig {
    fn default() -> Self {
        Self { sweep_interval_seconds: 60 }
    }
}

/// Role name → permission names. `"*"` grants everything.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct AccessConfig {
    #[serde(default)]
    pub roles: HashMap<String, Vec<String>>,
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = config::Config::builder()
            .add_source(config::File::with_name("config/default"))
            // per-environment overrides, optional
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            // untracked local overrides
            .add_source(config::File::with_name("config/local").required(false))
            // e.g. INNKEEP_DATABASE__URL=postgres://...
            .add_source(environment())
            .build()?;

        s.try_deserialize()
    }
}

fn environment() -> config::Environment {
    config::Environment::with_prefix("INNKEEP")
        .prefix_separator("_")
        .separator("__")
}

#[cfg(test)]
impl Config {
    fn from_toml(raw: &str) -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(config::File::from_str(raw, config::FileFormat::Toml))
            .build()?
            .try_deserialize()
    }
}
