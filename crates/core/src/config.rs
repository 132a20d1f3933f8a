//! Top-level YAML configuration schema (§6 of the design notes).
//!
//! The dotted-path `class:` plugin mechanism the original system used is
//! replaced with a closed tagged-enum registry per REDESIGN FLAGS: each
//! `class` string here is resolved by the owning crate's own registry
//! (`warden-transport`, `warden-profile`, `warden-shipper`) rather than by
//! this crate, so `Config` only carries the raw, not-yet-interpreted
//! per-plugin settings.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Empty mapping, used as the default for plugin `config:` blocks. A bare
/// `serde_yaml::Value::Null` default would make a `class:`-only entry (no
/// `config:` key) fail downstream `from_value::<Struct>` resolution even when
/// every field of `Struct` is `#[serde(default)]`: `serde_yaml` deserializes
/// `Null` as a unit, not an empty map.
pub fn default_plugin_config() -> serde_yaml::Value {
    serde_yaml::Value::Mapping(Default::default())
}

/// Deserializes a plugin's `config:` value into `T`, treating `Null` (an
/// omitted `config:` key reached via a hand-built [`RawPlugin`] rather than
/// through this module's own `serde(default)`) the same as an empty mapping.
pub fn resolve_plugin_config<T>(value: &serde_yaml::Value) -> Result<T, serde_yaml::Error>
where
    T: serde::de::DeserializeOwned,
{
    match value {
        serde_yaml::Value::Null => serde_yaml::from_value(default_plugin_config()),
        other => serde_yaml::from_value(other.clone()),
    }
}

/// Raw, not-yet-resolved plugin declaration: `{class: <name>, config: {...}}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawPlugin {
    pub class: String,
    #[serde(default = "default_plugin_config")]
    pub config: serde_yaml::Value,
    /// Bounded output queue size override (shippers only; ignored elsewhere).
    #[serde(default)]
    pub limit: Option<usize>,
}

/// One entry under the top-level `profiles:` map.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileConfigEntry {
    pub class: String,
    #[serde(default = "default_plugin_config")]
    pub config: serde_yaml::Value,
    #[serde(default)]
    pub collector: Option<RawPlugin>,
    #[serde(default)]
    pub analyzer: Option<RawPlugin>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_name")]
    pub name: String,
    #[serde(default = "default_user")]
    pub user: String,
    #[serde(default = "default_password")]
    pub password: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_host() -> String {
    "localhost".to_string()
}
fn default_port() -> u16 {
    5432
}
fn default_name() -> String {
    "scrywarden".to_string()
}
fn default_user() -> String {
    "scrywarden".to_string()
}
fn default_password() -> String {
    "scrywarden".to_string()
}
fn default_max_connections() -> u32 {
    10
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            name: default_name(),
            user: default_user(),
            password: default_password(),
            max_connections: default_max_connections(),
        }
    }
}

impl DatabaseConfig {
    pub fn connection_string(&self) -> String {
        format!(
            "postgres://{}:{}@{}:{}/{}",
            self.user, self.password, self.host, self.port, self.name,
        )
    }
}

/// Logging level/format. Bootstrapped via `tracing-subscriber`'s `EnvFilter`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: LogFormat,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> LogFormat {
    LogFormat::Compact
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

/// Pipeline coordinator knobs (§4.3): bounded queue size and the per-cycle
/// timeout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    #[serde(default = "default_queue_size")]
    pub queue_size: usize,
    #[serde(default = "default_timeout")]
    pub timeout: f64,
}

fn default_queue_size() -> usize {
    500
}
fn default_timeout() -> f64 {
    10.0
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            queue_size: default_queue_size(),
            timeout: default_timeout(),
        }
    }
}

/// Root configuration object loaded from `--config` (default
/// `scrywarden.yml`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub pipeline: PipelineConfig,
    #[serde(default)]
    pub transports: HashMap<String, RawPlugin>,
    #[serde(default)]
    pub profiles: HashMap<String, ProfileConfigEntry>,
    #[serde(default)]
    pub shippers: HashMap<String, RawPlugin>,
}

impl Config {
    /// Loads and parses the YAML config file at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content =
            std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
                path: path.display().to_string(),
                source,
            })?;
        serde_yaml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }
}

/// Load a `.env` file (silently ignores if missing), mirroring the
/// teacher's `stupid_core::config::load_dotenv`.
pub fn load_dotenv() {
    dotenvy::dotenv().ok();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_minimal_config() {
        let yaml = r#"
database:
  host: db.internal
  name: warden
pipeline:
  queue_size: 100
  timeout: 5.0
transports:
  heartbeat_a:
    class: heartbeat
    config:
      interval: 5
profiles:
  login:
    class: login_profile
    collector:
      class: time_range
      config:
        seconds: 30
    analyzer:
      class: exponential_decay
shippers:
  csv:
    class: csv
    limit: 20
    config:
      filename: alerts.csv
"#;
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.database.host, "db.internal");
        assert_eq!(config.pipeline.queue_size, 100);
        assert_eq!(config.transports.len(), 1);
        assert_eq!(config.profiles["login"].class, "login_profile");
        assert_eq!(
            config.profiles["login"].collector.as_ref().unwrap().class,
            "time_range",
        );
        assert_eq!(config.shippers["csv"].limit, Some(20));
    }

    #[test]
    fn defaults_fill_in_missing_sections() {
        let config: Config = serde_yaml::from_str("{}").unwrap();
        assert_eq!(config.database.host, "localhost");
        assert_eq!(config.pipeline.queue_size, 500);
        assert!(config.transports.is_empty());
    }
}
