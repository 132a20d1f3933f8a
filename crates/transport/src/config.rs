//! Closed registry resolving a `RawPlugin`'s `class` string to a concrete
//! transport, replacing the original's dotted-path import (REDESIGN FLAGS
//! §1).

use std::time::Duration;

use serde::Deserialize;
use warden_core::config::RawPlugin;

use crate::csv::CsvTransport;
use crate::error::TransportError;
use crate::heartbeat::HeartbeatTransport;
use crate::runner::Transport;

#[derive(Debug, Deserialize)]
struct CsvConfig {
    path: String,
    #[serde(default = "default_timestamp_column")]
    timestamp_column: String,
}

fn default_timestamp_column() -> String {
    "timestamp".to_string()
}

#[derive(Debug, Deserialize)]
struct HeartbeatConfig {
    #[serde(default = "default_interval_secs")]
    interval_secs: f64,
    #[serde(default)]
    payload: serde_json::Value,
}

fn default_interval_secs() -> f64 {
    5.0
}

/// Builds the concrete transport named `name` from its raw config. `class`
/// is the closed set `"csv"` | `"heartbeat"`.
pub fn build_transport(name: &str, raw: &RawPlugin) -> Result<Box<dyn Transport>, TransportError> {
    match raw.class.as_str() {
        "csv" => {
            let config: CsvConfig = warden_core::config::resolve_plugin_config(&raw.config)
                .map_err(|e| TransportError::InvalidConfig(e.to_string()))?;
            Ok(Box::new(CsvTransport::new(
                name,
                config.path,
                config.timestamp_column,
            )))
        }
        "heartbeat" => {
            let config: HeartbeatConfig = warden_core::config::resolve_plugin_config(&raw.config)
                .map_err(|e| TransportError::InvalidConfig(e.to_string()))?;
            Ok(Box::new(HeartbeatTransport::new(
                name,
                Duration::from_secs_f64(config.interval_secs),
                config.payload,
            )))
        }
        other => Err(TransportError::UnknownClass(other.to_string())),
    }
}
