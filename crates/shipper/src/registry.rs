//! Closed registry resolving a `shippers:` entry's `class` string to a
//! concrete shipper (REDESIGN FLAGS §1).

use serde::Deserialize;
use warden_core::config::RawPlugin;

use crate::csv_shipper::CsvShipper;
use crate::error::ShipperError;
use crate::logger_shipper::{LogLevel, LoggerCountShipper, LoggerShipper};
use crate::shipper::Shipper;

#[derive(Debug, Deserialize)]
struct CsvConfig {
    path: String,
}

#[derive(Debug, Deserialize)]
struct LoggerConfig {
    #[serde(default)]
    level: LogLevel,
}

/// Builds the concrete shipper named `name` from its raw config. `class` is
/// the closed set `"csv"` | `"logger"` | `"logger_count"`.
pub fn build_shipper(name: &str, raw: &RawPlugin) -> Result<Box<dyn Shipper>, ShipperError> {
    match raw.class.as_str() {
        "csv" => {
            let config: CsvConfig = warden_core::config::resolve_plugin_config(&raw.config)
                .map_err(|e| ShipperError::InvalidConfig(e.to_string()))?;
            Ok(Box::new(CsvShipper::new(name, config.path)))
        }
        "logger" => {
            let config: LoggerConfig = warden_core::config::resolve_plugin_config(&raw.config)
                .map_err(|e| ShipperError::InvalidConfig(e.to_string()))?;
            Ok(Box::new(LoggerShipper::new(name, config.level)))
        }
        "logger_count" => {
            let config: LoggerConfig = warden_core::config::resolve_plugin_config(&raw.config)
                .map_err(|e| ShipperError::InvalidConfig(e.to_string()))?;
            Ok(Box::new(LoggerCountShipper::new(name, config.level)))
        }
        other => Err(ShipperError::UnknownClass(other.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn yaml(source: &str) -> serde_yaml::Value {
        serde_yaml::from_str(source).unwrap()
    }

    #[test]
    fn unknown_class_is_a_shipper_error() {
        let raw = RawPlugin {
            class: "smtp".to_string(),
            config: yaml("{}"),
            limit: None,
        };
        assert!(matches!(
            build_shipper("mail", &raw),
            Err(ShipperError::UnknownClass(_))
        ));
    }

    #[test]
    fn logger_class_builds() {
        let raw = RawPlugin {
            class: "logger".to_string(),
            config: yaml("level: warn"),
            limit: None,
        };
        assert!(build_shipper("log", &raw).is_ok());
    }

    #[test]
    fn logger_class_builds_with_no_config_block() {
        let raw = RawPlugin {
            class: "logger".to_string(),
            config: serde_yaml::Value::Null,
            limit: None,
        };
        assert!(build_shipper("log", &raw).is_ok());
    }
}
