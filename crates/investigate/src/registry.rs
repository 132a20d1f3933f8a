//! Closed registry resolving the `collector:`/`analyzer:` entries under a
//! `profiles:` config block to concrete types (REDESIGN FLAGS §1).

use std::time::Duration;

use serde::Deserialize;
use warden_core::config::RawPlugin;
use warden_core::ConfigError;

use crate::analyzer::ExponentialDecayAnalyzer;
use crate::collector::TimeRangeCollector;

#[derive(Debug, Deserialize)]
struct TimeRangeConfig {
    #[serde(default = "default_seconds")]
    seconds: i64,
    #[serde(default = "default_interval")]
    interval: f64,
    #[serde(default)]
    delay: f64,
}

fn default_seconds() -> i64 {
    60
}
fn default_interval() -> f64 {
    10.0
}

pub fn build_collector(raw: Option<&RawPlugin>) -> Result<TimeRangeCollector, ConfigError> {
    let Some(raw) = raw else {
        return Ok(TimeRangeCollector::default());
    };
    match raw.class.as_str() {
        "time_range" => {
            let config: TimeRangeConfig = warden_core::config::resolve_plugin_config(&raw.config)
                .map_err(|e| ConfigError::Invalid(format!("collector: {e}")))?;
            Ok(TimeRangeCollector::new(
                config.seconds,
                Duration::from_secs_f64(config.interval),
                Duration::from_secs_f64(config.delay),
            ))
        }
        other => Err(ConfigError::UnknownClass {
            kind: "collector",
            class: other.to_string(),
        }),
    }
}

#[derive(Debug, Deserialize)]
struct ExponentialDecayConfig {
    #[serde(default = "default_weight")]
    weight: f64,
    #[serde(default = "default_decay")]
    decay: f64,
    #[serde(default = "default_threshold")]
    threshold: f64,
}

fn default_weight() -> f64 {
    0.2
}
fn default_decay() -> f64 {
    0.1
}
fn default_threshold() -> f64 {
    0.5
}

pub fn build_analyzer(raw: Option<&RawPlugin>) -> Result<ExponentialDecayAnalyzer, ConfigError> {
    let Some(raw) = raw else {
        return Ok(ExponentialDecayAnalyzer::default());
    };
    match raw.class.as_str() {
        "exponential_decay" => {
            let config: ExponentialDecayConfig =
                warden_core::config::resolve_plugin_config(&raw.config)
                    .map_err(|e| ConfigError::Invalid(format!("analyzer: {e}")))?;
            Ok(ExponentialDecayAnalyzer::new(
                config.weight,
                config.decay,
                config.threshold,
            ))
        }
        other => Err(ConfigError::UnknownClass {
            kind: "analyzer",
            class: other.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_collector_config_uses_defaults() {
        assert!(build_collector(None).is_ok());
    }

    #[test]
    fn unknown_analyzer_class_is_a_config_error() {
        let raw = RawPlugin {
            class: "made_up".to_string(),
            config: serde_yaml::from_str("{}").unwrap(),
            limit: None,
        };
        assert!(matches!(
            build_analyzer(Some(&raw)),
            Err(ConfigError::UnknownClass { .. })
        ));
    }
}
