//! Logs alerts through `tracing` instead of appending them anywhere.
//! Grounded in `original_source/scrywarden/shipper/logger.py`.

use async_trait::async_trait;
use serde::Deserialize;
use warden_store::models::{AnomalyEventRow, Investigation};

use crate::error::ShipperError;
use crate::shipper::Shipper;

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl Default for LogLevel {
    fn default() -> Self {
        LogLevel::Info
    }
}

fn log_at(level: LogLevel, shipper: &str, message: &str) {
    match level {
        LogLevel::Error => tracing::error!(shipper, "{message}"),
        LogLevel::Warn => tracing::warn!(shipper, "{message}"),
        LogLevel::Info => tracing::info!(shipper, "{message}"),
        LogLevel::Debug => tracing::debug!(shipper, "{message}"),
        LogLevel::Trace => tracing::trace!(shipper, "{message}"),
    }
}

/// Logs each anomaly row on its own line.
pub struct LoggerShipper {
    name: String,
    level: LogLevel,
}

impl LoggerShipper {
    pub fn new(name: impl Into<String>, level: LogLevel) -> Self {
        Self {
            name: name.into(),
            level,
        }
    }
}

#[async_trait]
impl Shipper for LoggerShipper {
    fn name(&self) -> &str {
        &self.name
    }

    async fn ship(
        &mut self,
        investigation: &Investigation,
        anomalies: &[AnomalyEventRow],
    ) -> Result<(), ShipperError> {
        for anomaly in anomalies {
            log_at(
                self.level,
                &self.name,
                &format!(
                    "investigation {} event {} actor {} field {} score {}",
                    investigation.id, anomaly.event_id, anomaly.actor_id, anomaly.field_id, anomaly.score
                ),
            );
        }
        Ok(())
    }
}

/// Logs only the count of anomalies in the report, for noisy profiles where
/// per-row logging would flood the log.
pub struct LoggerCountShipper {
    name: String,
    level: LogLevel,
}

impl LoggerCountShipper {
    pub fn new(name: impl Into<String>, level: LogLevel) -> Self {
        Self {
            name: name.into(),
            level,
        }
    }
}

#[async_trait]
impl Shipper for LoggerCountShipper {
    fn name(&self) -> &str {
        &self.name
    }

    async fn ship(
        &mut self,
        investigation: &Investigation,
        anomalies: &[AnomalyEventRow],
    ) -> Result<(), ShipperError> {
        log_at(
            self.level,
            &self.name,
            &format!(
                "investigation {} received {} anomalies",
                investigation.id,
                anomalies.len()
            ),
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn investigation() -> Investigation {
        Investigation {
            id: 1,
            group_id: 1,
            index: Some(0),
            created_at: Utc::now(),
            created_by: None,
            completed_at: None,
            is_assigned: true,
            options: serde_json::json!({}),
        }
    }

    fn anomaly() -> AnomalyEventRow {
        AnomalyEventRow {
            event_id: 10,
            message_id: Uuid::new_v4(),
            actor_id: 3,
            created_at: Utc::now(),
            anomaly_id: 20,
            field_id: 4,
            feature_id: 5,
            score: 0.8,
        }
    }

    #[tokio::test]
    async fn logger_shipper_ships_without_error() {
        let mut shipper = LoggerShipper::new("log", LogLevel::Info);
        shipper
            .ship(&investigation(), &[anomaly(), anomaly()])
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn logger_count_shipper_ships_without_error() {
        let mut shipper = LoggerCountShipper::new("log_count", LogLevel::Warn);
        shipper
            .ship(&investigation(), &[anomaly(), anomaly()])
            .await
            .unwrap();
    }
}
