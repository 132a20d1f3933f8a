//! Appends every shipped anomaly as one CSV row, writing a header only when
//! the file is new or empty. Grounded in
//! `original_source/scrywarden/shipper/csv.py::CSVShipper`.

use std::fs::OpenOptions;

use async_trait::async_trait;
use warden_store::models::{AnomalyEventRow, Investigation};

use crate::error::ShipperError;
use crate::shipper::Shipper;

pub struct CsvShipper {
    name: String,
    path: String,
}

impl CsvShipper {
    pub fn new(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
        }
    }

    fn needs_header(&self) -> bool {
        std::fs::metadata(&self.path)
            .map(|meta| meta.len() == 0)
            .unwrap_or(true)
    }
}

#[async_trait]
impl Shipper for CsvShipper {
    fn name(&self) -> &str {
        &self.name
    }

    async fn ship(
        &mut self,
        investigation: &Investigation,
        anomalies: &[AnomalyEventRow],
    ) -> Result<(), ShipperError> {
        let write_header = self.needs_header();

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|source| ShipperError::Io {
                path: self.path.clone(),
                source,
            })?;

        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);

        if write_header {
            writer.write_record([
                "investigation_id",
                "event_id",
                "message_id",
                "actor_id",
                "created_at",
                "anomaly_id",
                "field_id",
                "feature_id",
                "score",
            ])?;
        }

        for anomaly in anomalies {
            writer.write_record([
                investigation.id.to_string(),
                anomaly.event_id.to_string(),
                anomaly.message_id.to_string(),
                anomaly.actor_id.to_string(),
                anomaly.created_at.to_rfc3339(),
                anomaly.anomaly_id.to_string(),
                anomaly.field_id.to_string(),
                anomaly.feature_id.to_string(),
                anomaly.score.to_string(),
            ])?;
        }

        writer.flush().map_err(|source| ShipperError::Io {
            path: self.path.clone(),
            source,
        })?;

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
    async fn writes_a_header_only_on_the_first_call() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        let mut shipper = CsvShipper::new("csv", path.to_str().unwrap());

        shipper
            .ship(&investigation(), std::slice::from_ref(&anomaly()))
            .await
            .unwrap();
        shipper
            .ship(&investigation(), std::slice::from_ref(&anomaly()))
            .await
            .unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents.matches("investigation_id").count(), 1);
        assert_eq!(contents.lines().count(), 3);
    }
}
