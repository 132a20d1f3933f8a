//! Ephemeral CSV transport: reads an entire file once, emitting one
//! `Message` per row. Grounded in
//! `original_source/scrywarden/transport/csv.py`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use warden_core::Message;

use crate::error::TransportError;
use crate::runner::{Transport, TransportShape};

pub struct CsvTransport {
    name: String,
    path: String,
    timestamp_column: String,
    rows: Option<Vec<Message>>,
}

impl CsvTransport {
    pub fn new(name: impl Into<String>, path: impl Into<String>, timestamp_column: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            timestamp_column: timestamp_column.into(),
            rows: None,
        }
    }

    fn load(&self) -> Result<Vec<Message>, TransportError> {
        let mut reader = csv::Reader::from_path(&self.path).map_err(|source| TransportError::Csv {
            path: self.path.clone(),
            source,
        })?;

        let headers = reader
            .headers()
            .map_err(|source| TransportError::Csv {
                path: self.path.clone(),
                source,
            })?
            .clone();

        let mut messages = Vec::new();
        for record in reader.records() {
            let record = record.map_err(|source| TransportError::Csv {
                path: self.path.clone(),
                source,
            })?;

            let mut data = Map::new();
            for (header, value) in headers.iter().zip(record.iter()) {
                data.insert(header.to_string(), Value::String(value.to_string()));
            }

            let timestamp = data
                .get(&self.timestamp_column)
                .and_then(Value::as_str)
                .ok_or_else(|| TransportError::MissingColumn(self.timestamp_column.clone()))?;

            let timestamp: DateTime<Utc> = timestamp
                .parse()
                .map_err(|_| TransportError::InvalidTimestamp {
                    column: self.timestamp_column.clone(),
                    value: timestamp.to_string(),
                })?;

            messages.push(Message::new(timestamp, Value::Object(data)));
        }

        Ok(messages)
    }
}

#[async_trait]
impl Transport for CsvTransport {
    fn name(&self) -> &str {
        &self.name
    }

    fn shape(&self) -> TransportShape {
        TransportShape::Ephemeral
    }

    async fn process(&mut self) -> Result<Vec<Message>, TransportError> {
        if let Some(rows) = self.rows.take() {
            return Ok(rows);
        }
        self.load()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[tokio::test]
    async fn reads_every_row_as_one_message() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "timestamp,actor,value").unwrap();
        writeln!(file, "2024-01-01T00:00:00Z,alice,42").unwrap();
        writeln!(file, "2024-01-01T00:01:00Z,bob,7").unwrap();

        let mut transport = CsvTransport::new("csv", file.path().to_str().unwrap(), "timestamp");
        let messages = transport.process().await.unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].data["actor"], "alice");
    }
}
