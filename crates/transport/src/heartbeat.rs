//! Interval transport that emits a fixed payload on every tick. Grounded in
//! `original_source/scrywarden/transport/heartbeat.py`; used in cold-start
//! scenarios where nothing else is producing traffic yet.

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use warden_core::Message;

use crate::error::TransportError;
use crate::runner::{Transport, TransportShape};

pub struct HeartbeatTransport {
    name: String,
    interval: Duration,
    payload: Value,
}

impl HeartbeatTransport {
    pub fn new(name: impl Into<String>, interval: Duration, payload: Value) -> Self {
        Self {
            name: name.into(),
            interval,
            payload,
        }
    }
}

#[async_trait]
impl Transport for HeartbeatTransport {
    fn name(&self) -> &str {
        &self.name
    }

    fn shape(&self) -> TransportShape {
        TransportShape::Interval(self.interval)
    }

    async fn process(&mut self) -> Result<Vec<Message>, TransportError> {
        Ok(vec![Message::new(Utc::now(), self.payload.clone())])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn emits_one_message_per_tick() {
        let mut transport =
            HeartbeatTransport::new("hb", Duration::from_secs(5), json!({"kind": "heartbeat"}));
        let first = transport.process().await.unwrap();
        let second = transport.process().await.unwrap();
        assert_eq!(first.len(), 1);
        assert_eq!(second.len(), 1);
        assert_ne!(first[0].id, second[0].id);
    }
}
