use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::watch;
use warden_core::Message;
use warden_queue::Sender;

use crate::entry::TransportEntry;
use crate::error::TransportError;

/// The three scheduling shapes a transport can declare, mirroring
/// `EphemeralTransport`/`RepeatableTransport`/`IntervalTransport` in
/// `transport/base.py`.
#[derive(Debug, Clone, Copy)]
pub enum TransportShape {
    /// Runs `process` exactly once, then shuts down.
    Ephemeral,
    /// Loops `process` back-to-back, yielding cooperatively between calls.
    Repeatable,
    /// Loops `process`, sleeping `Duration` between calls.
    Interval(Duration),
}

/// A source of `Message`s. Each concrete transport owns its connection
/// state (an open file, a tick counter, ...) and produces zero or more
/// messages per `process` call.
#[async_trait]
pub trait Transport: Send {
    fn name(&self) -> &str;
    fn shape(&self) -> TransportShape;
    async fn process(&mut self) -> Result<Vec<Message>, TransportError>;
}

/// Drives one transport according to its shape, forwarding every message
/// onto `sender` and exiting (after a final `Shutdown` entry) once
/// `shutdown` fires or the transport's shape says it's done.
pub async fn run_transport(
    mut transport: Box<dyn Transport>,
    sender: Sender<TransportEntry>,
    mut shutdown: watch::Receiver<bool>,
) {
    let name = transport.name().to_string();
    match transport.shape() {
        TransportShape::Ephemeral => {
            dispatch_one(&name, &mut *transport, &sender).await;
        }
        TransportShape::Repeatable => loop {
            if *shutdown.borrow() {
                break;
            }
            dispatch_one(&name, &mut *transport, &sender).await;
            tokio::task::yield_now().await;
        },
        TransportShape::Interval(interval) => loop {
            if *shutdown.borrow() {
                break;
            }
            dispatch_one(&name, &mut *transport, &sender).await;
            tokio::select! {
                _ = tokio::time::sleep(interval) => {}
                _ = shutdown.changed() => {}
            }
        },
    }

    let _ = sender
        .send(TransportEntry::Shutdown {
            source: name.clone(),
        })
        .await;
}

async fn dispatch_one(name: &str, transport: &mut dyn Transport, sender: &Sender<TransportEntry>) {
    match transport.process().await {
        Ok(messages) => {
            for message in messages {
                if sender
                    .send(TransportEntry::Message {
                        source: name.to_string(),
                        message,
                    })
                    .await
                    .is_err()
                {
                    return;
                }
            }
        }
        Err(err) => {
            tracing::warn!(transport = name, error = %err, "transport process failed");
        }
    }
}
