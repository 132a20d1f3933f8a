//! Bounded, backoff-retrying channels — the replacement for the original's
//! `queue.Queue(maxsize=...)`, grounded in `transport/base.py::Transport.send`
//! and `curator/base.py::Curator._ship`, both of which retry
//! `queue.put_nowait` on `Full` with an `ExponentialBackoff` delay rather
//! than blocking indefinitely.

use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

use warden_core::ExponentialBackoff;

use crate::error::QueueError;

pub struct Sender<T> {
    inner: mpsc::Sender<T>,
}

pub struct Receiver<T> {
    inner: mpsc::Receiver<T>,
}

pub fn bounded<T>(capacity: usize) -> (Sender<T>, Receiver<T>) {
    let (tx, rx) = mpsc::channel(capacity);
    (Sender { inner: tx }, Receiver { inner: rx })
}

impl<T> Sender<T> {
    /// Retries `try_send` with exponential backoff while the channel is
    /// full, the same shape as `Transport.send`'s `Full` retry loop.
    pub async fn send_with_backoff(&self, mut item: T) -> Result<(), QueueError> {
        let mut backoff = ExponentialBackoff::new(2, 1.0);
        loop {
            match self.inner.try_send(item) {
                Ok(()) => return Ok(()),
                Err(TrySendError::Full(returned)) => {
                    item = returned;
                    tokio::time::sleep(backoff.next()).await;
                }
                Err(TrySendError::Closed(_)) => return Err(QueueError::Closed),
            }
        }
    }

    /// Plain blocking send for callers that don't need the retry loop
    /// (e.g. the coordinator pushing into its own bounded batch queue,
    /// where backpressure rather than a retry-with-delay is the desired
    /// behavior).
    pub async fn send(&self, item: T) -> Result<(), QueueError> {
        self.inner.send(item).await.map_err(|_| QueueError::Closed)
    }
}

impl<T> Clone for Sender<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T> Receiver<T> {
    pub async fn recv(&mut self) -> Option<T> {
        self.inner.recv().await
    }

    /// Non-blocking pull, for the post-shutdown drain loops that empty a
    /// queue before exiting rather than waiting on the next `recv`.
    pub fn try_recv(&mut self) -> Option<T> {
        self.inner.try_recv().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn delivers_items_in_order() {
        let (tx, mut rx) = bounded::<u32>(4);
        tx.send(1).await.unwrap();
        tx.send(2).await.unwrap();
        assert_eq!(rx.recv().await, Some(1));
        assert_eq!(rx.recv().await, Some(2));
    }

    #[tokio::test]
    async fn recv_returns_none_once_every_sender_drops() {
        let (tx, mut rx) = bounded::<u32>(1);
        drop(tx);
        assert_eq!(rx.recv().await, None);
    }

    #[tokio::test]
    async fn try_recv_returns_none_on_an_empty_queue() {
        let (_tx, mut rx) = bounded::<u32>(1);
        assert_eq!(rx.try_recv(), None);
    }

    #[tokio::test]
    async fn send_with_backoff_retries_until_a_slot_opens() {
        let (tx, mut rx) = bounded::<u32>(1);
        tx.send(1).await.unwrap();
        let sender = tx.clone();
        let handle = tokio::spawn(async move { sender.send_with_backoff(2).await });
        assert_eq!(rx.recv().await, Some(1));
        handle.await.unwrap().unwrap();
        assert_eq!(rx.recv().await, Some(2));
    }
}
