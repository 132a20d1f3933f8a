use thiserror::Error;

use warden_core::ConfigError;
use warden_queue::QueueError;
use warden_shipper::ShipperError;
use warden_store::StoreError;

#[derive(Debug, Error)]
pub enum InvestigateError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Queue(#[from] QueueError),

    #[error(transparent)]
    Shipper(#[from] ShipperError),
}
