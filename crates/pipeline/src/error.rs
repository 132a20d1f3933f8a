use thiserror::Error;

use warden_core::{ConfigError, ProfileError};
use warden_store::StoreError;
use warden_transport::TransportError;

/// Fatal startup failures for the `collect` process; anything a running
/// cycle can recover from (a single row's `RowError`, a transient store
/// conflict) is logged inline instead of surfacing here.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Profile(#[from] ProfileError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Transport(#[from] TransportError),
}
