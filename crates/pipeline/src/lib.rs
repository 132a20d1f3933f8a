//! The Pipeline Coordinator (§4.3): syncs profiles, launches transports,
//! and runs the ingest batching/scoring loop until every transport shuts
//! down.

pub mod coordinator;
pub mod entry;
pub mod error;

pub use coordinator::Coordinator;
pub use entry::PipelineEntry;
pub use error::PipelineError;
