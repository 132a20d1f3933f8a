//! The investigation process (§4.6-4.8): per-profile investigators claim
//! ordered windows of anomalies, an Analyzer filters them for malicious
//! clusters, and a Curator fans survivors out to shippers.

pub mod analyzer;
pub mod collector;
pub mod curator;
pub mod entry;
pub mod error;
pub mod investigator;
pub mod process;
pub mod registry;

pub use analyzer::ExponentialDecayAnalyzer;
pub use collector::TimeRangeCollector;
pub use curator::Curator;
pub use entry::InvestigatorEntry;
pub use error::InvestigateError;
pub use investigator::Investigator;
pub use process::start;
