//! Shippers (§4.6): the sinks an investigation's confirmed anomalies are
//! delivered to once the curator fans a report out.

pub mod csv_shipper;
pub mod entry;
pub mod error;
pub mod logger_shipper;
pub mod registry;
pub mod runner;
pub mod shipper;

pub use entry::ShipperEntry;
pub use error::ShipperError;
pub use registry::build_shipper;
pub use runner::run_shipper;
pub use shipper::Shipper;
