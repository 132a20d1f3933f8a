use async_trait::async_trait;
use warden_store::models::{AnomalyEventRow, Investigation};

use crate::error::ShipperError;

/// A sink for completed investigations (§4.1, `shipper/base.py::Shipper`).
/// Each concrete shipper owns its own connection or file handle and ships
/// one report at a time.
#[async_trait]
pub trait Shipper: Send {
    fn name(&self) -> &str;
    async fn ship(
        &mut self,
        investigation: &Investigation,
        anomalies: &[AnomalyEventRow],
    ) -> Result<(), ShipperError>;
}
