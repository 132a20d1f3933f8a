use warden_store::models::{AnomalyEventRow, Investigation};

/// What the curator hands each shipper (§4.1): a malicious-activity report,
/// or a payload-free `Blip` used only to wake a shipper blocked on an empty
/// queue once shutdown has been requested.
#[derive(Debug, Clone)]
pub enum ShipperEntry {
    Report {
        investigation: Investigation,
        anomalies: Vec<AnomalyEventRow>,
    },
    Blip,
}
