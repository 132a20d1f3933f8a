use warden_store::models::{AnomalyEventRow, Investigation};

/// What an investigator hands the curator (§4.1): a completed investigation
/// plus the anomaly rows the Analyzer kept, or a payload-free `Shutdown`
/// naming the profile whose investigator just exited.
#[derive(Debug, Clone)]
pub enum InvestigatorEntry {
    MaliciousActivity {
        investigation: Investigation,
        anomalies: Vec<AnomalyEventRow>,
    },
    Shutdown {
        profile: String,
    },
}
