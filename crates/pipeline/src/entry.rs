use warden_transport::TransportEntry;

/// What arrives on the coordinator's own queue (§4.1): every transport's
/// `TransportEntry`, plus a payload-free `Blip` used to force one loop
/// iteration (the timer callback's only job, and the mechanism that wakes
/// the main loop once `timeout` has been armed).
#[derive(Debug, Clone)]
pub enum PipelineEntry {
    Transport(TransportEntry),
    Blip,
}
