use warden_core::Message;

/// What a transport task hands to the pipeline coordinator. Mirrors
/// `transport/entry.py::TransportEntry`.
#[derive(Debug, Clone)]
pub enum TransportEntry {
    Message { source: String, message: Message },
    Shutdown { source: String },
}
