use thiserror::Error;

/// Error taxonomy for configuration loading and startup validation.
///
/// `ConfigError` and `ProfileError` are always fatal at startup (§7 of the
/// design notes); everything else in the system's error taxonomy lives
/// closer to where it's produced (`StoreError` in `warden-store`,
/// `QueueError` in `warden-queue`, `TransportError`/`ShipperError` in their
/// own crates).
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("unknown class {class:?} for {kind}")]
    UnknownClass { kind: &'static str, class: String },

    #[error("{0}")]
    Invalid(String),
}

/// Two fields collide by name on a profile, or a profile name repeats.
#[derive(Error, Debug)]
pub enum ProfileError {
    #[error("profile {profile:?} contains multiple fields named {field:?}")]
    DuplicateField { profile: String, field: String },

    #[error("multiple profiles share the name {0:?}")]
    DuplicateProfile(String),
}

/// A single message-row failure: JSON serialization failure on one field,
/// or a missing/invalid actor name. Logged by the caller and the row
/// dropped; never propagated.
#[derive(Error, Debug)]
pub enum RowError {
    #[error("actor name for message {message_id} must be a non-empty string")]
    InvalidActor { message_id: uuid::Uuid },

    #[error("message {message_id} value for field {field:?} is not JSON serializable: {source}")]
    NotSerializable {
        message_id: uuid::Uuid,
        field: String,
        #[source]
        source: serde_json::Error,
    },
}
