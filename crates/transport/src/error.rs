use thiserror::Error;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("csv error in {path}: {source}")]
    Csv {
        path: String,
        #[source]
        source: csv::Error,
    },

    #[error("column {0:?} missing from csv row")]
    MissingColumn(String),

    #[error("column {column:?} is not a valid RFC 3339 timestamp: {value:?}")]
    InvalidTimestamp { column: String, value: String },

    #[error("unknown transport class {0:?}")]
    UnknownClass(String),

    #[error("invalid transport config: {0}")]
    InvalidConfig(String),
}
