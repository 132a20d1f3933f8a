use thiserror::Error;

#[derive(Debug, Error)]
pub enum ShipperError {
    #[error("failed to open {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("csv write error: {0}")]
    Csv(#[from] csv::Error),

    #[error("unknown shipper class {0:?}")]
    UnknownClass(String),

    #[error("invalid shipper config: {0}")]
    InvalidConfig(String),
}
