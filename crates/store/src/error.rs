use thiserror::Error;

/// Error taxonomy for the Postgres-backed store (§7), grounded in the
/// teacher's `IngestionStoreError` (`crates/server/src/ingestion/source_store.rs`):
/// one enum, manual mapping of the constraint names that matter, everything
/// else wrapped through `#[from] sqlx::Error`.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("profile name {0:?} is already taken")]
    DuplicateProfile(String),

    #[error("profile {profile:?} already has a field named {field:?}")]
    DuplicateField { profile: String, field: String },

    #[error("investigation index race on group {group_id}, retry")]
    IndexConflict { group_id: i64 },

    #[error("row not found")]
    NotFound,

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Inspects a `sqlx::Error` for a unique-violation (Postgres code `23505`)
/// on `constraint`, turning it into a typed conflict instead of a raw
/// database error. Mirrors the teacher's `map_unique_violation`.
pub fn is_unique_violation(err: &sqlx::Error, constraint: &str) -> bool {
    match err {
        sqlx::Error::Database(db_err) => {
            db_err.code().as_deref() == Some("23505")
                && db_err.constraint() == Some(constraint)
        }
        _ => false,
    }
}
