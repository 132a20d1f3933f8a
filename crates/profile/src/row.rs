//! Row shapes threaded through `identify`/`process` (§4.4–§4.5). These are
//! the Rust analogue of the original's long-format pandas DataFrames: one
//! struct per row, carried in plain `Vec`s instead of a column store.

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// One `(message, field)` pair produced by `identify`, before the actor
/// name has been resolved to an `actor_id` and the field name to a
/// `field_id`. Pipeline resolves both via the store before scoring.
#[derive(Debug, Clone)]
pub struct IdentifiedRow {
    pub message_id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub actor_name: String,
    pub field_name: String,
    pub value: String,
}

/// A fully resolved message value ready for scoring: actor and field are
/// both database ids.
#[derive(Debug, Clone)]
pub struct ValueRow {
    pub message_id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub actor_id: i64,
    pub field_id: i64,
    pub value: String,
}

/// A [`ValueRow`] with its reporter-assigned anomaly score attached.
#[derive(Debug, Clone)]
pub struct ScoredRow {
    pub message_id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub actor_id: i64,
    pub field_id: i64,
    pub value: String,
    pub score: f64,
}

impl ScoredRow {
    pub fn value_row(&self) -> ValueRow {
        ValueRow {
            message_id: self.message_id,
            timestamp: self.timestamp,
            actor_id: self.actor_id,
            field_id: self.field_id,
            value: self.value.clone(),
        }
    }
}

/// An in-memory feature histogram bucket: the scoring-time view of the
/// `features` table (§3). `feature_id` is `0` for a row that doesn't exist
/// in the store yet; the pipeline resolves real ids at persistence time.
#[derive(Debug, Clone)]
pub struct FeatureRow {
    pub feature_id: i64,
    pub field_id: i64,
    pub actor_id: i64,
    pub value: String,
    pub count: i64,
}
