//! Row types for every table in `migrations/0001_initial.sql` (§3).

use chrono::{DateTime, Utc};
use serde_json::Value;
use uuid::Uuid;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Profile {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Field {
    pub id: i64,
    pub profile_id: i64,
    pub name: String,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Actor {
    pub id: i64,
    pub profile_id: i64,
    pub name: String,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Feature {
    pub id: i64,
    pub field_id: i64,
    pub actor_id: i64,
    pub value: String,
    pub count: i64,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct MessageRow {
    pub id: Uuid,
    pub data: Value,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Event {
    pub id: i64,
    pub message_id: Uuid,
    pub actor_id: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Anomaly {
    pub id: i64,
    pub event_id: i64,
    pub field_id: i64,
    pub feature_id: i64,
    pub score: f64,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct InvestigationGroup {
    pub id: i64,
    pub profile_id: i64,
    pub name: String,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Investigator {
    pub id: Uuid,
    pub profile_id: Option<i64>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Investigation {
    pub id: i64,
    pub group_id: i64,
    pub index: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub created_by: Option<Uuid>,
    pub completed_at: Option<DateTime<Utc>>,
    pub is_assigned: bool,
    pub options: Value,
}

/// A joined anomaly row as the investigator's collector reads it back:
/// one row per `(event, anomaly)` pair in a time window.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AnomalyEventRow {
    pub event_id: i64,
    pub message_id: Uuid,
    pub actor_id: i64,
    pub created_at: DateTime<Utc>,
    pub anomaly_id: i64,
    pub field_id: i64,
    pub feature_id: i64,
    pub score: f64,
}
