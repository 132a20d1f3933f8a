use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::StoreError;
use crate::models::{AnomalyEventRow, Event};

/// Stateless repository for `events`.
pub struct EventStore;

impl EventStore {
    /// Inserts one event row per `(message_id, actor_id, timestamp)` group,
    /// as `Pipeline._generate_events` does — one event can carry several
    /// anomalies (one per scored field).
    pub async fn insert(
        pool: &PgPool,
        message_id: Uuid,
        actor_id: i64,
        created_at: DateTime<Utc>,
    ) -> Result<i64, StoreError> {
        let row: (i64,) = sqlx::query_as(
            "INSERT INTO events (message_id, actor_id, created_at)
             VALUES ($1, $2, $3)
             RETURNING id",
        )
        .bind(message_id)
        .bind(actor_id)
        .bind(created_at)
        .fetch_one(pool)
        .await?;
        Ok(row.0)
    }

    pub async fn get(pool: &PgPool, id: i64) -> Result<Option<Event>, StoreError> {
        sqlx::query_as::<_, Event>(
            "SELECT id, message_id, actor_id, created_at FROM events WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(pool)
        .await
        .map_err(StoreError::from)
    }

    /// Finds the first event (by `created_at`) for a profile, used by the
    /// collector to bootstrap the very first investigation window when no
    /// previous investigation exists yet.
    pub async fn first_for_profile(
        pool: &PgPool,
        profile_id: i64,
    ) -> Result<Option<Event>, StoreError> {
        sqlx::query_as::<_, Event>(
            "SELECT e.id, e.message_id, e.actor_id, e.created_at
             FROM events e
             JOIN actors a ON a.id = e.actor_id
             WHERE a.profile_id = $1
             ORDER BY e.created_at ASC
             LIMIT 1",
        )
        .bind(profile_id)
        .fetch_optional(pool)
        .await
        .map_err(StoreError::from)
    }

    /// Finds the next event strictly after `after`, used when a collector
    /// window came up empty and needs to fast-forward to real activity.
    pub async fn next_after(
        pool: &PgPool,
        profile_id: i64,
        after: DateTime<Utc>,
    ) -> Result<Option<Event>, StoreError> {
        sqlx::query_as::<_, Event>(
            "SELECT e.id, e.message_id, e.actor_id, e.created_at
             FROM events e
             JOIN actors a ON a.id = e.actor_id
             WHERE a.profile_id = $1 AND e.created_at > $2
             ORDER BY e.created_at ASC
             LIMIT 1",
        )
        .bind(profile_id)
        .bind(after)
        .fetch_optional(pool)
        .await
        .map_err(StoreError::from)
    }

    /// Joins events+anomalies+actors for a `(start, end]` window scoped to
    /// one profile — the collector's core read. Mirrors
    /// `TimeRangeCollector._fetch_anomalies`.
    pub async fn fetch_anomalies_in_window(
        pool: &PgPool,
        profile_id: i64,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<AnomalyEventRow>, StoreError> {
        sqlx::query_as::<_, AnomalyEventRow>(
            "SELECT e.id AS event_id, e.message_id, e.actor_id, e.created_at,
                    an.id AS anomaly_id, an.field_id, an.feature_id, an.score
             FROM events e
             JOIN actors a ON a.id = e.actor_id
             JOIN anomalies an ON an.event_id = e.id
             WHERE a.profile_id = $1 AND e.created_at > $2 AND e.created_at <= $3
             ORDER BY e.created_at ASC",
        )
        .bind(profile_id)
        .bind(start)
        .bind(end)
        .fetch_all(pool)
        .await
        .map_err(StoreError::from)
    }
}
