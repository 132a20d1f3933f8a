use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{is_unique_violation, StoreError};
use crate::models::Investigation;

/// Stateless repository for `investigations`, implementing the claiming
/// protocol from `investigator/base.py`: a monotonic per-group `index`
/// enforced by the `(group_id, index)` unique constraint is the
/// serialization point, and a row whose `created_by` investigator vanished
/// before assigning it is a tombstone to be reaped.
pub struct InvestigationStore;

impl InvestigationStore {
    /// Most recent investigation in the group, if any.
    pub async fn latest_in_group(
        pool: &PgPool,
        group_id: i64,
    ) -> Result<Option<Investigation>, StoreError> {
        sqlx::query_as::<_, Investigation>(
            "SELECT id, group_id, index, created_at, created_by, completed_at,
                    is_assigned, options
             FROM investigations
             WHERE group_id = $1
             ORDER BY created_at DESC
             LIMIT 1",
        )
        .bind(group_id)
        .fetch_optional(pool)
        .await
        .map_err(StoreError::from)
    }

    /// Re-reads a single investigation by id, used while waiting on a
    /// rendezvous condition (has `created_by` gone missing yet?).
    pub async fn get(pool: &PgPool, id: i64) -> Result<Option<Investigation>, StoreError> {
        sqlx::query_as::<_, Investigation>(
            "SELECT id, group_id, index, created_at, created_by, completed_at,
                    is_assigned, options
             FROM investigations
             WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(pool)
        .await
        .map_err(StoreError::from)
    }

    /// Deletes a row whose owning investigator died before assigning it —
    /// the tombstone-reaping step of the claim loop.
    pub async fn delete(pool: &PgPool, id: i64) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM investigations WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(())
    }

    /// Attempts to claim the next index in `group_id` for `investigator_id`.
    /// A unique-violation on `(group_id, index)` means another investigator
    /// won the race for this index; the caller should re-read the latest
    /// row and retry with the next index.
    pub async fn try_create(
        pool: &PgPool,
        group_id: i64,
        index: i64,
        investigator_id: Uuid,
    ) -> Result<Investigation, StoreError> {
        sqlx::query_as::<_, Investigation>(
            "INSERT INTO investigations (group_id, index, created_at, created_by, is_assigned, options)
             VALUES ($1, $2, now(), $3, false, '{}'::jsonb)
             RETURNING id, group_id, index, created_at, created_by, completed_at,
                       is_assigned, options",
        )
        .bind(group_id)
        .bind(index)
        .bind(investigator_id)
        .fetch_one(pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e, "investigations_group_id_index_key") {
                StoreError::IndexConflict { group_id }
            } else {
                StoreError::from(e)
            }
        })
    }

    /// Publishes the claim: marks the investigation assigned and links
    /// every distinct event in the window to it, all in one transaction so
    /// no other investigator can observe a half-claimed window.
    pub async fn assign(
        pool: &PgPool,
        investigation_id: i64,
        event_ids: &[i64],
    ) -> Result<(), StoreError> {
        let mut tx = pool.begin().await?;
        sqlx::query("UPDATE investigations SET is_assigned = true WHERE id = $1")
            .bind(investigation_id)
            .execute(&mut *tx)
            .await?;
        for event_id in event_ids {
            sqlx::query(
                "INSERT INTO investigation_events (investigation_id, event_id)
                 VALUES ($1, $2)
                 ON CONFLICT (investigation_id, event_id) DO NOTHING",
            )
            .bind(investigation_id)
            .bind(event_id)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        Ok(())
    }

    pub async fn complete(
        pool: &PgPool,
        investigation_id: i64,
        completed_at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        sqlx::query("UPDATE investigations SET completed_at = $2 WHERE id = $1")
            .bind(investigation_id)
            .bind(completed_at)
            .execute(pool)
            .await?;
        Ok(())
    }
}
