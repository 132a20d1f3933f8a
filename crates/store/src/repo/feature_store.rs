use sqlx::PgPool;

use crate::error::StoreError;
use crate::models::Feature;

/// Stateless repository for `features`.
pub struct FeatureStore;

impl FeatureStore {
    /// Fetches every feature row whose `(field_id, actor_id)` pair appears
    /// in the current batch — the cartesian-ish filter `Pipeline._process`
    /// uses to give reporters everything they could possibly need without
    /// pulling the whole table.
    pub async fn fetch_for_batch(
        pool: &PgPool,
        field_ids: &[i64],
        actor_ids: &[i64],
    ) -> Result<Vec<Feature>, StoreError> {
        if field_ids.is_empty() || actor_ids.is_empty() {
            return Ok(Vec::new());
        }
        sqlx::query_as::<_, Feature>(
            "SELECT id, field_id, actor_id, value, count FROM features
             WHERE field_id = ANY($1) AND actor_id = ANY($2)",
        )
        .bind(field_ids)
        .bind(actor_ids)
        .fetch_all(pool)
        .await
        .map_err(StoreError::from)
    }

    /// Upserts one `(field_id, actor_id, value)` triple, adding `delta` to
    /// the existing count (or creating the row at `delta`). Mirrors
    /// `Pipeline._update_features`'s
    /// `on_conflict_do_update(set_={'count': Feature.count + excluded.count})`.
    pub async fn increment(
        pool: &PgPool,
        field_id: i64,
        actor_id: i64,
        value: &str,
        delta: i64,
    ) -> Result<Feature, StoreError> {
        sqlx::query_as::<_, Feature>(
            "INSERT INTO features (field_id, actor_id, value, count)
             VALUES ($1, $2, $3, $4)
             ON CONFLICT (field_id, actor_id, value)
             DO UPDATE SET count = features.count + excluded.count
             RETURNING id, field_id, actor_id, value, count",
        )
        .bind(field_id)
        .bind(actor_id)
        .bind(value)
        .bind(delta)
        .fetch_one(pool)
        .await
        .map_err(StoreError::from)
    }
}
