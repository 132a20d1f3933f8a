use sqlx::PgPool;
use uuid::Uuid;

use crate::error::StoreError;

/// Stateless repository for `investigators`. Every investigator task
/// registers a row for the lifetime of its process and removes it on clean
/// shutdown, so a dangling row (without a clean removal) is exactly the
/// tombstone signal the claiming protocol reaps.
pub struct InvestigatorStore;

impl InvestigatorStore {
    pub async fn register(pool: &PgPool, id: Uuid, profile_id: i64) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO investigators (id, profile_id, created_at) VALUES ($1, $2, now())",
        )
        .bind(id)
        .bind(profile_id)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Removes this investigator's own row on shutdown, "to allow
    /// unassigned investigations to be removed" by the next claimant.
    pub async fn deregister(pool: &PgPool, id: Uuid) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM investigators WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(())
    }
}
