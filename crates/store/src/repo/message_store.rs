use sqlx::PgPool;
use uuid::Uuid;

use crate::error::StoreError;

/// Stateless repository for `messages`.
pub struct MessageStore;

impl MessageStore {
    /// Bulk insert-if-absent: messages already written by an earlier cycle
    /// (shouldn't happen, but the original tolerates it) are left alone.
    pub async fn insert_many(
        pool: &PgPool,
        rows: &[(Uuid, serde_json::Value)],
    ) -> Result<(), StoreError> {
        if rows.is_empty() {
            return Ok(());
        }
        let mut tx = pool.begin().await?;
        for (id, data) in rows {
            sqlx::query(
                "INSERT INTO messages (id, data) VALUES ($1, $2)
                 ON CONFLICT (id) DO NOTHING",
            )
            .bind(id)
            .bind(data)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        Ok(())
    }
}
