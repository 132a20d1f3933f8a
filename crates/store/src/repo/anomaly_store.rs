use sqlx::PgPool;

use crate::error::StoreError;

/// Stateless repository for `anomalies`.
pub struct AnomalyStore;

/// One anomaly instance to insert against a freshly created event.
pub struct NewAnomaly {
    pub field_id: i64,
    pub feature_id: i64,
    pub score: f64,
}

impl AnomalyStore {
    pub async fn insert_many(
        pool: &PgPool,
        event_id: i64,
        anomalies: &[NewAnomaly],
    ) -> Result<(), StoreError> {
        if anomalies.is_empty() {
            return Ok(());
        }
        let mut tx = pool.begin().await?;
        for anomaly in anomalies {
            sqlx::query(
                "INSERT INTO anomalies (event_id, field_id, feature_id, score)
                 VALUES ($1, $2, $3, $4)",
            )
            .bind(event_id)
            .bind(anomaly.field_id)
            .bind(anomaly.feature_id)
            .bind(anomaly.score)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        Ok(())
    }
}
