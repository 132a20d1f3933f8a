use std::collections::HashMap;

use sqlx::PgPool;

use crate::error::StoreError;
use crate::models::Actor;

/// Stateless repository for `actors`.
pub struct ActorStore;

impl ActorStore {
    /// Bulk get-or-create: inserts every `(profile_id, name)` pair not
    /// already present (ignoring conflicts), then selects every row back so
    /// the caller can map `(profile_id, name) -> actor_id` for a whole
    /// batch in one round trip. Mirrors `Pipeline._get_actors`.
    pub async fn get_or_create_many(
        pool: &PgPool,
        pairs: &[(i64, String)],
    ) -> Result<HashMap<(i64, String), i64>, StoreError> {
        if pairs.is_empty() {
            return Ok(HashMap::new());
        }

        let mut tx = pool.begin().await?;
        for (profile_id, name) in pairs {
            sqlx::query(
                "INSERT INTO actors (profile_id, name) VALUES ($1, $2)
                 ON CONFLICT (profile_id, name) DO NOTHING",
            )
            .bind(profile_id)
            .bind(name)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;

        let profile_ids: Vec<i64> = pairs.iter().map(|(p, _)| *p).collect();
        let rows = sqlx::query_as::<_, Actor>(
            "SELECT id, profile_id, name FROM actors WHERE profile_id = ANY($1)",
        )
        .bind(&profile_ids)
        .fetch_all(pool)
        .await?;

        let mut index = HashMap::with_capacity(rows.len());
        for row in rows {
            index.insert((row.profile_id, row.name.clone()), row.id);
        }
        Ok(index)
    }
}
