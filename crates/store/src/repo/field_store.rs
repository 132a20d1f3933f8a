use sqlx::PgPool;

use crate::error::StoreError;
use crate::models::Field;

/// Stateless repository for `fields`.
pub struct FieldStore;

impl FieldStore {
    pub async fn list_for_profile(
        pool: &PgPool,
        profile_id: i64,
    ) -> Result<Vec<Field>, StoreError> {
        sqlx::query_as::<_, Field>(
            "SELECT id, profile_id, name FROM fields WHERE profile_id = $1 ORDER BY id",
        )
        .bind(profile_id)
        .fetch_all(pool)
        .await
        .map_err(StoreError::from)
    }

    /// Looks up `(profile_id, name)`, creating the row if missing. Mirrors
    /// `Profile.sync`'s per-field get-or-create loop.
    pub async fn get_or_create(
        pool: &PgPool,
        profile_id: i64,
        name: &str,
    ) -> Result<Field, StoreError> {
        if let Some(field) = sqlx::query_as::<_, Field>(
            "SELECT id, profile_id, name FROM fields WHERE profile_id = $1 AND name = $2",
        )
        .bind(profile_id)
        .bind(name)
        .fetch_optional(pool)
        .await?
        {
            return Ok(field);
        }

        let inserted = sqlx::query_as::<_, Field>(
            "INSERT INTO fields (profile_id, name) VALUES ($1, $2)
             ON CONFLICT (profile_id, name) DO NOTHING
             RETURNING id, profile_id, name",
        )
        .bind(profile_id)
        .bind(name)
        .fetch_optional(pool)
        .await?;

        match inserted {
            Some(field) => Ok(field),
            None => sqlx::query_as::<_, Field>(
                "SELECT id, profile_id, name FROM fields WHERE profile_id = $1 AND name = $2",
            )
            .bind(profile_id)
            .bind(name)
            .fetch_optional(pool)
            .await?
            .ok_or(StoreError::NotFound),
        }
    }
}
