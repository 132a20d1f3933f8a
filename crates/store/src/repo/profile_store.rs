use sqlx::PgPool;

use crate::error::{is_unique_violation, StoreError};
use crate::models::Profile;

/// Stateless repository for `profiles`, following the teacher's
/// `IngestionSourceStore` shape: no state, one `&PgPool` argument per call.
pub struct ProfileStore;

impl ProfileStore {
    pub async fn get_by_name(pool: &PgPool, name: &str) -> Result<Option<Profile>, StoreError> {
        sqlx::query_as::<_, Profile>("SELECT id, name FROM profiles WHERE name = $1")
            .bind(name)
            .fetch_optional(pool)
            .await
            .map_err(StoreError::from)
    }

    /// Looks up `name`, creating the row if it doesn't exist yet. Mirrors
    /// `Profile.sync`'s get-or-create.
    pub async fn get_or_create(pool: &PgPool, name: &str) -> Result<Profile, StoreError> {
        if let Some(profile) = Self::get_by_name(pool, name).await? {
            return Ok(profile);
        }
        let inserted = sqlx::query_as::<_, Profile>(
            "INSERT INTO profiles (name) VALUES ($1)
             ON CONFLICT (name) DO NOTHING
             RETURNING id, name",
        )
        .bind(name)
        .fetch_optional(pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e, "profiles_name_key") {
                StoreError::DuplicateProfile(name.to_string())
            } else {
                StoreError::from(e)
            }
        })?;

        match inserted {
            Some(profile) => Ok(profile),
            // Lost the race to another syncing process; the row now exists.
            None => Self::get_by_name(pool, name)
                .await?
                .ok_or(StoreError::NotFound),
        }
    }

    pub async fn list(pool: &PgPool) -> Result<Vec<Profile>, StoreError> {
        sqlx::query_as::<_, Profile>("SELECT id, name FROM profiles ORDER BY name")
            .fetch_all(pool)
            .await
            .map_err(StoreError::from)
    }
}
