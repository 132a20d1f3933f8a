use sqlx::PgPool;

use crate::error::StoreError;
use crate::models::InvestigationGroup;

/// Stateless repository for `investigation_groups`.
pub struct InvestigationGroupStore;

impl InvestigationGroupStore {
    /// Looks up `(profile_id, name)`, creating the row if missing. Mirrors
    /// `Investigator._sync_group`; `name` is `""` unless a group override
    /// is configured (§9 Open Question (c)).
    pub async fn get_or_create(
        pool: &PgPool,
        profile_id: i64,
        name: &str,
    ) -> Result<InvestigationGroup, StoreError> {
        if let Some(group) = sqlx::query_as::<_, InvestigationGroup>(
            "SELECT id, profile_id, name FROM investigation_groups
             WHERE profile_id = $1 AND name = $2",
        )
        .bind(profile_id)
        .bind(name)
        .fetch_optional(pool)
        .await?
        {
            return Ok(group);
        }

        let inserted = sqlx::query_as::<_, InvestigationGroup>(
            "INSERT INTO investigation_groups (profile_id, name) VALUES ($1, $2)
             ON CONFLICT (profile_id, name) DO NOTHING
             RETURNING id, profile_id, name",
        )
        .bind(profile_id)
        .bind(name)
        .fetch_optional(pool)
        .await?;

        match inserted {
            Some(group) => Ok(group),
            None => sqlx::query_as::<_, InvestigationGroup>(
                "SELECT id, profile_id, name FROM investigation_groups
                 WHERE profile_id = $1 AND name = $2",
            )
            .bind(profile_id)
            .bind(name)
            .fetch_optional(pool)
            .await?
            .ok_or(StoreError::NotFound),
        }
    }
}
