use sqlx::PgPool;

use crate::error::StoreError;
use crate::models::Event;

/// Stateless repository for the `investigation_events` association table.
pub struct InvestigationEventStore;

impl InvestigationEventStore {
    /// The latest event assigned to `investigation_id`, by `created_at` —
    /// the collector's anchor for the next window once the previous
    /// investigation has been assigned. Mirrors
    /// `Investigator._get_last_investigation_event`.
    pub async fn latest_event(
        pool: &PgPool,
        investigation_id: i64,
    ) -> Result<Option<Event>, StoreError> {
        sqlx::query_as::<_, Event>(
            "SELECT e.id, e.message_id, e.actor_id, e.created_at
             FROM investigation_events ie
             JOIN events e ON e.id = ie.event_id
             WHERE ie.investigation_id = $1
             ORDER BY e.created_at DESC
             LIMIT 1",
        )
        .bind(investigation_id)
        .fetch_optional(pool)
        .await
        .map_err(StoreError::from)
    }
}
