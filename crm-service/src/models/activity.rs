//! Activity log model - append-only audit trail, scoped to an organization
//! and attributed to the acting profile.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

/// A single audit record. Immutable once written.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ActivityLog {
    pub activity_id: Uuid,
    pub organization_id: Uuid,
    pub actor_profile_id: Uuid,
    pub action: String,
    pub entity_type: String,
    pub entity_id: Uuid,
    pub metadata: Option<serde_json::Value>,
    pub created_utc: DateTime<Utc>,
}

impl ActivityLog {
    pub fn new(
        organization_id: Uuid,
        actor_profile_id: Uuid,
        action: String,
        entity_type: String,
        entity_id: Uuid,
        metadata: Option<serde_json::Value>,
    ) -> Self {
        Self {
            activity_id: Uuid::new_v4(),
            organization_id,
            actor_profile_id,
            action,
            entity_type,
            entity_id,
            metadata,
            created_utc: Utc::now(),
        }
    }
}

/// Activity response for API.
#[derive(Debug, Serialize)]
pub struct ActivityResponse {
    pub activity_id: Uuid,
    pub actor_profile_id: Uuid,
    pub action: String,
    pub entity_type: String,
    pub entity_id: Uuid,
    pub metadata: Option<serde_json::Value>,
    pub created_utc: DateTime<Utc>,
}

impl From<ActivityLog> for ActivityResponse {
    fn from(a: ActivityLog) -> Self {
        Self {
            activity_id: a.activity_id,
            actor_profile_id: a.actor_profile_id,
            action: a.action,
            entity_type: a.entity_type,
            entity_id: a.entity_id,
            metadata: a.metadata,
            created_utc: a.created_utc,
        }
    }
}
