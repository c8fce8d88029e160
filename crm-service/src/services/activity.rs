//! Activity recorder - best-effort audit side effect for mutations.
//!
//! Called only after the mutation it describes has committed. A failed
//! write is logged and swallowed; it never rolls back or masks the success
//! of the underlying mutation.

use serde_json::Value;
use uuid::Uuid;

use crate::models::ActivityLog;
use crate::services::{Database, RequestContext};

/// An activity record to append. Organization and actor default to the
/// guard context when omitted, so the recorder drops into any mutation
/// without re-threading identifiers.
#[derive(Debug, Clone)]
pub struct NewActivity {
    pub action: String,
    pub entity_type: String,
    pub entity_id: Uuid,
    pub metadata: Option<Value>,
    pub organization_id: Option<Uuid>,
    pub actor_profile_id: Option<Uuid>,
}

impl NewActivity {
    pub fn new(action: &str, entity_type: &str, entity_id: Uuid) -> Self {
        Self {
            action: action.to_string(),
            entity_type: entity_type.to_string(),
            entity_id,
            metadata: None,
            organization_id: None,
            actor_profile_id: None,
        }
    }

    pub fn with_metadata(mut self, metadata: Value) -> Self {
        self.metadata = Some(metadata);
        self
    }
}

#[derive(Clone)]
pub struct ActivityRecorder {
    db: Database,
}

impl ActivityRecorder {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Append an audit record for a committed mutation. Fire-and-forget:
    /// failures are surfaced as warnings and never propagated.
    pub async fn record(&self, ctx: &RequestContext, activity: NewActivity) {
        let entry = ActivityLog::new(
            activity
                .organization_id
                .unwrap_or(ctx.organization.organization_id),
            activity
                .actor_profile_id
                .unwrap_or(ctx.profile.profile_id),
            activity.action,
            activity.entity_type,
            activity.entity_id,
            activity.metadata,
        );

        if let Err(e) = self.db.insert_activity(&entry).await {
            tracing::warn!(
                error = %e,
                action = %entry.action,
                entity_type = %entry.entity_type,
                entity_id = %entry.entity_id,
                organization_id = %entry.organization_id,
                "Failed to write activity record"
            );
        }
    }
}
