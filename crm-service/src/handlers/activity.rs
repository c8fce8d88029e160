//! Activity handlers - the organization's audit trail, read-only.

use axum::{
    extract::{Query, State},
    Json,
};
use crm_core::error::AppError;

use crate::middleware::CurrentSession;
use crate::models::{ActivityResponse, Page};
use crate::AppState;

/// List activity for the active organization, most recent first.
///
/// GET /activity
pub async fn list_activity(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
    Query(page): Query<Page>,
) -> Result<Json<Vec<ActivityResponse>>, AppError> {
    let ctx = state.guard.require_active_membership(&session).await?;

    let entries = state
        .db
        .list_activity(ctx.organization.organization_id, page)
        .await?;

    Ok(Json(
        entries.into_iter().map(ActivityResponse::from).collect(),
    ))
}
