//! Organization handlers - listing the caller's organizations and switching
//! the active one.

use axum::{
    extract::{Path, State},
    Json,
};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use crm_core::error::AppError;
use uuid::Uuid;

use crate::middleware::auth::ACTIVE_ORG_COOKIE;
use crate::middleware::CurrentSession;
use crate::models::{MembershipStatus, OrganizationSummary};
use crate::AppState;

/// List the organizations the caller belongs to, with their role in each.
/// A caller with zero memberships gets an empty list, not an error.
///
/// GET /organizations
pub async fn list_organizations(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
) -> Result<Json<Vec<OrganizationSummary>>, AppError> {
    let authenticated = session
        .session
        .as_ref()
        .ok_or_else(|| AppError::Unauthenticated(anyhow::anyhow!("no valid session")))?;

    let Some(user) = state
        .db
        .find_user_by_external_id(&authenticated.external_id)
        .await?
    else {
        return Ok(Json(Vec::new()));
    };

    let organizations = state.db.organizations_for_user(user.user_id).await?;

    Ok(Json(
        organizations
            .into_iter()
            .map(OrganizationSummary::from)
            .collect(),
    ))
}

/// Switch the active organization. The selection is persisted in a cookie
/// and validated against the caller's memberships - it can only narrow to
/// organizations they actively belong to.
///
/// POST /organizations/:organization_id/activate
pub async fn activate_organization(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
    jar: CookieJar,
    Path(organization_id): Path<Uuid>,
) -> Result<(CookieJar, Json<OrganizationSummary>), AppError> {
    let authenticated = session
        .session
        .as_ref()
        .ok_or_else(|| AppError::Unauthenticated(anyhow::anyhow!("no valid session")))?;

    let user = state
        .db
        .find_user_by_external_id(&authenticated.external_id)
        .await?
        .ok_or(AppError::NoOrganization)?;

    let organizations = state.db.organizations_for_user(user.user_id).await?;
    let target = organizations
        .into_iter()
        .find(|o| o.organization_id == organization_id)
        .ok_or(AppError::NoOrganization)?;

    if MembershipStatus::from_code(&target.status_code) != Some(MembershipStatus::Active) {
        return Err(AppError::MembershipInactive);
    }

    let cookie = Cookie::build((ACTIVE_ORG_COOKIE, organization_id.to_string()))
        .path("/")
        .http_only(true)
        .build();

    Ok((jar.add(cookie), Json(OrganizationSummary::from(target))))
}
