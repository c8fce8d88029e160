//! Membership handlers - invitations, role changes, disabling.
//!
//! Memberships are never hard-deleted; removal is a soft transition to the
//! disabled status.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use crm_core::error::AppError;
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::middleware::CurrentSession;
use crate::models::{
    InviteMemberRequest, MemberRecord, Membership, Page, Role, UpdateMemberRoleRequest,
};
use crate::services::{AccessGuard, NewActivity};
use crate::utils::ValidatedJson;
use crate::AppState;

/// List members of the active organization, pending invitations included.
///
/// GET /members
pub async fn list_members(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
    Query(page): Query<Page>,
) -> Result<Json<Vec<MemberRecord>>, AppError> {
    let ctx = state.guard.require_active_membership(&session).await?;

    let members = state
        .db
        .list_members(ctx.organization.organization_id, page)
        .await?;

    Ok(Json(members))
}

/// Invite a member by email with a pre-assigned role.
///
/// POST /members
pub async fn invite_member(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
    ValidatedJson(req): ValidatedJson<InviteMemberRequest>,
) -> Result<(StatusCode, Json<Membership>), AppError> {
    let ctx = state.guard.require_active_membership(&session).await?;
    AccessGuard::require_role(&ctx, &[Role::Owner, Role::Admin])?;

    // An existing user with an active membership must not be invited twice.
    if let Some(user) = state.db.find_user_by_email(&req.email).await? {
        if let Some(existing) = state
            .db
            .find_membership(ctx.organization.organization_id, user.user_id)
            .await?
        {
            if existing.status()? != crate::models::MembershipStatus::Disabled {
                return Err(AppError::Conflict(anyhow::anyhow!(
                    "{} is already a member of this organization",
                    req.email
                )));
            }
        }
    }

    let membership = Membership::invite(
        ctx.organization.organization_id,
        req.email.clone(),
        req.role,
    );
    state.db.insert_membership(&membership).await?;

    state
        .activity
        .record(
            &ctx,
            NewActivity::new("member.invited", "membership", membership.membership_id)
                .with_metadata(json!({ "email": req.email, "role": req.role.as_str() })),
        )
        .await;

    Ok((StatusCode::CREATED, Json(membership)))
}

/// Request body for accepting an invitation.
#[derive(Debug, Deserialize)]
pub struct AcceptInvitationRequest {
    pub organization_id: Uuid,
}

/// Accept a pending invitation addressed to the session's email. The
/// membership binds to the accepting principal and turns active; the local
/// user mirror is created here when absent.
///
/// POST /members/accept
pub async fn accept_invitation(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
    Json(req): Json<AcceptInvitationRequest>,
) -> Result<Json<Membership>, AppError> {
    // No guard here: the caller has no active membership yet. The session
    // alone authenticates them, and the invitation email is the authority.
    let authenticated = session
        .session
        .as_ref()
        .ok_or_else(|| AppError::Unauthenticated(anyhow::anyhow!("no valid session")))?;

    let full_name = authenticated
        .full_name
        .clone()
        .unwrap_or_else(|| authenticated.email.clone());

    let membership = state
        .db
        .accept_invitation(
            req.organization_id,
            &authenticated.external_id,
            &authenticated.email,
            &full_name,
        )
        .await?;

    tracing::info!(
        organization_id = %req.organization_id,
        membership_id = %membership.membership_id,
        "Invitation accepted"
    );

    Ok(Json(membership))
}

/// Change a member's role. Owners only.
///
/// PATCH /members/:membership_id/role
pub async fn change_member_role(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
    Path(membership_id): Path<Uuid>,
    Json(req): Json<UpdateMemberRoleRequest>,
) -> Result<Json<Membership>, AppError> {
    let ctx = state.guard.require_active_membership(&session).await?;
    AccessGuard::require_role(&ctx, &[Role::Owner])?;

    let membership = state
        .db
        .update_membership_role(ctx.organization.organization_id, membership_id, req.role)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Membership not found")))?;

    state
        .activity
        .record(
            &ctx,
            NewActivity::new("member.role_changed", "membership", membership_id)
                .with_metadata(json!({ "role": req.role.as_str() })),
        )
        .await;

    Ok(Json(membership))
}

/// Disable a membership or revoke a pending invitation.
///
/// POST /members/:membership_id/disable
pub async fn disable_member(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
    Path(membership_id): Path<Uuid>,
) -> Result<Json<Membership>, AppError> {
    let ctx = state.guard.require_active_membership(&session).await?;
    AccessGuard::require_role(&ctx, &[Role::Owner, Role::Admin])?;

    if ctx.membership.membership_id == membership_id {
        return Err(AppError::Conflict(anyhow::anyhow!(
            "Cannot disable your own membership"
        )));
    }

    let membership = state
        .db
        .disable_membership(ctx.organization.organization_id, membership_id)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Membership not found")))?;

    state
        .activity
        .record(
            &ctx,
            NewActivity::new("member.disabled", "membership", membership_id),
        )
        .await;

    Ok(Json(membership))
}
