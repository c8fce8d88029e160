//! Access guard - the single choke point for every protected operation.
//!
//! Composes session resolution, organization resolution, and membership
//! status into one call that either returns a validated request context or
//! fails before any data access happens. Idempotent and side-effect-free;
//! callers invoke it as the first statement of every protected operation
//! and pass the returned context explicitly downstream.

use anyhow::anyhow;
use crm_core::error::AppError;

use crate::middleware::auth::SessionContext;
use crate::models::{Membership, MembershipStatus, Organization, Profile, Role, User};
use crate::services::{organization, policy, Database};

/// The validated per-request context. Everything downstream of the guard
/// takes its organization id from here, never from client input.
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub user: User,
    pub profile: Profile,
    pub organization: Organization,
    pub membership: Membership,
    pub role: Role,
}

#[derive(Clone)]
pub struct AccessGuard {
    db: Database,
}

impl AccessGuard {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Resolve the caller to `{user, profile, organization, membership, role}`.
    ///
    /// Failure ladder, in order: `Unauthenticated` (no valid session),
    /// `NoOrganization` (no local mirror or zero memberships),
    /// `MembershipInactive` (membership exists but is invited/disabled).
    /// Unknown role or status codes from storage fail as `CorruptRecord`.
    pub async fn require_active_membership(
        &self,
        sctx: &SessionContext,
    ) -> Result<RequestContext, AppError> {
        let session = sctx
            .session
            .as_ref()
            .ok_or_else(|| AppError::Unauthenticated(anyhow!("no valid session")))?;

        // A principal that never registered has no local mirror and hence
        // zero memberships; both cases surface as NoOrganization.
        let user = self
            .db
            .find_user_by_external_id(&session.external_id)
            .await?
            .ok_or(AppError::NoOrganization)?;

        let organizations = self.db.organizations_for_user(user.user_id).await?;
        let active = organization::select_active(&organizations, sctx.selected_org)
            .ok_or(AppError::NoOrganization)?;

        let membership = self
            .db
            .find_membership(active.organization_id, user.user_id)
            .await?
            .ok_or(AppError::NoOrganization)?;

        if membership.status()? != MembershipStatus::Active {
            return Err(AppError::MembershipInactive);
        }
        let role = membership.role()?;

        let organization = self
            .db
            .find_organization_by_id(active.organization_id)
            .await?
            .ok_or_else(|| {
                AppError::CorruptRecord(anyhow!(
                    "membership {} references missing organization {}",
                    membership.membership_id,
                    active.organization_id
                ))
            })?;

        let profile = self
            .db
            .find_profile_by_user(user.user_id)
            .await?
            .ok_or_else(|| {
                AppError::CorruptRecord(anyhow!("user {} has no profile", user.user_id))
            })?;

        Ok(RequestContext {
            user,
            profile,
            organization,
            membership,
            role,
        })
    }

    /// Layer a role requirement on an already-resolved context.
    pub fn require_role(ctx: &RequestContext, required: &[Role]) -> Result<(), AppError> {
        policy::assert_role(Some(ctx.role), required)
    }
}
