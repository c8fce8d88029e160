//! Registration - atomic tenant provisioning.
//!
//! A newly authenticated principal is mirrored locally and given a default
//! organization with an owner membership, all in one transaction. No
//! partial tenant is ever observable.

use anyhow::anyhow;
use crm_core::error::AppError;

use crate::middleware::auth::AuthenticatedSession;
use crate::models::{Organization, User};
use crate::services::{Database, RegistrationRecord};

/// Provision a tenant for the authenticated session.
///
/// Fails with `Conflict` when the principal is already registered or the
/// requested slug is taken; the uniqueness constraints back both checks up
/// under concurrency, in which case the transaction rolls back whole.
pub async fn register(
    db: &Database,
    session: &AuthenticatedSession,
    organization_name: String,
    organization_slug: String,
) -> Result<RegistrationRecord, AppError> {
    if db
        .find_user_by_external_id(&session.external_id)
        .await?
        .is_some()
    {
        return Err(AppError::Conflict(anyhow!("User is already registered")));
    }

    if db
        .find_organization_by_slug(&organization_slug)
        .await?
        .is_some()
    {
        return Err(AppError::Conflict(anyhow!(
            "Organization slug {:?} is already taken",
            organization_slug
        )));
    }

    let full_name = session
        .full_name
        .clone()
        .unwrap_or_else(|| session.email.clone());
    let user = User::new(session.external_id.clone(), session.email.clone(), full_name);
    let organization = Organization::new(organization_slug, organization_name);

    db.register_user(user, organization).await
}
