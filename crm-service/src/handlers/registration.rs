//! Registration handler - atomic tenant provisioning for a newly
//! authenticated principal.

use axum::{extract::State, http::StatusCode, Json};
use crm_core::error::AppError;
use serde::Serialize;
use uuid::Uuid;
use validator::Validate;

use crate::middleware::CurrentSession;
use crate::services::registration;
use crate::utils::ValidatedJson;
use crate::AppState;

/// Request to provision a tenant.
#[derive(Debug, serde::Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 1, max = 200))]
    pub organization_name: String,
    #[validate(length(min = 2, max = 50))]
    pub organization_slug: String,
}

/// Registration response.
#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub user_id: Uuid,
    pub organization_id: Uuid,
    pub org_slug: String,
    pub role: String,
}

/// Mirror the authenticated principal locally and provision their default
/// organization with an owner membership, as one atomic unit.
///
/// POST /register
pub async fn register(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
    ValidatedJson(req): ValidatedJson<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>), AppError> {
    let authenticated = session
        .session
        .as_ref()
        .ok_or_else(|| AppError::Unauthenticated(anyhow::anyhow!("no valid session")))?;

    let record = registration::register(
        &state.db,
        authenticated,
        req.organization_name,
        req.organization_slug,
    )
    .await?;

    tracing::info!(
        user_id = %record.user.user_id,
        organization_id = %record.organization.organization_id,
        "Registered new tenant"
    );

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            user_id: record.user.user_id,
            organization_id: record.organization.organization_id,
            org_slug: record.organization.org_slug,
            role: record.membership.role_code,
        }),
    ))
}
