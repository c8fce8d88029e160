//! Template handlers - tenant-scoped document templates.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use crm_core::error::AppError;
use uuid::Uuid;

use crate::middleware::CurrentSession;
use crate::models::{
    CreateTemplateRequest, DocumentStatus, Page, Role, Template, TemplateResponse,
    UpdateTemplateRequest,
};
use crate::services::{AccessGuard, NewActivity};
use crate::utils::ValidatedJson;
use crate::AppState;

/// List templates in the active organization.
///
/// GET /templates
pub async fn list_templates(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
    Query(page): Query<Page>,
) -> Result<Json<Vec<TemplateResponse>>, AppError> {
    let ctx = state.guard.require_active_membership(&session).await?;

    let templates = state
        .db
        .list_templates(ctx.organization.organization_id, page)
        .await?;

    Ok(Json(
        templates.into_iter().map(TemplateResponse::from).collect(),
    ))
}

/// Get a template by id.
///
/// GET /templates/:template_id
pub async fn get_template(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
    Path(template_id): Path<Uuid>,
) -> Result<Json<TemplateResponse>, AppError> {
    let ctx = state.guard.require_active_membership(&session).await?;

    let template = state
        .db
        .find_template(ctx.organization.organization_id, template_id)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Template not found")))?;

    Ok(Json(TemplateResponse::from(template)))
}

/// Create a template as a draft.
///
/// POST /templates
pub async fn create_template(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
    ValidatedJson(req): ValidatedJson<CreateTemplateRequest>,
) -> Result<(StatusCode, Json<TemplateResponse>), AppError> {
    let ctx = state.guard.require_active_membership(&session).await?;
    AccessGuard::require_role(&ctx, &[Role::Owner, Role::Admin])?;

    let template = Template::new(
        ctx.organization.organization_id,
        req.template_name,
        req.body,
    );
    state.db.insert_template(&template).await?;

    state
        .activity
        .record(
            &ctx,
            NewActivity::new("template.created", "template", template.template_id),
        )
        .await;

    Ok((StatusCode::CREATED, Json(TemplateResponse::from(template))))
}

/// Update a template's fields. Bumps the version; status never changes
/// through this path.
///
/// PATCH /templates/:template_id
pub async fn update_template(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
    Path(template_id): Path<Uuid>,
    ValidatedJson(req): ValidatedJson<UpdateTemplateRequest>,
) -> Result<Json<TemplateResponse>, AppError> {
    let ctx = state.guard.require_active_membership(&session).await?;
    AccessGuard::require_role(&ctx, &[Role::Owner, Role::Admin])?;

    let template = state
        .db
        .update_template(ctx.organization.organization_id, template_id, &req)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Template not found")))?;

    state
        .activity
        .record(
            &ctx,
            NewActivity::new("template.updated", "template", template_id),
        )
        .await;

    Ok(Json(TemplateResponse::from(template)))
}

async fn transition(
    state: &AppState,
    session: &crate::middleware::SessionContext,
    template_id: Uuid,
    to: DocumentStatus,
    action: &str,
) -> Result<Json<TemplateResponse>, AppError> {
    let ctx = state.guard.require_active_membership(session).await?;
    AccessGuard::require_role(&ctx, &[Role::Owner, Role::Admin])?;

    let template = state
        .db
        .transition_template_status(ctx.organization.organization_id, template_id, to)
        .await?;

    state
        .activity
        .record(&ctx, NewActivity::new(action, "template", template_id))
        .await;

    Ok(Json(TemplateResponse::from(template)))
}

/// Publish a draft template.
///
/// POST /templates/:template_id/publish
pub async fn publish_template(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
    Path(template_id): Path<Uuid>,
) -> Result<Json<TemplateResponse>, AppError> {
    transition(
        &state,
        &session,
        template_id,
        DocumentStatus::Published,
        "template.published",
    )
    .await
}

/// Take a published template back to draft.
///
/// POST /templates/:template_id/unpublish
pub async fn unpublish_template(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
    Path(template_id): Path<Uuid>,
) -> Result<Json<TemplateResponse>, AppError> {
    transition(
        &state,
        &session,
        template_id,
        DocumentStatus::Draft,
        "template.unpublished",
    )
    .await
}

/// Archive a template.
///
/// POST /templates/:template_id/archive
pub async fn archive_template(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
    Path(template_id): Path<Uuid>,
) -> Result<Json<TemplateResponse>, AppError> {
    transition(
        &state,
        &session,
        template_id,
        DocumentStatus::Archived,
        "template.archived",
    )
    .await
}
