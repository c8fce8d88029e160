//! Offer handlers - tenant-scoped business documents with explicit
//! publish/unpublish/archive transitions.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use crm_core::error::AppError;
use serde_json::json;
use uuid::Uuid;

use crate::middleware::CurrentSession;
use crate::models::{
    CreateOfferRequest, DocumentStatus, Offer, OfferResponse, Page, Role, UpdateOfferRequest,
};
use crate::services::{AccessGuard, NewActivity};
use crate::utils::ValidatedJson;
use crate::AppState;

/// List offers in the active organization.
///
/// GET /offers
pub async fn list_offers(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
    Query(page): Query<Page>,
) -> Result<Json<Vec<OfferResponse>>, AppError> {
    let ctx = state.guard.require_active_membership(&session).await?;

    let offers = state
        .db
        .list_offers(ctx.organization.organization_id, page)
        .await?;

    Ok(Json(offers.into_iter().map(OfferResponse::from).collect()))
}

/// Get an offer by id.
///
/// GET /offers/:offer_id
pub async fn get_offer(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
    Path(offer_id): Path<Uuid>,
) -> Result<Json<OfferResponse>, AppError> {
    let ctx = state.guard.require_active_membership(&session).await?;

    let offer = state
        .db
        .find_offer(ctx.organization.organization_id, offer_id)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Offer not found")))?;

    Ok(Json(OfferResponse::from(offer)))
}

/// Create an offer as a draft. A referenced client must belong to the
/// active organization.
///
/// POST /offers
pub async fn create_offer(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
    ValidatedJson(req): ValidatedJson<CreateOfferRequest>,
) -> Result<(StatusCode, Json<OfferResponse>), AppError> {
    let ctx = state.guard.require_active_membership(&session).await?;
    AccessGuard::require_role(&ctx, &[Role::Owner, Role::Admin, Role::Member])?;

    let offer = Offer::new(
        ctx.organization.organization_id,
        req.title,
        req.client_id,
        req.amount_cents,
    );
    state.db.insert_offer(&offer).await?;

    state
        .activity
        .record(
            &ctx,
            NewActivity::new("offer.created", "offer", offer.offer_id)
                .with_metadata(json!({ "title": offer.title })),
        )
        .await;

    Ok((StatusCode::CREATED, Json(OfferResponse::from(offer))))
}

/// Update an offer's fields. Bumps the version; status never changes
/// through this path.
///
/// PATCH /offers/:offer_id
pub async fn update_offer(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
    Path(offer_id): Path<Uuid>,
    ValidatedJson(req): ValidatedJson<UpdateOfferRequest>,
) -> Result<Json<OfferResponse>, AppError> {
    let ctx = state.guard.require_active_membership(&session).await?;
    AccessGuard::require_role(&ctx, &[Role::Owner, Role::Admin, Role::Member])?;

    let offer = state
        .db
        .update_offer(ctx.organization.organization_id, offer_id, &req)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Offer not found")))?;

    state
        .activity
        .record(&ctx, NewActivity::new("offer.updated", "offer", offer_id))
        .await;

    Ok(Json(OfferResponse::from(offer)))
}

async fn transition(
    state: &AppState,
    session: &crate::middleware::SessionContext,
    offer_id: Uuid,
    to: DocumentStatus,
    action: &str,
) -> Result<Json<OfferResponse>, AppError> {
    let ctx = state.guard.require_active_membership(session).await?;
    AccessGuard::require_role(&ctx, &[Role::Owner, Role::Admin])?;

    let offer = state
        .db
        .transition_offer_status(ctx.organization.organization_id, offer_id, to)
        .await?;

    state
        .activity
        .record(&ctx, NewActivity::new(action, "offer", offer_id))
        .await;

    Ok(Json(OfferResponse::from(offer)))
}

/// Publish a draft offer.
///
/// POST /offers/:offer_id/publish
pub async fn publish_offer(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
    Path(offer_id): Path<Uuid>,
) -> Result<Json<OfferResponse>, AppError> {
    transition(
        &state,
        &session,
        offer_id,
        DocumentStatus::Published,
        "offer.published",
    )
    .await
}

/// Take a published offer back to draft. This is the only path from
/// published to draft.
///
/// POST /offers/:offer_id/unpublish
pub async fn unpublish_offer(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
    Path(offer_id): Path<Uuid>,
) -> Result<Json<OfferResponse>, AppError> {
    transition(
        &state,
        &session,
        offer_id,
        DocumentStatus::Draft,
        "offer.unpublished",
    )
    .await
}

/// Archive an offer.
///
/// POST /offers/:offer_id/archive
pub async fn archive_offer(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
    Path(offer_id): Path<Uuid>,
) -> Result<Json<OfferResponse>, AppError> {
    transition(
        &state,
        &session,
        offer_id,
        DocumentStatus::Archived,
        "offer.archived",
    )
    .await
}
