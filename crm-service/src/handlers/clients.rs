//! Client handlers - organization-scoped customer records.

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
    Client, ClientResponse, ClientStatus, CreateClientRequest, Page, Role, UpdateClientRequest,
};
use crate::services::{AccessGuard, NewActivity};
use crate::utils::ValidatedJson;
use crate::AppState;

/// List clients in the active organization.
///
/// GET /clients
pub async fn list_clients(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
    Query(page): Query<Page>,
) -> Result<Json<Vec<ClientResponse>>, AppError> {
    let ctx = state.guard.require_active_membership(&session).await?;

    let clients = state
        .db
        .list_clients(ctx.organization.organization_id, page)
        .await?;

    Ok(Json(clients.into_iter().map(ClientResponse::from).collect()))
}

/// Get a client by id.
///
/// GET /clients/:client_id
pub async fn get_client(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
    Path(client_id): Path<Uuid>,
) -> Result<Json<ClientResponse>, AppError> {
    let ctx = state.guard.require_active_membership(&session).await?;

    let client = state
        .db
        .find_client(ctx.organization.organization_id, client_id)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Client not found")))?;

    Ok(Json(ClientResponse::from(client)))
}

/// Create a client.
///
/// POST /clients
pub async fn create_client(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
    ValidatedJson(req): ValidatedJson<CreateClientRequest>,
) -> Result<(StatusCode, Json<ClientResponse>), AppError> {
    let ctx = state.guard.require_active_membership(&session).await?;
    AccessGuard::require_role(&ctx, &[Role::Owner, Role::Admin, Role::Member])?;

    let client = Client::new(
        ctx.organization.organization_id,
        req.client_name,
        req.contact_email,
        req.contact_phone,
    );
    state.db.insert_client(&client).await?;

    state
        .activity
        .record(
            &ctx,
            NewActivity::new("client.created", "client", client.client_id)
                .with_metadata(json!({ "client_name": client.client_name })),
        )
        .await;

    Ok((StatusCode::CREATED, Json(ClientResponse::from(client))))
}

/// Update a client's fields. Status never changes through this path.
///
/// PATCH /clients/:client_id
pub async fn update_client(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
    Path(client_id): Path<Uuid>,
    ValidatedJson(req): ValidatedJson<UpdateClientRequest>,
) -> Result<Json<ClientResponse>, AppError> {
    let ctx = state.guard.require_active_membership(&session).await?;
    AccessGuard::require_role(&ctx, &[Role::Owner, Role::Admin, Role::Member])?;

    let client = state
        .db
        .update_client(ctx.organization.organization_id, client_id, &req)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Client not found")))?;

    state
        .activity
        .record(&ctx, NewActivity::new("client.updated", "client", client_id))
        .await;

    Ok(Json(ClientResponse::from(client)))
}

/// Archive a client (explicit status transition).
///
/// POST /clients/:client_id/archive
pub async fn archive_client(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
    Path(client_id): Path<Uuid>,
) -> Result<Json<ClientResponse>, AppError> {
    let ctx = state.guard.require_active_membership(&session).await?;
    AccessGuard::require_role(&ctx, &[Role::Owner, Role::Admin])?;

    let client = state
        .db
        .transition_client_status(
            ctx.organization.organization_id,
            client_id,
            ClientStatus::Archived,
        )
        .await?;

    state
        .activity
        .record(&ctx, NewActivity::new("client.archived", "client", client_id))
        .await;

    Ok(Json(ClientResponse::from(client)))
}

/// Restore an archived client.
///
/// POST /clients/:client_id/restore
pub async fn restore_client(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
    Path(client_id): Path<Uuid>,
) -> Result<Json<ClientResponse>, AppError> {
    let ctx = state.guard.require_active_membership(&session).await?;
    AccessGuard::require_role(&ctx, &[Role::Owner, Role::Admin])?;

    let client = state
        .db
        .transition_client_status(
            ctx.organization.organization_id,
            client_id,
            ClientStatus::Active,
        )
        .await?;

    state
        .activity
        .record(&ctx, NewActivity::new("client.restored", "client", client_id))
        .await;

    Ok(Json(ClientResponse::from(client)))
}
