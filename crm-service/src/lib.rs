pub mod config;
pub mod db;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;
pub mod utils;

use axum::{
    middleware::{from_fn, from_fn_with_state},
    routing::{get, patch, post},
    Router,
};
use crm_core::error::AppError;
use crm_core::middleware::{
    security_headers::security_headers_middleware, tracing::request_id_middleware,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::config::CrmConfig;
use crate::services::{AccessGuard, ActivityRecorder, Database, IdentityProvider};

#[derive(Clone)]
pub struct AppState {
    pub config: CrmConfig,
    pub db: Database,
    pub identity: Arc<dyn IdentityProvider>,
    pub guard: AccessGuard,
    pub activity: ActivityRecorder,
}

impl AppState {
    pub fn new(config: CrmConfig, db: Database, identity: Arc<dyn IdentityProvider>) -> Self {
        let guard = AccessGuard::new(db.clone());
        let activity = ActivityRecorder::new(db.clone());
        Self {
            config,
            db,
            identity,
            guard,
            activity,
        }
    }
}

pub fn build_router(state: AppState) -> Result<Router, AppError> {
    let cors = CorsLayer::new()
        .allow_origin(
            state
                .config
                .security
                .allowed_origins
                .iter()
                .map(|o| {
                    o.parse::<axum::http::HeaderValue>().unwrap_or_else(|e| {
                        tracing::error!("Invalid CORS origin '{}': {}. Using fallback.", o, e);
                        axum::http::HeaderValue::from_static("*")
                    })
                })
                .collect::<Vec<axum::http::HeaderValue>>(),
        )
        .allow_methods([
            axum::http::Method::GET,
            axum::http::Method::POST,
            axum::http::Method::PATCH,
            axum::http::Method::OPTIONS,
        ])
        .allow_headers([
            axum::http::header::AUTHORIZATION,
            axum::http::header::CONTENT_TYPE,
        ]);

    let app = Router::new()
        .route("/health", get(health_check))
        .route("/register", post(handlers::registration::register))
        .route(
            "/organizations",
            get(handlers::organizations::list_organizations),
        )
        .route(
            "/organizations/:organization_id/activate",
            post(handlers::organizations::activate_organization),
        )
        .route(
            "/clients",
            get(handlers::clients::list_clients).post(handlers::clients::create_client),
        )
        .route(
            "/clients/:client_id",
            get(handlers::clients::get_client).patch(handlers::clients::update_client),
        )
        .route(
            "/clients/:client_id/archive",
            post(handlers::clients::archive_client),
        )
        .route(
            "/clients/:client_id/restore",
            post(handlers::clients::restore_client),
        )
        .route(
            "/offers",
            get(handlers::offers::list_offers).post(handlers::offers::create_offer),
        )
        .route(
            "/offers/:offer_id",
            get(handlers::offers::get_offer).patch(handlers::offers::update_offer),
        )
        .route(
            "/offers/:offer_id/publish",
            post(handlers::offers::publish_offer),
        )
        .route(
            "/offers/:offer_id/unpublish",
            post(handlers::offers::unpublish_offer),
        )
        .route(
            "/offers/:offer_id/archive",
            post(handlers::offers::archive_offer),
        )
        .route(
            "/templates",
            get(handlers::templates::list_templates).post(handlers::templates::create_template),
        )
        .route(
            "/templates/:template_id",
            get(handlers::templates::get_template).patch(handlers::templates::update_template),
        )
        .route(
            "/templates/:template_id/publish",
            post(handlers::templates::publish_template),
        )
        .route(
            "/templates/:template_id/unpublish",
            post(handlers::templates::unpublish_template),
        )
        .route(
            "/templates/:template_id/archive",
            post(handlers::templates::archive_template),
        )
        .route(
            "/members",
            get(handlers::members::list_members).post(handlers::members::invite_member),
        )
        .route(
            "/members/accept",
            post(handlers::members::accept_invitation),
        )
        .route(
            "/members/:membership_id/role",
            patch(handlers::members::change_member_role),
        )
        .route(
            "/members/:membership_id/disable",
            post(handlers::members::disable_member),
        )
        .route("/activity", get(handlers::activity::list_activity))
        .with_state(state.clone())
        // Route guarding consumes the session context, so the session
        // middleware must run before it.
        .layer(from_fn(middleware::route_guard_middleware))
        .layer(from_fn_with_state(
            state.clone(),
            middleware::session_middleware,
        ))
        // Tracing layer with request-id correlation
        .layer(TraceLayer::new_for_http().make_span_with(
            |request: &axum::http::Request<_>| {
                let request_id = request
                    .headers()
                    .get("x-request-id")
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or("-");

                tracing::info_span!(
                    "http_request",
                    request_id = %request_id,
                    method = %request.method(),
                    uri = %request.uri(),
                )
            },
        ))
        .layer(from_fn(request_id_middleware))
        .layer(from_fn(security_headers_middleware))
        .layer(cors);

    Ok(app)
}

/// Service health check.
pub async fn health_check(
    axum::extract::State(state): axum::extract::State<AppState>,
) -> Result<axum::Json<serde_json::Value>, AppError> {
    state.db.health_check().await.map_err(|e| {
        tracing::error!(error = %e, "Database health check failed");
        e
    })?;

    Ok(axum::Json(serde_json::json!({
        "status": "healthy",
        "service": state.config.service_name,
        "version": state.config.service_version,
        "checks": {
            "postgres": "up"
        }
    })))
}
