use crm_core::observability::logging::init_tracing;
use crm_service::{
    build_router,
    config::CrmConfig,
    db,
    services::{Database, HttpIdentityProvider},
    AppState,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;

#[tokio::main]
async fn main() -> Result<(), crm_core::error::AppError> {
    // Load configuration - fail fast if invalid
    let config = CrmConfig::from_env()?;

    init_tracing(&config.service_name, &config.log_level);

    tracing::info!(
        service = %config.service_name,
        version = %config.service_version,
        environment = ?config.environment,
        "Starting CRM service"
    );

    // Initialize database
    let pool = db::create_pool(&config.database)
        .await
        .map_err(|e| crm_core::error::AppError::DatabaseError(anyhow::anyhow!(e)))?;
    db::run_migrations(&pool)
        .await
        .map_err(|e| crm_core::error::AppError::DatabaseError(anyhow::anyhow!(e)))?;
    let database = Database::new(pool);

    // Identity provider client
    let identity = HttpIdentityProvider::new(
        config.identity.base_url.clone(),
        Duration::from_secs(config.identity.timeout_seconds),
    )?;
    tracing::info!(base_url = %config.identity.base_url, "Identity provider client initialized");

    let state = AppState::new(config.clone(), database, Arc::new(identity));

    // Build application router
    let app = build_router(state)?;

    // Start server
    let addr = config.common.bind_addr();
    tracing::info!(address = %addr, "Listening");

    let listener = tokio::net::TcpListener::bind(&addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Service shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received SIGINT, starting graceful shutdown");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        },
    }
}
