use std::sync::Arc;

use tracing_subscriber::EnvFilter;
use umc_records_api::{app, config, services, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so DATABASE_URL, JWT_SECRET etc. are picked up
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Arc::new(config::config().clone());
    tracing::info!("Starting UMC Records API in {:?} mode", config.environment);
    if config.security.jwt_secret.is_empty() {
        anyhow::bail!("JWT_SECRET must be set outside development");
    }

    let state = AppState::connect(config.clone()).await?;
    services::ensure_admin(&state.records, &config.bootstrap)
        .await
        .map_err(|e| anyhow::anyhow!("failed to create bootstrap admin: {e}"))?;

    let bind_addr = format!("0.0.0.0:{}", config.api.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .map_err(|e| anyhow::anyhow!("failed to bind {bind_addr}: {e}"))?;
    tracing::info!("Listening on http://{}", bind_addr);

    axum::serve(listener, app(state)).await?;
    Ok(())
}
