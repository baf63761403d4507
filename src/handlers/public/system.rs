use axum::{extract::State, http::StatusCode, response::{IntoResponse, Json}};
use serde_json::{json, Value};

use crate::app::AppState;

/// GET / - service description
pub async fn root() -> Json<Value> {
    Json(json!({
        "success": true,
        "data": {
            "name": "UMC Records API",
            "version": env!("CARGO_PKG_VERSION"),
            "description": "Membership records for annual conferences, districts and local churches",
            "endpoints": {
                "auth": "/auth/login (public), /auth/me",
                "hierarchy": "/annual, /district, /localChurch",
                "records": "/membership, /ministry, /family, /council, /attendance, /history",
                "admin": "/user, /logs",
                "health": "/health (public)",
            }
        }
    }))
}

/// GET /health - store connectivity
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match state.store.ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "data": { "status": "ok", "timestamp": now, "database": "ok" }
            })),
        ),
        Err(e) => {
            tracing::error!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "success": false,
                    "message": "Database unavailable",
                    "code": "SERVICE_UNAVAILABLE",
                    "data": { "status": "degraded", "timestamp": now }
                })),
            )
        }
    }
}
