// POST /auth/login

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::app::AppState;
use crate::auth::{generate_jwt, verify_password, Claims};
use crate::database::store::document_id;
use crate::error::ApiError;
use crate::filter::FilterData;
use crate::middleware::ApiResponse;
use crate::models::{Resource, User};
use crate::types::Collection;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    /// Username or email
    pub username: String,
    pub password: String,
}

/// Exchange credentials for a bearer token
pub async fn login(
    State(state): State<AppState>,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<ApiResponse<Value>, ApiError> {
    let Json(request) = body.map_err(|e| ApiError::invalid_json(e.body_text()))?;

    let mut found = state
        .store
        .find(Collection::Users, &FilterData::new().where_eq("username", &request.username))
        .await?;
    if found.is_empty() {
        found = state
            .store
            .find(Collection::Users, &FilterData::new().where_eq("email", &request.username))
            .await?;
    }

    let Some(doc) = found.into_iter().next() else {
        tracing::warn!("Login failed for unknown user '{}'", request.username);
        return Err(ApiError::unauthorized("Invalid credentials"));
    };
    let user: User = serde_json::from_value(Value::Object(doc.clone())).map_err(|e| {
        tracing::error!("Stored user '{}' is malformed: {}", request.username, e);
        ApiError::internal_server_error("An error occurred while processing your request")
    })?;
    let (Some(user_id), Some(hash)) = (document_id(&doc), user.password.clone()) else {
        return Err(ApiError::unauthorized("Invalid credentials"));
    };

    let password = request.password.clone();
    let verified = tokio::task::spawn_blocking(move || verify_password(&password, &hash))
        .await
        .map_err(|e| {
            tracing::error!("Password verification task failed: {}", e);
            ApiError::internal_server_error("An error occurred while processing your request")
        })??;
    if !verified {
        tracing::warn!("Login failed for '{}': wrong password", request.username);
        return Err(ApiError::unauthorized("Invalid credentials"));
    }

    let claims = Claims::new(user_id, user.role, user.scope(), state.config.security.jwt_expiry_hours);
    let token = generate_jwt(&state.config.security, &claims)?;
    tracing::info!("User '{}' logged in as {}", user.username, user.role);

    Ok(ApiResponse::success(json!({
        "token": token,
        "user": User::present(doc),
    })))
}
