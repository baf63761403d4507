use std::collections::HashMap;

use axum::{
    async_trait,
    extract::{FromRequestParts, Path, Request, State},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
    RequestExt,
};
use uuid::Uuid;

use crate::app::AppState;
use crate::auth::{decode_jwt, AccessScope};
use crate::database::Document;
use crate::error::ApiError;
use crate::models::{Resource, User};
use crate::types::{Collection, Role};

/// The authenticated user, attached to the request by [`authorize`]
#[derive(Clone, Debug)]
pub struct Caller {
    pub id: Uuid,
    pub role: Role,
    /// Scope entity of annual/district/local users
    pub scope_id: Option<Uuid>,
    pub access: AccessScope,
    /// Stored user document without the password hash
    pub user: Document,
}

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for Caller {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Caller>()
            .cloned()
            .ok_or_else(|| ApiError::unauthorized("Authentication required"))
    }
}

/// Roles allowed through one route, optionally tied to the `:id` path parameter
#[derive(Debug, Clone, Copy)]
pub struct Gate {
    roles: &'static [Role],
    validate_entity_id: bool,
}

impl Gate {
    pub const fn new(roles: &'static [Role]) -> Self {
        Self { roles, validate_entity_id: false }
    }

    /// Non-admin callers may only target their own scope entity
    pub const fn validate_entity_id(mut self) -> Self {
        self.validate_entity_id = true;
        self
    }

    pub fn allows(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }
}

/// Middleware state: the application plus the gate of the route it guards
#[derive(Clone)]
pub struct GateState {
    pub app: AppState,
    pub gate: Gate,
}

impl GateState {
    pub fn new(app: &AppState, gate: Gate) -> Self {
        Self { app: app.clone(), gate }
    }
}

/// Bearer authentication and role check for a gated route
pub async fn authorize(
    State(GateState { app, gate }): State<GateState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = bearer_token(request.headers())?;

    let claims = decode_jwt(&app.config.security, &token).map_err(|e| {
        tracing::warn!("Rejected bearer token: {}", e);
        ApiError::forbidden("Invalid or expired token")
    })?;

    let Some(doc) = app.store.find_by_id(Collection::Users, claims.sub).await? else {
        tracing::warn!("Token subject {} no longer exists", claims.sub);
        return Err(ApiError::forbidden("User not found"));
    };
    let user: User = serde_json::from_value(serde_json::Value::Object(doc.clone())).map_err(|e| {
        tracing::error!("Stored user {} is malformed: {}", claims.sub, e);
        ApiError::internal_server_error("An error occurred while processing your request")
    })?;

    if !gate.allows(user.role) {
        tracing::warn!("Role {} denied for {} {}", user.role, request.method(), request.uri().path());
        return Err(ApiError::forbidden("Access denied"));
    }

    let scope_id = user.scope();
    if gate.validate_entity_id && user.role != Role::Admin {
        let params = request
            .extract_parts::<Path<HashMap<String, String>>>()
            .await
            .map(|Path(params)| params)
            .unwrap_or_default();
        if let Some(target) = params.get("id") {
            if scope_id.map(|id| id.to_string()).as_deref() != Some(target.as_str()) {
                return Err(ApiError::forbidden("You do not have access to this resource"));
            }
        }
    }

    let access = AccessScope::resolve(app.store.as_ref(), user.role, scope_id).await?;
    request.extensions_mut().insert(Caller {
        id: claims.sub,
        role: user.role,
        scope_id,
        access,
        user: User::present(doc),
    });

    Ok(next.run(request).await)
}

fn bearer_token(headers: &HeaderMap) -> Result<String, ApiError> {
    let header = headers
        .get(AUTHORIZATION)
        .ok_or_else(|| ApiError::unauthorized("No token provided"))?;
    let value = header
        .to_str()
        .map_err(|_| ApiError::unauthorized("Invalid Authorization header format"))?;

    match value.strip_prefix("Bearer ") {
        Some(token) if !token.trim().is_empty() => Ok(token.trim().to_string()),
        _ => Err(ApiError::unauthorized("No token provided")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn bearer_token_requires_scheme() {
        let mut headers = HeaderMap::new();
        assert_eq!(bearer_token(&headers).unwrap_err().status_code(), 401);

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Basic abc"));
        assert_eq!(bearer_token(&headers).unwrap_err().status_code(), 401);

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer abc.def"));
        assert_eq!(bearer_token(&headers).unwrap(), "abc.def");
    }

    #[test]
    fn gate_checks_roles() {
        const WRITERS: &[Role] = &[Role::Admin, Role::Annual];
        let gate = Gate::new(WRITERS).validate_entity_id();
        assert!(gate.allows(Role::Annual));
        assert!(!gate.allows(Role::National));
        assert!(gate.validate_entity_id);
    }
}
