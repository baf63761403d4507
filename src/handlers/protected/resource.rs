// Generic CRUD handlers shared by every hierarchy and record resource

use std::collections::HashMap;

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, Query, State,
    },
    middleware,
    response::Response,
    routing::{delete, get, post, put},
    Json, Router,
};
use serde_json::Value;
use uuid::Uuid;

use crate::app::AppState;
use crate::config::ApiConfig;
use crate::database::populate::populate;
use crate::database::Document;
use crate::error::ApiError;
use crate::middleware::{authorize, response, ApiResponse, Caller, Gate, GateState, Paginated};
use crate::models::Resource;
use crate::types::{Operation, Role};

/// Roles allowed per operation on one resource
#[derive(Debug, Clone, Copy)]
pub struct Access {
    pub read: &'static [Role],
    pub create: &'static [Role],
    pub update: &'static [Role],
    pub delete: &'static [Role],
    /// Non-admin updates must target the caller's own scope entity
    pub own_entity_update: bool,
}

/// Routes `/` and `/:id` for one resource
pub fn routes<T: Resource>(state: &AppState, access: Access) -> Router<AppState> {
    let gate = |gate: Gate| middleware::from_fn_with_state(GateState::new(state, gate), authorize);

    let update_gate = if access.own_entity_update {
        Gate::new(access.update).validate_entity_id()
    } else {
        Gate::new(access.update)
    };

    Router::new()
        .route(
            "/",
            get(list::<T>)
                .route_layer(gate(Gate::new(access.read)))
                .merge(post(create::<T>).route_layer(gate(Gate::new(access.create)))),
        )
        .route(
            "/:id",
            get(show::<T>)
                .route_layer(gate(Gate::new(access.read)))
                .merge(put(update::<T>).route_layer(gate(update_gate)))
                .merge(delete(remove::<T>).route_layer(gate(Gate::new(access.delete)))),
        )
}

/// `page` and `limit` query parameters, defaulted and capped
pub fn page_params(params: &HashMap<String, String>, api: &ApiConfig) -> (u64, u64) {
    let parse = |key: &str| params.get(key).and_then(|v| v.parse::<u64>().ok()).filter(|v| *v > 0);
    let page = parse("page").unwrap_or(1);
    let limit = parse("limit").unwrap_or(api.default_page_limit).min(api.max_page_limit);
    (page, limit)
}

pub fn parse_id(id: Result<Path<String>, PathRejection>) -> Result<Uuid, ApiError> {
    let Path(raw) = id.map_err(|e| ApiError::bad_request(e.body_text()))?;
    Uuid::parse_str(&raw).map_err(|_| ApiError::bad_request(format!("Invalid id '{raw}'")))
}

/// Deserialize and validate a request body, then normalize it to a document
fn into_document<T: Resource>(body: Result<Json<Value>, JsonRejection>, operation: Operation) -> Result<Document, ApiError> {
    let Json(value) = body.map_err(|e| ApiError::invalid_json(e.body_text()))?;

    let resource: T = serde_json::from_value(value).map_err(|e| {
        ApiError::validation_error(format!("Invalid {}: {}", T::COLLECTION.label(), e), vec![])
    })?;

    let errors = resource.validate(operation);
    if !errors.is_empty() {
        tracing::warn!("{} rejected with {} field errors", T::COLLECTION, errors.len());
        return Err(ApiError::validation_error("Validation failed", errors));
    }

    match serde_json::to_value(&resource) {
        Ok(Value::Object(doc)) => Ok(doc),
        Ok(_) | Err(_) => Err(ApiError::internal_server_error("Failed to encode request body")),
    }
}

/// GET /:resource
pub async fn list<T: Resource>(
    State(state): State<AppState>,
    caller: Caller,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Paginated<Document>, ApiError> {
    let mut filter = T::list_filter(&params);
    if let Some(clause) = caller.access.filter_for(T::COLLECTION) {
        filter = filter.with_clause(clause);
    }
    let (page, limit) = page_params(&params, &state.config.api);

    let total = state.store.count(T::COLLECTION, &filter.without_paging()).await?;
    let mut docs = state.store.find(T::COLLECTION, &filter.paginate(page, limit)).await?;
    populate(state.store.as_ref(), T::COLLECTION, &mut docs).await?;

    Ok(Paginated {
        data: docs.into_iter().map(T::present).collect(),
        total,
        page,
        limit,
    })
}

/// GET /:resource/:id
pub async fn show<T: Resource>(
    State(state): State<AppState>,
    caller: Caller,
    id: Result<Path<String>, PathRejection>,
) -> Result<ApiResponse<Document>, ApiError> {
    let id = parse_id(id)?;
    let Some(doc) = state.store.find_by_id(T::COLLECTION, id).await? else {
        return Err(ApiError::not_found(format!("{} not found", T::COLLECTION.label())));
    };
    if !caller.access.permits(T::COLLECTION, &doc) {
        return Err(ApiError::forbidden("You do not have access to this resource"));
    }

    let mut docs = [doc];
    populate(state.store.as_ref(), T::COLLECTION, &mut docs).await?;
    let [doc] = docs;
    Ok(ApiResponse::success(T::present(doc)))
}

/// POST /:resource
pub async fn create<T: Resource>(
    State(state): State<AppState>,
    caller: Caller,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<ApiResponse<Document>, ApiError> {
    let doc = into_document::<T>(body, Operation::Create)?;
    let created = state
        .records
        .create(T::COLLECTION, doc, caller.access, Some(caller.id))
        .await?;
    Ok(ApiResponse::created(T::present(created)))
}

/// PUT /:resource/:id - full replacement
pub async fn update<T: Resource>(
    State(state): State<AppState>,
    caller: Caller,
    id: Result<Path<String>, PathRejection>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<ApiResponse<Document>, ApiError> {
    let id = parse_id(id)?;
    let doc = into_document::<T>(body, Operation::Update)?;
    let updated = state
        .records
        .update(T::COLLECTION, id, doc, caller.access, Some(caller.id))
        .await?;
    Ok(ApiResponse::success(T::present(updated)))
}

/// DELETE /:resource/:id
pub async fn remove<T: Resource>(
    State(state): State<AppState>,
    caller: Caller,
    id: Result<Path<String>, PathRejection>,
) -> Result<Response, ApiError> {
    let id = parse_id(id)?;
    state
        .records
        .delete(T::COLLECTION, id, caller.access, Some(caller.id))
        .await?;
    Ok(response::message(format!("{} deleted successfully", T::COLLECTION.label())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;

    fn params(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn page_params_default_and_cap() {
        let api = AppConfig::development().api;
        assert_eq!(page_params(&params(&[]), &api), (1, 10));
        assert_eq!(page_params(&params(&[("page", "3"), ("limit", "25")]), &api), (3, 25));
        assert_eq!(page_params(&params(&[("page", "0"), ("limit", "abc")]), &api), (1, 10));
        assert_eq!(page_params(&params(&[("limit", "5000")]), &api), (1, api.max_page_limit));
    }
}
