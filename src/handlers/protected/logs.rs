// GET /logs, GET /logs/:id - audit trail (admin)

use std::collections::HashMap;

use axum::extract::{rejection::PathRejection, Path, Query, State};

use crate::app::AppState;
use crate::database::populate::populate;
use crate::database::Document;
use crate::error::ApiError;
use crate::filter::{FilterData, SortDirection};
use crate::middleware::{ApiResponse, Paginated};
use crate::models::audit_log::LOG_FILTERS;
use crate::types::Collection;

use super::resource::{page_params, parse_id};

/// Newest first, filtered by `action`, `collection` and `documentId`
pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Paginated<Document>, ApiError> {
    let mut filter = FilterData::new();
    for field in LOG_FILTERS {
        if let Some(value) = params.get(*field).filter(|v| !v.is_empty()) {
            filter = filter.where_eq(*field, value);
        }
    }
    let filter = filter.order_by("timestamp", SortDirection::Desc);
    let (page, limit) = page_params(&params, &state.config.api);

    let total = state.store.count(Collection::Logs, &filter.without_paging()).await?;
    let mut docs = state.store.find(Collection::Logs, &filter.paginate(page, limit)).await?;
    populate(state.store.as_ref(), Collection::Logs, &mut docs).await?;

    Ok(Paginated { data: docs, total, page, limit })
}

pub async fn show(
    State(state): State<AppState>,
    id: Result<Path<String>, PathRejection>,
) -> Result<ApiResponse<Document>, ApiError> {
    let id = parse_id(id)?;
    let doc = state
        .store
        .find_by_id(Collection::Logs, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Log not found"))?;

    let mut docs = [doc];
    populate(state.store.as_ref(), Collection::Logs, &mut docs).await?;
    let [doc] = docs;
    Ok(ApiResponse::success(doc))
}
