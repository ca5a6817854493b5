use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
};
use std::sync::Arc;
use std::time::Duration;

use crate::cache::ResponseCache;
use crate::error::SearchError;
use crate::models::{DirectoryStats, SearchResponse, SearchType, StatsFilters};
use crate::search::{SearchFilters, SearchService, stats};
use crate::store::ListingStore;

use super::models::SearchRequest;

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<SearchService>,
    pub store: Arc<dyn ListingStore>,
    pub cache: Arc<dyn ResponseCache>,
    pub cache_ttl: Duration,
}

fn error_response(e: SearchError) -> (StatusCode, String) {
    match &e {
        SearchError::Validation { .. } => (StatusCode::BAD_REQUEST, e.to_string()),
        SearchError::Datastore { .. } => {
            tracing::error!(error = ?e, "search request failed");
            // The Display impl names only the operation; internals stay out
            // of the payload.
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}

fn cache_key(search_type: SearchType, filters: &SearchFilters) -> String {
    let canonical = serde_json::to_string(filters).unwrap_or_default();
    format!("search:{}:{canonical}", search_type.as_str())
}

pub async fn search_handler(
    State(state): State<AppState>,
    Json(request): Json<SearchRequest>,
) -> Result<Json<SearchResponse>, (StatusCode, String)> {
    let search_type: SearchType = request.search_type.parse().map_err(error_response)?;
    let filters = SearchFilters::from_input(request.filters).map_err(error_response)?;

    let key = cache_key(search_type, &filters);
    if let Some(bytes) = state.cache.get(&key) {
        match serde_json::from_slice::<SearchResponse>(&bytes) {
            Ok(mut cached) => {
                cached.cache_hit = true;
                return Ok(Json(cached));
            }
            Err(e) => tracing::warn!(error = %e, "discarding undecodable cached response"),
        }
    }

    let response = state
        .service
        .search(search_type, filters)
        .await
        .map_err(error_response)?;

    // Best effort: a cache failure must never fail the search.
    match serde_json::to_vec(&response) {
        Ok(bytes) => state.cache.set(&key, bytes, state.cache_ttl),
        Err(e) => tracing::warn!(error = %e, "failed to serialize response for caching"),
    }

    Ok(Json(response))
}

pub async fn stats_handler(
    State(state): State<AppState>,
    Query(filters): Query<StatsFilters>,
) -> Result<Json<DirectoryStats>, (StatusCode, String)> {
    stats::directory_stats(state.store.as_ref(), &filters)
        .await
        .map(Json)
        .map_err(error_response)
}

pub async fn health_handler() -> &'static str {
    "ok"
}
