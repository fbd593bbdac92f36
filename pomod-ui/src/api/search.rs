//! Catalogue search and recommendations endpoints

use axum::{
    extract::{Query, State},
    Extension, Json,
};
use serde::Deserialize;

use pomod_common::api::types::{RecommendationsResponse, SearchResponse};

use crate::error::ApiError;
use crate::session::Session;
use crate::AppState;

/// Query parameters for catalogue search
#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub q: String,
    /// Provider type filter, comma separated
    #[serde(rename = "type", default = "default_types")]
    pub types: String,
    #[serde(default = "default_limit")]
    pub limit: u32,
}

fn default_types() -> String {
    "track,playlist".to_string()
}

fn default_limit() -> u32 {
    10
}

/// GET /api/search?q=&type=&limit=
///
/// Returns the merged result list: playlists first, then tracks.
pub async fn search(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<SearchResponse>, ApiError> {
    if query.q.trim().is_empty() {
        return Err(ApiError::InvalidInput("missing search query".to_string()));
    }

    let token = state.authorized_token(&session).await?;
    let items = state
        .spotify
        .search(&token, &query.q, &query.types, query.limit)
        .await?;
    Ok(Json(SearchResponse { items }))
}

/// Query parameters for track recommendations
#[derive(Debug, Deserialize)]
pub struct RecommendationsQuery {
    /// Seed track: a bare id or a full track URI
    pub track_uri: String,
    #[serde(default = "default_recommendations_limit")]
    pub limit: u32,
}

fn default_recommendations_limit() -> u32 {
    30
}

/// GET /api/recommendations?track_uri=&limit=
pub async fn recommendations(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Query(query): Query<RecommendationsQuery>,
) -> Result<Json<RecommendationsResponse>, ApiError> {
    if query.track_uri.trim().is_empty() {
        return Err(ApiError::InvalidInput("missing track_uri".to_string()));
    }

    let token = state.authorized_token(&session).await?;
    let uris = state
        .spotify
        .recommendations(&token, &query.track_uri, query.limit)
        .await?;
    Ok(Json(RecommendationsResponse { uris }))
}
