//! Playback proxy endpoints
//!
//! Thin bearer-authenticated pass-throughs to the remote music API.
//! Each handler builds its request context through the token refresher
//! first, so an expired credential is renewed exactly once per call.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;

use pomod_common::api::types::{NowPlayingResponse, PlayRequest};

use crate::error::ApiError;
use crate::session::Session;
use crate::AppState;

/// GET /api/player/current-track
///
/// `track: null` means nothing is playing.
pub async fn current_track(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> Result<Json<NowPlayingResponse>, ApiError> {
    let token = state.authorized_token(&session).await?;
    let track = state.spotify.currently_playing(&token).await?;
    Ok(Json(NowPlayingResponse { track }))
}

/// PUT /api/player/play
///
/// Without a URI the configured default context plays. `device_id`
/// routes playback to a specific device.
pub async fn play(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Json(request): Json<PlayRequest>,
) -> Result<StatusCode, ApiError> {
    let token = state.authorized_token(&session).await?;
    let uri = request
        .uri
        .unwrap_or_else(|| state.config.default_context_uri.clone());

    state
        .spotify
        .play(&token, &uri, request.device_id.as_deref())
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Query parameters for the shuffle toggle
#[derive(Debug, Deserialize)]
pub struct ShuffleQuery {
    pub state: bool,
    #[serde(default)]
    pub device_id: Option<String>,
}

/// PUT /api/player/shuffle?state=true|false
pub async fn shuffle(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Query(query): Query<ShuffleQuery>,
) -> Result<StatusCode, ApiError> {
    let token = state.authorized_token(&session).await?;
    state
        .spotify
        .set_shuffle(&token, query.state, query.device_id.as_deref())
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
