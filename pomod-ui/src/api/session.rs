//! Session endpoints
//!
//! Creation is open: the OAuth authorization flow happens outside this
//! service, and the client hands over the credential it obtained. The
//! read and delete handlers validate the session header themselves so
//! the whole path can live on the public router.

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    Json,
};

use pomod_common::api::types::{CreateSessionRequest, CreateSessionResponse, SessionView};

use crate::error::ApiError;
use crate::AppState;

/// POST /api/session
///
/// Establish a session from an already-obtained credential. The new
/// session becomes the one the now-playing poller follows.
pub async fn create_session(
    State(state): State<AppState>,
    Json(request): Json<CreateSessionRequest>,
) -> Result<(StatusCode, Json<CreateSessionResponse>), ApiError> {
    if request.access_token.is_empty() {
        return Err(ApiError::InvalidInput("missing access_token".to_string()));
    }

    let session = state.sessions.create(request).await?;
    Ok((
        StatusCode::CREATED,
        Json(CreateSessionResponse {
            session_id: session.session_id,
        }),
    ))
}

/// GET /api/session
///
/// Session view for the client UI, including the credential error tag
/// when renewal has failed.
pub async fn get_session(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<SessionView>, ApiError> {
    let session = state.require_session(&headers).await?;
    Ok(Json(session.view()))
}

/// DELETE /api/session
pub async fn delete_session(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<StatusCode, ApiError> {
    let session = state.require_session(&headers).await?;
    state.sessions.delete(session.session_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
