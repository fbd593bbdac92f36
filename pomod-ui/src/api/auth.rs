//! Session authentication middleware
//!
//! Protected routes require an `X-Session-Id` header naming a stored
//! session. The resolved session is inserted into request extensions
//! so handlers get it without a second lookup.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use crate::error::ApiError;
use crate::AppState;

/// Authentication middleware for music routes
///
/// Returns 401 Unauthorized when the header is absent, malformed, or
/// names no stored session.
pub async fn session_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let session = state.require_session(request.headers()).await?;
    request.extensions_mut().insert(session);
    Ok(next.run(request).await)
}
