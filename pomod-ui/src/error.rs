//! API error taxonomy for pomod-ui
//!
//! Every handler failure is rendered once, as a JSON `{ "error": ... }`
//! body. Upstream music-API failures mirror the upstream status code;
//! refresh failures map to 401 so clients know to re-authenticate.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::spotify::SpotifyError;

/// Errors surfaced by HTTP handlers
#[derive(Debug, Error)]
pub enum ApiError {
    /// No session header, unknown session, or missing token
    #[error("authentication required")]
    Unauthenticated,

    /// Non-2xx response from the remote music API
    #[error("upstream error ({status}): {detail}")]
    Upstream { status: u16, detail: String },

    /// Token exchange failed or no refresh token was stored
    #[error("token refresh failed; re-authentication required")]
    RefreshFailure,

    /// Transport-level failure talking to an external service
    #[error("network error: {0}")]
    Network(String),

    /// Database operation failed
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Invalid request parameter or body
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl From<SpotifyError> for ApiError {
    fn from(err: SpotifyError) -> Self {
        match err {
            SpotifyError::Network(msg) => ApiError::Network(msg),
            SpotifyError::Api { status, detail } => ApiError::Upstream { status, detail },
            SpotifyError::Parse(msg) => ApiError::Network(msg),
        }
    }
}

impl From<pomod_common::Error> for ApiError {
    fn from(err: pomod_common::Error) -> Self {
        match err {
            pomod_common::Error::Database(e) => ApiError::Database(e),
            pomod_common::Error::NotFound(_) => ApiError::Unauthenticated,
            pomod_common::Error::InvalidInput(msg) => ApiError::InvalidInput(msg),
            other => ApiError::Network(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::Unauthenticated => (StatusCode::UNAUTHORIZED, self.to_string()),
            ApiError::RefreshFailure => (StatusCode::UNAUTHORIZED, self.to_string()),
            ApiError::Upstream { status, .. } => (
                // Mirror the upstream status where it is a valid code
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY),
                self.to_string(),
            ),
            ApiError::Network(_) => (StatusCode::BAD_GATEWAY, self.to_string()),
            ApiError::Database(_) => (StatusCode::INTERNAL_SERVER_ERROR, self.to_string()),
            ApiError::InvalidInput(_) => (StatusCode::BAD_REQUEST, self.to_string()),
        };

        let body = Json(json!({
            "error": message,
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upstream_status_is_mirrored() {
        let err = ApiError::Upstream {
            status: 404,
            detail: "no active device".to_string(),
        };
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_invalid_upstream_status_falls_back_to_bad_gateway() {
        let err = ApiError::Upstream {
            status: 9999,
            detail: "garbage".to_string(),
        };
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn test_refresh_failure_maps_to_unauthorized() {
        let response = ApiError::RefreshFailure.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_spotify_error_conversion() {
        let api: ApiError = SpotifyError::Api {
            status: 429,
            detail: "rate limited".to_string(),
        }
        .into();
        match api {
            ApiError::Upstream { status, .. } => assert_eq!(status, 429),
            other => panic!("expected Upstream, got {:?}", other),
        }
    }
}
