//! pomod-ui library - focus timer gateway service
//!
//! Owns the Pomodoro cycle, the session store with credential renewal,
//! and the proxy routes to the remote music API.

use std::sync::Arc;

use axum::http::HeaderMap;
use axum::Router;
use sqlx::SqlitePool;
use uuid::Uuid;

use pomod_common::events::{EventBus, PomodEvent};

pub mod api;
pub mod config;
pub mod error;
pub mod session;
pub mod spotify;
pub mod timer;

use config::UiConfig;
use error::ApiError;
use session::{Session, SessionStore};
use spotify::{SpotifyClient, TokenRefresher};
use timer::TimerService;

/// Request header carrying the session id
pub const SESSION_HEADER: &str = "x-session-id";

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,
    /// Service configuration
    pub config: Arc<UiConfig>,
    /// Event bus feeding the SSE stream
    pub events: EventBus,
    /// Session store
    pub sessions: SessionStore,
    /// Remote music API client
    pub spotify: Arc<SpotifyClient>,
    /// Credential refresher
    pub refresher: Arc<TokenRefresher>,
    /// Pomodoro timer service
    pub timer: Arc<TimerService>,
}

impl AppState {
    /// Create application state and its owned services
    pub fn new(db: SqlitePool, config: UiConfig, events: EventBus) -> Self {
        let sessions = SessionStore::new(db.clone());
        let spotify = Arc::new(SpotifyClient::new(config.api_base_url.clone()));
        let refresher = Arc::new(TokenRefresher::new(
            config.token_url.clone(),
            config.client_id.clone(),
            config.client_secret.clone(),
        ));
        let timer = Arc::new(TimerService::new(config.timer.clone(), events.clone()));

        Self {
            db,
            config: Arc::new(config),
            events,
            sessions,
            spotify,
            refresher,
            timer,
        }
    }

    /// Resolve the session named by the request headers
    pub async fn require_session(&self, headers: &HeaderMap) -> Result<Session, ApiError> {
        let raw = headers
            .get(SESSION_HEADER)
            .and_then(|value| value.to_str().ok())
            .ok_or(ApiError::Unauthenticated)?;
        let session_id = Uuid::parse_str(raw).map_err(|_| ApiError::Unauthenticated)?;

        self.sessions
            .get(session_id)
            .await?
            .ok_or(ApiError::Unauthenticated)
    }

    /// Produce a usable access token for this session
    ///
    /// Renews the credential lazily when expired, persists the result
    /// (last write wins on refresh races), and broadcasts the outcome.
    /// A failed renewal surfaces as [`ApiError::RefreshFailure`] after
    /// the error tag is stored.
    pub async fn authorized_token(&self, session: &Session) -> Result<String, ApiError> {
        let refreshed = self.refresher.ensure_valid(session.credential.clone()).await;

        if refreshed.error.is_some() {
            self.sessions
                .update_credential(session.session_id, &refreshed)
                .await?;
            self.events.emit_lossy(PomodEvent::CredentialRefreshFailed {
                session_id: session.session_id,
                reason: "token exchange failed or no refresh token stored".to_string(),
                timestamp: pomod_common::time::now(),
            });
            return Err(ApiError::RefreshFailure);
        }

        let renewed = refreshed.access_token != session.credential.access_token
            || refreshed.expires_at != session.credential.expires_at;
        if renewed {
            self.sessions
                .update_credential(session.session_id, &refreshed)
                .await?;
            self.events.emit_lossy(PomodEvent::CredentialRefreshed {
                session_id: session.session_id,
                expires_at: refreshed.expires_at,
                timestamp: pomod_common::time::now(),
            });
        }

        Ok(refreshed.access_token)
    }
}

/// Build application router
///
/// Music routes sit behind the session-auth middleware; the timer, the
/// event stream, session management, and the health endpoint are open.
pub fn build_router(state: AppState) -> Router {
    use axum::middleware;
    use axum::routing::{get, post, put};
    use tower_http::cors::CorsLayer;

    // Protected routes (require a valid session header)
    let protected = Router::new()
        .route("/api/player/current-track", get(api::player::current_track))
        .route("/api/player/play", put(api::player::play))
        .route("/api/player/shuffle", put(api::player::shuffle))
        .route("/api/search", get(api::search::search))
        .route("/api/recommendations", get(api::search::recommendations))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            api::auth::session_auth,
        ));

    // Public routes (session routes validate the header themselves)
    let public = Router::new()
        .route(
            "/api/session",
            post(api::session::create_session)
                .get(api::session::get_session)
                .delete(api::session::delete_session),
        )
        .route("/api/timer", get(api::timer::get_timer))
        .route("/api/timer/start", post(api::timer::start_timer))
        .route("/api/timer/pause", post(api::timer::pause_timer))
        .route("/api/timer/reset", post(api::timer::reset_timer))
        .route("/api/timer/add-time", post(api::timer::add_time))
        .route("/api/timer/remove-time", post(api::timer::remove_time))
        .route("/api/events", get(api::sse::event_stream))
        .merge(api::health::health_routes());

    // Combine routers
    Router::new()
        .merge(protected)
        .merge(public)
        .layer(CorsLayer::permissive())
        .with_state(state)
}
