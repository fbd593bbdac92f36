//! Shared API request/response types
//!
//! Types crossing the HTTP boundary or stored alongside sessions. The
//! credential type lives here because both the session store and the
//! token refresher read and write it.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ========================================
// Credential Types
// ========================================

/// Error marker recorded on a credential when token renewal fails
///
/// The marker travels with the credential (rather than being raised as
/// an error) so the client can observe it on the session view and
/// prompt re-authentication instead of silently failing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CredentialError {
    /// Token exchange failed, or no refresh token was available
    RefreshFailed,
}

/// Access/refresh token pair plus expiry for the remote music API
///
/// Owned by the server-side session store and mutated only by the token
/// refresher. Clients only ever see the access token they need for the
/// current request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredCredential {
    /// Bearer token presented to the remote music API
    pub access_token: String,
    /// Exchange token for renewing the access token; providers are not
    /// required to issue one
    pub refresh_token: Option<String>,
    /// Access token expiry as Unix epoch seconds
    pub expires_at: i64,
    /// Set when the last renewal attempt failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<CredentialError>,
}

impl StoredCredential {
    /// Whether the access token has expired at `now` (epoch seconds)
    pub fn is_expired(&self, now: i64) -> bool {
        now >= self.expires_at
    }

    /// Return this credential tagged with the refresh-failure marker
    pub fn with_refresh_error(mut self) -> Self {
        self.error = Some(CredentialError::RefreshFailed);
        self
    }
}

// ========================================
// Session Types
// ========================================

/// Request body for establishing a session from an existing credential
///
/// The OAuth authorization flow itself happens outside this service;
/// the client hands over the tokens it obtained there.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CreateSessionRequest {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// Access token expiry as Unix epoch seconds
    pub expires_at: i64,
    #[serde(default)]
    pub display_name: Option<String>,
}

/// Response to session creation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateSessionResponse {
    pub session_id: Uuid,
}

/// Session state exposed to the client-rendered UI
///
/// Carries the access token the UI component tree needs, plus the
/// credential error tag so the UI can prompt re-authentication.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionView {
    pub session_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    pub access_token: String,
    /// Access token expiry as Unix epoch seconds
    pub expires_at: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_error: Option<CredentialError>,
}

// ========================================
// Timer Types
// ========================================

/// Point-in-time view of the cycle state for `GET /api/timer`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimerSnapshot {
    pub phase: crate::events::TimerPhase,
    /// Human-readable mode label ("Focus", "Break", "Long Break")
    pub mode: String,
    pub focus_duration_secs: u64,
    pub break_duration_secs: u64,
    pub long_break_duration_secs: u64,
    pub time_left_secs: u64,
    /// Remaining time formatted as mm:ss
    pub clock: String,
    pub is_running: bool,
    pub cycle_count: u32,
    pub total_focus_secs_this_cycle: u64,
    /// Completion of the current phase (0.0 - 100.0)
    pub progress_percent: f64,
}

/// Request body for `add-time` / `remove-time`
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AdjustTimeRequest {
    /// Minutes to add or remove (defaults to 1)
    #[serde(default = "default_adjust_minutes")]
    pub minutes: u64,
}

fn default_adjust_minutes() -> u64 {
    1
}

// ========================================
// Player / Search Types
// ========================================

/// Currently-playing track information
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackInfo {
    /// Provider track id (absent for some local/episode items)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    /// Comma-joined artist names
    pub artists: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub album_art: Option<String>,
    pub is_playing: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
}

/// Response for `GET /api/player/current-track`
///
/// `track: null` means nothing is playing (upstream 204 or empty item).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NowPlayingResponse {
    pub track: Option<TrackInfo>,
}

/// Request body for `PUT /api/player/play`
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct PlayRequest {
    /// Track or context URI; None plays the configured default context
    #[serde(default)]
    pub uri: Option<String>,
    /// Target playback device (device routing)
    #[serde(default)]
    pub device_id: Option<String>,
}

/// Kind discriminator for merged search results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchItemKind {
    Playlist,
    Track,
}

/// One entry in the merged search result list
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchItem {
    #[serde(rename = "type")]
    pub kind: SearchItemKind,
    pub id: String,
    pub name: String,
    pub uri: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// Playlist owner display name (playlists only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
    /// Comma-joined artist names (tracks only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artist: Option<String>,
}

/// Response for `GET /api/search`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResponse {
    /// Playlists first, then tracks, null provider entries dropped
    pub items: Vec<SearchItem>,
}

/// Response for `GET /api/recommendations`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendationsResponse {
    pub uris: Vec<String>,
}
