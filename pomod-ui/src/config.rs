//! Service configuration
//!
//! Loaded from the settings table with hard defaults as fallback, so a
//! fresh database starts cleanly. OAuth client credentials can be
//! overridden from the environment, which keeps secrets out of the
//! database on shared machines.

use sqlx::SqlitePool;

use pomod_common::db::settings::{get_parsed_setting, get_setting};

use crate::timer::CycleConfig;

/// Environment override for the OAuth client id
pub const CLIENT_ID_ENV: &str = "POMOD_CLIENT_ID";
/// Environment override for the OAuth client secret
pub const CLIENT_SECRET_ENV: &str = "POMOD_CLIENT_SECRET";

/// pomod-ui service configuration
#[derive(Debug, Clone)]
pub struct UiConfig {
    pub host: String,
    pub port: u16,
    /// OAuth client id for the token endpoint basic-auth
    pub client_id: String,
    /// OAuth client secret for the token endpoint basic-auth
    pub client_secret: String,
    /// Remote music API base URL
    pub api_base_url: String,
    /// Provider token endpoint for refresh-token grants
    pub token_url: String,
    /// Context played when the client requests playback without a URI
    pub default_context_uri: String,
    /// Now-playing poll cadence in seconds
    pub track_poll_interval_secs: u64,
    /// Cycle defaults for the Pomodoro timer
    pub timer: CycleConfig,
}

impl UiConfig {
    /// Load configuration from database settings
    pub async fn from_database(db: &SqlitePool) -> Self {
        let timer = CycleConfig {
            focus_duration_secs: get_parsed_setting(db, "focus_duration_secs", 1500).await,
            break_duration_secs: get_parsed_setting(db, "break_duration_secs", 300).await,
            long_break_duration_secs: get_parsed_setting(db, "long_break_duration_secs", 1200)
                .await,
            cycles_per_long_break: get_parsed_setting(db, "cycles_per_long_break", 4).await,
        };

        Self {
            host: get_string(db, "http_host", "127.0.0.1").await,
            port: get_parsed_setting(db, "http_port", 5740).await,
            client_id: env_or_setting(db, CLIENT_ID_ENV, "client_id").await,
            client_secret: env_or_setting(db, CLIENT_SECRET_ENV, "client_secret").await,
            api_base_url: get_string(db, "api_base_url", "https://api.spotify.com/v1").await,
            token_url: get_string(db, "token_url", "https://accounts.spotify.com/api/token").await,
            default_context_uri: get_string(
                db,
                "default_context_uri",
                "spotify:playlist:37i9dQZF1DX3PFzdbtx1Us",
            )
            .await,
            track_poll_interval_secs: get_parsed_setting(db, "track_poll_interval_secs", 5).await,
            timer,
        }
    }
}

async fn get_string(db: &SqlitePool, key: &str, default: &str) -> String {
    match get_setting(db, key).await {
        Ok(Some(value)) if !value.is_empty() => value,
        _ => default.to_string(),
    }
}

/// Environment variable first, settings table second
async fn env_or_setting(db: &SqlitePool, env_var: &str, key: &str) -> String {
    if let Ok(value) = std::env::var(env_var) {
        if !value.is_empty() {
            return value;
        }
    }
    match get_setting(db, key).await {
        Ok(Some(value)) => value,
        _ => String::new(),
    }
}
