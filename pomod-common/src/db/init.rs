//! Database initialization
//!
//! Creates the database on first run, applies connection pragmas, and
//! seeds default settings. All schema statements are idempotent, so
//! initialization is safe to run on every startup.

use crate::Result;
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use std::path::Path;
use tracing::info;

/// Initialize database connection and create tables if needed
pub async fn init_database(db_path: &Path) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    // Create parent directory if it doesn't exist
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect(&db_url)
        .await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    configure_pragmas(&pool).await?;

    create_settings_table(&pool).await?;
    create_sessions_table(&pool).await?;

    init_default_settings(&pool).await?;

    Ok(pool)
}

/// Open an in-memory database with the full schema (test support)
pub async fn init_memory_database() -> Result<SqlitePool> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await?;

    configure_pragmas(&pool).await?;
    create_settings_table(&pool).await?;
    create_sessions_table(&pool).await?;
    init_default_settings(&pool).await?;

    Ok(pool)
}

async fn configure_pragmas(pool: &SqlitePool) -> Result<()> {
    sqlx::query("PRAGMA foreign_keys = ON").execute(pool).await?;

    // WAL allows concurrent readers with one writer
    sqlx::query("PRAGMA journal_mode = WAL").execute(pool).await?;

    sqlx::query("PRAGMA busy_timeout = 5000").execute(pool).await?;

    Ok(())
}

async fn create_settings_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS settings (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL
        )",
    )
    .execute(pool)
    .await?;
    Ok(())
}

async fn create_sessions_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS sessions (
            session_id TEXT PRIMARY KEY,
            display_name TEXT,
            access_token TEXT NOT NULL,
            refresh_token TEXT,
            expires_at INTEGER NOT NULL,
            token_error TEXT,
            is_active INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL
        )",
    )
    .execute(pool)
    .await?;
    Ok(())
}

/// Seed settings with defaults, leaving existing values untouched
pub async fn init_default_settings(pool: &SqlitePool) -> Result<()> {
    let defaults: &[(&str, &str)] = &[
        // Timer defaults (seconds)
        ("focus_duration_secs", "1500"),
        ("break_duration_secs", "300"),
        ("long_break_duration_secs", "1200"),
        ("cycles_per_long_break", "4"),
        // Now-playing poll cadence; the original UI wavered between 5s
        // and 1s, so this is a setting rather than a constant
        ("track_poll_interval_secs", "5"),
        // HTTP server
        ("http_host", "127.0.0.1"),
        ("http_port", "5740"),
        // Remote music API endpoints
        ("api_base_url", "https://api.spotify.com/v1"),
        ("token_url", "https://accounts.spotify.com/api/token"),
        // Played when the client requests playback without a URI
        ("default_context_uri", "spotify:playlist:37i9dQZF1DX3PFzdbtx1Us"),
        // OAuth client credentials; usually supplied via environment
        ("client_id", ""),
        ("client_secret", ""),
    ];

    for (key, value) in defaults {
        sqlx::query("INSERT OR IGNORE INTO settings (key, value) VALUES (?, ?)")
            .bind(key)
            .bind(value)
            .execute(pool)
            .await?;
    }

    Ok(())
}
