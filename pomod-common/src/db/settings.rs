//! Settings table access
//!
//! Simple string key/value storage. Typed callers parse with
//! [`get_parsed_setting`], which falls back to the supplied default on
//! a missing key or an unparseable value.

use crate::Result;
use sqlx::SqlitePool;
use std::str::FromStr;
use tracing::warn;

/// Read a setting value, if present
pub async fn get_setting(db: &SqlitePool, key: &str) -> Result<Option<String>> {
    let row: Option<(String,)> = sqlx::query_as("SELECT value FROM settings WHERE key = ?")
        .bind(key)
        .fetch_optional(db)
        .await?;
    Ok(row.map(|(value,)| value))
}

/// Write a setting value, inserting or replacing
pub async fn set_setting(db: &SqlitePool, key: &str, value: &str) -> Result<()> {
    sqlx::query("INSERT OR REPLACE INTO settings (key, value) VALUES (?, ?)")
        .bind(key)
        .bind(value)
        .execute(db)
        .await?;
    Ok(())
}

/// Read and parse a setting, falling back to `default` when the key is
/// missing or the stored value does not parse
pub async fn get_parsed_setting<T: FromStr>(db: &SqlitePool, key: &str, default: T) -> T {
    match get_setting(db, key).await {
        Ok(Some(value)) => match value.parse::<T>() {
            Ok(parsed) => parsed,
            Err(_) => {
                warn!("Setting {} has unparseable value {:?}; using default", key, value);
                default
            }
        },
        Ok(None) => default,
        Err(e) => {
            warn!("Failed to read setting {}: {}; using default", key, e);
            default
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init::init_memory_database;

    #[tokio::test]
    async fn test_set_and_get_setting_round_trip() {
        let db = init_memory_database().await.unwrap();

        set_setting(&db, "track_poll_interval_secs", "1").await.unwrap();
        let value = get_setting(&db, "track_poll_interval_secs").await.unwrap();
        assert_eq!(value.as_deref(), Some("1"));
    }

    #[tokio::test]
    async fn test_get_missing_setting_returns_none() {
        let db = init_memory_database().await.unwrap();
        let value = get_setting(&db, "no_such_key").await.unwrap();
        assert_eq!(value, None);
    }

    #[tokio::test]
    async fn test_get_parsed_setting_uses_default_on_garbage() {
        let db = init_memory_database().await.unwrap();

        set_setting(&db, "http_port", "not-a-port").await.unwrap();
        let port: u16 = get_parsed_setting(&db, "http_port", 5740).await;
        assert_eq!(port, 5740);
    }

    #[tokio::test]
    async fn test_defaults_are_seeded_on_init() {
        let db = init_memory_database().await.unwrap();

        let focus: u64 = get_parsed_setting(&db, "focus_duration_secs", 0).await;
        assert_eq!(focus, 1500);
        let cycles: u32 = get_parsed_setting(&db, "cycles_per_long_break", 0).await;
        assert_eq!(cycles, 4);
        let poll: u64 = get_parsed_setting(&db, "track_poll_interval_secs", 0).await;
        assert_eq!(poll, 5);
    }

    #[tokio::test]
    async fn test_init_default_settings_preserves_existing_values() {
        let db = init_memory_database().await.unwrap();

        set_setting(&db, "focus_duration_secs", "3000").await.unwrap();

        // Re-seeding must not clobber user-modified values
        crate::db::init::init_default_settings(&db).await.unwrap();
        let focus: u64 = get_parsed_setting(&db, "focus_duration_secs", 0).await;
        assert_eq!(focus, 3000);
    }
}
