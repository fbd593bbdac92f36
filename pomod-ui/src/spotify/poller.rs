//! Now-playing poller
//!
//! Cancellable periodic task that refreshes the "current track" view
//! for the active session and broadcasts a `TrackChanged` event when
//! the track identity changes. The poll interval is configuration, not
//! a constant. Poll failures are logged and skipped; the next poll
//! recovers.
//!
//! Ownership mirrors the timer tick task: one handle, guarded start,
//! abort on stop, abort on drop.

use std::sync::Mutex;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use pomod_common::api::types::TrackInfo;
use pomod_common::events::PomodEvent;

use crate::AppState;

/// Periodic current-track refresh task
pub struct NowPlayingPoller {
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl NowPlayingPoller {
    pub fn new() -> Self {
        Self {
            handle: Mutex::new(None),
        }
    }

    /// Start polling; a no-op when a live task already exists
    pub fn start(&self, state: AppState, interval_secs: u64) {
        let mut guard = self.handle.lock().expect("poller lock poisoned");
        if let Some(handle) = guard.as_ref() {
            if !handle.is_finished() {
                debug!("Now-playing poller already running; start ignored");
                return;
            }
        }

        info!("Starting now-playing poller ({}s interval)", interval_secs);
        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(interval_secs.max(1)));
            let mut last_identity: Option<String> = None;

            loop {
                interval.tick().await;

                let track = match poll_current_track(&state).await {
                    Ok(track) => track,
                    Err(reason) => {
                        debug!("Now-playing poll skipped: {}", reason);
                        continue;
                    }
                };

                let identity = track_identity(track.as_ref());
                if identity != last_identity {
                    last_identity = identity;
                    state.events.emit_lossy(PomodEvent::TrackChanged {
                        track,
                        timestamp: pomod_common::time::now(),
                    });
                }
            }
        });
        *guard = Some(handle);
    }

    /// Stop polling, aborting and releasing the task
    pub fn stop(&self) {
        if let Some(handle) = self.handle.lock().expect("poller lock poisoned").take() {
            handle.abort();
            info!("Now-playing poller stopped");
        }
    }
}

impl Default for NowPlayingPoller {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for NowPlayingPoller {
    fn drop(&mut self) {
        // Cancellation is guaranteed on teardown
        if let Some(handle) = self.handle.lock().expect("poller lock poisoned").take() {
            handle.abort();
        }
    }
}

/// One poll: resolve the active session, renew its credential if
/// needed, and ask the provider what is playing
async fn poll_current_track(state: &AppState) -> Result<Option<TrackInfo>, String> {
    let session = state
        .sessions
        .active()
        .await
        .map_err(|e| format!("session lookup failed: {}", e))?
        .ok_or_else(|| "no active session".to_string())?;

    let token = state
        .authorized_token(&session)
        .await
        .map_err(|e| format!("no usable credential: {}", e))?;

    state
        .spotify
        .currently_playing(&token)
        .await
        .map_err(|e| {
            warn!("Current-track poll failed: {}", e);
            e.to_string()
        })
}

/// Identity used for change detection; progress updates alone are not
/// a track change
fn track_identity(track: Option<&TrackInfo>) -> Option<String> {
    track.map(|t| t.id.clone().unwrap_or_else(|| t.name.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn track(id: Option<&str>, name: &str, progress_ms: Option<u64>) -> TrackInfo {
        TrackInfo {
            id: id.map(str::to_string),
            name: name.to_string(),
            artists: "Artist".to_string(),
            album_art: None,
            is_playing: true,
            progress_ms,
            duration_ms: Some(180_000),
        }
    }

    #[test]
    fn test_identity_ignores_progress() {
        let a = track(Some("t1"), "Song", Some(1_000));
        let b = track(Some("t1"), "Song", Some(6_000));
        assert_eq!(track_identity(Some(&a)), track_identity(Some(&b)));
    }

    #[test]
    fn test_identity_changes_with_track() {
        let a = track(Some("t1"), "Song", None);
        let b = track(Some("t2"), "Other", None);
        assert_ne!(track_identity(Some(&a)), track_identity(Some(&b)));
    }

    #[test]
    fn test_identity_falls_back_to_name() {
        let a = track(None, "Local File", None);
        assert_eq!(track_identity(Some(&a)), Some("Local File".to_string()));
        assert_eq!(track_identity(None), None);
    }
}
