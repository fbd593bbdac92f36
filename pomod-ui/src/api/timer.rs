//! Pomodoro timer endpoints
//!
//! The timer works without a session; only the music routes need one.
//! Every mutation returns the fresh snapshot so clients do not need a
//! follow-up read.

use axum::{extract::State, Json};

use pomod_common::api::types::{AdjustTimeRequest, TimerSnapshot};

use crate::error::ApiError;
use crate::AppState;

/// GET /api/timer
pub async fn get_timer(State(state): State<AppState>) -> Json<TimerSnapshot> {
    Json(state.timer.snapshot().await)
}

/// POST /api/timer/start
///
/// Starting an already-running timer is a no-op.
pub async fn start_timer(State(state): State<AppState>) -> Json<TimerSnapshot> {
    state.timer.start().await;
    Json(state.timer.snapshot().await)
}

/// POST /api/timer/pause
pub async fn pause_timer(State(state): State<AppState>) -> Json<TimerSnapshot> {
    state.timer.pause().await;
    Json(state.timer.snapshot().await)
}

/// POST /api/timer/reset
pub async fn reset_timer(State(state): State<AppState>) -> Json<TimerSnapshot> {
    state.timer.reset().await;
    Json(state.timer.snapshot().await)
}

/// POST /api/timer/add-time
///
/// Lengthens the focus phase; a no-op during breaks.
pub async fn add_time(
    State(state): State<AppState>,
    Json(request): Json<AdjustTimeRequest>,
) -> Result<Json<TimerSnapshot>, ApiError> {
    validate_minutes(request.minutes)?;
    Ok(Json(state.timer.add_time(request.minutes).await))
}

/// POST /api/timer/remove-time
///
/// Shortens the focus phase, never below 5 minutes; a no-op during
/// breaks.
pub async fn remove_time(
    State(state): State<AppState>,
    Json(request): Json<AdjustTimeRequest>,
) -> Result<Json<TimerSnapshot>, ApiError> {
    validate_minutes(request.minutes)?;
    Ok(Json(state.timer.remove_time(request.minutes).await))
}

fn validate_minutes(minutes: u64) -> Result<(), ApiError> {
    if minutes == 0 {
        return Err(ApiError::InvalidInput(
            "minutes must be at least 1".to_string(),
        ));
    }
    Ok(())
}
