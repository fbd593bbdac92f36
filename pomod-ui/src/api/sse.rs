//! Server-Sent Events endpoint

use axum::extract::State;
use axum::response::sse::{Event, Sse};
use futures::stream::Stream;
use std::convert::Infallible;

use crate::AppState;

/// GET /api/events
///
/// Streams every bus event (timer ticks, phase changes, credential and
/// track updates) to the client with a heartbeat keep-alive.
pub async fn event_stream(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    pomod_common::sse::event_bus_sse_stream("pomod-ui", &state.events)
}
