//! Server-Sent Events (SSE) utilities
//!
//! Bridges the EventBus onto an axum SSE response so any service can
//! expose its event stream with one call.

use axum::response::sse::{Event, KeepAlive, Sse};
use futures::stream::Stream;
use std::convert::Infallible;
use std::time::Duration;
use tokio::sync::broadcast;
use tracing::{info, warn};

use crate::events::EventBus;

/// Create an SSE stream that forwards all EventBus events to the client
///
/// The client first receives a `ConnectionStatus: connected` event, then
/// every bus event serialized as JSON under its own event name. Slow
/// clients that lag behind the bus capacity skip the missed events and
/// continue from the live edge.
///
/// # Arguments
/// * `service_name` - Name of the service for logging (e.g. "pomod-ui")
/// * `bus` - Event bus to subscribe to
pub fn event_bus_sse_stream(
    service_name: &'static str,
    bus: &EventBus,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    info!("New SSE client connected to {} events", service_name);
    let mut rx = bus.subscribe();

    let stream = async_stream::stream! {
        // Initial connected status
        yield Ok(Event::default()
            .event("ConnectionStatus")
            .data("connected"));

        loop {
            match rx.recv().await {
                Ok(event) => match serde_json::to_string(&event) {
                    Ok(json) => {
                        yield Ok(Event::default().event(event.event_type()).data(json));
                    }
                    Err(e) => {
                        warn!("SSE: failed to serialize {} event: {}", event.event_type(), e);
                    }
                },
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!("SSE: {} client lagged, skipped {} events", service_name, skipped);
                }
                Err(broadcast::error::RecvError::Closed) => {
                    info!("SSE: {} event stream closed", service_name);
                    break;
                }
            }
        }
    };

    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("heartbeat"),
    )
}
