//! Event types for the pomod event system
//!
//! Provides the shared event definitions and the EventBus used to fan
//! timer and playback state out to SSE clients and internal subscribers.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::api::types::TrackInfo;

/// Pomodoro cycle phase
///
/// The long break is a distinct state rather than a flag on `Break`:
/// it has its own duration arithmetic and its completion resets the
/// whole cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimerPhase {
    /// Active work interval
    Focus,
    /// Short rest between focus intervals
    Break,
    /// Extended rest after the configured number of focus intervals
    LongBreak,
}

impl TimerPhase {
    /// Human-readable label used by UIs (matches the mode indicator text)
    pub fn label(&self) -> &'static str {
        match self {
            TimerPhase::Focus => "Focus",
            TimerPhase::Break => "Break",
            TimerPhase::LongBreak => "Long Break",
        }
    }
}

impl std::fmt::Display for TimerPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Pomod event types
///
/// Events are broadcast via the EventBus and serialized for SSE
/// transmission. All events carry a UTC timestamp.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum PomodEvent {
    /// Timer tick task started (or resumed)
    TimerStarted {
        /// Phase the timer is counting down in
        phase: TimerPhase,
        /// Seconds remaining in the phase
        time_left_secs: u64,
        /// When the timer started
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Timer paused; the tick task was released
    TimerPaused {
        /// Seconds remaining at the moment of pause
        time_left_secs: u64,
        /// When the timer paused
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Timer and cycle state restored to defaults
    TimerReset {
        /// When the reset occurred
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// One-second countdown tick
    ///
    /// Emitted every second while the timer runs. Lossy: UIs that miss
    /// a tick recover on the next one.
    TimerTick {
        /// Phase being counted down
        phase: TimerPhase,
        /// Seconds remaining
        time_left_secs: u64,
        /// Completion of the current phase (0.0 - 100.0)
        progress_percent: f64,
        /// When the tick fired
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// A phase ran to zero and the cycle advanced
    PhaseCompleted {
        /// Phase that just completed
        completed: TimerPhase,
        /// Phase the cycle transitioned into
        next: TimerPhase,
        /// Completed focus phases in the current cycle
        cycle_count: u32,
        /// Duration of the next phase in seconds
        next_duration_secs: u64,
        /// When the phase completed
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Focus duration adjusted while in the focus phase
    DurationAdjusted {
        /// New focus duration in seconds
        focus_duration_secs: u64,
        /// Recomputed short-break duration in seconds
        break_duration_secs: u64,
        /// Seconds remaining after the adjustment
        time_left_secs: u64,
        /// When the adjustment was made
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// A stored credential was renewed at the provider token endpoint
    CredentialRefreshed {
        /// Session whose credential was renewed
        session_id: Uuid,
        /// New expiry (Unix epoch seconds)
        expires_at: i64,
        /// When the refresh completed
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Credential renewal failed; the session needs re-authentication
    CredentialRefreshFailed {
        /// Session whose refresh failed
        session_id: Uuid,
        /// Failure description
        reason: String,
        /// When the failure occurred
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// The remote player's current track changed (or stopped)
    TrackChanged {
        /// New track, or None when nothing is playing
        track: Option<TrackInfo>,
        /// When the change was observed
        timestamp: chrono::DateTime<chrono::Utc>,
    },
}

impl PomodEvent {
    /// Get event type as string for filtering
    pub fn event_type(&self) -> &str {
        match self {
            PomodEvent::TimerStarted { .. } => "TimerStarted",
            PomodEvent::TimerPaused { .. } => "TimerPaused",
            PomodEvent::TimerReset { .. } => "TimerReset",
            PomodEvent::TimerTick { .. } => "TimerTick",
            PomodEvent::PhaseCompleted { .. } => "PhaseCompleted",
            PomodEvent::DurationAdjusted { .. } => "DurationAdjusted",
            PomodEvent::CredentialRefreshed { .. } => "CredentialRefreshed",
            PomodEvent::CredentialRefreshFailed { .. } => "CredentialRefreshFailed",
            PomodEvent::TrackChanged { .. } => "TrackChanged",
        }
    }
}

// ========================================
// EventBus Implementation
// ========================================

/// Central event distribution bus
///
/// Uses tokio::broadcast internally, providing:
/// - Non-blocking publish (slow subscribers don't block producers)
/// - Multiple concurrent subscribers
/// - Automatic cleanup when subscribers drop
///
/// Subscribing returns a receiver; dropping the receiver unsubscribes.
///
/// # Examples
///
/// ```
/// use pomod_common::events::{EventBus, PomodEvent};
///
/// let bus = EventBus::new(100);
/// let mut rx = bus.subscribe();
///
/// bus.emit_lossy(PomodEvent::TimerReset {
///     timestamp: chrono::Utc::now(),
/// });
///
/// let event = rx.try_recv().unwrap();
/// assert_eq!(event.event_type(), "TimerReset");
/// ```
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<PomodEvent>,
    capacity: usize,
}

impl EventBus {
    /// Creates a new EventBus with the given channel capacity
    ///
    /// `capacity` bounds the number of events buffered for a slow
    /// subscriber before old events are dropped.
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx, capacity }
    }

    /// Subscribe to all future events
    ///
    /// Events emitted before subscription are not received.
    pub fn subscribe(&self) -> broadcast::Receiver<PomodEvent> {
        self.tx.subscribe()
    }

    /// Emit an event to all subscribers
    ///
    /// Returns `Ok(subscriber_count)` if at least one subscriber exists,
    /// `Err` if no subscribers are listening.
    #[allow(clippy::result_large_err)]
    pub fn emit(
        &self,
        event: PomodEvent,
    ) -> Result<usize, broadcast::error::SendError<PomodEvent>> {
        self.tx.send(event)
    }

    /// Emit an event, ignoring whether anyone is listening
    ///
    /// Used for periodic events (ticks, track polls) where a missed
    /// event is recovered by the next one.
    pub fn emit_lossy(&self, event: PomodEvent) {
        let _ = self.tx.send(event);
    }

    /// Get the current number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    /// Get the configured channel capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_eventbus_new() {
        let bus = EventBus::new(100);
        assert_eq!(bus.capacity(), 100);
        assert_eq!(bus.subscriber_count(), 0);
    }

    #[test]
    fn test_eventbus_subscribe() {
        let bus = EventBus::new(10);
        let _rx = bus.subscribe();
        assert_eq!(bus.subscriber_count(), 1);

        let _rx2 = bus.subscribe();
        assert_eq!(bus.subscriber_count(), 2);
    }

    #[test]
    fn test_eventbus_emit_delivers_to_all_subscribers() {
        let bus = EventBus::new(10);
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();

        let event = PomodEvent::TimerStarted {
            phase: TimerPhase::Focus,
            time_left_secs: 1500,
            timestamp: chrono::Utc::now(),
        };

        bus.emit(event).expect("emit should succeed");

        assert_eq!(rx1.try_recv().unwrap().event_type(), "TimerStarted");
        assert_eq!(rx2.try_recv().unwrap().event_type(), "TimerStarted");
    }

    #[test]
    fn test_eventbus_emit_without_subscribers_errors() {
        let bus = EventBus::new(10);
        let result = bus.emit(PomodEvent::TimerReset {
            timestamp: chrono::Utc::now(),
        });
        assert!(result.is_err());
    }

    #[test]
    fn test_eventbus_emit_lossy_does_not_panic_when_full() {
        let bus = EventBus::new(2);
        let mut _rx = bus.subscribe(); // subscribe but never receive

        for i in 0..10 {
            bus.emit_lossy(PomodEvent::TimerTick {
                phase: TimerPhase::Focus,
                time_left_secs: 1500 - i,
                progress_percent: 0.0,
                timestamp: chrono::Utc::now(),
            });
        }

        assert_eq!(bus.capacity(), 2);
    }

    #[test]
    fn test_event_serialization_tags_type() {
        let event = PomodEvent::PhaseCompleted {
            completed: TimerPhase::Focus,
            next: TimerPhase::Break,
            cycle_count: 1,
            next_duration_secs: 300,
            timestamp: chrono::Utc::now(),
        };

        let json = serde_json::to_string(&event).expect("serialization should succeed");
        assert!(json.contains("\"type\":\"PhaseCompleted\""));
        assert!(json.contains("\"completed\":\"Focus\""));
        assert!(json.contains("\"next\":\"Break\""));

        let back: PomodEvent = serde_json::from_str(&json).expect("deserialization should succeed");
        assert_eq!(back.event_type(), "PhaseCompleted");
    }

    #[test]
    fn test_phase_labels() {
        assert_eq!(TimerPhase::Focus.label(), "Focus");
        assert_eq!(TimerPhase::Break.label(), "Break");
        assert_eq!(TimerPhase::LongBreak.label(), "Long Break");
        assert_eq!(TimerPhase::LongBreak.to_string(), "Long Break");
    }
}
