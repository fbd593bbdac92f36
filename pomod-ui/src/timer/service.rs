//! Timer service: owns the cycle state and the one-second tick task
//!
//! Exactly one tick task exists at a time. `start` holds the task
//! handle and is a no-op while a live task exists; `pause` aborts and
//! releases it; dropping the service aborts whatever is still running,
//! so a leaked interval cannot outlive the service.

use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use pomod_common::api::types::TimerSnapshot;
use pomod_common::events::{EventBus, PomodEvent};

use super::cycle::{CycleConfig, CycleState};

/// Async owner of the Pomodoro cycle
pub struct TimerService {
    state: Arc<RwLock<CycleState>>,
    events: EventBus,
    tick_task: Mutex<Option<JoinHandle<()>>>,
}

impl TimerService {
    /// Create a stopped timer with the given cycle defaults
    pub fn new(config: CycleConfig, events: EventBus) -> Self {
        Self {
            state: Arc::new(RwLock::new(CycleState::new(config))),
            events,
            tick_task: Mutex::new(None),
        }
    }

    /// Start the countdown
    ///
    /// Spawns the tick task unless one is already live (starting while
    /// running is a no-op). Returns whether a task was spawned.
    pub async fn start(&self) -> bool {
        {
            let guard = self.tick_task.lock().expect("tick task lock poisoned");
            if let Some(handle) = guard.as_ref() {
                if !handle.is_finished() {
                    debug!("Timer already running; start ignored");
                    return false;
                }
            }
        }

        let (phase, time_left) = {
            let mut state = self.state.write().await;
            state.is_running = true;
            (state.phase, state.time_left_secs)
        };

        self.events.emit_lossy(PomodEvent::TimerStarted {
            phase,
            time_left_secs: time_left,
            timestamp: pomod_common::time::now(),
        });

        let state = Arc::clone(&self.state);
        let events = self.events.clone();
        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(1));
            // The first interval tick completes immediately; consume it
            // so the first decrement lands a full second after start
            interval.tick().await;

            loop {
                interval.tick().await;

                let mut cycle = state.write().await;
                let transition = cycle.tick();
                let phase = cycle.phase;
                let time_left = cycle.time_left_secs;
                let progress = cycle.progress_percent();
                let cycle_count = cycle.cycle_count;
                drop(cycle);

                match transition {
                    None => {
                        events.emit_lossy(PomodEvent::TimerTick {
                            phase,
                            time_left_secs: time_left,
                            progress_percent: progress,
                            timestamp: pomod_common::time::now(),
                        });
                    }
                    Some(transition) => {
                        info!(
                            "Phase {} completed; next {} ({}s), cycle {}",
                            transition.completed,
                            transition.next,
                            transition.next_duration_secs,
                            cycle_count
                        );
                        events.emit_lossy(PomodEvent::PhaseCompleted {
                            completed: transition.completed,
                            next: transition.next,
                            cycle_count: transition.cycle_count,
                            next_duration_secs: transition.next_duration_secs,
                            timestamp: pomod_common::time::now(),
                        });
                        // Completing a phase stops the countdown; the
                        // task ends with it
                        break;
                    }
                }
            }
        });

        *self.tick_task.lock().expect("tick task lock poisoned") = Some(handle);
        true
    }

    /// Pause the countdown, aborting and releasing the tick task
    pub async fn pause(&self) {
        self.release_tick_task();

        let time_left = {
            let mut state = self.state.write().await;
            state.is_running = false;
            state.time_left_secs
        };

        self.events.emit_lossy(PomodEvent::TimerPaused {
            time_left_secs: time_left,
            timestamp: pomod_common::time::now(),
        });
    }

    /// Reset the whole cycle to defaults, stopping the countdown
    pub async fn reset(&self) {
        self.release_tick_task();

        self.state.write().await.reset();

        self.events.emit_lossy(PomodEvent::TimerReset {
            timestamp: pomod_common::time::now(),
        });
    }

    /// Lengthen the focus phase; no-op during breaks
    pub async fn add_time(&self, minutes: u64) -> TimerSnapshot {
        let mut state = self.state.write().await;
        if state.add_time(minutes) {
            self.emit_duration_adjusted(&state);
        }
        state.snapshot()
    }

    /// Shorten the focus phase; no-op during breaks, floored at 5 min
    pub async fn remove_time(&self, minutes: u64) -> TimerSnapshot {
        let mut state = self.state.write().await;
        if state.remove_time(minutes) {
            self.emit_duration_adjusted(&state);
        }
        state.snapshot()
    }

    /// Point-in-time view of the cycle state
    pub async fn snapshot(&self) -> TimerSnapshot {
        self.state.read().await.snapshot()
    }

    /// Whether a live tick task currently exists
    pub fn is_ticking(&self) -> bool {
        self.tick_task
            .lock()
            .expect("tick task lock poisoned")
            .as_ref()
            .map(|handle| !handle.is_finished())
            .unwrap_or(false)
    }

    fn emit_duration_adjusted(&self, state: &CycleState) {
        self.events.emit_lossy(PomodEvent::DurationAdjusted {
            focus_duration_secs: state.focus_duration_secs,
            break_duration_secs: state.break_duration_secs,
            time_left_secs: state.time_left_secs,
            timestamp: pomod_common::time::now(),
        });
    }

    fn release_tick_task(&self) {
        if let Some(handle) = self.tick_task.lock().expect("tick task lock poisoned").take() {
            handle.abort();
        }
    }
}

impl Drop for TimerService {
    fn drop(&mut self) {
        // The tick task must never outlive its owner
        self.release_tick_task();
    }
}
