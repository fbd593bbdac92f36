//! Pomodoro cycle state machine
//!
//! Pure state transitions only; no timers, channels, or I/O. The
//! owning service calls [`CycleState::tick`] once per second and
//! broadcasts the transitions this module returns.
//!
//! Phase graph:
//! - Focus -> Break (cycle incomplete)
//! - Focus -> LongBreak (threshold reached)
//! - Break -> Focus
//! - LongBreak -> Focus (full reset, counter zeroed)

use pomod_common::api::types::TimerSnapshot;
use pomod_common::events::TimerPhase;
use pomod_common::time::format_clock;

/// Focus duration floor: adjustments never go below 5 minutes
pub const MIN_FOCUS_SECS: u64 = 300;

/// Cycle defaults, normally loaded from the settings table
#[derive(Debug, Clone)]
pub struct CycleConfig {
    pub focus_duration_secs: u64,
    pub break_duration_secs: u64,
    pub long_break_duration_secs: u64,
    /// Focus phases completed before the long break (the classic 4)
    pub cycles_per_long_break: u32,
}

impl Default for CycleConfig {
    fn default() -> Self {
        Self {
            focus_duration_secs: 1500,
            break_duration_secs: 300,
            long_break_duration_secs: 1200,
            cycles_per_long_break: 4,
        }
    }
}

/// A completed phase transition returned by [`CycleState::tick`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleTransition {
    /// Phase that ran to zero
    pub completed: TimerPhase,
    /// Phase the cycle moved into
    pub next: TimerPhase,
    /// Focus phases completed in the current cycle after the transition
    pub cycle_count: u32,
    /// Duration of the next phase in seconds
    pub next_duration_secs: u64,
}

/// Mutable Pomodoro cycle state
///
/// Break lengths are derived, not configured: a completed focus phase
/// earns a short break of `round(focus / 5)`, and the long break after
/// the final focus phase is `round(total focus this cycle / 5)`.
#[derive(Debug, Clone)]
pub struct CycleState {
    config: CycleConfig,
    pub focus_duration_secs: u64,
    pub break_duration_secs: u64,
    pub long_break_duration_secs: u64,
    pub time_left_secs: u64,
    pub is_running: bool,
    pub phase: TimerPhase,
    pub cycle_count: u32,
    pub total_focus_secs_this_cycle: u64,
}

/// `round(value / 5)` with half-up rounding on whole seconds
fn round_fifth(value: u64) -> u64 {
    (2 * value + 5) / 10
}

impl CycleState {
    /// Create a fresh cycle in the focus phase, stopped
    pub fn new(config: CycleConfig) -> Self {
        Self {
            focus_duration_secs: config.focus_duration_secs,
            break_duration_secs: config.break_duration_secs,
            long_break_duration_secs: config.long_break_duration_secs,
            time_left_secs: config.focus_duration_secs,
            is_running: false,
            phase: TimerPhase::Focus,
            cycle_count: 0,
            total_focus_secs_this_cycle: 0,
            config,
        }
    }

    /// Advance the countdown by one second
    ///
    /// Returns the transition when this tick completed the current
    /// phase. Completing a phase always stops the timer; the caller
    /// starts the next phase explicitly.
    pub fn tick(&mut self) -> Option<CycleTransition> {
        if !self.is_running {
            return None;
        }

        self.time_left_secs = self.time_left_secs.saturating_sub(1);
        if self.time_left_secs > 0 {
            return None;
        }

        self.is_running = false;
        Some(self.complete_phase())
    }

    /// Apply the phase-end transition for the phase that just ran out
    fn complete_phase(&mut self) -> CycleTransition {
        let completed = self.phase;
        match completed {
            TimerPhase::Focus => {
                self.cycle_count += 1;
                self.total_focus_secs_this_cycle += self.focus_duration_secs;

                if self.cycle_count == self.config.cycles_per_long_break {
                    self.long_break_duration_secs = round_fifth(self.total_focus_secs_this_cycle);
                    self.time_left_secs = self.long_break_duration_secs;
                    self.phase = TimerPhase::LongBreak;
                } else {
                    self.break_duration_secs = round_fifth(self.focus_duration_secs);
                    self.time_left_secs = self.break_duration_secs;
                    self.phase = TimerPhase::Break;
                }
            }
            TimerPhase::Break => {
                self.time_left_secs = self.focus_duration_secs;
                self.phase = TimerPhase::Focus;
            }
            TimerPhase::LongBreak => {
                // The long break closes the cycle; everything returns
                // to defaults, including the cycle counter
                self.reset();
            }
        }

        CycleTransition {
            completed,
            next: self.phase,
            cycle_count: self.cycle_count,
            next_duration_secs: self.current_phase_duration(),
        }
    }

    /// Restore defaults and stop the timer
    pub fn reset(&mut self) {
        self.focus_duration_secs = self.config.focus_duration_secs;
        self.break_duration_secs = self.config.break_duration_secs;
        self.long_break_duration_secs = self.config.long_break_duration_secs;
        self.time_left_secs = self.config.focus_duration_secs;
        self.is_running = false;
        self.phase = TimerPhase::Focus;
        self.cycle_count = 0;
        self.total_focus_secs_this_cycle = 0;
    }

    /// Lengthen the focus phase by `minutes`
    ///
    /// The short break is recomputed proportionally. No-op during any
    /// break phase. Returns whether the state changed.
    pub fn add_time(&mut self, minutes: u64) -> bool {
        if self.phase != TimerPhase::Focus {
            return false;
        }

        self.focus_duration_secs += minutes * 60;
        self.time_left_secs += minutes * 60;
        self.break_duration_secs = round_fifth(self.focus_duration_secs);
        true
    }

    /// Shorten the focus phase by `minutes`, never below 5 minutes
    ///
    /// No-op during any break phase, and when the focus duration is
    /// already at the floor. Returns whether the state changed.
    pub fn remove_time(&mut self, minutes: u64) -> bool {
        if self.phase != TimerPhase::Focus {
            return false;
        }
        if self.focus_duration_secs <= MIN_FOCUS_SECS {
            return false;
        }

        self.focus_duration_secs =
            self.focus_duration_secs.saturating_sub(minutes * 60).max(MIN_FOCUS_SECS);
        self.time_left_secs =
            self.time_left_secs.saturating_sub(minutes * 60).max(MIN_FOCUS_SECS);
        self.break_duration_secs = round_fifth(self.focus_duration_secs);
        true
    }

    /// Full duration of the phase currently counting down
    pub fn current_phase_duration(&self) -> u64 {
        match self.phase {
            TimerPhase::Focus => self.focus_duration_secs,
            TimerPhase::Break => self.break_duration_secs,
            TimerPhase::LongBreak => self.long_break_duration_secs,
        }
    }

    /// Completion of the current phase, 0.0 - 100.0
    pub fn progress_percent(&self) -> f64 {
        let total = self.current_phase_duration();
        if total == 0 {
            return 0.0;
        }
        100.0 * (1.0 - self.time_left_secs as f64 / total as f64)
    }

    /// Point-in-time view for the HTTP API
    pub fn snapshot(&self) -> TimerSnapshot {
        TimerSnapshot {
            phase: self.phase,
            mode: self.phase.label().to_string(),
            focus_duration_secs: self.focus_duration_secs,
            break_duration_secs: self.break_duration_secs,
            long_break_duration_secs: self.long_break_duration_secs,
            time_left_secs: self.time_left_secs,
            clock: format_clock(self.time_left_secs),
            is_running: self.is_running,
            cycle_count: self.cycle_count,
            total_focus_secs_this_cycle: self.total_focus_secs_this_cycle,
            progress_percent: self.progress_percent(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn running_state() -> CycleState {
        let mut state = CycleState::new(CycleConfig::default());
        state.is_running = true;
        state
    }

    /// Run the timer to the end of the current phase
    fn run_phase_out(state: &mut CycleState) -> CycleTransition {
        state.is_running = true;
        loop {
            if let Some(transition) = state.tick() {
                return transition;
            }
        }
    }

    #[test]
    fn test_initial_state() {
        let state = CycleState::new(CycleConfig::default());
        assert_eq!(state.phase, TimerPhase::Focus);
        assert_eq!(state.time_left_secs, 1500);
        assert_eq!(state.cycle_count, 0);
        assert!(!state.is_running);
    }

    #[test]
    fn test_tick_decrements_while_running() {
        let mut state = running_state();
        assert_eq!(state.tick(), None);
        assert_eq!(state.time_left_secs, 1499);
    }

    #[test]
    fn test_tick_is_noop_when_stopped() {
        let mut state = CycleState::new(CycleConfig::default());
        assert_eq!(state.tick(), None);
        assert_eq!(state.time_left_secs, 1500);
    }

    #[test]
    fn test_focus_phase_completes_into_break() {
        // focus=1500, start, 1500 ticks -> Break, break=300, cycle_count=1
        let mut state = running_state();
        let mut transition = None;
        for _ in 0..1500 {
            transition = state.tick();
        }

        let transition = transition.expect("1500th tick should complete the phase");
        assert_eq!(transition.completed, TimerPhase::Focus);
        assert_eq!(transition.next, TimerPhase::Break);
        assert_eq!(transition.cycle_count, 1);
        assert_eq!(transition.next_duration_secs, 300);

        assert_eq!(state.phase, TimerPhase::Break);
        assert_eq!(state.break_duration_secs, 300);
        assert_eq!(state.time_left_secs, 300);
        assert_eq!(state.cycle_count, 1);
        assert!(!state.is_running, "completing a phase stops the timer");
    }

    #[test]
    fn test_short_break_is_one_fifth_of_focus() {
        // Holds for any focus duration >= the 300s floor
        for focus in [300u64, 900, 1500, 1560, 3000] {
            let mut state = CycleState::new(CycleConfig::default());
            state.focus_duration_secs = focus;
            state.time_left_secs = focus;

            let transition = run_phase_out(&mut state);
            let expected = (2 * focus + 5) / 10;
            assert_eq!(transition.next_duration_secs, expected, "focus={}", focus);
            assert_eq!(state.break_duration_secs, expected);
        }
    }

    #[test]
    fn test_fourth_focus_phase_triggers_long_break() {
        let mut state = CycleState::new(CycleConfig::default());
        let mut total_focus = 0u64;

        for cycle in 1..=4u32 {
            total_focus += state.focus_duration_secs;
            let transition = run_phase_out(&mut state);
            assert_eq!(transition.completed, TimerPhase::Focus);
            assert_eq!(transition.cycle_count, cycle);

            if cycle < 4 {
                assert_eq!(transition.next, TimerPhase::Break);
                // Walk through the break back into focus
                let transition = run_phase_out(&mut state);
                assert_eq!(transition.next, TimerPhase::Focus);
            } else {
                assert_eq!(transition.next, TimerPhase::LongBreak);
            }
        }

        // Long break is a fifth of everything focused this cycle
        assert_eq!(state.long_break_duration_secs, total_focus / 5);
        assert_eq!(state.time_left_secs, total_focus / 5);
    }

    #[test]
    fn test_long_break_accounts_for_adjusted_focus_durations() {
        let mut state = CycleState::new(CycleConfig::default());

        // First focus runs at the default 1500s
        run_phase_out(&mut state);
        run_phase_out(&mut state); // break

        // Lengthen the remaining focus phases to 1800s
        state.add_time(5);
        assert_eq!(state.focus_duration_secs, 1800);

        run_phase_out(&mut state); // focus 2
        run_phase_out(&mut state); // break
        run_phase_out(&mut state); // focus 3
        run_phase_out(&mut state); // break
        let transition = run_phase_out(&mut state); // focus 4

        assert_eq!(transition.next, TimerPhase::LongBreak);
        // 1500 + 3 * 1800 = 6900; round(6900 / 5) = 1380
        assert_eq!(state.long_break_duration_secs, 1380);
    }

    #[test]
    fn test_completed_long_break_resets_cycle() {
        let mut state = CycleState::new(CycleConfig::default());

        for _ in 0..3 {
            run_phase_out(&mut state); // focus
            run_phase_out(&mut state); // break
        }
        run_phase_out(&mut state); // 4th focus -> long break
        assert_eq!(state.phase, TimerPhase::LongBreak);

        let transition = run_phase_out(&mut state); // long break -> reset
        assert_eq!(transition.completed, TimerPhase::LongBreak);
        assert_eq!(transition.next, TimerPhase::Focus);
        assert_eq!(transition.cycle_count, 0);

        assert_eq!(state.cycle_count, 0);
        assert_eq!(state.total_focus_secs_this_cycle, 0);
        assert_eq!(state.focus_duration_secs, 1500);
        assert_eq!(state.time_left_secs, 1500);
        assert!(!state.is_running);
    }

    #[test]
    fn test_add_time_extends_focus_and_recomputes_break() {
        let mut state = CycleState::new(CycleConfig::default());
        state.time_left_secs = 1000;

        assert!(state.add_time(5));
        assert_eq!(state.focus_duration_secs, 1800);
        assert_eq!(state.time_left_secs, 1300);
        assert_eq!(state.break_duration_secs, 360);
    }

    #[test]
    fn test_add_time_is_noop_during_breaks() {
        let mut state = CycleState::new(CycleConfig::default());
        run_phase_out(&mut state);
        assert_eq!(state.phase, TimerPhase::Break);

        let before = state.clone();
        assert!(!state.add_time(5));
        assert_eq!(state.focus_duration_secs, before.focus_duration_secs);
        assert_eq!(state.time_left_secs, before.time_left_secs);
    }

    #[test]
    fn test_remove_time_floors_at_five_minutes() {
        let mut state = CycleState::new(CycleConfig::default());

        // 25min -> repeated removal bottoms out at 5min
        for _ in 0..40 {
            state.remove_time(1);
        }
        assert_eq!(state.focus_duration_secs, MIN_FOCUS_SECS);
        assert_eq!(state.break_duration_secs, 60);

        // At the floor, removal is a no-op
        assert!(!state.remove_time(1));
        assert_eq!(state.focus_duration_secs, MIN_FOCUS_SECS);
    }

    #[test]
    fn test_remove_time_floors_remaining_time() {
        let mut state = CycleState::new(CycleConfig::default());
        state.time_left_secs = 320;

        assert!(state.remove_time(1));
        assert_eq!(state.focus_duration_secs, 1440);
        assert_eq!(state.time_left_secs, MIN_FOCUS_SECS);
    }

    #[test]
    fn test_progress_percent() {
        let mut state = CycleState::new(CycleConfig::default());
        assert_eq!(state.progress_percent(), 0.0);

        state.time_left_secs = 750;
        assert!((state.progress_percent() - 50.0).abs() < f64::EPSILON);

        state.time_left_secs = 0;
        assert!((state.progress_percent() - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_snapshot_reflects_state() {
        let mut state = CycleState::new(CycleConfig::default());
        state.time_left_secs = 65;
        state.is_running = true;

        let snapshot = state.snapshot();
        assert_eq!(snapshot.mode, "Focus");
        assert_eq!(snapshot.clock, "01:05");
        assert!(snapshot.is_running);
        assert_eq!(snapshot.focus_duration_secs, 1500);
    }

    #[test]
    fn test_round_fifth_half_up() {
        assert_eq!(round_fifth(1500), 300);
        assert_eq!(round_fifth(1502), 300); // 300.4 rounds down
        assert_eq!(round_fifth(1503), 301); // 300.6 rounds up
        assert_eq!(round_fifth(7), 1); // 1.4
        assert_eq!(round_fifth(8), 2); // 1.6
    }
}
