//! Pomodoro cycle timer
//!
//! `cycle` holds the pure state machine; `service` owns the state and
//! the one-second tick task that drives it.

pub mod cycle;
pub mod service;

pub use cycle::{CycleConfig, CycleState, CycleTransition};
pub use service::TimerService;
