//! Countdown timer
//!
//! This module provides:
//! - **Config**: immutable per-session settings with reconciled announcements
//! - **Runtime**: mutable remaining time, percent and announcement queue
//! - **Engine**: synchronous state machine over config + runtime
//! - **Service**: async task that ticks the engine, awaits speech and the
//!   chime, and handles auto-restart

mod config;
mod engine;
mod error;
mod runtime;
mod scheduler;
mod service;
mod state;

#[cfg(test)]
mod service_tests;

pub use config::TimerConfig;
pub use engine::{CountdownEngine, EndStep, StartPlan, TickOutcome};
pub use error::{ConfigError, TimerError};
pub use runtime::{EndingPhase, TimerRuntime, percent_of};
pub use scheduler::{TickAction, plan_tick};
pub use service::{TimerCommand, TimerHandle, TimerService, TimerSnapshot};
pub use state::{StateChange, TimerAction, TimerState};
