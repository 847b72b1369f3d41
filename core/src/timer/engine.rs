//! Countdown state machine
//!
//! `CountdownEngine` owns the immutable `TimerConfig` and the mutable
//! `TimerRuntime` and validates every transition. It never waits on
//! anything: operations that require waiting (start message, end message,
//! chime, auto-restart) return a plan that the caller performs before
//! calling back in (`begin_running`, `advance_ending`, `auto_restart`).

use std::time::Duration;

use talking_timer_types::TimerSettings;
use tokio::sync::broadcast;
use tokio::time::Instant;

use super::config::TimerConfig;
use super::error::TimerError;
use super::runtime::{EndingPhase, TimerRuntime};
use super::scheduler::{TickAction, plan_tick};
use super::state::{StateChange, TimerAction, TimerState};
use crate::announcement::{Announcement, AnnouncementQueue};

/// Capacity of the state-change broadcast channel
pub(crate) const STATE_CHANNEL_CAPACITY: usize = 64;

/// What to do after a successful `start`
#[derive(Debug, Clone, PartialEq)]
pub enum StartPlan {
    /// Speak this message, then call `begin_running`
    Speak(String),
    /// Already running
    Running,
}

/// Next step of the end-of-timer sequence
#[derive(Debug, Clone, PartialEq)]
pub enum EndStep {
    /// Speak the end message, then call `advance_ending`
    Speak(String),
    /// Play the chime, then call `advance_ending` once it has finished
    Chime,
    /// Reached `Ended`; call `auto_restart` after the delay, if any
    Done { auto_restart: Option<Duration> },
}

/// Result of a tick
#[derive(Debug, Clone, PartialEq)]
pub enum TickOutcome {
    Idle,
    Announce(Announcement),
    Finished(EndStep),
}

pub struct CountdownEngine {
    config: Option<TimerConfig>,
    runtime: TimerRuntime,
    events: broadcast::Sender<StateChange>,
}

impl Default for CountdownEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl CountdownEngine {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(STATE_CHANNEL_CAPACITY);
        Self::with_sender(events)
    }

    /// Create an engine that reports transitions on an existing channel.
    pub fn with_sender(events: broadcast::Sender<StateChange>) -> Self {
        Self {
            config: None,
            runtime: TimerRuntime::default(),
            events,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StateChange> {
        self.events.subscribe()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Queries
    // ─────────────────────────────────────────────────────────────────────────

    pub fn state(&self) -> TimerState {
        self.runtime.state
    }

    pub fn config(&self) -> Option<&TimerConfig> {
        self.config.as_ref()
    }

    pub fn remaining_ms(&self) -> u64 {
        self.runtime.remaining_ms
    }

    pub fn percent(&self) -> f64 {
        self.runtime.percent
    }

    pub fn total_ms(&self) -> u64 {
        self.config.as_ref().map(|c| c.total_ms).unwrap_or(0)
    }

    /// Announcements not yet spoken in this run
    pub fn queue(&self) -> &AnnouncementQueue {
        &self.runtime.queue
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Load a new configuration. On error the engine reverts to `Unset`.
    pub fn configure(&mut self, settings: &TimerSettings) -> Result<(), TimerError> {
        if !matches!(
            self.runtime.state,
            TimerState::Unset | TimerState::Ready | TimerState::Paused | TimerState::Ended
        ) {
            return Err(self.reject(TimerAction::Configure));
        }

        match TimerConfig::from_settings(settings) {
            Ok(config) => {
                tracing::info!(
                    total_ms = config.total_ms,
                    announcements = config.announcements.len(),
                    "timer configured"
                );
                // Keep the old state so the emitted change reports where we came from
                self.runtime = TimerRuntime {
                    state: self.runtime.state,
                    ..TimerRuntime::new(&config)
                };
                self.config = Some(config);
                self.transition(TimerState::Ready);
                Ok(())
            }
            Err(err) => {
                tracing::warn!(error = %err, "timer configuration rejected");
                self.unset();
                Err(err.into())
            }
        }
    }

    /// `Ready -> Starting`, then straight to `Running` unless there is a
    /// start message to speak first.
    pub fn start(&mut self, now: Instant) -> Result<StartPlan, TimerError> {
        if self.runtime.state != TimerState::Ready {
            return Err(self.reject(TimerAction::Start));
        }
        let config = self.config.as_ref().ok_or(TimerError::NotConfigured)?;
        let start_message = config.say_start.then(|| config.start_message.clone());

        self.transition(TimerState::Starting);

        match start_message {
            Some(message) => Ok(StartPlan::Speak(message)),
            None => {
                self.begin_running(now)?;
                Ok(StartPlan::Running)
            }
        }
    }

    /// `Starting -> Running`: the countdown clock starts at `now`.
    pub fn begin_running(&mut self, now: Instant) -> Result<(), TimerError> {
        if self.runtime.state != TimerState::Starting {
            return Err(self.reject(TimerAction::Start));
        }
        self.runtime.last_tick_at = Some(now);
        self.transition(TimerState::Running);
        Ok(())
    }

    /// Advance the countdown to `now`. No-op unless running.
    pub fn tick(&mut self, now: Instant) -> TickOutcome {
        if self.runtime.state != TimerState::Running {
            return TickOutcome::Idle;
        }
        let Some(config) = self.config.as_ref() else {
            return TickOutcome::Idle;
        };
        let (total_ms, early_fire_ms) = (config.total_ms, config.early_fire_ms);

        self.runtime.account_elapsed(now, total_ms);

        match plan_tick(
            self.runtime.remaining_ms,
            self.runtime.queue.peek(),
            early_fire_ms,
        ) {
            TickAction::Idle => TickOutcome::Idle,
            TickAction::Announce => match self
                .runtime
                .queue
                .pop_due(self.runtime.remaining_ms, early_fire_ms)
            {
                Some(announcement) => {
                    tracing::debug!(
                        offset_ms = announcement.offset_ms,
                        remaining_ms = self.runtime.remaining_ms,
                        message = %announcement.message,
                        "announcement due"
                    );
                    TickOutcome::Announce(announcement)
                }
                None => TickOutcome::Idle,
            },
            TickAction::Finish => {
                tracing::info!("countdown finished");
                TickOutcome::Finished(self.finish(false))
            }
        }
    }

    /// `Running -> Paused`. Elapsed time up to `now` is counted first.
    pub fn pause(&mut self, now: Instant) -> Result<(), TimerError> {
        if self.runtime.state != TimerState::Running {
            return Err(self.reject(TimerAction::Pause));
        }
        let config = self.config.as_ref().ok_or(TimerError::NotConfigured)?;
        if !config.allow_pause {
            tracing::warn!("pause requested but pausing is disabled");
            return Err(TimerError::PauseDisabled);
        }

        self.runtime.account_elapsed(now, config.total_ms);
        self.runtime.last_tick_at = None;
        self.transition(TimerState::Paused);
        Ok(())
    }

    /// `Paused -> Running` with a fresh clock anchor.
    pub fn resume(&mut self, now: Instant) -> Result<(), TimerError> {
        if self.runtime.state != TimerState::Paused {
            return Err(self.reject(TimerAction::Resume));
        }
        self.runtime.last_tick_at = Some(now);
        self.transition(TimerState::Running);
        Ok(())
    }

    /// End the countdown early.
    ///
    /// A silent stop goes straight to `Ended` with no speech, no chime and
    /// no auto-restart. Otherwise the normal ending sequence runs.
    pub fn stop(&mut self, silent: bool) -> Result<EndStep, TimerError> {
        if !matches!(
            self.runtime.state,
            TimerState::Running | TimerState::Paused
        ) {
            return Err(self.reject(TimerAction::Stop));
        }
        tracing::info!(silent, remaining_ms = self.runtime.remaining_ms, "timer stopped");
        Ok(self.finish(silent))
    }

    /// Drive the ending sequence one step: end message, chime, `Ended`.
    ///
    /// Returns `None` outside `Ending`.
    pub fn advance_ending(&mut self) -> Option<EndStep> {
        if self.runtime.state != TimerState::Ending {
            return None;
        }
        let config = self.config.as_ref()?;
        let (say_end, end_chime) = (config.say_end, config.end_chime);
        let end_message = config.end_message.clone();

        let step = match self.runtime.ending {
            EndingPhase::Idle | EndingPhase::Begun if say_end => {
                self.runtime.ending = EndingPhase::Speaking;
                EndStep::Speak(end_message)
            }
            EndingPhase::Idle | EndingPhase::Begun | EndingPhase::Speaking if end_chime => {
                self.runtime.ending = EndingPhase::Chiming;
                EndStep::Chime
            }
            _ => self.complete(true),
        };
        Some(step)
    }

    /// Back to `Ready` with the full duration and a fresh queue.
    ///
    /// Without `force` only a paused or ended timer can be reset.
    pub fn reset(&mut self, force: bool) -> Result<(), TimerError> {
        let allowed = match self.runtime.state {
            TimerState::Unset => false,
            TimerState::Paused | TimerState::Ended => true,
            _ => force,
        };
        if !allowed {
            return Err(self.reject(TimerAction::Reset));
        }
        self.reload();
        tracing::info!(force, "timer reset");
        Ok(())
    }

    /// Reset and start again from a paused or ended timer.
    pub fn restart(&mut self, now: Instant) -> Result<StartPlan, TimerError> {
        if !matches!(
            self.runtime.state,
            TimerState::Paused | TimerState::Ended
        ) {
            return Err(self.reject(TimerAction::Restart));
        }
        self.reload();
        self.start(now)
    }

    /// Restart fired by the auto-restart delay. Only valid once `Ended`.
    pub fn auto_restart(&mut self, now: Instant) -> Result<StartPlan, TimerError> {
        if self.runtime.state != TimerState::Ended {
            return Err(self.reject(TimerAction::AutoRestart));
        }
        tracing::info!("auto-restarting timer");
        self.reload();
        self.start(now)
    }

    /// Drop the configuration (disconnect).
    pub fn unset(&mut self) {
        self.config = None;
        self.runtime = TimerRuntime {
            state: self.runtime.state,
            ..TimerRuntime::default()
        };
        self.transition(TimerState::Unset);
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Internals
    // ─────────────────────────────────────────────────────────────────────────

    fn reject(&self, action: TimerAction) -> TimerError {
        let state = self.runtime.state;
        if state == TimerState::Unset {
            tracing::warn!(%action, "timer action rejected, not configured");
            return TimerError::NotConfigured;
        }
        tracing::warn!(%action, %state, "timer action rejected");
        TimerError::InvalidTransition { action, state }
    }

    /// Rebuild the runtime from the config and move to `Ready`.
    fn reload(&mut self) {
        let Some(config) = self.config.as_ref() else {
            return;
        };
        self.runtime = TimerRuntime {
            state: self.runtime.state,
            ..TimerRuntime::new(config)
        };
        self.transition(TimerState::Ready);
    }

    /// Leave the countdown: into the ending sequence, or straight to `Ended`.
    fn finish(&mut self, silent: bool) -> EndStep {
        self.runtime.queue.clear();
        self.runtime.last_tick_at = None;

        let has_ending = self
            .config
            .as_ref()
            .is_some_and(|c| c.say_end || c.end_chime);

        if silent || !has_ending {
            return self.complete(!silent);
        }

        self.runtime.ending = EndingPhase::Begun;
        self.transition(TimerState::Ending);
        self.advance_ending()
            .unwrap_or(EndStep::Done { auto_restart: None })
    }

    fn complete(&mut self, allow_restart: bool) -> EndStep {
        self.runtime.ending = EndingPhase::Idle;
        self.transition(TimerState::Ended);
        let auto_restart = if allow_restart {
            self.config.as_ref().and_then(|c| c.auto_restart_after)
        } else {
            None
        };
        EndStep::Done { auto_restart }
    }

    fn transition(&mut self, next: TimerState) {
        let previous = self.runtime.state;
        if previous == next {
            return;
        }
        self.runtime.state = next;
        tracing::info!(%previous, current = %next, "timer state changed");
        // No subscribers is fine
        let _ = self.events.send(StateChange {
            previous,
            current: next,
        });
    }
}
