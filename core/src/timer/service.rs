//! Timer service - async driver around the countdown engine
//!
//! Architecture:
//! - TimerHandle: cloneable, sends commands and reads the latest snapshot
//! - TimerService: background task that owns the engine exclusively
//!
//! The service loop serializes three event sources with `select!`: caller
//! commands, the tick interval (only while running) and the single pending
//! suspension (start message, end message, chime, auto-restart delay).

use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use talking_timer_types::TimerSettings;
use tokio::sync::{RwLock, broadcast, mpsc, oneshot};
use tokio::time::{Instant, Interval, MissedTickBehavior, Sleep};

use super::engine::{CountdownEngine, EndStep, STATE_CHANNEL_CAPACITY, StartPlan, TickOutcome};
use super::error::TimerError;
use super::state::{StateChange, TimerState};
use crate::announcement::Announcement;
use crate::duration::format_remaining;
use crate::gateway::{ChimeGateway, SpeechCompletion, SpeechGateway};
use crate::interval::phrasing::NORMAL_RATE;

const DEFAULT_TICK: Duration = Duration::from_millis(50);
const DEFAULT_SPEECH_TIMEOUT: Duration = Duration::from_secs(15);
const COMMAND_CHANNEL_CAPACITY: usize = 32;

// ─────────────────────────────────────────────────────────────────────────────
// Commands & Snapshot
// ─────────────────────────────────────────────────────────────────────────────

/// Caller requests, answered with the resulting state
#[derive(Debug)]
pub enum TimerCommand {
    Configure(Box<TimerSettings>),
    Start,
    Pause,
    Resume,
    Stop { silent: bool },
    Reset { force: bool },
    Restart,
}

struct TimerRequest {
    command: TimerCommand,
    reply: oneshot::Sender<Result<TimerState, TimerError>>,
}

/// Point-in-time view of the timer, refreshed after every event
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TimerSnapshot {
    pub state: TimerState,
    pub total_ms: u64,
    pub remaining_ms: u64,
    pub percent: f64,
    /// Remaining time as `M:SS` / `H:MM:SS`
    pub remaining_label: String,
    pub next_announcement: Option<Announcement>,
    pub pending_announcements: usize,
}

impl TimerSnapshot {
    fn capture(engine: &CountdownEngine) -> Self {
        Self {
            state: engine.state(),
            total_ms: engine.total_ms(),
            remaining_ms: engine.remaining_ms(),
            percent: engine.percent(),
            remaining_label: format_remaining(engine.remaining_ms()),
            next_announcement: engine.queue().peek().cloned(),
            pending_announcements: engine.queue().len(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Handle
// ─────────────────────────────────────────────────────────────────────────────

/// Handle to control a running timer service
///
/// Dropping every handle shuts the service down and unsets the timer.
#[derive(Clone)]
pub struct TimerHandle {
    cmd_tx: mpsc::Sender<TimerRequest>,
    snapshot: Arc<RwLock<TimerSnapshot>>,
    events: broadcast::Sender<StateChange>,
}

impl TimerHandle {
    async fn send(&self, command: TimerCommand) -> Result<TimerState, TimerError> {
        let (reply, rx) = oneshot::channel();
        self.cmd_tx
            .send(TimerRequest { command, reply })
            .await
            .map_err(|_| TimerError::ServiceClosed)?;
        rx.await.map_err(|_| TimerError::ServiceClosed)?
    }

    pub async fn configure(&self, settings: TimerSettings) -> Result<TimerState, TimerError> {
        self.send(TimerCommand::Configure(Box::new(settings))).await
    }

    pub async fn start(&self) -> Result<TimerState, TimerError> {
        self.send(TimerCommand::Start).await
    }

    pub async fn pause(&self) -> Result<TimerState, TimerError> {
        self.send(TimerCommand::Pause).await
    }

    pub async fn resume(&self) -> Result<TimerState, TimerError> {
        self.send(TimerCommand::Resume).await
    }

    pub async fn stop(&self, silent: bool) -> Result<TimerState, TimerError> {
        self.send(TimerCommand::Stop { silent }).await
    }

    pub async fn reset(&self, force: bool) -> Result<TimerState, TimerError> {
        self.send(TimerCommand::Reset { force }).await
    }

    pub async fn restart(&self) -> Result<TimerState, TimerError> {
        self.send(TimerCommand::Restart).await
    }

    pub async fn snapshot(&self) -> TimerSnapshot {
        self.snapshot.read().await.clone()
    }

    /// Receive every state transition from now on
    pub fn subscribe(&self) -> broadcast::Receiver<StateChange> {
        self.events.subscribe()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Suspension points
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WaitKind {
    StartMessage,
    EndMessage,
    Chime,
    AutoRestart,
}

/// The one thing the service is currently waiting on
struct Pending {
    kind: WaitKind,
    /// Fixed delay, or the upper bound on a speech wait
    deadline: Pin<Box<Sleep>>,
    speech: Option<SpeechCompletion>,
}

impl Pending {
    fn speech(kind: WaitKind, completion: SpeechCompletion, timeout: Duration) -> Self {
        Self {
            kind,
            deadline: Box::pin(tokio::time::sleep(timeout)),
            speech: Some(completion),
        }
    }

    fn delay(kind: WaitKind, delay: Duration) -> Self {
        Self {
            kind,
            deadline: Box::pin(tokio::time::sleep(delay)),
            speech: None,
        }
    }

    async fn wait(&mut self) {
        let kind = self.kind;
        match self.speech.as_mut() {
            Some(speech) => {
                tokio::select! {
                    completed = speech => {
                        if !completed {
                            tracing::warn!(?kind, "speech engine dropped the completion signal");
                        }
                    }
                    _ = self.deadline.as_mut() => {
                        tracing::warn!(?kind, "timed out waiting for speech to finish");
                    }
                }
            }
            None => self.deadline.as_mut().await,
        }
    }
}

/// Resolve when the pending wait finishes; never resolves when idle.
async fn wait_for(pending: &mut Option<Pending>) -> WaitKind {
    match pending {
        Some(pending) => {
            pending.wait().await;
            pending.kind
        }
        None => std::future::pending().await,
    }
}

fn make_ticker(period: Duration) -> Interval {
    let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    ticker
}

// ─────────────────────────────────────────────────────────────────────────────
// Timer Service
// ─────────────────────────────────────────────────────────────────────────────

pub struct TimerService {
    engine: CountdownEngine,
    speech: Arc<dyn SpeechGateway>,
    chime: Arc<dyn ChimeGateway>,
    cmd_rx: mpsc::Receiver<TimerRequest>,
    snapshot: Arc<RwLock<TimerSnapshot>>,
    ticker: Interval,
    pending: Option<Pending>,
}

impl TimerService {
    /// Create a service and the handle to talk to it. Call `run` to start it.
    pub fn new(speech: Arc<dyn SpeechGateway>, chime: Arc<dyn ChimeGateway>) -> (Self, TimerHandle) {
        let (cmd_tx, cmd_rx) = mpsc::channel(COMMAND_CHANNEL_CAPACITY);
        let (events, _) = broadcast::channel(STATE_CHANNEL_CAPACITY);
        let snapshot = Arc::new(RwLock::new(TimerSnapshot::default()));

        let service = Self {
            engine: CountdownEngine::with_sender(events.clone()),
            speech,
            chime,
            cmd_rx,
            snapshot: snapshot.clone(),
            ticker: make_ticker(DEFAULT_TICK),
            pending: None,
        };

        let handle = TimerHandle {
            cmd_tx,
            snapshot,
            events,
        };

        (service, handle)
    }

    /// Create a service on the current tokio runtime and return its handle.
    pub fn spawn(speech: Arc<dyn SpeechGateway>, chime: Arc<dyn ChimeGateway>) -> TimerHandle {
        let (service, handle) = Self::new(speech, chime);
        tokio::spawn(service.run());
        handle
    }

    /// Run the service event loop until every handle is dropped
    pub async fn run(mut self) {
        tracing::info!("timer service started");

        loop {
            let running = self.engine.state() == TimerState::Running;

            tokio::select! {
                request = self.cmd_rx.recv() => {
                    let Some(TimerRequest { command, reply }) = request else {
                        break;
                    };
                    let result = self.dispatch(command);
                    // Callers read the snapshot right after the reply
                    self.publish().await;
                    let _ = reply.send(result);
                    continue;
                }
                _ = self.ticker.tick(), if running => {
                    self.on_tick();
                }
                kind = wait_for(&mut self.pending) => {
                    self.pending = None;
                    self.on_wait_complete(kind);
                }
            }

            self.publish().await;
        }

        self.pending = None;
        self.engine.unset();
        self.publish().await;
        tracing::info!("timer service stopped");
    }

    async fn publish(&self) {
        *self.snapshot.write().await = TimerSnapshot::capture(&self.engine);
    }

    fn tick_period(&self) -> Duration {
        self.engine
            .config()
            .map_or(DEFAULT_TICK, |c| c.tick_interval)
    }

    fn speech_timeout(&self) -> Duration {
        self.engine
            .config()
            .map_or(DEFAULT_SPEECH_TIMEOUT, |c| c.speech_timeout)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Event handlers
    // ─────────────────────────────────────────────────────────────────────────

    fn dispatch(&mut self, command: TimerCommand) -> Result<TimerState, TimerError> {
        tracing::debug!(?command, state = %self.engine.state(), "timer command");

        if self
            .pending
            .as_ref()
            .is_some_and(|p| p.kind == WaitKind::AutoRestart)
        {
            tracing::info!("pending auto-restart cancelled");
            self.pending = None;
        }

        let now = Instant::now();
        match command {
            TimerCommand::Configure(settings) => {
                self.engine.configure(&settings)?;
                self.pending = None;
                self.ticker = make_ticker(self.tick_period());
            }
            TimerCommand::Start => {
                let plan = self.engine.start(now)?;
                self.pending = None;
                self.follow_start(plan);
            }
            TimerCommand::Pause => {
                self.engine.pause(now)?;
                self.pending = None;
            }
            TimerCommand::Resume => {
                self.engine.resume(now)?;
                self.pending = None;
                self.ticker.reset();
            }
            TimerCommand::Stop { silent } => {
                let step = self.engine.stop(silent)?;
                self.pending = None;
                self.follow_end(step);
            }
            TimerCommand::Reset { force } => {
                self.engine.reset(force)?;
                self.pending = None;
            }
            TimerCommand::Restart => {
                let plan = self.engine.restart(now)?;
                self.pending = None;
                self.follow_start(plan);
            }
        }

        Ok(self.engine.state())
    }

    fn on_tick(&mut self) {
        match self.engine.tick(Instant::now()) {
            TickOutcome::Idle => {}
            TickOutcome::Announce(announcement) => {
                // Mid-run announcements are not awaited
                drop(self.speech.speak(&announcement.message, announcement.rate));
            }
            TickOutcome::Finished(step) => self.follow_end(step),
        }
    }

    fn on_wait_complete(&mut self, kind: WaitKind) {
        let now = Instant::now();
        match kind {
            WaitKind::StartMessage => match self.engine.begin_running(now) {
                Ok(()) => self.ticker.reset(),
                Err(err) => tracing::warn!(error = %err, "start message finished out of turn"),
            },
            WaitKind::EndMessage | WaitKind::Chime => {
                if let Some(step) = self.engine.advance_ending() {
                    self.follow_end(step);
                }
            }
            WaitKind::AutoRestart => match self.engine.auto_restart(now) {
                Ok(plan) => self.follow_start(plan),
                Err(err) => tracing::warn!(error = %err, "auto-restart skipped"),
            },
        }
    }

    fn follow_start(&mut self, plan: StartPlan) {
        match plan {
            StartPlan::Speak(message) => {
                let completion = self.speech.speak(&message, NORMAL_RATE);
                self.pending = Some(Pending::speech(
                    WaitKind::StartMessage,
                    completion,
                    self.speech_timeout(),
                ));
            }
            StartPlan::Running => self.ticker.reset(),
        }
    }

    fn follow_end(&mut self, step: EndStep) {
        match step {
            EndStep::Speak(message) => {
                let completion = self.speech.speak(&message, NORMAL_RATE);
                self.pending = Some(Pending::speech(
                    WaitKind::EndMessage,
                    completion,
                    self.speech_timeout(),
                ));
            }
            EndStep::Chime => {
                let length = self.chime.play_chime();
                tracing::debug!(?length, "chime playing");
                self.pending = Some(Pending::delay(WaitKind::Chime, length));
            }
            EndStep::Done {
                auto_restart: Some(delay),
            } => {
                tracing::info!(?delay, "auto-restart scheduled");
                self.pending = Some(Pending::delay(WaitKind::AutoRestart, delay));
            }
            EndStep::Done { auto_restart: None } => {}
        }
    }
}
