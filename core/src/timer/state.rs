use std::fmt;

/// Lifecycle of a countdown
///
/// ```text
/// Unset -> Ready -> Starting -> Running <-> Paused
///                                  |          |
///                                  v          v
///                                Ending -> Ended -> Starting (restart)
///                                           Ended -> Ready    (reset)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TimerState {
    /// No configuration loaded
    #[default]
    Unset,
    /// Configured, full time remaining
    Ready,
    /// Waiting for the start message to finish
    Starting,
    Running,
    Paused,
    /// Speaking the end message and/or playing the chime
    Ending,
    Ended,
}

impl TimerState {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimerState::Unset => "unset",
            TimerState::Ready => "ready",
            TimerState::Starting => "starting",
            TimerState::Running => "running",
            TimerState::Paused => "paused",
            TimerState::Ending => "ending",
            TimerState::Ended => "ended",
        }
    }
}

impl fmt::Display for TimerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Emitted on every state transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateChange {
    pub previous: TimerState,
    pub current: TimerState,
}

/// Caller-visible operations, used in precondition errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerAction {
    Configure,
    Start,
    Pause,
    Resume,
    Stop,
    Reset,
    Restart,
    AutoRestart,
}

impl fmt::Display for TimerAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TimerAction::Configure => "configure",
            TimerAction::Start => "start",
            TimerAction::Pause => "pause",
            TimerAction::Resume => "resume",
            TimerAction::Stop => "stop",
            TimerAction::Reset => "reset",
            TimerAction::Restart => "restart",
            TimerAction::AutoRestart => "auto-restart",
        };
        f.write_str(name)
    }
}
