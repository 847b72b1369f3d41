use std::time::Duration;

use tokio::time::Instant;

use super::config::TimerConfig;
use super::state::TimerState;
use crate::announcement::AnnouncementQueue;

/// Where the end-of-timer sequence currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EndingPhase {
    #[default]
    Idle,
    /// Entered `Ending`, nothing requested yet
    Begun,
    /// End message handed to the speech engine
    Speaking,
    /// Chime playing
    Chiming,
}

/// Mutable state of one timer run
#[derive(Debug, Clone, Default)]
pub struct TimerRuntime {
    pub state: TimerState,
    pub remaining_ms: u64,
    /// 0.0 - 100.0, three decimals
    pub percent: f64,
    pub queue: AnnouncementQueue,
    /// Anchor for the next tick's elapsed time (None while not running)
    pub last_tick_at: Option<Instant>,
    pub ending: EndingPhase,
}

impl TimerRuntime {
    /// Fresh runtime with the full duration and every announcement queued.
    pub fn new(config: &TimerConfig) -> Self {
        Self {
            state: TimerState::Ready,
            remaining_ms: config.total_ms,
            percent: 100.0,
            queue: AnnouncementQueue::from_sorted(&config.announcements),
            last_tick_at: None,
            ending: EndingPhase::Idle,
        }
    }

    /// Subtract whole milliseconds elapsed since the last anchor.
    ///
    /// The anchor only advances by what was counted, so sub-millisecond
    /// remainders carry into the next tick. Returns the elapsed milliseconds.
    pub fn account_elapsed(&mut self, now: Instant, total_ms: u64) -> u64 {
        let Some(last) = self.last_tick_at else {
            return 0;
        };
        let elapsed = u64::try_from(now.saturating_duration_since(last).as_millis()).unwrap_or(u64::MAX);
        self.remaining_ms = self.remaining_ms.saturating_sub(elapsed);
        self.last_tick_at = Some(last + Duration::from_millis(elapsed));
        self.percent = percent_of(self.remaining_ms, total_ms);
        elapsed
    }
}

/// Remaining share of the total, rounded to three decimals
pub fn percent_of(remaining_ms: u64, total_ms: u64) -> f64 {
    if total_ms == 0 {
        return 0.0;
    }
    (remaining_ms as f64 / total_ms as f64 * 100_000.0).round() / 1_000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percent_rounding() {
        assert_eq!(percent_of(180_000, 180_000), 100.0);
        assert_eq!(percent_of(60_000, 180_000), 33.333);
        assert_eq!(percent_of(0, 180_000), 0.0);
    }

    #[test]
    fn test_account_elapsed() {
        let start = Instant::now();
        let mut runtime = TimerRuntime {
            remaining_ms: 10_000,
            last_tick_at: Some(start),
            ..Default::default()
        };

        assert_eq!(runtime.account_elapsed(start + Duration::from_millis(2_500), 10_000), 2_500);
        assert_eq!(runtime.remaining_ms, 7_500);
        assert_eq!(runtime.percent, 75.0);

        // Overshooting the end clamps at zero
        runtime.account_elapsed(start + Duration::from_secs(60), 10_000);
        assert_eq!(runtime.remaining_ms, 0);
        assert_eq!(runtime.percent, 0.0);
    }

    #[test]
    fn test_fractional_ticks_keep_wall_time() {
        let start = Instant::now();
        let mut runtime = TimerRuntime {
            remaining_ms: 180_000,
            last_tick_at: Some(start),
            ..Default::default()
        };

        let step = Duration::from_micros(50_900);
        let mut now = start;
        for _ in 0..1_000 {
            now += step;
            runtime.account_elapsed(now, 180_000);
        }

        // 1000 ticks of 50.9 ms is 50.9 s of wall time
        assert_eq!(runtime.remaining_ms, 129_100);
        assert!(now.saturating_duration_since(runtime.last_tick_at.unwrap()) < Duration::from_millis(1));
    }

    #[test]
    fn test_no_anchor_counts_nothing() {
        let mut runtime = TimerRuntime {
            remaining_ms: 10_000,
            ..Default::default()
        };
        assert_eq!(runtime.account_elapsed(Instant::now(), 10_000), 0);
        assert_eq!(runtime.remaining_ms, 10_000);
    }
}
