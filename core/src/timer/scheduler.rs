//! Per-tick scheduling decision
//!
//! Pure: looks at the remaining time and the queue head, never mutates.

use crate::announcement::Announcement;

/// What the engine should do after accounting a tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickAction {
    /// Nothing due
    Idle,
    /// Pop and speak the queue head
    Announce,
    /// Time is up
    Finish,
}

/// Decide the action for a tick.
///
/// The head becomes due `early_fire_ms` before its offset so the speech
/// lands on time. At most one announcement is handed out per tick.
pub fn plan_tick(remaining_ms: u64, head: Option<&Announcement>, early_fire_ms: u64) -> TickAction {
    if remaining_ms == 0 {
        return TickAction::Finish;
    }
    match head {
        Some(next) if next.offset_ms.saturating_add(early_fire_ms) >= remaining_ms => {
            TickAction::Announce
        }
        _ => TickAction::Idle,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plan_tick() {
        let head = Announcement::new(30_000, "30 seconds to go", 1.0);

        assert_eq!(plan_tick(31_000, Some(&head), 800), TickAction::Idle);
        assert_eq!(plan_tick(30_800, Some(&head), 800), TickAction::Announce);
        assert_eq!(plan_tick(29_000, Some(&head), 0), TickAction::Announce);
        assert_eq!(plan_tick(5_000, None, 800), TickAction::Idle);
        assert_eq!(plan_tick(0, Some(&head), 800), TickAction::Finish);
    }
}
