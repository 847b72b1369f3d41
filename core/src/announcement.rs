//! Announcements and the runtime queue that hands them out
//!
//! An `Announcement` is a phrase to speak when a given number of
//! milliseconds remain. The `AnnouncementQueue` holds a run's announcements
//! in descending offset order and pops the head once it becomes due.

use std::collections::VecDeque;

/// A phrase spoken when `offset_ms` milliseconds remain on the timer
#[derive(Debug, Clone, PartialEq)]
pub struct Announcement {
    /// Milliseconds remaining (not elapsed) when the message is spoken
    pub offset_ms: u64,

    /// Text handed to the speech engine
    pub message: String,

    /// Speech rate multiplier (1.0 = normal)
    pub rate: f32,
}

impl Announcement {
    pub fn new(offset_ms: u64, message: impl Into<String>, rate: f32) -> Self {
        Self {
            offset_ms,
            message: message.into(),
            rate,
        }
    }
}

/// Pending announcements for one timer run, head = next due
#[derive(Debug, Clone, Default)]
pub struct AnnouncementQueue {
    items: VecDeque<Announcement>,
}

impl AnnouncementQueue {
    /// Build a queue from a reconciled (descending) list.
    pub fn from_sorted(announcements: &[Announcement]) -> Self {
        debug_assert!(
            announcements
                .windows(2)
                .all(|w| w[0].offset_ms >= w[1].offset_ms),
            "announcements must be sorted by descending offset"
        );
        Self {
            items: announcements.iter().cloned().collect(),
        }
    }

    pub fn peek(&self) -> Option<&Announcement> {
        self.items.front()
    }

    /// Pop the head if it is due.
    ///
    /// The head is due once `remaining_ms` has dropped to within
    /// `early_fire_ms` of its offset.
    pub fn pop_due(&mut self, remaining_ms: u64, early_fire_ms: u64) -> Option<Announcement> {
        let due = self
            .items
            .front()
            .is_some_and(|head| head.offset_ms + early_fire_ms >= remaining_ms);

        if due { self.items.pop_front() } else { None }
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Announcement> {
        self.items.iter()
    }
}
