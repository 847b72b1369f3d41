//! Immutable per-session timer configuration

use std::time::Duration;

use talking_timer_types::{Priority, TimerSettings};

use super::error::ConfigError;
use crate::announcement::Announcement;
use crate::duration::parse_duration;
use crate::interval::{AnnouncementSources, build_announcements};

/// Fully resolved configuration for one timer session
#[derive(Debug, Clone, PartialEq)]
pub struct TimerConfig {
    pub total_ms: u64,
    /// Reconciled, sorted by descending offset
    pub announcements: Vec<Announcement>,
    pub priority: Priority,
    pub say_start: bool,
    pub say_end: bool,
    pub end_chime: bool,
    pub start_message: String,
    pub end_message: String,
    pub auto_restart_after: Option<Duration>,
    pub allow_pause: bool,
    pub early_fire_ms: u64,
    pub tick_interval: Duration,
    pub speech_timeout: Duration,
}

impl TimerConfig {
    pub fn from_settings(settings: &TimerSettings) -> Result<Self, ConfigError> {
        let total_ms = parse_duration(&settings.duration)?;

        let announcements = build_announcements(
            AnnouncementSources {
                spec: &settings.say,
                say_data: &settings.say_data,
                mode: settings.say_data_mode,
                priority: settings.priority,
                phrases: &settings.phrases,
            },
            total_ms,
        )?;

        tracing::debug!(
            total_ms,
            announcements = announcements.len(),
            priority = %settings.priority,
            "built timer config"
        );

        Ok(Self {
            total_ms,
            announcements,
            priority: settings.priority,
            say_start: settings.say_start,
            say_end: settings.say_end,
            end_chime: settings.end_chime,
            start_message: settings.start_message.clone(),
            end_message: settings.end_message.clone(),
            auto_restart_after: settings.auto_restart_ms.map(Duration::from_millis),
            allow_pause: settings.allow_pause,
            early_fire_ms: settings.early_fire_ms,
            tick_interval: Duration::from_millis(settings.tick_ms.max(1)),
            speech_timeout: Duration::from_millis(settings.speech_timeout_ms),
        })
    }
}
