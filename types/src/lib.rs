//! Shared configuration types for the talking timer
//!
//! This crate contains serializable configuration types that are shared between
//! the timer engine (talking-timer-core) and the terminal front end.

use serde::{Deserialize, Serialize};

// ─────────────────────────────────────────────────────────────────────────────
// Duration
// ─────────────────────────────────────────────────────────────────────────────

/// A user supplied timer duration, before it is normalized to milliseconds.
///
/// Numbers below 10000 are seconds, numbers from 10000 up are milliseconds.
/// Text is `HH:MM:SS`, `MM:SS` or a bare number of seconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DurationValue {
    Number(u64),
    Text(String),
}

impl Default for DurationValue {
    fn default() -> Self {
        DurationValue::Text("03:00".to_string())
    }
}

impl From<u64> for DurationValue {
    fn from(value: u64) -> Self {
        DurationValue::Number(value)
    }
}

impl From<&str> for DurationValue {
    fn from(value: &str) -> Self {
        DurationValue::Text(value.to_string())
    }
}

impl std::fmt::Display for DurationValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DurationValue::Number(n) => write!(f, "{}", n),
            DurationValue::Text(s) => write!(f, "{}", s),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Announcement Policy
// ─────────────────────────────────────────────────────────────────────────────

/// Which family of directives wins when two announcements land too close
/// to each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    /// Fraction directives (`1/2`, `last1/4`) are kept first
    #[default]
    Fraction,
    /// Time directives (`30s`, `last20`) are kept first
    Time,
    /// Directives are kept in the order they were written
    Order,
}

impl std::str::FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fraction" => Ok(Priority::Fraction),
            "time" => Ok(Priority::Time),
            "order" => Ok(Priority::Order),
            other => Err(format!("unknown priority '{}'", other)),
        }
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Priority::Fraction => "fraction",
            Priority::Time => "time",
            Priority::Order => "order",
        })
    }
}

/// How an explicit announcement list combines with the interval spec string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SayDataMode {
    /// A non-empty say-data list replaces whatever the spec string produces
    #[default]
    Override,
    /// Both lists are reconciled together, say-data first
    Merge,
}

/// One caller supplied announcement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SayItem {
    /// Milliseconds remaining when the message is spoken
    pub offset_ms: u64,
    pub message: String,
    /// Speech rate multiplier (None = derived from the message)
    #[serde(default)]
    pub rate: Option<f32>,
}

impl SayItem {
    pub fn new(offset_ms: u64, message: impl Into<String>) -> Self {
        Self {
            offset_ms,
            message: message.into(),
            rate: None,
        }
    }
}

/// Phrases appended to generated announcements.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Phrases {
    /// Appended to announcements measured from the start
    #[serde(default = "default_gone")]
    pub gone: String,
    /// Appended to announcements measured from the end
    #[serde(default = "default_to_go")]
    pub to_go: String,
    /// Spoken at the midpoint
    #[serde(default = "default_half_way")]
    pub half_way: String,
}

fn default_gone() -> String {
    " gone".to_string()
}

fn default_to_go() -> String {
    " to go".to_string()
}

fn default_half_way() -> String {
    "Half way".to_string()
}

impl Default for Phrases {
    fn default() -> Self {
        Self {
            gone: default_gone(),
            to_go: default_to_go(),
            half_way: default_half_way(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Timer Settings
// ─────────────────────────────────────────────────────────────────────────────

pub const DEFAULT_SAY: &str = "1/2 30s last20 last15 allLast10";
pub const DEFAULT_START_MESSAGE: &str = "Ready. Set. Go!";
pub const DEFAULT_END_MESSAGE: &str = "Time's up!";

/// Everything needed to configure one timer session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimerSettings {
    #[serde(default)]
    pub duration: DurationValue,

    /// Interval spec, e.g. "1/2 30s last20 last15 allLast10"
    #[serde(default = "default_say")]
    pub say: String,

    /// Explicit announcements
    #[serde(default)]
    pub say_data: Vec<SayItem>,

    #[serde(default)]
    pub say_data_mode: SayDataMode,

    #[serde(default)]
    pub priority: Priority,

    #[serde(default)]
    pub say_start: bool,

    #[serde(default = "default_true")]
    pub say_end: bool,

    #[serde(default = "default_true")]
    pub end_chime: bool,

    #[serde(default = "default_start_message")]
    pub start_message: String,

    #[serde(default = "default_end_message")]
    pub end_message: String,

    /// Restart automatically this many ms after the timer ends (None = off)
    #[serde(default)]
    pub auto_restart_ms: Option<u64>,

    #[serde(default = "default_true")]
    pub allow_pause: bool,

    #[serde(default)]
    pub phrases: Phrases,

    // ─── Timing ─────────────────────────────────────────────────────────────
    #[serde(default = "default_tick_ms")]
    pub tick_ms: u64,

    /// Announcements fire this many ms before they are due
    #[serde(default = "default_early_fire_ms")]
    pub early_fire_ms: u64,

    /// Longest wait for a start/end message to finish speaking
    #[serde(default = "default_speech_timeout_ms")]
    pub speech_timeout_ms: u64,
}

fn default_true() -> bool {
    true
}

fn default_say() -> String {
    DEFAULT_SAY.to_string()
}

fn default_start_message() -> String {
    DEFAULT_START_MESSAGE.to_string()
}

fn default_end_message() -> String {
    DEFAULT_END_MESSAGE.to_string()
}

fn default_tick_ms() -> u64 {
    50
}

fn default_early_fire_ms() -> u64 {
    800
}

fn default_speech_timeout_ms() -> u64 {
    15_000
}

impl Default for TimerSettings {
    fn default() -> Self {
        Self {
            duration: DurationValue::default(),
            say: default_say(),
            say_data: Vec::new(),
            say_data_mode: SayDataMode::default(),
            priority: Priority::default(),
            say_start: false,
            say_end: true,
            end_chime: true,
            start_message: default_start_message(),
            end_message: default_end_message(),
            auto_restart_ms: None,
            allow_pause: true,
            phrases: Phrases::default(),
            tick_ms: default_tick_ms(),
            early_fire_ms: default_early_fire_ms(),
            speech_timeout_ms: default_speech_timeout_ms(),
        }
    }
}

impl TimerSettings {
    pub fn with_duration(duration: impl Into<DurationValue>) -> Self {
        Self {
            duration: duration.into(),
            ..Self::default()
        }
    }

    pub fn with_say(mut self, say: impl Into<String>) -> Self {
        self.say = say.into();
        self
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Presets
// ─────────────────────────────────────────────────────────────────────────────

/// Maximum number of saved presets
pub const MAX_PRESETS: usize = 12;

/// A named snapshot of timer settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimerPreset {
    pub name: String,
    pub settings: TimerSettings,
}

impl TimerPreset {
    pub fn new(name: String, settings: TimerSettings) -> Self {
        Self { name, settings }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// App Config
// ─────────────────────────────────────────────────────────────────────────────

/// Audio settings for spoken announcements and the end chime
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudioSettings {
    /// Master enable for all audio
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Volume level (0-100)
    #[serde(default = "default_audio_volume")]
    pub volume: u8,

    /// Voice name passed to the speech engine (None = engine default)
    #[serde(default)]
    pub voice: Option<String>,

    /// Speaking speed at rate 1.0
    #[serde(default = "default_words_per_minute")]
    pub words_per_minute: u32,
}

fn default_audio_volume() -> u8 {
    80
}

fn default_words_per_minute() -> u32 {
    160
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            volume: default_audio_volume(),
            voice: None,
            words_per_minute: default_words_per_minute(),
        }
    }
}

/// Persisted application configuration
///
/// Note: Persistence methods (load/save) are provided by talking-timer-core via
/// the `AppConfigExt` trait.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Settings used when `configure` is called without a preset
    #[serde(default)]
    pub defaults: TimerSettings,

    #[serde(default)]
    pub presets: Vec<TimerPreset>,

    #[serde(default)]
    pub active_preset_name: Option<String>,

    #[serde(default)]
    pub audio: AudioSettings,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_defaults() {
        let settings = TimerSettings::default();
        assert_eq!(settings.say, "1/2 30s last20 last15 allLast10");
        assert_eq!(settings.start_message, "Ready. Set. Go!");
        assert_eq!(settings.end_message, "Time's up!");
        assert!(!settings.say_start);
        assert!(settings.say_end);
        assert!(settings.end_chime);
        assert_eq!(settings.auto_restart_ms, None);
        assert_eq!(settings.priority, Priority::Fraction);
    }

    #[test]
    fn test_priority_from_str() {
        assert_eq!("TIME".parse::<Priority>(), Ok(Priority::Time));
        assert_eq!(" order ".parse::<Priority>(), Ok(Priority::Order));
        assert!("loudest".parse::<Priority>().is_err());
    }

    #[test]
    fn test_duration_value_display() {
        assert_eq!(DurationValue::Number(180).to_string(), "180");
        assert_eq!(DurationValue::from("03:00").to_string(), "03:00");
    }
}
