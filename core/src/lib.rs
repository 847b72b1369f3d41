pub mod announcement;
pub mod context;
pub mod duration;
pub mod gateway;
pub mod interval;
pub mod timer;

// Re-exports for convenience
pub use announcement::{Announcement, AnnouncementQueue};
pub use context::{AppConfig, AppConfigExt, PresetError};
pub use duration::{format_remaining, parse_duration};
pub use gateway::{ChimeGateway, SilentChime, SilentSpeech, SpeechCompletion, SpeechGateway};
pub use interval::{AnnouncementSources, build_announcements, load_say_data, tokenize};
pub use timer::{
    ConfigError, CountdownEngine, StateChange, TimerConfig, TimerError, TimerHandle, TimerService,
    TimerSnapshot, TimerState,
};
