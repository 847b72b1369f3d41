mod config;
mod error;

pub use config::{
    APP_NAME, AppConfig, AppConfigExt, AudioSettings, MAX_PRESETS, TimerPreset, TimerSettings,
};
pub use error::PresetError;
