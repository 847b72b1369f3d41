//! Application configuration
//!
//! Re-exports the shared types from talking-timer-types and provides
//! persistence (confy, TOML) and preset management for `AppConfig`.

use std::path::{Path, PathBuf};

pub use talking_timer_types::{AppConfig, AudioSettings, MAX_PRESETS, TimerPreset, TimerSettings};

use super::error::PresetError;

/// confy application name (config lives in `<config dir>/talking-timer/`)
pub const APP_NAME: &str = "talking-timer";
const CONFIG_NAME: &str = "config";

// ─────────────────────────────────────────────────────────────────────────────
// AppConfig Extensions
// ─────────────────────────────────────────────────────────────────────────────

/// Extension trait for AppConfig persistence and preset management
pub trait AppConfigExt: Sized {
    fn load_from(path: &Path) -> Result<Self, PresetError>;
    fn save_to(&self, path: &Path) -> Result<(), PresetError>;
    fn config_path() -> Result<PathBuf, PresetError>;
    fn save_preset(&mut self, name: String, settings: TimerSettings) -> Result<(), PresetError>;
    fn load_preset(&mut self, name: &str) -> Result<TimerSettings, PresetError>;
    fn delete_preset(&mut self, name: &str) -> Result<TimerPreset, PresetError>;
    fn rename_preset(&mut self, old_name: &str, new_name: &str) -> Result<(), PresetError>;
    fn preset_names(&self) -> Vec<String>;
}

fn preset_index(presets: &[TimerPreset], name: &str) -> Result<usize, PresetError> {
    presets
        .iter()
        .position(|p| p.name == name)
        .ok_or_else(|| PresetError::PresetNotFound {
            name: name.to_string(),
        })
}

impl AppConfigExt for AppConfig {
    fn load_from(path: &Path) -> Result<Self, PresetError> {
        confy::load_path(path).map_err(PresetError::Load)
    }

    fn save_to(&self, path: &Path) -> Result<(), PresetError> {
        confy::store_path(path, self).map_err(PresetError::Save)
    }

    /// Where confy keeps the user config (`<config dir>/talking-timer/config.toml`)
    fn config_path() -> Result<PathBuf, PresetError> {
        confy::get_configuration_file_path(APP_NAME, CONFIG_NAME).map_err(PresetError::Locate)
    }

    fn save_preset(&mut self, name: String, settings: TimerSettings) -> Result<(), PresetError> {
        let name = name.trim().to_string();
        if name.is_empty() {
            return Err(PresetError::EmptyPresetName);
        }

        // Existing preset: overwrite in place
        if let Some(preset) = self.presets.iter_mut().find(|p| p.name == name) {
            preset.settings = settings;
            self.active_preset_name = Some(name);
            return Ok(());
        }

        if self.presets.len() >= MAX_PRESETS {
            return Err(PresetError::MaxPresetsReached { max: MAX_PRESETS });
        }

        self.presets.push(TimerPreset::new(name.clone(), settings));
        self.active_preset_name = Some(name);
        Ok(())
    }

    fn load_preset(&mut self, name: &str) -> Result<TimerSettings, PresetError> {
        let index = preset_index(&self.presets, name)?;
        self.active_preset_name = Some(name.to_string());
        Ok(self.presets[index].settings.clone())
    }

    /// Remove a preset and hand it back; clears the active marker if it pointed there
    fn delete_preset(&mut self, name: &str) -> Result<TimerPreset, PresetError> {
        let index = preset_index(&self.presets, name)?;
        if self.active_preset_name.as_deref() == Some(name) {
            self.active_preset_name = None;
        }
        Ok(self.presets.remove(index))
    }

    fn rename_preset(&mut self, old_name: &str, new_name: &str) -> Result<(), PresetError> {
        let new_name = new_name.trim();
        if new_name.is_empty() {
            return Err(PresetError::EmptyPresetName);
        }
        let index = preset_index(&self.presets, old_name)?;
        if new_name == old_name {
            return Ok(());
        }
        if preset_index(&self.presets, new_name).is_ok() {
            return Err(PresetError::PresetNameTaken {
                name: new_name.to_string(),
            });
        }

        self.presets[index].name = new_name.to_string();
        if self.active_preset_name.as_deref() == Some(old_name) {
            self.active_preset_name = Some(new_name.to_string());
        }
        Ok(())
    }

    fn preset_names(&self) -> Vec<String> {
        self.presets.iter().map(|p| p.name.clone()).collect()
    }
}
