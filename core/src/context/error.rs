//! Error types for configuration persistence

use thiserror::Error;

/// Errors while loading, saving or editing the persisted configuration
#[derive(Debug, Error)]
pub enum PresetError {
    #[error("failed to load configuration")]
    Load(#[source] confy::ConfyError),

    #[error("failed to save configuration")]
    Save(#[source] confy::ConfyError),

    #[error("failed to locate configuration file")]
    Locate(#[source] confy::ConfyError),

    #[error("preset '{name}' not found")]
    PresetNotFound { name: String },

    #[error("maximum presets reached ({max})")]
    MaxPresetsReached { max: usize },

    #[error("preset name '{name}' already exists")]
    PresetNameTaken { name: String },

    #[error("preset name must not be empty")]
    EmptyPresetName,
}
