use std::path::PathBuf;
use std::sync::Arc;

use talking_timer_core::context::{AppConfig, AppConfigExt, TimerSettings};
use talking_timer_core::{ChimeGateway, SpeechGateway, TimerHandle, TimerService};
use tokio::sync::RwLock;

use crate::audio;

/// Holds all shared state for the REPL.
/// Timer logic lives in the core service; this only wires it up.
#[derive(Clone)]
pub struct CliContext {
    pub config: Arc<RwLock<AppConfig>>,
    /// File presets are persisted to. None keeps them in memory only.
    pub config_file: Option<PathBuf>,
    pub timer: TimerHandle,
    /// Settings of the most recent successful `configure`
    pub settings: Arc<RwLock<TimerSettings>>,
}

impl CliContext {
    /// Load the user config and spawn the timer service with real audio.
    /// Must be called from within a tokio runtime.
    pub fn new() -> Self {
        let config_file = match AppConfig::config_path() {
            Ok(path) => Some(path),
            Err(e) => {
                tracing::warn!(error = %e, "no config location, presets will not be saved");
                None
            }
        };
        let config = config_file
            .as_deref()
            .map(|path| {
                AppConfig::load_from(path).unwrap_or_else(|e| {
                    tracing::warn!(error = %e, "using default configuration");
                    AppConfig::default()
                })
            })
            .unwrap_or_default();

        let (speech, chime) = audio::build_gateways(&config.audio);
        Self::with_gateways(config, config_file, speech, chime)
    }

    pub fn with_gateways(
        config: AppConfig,
        config_file: Option<PathBuf>,
        speech: Arc<dyn SpeechGateway>,
        chime: Arc<dyn ChimeGateway>,
    ) -> Self {
        let settings = config.defaults.clone();
        Self {
            config: Arc::new(RwLock::new(config)),
            config_file,
            timer: TimerService::spawn(speech, chime),
            settings: Arc::new(RwLock::new(settings)),
        }
    }

    /// Write the config back to `config_file`, if there is one
    pub fn persist(&self, config: &AppConfig) -> Result<(), String> {
        match &self.config_file {
            Some(path) => config.save_to(path).map_err(|e| e.to_string()),
            None => Ok(()),
        }
    }
}

impl Default for CliContext {
    fn default() -> Self {
        Self::new()
    }
}
