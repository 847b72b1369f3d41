//! Audio gateways for the timer service

mod chime;
mod speech;

pub use chime::{CHIME_TONES_HZ, ToneChime, chime_duration};
pub use speech::SystemSpeech;

use std::sync::Arc;

use talking_timer_core::{ChimeGateway, SilentChime, SilentSpeech, SpeechGateway};
use talking_timer_types::AudioSettings;

/// Build the speech and chime gateways for the given audio settings.
///
/// Disabled audio, or a speech thread that can't be started, falls back to
/// silent gateways so the timer still runs.
pub fn build_gateways(settings: &AudioSettings) -> (Arc<dyn SpeechGateway>, Arc<dyn ChimeGateway>) {
    if !settings.enabled {
        tracing::info!("audio disabled, using silent gateways");
        return (Arc::new(SilentSpeech), Arc::new(SilentChime));
    }

    let speech: Arc<dyn SpeechGateway> = match SystemSpeech::spawn(settings.clone()) {
        Ok(speech) => Arc::new(speech),
        Err(e) => {
            tracing::warn!(error = %e, "failed to start speech thread, speech disabled");
            Arc::new(SilentSpeech)
        }
    };

    (speech, Arc::new(ToneChime::new(settings.volume)))
}
