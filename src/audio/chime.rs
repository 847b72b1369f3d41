//! End-of-timer chime synthesized from sine tones

use std::time::Duration;

use rodio::source::SineWave;
use rodio::{OutputStream, Sink, Source};
use talking_timer_core::ChimeGateway;

/// Tone sequence played when the timer ends, in Hz
pub const CHIME_TONES_HZ: [f32; 15] = [
    440.0, 261.6, 830.6, 440.0, 261.6, 830.6, 392.0, 440.0, 261.6, 830.6, 440.0, 261.6, 830.6,
    392.0, 440.0,
];

const TONE_LENGTH: Duration = Duration::from_millis(425);
const TONE_AMPLITUDE: f32 = 0.25;

/// How long the full chime plays
pub fn chime_duration() -> Duration {
    TONE_LENGTH * CHIME_TONES_HZ.len() as u32
}

/// Chime gateway playing through the default output device
#[derive(Debug, Clone, Copy)]
pub struct ToneChime {
    volume: u8,
}

impl ToneChime {
    pub fn new(volume: u8) -> Self {
        Self {
            volume: volume.min(100),
        }
    }
}

impl ChimeGateway for ToneChime {
    fn play_chime(&self) -> Duration {
        let volume = self.volume;
        let spawned = std::thread::Builder::new()
            .name("chime".to_string())
            .spawn(move || {
                let Ok((_stream, stream_handle)) = OutputStream::try_default() else {
                    tracing::warn!("no audio output device for the chime");
                    return;
                };
                let Ok(sink) = Sink::try_new(&stream_handle) else {
                    return;
                };

                sink.set_volume(volume as f32 / 100.0);
                for freq in CHIME_TONES_HZ {
                    sink.append(
                        SineWave::new(freq)
                            .take_duration(TONE_LENGTH)
                            .amplify(TONE_AMPLITUDE),
                    );
                }
                sink.sleep_until_end();
            });

        match spawned {
            Ok(_) => chime_duration(),
            Err(e) => {
                tracing::warn!(error = %e, "failed to start chime thread");
                Duration::ZERO
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chime_duration_covers_every_tone() {
        assert_eq!(CHIME_TONES_HZ.len(), 15);
        assert_eq!(chime_duration(), Duration::from_millis(6_375));
    }

    #[test]
    fn test_volume_is_capped() {
        assert_eq!(ToneChime::new(250).volume, 100);
        assert_eq!(ToneChime::new(40).volume, 40);
    }
}
