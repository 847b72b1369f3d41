//! Spoken announcements through the platform speech engine
//!
//! A dedicated thread owns the engine and speaks utterances one at a time,
//! firing each utterance's completion once the engine goes quiet.
//! Linux shells out to `espeak`; other platforms use the `tts` crate.

use std::sync::mpsc;

use talking_timer_core::{SpeechCompletion, SpeechGateway};
use talking_timer_types::AudioSettings;
use tokio::sync::oneshot;

struct Utterance {
    text: String,
    rate: f32,
    done: oneshot::Sender<()>,
}

/// Speech gateway backed by the system speech engine
pub struct SystemSpeech {
    tx: mpsc::Sender<Utterance>,
}

impl SystemSpeech {
    /// Start the speech thread
    pub fn spawn(settings: AudioSettings) -> std::io::Result<Self> {
        let (tx, rx) = mpsc::channel();
        std::thread::Builder::new()
            .name("speech".to_string())
            .spawn(move || run_worker(rx, settings))?;
        Ok(Self { tx })
    }
}

impl SpeechGateway for SystemSpeech {
    fn speak(&self, text: &str, rate: f32) -> SpeechCompletion {
        let (done, completion) = SpeechCompletion::channel();
        let utterance = Utterance {
            text: text.to_string(),
            rate,
            done,
        };
        // A dead worker drops the sender, which resolves the completion as failed
        if self.tx.send(utterance).is_err() {
            tracing::warn!(text, "speech thread has stopped");
        }
        completion
    }
}

#[cfg(target_os = "linux")]
fn run_worker(rx: mpsc::Receiver<Utterance>, settings: AudioSettings) {
    use std::process::Command;

    for utterance in rx {
        let mut command = Command::new("espeak");
        command
            .arg("-s")
            .arg(espeak_speed(settings.words_per_minute, utterance.rate).to_string())
            .arg("-a")
            .arg(espeak_amplitude(settings.volume).to_string());
        if let Some(voice) = &settings.voice {
            command.arg("-v").arg(voice);
        }

        tracing::debug!(text = %utterance.text, rate = utterance.rate, "speaking");
        match command.arg(&utterance.text).output() {
            Ok(output) if output.status.success() => {
                let _ = utterance.done.send(());
            }
            Ok(output) => {
                tracing::warn!(status = %output.status, "espeak exited with an error");
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to run espeak");
            }
        }
    }
}

#[cfg(not(target_os = "linux"))]
fn run_worker(rx: mpsc::Receiver<Utterance>, settings: AudioSettings) {
    use std::time::Duration;

    const POLL_INTERVAL: Duration = Duration::from_millis(50);

    let mut engine = match tts::Tts::default() {
        Ok(engine) => engine,
        Err(e) => {
            tracing::warn!(error = %e, "text-to-speech unavailable");
            // Dropping each utterance fails its completion straight away
            for utterance in rx {
                drop(utterance);
            }
            return;
        }
    };

    let volume_span = engine.max_volume() - engine.min_volume();
    let _ = engine.set_volume(engine.min_volume() + volume_span * f32::from(settings.volume) / 100.0);

    for utterance in rx {
        let rate = (engine.normal_rate() * utterance.rate).clamp(engine.min_rate(), engine.max_rate());
        let _ = engine.set_rate(rate);

        tracing::debug!(text = %utterance.text, rate = utterance.rate, "speaking");
        if let Err(e) = engine.speak(utterance.text.as_str(), false) {
            tracing::warn!(error = %e, "text-to-speech failed");
            continue;
        }
        while matches!(engine.is_speaking(), Ok(true)) {
            std::thread::sleep(POLL_INTERVAL);
        }
        let _ = utterance.done.send(());
    }
}

/// espeak speed in words per minute for a rate multiplier
#[cfg_attr(not(target_os = "linux"), allow(dead_code))]
fn espeak_speed(words_per_minute: u32, rate: f32) -> u32 {
    (words_per_minute as f32 * rate).round().max(1.0) as u32
}

/// espeak amplitude runs 0-200 with 100 as its default
#[cfg_attr(not(target_os = "linux"), allow(dead_code))]
fn espeak_amplitude(volume: u8) -> u32 {
    u32::from(volume.min(100)) * 2
}
