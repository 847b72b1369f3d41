//! Capability interfaces for speech and the end chime
//!
//! The timer never talks to an audio device directly. It asks a
//! `SpeechGateway` to speak and a `ChimeGateway` to play the chime; the
//! binary wires in real implementations, tests wire in recorders.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Duration;

use tokio::sync::oneshot;

/// Resolves when an utterance has finished.
///
/// Output is `true` when the speaker signalled completion, `false` when the
/// speaker dropped the signal (engine error, shutdown).
#[derive(Debug)]
pub struct SpeechCompletion {
    rx: oneshot::Receiver<()>,
}

impl SpeechCompletion {
    /// A completion and the sender the speaker fires when done
    pub fn channel() -> (oneshot::Sender<()>, Self) {
        let (tx, rx) = oneshot::channel();
        (tx, Self { rx })
    }

    /// An already finished completion
    pub fn done() -> Self {
        let (tx, completion) = Self::channel();
        let _ = tx.send(());
        completion
    }
}

impl Future for SpeechCompletion {
    type Output = bool;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<bool> {
        Pin::new(&mut self.rx).poll(cx).map(|result| result.is_ok())
    }
}

pub trait SpeechGateway: Send + Sync + 'static {
    /// Start speaking `text` at `rate` (1.0 = normal). Must not block.
    fn speak(&self, text: &str, rate: f32) -> SpeechCompletion;
}

pub trait ChimeGateway: Send + Sync + 'static {
    /// Start the chime and return how long it plays. Must not block.
    fn play_chime(&self) -> Duration;
}

/// Speech gateway used when audio is disabled
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentSpeech;

impl SpeechGateway for SilentSpeech {
    fn speak(&self, text: &str, rate: f32) -> SpeechCompletion {
        tracing::debug!(text, rate, "speech disabled, skipping");
        SpeechCompletion::done()
    }
}

/// Chime gateway used when audio is disabled
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentChime;

impl ChimeGateway for SilentChime {
    fn play_chime(&self) -> Duration {
        Duration::ZERO
    }
}
