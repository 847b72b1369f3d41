//! Tests for the async timer service
//!
//! Run on a paused tokio clock, so multi-second timers finish instantly and
//! timing assertions are exact up to one tick.

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use talking_timer_types::TimerSettings;
use tokio::sync::{broadcast, oneshot};
use tokio::time::{Instant, sleep, timeout};

use super::{StateChange, TimerAction, TimerError, TimerHandle, TimerService, TimerState};
use crate::gateway::{ChimeGateway, SpeechCompletion, SpeechGateway};

/// Records everything spoken and chimed
#[derive(Default)]
struct Recorder {
    spoken: Mutex<Vec<String>>,
    chimes: AtomicUsize,
    /// Keep completions open until the test releases them
    hold_speech: bool,
    held: Mutex<Vec<oneshot::Sender<()>>>,
}

impl Recorder {
    fn holding() -> Self {
        Self {
            hold_speech: true,
            ..Default::default()
        }
    }

    fn spoken(&self) -> Vec<String> {
        self.spoken.lock().unwrap().clone()
    }

    fn chimes(&self) -> usize {
        self.chimes.load(Ordering::SeqCst)
    }

    fn release_all(&self) {
        for tx in self.held.lock().unwrap().drain(..) {
            let _ = tx.send(());
        }
    }
}

impl SpeechGateway for Recorder {
    fn speak(&self, text: &str, _rate: f32) -> SpeechCompletion {
        self.spoken.lock().unwrap().push(text.to_string());
        if self.hold_speech {
            let (tx, completion) = SpeechCompletion::channel();
            self.held.lock().unwrap().push(tx);
            completion
        } else {
            SpeechCompletion::done()
        }
    }
}

impl ChimeGateway for Recorder {
    fn play_chime(&self) -> Duration {
        self.chimes.fetch_add(1, Ordering::SeqCst);
        Duration::from_secs(2)
    }
}

fn spawn(recorder: &Arc<Recorder>) -> TimerHandle {
    TimerService::spawn(recorder.clone(), recorder.clone())
}

fn settings(duration_secs: u64, say: &str) -> TimerSettings {
    TimerSettings::with_duration(duration_secs).with_say(say)
}

async fn wait_for_state(rx: &mut broadcast::Receiver<StateChange>, state: TimerState) {
    timeout(Duration::from_secs(600), async {
        loop {
            let change = rx.recv().await.expect("state channel closed");
            if change.current == state {
                return;
            }
        }
    })
    .await
    .expect("state never reached");
}

#[tokio::test(start_paused = true)]
async fn test_full_run_speaks_then_chimes() {
    let recorder = Arc::new(Recorder::default());
    let handle = spawn(&recorder);
    handle.configure(settings(12, "last5 allLast3")).await.unwrap();
    let mut rx = handle.subscribe();

    let started = Instant::now();
    assert_eq!(handle.start().await.unwrap(), TimerState::Running);
    wait_for_state(&mut rx, TimerState::Ended).await;

    assert_eq!(recorder.spoken(), vec!["5", "3", "2", "1", "Time's up!"]);
    assert_eq!(recorder.chimes(), 1);

    // 12s countdown plus the 2s chime
    let elapsed = started.elapsed();
    assert!(elapsed >= Duration::from_secs(14), "{:?}", elapsed);
    assert!(elapsed < Duration::from_secs(15), "{:?}", elapsed);

    let snapshot = handle.snapshot().await;
    assert_eq!(snapshot.state, TimerState::Ended);
    assert_eq!(snapshot.remaining_ms, 0);
    assert_eq!(snapshot.pending_announcements, 0);
}

#[tokio::test(start_paused = true)]
async fn test_silent_stop_makes_no_sound() {
    let recorder = Arc::new(Recorder::default());
    let handle = spawn(&recorder);
    handle.configure(settings(60, "30s")).await.unwrap();
    handle.start().await.unwrap();

    sleep(Duration::from_secs(1)).await;
    assert_eq!(handle.stop(true).await.unwrap(), TimerState::Ended);

    sleep(Duration::from_secs(5)).await;
    assert!(recorder.spoken().is_empty());
    assert_eq!(recorder.chimes(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_precondition_errors_reach_caller() {
    let recorder = Arc::new(Recorder::default());
    let handle = spawn(&recorder);

    assert!(matches!(handle.start().await, Err(TimerError::NotConfigured)));

    handle.configure(settings(60, "30s")).await.unwrap();
    assert!(matches!(
        handle.pause().await,
        Err(TimerError::InvalidTransition {
            action: TimerAction::Pause,
            state: TimerState::Ready
        })
    ));

    handle.start().await.unwrap();
    assert!(matches!(
        handle.start().await,
        Err(TimerError::InvalidTransition { .. })
    ));
    assert_eq!(handle.snapshot().await.state, TimerState::Running);
}

#[tokio::test(start_paused = true)]
async fn test_invalid_configuration() {
    let recorder = Arc::new(Recorder::default());
    let handle = spawn(&recorder);

    let err = handle
        .configure(TimerSettings::with_duration("99:99:99"))
        .await
        .unwrap_err();
    assert!(matches!(err, TimerError::Config(_)));
    assert_eq!(handle.snapshot().await.state, TimerState::Unset);
}

#[tokio::test(start_paused = true)]
async fn test_pause_freezes_remaining_time() {
    let recorder = Arc::new(Recorder::default());
    let handle = spawn(&recorder);
    handle.configure(settings(12, "last5")).await.unwrap();
    handle.start().await.unwrap();

    sleep(Duration::from_secs(3)).await;
    assert_eq!(handle.pause().await.unwrap(), TimerState::Paused);
    assert_eq!(handle.snapshot().await.remaining_ms, 9_000);

    sleep(Duration::from_secs(10)).await;
    let snapshot = handle.snapshot().await;
    assert_eq!(snapshot.remaining_ms, 9_000);
    assert_eq!(snapshot.remaining_label, "9");

    handle.resume().await.unwrap();
    sleep(Duration::from_secs(1)).await;
    let remaining = handle.snapshot().await.remaining_ms;
    assert!((7_950..=8_050).contains(&remaining), "{}", remaining);
}

#[tokio::test(start_paused = true)]
async fn test_start_message_is_awaited() {
    let recorder = Arc::new(Recorder::holding());
    let handle = spawn(&recorder);
    let mut spoken_start = settings(12, "last5");
    spoken_start.say_start = true;
    handle.configure(spoken_start).await.unwrap();

    assert_eq!(handle.start().await.unwrap(), TimerState::Starting);
    sleep(Duration::from_secs(2)).await;

    let snapshot = handle.snapshot().await;
    assert_eq!(snapshot.state, TimerState::Starting);
    assert_eq!(snapshot.remaining_ms, 12_000);
    assert_eq!(recorder.spoken(), vec!["Ready. Set. Go!"]);

    recorder.release_all();
    sleep(Duration::from_secs(1)).await;

    let snapshot = handle.snapshot().await;
    assert_eq!(snapshot.state, TimerState::Running);
    assert!(
        (10_950..=11_050).contains(&snapshot.remaining_ms),
        "{}",
        snapshot.remaining_ms
    );
}

#[tokio::test(start_paused = true)]
async fn test_speech_wait_is_bounded() {
    let recorder = Arc::new(Recorder::holding());
    let handle = spawn(&recorder);
    let mut spoken_start = settings(12, "last5");
    spoken_start.say_start = true;
    handle.configure(spoken_start).await.unwrap();
    handle.start().await.unwrap();

    // The completion is never released
    sleep(Duration::from_secs(14)).await;
    assert_eq!(handle.snapshot().await.state, TimerState::Starting);

    sleep(Duration::from_secs(2)).await;
    assert_eq!(handle.snapshot().await.state, TimerState::Running);
}

#[tokio::test(start_paused = true)]
async fn test_auto_restart() {
    let recorder = Arc::new(Recorder::default());
    let handle = spawn(&recorder);
    let mut looping = settings(6, "allLast3");
    looping.say_end = false;
    looping.end_chime = false;
    looping.auto_restart_ms = Some(1_000);
    handle.configure(looping).await.unwrap();
    let mut rx = handle.subscribe();

    handle.start().await.unwrap();
    wait_for_state(&mut rx, TimerState::Ended).await;
    let ended_at = Instant::now();
    wait_for_state(&mut rx, TimerState::Running).await;

    assert!(ended_at.elapsed() >= Duration::from_secs(1));
    assert_eq!(handle.snapshot().await.remaining_ms, 6_000);
    assert_eq!(recorder.spoken(), vec!["3", "2", "1"]);

    handle.stop(true).await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_command_cancels_auto_restart() {
    let recorder = Arc::new(Recorder::default());
    let handle = spawn(&recorder);
    let mut looping = settings(6, "allLast3");
    looping.auto_restart_ms = Some(1_000);
    handle.configure(looping).await.unwrap();
    let mut rx = handle.subscribe();

    handle.start().await.unwrap();
    wait_for_state(&mut rx, TimerState::Ended).await;
    assert_eq!(handle.reset(false).await.unwrap(), TimerState::Ready);

    sleep(Duration::from_secs(5)).await;
    assert_eq!(handle.snapshot().await.state, TimerState::Ready);
}

#[tokio::test(start_paused = true)]
async fn test_forced_reset_drops_end_sequence() {
    let recorder = Arc::new(Recorder::holding());
    let handle = spawn(&recorder);
    handle.configure(settings(6, "allLast3")).await.unwrap();
    let mut rx = handle.subscribe();

    handle.start().await.unwrap();
    wait_for_state(&mut rx, TimerState::Ending).await;
    assert!(handle.reset(false).await.is_err());
    assert_eq!(handle.reset(true).await.unwrap(), TimerState::Ready);

    // Finishing the end message late changes nothing
    recorder.release_all();
    sleep(Duration::from_secs(20)).await;
    assert_eq!(handle.snapshot().await.state, TimerState::Ready);
    assert_eq!(recorder.chimes(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_restart_from_paused() {
    let recorder = Arc::new(Recorder::default());
    let handle = spawn(&recorder);
    handle.configure(settings(12, "last5")).await.unwrap();
    handle.start().await.unwrap();

    sleep(Duration::from_secs(4)).await;
    handle.pause().await.unwrap();
    assert_eq!(handle.restart().await.unwrap(), TimerState::Running);

    let snapshot = handle.snapshot().await;
    assert_eq!(snapshot.remaining_ms, 12_000);
    assert_eq!(snapshot.pending_announcements, 1);
}

#[tokio::test(start_paused = true)]
async fn test_dropping_handle_unsets_timer() {
    let recorder = Arc::new(Recorder::default());
    let handle = spawn(&recorder);
    handle.configure(settings(12, "last5")).await.unwrap();
    let mut rx = handle.subscribe();

    drop(handle);

    let change = rx.recv().await.unwrap();
    assert_eq!(
        change,
        StateChange {
            previous: TimerState::Ready,
            current: TimerState::Unset
        }
    );
}
