use talking_timer_core::StateChange;
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::task::JoinHandle;

use crate::CliContext;

/// Print every timer state change until the service shuts down
pub fn spawn_state_watcher(ctx: &CliContext) -> JoinHandle<()> {
    let events = ctx.timer.subscribe();
    tokio::spawn(watch(events))
}

async fn watch(mut events: broadcast::Receiver<StateChange>) {
    loop {
        match events.recv().await {
            Ok(change) => {
                tracing::debug!(previous = %change.previous, current = %change.current, "observed state change");
                println!("\n[{} -> {}]", change.previous, change.current);
            }
            Err(RecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "state watcher fell behind");
            }
            Err(RecvError::Closed) => break,
        }
    }
}
