use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use super::actor::SessionMessage;
use crate::config::SessionConfig;
use crate::streaming::EventStream;

/// Token of the stream run in progress, cancelled on an unhealthy link
pub(crate) type RunToken = Arc<Mutex<CancellationToken>>;

pub(crate) fn lock_run(token: &RunToken) -> MutexGuard<'_, CancellationToken> {
    token.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Run the event stream, reconnecting with exponential backoff
///
/// The actor is told to shut down once reconnecting ends, whether attempts
/// ran out or the session was cancelled. The last run's disconnect is
/// queued ahead of that message.
pub(crate) async fn supervise(
    stream: EventStream,
    config: SessionConfig,
    run_token: RunToken,
    shutdown: CancellationToken,
    tx: mpsc::UnboundedSender<SessionMessage>,
) {
    reconnect(&stream, &config, &run_token, &shutdown).await;
    let _ = tx.send(SessionMessage::Shutdown);
}

/// A run that dispatched at least one event resets the attempt counter
async fn reconnect(
    stream: &EventStream,
    config: &SessionConfig,
    run_token: &RunToken,
    shutdown: &CancellationToken,
) {
    let mut attempt: u32 = 0;

    loop {
        let token = shutdown.child_token();
        *lock_run(run_token) = token.clone();

        let stats = stream.run_once(&token).await;
        if shutdown.is_cancelled() {
            return;
        }

        if stats.had_traffic() {
            attempt = 0;
        }
        attempt += 1;
        if attempt > config.retry_attempts {
            log::error!(
                "Event stream lost after {} reconnect attempts, ending session",
                config.retry_attempts
            );
            return;
        }

        let delay = config.backoff_for(attempt);
        log::info!(
            "Reconnecting in {:?} (attempt {}/{})",
            delay,
            attempt,
            config.retry_attempts
        );
        tokio::select! {
            _ = shutdown.cancelled() => return,
            _ = tokio::time::sleep(delay) => {}
        }
    }
}
