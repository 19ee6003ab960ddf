//! Cancellable subscription loops.
//!
//! Feature services react to bus events through [`spawn_listener`]. The loop
//! runs until its [`CancellationToken`] is cancelled (the owning feature is
//! torn down) or the bus is dropped. Handler failures are logged and never
//! reach the publisher. A handler that panics only loses the event it was
//! handling; the loop keeps serving the topic.

use std::future::Future;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::topic::Subscription;

/// Spawn a task that feeds every event of `subscription` to `handler`.
///
/// Events of one subscription are handled one at a time, in publish order.
/// Each handler future runs as its own task so a panic is contained to the
/// event that caused it.
pub fn spawn_listener<E, F, Fut>(
    mut subscription: Subscription<E>,
    cancel: CancellationToken,
    mut handler: F,
) -> JoinHandle<()>
where
    E: Clone + Send + 'static,
    F: FnMut(E) -> Fut + Send + 'static,
    Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
{
    tokio::spawn(async move {
        let topic = subscription.topic();
        tracing::debug!(topic, "Listener started");

        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    tracing::info!(topic, "Listener cancelled");
                    break;
                }
                event = subscription.recv() => {
                    let Some(event) = event else {
                        tracing::info!(topic, "Event bus closed, listener shutting down");
                        break;
                    };
                    match tokio::spawn(handler(event)).await {
                        Ok(Ok(())) => {}
                        Ok(Err(e)) => tracing::error!(topic, error = %e, "Event handler failed"),
                        Err(e) => tracing::error!(topic, error = %e, "Event handler panicked"),
                    }
                }
            }
        }
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
