//! Per-question countdown task.

use std::sync::Arc;
use std::time::Duration;

use quiz_core::model::{ParticipantId, TimerTicket, Urgency};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::{Instant, interval_at};
use tracing::{debug, warn};

use crate::transport::{Delivery, Notice, Transport};

const TICK: Duration = Duration::from_secs(1);

/// Owner's side of a running countdown.
///
/// Dropping the handle without `cancel` also stops the task, but only
/// `cancel` waits for it to be gone.
#[derive(Debug)]
pub(crate) struct CountdownHandle {
    ticket: TimerTicket,
    cancel: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
}

impl CountdownHandle {
    pub(crate) fn ticket(&self) -> TimerTicket {
        self.ticket
    }

    /// Stop the countdown and wait for its task to finish.
    ///
    /// Once this returns no tick, display update or expiry from this
    /// countdown can happen. Calling it again does nothing.
    pub(crate) async fn cancel(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            // The task may already be gone after expiring.
            let _ = cancel.send(());
        }
        if let Some(task) = self.task.take() {
            if let Err(err) = task.await {
                warn!(ticket = %self.ticket, %err, "countdown task failed");
            }
        }
    }
}

/// Spawn a countdown of `limit_secs` for the question holding `ticket`.
///
/// Shows the full limit at once, then one update per second. On reaching
/// zero it calls `on_expire` exactly once and shows nothing itself; the
/// display is cleared when the handle is cancelled. Delivery failures are
/// logged and the countdown keeps going.
pub(crate) fn start_countdown<F>(
    participant: ParticipantId,
    ticket: TimerTicket,
    limit_secs: u32,
    transport: Arc<dyn Transport>,
    on_expire: F,
) -> CountdownHandle
where
    F: FnOnce(TimerTicket) + Send + 'static,
{
    let (cancel_tx, mut cancel_rx) = oneshot::channel::<()>();

    let task = tokio::spawn(async move {
        let show = |notice: Notice| {
            let transport = Arc::clone(&transport);
            async move {
                if let Err(err) = transport.deliver(participant, Delivery::passive(notice)).await {
                    warn!(%participant, %ticket, %err, "countdown update not delivered");
                }
            }
        };

        let mut remaining = limit_secs;
        show(Notice::Countdown {
            remaining,
            limit: limit_secs,
            urgency: Urgency::for_remaining(remaining, limit_secs),
        })
        .await;

        let mut ticks = interval_at(Instant::now() + TICK, TICK);
        loop {
            tokio::select! {
                biased;
                _ = &mut cancel_rx => {
                    show(Notice::CountdownCleared).await;
                    debug!(%participant, %ticket, "countdown cancelled");
                    return;
                }
                _ = ticks.tick() => {
                    remaining = remaining.saturating_sub(1);
                    if remaining == 0 {
                        break;
                    }
                    show(Notice::Countdown {
                        remaining,
                        limit: limit_secs,
                        urgency: Urgency::for_remaining(remaining, limit_secs),
                    })
                    .await;
                }
            }
        }

        // A cancel that raced the last tick wins.
        if cancel_rx.try_recv().is_ok() {
            show(Notice::CountdownCleared).await;
            return;
        }
        debug!(%participant, %ticket, "countdown expired");
        on_expire(ticket);

        // The time-up notice comes from the transition that applies the expiry.
        if cancel_rx.await.is_ok() {
            show(Notice::CountdownCleared).await;
        }
    });

    CountdownHandle {
        ticket,
        cancel: Some(cancel_tx),
        task: Some(task),
    }
}
