//! One task per participant, processing events strictly in arrival order.
//!
//! Answers and timer expiries share this queue, so the two can never be
//! scored concurrently for the same question.

use std::sync::Arc;

use quiz_core::model::{ParticipantId, TimerTicket};
use storage::repository::SessionStore;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, warn};

use super::countdown::{CountdownHandle, start_countdown};
use super::event::SessionEvent;
use super::machine::{Applied, Machine};
use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::transport::Transport;

pub(crate) type Ack = oneshot::Sender<Result<(), EngineError>>;

/// An event plus, for dispatched events, where to report completion.
#[derive(Debug)]
pub(crate) struct Envelope {
    pub event: SessionEvent,
    pub ack: Option<Ack>,
}

pub(crate) struct Runner {
    participant: ParticipantId,
    machine: Machine,
    config: EngineConfig,
    store: Arc<dyn SessionStore>,
    transport: Arc<dyn Transport>,
    queue: mpsc::WeakUnboundedSender<Envelope>,
    countdown: Option<CountdownHandle>,
}

impl Runner {
    /// Spawn the runner task and return its queue.
    ///
    /// The runner stops once every strong sender is dropped; countdowns only
    /// hold a weak one.
    pub(crate) fn spawn(
        participant: ParticipantId,
        machine: Machine,
        config: EngineConfig,
        store: Arc<dyn SessionStore>,
        transport: Arc<dyn Transport>,
    ) -> mpsc::UnboundedSender<Envelope> {
        let (tx, rx) = mpsc::unbounded_channel();
        let runner = Self {
            participant,
            machine,
            config,
            store,
            transport,
            queue: tx.downgrade(),
            countdown: None,
        };
        tokio::spawn(runner.run(rx));
        tx
    }

    async fn run(mut self, mut rx: mpsc::UnboundedReceiver<Envelope>) {
        debug!(participant = %self.participant, "session runner started");
        while let Some(Envelope { event, ack }) = rx.recv().await {
            let name = event.name();
            let result = self.handle(event).await;
            match &result {
                Ok(()) | Err(EngineError::Session(_)) => {}
                Err(err) => {
                    warn!(participant = %self.participant, event = name, %err, "event failed");
                }
            }
            if let Some(ack) = ack {
                // The dispatcher may have given up waiting.
                let _ = ack.send(result);
            }
        }
        if let Some(mut countdown) = self.countdown.take() {
            countdown.cancel().await;
        }
        debug!(participant = %self.participant, "session runner stopped");
    }

    async fn handle(&mut self, event: SessionEvent) -> Result<(), EngineError> {
        if let SessionEvent::TimerExpired(ticket) = event {
            if self.live_ticket() != Some(ticket) {
                debug!(participant = %self.participant, %ticket, "expiry from a replaced countdown ignored");
                return Ok(());
            }
            // The task has finished; reap it.
            self.stop_countdown().await;
        } else if event.interrupts_countdown() {
            self.stop_countdown().await;
        }

        let (applied, wanted) = match self.apply_and_persist(event).await {
            Ok(done) => done,
            Err(err) => {
                // Nothing was saved, so the stored session still decides.
                let wanted = self.stored_timer().await;
                self.reconcile_countdown(wanted).await;
                return Err(err);
            }
        };

        let mut undelivered = None;
        for delivery in applied.deliveries {
            if let Err(err) = self.transport.deliver(self.participant, delivery).await {
                warn!(participant = %self.participant, %err, "delivery failed");
                undelivered.get_or_insert(err);
            }
        }

        self.reconcile_countdown(wanted).await;

        if let Some(err) = applied.rejected {
            return Err(err.into());
        }
        match undelivered {
            Some(err) => Err(err.into()),
            None => Ok(()),
        }
    }

    async fn apply_and_persist(
        &mut self,
        event: SessionEvent,
    ) -> Result<(Applied, Option<TimerTicket>), EngineError> {
        let mut session = self.store.get(self.participant).await?.unwrap_or_default();
        let applied = self.machine.apply(&mut session, event).await?;
        let wanted = session.active_timer();

        if applied.clear {
            self.store.clear(self.participant).await?;
        } else {
            self.store.put(self.participant, session).await?;
        }
        Ok((applied, wanted))
    }

    /// Active ticket of the stored session; none if it cannot be read.
    async fn stored_timer(&self) -> Option<TimerTicket> {
        match self.store.get(self.participant).await {
            Ok(session) => session.and_then(|s| s.active_timer()),
            Err(err) => {
                warn!(participant = %self.participant, %err, "session unreadable, countdown stopped");
                None
            }
        }
    }

    fn live_ticket(&self) -> Option<TimerTicket> {
        self.countdown.as_ref().map(CountdownHandle::ticket)
    }

    async fn stop_countdown(&mut self) {
        if let Some(mut countdown) = self.countdown.take() {
            countdown.cancel().await;
        }
    }

    /// Make the running countdown match the session's active ticket.
    async fn reconcile_countdown(&mut self, wanted: Option<TimerTicket>) {
        if self.live_ticket() == wanted {
            return;
        }
        self.stop_countdown().await;
        let Some(ticket) = wanted else {
            return;
        };

        let queue = self.queue.clone();
        let handle = start_countdown(
            self.participant,
            ticket,
            self.config.time_limit_secs(),
            Arc::clone(&self.transport),
            move |ticket| {
                if let Some(queue) = queue.upgrade() {
                    let _ = queue.send(Envelope {
                        event: SessionEvent::TimerExpired(ticket),
                        ack: None,
                    });
                }
            },
        );
        self.countdown = Some(handle);
    }
}
