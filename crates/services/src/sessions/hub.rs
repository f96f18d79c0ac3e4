use std::collections::HashMap;
use std::sync::Arc;

use quiz_core::Clock;
use quiz_core::model::{ParticipantId, Session};
use rand::SeedableRng;
use rand::rngs::StdRng;
use storage::repository::{ContentRepository, SessionStore};
use tokio::sync::{Mutex, mpsc, oneshot};
use tracing::debug;

use super::event::SessionEvent;
use super::machine::Machine;
use super::runner::{Envelope, Runner};
use crate::config::EngineConfig;
use crate::content_service::ContentService;
use crate::error::EngineError;
use crate::transport::Transport;

/// Entry point of the engine: routes each participant's events to their own runner.
///
/// Runners are spawned on first contact and live as long as the hub.
/// Different participants share nothing but the content and the store.
pub struct SessionHub {
    config: EngineConfig,
    content: ContentService,
    store: Arc<dyn SessionStore>,
    transport: Arc<dyn Transport>,
    clock: Clock,
    seed: Option<u64>,
    runners: Mutex<HashMap<ParticipantId, mpsc::UnboundedSender<Envelope>>>,
}

impl SessionHub {
    #[must_use]
    pub fn new(
        config: EngineConfig,
        content: Arc<dyn ContentRepository>,
        store: Arc<dyn SessionStore>,
        transport: Arc<dyn Transport>,
    ) -> Self {
        Self {
            config,
            content: ContentService::new(content),
            store,
            transport,
            clock: Clock::default(),
            seed: None,
            runners: Mutex::new(HashMap::new()),
        }
    }

    /// Use a fixed clock for report timestamps.
    #[must_use]
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// Seed question sampling so runs are repeatable.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Process one event for `participant` and wait until it is fully handled.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::Session` when the event was rejected (the
    /// participant has already been re-prompted), `EngineError::Storage` or
    /// `EngineError::Transport` when a collaborator failed, and
    /// `EngineError::Closed` if the runner is gone.
    pub async fn dispatch(
        &self,
        participant: ParticipantId,
        event: SessionEvent,
    ) -> Result<(), EngineError> {
        debug!(%participant, event = event.name(), "dispatch");
        let (ack_tx, ack_rx) = oneshot::channel();
        let queue = self.runner_for(participant).await;
        queue
            .send(Envelope {
                event,
                ack: Some(ack_tx),
            })
            .map_err(|_| EngineError::Closed(participant))?;
        ack_rx.await.map_err(|_| EngineError::Closed(participant))?
    }

    /// Snapshot of the participant's stored session.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::Storage` if the store cannot be read.
    pub async fn session(&self, participant: ParticipantId) -> Result<Option<Session>, EngineError> {
        Ok(self.store.get(participant).await?)
    }

    async fn runner_for(&self, participant: ParticipantId) -> mpsc::UnboundedSender<Envelope> {
        let mut runners = self.runners.lock().await;
        if let Some(queue) = runners.get(&participant).filter(|q| !q.is_closed()) {
            return queue.clone();
        }

        let rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed ^ participant.value()),
            None => StdRng::from_os_rng(),
        };
        let machine = Machine::new(self.content.clone(), self.config, self.clock, rng);
        let queue = Runner::spawn(
            participant,
            machine,
            self.config,
            Arc::clone(&self.store),
            Arc::clone(&self.transport),
        );
        runners.insert(participant, queue.clone());
        queue
    }
}
