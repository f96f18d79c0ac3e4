use async_trait::async_trait;
use quiz_core::model::{ContentKind, ParticipantId, QuestionPair, Session, Tier};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

use crate::catalog::ContentCatalog;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("connection error: {0}")]
    Connection(String),
}

/// Read-only access to quiz content.
#[async_trait]
pub trait ContentRepository: Send + Sync {
    /// Names of every collection of one kind, in content order.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be read.
    async fn list_collections(&self, kind: ContentKind) -> Result<Vec<String>, StorageError>;

    /// Items of one leaf. Unknown collections or tiers resolve to an empty list.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be read.
    async fn get_items(
        &self,
        kind: ContentKind,
        name: &str,
        tier: Option<Tier>,
    ) -> Result<Vec<QuestionPair>, StorageError>;

    /// Every dictionary item followed by every grammar item.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be read.
    async fn random_pool(&self) -> Result<Vec<QuestionPair>, StorageError>;
}

/// Per-participant session persistence.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Fetch the stored session, if any.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be read.
    async fn get(&self, participant: ParticipantId) -> Result<Option<Session>, StorageError>;

    /// Store or replace a session.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the session cannot be stored.
    async fn put(&self, participant: ParticipantId, session: Session) -> Result<(), StorageError>;

    /// Forget a participant's session.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be written.
    async fn clear(&self, participant: ParticipantId) -> Result<(), StorageError>;
}

/// Content repository over a catalog loaded at startup.
#[derive(Clone, Default)]
pub struct InMemoryContentRepository {
    catalog: Arc<ContentCatalog>,
}

impl InMemoryContentRepository {
    #[must_use]
    pub fn new(catalog: ContentCatalog) -> Self {
        Self {
            catalog: Arc::new(catalog),
        }
    }
}

#[async_trait]
impl ContentRepository for InMemoryContentRepository {
    async fn list_collections(&self, kind: ContentKind) -> Result<Vec<String>, StorageError> {
        Ok(self.catalog.collection_names(kind))
    }

    async fn get_items(
        &self,
        kind: ContentKind,
        name: &str,
        tier: Option<Tier>,
    ) -> Result<Vec<QuestionPair>, StorageError> {
        Ok(self.catalog.items(kind, name, tier))
    }

    async fn random_pool(&self) -> Result<Vec<QuestionPair>, StorageError> {
        Ok(self.catalog.random_pool())
    }
}

/// Simple in-memory session store for the terminal front end and tests.
#[derive(Clone, Default)]
pub struct InMemorySessionStore {
    sessions: Arc<Mutex<HashMap<ParticipantId, Session>>>,
}

impl InMemorySessionStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn get(&self, participant: ParticipantId) -> Result<Option<Session>, StorageError> {
        let guard = self
            .sessions
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.get(&participant).cloned())
    }

    async fn put(&self, participant: ParticipantId, session: Session) -> Result<(), StorageError> {
        let mut guard = self
            .sessions
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.insert(participant, session);
        Ok(())
    }

    async fn clear(&self, participant: ParticipantId) -> Result<(), StorageError> {
        let mut guard = self
            .sessions
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.remove(&participant);
        Ok(())
    }
}

/// Aggregates content and session backends behind trait objects for easy swapping.
#[derive(Clone)]
pub struct Storage {
    pub content: Arc<dyn ContentRepository>,
    pub sessions: Arc<dyn SessionStore>,
}

impl Storage {
    #[must_use]
    pub fn in_memory(catalog: ContentCatalog) -> Self {
        let content: Arc<dyn ContentRepository> = Arc::new(InMemoryContentRepository::new(catalog));
        let sessions: Arc<dyn SessionStore> = Arc::new(InMemorySessionStore::new());
        Self { content, sessions }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::model::{Intent, SessionState};

    #[tokio::test]
    async fn session_round_trip_and_clear() {
        let store = InMemorySessionStore::new();
        let id = ParticipantId::new(7);
        assert!(store.get(id).await.unwrap().is_none());

        let mut session = Session::new();
        session.enter_content_menu(Intent::Quiz).unwrap();
        store.put(id, session).await.unwrap();

        let fetched = store.get(id).await.unwrap().unwrap();
        assert_eq!(fetched.state(), SessionState::SelectingContent);
        assert!(store.get(ParticipantId::new(8)).await.unwrap().is_none());

        store.clear(id).await.unwrap();
        assert!(store.get(id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn poisoned_store_reports_a_connection_error() {
        let store = InMemorySessionStore::new();
        let sessions = Arc::clone(&store.sessions);
        let _ = std::thread::spawn(move || {
            let _guard = sessions.lock().unwrap();
            panic!("writer crashed");
        })
        .join();

        let id = ParticipantId::new(3);
        assert!(matches!(store.get(id).await, Err(StorageError::Connection(_))));
        assert!(matches!(
            store.put(id, Session::new()).await,
            Err(StorageError::Connection(_))
        ));
        assert!(matches!(store.clear(id).await, Err(StorageError::Connection(_))));
    }

    #[tokio::test]
    async fn content_repository_reads_catalog() {
        let catalog = ContentCatalog::new()
            .with_dictionary_tier("Animals", Tier::Easy, [("cat", "mushuk")])
            .with_grammar("Verbs", [("go", "went")]);
        let storage = Storage::in_memory(catalog);

        let names = storage
            .content
            .list_collections(ContentKind::Grammar)
            .await
            .unwrap();
        assert_eq!(names, vec!["Verbs".to_string()]);

        let items = storage
            .content
            .get_items(ContentKind::Dictionary, "Animals", Some(Tier::Hard))
            .await
            .unwrap();
        assert!(items.is_empty());

        assert_eq!(storage.content.random_pool().await.unwrap().len(), 2);
    }
}
