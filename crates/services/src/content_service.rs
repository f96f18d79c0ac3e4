use std::sync::Arc;

use quiz_core::model::{ContentKind, ContentSelection, QuestionPair};
use storage::repository::{ContentRepository, StorageError};

/// Resolves content selections into concrete question pools.
#[derive(Clone)]
pub struct ContentService {
    repo: Arc<dyn ContentRepository>,
}

impl ContentService {
    #[must_use]
    pub fn new(repo: Arc<dyn ContentRepository>) -> Self {
        Self { repo }
    }

    /// # Errors
    ///
    /// Returns `StorageError` if the repository cannot be read.
    pub async fn collections(&self, kind: ContentKind) -> Result<Vec<String>, StorageError> {
        self.repo.list_collections(kind).await
    }

    /// The pool behind a leaf. Missing leaves resolve to an empty pool.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the repository cannot be read.
    pub async fn resolve(
        &self,
        selection: &ContentSelection,
    ) -> Result<Vec<QuestionPair>, StorageError> {
        match selection {
            ContentSelection::Dictionary { name, tier } => {
                self.repo
                    .get_items(ContentKind::Dictionary, name, Some(*tier))
                    .await
            }
            ContentSelection::Grammar { name } => {
                self.repo.get_items(ContentKind::Grammar, name, None).await
            }
            ContentSelection::RandomPool => self.repo.random_pool().await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::model::Tier;
    use storage::{ContentCatalog, InMemoryContentRepository};

    #[tokio::test]
    async fn resolves_each_selection_kind() {
        let catalog = ContentCatalog::new()
            .with_dictionary_tier("Animals", Tier::Easy, [("cat", "mushuk"), ("dog", "it")])
            .with_grammar("Verbs", [("go", "went")]);
        let service = ContentService::new(Arc::new(InMemoryContentRepository::new(catalog)));

        let easy = service
            .resolve(&ContentSelection::dictionary("Animals", Tier::Easy))
            .await
            .unwrap();
        assert_eq!(easy.len(), 2);

        let hard = service
            .resolve(&ContentSelection::dictionary("Animals", Tier::Hard))
            .await
            .unwrap();
        assert!(hard.is_empty());

        let verbs = service
            .resolve(&ContentSelection::grammar("Verbs"))
            .await
            .unwrap();
        assert_eq!(verbs, vec![QuestionPair::new("go", "went")]);

        let pool = service.resolve(&ContentSelection::RandomPool).await.unwrap();
        assert_eq!(pool.len(), 3);
    }
}
