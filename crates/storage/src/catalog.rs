use indexmap::IndexMap;
use quiz_core::model::{ContentKind, QuestionPair, Tier};

type Tiers = IndexMap<Tier, Vec<QuestionPair>>;

/// Items of every tier of one dictionary, Easy first.
fn all_tiers(tiers: &Tiers) -> impl Iterator<Item = &QuestionPair> {
    Tier::ALL
        .into_iter()
        .filter_map(|tier| tiers.get(&tier))
        .flatten()
}

/// Ordered, read-only view of all quiz content.
///
/// Collections keep insertion order, which the JSON loader takes from the
/// files; that order is the menu order and the random pool order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContentCatalog {
    dictionaries: IndexMap<String, Tiers>,
    grammar: IndexMap<String, Vec<QuestionPair>>,
}

impl ContentCatalog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the items of one dictionary tier, creating the dictionary if needed.
    pub fn insert_dictionary_tier(
        &mut self,
        name: impl Into<String>,
        tier: Tier,
        items: Vec<QuestionPair>,
    ) {
        self.dictionaries
            .entry(name.into())
            .or_default()
            .insert(tier, items);
    }

    /// Register an empty dictionary so it shows up in menus.
    pub fn insert_dictionary(&mut self, name: impl Into<String>) {
        self.dictionaries.entry(name.into()).or_default();
    }

    /// Set the items of one grammar category.
    pub fn insert_grammar(&mut self, name: impl Into<String>, items: Vec<QuestionPair>) {
        self.grammar.insert(name.into(), items);
    }

    /// Builder form of `insert_dictionary_tier`.
    #[must_use]
    pub fn with_dictionary_tier<I, Q>(mut self, name: &str, tier: Tier, items: I) -> Self
    where
        I: IntoIterator<Item = Q>,
        Q: Into<QuestionPair>,
    {
        self.insert_dictionary_tier(name, tier, items.into_iter().map(Into::into).collect());
        self
    }

    /// Builder form of `insert_grammar`.
    #[must_use]
    pub fn with_grammar<I, Q>(mut self, name: &str, items: I) -> Self
    where
        I: IntoIterator<Item = Q>,
        Q: Into<QuestionPair>,
    {
        self.insert_grammar(name, items.into_iter().map(Into::into).collect());
        self
    }

    #[must_use]
    pub fn collection_names(&self, kind: ContentKind) -> Vec<String> {
        match kind {
            ContentKind::Dictionary => self.dictionaries.keys().cloned().collect(),
            ContentKind::Grammar => self.grammar.keys().cloned().collect(),
        }
    }

    /// Items of one leaf. Missing collections or tiers yield an empty list.
    ///
    /// A dictionary without a tier yields all of its tiers; grammar ignores the tier.
    #[must_use]
    pub fn items(&self, kind: ContentKind, name: &str, tier: Option<Tier>) -> Vec<QuestionPair> {
        match kind {
            ContentKind::Dictionary => {
                let Some(tiers) = self.dictionaries.get(name) else {
                    return Vec::new();
                };
                match tier {
                    Some(tier) => tiers.get(&tier).cloned().unwrap_or_default(),
                    None => all_tiers(tiers).cloned().collect(),
                }
            }
            ContentKind::Grammar => self.grammar.get(name).cloned().unwrap_or_default(),
        }
    }

    /// Every dictionary leaf followed by every grammar category.
    #[must_use]
    pub fn random_pool(&self) -> Vec<QuestionPair> {
        self.dictionaries
            .values()
            .flat_map(all_tiers)
            .chain(self.grammar.values().flatten())
            .cloned()
            .collect()
    }

    #[must_use]
    pub fn dictionary_count(&self) -> usize {
        self.dictionaries.len()
    }

    #[must_use]
    pub fn grammar_count(&self) -> usize {
        self.grammar.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ContentCatalog {
        ContentCatalog::new()
            .with_dictionary_tier("Animals", Tier::Hard, [("rhinoceros", "karkidon")])
            .with_dictionary_tier("Animals", Tier::Easy, [("cat", "mushuk"), ("dog", "it")])
            .with_dictionary_tier("Food", Tier::Medium, [("bread", "non")])
            .with_grammar("Verbs", [("to be", "быть")])
    }

    #[test]
    fn names_keep_insertion_order() {
        let catalog = sample();
        assert_eq!(
            catalog.collection_names(ContentKind::Dictionary),
            vec!["Animals".to_string(), "Food".to_string()]
        );
        assert_eq!(catalog.collection_names(ContentKind::Grammar), vec!["Verbs".to_string()]);
    }

    #[test]
    fn missing_leaves_are_empty() {
        let catalog = sample();
        assert!(catalog.items(ContentKind::Dictionary, "Animals", Some(Tier::Medium)).is_empty());
        assert!(catalog.items(ContentKind::Dictionary, "Plants", Some(Tier::Easy)).is_empty());
        assert!(catalog.items(ContentKind::Grammar, "Nouns", None).is_empty());
    }

    #[test]
    fn random_pool_walks_tiers_easy_first_then_grammar() {
        let prompts: Vec<String> = sample()
            .random_pool()
            .into_iter()
            .map(|pair| pair.prompt)
            .collect();
        assert_eq!(prompts, vec!["cat", "dog", "rhinoceros", "bread", "to be"]);
    }

    #[test]
    fn reinserting_a_tier_replaces_it() {
        let mut catalog = sample();
        catalog.insert_dictionary_tier("Animals", Tier::Easy, vec![QuestionPair::new("cow", "sigir")]);
        let easy = catalog.items(ContentKind::Dictionary, "Animals", Some(Tier::Easy));
        assert_eq!(easy, vec![QuestionPair::new("cow", "sigir")]);
        assert_eq!(catalog.dictionary_count(), 2);
        assert_eq!(
            catalog.collection_names(ContentKind::Dictionary),
            vec!["Animals".to_string(), "Food".to_string()]
        );
    }

    #[test]
    fn empty_dictionary_is_listed_without_items() {
        let mut catalog = sample();
        catalog.insert_dictionary("Plants");
        catalog.insert_dictionary("Animals");
        assert_eq!(catalog.dictionary_count(), 3);
        assert_eq!(
            catalog.collection_names(ContentKind::Dictionary).last().map(String::as_str),
            Some("Plants")
        );
        assert!(catalog.items(ContentKind::Dictionary, "Plants", None).is_empty());
        assert_eq!(catalog.items(ContentKind::Dictionary, "Animals", None).len(), 3);
    }
}
