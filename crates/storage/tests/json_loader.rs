use std::path::PathBuf;

use quiz_core::model::{ContentKind, Tier};
use storage::json::{ContentLoadError, load_catalog};

struct Scratch {
    dir: PathBuf,
}

impl Scratch {
    fn new(tag: &str) -> Self {
        let dir = std::env::temp_dir().join(format!("quiz-json-{tag}-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        Self { dir }
    }

    fn write(&self, name: &str, body: &str) -> PathBuf {
        let path = self.dir.join(name);
        std::fs::write(&path, body).unwrap();
        path
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.join(name)
    }
}

impl Drop for Scratch {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.dir);
    }
}

const DICTIONARY: &str = r#"{
    "Animals": {
        "Easy": {"cat": "mushuk", "dog": "it"},
        "Medium": {"horse": "ot"},
        "Hard": {"owl": "boyqush"}
    },
    "Food": {"Easy": {"bread": "non"}}
}"#;

const GRAMMAR: &str = r#"{"Past tense": {"go": "went", "see": "saw"}}"#;

#[test]
fn loads_both_files_in_order() {
    let scratch = Scratch::new("both");
    let dict = scratch.write("dictionary.json", DICTIONARY);
    let grammar = scratch.write("grammar.json", GRAMMAR);

    let catalog = load_catalog(&dict, &grammar).unwrap();

    assert_eq!(
        catalog.collection_names(ContentKind::Dictionary),
        vec!["Animals".to_string(), "Food".to_string()]
    );
    assert_eq!(
        catalog
            .items(ContentKind::Dictionary, "Animals", Some(Tier::Medium))
            .len(),
        1
    );
    let pool: Vec<String> = catalog
        .random_pool()
        .into_iter()
        .map(|pair| pair.prompt)
        .collect();
    assert_eq!(pool, vec!["cat", "dog", "horse", "owl", "bread", "go", "see"]);
}

#[test]
fn missing_grammar_leaves_grammar_empty() {
    let scratch = Scratch::new("nogrammar");
    let dict = scratch.write("dictionary.json", DICTIONARY);

    let catalog = load_catalog(&dict, &scratch.path("grammar.json")).unwrap();
    assert_eq!(catalog.grammar_count(), 0);
    assert_eq!(catalog.dictionary_count(), 2);
}

#[test]
fn invalid_grammar_leaves_grammar_empty() {
    let scratch = Scratch::new("badgrammar");
    let dict = scratch.write("dictionary.json", DICTIONARY);
    let grammar = scratch.write("grammar.json", "not json");

    let catalog = load_catalog(&dict, &grammar).unwrap();
    assert!(catalog.collection_names(ContentKind::Grammar).is_empty());
}

#[test]
fn missing_dictionary_is_fatal() {
    let scratch = Scratch::new("nodict");
    let grammar = scratch.write("grammar.json", GRAMMAR);

    let err = load_catalog(&scratch.path("dictionary.json"), &grammar).unwrap_err();
    assert!(matches!(err, ContentLoadError::Io { .. }));
}

#[test]
fn malformed_dictionary_is_fatal() {
    let scratch = Scratch::new("baddict");
    let dict = scratch.write("dictionary.json", r#"{"Animals": ["cat"]}"#);
    let grammar = scratch.write("grammar.json", GRAMMAR);

    let err = load_catalog(&dict, &grammar).unwrap_err();
    assert!(matches!(err, ContentLoadError::NotAnObject(_)));
}
