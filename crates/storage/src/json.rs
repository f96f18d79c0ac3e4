//! Loader for the `dictionary.json` / `grammar.json` content files.
//!
//! `dictionary.json`: `{collection: {tier: {prompt: answer}}}`
//! `grammar.json`: `{category: {prompt: answer}}`

use std::path::{Path, PathBuf};

use quiz_core::model::{QuestionPair, Tier};
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{info, warn};

use crate::catalog::ContentCatalog;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ContentLoadError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("expected a JSON object at {0}")]
    NotAnObject(String),
}

/// Add every dictionary in `raw` to the catalog.
///
/// Unknown tier names and non-scalar answers are skipped with a warning.
///
/// # Errors
///
/// Returns `ContentLoadError::Json` for malformed JSON and
/// `ContentLoadError::NotAnObject` if the document or a collection is not an object.
pub fn read_dictionaries(raw: &str, catalog: &mut ContentCatalog) -> Result<(), ContentLoadError> {
    let root = parse_object(raw, "dictionary root")?;
    for (name, tiers) in root {
        let Value::Object(tiers) = tiers else {
            return Err(ContentLoadError::NotAnObject(format!("dictionary '{name}'")));
        };
        catalog.insert_dictionary(name.as_str());
        for (tier_name, items) in tiers {
            let tier = match tier_name.parse::<Tier>() {
                Ok(tier) => tier,
                Err(err) => {
                    warn!(dictionary = %name, %err, "skipping tier");
                    continue;
                }
            };
            let Value::Object(items) = items else {
                warn!(dictionary = %name, %tier, "tier is not an object, skipping");
                continue;
            };
            catalog.insert_dictionary_tier(name.as_str(), tier, pairs(&name, items));
        }
    }
    Ok(())
}

/// Add every grammar category in `raw` to the catalog.
///
/// # Errors
///
/// Returns `ContentLoadError::Json` for malformed JSON and
/// `ContentLoadError::NotAnObject` if the document or a category is not an object.
pub fn read_grammar(raw: &str, catalog: &mut ContentCatalog) -> Result<(), ContentLoadError> {
    let root = parse_object(raw, "grammar root")?;
    for (name, items) in root {
        let Value::Object(items) = items else {
            return Err(ContentLoadError::NotAnObject(format!("grammar '{name}'")));
        };
        let items = pairs(&name, items);
        catalog.insert_grammar(name, items);
    }
    Ok(())
}

/// Load both content files.
///
/// The dictionary file is required. A missing or unreadable grammar file
/// leaves grammar content empty.
///
/// # Errors
///
/// Returns `ContentLoadError` if the dictionary file cannot be read or parsed.
pub fn load_catalog(
    dictionary_path: &Path,
    grammar_path: &Path,
) -> Result<ContentCatalog, ContentLoadError> {
    let mut catalog = ContentCatalog::new();

    let raw = read_file(dictionary_path)?;
    read_dictionaries(&raw, &mut catalog)?;

    match read_file(grammar_path) {
        Ok(raw) => {
            let mut with_grammar = catalog.clone();
            match read_grammar(&raw, &mut with_grammar) {
                Ok(()) => catalog = with_grammar,
                Err(err) => {
                    warn!(path = %grammar_path.display(), %err, "invalid grammar file, using empty grammar");
                }
            }
        }
        Err(err) => {
            warn!(%err, "grammar file unavailable, using empty grammar");
        }
    }

    info!(
        dictionaries = catalog.dictionary_count(),
        grammar = catalog.grammar_count(),
        "content loaded"
    );
    Ok(catalog)
}

fn read_file(path: &Path) -> Result<String, ContentLoadError> {
    std::fs::read_to_string(path).map_err(|source| ContentLoadError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn parse_object(raw: &str, what: &str) -> Result<Map<String, Value>, ContentLoadError> {
    match serde_json::from_str::<Value>(raw)? {
        Value::Object(map) => Ok(map),
        _ => Err(ContentLoadError::NotAnObject(what.to_owned())),
    }
}

fn pairs(collection: &str, items: Map<String, Value>) -> Vec<QuestionPair> {
    items
        .into_iter()
        .filter_map(|(prompt, answer)| match answer {
            Value::String(answer) => Some(QuestionPair::new(prompt, answer)),
            Value::Number(n) => Some(QuestionPair::new(prompt, n.to_string())),
            Value::Bool(b) => Some(QuestionPair::new(prompt, b.to_string())),
            _ => {
                warn!(%collection, %prompt, "answer is not a scalar, skipping");
                None
            }
        })
        .collect()
}
