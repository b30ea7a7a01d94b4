// Reflectify Engine — Intent Catalog
// The corpus of canned intents, loaded once and frozen for the process
// lifetime. A broken corpus degrades to an empty catalog instead of failing
// the process: the generative path stays usable and the crisis pass still
// answers from its built-in reply.

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::OnceLock;

use tracing::{info, warn};

use crate::atoms::error::{ReflectError, ReflectResult};
use crate::atoms::types::{Intent, IntentFile};

/// Corpus compiled into the binary; the service needs no data files at
/// runtime. `INTENTS_PATH` can still point at an on-disk replacement.
const BUNDLED_CORPUS: &str = include_str!("../../data/intents.json");

enum CorpusSource {
    Bundled,
    Path(PathBuf),
}

/// Lazily-initialized, load-once-then-freeze intent store.
///
/// The `OnceLock` guard makes the first load idempotent under concurrent
/// first callers; after that every access is a plain shared read.
pub struct IntentCatalog {
    source: CorpusSource,
    intents: OnceLock<Vec<Intent>>,
}

impl IntentCatalog {
    /// Catalog backed by the corpus bundled into the binary.
    pub fn bundled() -> Self {
        IntentCatalog { source: CorpusSource::Bundled, intents: OnceLock::new() }
    }

    /// Catalog backed by an on-disk corpus file.
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        IntentCatalog { source: CorpusSource::Path(path.into()), intents: OnceLock::new() }
    }

    /// Force the one-time load now instead of on first match.
    pub fn ensure_loaded(&self) {
        let _ = self.intents();
    }

    /// The loaded intents, in corpus order. First call triggers the load.
    pub fn intents(&self) -> &[Intent] {
        self.intents.get_or_init(|| self.load())
    }

    /// Look up an intent by tag.
    pub fn find(&self, tag: &str) -> Option<&Intent> {
        self.intents().iter().find(|i| i.tag == tag)
    }

    pub fn len(&self) -> usize {
        self.intents().len()
    }

    pub fn is_empty(&self) -> bool {
        self.intents().is_empty()
    }

    fn load(&self) -> Vec<Intent> {
        let raw = match &self.source {
            CorpusSource::Bundled => BUNDLED_CORPUS.to_string(),
            CorpusSource::Path(path) => match std::fs::read_to_string(path) {
                Ok(raw) => raw,
                Err(err) => {
                    warn!("[catalog] could not read {}: {err}", path.display());
                    return Vec::new();
                }
            },
        };

        match parse_corpus(&raw) {
            Ok(intents) => {
                info!("[catalog] loaded {} intents", intents.len());
                intents
            }
            Err(err) => {
                warn!("[catalog] corpus rejected, matching disabled: {err}");
                Vec::new()
            }
        }
    }
}

/// Parse and validate a corpus document.
///
/// A duplicate tag marks the corpus build as broken — the whole document is
/// rejected rather than guessing merge semantics.
fn parse_corpus(raw: &str) -> ReflectResult<Vec<Intent>> {
    let file: IntentFile = serde_json::from_str(raw)?;

    let mut seen = HashSet::new();
    for intent in &file.intents {
        if !seen.insert(intent.tag.as_str()) {
            return Err(ReflectError::config(format!(
                "duplicate intent tag '{}'",
                intent.tag
            )));
        }
    }

    Ok(file.intents)
}
