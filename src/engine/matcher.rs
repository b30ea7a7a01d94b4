// Reflectify Engine — Intent Matcher
// Three ordered passes over the catalog, first hit wins:
//   1. exact    — normalized input equals a normalized pattern
//   2. fuzzy    — substring containment either way, lengths ≥ 3,
//                 length ratio strictly above 0.7
//   3. critical — fixed safety keyword table, substring containment,
//                 answers even when the catalog is empty
//
// Ties within a pass break by catalog load order. Response selection is
// uniformly random over the intent's response list; the rng is seedable so
// tests can pin the selection.

use std::sync::Arc;

use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::SeedableRng;
use tracing::{debug, warn};

use crate::atoms::constants::{
    CRISIS_SAFETY_RESPONSE, CRITICAL_KEYWORDS, FUZZY_LENGTH_RATIO, FUZZY_MIN_LEN,
};
use crate::atoms::types::MatchResult;
use crate::engine::catalog::IntentCatalog;
use crate::engine::normalize::normalize;

pub struct IntentMatcher {
    catalog: Arc<IntentCatalog>,
    rng: Mutex<StdRng>,
}

impl IntentMatcher {
    pub fn new(catalog: Arc<IntentCatalog>) -> Self {
        IntentMatcher { catalog, rng: Mutex::new(StdRng::from_os_rng()) }
    }

    /// Deterministic response selection for tests.
    pub fn with_seed(catalog: Arc<IntentCatalog>, seed: u64) -> Self {
        IntentMatcher { catalog, rng: Mutex::new(StdRng::seed_from_u64(seed)) }
    }

    /// Match the user input against the catalog.
    /// Returns `None` when all three passes miss.
    pub fn match_input(&self, user_input: &str) -> Option<MatchResult> {
        let normalized = normalize(user_input);
        if normalized.is_empty() {
            return None;
        }

        let intents = self.catalog.intents();

        // First pass: exact match (case/punctuation-insensitive).
        for intent in intents {
            for pattern in &intent.patterns {
                if normalize(pattern) == normalized {
                    if let Some(response) = self.pick(&intent.responses) {
                        debug!("[matcher] exact match -> '{}'", intent.tag);
                        return Some(MatchResult { tag: intent.tag.clone(), response });
                    }
                }
            }
        }

        // Second pass: fuzzy match (containment either way + length ratio).
        let input_len = normalized.chars().count();
        for intent in intents {
            for pattern in &intent.patterns {
                let normalized_pattern = normalize(pattern);
                let pattern_len = normalized_pattern.chars().count();
                if input_len < FUZZY_MIN_LEN || pattern_len < FUZZY_MIN_LEN {
                    continue;
                }
                if !normalized.contains(&normalized_pattern)
                    && !normalized_pattern.contains(&normalized)
                {
                    continue;
                }
                let ratio =
                    input_len.min(pattern_len) as f64 / input_len.max(pattern_len) as f64;
                if ratio > FUZZY_LENGTH_RATIO {
                    if let Some(response) = self.pick(&intent.responses) {
                        debug!("[matcher] fuzzy match -> '{}' (ratio {ratio:.2})", intent.tag);
                        return Some(MatchResult { tag: intent.tag.clone(), response });
                    }
                }
            }
        }

        // Third pass: critical keywords. Independent of catalog state — a
        // crisis phrase always gets an answer, from the catalog's intent
        // when present, from the built-in reply otherwise.
        for (tag, keywords) in CRITICAL_KEYWORDS {
            for keyword in *keywords {
                if normalized.contains(keyword) {
                    warn!("[matcher] critical match -> '{tag}'");
                    if let Some(intent) = self.catalog.find(tag) {
                        if let Some(response) = self.pick(&intent.responses) {
                            return Some(MatchResult { tag: (*tag).to_string(), response });
                        }
                    }
                    return Some(MatchResult {
                        tag: (*tag).to_string(),
                        response: CRISIS_SAFETY_RESPONSE.to_string(),
                    });
                }
            }
        }

        None
    }

    /// Uniform random pick; `None` for an empty response list so that an
    /// intent with no responses can never be matched.
    fn pick(&self, responses: &[String]) -> Option<String> {
        let mut rng = self.rng.lock();
        responses.choose(&mut *rng).cloned()
    }
}
