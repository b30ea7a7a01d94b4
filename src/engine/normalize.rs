// Reflectify Engine — Text Normalizer
// Canonicalizes raw text for pattern comparison. Pure and total.

use regex::Regex;
use std::sync::LazyLock;

/// Everything that is not a word character, whitespace, or an apostrophe.
static NON_WORD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^\w\s']").unwrap());

/// Runs of whitespace, collapsed to a single space.
static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Lower-case, strip punctuation except apostrophes, collapse whitespace, trim.
/// Idempotent: `normalize(normalize(x)) == normalize(x)`.
pub fn normalize(text: &str) -> String {
    let lowered = text.to_lowercase();
    let stripped = NON_WORD.replace_all(&lowered, "");
    let collapsed = WHITESPACE.replace_all(&stripped, " ");
    collapsed.trim().to_string()
}
