// Reflectify Engine — Core types
// These are the data structures that flow through the entire request pipeline.
// They are independent of any specific generation backend.

use serde::{Deserialize, Serialize};

// ── Backend Config ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    pub kind: BackendKind,
    pub base_url: String,
    pub api_key: String,
    pub model: String,
}

/// Wire shape spoken to the generation service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// OpenAI-style chat completions: ordered role/content message list.
    Chat,
    /// Text completions: a single pre-formatted prompt string using the
    /// fixed turn-delimiter template.
    Prompt,
}

impl BackendKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BackendKind::Chat => "chat",
            BackendKind::Prompt => "prompt",
        }
    }
}

// ── Messages ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        ChatMessage { role: Role::System, content: content.into() }
    }

    pub fn user(content: impl Into<String>) -> Self {
        ChatMessage { role: Role::User, content: content.into() }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        ChatMessage { role: Role::Assistant, content: content.into() }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

// ── Intent Catalog ─────────────────────────────────────────────────────

/// One recognizable category of user input mapped to canned responses.
/// `responses` must be non-empty for the intent to ever be returned by
/// the matcher; empty-response intents are skipped, not errors.
#[derive(Debug, Clone, Deserialize)]
pub struct Intent {
    pub tag: String,
    pub patterns: Vec<String>,
    pub responses: Vec<String>,
}

/// On-disk / bundled corpus shape: `{"intents": [...]}`.
#[derive(Debug, Default, Deserialize)]
pub struct IntentFile {
    #[serde(default)]
    pub intents: Vec<Intent>,
}

/// A successful intent match. Transient: produced and consumed within a
/// single request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchResult {
    pub tag: String,
    pub response: String,
}

// ── Generation Request ─────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SamplingParams {
    pub max_tokens: u32,
    pub temperature: f64,
    pub top_p: f64,
}

impl Default for SamplingParams {
    fn default() -> Self {
        SamplingParams {
            max_tokens: crate::atoms::constants::DEFAULT_MAX_TOKENS,
            temperature: crate::atoms::constants::DEFAULT_TEMPERATURE,
            top_p: crate::atoms::constants::DEFAULT_TOP_P,
        }
    }
}

/// Everything a backend needs for one completion call.
/// Built fresh per request; never persisted.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub messages: Vec<ChatMessage>,
    pub params: SamplingParams,
}

// ── Helpers ────────────────────────────────────────────────────────────

/// Truncate a string to at most `max` bytes without splitting a UTF-8
/// character. Used to keep error-log snippets bounded.
pub fn truncate_utf8(s: &str, max: usize) -> &str {
    if s.len() <= max {
        return s;
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}
