// ── Reflectify Atoms: Error Types ──────────────────────────────────────────
// Single canonical error enum for the service, built with `thiserror`.
//
// Design rules:
//   • Variants are coarse-grained by domain (I/O, serialization, config…).
//   • The `#[from]` attribute wires std/external error conversions automatically.
//   • Gateway failures have their own enum (`GatewayError` in traits.rs): the
//     orchestrator recovers from those locally and they must never reach the
//     HTTP boundary as errors.
//   • No variant carries secret material (API keys) in its message.

use thiserror::Error;

// ── Primary error enum ─────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ReflectError {
    /// Filesystem or OS-level I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization / deserialization failure.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// HTTP / network failure (reqwest layer).
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Service or gateway configuration is invalid or missing.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Caller sent a message that is empty after trimming.
    /// The only error surfaced across the request boundary.
    #[error("Message cannot be empty")]
    BlankMessage,

    /// Catch-all for errors that do not yet have a dedicated variant.
    /// Prefer adding a specific variant over using this in new code.
    #[error("{0}")]
    Other(String),
}

impl ReflectError {
    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }
}

// ── Convenience alias ──────────────────────────────────────────────────────

/// All fallible service operations should return this type.
pub type ReflectResult<T> = Result<T, ReflectError>;
