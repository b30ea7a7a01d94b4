// ── Reflectify Atoms: Gateway Trait ────────────────────────────────────────
// The Golden Trait every generation backend implements, plus its error enum.
// The orchestrator holds a type-erased backend and never sees wire formats.

use async_trait::async_trait;
use thiserror::Error;

use crate::atoms::types::{BackendKind, GenerationRequest};

// ── Gateway errors ─────────────────────────────────────────────────────────
// Classified so the orchestrator can map each kind to its distinct fallback
// reply. None of these propagate past the orchestrator.

#[derive(Debug, Error)]
pub enum GatewayError {
    /// Connection-level failure before or during the HTTP exchange
    /// (refused, DNS, TLS, interrupted body).
    #[error("transport error: {0}")]
    Transport(String),

    /// Non-2xx status from the generation service.
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    /// The call did not complete within the configured deadline.
    #[error("generation timed out")]
    Timeout,

    /// 2xx response whose body does not carry a completion.
    #[error("malformed payload: {0}")]
    Malformed(String),
}

// ── The backend trait ──────────────────────────────────────────────────────

/// Opaque "generate completion given a request" capability.
///
/// Contract:
///   • Exactly one attempt per call — no internal retries. Retry policy
///     belongs to the caller of the service, not to this layer.
///   • Returns the raw completion text as the service produced it; cleaning
///     is the sanitizer's job.
///   • An empty completion is `Ok("")`, not an error — the sanitizer's
///     non-empty postcondition handles it.
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    fn name(&self) -> &str;

    fn kind(&self) -> BackendKind;

    async fn complete(&self, request: &GenerationRequest) -> Result<String, GatewayError>;
}
