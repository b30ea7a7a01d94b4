// Reflectify Engine — Generation Backend Registry
// AnyBackend wraps Box<dyn GenerationBackend> so adding a new backend
// never requires touching the orchestrator — just implement the trait.

pub mod chat;
pub mod prompt;

pub use chat::ChatCompletionsBackend;
pub use prompt::PromptCompletionsBackend;

use crate::atoms::traits::{GatewayError, GenerationBackend};
use crate::atoms::types::{BackendConfig, BackendKind, GenerationRequest};

// ── Backend factory ────────────────────────────────────────────────────────

/// Type-erased generation backend. Callers hold `AnyBackend` and call
/// `.complete()` without knowing which wire format is in use.
pub struct AnyBackend(Box<dyn GenerationBackend>);

impl AnyBackend {
    /// Construct the right concrete backend from a `BackendConfig`.
    pub fn from_config(config: &BackendConfig) -> Self {
        let backend: Box<dyn GenerationBackend> = match config.kind {
            BackendKind::Chat => Box::new(ChatCompletionsBackend::new(config)),
            BackendKind::Prompt => Box::new(PromptCompletionsBackend::new(config)),
        };
        AnyBackend(backend)
    }

    /// Wrap an arbitrary implementation (used by tests to inject mocks).
    pub fn custom(backend: Box<dyn GenerationBackend>) -> Self {
        AnyBackend(backend)
    }

    /// Single-attempt completion call. The deadline lives in the caller.
    pub async fn complete(&self, request: &GenerationRequest) -> Result<String, GatewayError> {
        self.0.complete(request).await
    }

    pub fn name(&self) -> &str {
        self.0.name()
    }

    pub fn kind(&self) -> BackendKind {
        self.0.kind()
    }
}
