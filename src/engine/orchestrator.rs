// Reflectify Engine — Reflection Orchestrator
// Composes the whole pipeline for one request:
//   validate → intent match → (on miss) assemble → generate → sanitize
//
// The only error that crosses this boundary is blank-message validation.
// Every downstream failure is recovered locally and converted into a fixed,
// safe, non-blank reply; the caller never sees a gateway fault.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::atoms::constants::{
    FALLBACK_GATEWAY, FALLBACK_GENERIC, FALLBACK_MALFORMED, FALLBACK_TIMEOUT,
};
use crate::atoms::error::{ReflectError, ReflectResult};
use crate::atoms::traits::GatewayError;
use crate::atoms::types::{ChatMessage, GenerationRequest, SamplingParams};
use crate::engine::catalog::IntentCatalog;
use crate::engine::context;
use crate::engine::matcher::IntentMatcher;
use crate::engine::providers::AnyBackend;
use crate::engine::sanitize::sanitize;

// ── Engine knobs ───────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub system_prompt: String,
    pub context_message_limit: usize,
    pub sampling: SamplingParams,
    pub use_intent_matching: bool,
    pub gateway_timeout: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            system_prompt: crate::config::SYSTEM_PROMPT.to_string(),
            context_message_limit: crate::atoms::constants::DEFAULT_CONTEXT_MESSAGE_LIMIT,
            sampling: SamplingParams::default(),
            use_intent_matching: true,
            gateway_timeout: Duration::from_secs(
                crate::atoms::constants::DEFAULT_GATEWAY_TIMEOUT_SECS,
            ),
        }
    }
}

// ── The engine ─────────────────────────────────────────────────────────────

pub struct ReflectionEngine {
    matcher: IntentMatcher,
    backend: AnyBackend,
    config: EngineConfig,
}

impl ReflectionEngine {
    pub fn new(catalog: Arc<IntentCatalog>, backend: AnyBackend, config: EngineConfig) -> Self {
        ReflectionEngine { matcher: IntentMatcher::new(catalog), backend, config }
    }

    /// Construct with a pre-built (e.g. seeded) matcher.
    pub fn with_matcher(matcher: IntentMatcher, backend: AnyBackend, config: EngineConfig) -> Self {
        ReflectionEngine { matcher, backend, config }
    }

    /// Produce one assistant reply.
    ///
    /// Errs only on blank-message validation; every other outcome is `Ok`
    /// with either a real reply or a fixed fallback.
    pub async fn reflect(
        &self,
        message: &str,
        history: &[ChatMessage],
        profile_text: Option<&str>,
    ) -> ReflectResult<String> {
        let message = message.trim();
        if message.is_empty() {
            return Err(ReflectError::BlankMessage);
        }

        // Fast path: canned responses are returned verbatim, unsanitized.
        if self.config.use_intent_matching {
            if let Some(hit) = self.matcher.match_input(message) {
                info!("[engine] intent fast path -> '{}'", hit.tag);
                return Ok(hit.response);
            }
        }

        let messages = context::assemble(
            &self.config.system_prompt,
            profile_text,
            history,
            message,
            self.config.context_message_limit,
        );
        let request = GenerationRequest { messages, params: self.config.sampling };
        debug!(
            "[engine] generation path via {} ({} messages)",
            self.backend.name(),
            request.messages.len()
        );

        let raw = match tokio::time::timeout(
            self.config.gateway_timeout,
            self.backend.complete(&request),
        )
        .await
        {
            Ok(Ok(raw)) => raw,
            Ok(Err(err)) => return Ok(fallback_for(&err)),
            Err(_elapsed) => {
                warn!("[engine] gateway deadline exceeded");
                return Ok(FALLBACK_TIMEOUT.to_string());
            }
        };

        Ok(sanitize(&raw))
    }
}

/// Map a gateway failure to its fixed user-facing reply.
/// The texts are distinct per failure kind so reports can tell them apart.
fn fallback_for(err: &GatewayError) -> String {
    warn!("[engine] gateway failure: {err}");
    match err {
        GatewayError::Timeout => FALLBACK_TIMEOUT,
        GatewayError::Api { .. } => FALLBACK_GATEWAY,
        GatewayError::Malformed(_) => FALLBACK_MALFORMED,
        GatewayError::Transport(_) => FALLBACK_GENERIC,
    }
    .to_string()
}
