// Integration tests — the reflection engine end-to-end against a scripted
// generation backend. No network, no real model.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use reflectify::atoms::constants::{
    FALLBACK_EMPTY, FALLBACK_GATEWAY, FALLBACK_GENERIC, FALLBACK_MALFORMED, FALLBACK_TIMEOUT,
};
use reflectify::atoms::error::ReflectError;
use reflectify::atoms::traits::{GatewayError, GenerationBackend};
use reflectify::atoms::types::{BackendKind, ChatMessage, GenerationRequest};
use reflectify::config::SYSTEM_PROMPT;
use reflectify::engine::catalog::IntentCatalog;
use reflectify::engine::matcher::IntentMatcher;
use reflectify::engine::orchestrator::{EngineConfig, ReflectionEngine};
use reflectify::engine::providers::AnyBackend;

// ── Scripted backend ───────────────────────────────────────────────────────

enum Outcome {
    Reply(&'static str),
    ApiError,
    Transport,
    Malformed,
    Hang,
}

/// Shared observation point: how often the gateway was called and with what.
#[derive(Default)]
struct Probe {
    calls: AtomicUsize,
    last_request: Mutex<Option<GenerationRequest>>,
}

struct ScriptedBackend {
    outcome: Outcome,
    probe: Arc<Probe>,
}

#[async_trait]
impl GenerationBackend for ScriptedBackend {
    fn name(&self) -> &str {
        "scripted"
    }

    fn kind(&self) -> BackendKind {
        BackendKind::Chat
    }

    async fn complete(&self, request: &GenerationRequest) -> Result<String, GatewayError> {
        self.probe.calls.fetch_add(1, Ordering::SeqCst);
        *self.probe.last_request.lock() = Some(request.clone());
        match self.outcome {
            Outcome::Reply(text) => Ok(text.to_string()),
            Outcome::ApiError => {
                Err(GatewayError::Api { status: 500, message: "server exploded".into() })
            }
            Outcome::Transport => Err(GatewayError::Transport("connection refused".into())),
            Outcome::Malformed => Err(GatewayError::Malformed("no choices".into())),
            Outcome::Hang => {
                tokio::time::sleep(Duration::from_secs(600)).await;
                Ok(String::new())
            }
        }
    }
}

fn engine_with(outcome: Outcome, catalog: Arc<IntentCatalog>) -> (ReflectionEngine, Arc<Probe>) {
    let probe = Arc::new(Probe::default());
    let backend = AnyBackend::custom(Box::new(ScriptedBackend { outcome, probe: probe.clone() }));
    let config = EngineConfig { gateway_timeout: Duration::from_millis(50), ..Default::default() };
    let engine =
        ReflectionEngine::with_matcher(IntentMatcher::with_seed(catalog, 7), backend, config);
    (engine, probe)
}

fn bundled() -> Arc<IntentCatalog> {
    Arc::new(IntentCatalog::bundled())
}

fn empty_catalog() -> Arc<IntentCatalog> {
    Arc::new(IntentCatalog::from_path("/nonexistent/intents.json"))
}

// ── Fast path ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn greeting_short_circuits_without_gateway_call() {
    let catalog = bundled();
    let greeting_responses: Vec<String> =
        catalog.find("greeting").unwrap().responses.clone();

    let (engine, probe) = engine_with(Outcome::Reply("unused"), catalog);
    let reply = engine.reflect("hi", &[], None).await.unwrap();

    assert!(greeting_responses.contains(&reply));
    assert_eq!(probe.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn crisis_phrase_answers_even_with_empty_catalog() {
    let (engine, probe) = engine_with(Outcome::Reply("unused"), empty_catalog());
    let reply = engine
        .reflect("I think I want to kill myself", &[], None)
        .await
        .unwrap();

    assert!(!reply.trim().is_empty());
    assert!(reply.contains("988"));
    assert_eq!(probe.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn blank_message_is_rejected() {
    let (engine, probe) = engine_with(Outcome::Reply("unused"), bundled());
    let err = engine.reflect("   ", &[], None).await.unwrap_err();
    assert!(matches!(err, ReflectError::BlankMessage));
    assert_eq!(probe.calls.load(Ordering::SeqCst), 0);
}

// ── Generative path ────────────────────────────────────────────────────────

#[tokio::test]
async fn generation_with_empty_history_sends_system_plus_user() {
    let (engine, probe) = engine_with(Outcome::Reply("  You can do this.  "), bundled());
    let reply = engine
        .reflect("I'm feeling anxious about my exam tomorrow", &[], None)
        .await
        .unwrap();

    assert_eq!(reply, "You can do this.");
    assert_eq!(probe.calls.load(Ordering::SeqCst), 1);

    let request = probe.last_request.lock().take().unwrap();
    assert_eq!(request.messages.len(), 2);
    assert!(request.messages[0].content.starts_with(SYSTEM_PROMPT));
    assert!(!request.messages[0].content.contains("User Info"));
    assert_eq!(
        request.messages[1].content,
        "I'm feeling anxious about my exam tomorrow"
    );
}

#[tokio::test]
async fn history_window_keeps_last_ten() {
    let history: Vec<ChatMessage> = (0..12)
        .map(|i| {
            if i % 2 == 0 {
                ChatMessage::user(format!("user turn {i}"))
            } else {
                ChatMessage::assistant(format!("assistant turn {i}"))
            }
        })
        .collect();

    let (engine, probe) = engine_with(Outcome::Reply("ok"), bundled());
    engine
        .reflect("something new came up at my job today", &history, None)
        .await
        .unwrap();

    let request = probe.last_request.lock().take().unwrap();
    // system + 10 windowed + new user message
    assert_eq!(request.messages.len(), 12);
    assert_eq!(request.messages[1].content, "user turn 2");
    assert_eq!(request.messages[10].content, "assistant turn 11");
}

#[tokio::test]
async fn profile_text_lands_in_system_message() {
    let (engine, probe) = engine_with(Outcome::Reply("ok"), bundled());
    engine
        .reflect(
            "what should i cook for dinner when i'm exhausted",
            &[],
            Some("Name: Sam\nVegetarian"),
        )
        .await
        .unwrap();

    let request = probe.last_request.lock().take().unwrap();
    assert!(request.messages[0]
        .content
        .contains("User Info:\nName: Sam\nVegetarian"));
}

#[tokio::test]
async fn raw_completion_is_sanitized() {
    let (engine, _probe) = engine_with(
        Outcome::Reply("Rest helps.<|im_end|>\n<|im_start|>user\nreally?"),
        bundled(),
    );
    let reply = engine
        .reflect("lately sleep has been really difficult for me", &[], None)
        .await
        .unwrap();
    assert_eq!(reply, "Rest helps.");
}

#[tokio::test]
async fn empty_completion_yields_empty_fallback() {
    let (engine, _probe) = engine_with(Outcome::Reply(""), bundled());
    let reply = engine
        .reflect("today felt strange and i can't explain why", &[], None)
        .await
        .unwrap();
    assert_eq!(reply, FALLBACK_EMPTY);
}

// ── Failure recovery ───────────────────────────────────────────────────────

#[tokio::test]
async fn gateway_timeout_yields_timeout_fallback() {
    let (engine, probe) = engine_with(Outcome::Hang, bundled());
    let reply = engine
        .reflect("my project deadline keeps slipping away from me", &[], None)
        .await
        .unwrap();
    assert_eq!(reply, FALLBACK_TIMEOUT);
    assert_eq!(probe.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn gateway_api_error_yields_gateway_fallback() {
    let (engine, _probe) = engine_with(Outcome::ApiError, bundled());
    let reply = engine
        .reflect("my roommate situation is getting complicated", &[], None)
        .await
        .unwrap();
    assert_eq!(reply, FALLBACK_GATEWAY);
}

#[tokio::test]
async fn gateway_transport_error_yields_generic_fallback() {
    let (engine, _probe) = engine_with(Outcome::Transport, bundled());
    let reply = engine
        .reflect("my roommate situation is getting complicated", &[], None)
        .await
        .unwrap();
    assert_eq!(reply, FALLBACK_GENERIC);
}

#[tokio::test]
async fn malformed_gateway_payload_yields_listen_fallback() {
    let (engine, _probe) = engine_with(Outcome::Malformed, bundled());
    let reply = engine
        .reflect("my roommate situation is getting complicated", &[], None)
        .await
        .unwrap();
    assert_eq!(reply, FALLBACK_MALFORMED);
}
