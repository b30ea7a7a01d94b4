// Reflectify — Environment Configuration
// Every knob comes from the process environment (.env honored); invalid
// values fail startup rather than limping along with half-parsed settings.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::atoms::constants::{
    DEFAULT_CONTEXT_MESSAGE_LIMIT, DEFAULT_GATEWAY_TIMEOUT_SECS, DEFAULT_MAX_TOKENS,
    DEFAULT_MODEL, DEFAULT_PORT, DEFAULT_TEMPERATURE, DEFAULT_TOP_P,
};
use crate::atoms::error::{ReflectError, ReflectResult};
use crate::atoms::types::{BackendConfig, BackendKind, SamplingParams};
use crate::engine::orchestrator::EngineConfig;

// ── System Prompt ──────────────────────────────────────────────────────────
// Product voice. Changes here alter the assistant's personality for every
// generative reply.

pub const SYSTEM_PROMPT: &str = r#"You are Reflectify, a friendly and helpful emotional companion and journaling assistant.

IMPORTANT RULES:

1. BE NATURAL AND CONVERSATIONAL:
   - Talk like a caring friend, NOT like a therapy bot
   - Don't do weird counting like "1... 2... 3..." or "Inhale... Hold... Exhale..."
   - Don't be overly clinical or robotic
   - Keep it simple and human

2. ADAPT RESPONSE LENGTH:
   - Simple greetings: 1-2 sentences
   - Problems/emotions: 3-5 sentences with advice
   - Just be helpful, don't overthink

3. BE ACTUALLY HELPFUL:
   - Give real practical advice, not just "breathing exercises"
   - If someone has a problem, suggest what they can DO about it
   - Don't ask too many questions - provide solutions

4. USE SIMPLE FORMATTING:
   - Use bullet points (•) for lists of suggestions
   - Keep paragraphs short
   - Don't overformat with ** or ##

5. For personal questions (name, age, etc.):
   - Answer directly from User Info if available

AVOID:
- Robotic breathing countdowns
- Over-the-top therapy speak
- "Grounding techniques" with numbered steps
- Being preachy or condescending
- Asking endless questions without helping

GOOD EXAMPLE:
User: "My teacher extended class from 30 min to 1 hour"
Response: "That's annoying when plans change unexpectedly. A few things you could try:
• Take a quick stretch when you can
• Use the extra time to get ahead on homework
• Talk to your teacher after class if it keeps happening
What's making it especially frustrating for you?"

BAD EXAMPLE (DON'T DO THIS):
"Let's try a grounding technique: 1. Notice your feet... 2. Feel the air... Inhale 1... 2... 3..."

Be a helpful friend, not a meditation app."#;

// ── Config ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub backend: BackendConfig,
    pub engine: EngineConfig,
    /// Optional on-disk corpus overriding the bundled one.
    pub intents_path: Option<PathBuf>,
}

impl Config {
    pub fn from_env() -> ReflectResult<Self> {
        let base_url = env::var("GATEWAY_URL")
            .map_err(|_| ReflectError::config("GATEWAY_URL is not set"))?;

        let kind = match env_or("GATEWAY_BACKEND", "chat").as_str() {
            "chat" => BackendKind::Chat,
            "prompt" => BackendKind::Prompt,
            other => {
                return Err(ReflectError::config(format!(
                    "GATEWAY_BACKEND must be 'chat' or 'prompt', got '{other}'"
                )))
            }
        };

        let backend = BackendConfig {
            kind,
            base_url,
            api_key: env_or("GATEWAY_API_KEY", "EMPTY"),
            model: env_or("MODEL_NAME", DEFAULT_MODEL),
        };

        let engine = EngineConfig {
            system_prompt: SYSTEM_PROMPT.to_string(),
            context_message_limit: parse_env(
                "CONTEXT_MESSAGE_LIMIT",
                DEFAULT_CONTEXT_MESSAGE_LIMIT,
            )?,
            sampling: SamplingParams {
                max_tokens: parse_env("MAX_TOKENS", DEFAULT_MAX_TOKENS)?,
                temperature: parse_env("TEMPERATURE", DEFAULT_TEMPERATURE)?,
                top_p: parse_env("TOP_P", DEFAULT_TOP_P)?,
            },
            use_intent_matching: env_or("USE_INTENT_MATCHING", "true").to_lowercase() == "true",
            gateway_timeout: Duration::from_secs(parse_env(
                "GATEWAY_TIMEOUT_SECS",
                DEFAULT_GATEWAY_TIMEOUT_SECS,
            )?),
        };

        Ok(Config {
            port: parse_env("PORT", DEFAULT_PORT)?,
            backend,
            engine,
            intents_path: env::var("INTENTS_PATH").ok().map(PathBuf::from),
        })
    }
}

// ── Env helpers ────────────────────────────────────────────────────────────

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_env<T>(key: &str, default: T) -> ReflectResult<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw.trim().parse().map_err(|e| {
            ReflectError::config(format!("{key} has invalid value '{raw}': {e}"))
        }),
        Err(_) => Ok(default),
    }
}
