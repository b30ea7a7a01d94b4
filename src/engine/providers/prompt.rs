// Reflectify Engine — Prompt-Template Backend
// Speaks the OpenAI-compatible /v1/completions text wire format: the message
// sequence is flattened through the fixed turn-delimiter template before the
// call. Raw completions from this path are what the sanitizer cleans.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, error};

use crate::atoms::traits::{GatewayError, GenerationBackend};
use crate::atoms::types::{
    truncate_utf8, BackendConfig, BackendKind, ChatMessage, GenerationRequest, Role,
};

use super::chat::classify_send_error;

pub struct PromptCompletionsBackend {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl PromptCompletionsBackend {
    pub fn new(config: &BackendConfig) -> Self {
        PromptCompletionsBackend {
            client: Client::builder()
                .connect_timeout(Duration::from_secs(10))
                .timeout(Duration::from_secs(120))
                .build()
                .unwrap_or_default(),
            base_url: config.base_url.clone(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
        }
    }
}

/// Flatten an ordered message sequence into the fixed turn-delimiter
/// template:
///
/// ```text
/// <s>[INST] <<SYS>>
/// {system}
/// <</SYS>>
///
/// {user} [/INST] {assistant} </s><s>[INST] {user} [/INST]
/// ```
///
/// The system block shares the first `[INST]` with the first user turn; each
/// assistant turn closes its block with `</s>`.
pub fn format_prompt(messages: &[ChatMessage]) -> String {
    let mut out = String::new();
    let mut open = false;
    for msg in messages {
        match msg.role {
            Role::System => {
                out.push_str("<s>[INST] <<SYS>>\n");
                out.push_str(&msg.content);
                out.push_str("\n<</SYS>>\n\n");
                open = true;
            }
            Role::User => {
                if !open {
                    out.push_str("<s>[INST] ");
                }
                out.push_str(&msg.content);
                out.push_str(" [/INST]");
                open = false;
            }
            Role::Assistant => {
                out.push(' ');
                out.push_str(&msg.content);
                out.push_str(" </s>");
            }
        }
    }
    out
}

#[async_trait]
impl GenerationBackend for PromptCompletionsBackend {
    fn name(&self) -> &str {
        "prompt-completions"
    }

    fn kind(&self) -> BackendKind {
        BackendKind::Prompt
    }

    async fn complete(&self, request: &GenerationRequest) -> Result<String, GatewayError> {
        let url = format!("{}/v1/completions", self.base_url.trim_end_matches('/'));
        let prompt = format_prompt(&request.messages);

        let body = json!({
            "model": self.model,
            "prompt": prompt,
            "max_tokens": request.params.max_tokens,
            "temperature": request.params.temperature,
            "top_p": request.params.top_p,
        });

        debug!(
            "[gateway] prompt request to {} model={} ({} prompt chars)",
            url,
            self.model,
            prompt.len()
        );

        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&body)
            .send()
            .await
            .map_err(classify_send_error)?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body_text = response.text().await.unwrap_or_default();
            error!("[gateway] prompt error {}: {}", status, truncate_utf8(&body_text, 500));
            return Err(GatewayError::Api {
                status,
                message: truncate_utf8(&body_text, 200).to_string(),
            });
        }

        let payload: Value = response
            .json()
            .await
            .map_err(|e| GatewayError::Malformed(e.to_string()))?;

        let text = payload["choices"]
            .get(0)
            .and_then(|choice| choice["text"].as_str())
            .ok_or_else(|| {
                GatewayError::Malformed(format!(
                    "no completion in response: {}",
                    truncate_utf8(&payload.to_string(), 200)
                ))
            })?;

        Ok(text.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_turn_template() {
        let messages = vec![ChatMessage::system("be kind"), ChatMessage::user("hello")];
        assert_eq!(
            format_prompt(&messages),
            "<s>[INST] <<SYS>>\nbe kind\n<</SYS>>\n\nhello [/INST]"
        );
    }

    #[test]
    fn test_multi_turn_template() {
        let messages = vec![
            ChatMessage::system("sys"),
            ChatMessage::user("q1"),
            ChatMessage::assistant("a1"),
            ChatMessage::user("q2"),
        ];
        assert_eq!(
            format_prompt(&messages),
            "<s>[INST] <<SYS>>\nsys\n<</SYS>>\n\nq1 [/INST] a1 </s><s>[INST] q2 [/INST]"
        );
    }

    #[test]
    fn test_template_round_trips_through_sanitizer() {
        // An echoing server returns prompt + completion; the sanitizer must
        // recover just the completion.
        let messages = vec![ChatMessage::system("sys"), ChatMessage::user("help me")];
        let echoed = format!("{} Take a slow breath. </s>", format_prompt(&messages));
        assert_eq!(crate::engine::sanitize::sanitize(&echoed), "Take a slow breath.");
    }
}
