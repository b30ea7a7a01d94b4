// Reflectify Engine — Chat-Completions Backend
// Speaks the OpenAI-compatible /v1/chat/completions wire format used by
// vLLM-style serving stacks. One attempt per call, no retries: retry policy
// belongs to the caller of the service.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, error};

use crate::atoms::traits::{GatewayError, GenerationBackend};
use crate::atoms::types::{
    truncate_utf8, BackendConfig, BackendKind, ChatMessage, GenerationRequest,
};

pub struct ChatCompletionsBackend {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl ChatCompletionsBackend {
    pub fn new(config: &BackendConfig) -> Self {
        ChatCompletionsBackend {
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

    fn format_messages(messages: &[ChatMessage]) -> Vec<Value> {
        messages
            .iter()
            .map(|msg| json!({"role": msg.role, "content": msg.content}))
            .collect()
    }
}

#[async_trait]
impl GenerationBackend for ChatCompletionsBackend {
    fn name(&self) -> &str {
        "chat-completions"
    }

    fn kind(&self) -> BackendKind {
        BackendKind::Chat
    }

    async fn complete(&self, request: &GenerationRequest) -> Result<String, GatewayError> {
        let url = format!("{}/v1/chat/completions", self.base_url.trim_end_matches('/'));

        let body = json!({
            "model": self.model,
            "messages": Self::format_messages(&request.messages),
            "max_tokens": request.params.max_tokens,
            "temperature": request.params.temperature,
            "top_p": request.params.top_p,
        });

        debug!(
            "[gateway] chat request to {} model={} ({} messages)",
            url,
            self.model,
            request.messages.len()
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
            error!("[gateway] chat error {}: {}", status, truncate_utf8(&body_text, 500));
            return Err(GatewayError::Api {
                status,
                message: truncate_utf8(&body_text, 200).to_string(),
            });
        }

        let payload: Value = response
            .json()
            .await
            .map_err(|e| GatewayError::Malformed(e.to_string()))?;

        let content = payload["choices"]
            .get(0)
            .and_then(|choice| choice["message"]["content"].as_str())
            .ok_or_else(|| {
                GatewayError::Malformed(format!(
                    "no completion in response: {}",
                    truncate_utf8(&payload.to_string(), 200)
                ))
            })?;

        Ok(content.trim().to_string())
    }
}

/// Classify a reqwest send error: client-side deadline → Timeout, everything
/// else is transport.
pub(crate) fn classify_send_error(err: reqwest::Error) -> GatewayError {
    if err.is_timeout() {
        GatewayError::Timeout
    } else {
        GatewayError::Transport(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_messages_wire_shape() {
        let messages = vec![ChatMessage::system("sys"), ChatMessage::user("hi")];
        let formatted = ChatCompletionsBackend::format_messages(&messages);
        assert_eq!(formatted.len(), 2);
        assert_eq!(formatted[0]["role"], "system");
        assert_eq!(formatted[1]["content"], "hi");
    }
}
