use crate::actors::messages::{AppError, CompletionRequest};
use crate::actors::traits::CompletionClient;
use crate::brain::memory::Role;
use crate::config::CompletionConfig;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

/// Reply used when the provider answers with no content.
const EMPTY_COMPLETION_REPLY: &str = "I could not generate a response.";

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Chat completion client for OpenAI-compatible `/chat/completions` endpoints.
///
/// The deadline is not enforced here: the supervisor races `complete` against
/// its own timeout and drops the request future on expiry.
#[derive(Clone)]
pub struct OpenAiClient {
    client: Client,
    config: CompletionConfig,
}

impl OpenAiClient {
    pub fn new(config: CompletionConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    /// Whether an API key is set
    #[cfg(test)]
    pub fn is_configured(&self) -> bool {
        self.config.api_key.is_some()
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/chat/completions",
            self.config.base_url.as_str().trim_end_matches('/')
        )
    }

    fn build_request(&self, api_key: &str, payload: &ChatRequest<'_>) -> Result<reqwest::RequestBuilder, AppError> {
        let mut headers = HeaderMap::new();
        let auth_value = HeaderValue::from_str(&format!("Bearer {}", api_key))
            .map_err(|_| AppError::Config("API key contains invalid header characters".to_string()))?;
        headers.insert(AUTHORIZATION, auth_value);

        Ok(self.client.post(self.endpoint()).headers(headers).json(payload))
    }
}

#[async_trait]
impl CompletionClient for OpenAiClient {
    #[instrument(skip(self, request), fields(model = %self.config.model, turns = request.history.len()))]
    async fn complete(&self, request: CompletionRequest) -> Result<String, AppError> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or_else(|| AppError::Config("OPENAI_API_KEY is not set".to_string()))?;

        let mut messages = Vec::with_capacity(request.history.len() + 2);
        messages.push(ChatMessage {
            role: Role::System.as_str(),
            content: &request.system_prompt,
        });
        messages.extend(request.history.iter().map(|turn| ChatMessage {
            role: turn.role.as_str(),
            content: &turn.content,
        }));
        messages.push(ChatMessage {
            role: Role::User.as_str(),
            content: &request.user_message,
        });

        let payload = ChatRequest {
            model: &self.config.model,
            messages,
            temperature: request.temperature,
            max_tokens: self.config.max_tokens,
        };

        info!("Requesting completion");
        let res = self.build_request(api_key, &payload)?.send().await?;

        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            return Err(AppError::Upstream(format!(
                "Completion request failed with status {}: {}",
                status, body
            )));
        }

        let parsed: ChatResponse = res
            .json()
            .await
            .map_err(|e| AppError::Upstream(format!("Malformed completion response: {}", e)))?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty());

        match content {
            Some(text) => Ok(text),
            None => {
                warn!("Completion response had no content");
                Ok(EMPTY_COMPLETION_REPLY.to_string())
            }
        }
    }
}
