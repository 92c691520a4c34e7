use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::config::Config;
use crate::errors::ChatError;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: Role::System, content: content.into() }
    }
    pub fn user(content: impl Into<String>) -> Self {
        Self { role: Role::User, content: content.into() }
    }
    pub fn assistant(content: impl Into<String>) -> Self {
        Self { role: Role::Assistant, content: content.into() }
    }
}

/// The Chat Model Client: sends a tagged message sequence to an LLM and
/// returns its text completion. Knows nothing about JSON; callers embed
/// formatting instructions in their prompts.
#[async_trait]
pub trait ChatModelClient: Send + Sync {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, ChatError>;
}

/// OpenAI-compatible HTTP chat client.
pub struct HttpChatModelClient {
    http: reqwest::Client,
    base_url: String,
    model: String,
    timeout_ms: u64,
}

impl HttpChatModelClient {
    pub fn new(cfg: &Config) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: cfg.chat_base_url.clone(),
            model: cfg.chat_model.clone(),
            timeout_ms: cfg.collaborator_timeout_ms,
        }
    }
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    content: String,
}

#[async_trait]
impl ChatModelClient for HttpChatModelClient {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, ChatError> {
        let request = self.http.post(&self.base_url).json(&json!({ "model": self.model, "messages": messages }));

        let response: ChatCompletionResponse = match tokio::time::timeout(Duration::from_millis(self.timeout_ms), async {
            request.send().await?.error_for_status()?.json::<ChatCompletionResponse>().await
        })
        .await
        {
            Ok(result) => result?,
            Err(_) => return Err(ChatError::Timeout),
        };

        response
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or(ChatError::EmptyResponse)
    }
}
