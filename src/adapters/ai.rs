use crate::config::{AiBackendKind, AiConfig};
use crate::domain::model::MessageKind;
use crate::domain::ports::{ContentBackend, DynContentBackend};
use crate::utils::error::{MailerError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

fn generation_error(backend: &str, message: impl Into<String>) -> MailerError {
    MailerError::GenerationError {
        backend: backend.to_string(),
        message: message.into(),
    }
}

// OpenAI-style chat completion envelope
#[derive(Debug, Deserialize)]
struct ChatCompletion {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    #[serde(default)]
    content: Option<String>,
}

// generateContent envelope
#[derive(Debug, Deserialize)]
struct GenerateContentReply {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    #[serde(default)]
    text: Option<String>,
}

pub struct DeepSeekBackend {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    model: String,
    max_tokens: u32,
}

impl DeepSeekBackend {
    pub fn new(client: Client, config: &AiConfig) -> Self {
        Self {
            client,
            base_url: config.deepseek_base_url.trim_end_matches('/').to_string(),
            api_key: config.deepseek_api_key.clone(),
            model: config.deepseek_model.clone(),
            max_tokens: config.max_tokens,
        }
    }
}

#[async_trait]
impl ContentBackend for DeepSeekBackend {
    fn name(&self) -> &str {
        "deepseek"
    }

    async fn complete(&self, prompt: &str) -> Result<String> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| generation_error(self.name(), "API key not configured"))?;

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(api_key)
            .json(&json!({
                "model": self.model,
                "messages": [{ "role": "user", "content": prompt }],
                "max_tokens": self.max_tokens
            }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(generation_error(self.name(), format!("HTTP {}", status.as_u16())));
        }

        let reply: ChatCompletion = response.json().await?;
        reply
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| generation_error(self.name(), "reply has no message content"))
    }
}

pub struct GeminiBackend {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    model: String,
}

impl GeminiBackend {
    pub fn new(client: Client, config: &AiConfig) -> Self {
        Self {
            client,
            base_url: config.gemini_base_url.trim_end_matches('/').to_string(),
            api_key: config.gemini_api_key.clone(),
            model: config.gemini_model.clone(),
        }
    }
}

#[async_trait]
impl ContentBackend for GeminiBackend {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn complete(&self, prompt: &str) -> Result<String> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| generation_error(self.name(), "API key not configured"))?;

        let response = self
            .client
            .post(format!(
                "{}/v1beta/models/{}:generateContent",
                self.base_url, self.model
            ))
            .query(&[("key", api_key)])
            .json(&json!({
                "contents": [{ "parts": [{ "text": prompt }] }]
            }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(generation_error(self.name(), format!("HTTP {}", status.as_u16())));
        }

        let reply: GenerateContentReply = response.json().await?;
        reply
            .candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content.parts.into_iter().next())
            .and_then(|part| part.text)
            .ok_or_else(|| generation_error(self.name(), "reply has no candidate text"))
    }
}

/// Back-ends for one message kind, in the configured order.
pub fn chain_for(client: &Client, config: &AiConfig, kind: MessageKind) -> Vec<DynContentBackend> {
    config
        .order_for(kind)
        .iter()
        .map(|backend| -> DynContentBackend {
            match backend {
                AiBackendKind::Deepseek => Arc::new(DeepSeekBackend::new(client.clone(), config)),
                AiBackendKind::Gemini => Arc::new(GeminiBackend::new(client.clone(), config)),
            }
        })
        .collect()
}
