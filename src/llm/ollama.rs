use crate::llm::client::{build_http_client, send_json, GenerationSettings, LLMClient};
use crate::types::LlmError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub const DEFAULT_BASE_URL: &str = "http://localhost:11434";

/// Client for the Ollama `/api/chat` endpoint (non-streaming).
pub struct OllamaClient {
    http: reqwest::Client,
    base_url: String,
    model: String,
    settings: GenerationSettings,
}

impl OllamaClient {
    pub fn new(
        base_url: String,
        model: String,
        settings: GenerationSettings,
    ) -> reqwest::Result<Self> {
        Ok(Self {
            http: build_http_client(settings.request_timeout)?,
            base_url: base_url.trim_end_matches('/').to_string(),
            model,
            settings,
        })
    }
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatOptions {
    temperature: f32,
    num_predict: u32,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    stream: bool,
    options: ChatOptions,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    message: Option<ResponseMessage>,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: String,
}

#[async_trait]
impl LLMClient for OllamaClient {
    async fn generate_with_system(&self, system: &str, prompt: &str) -> Result<String, LlmError> {
        let body = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            stream: false,
            options: ChatOptions {
                temperature: self.settings.temperature,
                num_predict: self.settings.max_tokens,
            },
        };

        let response: ChatResponse = send_json(
            self.http
                .post(format!("{}/api/chat", self.base_url))
                .json(&body),
        )
        .await?;

        response
            .message
            .map(|m| m.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or(LlmError::EmptyResponse)
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
