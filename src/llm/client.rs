//! LLM Client abstractions and provider management
//!
//! This module provides a unified interface for the chat-completion providers
//! the synthesis step can talk to:
//! - **OpenAI**: OpenAI API and compatible endpoints (OpenRouter, vLLM, ...)
//! - **Ollama**: local inference through the Ollama chat API

use crate::types::LlmError;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Generic LLM client trait for provider abstraction
///
/// All LLM providers implement this trait, allowing for easy swapping
/// between providers without changing application code.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LLMClient: Send + Sync {
    /// Generate a completion for `prompt` under the given system instruction
    async fn generate_with_system(&self, system: &str, prompt: &str) -> Result<String, LlmError>;

    /// Get the model name/identifier
    fn model_name(&self) -> &str;
}

/// Sampling settings shared by every provider.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationSettings {
    pub temperature: f32,
    pub max_tokens: u32,
    /// Timeout for a single HTTP round trip.
    pub request_timeout: Duration,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            temperature: 0.3,
            max_tokens: 1000,
            request_timeout: Duration::from_secs(30),
        }
    }
}

/// Provider enum for runtime selection
#[derive(Debug, Clone)]
pub enum Provider {
    /// OpenAI API provider (including compatible APIs)
    ///
    /// # Example
    /// ```rust,ignore
    /// let provider = Provider::OpenAI {
    ///     api_key: "sk-...".to_string(),
    ///     api_base: "https://api.openai.com/v1".to_string(),
    ///     model: "gpt-3.5-turbo".to_string(),
    /// };
    /// ```
    OpenAI {
        api_key: String,
        api_base: String,
        model: String,
    },

    /// Ollama local LLM provider
    ///
    /// # Example
    /// ```rust,ignore
    /// let provider = Provider::Ollama {
    ///     base_url: "http://localhost:11434".to_string(),
    ///     model: "llama3.2".to_string(),
    /// };
    /// ```
    Ollama { base_url: String, model: String },
}

impl Provider {
    /// Create a client instance for this provider
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built
    /// (for example when no TLS backend is available).
    pub fn create_client(&self, settings: GenerationSettings) -> reqwest::Result<Box<dyn LLMClient>> {
        match self {
            Provider::OpenAI {
                api_key,
                api_base,
                model,
            } => Ok(Box::new(super::openai::OpenAIClient::new(
                api_key.clone(),
                api_base.clone(),
                model.clone(),
                settings,
            )?)),

            Provider::Ollama { base_url, model } => Ok(Box::new(
                super::ollama::OllamaClient::new(base_url.clone(), model.clone(), settings)?,
            )),
        }
    }

    /// Get a human-readable name for this provider
    pub fn name(&self) -> &'static str {
        match self {
            Provider::OpenAI { .. } => "OpenAI",
            Provider::Ollama { .. } => "Ollama",
        }
    }

    pub fn model(&self) -> &str {
        match self {
            Provider::OpenAI { model, .. } | Provider::Ollama { model, .. } => model,
        }
    }
}

pub(crate) fn build_http_client(timeout: Duration) -> reqwest::Result<reqwest::Client> {
    reqwest::Client::builder().timeout(timeout).build()
}

/// Send a chat request and decode the JSON body, classifying failures.
pub(crate) async fn send_json<T: DeserializeOwned>(
    request: reqwest::RequestBuilder,
) -> Result<T, LlmError> {
    let response = request
        .send()
        .await
        .map_err(|e| LlmError::from_reqwest(&e))?;

    let status = response.status();
    if !status.is_success() {
        let retry_after = response
            .headers()
            .get(reqwest::header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<u64>().ok());
        let body = response.text().await.unwrap_or_default();
        return Err(LlmError::from_status(
            status.as_u16(),
            retry_after,
            error_message(&body),
        ));
    }

    response
        .json::<T>()
        .await
        .map_err(|e| LlmError::ResponseParse(e.to_string()))
}

/// Pull a readable message out of a provider error body.
///
/// Handles `{"error": {"message": ...}}` (OpenAI) and `{"error": "..."}`
/// (Ollama); anything else is returned as a shortened raw body.
fn error_message(body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        let error = &value["error"];
        if let Some(message) = error["message"].as_str() {
            return message.to_string();
        }
        if let Some(message) = error.as_str() {
            return message.to_string();
        }
    }
    body.chars().take(200).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_name() {
        let openai = Provider::OpenAI {
            api_key: "".to_string(),
            api_base: "".to_string(),
            model: "gpt-3.5-turbo".to_string(),
        };
        assert_eq!(openai.name(), "OpenAI");
        assert_eq!(openai.model(), "gpt-3.5-turbo");

        let ollama = Provider::Ollama {
            base_url: "".to_string(),
            model: "llama3.2".to_string(),
        };
        assert_eq!(ollama.name(), "Ollama");
        assert_eq!(ollama.model(), "llama3.2");
    }

    #[test]
    fn test_create_client_keeps_model() {
        let provider = Provider::Ollama {
            base_url: "http://localhost:11434".to_string(),
            model: "llama3.2".to_string(),
        };
        let client = provider
            .create_client(GenerationSettings::default())
            .unwrap();
        assert_eq!(client.model_name(), "llama3.2");
    }

    #[test]
    fn test_error_message_shapes() {
        assert_eq!(
            error_message(r#"{"error": {"message": "Incorrect API key", "type": "invalid_request_error"}}"#),
            "Incorrect API key"
        );
        assert_eq!(error_message(r#"{"error": "model not found"}"#), "model not found");
        assert_eq!(error_message("plain failure"), "plain failure");
    }
}
