//! TOML-based configuration for wikiresearch
//!
//! Configuration is read from `wikiresearch.toml` when present; every field
//! has a default so the file is optional. A few settings can be overridden
//! from the environment (`WIKIPEDIA_LANGUAGE`, `MAX_SEARCH_RESULTS`,
//! `MAX_CONTENT_LENGTH`). Secrets are never stored in the file: the file
//! names the environment variable that holds the API key.

use crate::llm::{GenerationSettings, Provider, RetryPolicy};
use crate::research::OrchestratorConfig;
use crate::types::{
    is_valid_language_code, ConfigError, ResearchOptions, DEFAULT_LANGUAGE,
    DEFAULT_MAX_CONTENT_LENGTH, DEFAULT_MAX_RESULTS, MAX_CONTENT_LENGTH, MAX_MAX_RESULTS,
    MIN_CONTENT_LENGTH, MIN_MAX_RESULTS,
};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Default configuration file name, looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "wikiresearch.toml";

/// Root configuration structure loaded from wikiresearch.toml
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResearcherConfig {
    #[serde(default)]
    pub wikipedia: WikipediaConfig,

    #[serde(default)]
    pub llm: LlmConfig,

    #[serde(default)]
    pub research: ResearchConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

// ============= Wikipedia Configuration =============

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WikipediaConfig {
    /// API endpoint; `{lang}` is replaced with the language edition
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    #[serde(default = "default_wiki_timeout")]
    pub request_timeout_secs: u64,
}

fn default_endpoint() -> String {
    crate::wiki::client::DEFAULT_ENDPOINT.to_string()
}

fn default_wiki_timeout() -> u64 {
    15
}

impl Default for WikipediaConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            request_timeout_secs: default_wiki_timeout(),
        }
    }
}

impl WikipediaConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

// ============= LLM Configuration =============

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ProviderConfig {
    OpenAI {
        /// Environment variable containing API key
        #[serde(default = "default_api_key_env")]
        api_key_env: String,
        #[serde(default = "default_openai_base")]
        api_base: String,
        #[serde(default = "default_openai_model")]
        model: String,
    },
    Ollama {
        #[serde(default = "default_ollama_url")]
        base_url: String,
        #[serde(default = "default_ollama_model")]
        model: String,
    },
}

fn default_api_key_env() -> String {
    "OPENAI_API_KEY".to_string()
}

fn default_openai_base() -> String {
    crate::llm::openai::DEFAULT_API_BASE.to_string()
}

fn default_openai_model() -> String {
    "gpt-3.5-turbo".to_string()
}

fn default_ollama_url() -> String {
    crate::llm::ollama::DEFAULT_BASE_URL.to_string()
}

fn default_ollama_model() -> String {
    "llama3.2".to_string()
}

impl Default for ProviderConfig {
    fn default() -> Self {
        ProviderConfig::OpenAI {
            api_key_env: default_api_key_env(),
            api_base: default_openai_base(),
            model: default_openai_model(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RetryConfig {
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,

    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,
}

fn default_max_attempts() -> u32 {
    3
}

fn default_base_delay_ms() -> u64 {
    500
}

fn default_max_delay_ms() -> u64 {
    8000
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            base_delay_ms: default_base_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(default = "default_temperature")]
    pub temperature: f64,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    #[serde(default = "default_llm_timeout")]
    pub request_timeout_secs: u64,

    /// Upper bound for the article context placed in the prompt
    #[serde(default = "default_max_prompt_chars")]
    pub max_prompt_chars: usize,

    #[serde(default)]
    pub provider: ProviderConfig,

    #[serde(default)]
    pub retry: RetryConfig,
}

fn default_temperature() -> f64 {
    0.3
}

fn default_max_tokens() -> u32 {
    1000
}

fn default_llm_timeout() -> u64 {
    30
}

fn default_max_prompt_chars() -> usize {
    16_000
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            request_timeout_secs: default_llm_timeout(),
            max_prompt_chars: default_max_prompt_chars(),
            provider: ProviderConfig::default(),
            retry: RetryConfig::default(),
        }
    }
}

// ============= Research Configuration =============

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResearchConfig {
    #[serde(default = "default_language")]
    pub language: String,

    #[serde(default = "default_max_results")]
    pub max_results: usize,

    #[serde(default = "default_max_content_length")]
    pub max_content_length: usize,

    /// Deadline for a whole query; synthesis falls back once it passes
    #[serde(default = "default_query_timeout")]
    pub query_timeout_secs: u64,

    /// Retry an empty search with only the first word of the question
    #[serde(default = "default_true")]
    pub simplified_search_fallback: bool,
}

fn default_language() -> String {
    DEFAULT_LANGUAGE.to_string()
}

fn default_max_results() -> usize {
    DEFAULT_MAX_RESULTS
}

fn default_max_content_length() -> usize {
    DEFAULT_MAX_CONTENT_LENGTH
}

fn default_query_timeout() -> u64 {
    60
}

fn default_true() -> bool {
    true
}

impl Default for ResearchConfig {
    fn default() -> Self {
        Self {
            language: default_language(),
            max_results: default_max_results(),
            max_content_length: default_max_content_length(),
            query_timeout_secs: default_query_timeout(),
            simplified_search_fallback: true,
        }
    }
}

// ============= Logging Configuration =============

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter directive when `RUST_LOG` is unset
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default)]
    pub format: LogFormat,
}

fn default_log_level() -> String {
    "wikiresearch=info,warn".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

// ============= Configuration Loading & Validation =============

impl ResearcherConfig {
    /// Load configuration from a TOML file
    ///
    /// An explicitly requested file must exist. Without one,
    /// [`DEFAULT_CONFIG_FILE`] is used when present and defaults otherwise.
    /// Environment overrides are applied before validation.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => {
                if !path.exists() {
                    return Err(ConfigError::FileNotFound(path.to_path_buf()));
                }
                Self::from_toml(&fs::read_to_string(path)?)?
            }
            None => {
                let default_path = Path::new(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    Self::from_toml(&fs::read_to_string(default_path)?)?
                } else {
                    Self::default()
                }
            }
        };

        config.apply_overrides(|name| std::env::var(name).ok())?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Apply `WIKIPEDIA_LANGUAGE`, `MAX_SEARCH_RESULTS` and `MAX_CONTENT_LENGTH`
    /// as resolved by `lookup`.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(language) = lookup("WIKIPEDIA_LANGUAGE") {
            self.research.language = language.trim().to_string();
        }
        if let Some(value) = lookup("MAX_SEARCH_RESULTS") {
            self.research.max_results = parse_override("MAX_SEARCH_RESULTS", &value)?;
        }
        if let Some(value) = lookup("MAX_CONTENT_LENGTH") {
            self.research.max_content_length = parse_override("MAX_CONTENT_LENGTH", &value)?;
        }
        Ok(())
    }

    /// Validate ranges and internal consistency
    pub fn validate(&self) -> Result<(), ConfigError> {
        let research = &self.research;
        if !(MIN_MAX_RESULTS..=MAX_MAX_RESULTS).contains(&research.max_results) {
            return Err(ConfigError::ValidationError(format!(
                "research.max_results must be between {} and {}, got {}",
                MIN_MAX_RESULTS, MAX_MAX_RESULTS, research.max_results
            )));
        }
        if !(MIN_CONTENT_LENGTH..=MAX_CONTENT_LENGTH).contains(&research.max_content_length) {
            return Err(ConfigError::ValidationError(format!(
                "research.max_content_length must be between {} and {}, got {}",
                MIN_CONTENT_LENGTH, MAX_CONTENT_LENGTH, research.max_content_length
            )));
        }
        if !is_valid_language_code(&research.language) {
            return Err(ConfigError::ValidationError(format!(
                "research.language '{}' is not a valid Wikipedia language code",
                research.language
            )));
        }
        if research.query_timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "research.query_timeout_secs must be greater than 0".to_string(),
            ));
        }
        if self.wikipedia.request_timeout_secs == 0 || self.llm.request_timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "request timeouts must be greater than 0".to_string(),
            ));
        }

        let retry = &self.llm.retry;
        if retry.max_attempts == 0 {
            return Err(ConfigError::ValidationError(
                "llm.retry.max_attempts must be at least 1".to_string(),
            ));
        }
        if retry.base_delay_ms > retry.max_delay_ms {
            return Err(ConfigError::ValidationError(format!(
                "llm.retry.base_delay_ms ({}) exceeds llm.retry.max_delay_ms ({})",
                retry.base_delay_ms, retry.max_delay_ms
            )));
        }
        if !(0.0..=2.0).contains(&self.llm.temperature) {
            return Err(ConfigError::ValidationError(format!(
                "llm.temperature must be between 0.0 and 2.0, got {}",
                self.llm.temperature
            )));
        }
        if self.llm.max_prompt_chars < MIN_CONTENT_LENGTH {
            return Err(ConfigError::ValidationError(format!(
                "llm.max_prompt_chars must be at least {}",
                MIN_CONTENT_LENGTH
            )));
        }
        Ok(())
    }

    /// Resolve the configured provider, reading its secret from the environment
    pub fn provider(&self) -> Result<Provider, ConfigError> {
        self.provider_with(|name| std::env::var(name).ok())
    }

    pub fn provider_with<F>(&self, lookup: F) -> Result<Provider, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        match &self.llm.provider {
            ProviderConfig::OpenAI {
                api_key_env,
                api_base,
                model,
            } => {
                let api_key = lookup(api_key_env)
                    .filter(|key| !key.trim().is_empty())
                    .ok_or_else(|| ConfigError::MissingEnvVar(api_key_env.clone()))?;
                Ok(Provider::OpenAI {
                    api_key,
                    api_base: api_base.clone(),
                    model: model.clone(),
                })
            }
            ProviderConfig::Ollama { base_url, model } => Ok(Provider::Ollama {
                base_url: base_url.clone(),
                model: model.clone(),
            }),
        }
    }

    pub fn research_options(&self) -> ResearchOptions {
        ResearchOptions {
            language: self.research.language.clone(),
            max_results: self.research.max_results,
            max_content_length: self.research.max_content_length,
        }
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.llm.retry.max_attempts,
            base_delay: Duration::from_millis(self.llm.retry.base_delay_ms),
            max_delay: Duration::from_millis(self.llm.retry.max_delay_ms),
        }
    }

    pub fn generation_settings(&self) -> GenerationSettings {
        GenerationSettings {
            temperature: self.llm.temperature as f32,
            max_tokens: self.llm.max_tokens,
            request_timeout: Duration::from_secs(self.llm.request_timeout_secs),
        }
    }

    pub fn query_timeout(&self) -> Duration {
        Duration::from_secs(self.research.query_timeout_secs)
    }

    pub fn orchestrator_config(&self) -> OrchestratorConfig {
        OrchestratorConfig {
            query_timeout: self.query_timeout(),
            simplified_search_fallback: self.research.simplified_search_fallback,
        }
    }

    /// Render the effective configuration as TOML
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ValidationError(e.to_string()))
    }
}

fn parse_override(name: &str, value: &str) -> Result<usize, ConfigError> {
    value.trim().parse().map_err(|_| {
        ConfigError::ValidationError(format!("{} must be a positive integer, got '{}'", name, value))
    })
}
