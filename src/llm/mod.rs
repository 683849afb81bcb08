//! LLM Provider Clients and Answer Synthesis
//!
//! This module provides a unified interface for the chat-completion
//! providers used to synthesize research answers, and the synthesis client
//! that sits on top of them.
//!
//! # Architecture
//!
//! - [`LLMClient`] - The core trait that all providers implement
//! - [`Provider`] - Runtime provider selection, builds boxed clients
//! - [`SynthesisClient`] - Prompt construction and retry policy
//!
//! # Supported Providers
//!
//! - `openai` - OpenAI API and compatible endpoints
//! - `ollama` - Local Ollama server
//!
//! # Example
//!
//! ```rust,ignore
//! use wikiresearch::llm::{GenerationSettings, Provider, RetryPolicy, SynthesisClient};
//!
//! let provider = Provider::Ollama {
//!     base_url: "http://localhost:11434".to_string(),
//!     model: "llama3.2".to_string(),
//! };
//! let client = provider.create_client(GenerationSettings::default())?;
//! let synthesis = SynthesisClient::new(client, RetryPolicy::default(), 16_000);
//!
//! let answer = synthesis.synthesize(&query, &excerpts, &cancel).await?;
//! ```

/// Core LLM client trait and provider selection.
pub mod client;
/// Ollama chat API client.
pub mod ollama;
/// OpenAI-compatible chat completions client.
pub mod openai;
/// Prompt building and retrying synthesis.
pub mod synthesis;

pub use client::{GenerationSettings, LLMClient, Provider};
pub use synthesis::{RetryPolicy, RetryState, SynthesisClient};
