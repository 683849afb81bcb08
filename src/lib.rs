//! # wikiresearch - Wikipedia Research Assistant
//!
//! Answers free-text research questions by searching Wikipedia, reading the
//! best matching articles and asking a large language model for an answer
//! that cites them.
//!
//! ## Overview
//!
//! wikiresearch can be used in two ways:
//!
//! 1. **As a command line tool** - Run the `wikiresearch` binary
//! 2. **As a library** - Drive [`ResearchOrchestrator`] from your own code
//!
//! ## Quick Start (Library Usage)
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use tokio_util::sync::CancellationToken;
//! use wikiresearch::{
//!     GenerationSettings, OrchestratorConfig, Provider, ResearchOptions, ResearchOrchestrator,
//!     RetryPolicy, SynthesisClient, WikipediaClient,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let fetcher = Arc::new(WikipediaClient::new(
//!         "https://{lang}.wikipedia.org/w/api.php",
//!         std::time::Duration::from_secs(15),
//!     )?);
//!
//!     let provider = Provider::Ollama {
//!         base_url: "http://localhost:11434".to_string(),
//!         model: "llama3.2".to_string(),
//!     };
//!     let llm = provider.create_client(GenerationSettings::default())?;
//!     let synthesis = SynthesisClient::new(llm, RetryPolicy::default(), 16_000);
//!
//!     let orchestrator = ResearchOrchestrator::new(fetcher, synthesis, OrchestratorConfig::default());
//!     let result = orchestrator
//!         .run_research("Who was Marie Curie?", &ResearchOptions::default(), &CancellationToken::new())
//!         .await?;
//!
//!     println!("{}", result.answer);
//!     Ok(())
//! }
//! ```
//!
//! ## Modules
//!
//! - [`wiki`] - Wikipedia search and article retrieval
//! - [`content`] - Excerpt cleanup and truncation
//! - [`llm`] - LLM provider clients and answer synthesis
//! - [`research`] - The research pipeline
//! - [`types`] - Data model and error types
//! - [`utils`] - Configuration loading
//! - [`cli`] - Command line parsing, output and export

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(rustdoc::missing_crate_level_docs)]

/// Command line interface.
pub mod cli;
/// Article text normalization.
pub mod content;
/// LLM provider clients and synthesis.
pub mod llm;
/// Research pipeline orchestration.
pub mod research;
/// Core types and errors.
pub mod types;
/// Configuration utilities.
pub mod utils;
/// Wikipedia content fetching.
pub mod wiki;

// Re-export commonly used types
pub use llm::{GenerationSettings, LLMClient, Provider, RetryPolicy, SynthesisClient};
pub use research::{OrchestratorConfig, ResearchOrchestrator};
pub use types::{
    Article, ArticleStatus, PipelineState, ResearchError, ResearchOptions, ResearchResult,
};
pub use utils::ResearcherConfig;
pub use wiki::{ContentFetcher, WikipediaClient};
