//! Research pipeline orchestration
//!
//! [`ResearchOrchestrator`] is the only entry point the presentation layer
//! needs. It moves one query through a linear state machine:
//!
//! ```text
//! Idle -> Searching -> Fetching -> Normalizing -> Synthesizing -> Completed
//!             \
//!              +-> Aborted  (search failed, nothing found, or cancelled)
//! ```
//!
//! Failures after a successful search never abort the run. A candidate that
//! cannot be fetched becomes a warning, and a failed synthesis is replaced by
//! an answer assembled from the article summaries.
//!
//! # Usage
//!
//! ```ignore
//! use wikiresearch::research::{OrchestratorConfig, ResearchOrchestrator};
//!
//! let orchestrator = ResearchOrchestrator::new(fetcher, synthesis, OrchestratorConfig::default());
//! let result = orchestrator
//!     .run_research("Who was Marie Curie?", &ResearchOptions::default(), &cancel)
//!     .await?;
//!
//! println!("{}", result.answer);
//! for source in &result.sources {
//!     println!("- {} ({})", source.identifier, source.url);
//! }
//! ```

/// The research state machine.
pub mod orchestrator;

pub use orchestrator::{dedupe_candidates, fallback_answer, OrchestratorConfig, ResearchOrchestrator};
