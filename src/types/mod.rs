use serde::{Deserialize, Serialize};
use std::fmt;

mod error;

pub use error::{ConfigError, FetchError, LlmError, ResearchError, SearchError, SynthesisError};

/// Answer text used when no article could be cited at all.
pub const NO_SOURCES_ANSWER: &str = "No sources found: I couldn't find any relevant Wikipedia \
     articles for your query. Please try rephrasing your question or using different keywords.";

/// Answer text used when a research run is cancelled before it completes.
pub const CANCELLED_ANSWER: &str = "Research was cancelled before an answer could be produced.";

// ============= Query =============

/// A user-supplied research question, trimmed and guaranteed non-empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Query(String);

impl Query {
    /// Trim the raw input and reject it if nothing is left.
    pub fn parse(raw: &str) -> Result<Self, ResearchError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ResearchError::InvalidQuery);
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First whitespace-separated word, used for the broadened retry search.
    pub fn first_word(&self) -> &str {
        self.0.split_whitespace().next().unwrap_or(&self.0)
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ============= Research Options =============

pub const DEFAULT_LANGUAGE: &str = "en";
pub const DEFAULT_MAX_RESULTS: usize = 3;
pub const MIN_MAX_RESULTS: usize = 1;
pub const MAX_MAX_RESULTS: usize = 5;
pub const DEFAULT_MAX_CONTENT_LENGTH: usize = 3000;
pub const MIN_CONTENT_LENGTH: usize = 1000;
pub const MAX_CONTENT_LENGTH: usize = 5000;

/// Per-request knobs accepted by the research pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResearchOptions {
    /// Wikipedia language edition, e.g. `en` or `de`.
    #[serde(default = "default_language")]
    pub language: String,

    /// Maximum number of articles to consult (1-5).
    #[serde(default = "default_max_results")]
    pub max_results: usize,

    /// Maximum characters of each article handed to the model (1000-5000).
    #[serde(default = "default_max_content_length")]
    pub max_content_length: usize,
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

impl Default for ResearchOptions {
    fn default() -> Self {
        Self {
            language: default_language(),
            max_results: default_max_results(),
            max_content_length: default_max_content_length(),
        }
    }
}

impl ResearchOptions {
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results;
        self
    }

    pub fn with_max_content_length(mut self, max_content_length: usize) -> Self {
        self.max_content_length = max_content_length;
        self
    }

    /// Check ranges and the language code before anything touches the network.
    pub fn validate(&self) -> Result<(), ResearchError> {
        if !(MIN_MAX_RESULTS..=MAX_MAX_RESULTS).contains(&self.max_results) {
            return Err(ResearchError::InvalidOptions(format!(
                "max_results must be between {} and {}, got {}",
                MIN_MAX_RESULTS, MAX_MAX_RESULTS, self.max_results
            )));
        }
        if !(MIN_CONTENT_LENGTH..=MAX_CONTENT_LENGTH).contains(&self.max_content_length) {
            return Err(ResearchError::InvalidOptions(format!(
                "max_content_length must be between {} and {}, got {}",
                MIN_CONTENT_LENGTH, MAX_CONTENT_LENGTH, self.max_content_length
            )));
        }
        if !is_valid_language_code(&self.language) {
            return Err(ResearchError::InvalidOptions(format!(
                "invalid Wikipedia language code '{}'",
                self.language
            )));
        }
        Ok(())
    }
}

/// Language codes end up in the API host name, so only a narrow alphabet is allowed.
pub fn is_valid_language_code(code: &str) -> bool {
    (2..=12).contains(&code.len())
        && code.chars().all(|c| c.is_ascii_lowercase() || c == '-')
        && !code.starts_with('-')
        && !code.ends_with('-')
}

// ============= Source Types =============

/// A search hit that has not been fetched yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceCandidate {
    /// Article title as reported by the search provider.
    pub identifier: String,
    /// 1-based position in the provider's relevance order.
    pub rank: usize,
}

impl SourceCandidate {
    pub fn new(identifier: impl Into<String>, rank: usize) -> Self {
        Self {
            identifier: identifier.into(),
            rank,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArticleStatus {
    /// Exact page retrieved with its full text.
    Ok,
    /// The provider has no page under this title.
    NotFound,
    /// The title is a disambiguation page listing several articles.
    Disambiguation,
    /// Retrieved, but only a shortened excerpt was given to the model.
    Truncated,
}

impl ArticleStatus {
    /// Whether an article with this status can be cited.
    pub fn is_retrieved(self) -> bool {
        matches!(self, ArticleStatus::Ok | ArticleStatus::Truncated)
    }
}

impl fmt::Display for ArticleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ArticleStatus::Ok => "ok",
            ArticleStatus::NotFound => "not_found",
            ArticleStatus::Disambiguation => "disambiguation",
            ArticleStatus::Truncated => "truncated",
        };
        f.write_str(label)
    }
}

/// A Wikipedia page as returned by the content fetcher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    pub identifier: String,
    pub url: String,
    pub summary: String,
    #[serde(skip_serializing)]
    #[serde(default)]
    pub full_text: String,
    pub status: ArticleStatus,
}

impl Article {
    pub fn found(
        identifier: impl Into<String>,
        url: impl Into<String>,
        summary: impl Into<String>,
        full_text: impl Into<String>,
    ) -> Self {
        Self {
            identifier: identifier.into(),
            url: url.into(),
            summary: summary.into(),
            full_text: full_text.into(),
            status: ArticleStatus::Ok,
        }
    }

    pub fn not_found(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            url: String::new(),
            summary: String::new(),
            full_text: String::new(),
            status: ArticleStatus::NotFound,
        }
    }

    pub fn disambiguation(
        identifier: impl Into<String>,
        url: impl Into<String>,
        summary: impl Into<String>,
    ) -> Self {
        Self {
            identifier: identifier.into(),
            url: url.into(),
            summary: summary.into(),
            full_text: String::new(),
            status: ArticleStatus::Disambiguation,
        }
    }

    /// Copy of this article carrying a different status.
    pub fn with_status(&self, status: ArticleStatus) -> Self {
        Self {
            status,
            ..self.clone()
        }
    }
}

/// Length-bounded article text ready for the model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedExcerpt {
    pub identifier: String,
    pub text: String,
}

// ============= Pipeline Types =============

/// Stages of a research run. Transitions are strictly forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineState {
    Idle,
    Searching,
    Fetching,
    Normalizing,
    Synthesizing,
    Completed,
    Aborted,
}

impl PipelineState {
    pub fn is_terminal(self) -> bool {
        matches!(self, PipelineState::Completed | PipelineState::Aborted)
    }

    /// Legal forward edges. `Aborted` is reached from `Searching` on search
    /// failure, or from any live state when the run is cancelled.
    pub fn can_transition_to(self, next: PipelineState) -> bool {
        use PipelineState::*;
        match (self, next) {
            (Idle, Searching)
            | (Searching, Fetching)
            | (Fetching, Normalizing)
            | (Normalizing, Synthesizing)
            | (Synthesizing, Completed) => true,
            (from, Aborted) => !from.is_terminal(),
            _ => false,
        }
    }
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            PipelineState::Idle => "idle",
            PipelineState::Searching => "searching",
            PipelineState::Fetching => "fetching",
            PipelineState::Normalizing => "normalizing",
            PipelineState::Synthesizing => "synthesizing",
            PipelineState::Completed => "completed",
            PipelineState::Aborted => "aborted",
        };
        f.write_str(label)
    }
}

/// The single output of a research run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResearchResult {
    pub query: String,
    pub answer: String,
    /// Cited articles in rank order.
    pub sources: Vec<Article>,
    /// Human-readable notes about degraded behaviour, in the order they happened.
    pub warnings: Vec<String>,
    pub state: PipelineState,
    /// True only when the answer was produced by the language model.
    pub synthesized: bool,
    pub duration_ms: u64,
}

impl ResearchResult {
    pub fn is_completed(&self) -> bool {
        self.state == PipelineState::Completed
    }
}
