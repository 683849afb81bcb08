//! Wikipedia Content Retrieval
//!
//! This module provides the content fetcher used by the research pipeline:
//! a search step that turns a question into ranked article titles and a fetch
//! step that retrieves one article per title.
//!
//! # Architecture
//!
//! - [`ContentFetcher`] - The trait the orchestrator depends on
//! - [`client::WikipediaClient`] - MediaWiki Action API implementation
//!
//! Tests substitute their own [`ContentFetcher`] to exercise the pipeline
//! without network access.
//!
//! # Page Outcomes
//!
//! A fetch resolves to an [`Article`] whose [`ArticleStatus`](crate::types::ArticleStatus)
//! is one of `Ok`, `NotFound` or `Disambiguation`. Only transport and
//! protocol failures surface as [`FetchError`].

/// MediaWiki Action API client.
pub mod client;

use crate::types::{Article, FetchError, SearchError, SourceCandidate};
use async_trait::async_trait;

pub use client::WikipediaClient;

/// Source of candidate articles and their content.
#[async_trait]
pub trait ContentFetcher: Send + Sync {
    /// Ranked candidate titles for `query`, at most `max_results` of them.
    ///
    /// No matches is an empty list, not an error.
    async fn search(
        &self,
        query: &str,
        language: &str,
        max_results: usize,
    ) -> Result<Vec<SourceCandidate>, SearchError>;

    /// Retrieve a single article by title.
    async fn fetch(&self, identifier: &str, language: &str) -> Result<Article, FetchError>;
}
