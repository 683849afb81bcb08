//! Wikipedia client built on the MediaWiki Action API
//!
//! Search uses `list=search`; page retrieval uses the TextExtracts plain-text
//! extract together with `info` (canonical URL) and `pageprops` (to detect
//! disambiguation pages). Redirects are followed, so the returned article
//! identifier is the resolved page title.

use crate::content::truncate_text;
use crate::types::{Article, FetchError, SearchError, SourceCandidate};
use crate::wiki::ContentFetcher;
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

/// Endpoint template; `{lang}` is replaced with the language edition.
pub const DEFAULT_ENDPOINT: &str = "https://{lang}.wikipedia.org/w/api.php";

/// Article summaries are capped at this many characters.
pub const SUMMARY_MAX_CHARS: usize = 500;

const USER_AGENT: &str = concat!(
    "wikiresearch/",
    env!("CARGO_PKG_VERSION"),
    " (https://github.com/dirmacs/wikiresearch)"
);

/// MediaWiki-backed [`ContentFetcher`].
#[derive(Debug, Clone)]
pub struct WikipediaClient {
    http: reqwest::Client,
    endpoint_template: String,
}

impl WikipediaClient {
    pub fn new(endpoint_template: impl Into<String>, timeout: Duration) -> reqwest::Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            http,
            endpoint_template: endpoint_template.into(),
        })
    }

    /// Resolve the API endpoint for a language edition.
    pub fn endpoint(&self, language: &str) -> String {
        self.endpoint_template.replace("{lang}", language)
    }
}

// ============= Wire Types =============

#[derive(Debug, Deserialize)]
struct ApiError {
    code: String,
    #[serde(default)]
    info: String,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    query: Option<SearchQuery>,
    #[serde(default)]
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct SearchQuery {
    #[serde(default)]
    search: Vec<SearchHit>,
}

#[derive(Debug, Deserialize)]
struct SearchHit {
    title: String,
}

#[derive(Debug, Deserialize)]
struct PageResponse {
    #[serde(default)]
    query: Option<PageQuery>,
    #[serde(default)]
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct PageQuery {
    #[serde(default)]
    pages: Vec<Page>,
}

#[derive(Debug, Deserialize)]
struct Page {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    missing: bool,
    #[serde(default)]
    invalid: bool,
    #[serde(default)]
    extract: Option<String>,
    #[serde(default)]
    fullurl: Option<String>,
    #[serde(default)]
    pageprops: Option<PageProps>,
}

#[derive(Debug, Deserialize)]
struct PageProps {
    #[serde(default)]
    disambiguation: Option<serde_json::Value>,
}

impl Page {
    fn into_article(self, requested: &str, language: &str) -> Article {
        if self.missing || self.invalid {
            return Article::not_found(requested);
        }

        let title = self.title.unwrap_or_else(|| requested.to_string());
        let url = self
            .fullurl
            .unwrap_or_else(|| fallback_url(language, &title));
        let extract = self.extract.unwrap_or_default();
        let summary = summarize(&extract);

        let is_disambiguation = self
            .pageprops
            .map(|props| props.disambiguation.is_some())
            .unwrap_or(false);

        if is_disambiguation {
            Article::disambiguation(title, url, summary)
        } else {
            Article::found(title, url, summary, extract)
        }
    }
}

fn fallback_url(language: &str, title: &str) -> String {
    format!(
        "https://{}.wikipedia.org/wiki/{}",
        language,
        title.replace(' ', "_")
    )
}

/// Lead section of a plain-text extract, capped at [`SUMMARY_MAX_CHARS`].
pub fn summarize(extract: &str) -> String {
    let lead = extract.split("\n==").next().unwrap_or_default().trim();
    truncate_text(lead, SUMMARY_MAX_CHARS).0
}

#[async_trait]
impl ContentFetcher for WikipediaClient {
    async fn search(
        &self,
        query: &str,
        language: &str,
        max_results: usize,
    ) -> Result<Vec<SourceCandidate>, SearchError> {
        let limit = max_results.to_string();
        tracing::debug!(query, language, max_results, "Searching Wikipedia");

        let response = self
            .http
            .get(self.endpoint(language))
            .query(&[
                ("action", "query"),
                ("list", "search"),
                ("srsearch", query),
                ("srlimit", limit.as_str()),
                ("srprop", ""),
                ("format", "json"),
                ("formatversion", "2"),
            ])
            .send()
            .await
            .map_err(|e| SearchError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SearchError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let payload: SearchResponse = response
            .json()
            .await
            .map_err(|e| SearchError::Parse(e.to_string()))?;

        if let Some(error) = payload.error {
            return Err(SearchError::Provider {
                code: error.code,
                info: error.info,
            });
        }

        let candidates: Vec<SourceCandidate> = payload
            .query
            .map(|q| q.search)
            .unwrap_or_default()
            .into_iter()
            .take(max_results)
            .enumerate()
            .map(|(idx, hit)| SourceCandidate::new(hit.title, idx + 1))
            .collect();

        tracing::info!(count = candidates.len(), "Found Wikipedia articles");
        Ok(candidates)
    }

    async fn fetch(&self, identifier: &str, language: &str) -> Result<Article, FetchError> {
        tracing::debug!(identifier, language, "Retrieving Wikipedia page");

        let response = self
            .http
            .get(self.endpoint(language))
            .query(&[
                ("action", "query"),
                ("prop", "extracts|info|pageprops"),
                ("explaintext", "1"),
                ("inprop", "url"),
                ("ppprop", "disambiguation"),
                ("redirects", "1"),
                ("titles", identifier),
                ("format", "json"),
                ("formatversion", "2"),
            ])
            .send()
            .await
            .map_err(|e| FetchError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FetchError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let payload: PageResponse = response
            .json()
            .await
            .map_err(|e| FetchError::Parse(e.to_string()))?;

        if let Some(error) = payload.error {
            return Err(FetchError::Provider {
                code: error.code,
                info: error.info,
            });
        }

        let article = match payload.query.and_then(|q| q.pages.into_iter().next()) {
            Some(page) => page.into_article(identifier, language),
            None => Article::not_found(identifier),
        };

        tracing::debug!(
            identifier,
            resolved = %article.identifier,
            status = %article.status,
            "Retrieved Wikipedia page"
        );
        Ok(article)
    }
}
