//! Hand-written fakes shared by the integration tests.
//!
//! [`FakeFetcher`] serves scripted search hits and pages, [`ScriptedLLM`]
//! replays a queue of completions. Both count their calls so tests can
//! assert that a stage was (or was not) reached.

#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use wikiresearch::llm::{LLMClient, RetryPolicy, SynthesisClient};
use wikiresearch::types::{Article, FetchError, LlmError, SearchError, SourceCandidate};
use wikiresearch::wiki::ContentFetcher;

enum SearchScript {
    Hits(Vec<String>),
    Fail(String),
}

enum PageScript {
    Page(Article),
    Fail(String),
}

/// Scripted [`ContentFetcher`].
///
/// Unknown queries return no hits; unknown titles are reported as missing
/// pages.
#[derive(Default)]
pub struct FakeFetcher {
    searches: HashMap<String, SearchScript>,
    pages: HashMap<String, PageScript>,
    delays: HashMap<String, Duration>,
    search_delay: Option<Duration>,
    pub search_queries: Mutex<Vec<String>>,
    pub fetched: Mutex<Vec<String>>,
    pub fetch_count: AtomicUsize,
}

impl FakeFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_search(mut self, query: &str, titles: &[&str]) -> Self {
        self.searches.insert(
            query.to_string(),
            SearchScript::Hits(titles.iter().map(|t| t.to_string()).collect()),
        );
        self
    }

    pub fn with_failing_search(mut self, query: &str, message: &str) -> Self {
        self.searches
            .insert(query.to_string(), SearchScript::Fail(message.to_string()));
        self
    }

    pub fn with_search_delay(mut self, delay: Duration) -> Self {
        self.search_delay = Some(delay);
        self
    }

    pub fn with_page(mut self, requested: &str, article: Article) -> Self {
        self.pages
            .insert(requested.to_string(), PageScript::Page(article));
        self
    }

    /// An ordinary article whose text is `text` and summary is its first line.
    pub fn with_article(self, title: &str, text: &str) -> Self {
        let summary = text.lines().next().unwrap_or_default().to_string();
        let article = Article::found(title, wiki_url(title), summary, text);
        self.with_page(title, article)
    }

    pub fn with_failing_page(mut self, requested: &str, message: &str) -> Self {
        self.pages
            .insert(requested.to_string(), PageScript::Fail(message.to_string()));
        self
    }

    pub fn with_fetch_delay(mut self, requested: &str, delay: Duration) -> Self {
        self.delays.insert(requested.to_string(), delay);
        self
    }

    pub fn searched(&self) -> Vec<String> {
        self.search_queries.lock().unwrap().clone()
    }

    pub fn fetch_calls(&self) -> usize {
        self.fetch_count.load(Ordering::SeqCst)
    }
}

pub fn wiki_url(title: &str) -> String {
    format!("https://en.wikipedia.org/wiki/{}", title.replace(' ', "_"))
}

#[async_trait]
impl ContentFetcher for FakeFetcher {
    async fn search(
        &self,
        query: &str,
        _language: &str,
        max_results: usize,
    ) -> Result<Vec<SourceCandidate>, SearchError> {
        self.search_queries.lock().unwrap().push(query.to_string());
        if let Some(delay) = self.search_delay {
            tokio::time::sleep(delay).await;
        }

        match self.searches.get(query) {
            Some(SearchScript::Hits(titles)) => Ok(titles
                .iter()
                .take(max_results)
                .enumerate()
                .map(|(i, title)| SourceCandidate::new(title.clone(), i + 1))
                .collect()),
            Some(SearchScript::Fail(message)) => Err(SearchError::Request(message.clone())),
            None => Ok(vec![]),
        }
    }

    async fn fetch(&self, identifier: &str, _language: &str) -> Result<Article, FetchError> {
        self.fetch_count.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delays.get(identifier) {
            tokio::time::sleep(*delay).await;
        }
        self.fetched.lock().unwrap().push(identifier.to_string());

        match self.pages.get(identifier) {
            Some(PageScript::Page(article)) => Ok(article.clone()),
            Some(PageScript::Fail(message)) => Err(FetchError::Request(message.clone())),
            None => Ok(Article::not_found(identifier)),
        }
    }
}

/// [`LLMClient`] that replays scripted outcomes in order.
///
/// Once the script is exhausted the last outcome repeats.
pub struct ScriptedLLM {
    script: Mutex<VecDeque<Result<String, LlmError>>>,
    last: Mutex<Option<Result<String, LlmError>>>,
    delay: Option<Duration>,
    calls: Arc<AtomicUsize>,
    prompts: Arc<Mutex<Vec<String>>>,
}

impl ScriptedLLM {
    pub fn new(script: Vec<Result<String, LlmError>>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            last: Mutex::new(None),
            delay: None,
            calls: Arc::new(AtomicUsize::new(0)),
            prompts: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn answering(answer: &str) -> Self {
        Self::new(vec![Ok(answer.to_string())])
    }

    pub fn failing(error: LlmError) -> Self {
        Self::new(vec![Err(error)])
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Shared call counter, readable after the client is boxed.
    pub fn calls(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.calls)
    }

    /// Shared log of user prompts sent to the model.
    pub fn prompts(&self) -> Arc<Mutex<Vec<String>>> {
        Arc::clone(&self.prompts)
    }
}

#[async_trait]
impl LLMClient for ScriptedLLM {
    async fn generate_with_system(&self, _system: &str, prompt: &str) -> Result<String, LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().unwrap().push(prompt.to_string());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let next = self.script.lock().unwrap().pop_front();
        let mut last = self.last.lock().unwrap();
        match next {
            Some(outcome) => {
                *last = Some(outcome.clone());
                outcome
            }
            None => last.clone().unwrap_or(Err(LlmError::EmptyResponse)),
        }
    }

    fn model_name(&self) -> &str {
        "scripted"
    }
}

/// Retry policy with millisecond delays so tests stay fast.
pub fn fast_retry() -> RetryPolicy {
    RetryPolicy {
        max_attempts: 3,
        base_delay: Duration::from_millis(1),
        max_delay: Duration::from_millis(5),
    }
}

pub fn synthesis(llm: ScriptedLLM) -> SynthesisClient {
    SynthesisClient::new(Box::new(llm), fast_retry(), 16_000)
}
