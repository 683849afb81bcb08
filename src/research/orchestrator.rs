use crate::content::normalize_with_outcome;
use crate::llm::SynthesisClient;
use crate::types::{
    Article, ArticleStatus, FetchError, NormalizedExcerpt, PipelineState, Query, ResearchError,
    ResearchOptions, ResearchResult, SearchError, SourceCandidate, SynthesisError,
    CANCELLED_ANSWER, NO_SOURCES_ANSWER,
};
use crate::wiki::ContentFetcher;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, info_span, warn, Instrument, Span};
use uuid::Uuid;

const FALLBACK_HEADER: &str =
    "AI synthesis was unavailable, so here are summaries of the retrieved articles:";

/// Behaviour switches for a research run that are not per-query options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrchestratorConfig {
    /// Deadline for a whole run, measured from its start.
    pub query_timeout: Duration,
    /// Search again with the first word of the query when nothing matched.
    pub simplified_search_fallback: bool,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            query_timeout: Duration::from_secs(60),
            simplified_search_fallback: true,
        }
    }
}

/// Drives one query through search, fetch, normalize and synthesis.
pub struct ResearchOrchestrator {
    fetcher: Arc<dyn ContentFetcher>,
    synthesis: SynthesisClient,
    config: OrchestratorConfig,
}

type FetchOutcome = (SourceCandidate, Option<Result<Article, FetchError>>);

impl ResearchOrchestrator {
    pub fn new(
        fetcher: Arc<dyn ContentFetcher>,
        synthesis: SynthesisClient,
        config: OrchestratorConfig,
    ) -> Self {
        Self {
            fetcher,
            synthesis,
            config,
        }
    }

    /// Run the full pipeline for `query`.
    ///
    /// Only invalid input is an error, and it is reported before any network
    /// call. Every later failure is folded into the result as a warning.
    pub async fn run_research(
        &self,
        query: &str,
        options: &ResearchOptions,
        cancel: &CancellationToken,
    ) -> Result<ResearchResult, ResearchError> {
        let query = Query::parse(query)?;
        options.validate()?;

        let run_id = Uuid::new_v4();
        let span = info_span!("research", %run_id, query = %query, language = %options.language);
        Ok(self.execute(query, options, cancel).instrument(span).await)
    }

    async fn execute(
        &self,
        query: Query,
        options: &ResearchOptions,
        cancel: &CancellationToken,
    ) -> ResearchResult {
        let deadline = tokio::time::Instant::now() + self.config.query_timeout;
        let mut run = Run::new(query);

        // Searching
        run.advance(PipelineState::Searching);
        let searched = tokio::select! {
            biased;
            _ = cancel.cancelled() => return run.cancelled(),
            searched = self.search_candidates(&run.query, options) => searched,
        };
        let candidates = match searched {
            Ok(candidates) if !candidates.is_empty() => candidates,
            Ok(_) => {
                info!("Search returned no candidates");
                return run.aborted(NO_SOURCES_ANSWER);
            }
            Err(e) => {
                run.warn(format!("Wikipedia search failed: {}", e));
                return run.aborted(NO_SOURCES_ANSWER);
            }
        };
        info!(candidates = candidates.len(), "Search complete");

        // Fetching
        run.advance(PipelineState::Fetching);
        let fetched = tokio::select! {
            biased;
            _ = cancel.cancelled() => return run.cancelled(),
            fetched = self.fetch_all(candidates, &options.language) => fetched,
        };
        let articles = collect_articles(fetched, &mut run);
        info!(articles = articles.len(), "Fetch complete");

        // Normalizing
        run.advance(PipelineState::Normalizing);
        if cancel.is_cancelled() {
            return run.cancelled();
        }
        let (sources, excerpts) = normalize_articles(articles, options.max_content_length);

        // Synthesizing
        run.advance(PipelineState::Synthesizing);
        let synthesis = tokio::time::timeout_at(
            deadline,
            self.synthesis.synthesize(&run.query, &excerpts, cancel),
        )
        .await;

        let (answer, synthesized) = match synthesis {
            Ok(Ok(answer)) => (answer, true),
            Ok(Err(SynthesisError::Cancelled)) => return run.cancelled(),
            Ok(Err(SynthesisError::NoContent)) if sources.is_empty() => {
                (fallback_answer(&sources), false)
            }
            Ok(Err(e)) => {
                run.warn(format!("{}; showing article summaries instead", e));
                (fallback_answer(&sources), false)
            }
            Err(_) => {
                run.warn(format!(
                    "AI synthesis did not finish within {:?}; showing article summaries instead",
                    self.config.query_timeout
                ));
                (fallback_answer(&sources), false)
            }
        };

        run.completed(answer, sources, synthesized)
    }

    async fn search_candidates(
        &self,
        query: &Query,
        options: &ResearchOptions,
    ) -> Result<Vec<SourceCandidate>, SearchError> {
        let mut candidates = self
            .fetcher
            .search(query.as_str(), &options.language, options.max_results)
            .await?;

        let simplified = query.first_word();
        if candidates.is_empty()
            && self.config.simplified_search_fallback
            && simplified != query.as_str()
        {
            info!(simplified, "No results, retrying with simplified query");
            candidates = self
                .fetcher
                .search(simplified, &options.language, options.max_results)
                .await?;
        }

        Ok(dedupe_candidates(candidates, options.max_results))
    }

    /// Fetch every candidate concurrently, returning outcomes in rank order.
    ///
    /// A slot is `None` when its task died before reporting. Dropping the
    /// returned future aborts every outstanding fetch.
    async fn fetch_all(&self, candidates: Vec<SourceCandidate>, language: &str) -> Vec<FetchOutcome> {
        let mut set = JoinSet::new();
        for (index, candidate) in candidates.iter().cloned().enumerate() {
            let fetcher = Arc::clone(&self.fetcher);
            let language = language.to_string();
            set.spawn(
                async move {
                    let outcome = fetcher.fetch(&candidate.identifier, &language).await;
                    (index, outcome)
                }
                .instrument(Span::current()),
            );
        }

        let mut slots: Vec<FetchOutcome> = candidates.into_iter().map(|c| (c, None)).collect();
        while let Some(joined) = set.join_next().await {
            match joined {
                Ok((index, outcome)) => slots[index].1 = Some(outcome),
                Err(e) => warn!(error = %e, "Fetch task failed"),
            }
        }
        slots
    }
}

/// Drop repeated identifiers, keeping the best-ranked occurrence, then cap.
pub fn dedupe_candidates(candidates: Vec<SourceCandidate>, max_results: usize) -> Vec<SourceCandidate> {
    let mut seen = HashSet::new();
    candidates
        .into_iter()
        .filter(|candidate| seen.insert(candidate.identifier.clone()))
        .take(max_results)
        .collect()
}

/// Answer built from article summaries when the model cannot be used.
pub fn fallback_answer(sources: &[Article]) -> String {
    if sources.is_empty() {
        return NO_SOURCES_ANSWER.to_string();
    }

    let mut answer = String::from(FALLBACK_HEADER);
    for article in sources {
        let summary = if article.summary.trim().is_empty() {
            "(no summary available)"
        } else {
            article.summary.trim()
        };
        answer.push_str(&format!("\n\n**{}**: {}", article.identifier, summary));
    }
    answer
}

fn collect_articles(fetched: Vec<FetchOutcome>, run: &mut Run) -> Vec<Article> {
    let mut cited = HashSet::new();
    let mut articles = Vec::new();

    for (candidate, outcome) in fetched {
        let requested = &candidate.identifier;
        match outcome {
            None => run.warn(format!("Retrieval of '{}' was interrupted", requested)),
            Some(Err(e)) => run.warn(format!("Failed to retrieve '{}': {}", requested, e)),
            Some(Ok(article)) if article.status.is_retrieved() => {
                if cited.insert(article.identifier.clone()) {
                    articles.push(article);
                } else {
                    run.warn(format!(
                        "'{}' resolves to '{}', which is already cited",
                        requested, article.identifier
                    ));
                }
            }
            Some(Ok(article)) if article.status == ArticleStatus::Disambiguation => run.warn(
                format!("'{}' is a disambiguation page and was skipped", requested),
            ),
            Some(Ok(_)) => run.warn(format!("No Wikipedia article found for '{}'", requested)),
        }
    }
    articles
}

fn normalize_articles(
    articles: Vec<Article>,
    max_content_length: usize,
) -> (Vec<Article>, Vec<NormalizedExcerpt>) {
    articles
        .into_iter()
        .map(|article| {
            let (excerpt, truncated) = normalize_with_outcome(&article, max_content_length);
            let article = if truncated {
                debug!(article = %article.identifier, "Excerpt truncated");
                article.with_status(ArticleStatus::Truncated)
            } else {
                article
            };
            (article, excerpt)
        })
        .unzip()
}

/// Mutable bookkeeping for a single run.
struct Run {
    query: Query,
    state: PipelineState,
    warnings: Vec<String>,
    started: Instant,
}

impl Run {
    fn new(query: Query) -> Self {
        Self {
            query,
            state: PipelineState::Idle,
            warnings: Vec::new(),
            started: Instant::now(),
        }
    }

    fn advance(&mut self, next: PipelineState) {
        debug_assert!(
            self.state.can_transition_to(next),
            "illegal pipeline transition {} -> {}",
            self.state,
            next
        );
        debug!(from = %self.state, to = %next, "Pipeline transition");
        self.state = next;
    }

    fn warn(&mut self, message: String) {
        warn!(warning = %message, "Research degraded");
        self.warnings.push(message);
    }

    fn cancelled(mut self) -> ResearchResult {
        info!(state = %self.state, "Research cancelled");
        self.warnings.push("Research cancelled".to_string());
        self.aborted(CANCELLED_ANSWER)
    }

    fn aborted(self, answer: &str) -> ResearchResult {
        self.finish(PipelineState::Aborted, answer.to_string(), Vec::new(), false)
    }

    fn completed(self, answer: String, sources: Vec<Article>, synthesized: bool) -> ResearchResult {
        self.finish(PipelineState::Completed, answer, sources, synthesized)
    }

    fn finish(
        mut self,
        terminal: PipelineState,
        answer: String,
        sources: Vec<Article>,
        synthesized: bool,
    ) -> ResearchResult {
        self.advance(terminal);
        let duration_ms = self.started.elapsed().as_millis() as u64;
        info!(
            state = %terminal,
            sources = sources.len(),
            warnings = self.warnings.len(),
            synthesized,
            duration_ms,
            "Research finished"
        );
        ResearchResult {
            query: self.query.as_str().to_string(),
            answer,
            sources,
            warnings: self.warnings,
            state: terminal,
            synthesized,
            duration_ms,
        }
    }
}
