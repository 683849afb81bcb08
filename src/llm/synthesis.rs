//! Answer synthesis over retrieved article excerpts
//!
//! [`SynthesisClient`] turns a question plus rank-ordered excerpts into one
//! bounded prompt, sends it to an [`LLMClient`] and retries transient
//! provider failures with capped exponential backoff.
//!
//! The retry loop owns an explicit [`RetryState`]; both the model call and
//! the backoff sleep race the caller's cancellation token, so a cancelled
//! research run never waits out a backoff.

use crate::content::truncate_text;
use crate::llm::client::LLMClient;
use crate::types::{LlmError, NormalizedExcerpt, Query, SynthesisError};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

const SYSTEM_PROMPT: &str = "You are a knowledgeable Wikipedia research assistant. \
Answer the user's question using ONLY the Wikipedia content provided.\n\n\
Guidelines:\n\
- Give a comprehensive but concise answer\n\
- Combine information from several articles when relevant\n\
- Refer to articles by their titles when you use them\n\
- If the content is insufficient, say so plainly\n\
- Structure the answer clearly and include specific details when available";

/// Excerpts left with less room than this are dropped rather than squeezed in.
const MIN_EXCERPT_CHARS: usize = 200;

/// Backoff schedule for transient provider errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first one.
    pub max_attempts: u32,
    /// Delay before the first retry.
    pub base_delay: Duration,
    /// Upper bound for any single delay.
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(8),
        }
    }
}

/// Progress of one retry loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryState {
    /// Attempts made so far.
    pub attempt: u32,
    /// Delay to use after the next transient failure.
    pub next_delay: Duration,
}

impl RetryState {
    pub fn new(policy: &RetryPolicy) -> Self {
        Self {
            attempt: 0,
            next_delay: policy.base_delay.min(policy.max_delay),
        }
    }

    /// Whether another attempt is allowed after the current one failed.
    pub fn can_retry(&self, policy: &RetryPolicy) -> bool {
        self.attempt < policy.max_attempts
    }

    /// Consume the scheduled delay and double the next one.
    ///
    /// A provider `Retry-After` longer than the schedule wins, but the
    /// policy cap still applies.
    pub fn backoff(&mut self, policy: &RetryPolicy, retry_after: Option<Duration>) -> Duration {
        let scheduled = self.next_delay;
        self.next_delay = self.next_delay.saturating_mul(2).min(policy.max_delay);
        retry_after
            .map_or(scheduled, |hint| hint.max(scheduled))
            .min(policy.max_delay)
    }
}

fn retry_after_hint(error: &LlmError) -> Option<Duration> {
    match error {
        LlmError::RateLimited {
            retry_after_secs: Some(secs),
        } => Some(Duration::from_secs(*secs)),
        _ => None,
    }
}

/// Prompt construction plus retrying model invocation.
pub struct SynthesisClient {
    llm: Box<dyn LLMClient>,
    retry: RetryPolicy,
    max_prompt_chars: usize,
}

impl SynthesisClient {
    pub fn new(llm: Box<dyn LLMClient>, retry: RetryPolicy, max_prompt_chars: usize) -> Self {
        Self {
            llm,
            retry,
            max_prompt_chars,
        }
    }

    pub fn model_name(&self) -> &str {
        self.llm.model_name()
    }

    /// Answer `query` from `excerpts`, which must already be in rank order.
    ///
    /// Fails with [`SynthesisError::NoContent`] without calling the model when
    /// there is nothing to synthesize from.
    pub async fn synthesize(
        &self,
        query: &Query,
        excerpts: &[NormalizedExcerpt],
        cancel: &CancellationToken,
    ) -> Result<String, SynthesisError> {
        if excerpts.is_empty() {
            return Err(SynthesisError::NoContent);
        }

        let prompt = self.build_prompt(query, excerpts);
        let mut state = RetryState::new(&self.retry);

        loop {
            state.attempt += 1;
            debug!(attempt = state.attempt, prompt_chars = prompt.len(), "Requesting synthesis");

            let outcome = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(SynthesisError::Cancelled),
                result = self.llm.generate_with_system(SYSTEM_PROMPT, &prompt) => result,
            };

            let error = match outcome {
                Ok(answer) if !answer.trim().is_empty() => {
                    info!(attempts = state.attempt, "Synthesis succeeded");
                    return Ok(answer.trim().to_string());
                }
                Ok(_) => LlmError::EmptyResponse,
                Err(error) => error,
            };

            if !error.is_transient() {
                return Err(SynthesisError::Llm(error));
            }
            if !state.can_retry(&self.retry) {
                return Err(SynthesisError::RetriesExhausted {
                    attempts: state.attempt,
                    last: error,
                });
            }

            let wait = state.backoff(&self.retry, retry_after_hint(&error));
            warn!(
                attempt = state.attempt,
                max_attempts = self.retry.max_attempts,
                backoff_ms = wait.as_millis() as u64,
                error = %error,
                "Retrying after transient error"
            );

            tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(SynthesisError::Cancelled),
                _ = tokio::time::sleep(wait) => {}
            }
        }
    }

    /// Question plus `**Title**:` excerpt blocks, with the context block
    /// bounded by `max_prompt_chars`.
    pub fn build_prompt(&self, query: &Query, excerpts: &[NormalizedExcerpt]) -> String {
        let mut blocks = Vec::with_capacity(excerpts.len());
        let mut remaining = self.max_prompt_chars;

        for excerpt in excerpts {
            let header = format!("**{}**:\n", excerpt.identifier);
            let header_len = header.chars().count();
            // Two characters for the blank line separating blocks.
            let overhead = header_len + if blocks.is_empty() { 0 } else { 2 };
            if remaining < overhead + MIN_EXCERPT_CHARS {
                break;
            }

            let budget = remaining - overhead;
            let (text, _) = truncate_text(&excerpt.text, budget);
            remaining -= overhead + text.chars().count();
            blocks.push(format!("{}{}", header, text));
        }

        format!(
            "User Question: {}\n\nWikipedia Content:\n{}\n\nPlease provide a detailed answer based on the above information:",
            query,
            blocks.join("\n\n")
        )
    }
}
