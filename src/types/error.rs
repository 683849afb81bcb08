use std::path::PathBuf;

// ============= Error Types =============

/// Errors that stop a research run before any external service is contacted.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResearchError {
    #[error("Invalid query: the research question is empty")]
    InvalidQuery,

    #[error("Invalid research options: {0}")]
    InvalidOptions(String),
}

/// Failures of the search step. Fatal for the run that issued it.
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error("Search request failed: {0}")]
    Request(String),

    #[error("Search provider returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Search provider error '{code}': {info}")]
    Provider { code: String, info: String },

    #[error("Failed to parse search response: {0}")]
    Parse(String),
}

/// Failures fetching a single page. Never fatal for the run.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("Page request failed: {0}")]
    Request(String),

    #[error("Content provider returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Content provider error '{code}': {info}")]
    Provider { code: String, info: String },

    #[error("Failed to parse page response: {0}")]
    Parse(String),
}

/// Errors raised by a language-model provider.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LlmError {
    #[error("Rate limited by provider")]
    RateLimited { retry_after_secs: Option<u64> },

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Provider server error (HTTP {status}): {message}")]
    Server { status: u16, message: String },

    #[error("Provider connection failed: {0}")]
    Connection(String),

    #[error("Authentication failed: {0}")]
    AuthFailed(String),

    #[error("Invalid request (HTTP {status}): {message}")]
    InvalidRequest { status: u16, message: String },

    #[error("Failed to parse provider response: {0}")]
    ResponseParse(String),

    #[error("Provider returned no completion")]
    EmptyResponse,
}

impl LlmError {
    /// Rate limits, timeouts, 5xx responses and dropped connections may
    /// succeed on a later attempt; everything else will not.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            LlmError::RateLimited { .. }
                | LlmError::Timeout(_)
                | LlmError::Server { .. }
                | LlmError::Connection(_)
        )
    }

    /// Map a non-success HTTP status from a completion endpoint to an error class.
    pub fn from_status(status: u16, retry_after_secs: Option<u64>, message: String) -> Self {
        match status {
            429 => LlmError::RateLimited { retry_after_secs },
            408 | 504 => LlmError::Timeout(format!("HTTP {}: {}", status, message)),
            401 | 403 => LlmError::AuthFailed(message),
            500..=599 => LlmError::Server { status, message },
            _ => LlmError::InvalidRequest { status, message },
        }
    }

    /// Classify a transport-level reqwest failure.
    pub fn from_reqwest(error: &reqwest::Error) -> Self {
        if error.is_timeout() {
            LlmError::Timeout(error.to_string())
        } else if error.is_decode() {
            LlmError::ResponseParse(error.to_string())
        } else {
            LlmError::Connection(error.to_string())
        }
    }
}

/// Reasons the synthesis step produced no answer.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SynthesisError {
    #[error("No article content available to synthesize an answer from")]
    NoContent,

    #[error("AI synthesis failed: {0}")]
    Llm(LlmError),

    #[error("AI synthesis failed after {attempts} attempts: {last}")]
    RetriesExhausted { attempts: u32, last: LlmError },

    #[error("AI synthesis was cancelled")]
    Cancelled,
}

/// Errors that can occur during configuration loading
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read configuration file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Environment variable '{0}' referenced in config is not set")]
    MissingEnvVar(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(429, true)]
    #[case(408, true)]
    #[case(500, true)]
    #[case(502, true)]
    #[case(503, true)]
    #[case(504, true)]
    #[case(400, false)]
    #[case(401, false)]
    #[case(403, false)]
    #[case(404, false)]
    #[case(422, false)]
    fn test_status_classification(#[case] status: u16, #[case] transient: bool) {
        let error = LlmError::from_status(status, None, "boom".to_string());
        assert_eq!(error.is_transient(), transient, "status {}", status);
    }

    #[test]
    fn test_rate_limit_keeps_retry_after() {
        let error = LlmError::from_status(429, Some(7), String::new());
        assert_eq!(
            error,
            LlmError::RateLimited {
                retry_after_secs: Some(7)
            }
        );
    }

    #[test]
    fn test_auth_and_parse_errors_are_permanent() {
        assert!(!LlmError::AuthFailed("bad key".into()).is_transient());
        assert!(!LlmError::ResponseParse("junk".into()).is_transient());
        assert!(!LlmError::EmptyResponse.is_transient());
        assert!(LlmError::Connection("reset".into()).is_transient());
    }
}
