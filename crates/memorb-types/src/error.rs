use thiserror::Error;

use crate::llm::LlmError;

/// Errors from vector store and embedder operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("connection error: {0}")]
    Connection(String),

    #[error("query error: {0}")]
    Query(String),

    #[error("namespace not found: {0}")]
    NotFound(String),

    #[error("snapshot error: {0}")]
    Snapshot(String),

    #[error("embedding error: {0}")]
    Embedding(String),
}

/// Errors from memory operations that touch both the store and the LLM.
#[derive(Debug, Error)]
pub enum MemoryError {
    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error(transparent)]
    Llm(#[from] LlmError),
}

/// Errors from conversation scraping.
///
/// `NoScriptTag` and `InsufficientMessages` are extraction failures: the page
/// loaded but did not contain a recognisable conversation.
#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("no script tag found in page")]
    NoScriptTag,

    #[error("could not extract messages: found {found} candidate(s), need 2")]
    InsufficientMessages { found: usize },

    #[error("share page returned HTTP {status}")]
    HttpStatus { status: u16 },

    #[error("request failed: {0}")]
    Request(String),

    #[error("navigation failed: {0}")]
    Navigation(String),

    #[error("timed out after {timeout_ms}ms waiting for '{selector}'")]
    SelectorTimeout { selector: String, timeout_ms: u64 },

    #[error("browser error: {0}")]
    Browser(String),
}

impl ScrapeError {
    /// Whether the page was fetched but held no extractable conversation.
    pub fn is_extraction(&self) -> bool {
        matches!(
            self,
            ScrapeError::NoScriptTag | ScrapeError::InsufficientMessages { .. }
        )
    }

    /// Whether the rendered page never showed any role-marked element.
    pub fn is_timeout(&self) -> bool {
        matches!(self, ScrapeError::SelectorTimeout { .. })
    }
}

/// Errors from the per-tenant transcript store.
#[derive(Debug, Error)]
pub enum TranscriptError {
    #[error("User {0} not found")]
    NotFound(String),

    #[error("no conversation")]
    Empty,
}

/// Errors from turning a tenant transcript into a stored reflection.
#[derive(Debug, Error)]
pub enum EpisodicError {
    #[error(transparent)]
    Transcript(#[from] TranscriptError),

    #[error(transparent)]
    Memory(#[from] MemoryError),
}

impl From<RepositoryError> for EpisodicError {
    fn from(err: RepositoryError) -> Self {
        EpisodicError::Memory(err.into())
    }
}

impl From<LlmError> for EpisodicError {
    fn from(err: LlmError) -> Self {
        EpisodicError::Memory(err.into())
    }
}

/// Errors from loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("environment variable {0} is not set")]
    MissingEnv(&'static str),

    #[error("failed to read {path}: {message}")]
    Read { path: String, message: String },

    #[error("failed to parse {path}: {message}")]
    Parse { path: String, message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repository_error_display() {
        let err = RepositoryError::Query("bad filter".to_string());
        assert_eq!(err.to_string(), "query error: bad filter");
    }

    #[test]
    fn test_scrape_error_classes() {
        assert!(ScrapeError::NoScriptTag.is_extraction());
        assert!(ScrapeError::InsufficientMessages { found: 1 }.is_extraction());
        assert!(!ScrapeError::HttpStatus { status: 404 }.is_extraction());

        let timeout = ScrapeError::SelectorTimeout {
            selector: "[data-message-author-role]".into(),
            timeout_ms: 10_000,
        };
        assert!(timeout.is_timeout());
        assert!(!timeout.is_extraction());
        assert!(!ScrapeError::Navigation("net::ERR".into()).is_timeout());
    }

    #[test]
    fn test_transcript_error_display() {
        assert_eq!(
            TranscriptError::NotFound("alice".into()).to_string(),
            "User alice not found"
        );
        assert_eq!(TranscriptError::Empty.to_string(), "no conversation");
    }

    #[test]
    fn test_memory_error_wraps_repository() {
        let err: MemoryError = RepositoryError::Connection("refused".into()).into();
        assert_eq!(err.to_string(), "connection error: refused");
    }

    #[test]
    fn test_episodic_error_passes_through_messages() {
        let err: EpisodicError = TranscriptError::Empty.into();
        assert_eq!(err.to_string(), "no conversation");
        let err: EpisodicError = RepositoryError::Query("bad".into()).into();
        assert_eq!(err.to_string(), "query error: bad");
    }

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::MissingEnv("OPENAI_API_KEY");
        assert_eq!(err.to_string(), "environment variable OPENAI_API_KEY is not set");
    }
}
