//! Error types for Freshwire.
//!
//! Library crates use [`FreshwireError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.
//!
//! Every fetch/extract/dedup failure is per-URL and non-fatal to a batch:
//! the pipeline collects these into diagnostics instead of propagating them.
//! Only configuration errors abort a run before any fetch is dispatched.

use std::path::PathBuf;

/// Top-level error type for all Freshwire operations.
#[derive(Debug, thiserror::Error)]
pub enum FreshwireError {
    /// Configuration loading or validation error. The only fatal class.
    #[error("config error: {message}")]
    Config { message: String },

    /// Response content-type is not in the accepted set. Never retried.
    #[error("unsupported content type: {content_type}")]
    UnsupportedContentType { content_type: String },

    /// Declared content-length exceeds the configured maximum. Never retried.
    #[error("content too large: {declared} bytes (max {limit})")]
    ContentTooLarge { declared: u64, limit: u64 },

    /// All retry attempts failed; carries the last underlying error.
    #[error("fetch failed after {attempts} attempts: {last_error}")]
    FetchExhausted { attempts: u32, last_error: String },

    /// No extraction tier produced usable text.
    #[error("extraction failed: {message}")]
    ExtractionFailed { message: String },

    /// Feed could not be parsed beyond lenient recovery.
    #[error("feed parse failed: {0}")]
    FeedParseFailed(String),

    /// The dedup store could not answer; the URL fails rather than guessing.
    #[error("content store unavailable: {0}")]
    StoreUnavailable(String),

    /// robots.txt disallows fetching this URL for our user agent.
    #[error("disallowed by robots.txt: {url}")]
    RobotsDisallowed { url: String },

    /// Network/HTTP error on a single attempt (retried by the fetcher).
    #[error("network error: {0}")]
    Network(String),

    /// Database or storage layer error outside a dedup decision.
    #[error("storage error: {0}")]
    Storage(String),

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, FreshwireError>;

impl FreshwireError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create an extraction error from any displayable message.
    pub fn extraction(msg: impl Into<String>) -> Self {
        Self::ExtractionFailed {
            message: msg.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Short stable name of the error kind, for diagnostics and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Config { .. } => "config",
            Self::UnsupportedContentType { .. } => "unsupported_content_type",
            Self::ContentTooLarge { .. } => "content_too_large",
            Self::FetchExhausted { .. } => "fetch_exhausted",
            Self::ExtractionFailed { .. } => "extraction_failed",
            Self::FeedParseFailed(_) => "feed_parse_failed",
            Self::StoreUnavailable(_) => "store_unavailable",
            Self::RobotsDisallowed { .. } => "robots_disallowed",
            Self::Network(_) => "network",
            Self::Storage(_) => "storage",
            Self::Io { .. } => "io",
        }
    }
}
