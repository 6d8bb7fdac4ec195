//! Core domain types for the Freshwire retrieval pipeline.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::FreshwireError;

// ---------------------------------------------------------------------------
// ContentKind
// ---------------------------------------------------------------------------

/// What a fetched response contains, decided once from the content-type
/// header at classification time. Each downstream stage handles exactly one
/// variant; unsupported types never produce an outcome at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    /// An HTML (or plain-text) page.
    Html,
    /// An RSS/Atom syndication feed.
    Feed,
}

// ---------------------------------------------------------------------------
// FetchOutcome
// ---------------------------------------------------------------------------

/// A successful fetch: raw body plus response metadata.
///
/// Created per attempt and discarded after being folded into a
/// [`ProcessedItem`]; never persisted.
#[derive(Debug, Clone)]
pub struct FetchOutcome {
    /// The URL that was fetched.
    pub url: String,
    /// HTTP status code.
    pub status: u16,
    /// Response body as text.
    pub body: String,
    /// Classification from the content-type header.
    pub kind: ContentKind,
    /// When the response was received.
    pub fetched_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// ProcessedItem
// ---------------------------------------------------------------------------

/// URL-derived metadata plus page byline/date/keyword extraction.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ItemMetadata {
    /// Host of the source URL.
    pub domain: String,
    /// Path of the source URL.
    pub path: String,
    /// Author from meta tags or byline elements, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    /// Publish date as found in the page (raw string, not normalized).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_date: Option<String>,
    /// Keywords from the `keywords` meta tag.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub keywords: Vec<String>,
}

/// The unit returned to the caller and handed to downstream collaborators.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessedItem {
    /// Source URL (the entry link for feed-derived items).
    pub url: String,
    /// Extracted title.
    pub title: String,
    /// Extracted description.
    pub description: String,
    /// Cleaned main-text body.
    pub cleaned_text: String,
    /// SHA-256 hex digest of `cleaned_text` only — cosmetic markup changes
    /// never alter the hash.
    pub content_hash: String,
    /// Whitespace-split word count of the cleaned text.
    pub word_count: usize,
    /// Page metadata.
    pub metadata: ItemMetadata,
    /// Whether the store had not seen this (url, hash) pair.
    pub is_new: bool,
    /// Feed URL this item originated from, when it came from a feed entry.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_feed_url: Option<String>,
    /// When the item was produced.
    pub timestamp: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Feed types
// ---------------------------------------------------------------------------

/// A single entry from a syndication feed. All fields default to empty
/// strings — never null. Ephemeral, produced only while processing a feed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FeedEntry {
    pub title: String,
    pub link: String,
    pub description: String,
    pub summary: String,
    /// Publish timestamp as a raw string (RFC 3339 when the feed had one).
    pub published: String,
}

/// Parsed feed metadata and its bounded entry list.
#[derive(Debug, Clone, Default)]
pub struct ParsedFeed {
    pub title: String,
    pub description: String,
    pub entries: Vec<FeedEntry>,
}

// ---------------------------------------------------------------------------
// Batch results
// ---------------------------------------------------------------------------

/// Per-URL failure diagnostic, surfaced alongside successful items.
#[derive(Debug)]
pub struct FetchFailure {
    /// The URL that failed.
    pub url: String,
    /// What went wrong.
    pub error: FreshwireError,
}

/// Result of a batch retrieval: items in completion order plus a parallel
/// diagnostics list. Zero successes is a valid (empty) result, not an error.
#[derive(Debug, Default)]
pub struct BatchOutcome {
    pub items: Vec<ProcessedItem>,
    pub failures: Vec<FetchFailure>,
}
