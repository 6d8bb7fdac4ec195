//! RSS/Atom feed parsing.
//!
//! Parsing is intentionally lenient: feeds in the wild are frequently
//! malformed, and a partially-parseable feed is accepted with a warning
//! rather than rejected. Only input that cannot be recognized as a feed at
//! all produces [`FreshwireError::FeedParseFailed`].

use feed_rs::parser;
use tracing::warn;

use freshwire_shared::{FeedEntry, FreshwireError, ParsedFeed, Result};

/// Parse feed bytes into metadata and a bounded entry list.
///
/// Entries beyond `max_entries` are dropped (feeds list newest first, so
/// this keeps the most recent). Missing fields become empty strings, never
/// null; `published` is rendered as RFC 3339 when the feed carried a date.
pub fn parse_feed(bytes: &[u8], max_entries: usize) -> Result<ParsedFeed> {
    let feed = parser::parse(bytes).map_err(|e| FreshwireError::FeedParseFailed(e.to_string()))?;

    let title = feed.title.map(|t| t.content).unwrap_or_default();
    let description = feed.description.map(|d| d.content).unwrap_or_default();

    let total = feed.entries.len();
    if total > max_entries {
        warn!(total, max_entries, "feed has more entries than the cap, truncating");
    }

    let entries = feed
        .entries
        .into_iter()
        .take(max_entries)
        .map(|entry| FeedEntry {
            title: entry.title.map(|t| t.content).unwrap_or_default(),
            link: entry
                .links
                .first()
                .map(|l| l.href.clone())
                .unwrap_or_default(),
            description: entry
                .summary
                .as_ref()
                .map(|s| s.content.clone())
                .unwrap_or_default(),
            summary: entry.summary.map(|s| s.content).unwrap_or_default(),
            published: entry
                .published
                .map(|d| d.to_rfc3339())
                .unwrap_or_default(),
        })
        .collect();

    Ok(ParsedFeed {
        title,
        description,
        entries,
    })
}
