//! RSS and Atom parsing.
//!
//! Documents are parsed with `feed_rs` and reduced to the fields the
//! pipeline needs. Titles have HTML named entities decoded, since Spanish
//! feeds routinely ship `&eacute;` and friends. Summaries and content are
//! kept as markup and cleaned later by [`crate::text::normalize`].

use crate::models::FeedEntry;
use feed_rs::model::{Entry, Link};
use feed_rs::parser::{self, ParseFeedError};
use tracing::debug;

/// Prefer the entry's alternate link; fall back to the first one listed.
fn entry_link(links: &[Link]) -> String {
    links
        .iter()
        .find(|l| l.rel.as_deref().is_none_or(|rel| rel == "alternate"))
        .or_else(|| links.first())
        .map(|l| l.href.trim().to_string())
        .unwrap_or_default()
}

fn to_feed_entry(entry: Entry) -> FeedEntry {
    let title = entry
        .title
        .map(|t| html_escape::decode_html_entities(t.content.trim()).into_owned())
        .unwrap_or_default();
    let summary = entry
        .summary
        .map(|t| t.content.trim().to_string())
        .unwrap_or_default();
    let extended_content = entry
        .content
        .and_then(|c| c.body)
        .map(|body| body.trim().to_string())
        .filter(|body| !body.is_empty())
        .into_iter()
        .collect();

    FeedEntry {
        title,
        summary,
        link: entry_link(&entry.links),
        extended_content,
    }
}

/// Parse an RSS or Atom document into entries, in document order.
///
/// # Errors
///
/// Returns the parser error for documents that are not a recognisable feed.
pub fn parse_feed(body: &[u8]) -> Result<Vec<FeedEntry>, ParseFeedError> {
    let feed = parser::parse(body)?;
    let entries: Vec<FeedEntry> = feed.entries.into_iter().map(to_feed_entry).collect();
    debug!(count = entries.len(), "Parsed feed entries");
    Ok(entries)
}
