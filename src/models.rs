//! Data models for feed entries, article drafts, and the published index.
//!
//! This module defines the transient structures that flow through one run:
//! - [`FeedEntry`]: One parsed item from an RSS or Atom feed
//! - [`ArticleDraft`]: An entry after cleanup and optional rewriting, ready to render
//! - [`Placement`]: Where an article lives (section and category)
//!
//! None of these outlive a single invocation. The index accumulator lives in
//! [`crate::outputs::indexes`].

use serde::{Deserialize, Serialize};

/// Title used when a feed entry carries none.
pub const UNTITLED: &str = "Sin título";

/// A single syndicated item as read from a feed.
///
/// Entries are produced in feed-document order and are never mutated after
/// parsing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedEntry {
    /// The entry headline.
    pub title: String,
    /// The `description` (RSS) or `summary` (Atom), possibly full of markup.
    pub summary: String,
    /// Link to the original story.
    pub link: String,
    /// `content:encoded` (RSS) or `content` (Atom) blocks, in document order.
    pub extended_content: Vec<String>,
}

impl FeedEntry {
    /// The text a body should be built from.
    ///
    /// Falls back to the first extended content block when the summary is
    /// blank.
    pub fn body_source(&self) -> &str {
        if !self.summary.trim().is_empty() {
            return &self.summary;
        }
        self.extended_content
            .iter()
            .find(|block| !block.trim().is_empty())
            .map(String::as_str)
            .unwrap_or("")
    }

    /// The entry title, or [`UNTITLED`] if it is blank.
    pub fn display_title(&self) -> &str {
        let title = self.title.trim();
        if title.is_empty() { UNTITLED } else { title }
    }
}

/// Section and category an article is filed under.
///
/// Both are used verbatim as directory names and as keys in the index.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Placement {
    pub section: String,
    pub category: String,
}

impl Placement {
    pub fn new(section: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            section: section.into(),
            category: category.into(),
        }
    }
}

/// An article ready to be rendered.
///
/// `body_text` is never empty: every enrichment failure falls back to the
/// normalized original summary.
#[derive(Debug, Clone)]
pub struct ArticleDraft {
    pub placement: Placement,
    pub title: String,
    /// Body text; embedded newlines separate paragraphs.
    pub body_text: String,
    pub source_link: String,
    /// Site-relative path of a generated illustration, e.g. `noticias/humor/images/x.png`.
    pub image_path: Option<String>,
}

impl ArticleDraft {
    /// Split the body on newlines into non-empty, trimmed paragraphs.
    pub fn paragraphs(&self) -> Vec<&str> {
        self.body_text
            .split('\n')
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(body: &str) -> ArticleDraft {
        ArticleDraft {
            placement: Placement::new("espana", "politica"),
            title: "Titular".to_string(),
            body_text: body.to_string(),
            source_link: "https://example.com/a".to_string(),
            image_path: None,
        }
    }

    #[test]
    fn test_body_source_prefers_summary() {
        let entry = FeedEntry {
            summary: "Resumen".to_string(),
            extended_content: vec!["Contenido".to_string()],
            ..Default::default()
        };
        assert_eq!(entry.body_source(), "Resumen");
    }

    #[test]
    fn test_body_source_falls_back_to_extended_content() {
        let entry = FeedEntry {
            summary: "   ".to_string(),
            extended_content: vec!["".to_string(), "Contenido largo".to_string()],
            ..Default::default()
        };
        assert_eq!(entry.body_source(), "Contenido largo");
    }

    #[test]
    fn test_body_source_empty_when_nothing_available() {
        let entry = FeedEntry::default();
        assert_eq!(entry.body_source(), "");
    }

    #[test]
    fn test_display_title_defaults() {
        let entry = FeedEntry::default();
        assert_eq!(entry.display_title(), UNTITLED);

        let entry = FeedEntry {
            title: "  Pleno del Congreso ".to_string(),
            ..Default::default()
        };
        assert_eq!(entry.display_title(), "Pleno del Congreso");
    }

    #[test]
    fn test_paragraphs_drop_empty_lines() {
        let d = draft("Primero\n\n  \nSegundo\n");
        assert_eq!(d.paragraphs(), vec!["Primero", "Segundo"]);
    }

    #[test]
    fn test_placement_serialization() {
        let p = Placement::new("internacional", "economia");
        let json = serde_json::to_string(&p).unwrap();
        assert!(json.contains("internacional"));
        assert!(json.contains("economia"));
    }
}
