//! The per-run news index.
//!
//! [`NewsIndex`] maps section → category → article paths. It starts empty on
//! every run, is threaded through the pipeline by value, and is written once
//! at the end by [`crate::outputs::json::write_news_index`]. Earlier runs'
//! indexes are never merged in.
//!
//! Sections and categories keep the order they were first visited in, which
//! is the order the front page lays its cards out.
//!
//! # Shape
//!
//! ```json
//! {
//!   "espana": {
//!     "politica": ["noticias/espana/politica/2025-05-06-titular.html"]
//!   }
//! }
//! ```

use crate::models::Placement;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NewsIndex {
    sections: IndexMap<String, IndexMap<String, Vec<String>>>,
}

impl NewsIndex {
    /// Append a written article's site-relative path.
    ///
    /// Paths keep insertion order within a category. Recording the same path
    /// twice lists it twice.
    pub fn record_article(&mut self, placement: &Placement, relative_path: impl Into<String>) {
        let relative_path = relative_path.into();
        debug!(
            section = %placement.section,
            category = %placement.category,
            path = %relative_path,
            "Indexed article"
        );
        self.sections
            .entry(placement.section.clone())
            .or_default()
            .entry(placement.category.clone())
            .or_default()
            .push(relative_path);
    }

    /// Total number of recorded paths.
    pub fn article_count(&self) -> usize {
        self.sections
            .values()
            .flat_map(|categories| categories.values())
            .map(Vec::len)
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    #[cfg(test)]
    pub fn sections(&self) -> impl Iterator<Item = &str> {
        self.sections.keys().map(String::as_str)
    }

    #[cfg(test)]
    pub fn paths(&self, section: &str, category: &str) -> &[String] {
        self.sections
            .get(section)
            .and_then(|categories| categories.get(category))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_preserves_order() {
        let mut index = NewsIndex::default();
        let p = Placement::new("espana", "politica");
        index.record_article(&p, "b.html");
        index.record_article(&p, "a.html");
        index.record_article(&p, "c.html");
        assert_eq!(index.paths("espana", "politica"), ["b.html", "a.html", "c.html"]);
        assert_eq!(index.article_count(), 3);
    }

    #[test]
    fn test_sections_are_exactly_recorded_ones() {
        let mut index = NewsIndex::default();
        index.record_article(&Placement::new("internacional", "deportes"), "x.html");
        index.record_article(&Placement::new("espana", "economia"), "y.html");
        index.record_article(&Placement::new("Espana", "economia"), "z.html");

        let sections: Vec<_> = index.sections().collect();
        assert_eq!(sections, vec!["internacional", "espana", "Espana"]);
        assert!(index.paths("espana", "deportes").is_empty());
        assert!(index.paths("humor", "satira").is_empty());
    }

    #[test]
    fn test_serialization_keeps_visit_order() {
        let mut index = NewsIndex::default();
        for (section, category) in [
            ("espana", "politica"),
            ("espana", "economia"),
            ("espana", "deportes"),
            ("internacional", "politica"),
        ] {
            index.record_article(&Placement::new(section, category), format!("{section}-{category}.html"));
        }
        assert_eq!(
            serde_json::to_string(&index).unwrap(),
            r#"{"espana":{"politica":["espana-politica.html"],"economia":["espana-economia.html"],"deportes":["espana-deportes.html"]},"internacional":{"politica":["internacional-politica.html"]}}"#
        );
    }

    #[test]
    fn test_empty_index_serializes_to_empty_object() {
        let index = NewsIndex::default();
        assert!(index.is_empty());
        assert_eq!(serde_json::to_string(&index).unwrap(), "{}");
    }

    #[test]
    fn test_serialization_shape() {
        let mut index = NewsIndex::default();
        index.record_article(&Placement::new("humor", "satira"), "noticias/humor/satira/a.html");
        let value = serde_json::to_value(&index).unwrap();
        assert_eq!(
            value,
            serde_json::json!({"humor": {"satira": ["noticias/humor/satira/a.html"]}})
        );
        let back: NewsIndex = serde_json::from_value(value).unwrap();
        assert_eq!(back, index);
    }
}
