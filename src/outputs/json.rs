//! JSON output of the news index.
//!
//! The site front page reads `data/news_index.json` to build its cards, so
//! the file location and key names are a contract with it.
//!
//! # Output Structure
//!
//! ```text
//! public_root/
//! └── data/
//!     └── news_index.json
//! ```
//!
//! The document uses two-space indentation and keeps non-ASCII characters
//! unescaped. Each run replaces the previous file entirely.

use crate::outputs::indexes::NewsIndex;
use std::error::Error;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{error, info, instrument};

pub const INDEX_DIR: &str = "data";
pub const INDEX_FILE: &str = "news_index.json";

/// Where the index for `public_root` lives.
pub fn index_path(public_root: &Path) -> PathBuf {
    public_root.join(INDEX_DIR).join(INDEX_FILE)
}

/// Serialize the index and overwrite `public_root/data/news_index.json`.
///
/// Returns the path written.
#[instrument(level = "info", skip_all, fields(public_root = %public_root.display(), articles = index.article_count()))]
pub async fn write_news_index(index: &NewsIndex, public_root: &Path) -> Result<PathBuf, Box<dyn Error>> {
    let json = serde_json::to_string_pretty(index)?;

    let dir = public_root.join(INDEX_DIR);
    if let Err(e) = fs::create_dir_all(&dir).await {
        error!(dir = %dir.display(), error = %e, "Failed to create index dir");
        return Err(e.into());
    }

    let path = index_path(public_root);
    fs::write(&path, json).await?;
    info!(path = %path.display(), "Wrote news index");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Placement;

    #[tokio::test]
    async fn test_write_empty_index() {
        let tmp = tempfile::tempdir().unwrap();
        let path = write_news_index(&NewsIndex::default(), tmp.path()).await.unwrap();
        assert_eq!(path, tmp.path().join("data/news_index.json"));
        assert_eq!(std::fs::read_to_string(path).unwrap(), "{}");
    }

    #[tokio::test]
    async fn test_write_index_format() {
        let tmp = tempfile::tempdir().unwrap();
        let mut index = NewsIndex::default();
        index.record_article(
            &Placement::new("espana", "economía"),
            "noticias/espana/economía/2025-05-06-ñu.html",
        );

        let path = write_news_index(&index, tmp.path()).await.unwrap();
        let written = std::fs::read_to_string(path).unwrap();
        let expected = "{\n  \"espana\": {\n    \"economía\": [\n      \"noticias/espana/economía/2025-05-06-ñu.html\"\n    ]\n  }\n}";
        assert_eq!(written, expected);
    }

    #[tokio::test]
    async fn test_write_replaces_previous_index() {
        let tmp = tempfile::tempdir().unwrap();
        let mut first = NewsIndex::default();
        first.record_article(&Placement::new("espana", "politica"), "old.html");
        write_news_index(&first, tmp.path()).await.unwrap();

        let mut second = NewsIndex::default();
        second.record_article(&Placement::new("internacional", "politica"), "new.html");
        let path = write_news_index(&second, tmp.path()).await.unwrap();

        let parsed: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap();
        assert_eq!(parsed, serde_json::json!({"internacional": {"politica": ["new.html"]}}));
    }
}
