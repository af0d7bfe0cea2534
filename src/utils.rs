//! Utility functions for slugs, dates, logging, and file system checks.
//!
//! This module provides helper functions used throughout the application:
//! - Slugification of titles for file names
//! - Date formatting for file names and visible bylines
//! - String truncation for log previews
//! - File system validation for the public output root

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fs as stdfs;
use std::path::Path;
use tokio::fs;
use tracing::{info, instrument};

static NON_SLUG_RUN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^a-z0-9]+").expect("slug pattern is valid"));

/// Slug used when a title has no ASCII alphanumerics at all.
const EMPTY_SLUG: &str = "articulo";

/// Convert a title to a file-name-safe slug of at most `max_chars` characters.
///
/// The title is lowercased and every run of characters outside `[a-z0-9]`
/// (whitespace, slashes, punctuation, accented letters) collapses to a single
/// hyphen. Leading and trailing hyphens are dropped.
///
/// Two titles sharing the same first `max_chars` slug characters produce the
/// same slug. Callers do not resolve such collisions.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(slugify_title("Hello World", 60), "hello-world");
/// assert_eq!(slugify_title("Paz/Guerra: ¿qué?", 60), "paz-guerra-qu");
/// ```
pub fn slugify_title(title: &str, max_chars: usize) -> String {
    let lowered = title.to_lowercase();
    let replaced = NON_SLUG_RUN.replace_all(&lowered, "-");
    let slug: String = replaced.trim_matches('-').chars().take(max_chars).collect();
    let slug = slug.trim_end_matches('-');
    if slug.is_empty() {
        EMPTY_SLUG.to_string()
    } else {
        slug.to_string()
    }
}

/// Date component used in article file names (`YYYY-MM-DD`).
pub fn file_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Date shown to readers inside an article (`dd/mm/YYYY`).
pub fn visible_date(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}

/// Truncate a string for logging purposes.
///
/// Long strings are cut after `max` characters with an ellipsis and
/// byte count indicator appended. Cuts always land on a character boundary.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(truncate_for_log("short", 100), "short");
/// assert_eq!(truncate_for_log(&"a".repeat(500), 10), "aaaaaaaaaa…(+490 bytes)");
/// ```
pub fn truncate_for_log(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        None => s.to_string(),
        Some((cut, _)) => format!("{}…(+{} bytes)", &s[..cut], s.len() - cut),
    }
}

/// Capitalize the first character of a string.
///
/// Used to derive navigation labels from section keys
/// (e.g. "internacional" -> "Internacional").
pub fn upcase(s: &str) -> String {
    let mut c = s.chars();
    match c.next() {
        None => String::new(),
        Some(f) => f.to_uppercase().collect::<String>() + c.as_str(),
    }
}

/// Ensure a directory exists and is writable.
///
/// This function creates the directory if it doesn't exist, then performs
/// a write test by creating and immediately deleting a scratch file.
///
/// # Errors
///
/// Returns an error if:
/// - The directory cannot be created
/// - The directory is not writable (permission denied, read-only filesystem, etc.)
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn ensure_writable_dir(path: &Path) -> Result<(), Box<dyn Error>> {
    fs::create_dir_all(path).await?;
    // A plain std write keeps the error surface simple
    let scratch_path = path.join("..__write_check__");
    match stdfs::File::create(&scratch_path) {
        Ok(_) => {
            let _ = stdfs::remove_file(&scratch_path);
            info!("Output directory is writable");
            Ok(())
        }
        Err(e) => Err(Box::new(e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_for_log_short_string() {
        let s = "Hello, world!";
        assert_eq!(truncate_for_log(s, 100), "Hello, world!");
    }

    #[test]
    fn test_truncate_for_log_long_string() {
        let s = "a".repeat(500);
        let result = truncate_for_log(&s, 100);
        assert!(result.starts_with(&"a".repeat(100)));
        assert!(result.contains("…(+400 bytes)"));
    }

    #[test]
    fn test_truncate_for_log_multibyte() {
        let s = "ñ".repeat(10);
        let result = truncate_for_log(&s, 3);
        assert!(result.starts_with("ñññ…"));
        assert!(result.contains("(+14 bytes)"));
    }

    #[test]
    fn test_slugify_title() {
        assert_eq!(slugify_title("Hello World", 60), "hello-world");
        assert_eq!(slugify_title("Test-Article!", 60), "test-article");
        assert_eq!(slugify_title("Multiple   Spaces", 60), "multiple-spaces");
        assert_eq!(slugify_title("Sube/baja el IPC", 60), "sube-baja-el-ipc");
        assert_eq!(slugify_title("  ¡Última hora!  ", 60), "ltima-hora");
    }

    #[test]
    fn test_slugify_title_truncates() {
        let slug = slugify_title(&"palabra ".repeat(20), 40);
        assert!(slug.len() <= 40);
        assert!(!slug.ends_with('-'));
        assert!(slug.starts_with("palabra-palabra"));
    }

    #[test]
    fn test_slugify_title_empty() {
        assert_eq!(slugify_title("¿¡…!?", 60), EMPTY_SLUG);
        assert_eq!(slugify_title("", 60), EMPTY_SLUG);
    }

    #[test]
    fn test_dates() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 7).unwrap();
        assert_eq!(file_date(date), "2025-03-07");
        assert_eq!(visible_date(date), "07/03/2025");
    }

    #[test]
    fn test_upcase() {
        assert_eq!(upcase("internacional"), "Internacional");
        assert_eq!(upcase("españa"), "España");
        assert_eq!(upcase(""), "");
    }

    #[tokio::test]
    async fn test_ensure_writable_dir_creates_nested() {
        let tmp = tempfile::tempdir().unwrap();
        let nested = tmp.path().join("public").join("noticias");
        ensure_writable_dir(&nested).await.unwrap();
        assert!(nested.is_dir());
        assert!(!nested.join("..__write_check__").exists());
    }
}
