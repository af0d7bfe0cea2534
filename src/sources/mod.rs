//! Feed sources: fetching, parsing, and picking entries.
//!
//! Every configured category lists one or more feed URLs. For each run the
//! adapter:
//!
//! 1. **Chooses feeds**: all of them, or one at random ([`choose_feeds`])
//! 2. **Fetches**: downloads and parses the document ([`FeedClient::fetch_entries`])
//! 3. **Selects**: keeps the first N entries or one random entry ([`select_entries`])
//!
//! A feed that cannot be fetched or parsed yields no entries and the source is
//! skipped. No retry happens at this layer and the timeout is left to the
//! transport.

pub mod rss;

use crate::config::SelectionConfig;
use crate::models::FeedEntry;
use rand::seq::IndexedRandom;
use reqwest::Client;
use std::error::Error;
use tracing::{debug, info, instrument, warn};
use url::Url;

/// Thin wrapper around an HTTP client that turns feed URLs into entries.
#[derive(Debug, Clone)]
pub struct FeedClient {
    http: Client,
}

impl FeedClient {
    pub fn new(http: Client) -> Self {
        Self { http }
    }

    /// Fetch and parse a feed. Any failure is logged and yields no entries.
    #[instrument(level = "info", skip(self))]
    pub async fn fetch_entries(&self, url: &str) -> Vec<FeedEntry> {
        match self.try_fetch(url).await {
            Ok(entries) => {
                info!(count = entries.len(), "Fetched feed");
                entries
            }
            Err(e) => {
                warn!(error = %e, "Feed unavailable; skipping source");
                Vec::new()
            }
        }
    }

    async fn try_fetch(&self, url: &str) -> Result<Vec<FeedEntry>, Box<dyn Error>> {
        let parsed = Url::parse(url)?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(format!("unsupported URL scheme: {}", parsed.scheme()).into());
        }

        let response = self.http.get(parsed).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(format!("HTTP error: {status}").into());
        }
        let body = response.bytes().await?;
        debug!(bytes = body.len(), "Downloaded feed");
        Ok(rss::parse_feed(&body)?)
    }
}

/// Pick which of a category's feeds to visit this run.
pub fn choose_feeds<'a>(feeds: &'a [String], selection: &SelectionConfig) -> Vec<&'a str> {
    if selection.random_feed {
        feeds
            .choose(&mut rand::rng())
            .map(|f| vec![f.as_str()])
            .unwrap_or_default()
    } else {
        feeds.iter().map(String::as_str).collect()
    }
}

/// Keep the entries a run will publish, in feed order.
pub fn select_entries(entries: Vec<FeedEntry>, selection: &SelectionConfig) -> Vec<FeedEntry> {
    if selection.random_entry {
        entries
            .choose(&mut rand::rng())
            .cloned()
            .into_iter()
            .collect()
    } else {
        entries
            .into_iter()
            .take(selection.entries_per_feed)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entries(n: usize) -> Vec<FeedEntry> {
        (0..n)
            .map(|i| FeedEntry {
                title: format!("Noticia {i}"),
                ..Default::default()
            })
            .collect()
    }

    fn first(n: usize) -> SelectionConfig {
        SelectionConfig {
            entries_per_feed: n,
            random_feed: false,
            random_entry: false,
        }
    }

    #[test]
    fn test_select_first_entries() {
        let picked = select_entries(entries(5), &first(2));
        let titles: Vec<_> = picked.iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, vec!["Noticia 0", "Noticia 1"]);
    }

    #[test]
    fn test_select_more_than_available() {
        assert_eq!(select_entries(entries(1), &first(3)).len(), 1);
    }

    #[test]
    fn test_select_random_entry() {
        let selection = SelectionConfig {
            random_entry: true,
            ..first(1)
        };
        let pool = entries(4);
        let picked = select_entries(pool.clone(), &selection);
        assert_eq!(picked.len(), 1);
        assert!(pool.contains(&picked[0]));
        assert!(select_entries(Vec::new(), &selection).is_empty());
    }

    #[test]
    fn test_choose_feeds() {
        let feeds = vec!["https://a.example/rss".to_string(), "https://b.example/rss".to_string()];
        assert_eq!(choose_feeds(&feeds, &first(1)).len(), 2);

        let random = SelectionConfig {
            random_feed: true,
            ..first(1)
        };
        let chosen = choose_feeds(&feeds, &random);
        assert_eq!(chosen.len(), 1);
        assert!(feeds.iter().any(|f| f == chosen[0]));
        assert!(choose_feeds(&[], &random).is_empty());
    }

    #[tokio::test]
    async fn test_fetch_entries_from_server() {
        let mut server = mockito::Server::new_async().await;
        let body = r#"<rss version="2.0"><channel><title>Portada</title>
            <item><title>Uno</title><link>https://example.com/1</link><description>Primera</description></item>
            <item><title>Dos</title><link>https://example.com/2</link><description>Segunda</description></item>
        </channel></rss>"#;
        let mock = server
            .mock("GET", "/rss.xml")
            .with_status(200)
            .with_header("content-type", "application/rss+xml")
            .with_body(body)
            .create_async()
            .await;

        let client = FeedClient::new(Client::new());
        let fetched = client
            .fetch_entries(&format!("{}/rss.xml", server.url()))
            .await;

        mock.assert_async().await;
        assert_eq!(fetched.len(), 2);
        assert_eq!(fetched[1].summary, "Segunda");
    }

    #[tokio::test]
    async fn test_fetch_entries_error_status_is_empty() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/rss.xml")
            .with_status(500)
            .create_async()
            .await;

        let client = FeedClient::new(Client::new());
        let fetched = client
            .fetch_entries(&format!("{}/rss.xml", server.url()))
            .await;
        assert!(fetched.is_empty());
    }

    #[tokio::test]
    async fn test_fetch_entries_non_feed_is_empty() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/rss.xml")
            .with_status(200)
            .with_body("<html><body>Mantenimiento</body></html>")
            .create_async()
            .await;

        let client = FeedClient::new(Client::new());
        let fetched = client
            .fetch_entries(&format!("{}/rss.xml", server.url()))
            .await;
        assert!(fetched.is_empty());
    }

    #[tokio::test]
    async fn test_fetch_entries_rejects_bad_urls() {
        let client = FeedClient::new(Client::new());
        assert!(client.fetch_entries("not a url").await.is_empty());
        assert!(client.fetch_entries("ftp://example.com/rss").await.is_empty());
    }
}
