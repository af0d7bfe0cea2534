//! Illustrations for satire articles.
//!
//! The image endpoint receives a fixed stylistic prefix followed by the
//! article summary and answers with a JSON object holding a base64 image.
//! Failing to get an image is never fatal: the article is published without
//! one.

use crate::api::{Enrichment, ServiceError};
use crate::config::IllustrationConfig;
use crate::models::Placement;
use crate::utils::truncate_for_log;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tokio::fs;
use tracing::{info, instrument, warn};

/// Trait for async image generation.
pub trait ImageGenerator {
    /// Returns the decoded image bytes.
    async fn generate_image(&self, prompt: &str, timeout: Duration) -> Result<Vec<u8>, ServiceError>;
}

#[derive(Debug, Serialize)]
struct ImagePayload<'a> {
    inputs: &'a str,
}

#[derive(Debug, Deserialize)]
struct ImageResponse {
    #[serde(alias = "b64_json", alias = "generated_image")]
    image: String,
}

/// Decode a base64 payload, tolerating a `data:` URL prefix and whitespace.
fn decode_image(encoded: &str) -> Result<Vec<u8>, ServiceError> {
    let data = match encoded.split_once("base64,") {
        Some((prefix, rest)) if prefix.starts_with("data:") => rest,
        _ => encoded,
    };
    let compact: String = data.chars().filter(|c| !c.is_whitespace()).collect();
    let bytes = STANDARD
        .decode(compact.as_bytes())
        .map_err(|e| ServiceError::Malformed(format!("invalid base64 image: {e}")))?;
    if bytes.is_empty() {
        return Err(ServiceError::Malformed("empty image".to_string()));
    }
    Ok(bytes)
}

/// Client for a hosted image-generation endpoint.
#[derive(Debug, Clone)]
pub struct HfImageClient {
    http: Client,
    endpoint: String,
    api_key: Option<String>,
}

impl HfImageClient {
    pub fn new(http: Client, endpoint: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            http,
            endpoint: endpoint.into(),
            api_key,
        }
    }
}

impl ImageGenerator for HfImageClient {
    #[instrument(level = "info", skip_all, fields(endpoint = %self.endpoint))]
    async fn generate_image(&self, prompt: &str, timeout: Duration) -> Result<Vec<u8>, ServiceError> {
        let mut builder = self
            .http
            .post(&self.endpoint)
            .timeout(timeout)
            .json(&ImagePayload { inputs: prompt });
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ServiceError::ErrorStatus(status));
        }
        let body = response.text().await?;
        let parsed: ImageResponse = serde_json::from_str(&body).map_err(|e| {
            ServiceError::Malformed(format!("{e}; body: {}", truncate_for_log(&body, 200)))
        })?;
        decode_image(&parsed.image)
    }
}

/// Directory (relative to the public root) holding a section's images.
pub fn images_dir(placement: &Placement) -> String {
    format!("noticias/{}/images", placement.section)
}

/// Generate and store an illustration for an article.
///
/// On success the image is written to
/// `<public_root>/noticias/<section>/images/<slug>.png` and the site-relative
/// path is returned. Any failure yields no image.
#[instrument(level = "info", skip_all, fields(section = %placement.section, %slug))]
pub async fn illustrate<G: ImageGenerator>(
    generator: &G,
    summary: &str,
    slug: &str,
    placement: &Placement,
    public_root: &Path,
    config: &IllustrationConfig,
) -> Enrichment<Option<String>> {
    let prompt = format!("{}{}", config.prompt_prefix, summary);
    let timeout = Duration::from_secs(config.timeout_secs);

    let bytes = match generator.generate_image(&prompt, timeout).await {
        Ok(bytes) => bytes,
        Err(reason) => {
            warn!(error = %reason, "Illustration failed; publishing without image");
            return Enrichment::Fallback { value: None, reason };
        }
    };

    let relative = format!("{}/{}.png", images_dir(placement), slug);
    let absolute = public_root.join(&relative);
    let stored = async {
        fs::create_dir_all(public_root.join(images_dir(placement))).await?;
        fs::write(&absolute, &bytes).await
    }
    .await;

    match stored {
        Ok(()) => {
            info!(path = %absolute.display(), bytes = bytes.len(), "Wrote illustration");
            Enrichment::Enriched(Some(relative))
        }
        Err(e) => {
            warn!(path = %absolute.display(), error = %e, "Could not store illustration");
            Enrichment::Fallback {
                value: None,
                reason: ServiceError::Storage(e),
            }
        }
    }
}
