//! Text-generation calls with explicit fallbacks.
//!
//! Every remote call in this crate is best-effort: an unreachable or
//! misbehaving service must degrade to publishing the cleaned original text,
//! never abort the run.
//!
//! # Architecture
//!
//! - [`TextGenerator`]: Core trait for sending one prompt and getting text back
//! - [`HfTextClient`]: Hosted inference implementation over `reqwest`
//! - [`rewrite`] / [`shorten_title`]: Pipeline steps that turn a generator
//!   result into an [`Enrichment`], which is either the generated value or
//!   the fallback together with the [`ServiceError`] that caused it

use crate::config::{RewriteConfig, TEXT_PLACEHOLDER, TITLE_PLACEHOLDER, TitleConfig};
use crate::utils::truncate_for_log;
use rand::seq::IndexedRandom;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

/// Why a remote call did not produce a usable value.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Transport failure or timeout.
    #[error("service unreachable: {0}")]
    Unreachable(#[from] reqwest::Error),
    #[error("service returned status {0}")]
    ErrorStatus(StatusCode),
    /// The call succeeded but the output is too short to use.
    #[error("output too short: {len} chars (needs more than {min})")]
    BelowThreshold { len: usize, min: usize },
    #[error("malformed response: {0}")]
    Malformed(String),
    /// The result arrived but could not be written to disk.
    #[error("could not store result: {0}")]
    Storage(std::io::Error),
}

impl ServiceError {
    /// Short stable label used to tally failures in the run summary.
    pub fn kind(&self) -> &'static str {
        match self {
            ServiceError::Unreachable(_) => "unreachable",
            ServiceError::ErrorStatus(_) => "error_status",
            ServiceError::BelowThreshold { .. } => "below_threshold",
            ServiceError::Malformed(_) => "malformed",
            ServiceError::Storage(_) => "storage",
        }
    }
}

/// Result of an enrichment step. Both arms carry a usable value.
#[derive(Debug)]
pub enum Enrichment<T> {
    Enriched(T),
    Fallback { value: T, reason: ServiceError },
}

impl<T> Enrichment<T> {
    pub fn is_enriched(&self) -> bool {
        matches!(self, Enrichment::Enriched(_))
    }

    /// Why the step fell back, if it did.
    pub fn reason(&self) -> Option<&ServiceError> {
        match self {
            Enrichment::Enriched(_) => None,
            Enrichment::Fallback { reason, .. } => Some(reason),
        }
    }

    #[cfg(test)]
    pub fn value(&self) -> &T {
        match self {
            Enrichment::Enriched(value) | Enrichment::Fallback { value, .. } => value,
        }
    }

    pub fn into_inner(self) -> T {
        match self {
            Enrichment::Enriched(value) | Enrichment::Fallback { value, .. } => value,
        }
    }
}

/// One text-generation request.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub prompt: String,
    pub max_new_tokens: u32,
    pub temperature: f32,
    /// Ask the service to return only the continuation, not the prompt.
    pub only_continuation: bool,
    pub timeout: Duration,
}

/// Trait for async text generation.
///
/// Implementors send a prompt to a model and return the generated text.
/// The pipeline only depends on this trait, so tests can substitute a
/// canned generator.
pub trait TextGenerator {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, ServiceError>;
}

#[derive(Debug, Serialize)]
struct InferencePayload<'a> {
    inputs: &'a str,
    parameters: InferenceParameters,
}

#[derive(Debug, Serialize)]
struct InferenceParameters {
    max_new_tokens: u32,
    temperature: f32,
    return_full_text: bool,
}

#[derive(Debug, Deserialize)]
struct GeneratedText {
    generated_text: String,
}

/// Client for a hosted text-generation endpoint.
///
/// The endpoint takes `{"inputs": ..., "parameters": {...}}` and answers
/// with `[{"generated_text": ...}]`. Requests carry a bearer token when one
/// is configured; without one the service is still called and its
/// authorization error becomes an ordinary fallback.
#[derive(Debug, Clone)]
pub struct HfTextClient {
    http: Client,
    endpoint: String,
    api_key: Option<String>,
}

impl HfTextClient {
    pub fn new(http: Client, endpoint: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            http,
            endpoint: endpoint.into(),
            api_key,
        }
    }
}

impl TextGenerator for HfTextClient {
    #[instrument(level = "info", skip_all, fields(endpoint = %self.endpoint))]
    async fn generate(&self, request: &GenerationRequest) -> Result<String, ServiceError> {
        let t0 = Instant::now();
        let payload = InferencePayload {
            inputs: &request.prompt,
            parameters: InferenceParameters {
                max_new_tokens: request.max_new_tokens,
                temperature: request.temperature,
                return_full_text: !request.only_continuation,
            },
        };

        let mut builder = self
            .http
            .post(&self.endpoint)
            .timeout(request.timeout)
            .json(&payload);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ServiceError::ErrorStatus(status));
        }

        let body = response.text().await?;
        let parsed: Vec<GeneratedText> = serde_json::from_str(&body).map_err(|e| {
            ServiceError::Malformed(format!("{e}; body: {}", truncate_for_log(&body, 200)))
        })?;
        let text = parsed
            .into_iter()
            .next()
            .map(|g| g.generated_text)
            .ok_or_else(|| ServiceError::Malformed("empty generation list".to_string()))?;

        debug!(
            elapsed_ms = t0.elapsed().as_millis() as u64,
            chars = text.chars().count(),
            "Generation finished"
        );
        Ok(text)
    }
}

fn fill(template: &str, placeholder: &str, value: &str) -> String {
    template.replace(placeholder, value)
}

fn fallback_text(text: &str, note: Option<&str>) -> String {
    match note.map(str::trim).filter(|n| !n.is_empty()) {
        Some(note) if !text.is_empty() => format!("{text} {note}"),
        Some(note) => note.to_string(),
        None => text.to_string(),
    }
}

/// Rewrite a normalized summary into an article body.
///
/// One prompt template is chosen uniformly at random. The generated text is
/// accepted only if it is strictly longer than `min_output_chars` (and never
/// empty); otherwise the input comes back, with `fallback_note` appended when
/// configured. A non-empty input therefore always yields a non-empty body.
#[instrument(level = "info", skip_all, fields(input_chars = text.chars().count()))]
pub async fn rewrite<G: TextGenerator>(
    generator: &G,
    text: &str,
    config: &RewriteConfig,
) -> Enrichment<String> {
    let Some(template) = config.prompts.choose(&mut rand::rng()).cloned() else {
        warn!("No rewrite prompts configured; keeping original text");
        return Enrichment::Fallback {
            value: fallback_text(text, config.fallback_note.as_deref()),
            reason: ServiceError::Malformed("no prompt templates configured".to_string()),
        };
    };

    let request = GenerationRequest {
        prompt: fill(&template, TEXT_PLACEHOLDER, text),
        max_new_tokens: config.max_new_tokens,
        temperature: config.temperature,
        only_continuation: true,
        timeout: Duration::from_secs(config.timeout_secs),
    };

    let outcome = generator.generate(&request).await.and_then(|generated| {
        let generated = generated.trim().to_string();
        let len = generated.chars().count();
        if generated.is_empty() || len <= config.min_output_chars {
            Err(ServiceError::BelowThreshold {
                len,
                min: config.min_output_chars,
            })
        } else {
            Ok(generated)
        }
    });

    match outcome {
        Ok(generated) => {
            info!(output_chars = generated.chars().count(), "Rewrite accepted");
            Enrichment::Enriched(generated)
        }
        Err(reason) => {
            warn!(error = %reason, "Rewrite failed; using original text");
            Enrichment::Fallback {
                value: fallback_text(text, config.fallback_note.as_deref()),
                reason,
            }
        }
    }
}

/// Reduce a model's title answer to a single clean headline.
fn clean_title(generated: &str) -> Option<String> {
    let line = generated.lines().map(str::trim).find(|l| !l.is_empty())?;
    let quotes: &[char] = &['"', '\'', '«', '»', '“', '”', '‘', '’'];
    let title = line.trim_matches(quotes).trim();
    if title.is_empty() {
        None
    } else {
        Some(title.to_string())
    }
}

/// Ask for a shorter, neutral version of a headline.
///
/// Any failure, including an answer that is empty once cleaned, keeps the
/// original title.
#[instrument(level = "info", skip_all, fields(title = %title))]
pub async fn shorten_title<G: TextGenerator>(
    generator: &G,
    title: &str,
    config: &TitleConfig,
) -> Enrichment<String> {
    let request = GenerationRequest {
        prompt: fill(&config.prompt, TITLE_PLACEHOLDER, title),
        max_new_tokens: config.max_new_tokens,
        temperature: config.temperature,
        only_continuation: true,
        timeout: Duration::from_secs(config.timeout_secs),
    };

    let outcome = generator.generate(&request).await.and_then(|generated| {
        clean_title(&generated).ok_or_else(|| {
            ServiceError::Malformed(format!(
                "no usable title in {:?}",
                truncate_for_log(&generated, 80)
            ))
        })
    });

    match outcome {
        Ok(new_title) => {
            info!(%new_title, "Title rewritten");
            Enrichment::Enriched(new_title)
        }
        Err(reason) => {
            warn!(error = %reason, "Title rewrite failed; keeping original");
            Enrichment::Fallback {
                value: title.to_string(),
                reason,
            }
        }
    }
}
