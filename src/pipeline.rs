//! The per-entry publishing pipeline.
//!
//! For every configured section, category, feed, and selected entry, in that
//! order and strictly one at a time:
//!
//! 1. **Title**: optionally shortened by the text service
//! 2. **Body**: markup stripped, padded to a minimum length, optionally rewritten
//! 3. **Illustration**: optionally generated and stored next to the section
//! 4. **Render**: written as an HTML page
//! 5. **Index**: the page path is appended to the run's [`NewsIndex`]
//!
//! Enrichment failures never stop an entry; they fall back to the original
//! title, the cleaned summary, or no image. Only a failed page write skips
//! the entry, and then it is not indexed.

use crate::api::{Enrichment, TextGenerator, rewrite, shorten_title};
use crate::config::PipelineConfig;
use crate::illustrate::{ImageGenerator, illustrate};
use crate::models::{ArticleDraft, FeedEntry, Placement};
use crate::outputs::html::{NavLink, PageContext, write_article};
use crate::outputs::indexes::NewsIndex;
use crate::sources::{FeedClient, choose_feeds, select_entries};
use crate::text::{ensure_minimum_length, normalize};
use crate::utils::slugify_title;
use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{error, info, instrument, warn};

/// Remote collaborators used by the enrichment steps.
#[derive(Debug)]
pub struct Services<'a, T, I> {
    pub text: &'a T,
    pub image: &'a I,
}

/// Immutable inputs shared by every entry of a run.
#[derive(Debug)]
pub struct RunContext<'a> {
    pub config: &'a PipelineConfig,
    pub public_root: &'a Path,
    pub date: NaiveDate,
    pub nav: Vec<NavLink>,
}

impl<'a> RunContext<'a> {
    pub fn new(config: &'a PipelineConfig, public_root: &'a Path, date: NaiveDate) -> Self {
        let nav = config
            .sections
            .iter()
            .map(|s| NavLink {
                label: s.display_label(),
                class: s.name.clone(),
            })
            .chain(config.render.extra_nav.iter().map(|label| NavLink {
                label: label.clone(),
                class: slugify_title(label, 40),
            }))
            .collect();
        Self {
            config,
            public_root,
            date,
            nav,
        }
    }

    fn page(&self) -> PageContext<'_> {
        PageContext {
            config: &self.config.render,
            nav: &self.nav,
            date: self.date,
        }
    }
}

/// Counters reported at the end of a run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunStats {
    pub written: usize,
    pub skipped: usize,
    pub bodies_rewritten: usize,
    pub bodies_fallback: usize,
    pub titles_rewritten: usize,
    pub images: usize,
    /// Enrichment fallbacks by failure kind, across every step.
    pub fallbacks: BTreeMap<&'static str, usize>,
}

impl RunStats {
    fn tally<T>(&mut self, step: &Enrichment<T>) {
        if let Some(reason) = step.reason() {
            *self.fallbacks.entry(reason.kind()).or_default() += 1;
        }
    }
}

/// What a run accumulates; threaded through each step by value.
#[derive(Debug, Clone, Default)]
pub struct RunOutput {
    pub index: NewsIndex,
    pub stats: RunStats,
}

/// Build the article body from an entry.
///
/// The result is never empty: with no usable summary the title stands in.
async fn build_body<T: TextGenerator>(
    entry: &FeedEntry,
    title: &str,
    config: &PipelineConfig,
    text: &T,
    stats: &mut RunStats,
) -> String {
    let cleaned = normalize(entry.body_source());
    let padded = ensure_minimum_length(
        &cleaned,
        config.text.min_summary_chars,
        &config.text.filler_sentences,
    );
    let base = if padded.is_empty() {
        title.to_string()
    } else {
        padded
    };

    if !config.rewrite.enabled {
        return base;
    }
    let body = rewrite(text, &base, &config.rewrite).await;
    stats.tally(&body);
    if body.is_enriched() {
        stats.bodies_rewritten += 1;
    } else {
        stats.bodies_fallback += 1;
    }
    body.into_inner()
}

/// Publish one feed entry and record it in the index.
#[instrument(level = "info", skip_all, fields(section = %placement.section, category = %placement.category, link = %entry.link))]
pub async fn process_entry<T: TextGenerator, I: ImageGenerator>(
    entry: &FeedEntry,
    placement: &Placement,
    ctx: &RunContext<'_>,
    services: &Services<'_, T, I>,
    mut output: RunOutput,
) -> RunOutput {
    let config = ctx.config;

    let original_title = entry.display_title();
    let title = if config.title.enabled {
        let title = shorten_title(services.text, original_title, &config.title).await;
        output.stats.tally(&title);
        if title.is_enriched() {
            output.stats.titles_rewritten += 1;
        }
        title.into_inner()
    } else {
        original_title.to_string()
    };

    let body_text = build_body(entry, &title, config, services.text, &mut output.stats).await;

    let slug = slugify_title(&title, config.render.slug_max_chars);
    let image_path = if config.illustration.enabled {
        let summary = normalize(entry.body_source());
        let image = illustrate(
            services.image,
            &summary,
            &slug,
            placement,
            ctx.public_root,
            &config.illustration,
        )
        .await;
        output.stats.tally(&image);
        if image.is_enriched() {
            output.stats.images += 1;
        }
        image.into_inner()
    } else {
        None
    };

    let draft = ArticleDraft {
        placement: placement.clone(),
        title,
        body_text,
        source_link: entry.link.clone(),
        image_path,
    };
    publish_draft(&draft, ctx, output).await
}

/// Write a finished draft and index it; a failed write skips the entry.
pub async fn publish_draft(draft: &ArticleDraft, ctx: &RunContext<'_>, mut output: RunOutput) -> RunOutput {
    match write_article(draft, &ctx.page(), ctx.public_root).await {
        Ok(relative) => {
            output.index.record_article(&draft.placement, relative);
            output.stats.written += 1;
        }
        Err(e) => {
            error!(title = %draft.title, error = %e, "Failed to write article; not indexing it");
            output.stats.skipped += 1;
        }
    }
    output
}

/// Visit every configured source and publish the selected entries.
#[instrument(level = "info", skip_all, fields(date = %ctx.date))]
pub async fn run<T: TextGenerator, I: ImageGenerator>(
    ctx: &RunContext<'_>,
    feeds: &FeedClient,
    services: &Services<'_, T, I>,
    mut output: RunOutput,
) -> RunOutput {
    let config = ctx.config;
    for section in &config.sections {
        for category in &section.categories {
            let placement = Placement::new(&section.name, &category.name);
            let urls = choose_feeds(&category.feeds, &config.selection);
            if urls.is_empty() {
                warn!(section = %section.name, category = %category.name, "No feeds configured");
            }
            for url in urls {
                let entries = select_entries(feeds.fetch_entries(url).await, &config.selection);
                info!(%url, selected = entries.len(), "Processing feed");
                for entry in &entries {
                    output = process_entry(entry, &placement, ctx, services, output).await;
                }
            }
        }
    }
    output
}

const SMOKE_TITLE: &str = "Noticia de prueba";
const SMOKE_BODY: &str = "Este es un ejemplo de noticia generada automáticamente por Contexto Abierto.\n\
Desde una perspectiva centrista, este contenido sirve para comprobar que el sistema funciona correctamente.";

/// Publish the fixed smoke-test article without touching the network.
pub async fn publish_smoke_article(ctx: &RunContext<'_>, output: RunOutput) -> RunOutput {
    let draft = ArticleDraft {
        placement: Placement::new("espana", "prueba"),
        title: SMOKE_TITLE.to_string(),
        body_text: SMOKE_BODY.to_string(),
        source_link: String::new(),
        image_path: None,
    };
    publish_draft(&draft, ctx, output).await
}
