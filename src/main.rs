//! # Contexto Abierto
//!
//! A static news generator that reads RSS/Atom feeds, optionally rewrites
//! each entry through a hosted text-generation model, and writes the result
//! as HTML pages plus a JSON index consumed by the site front page.
//!
//! ## Usage
//!
//! ```sh
//! HF_API_KEY=hf_xxx contexto_abierto --edition real --public-root ./public
//! ```
//!
//! ## Architecture
//!
//! One run is a straight line, one entry at a time:
//! 1. **Sources**: fetch each configured feed and select entries
//! 2. **Enrichment**: shorten the title, rewrite the body, draw an
//!    illustration, each falling back to the original on failure
//! 3. **Output**: write the HTML page and append it to the run's index
//! 4. **Index**: write `data/news_index.json` once, replacing the old one, for
//!    editions that own the front-page index

use chrono::Local;
use clap::Parser;
use reqwest::Client;
use std::error::Error;
use tracing::{debug, error, info, instrument, warn};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod api;
mod cli;
mod config;
mod illustrate;
mod models;
mod outputs;
mod pipeline;
mod sources;
mod text;
mod utils;

use api::HfTextClient;
use cli::Cli;
use config::{Edition, load_config};
use illustrate::HfImageClient;
use outputs::json;
use pipeline::{RunContext, RunOutput, RunStats, Services};
use sources::FeedClient;
use utils::ensure_writable_dir;

const USER_AGENT: &str = concat!("contexto_abierto/", env!("CARGO_PKG_VERSION"));

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("contexto_abierto starting up");

    let args = Cli::parse();
    debug!(edition = ?args.edition, config = ?args.config, public_root = %args.public_root.display(), "Parsed CLI arguments");

    let stats = run_app(args).await?;

    let elapsed = start_time.elapsed();
    info!(
        written = stats.written,
        skipped = stats.skipped,
        bodies_rewritten = stats.bodies_rewritten,
        bodies_fallback = stats.bodies_fallback,
        titles_rewritten = stats.titles_rewritten,
        images = stats.images,
        fallbacks = ?stats.fallbacks,
        secs = elapsed.as_secs(),
        millis = elapsed.subsec_millis(),
        "Execution complete"
    );

    Ok(())
}

/// Run one edition end to end: checks, pipeline, and index.
async fn run_app(args: Cli) -> Result<RunStats, Box<dyn Error>> {
    let config = match &args.config {
        Some(path) => load_config(path).await?,
        None => args.edition.config(),
    };

    // Missing credential is fatal before any output is touched
    if let Err(e) = config.check_credential(args.api_key.as_deref()) {
        error!(error = %e, "Refusing to start");
        return Err(e.into());
    }
    if args.api_key.is_none() && config.uses_remote_services() {
        info!("No HF_API_KEY supplied; remote calls will fall back to original text");
    }

    if let Err(e) = ensure_writable_dir(&args.public_root).await {
        error!(
            path = %args.public_root.display(),
            error = %e,
            "Public root is not writable (fix perms or choose a different path)"
        );
        return Err(e);
    }

    let http = Client::builder().user_agent(USER_AGENT).build()?;
    let feeds = FeedClient::new(http.clone());
    let text_client = HfTextClient::new(http.clone(), &config.rewrite.endpoint, args.api_key.clone());
    let image_client = HfImageClient::new(http, &config.illustration.endpoint, args.api_key.clone());
    let services = Services {
        text: &text_client,
        image: &image_client,
    };

    let run_date = Local::now().date_naive();
    let ctx = RunContext::new(&config, &args.public_root, run_date);
    info!(date = %run_date, sections = config.sections.len(), "Run context initialized");

    let mut output = RunOutput::default();
    if args.edition == Edition::Test {
        output = pipeline::publish_smoke_article(&ctx, output).await;
    }
    output = pipeline::run(&ctx, &feeds, &services, output).await;

    if output.index.is_empty() {
        warn!("No articles were published this run");
    }

    // The main index is written even when nothing was published
    if config.write_index {
        let index_path = json::write_news_index(&output.index, &args.public_root).await?;
        info!(index = %index_path.display(), articles = output.index.article_count(), "Index updated");
    } else {
        info!("This edition leaves the front-page index untouched");
    }

    Ok(output.stats)
}
