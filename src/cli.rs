//! Command-line interface definitions for Contexto Abierto.
//!
//! This module defines the CLI arguments and options using the `clap` crate.
//! Every option has a default, so running the binary with no flags publishes
//! the main news edition into `./public`.

use crate::config::Edition;
use clap::Parser;
use std::path::PathBuf;

/// Command-line arguments for the news generator.
///
/// # Examples
///
/// ```sh
/// # Main site, credential from the environment
/// HF_API_KEY=hf_xxx contexto_abierto
///
/// # Daily satire piece
/// contexto_abierto --edition humor
///
/// # Custom feeds and knobs
/// contexto_abierto --config pipeline.yaml --public-root ./site/public
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Which built-in pipeline to run
    #[arg(short, long, value_enum, default_value_t = Edition::Real)]
    pub edition: Edition,

    /// YAML pipeline configuration; replaces the edition's built-in settings
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Root of the static site the pages and index are written into
    #[arg(short, long, default_value = "public")]
    pub public_root: PathBuf,

    /// Bearer token for the inference endpoints
    #[arg(long, env = "HF_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,
}
