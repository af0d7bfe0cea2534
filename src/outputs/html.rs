//! Static HTML article pages.
//!
//! Two fixed document templates are available (see [`TemplateKind`]). Title
//! and body text are interpolated as-is: they are not escaped, so text
//! containing markup-significant characters ends up in the document
//! verbatim.
//!
//! # Output Path
//!
//! ```text
//! public_root/
//! └── noticias/
//!     └── {section}/
//!         └── {category}/
//!             └── {YYYY-MM-DD}-{slug}.html
//! ```
//!
//! The slug is truncated, so two same-day titles with the same slug prefix
//! share a path and the later write replaces the earlier one.

use crate::config::{RenderConfig, TemplateKind};
use crate::models::{ArticleDraft, Placement};
use crate::utils::{file_date, slugify_title, visible_date};
use chrono::NaiveDate;
use itertools::Itertools;
use std::error::Error;
use std::path::Path;
use tokio::fs;
use tracing::{info, instrument};

/// One entry in the themed header navigation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavLink {
    pub label: String,
    /// CSS class, usually the section key.
    pub class: String,
}

/// Everything a template needs besides the draft itself.
#[derive(Debug, Clone)]
pub struct PageContext<'a> {
    pub config: &'a RenderConfig,
    pub nav: &'a [NavLink],
    pub date: NaiveDate,
}

/// Directory of a placement, relative to the public root.
pub fn article_dir(placement: &Placement) -> String {
    format!("noticias/{}/{}", placement.section, placement.category)
}

/// Site-relative path an article with this title will be written to.
pub fn article_path(placement: &Placement, title: &str, date: NaiveDate, slug_max_chars: usize) -> String {
    format!(
        "{}/{}-{}.html",
        article_dir(placement),
        file_date(date),
        slugify_title(title, slug_max_chars)
    )
}

fn paragraphs_html(draft: &ArticleDraft) -> String {
    draft
        .paragraphs()
        .into_iter()
        .map(|p| format!("<p>{p}</p>"))
        .join("\n")
}

fn image_html(src: &str, alt: &str) -> String {
    let src = if src.starts_with('/') || src.contains("://") {
        src.to_string()
    } else {
        format!("/{src}")
    };
    format!("<img src=\"{src}\" alt=\"{alt}\">")
}

fn render_themed(draft: &ArticleDraft, ctx: &PageContext<'_>) -> String {
    let config = ctx.config;
    let title = &draft.title;
    let nav = ctx
        .nav
        .iter()
        .map(|link| format!("    <a href=\"/\" class=\"{}\">{}</a>", link.class, link.label))
        .join("\n");
    let image = draft
        .image_path
        .as_deref()
        .or(config.placeholder_image.as_deref())
        .map(|src| format!("  {}\n", image_html(src, title)))
        .unwrap_or_default();

    format!(
        r#"<!DOCTYPE html>
<html lang="es">
<head>
<meta charset="UTF-8">
<title>{title}</title>
<link rel="stylesheet" href="/css/style.css">
</head>

<body>

<header class="top-bar">
  <h1><a href="/" style="color:white;text-decoration:none;">{site}</a></h1>
  <nav>
{nav}
  </nav>
</header>

<main class="container">
<article class="card {section}">
{image}  <div class="card-content">
    <span class="date">{date}</span>
    <h2>{title}</h2>
{paragraphs}
    <hr>
    <p class="source">
      <strong>Fuente original:</strong>
      <a href="{link}" target="_blank" rel="noopener">Consultar noticia original</a>
    </p>
  </div>
</article>
</main>

<footer>
&copy; {site} - Proyecto automatizado
</footer>

</body>
</html>
"#,
        site = config.site_name,
        section = draft.placement.section,
        date = visible_date(ctx.date),
        paragraphs = paragraphs_html(draft),
        link = draft.source_link,
    )
}

fn render_minimal(draft: &ArticleDraft, ctx: &PageContext<'_>) -> String {
    let title = &draft.title;
    let image = draft
        .image_path
        .as_deref()
        .map(|src| format!("{}\n\n", image_html(src, title)))
        .unwrap_or_default();
    let source = if draft.source_link.is_empty() {
        String::new()
    } else {
        format!(
            "<p class=\"source\"><a href=\"{}\" target=\"_blank\" rel=\"noopener\">Fuente original</a></p>\n",
            draft.source_link
        )
    };

    format!(
        r#"<!DOCTYPE html>
<html lang="es">
<head>
<meta charset="UTF-8">
<title>{title}</title>
</head>
<body>

<h1>{title}</h1>

{image}{paragraphs}

<hr>
{source}<p><em>{note} · {date}</em></p>

</body>
</html>
"#,
        paragraphs = paragraphs_html(draft),
        note = ctx.config.footer_note,
        date = visible_date(ctx.date),
    )
}

/// Build the full HTML document for a draft.
pub fn render_document(draft: &ArticleDraft, ctx: &PageContext<'_>) -> String {
    match ctx.config.template {
        TemplateKind::Themed => render_themed(draft, ctx),
        TemplateKind::Minimal => render_minimal(draft, ctx),
    }
}

/// Render a draft and write it under `public_root`.
///
/// Returns the site-relative path of the written file. An existing file at
/// that path is overwritten.
#[instrument(level = "info", skip_all, fields(section = %draft.placement.section, category = %draft.placement.category))]
pub async fn write_article(
    draft: &ArticleDraft,
    ctx: &PageContext<'_>,
    public_root: &Path,
) -> Result<String, Box<dyn Error>> {
    let relative = article_path(&draft.placement, &draft.title, ctx.date, ctx.config.slug_max_chars);
    fs::create_dir_all(public_root.join(article_dir(&draft.placement))).await?;

    let html = render_document(draft, ctx);
    let absolute = public_root.join(&relative);
    fs::write(&absolute, html).await?;
    info!(path = %absolute.display(), "Wrote article");
    Ok(relative)
}
