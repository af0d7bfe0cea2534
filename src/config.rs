//! Pipeline configuration and the built-in edition presets.
//!
//! A run is driven by one [`PipelineConfig`]. It comes either from a YAML
//! file passed with `--config` or from one of the [`Edition`] presets, which
//! reproduce the three generators the site has always run: the main news
//! pages, the daily satire piece, and the smoke-test article.
//!
//! Every field has a default, so a YAML file only needs the keys it changes:
//!
//! ```yaml
//! sections:
//!   - name: espana
//!     label: España
//!     categories:
//!       - name: politica
//!         feeds: ["https://www.europapress.es/rss/rss.aspx"]
//! rewrite:
//!   temperature: 0.4
//! ```

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;
use tokio::fs;
use tracing::{info, instrument};

/// Hosted inference endpoint shared by the text and image calls.
pub const DEFAULT_TEXT_ENDPOINT: &str =
    "https://api-inference.huggingface.co/models/mistralai/Mistral-7B-Instruct-v0.2";
pub const DEFAULT_IMAGE_ENDPOINT: &str =
    "https://api-inference.huggingface.co/models/stabilityai/stable-diffusion-xl-base-1.0";

/// Placeholder substituted with the article text in rewrite prompts.
pub const TEXT_PLACEHOLDER: &str = "{texto}";
/// Placeholder substituted with the original headline in the title prompt.
pub const TITLE_PLACEHOLDER: &str = "{titulo}";

const FILLER_SENTENCES: [&str; 5] = [
    "Este hecho se produce en un contexto de decisiones institucionales, \
reacciones políticas y análisis económicos que continúan desarrollándose.",
    "Las administraciones implicadas no han detallado por ahora el calendario \
de las próximas medidas ni su alcance concreto.",
    "Distintos analistas consideran que la evolución de los acontecimientos \
dependerá de los acuerdos que se alcancen en las próximas semanas.",
    "El asunto forma parte de un debate más amplio que se ha mantenido abierto \
durante los últimos meses en distintos foros.",
    "Se esperan nuevas informaciones a medida que las partes hagan públicas \
sus posiciones y se conozcan más datos oficiales.",
];

const REAL_PROMPT: &str = r#"Redacta un artículo periodístico completo en español basado en los hechos que se indican a continuación.
Mantén únicamente hechos verificables.
Evita opiniones, ideología o referencias al medio.
Amplía con contexto institucional o histórico.
Longitud mínima: 500 palabras.

Hechos:
"""{texto}""""#;

const REAL_PROMPT_CONTEXT: &str = r#"Escribe una crónica informativa en español a partir de los siguientes hechos.
Estilo neutro, sin adjetivos valorativos ni citas inventadas.
Explica los antecedentes y las posibles consecuencias.
Longitud mínima: 500 palabras.

Hechos:
"""{texto}""""#;

const TITLE_PROMPT: &str = r#"Reescribe el siguiente titular periodístico en español.
Máximo 12 palabras. Estilo neutro y profesional. No uses comillas.

Titular:
"{titulo}""#;

const HUMOR_PROMPT: &str = r#"A partir de la siguiente noticia real, escribe una noticia de HUMOR y SÁTIRA en español.

Normas IMPORTANTES:
- No insultes a personas concretas
- No incites al odio
- Usa ironía, exageración y humor inteligente
- Mantén relación clara con el hecho real
- No menciones el medio original
- No digas que es una parodia explícitamente
- Longitud: 350-500 palabras
- Estilo de periódico satírico serio

Noticia base:
"""{texto}""""#;

const ILLUSTRATION_PREFIX: &str = "Ilustración satírica a color, estilo viñeta de prensa, \
sin texto ni rostros reconocibles, que represente la siguiente noticia: ";

/// Fatal problems detected before any work begins.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("HF_API_KEY is not set and this edition requires it")]
    MissingCredential,
    #[error("invalid configuration {path}: {source}")]
    Invalid {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },
}

/// Built-in configurations, one per historical generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Edition {
    /// Main site: Spanish and international news, themed pages.
    Real,
    /// One satirical article with an illustration.
    Humor,
    /// A fixed article that exercises rendering and indexing only.
    Test,
}

impl Edition {
    pub fn config(self) -> PipelineConfig {
        match self {
            Edition::Real => PipelineConfig::default(),
            Edition::Humor => PipelineConfig::humor(),
            Edition::Test => PipelineConfig::test(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Sections in visiting order.
    pub sections: Vec<SectionConfig>,
    pub selection: SelectionConfig,
    pub text: TextConfig,
    pub rewrite: RewriteConfig,
    pub title: TitleConfig,
    pub illustration: IllustrationConfig,
    pub render: RenderConfig,
    /// Abort before any I/O when no credential is supplied.
    pub require_api_key: bool,
    /// Replace `data/news_index.json` at the end of the run. Only the main
    /// edition owns the front-page index.
    pub write_index: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionConfig {
    pub name: String,
    /// Navigation label; derived from `name` when absent.
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub categories: Vec<CategoryConfig>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryConfig {
    pub name: String,
    #[serde(default)]
    pub feeds: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectionConfig {
    /// How many leading entries to take from each feed.
    pub entries_per_feed: usize,
    /// Visit one randomly chosen feed per category instead of all of them.
    pub random_feed: bool,
    /// Take one uniformly random entry instead of the leading ones.
    pub random_entry: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextConfig {
    /// Summaries shorter than this are padded from `filler_sentences`.
    pub min_summary_chars: usize,
    /// Appended in order, cycling only once every sentence has been used.
    pub filler_sentences: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RewriteConfig {
    pub enabled: bool,
    pub endpoint: String,
    /// Instruction templates; one is picked at random per entry.
    pub prompts: Vec<String>,
    pub max_new_tokens: u32,
    pub temperature: f32,
    pub timeout_secs: u64,
    /// Generated text must be strictly longer than this to be accepted.
    pub min_output_chars: usize,
    /// Appended to the input when the rewrite falls back.
    pub fallback_note: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TitleConfig {
    pub enabled: bool,
    pub prompt: String,
    pub max_new_tokens: u32,
    pub temperature: f32,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IllustrationConfig {
    pub enabled: bool,
    pub endpoint: String,
    pub prompt_prefix: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemplateKind {
    /// Full site chrome: header, navigation, card, footer.
    Themed,
    /// Bare document for satire and smoke-test pages.
    Minimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub template: TemplateKind,
    pub slug_max_chars: usize,
    pub site_name: String,
    /// Shown before the date at the foot of minimal pages.
    pub footer_note: String,
    /// Image shown on themed pages that have no illustration of their own.
    pub placeholder_image: Option<String>,
    /// Navigation entries added after the configured sections.
    pub extra_nav: Vec<String>,
}

fn category(name: &str, feeds: &[&str]) -> CategoryConfig {
    CategoryConfig {
        name: name.to_string(),
        feeds: feeds.iter().map(|f| f.to_string()).collect(),
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            sections: vec![
                SectionConfig {
                    name: "espana".to_string(),
                    label: Some("España".to_string()),
                    categories: vec![
                        category("politica", &["https://www.europapress.es/rss/rss.aspx"]),
                        category("economia", &["https://www.eldiario.es/rss/"]),
                        category(
                            "deportes",
                            &["https://www.marca.com/rss/futbol/primera-division.xml"],
                        ),
                    ],
                },
                SectionConfig {
                    name: "internacional".to_string(),
                    label: Some("Internacional".to_string()),
                    categories: vec![
                        category("politica", &["https://feeds.reuters.com/reuters/worldNews"]),
                        category("economia", &["http://feeds.bbci.co.uk/news/world/rss.xml"]),
                        category("deportes", &["https://www.espn.com/espn/rss/news"]),
                    ],
                },
            ],
            selection: SelectionConfig::default(),
            text: TextConfig::default(),
            rewrite: RewriteConfig::default(),
            title: TitleConfig::default(),
            illustration: IllustrationConfig::default(),
            render: RenderConfig::default(),
            require_api_key: true,
            write_index: true,
        }
    }
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            entries_per_feed: 1,
            random_feed: false,
            random_entry: false,
        }
    }
}

impl Default for TextConfig {
    fn default() -> Self {
        Self {
            min_summary_chars: 500,
            filler_sentences: FILLER_SENTENCES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl Default for RewriteConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            endpoint: DEFAULT_TEXT_ENDPOINT.to_string(),
            prompts: vec![REAL_PROMPT.to_string(), REAL_PROMPT_CONTEXT.to_string()],
            max_new_tokens: 900,
            temperature: 0.5,
            timeout_secs: 120,
            min_output_chars: 600,
            fallback_note: None,
        }
    }
}

impl Default for TitleConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            prompt: TITLE_PROMPT.to_string(),
            max_new_tokens: 30,
            temperature: 0.3,
            timeout_secs: 60,
        }
    }
}

impl Default for IllustrationConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            endpoint: DEFAULT_IMAGE_ENDPOINT.to_string(),
            prompt_prefix: ILLUSTRATION_PREFIX.to_string(),
            timeout_secs: 120,
        }
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            template: TemplateKind::Themed,
            slug_max_chars: 60,
            site_name: "Contexto Abierto".to_string(),
            footer_note: "Artículo generado automáticamente".to_string(),
            placeholder_image: Some("/img/placeholder.jpg".to_string()),
            extra_nav: vec!["Humor".to_string()],
        }
    }
}

impl PipelineConfig {
    /// Satire edition: one random entry from one random feed.
    pub fn humor() -> Self {
        Self {
            sections: vec![SectionConfig {
                name: "humor".to_string(),
                label: Some("Humor".to_string()),
                categories: vec![category(
                    "satira",
                    &[
                        "https://www.europapress.es/rss/rss.aspx",
                        "https://feeds.reuters.com/reuters/worldNews",
                    ],
                )],
            }],
            selection: SelectionConfig {
                entries_per_feed: 1,
                random_feed: true,
                random_entry: true,
            },
            text: TextConfig {
                min_summary_chars: 0,
                ..TextConfig::default()
            },
            rewrite: RewriteConfig {
                prompts: vec![HUMOR_PROMPT.to_string()],
                max_new_tokens: 600,
                temperature: 0.8,
                timeout_secs: 90,
                min_output_chars: 0,
                ..RewriteConfig::default()
            },
            title: TitleConfig {
                enabled: false,
                ..TitleConfig::default()
            },
            illustration: IllustrationConfig {
                enabled: true,
                ..IllustrationConfig::default()
            },
            render: RenderConfig {
                template: TemplateKind::Minimal,
                slug_max_chars: 40,
                footer_note: "Artículo de humor generado automáticamente".to_string(),
                ..RenderConfig::default()
            },
            require_api_key: false,
            write_index: false,
        }
    }

    /// Smoke-test edition: no feeds and no remote calls.
    pub fn test() -> Self {
        Self {
            sections: Vec::new(),
            rewrite: RewriteConfig {
                enabled: false,
                ..RewriteConfig::default()
            },
            title: TitleConfig {
                enabled: false,
                ..TitleConfig::default()
            },
            render: RenderConfig {
                template: TemplateKind::Minimal,
                footer_note: "Publicado automáticamente".to_string(),
                ..RenderConfig::default()
            },
            require_api_key: false,
            write_index: false,
            ..PipelineConfig::default()
        }
    }

    /// Whether any step of this configuration calls a remote endpoint.
    pub fn uses_remote_services(&self) -> bool {
        self.rewrite.enabled || self.title.enabled || self.illustration.enabled
    }

    /// Fail fast when the credential is required but missing.
    pub fn check_credential(&self, api_key: Option<&str>) -> Result<(), ConfigError> {
        let present = api_key.is_some_and(|k| !k.trim().is_empty());
        if self.require_api_key && !present {
            return Err(ConfigError::MissingCredential);
        }
        Ok(())
    }
}

impl SectionConfig {
    pub fn display_label(&self) -> String {
        self.label
            .clone()
            .unwrap_or_else(|| crate::utils::upcase(&self.name))
    }
}

/// Parse a YAML pipeline configuration.
pub fn parse_config(yaml: &str, origin: &str) -> Result<PipelineConfig, ConfigError> {
    serde_yaml::from_str(yaml).map_err(|source| ConfigError::Invalid {
        path: origin.to_string(),
        source,
    })
}

/// Read and parse a YAML pipeline configuration from disk.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn load_config(path: &Path) -> Result<PipelineConfig, Box<dyn std::error::Error>> {
    let yaml = fs::read_to_string(path).await?;
    let config = parse_config(&yaml, &path.display().to_string())?;
    info!(
        sections = config.sections.len(),
        template = ?config.render.template,
        "Loaded configuration"
    );
    Ok(config)
}
