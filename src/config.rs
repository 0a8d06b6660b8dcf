// src/config.rs
use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::{
    collections::HashSet,
    env, fs,
    path::{Path, PathBuf},
};
use tracing::{debug, info};

pub const DEFAULT_CONFIG_PATH: &str = "catalog.yaml";

/// Top-level settings, read from a YAML file.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    /// Where the rendered page is written.
    #[serde(default = "default_output")]
    pub output: PathBuf,
    /// HTML page holding one empty element per sheet `container_id`.
    /// When absent a bare page is generated.
    #[serde(default)]
    pub template: Option<PathBuf>,
    #[serde(default)]
    pub storefront: Storefront,
    #[serde(default)]
    pub fetch: FetchSettings,
    pub sheets: Vec<SheetConfig>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SheetConfig {
    /// `id` of the element the cards are rendered into.
    pub container_id: String,
    /// Editor, export or publish URL of the sheet.
    pub url: String,
    #[serde(default)]
    pub title: Option<String>,
}

/// Values baked into every card.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Storefront {
    pub whatsapp_number: String,
    pub message_prefix: String,
    pub fallback_image: String,
    pub currency: String,
}

impl Default for Storefront {
    fn default() -> Self {
        Storefront {
            whatsapp_number: "919629973204".to_string(),
            message_prefix: "I want to buy this dhoti: ".to_string(),
            fallback_image: "Logo.jpeg".to_string(),
            currency: "₹".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FetchSettings {
    pub max_retries: u32,
    pub initial_backoff_ms: u64,
    pub timeout_secs: u64,
    pub cache_control: String,
    pub max_concurrency: usize,
}

impl Default for FetchSettings {
    fn default() -> Self {
        FetchSettings {
            max_retries: 3,
            initial_backoff_ms: 500,
            timeout_secs: 30,
            cache_control: "public, max-age=3600".to_string(),
            max_concurrency: 3,
        }
    }
}

fn default_output() -> PathBuf {
    PathBuf::from("catalog.html")
}

impl Settings {
    /// Read, validate and apply env overrides (`CATALOG_OUTPUT`).
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let mut settings = Self::from_yaml_str(&text)
            .with_context(|| format!("loading config {}", path.display()))?;

        if let Ok(output) = env::var("CATALOG_OUTPUT") {
            debug!(%output, "output overridden from env");
            settings.output = PathBuf::from(output);
        }

        info!(
            sheets = settings.sheets.len(),
            output = %settings.output.display(),
            "config loaded"
        );
        Ok(settings)
    }

    pub fn from_yaml_str(text: &str) -> Result<Self> {
        let settings: Settings = serde_yaml::from_str(text).context("parsing YAML")?;
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<()> {
        if self.sheets.is_empty() {
            bail!("at least one sheet must be configured");
        }
        if self.fetch.max_concurrency == 0 {
            bail!("fetch.max_concurrency must be at least 1");
        }
        let mut seen = HashSet::new();
        for sheet in &self.sheets {
            let id = sheet.container_id.as_str();
            if id.trim().is_empty() {
                bail!("sheet {} has an empty container_id", sheet.url);
            }
            // matched verbatim against the page's `id` attributes
            if id.chars().any(char::is_whitespace) {
                bail!("container_id {:?} must not contain whitespace", id);
            }
            if !seen.insert(id) {
                bail!("duplicate container_id {:?}", id);
            }
            if sheet.url.trim().is_empty() {
                bail!("sheet {:?} has an empty url", id);
            }
        }
        Ok(())
    }
}
