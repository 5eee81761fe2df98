//! folio: the content core of a CMS-backed portfolio/blog site
//!
//! This crate aggregates structured content (articles, projects, tags,
//! links) from a headless CMS — Directus or Strapi, selected by
//! configuration — and renders stored markdown into sanitized HTML ready
//! for a view layer.

pub mod cms;
pub mod commands;
pub mod config;
pub mod content;
pub mod helpers;

use anyhow::Result;
use std::path::Path;

/// The main folio application: configuration plus the content services
/// built from it.
pub struct Folio {
    /// Site configuration
    pub config: config::SiteConfig,
    /// Resolved-content access over the configured CMS backend
    pub content: content::ContentAggregator,
    /// Markdown-to-HTML renderer
    pub renderer: content::MarkdownRenderer,
}

impl Folio {
    /// Create a folio instance from a directory containing `folio.yml`.
    /// Falls back to defaults (plus env overrides) when the file is absent.
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self> {
        let config_path = base_dir.as_ref().join("folio.yml");

        let config = if config_path.exists() {
            config::SiteConfig::load(&config_path)?
        } else {
            let mut config = config::SiteConfig::default();
            config.apply_env();
            config
        };

        Ok(Self::from_config(config))
    }

    /// Create a folio instance from an already-built configuration
    pub fn from_config(config: config::SiteConfig) -> Self {
        let backend = cms::backend_from_config(&config);
        Self {
            content: content::ContentAggregator::new(backend),
            renderer: content::MarkdownRenderer::new(),
            config,
        }
    }

    /// Render a markdown string to sanitized HTML, degrading to the raw
    /// content in a minimal wrapper when rendering fails
    pub fn render_markdown(&self, markdown: &str) -> String {
        self.renderer.render_or_raw(markdown)
    }
}
