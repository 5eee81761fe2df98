//! Site configuration (folio.yml)

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Which headless CMS serves the content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    Directus,
    Strapi,
}

/// Main site configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    // Site
    pub title: String,
    pub author: String,

    // CMS
    pub backend: BackendKind,
    pub api_url: String,
    pub api_token: Option<String>,

    // Locales
    pub default_locale: String,
    pub locales: Vec<String>,

    // Assets
    pub placeholder_image: String,

    // Content
    pub related_limit: usize,

    // Store any additional fields
    #[serde(flatten)]
    pub extra: HashMap<String, serde_yaml::Value>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "Portfolio".to_string(),
            author: String::new(),

            backend: BackendKind::Directus,
            api_url: "http://localhost:8055".to_string(),
            api_token: None,

            default_locale: "en".to_string(),
            locales: vec!["en".to_string(), "es".to_string()],

            placeholder_image: "/placeholder-image.jpg".to_string(),

            related_limit: 3,

            extra: HashMap::new(),
        }
    }
}

impl SiteConfig {
    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        let mut config: SiteConfig = serde_yaml::from_str(&content)?;
        config.apply_env();
        Ok(config)
    }

    /// Override CMS endpoint settings from the environment.
    ///
    /// `FOLIO_API_URL` and `FOLIO_API_TOKEN` take precedence over the file,
    /// so deployments can point at a different CMS without editing config.
    pub fn apply_env(&mut self) {
        if let Ok(url) = std::env::var("FOLIO_API_URL") {
            if !url.is_empty() {
                self.api_url = url;
            }
        }
        if let Ok(token) = std::env::var("FOLIO_API_TOKEN") {
            if !token.is_empty() {
                self.api_token = Some(token);
            }
        }
    }

    /// Check whether a locale is one the site serves
    pub fn supports_locale(&self, locale: &str) -> bool {
        self.locales.iter().any(|l| l == locale)
    }
}

/// Pick the content locale from a request host name.
///
/// The `.es` domain serves Spanish; everything else falls back to English.
pub fn locale_from_host(host: &str) -> &'static str {
    let host = host.split(':').next().unwrap_or(host);
    if host.ends_with(".es") {
        "es"
    } else {
        "en"
    }
}
