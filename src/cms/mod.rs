//! CMS boundary: a pluggable read-only adapter over a headless CMS.
//!
//! The aggregator never talks HTTP directly; it goes through [`CmsBackend`],
//! which both the Directus and Strapi adapters implement. Backends return
//! plain JSON rows so collection shapes stay in one place (`content::model`).

mod directus;
mod query;
mod strapi;

pub use directus::DirectusClient;
pub use query::ItemsQuery;
pub use strapi::StrapiClient;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

use crate::config::{BackendKind, SiteConfig};

/// Errors surfaced by the CMS boundary.
///
/// "Not found" is not an error: an empty result set is a normal response
/// and callers translate it themselves.
#[derive(Debug, Error)]
pub enum CmsError {
    #[error("request to collection '{collection}' failed")]
    Request {
        collection: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("collection '{collection}' returned HTTP {status}")]
    Status {
        collection: String,
        status: reqwest::StatusCode,
    },

    #[error("unexpected payload from collection '{collection}': {reason}")]
    Payload { collection: String, reason: String },
}

/// Read-only access to a CMS collection.
///
/// Implementations translate an [`ItemsQuery`] into backend-specific query
/// parameters and normalize the response into a flat array of JSON rows.
#[async_trait]
pub trait CmsBackend: Send + Sync {
    /// Fetch items from a collection
    async fn fetch_collection(
        &self,
        collection: &str,
        query: &ItemsQuery,
    ) -> Result<Vec<Value>, CmsError>;
}

/// Build the backend selected by configuration
pub fn backend_from_config(config: &SiteConfig) -> Box<dyn CmsBackend> {
    match config.backend {
        BackendKind::Directus => Box::new(DirectusClient::new(
            &config.api_url,
            config.api_token.clone(),
        )),
        BackendKind::Strapi => Box::new(StrapiClient::new(
            &config.api_url,
            config.api_token.clone(),
        )),
    }
}
