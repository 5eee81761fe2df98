//! Directus REST adapter

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;

use super::{CmsBackend, CmsError, ItemsQuery};

/// Client for the Directus items API (`GET {base}/items/{collection}`).
///
/// Responses arrive wrapped in a `{"data": [...]}` envelope which is
/// unwrapped here so callers only ever see row arrays.
pub struct DirectusClient {
    base_url: String,
    token: Option<String>,
    client: Client,
}

impl DirectusClient {
    pub fn new(base_url: &str, token: Option<String>) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
            client: Client::new(),
        }
    }

    fn params(query: &ItemsQuery) -> Vec<(String, String)> {
        let mut params = Vec::new();

        if !query.fields.is_empty() {
            params.push(("fields".to_string(), query.fields.join(",")));
        }
        for (field, value) in &query.filters {
            params.push((format!("filter[{}][_eq]", field), value.clone()));
        }
        if let Some(sort) = &query.sort {
            params.push(("sort".to_string(), sort.clone()));
        }
        if let Some(limit) = query.limit {
            params.push(("limit".to_string(), limit.to_string()));
        }
        if let Some(page) = query.page {
            params.push(("page".to_string(), page.to_string()));
        }
        // Directus localization goes through *_translations collections,
        // so the locale hint is not forwarded.

        params
    }
}

#[async_trait]
impl CmsBackend for DirectusClient {
    async fn fetch_collection(
        &self,
        collection: &str,
        query: &ItemsQuery,
    ) -> Result<Vec<Value>, CmsError> {
        let url = format!("{}/items/{}", self.base_url, collection);

        let mut request = self.client.get(&url).query(&Self::params(query));
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        tracing::debug!(collection, %url, "fetching directus collection");

        let response = request.send().await.map_err(|source| CmsError::Request {
            collection: collection.to_string(),
            source,
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(CmsError::Status {
                collection: collection.to_string(),
                status,
            });
        }

        let mut body: Value = response.json().await.map_err(|source| CmsError::Request {
            collection: collection.to_string(),
            source,
        })?;

        match body.get_mut("data").map(Value::take) {
            Some(Value::Array(rows)) => Ok(rows),
            _ => Err(CmsError::Payload {
                collection: collection.to_string(),
                reason: "missing 'data' array".to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_params_projection_and_filters() {
        let query = ItemsQuery::new()
            .fields(["slug", "title"])
            .filter_eq("slug", "intro")
            .filter_eq("status", "published")
            .sort("-date_created")
            .limit(1);

        let params = DirectusClient::params(&query);
        assert!(params.contains(&("fields".to_string(), "slug,title".to_string())));
        assert!(params.contains(&("filter[slug][_eq]".to_string(), "intro".to_string())));
        assert!(params.contains(&("filter[status][_eq]".to_string(), "published".to_string())));
        assert!(params.contains(&("sort".to_string(), "-date_created".to_string())));
        assert!(params.contains(&("limit".to_string(), "1".to_string())));
    }

    #[test]
    fn test_params_empty_query() {
        let params = DirectusClient::params(&ItemsQuery::new());
        assert!(params.is_empty());
    }

    #[test]
    fn test_locale_hint_is_ignored() {
        let params = DirectusClient::params(&ItemsQuery::new().locale("es"));
        assert!(params.is_empty());
    }
}
