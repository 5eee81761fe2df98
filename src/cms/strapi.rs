//! Strapi REST adapter

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{Map, Value};

use super::{CmsBackend, CmsError, ItemsQuery};

/// Client for the Strapi content API (`GET {base}/api/{collection}`).
///
/// Strapi nests every row as `{id, attributes: {...}}` and wraps relations
/// in further `data` envelopes. [`flatten_attributes`] normalizes that to
/// the flat row shape the aggregator consumes, so the two backends are
/// interchangeable behind [`CmsBackend`].
pub struct StrapiClient {
    base_url: String,
    token: Option<String>,
    client: Client,
}

impl StrapiClient {
    pub fn new(base_url: &str, token: Option<String>) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
            client: Client::new(),
        }
    }

    fn params(query: &ItemsQuery) -> Vec<(String, String)> {
        let mut params = Vec::new();

        for (i, field) in query.fields.iter().enumerate() {
            params.push((format!("fields[{}]", i), field.clone()));
        }
        for (field, value) in &query.filters {
            params.push((format!("filters[{}][$eq]", field), value.clone()));
        }
        if let Some(sort) = &query.sort {
            let sort = match sort.strip_prefix('-') {
                Some(field) => format!("{}:desc", field),
                None => format!("{}:asc", sort),
            };
            params.push(("sort[0]".to_string(), sort));
        }
        if let Some(limit) = query.limit {
            params.push(("pagination[pageSize]".to_string(), limit.to_string()));
        }
        if let Some(page) = query.page {
            params.push(("pagination[page]".to_string(), page.to_string()));
        }
        if let Some(locale) = &query.locale {
            params.push(("locale".to_string(), locale.clone()));
        }

        params
    }
}

#[async_trait]
impl CmsBackend for StrapiClient {
    async fn fetch_collection(
        &self,
        collection: &str,
        query: &ItemsQuery,
    ) -> Result<Vec<Value>, CmsError> {
        let url = format!("{}/api/{}", self.base_url, collection);

        let mut request = self.client.get(&url).query(&Self::params(query));
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        tracing::debug!(collection, %url, "fetching strapi collection");

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
            Some(Value::Array(rows)) => {
                Ok(rows.into_iter().map(flatten_attributes).collect())
            }
            _ => Err(CmsError::Payload {
                collection: collection.to_string(),
                reason: "missing 'data' array".to_string(),
            }),
        }
    }
}

/// Collapse Strapi's response nesting into flat rows.
///
/// `{id: 1, attributes: {title: "x", tags: {data: [...]}}}` becomes
/// `{id: 1, title: "x", tags: [...]}`, recursively.
pub fn flatten_attributes(value: Value) -> Value {
    match value {
        Value::Object(mut map) => {
            // Unwrap a relation envelope: {"data": ...}
            if map.len() == 1 {
                if let Some(data) = map.remove("data") {
                    return flatten_attributes(data);
                }
            }

            let mut flat = Map::new();
            for (key, inner) in map {
                if key == "attributes" {
                    if let Value::Object(attrs) = inner {
                        for (attr_key, attr_value) in attrs {
                            flat.insert(attr_key, flatten_attributes(attr_value));
                        }
                        continue;
                    }
                    flat.insert(key, inner);
                } else {
                    flat.insert(key, flatten_attributes(inner));
                }
            }
            Value::Object(flat)
        }
        Value::Array(items) => {
            Value::Array(items.into_iter().map(flatten_attributes).collect())
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_params_translate_sort_and_pagination() {
        let query = ItemsQuery::new()
            .fields(["title"])
            .filter_eq("slug", "intro")
            .sort("-publishDate")
            .limit(3)
            .page(2)
            .locale("es");

        let params = StrapiClient::params(&query);
        assert!(params.contains(&("fields[0]".to_string(), "title".to_string())));
        assert!(params.contains(&("filters[slug][$eq]".to_string(), "intro".to_string())));
        assert!(params.contains(&("sort[0]".to_string(), "publishDate:desc".to_string())));
        assert!(params.contains(&("pagination[pageSize]".to_string(), "3".to_string())));
        assert!(params.contains(&("pagination[page]".to_string(), "2".to_string())));
        assert!(params.contains(&("locale".to_string(), "es".to_string())));
    }

    #[test]
    fn test_flatten_lifts_attributes() {
        let row = json!({
            "id": 7,
            "attributes": {
                "title": "Hello",
                "slug": "hello"
            }
        });
        let flat = flatten_attributes(row);
        assert_eq!(flat["id"], 7);
        assert_eq!(flat["title"], "Hello");
        assert_eq!(flat["slug"], "hello");
        assert!(flat.get("attributes").is_none());
    }

    #[test]
    fn test_flatten_unwraps_nested_relations() {
        let row = json!({
            "id": 1,
            "attributes": {
                "title": "Post",
                "tags": {
                    "data": [
                        {"id": 2, "attributes": {"name": "rust"}}
                    ]
                }
            }
        });
        let flat = flatten_attributes(row);
        assert_eq!(flat["tags"][0]["name"], "rust");
        assert_eq!(flat["tags"][0]["id"], 2);
    }

    #[test]
    fn test_flatten_passes_scalars_through() {
        assert_eq!(flatten_attributes(json!("plain")), json!("plain"));
        assert_eq!(flatten_attributes(json!([1, 2])), json!([1, 2]));
    }
}
