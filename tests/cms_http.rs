//! End-to-end tests over mocked CMS HTTP endpoints

use httpmock::prelude::*;
use serde_json::json;

use folio::cms::{CmsBackend, CmsError, DirectusClient, ItemsQuery, StrapiClient};
use folio::content::ContentAggregator;

fn directus_aggregator(server: &MockServer) -> ContentAggregator {
    ContentAggregator::new(Box::new(DirectusClient::new(&server.base_url(), None)))
}

fn mock_collection(server: &MockServer, path: &str, rows: serde_json::Value) {
    server.mock(|when, then| {
        when.method(GET).path(path.to_string());
        then.status(200).json_body(json!({ "data": rows }));
    });
}

#[tokio::test]
async fn test_directus_list_articles_end_to_end() {
    let server = MockServer::start();

    mock_collection(
        &server,
        "/items/articles",
        json!([
            {"id": "a1", "slug": "uno", "status": "published",
             "date_created": "2024-03-01T00:00:00Z"},
            {"id": "a2", "slug": "dos", "status": "published",
             "date_created": "2024-04-01T00:00:00Z"}
        ]),
    );
    mock_collection(
        &server,
        "/items/articles_translations",
        json!([
            {"id": 1, "articles_id": "a1", "languages_code": "es",
             "title": "Uno", "summary": "resumen"}
        ]),
    );
    mock_collection(
        &server,
        "/items/tags",
        json!([{"id": 1, "name": "rust"}, {"id": 2, "name": "embedded"}]),
    );
    mock_collection(
        &server,
        "/items/articles_tags",
        json!([
            {"id": 1, "articles_id": "a1", "tags_id": 2},
            {"id": 2, "articles_id": "a1", "tags_id": 1}
        ]),
    );

    let aggregator = directus_aggregator(&server);
    let articles = aggregator.list_articles("es").await.unwrap();

    let slugs: Vec<&str> = articles.iter().map(|a| a.slug.as_str()).collect();
    assert_eq!(slugs, vec!["dos", "uno"]);

    // Translated article carries its Spanish fields and resolved tag names
    assert_eq!(articles[1].title.as_deref(), Some("Uno"));
    assert_eq!(articles[1].summary.as_deref(), Some("resumen"));
    assert_eq!(articles[1].tag_names, vec!["embedded", "rust"]);
    assert_eq!(articles[1].date_display.as_deref(), Some("March 1, 2024"));

    // Untranslated article keeps base fields only
    assert!(articles[0].title.is_none());
    assert!(articles[0].tag_names.is_empty());
}

#[tokio::test]
async fn test_directus_sends_filter_and_auth_params() {
    let server = MockServer::start();

    let articles = server.mock(|when, then| {
        when.method(GET)
            .path("/items/articles")
            .query_param("filter[status][_eq]", "published")
            .query_param("filter[slug][_eq]", "uno")
            .query_param("limit", "1")
            .header("authorization", "Bearer sekrit");
        then.status(200).json_body(json!({
            "data": [{"id": "a1", "slug": "uno", "status": "published"}]
        }));
    });
    mock_collection(&server, "/items/articles_translations", json!([]));
    mock_collection(&server, "/items/tags", json!([]));
    mock_collection(&server, "/items/articles_tags", json!([]));

    let client = DirectusClient::new(&server.base_url(), Some("sekrit".to_string()));
    let aggregator = ContentAggregator::new(Box::new(client));

    let article = aggregator.article_by_slug("uno", "es").await.unwrap();
    assert_eq!(article.unwrap().slug, "uno");
    articles.assert();
}

#[tokio::test]
async fn test_directus_by_slug_empty_result_is_none() {
    let server = MockServer::start();
    mock_collection(&server, "/items/articles", json!([]));

    let aggregator = directus_aggregator(&server);
    let missing = aggregator.article_by_slug("nope", "en").await.unwrap();
    assert!(missing.is_none());
}

#[tokio::test]
async fn test_directus_http_error_surfaces_status() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/items/links");
        then.status(500);
    });

    let aggregator = directus_aggregator(&server);
    let err = aggregator.list_links().await.unwrap_err();
    match err {
        CmsError::Status { collection, status } => {
            assert_eq!(collection, "links");
            assert_eq!(status.as_u16(), 500);
        }
        other => panic!("expected status error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_directus_malformed_envelope_is_payload_error() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/items/tags");
        then.status(200).json_body(json!({"rows": []}));
    });

    let aggregator = directus_aggregator(&server);
    let err = aggregator.all_tags().await.unwrap_err();
    assert!(matches!(err, CmsError::Payload { .. }));
}

#[tokio::test]
async fn test_strapi_rows_are_flattened() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET)
            .path("/api/tags")
            .query_param("filters[name][$eq]", "rust");
        then.status(200).json_body(json!({
            "data": [
                {"id": 1, "attributes": {"name": "rust"}}
            ]
        }));
    });

    let client = StrapiClient::new(&server.base_url(), None);
    let query = ItemsQuery::new().filter_eq("name", "rust");
    let rows = client.fetch_collection("tags", &query).await.unwrap();

    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["id"], 1);
    assert_eq!(rows[0]["name"], "rust");
    assert!(rows[0].get("attributes").is_none());
}
