//! Integration tests for OmdbClient.
//!
//! Uses wiremock for HTTP mocking. Tests cover query parameters, the
//! "Response": "False" envelope, status mapping and the unconfigured client.

use std::time::Duration;

use cinewatch::data::{MovieApi, OmdbClient, OmdbError};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const INCEPTION_SEARCH: &str = r#"{
    "Search": [
        {"Title": "Inception", "Year": "2010", "imdbID": "tt1375666", "Type": "movie", "Poster": "https://img.example/inception.jpg"},
        {"Title": "Inception: The Cobol Job", "Year": "2010", "imdbID": "tt5295894", "Type": "movie", "Poster": "N/A"}
    ],
    "totalResults": "2",
    "Response": "True"
}"#;

const INCEPTION_DETAIL: &str = r#"{
    "Title": "Inception",
    "Year": "2010",
    "Released": "16 Jul 2010",
    "Runtime": "148 min",
    "Genre": "Action, Adventure, Sci-Fi",
    "Director": "Christopher Nolan",
    "Actors": "Leonardo DiCaprio, Joseph Gordon-Levitt",
    "Plot": "A thief who steals corporate secrets through dream-sharing technology.",
    "Poster": "https://img.example/inception.jpg",
    "imdbRating": "8.8",
    "imdbID": "tt1375666",
    "Response": "True"
}"#;

fn create_test_client(mock_server: &MockServer) -> OmdbClient {
    let http = reqwest::Client::builder()
        .timeout(Duration::from_secs(5))
        .build()
        .expect("failed to build http client");
    OmdbClient::new(Some("test-key".to_string()))
        .with_base_url(format!("{}/", mock_server.uri()))
        .with_client(http)
}

#[tokio::test]
async fn test_search_sends_key_and_title() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .and(query_param("apikey", "test-key"))
        .and(query_param("s", "Inception"))
        .and(query_param("type", "movie"))
        .respond_with(ResponseTemplate::new(200).set_body_string(INCEPTION_SEARCH))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server);
    let hits = client
        .search_by_title("Inception")
        .await
        .expect("search failed");

    assert_eq!(hits.len(), 2);
    assert_eq!(hits[0].imdb_id, "tt1375666");
    assert_eq!(hits[0].title.as_deref(), Some("Inception"));
    assert_eq!(hits[1].poster.as_deref(), Some("N/A"));
}

#[tokio::test]
async fn test_search_no_match_is_empty() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(query_param("s", "zzzz"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(r#"{"Response": "False", "Error": "Movie not found!"}"#),
        )
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server);
    let hits = client.search_by_title("zzzz").await.expect("search failed");

    assert!(hits.is_empty(), "expected no hits for a failed lookup");
}

#[tokio::test]
async fn test_search_server_error_is_request_failure() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server);
    let result = client.search_by_title("Inception").await;

    assert!(matches!(result, Err(OmdbError::RequestFailed(_))));
}

#[tokio::test]
async fn test_search_garbage_body_is_parse_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>busy</html>"))
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server);
    let result = client.search_by_title("Inception").await;

    assert!(matches!(result, Err(OmdbError::ParseError(_))));
}

#[tokio::test]
async fn test_fetch_by_id_requests_full_plot() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(query_param("apikey", "test-key"))
        .and(query_param("i", "tt1375666"))
        .and(query_param("plot", "full"))
        .respond_with(ResponseTemplate::new(200).set_body_string(INCEPTION_DETAIL))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server);
    let detail = client
        .fetch_by_id("tt1375666")
        .await
        .expect("fetch failed")
        .expect("expected a record");

    assert_eq!(detail.imdb_id, "tt1375666");
    assert_eq!(detail.runtime.as_deref(), Some("148 min"));
    assert_eq!(detail.imdb_rating.as_deref(), Some("8.8"));
    assert_eq!(detail.released.as_deref(), Some("16 Jul 2010"));
}

#[tokio::test]
async fn test_fetch_by_id_not_found_is_none() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(query_param("i", "tt0000000"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(r#"{"Response": "False", "Error": "Incorrect IMDb ID."}"#),
        )
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server);
    let detail = client.fetch_by_id("tt0000000").await.expect("fetch failed");

    assert!(detail.is_none());
}

#[tokio::test]
async fn test_unconfigured_client_makes_no_requests() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string(INCEPTION_SEARCH))
        .expect(0)
        .mount(&mock_server)
        .await;

    let client = OmdbClient::new(Some("   ".to_string()))
        .with_base_url(format!("{}/", mock_server.uri()));

    assert!(!client.is_configured());
    assert!(client.search_by_title("Inception").await.unwrap().is_empty());
    assert!(client.fetch_by_id("tt1375666").await.unwrap().is_none());
}
