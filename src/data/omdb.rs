//! OMDb API client
//!
//! This module provides functionality to search the OMDb movie database by
//! title and to look up a single title by IMDb id. Responses are kept in their
//! raw OMDb shape so they can be cached verbatim and normalized later.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Base URL for the OMDb API
pub const OMDB_BASE_URL: &str = "https://www.omdbapi.com/";

/// Errors that can occur when talking to OMDb
#[derive(Debug, Error)]
pub enum OmdbError {
    /// Transport failure or non-success HTTP status
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// Failed to parse JSON response
    #[error("Failed to parse JSON response: {0}")]
    ParseError(#[from] serde_json::Error),
}

/// One entry of a title search, before detail enrichment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchHit {
    #[serde(rename = "imdbID", default)]
    pub imdb_id: String,
    #[serde(rename = "Title", skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(rename = "Year", skip_serializing_if = "Option::is_none")]
    pub year: Option<String>,
    #[serde(rename = "Poster", skip_serializing_if = "Option::is_none")]
    pub poster: Option<String>,
    #[serde(rename = "Type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

/// A full by-id record including plot and credits
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovieDetail {
    #[serde(rename = "imdbID", default)]
    pub imdb_id: String,
    #[serde(rename = "Title", skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(rename = "Year", skip_serializing_if = "Option::is_none")]
    pub year: Option<String>,
    #[serde(rename = "Released", skip_serializing_if = "Option::is_none")]
    pub released: Option<String>,
    #[serde(rename = "Runtime", skip_serializing_if = "Option::is_none")]
    pub runtime: Option<String>,
    #[serde(rename = "Genre", skip_serializing_if = "Option::is_none")]
    pub genre: Option<String>,
    #[serde(rename = "Director", skip_serializing_if = "Option::is_none")]
    pub director: Option<String>,
    #[serde(rename = "Actors", skip_serializing_if = "Option::is_none")]
    pub actors: Option<String>,
    #[serde(rename = "Plot", skip_serializing_if = "Option::is_none")]
    pub plot: Option<String>,
    #[serde(rename = "Poster", skip_serializing_if = "Option::is_none")]
    pub poster: Option<String>,
    #[serde(rename = "imdbRating", skip_serializing_if = "Option::is_none")]
    pub imdb_rating: Option<String>,
}

/// Envelope of `?s=` responses
#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(rename = "Search", default)]
    search: Vec<SearchHit>,
    #[serde(rename = "Response")]
    response: Option<String>,
    #[serde(rename = "Error")]
    error: Option<String>,
}

/// Envelope of `?i=` responses; the record fields sit beside the status
#[derive(Debug, Deserialize)]
struct DetailResponse {
    #[serde(rename = "Response")]
    response: Option<String>,
    #[serde(rename = "Error")]
    error: Option<String>,
    #[serde(flatten)]
    detail: MovieDetail,
}

/// The two read-only queries the collection flows need
///
/// Implementations return `Ok` with an empty/`None` result when they have no
/// credential or the service reports no match, and `Err` only for transport
/// or decoding failures.
#[async_trait]
pub trait MovieApi: Send + Sync + std::fmt::Debug {
    /// Whether a credential is configured; when false every flow uses mock data
    fn is_configured(&self) -> bool;

    /// Search by title, returning stub records in service order
    async fn search_by_title(&self, title: &str) -> Result<Vec<SearchHit>, OmdbError>;

    /// Fetch the full record for an IMDb id
    async fn fetch_by_id(&self, id: &str) -> Result<Option<MovieDetail>, OmdbError>;
}

/// Client for the OMDb HTTP API
#[derive(Debug, Clone)]
pub struct OmdbClient {
    client: Client,
    api_key: Option<String>,
    base_url: String,
}

impl OmdbClient {
    /// Create a client; blank keys count as "not configured"
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key
                .map(|k| k.trim().to_string())
                .filter(|k| !k.is_empty()),
            base_url: OMDB_BASE_URL.to_string(),
        }
    }

    /// Point the client at another endpoint (mirrors, test servers)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Use a preconfigured HTTP client
    pub fn with_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }

    async fn get_text(&self, api_key: &str, params: &[(&str, &str)]) -> Result<String, OmdbError> {
        let response = self
            .client
            .get(&self.base_url)
            .query(&[("apikey", api_key)])
            .query(params)
            .send()
            .await?
            .error_for_status()?;
        Ok(response.text().await?)
    }
}

#[async_trait]
impl MovieApi for OmdbClient {
    fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    async fn search_by_title(&self, title: &str) -> Result<Vec<SearchHit>, OmdbError> {
        let Some(api_key) = self.api_key.as_deref() else {
            return Ok(Vec::new());
        };

        let text = self
            .get_text(api_key, &[("s", title), ("type", "movie")])
            .await?;
        parse_search_response(&text)
    }

    async fn fetch_by_id(&self, id: &str) -> Result<Option<MovieDetail>, OmdbError> {
        let Some(api_key) = self.api_key.as_deref() else {
            return Ok(None);
        };

        let text = self.get_text(api_key, &[("i", id), ("plot", "full")]).await?;
        parse_detail_response(&text)
    }
}

/// Parse a title-search body; a `"Response": "False"` body is an empty result
pub(crate) fn parse_search_response(text: &str) -> Result<Vec<SearchHit>, OmdbError> {
    let response: SearchResponse = serde_json::from_str(text)?;
    if response.response.as_deref() == Some("False") {
        debug!(error = ?response.error, "OMDb search returned no match");
        return Ok(Vec::new());
    }
    Ok(response.search)
}

/// Parse a by-id body; a `"Response": "False"` body is `None`
pub(crate) fn parse_detail_response(text: &str) -> Result<Option<MovieDetail>, OmdbError> {
    let response: DetailResponse = serde_json::from_str(text)?;
    if response.response.as_deref() == Some("False") {
        debug!(error = ?response.error, "OMDb lookup returned no match");
        return Ok(None);
    }
    Ok(Some(response.detail))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SEARCH_BODY: &str = r#"{
        "Search": [
            {"Title": "Inception", "Year": "2010", "imdbID": "tt1375666", "Type": "movie", "Poster": "https://img/inception.jpg"},
            {"Title": "Inception: The Cobol Job", "Year": "2010", "imdbID": "tt5295894", "Type": "movie", "Poster": "N/A"}
        ],
        "totalResults": "2",
        "Response": "True"
    }"#;

    const DETAIL_BODY: &str = r#"{
        "Title": "Inception", "Year": "2010", "Released": "16 Jul 2010", "Runtime": "148 min",
        "Genre": "Action, Adventure, Sci-Fi", "Director": "Christopher Nolan",
        "Actors": "Leonardo DiCaprio, Joseph Gordon-Levitt", "Plot": "A thief who steals corporate secrets.",
        "Poster": "https://img/inception.jpg", "imdbRating": "8.8", "imdbID": "tt1375666", "Response": "True"
    }"#;

    #[test]
    fn test_parse_search_response_returns_hits_in_order() {
        let hits = parse_search_response(SEARCH_BODY).unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].imdb_id, "tt1375666");
        assert_eq!(hits[1].title.as_deref(), Some("Inception: The Cobol Job"));
        assert_eq!(hits[1].poster.as_deref(), Some("N/A"));
    }

    #[test]
    fn test_parse_search_response_false_is_empty() {
        let hits =
            parse_search_response(r#"{"Response": "False", "Error": "Movie not found!"}"#).unwrap();
        assert!(hits.is_empty());
    }

    #[test]
    fn test_parse_search_response_invalid_json_is_error() {
        let result = parse_search_response("<html>");
        assert!(matches!(result, Err(OmdbError::ParseError(_))));
    }

    #[test]
    fn test_parse_detail_response_reads_all_fields() {
        let detail = parse_detail_response(DETAIL_BODY).unwrap().unwrap();
        assert_eq!(detail.imdb_id, "tt1375666");
        assert_eq!(detail.director.as_deref(), Some("Christopher Nolan"));
        assert_eq!(detail.released.as_deref(), Some("16 Jul 2010"));
        assert_eq!(detail.imdb_rating.as_deref(), Some("8.8"));
    }

    #[test]
    fn test_parse_detail_response_not_found_is_none() {
        let detail =
            parse_detail_response(r#"{"Response": "False", "Error": "Incorrect IMDb ID."}"#).unwrap();
        assert!(detail.is_none());
    }

    #[test]
    fn test_detail_serializes_back_to_omdb_shape() {
        let detail = parse_detail_response(DETAIL_BODY).unwrap().unwrap();
        let json = serde_json::to_value(&detail).unwrap();
        assert_eq!(json["imdbID"], "tt1375666");
        assert_eq!(json["Plot"], "A thief who steals corporate secrets.");
    }

    #[test]
    fn test_blank_key_is_not_configured() {
        assert!(!OmdbClient::new(None).is_configured());
        assert!(!OmdbClient::new(Some("   ".to_string())).is_configured());
        assert!(OmdbClient::new(Some("abc123".to_string())).is_configured());
    }

    #[tokio::test]
    async fn test_unconfigured_client_skips_network() {
        // Unroutable base URL: any request would fail, so success proves no request was made
        let client = OmdbClient::new(None).with_base_url("http://127.0.0.1:9/");

        assert!(client.search_by_title("Inception").await.unwrap().is_empty());
        assert!(client.fetch_by_id("tt1375666").await.unwrap().is_none());
    }
}
