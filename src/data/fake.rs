//! In-process `MovieApi` double for unit tests

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use super::omdb::{MovieApi, MovieDetail, OmdbError, SearchHit};

/// Scripted OMDb stand-in with call counters
#[derive(Debug, Default)]
pub struct FakeApi {
    configured: bool,
    searches: HashMap<String, Vec<SearchHit>>,
    details: HashMap<String, MovieDetail>,
    failing_searches: HashSet<String>,
    failing_details: HashSet<String>,
    search_delays: HashMap<String, Duration>,
    search_calls: AtomicUsize,
    detail_calls: AtomicUsize,
}

impl FakeApi {
    /// A fake with a credential configured and no data
    pub fn configured() -> Self {
        Self {
            configured: true,
            ..Default::default()
        }
    }

    /// A fake that behaves like a client without credential
    pub fn unconfigured() -> Self {
        Self::default()
    }

    pub fn with_search(mut self, title: &str, hits: Vec<SearchHit>) -> Self {
        self.searches.insert(title.to_lowercase(), hits);
        self
    }

    pub fn with_detail(mut self, detail: MovieDetail) -> Self {
        self.details.insert(detail.imdb_id.clone(), detail);
        self
    }

    pub fn with_failing_search(mut self, title: &str) -> Self {
        self.failing_searches.insert(title.to_lowercase());
        self
    }

    pub fn with_failing_detail(mut self, id: &str) -> Self {
        self.failing_details.insert(id.to_string());
        self
    }

    pub fn with_search_delay(mut self, title: &str, delay: Duration) -> Self {
        self.search_delays.insert(title.to_lowercase(), delay);
        self
    }

    pub fn search_calls(&self) -> usize {
        self.search_calls.load(Ordering::SeqCst)
    }

    pub fn detail_calls(&self) -> usize {
        self.detail_calls.load(Ordering::SeqCst)
    }
}

/// Builds a search hit the way OMDb returns one
pub fn hit(id: &str, title: &str, year: &str) -> SearchHit {
    SearchHit {
        imdb_id: id.to_string(),
        title: Some(title.to_string()),
        year: Some(year.to_string()),
        poster: Some("N/A".to_string()),
        kind: Some("movie".to_string()),
    }
}

/// Builds a detail record with plot and credits
pub fn detail(id: &str, title: &str, year: &str) -> MovieDetail {
    MovieDetail {
        imdb_id: id.to_string(),
        title: Some(title.to_string()),
        year: Some(year.to_string()),
        released: None,
        runtime: Some("120 min".to_string()),
        genre: Some("Drama".to_string()),
        director: Some("Jane Doe".to_string()),
        actors: Some("John Roe".to_string()),
        plot: Some(format!("Plot of {}.", title)),
        poster: None,
        imdb_rating: Some("7.0".to_string()),
    }
}

/// A transport-level failure without touching the network
fn transport_error() -> OmdbError {
    OmdbError::ParseError(serde_json::from_str::<serde_json::Value>("<html>").unwrap_err())
}

#[async_trait]
impl MovieApi for FakeApi {
    fn is_configured(&self) -> bool {
        self.configured
    }

    async fn search_by_title(&self, title: &str) -> Result<Vec<SearchHit>, OmdbError> {
        self.search_calls.fetch_add(1, Ordering::SeqCst);
        if !self.configured {
            return Ok(Vec::new());
        }
        let key = title.to_lowercase();
        if let Some(delay) = self.search_delays.get(&key) {
            tokio::time::sleep(*delay).await;
        }
        if self.failing_searches.contains(&key) {
            return Err(transport_error());
        }
        Ok(self.searches.get(&key).cloned().unwrap_or_default())
    }

    async fn fetch_by_id(&self, id: &str) -> Result<Option<MovieDetail>, OmdbError> {
        self.detail_calls.fetch_add(1, Ordering::SeqCst);
        if !self.configured {
            return Ok(None);
        }
        if self.failing_details.contains(id) {
            return Err(transport_error());
        }
        Ok(self.details.get(id).cloned())
    }
}
