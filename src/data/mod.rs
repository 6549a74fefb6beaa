//! Core data models for Cinewatch
//!
//! This module contains the canonical movie and collection types shared by
//! the fetch flows, the view state and the renderer, plus the OMDb client,
//! the normalizer and the local mock data.

#[cfg(test)]
pub(crate) mod fake;
pub mod mock;
pub mod normalize;
pub mod omdb;

pub use mock::{mock_collection, mock_movies};
pub use normalize::{normalize, normalize_detail, normalize_stub, MovieSource};
pub use omdb::{MovieApi, MovieDetail, OmdbClient, OmdbError, SearchHit};

use serde::{Deserialize, Serialize};

/// A movie as displayed and persisted by the application
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Movie {
    /// IMDb id (or a local id for mock entries)
    pub id: String,
    pub title: String,
    /// Absent when OMDb has no poster
    pub poster_url: Option<String>,
    pub overview: String,
    /// `YYYY-MM-DD`, `YYYY-01-01` when only the year is known, or empty
    pub release_date: String,
    pub rating: Option<String>,
    pub runtime: Option<String>,
    pub director: Option<String>,
    pub actors: Option<String>,
    pub genre: Option<String>,
    /// Payload this movie was normalized from; `None` for local mock data
    pub raw: Option<MovieSource>,
}

impl Movie {
    /// True when the movie was built from a full detail record
    pub fn has_detail(&self) -> bool {
        matches!(self.raw, Some(MovieSource::Detail(_)))
    }

    /// Four-character year prefix of the release date, if any
    pub fn year(&self) -> Option<&str> {
        self.release_date.get(..4)
    }
}

/// A named, described, ordered result set
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Collection {
    pub name: String,
    pub overview: String,
    pub parts: Vec<Movie>,
}

impl Collection {
    pub fn new(name: impl Into<String>, overview: impl Into<String>, parts: Vec<Movie>) -> Self {
        Self {
            name: name.into(),
            overview: overview.into(),
            parts,
        }
    }

    /// Placeholder shown before the first query is submitted
    pub fn no_search_yet() -> Self {
        Self::new(
            "No search yet",
            "Type a movie title and click Search or press Enter.",
            Vec::new(),
        )
    }

    /// Collection of OMDb search results for `query`
    pub fn search_results(query: &str, parts: Vec<Movie>) -> Self {
        Self::new(
            format!("OMDb results for \"{}\"", query),
            format!("Showing {} results (OMDb)", parts.len()),
            parts,
        )
    }
}
