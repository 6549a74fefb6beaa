//! Local placeholder movies
//!
//! Used whenever no OMDb credential is configured, force-mock is on, or every
//! network path has failed.

use super::{Collection, Movie};

/// Number of placeholder movies
pub const MOCK_MOVIE_COUNT: usize = 12;

/// The placeholder movies, ids `m1`..`m12`, released 2016 through 2025
pub fn mock_movies() -> Vec<Movie> {
    (0..MOCK_MOVIE_COUNT)
        .map(|i| Movie {
            id: format!("m{}", i + 1),
            title: format!("Mock Movie {}", i + 1),
            poster_url: None,
            overview: format!("This is local mock movie #{}.", i + 1),
            release_date: format!("{}-01-01", 2016 + (i % 10)),
            rating: None,
            runtime: None,
            director: None,
            actors: None,
            genre: None,
            raw: None,
        })
        .collect()
}

/// The mock movies wrapped as a collection
pub fn mock_collection() -> Collection {
    Collection::new(
        "Local Mock Collection",
        "Local mock movies used while API is unreachable or Force Mock is ON.",
        mock_movies(),
    )
}
