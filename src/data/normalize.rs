//! Mapping of raw OMDb payloads into `Movie`
//!
//! A search stub and a full detail record share most fields under the same
//! names but carry different amounts of information. `MovieSource` keeps the
//! two apart so normalization is a single match instead of field sniffing.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::omdb::{MovieDetail, SearchHit};
use super::Movie;

/// Title used when the record has none
pub const UNTITLED: &str = "Untitled";

/// Overview used when a detail record has no usable plot
pub const NO_OVERVIEW: &str = "No overview available.";

/// Overview used for stubs that have not been enriched yet
pub const STUB_OVERVIEW: &str = "Click for details.";

/// OMDb's "not available" marker
pub const NOT_AVAILABLE: &str = "N/A";

/// Raw payload a `Movie` was built from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "record", rename_all = "snake_case")]
pub enum MovieSource {
    /// Title-search result
    Stub(SearchHit),
    /// Full by-id record
    Detail(MovieDetail),
}

/// Builds the canonical `Movie` for a raw record.
///
/// Normalizing `movie.raw` of the result yields the same `Movie` again.
pub fn normalize(source: &MovieSource) -> Movie {
    match source {
        MovieSource::Detail(detail) => Movie {
            id: detail.imdb_id.clone(),
            title: title_or_default(detail.title.as_deref()),
            poster_url: poster_url(detail.poster.as_deref()),
            overview: present(detail.plot.as_deref())
                .unwrap_or(NO_OVERVIEW)
                .to_string(),
            release_date: canonical_release_date(
                detail.released.as_deref(),
                detail.year.as_deref(),
            ),
            rating: Some(
                present(detail.imdb_rating.as_deref())
                    .unwrap_or(NOT_AVAILABLE)
                    .to_string(),
            ),
            runtime: present(detail.runtime.as_deref()).map(str::to_string),
            director: present(detail.director.as_deref()).map(str::to_string),
            actors: present(detail.actors.as_deref()).map(str::to_string),
            genre: present(detail.genre.as_deref()).map(str::to_string),
            raw: Some(source.clone()),
        },
        MovieSource::Stub(hit) => Movie {
            id: hit.imdb_id.clone(),
            title: title_or_default(hit.title.as_deref()),
            poster_url: poster_url(hit.poster.as_deref()),
            overview: STUB_OVERVIEW.to_string(),
            release_date: canonical_release_date(None, hit.year.as_deref()),
            rating: None,
            runtime: None,
            director: None,
            actors: None,
            genre: None,
            raw: Some(source.clone()),
        },
    }
}

/// Shorthand for normalizing a search hit
pub fn normalize_stub(hit: &SearchHit) -> Movie {
    normalize(&MovieSource::Stub(hit.clone()))
}

/// Shorthand for normalizing a detail record
pub fn normalize_detail(detail: &MovieDetail) -> Movie {
    normalize(&MovieSource::Detail(detail.clone()))
}

/// Poster URL, with the "not available" sentinel and blanks treated as absent
pub fn poster_url(poster: Option<&str>) -> Option<String> {
    present(poster).map(str::to_string)
}

/// Canonical ISO-ish date from a `Released` value and/or a `Year` value.
///
/// `16 Jul 2010` becomes `2010-07-16`; when only a year is usable it becomes
/// `YYYY-01-01`; with nothing usable the result is empty.
pub fn canonical_release_date(released: Option<&str>, year: Option<&str>) -> String {
    if let Some(released) = present(released) {
        if let Ok(date) = NaiveDate::parse_from_str(released, "%d %b %Y") {
            return date.format("%Y-%m-%d").to_string();
        }
        if NaiveDate::parse_from_str(released, "%Y-%m-%d").is_ok() {
            return released.to_string();
        }
    }

    year.and_then(year_prefix)
        .map(|y| format!("{}-01-01", y))
        .unwrap_or_default()
}

/// Leading four-digit year, so ranges like `2010–2012` still map
fn year_prefix(year: &str) -> Option<&str> {
    let prefix = year.trim().get(..4)?;
    prefix.bytes().all(|b| b.is_ascii_digit()).then_some(prefix)
}

fn title_or_default(title: Option<&str>) -> String {
    present(title).unwrap_or(UNTITLED).to_string()
}

/// Trimmed field value unless blank or `N/A`
fn present(value: Option<&str>) -> Option<&str> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty() && *v != NOT_AVAILABLE)
}
