//! Collection building flows
//!
//! Every flow follows the same pattern: check the cache, else ask OMDb, else
//! fall back to local mock data. Network and storage failures are logged with
//! their kind and then collapsed into the fallback, so callers always receive
//! something displayable.

use std::sync::Arc;

use futures::future::join_all;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::cache::{CacheStore, DEFAULT_TTL_HOURS};
use crate::data::{
    mock_collection, mock_movies, normalize_detail, normalize_stub, Collection, Movie, MovieApi,
    MovieDetail, OmdbError, SearchHit,
};

/// Number of results enriched with full details, and the "load more" step
pub const PAGE_SIZE: usize = 8;

/// Size of the recommended row
pub const RECOMMENDED_LIMIT: usize = 6;

/// Size of the recently-viewed row
pub const RECENT_LIMIT: usize = 6;

/// Size of the 2025 releases row
pub const RELEASES_LIMIT: usize = 8;

/// Detail records change rarely; keep them a week
pub const DETAIL_TTL_HOURS: u64 = 7 * 24;

/// Curated titles searched for the 2025 releases row
pub const SEED_2025_TITLES: [&str; 8] = [
    "A Minecraft Movie",
    "Wicked: For Good",
    "Lilo & Stitch",
    "Jurassic World: Rebirth",
    "Superman",
    "Mission: Impossible - The Final Reckoning",
    "Ne Zha 2",
    "F1: The Movie",
];

const RELEASES_KEY: &str = "cw:releases2025";

fn search_key(query: &str) -> String {
    format!("omdb:search:{}", query.to_lowercase())
}

fn detail_key(id: &str) -> String {
    format!("omdb:detail:{}", id)
}

fn recommend_key(query: &str) -> String {
    format!("omdb:recommend:{}", query.to_lowercase())
}

fn seed_key(title: &str) -> String {
    format!("omdb:seed:{}", title.to_lowercase())
}

/// Where a search collection came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectionOrigin {
    /// Built from OMDb data (fresh or cached)
    Omdb,
    /// Local placeholder data
    Mock,
    /// No query submitted yet
    NoQuery,
}

/// Result of the search flow
#[derive(Debug, Clone)]
pub struct SearchOutcome {
    pub collection: Collection,
    pub origin: CollectionOrigin,
}

impl SearchOutcome {
    fn mock() -> Self {
        Self {
            collection: mock_collection(),
            origin: CollectionOrigin::Mock,
        }
    }
}

/// Produces the collections and rows shown by the application
#[derive(Debug, Clone)]
pub struct CollectionBuilder {
    api: Arc<dyn MovieApi>,
    cache: Arc<CacheStore>,
}

impl CollectionBuilder {
    pub fn new(api: Arc<dyn MovieApi>, cache: Arc<CacheStore>) -> Self {
        Self { api, cache }
    }

    /// Whether flows may reach the network
    pub fn uses_network(&self, force_mock: bool) -> bool {
        !force_mock && self.api.is_configured()
    }

    /// Main search flow.
    ///
    /// The first `PAGE_SIZE` hits are enriched with detail records (fetched
    /// concurrently, cached for a week); a hit whose detail cannot be
    /// obtained stays a stub. Hits beyond the first page stay stubs.
    pub async fn search(&self, query: &str, force_mock: bool) -> SearchOutcome {
        if !self.uses_network(force_mock) {
            debug!(force_mock, "search served from mock data");
            return SearchOutcome::mock();
        }

        let query = query.trim();
        if query.is_empty() {
            return SearchOutcome {
                collection: Collection::no_search_yet(),
                origin: CollectionOrigin::NoQuery,
            };
        }

        match self.try_search(query).await {
            Ok(collection) => {
                info!(query, results = collection.parts.len(), "search completed");
                SearchOutcome {
                    collection,
                    origin: CollectionOrigin::Omdb,
                }
            }
            Err(e) => {
                warn!(query, error = %e, "search failed, falling back to mock data");
                SearchOutcome::mock()
            }
        }
    }

    async fn try_search(&self, query: &str) -> Result<Collection, OmdbError> {
        let hits = self.cached_search(query).await?;
        let (head, tail) = hits.split_at(hits.len().min(PAGE_SIZE));

        let details = join_all(head.iter().map(|hit| self.detail_for(&hit.imdb_id))).await;

        let mut parts: Vec<Movie> = head
            .iter()
            .zip(details)
            .map(|(hit, detail)| match detail {
                Some(detail) => normalize_detail(&detail),
                None => normalize_stub(hit),
            })
            .collect();
        parts.extend(tail.iter().map(normalize_stub));

        Ok(Collection::search_results(query, parts))
    }

    /// Background recommendation flow for `query`.
    ///
    /// Searches OMDb again rather than reusing the main search result, then
    /// resolves details for the top `RECOMMENDED_LIMIT` hits. Hits without a
    /// detail record are left out. An empty result means "keep the current
    /// row".
    pub async fn recommended(&self, query: &str) -> Result<Vec<Movie>, OmdbError> {
        let key = recommend_key(query);
        if let Some(movies) = self.cache.get::<Vec<Movie>>(&key) {
            debug!(query, "recommendations served from cache");
            return Ok(movies.into_iter().take(RECOMMENDED_LIMIT).collect());
        }

        let hits = self.api.search_by_title(query).await?;
        let details = join_all(
            hits.iter()
                .take(RECOMMENDED_LIMIT)
                .map(|hit| self.detail_for(&hit.imdb_id)),
        )
        .await;

        let movies: Vec<Movie> = details.iter().flatten().map(normalize_detail).collect();
        if !movies.is_empty() {
            self.store(&key, &movies, DEFAULT_TTL_HOURS);
        }
        Ok(movies)
    }

    /// The "2025 releases" row, built once per day.
    ///
    /// Each curated title is searched in order; a hit released in 2025 is
    /// preferred over the first hit. Falls back to the first mock movies when
    /// nothing was found.
    pub async fn releases(&self) -> Vec<Movie> {
        if let Some(cached) = self.cache.get::<Vec<Movie>>(RELEASES_KEY) {
            debug!("2025 releases served from cache");
            return cached;
        }

        let mut out = Vec::new();
        if self.api.is_configured() {
            for title in SEED_2025_TITLES {
                if out.len() >= RELEASES_LIMIT {
                    break;
                }
                match self.api.search_by_title(title).await {
                    Ok(hits) => {
                        if let Some(candidate) = pick_release(&hits) {
                            let movie = normalize_stub(candidate);
                            self.store(&seed_key(title), &movie, DEFAULT_TTL_HOURS);
                            out.push(movie);
                        }
                    }
                    Err(e) => warn!(title, error = %e, "seed title search failed"),
                }
            }
        }

        if out.is_empty() {
            debug!("no 2025 releases found, using mock data");
            return mock_movies().into_iter().take(RELEASES_LIMIT).collect();
        }

        self.store(RELEASES_KEY, &out, DEFAULT_TTL_HOURS);
        out
    }

    /// The "recently viewed" row: top hit for each recent term, newest first
    pub async fn recent(&self, terms: &[String]) -> Vec<Movie> {
        if !self.api.is_configured() {
            return Vec::new();
        }

        let mut out = Vec::new();
        for term in terms {
            if out.len() >= RECENT_LIMIT {
                break;
            }
            match self.cached_search(term).await {
                Ok(hits) => {
                    if let Some(top) = hits.first() {
                        out.push(normalize_stub(top));
                    }
                }
                Err(e) => warn!(term = term.as_str(), error = %e, "recent term search failed"),
            }
        }
        out
    }

    /// Resolves the full record for a selected card.
    ///
    /// Order: detail already embedded, per-id cache, OMDb lookup, and finally
    /// the card as it is.
    pub async fn resolve_detail(&self, movie: &Movie, force_mock: bool) -> Movie {
        if movie.has_detail() {
            return movie.clone();
        }

        if let Some(detail) = self.cache.get::<MovieDetail>(&detail_key(&movie.id)) {
            return normalize_detail(&detail);
        }

        if self.uses_network(force_mock) {
            match self.api.fetch_by_id(&movie.id).await {
                Ok(Some(detail)) => {
                    self.store(&detail_key(&movie.id), &detail, DETAIL_TTL_HOURS);
                    return normalize_detail(&detail);
                }
                Ok(None) => debug!(id = movie.id.as_str(), "no detail record"),
                Err(e) => warn!(id = movie.id.as_str(), error = %e, "detail lookup failed"),
            }
        }

        movie.clone()
    }

    async fn cached_search(&self, query: &str) -> Result<Vec<SearchHit>, OmdbError> {
        let key = search_key(query);
        if let Some(hits) = self.cache.get::<Vec<SearchHit>>(&key) {
            debug!(query, "search results served from cache");
            return Ok(hits);
        }

        let hits = self.api.search_by_title(query).await?;
        self.store(&key, &hits, DEFAULT_TTL_HOURS);
        Ok(hits)
    }

    /// Cache-checked detail lookup; any failure is "no detail"
    async fn detail_for(&self, id: &str) -> Option<MovieDetail> {
        let key = detail_key(id);
        if let Some(detail) = self.cache.get::<MovieDetail>(&key) {
            return Some(detail);
        }

        match self.api.fetch_by_id(id).await {
            Ok(Some(detail)) => {
                self.store(&key, &detail, DETAIL_TTL_HOURS);
                Some(detail)
            }
            Ok(None) => None,
            Err(e) => {
                warn!(id, error = %e, "detail fetch failed");
                None
            }
        }
    }

    fn store<T: Serialize>(&self, key: &str, value: &T, ttl_hours: u64) {
        if let Err(e) = self.cache.set(key, value, ttl_hours) {
            warn!(key, error = %e, "cache write not persisted");
        }
    }
}

/// Prefers a hit from 2025, else the first hit
fn pick_release(hits: &[SearchHit]) -> Option<&SearchHit> {
    hits.iter()
        .find(|hit| hit.year.as_deref().is_some_and(|y| y.starts_with("2025")))
        .or_else(|| hits.first())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryStore;
    use crate::data::fake::{detail, hit, FakeApi};
    use crate::data::normalize::STUB_OVERVIEW;

    fn builder(api: FakeApi) -> (CollectionBuilder, Arc<FakeApi>, Arc<CacheStore>) {
        let api = Arc::new(api);
        let cache = Arc::new(CacheStore::new(Arc::new(MemoryStore::new())));
        (
            CollectionBuilder::new(api.clone(), cache.clone()),
            api,
            cache,
        )
    }

    fn inception_api() -> FakeApi {
        FakeApi::configured()
            .with_search(
                "Inception",
                vec![
                    hit("tt1", "Inception", "2010"),
                    hit("tt2", "Inception: The Cobol Job", "2010"),
                    hit("tt3", "Inception: Behind the Dream", "2011"),
                ],
            )
            .with_detail(detail("tt1", "Inception", "2010"))
            .with_detail(detail("tt2", "Inception: The Cobol Job", "2010"))
            .with_detail(detail("tt3", "Inception: Behind the Dream", "2011"))
    }

    #[tokio::test]
    async fn test_search_builds_detailed_collection() {
        let (builder, _api, _cache) = builder(inception_api());

        let outcome = builder.search("Inception", false).await;

        assert_eq!(outcome.origin, CollectionOrigin::Omdb);
        assert_eq!(outcome.collection.parts.len(), 3);
        assert_eq!(outcome.collection.name, "OMDb results for \"Inception\"");
        assert_eq!(outcome.collection.parts[0].overview, "Plot of Inception.");
        assert!(outcome.collection.parts.iter().all(Movie::has_detail));
    }

    #[tokio::test]
    async fn test_search_keeps_stub_when_detail_fails() {
        let (builder, _api, _cache) = builder(inception_api().with_failing_detail("tt2"));

        let outcome = builder.search("Inception", false).await;
        let parts = &outcome.collection.parts;

        assert_eq!(parts.len(), 3);
        assert_eq!(parts[1].id, "tt2", "Order must follow search results");
        assert_eq!(parts[1].overview, STUB_OVERVIEW);
        assert!(parts[2].has_detail());
    }

    #[tokio::test]
    async fn test_search_beyond_page_size_stays_stub() {
        let hits: Vec<SearchHit> = (1..=10)
            .map(|i| hit(&format!("tt{}", i), &format!("Alien {}", i), "1990"))
            .collect();
        let mut api = FakeApi::configured().with_search("Alien", hits);
        for i in 1..=10 {
            api = api.with_detail(detail(&format!("tt{}", i), &format!("Alien {}", i), "1990"));
        }
        let (builder, api, _cache) = builder(api);

        let outcome = builder.search("Alien", false).await;
        let parts = &outcome.collection.parts;

        assert_eq!(parts.len(), 10);
        assert!(parts[..PAGE_SIZE].iter().all(Movie::has_detail));
        assert!(parts[PAGE_SIZE..].iter().all(|m| m.overview == STUB_OVERVIEW));
        assert_eq!(api.detail_calls(), PAGE_SIZE);
    }

    #[tokio::test]
    async fn test_search_uses_cache_on_repeat() {
        let (builder, api, _cache) = builder(inception_api());

        builder.search("Inception", false).await;
        builder.search("inception", false).await;

        assert_eq!(api.search_calls(), 1, "Second search should hit the cache");
        assert_eq!(api.detail_calls(), 3, "Details should be cached per id");
    }

    #[tokio::test]
    async fn test_search_without_credential_is_mock() {
        let (builder, api, _cache) = builder(FakeApi::unconfigured());

        let outcome = builder.search("Inception", false).await;

        assert_eq!(outcome.origin, CollectionOrigin::Mock);
        assert_eq!(outcome.collection, mock_collection());
        assert_eq!(api.search_calls(), 0);
    }

    #[tokio::test]
    async fn test_force_mock_skips_network() {
        let (builder, api, _cache) = builder(inception_api());

        let outcome = builder.search("Inception", true).await;

        assert_eq!(outcome.collection, mock_collection());
        assert_eq!(api.search_calls(), 0);
    }

    #[tokio::test]
    async fn test_search_failure_falls_back_to_mock() {
        let (builder, _api, _cache) = builder(FakeApi::configured().with_failing_search("Broken"));

        let outcome = builder.search("Broken", false).await;

        assert_eq!(outcome.origin, CollectionOrigin::Mock);
        assert_eq!(outcome.collection, mock_collection());
    }

    #[tokio::test]
    async fn test_empty_query_yields_placeholder() {
        let (builder, api, _cache) = builder(inception_api());

        let outcome = builder.search("   ", false).await;

        assert_eq!(outcome.origin, CollectionOrigin::NoQuery);
        assert_eq!(outcome.collection.name, "No search yet");
        assert_eq!(api.search_calls(), 0);
    }

    #[tokio::test]
    async fn test_no_matches_is_empty_collection() {
        let (builder, _api, _cache) = builder(FakeApi::configured());

        let outcome = builder.search("zzzz", false).await;

        assert_eq!(outcome.origin, CollectionOrigin::Omdb);
        assert!(outcome.collection.parts.is_empty());
    }

    #[tokio::test]
    async fn test_recommended_searches_again_and_caches() {
        let (builder, api, _cache) = builder(inception_api());
        builder.search("Inception", false).await;

        let first = builder.recommended("Inception").await.unwrap();
        let second = builder.recommended("Inception").await.unwrap();

        assert_eq!(first.len(), 3);
        assert_eq!(first, second);
        assert_eq!(api.search_calls(), 2, "One search for the page, one for recommendations");
    }

    #[tokio::test]
    async fn test_recommended_propagates_search_failure() {
        let (builder, _api, _cache) = builder(FakeApi::configured().with_failing_search("Broken"));
        assert!(builder.recommended("Broken").await.is_err());
    }

    #[tokio::test]
    async fn test_releases_prefers_2025_hit() {
        let api = FakeApi::configured().with_search(
            "Superman",
            vec![hit("tt-old", "Superman", "1978"), hit("tt-new", "Superman", "2025")],
        );
        let (builder, _api, _cache) = builder(api);

        let releases = builder.releases().await;

        assert_eq!(releases.len(), 1);
        assert_eq!(releases[0].id, "tt-new");
        assert_eq!(releases[0].release_date, "2025-01-01");
    }

    #[tokio::test]
    async fn test_releases_takes_first_hit_without_2025() {
        let api = FakeApi::configured()
            .with_search("Ne Zha 2", vec![hit("tt-a", "Ne Zha 2", "2024"), hit("tt-b", "Ne Zha", "2019")]);
        let (builder, _api, _cache) = builder(api);

        let releases = builder.releases().await;

        assert_eq!(releases[0].id, "tt-a");
    }

    #[tokio::test]
    async fn test_releases_are_cached() {
        let api = FakeApi::configured().with_search("Superman", vec![hit("tt-new", "Superman", "2025")]);
        let (builder, api, cache) = builder(api);

        let first = builder.releases().await;
        let calls = api.search_calls();
        let second = builder.releases().await;

        assert_eq!(first, second);
        assert_eq!(api.search_calls(), calls);
        assert!(cache.get::<Movie>("omdb:seed:superman").is_some());
    }

    #[tokio::test]
    async fn test_releases_fall_back_to_mock() {
        let (builder, _api, cache) = builder(FakeApi::unconfigured());

        let releases = builder.releases().await;

        assert_eq!(releases, mock_movies()[..RELEASES_LIMIT].to_vec());
        assert!(
            cache.get::<Vec<Movie>>(RELEASES_KEY).is_none(),
            "Mock fallback must not be cached"
        );
    }

    #[tokio::test]
    async fn test_recent_takes_top_hit_per_term() {
        let api = inception_api().with_search("Alien", vec![hit("tt9", "Alien", "1979")]);
        let (builder, _api, _cache) = builder(api);
        let terms = vec!["Alien".to_string(), "nothing".to_string(), "Inception".to_string()];

        let recent = builder.recent(&terms).await;

        let ids: Vec<&str> = recent.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["tt9", "tt1"]);
    }

    #[tokio::test]
    async fn test_recent_caps_at_limit() {
        let mut api = FakeApi::configured();
        let mut terms = Vec::new();
        for i in 0..8 {
            let term = format!("term {}", i);
            api = api.with_search(&term, vec![hit(&format!("tt{}", i), &term, "2000")]);
            terms.push(term);
        }
        let (builder, _api, _cache) = builder(api);

        assert_eq!(builder.recent(&terms).await.len(), RECENT_LIMIT);
    }

    #[tokio::test]
    async fn test_resolve_detail_uses_embedded_detail() {
        let (builder, api, _cache) = builder(inception_api());
        let movie = normalize_detail(&detail("tt1", "Inception", "2010"));

        let resolved = builder.resolve_detail(&movie, false).await;

        assert_eq!(resolved, movie);
        assert_eq!(api.detail_calls(), 0);
    }

    #[tokio::test]
    async fn test_resolve_detail_fetches_and_caches() {
        let (builder, api, _cache) = builder(inception_api());
        let stub = normalize_stub(&hit("tt1", "Inception", "2010"));

        let first = builder.resolve_detail(&stub, false).await;
        let second = builder.resolve_detail(&stub, false).await;

        assert_eq!(first.director.as_deref(), Some("Jane Doe"));
        assert_eq!(first, second);
        assert_eq!(api.detail_calls(), 1);
    }

    #[tokio::test]
    async fn test_resolve_detail_falls_back_to_stub() {
        let (builder, _api, _cache) = builder(inception_api().with_failing_detail("tt1"));
        let stub = normalize_stub(&hit("tt1", "Inception", "2010"));

        assert_eq!(builder.resolve_detail(&stub, false).await, stub);
    }

    #[tokio::test]
    async fn test_resolve_detail_force_mock_skips_network() {
        let (builder, api, _cache) = builder(inception_api());
        let stub = normalize_stub(&hit("tt1", "Inception", "2010"));

        assert_eq!(builder.resolve_detail(&stub, true).await, stub);
        assert_eq!(api.detail_calls(), 0);
    }

    #[test]
    fn test_pick_release_empty() {
        assert!(pick_release(&[]).is_none());
    }
}
