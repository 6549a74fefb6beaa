//! Persisted user lists: favorites and recent searches
//!
//! Both lists are stored as JSON arrays in a `PersistentStore`. Unreadable or
//! corrupt data loads as an empty list and failed writes are logged; neither
//! interrupts the user.

use std::sync::Arc;

use serde::Serialize;
use tracing::warn;

use crate::cache::{PersistentStore, StorageError};
use crate::data::Movie;

/// Maximum number of favorites kept
pub const FAVORITES_LIMIT: usize = 100;

/// Maximum number of recent search terms kept
pub const RECENT_SEARCHES_LIMIT: usize = 8;

const FAVORITES_KEY: &str = "cw:favs";
const RECENT_KEY: &str = "cw:recent";

/// Favorite movies, unique by id, most recently added first
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Favorites(Vec<Movie>);

impl Favorites {
    /// Builds the list from stored data, dropping duplicates and overflow
    pub fn from_vec(movies: Vec<Movie>) -> Self {
        let mut out: Vec<Movie> = Vec::with_capacity(movies.len().min(FAVORITES_LIMIT));
        for movie in movies {
            if out.len() == FAVORITES_LIMIT {
                break;
            }
            if !out.iter().any(|m| m.id == movie.id) {
                out.push(movie);
            }
        }
        Self(out)
    }

    /// Removes the movie if present, otherwise prepends it.
    ///
    /// Returns whether the movie is a favorite afterwards.
    pub fn toggle(&mut self, movie: &Movie) -> bool {
        if self.contains(&movie.id) {
            self.0.retain(|m| m.id != movie.id);
            false
        } else {
            self.0.insert(0, movie.clone());
            self.0.truncate(FAVORITES_LIMIT);
            true
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.0.iter().any(|m| m.id == id)
    }

    pub fn as_slice(&self) -> &[Movie] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Recent search terms, unique ignoring case, newest first
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecentSearches(Vec<String>);

impl RecentSearches {
    /// Builds the list from stored data by replaying pushes oldest first
    pub fn from_vec(terms: Vec<String>) -> Self {
        let mut out = Self::default();
        for term in terms.iter().rev() {
            out.push(term);
        }
        out
    }

    /// Moves `term` (trimmed) to the front; blank terms are ignored.
    ///
    /// Returns whether the list was updated.
    pub fn push(&mut self, term: &str) -> bool {
        let term = term.trim();
        if term.is_empty() {
            return false;
        }
        let lowered = term.to_lowercase();
        self.0.retain(|t| t.to_lowercase() != lowered);
        self.0.insert(0, term.to_string());
        self.0.truncate(RECENT_SEARCHES_LIMIT);
        true
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// The user's persisted lists together with their backing store
#[derive(Debug)]
pub struct Library {
    store: Arc<dyn PersistentStore>,
    favorites: Favorites,
    recent: RecentSearches,
}

impl Library {
    /// Loads both lists from `store`, starting empty on any failure
    pub fn load(store: Arc<dyn PersistentStore>) -> Self {
        let favorites = Favorites::from_vec(read_list(store.as_ref(), FAVORITES_KEY));
        let recent = RecentSearches::from_vec(read_list(store.as_ref(), RECENT_KEY));
        Self {
            store,
            favorites,
            recent,
        }
    }

    pub fn favorites(&self) -> &Favorites {
        &self.favorites
    }

    pub fn recent_searches(&self) -> &RecentSearches {
        &self.recent
    }

    pub fn is_favorite(&self, id: &str) -> bool {
        self.favorites.contains(id)
    }

    /// Toggles a favorite and persists the list immediately
    pub fn toggle_favorite(&mut self, movie: &Movie) -> bool {
        let now_favorite = self.favorites.toggle(movie);
        write_list(self.store.as_ref(), FAVORITES_KEY, &self.favorites.0);
        now_favorite
    }

    /// Records a search term and persists the list immediately
    pub fn push_recent_search(&mut self, term: &str) -> bool {
        let changed = self.recent.push(term);
        if changed {
            write_list(self.store.as_ref(), RECENT_KEY, &self.recent.0);
        }
        changed
    }
}

fn read_list<T: serde::de::DeserializeOwned>(store: &dyn PersistentStore, key: &str) -> Vec<T> {
    let raw = match store.get(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return Vec::new(),
        Err(e) => {
            warn!(key, error = %e, "could not read stored list");
            return Vec::new();
        }
    };
    serde_json::from_str(&raw).unwrap_or_else(|e| {
        warn!(key, error = %e, "stored list is corrupt, starting empty");
        Vec::new()
    })
}

fn write_list<T: Serialize>(store: &dyn PersistentStore, key: &str, items: &[T]) {
    let result = serde_json::to_string(items)
        .map_err(StorageError::from)
        .and_then(|json| store.set(key, &json));
    if let Err(e) = result {
        warn!(key, error = %e, "could not persist list");
    }
}
