//! Cache module for storing API responses
//!
//! This module provides a two-tier cache: an in-memory map in front of a
//! persistent key/value backend (JSON files on disk by default). Entries carry
//! an expiry timestamp and are only served while fresh. Storage failures of any
//! kind degrade to cache misses.

mod manager;
mod store;

pub use manager::{CacheStore, DEFAULT_TTL_HOURS};
pub use store::{FileStore, MemoryStore, PersistentStore, StorageError};
