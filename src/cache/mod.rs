//! Cache module for memoizing HTTP responses in memory
//!
//! This module provides the in-memory cache store, deterministic cache key
//! derivation, and the freshness evaluator that decides hit vs. stale. Entries
//! expire lazily: a stale entry is removed at lookup time, never by a
//! background sweep, and the store has no capacity bound.

mod freshness;
mod store;

pub use freshness::{is_fresh, DEFAULT_CACHE_THRESHOLD_MINUTES};
pub use store::{cache_key, CacheEntry, CacheStore};
