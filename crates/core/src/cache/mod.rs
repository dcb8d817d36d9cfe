//! SQLite-backed cache for raw file payloads.
//!
//! This module provides a persistent store keyed by a namespaced hash of the
//! raw-content URL, using SQLite with async access via tokio-rusqlite. It
//! supports:
//!
//! - Stable SHA-256 keys derived from URL and namespace
//! - Automatic schema migrations
//! - WAL mode so one resolution can read while another writes
//! - Whole-entry upserts (last writer wins, no eviction)

pub mod connection;
pub mod entries;
pub mod hash;
pub mod migrations;
pub mod store;

pub use crate::Error;

pub use connection::CacheDb;
pub use entries::CacheEntry;
pub use hash::compute_cache_key;
pub use store::ContentStore;
