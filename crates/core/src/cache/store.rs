//! Storage seam used by the retrieval orchestrator.

use super::connection::CacheDb;
use super::entries::CacheEntry;
use crate::Error;
use chrono::{DateTime, Utc};

/// Key to bytes store with a queryable last-write time per key.
///
/// `put` fully replaces any previous payload and write time for the key.
/// Concurrent writers are not coordinated: the last write wins.
#[async_trait::async_trait]
pub trait ContentStore: Send + Sync {
    /// Payload for `key`, or None when absent.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, Error>;

    /// Store `payload` for `key` (fetched from `url`), stamped `written_at`.
    async fn put(&self, key: &str, url: &str, payload: &[u8], written_at: DateTime<Utc>) -> Result<(), Error>;

    /// Last write time of `key`, or None when absent.
    async fn write_time_of(&self, key: &str) -> Result<Option<DateTime<Utc>>, Error>;
}

#[async_trait::async_trait]
impl ContentStore for CacheDb {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, Error> {
        self.get_payload(key).await
    }

    async fn put(&self, key: &str, url: &str, payload: &[u8], written_at: DateTime<Utc>) -> Result<(), Error> {
        let entry = CacheEntry { key: key.to_string(), url: url.to_string(), payload: payload.to_vec(), written_at };
        self.upsert_entry(&entry).await
    }

    async fn write_time_of(&self, key: &str) -> Result<Option<DateTime<Utc>>, Error> {
        self.get_written_at(key).await
    }
}

#[async_trait::async_trait]
impl<S: ContentStore + ?Sized> ContentStore for std::sync::Arc<S> {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, Error> {
        (**self).get(key).await
    }

    async fn put(&self, key: &str, url: &str, payload: &[u8], written_at: DateTime<Utc>) -> Result<(), Error> {
        (**self).put(key, url, payload, written_at).await
    }

    async fn write_time_of(&self, key: &str) -> Result<Option<DateTime<Utc>>, Error> {
        (**self).write_time_of(key).await
    }
}
