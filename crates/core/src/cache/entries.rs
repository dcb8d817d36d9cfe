//! Cache entry reads and writes.
//!
//! One row per cache key. Writes replace the whole row; there is no
//! versioning and no deletion path.

use super::connection::CacheDb;
use crate::Error;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use tokio_rusqlite::params;
use tokio_rusqlite::rusqlite::{self, OptionalExtension};

/// A stored raw file payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub key: String,
    pub url: String,
    pub payload: Vec<u8>,
    pub written_at: DateTime<Utc>,
}

fn encode_time(at: &DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn decode_time(key: &str, raw: &str) -> Result<DateTime<Utc>, Error> {
    DateTime::parse_from_rfc3339(raw)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| Error::CorruptEntry(format!("{key}: written_at {raw:?}: {e}")))
}

impl CacheDb {
    /// Insert or replace the entry for `entry.key`.
    pub async fn upsert_entry(&self, entry: &CacheEntry) -> Result<(), Error> {
        let key = entry.key.clone();
        let url = entry.url.clone();
        let payload = entry.payload.clone();
        let written_at = encode_time(&entry.written_at);
        self.conn
            .call(move |conn| -> Result<(), Error> {
                conn.execute(
                    "INSERT INTO entries (key, url, payload, written_at) VALUES (?1, ?2, ?3, ?4)
                ON CONFLICT(key) DO UPDATE SET
                    url = excluded.url,
                    payload = excluded.payload,
                    written_at = excluded.written_at",
                    params![key, url, payload, written_at],
                )?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    /// Get the entry for `key`.
    ///
    /// Returns None if the key doesn't exist in the cache.
    pub async fn get_entry(&self, key: &str) -> Result<Option<CacheEntry>, Error> {
        let key = key.to_string();
        let row = self
            .conn
            .call(move |conn| -> Result<Option<(String, String, Vec<u8>, String)>, Error> {
                let result = conn.query_row(
                    "SELECT key, url, payload, written_at FROM entries WHERE key = ?1",
                    params![key],
                    |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)),
                );

                match result {
                    Ok(r) => Ok(Some(r)),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(e.into()),
                }
            })
            .await
            .map_err(Error::from)?;

        row.map(|(key, url, payload, written_at)| {
            let written_at = decode_time(&key, &written_at)?;
            Ok(CacheEntry { key, url, payload, written_at })
        })
        .transpose()
    }

    /// Payload stored under `key`, without its metadata.
    pub async fn get_payload(&self, key: &str) -> Result<Option<Vec<u8>>, Error> {
        let key = key.to_string();
        self.conn
            .call(move |conn| -> Result<Option<Vec<u8>>, Error> {
                let payload = conn
                    .query_row("SELECT payload FROM entries WHERE key = ?1", params![key], |row| row.get(0))
                    .optional()?;
                Ok(payload)
            })
            .await
            .map_err(Error::from)
    }

    /// Last write time of `key`, or None when the key is absent.
    pub async fn get_written_at(&self, key: &str) -> Result<Option<DateTime<Utc>>, Error> {
        let lookup = key.to_string();
        let raw = self
            .conn
            .call(move |conn| -> Result<Option<String>, Error> {
                let raw = conn
                    .query_row("SELECT written_at FROM entries WHERE key = ?1", params![lookup], |row| row.get(0))
                    .optional()?;
                Ok(raw)
            })
            .await
            .map_err(Error::from)?;

        raw.map(|raw: String| decode_time(key, &raw)).transpose()
    }

    /// Number of stored entries.
    pub async fn count_entries(&self) -> Result<u64, Error> {
        self.conn
            .call(|conn| -> Result<u64, Error> {
                let count: i64 = conn.query_row("SELECT COUNT(*) FROM entries", [], |row| row.get(0))?;
                Ok(count as u64)
            })
            .await
            .map_err(Error::from)
    }
}
