//! Adaptive cache freshness.
//!
//! A cached payload may be served without touching the network while it is
//! younger than twice the age of the document that references it:
//!
//! ```text
//! now - cached_at < (now - referenced_at) * 2
//! ```
//!
//! Rarely edited documents therefore keep their snippets longer, and a
//! document edited at `now` always triggers a refetch.

use chrono::{DateTime, Utc};

/// Whether a cached payload may be served without a live fetch.
///
/// False when either timestamp is missing or `purge` is set.
pub fn is_fresh(
    cached_at: Option<DateTime<Utc>>, referenced_at: Option<DateTime<Utc>>, purge: bool, now: DateTime<Utc>,
) -> bool {
    if purge {
        return false;
    }

    match (cached_at, referenced_at) {
        (Some(cached_at), Some(referenced_at)) => now - cached_at < (now - referenced_at) * 2,
        _ => false,
    }
}
