//! Cache key generation.

use sha2::{Digest, Sha256};

/// Compute the cache key for a raw-content URL within `namespace`.
pub fn compute_cache_key(url: &str, namespace: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(url.as_bytes());
    hasher.update(b"\n");
    hasher.update(namespace.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    const RAW: &str = "https://raw.githubusercontent.com/owner/repo/main/src/lib.rs";

    #[test]
    fn test_hash_stability() {
        assert_eq!(compute_cache_key(RAW, ".ghplugin"), compute_cache_key(RAW, ".ghplugin"));
    }

    #[test]
    fn test_hash_different_namespace() {
        assert_ne!(compute_cache_key(RAW, ".ghplugin"), compute_cache_key(RAW, ".other"));
    }

    #[test]
    fn test_hash_different_url() {
        let other = "https://raw.githubusercontent.com/owner/repo/dev/src/lib.rs";
        assert_ne!(compute_cache_key(RAW, ".ghplugin"), compute_cache_key(other, ".ghplugin"));
    }

    #[test]
    fn test_hash_format() {
        let hash = compute_cache_key(RAW, ".ghplugin");
        assert_eq!(hash.len(), 64);
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
