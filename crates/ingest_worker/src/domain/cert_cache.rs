use bytes::Bytes;
use chrono::{DateTime, Utc};
use common::domain::Clock;
use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::debug;

struct CacheEntry {
    certificate: Bytes,
    inserted_at: DateTime<Utc>,
}

/// Bounded, time-expiring store of signing certificates keyed by URL.
///
/// Pure storage plus eviction policy: inserting beyond capacity drops the
/// least-recently-used entry, and entries older than the TTL are treated as
/// absent on read (lazy expiry, no sweeper). Safe for concurrent access
/// from messages verifying in parallel.
pub struct CertificateCache {
    entries: Mutex<LruCache<String, CacheEntry>>,
    ttl: chrono::Duration,
    clock: Arc<dyn Clock>,
}

impl CertificateCache {
    pub fn new(capacity: usize, ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        let capacity = NonZeroUsize::new(capacity.max(1)).unwrap();
        let ttl = chrono::Duration::from_std(ttl).unwrap_or(chrono::Duration::MAX);
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
            ttl,
            clock,
        }
    }

    /// Look up a certificate, refreshing its recency. An entry past the TTL
    /// is dropped and reported absent.
    pub fn get(&self, url: &str) -> Option<Bytes> {
        let now = self.clock.now();
        let mut entries = self.entries.lock().expect("certificate cache lock poisoned");

        let expired = match entries.get(url) {
            Some(entry) => {
                if now.signed_duration_since(entry.inserted_at) < self.ttl {
                    return Some(entry.certificate.clone());
                }
                true
            }
            None => false,
        };

        if expired {
            debug!(%url, "Dropping expired signing certificate");
            entries.pop(url);
        }
        None
    }

    pub fn put(&self, url: &str, certificate: Bytes) {
        let entry = CacheEntry {
            certificate,
            inserted_at: self.clock.now(),
        };
        let mut entries = self.entries.lock().expect("certificate cache lock poisoned");
        entries.put(url.to_string(), entry);
    }
}
