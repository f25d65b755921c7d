//! Bounded, time-expiring lookup cache.
//!
//! Both the executable resolver and the shebang reader keep one of these so that
//! repeated spawns of the same command don't rescan PATH or reopen files. Negative
//! results are cached too: "not found" is remembered for the same TTL as a hit.

use lru::LruCache;
use parking_lot::Mutex;
use std::num::NonZeroUsize;
use std::time::{Duration, Instant};

/// Default number of entries kept per cache.
pub const DEFAULT_CAPACITY: NonZeroUsize = match NonZeroUsize::new(50) {
    Some(n) => n,
    None => unreachable!(),
};

/// Default time an entry stays valid.
pub const DEFAULT_TTL: Duration = Duration::from_secs(30);

/// Result of a cache lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cached<V> {
    /// Nothing cached for this key (or the entry expired); a lookup is needed.
    Miss,
    /// A previous lookup ran and definitively found nothing.
    Absent,
    /// A previous lookup found this value.
    Found(V),
}

#[derive(Debug)]
struct Entry<V> {
    value: Option<V>,
    inserted_at: Instant,
}

/// LRU cache whose entries also expire after a fixed TTL.
///
/// Whichever limit is hit first evicts. Safe to share between threads; a racing
/// `set` on the same key simply overwrites.
#[derive(Debug)]
pub struct CommandCache<V> {
    entries: Mutex<LruCache<String, Entry<V>>>,
    ttl: Duration,
}

impl<V: Clone> CommandCache<V> {
    /// Create a cache holding at most `capacity` entries for `ttl` each.
    pub fn new(capacity: NonZeroUsize, ttl: Duration) -> Self {
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
            ttl,
        }
    }

    /// Look up `key`, dropping the entry if it has outlived the TTL.
    pub fn get(&self, key: &str) -> Cached<V> {
        let mut entries = self.entries.lock();

        match entries.get(key) {
            None => return Cached::Miss,
            Some(entry) if entry.inserted_at.elapsed() < self.ttl => {
                return match &entry.value {
                    Some(value) => Cached::Found(value.clone()),
                    None => Cached::Absent,
                };
            }
            Some(_) => {}
        }

        entries.pop(key);
        Cached::Miss
    }

    /// Store a lookup result. `None` records a definitive miss.
    pub fn set(&self, key: impl Into<String>, value: Option<V>) {
        self.entries.lock().put(
            key.into(),
            Entry {
                value,
                inserted_at: Instant::now(),
            },
        );
    }

    /// Drop every entry.
    pub fn clear(&self) {
        self.entries.lock().clear();
    }

    /// Number of entries currently held, expired ones included.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Whether the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<V: Clone> Default for CommandCache<V> {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY, DEFAULT_TTL)
    }
}
