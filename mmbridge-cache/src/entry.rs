//! Expiring entries and the map that sweeps them.

use std::borrow::Borrow;
use std::collections::HashMap;
use std::hash::Hash;
use std::time::{Duration, Instant};

/// Cache entry with an absolute expiry.
#[derive(Clone, Debug)]
pub(crate) struct CacheEntry<V> {
    value: V,
    /// `None` when `inserted_at + ttl` is not representable, i.e. never expires.
    expires_at: Option<Instant>,
}

impl<V> CacheEntry<V> {
    pub(crate) fn new(value: V, inserted_at: Instant, ttl: Duration) -> Self {
        Self {
            value,
            expires_at: inserted_at.checked_add(ttl),
        }
    }

    pub(crate) fn is_expired_at(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|expires_at| now > expires_at)
    }
}

/// A map whose reads and writes first drop every expired entry.
#[derive(Debug)]
pub(crate) struct TtlMap<K, V> {
    entries: HashMap<K, CacheEntry<V>>,
}

impl<K, V> Default for TtlMap<K, V> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }
}

impl<K: Eq + Hash, V: Clone> TtlMap<K, V> {
    /// Removes entries expired at `now`.
    pub(crate) fn sweep(&mut self, now: Instant) {
        self.entries.retain(|_, entry| !entry.is_expired_at(now));
    }

    pub(crate) fn get<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.sweep(Instant::now());
        // Re-check against a fresh clock: the entry may have expired since the sweep.
        let now = Instant::now();
        self.entries
            .get(key)
            .filter(|entry| !entry.is_expired_at(now))
            .map(|entry| entry.value.clone())
    }

    /// Replaces any entry under `key`, resetting its expiry.
    pub(crate) fn insert(&mut self, key: K, value: V, inserted_at: Instant, ttl: Duration) {
        self.sweep(Instant::now());
        self.entries
            .insert(key, CacheEntry::new(value, inserted_at, ttl));
    }

    /// Number of entries live at `now`. Sweeps first.
    pub(crate) fn live_len(&mut self, now: Instant) -> usize {
        self.sweep(now);
        self.entries.len()
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
    }
}
