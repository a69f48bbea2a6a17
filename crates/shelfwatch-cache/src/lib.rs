//! Advisory in-memory TTL cache for upstream responses.
//!
//! The cache bounds upstream request volume; it is never a source of truth.
//! Expiry is lazy (checked on read, no background sweeper) and eviction is
//! FIFO over insertion order, one entry at a time, once the soft capacity is
//! exceeded. A lost or duplicate write under concurrent access only costs
//! hit rate, so the whole store sits behind one `Mutex`.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::{Duration, Instant};

use serde_json::Value;

struct Entry {
    value: Value,
    expires_at: Instant,
}

struct Store {
    entries: HashMap<String, Entry>,
    /// Keys in insertion order. Re-inserting an existing key does not move it.
    order: VecDeque<String>,
}

/// Key→JSON store with per-entry expiry and a soft size bound.
///
/// Created once at process start and shared (behind `Arc`) by all concurrent
/// lookups for the life of the process.
pub struct TtlCache {
    capacity: usize,
    default_ttl: Duration,
    store: Mutex<Store>,
}

impl TtlCache {
    #[must_use]
    pub fn new(capacity: usize, default_ttl: Duration) -> Self {
        Self {
            capacity,
            default_ttl,
            store: Mutex::new(Store {
                entries: HashMap::new(),
                order: VecDeque::new(),
            }),
        }
    }

    /// Returns the cached value for `key`, or `None` if absent or expired.
    ///
    /// An expired entry is removed on the spot and reported as absent.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<Value> {
        let mut store = self.store.lock().expect("cache mutex poisoned");
        let expired = match store.entries.get(key) {
            None => return None,
            Some(entry) => Instant::now() >= entry.expires_at,
        };
        if expired {
            store.entries.remove(key);
            store.order.retain(|k| k != key);
            return None;
        }
        store.entries.get(key).map(|e| e.value.clone())
    }

    /// Inserts or overwrites `key` with the default TTL.
    pub fn set(&self, key: &str, value: Value) {
        self.set_with_ttl(key, value, self.default_ttl);
    }

    /// Inserts or overwrites `key` with an explicit TTL.
    ///
    /// Overwriting refreshes the value and deadline but keeps the key's
    /// original insertion-order position. When the insert pushes the entry
    /// count past capacity, exactly one entry — the oldest-inserted — is
    /// evicted.
    pub fn set_with_ttl(&self, key: &str, value: Value, ttl: Duration) {
        let mut store = self.store.lock().expect("cache mutex poisoned");
        let entry = Entry {
            value,
            expires_at: Instant::now() + ttl,
        };
        if store.entries.insert(key.to_string(), entry).is_none() {
            store.order.push_back(key.to_string());
        }
        if store.entries.len() > self.capacity {
            if let Some(oldest) = store.order.pop_front() {
                store.entries.remove(&oldest);
            }
        }
    }

    /// Current entry count (expired-but-unread entries included).
    #[must_use]
    pub fn len(&self) -> usize {
        self.store.lock().expect("cache mutex poisoned").entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
