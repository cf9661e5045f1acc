//! LRU Cache Module
//!
//! Bounded key-value map with least-recently-used eviction.
//!
//! The recency order is a doubly-linked list threaded through an arena of
//! nodes, paired with a hash index from key to arena slot. Lookup, promotion,
//! insertion, removal and eviction are all O(1); only `snapshot` walks the
//! full list. A single mutex covers both the list and the index, so every
//! operation is atomic from the point of view of other workers.

use std::collections::HashMap;
use std::mem;

use parking_lot::Mutex;

use crate::cache::CacheStats;

/// Sentinel slot index marking the end of the list.
const NIL: usize = usize::MAX;

// == Cache State Snapshot ==
/// A self-contained copy of the cache contents at one instant.
///
/// `items` is ordered from most-recently-used to least-recently-used.
/// The snapshot is a value: inspecting it requires no further locking and
/// taking one does not disturb the recency order.
#[derive(Debug, Clone)]
pub struct CacheState {
    /// Number of entries resident when the snapshot was taken
    pub current_size: usize,
    /// Maximum number of entries the cache will hold
    pub max_size: usize,
    /// (key, value) pairs from MRU to LRU
    pub items: Vec<(String, String)>,
}

// == List Node ==
/// One arena slot. Live slots hold an entry and its list links; freed slots
/// sit on the free list with their strings emptied.
#[derive(Debug)]
struct Node {
    key: String,
    value: String,
    prev: usize,
    next: usize,
}

// == Inner State ==
/// Everything the mutex protects: the arena, the list endpoints, the free
/// list, the key index and the counters.
///
/// Slot indices are stable for the lifetime of the entry occupying them,
/// which is what lets the index map straight into the arena.
#[derive(Debug)]
struct LruInner {
    nodes: Vec<Node>,
    free: Vec<usize>,
    head: usize,
    tail: usize,
    index: HashMap<String, usize>,
    max_size: usize,
    stats: CacheStats,
}

impl LruInner {
    fn new(max_size: usize) -> Self {
        Self {
            nodes: Vec::new(),
            free: Vec::new(),
            head: NIL,
            tail: NIL,
            index: HashMap::new(),
            max_size,
            stats: CacheStats::new(),
        }
    }

    /// Detaches slot `i` from the list without touching the arena or index.
    fn unlink(&mut self, i: usize) {
        let (prev, next) = (self.nodes[i].prev, self.nodes[i].next);
        if prev == NIL {
            self.head = next;
        } else {
            self.nodes[prev].next = next;
        }
        if next == NIL {
            self.tail = prev;
        } else {
            self.nodes[next].prev = prev;
        }
        self.nodes[i].prev = NIL;
        self.nodes[i].next = NIL;
    }

    /// Attaches a detached slot `i` at the MRU end.
    fn push_front(&mut self, i: usize) {
        self.nodes[i].prev = NIL;
        self.nodes[i].next = self.head;
        if self.head == NIL {
            self.tail = i;
        } else {
            self.nodes[self.head].prev = i;
        }
        self.head = i;
    }

    /// Takes a slot from the free list or grows the arena.
    fn alloc(&mut self, key: String, value: String) -> usize {
        match self.free.pop() {
            Some(i) => {
                let node = &mut self.nodes[i];
                node.key = key;
                node.value = value;
                node.prev = NIL;
                node.next = NIL;
                i
            }
            None => {
                self.nodes.push(Node {
                    key,
                    value,
                    prev: NIL,
                    next: NIL,
                });
                self.nodes.len() - 1
            }
        }
    }

    /// Detaches slot `i`, empties it and returns its key. The slot goes on
    /// the free list; the caller is responsible for the index entry.
    fn release(&mut self, i: usize) -> String {
        self.unlink(i);
        let key = mem::take(&mut self.nodes[i].key);
        self.nodes[i].value = String::new();
        self.free.push(i);
        key
    }

    fn put(&mut self, key: String, value: String) {
        // A zero-capacity cache admits nothing.
        if self.max_size == 0 {
            return;
        }

        if let Some(&i) = self.index.get(&key) {
            // Replace the value and promote, even if already at the head.
            self.nodes[i].value = value;
            self.unlink(i);
            self.push_front(i);
            return;
        }

        if self.index.len() >= self.max_size {
            // Evict the unique coldest entry at the tail.
            let victim = self.tail;
            let evicted_key = self.release(victim);
            self.index.remove(&evicted_key);
            self.stats.record_eviction();
        }

        let i = self.alloc(key.clone(), value);
        self.push_front(i);
        self.index.insert(key, i);
    }

    fn get(&mut self, key: &str) -> Option<String> {
        match self.index.get(key) {
            Some(&i) => {
                self.unlink(i);
                self.push_front(i);
                self.stats.record_hit();
                Some(self.nodes[i].value.clone())
            }
            None => {
                self.stats.record_miss();
                None
            }
        }
    }

    fn remove(&mut self, key: &str) {
        if let Some(i) = self.index.remove(key) {
            self.release(i);
        }
    }

    fn snapshot(&self) -> CacheState {
        let mut items = Vec::with_capacity(self.index.len());
        let mut cursor = self.head;
        while cursor != NIL {
            let node = &self.nodes[cursor];
            items.push((node.key.clone(), node.value.clone()));
            cursor = node.next;
        }
        CacheState {
            current_size: self.index.len(),
            max_size: self.max_size,
            items,
        }
    }
}

// == LRU Cache ==
/// Concurrency-safe bounded cache shared by all request workers.
///
/// Operations never block on I/O and the lock is released on unwind, so a
/// panic in one worker cannot wedge the others.
#[derive(Debug)]
pub struct LruCache {
    inner: Mutex<LruInner>,
}

impl LruCache {
    // == Constructor ==
    /// Creates a cache holding at most `max_size` entries.
    pub fn new(max_size: usize) -> Self {
        Self {
            inner: Mutex::new(LruInner::new(max_size)),
        }
    }

    // == Put ==
    /// Inserts or replaces `key`, leaving it at the MRU position.
    ///
    /// When the key is absent and the cache is full, the LRU entry is
    /// evicted first.
    pub fn put(&self, key: String, value: String) {
        self.inner.lock().put(key, value);
    }

    // == Get ==
    /// Returns the value for `key` and promotes it to MRU. A miss leaves
    /// the cache untouched.
    pub fn get(&self, key: &str) -> Option<String> {
        self.inner.lock().get(key)
    }

    // == Remove ==
    /// Drops `key` from the cache. Removing an absent key is a no-op.
    pub fn remove(&self, key: &str) {
        self.inner.lock().remove(key);
    }

    // == Snapshot ==
    /// Copies out the current size, capacity and MRU-to-LRU entry list.
    pub fn snapshot(&self) -> CacheState {
        self.inner.lock().snapshot()
    }

    // == Stats ==
    /// Returns a copy of the hit/miss/eviction counters.
    pub fn stats(&self) -> CacheStats {
        let inner = self.inner.lock();
        let mut stats = inner.stats.clone();
        stats.total_entries = inner.index.len();
        stats
    }

    // == Length ==
    /// Current number of resident entries.
    pub fn len(&self) -> usize {
        self.inner.lock().index.len()
    }

    /// Returns true if no entries are resident.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn keys(state: &CacheState) -> Vec<&str> {
        state.items.iter().map(|(k, _)| k.as_str()).collect()
    }

    #[test]
    fn test_new_cache_is_empty() {
        let cache = LruCache::new(10);
        assert!(cache.is_empty());
        assert_eq!(cache.len(), 0);
        assert_eq!(cache.snapshot().max_size, 10);
    }

    #[test]
    fn test_put_then_get() {
        let cache = LruCache::new(10);
        cache.put("a".to_string(), "1".to_string());
        assert_eq!(cache.get("a"), Some("1".to_string()));
    }

    #[test]
    fn test_get_missing_key() {
        let cache = LruCache::new(10);
        assert_eq!(cache.get("ghost"), None);
        assert_eq!(cache.len(), 0);
    }

    #[test]
    fn test_put_replaces_and_promotes() {
        let cache = LruCache::new(10);
        cache.put("a".to_string(), "1".to_string());
        cache.put("b".to_string(), "2".to_string());
        cache.put("a".to_string(), "9".to_string());

        assert_eq!(cache.get("a"), Some("9".to_string()));
        assert_eq!(cache.len(), 2);
        let state = cache.snapshot();
        assert_eq!(keys(&state), vec!["a", "b"]);
    }

    #[test]
    fn test_put_at_head_replaces_value() {
        let cache = LruCache::new(10);
        cache.put("a".to_string(), "1".to_string());
        // Already at MRU; value must still be replaced.
        cache.put("a".to_string(), "2".to_string());
        assert_eq!(cache.get("a"), Some("2".to_string()));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_eviction_removes_tail() {
        let cache = LruCache::new(2);
        cache.put("a".to_string(), "1".to_string());
        cache.put("b".to_string(), "2".to_string());
        cache.put("c".to_string(), "3".to_string());

        let state = cache.snapshot();
        assert_eq!(keys(&state), vec!["c", "b"]);
        assert_eq!(cache.get("a"), None);
    }

    #[test]
    fn test_get_promotes_before_eviction() {
        let cache = LruCache::new(2);
        cache.put("a".to_string(), "1".to_string());
        cache.put("b".to_string(), "2".to_string());
        cache.get("a");
        cache.put("c".to_string(), "3".to_string());

        let state = cache.snapshot();
        assert_eq!(keys(&state), vec!["c", "a"]);
        assert_eq!(cache.get("b"), None);
    }

    #[test]
    fn test_remove_then_remove_again() {
        let cache = LruCache::new(10);
        cache.put("a".to_string(), "1".to_string());
        cache.remove("a");
        assert_eq!(cache.get("a"), None);
        // Second remove is a no-op.
        cache.remove("a");
        assert!(cache.is_empty());
    }

    #[test]
    fn test_slot_reuse_after_remove() {
        let cache = LruCache::new(3);
        cache.put("a".to_string(), "1".to_string());
        cache.put("b".to_string(), "2".to_string());
        cache.remove("a");
        cache.put("c".to_string(), "3".to_string());
        cache.put("d".to_string(), "4".to_string());

        let state = cache.snapshot();
        assert_eq!(keys(&state), vec!["d", "c", "b"]);
        assert_eq!(cache.get("b"), Some("2".to_string()));
    }

    #[test]
    fn test_zero_capacity_stores_nothing() {
        let cache = LruCache::new(0);
        cache.put("a".to_string(), "1".to_string());
        assert_eq!(cache.get("a"), None);
        assert_eq!(cache.len(), 0);

        let state = cache.snapshot();
        assert_eq!(state.current_size, 0);
        assert_eq!(state.max_size, 0);
        assert!(state.items.is_empty());
    }

    #[test]
    fn test_capacity_one_keeps_latest() {
        let cache = LruCache::new(1);
        for (k, v) in [("a", "1"), ("b", "2"), ("c", "3")] {
            cache.put(k.to_string(), v.to_string());
            assert_eq!(cache.len(), 1);
        }
        assert_eq!(cache.get("c"), Some("3".to_string()));
        assert_eq!(cache.get("a"), None);
        assert_eq!(cache.get("b"), None);
    }

    #[test]
    fn test_repeated_get_keeps_key_at_mru() {
        let cache = LruCache::new(3);
        cache.put("a".to_string(), "1".to_string());
        cache.put("b".to_string(), "2".to_string());
        for _ in 0..5 {
            assert_eq!(cache.get("a"), Some("1".to_string()));
        }
        assert_eq!(cache.len(), 2);
        assert_eq!(keys(&cache.snapshot()), vec!["a", "b"]);
    }

    #[test]
    fn test_snapshot_is_reverse_insertion_order() {
        let cache = LruCache::new(4);
        for (k, v) in [("a", "1"), ("b", "2"), ("c", "3"), ("d", "4")] {
            cache.put(k.to_string(), v.to_string());
        }
        assert_eq!(keys(&cache.snapshot()), vec!["d", "c", "b", "a"]);
    }

    #[test]
    fn test_snapshot_copies_values() {
        let cache = LruCache::new(4);
        cache.put("a".to_string(), "1".to_string());
        let state = cache.snapshot();
        cache.put("a".to_string(), "2".to_string());
        // The snapshot is a value, unaffected by later mutation.
        assert_eq!(state.items, vec![("a".to_string(), "1".to_string())]);
    }

    #[test]
    fn test_stats_counters() {
        let cache = LruCache::new(1);
        cache.put("a".to_string(), "1".to_string());
        cache.get("a");
        cache.get("missing");
        cache.put("b".to_string(), "2".to_string());

        let stats = cache.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.evictions, 1);
        assert_eq!(stats.total_entries, 1);
    }

    #[test]
    fn test_concurrent_access_respects_capacity() {
        let cache = Arc::new(LruCache::new(16));
        let mut handles = Vec::new();
        for t in 0..8 {
            let cache = Arc::clone(&cache);
            handles.push(std::thread::spawn(move || {
                for i in 0..500 {
                    let key = format!("k{}", (t * 31 + i) % 64);
                    cache.put(key.clone(), i.to_string());
                    cache.get(&key);
                    if i % 7 == 0 {
                        cache.remove(&key);
                    }
                    assert!(cache.len() <= 16);
                }
            }));
        }
        for handle in handles {
            handle.join().expect("worker panicked");
        }
        assert!(cache.len() <= 16);

        // Index and list agree after the storm.
        let state = cache.snapshot();
        assert_eq!(state.items.len(), state.current_size);
    }
}
