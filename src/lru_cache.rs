use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;
use std::mem;
use std::ptr::NonNull;

use parking_lot::RwLock;
use tracing::{debug, trace};

use crate::config::CacheConfig;
use crate::error::Result;

/// The contract shared by every cache backend in this crate.
///
/// An in-process [`LruCache`] and a [`RemoteCache`](crate::RemoteCache) can be
/// used interchangeably behind `dyn Cache<K, V>`. None of the operations can
/// fail: absence is reported through return values.
///
/// # Type Parameters
///
/// * `K` - The type of keys used in the cache. Must implement `Clone + Debug + Hash + Eq + Send + Sync + 'static`
/// * `V` - The type of values stored in the cache. Must implement `Clone + Send + Sync + 'static`
pub trait Cache<K, V>: Send + Sync
where
    K: Clone + Debug + Hash + Eq + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    /// Retrieves a value from the cache by its key.
    ///
    /// LRU backends mark a hit as most recently used.
    fn get(&self, key: &K) -> Option<V>;

    /// Returns whether `key` is cached, without touching recency.
    fn exists(&self, key: &K) -> bool;

    /// Inserts `value` under `key`, replacing any previous value.
    ///
    /// A bounded backend evicts its least recently used entry to make room.
    fn set(&self, key: K, value: V);

    /// Replaces the value of an existing key.
    ///
    /// Returns `false` and leaves the cache untouched when `key` is absent.
    fn update(&self, key: K, value: V) -> bool;

    /// Removes `key`. Removing an absent key is a no-op.
    fn remove(&self, key: &K);

    /// Returns the number of entries, or `None` when the backend cannot
    /// report it cheaply.
    fn len(&self) -> Option<usize>;

    /// Returns the maximum number of entries, or `None` when unbounded.
    fn capacity(&self) -> Option<usize>;

    fn is_empty(&self) -> bool {
        self.len() == Some(0)
    }
}

type Link<K, V> = Option<NonNull<Node<K, V>>>;

struct Node<K, V> {
    key: K,
    value: V,
    prev: Link<K, V>,
    next: Link<K, V>,
}

impl<K, V> Node<K, V> {
    fn alloc(key: K, value: V) -> NonNull<Self> {
        let node = Box::new(Self {
            key,
            value,
            prev: None,
            next: None,
        });
        NonNull::from(Box::leak(node))
    }
}

// Intrusive doubly linked list ordering nodes from most to least recently used.
// Every pointer handed to these methods must be a live node owned by this list
// (or, for `push_front`, a detached node about to be owned by it).
struct RecencyList<K, V> {
    head: Link<K, V>,
    tail: Link<K, V>,
    len: usize,
}

impl<K, V> RecencyList<K, V> {
    fn new() -> Self {
        Self {
            head: None,
            tail: None,
            len: 0,
        }
    }

    fn push_front(&mut self, mut node: NonNull<Node<K, V>>) {
        unsafe {
            let n = node.as_mut();
            n.prev = None;
            n.next = self.head;

            match self.head {
                Some(mut head) => head.as_mut().prev = Some(node),
                None => self.tail = Some(node),
            }
        }
        self.head = Some(node);
        self.len += 1;
    }

    fn unlink(&mut self, mut node: NonNull<Node<K, V>>) {
        unsafe {
            let n = node.as_mut();
            match n.prev {
                Some(mut prev) => prev.as_mut().next = n.next,
                None => self.head = n.next,
            }
            match n.next {
                Some(mut next) => next.as_mut().prev = n.prev,
                None => self.tail = n.prev,
            }
            n.prev = None;
            n.next = None;
        }
        self.len -= 1;
    }

    fn pop_back(&mut self) -> Option<NonNull<Node<K, V>>> {
        let tail = self.tail?;
        self.unlink(tail);
        Some(tail)
    }

    fn move_to_front(&mut self, node: NonNull<Node<K, V>>) {
        if self.head == Some(node) {
            return;
        }
        self.unlink(node);
        self.push_front(node);
    }

    fn len(&self) -> usize {
        self.len
    }

    fn keys(&self) -> Vec<K>
    where
        K: Clone,
    {
        let mut keys = Vec::with_capacity(self.len);
        let mut current = self.head;
        while let Some(node) = current {
            unsafe {
                keys.push(node.as_ref().key.clone());
                current = node.as_ref().next;
            }
        }
        keys
    }

    // Frees every node. The index must be cleared alongside.
    fn free_all(&mut self) {
        let mut current = self.head.take();
        while let Some(node) = current {
            unsafe {
                let node = Box::from_raw(node.as_ptr());
                current = node.next;
            }
        }
        self.tail = None;
        self.len = 0;
    }
}

// The list and its index, always mutated together under one lock.
struct Store<K, V> {
    list: RecencyList<K, V>,
    index: HashMap<K, NonNull<Node<K, V>>>,
}

// Nodes are only reachable through `Store`, which is only reachable through
// the owning cache's lock.
unsafe impl<K: Send, V: Send> Send for Store<K, V> {}
unsafe impl<K: Sync, V: Sync> Sync for Store<K, V> {}

impl<K, V> Store<K, V>
where
    K: Clone + Debug + Hash + Eq,
{
    fn with_capacity(capacity: usize) -> Self {
        Self {
            list: RecencyList::new(),
            index: HashMap::with_capacity(capacity),
        }
    }

    fn len(&self) -> usize {
        self.index.len()
    }

    fn value(&self, key: &K) -> Option<&V> {
        self.index.get(key).map(|node| unsafe { &node.as_ref().value })
    }

    fn promote(&mut self, key: &K) -> Option<&mut V> {
        let mut node = *self.index.get(key)?;
        self.list.move_to_front(node);
        Some(unsafe { &mut node.as_mut().value })
    }

    fn replace(&mut self, key: &K, value: V) -> bool {
        match self.promote(key) {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        }
    }

    // Caller guarantees `key` is absent.
    fn insert_new(&mut self, key: K, value: V, capacity: usize) {
        let node = if self.len() >= capacity {
            match self.list.pop_back() {
                Some(mut tail) => {
                    let evicted = unsafe { tail.as_mut() };
                    self.index.remove(&evicted.key);
                    trace!(key = ?evicted.key, "evicted least recently used entry");
                    evicted.key = key.clone();
                    evicted.value = value;
                    tail
                }
                None => Node::alloc(key.clone(), value),
            }
        } else {
            Node::alloc(key.clone(), value)
        };
        self.list.push_front(node);
        self.index.insert(key, node);
    }

    fn remove(&mut self, key: &K) -> Option<V> {
        let node = self.index.remove(key)?;
        self.list.unlink(node);
        let node = unsafe { Box::from_raw(node.as_ptr()) };
        Some(node.value)
    }

    fn clear(&mut self) {
        self.index.clear();
        self.list.free_all();
    }
}

impl<K, V> Drop for Store<K, V> {
    fn drop(&mut self) {
        self.list.free_all();
    }
}

/// A bounded, thread-safe LRU cache.
///
/// Entries live in a doubly linked recency list indexed by a `HashMap`, so
/// lookup, promotion, insertion and eviction are all O(1). A single
/// [`RwLock`] guards both structures: anything that reorders the list
/// (including [`get`](Self::get)) takes the write lock, while
/// [`exists`](Self::exists), [`peek`](Self::peek) and [`len`](Self::len)
/// share the read lock. The capacity is fixed and read without locking.
///
/// # Examples
///
/// ```rust
/// use bounded_lru::LruCache;
///
/// let cache = LruCache::new(2).unwrap();
/// cache.set("a".to_string(), 1);
/// cache.set("b".to_string(), 2);
/// cache.get(&"a".to_string());
/// cache.set("c".to_string(), 3);
///
/// assert!(!cache.exists(&"b".to_string()));
/// assert!(cache.exists(&"a".to_string()));
/// ```
pub struct LruCache<K, V> {
    capacity: usize,
    store: RwLock<Store<K, V>>,
}

impl<K, V> LruCache<K, V>
where
    K: Clone + Debug + Hash + Eq,
    V: Clone,
{
    /// Creates an empty cache holding at most `capacity` entries.
    ///
    /// Fails with [`CacheError::InvalidConfiguration`](crate::CacheError) when
    /// `capacity` is zero.
    pub fn new(capacity: usize) -> Result<Self> {
        Ok(Self::with_config(&CacheConfig::new(capacity)?))
    }

    /// Creates an empty cache from a textual capacity such as `"1024"`.
    pub fn from_config(config: &str) -> Result<Self> {
        Ok(Self::with_config(&config.parse()?))
    }

    /// Creates an empty cache from an already validated configuration.
    pub fn with_config(config: &CacheConfig) -> Self {
        let capacity = config.capacity();
        debug!(capacity, "created lru cache");
        Self {
            capacity,
            store: RwLock::new(Store::with_capacity(capacity)),
        }
    }

    /// Creates a cache pre-seeded with `entries`.
    ///
    /// Keys are admitted in iteration order until the cache is full; the
    /// remaining new keys are dropped without evicting anything, so the
    /// result holds `min(distinct keys, capacity)` entries. A repeated key
    /// that was already admitted takes the later value. Which keys survive
    /// truncation depends on the iteration order of `entries`.
    pub fn with_entries<I>(config: &CacheConfig, entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
    {
        let cache = Self::with_config(config);
        {
            let mut store = cache.store.write();
            let mut dropped = 0usize;
            for (key, value) in entries {
                if let Some(slot) = store.promote(&key) {
                    *slot = value;
                    continue;
                }
                if store.len() < cache.capacity {
                    store.insert_new(key, value, cache.capacity);
                } else {
                    dropped += 1;
                }
            }
            if dropped > 0 {
                trace!(dropped, capacity = cache.capacity, "truncated seed entries");
            }
            debug!(seeded = store.len(), "seeded lru cache");
        }
        cache
    }

    /// Returns the value for `key` and marks it most recently used.
    pub fn get(&self, key: &K) -> Option<V> {
        let mut store = self.store.write();
        store.promote(key).cloned()
    }

    /// Returns the value for `key` without changing its recency.
    pub fn peek(&self, key: &K) -> Option<V> {
        self.store.read().value(key).cloned()
    }

    /// Returns whether `key` is cached, without changing its recency.
    pub fn exists(&self, key: &K) -> bool {
        self.store.read().index.contains_key(key)
    }

    /// Inserts or replaces `key`, making it the most recently used entry.
    ///
    /// When the key is new and the cache is full, the least recently used
    /// entry is evicted first. Returns the previous value if `key` was
    /// already present.
    pub fn set(&self, key: K, value: V) -> Option<V> {
        let mut store = self.store.write();
        if let Some(slot) = store.promote(&key) {
            return Some(mem::replace(slot, value));
        }
        store.insert_new(key, value, self.capacity);
        None
    }

    /// Replaces the value of `key` only if it is already cached, promoting it.
    ///
    /// Never inserts and never evicts.
    pub fn update(&self, key: K, value: V) -> bool {
        self.store.write().replace(&key, value)
    }

    /// Removes `key`, returning its value if it was cached.
    pub fn remove(&self, key: &K) -> Option<V> {
        self.store.write().remove(key)
    }

    /// Returns the number of cached entries, never more than [`capacity`](Self::capacity).
    pub fn len(&self) -> usize {
        self.store.read().len()
    }

    /// Returns true if the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the capacity fixed at construction. Takes no lock.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns the cached keys from most to least recently used.
    pub fn keys(&self) -> Vec<K> {
        self.store.read().list.keys()
    }

    /// Removes all entries, keeping the capacity.
    pub fn clear(&self) {
        self.store.write().clear();
    }
}

impl<K, V> Debug for LruCache<K, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LruCache")
            .field("capacity", &self.capacity)
            .field("len", &self.store.read().list.len())
            .finish()
    }
}

impl<K, V> Cache<K, V> for LruCache<K, V>
where
    K: Clone + Debug + Hash + Eq + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    fn get(&self, key: &K) -> Option<V> {
        self.get(key)
    }

    fn exists(&self, key: &K) -> bool {
        self.exists(key)
    }

    fn set(&self, key: K, value: V) {
        self.set(key, value);
    }

    fn update(&self, key: K, value: V) -> bool {
        self.update(key, value)
    }

    fn remove(&self, key: &K) {
        self.remove(key);
    }

    fn len(&self) -> Option<usize> {
        Some(self.len())
    }

    fn capacity(&self) -> Option<usize> {
        Some(self.capacity)
    }
}
