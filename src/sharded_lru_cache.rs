use std::collections::hash_map::DefaultHasher;
use std::fmt::Debug;
use std::hash::{Hash, Hasher};
use std::num::NonZeroUsize;

use tracing::debug;

use crate::config::CacheConfig;
use crate::error::Result;
use crate::lru_cache::{Cache, LruCache};

// Minimum capacity per shard
const MIN_SHARD_CAPACITY: usize = 4;
// Maximum number of shards, must be a power of 2
const MAX_SHARDS: usize = 16;

/// An LRU cache split into independently locked shards.
///
/// Keys are routed to a shard by hash, and each shard is a full [`LruCache`]
/// with its own lock, so operations on different shards never contend.
/// Recency and eviction are tracked per shard: the entry evicted is the
/// least recently used one *of its shard*, not necessarily of the whole
/// cache. The total number of entries never exceeds the configured capacity.
///
/// Use [`LruCache`] when exact global LRU order matters.
///
/// # Examples
///
/// ```rust
/// use bounded_lru::ShardedLruCache;
///
/// let cache = ShardedLruCache::new(1000).unwrap();
/// cache.set("key1".to_string(), "value1".to_string());
/// assert_eq!(cache.get(&"key1".to_string()), Some("value1".to_string()));
/// ```
pub struct ShardedLruCache<K, V> {
    shards: Vec<LruCache<K, V>>,
    total_capacity: usize,
}

impl<K, V> ShardedLruCache<K, V>
where
    K: Clone + Debug + Hash + Eq,
    V: Clone,
{
    /// Creates a sharded cache with the specified total capacity.
    ///
    /// The shard count is the largest power of two, at most `MAX_SHARDS`,
    /// that still leaves every shard `MIN_SHARD_CAPACITY` entries. Capacity
    /// that does not divide evenly goes to the first shards.
    pub fn new(capacity: usize) -> Result<Self> {
        Ok(Self::with_config(&CacheConfig::new(capacity)?))
    }

    /// Creates a sharded cache from a textual capacity such as `"1024"`.
    pub fn from_config(config: &str) -> Result<Self> {
        Ok(Self::with_config(&config.parse()?))
    }

    /// Creates a sharded cache from an already validated configuration.
    pub fn with_config(config: &CacheConfig) -> Self {
        let capacity = config.capacity();
        let shards: Vec<_> = shard_capacities(capacity)
            .into_iter()
            .map(|shard_capacity| LruCache::with_config(&CacheConfig::from(shard_capacity)))
            .collect();

        debug!(capacity, num_shards = shards.len(), "created sharded lru cache");
        Self {
            shards,
            total_capacity: capacity,
        }
    }

    /// Returns the total capacity across all shards.
    pub fn capacity(&self) -> usize {
        self.total_capacity
    }

    /// Returns the number of shards, always a power of two.
    pub fn num_shards(&self) -> usize {
        self.shards.len()
    }

    fn shard_index(&self, key: &K) -> usize {
        let mut hasher = DefaultHasher::new();
        key.hash(&mut hasher);
        (hasher.finish() as usize) & (self.shards.len() - 1)
    }

    fn shard(&self, key: &K) -> &LruCache<K, V> {
        &self.shards[self.shard_index(key)]
    }

    /// Returns the value for `key`, promoting it within its shard.
    pub fn get(&self, key: &K) -> Option<V> {
        self.shard(key).get(key)
    }

    /// Returns the value for `key` without changing its recency.
    pub fn peek(&self, key: &K) -> Option<V> {
        self.shard(key).peek(key)
    }

    /// Returns whether `key` is cached, without changing its recency.
    pub fn exists(&self, key: &K) -> bool {
        self.shard(key).exists(key)
    }

    /// Inserts or replaces `key`, evicting from its shard when that shard is full.
    pub fn set(&self, key: K, value: V) -> Option<V> {
        self.shard(&key).set(key, value)
    }

    /// Replaces the value of `key` only if it is already cached.
    pub fn update(&self, key: K, value: V) -> bool {
        self.shard(&key).update(key, value)
    }

    /// Removes `key`, returning its value if it was cached.
    pub fn remove(&self, key: &K) -> Option<V> {
        self.shard(key).remove(key)
    }

    /// Sums the shard sizes. Each shard is read under its own lock, so the
    /// total is not a snapshot while writers are active.
    pub fn len(&self) -> usize {
        self.shards.iter().map(LruCache::len).sum()
    }

    /// Returns true if every shard is empty.
    pub fn is_empty(&self) -> bool {
        self.shards.iter().all(LruCache::is_empty)
    }

    /// Removes all entries, one shard at a time.
    pub fn clear(&self) {
        for shard in &self.shards {
            shard.clear();
        }
    }
}

fn shard_count(capacity: usize) -> usize {
    let theoretical_shards = capacity / MIN_SHARD_CAPACITY;
    if theoretical_shards >= MAX_SHARDS {
        return MAX_SHARDS;
    }
    let mut n = 1;
    while n * 2 <= theoretical_shards {
        n *= 2;
    }
    n
}

// Every shard starts with one slot and the spare capacity is spread evenly,
// the first shards taking the remainder. The sizes sum to `capacity`.
fn shard_capacities(capacity: usize) -> Vec<NonZeroUsize> {
    let num_shards = shard_count(capacity);
    let spare = capacity.saturating_sub(num_shards);
    let base = spare / num_shards;
    let remainder = spare % num_shards;

    (0..num_shards)
        .map(|i| {
            let extra = if i < remainder { base + 1 } else { base };
            NonZeroUsize::MIN.saturating_add(extra)
        })
        .collect()
}

impl<K, V> Cache<K, V> for ShardedLruCache<K, V>
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
        Some(self.total_capacity)
    }
}
