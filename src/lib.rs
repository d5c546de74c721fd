//! A bounded, thread-safe LRU (Least Recently Used) cache.
//!
//! This crate provides:
//!
//! 1. [`LruCache`] - A fixed-capacity cache with exact LRU eviction, guarded by a single reader/writer lock
//! 2. [`ShardedLruCache`] - Independently locked LRU shards for write-heavy workloads, with per-shard eviction
//! 3. [`RemoteCache`] - An adapter exposing any [`RemoteStore`] through the same [`Cache`] contract
//!
//! # Features
//!
//! - O(1) lookup, promotion, insertion and eviction
//! - Insert-or-update ([`LruCache::set`]) and update-only-if-present ([`LruCache::update`])
//! - Recency-neutral reads ([`LruCache::exists`], [`LruCache::peek`]) under a shared lock
//! - Capacity parsed from text via [`CacheConfig`]
//!
//! # Examples
//!
//! ```rust
//! use bounded_lru::{Cache, CacheConfig, LruCache};
//!
//! let config: CacheConfig = "2".parse().unwrap();
//! let cache: LruCache<String, u32> = LruCache::with_config(&config);
//!
//! cache.set("a".to_string(), 1);
//! cache.set("b".to_string(), 2);
//! assert_eq!(cache.get(&"a".to_string()), Some(1));
//!
//! // "b" is now the least recently used entry and makes room for "c".
//! cache.set("c".to_string(), 3);
//! assert!(!cache.exists(&"b".to_string()));
//!
//! assert!(!cache.update("x".to_string(), 10));
//! assert_eq!(cache.len(), 2);
//!
//! // Any backend can sit behind the trait object.
//! let shared: Box<dyn Cache<String, u32>> = Box::new(cache);
//! assert_eq!(shared.capacity(), Some(2));
//! ```

pub mod config;
pub mod error;
pub mod lru_cache;
pub mod remote_cache;
pub mod sharded_lru_cache;

pub use config::CacheConfig;
pub use error::{CacheError, RemoteError, Result};
pub use lru_cache::{Cache, LruCache};
pub use remote_cache::{RemoteCache, RemoteStore};
pub use sharded_lru_cache::ShardedLruCache;
