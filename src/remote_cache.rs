use std::fmt::Debug;
use std::hash::Hash;
use std::marker::PhantomData;

use tracing::warn;

use crate::error::RemoteError;
use crate::lru_cache::Cache;

/// A key/value store living outside the process, such as a networked
/// key/value service.
///
/// Implementations own the connection and the wire protocol; every call may
/// fail with a [`RemoteError`]. Capacity and eviction are the store's own
/// business.
pub trait RemoteStore<K, V>: Send + Sync {
    fn get(&self, key: &K) -> Result<Option<V>, RemoteError>;

    fn set(&self, key: K, value: V) -> Result<(), RemoteError>;

    /// Replaces the value of an existing key, reporting whether it existed.
    fn modify(&self, key: K, value: V) -> Result<bool, RemoteError>;

    fn remove(&self, key: &K) -> Result<(), RemoteError>;

    fn exists(&self, key: &K) -> Result<bool, RemoteError>;
}

/// Adapts a [`RemoteStore`] to the [`Cache`] contract.
///
/// Remote failures are logged and then reported as absence: a failed `get`
/// is a miss, a failed `exists` or `update` is `false`, and a failed `set`
/// or `remove` does nothing. Callers of the [`Cache`] trait therefore cannot
/// tell a missing key from an unreachable store; use [`store`](Self::store)
/// when the difference matters.
///
/// The size of a remote store is unknown and its capacity unbounded, so
/// [`Cache::len`] and [`Cache::capacity`] both return `None`.
pub struct RemoteCache<S, K, V> {
    store: S,
    _marker: PhantomData<fn(K, V)>,
}

impl<S, K, V> RemoteCache<S, K, V>
where
    S: RemoteStore<K, V>,
{
    /// Wraps `store` behind the [`Cache`] contract.
    pub fn new(store: S) -> Self {
        Self {
            store,
            _marker: PhantomData,
        }
    }

    /// The underlying store, for callers that need its errors.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Unwraps the adapter, returning the store.
    pub fn into_inner(self) -> S {
        self.store
    }
}

impl<S, K, V> Cache<K, V> for RemoteCache<S, K, V>
where
    S: RemoteStore<K, V>,
    K: Clone + Debug + Hash + Eq + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    fn get(&self, key: &K) -> Option<V> {
        self.store.get(key).unwrap_or_else(|err| {
            warn!(?key, error = %err, "remote get failed, reporting a miss");
            None
        })
    }

    fn exists(&self, key: &K) -> bool {
        self.store.exists(key).unwrap_or_else(|err| {
            warn!(?key, error = %err, "remote exists failed, reporting absent");
            false
        })
    }

    fn set(&self, key: K, value: V) {
        if let Err(err) = self.store.set(key.clone(), value) {
            warn!(?key, error = %err, "remote set failed, value dropped");
        }
    }

    fn update(&self, key: K, value: V) -> bool {
        self.store.modify(key.clone(), value).unwrap_or_else(|err| {
            warn!(?key, error = %err, "remote update failed, reporting absent");
            false
        })
    }

    fn remove(&self, key: &K) {
        if let Err(err) = self.store.remove(key) {
            warn!(?key, error = %err, "remote remove failed");
        }
    }

    fn len(&self) -> Option<usize> {
        None
    }

    fn capacity(&self) -> Option<usize> {
        None
    }
}
