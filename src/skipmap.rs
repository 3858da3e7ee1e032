use std::{borrow::Borrow, fmt, sync::Arc};

use parking_lot::{RwLock, RwLockReadGuard};
use rand::{rngs::StdRng, RngCore};

use crate::{error::Result, options::Options, skiplist::SkipList};

/// A [`SkipList`] shared between threads.
///
/// Lookups hold a read lock, so they run in parallel with each other but
/// never alongside a writer. `insert`, `remove` and `clear` hold the write
/// lock for the whole walk and splice, which serializes writers. Nodes are
/// only freed under the write lock, so no reader can reach a freed or half
/// linked node.
pub struct SkipMap<K, V, R = StdRng> {
    list: Arc<RwLock<SkipList<K, V, R>>>,
}

impl<K, V, R> Clone for SkipMap<K, V, R> {
    fn clone(&self) -> Self {
        SkipMap {
            list: self.list.clone(),
        }
    }
}

impl<K: Ord, V> SkipMap<K, V> {
    pub fn new() -> Self {
        SkipList::new().into()
    }

    pub fn with_max_level(max_level: usize) -> Result<Self> {
        SkipList::with_max_level(max_level).map(Into::into)
    }

    pub fn with_options(opts: Options) -> Result<Self> {
        SkipList::with_options(opts).map(Into::into)
    }
}

impl<K: Ord, V> Default for SkipMap<K, V> {
    fn default() -> Self {
        SkipMap::new()
    }
}

impl<K, V, R> From<SkipList<K, V, R>> for SkipMap<K, V, R> {
    fn from(list: SkipList<K, V, R>) -> Self {
        SkipMap {
            list: Arc::new(RwLock::new(list)),
        }
    }
}

impl<K: Ord, V, R: RngCore> SkipMap<K, V, R> {
    pub fn with_rng(opts: Options, rng: R) -> Result<Self> {
        SkipList::with_rng(opts, rng).map(Into::into)
    }

    pub fn insert(&self, key: K, value: V) -> Result<Option<V>> {
        self.list.write().insert(key, value)
    }

    pub fn remove<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.list.write().remove(key)
    }

    pub fn search<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
        V: Clone,
    {
        self.list.read().search(key).cloned()
    }

    /// Runs `f` on the value under `key` while the read lock is held.
    pub fn search_with<Q, T>(&self, key: &Q, f: impl FnOnce(&V) -> T) -> Option<T>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.list.read().search(key).map(f)
    }

    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.list.read().contains_key(key)
    }
}

impl<K, V, R> SkipMap<K, V, R> {
    pub fn len(&self) -> usize {
        self.list.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.list.read().is_empty()
    }

    pub fn max_level(&self) -> usize {
        self.list.read().max_level()
    }

    pub fn current_level(&self) -> usize {
        self.list.read().current_level()
    }

    pub fn clear(&self) {
        self.list.write().clear()
    }

    /// Locks the list for reading, e.g. to iterate it in order. Writers block
    /// until the guard is dropped.
    pub fn read(&self) -> RwLockReadGuard<'_, SkipList<K, V, R>> {
        self.list.read()
    }

    pub fn entries(&self) -> Vec<(K, V)>
    where
        K: Clone,
        V: Clone,
    {
        self.list
            .read()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }
}

impl<K: fmt::Display, V, R> fmt::Display for SkipMap<K, V, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&*self.list.read(), f)
    }
}

impl<K: fmt::Debug, V: fmt::Debug, R> fmt::Debug for SkipMap<K, V, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&*self.list.read(), f)
    }
}
