//! Thread-safe keyed store and its point-in-time snapshot.

use crate::Key;
use hashbrown::HashMap;
use parking_lot::Mutex;
use std::borrow::Borrow;
use std::collections::btree_map::{self, BTreeMap};
use std::ops::Bound;

/// A key/value map shared by the workers of one round.
///
/// Workers call [`put`](Self::put) concurrently; the orchestrator reads the
/// whole map once with [`snapshot`](Self::snapshot) after they have joined.
/// The lock is only held for a single insert or while the snapshot is copied,
/// never across a remote call.
///
/// A second `put` with the same key overwrites the first. There is no ordering
/// between concurrent writers of the same key.
///
/// # Examples
///
/// ```
/// use tenant_scale_core::KeyedStore;
///
/// let store = KeyedStore::new();
/// store.put("user1".to_string(), "vol-1".to_string());
/// store.put("user0".to_string(), "vol-0".to_string());
///
/// let snapshot = store.snapshot();
/// assert_eq!(snapshot.keys().collect::<Vec<_>>(), ["user0", "user1"]);
/// ```
#[derive(Debug)]
pub struct KeyedStore<K, V> {
    entries: Mutex<HashMap<K, V>>,
}

impl<K: Key, V: Clone> KeyedStore<K, V> {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Inserts or overwrites the value for `key`.
    pub fn put(&self, key: K, value: V) {
        self.entries.lock().insert(key, value);
    }

    /// Returns a clone of the value stored for `key`.
    pub fn get(&self, key: &K) -> Option<V> {
        self.entries.lock().get(key).cloned()
    }

    /// Number of stored keys.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Returns true if nothing has been stored.
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Copies the current contents under the lock.
    ///
    /// The snapshot is fully formed even if writers are still running, but the
    /// intended use is to take it once every writer has joined.
    pub fn snapshot(&self) -> Snapshot<K, V> {
        let entries = self.entries.lock();
        Snapshot {
            entries: entries
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        }
    }
}

impl<K: Key, V: Clone> Default for KeyedStore<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

/// Immutable, ordered view of a [`KeyedStore`].
///
/// Iteration is in ascending key order, which makes every selection derived
/// from a snapshot deterministic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot<K, V> {
    entries: BTreeMap<K, V>,
}

impl<K: Ord, V> Snapshot<K, V> {
    /// Returns the value for `key`.
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.entries.get(key)
    }

    /// Returns true if `key` is present.
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.entries.contains_key(key)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the snapshot is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in ascending key order.
    pub fn iter(&self) -> btree_map::Iter<'_, K, V> {
        self.entries.iter()
    }

    /// Keys in ascending order.
    pub fn keys(&self) -> btree_map::Keys<'_, K, V> {
        self.entries.keys()
    }

    /// Values in ascending key order.
    pub fn values(&self) -> btree_map::Values<'_, K, V> {
        self.entries.values()
    }

    /// Picks the entry that belongs to some key other than `key`.
    ///
    /// The choice is the next key after `key` in ascending order, wrapping to
    /// the smallest key. Over a snapshot with two or more keys this pairs every
    /// key with a distinct neighbour, so each entry is picked exactly once.
    /// Returns `None` when no other key exists.
    pub fn other_than(&self, key: &K) -> Option<(&K, &V)> {
        self.entries
            .range((Bound::Excluded(key), Bound::Unbounded))
            .next()
            .or_else(|| self.entries.iter().next())
            .filter(|(k, _)| *k != key)
    }

    /// Consumes the snapshot, returning the ordered map.
    pub fn into_inner(self) -> BTreeMap<K, V> {
        self.entries
    }
}

impl<K, V> Default for Snapshot<K, V> {
    fn default() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }
}

impl<K: Ord, V> FromIterator<(K, V)> for Snapshot<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl<K, V> IntoIterator for Snapshot<K, V> {
    type Item = (K, V);
    type IntoIter = btree_map::IntoIter<K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<'a, K, V> IntoIterator for &'a Snapshot<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = btree_map::Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
