//! Pairing each key with another key's value.
//!
//! Negative authorization checks need every identity to act on a resource it
//! does not own. [`cross_assign`] pairs each key of a snapshot with the entry
//! chosen by [`Snapshot::other_than`], which is deterministic for a given
//! snapshot and targets every entry exactly once.

use crate::FanOutError;
use tenant_scale_core::{Key, Snapshot};

/// One worker's assignment in a cross-check round.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrossTarget<K, V> {
    /// The key the worker runs as.
    pub key: K,
    /// The key whose entry the worker acts on.
    pub other_key: K,
    /// The other key's value.
    pub other_value: V,
}

/// Assigns every key of `snapshot` a different key's entry.
///
/// An empty snapshot yields no assignments. A snapshot with a single key
/// fails with [`FanOutError::NoOtherKey`].
///
/// # Examples
///
/// ```
/// use tenant_scale_core::Snapshot;
/// use tenant_scale_fanout::cross_assign;
///
/// let owners: Snapshot<&str, &str> = [("user0", "vol-a"), ("user1", "vol-b")].into_iter().collect();
/// let targets = cross_assign(&owners).unwrap();
///
/// assert_eq!(targets[0].key, "user0");
/// assert_eq!(targets[0].other_value, "vol-b");
/// assert_eq!(targets[1].other_value, "vol-a");
/// ```
pub fn cross_assign<K, V>(snapshot: &Snapshot<K, V>) -> Result<Vec<CrossTarget<K, V>>, FanOutError<K>>
where
    K: Key,
    V: Clone,
{
    snapshot
        .keys()
        .map(|key| match snapshot.other_than(key) {
            Some((other_key, other_value)) => Ok(CrossTarget {
                key: key.clone(),
                other_key: other_key.clone(),
                other_value: other_value.clone(),
            }),
            None => Err(FanOutError::NoOtherKey { key: key.clone() }),
        })
        .collect()
}
