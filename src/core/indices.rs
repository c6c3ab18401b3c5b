use std::hash::Hash;

use hashbrown::HashMap;

/// Secondary index from a key to the identities filed under it, in insertion order.
pub type VecIndex<K, V> = HashMap<K, Vec<V>>;

/// Files `value` under `key` unless it is already there.
pub fn insert_unique<K: Hash + Eq, V: PartialEq>(index: &mut VecIndex<K, V>, key: K, value: V) {
    let ids = index.entry(key).or_default();
    if !ids.contains(&value) {
        ids.push(value);
    }
}

/// Removes `value` from under `key`, dropping the key once empty.
pub fn remove_from<K: Hash + Eq, V: PartialEq>(index: &mut VecIndex<K, V>, key: &K, value: &V) {
    if let Some(ids) = index.get_mut(key) {
        if let Some(pos) = ids.iter().position(|x| x == value) {
            ids.remove(pos);
        }
        if ids.is_empty() {
            index.remove(key);
        }
    }
}
