use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use hashbrown::HashTable;

use crate::JsonValue;
use crate::hash::hash_key;

// -----------------------------------------------------------------------------
// JsonMap

/// An insertion-ordered map from string keys to [`JsonValue`]s.
///
/// Entries live in a `Vec`, and a hash table of indices provides lookup.
/// Iteration follows insertion order, which is the order used on output.
///
/// Inserting a key that is already present replaces the value but keeps
/// the key at the position of its first insertion.
///
/// Two maps are equal only if they hold the same entries in the same order.
#[derive(Clone, Default)]
pub struct JsonMap {
    entries: Vec<(String, JsonValue)>,
    index: HashTable<usize>,
}

impl JsonMap {
    #[inline]
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            index: HashTable::new(),
        }
    }

    #[inline]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
            index: HashTable::with_capacity(capacity),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn find(&self, key: &str) -> Option<usize> {
        let entries = &self.entries;
        self.index
            .find(hash_key(key), |&i| entries[i].0 == key)
            .copied()
    }

    #[inline]
    pub fn contains_key(&self, key: &str) -> bool {
        self.find(key).is_some()
    }

    pub fn get(&self, key: &str) -> Option<&JsonValue> {
        self.find(key).map(|i| &self.entries[i].1)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut JsonValue> {
        self.find(key).map(|i| &mut self.entries[i].1)
    }

    /// Inserts a key-value pair, returning the previous value of `key`.
    ///
    /// An existing key keeps its position.
    pub fn insert(&mut self, key: impl Into<String>, value: JsonValue) -> Option<JsonValue> {
        let key = key.into();
        let hash = hash_key(&key);
        let Self { entries, index } = self;

        if let Some(&i) = index.find(hash, |&i| entries[i].0 == key) {
            return Some(core::mem::replace(&mut entries[i].1, value));
        }

        let i = entries.len();
        entries.push((key, value));
        index.insert_unique(hash, i, |&i| hash_key(&entries[i].0));
        None
    }

    /// Removes `key`, shifting later entries down. O(n).
    pub fn remove(&mut self, key: &str) -> Option<JsonValue> {
        let i = self.find(key)?;
        let (_, value) = self.entries.remove(i);
        self.reindex();
        Some(value)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.index.clear();
    }

    fn reindex(&mut self) {
        let Self { entries, index } = self;
        index.clear();
        for (i, (key, _)) in entries.iter().enumerate() {
            index.insert_unique(hash_key(key), i, |&i| hash_key(&entries[i].0));
        }
    }

    #[inline]
    pub fn iter(&self) -> Iter<'_> {
        Iter(self.entries.iter())
    }

    #[inline]
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&str, &mut JsonValue)> {
        self.entries.iter_mut().map(|(k, v)| (k.as_str(), v))
    }

    #[inline]
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    #[inline]
    pub fn values(&self) -> impl Iterator<Item = &JsonValue> {
        self.entries.iter().map(|(_, v)| v)
    }
}

// -----------------------------------------------------------------------------
// Iterator

/// Borrowing iterator over a [`JsonMap`], in insertion order.
pub struct Iter<'a>(core::slice::Iter<'a, (String, JsonValue)>);

impl<'a> Iterator for Iter<'a> {
    type Item = (&'a str, &'a JsonValue);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.0.next().map(|(k, v)| (k.as_str(), v))
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.0.size_hint()
    }
}

impl ExactSizeIterator for Iter<'_> {}

impl<'a> IntoIterator for &'a JsonMap {
    type Item = (&'a str, &'a JsonValue);
    type IntoIter = Iter<'a>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl IntoIterator for JsonMap {
    type Item = (String, JsonValue);
    type IntoIter = alloc::vec::IntoIter<(String, JsonValue)>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<K: Into<String>> Extend<(K, JsonValue)> for JsonMap {
    fn extend<I: IntoIterator<Item = (K, JsonValue)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}

impl<K: Into<String>> FromIterator<(K, JsonValue)> for JsonMap {
    fn from_iter<I: IntoIterator<Item = (K, JsonValue)>>(iter: I) -> Self {
        let mut map = JsonMap::new();
        map.extend(iter);
        map
    }
}

// -----------------------------------------------------------------------------
// Traits

impl PartialEq for JsonMap {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}

impl fmt::Debug for JsonMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::JsonMap;
    use crate::JsonValue;
    use alloc::vec::Vec;

    #[test]
    fn duplicate_key_keeps_first_position() {
        let mut map = JsonMap::new();
        map.insert("a", JsonValue::from(1));
        map.insert("b", JsonValue::from(2));
        let old = map.insert("a", JsonValue::from(3));

        assert_eq!(old, Some(JsonValue::from(1)));
        assert_eq!(map.len(), 2);
        let keys: Vec<&str> = map.keys().collect();
        assert_eq!(keys, ["a", "b"]);
        assert_eq!(map.get("a"), Some(&JsonValue::from(3)));
    }

    #[test]
    fn remove_keeps_lookup_consistent() {
        let mut map: JsonMap = [("x", JsonValue::Null), ("y", JsonValue::from(true))]
            .into_iter()
            .collect();
        map.insert("z", JsonValue::from("z"));

        assert_eq!(map.remove("x"), Some(JsonValue::Null));
        assert_eq!(map.remove("x"), None);
        assert_eq!(map.get("y"), Some(&JsonValue::from(true)));
        assert_eq!(map.get("z"), Some(&JsonValue::from("z")));
        assert_eq!(map.keys().collect::<Vec<_>>(), ["y", "z"]);
    }

    #[test]
    fn equality_is_order_sensitive() {
        let ab: JsonMap = [("a", JsonValue::Null), ("b", JsonValue::Null)].into_iter().collect();
        let ba: JsonMap = [("b", JsonValue::Null), ("a", JsonValue::Null)].into_iter().collect();
        assert_ne!(ab, ba);
        assert_eq!(ab, ab.clone());
    }
}
