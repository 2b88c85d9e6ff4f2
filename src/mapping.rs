use std::{cmp::Ordering, collections::HashMap, hash::Hash};

/// Key/value entries kept in insertion order.
///
/// Re-inserting an existing key replaces its value without moving it, so a
/// `Mapping` behaves like an insertion-ordered dictionary. Two mappings are
/// equal when they hold the same entries in the same order.
#[derive(Debug, Clone)]
pub struct Mapping<K, V> {
    entries: Vec<(K, V)>,
    index: HashMap<K, usize>,
}

impl<K, V> Default for Mapping<K, V> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            index: HashMap::new(),
        }
    }
}

impl<K, V> Mapping<K, V>
where
    K: Eq + Hash + Clone,
{
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.index.contains_key(key)
    }

    pub fn get(&self, key: &K) -> Option<&V> {
        self.index.get(key).map(|&i| &self.entries[i].1)
    }

    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        match self.index.get(key) {
            Some(&i) => Some(&mut self.entries[i].1),
            None => None,
        }
    }

    /// Inserts or overwrites, returning the previous value.
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        if let Some(slot) = self.get_mut(&key) {
            return Some(std::mem::replace(slot, value));
        }
        self.index.insert(key.clone(), self.entries.len());
        self.entries.push((key, value));
        None
    }

    /// Returns the value for `key`, inserting `default()` at the end first if absent.
    pub fn get_or_insert_with(&mut self, key: K, default: impl FnOnce() -> V) -> &mut V {
        let i = match self.index.get(&key).copied() {
            Some(i) => i,
            None => {
                self.index.insert(key.clone(), self.entries.len());
                self.entries.push((key, default()));
                self.entries.len() - 1
            }
        };
        &mut self.entries[i].1
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
        self.entries.iter().map(|(k, v)| (k, v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.entries.iter().map(|(k, _)| k)
    }

    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.entries.iter().map(|(_, v)| v)
    }

    /// Keeps only the first `n` entries.
    pub fn truncate(&mut self, n: usize) {
        self.entries.truncate(n);
        self.reindex();
    }

    pub fn map_values<W>(self, mut f: impl FnMut(V) -> W) -> Mapping<K, W> {
        Mapping {
            entries: self.entries.into_iter().map(|(k, v)| (k, f(v))).collect(),
            index: self.index,
        }
    }

    /// Reorders the entries with a stable sort on `compare` over values.
    pub fn sort_by_values(&mut self, mut compare: impl FnMut(&V, &V) -> Ordering) {
        self.entries.sort_by(|a, b| compare(&a.1, &b.1));
        self.reindex();
    }

    fn reindex(&mut self) {
        self.index = self
            .entries
            .iter()
            .enumerate()
            .map(|(i, (k, _))| (k.clone(), i))
            .collect();
    }
}

impl<K, V> Mapping<K, V>
where
    K: Eq + Hash + Clone,
    V: PartialOrd,
{
    pub fn sorted_by_value(mut self) -> Self {
        self.sort_by_values(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
        self
    }
}

/// Reorders `mapping` by ascending value. Entries with equal values keep their relative order.
pub fn sort_by_value_ascending<K, V>(mapping: Mapping<K, V>) -> Mapping<K, V>
where
    K: Eq + Hash + Clone,
    V: PartialOrd,
{
    mapping.sorted_by_value()
}

impl<K: PartialEq, V: PartialEq> PartialEq for Mapping<K, V> {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}

impl<K, V> FromIterator<(K, V)> for Mapping<K, V>
where
    K: Eq + Hash + Clone,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut mapping = Mapping::new();
        for (k, v) in iter {
            mapping.insert(k, v);
        }
        mapping
    }
}

impl<K, V> IntoIterator for Mapping<K, V> {
    type Item = (K, V);
    type IntoIter = std::vec::IntoIter<(K, V)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}
