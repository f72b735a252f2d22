use std::hash::Hash;

use hashbrown::HashMap;

/// Keyed accumulator that remembers first-insertion order.
///
/// Rankings sort with a stable sort on top of this, so equal counts keep
/// the order in which their keys were first seen and repeated runs over the
/// same input produce the same output.
#[derive(Debug, Clone)]
pub(crate) struct OrderedTally<K, V> {
    index: HashMap<K, usize>,
    entries: Vec<(K, V)>,
}

impl<K, V> Default for OrderedTally<K, V> {
    fn default() -> Self {
        Self {
            index: HashMap::new(),
            entries: Vec::new(),
        }
    }
}

impl<K: Hash + Eq + Clone, V: Default> OrderedTally<K, V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bucket for `key`, created empty on first access.
    pub fn entry(&mut self, key: K) -> &mut V {
        let idx = match self.index.get(&key) {
            Some(&idx) => idx,
            None => {
                let idx = self.entries.len();
                self.index.insert(key.clone(), idx);
                self.entries.push((key, V::default()));
                idx
            }
        };
        &mut self.entries[idx].1
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
        self.entries.iter().map(|(k, v)| (k, v))
    }

    pub fn into_entries(self) -> Vec<(K, V)> {
        self.entries
    }
}
