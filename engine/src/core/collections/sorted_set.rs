//! Sorted Set
//!
//! An ordered, uniquely-keyed collection backed by a dense `Vec`.
//!
//! The uniqueness key and the sort key are supplied separately and may refer
//! to different fields (cue id vs. start time), so removal cannot binary
//! search by key and falls back to a linear scan.

use std::collections::HashSet;
use std::fmt;
use std::hash::Hash;

type KeyFn<T, K> = Box<dyn Fn(&T) -> K + Send + Sync>;
type SortKeyFn<T> = Box<dyn Fn(&T) -> f64 + Send + Sync>;

/// Ordered, uniquely-keyed collection.
///
/// Items are kept ascending by `sort_key`. Insertion is O(log n) comparisons
/// plus an O(n) shift; membership is O(1) through the key index.
pub struct SortedSet<T, K> {
    items: Vec<T>,
    keys: HashSet<K>,
    key_fn: KeyFn<T, K>,
    sort_key: SortKeyFn<T>,
}

impl<T, K> SortedSet<T, K>
where
    K: Eq + Hash,
{
    /// Creates an empty set with the given uniqueness key and sort key
    pub fn new(
        key_fn: impl Fn(&T) -> K + Send + Sync + 'static,
        sort_key: impl Fn(&T) -> f64 + Send + Sync + 'static,
    ) -> Self {
        Self {
            items: Vec::new(),
            keys: HashSet::new(),
            key_fn: Box::new(key_fn),
            sort_key: Box::new(sort_key),
        }
    }

    /// Inserts `item` at its sorted position.
    ///
    /// Returns false (and leaves the set untouched) if an item with the same
    /// key is already present.
    pub fn add(&mut self, item: T) -> bool {
        let key = (self.key_fn)(&item);
        if self.keys.contains(&key) {
            return false;
        }

        let index = self.insertion_index(&item);
        self.keys.insert(key);
        self.items.insert(index, item);
        true
    }

    /// First position whose sort key is not less than `item`'s
    fn insertion_index(&self, item: &T) -> usize {
        let target = (self.sort_key)(item);
        let mut low = 0;
        let mut high = self.items.len();

        while low < high {
            let mid = low + (high - low) / 2;
            if (self.sort_key)(&self.items[mid]) < target {
                low = mid + 1;
            } else {
                high = mid;
            }
        }
        low
    }

    /// Returns true if an item with the same key as `item` is present
    pub fn has(&self, item: &T) -> bool {
        self.keys.contains(&(self.key_fn)(item))
    }

    /// Returns true if `key` is present
    pub fn contains_key(&self, key: &K) -> bool {
        self.keys.contains(key)
    }

    /// Removes the item sharing `item`'s key. Returns false if absent.
    pub fn delete(&mut self, item: &T) -> bool {
        let key = (self.key_fn)(item);
        self.delete_key(&key)
    }

    /// Removes the item with `key`. Returns false if absent.
    pub fn delete_key(&mut self, key: &K) -> bool {
        if !self.keys.remove(key) {
            return false;
        }

        if let Some(index) = self.items.iter().position(|t| (self.key_fn)(t) == *key) {
            self.items.remove(index);
        }
        true
    }

    /// Removes every item
    pub fn clear(&mut self) {
        self.keys.clear();
        self.items.clear();
    }

    /// Number of items
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns true if the set is empty
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// The ordered items
    pub fn items(&self) -> &[T] {
        &self.items
    }

    /// Iterates over the items in order
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    /// Copies the ordered items into a new `Vec`
    pub fn to_vec(&self) -> Vec<T>
    where
        T: Clone,
    {
        self.items.clone()
    }
}

impl<'a, T, K> IntoIterator for &'a SortedSet<T, K> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl<T: fmt::Debug, K> fmt::Debug for SortedSet<T, K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SortedSet")
            .field("items", &self.items)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Debug, PartialEq)]
    struct Entry {
        id: &'static str,
        at: f64,
    }

    fn entry(id: &'static str, at: f64) -> Entry {
        Entry { id, at }
    }

    fn new_set() -> SortedSet<Entry, &'static str> {
        SortedSet::new(|e: &Entry| e.id, |e: &Entry| e.at)
    }

    fn ids(set: &SortedSet<Entry, &'static str>) -> Vec<&'static str> {
        set.iter().map(|e| e.id).collect()
    }

    #[test]
    fn test_add_keeps_ascending_order() {
        let mut set = new_set();
        for e in [
            entry("d", 4.0),
            entry("a", 1.0),
            entry("c", 3.0),
            entry("e", 5.0),
            entry("b", 2.0),
        ] {
            assert!(set.add(e));
        }

        assert_eq!(ids(&set), vec!["a", "b", "c", "d", "e"]);
        assert!(set.items().windows(2).all(|w| w[0].at <= w[1].at));
    }

    #[test]
    fn test_add_duplicate_key_is_noop() {
        let mut set = new_set();
        assert!(set.add(entry("a", 1.0)));
        assert!(set.add(entry("b", 2.0)));

        // Same key, different sort position: must not move or duplicate.
        assert!(!set.add(entry("a", 9.0)));

        assert_eq!(set.len(), 2);
        assert_eq!(ids(&set), vec!["a", "b"]);
        assert_eq!(set.items()[0].at, 1.0);
    }

    #[test]
    fn test_equal_sort_keys_insert_before_existing() {
        let mut set = new_set();
        set.add(entry("first", 1.0));
        set.add(entry("second", 1.0));
        set.add(entry("zero", 0.5));

        assert_eq!(ids(&set), vec!["zero", "second", "first"]);
    }

    #[test]
    fn test_has_and_contains_key() {
        let mut set = new_set();
        set.add(entry("a", 1.0));

        assert!(set.has(&entry("a", 42.0)));
        assert!(set.contains_key(&"a"));
        assert!(!set.has(&entry("b", 1.0)));
    }

    #[test]
    fn test_delete_by_key_independent_of_sort_field() {
        let mut set = new_set();
        set.add(entry("a", 1.0));
        set.add(entry("b", 2.0));
        set.add(entry("c", 3.0));

        // Sort field differs from the stored item; the key decides.
        assert!(set.delete(&entry("b", 100.0)));
        assert_eq!(ids(&set), vec!["a", "c"]);
        assert!(!set.has(&entry("b", 2.0)));

        assert!(!set.delete(&entry("missing", 1.0)));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_delete_then_re_add() {
        let mut set = new_set();
        set.add(entry("a", 1.0));
        assert!(set.delete_key(&"a"));
        assert!(set.is_empty());

        assert!(set.add(entry("a", 2.0)));
        assert_eq!(set.items()[0].at, 2.0);
    }

    #[test]
    fn test_clear_empties_items_and_keys() {
        let mut set = new_set();
        set.add(entry("a", 1.0));
        set.add(entry("b", 2.0));
        set.clear();

        assert!(set.is_empty());
        assert!(!set.contains_key(&"a"));
        assert!(set.add(entry("a", 1.0)));
    }

    #[test]
    fn test_to_vec_and_iteration_match_items() {
        let mut set = new_set();
        set.add(entry("b", 2.0));
        set.add(entry("a", 1.0));

        let collected: Vec<&Entry> = (&set).into_iter().collect();
        assert_eq!(collected.len(), 2);
        assert_eq!(set.to_vec(), set.items().to_vec());
    }
}
