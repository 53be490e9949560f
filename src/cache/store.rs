//! Cache Store Module
//!
//! The map of entries plus its statistics. Only the worker ever holds a
//! `Store`, so none of this needs locking.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::cache::entry::Entry;
use crate::cache::stats::StatsCollector;
use crate::cache::{Item, ItemOptions, Stats};

// == Cache Store ==
/// Keyed entries and the counters describing how they were used.
#[derive(Debug)]
pub(crate) struct Store<V> {
    /// Key-value storage
    entries: HashMap<String, Entry<V>>,
    /// Performance statistics
    stats: StatsCollector,
}

impl<V> Store<V> {
    // == Constructor ==
    /// Creates an empty store with zeroed statistics.
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
            stats: StatsCollector::new(),
        }
    }

    // == Save ==
    /// Stores `data` under `key`, replacing any existing entry.
    ///
    /// Returns the replaced item, which is no longer in the store. Hit and
    /// miss counters are left alone.
    pub fn save(
        &mut self,
        key: String,
        data: V,
        options: ItemOptions,
        now: DateTime<Utc>,
    ) -> Option<Item<V>> {
        let previous = self.entries.insert(key, Entry::new(data, options, now));
        self.record_write(previous.is_some());
        previous.map(Entry::into_item)
    }

    // == Update ==
    /// Like [`Store::save`], but first counts a read of the existing entry.
    ///
    /// The returned item carries the hit and access time of that read.
    pub fn update(
        &mut self,
        key: String,
        data: V,
        options: ItemOptions,
        now: DateTime<Utc>,
    ) -> Option<Item<V>> {
        self.touch(&key, now);
        self.save(key, data, options, now)
    }

    // == Delete ==
    /// Removes an entry by key, returning it if it existed.
    pub fn delete(&mut self, key: &str) -> Option<Item<V>> {
        match self.entries.remove(key) {
            Some(entry) => {
                self.stats.record_delete();
                Some(entry.into_item())
            }
            None => {
                self.stats.record_delete_miss();
                None
            }
        }
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> Stats {
        self.stats.snapshot(self.entries.len())
    }

    // == Clear ==
    /// Releases every entry. Statistics are kept.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.entries.shrink_to_fit();
    }

    // == Length ==
    /// Returns the current number of entries in the store.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    // == Is Empty ==
    #[allow(dead_code)]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Counts a read of `key`, returning the entry on a hit.
    fn touch(&mut self, key: &str, now: DateTime<Utc>) -> Option<&Entry<V>> {
        match self.entries.get_mut(key) {
            Some(entry) => {
                self.stats.record_hit();
                entry.touch(now);
                Some(entry)
            }
            None => {
                self.stats.record_miss();
                None
            }
        }
    }

    fn record_write(&mut self, replaced: bool) {
        if replaced {
            self.stats.record_update();
        } else {
            self.stats.record_save();
        }
    }

    /// Adds a prune pass's wall time to the statistics.
    pub(crate) fn record_prune_duration(&mut self, elapsed: std::time::Duration) {
        self.stats.record_prune_duration(elapsed);
    }

    /// Split borrow for the pruner, which walks entries while counting.
    pub(crate) fn parts_mut(&mut self) -> (&mut HashMap<String, Entry<V>>, &mut StatsCollector) {
        (&mut self.entries, &mut self.stats)
    }
}

impl<V: Clone> Store<V> {
    // == Get ==
    /// Retrieves a copy of the item stored under `key`.
    ///
    /// A hit bumps the item's hit counter and access time before copying.
    pub fn get(&mut self, key: &str, now: DateTime<Utc>) -> Option<Item<V>> {
        self.touch(key, now).map(Entry::snapshot)
    }

    // == List ==
    /// Copies every item out of the store without counting any reads.
    pub fn list(&self) -> HashMap<String, Item<V>> {
        self.entries
            .iter()
            .map(|(key, entry)| (key.clone(), entry.snapshot()))
            .collect()
    }
}

impl<V> Default for Store<V> {
    fn default() -> Self {
        Self::new()
    }
}
