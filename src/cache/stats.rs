//! Cache Statistics Module
//!
//! Tracks cache counters inside the worker and produces detached snapshots.

use std::time::Duration;

use serde::{Serialize, Serializer};

// == Stats Collector ==
/// Running counters, owned and mutated only by the worker.
#[derive(Debug, Clone, Default)]
pub(crate) struct StatsCollector {
    hits: u64,
    misses: u64,
    saves: u64,
    updates: u64,
    deletes: u64,
    del_misses: u64,
    prunes: u64,
    pruned: u64,
    pruning: Duration,
}

impl StatsCollector {
    // == Constructor ==
    /// Creates a collector with every counter at zero.
    pub fn new() -> Self {
        Self::default()
    }

    // == Record Reads ==
    /// Counts a read that found its key.
    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    /// Counts a read that found nothing.
    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    // == Record Writes ==
    /// Counts a write of a new key.
    pub fn record_save(&mut self) {
        self.saves += 1;
    }

    /// Counts a write that replaced an existing item.
    pub fn record_update(&mut self) {
        self.updates += 1;
    }

    // == Record Deletes ==
    /// Counts a delete that removed an item.
    pub fn record_delete(&mut self) {
        self.deletes += 1;
    }

    /// Counts a delete of a missing key.
    pub fn record_delete_miss(&mut self) {
        self.del_misses += 1;
    }

    // == Record Pruning ==
    /// Counts one prune pass, whether or not it evicted anything.
    pub fn record_prune_run(&mut self) {
        self.prunes += 1;
    }

    /// Counts one item evicted by a prune pass.
    pub fn record_pruned(&mut self) {
        self.pruned += 1;
    }

    /// Adds the wall time of a prune pass.
    pub fn record_prune_duration(&mut self, elapsed: Duration) {
        self.pruning += elapsed;
    }

    // == Snapshot ==
    /// Copies the counters out, deriving `gets` and attaching the live size.
    pub fn snapshot(&self, size: usize) -> Stats {
        Stats {
            size,
            gets: self.hits + self.misses,
            hits: self.hits,
            misses: self.misses,
            saves: self.saves,
            updates: self.updates,
            deletes: self.deletes,
            del_misses: self.del_misses,
            pruned: self.pruned,
            prunes: self.prunes,
            pruning: self.pruning,
        }
    }
}

// == Stats ==
/// A point-in-time copy of the cache statistics.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    /// Items in the cache when the snapshot was taken
    pub size: usize,
    /// Gets issued, always `hits + misses`
    pub gets: u64,
    /// Gets for cached keys
    pub hits: u64,
    /// Gets for missing keys
    pub misses: u64,
    /// Saves of a new key
    pub saves: u64,
    /// Saves that replaced an existing key
    pub updates: u64,
    /// Deletes of a cached key
    pub deletes: u64,
    /// Deletes of a missing key
    pub del_misses: u64,
    /// Items removed by the pruner
    pub pruned: u64,
    /// Prune passes run
    pub prunes: u64,
    /// Total time spent pruning
    #[serde(serialize_with = "serialize_duration")]
    pub pruning: Duration,
}

impl Stats {
    // == Hit Rate ==
    /// Calculates the cache hit rate.
    ///
    /// Returns hits / gets, or 0.0 if no gets have been made.
    pub fn hit_rate(&self) -> f64 {
        if self.gets == 0 {
            0.0
        } else {
            self.hits as f64 / self.gets as f64
        }
    }
}

/// Writes a duration as a human string, e.g. `"1.5ms"`.
fn serialize_duration<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(&format_args!("{duration:?}"))
}
