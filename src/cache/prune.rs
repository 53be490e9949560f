//! Pruner
//!
//! Evicts idle and expired entries. Runs inside the worker on the prune tick.

use chrono::{DateTime, Utc};

use crate::cache::store::Store;
use crate::config::Config;

// == Prune ==
/// Removes every entry that is due for eviction at `now`.
///
/// An entry is due when any of these hold:
/// - it has been idle longer than `max_unused`, prunable or not
/// - it is prunable and has been idle longer than `prune_after`
/// - its deadline is at or before `now`
///
/// Counts one prune run and one pruned item per eviction. Returns the number
/// of entries removed.
pub(crate) fn prune<V>(store: &mut Store<V>, now: DateTime<Utc>, config: &Config) -> usize {
    let (entries, stats) = store.parts_mut();
    let before = entries.len();

    stats.record_prune_run();
    entries.retain(|_, entry| {
        let idle = entry.idle(now);
        let due = idle > config.max_unused
            || (entry.is_prunable() && idle > config.prune_after)
            || entry.is_expired(now);

        if due {
            stats.record_pruned();
        }
        !due
    });

    before - entries.len()
}
