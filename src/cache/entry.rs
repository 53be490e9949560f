//! Cache Entry Module
//!
//! Defines stored entries, the detached items handed to callers, and the
//! per-item eviction options.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;

// == Item ==
/// A value returned from the cache.
///
/// Items handed out by `get` and `list` are copies, and items handed out by
/// `save`/`update`/`delete` were already removed from the store, so callers
/// may keep or mutate them freely.
///
/// Timestamps come from the worker's sampled clock and are only as precise as
/// the configured request accuracy.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Item<V> {
    /// The stored value
    pub data: V,
    /// When the item was saved
    #[serde(rename = "created")]
    pub created_at: DateTime<Utc>,
    /// When the item was last read
    #[serde(rename = "lastAccess")]
    pub last_access: DateTime<Utc>,
    /// Number of successful reads of this item
    pub hits: u64,
}

// == Item Options ==
/// Eviction options supplied when saving an item.
///
/// Both options only take effect while pruning is enabled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ItemOptions {
    /// Allow the pruner to evict this item after `prune_after` of idle time
    pub prune: bool,
    /// Evict this item once this deadline has passed, regardless of use
    pub expire_at: Option<DateTime<Utc>>,
}

impl ItemOptions {
    /// Options for an item the pruner may evict once idle.
    pub fn prunable() -> Self {
        Self {
            prune: true,
            expire_at: None,
        }
    }

    /// Sets an absolute eviction deadline.
    pub fn expiring_at(mut self, deadline: DateTime<Utc>) -> Self {
        self.expire_at = Some(deadline);
        self
    }

    /// Sets an eviction deadline `ttl` from now.
    ///
    /// A `ttl` too large to represent leaves the item without a deadline.
    pub fn expiring_in(mut self, ttl: Duration) -> Self {
        self.expire_at = chrono::Duration::from_std(ttl)
            .ok()
            .and_then(|ttl| Utc::now().checked_add_signed(ttl));
        self
    }
}

// == Entry ==
/// An item as held by the store, together with its private options.
#[derive(Debug)]
pub(crate) struct Entry<V> {
    item: Item<V>,
    options: ItemOptions,
}

impl<V> Entry<V> {
    /// Creates a fresh entry stamped with `now`.
    pub fn new(data: V, options: ItemOptions, now: DateTime<Utc>) -> Self {
        Self {
            item: Item {
                data,
                created_at: now,
                last_access: now,
                hits: 0,
            },
            options,
        }
    }

    /// Records a successful read.
    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.item.hits += 1;
        self.item.last_access = now;
    }

    /// Time since the last read, zero if `now` is behind it.
    pub fn idle(&self, now: DateTime<Utc>) -> Duration {
        (now - self.item.last_access).to_std().unwrap_or_default()
    }

    pub fn is_prunable(&self) -> bool {
        self.options.prune
    }

    /// An entry is expired once `now` reaches its deadline.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.options.expire_at.is_some_and(|deadline| now >= deadline)
    }

    /// Strips the options and hands the item over.
    pub fn into_item(self) -> Item<V> {
        self.item
    }
}

impl<V: Clone> Entry<V> {
    /// Returns a detached copy without options.
    pub fn snapshot(&self) -> Item<V> {
        self.item.clone()
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    fn at(secs: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000 + secs, 0).unwrap()
    }

    #[test]
    fn test_entry_creation() {
        let entry = Entry::new("value", ItemOptions::default(), at(0));
        let item = entry.snapshot();

        assert_eq!(item.data, "value");
        assert_eq!(item.created_at, at(0));
        assert_eq!(item.last_access, at(0));
        assert_eq!(item.hits, 0);
        assert!(!entry.is_prunable());
        assert!(!entry.is_expired(at(1_000_000)));
    }

    #[test]
    fn test_touch_updates_hits_and_last_access() {
        let mut entry = Entry::new(1, ItemOptions::default(), at(0));
        entry.touch(at(5));
        entry.touch(at(9));

        let item = entry.snapshot();
        assert_eq!(item.hits, 2);
        assert_eq!(item.last_access, at(9));
        assert_eq!(item.created_at, at(0));
    }

    #[test]
    fn test_idle_duration() {
        let entry = Entry::new(1, ItemOptions::default(), at(10));
        assert_eq!(entry.idle(at(70)), Duration::from_secs(60));
        // A clock behind the entry reads as no idle time at all
        assert_eq!(entry.idle(at(0)), Duration::ZERO);
    }

    #[test]
    fn test_expiration_boundary_condition() {
        let entry = Entry::new(1, ItemOptions::default().expiring_at(at(30)), at(0));

        assert!(!entry.is_expired(at(29)));
        assert!(entry.is_expired(at(30)), "Entry should be expired at boundary");
        assert!(entry.is_expired(at(31)));
    }

    #[test]
    fn test_snapshot_is_detached() {
        let mut entry = Entry::new(vec![1, 2], ItemOptions::prunable(), at(0));
        let mut copy = entry.snapshot();
        copy.data.push(3);
        copy.hits = 99;

        entry.touch(at(1));
        assert_eq!(entry.snapshot().data, vec![1, 2]);
        assert_eq!(entry.snapshot().hits, 1);
    }

    #[test]
    fn test_expiring_in() {
        let options = ItemOptions::default().expiring_in(Duration::from_secs(60));
        let deadline = options.expire_at.unwrap();
        assert!(deadline > Utc::now());

        let never = ItemOptions::default().expiring_in(Duration::MAX);
        assert!(never.expire_at.is_none());
    }

    #[test]
    fn test_serialize_item_field_names() {
        let mut entry = Entry::new("value", ItemOptions::prunable().expiring_at(at(60)), at(0));
        entry.touch(at(5));

        let json = serde_json::to_value(entry.snapshot()).unwrap();
        let fields = json.as_object().unwrap();
        assert_eq!(fields.len(), 4);
        assert_eq!(json["data"], "value");
        assert_eq!(json["created"], "2023-11-14T22:13:20Z");
        assert_eq!(json["lastAccess"], "2023-11-14T22:13:25Z");
        assert_eq!(json["hits"], 1);
        assert!(!fields.contains_key("created_at"));
        assert!(!fields.contains_key("prune"));
        assert!(!fields.contains_key("expire_at"));
    }

    #[test]
    fn test_into_item_strips_options() {
        let entry = Entry::new("gone", ItemOptions::prunable().expiring_at(at(5)), at(0));
        let item = entry.into_item();
        assert_eq!(item.data, "gone");
    }
}
