//! API Module
//!
//! The cache handle callers hold.
//!
//! # Operations
//! - `get` - Read a copy of an item
//! - `save` / `update` - Store an item, with or without counting a read
//! - `delete` - Remove an item
//! - `list` - Copy out every item
//! - `stats` - Snapshot the counters
//! - `start` / `stop` - Lifecycle, optionally discarding items

mod handle;

pub use handle::Cache;
