//! Cache Module
//!
//! The data the worker owns: entries, statistics and the pruner.

mod entry;
mod prune;
mod stats;
mod store;


// Re-export public types
pub use entry::{Item, ItemOptions};
pub use stats::Stats;

pub(crate) use prune::prune;
pub(crate) use store::Store;
