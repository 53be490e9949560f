//! Serial Cache - An in-process key/value cache served by one worker task
//!
//! Every operation is a message to a single worker that owns the map, so
//! nothing is locked on the request path and nothing the worker owns is ever
//! shared. Items can be evicted after sitting idle, or at a fixed deadline,
//! by a background prune pass.
//!
//! The request messages and the worker task are internal. [`Cache`] is the
//! only way to reach the store:
//!
//! ```compile_fail
//! use serial_cache::models::Request;
//! ```
//!
//! ```compile_fail
//! use serial_cache::tasks::ShutdownSignal;
//! ```

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub(crate) mod models;
pub(crate) mod tasks;

pub use api::Cache;
pub use cache::{Item, ItemOptions, Stats};
pub use config::{Config, FOREVER};
pub use error::CacheError;
