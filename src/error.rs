//! Error types for the cache
//!
//! Provides unified error handling using thiserror.

use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for the cache.
///
/// Store operations themselves never fail. Every variant here describes a
/// lifecycle misuse: talking to a worker that is not there.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// The worker is stopped; call `start` before issuing operations
    #[error("Cache is not running")]
    NotRunning,

    /// The worker stopped before it replied to the request
    #[error("Cache worker shut down before replying")]
    Shutdown,

    /// The worker task died and could not hand back its store
    #[error("Internal error: {0}")]
    Internal(String),
}

// == Result Type Alias ==
/// Convenience Result type for the cache.
pub type Result<T> = std::result::Result<T, CacheError>;
