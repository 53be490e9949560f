//! Message types exchanged between the cache handle and its worker.

pub mod requests;

// Re-export commonly used types
pub use requests::{request_channel, Reply, Request, RequestReceiver, RequestSender};
