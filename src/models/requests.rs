//! Worker request messages
//!
//! Every cache operation travels to the worker as one of these, carrying the
//! channel its single reply goes back on.

use std::collections::HashMap;

use tokio::sync::{mpsc, oneshot};

use crate::cache::{Item, ItemOptions, Stats};

/// Reply channel for a single request.
pub type Reply<T> = oneshot::Sender<T>;

/// Queue the worker drains.
pub type RequestSender<V> = mpsc::Sender<Request<V>>;
pub type RequestReceiver<V> = mpsc::Receiver<Request<V>>;

/// Requests queued before the sender waits for the worker to catch up.
pub const REQUEST_QUEUE_DEPTH: usize = 1024;

/// An operation for the worker to run against its store.
#[derive(Debug)]
pub enum Request<V> {
    /// Read a copy of one item
    Get {
        key: String,
        reply: Reply<Option<Item<V>>>,
    },
    /// Write without counting a read
    Save {
        key: String,
        data: V,
        options: ItemOptions,
        reply: Reply<Option<Item<V>>>,
    },
    /// Count a read, then write
    Update {
        key: String,
        data: V,
        options: ItemOptions,
        reply: Reply<Option<Item<V>>>,
    },
    Delete {
        key: String,
        reply: Reply<Option<Item<V>>>,
    },
    /// Copy out every item
    List {
        reply: Reply<HashMap<String, Item<V>>>,
    },
    Stats {
        reply: Reply<Stats>,
    },
}

impl<V> Request<V> {
    /// Short operation name for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Request::Get { .. } => "get",
            Request::Save { .. } => "save",
            Request::Update { .. } => "update",
            Request::Delete { .. } => "delete",
            Request::List { .. } => "list",
            Request::Stats { .. } => "stats",
        }
    }
}

/// Creates the request queue.
pub fn request_channel<V>() -> (RequestSender<V>, RequestReceiver<V>) {
    mpsc::channel(REQUEST_QUEUE_DEPTH)
}
