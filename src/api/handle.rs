//! Cache Handle
//!
//! The public face of the cache. Each method builds a request, queues it for
//! the worker and waits for the reply.

use std::collections::HashMap;
use std::future::Future;
use std::mem;
use std::sync::Arc;

use tokio::sync::{oneshot, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use crate::cache::{Item, ItemOptions, Stats, Store};
use crate::config::Config;
use crate::error::{CacheError, Result};
use crate::models::{request_channel, Reply, Request, RequestSender};
use crate::tasks::{no_shutdown, ShutdownSignal, Worker};

/// Running or stopped, guarded by the handle's lock.
enum Lifecycle<V> {
    Running {
        requests: RequestSender<V>,
        worker: JoinHandle<Store<V>>,
    },
    Stopped(Store<V>),
}

// == Cache ==
/// An in-process key/value cache served by a single worker task.
///
/// Cloning the handle is cheap; every clone talks to the same worker.
/// Operations only take a brief read lock to reach the request queue.
/// `start` and `stop` take the write lock, so don't race them against
/// in-flight operations: those calls fail with [`CacheError::NotRunning`]
/// or [`CacheError::Shutdown`].
///
/// # Example
/// ```no_run
/// use serial_cache::{Cache, Config, ItemOptions};
///
/// # async fn demo() -> serial_cache::error::Result<()> {
/// let users = Cache::new(Config::default());
///
/// users.save("admin", "Super Dooper".to_string(), ItemOptions::default()).await?;
/// let admin = users.get("admin").await?;
/// assert_eq!(admin.unwrap().data, "Super Dooper");
///
/// users.stop(true).await?;
/// # Ok(())
/// # }
/// ```
pub struct Cache<V> {
    config: Config,
    state: Arc<RwLock<Lifecycle<V>>>,
}

impl<V> Cache<V>
where
    V: Clone + Send + Sync + 'static,
{
    // == Constructors ==
    /// Creates a cache and starts its worker. No call to `start` is needed.
    ///
    /// Configuration values are clamped to their supported ranges.
    ///
    /// # Panics
    /// Panics if called outside of a tokio runtime.
    pub fn new(config: Config) -> Self {
        Self::with_shutdown(config, no_shutdown())
    }

    /// Creates a cache whose worker stops when `signal` completes.
    ///
    /// A fired signal stops the worker like [`Cache::stop`] without `clean`;
    /// items survive and a later `start` resumes with them.
    ///
    /// # Panics
    /// Panics if called outside of a tokio runtime.
    pub fn with_shutdown<F>(config: Config, signal: F) -> Self
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let config = config.normalized();
        let state = spawn_worker(Store::new(), &config, Box::pin(signal));

        Self {
            config,
            state: Arc::new(RwLock::new(state)),
        }
    }

    /// Returns the clamped configuration in use.
    pub fn config(&self) -> &Config {
        &self.config
    }

    // == Lifecycle ==
    /// Starts the worker again after a `stop`.
    ///
    /// Does nothing if the worker is already running. With `clean`, the
    /// stored items are discarded first; statistics are kept either way.
    pub async fn start(&self, clean: bool) -> Result<()> {
        self.start_with_shutdown(clean, std::future::pending()).await
    }

    /// Like [`Cache::start`], but the worker stops when `signal` completes.
    pub async fn start_with_shutdown<F>(&self, clean: bool, signal: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let mut state = self.state.write().await;

        if let Lifecycle::Running { worker, .. } = &*state {
            if !worker.is_finished() {
                debug!("Cache worker already running");
                return Ok(());
            }
        }

        let (mut store, outcome) = take_store(&mut *state).await;
        if clean {
            store.clear();
            debug!("Cache items discarded before start");
        }

        *state = spawn_worker(store, &self.config, Box::pin(signal));
        outcome
    }

    /// Stops the worker once it has answered every queued request.
    ///
    /// With `clean`, the stored items are released; statistics are kept.
    /// Operations issued while stopped fail with [`CacheError::NotRunning`].
    pub async fn stop(&self, clean: bool) -> Result<()> {
        let mut state = self.state.write().await;

        let (mut store, outcome) = take_store(&mut *state).await;
        if clean {
            store.clear();
            debug!("Cache items discarded on stop");
        }

        info!(items = store.len(), "Cache stopped");
        *state = Lifecycle::Stopped(store);
        outcome
    }

    /// Returns true while the worker is accepting requests.
    pub async fn is_running(&self) -> bool {
        match &*self.state.read().await {
            Lifecycle::Running { worker, .. } => !worker.is_finished(),
            Lifecycle::Stopped(_) => false,
        }
    }

    // == Operations ==
    /// Returns a copy of the item stored under `key`, if any.
    ///
    /// Counts as a hit or a miss, and a hit refreshes the item's idle time.
    pub async fn get(&self, key: impl Into<String>) -> Result<Option<Item<V>>> {
        let key = key.into();
        self.request(|reply| Request::Get { key, reply }).await
    }

    /// Saves `data` under `key`. Returns true if an item was replaced.
    ///
    /// Does not count as a hit or miss; see [`Cache::update`] for that.
    pub async fn save(&self, key: impl Into<String>, data: V, options: ItemOptions) -> Result<bool> {
        let key = key.into();
        let previous = self
            .request(|reply| Request::Save {
                key,
                data,
                options,
                reply,
            })
            .await?;

        Ok(previous.is_some())
    }

    /// Saves `data` under `key` as a read-modify-write.
    ///
    /// The existing item is read first (a hit or miss), then replaced. Returns
    /// the replaced item.
    pub async fn update(
        &self,
        key: impl Into<String>,
        data: V,
        options: ItemOptions,
    ) -> Result<Option<Item<V>>> {
        let key = key.into();
        self.request(|reply| Request::Update {
            key,
            data,
            options,
            reply,
        })
        .await
    }

    /// Removes `key`. Returns true if it existed.
    pub async fn delete(&self, key: impl Into<String>) -> Result<bool> {
        let key = key.into();
        let removed = self.request(|reply| Request::Delete { key, reply }).await?;
        Ok(removed.is_some())
    }

    /// Returns a copy of every cached item.
    ///
    /// Listing is not a read: hit counts and idle times are untouched. The
    /// copy holds a clone of every value, so use it sparingly on big caches.
    pub async fn list(&self) -> Result<HashMap<String, Item<V>>> {
        self.request(|reply| Request::List { reply }).await
    }

    /// Returns a snapshot of the cache statistics.
    pub async fn stats(&self) -> Result<Stats> {
        self.request(|reply| Request::Stats { reply }).await
    }

    /// Queues one request and waits for its reply.
    async fn request<T>(&self, build: impl FnOnce(Reply<T>) -> Request<V>) -> Result<T> {
        let requests = match &*self.state.read().await {
            Lifecycle::Running { requests, .. } => requests.clone(),
            Lifecycle::Stopped(_) => return Err(CacheError::NotRunning),
        };

        let (reply, response) = oneshot::channel();
        requests
            .send(build(reply))
            .await
            .map_err(|_| CacheError::NotRunning)?;
        drop(requests);

        response.await.map_err(|_| CacheError::Shutdown)
    }
}

impl<V> Clone for Cache<V> {
    fn clone(&self) -> Self {
        Self {
            config: self.config.clone(),
            state: Arc::clone(&self.state),
        }
    }
}

fn spawn_worker<V>(store: Store<V>, config: &Config, signal: ShutdownSignal) -> Lifecycle<V>
where
    V: Clone + Send + 'static,
{
    let (requests, receiver) = request_channel();
    let worker = Worker::new(store, config.clone()).spawn(receiver, signal);

    Lifecycle::Running { requests, worker }
}

/// Takes the store out of `state`, waiting for a running worker to finish.
///
/// Dropping the request sender closes the queue; the worker drains it and
/// hands the store back. A worker that died leaves an empty store and an
/// error for the caller.
async fn take_store<V>(state: &mut Lifecycle<V>) -> (Store<V>, Result<()>) {
    match mem::replace(state, Lifecycle::Stopped(Store::new())) {
        Lifecycle::Stopped(store) => (store, Ok(())),
        Lifecycle::Running { requests, worker } => {
            drop(requests);

            match worker.await {
                Ok(store) => (store, Ok(())),
                Err(err) => {
                    error!(error = %err, "Cache worker failed, its items are lost");
                    (Store::new(), Err(CacheError::Internal(err.to_string())))
                }
            }
        }
    }
}
