//! Cache Worker Task
//!
//! The single task that owns the store. It waits on the request queue, the
//! clock refresh ticker, the prune ticker and an optional shutdown signal,
//! and handles exactly one of them at a time.

use std::future::{self, Future};
use std::pin::Pin;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use tokio::task::JoinHandle;
use tokio::time::{self, Interval, MissedTickBehavior};
use tracing::{debug, info, trace, warn};

use crate::cache::{prune, Store};
use crate::config::Config;
use crate::models::{Request, RequestReceiver};

/// A future that ends the worker loop when it completes.
pub type ShutdownSignal = Pin<Box<dyn Future<Output = ()> + Send>>;

/// A shutdown signal that never fires.
pub fn no_shutdown() -> ShutdownSignal {
    Box::pin(future::pending())
}

// == Worker ==
/// Owns the store for as long as the cache is running.
pub(crate) struct Worker<V> {
    store: Store<V>,
    config: Config,
    /// Sampled clock, refreshed on every clock and prune tick
    now: DateTime<Utc>,
}

impl<V> Worker<V>
where
    V: Clone + Send + 'static,
{
    pub fn new(store: Store<V>, config: Config) -> Self {
        Self {
            store,
            config,
            now: Utc::now(),
        }
    }

    // == Spawn ==
    /// Spawns the worker loop on the tokio runtime.
    ///
    /// The task resolves to the store once the request queue closes or
    /// `shutdown` fires, so a later restart can pick up where it left off.
    ///
    /// # Panics
    /// Panics if called outside of a tokio runtime.
    pub fn spawn(self, requests: RequestReceiver<V>, shutdown: ShutdownSignal) -> JoinHandle<Store<V>> {
        tokio::spawn(self.run(requests, shutdown))
    }

    async fn run(mut self, mut requests: RequestReceiver<V>, mut shutdown: ShutdownSignal) -> Store<V> {
        let mut clock = ticker(self.config.request_accuracy);
        let mut pruner = self
            .config
            .pruning_enabled()
            .then(|| ticker(self.config.prune_interval));

        info!(
            items = self.store.len(),
            request_accuracy = ?self.config.request_accuracy,
            prune_interval = ?self.config.prune_interval,
            "Cache worker started"
        );

        loop {
            tokio::select! {
                request = requests.recv() => match request {
                    Some(request) => self.handle(request),
                    None => {
                        info!("Request queue closed, stopping cache worker");
                        break;
                    }
                },
                _ = clock.tick() => {
                    self.now = Utc::now();
                }
                _ = next_tick(&mut pruner) => self.prune(),
                _ = &mut shutdown => {
                    warn!("Shutdown signal received, stopping cache worker");
                    break;
                }
            }
        }

        debug!(items = self.store.len(), "Cache worker stopped");
        self.store
    }

    // == Handle ==
    /// Runs one request against the store and sends its reply.
    ///
    /// A caller that stopped waiting simply loses its reply.
    fn handle(&mut self, request: Request<V>) {
        trace!(kind = request.kind(), "Handling cache request");
        let now = self.now;

        match request {
            Request::Get { key, reply } => {
                let _ = reply.send(self.store.get(&key, now));
            }
            Request::Save {
                key,
                data,
                options,
                reply,
            } => {
                let _ = reply.send(self.store.save(key, data, options, now));
            }
            Request::Update {
                key,
                data,
                options,
                reply,
            } => {
                let _ = reply.send(self.store.update(key, data, options, now));
            }
            Request::Delete { key, reply } => {
                let _ = reply.send(self.store.delete(&key));
            }
            Request::List { reply } => {
                let _ = reply.send(self.store.list());
            }
            Request::Stats { reply } => {
                let _ = reply.send(self.store.stats());
            }
        }
    }

    // == Prune ==
    fn prune(&mut self) {
        self.now = Utc::now();
        let started = Instant::now();

        let pruned = prune(&mut self.store, self.now, &self.config);

        let elapsed = started.elapsed();
        self.store.record_prune_duration(elapsed);

        if pruned > 0 {
            info!(pruned, remaining = self.store.len(), ?elapsed, "Prune pass removed items");
        } else {
            debug!(remaining = self.store.len(), ?elapsed, "Prune pass found nothing to remove");
        }
    }
}

/// Upper bound for a ticker period, well short of `Instant` overflow.
const FAR_FUTURE: Duration = Duration::from_secs(30 * 365 * 24 * 60 * 60);

/// A ticker whose first tick is one full period away.
fn ticker(period: Duration) -> Interval {
    let now = time::Instant::now();
    let start = now.checked_add(period).unwrap_or(now + FAR_FUTURE);
    let mut interval = time::interval_at(start, period.min(FAR_FUTURE));
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    interval
}

/// Waits for the next tick, or forever when there is no ticker.
async fn next_tick(ticker: &mut Option<Interval>) {
    match ticker {
        Some(ticker) => {
            ticker.tick().await;
        }
        None => future::pending().await,
    }
}
