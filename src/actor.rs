//! Single-owner map driven by message passing.
//!
//! One dedicated thread owns a plain hash map outright. Nobody else ever
//! touches it; callers send typed requests over a bounded queue and the owner
//! handles them strictly one at a time, in arrival order. The queue is the
//! serialization point, so no lock guards the map.
//!
//! ```text
//!  caller threads                         owner thread
//!  ──────────────                         ────────────
//!  put(k, v) ──▶ Put{k, v} ──┐
//!                            ├──▶ [ request queue ] ──▶ loop {
//!  get(k) ────▶ Get{k, tx} ──┘                            match request {
//!     ▲                                                     Put ─▶ map.insert
//!     └──────────── reply channel ◀──────────────────────── Get ─▶ tx.send(map.get)
//!                                                         }
//!                                                       }
//! ```
//!
//! `get` blocks until its reply arrives. `put` returns as soon as the request
//! is queued; it blocks only while the queue is full. A `get` issued by the
//! same thread after a `put` always observes that put, because both travel
//! through the same FIFO queue.
//!
//! Each `get` carries its own reply channel, so concurrent readers can never
//! receive each other's answers.
//!
//! Dropping the map disconnects the queue; the owner drains what is left,
//! exits, and is joined.

use crate::config::ActorMapConfig;
use crate::keyspace::KeySpace;
use crate::map::{ConcurrentIntMap, IntMap, Key, Value};
use crate::metrics::{CoreMapMetrics, EventCounter, MapMetrics};
use crate::HashMap;
use crossbeam_channel::{Receiver, Sender};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

/// Messages understood by the owner thread.
enum Request {
    Get { key: Key, reply: Sender<Option<Value>> },
    Put { key: Key, value: Value },
    Len { reply: Sender<usize> },
}

/// A map owned by one thread and accessed through requests.
///
/// # Panics
///
/// Operations panic if the owner thread is gone, which only happens if it
/// panicked.
///
/// # Example
///
/// ```
/// use conmap::ActorMap;
///
/// let map = ActorMap::new();
/// map.put(1, 2);
/// assert_eq!(map.get(1), Some(2));
/// ```
pub struct ActorMap {
    requests: Option<Sender<Request>>,
    owner: Option<JoinHandle<()>>,
    key_space: KeySpace,
    requests_served: Arc<EventCounter>,
}

impl ActorMap {
    /// Creates a map with the default queue capacity.
    pub fn new() -> Self {
        Self::init(ActorMapConfig::default())
    }

    /// Creates a map from a configuration and starts its owner thread.
    ///
    /// # Panics
    ///
    /// Panics if the owner thread cannot be spawned.
    pub fn init(config: ActorMapConfig) -> Self {
        let (requests, inbox) = crossbeam_channel::bounded(config.queue_capacity);
        let map = HashMap::with_capacity(config.base.capacity);
        let requests_served = Arc::new(EventCounter::new());

        let served = Arc::clone(&requests_served);
        let owner = match thread::Builder::new()
            .name("conmap-actor".to_string())
            .spawn(move || run_owner(map, inbox, served))
        {
            Ok(handle) => handle,
            Err(err) => panic!("failed to spawn actor map owner thread: {err}"),
        };

        tracing::debug!(
            queue_capacity = config.queue_capacity,
            key_space = ?config.base.key_space,
            "creating actor map"
        );
        Self {
            requests: Some(requests),
            owner: Some(owner),
            key_space: config.base.key_space,
            requests_served,
        }
    }

    /// Asks the owner for `key`'s value and waits for the answer.
    pub fn get(&self, key: Key) -> Option<Value> {
        self.key_space.check(key);
        let (reply, answer) = crossbeam_channel::bounded(1);
        self.submit(Request::Get { key, reply });
        match answer.recv() {
            Ok(value) => value,
            Err(_) => panic!("actor map owner thread terminated before replying"),
        }
    }

    /// Queues a store of `value` for `key` and returns without waiting for it
    /// to be applied.
    pub fn put(&self, key: Key, value: Value) {
        self.key_space.check(key);
        self.submit(Request::Put { key, value });
    }

    /// Number of stored keys, as seen by the owner once earlier requests are applied.
    pub fn len(&self) -> usize {
        let (reply, answer) = crossbeam_channel::bounded(1);
        self.submit(Request::Len { reply });
        match answer.recv() {
            Ok(len) => len,
            Err(_) => panic!("actor map owner thread terminated before replying"),
        }
    }

    /// Returns `true` if nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of requests the owner has finished handling.
    pub fn requests_served(&self) -> u64 {
        self.requests_served.get()
    }

    fn submit(&self, request: Request) {
        let delivered = match &self.requests {
            Some(requests) => requests.send(request).is_ok(),
            None => false,
        };
        if !delivered {
            panic!("actor map owner thread is not accepting requests");
        }
    }
}

/// The owner loop: drains the queue until every sender is gone.
fn run_owner(mut map: HashMap<Key, Value>, inbox: Receiver<Request>, served: Arc<EventCounter>) {
    tracing::debug!("actor map owner started");
    for request in inbox.iter() {
        match request {
            Request::Get { key, reply } => {
                // The caller may have given up waiting; nothing to do then.
                let _ = reply.send(map.get(&key).copied());
            }
            Request::Put { key, value } => {
                map.insert(key, value);
            }
            Request::Len { reply } => {
                let _ = reply.send(map.len());
            }
        }
        served.incr();
    }
    tracing::debug!(entries = map.len(), "actor map owner stopped");
}

impl Default for ActorMap {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for ActorMap {
    fn drop(&mut self) {
        // Disconnect the queue so the owner's loop ends, then wait for it.
        self.requests = None;
        if let Some(owner) = self.owner.take() {
            if owner.join().is_err() {
                tracing::warn!("actor map owner thread panicked");
            }
        }
    }
}

impl IntMap for ActorMap {
    fn get(&self, key: Key) -> Option<Value> {
        ActorMap::get(self, key)
    }

    fn put(&mut self, key: Key, value: Value) {
        ActorMap::put(self, key, value);
    }

    fn name(&self) -> &'static str {
        "actor"
    }
}

impl ConcurrentIntMap for ActorMap {
    fn put_shared(&self, key: Key, value: Value) {
        ActorMap::put(self, key, value);
    }
}

impl MapMetrics for ActorMap {
    fn metrics(&self) -> BTreeMap<String, f64> {
        let mut metrics = CoreMapMetrics::new(self.len(), 1).to_btreemap();
        metrics.insert(
            "requests_served".to_string(),
            self.requests_served() as f64,
        );
        metrics
    }

    fn algorithm_name(&self) -> &'static str {
        "Actor"
    }
}

impl core::fmt::Debug for ActorMap {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ActorMap")
            .field("key_space", &self.key_space)
            .field("requests_served", &self.requests_served())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MapConfig;

    #[test]
    fn test_basic_operations() {
        let map = ActorMap::new();
        assert!(map.is_empty());

        map.put(1, 10);
        map.put(2, 20);
        assert_eq!(map.get(1), Some(10));
        assert_eq!(map.get(2), Some(20));
        assert_eq!(map.get(3), None);
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn test_put_then_get_same_thread_is_ordered() {
        let map = ActorMap::new();
        for i in 0..1000 {
            map.put(5, i);
            assert_eq!(map.get(5), Some(i));
        }
    }

    #[test]
    fn test_rendezvous_queue() {
        let map = ActorMap::init(ActorMapConfig::default().with_queue_capacity(0));
        for i in 0..100 {
            map.put(i, i + 1);
        }
        for i in 0..100 {
            assert_eq!(map.get(i), Some(i + 1));
        }
    }

    #[test]
    fn test_concurrent_readers_get_their_own_answers() {
        let map = ActorMap::new();
        for i in 0..1000 {
            map.put(i, i * 7);
        }

        let mut pool = scoped_threadpool::Pool::new(8);
        let map = &map;
        pool.scoped(|scope| {
            for _ in 0..8 {
                scope.execute(move || {
                    for i in 0..1000 {
                        assert_eq!(map.get(i), Some(i * 7));
                    }
                });
            }
        });
    }

    #[test]
    fn test_concurrent_writers_are_all_applied() {
        let map = ActorMap::new();
        std::thread::scope(|s| {
            for t in 0..4u64 {
                let map = &map;
                s.spawn(move || {
                    for i in 0..500 {
                        map.put(t * 500 + i, t);
                    }
                });
            }
        });
        assert_eq!(map.len(), 2000);
        assert_eq!(map.get(1999), Some(3));
    }

    #[test]
    fn test_requests_served_counts_everything() {
        let map = ActorMap::init(ActorMapConfig {
            base: MapConfig::with_capacity(16),
            queue_capacity: 4,
        });
        map.put(1, 1);
        let _ = map.get(1);
        // The reply to `len` is sent before the counter is bumped for it.
        let _ = map.len();
        assert!(map.requests_served() >= 2);
    }

    #[test]
    fn test_drop_joins_owner() {
        let map = ActorMap::new();
        for i in 0..100 {
            map.put(i, i);
        }
        drop(map);
    }

    #[test]
    fn test_metrics() {
        let map = ActorMap::new();
        map.put(1, 1);
        let metrics = map.metrics();
        assert_eq!(metrics.get("entries"), Some(&1.0));
        assert!(metrics.contains_key("requests_served"));
        assert_eq!(IntMap::name(&map), "actor");
    }
}
