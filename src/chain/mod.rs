//! Lock-free chained hash table.
//!
//! A fixed table of bucket heads. Each bucket holds a singly linked chain of
//! immutable nodes; the bucket index is `key & mask` where the table size is
//! a power of two and `mask = size - 1`.
//!
//! ```text
//!  buckets (size = 2^n)
//!  ┌─────┐
//!  │  0  │──▶ [k=8 v] ──▶ [k=0 v] ──▶ ∅
//!  ├─────┤
//!  │  1  │──▶ ∅
//!  ├─────┤
//!  │  2  │──▶ [k=2 v] ──▶ ∅
//!  ├─────┤
//!  │ ... │
//!  └─────┘
//! ```
//!
//! # Operations
//!
//! - `get` pins an epoch, loads the head with acquire ordering and walks the
//!   chain once. It never blocks and never retries.
//! - `put` of a new key links a fresh node in front of the loaded head and
//!   CASes it in.
//! - `put` of an existing key never writes into a published node. It copies
//!   the nodes in front of the match, adds a replacement node that points at
//!   the unchanged rest of the chain, and CASes the copied head in:
//!
//! ```text
//!  before:  head ──▶ A ──▶ B ──▶ [K old] ──▶ C ──▶ ∅
//!  built:   A' ──▶ B' ──▶ [K new] ──┐
//!                                   ▼
//!                                   C ──▶ ∅      (shared suffix)
//!  CAS head: A ──▶ A'   then retire A, B, [K old]
//! ```
//!
//! A failed CAS means another writer published first. The attempt is thrown
//! away and the loop restarts from a fresh head; a successful CAS returns
//! immediately.
//!
//! Superseded nodes are retired through `crossbeam-epoch` and freed once no
//! pinned reader can still see them.

mod bucket;

use self::bucket::{free_unpublished, Bucket, Node};
use crate::config::ChainMapConfig;
use crate::error::ConfigError;
use crate::keyspace::KeySpace;
use crate::map::{ConcurrentIntMap, IntMap, Key, Value};
use crate::metrics::{CoreMapMetrics, EventCounter, MapMetrics};
use crossbeam_epoch::{self as epoch, Atomic, Owned, Shared};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};

/// A fixed-size chained hash table updated only through CAS on bucket heads.
///
/// # Example
///
/// ```
/// use conmap::config::ChainMapConfig;
/// use conmap::LockFreeChainMap;
///
/// let map = LockFreeChainMap::init(ChainMapConfig::new(256_000));
/// assert_eq!(map.bucket_count(), 262_144);
/// assert_eq!(map.mask(), 262_143);
///
/// map.put(7, 49);
/// map.put(7, 50);
/// assert_eq!(map.get(7), Some(50));
/// ```
pub struct LockFreeChainMap {
    buckets: Box<[Bucket]>,
    mask: usize,
    key_space: KeySpace,
    len: AtomicUsize,
    cas_failures: EventCounter,
}

impl LockFreeChainMap {
    /// Creates a table of 1 048 576 buckets.
    pub fn new() -> Self {
        Self::init(ChainMapConfig::default())
    }

    /// Creates a table from a configuration.
    ///
    /// # Panics
    ///
    /// Panics if the configuration is invalid. Use [`try_init`](Self::try_init)
    /// to handle that case.
    pub fn init(config: ChainMapConfig) -> Self {
        match Self::try_init(config) {
            Ok(map) => map,
            Err(err) => panic!("invalid chain map configuration: {err}"),
        }
    }

    /// Creates a table from a configuration, rejecting invalid ones.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ZeroBuckets`] or [`ConfigError::BucketOverflow`]
    /// if the bucket count is unusable.
    pub fn try_init(config: ChainMapConfig) -> Result<Self, ConfigError> {
        let size = config.table_size()?;
        let buckets: Vec<Bucket> = (0..size).map(|_| Bucket::new()).collect();

        tracing::debug!(
            requested = config.buckets,
            buckets = size,
            key_space = ?config.key_space,
            "creating lock-free chain map"
        );
        Ok(Self {
            buckets: buckets.into_boxed_slice(),
            mask: size - 1,
            key_space: config.key_space,
            len: AtomicUsize::new(0),
            cas_failures: EventCounter::new(),
        })
    }

    /// Number of buckets (a power of two).
    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    /// `bucket_count() - 1`.
    pub fn mask(&self) -> usize {
        self.mask
    }

    /// Returns the bucket index for `key`.
    #[inline]
    pub fn bucket_of(&self, key: Key) -> usize {
        // The result is at most `mask`, which is a usize.
        (key & self.mask as u64) as usize
    }

    /// Returns the value stored for `key`.
    ///
    /// Wait-free: one traversal of one chain.
    #[inline]
    pub fn get(&self, key: Key) -> Option<Value> {
        self.key_space.check(key);
        let guard = &epoch::pin();
        self.buckets[self.bucket_of(key)]
            .find(key, guard)
            .map(|node| node.value)
    }

    /// Stores `value` for `key`, retrying until its CAS wins.
    pub fn put(&self, key: Key, value: Value) {
        self.key_space.check(key);
        let bucket = &self.buckets[self.bucket_of(key)];
        let guard = &epoch::pin();

        let mut prefix: Vec<Shared<'_, Node>> = Vec::new();
        loop {
            prefix.clear();
            let head = bucket.load(guard);

            let mut cursor = head;
            let mut found = None;
            // SAFETY: the guard keeps every node reachable from `head` alive.
            while let Some(node) = unsafe { cursor.as_ref() } {
                if node.key == key {
                    found = Some((cursor, node));
                    break;
                }
                prefix.push(cursor);
                cursor = node.next(guard);
            }

            let Some((existing, existing_node)) = found else {
                let node = Owned::new(Node {
                    key,
                    value,
                    next: Atomic::from(head),
                });
                // A failed CAS hands the unpublished node back and it is dropped here.
                match bucket.compare_and_swap(head, node, guard) {
                    Ok(_) => {
                        self.len.fetch_add(1, Ordering::Relaxed);
                        return;
                    }
                    Err(_) => {
                        self.cas_failures.incr();
                        continue;
                    }
                }
            };

            if existing_node.value == value {
                return;
            }

            let mut new_head = Owned::new(Node {
                key,
                value,
                next: Atomic::from(existing_node.next(guard)),
            })
            .into_shared(guard);
            for &node in prefix.iter().rev() {
                // SAFETY: prefix nodes were reached under `guard`.
                let original = unsafe { node.deref() };
                new_head = Owned::new(Node {
                    key: original.key,
                    value: original.value,
                    next: Atomic::from(new_head),
                })
                .into_shared(guard);
            }

            match bucket.compare_and_swap(head, new_head, guard) {
                Ok(_) => {
                    // SAFETY: the CAS unlinked the prefix and the replaced node
                    // from the only path that reaches them. Readers pinned
                    // earlier may still hold them, which the epoch defers for.
                    unsafe {
                        for &node in prefix.iter() {
                            guard.defer_destroy(node);
                        }
                        guard.defer_destroy(existing);
                    }
                    return;
                }
                Err(_) => {
                    self.cas_failures.incr();
                    // SAFETY: the copies plus the replacement were allocated
                    // above and never published.
                    unsafe { free_unpublished(new_head, prefix.len() + 1, guard) };
                }
            }
        }
    }

    /// Number of distinct keys stored.
    pub fn len(&self) -> usize {
        self.len.load(Ordering::Relaxed)
    }

    /// Returns `true` if nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of CAS attempts that lost to another writer.
    pub fn cas_failures(&self) -> u64 {
        self.cas_failures.get()
    }

    /// Length of the longest chain right now.
    pub fn max_chain_len(&self) -> usize {
        let guard = &epoch::pin();
        self.buckets
            .iter()
            .map(|bucket| bucket.chain_len(guard))
            .max()
            .unwrap_or(0)
    }
}

impl Default for LockFreeChainMap {
    fn default() -> Self {
        Self::new()
    }
}

impl IntMap for LockFreeChainMap {
    fn get(&self, key: Key) -> Option<Value> {
        LockFreeChainMap::get(self, key)
    }

    fn put(&mut self, key: Key, value: Value) {
        LockFreeChainMap::put(self, key, value);
    }

    fn name(&self) -> &'static str {
        "chain"
    }
}

impl ConcurrentIntMap for LockFreeChainMap {
    fn put_shared(&self, key: Key, value: Value) {
        LockFreeChainMap::put(self, key, value);
    }
}

impl MapMetrics for LockFreeChainMap {
    fn metrics(&self) -> BTreeMap<String, f64> {
        let guard = &epoch::pin();
        let mut max_chain_len = 0;
        let mut nonempty_buckets = 0usize;
        for bucket in self.buckets.iter() {
            let len = bucket.chain_len(guard);
            if len > 0 {
                nonempty_buckets += 1;
            }
            max_chain_len = max_chain_len.max(len);
        }

        let mut metrics = CoreMapMetrics::new(self.len(), self.buckets.len()).to_btreemap();
        metrics.insert("buckets".to_string(), self.buckets.len() as f64);
        metrics.insert("mask".to_string(), self.mask as f64);
        metrics.insert("cas_failures".to_string(), self.cas_failures() as f64);
        metrics.insert("max_chain_len".to_string(), max_chain_len as f64);
        metrics.insert("nonempty_buckets".to_string(), nonempty_buckets as f64);
        metrics
    }

    fn algorithm_name(&self) -> &'static str {
        "LockFreeChain"
    }
}

impl core::fmt::Debug for LockFreeChainMap {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("LockFreeChainMap")
            .field("buckets", &self.buckets.len())
            .field("len", &self.len())
            .field("cas_failures", &self.cas_failures())
            .finish()
    }
}
