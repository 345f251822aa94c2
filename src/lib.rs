#![doc = include_str!("../README.md")]
//!
//! ---
//!
//! # Code Reference
//!
//! ## Variant Selection Guide
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────────┐
//! │                      Which Map Variant Should I Use?                        │
//! ├─────────────────────────────────────────────────────────────────────────────┤
//! │                                                                             │
//! │  Single thread only?  ──Yes──▶ UnsharedMap                                  │
//! │        │                                                                    │
//! │       No                                                                    │
//! │        ▼                                                                    │
//! │  Reads vastly outnumber writes, shards small?  ──Yes──▶ CopyOnWriteSharded  │
//! │        │                                                                    │
//! │       No                                                                    │
//! │        ▼                                                                    │
//! │  Want no locks at all, table size known?  ──Yes──▶ LockFreeChainMap         │
//! │        │                                                                    │
//! │       No                                                                    │
//! │        ▼                                                                    │
//! │  ShardedLockMap (or NativeConcurrentMap for the ecosystem baseline)         │
//! │                                                                             │
//! └─────────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! GlobalLockMap and ActorMap are reference points: the simplest correct
//! shared map, and the message-passing alternative to locking.
//!
//! ## Quick Reference
//!
//! | Variant | Reads | Writes | Blocking |
//! |---------|-------|--------|----------|
//! | [`UnsharedMap`] | shared `&self` | `&mut self` only | never |
//! | [`GlobalLockMap`] | one read lock | one write lock | get and put |
//! | [`ShardedLockMap`] | shard read lock | shard write lock | get and put, per shard |
//! | [`CopyOnWriteShardedMap`] | lock-free snapshot | copy + swap under shard lock | put only |
//! | [`NativeConcurrentMap`] | `DashMap` | `DashMap` | internal |
//! | [`ActorMap`] | request + reply | fire-and-forget request | get waits for reply |
//! | [`LockFreeChainMap`] | wait-free walk | CAS retry loop | never |
//!
//! ## Shared Contract
//!
//! ```
//! use conmap::{ConcurrentIntMap, IntMap, LockFreeChainMap, ShardedLockMap};
//!
//! fn fill(map: &dyn ConcurrentIntMap) {
//!     for i in 0..100 {
//!         map.put_shared(i, i * 2);
//!     }
//! }
//!
//! let sharded = ShardedLockMap::new();
//! let chain = LockFreeChainMap::new();
//! fill(&sharded);
//! fill(&chain);
//! assert_eq!(IntMap::get(&sharded, 21), Some(42));
//! assert_eq!(chain.get_or_absent(1_000), 0);
//! ```

#[cfg(test)]
extern crate scoped_threadpool;

#[cfg(feature = "hashbrown")]
pub(crate) use hashbrown::HashMap;

#[cfg(not(feature = "hashbrown"))]
pub(crate) use std::collections::HashMap;

/// The `Get`/`Put` contract shared by every variant.
pub mod map;

/// Key acceptance policy.
pub mod keyspace;

/// Configuration errors.
pub mod error;

/// Map configuration structures.
///
/// Provides configuration structures for every map family.
pub mod config;

/// Map metrics system.
///
/// Structural metrics reported through a common interface.
pub mod metrics;

/// Plain hash map for single-threaded use.
pub mod unshared;

/// One hash map behind one reader/writer lock.
pub mod global_lock;

/// Hash maps split into independently locked shards.
pub mod sharded;

/// Sharded maps publishing immutable snapshots.
pub mod cow;

/// Wrapper over `dashmap`.
pub mod native;

/// Map owned by a dedicated thread and driven by messages.
pub mod actor;

/// Fixed-size chained table updated by CAS on bucket heads.
///
/// Nodes are reclaimed with epoch-based reclamation.
pub mod chain;

pub use map::{ConcurrentIntMap, IntMap, Key, Value, ABSENT};

pub use error::ConfigError;
pub use keyspace::KeySpace;
pub use metrics::MapMetrics;

pub use actor::ActorMap;
pub use chain::LockFreeChainMap;
pub use cow::{CopyOnWriteShardedMap, Snapshot};
pub use global_lock::GlobalLockMap;
pub use native::NativeConcurrentMap;
pub use sharded::ShardedLockMap;
pub use unshared::UnsharedMap;
