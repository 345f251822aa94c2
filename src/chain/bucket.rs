//! Chain nodes and the atomic bucket-head cell.
//!
//! Nodes are immutable once published: a node's key, value and `next` link
//! never change after a successful CAS makes it reachable. Every change to a
//! chain therefore goes through its bucket head, which is the only location
//! writers CAS.

use crate::map::{Key, Value};
use crossbeam_epoch::{self as epoch, Atomic, CompareExchangeError, Guard, Pointer, Shared};
use std::sync::atomic::Ordering;

pub(super) struct Node {
    pub(super) key: Key,
    pub(super) value: Value,
    pub(super) next: Atomic<Node>,
}

impl Node {
    /// Loads the successor. Pairs with the release CAS that published it.
    #[inline]
    pub(super) fn next<'g>(&self, guard: &'g Guard) -> Shared<'g, Node> {
        self.next.load(Ordering::Acquire, guard)
    }
}

/// Head of one chain.
pub(super) struct Bucket {
    head: Atomic<Node>,
}

impl Bucket {
    pub(super) fn new() -> Self {
        Self {
            head: Atomic::null(),
        }
    }

    /// Loads the head with acquire ordering, so every node reachable from it
    /// is fully initialized.
    #[inline]
    pub(super) fn load<'g>(&self, guard: &'g Guard) -> Shared<'g, Node> {
        self.head.load(Ordering::Acquire, guard)
    }

    /// Replaces the head with `new` if it is still `current`.
    ///
    /// Release on success publishes `new` and everything it links to. On
    /// failure the caller gets `new` back inside the error.
    #[inline]
    pub(super) fn compare_and_swap<'g, P>(
        &self,
        current: Shared<'_, Node>,
        new: P,
        guard: &'g Guard,
    ) -> Result<Shared<'g, Node>, CompareExchangeError<'g, Node, P>>
    where
        P: Pointer<Node>,
    {
        self.head
            .compare_exchange(current, new, Ordering::Release, Ordering::Relaxed, guard)
    }

    /// Walks the chain from the current head and returns the first node
    /// holding `key`.
    #[inline]
    pub(super) fn find<'g>(&self, key: Key, guard: &'g Guard) -> Option<&'g Node> {
        let mut cursor = self.load(guard);
        // SAFETY: `guard` is pinned, so nodes reachable from the head are not
        // reclaimed while it lives.
        while let Some(node) = unsafe { cursor.as_ref() } {
            if node.key == key {
                return Some(node);
            }
            cursor = node.next(guard);
        }
        None
    }

    /// Number of nodes currently reachable from the head.
    pub(super) fn chain_len(&self, guard: &Guard) -> usize {
        let mut len = 0;
        let mut cursor = self.load(guard);
        // SAFETY: as in `find`.
        while let Some(node) = unsafe { cursor.as_ref() } {
            len += 1;
            cursor = node.next(guard);
        }
        len
    }
}

impl Drop for Bucket {
    fn drop(&mut self) {
        // SAFETY: `&mut self` means no thread can still reach this chain.
        // Retired nodes were unlinked before retirement, so each reachable
        // node is freed exactly once here.
        unsafe {
            let guard = epoch::unprotected();
            let mut cursor = self.head.load(Ordering::Relaxed, guard);
            while !cursor.is_null() {
                let node = cursor.into_owned();
                cursor = node.next.load(Ordering::Relaxed, guard);
            }
        }
    }
}

/// Frees the first `count` nodes of a chain that was built but never
/// published.
///
/// # Safety
///
/// The first `count` nodes starting at `head` must be exclusively owned by
/// the caller: allocated by it and never made reachable from a bucket.
pub(super) unsafe fn free_unpublished(head: Shared<'_, Node>, count: usize, guard: &Guard) {
    let mut cursor = head;
    for _ in 0..count {
        let node = unsafe { cursor.into_owned() };
        cursor = node.next.load(Ordering::Relaxed, guard);
    }
}
