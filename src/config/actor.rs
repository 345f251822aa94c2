//! Configuration for the actor-owned map.

use super::MapConfig;
use core::fmt;

/// Default number of requests that may wait in the owner's queue.
pub const DEFAULT_QUEUE_CAPACITY: usize = 1024;

/// Configuration for an [`ActorMap`](crate::ActorMap).
///
/// # Fields
///
/// - `base`: Capacity hint for the owner's map and the key space.
/// - `queue_capacity`: Bound of the request queue. Senders block while it is
///   full. `0` turns the queue into a rendezvous channel where every request
///   waits for the owner to pick it up.
#[derive(Clone, Copy)]
pub struct ActorMapConfig {
    /// Capacity hint and key space.
    pub base: MapConfig,
    /// Maximum number of queued requests.
    pub queue_capacity: usize,
}

impl ActorMapConfig {
    /// Sets the request queue bound.
    #[must_use]
    pub fn with_queue_capacity(mut self, queue_capacity: usize) -> Self {
        self.queue_capacity = queue_capacity;
        self
    }
}

impl Default for ActorMapConfig {
    fn default() -> Self {
        Self {
            base: MapConfig::default(),
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
        }
    }
}

impl fmt::Debug for ActorMapConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActorMapConfig")
            .field("base", &self.base)
            .field("queue_capacity", &self.queue_capacity)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_actor_config_default() {
        let config = ActorMapConfig::default();
        assert_eq!(config.queue_capacity, DEFAULT_QUEUE_CAPACITY);
        assert_eq!(config.base.capacity, 0);
    }

    #[test]
    fn test_actor_config_rendezvous() {
        let config = ActorMapConfig::default().with_queue_capacity(0);
        assert_eq!(config.queue_capacity, 0);
    }
}
