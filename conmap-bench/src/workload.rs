//! Key and value generation for the timed loops.
//!
//! Uses Marsaglia's "xor" generator (Xorshift RNGs, p. 4). It is cheap
//! enough that the loop measures the map rather than the generator, and
//! each worker gets its own state so threads never share a cache line.

use conmap::{Key, Value};

/// Keys are drawn from `0..=KEY_MASK`, the range populated before timing.
pub const KEY_MASK: Key = (1 << 20) - 1;

/// Per-thread pseudo-random stream.
#[derive(Debug, Clone)]
pub struct XorShift {
    state: u64,
}

impl XorShift {
    /// Starts a stream from `seed`. A zero seed is replaced, since zero is a
    /// fixed point of the generator.
    pub fn new(seed: u64) -> Self {
        Self {
            state: if seed == 0 { 0x9E37_79B9 } else { seed },
        }
    }

    /// Starts a stream from a random seed.
    pub fn from_entropy() -> Self {
        Self::new(rand::random::<u64>())
    }

    /// Advances the generator and returns a non-negative 31-bit value.
    #[inline]
    pub fn next_value(&mut self) -> Value {
        let mut r = self.state;
        r ^= r << 13;
        r ^= r >> 17;
        r ^= r << 5;
        self.state = r;
        r & 0x7fff_ffff
    }

    /// Next value masked into the populated key range.
    #[inline]
    pub fn next_key(&mut self) -> Key {
        self.next_value() & KEY_MASK
    }
}
