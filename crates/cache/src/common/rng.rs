//! Seeded pseudo-random numbers.
//!
//! Random replacement, set-dueling leader assignment and bimodal insertion all draw from a
//! xorshift generator. Seeding it with a fixed value makes every run with the same access
//! stream produce the same decisions.

use super::constants::RANDOM_SEED;

/// Xorshift64 generator.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct XorShiftRng {
    state: u64,
}

impl XorShiftRng {
    /// Creates a generator from `seed`. A zero seed would lock xorshift at zero and is
    /// replaced by [`RANDOM_SEED`].
    pub const fn new(seed: u64) -> Self {
        Self {
            state: if seed == 0 { RANDOM_SEED } else { seed },
        }
    }

    #[inline]
    const fn step(mut x: u64) -> u64 {
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        x
    }

    /// Advances the generator and returns the new state.
    #[inline]
    pub const fn next_u64(&mut self) -> u64 {
        self.state = Self::step(self.state);
        self.state
    }

    /// Uniform draw in `[0, bound)`. Returns 0 when `bound` is 0.
    #[inline]
    pub const fn next_below(&mut self, bound: usize) -> usize {
        let x = self.next_u64();
        if bound == 0 { 0 } else { (x % bound as u64) as usize }
    }

    /// The value `next_below(bound)` would return, without advancing.
    #[inline]
    pub const fn peek_below(&self, bound: usize) -> usize {
        if bound == 0 {
            0
        } else {
            (Self::step(self.state) % bound as u64) as usize
        }
    }
}

impl Default for XorShiftRng {
    fn default() -> Self {
        Self::new(RANDOM_SEED)
    }
}
