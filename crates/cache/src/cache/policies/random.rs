//! Random Replacement Policy.
//!
//! This policy evicts a pseudo-randomly chosen line from the set. The xorshift generator
//! is seeded with a fixed value so runs are reproducible. Selection only peeks at the next
//! draw; the generator advances when the fill is committed, so an aborted access leaves the
//! sequence untouched.

use super::ReplacementPolicy;
use crate::cache::access::CacheAccess;
use crate::cache::geometry::CacheGeometry;
use crate::common::constants::RANDOM_SEED;
use crate::common::{AccessContext, Tag, XorShiftRng};

/// Random Policy state.
#[derive(Clone, Debug)]
pub struct RandomPolicy {
    /// Number of ways in the cache.
    ways: usize,
    /// Internal state for the pseudo-random number generator.
    rng: XorShiftRng,
}

impl RandomPolicy {
    /// Creates a new Random policy seeded with the shared seed.
    pub fn new(geometry: &CacheGeometry) -> Self {
        Self::with_seed(geometry, RANDOM_SEED)
    }

    /// Creates a new Random policy with an explicit seed.
    pub const fn with_seed(geometry: &CacheGeometry, seed: u64) -> Self {
        Self {
            ways: geometry.associativity(),
            rng: XorShiftRng::new(seed),
        }
    }
}

impl ReplacementPolicy for RandomPolicy {
    fn name(&self) -> &'static str {
        "random"
    }

    fn handle_replacement(&self, _context: &AccessContext, _set: usize, _tag: Tag) -> usize {
        self.rng.peek_below(self.ways)
    }

    /// Recency does not affect random replacement.
    fn handle_promotion_on_hit(&mut self, _access: &CacheAccess) {}

    /// Consumes the draw used to pick this fill's way.
    fn handle_insertion_on_miss(&mut self, _access: &CacheAccess) {
        let _ = self.rng.next_below(self.ways);
    }
}
