//! Least Recently Used (LRU) Replacement Policy.
//!
//! This policy evicts the cache line that has not been accessed for the longest time.
//! It keeps one recency stack per set. Hits and fills move the line to the top (MRU
//! position); the bottom of the stack is the victim.
//!
//! # Performance
//!
//! - **Time Complexity:**
//!   - `handle_promotion_on_hit()` / `handle_insertion_on_miss()`: O(W)
//!   - `handle_replacement()`: O(1)
//! - **Space Complexity:** O(S × W) where S is the number of sets
//! - **Best Case:** Working sets that fit, accesses with good temporal locality
//! - **Worst Case:** Scanning patterns larger than cache capacity (thrashing)

use super::ReplacementPolicy;
use crate::cache::access::CacheAccess;
use crate::cache::geometry::CacheGeometry;
use crate::cache::lru_stack::LruStack;
use crate::common::{AccessContext, Tag};

/// LRU Policy state.
#[derive(Clone, Debug)]
pub struct LruPolicy {
    stack: LruStack,
}

impl LruPolicy {
    /// Creates a new LRU policy for a cache of shape `geometry`.
    pub fn new(geometry: &CacheGeometry) -> Self {
        Self {
            stack: LruStack::new(geometry.num_sets(), geometry.associativity()),
        }
    }

    /// Recency stacks, for inspection.
    #[inline]
    pub const fn stack(&self) -> &LruStack {
        &self.stack
    }
}

impl ReplacementPolicy for LruPolicy {
    fn name(&self) -> &'static str {
        "lru"
    }

    /// Returns the way at the bottom of the recency stack.
    fn handle_replacement(&self, _context: &AccessContext, set: usize, _tag: Tag) -> usize {
        self.stack.lru(set)
    }

    fn handle_promotion_on_hit(&mut self, access: &CacheAccess) {
        self.stack.set_mru(access.set(), access.way());
    }

    fn handle_insertion_on_miss(&mut self, access: &CacheAccess) {
        self.stack.set_mru(access.set(), access.way());
    }
}
