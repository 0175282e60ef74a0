//! Helper-Thread-Aware LRU Replacement Policy.
//!
//! LRU that knows which lines were brought in by helper threads. A helper-thread prefetch
//! is usually consumed once by the main thread and never touched again, so a main-thread
//! load hitting such a line demotes it to LRU instead of promoting it. Main-thread load
//! misses are inserted at LRU to keep them from thrashing the prefetched lines, while
//! helper-thread load misses go to MRU so they survive until the main thread arrives.

use super::ReplacementPolicy;
use crate::cache::access::CacheAccess;
use crate::cache::geometry::CacheGeometry;
use crate::cache::lru_stack::LruStack;
use crate::cache::mirror::PerLineMetadata;
use crate::common::{AccessContext, Tag};

/// Helper-thread-aware LRU state.
#[derive(Clone, Debug)]
pub struct HelperThreadAwareLruPolicy {
    stack: LruStack,
    helper_line: PerLineMetadata<bool>,
}

impl HelperThreadAwareLruPolicy {
    /// Creates the policy with no helper-thread lines.
    pub fn new(geometry: &CacheGeometry) -> Self {
        Self {
            stack: LruStack::new(geometry.num_sets(), geometry.associativity()),
            helper_line: PerLineMetadata::new(geometry, false),
        }
    }

    /// True if the line in `(set, way)` was filled by a helper thread.
    #[inline]
    pub fn is_helper_line(&self, set: usize, way: usize) -> bool {
        *self.helper_line.get(set, way)
    }

    /// Recency stacks.
    #[inline]
    pub const fn stack(&self) -> &LruStack {
        &self.stack
    }
}

impl ReplacementPolicy for HelperThreadAwareLruPolicy {
    fn name(&self) -> &'static str {
        "helperThreadAwareLru"
    }

    fn handle_replacement(&self, _context: &AccessContext, set: usize, _tag: Tag) -> usize {
        self.stack.lru(set)
    }

    fn handle_promotion_on_hit(&mut self, access: &CacheAccess) {
        let (set, way) = (access.set(), access.way());
        let context = access.context();
        if context.is_load() && !context.helper_thread && self.is_helper_line(set, way) {
            self.stack.set_lru(set, way);
        } else {
            self.stack.set_mru(set, way);
        }
    }

    fn handle_insertion_on_miss(&mut self, access: &CacheAccess) {
        let (set, way) = (access.set(), access.way());
        let context = access.context();
        if context.is_load() && !context.helper_thread {
            self.stack.set_lru(set, way);
        } else {
            self.stack.set_mru(set, way);
        }
        *self.helper_line.get_mut(set, way) = context.helper_thread;
    }
}
