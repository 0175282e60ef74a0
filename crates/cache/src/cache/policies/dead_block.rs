//! Dead-Block-Prediction LRU Replacement Policy.
//!
//! LRU recency order, steered by a sampling dead-block predictor. Every reference to the
//! cache is checked against the predictor:
//! 1. **Sampling:** References to every eighth set also train the predictor through the
//!    sampler.
//! 2. **Placement:** A line predicted dead is pushed to the LRU position, otherwise it
//!    moves to MRU.
//! 3. **Victim Choice:** The first way whose last prediction was "dead" is evicted ahead
//!    of the LRU way.

use super::ReplacementPolicy;
use crate::cache::access::CacheAccess;
use crate::cache::geometry::CacheGeometry;
use crate::cache::lru_stack::LruStack;
use crate::cache::mirror::PerLineMetadata;
use crate::common::{AccessContext, Tag};
use crate::predict::dead_block::{DeadBlockPredictionSampler, make_trace};

/// Dead-block-prediction LRU state.
#[derive(Clone, Debug)]
pub struct DeadBlockPredictionLruPolicy {
    stack: LruStack,
    dead: PerLineMetadata<bool>,
    sampler: DeadBlockPredictionSampler,
}

impl DeadBlockPredictionLruPolicy {
    /// Creates the policy with an untrained predictor and no line predicted dead.
    pub fn new(geometry: &CacheGeometry) -> Self {
        Self {
            stack: LruStack::new(geometry.num_sets(), geometry.associativity()),
            dead: PerLineMetadata::new(geometry, false),
            sampler: DeadBlockPredictionSampler::new(geometry.num_sets()),
        }
    }

    /// Last prediction made for the line in `(set, way)`.
    #[inline]
    pub fn is_predicted_dead(&self, set: usize, way: usize) -> bool {
        *self.dead.get(set, way)
    }

    /// Sampler and predictor.
    #[inline]
    pub const fn sampler(&self) -> &DeadBlockPredictionSampler {
        &self.sampler
    }

    /// Recency stacks.
    #[inline]
    pub const fn stack(&self) -> &LruStack {
        &self.stack
    }

    fn handle_reference(&mut self, access: &CacheAccess) {
        let (set, way) = (access.set(), access.way());
        let context = access.context();

        if let Some(sampler_set) = self.sampler.sampler_set(set) {
            self.sampler
                .access(sampler_set, context.thread_id, context.pc, access.tag());
        }

        let dead = self
            .sampler
            .predictor()
            .predict(context.thread_id, make_trace(context.pc));
        if dead {
            self.stack.set_lru(set, way);
        } else {
            self.stack.set_mru(set, way);
        }
        *self.dead.get_mut(set, way) = dead;
    }
}

impl ReplacementPolicy for DeadBlockPredictionLruPolicy {
    fn name(&self) -> &'static str {
        "deadBlockPredictionLru"
    }

    fn handle_replacement(&self, _context: &AccessContext, set: usize, _tag: Tag) -> usize {
        self.dead
            .set_entries(set)
            .iter()
            .position(|&dead| dead)
            .unwrap_or_else(|| self.stack.lru(set))
    }

    fn handle_promotion_on_hit(&mut self, access: &CacheAccess) {
        self.handle_reference(access);
    }

    fn handle_insertion_on_miss(&mut self, access: &CacheAccess) {
        self.handle_reference(access);
    }
}
