//! Re-Reference Interval Prediction (RRIP) Replacement Policy.
//!
//! Every line holds a 3-bit re-reference prediction value (RRPV): 0 means "expected soon",
//! 7 means "expected in the distant future". The victim is the first line predicted
//! distant; if none is, the whole set ages by one step until one is. Hits move a line one
//! step closer, and misses are inserted distant or one step short of it as decided by the
//! dynamic insertion policy.

use super::ReplacementPolicy;
use crate::cache::access::CacheAccess;
use crate::cache::geometry::CacheGeometry;
use crate::cache::mirror::PerLineMetadata;
use crate::common::constants::RRIP_MAX;
use crate::common::{AccessContext, CacheError, NoThresholdSaturatingCounter, Tag};
use crate::config::DipConfig;
use crate::dueling::DynamicInsertionPolicy;

/// RRIP state.
#[derive(Clone, Debug)]
pub struct RereferenceIntervalPredictionPolicy {
    rrpv: PerLineMetadata<NoThresholdSaturatingCounter>,
    insertion: DynamicInsertionPolicy,
}

impl RereferenceIntervalPredictionPolicy {
    /// Creates the policy with every line predicted distant.
    ///
    /// # Returns
    ///
    /// The policy, or the error raised while assigning the insertion policy's leader sets.
    pub fn new(geometry: &CacheGeometry, num_threads: usize, dip: &DipConfig) -> Result<Self, CacheError> {
        Ok(Self {
            rrpv: PerLineMetadata::new(geometry, NoThresholdSaturatingCounter::new(0, RRIP_MAX, RRIP_MAX)),
            insertion: DynamicInsertionPolicy::new(geometry.num_sets(), num_threads, dip)?,
        })
    }

    /// Re-reference prediction value of the line in `(set, way)`.
    #[inline]
    pub fn rrpv(&self, set: usize, way: usize) -> u32 {
        self.rrpv.get(set, way).value()
    }

    /// Dynamic insertion policy.
    #[inline]
    pub const fn insertion_policy(&self) -> &DynamicInsertionPolicy {
        &self.insertion
    }

    // Steps needed before some line in `set` reaches the distant value, and the first line
    // to get there.
    fn aging(&self, set: usize) -> (u32, usize) {
        let mut victim = 0;
        let mut oldest = 0;
        for (way, counter) in self.rrpv.set_entries(set).iter().enumerate() {
            if way == 0 || counter.value() > oldest {
                oldest = counter.value();
                victim = way;
            }
        }
        (RRIP_MAX.saturating_sub(oldest), victim)
    }
}

impl ReplacementPolicy for RereferenceIntervalPredictionPolicy {
    fn name(&self) -> &'static str {
        "rereferenceIntervalPrediction"
    }

    /// Returns the way the age-until-distant loop would stop at. The aging itself is
    /// applied when the fill is committed.
    fn handle_replacement(&self, _context: &AccessContext, set: usize, _tag: Tag) -> usize {
        self.aging(set).1
    }

    fn handle_promotion_on_hit(&mut self, access: &CacheAccess) {
        self.rrpv.get_mut(access.set(), access.way()).decrement();
    }

    fn handle_insertion_on_miss(&mut self, access: &CacheAccess) {
        let set = access.set();
        let (steps, _) = self.aging(set);
        if steps > 0 {
            for counter in self.rrpv.set_entries_mut(set) {
                counter.set_value(counter.value() + steps);
            }
        }

        self.insertion.record_miss(set);
        let normal_fill = self
            .insertion
            .should_do_normal_fill(access.context().thread_id, set);
        let rrpv = if normal_fill { RRIP_MAX } else { RRIP_MAX - 1 };
        self.rrpv.get_mut(set, access.way()).set_value(rrpv);
    }
}
