//! Least Frequently Used (LFU) Replacement Policy.
//!
//! Each line carries a reference counter in the policy's per-line arena. A fill resets it
//! to zero and every hit adds one; the victim is the way with the smallest count.

use super::ReplacementPolicy;
use crate::cache::access::CacheAccess;
use crate::cache::geometry::CacheGeometry;
use crate::cache::mirror::PerLineMetadata;
use crate::common::{AccessContext, Tag};

/// LFU Policy state.
#[derive(Clone, Debug)]
pub struct LfuPolicy {
    frequencies: PerLineMetadata<u64>,
}

impl LfuPolicy {
    /// Creates a new LFU policy with all counters at zero.
    pub fn new(geometry: &CacheGeometry) -> Self {
        Self {
            frequencies: PerLineMetadata::new(geometry, 0),
        }
    }

    /// Reference count of the line in `(set, way)` since it was filled.
    #[inline]
    pub fn frequency(&self, set: usize, way: usize) -> u64 {
        *self.frequencies.get(set, way)
    }
}

impl ReplacementPolicy for LfuPolicy {
    fn name(&self) -> &'static str {
        "lfu"
    }

    /// Scans the set for the smallest count. The first way holding the minimum wins; the
    /// last way is the victim only if no count is below the scan's starting value.
    fn handle_replacement(&self, _context: &AccessContext, set: usize, _tag: Tag) -> usize {
        let entries = self.frequencies.set_entries(set);
        let mut victim = entries.len() - 1;
        let mut min = u64::MAX;
        for (way, &frequency) in entries.iter().enumerate() {
            if frequency < min {
                min = frequency;
                victim = way;
            }
        }
        victim
    }

    fn handle_promotion_on_hit(&mut self, access: &CacheAccess) {
        let frequency = self.frequencies.get_mut(access.set(), access.way());
        *frequency = frequency.saturating_add(1);
    }

    fn handle_insertion_on_miss(&mut self, access: &CacheAccess) {
        *self.frequencies.get_mut(access.set(), access.way()) = 0;
    }
}
