//! Set-Dueling Composite Replacement Policy.
//!
//! Holds several candidate policies and lets a [`SetDuelingUnit`] pick, per set and per
//! requesting thread, which one chooses the victim. Every candidate sees every committed
//! hit and fill, so a follower set can switch candidates between intervals without
//! starting from cold metadata.
//!
//! Committed fills also feed the unit: evictions advance the usefulness interval and
//! main-thread misses are charged to the leader set they land in. Helper-thread
//! classifications and cycle ticks arrive as [`PolicyFeedback`].

use super::{PolicyFeedback, ReplacementPolicy};
use crate::cache::access::CacheAccess;
use crate::cache::geometry::CacheGeometry;
use crate::common::{AccessContext, CacheError, Tag};
use crate::config::SetDuelingConfig;
use crate::dueling::SetDuelingUnit;
use crate::stats::{StatEvent, StatsMap, StatsReporter};

/// Set-dueling composite state.
pub struct SetDuelingPolicy {
    candidates: Vec<Box<dyn ReplacementPolicy>>,
    unit: SetDuelingUnit,
}

impl std::fmt::Debug for SetDuelingPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<_> = self.candidates.iter().map(|candidate| candidate.name()).collect();
        f.debug_struct("SetDuelingPolicy")
            .field("candidates", &names)
            .field("unit", &self.unit)
            .finish()
    }
}

impl SetDuelingPolicy {
    /// Creates the composite.
    ///
    /// # Arguments
    ///
    /// * `name` - Name of the owning cache, used as the stat prefix.
    /// * `geometry` - Shape of the owning cache.
    /// * `num_threads` - Threads that get their own leader sets.
    /// * `config` - Set-dueling parameters.
    /// * `candidates` - Candidate policies, indexed by policy id.
    ///
    /// # Returns
    ///
    /// The composite, or the error raised while assigning leader sets.
    pub fn new(
        name: &str,
        geometry: &CacheGeometry,
        num_threads: usize,
        config: &SetDuelingConfig,
        candidates: Vec<Box<dyn ReplacementPolicy>>,
    ) -> Result<Self, CacheError> {
        let unit = SetDuelingUnit::new(
            format!("{name}.setDuelingUnit"),
            geometry,
            num_threads,
            candidates.len(),
            config,
        )?;
        Ok(Self { candidates, unit })
    }

    /// Set-dueling unit.
    #[inline]
    pub const fn unit(&self) -> &SetDuelingUnit {
        &self.unit
    }

    /// Candidate policies, indexed by policy id.
    #[inline]
    pub fn candidates(&self) -> &[Box<dyn ReplacementPolicy>] {
        &self.candidates
    }
}

impl ReplacementPolicy for SetDuelingPolicy {
    fn name(&self) -> &'static str {
        "setDueling"
    }

    fn handle_replacement(&self, context: &AccessContext, set: usize, tag: Tag) -> usize {
        let policy_id = self.unit.policy_id(set, context.thread_id);
        self.candidates[policy_id].handle_replacement(context, set, tag)
    }

    fn handle_promotion_on_hit(&mut self, access: &CacheAccess) {
        for candidate in &mut self.candidates {
            candidate.handle_promotion_on_hit(access);
        }
    }

    fn handle_insertion_on_miss(&mut self, access: &CacheAccess) {
        if access.is_eviction() {
            self.unit.record_eviction();
        }
        if !access.context().helper_thread {
            self.unit.record_miss(access.set());
        }
        for candidate in &mut self.candidates {
            candidate.handle_insertion_on_miss(access);
        }
    }

    fn handle_feedback(&mut self, feedback: &PolicyFeedback) {
        match *feedback {
            PolicyFeedback::HelperThreadRequest { set, thread_id, useful } => {
                self.unit.record_request(set, thread_id, useful);
            }
            PolicyFeedback::CycleElapsed => self.unit.advance_cycle(),
        }
        for candidate in &mut self.candidates {
            candidate.handle_feedback(feedback);
        }
    }

    fn handle_stat_event(&mut self, event: StatEvent, stats: &mut StatsMap) -> Result<(), CacheError> {
        self.unit.handle_stat_event(event, stats)
    }
}
