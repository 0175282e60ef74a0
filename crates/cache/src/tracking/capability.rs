//! FSM-Based Helper-Thread Request Victim Tracking.
//!
//! Runs one [`HtRequestState`] machine per slot of the last-level cache and feeds it the
//! cache's service and invalidation events in the order they happen. For every serviced
//! request the conditions are fired as follows:
//! 1. **Hit:** HT_HIT or MT_HIT on the slot that hit.
//! 2. **Eviction:** On a miss that displaces a valid line, EVICTED_BY_HT or EVICTED_BY_MT on
//!    the slot being refilled, carrying the displaced tag.
//! 3. **Victim Hit:** On a main-thread miss, VICTIM_HIT_BY_MT on the first other slot of
//!    the set whose helper-thread line displaced the tag now being fetched.
//! 4. **Fill:** HT_MISS or MT_MISS on the slot being refilled.
//!
//! Every helper-thread request that reaches a terminal state is counted under its scheme's
//! name and returned to the caller as a [`Classification`].

use std::marker::PhantomData;

use super::event::CacheEvent;
use super::fsm::{Effect, HtRequestCondition, HtRequestQuality, HtRequestState, VictimTagUpdate, transition};
use super::scheme::ClassificationScheme;
use crate::cache::{CacheGeometry, PolicyFeedback};
use crate::common::{AccessContext, CacheError, Tag};
use crate::stats::{DumpType, StatEvent, StatsMap, StatsReporter};

/// A helper-thread request that reached its final classification.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Classification {
    /// Set the request was filled into.
    pub set: usize,
    /// Way the request was filled into.
    pub way: usize,
    /// Helper thread that issued the request.
    pub thread_id: usize,
    /// Outcome.
    pub quality: HtRequestQuality,
}

impl Classification {
    /// Feedback a replacement policy can learn from.
    pub const fn feedback(&self) -> PolicyFeedback {
        PolicyFeedback::HelperThreadRequest {
            set: self.set,
            thread_id: self.thread_id,
            useful: self.quality.is_useful(),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
struct Slot {
    state: HtRequestState,
    victim_tag: Option<Tag>,
    thread_id: usize,
}

/// Object-safe view of a tracker, whatever its naming scheme.
pub trait HtRequestTracking: StatsReporter + Send + Sync + std::fmt::Debug {
    /// Applies one cache event.
    fn handle_event(&mut self, event: &CacheEvent) -> Result<Vec<Classification>, CacheError>;

    /// Fires FLUSH on every slot.
    fn flush(&mut self) -> Result<Vec<Classification>, CacheError>;

    /// State of slot `(set, way)`.
    fn state(&self, set: usize, way: usize) -> HtRequestState;

    /// Helper-thread requests started since the last reset.
    fn total_ht_requests(&self) -> u64;

    /// Requests classified as `quality` since the last reset.
    fn classified(&self, quality: HtRequestQuality) -> u64;
}

/// Per-slot helper-thread request tracker.
#[derive(Clone, Debug)]
pub struct HtRequestVictimTracker<S> {
    name: String,
    associativity: usize,
    slots: Vec<Slot>,
    total_ht_requests: u64,
    classified: [u64; 4],
    scheme: PhantomData<S>,
}

impl<S: ClassificationScheme> HtRequestVictimTracker<S> {
    /// Creates a tracker for the cache `name` of shape `geometry`, with every slot INVALID.
    pub fn new(name: impl Into<String>, geometry: &CacheGeometry) -> Self {
        let name = name.into();
        tracing::debug!(cache = %name, scheme = S::NAME, "helper-thread request tracking enabled");
        Self {
            name,
            associativity: geometry.associativity(),
            slots: vec![Slot::default(); geometry.num_lines()],
            total_ht_requests: 0,
            classified: [0; 4],
            scheme: PhantomData,
        }
    }

    /// Victim tag recorded for slot `(set, way)`.
    pub fn victim_tag(&self, set: usize, way: usize) -> Option<Tag> {
        self.slots[self.index(set, way)].victim_tag
    }

    /// Prefix of every stat this tracker publishes.
    pub fn stat_prefix(&self) -> String {
        format!(
            "{name}.fsmBasedHtRequestLlcVictimTrackingCapability.{name}",
            name = self.name
        )
    }

    const fn index(&self, set: usize, way: usize) -> usize {
        set * self.associativity + way
    }

    /// Applies one serviced request.
    ///
    /// # Returns
    ///
    /// Requests classified along the way, or the invariant the event broke: an undefined
    /// transition, or a fill into a slot that is still tracking a line.
    pub fn service_request(
        &mut self,
        context: &AccessContext,
        set: usize,
        way: usize,
        tag: Tag,
        hit: bool,
        evicted_tag: Option<Tag>,
    ) -> Result<Vec<Classification>, CacheError> {
        let mut classifications = Vec::new();
        let helper = context.helper_thread;

        if hit {
            let condition = if helper {
                HtRequestCondition::HtHit
            } else {
                HtRequestCondition::MtHit
            };
            self.fire(set, way, condition, &mut classifications)?;
            return Ok(classifications);
        }

        if let Some(evicted_tag) = evicted_tag {
            let condition = if helper {
                HtRequestCondition::EvictedByHt { evicted_tag }
            } else {
                HtRequestCondition::EvictedByMt
            };
            self.fire(set, way, condition, &mut classifications)?;
        }

        let state = self.slots[self.index(set, way)].state;
        if state != HtRequestState::Invalid {
            return Err(CacheError::SlotNotInvalid {
                set,
                way,
                state: S::state_name(state),
            });
        }

        if !helper {
            if let Some(victim_way) = self.find_victim_way(set, way, tag) {
                self.fire(set, victim_way, HtRequestCondition::VictimHitByMt, &mut classifications)?;
            }
        }

        let condition = if helper {
            HtRequestCondition::HtMiss
        } else {
            HtRequestCondition::MtMiss
        };
        self.fire(set, way, condition, &mut classifications)?;
        if helper {
            let index = self.index(set, way);
            self.slots[index].thread_id = context.thread_id;
        }

        Ok(classifications)
    }

    /// Applies a memory-write invalidation of slot `(set, way)`.
    ///
    /// # Returns
    ///
    /// The classification it completed, if any, or [`CacheError::DuplicateInvalidate`] if
    /// the slot was already INVALID.
    pub fn invalidate(&mut self, set: usize, way: usize) -> Result<Vec<Classification>, CacheError> {
        if self.slots[self.index(set, way)].state == HtRequestState::Invalid {
            return Err(CacheError::DuplicateInvalidate { set, way });
        }
        let mut classifications = Vec::new();
        self.fire(set, way, HtRequestCondition::InvalidatedByMemWrite, &mut classifications)?;
        Ok(classifications)
    }

    // First slot other than `way` holding a not-yet-polluting helper-thread line whose fill
    // displaced `tag`.
    fn find_victim_way(&self, set: usize, way: usize, tag: Tag) -> Option<usize> {
        let base = self.index(set, 0);
        self.slots[base..base + self.associativity]
            .iter()
            .enumerate()
            .find(|&(candidate, slot)| {
                candidate != way
                    && matches!(slot.state, HtRequestState::UnusedHt | HtRequestState::GoodHt)
                    && slot.victim_tag == Some(tag)
            })
            .map(|(candidate, _)| candidate)
    }

    fn fire(
        &mut self,
        set: usize,
        way: usize,
        condition: HtRequestCondition,
        classifications: &mut Vec<Classification>,
    ) -> Result<(), CacheError> {
        let index = self.index(set, way);
        let slot = &mut self.slots[index];
        let transition = transition(slot.state, condition)?;

        if transition.next != slot.state {
            tracing::trace!(
                cache = %self.name,
                set,
                way,
                from = S::state_name(slot.state),
                to = S::state_name(transition.next),
                condition = condition.name(),
                "ht request transition"
            );
        }

        slot.state = transition.next;
        match transition.victim_tag {
            VictimTagUpdate::Keep => {}
            VictimTagUpdate::Set(tag) => slot.victim_tag = Some(tag),
            VictimTagUpdate::Clear => slot.victim_tag = None,
        }

        match transition.effect {
            None => {}
            Some(Effect::TotalHtRequest) => self.total_ht_requests += 1,
            Some(Effect::Classified(quality)) => {
                self.classified[quality.index()] += 1;
                tracing::debug!(
                    cache = %self.name,
                    set,
                    way,
                    classification = S::counter_name(quality),
                    "ht request classified"
                );
                classifications.push(Classification {
                    set,
                    way,
                    thread_id: slot.thread_id,
                    quality,
                });
            }
        }
        Ok(())
    }

    fn publish(&self, stats: &mut StatsMap) {
        let prefix = self.stat_prefix();
        stats.insert(format!("{prefix}.totalHtRequests"), self.total_ht_requests);
        for quality in HtRequestQuality::ALL {
            stats.insert(
                format!("{prefix}.{}.confirmed", S::counter_name(quality)),
                self.classified[quality.index()],
            );
        }
    }
}

impl<S: ClassificationScheme> HtRequestTracking for HtRequestVictimTracker<S> {
    fn handle_event(&mut self, event: &CacheEvent) -> Result<Vec<Classification>, CacheError> {
        match *event {
            CacheEvent::ServiceRequest {
                ref context,
                set,
                way,
                tag,
                hit,
                evicted_tag,
            } => self.service_request(context, set, way, tag, hit, evicted_tag),
            CacheEvent::LineInvalidatedByMemWrite { set, way } => self.invalidate(set, way),
        }
    }

    fn flush(&mut self) -> Result<Vec<Classification>, CacheError> {
        let mut classifications = Vec::new();
        for index in 0..self.slots.len() {
            let (set, way) = (index / self.associativity, index % self.associativity);
            self.fire(set, way, HtRequestCondition::Flush, &mut classifications)?;
        }
        Ok(classifications)
    }

    fn state(&self, set: usize, way: usize) -> HtRequestState {
        self.slots[self.index(set, way)].state
    }

    fn total_ht_requests(&self) -> u64 {
        self.total_ht_requests
    }

    fn classified(&self, quality: HtRequestQuality) -> u64 {
        self.classified[quality.index()]
    }
}

impl<S: ClassificationScheme> StatsReporter for HtRequestVictimTracker<S> {
    /// Reset zeroes the counters. A detailed-simulation dump flushes every slot before
    /// publishing, so requests still resident are counted; the flush's classifications
    /// are not returned. Every slot is INVALID afterwards while the cache still holds its
    /// lines, so the tracker must be rebuilt before the simulation resumes.
    fn handle_stat_event(&mut self, event: StatEvent, stats: &mut StatsMap) -> Result<(), CacheError> {
        match event {
            StatEvent::Reset => {
                self.total_ht_requests = 0;
                self.classified = [0; 4];
            }
            StatEvent::Poll | StatEvent::Dump(DumpType::FastForward | DumpType::Warmup) => self.publish(stats),
            StatEvent::Dump(DumpType::DetailedSimulation) => {
                let _ = self.flush()?;
                self.publish(stats);
            }
        }
        Ok(())
    }
}
