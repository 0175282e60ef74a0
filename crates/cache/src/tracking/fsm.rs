//! Helper-Thread Request State Machine.
//!
//! One machine runs per cache line slot. It follows the line from the miss that fills it to
//! the event that removes it and, for lines brought in by a helper thread, decides how
//! useful that prefetch turned out to be.
//!
//! The machine is a pure function from `(state, condition)` to a [`Transition`]. Callers own
//! the per-slot state and the counters and apply the returned victim-tag update and effect
//! themselves.

use crate::common::{CacheError, Tag};

/// Per-slot state.
///
/// The helper-thread states are shared by both classification schemes; only their names
/// differ (see [`ClassificationScheme`](super::scheme::ClassificationScheme)).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum HtRequestState {
    /// Slot holds nothing tracked.
    #[default]
    Invalid,
    /// Line brought in by the main thread.
    Mt,
    /// Helper-thread line not yet used by the main thread.
    UnusedHt,
    /// Helper-thread line used by the main thread.
    GoodHt,
    /// Helper-thread line that displaced main-thread data the main thread then missed on.
    BadHt,
    /// Helper-thread line that was both used and polluting.
    UglyHt,
}

impl HtRequestState {
    /// Canonical name, as used in errors.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Invalid => "INVALID",
            Self::Mt => "MT",
            Self::UnusedHt => "UNUSED_HT",
            Self::GoodHt => "GOOD_HT",
            Self::BadHt => "BAD_HT",
            Self::UglyHt => "UGLY_HT",
        }
    }

    /// True for the states holding a helper-thread line.
    pub const fn is_helper_thread(self) -> bool {
        matches!(self, Self::UnusedHt | Self::GoodHt | Self::BadHt | Self::UglyHt)
    }
}

/// Event fired on a slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HtRequestCondition {
    /// Helper-thread access hit the slot's line.
    HtHit,
    /// Main-thread access hit the slot's line.
    MtHit,
    /// Helper-thread miss fills the slot.
    HtMiss,
    /// Main-thread miss fills the slot.
    MtMiss,
    /// A helper-thread miss evicts the slot's line.
    EvictedByHt {
        /// Tag of the line being evicted.
        evicted_tag: Tag,
    },
    /// A main-thread miss evicts the slot's line.
    EvictedByMt,
    /// A main-thread miss fetched the line this slot's fill had displaced.
    VictimHitByMt,
    /// A memory write invalidated the slot's line.
    InvalidatedByMemWrite,
    /// Terminal accounting before a statistics dump.
    Flush,
}

impl HtRequestCondition {
    /// Canonical name, as used in errors.
    pub const fn name(self) -> &'static str {
        match self {
            Self::HtHit => "HT_HIT",
            Self::MtHit => "MT_HIT",
            Self::HtMiss => "HT_MISS",
            Self::MtMiss => "MT_MISS",
            Self::EvictedByHt { .. } => "EVICTED_BY_HT",
            Self::EvictedByMt => "EVICTED_BY_MT",
            Self::VictimHitByMt => "VICTIM_HIT_BY_MT",
            Self::InvalidatedByMemWrite => "INVALIDATED_BY_MEM_WRITE",
            Self::Flush => "FLUSH",
        }
    }

    /// True for the composite EVICTED condition: either eviction, or a flush.
    pub const fn is_evicted(self) -> bool {
        matches!(self, Self::EvictedByHt { .. } | Self::EvictedByMt | Self::Flush)
    }
}

/// Final usefulness of a helper-thread request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HtRequestQuality {
    /// Used by the main thread, displaced nothing it needed.
    Good,
    /// Never used, displaced data the main thread needed.
    Bad,
    /// Used, but displaced data the main thread needed.
    Ugly,
    /// Never used.
    Unused,
}

impl HtRequestQuality {
    /// Every quality, in stat order.
    pub const ALL: [Self; 4] = [Self::Good, Self::Bad, Self::Ugly, Self::Unused];

    /// True if the main thread consumed the prefetched line.
    pub const fn is_useful(self) -> bool {
        matches!(self, Self::Good | Self::Ugly)
    }

    pub(crate) const fn index(self) -> usize {
        match self {
            Self::Good => 0,
            Self::Bad => 1,
            Self::Ugly => 2,
            Self::Unused => 3,
        }
    }
}

/// What a transition does to the slot's recorded victim tag.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VictimTagUpdate {
    /// Leave it as it is.
    Keep,
    /// Record this tag.
    Set(Tag),
    /// Forget it.
    Clear,
}

/// Counter side effect of a transition.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Effect {
    /// A new helper-thread request started.
    TotalHtRequest,
    /// A helper-thread request ended with this quality.
    Classified(HtRequestQuality),
}

/// Result of firing a condition.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Transition {
    /// State after the transition.
    pub next: HtRequestState,
    /// Victim-tag bookkeeping.
    pub victim_tag: VictimTagUpdate,
    /// Counter to bump, if any.
    pub effect: Option<Effect>,
}

impl Transition {
    const fn ignore(state: HtRequestState) -> Self {
        Self {
            next: state,
            victim_tag: VictimTagUpdate::Keep,
            effect: None,
        }
    }

    const fn to(next: HtRequestState, victim_tag: VictimTagUpdate, effect: Option<Effect>) -> Self {
        Self {
            next,
            victim_tag,
            effect,
        }
    }

    const fn invalidate(effect: Option<Effect>) -> Self {
        Self::to(HtRequestState::Invalid, VictimTagUpdate::Clear, effect)
    }

    const fn classify(quality: HtRequestQuality) -> Self {
        Self::invalidate(Some(Effect::Classified(quality)))
    }
}

/// Looks up the transition for `condition` in `state`.
///
/// # Returns
///
/// The transition, or [`CacheError::IllegalTransition`] for a pair the machine does not
/// define.
pub fn transition(state: HtRequestState, condition: HtRequestCondition) -> Result<Transition, CacheError> {
    use HtRequestCondition as C;
    use HtRequestQuality as Q;
    use HtRequestState as S;

    let transition = match (state, condition) {
        (S::Invalid, C::HtMiss) => {
            Transition::to(S::UnusedHt, VictimTagUpdate::Keep, Some(Effect::TotalHtRequest))
        }
        (S::Invalid, C::MtMiss) => Transition::to(S::Mt, VictimTagUpdate::Clear, None),
        (S::Invalid | S::Mt, C::Flush) => Transition::ignore(state),

        (S::Mt, C::HtHit | C::MtHit) => Transition::ignore(state),
        (S::Mt, C::EvictedByHt { evicted_tag }) => {
            Transition::to(S::Invalid, VictimTagUpdate::Set(evicted_tag), None)
        }
        (S::Mt, C::EvictedByMt | C::InvalidatedByMemWrite) => Transition::invalidate(None),

        (S::UnusedHt, C::HtHit) => Transition::ignore(state),
        (S::UnusedHt, C::MtHit) => Transition::to(S::GoodHt, VictimTagUpdate::Keep, None),
        (S::UnusedHt, C::VictimHitByMt) => Transition::to(S::BadHt, VictimTagUpdate::Clear, None),
        (S::UnusedHt, C::InvalidatedByMemWrite) => Transition::classify(Q::Unused),
        (S::UnusedHt, c) if c.is_evicted() => Transition::classify(Q::Unused),

        (S::GoodHt, C::HtHit | C::MtHit) => Transition::ignore(state),
        (S::GoodHt, C::VictimHitByMt) => Transition::to(S::UglyHt, VictimTagUpdate::Clear, None),
        (S::GoodHt, C::InvalidatedByMemWrite) => Transition::invalidate(None),
        (S::GoodHt, c) if c.is_evicted() => Transition::classify(Q::Good),

        (S::BadHt, C::HtHit | C::VictimHitByMt) => Transition::ignore(state),
        (S::BadHt, C::MtHit) => Transition::to(S::UglyHt, VictimTagUpdate::Keep, None),
        (S::BadHt, C::InvalidatedByMemWrite) => Transition::invalidate(None),
        (S::BadHt, c) if c.is_evicted() => Transition::classify(Q::Bad),

        (S::UglyHt, C::HtHit | C::MtHit | C::VictimHitByMt) => Transition::ignore(state),
        (S::UglyHt, C::InvalidatedByMemWrite) => Transition::invalidate(None),
        (S::UglyHt, c) if c.is_evicted() => Transition::classify(Q::Ugly),

        _ => {
            return Err(CacheError::IllegalTransition {
                state: state.name(),
                condition: condition.name(),
            });
        }
    };
    Ok(transition)
}
