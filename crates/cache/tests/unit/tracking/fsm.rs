//! Helper-Thread Request State Machine Tests.
//!
//! Verifies the transition table one row at a time, the conditions it rejects and the
//! names each scheme gives to the states and counters.

use cachesim_core::CacheError;
use cachesim_core::tracking::fsm::{Effect, VictimTagUpdate};
use cachesim_core::tracking::{
    ClassificationScheme, GoodBadUgly, HtRequestCondition as C, HtRequestQuality as Q, HtRequestState as S,
    UsedPolluting, transition,
};
use pretty_assertions::assert_eq;
use rstest::rstest;

// ══════════════════════════════════════════════════════════
// 1. Defined Transitions
// ══════════════════════════════════════════════════════════

/// Next state of every defined (state, condition) pair.
#[rstest]
#[case(S::Invalid, C::HtMiss, S::UnusedHt)]
#[case(S::Invalid, C::MtMiss, S::Mt)]
#[case(S::Invalid, C::Flush, S::Invalid)]
#[case(S::Mt, C::HtHit, S::Mt)]
#[case(S::Mt, C::MtHit, S::Mt)]
#[case(S::Mt, C::EvictedByMt, S::Invalid)]
#[case(S::Mt, C::InvalidatedByMemWrite, S::Invalid)]
#[case(S::Mt, C::Flush, S::Mt)]
#[case(S::UnusedHt, C::HtHit, S::UnusedHt)]
#[case(S::UnusedHt, C::MtHit, S::GoodHt)]
#[case(S::UnusedHt, C::VictimHitByMt, S::BadHt)]
#[case(S::UnusedHt, C::Flush, S::Invalid)]
#[case(S::GoodHt, C::MtHit, S::GoodHt)]
#[case(S::GoodHt, C::VictimHitByMt, S::UglyHt)]
#[case(S::GoodHt, C::InvalidatedByMemWrite, S::Invalid)]
#[case(S::BadHt, C::VictimHitByMt, S::BadHt)]
#[case(S::BadHt, C::MtHit, S::UglyHt)]
#[case(S::BadHt, C::EvictedByMt, S::Invalid)]
#[case(S::UglyHt, C::HtHit, S::UglyHt)]
#[case(S::UglyHt, C::Flush, S::Invalid)]
fn fsm_next_state(#[case] state: S, #[case] condition: C, #[case] next: S) {
    assert_eq!(transition(state, condition).unwrap().next, next);
}

/// Leaving a helper-thread state by eviction or flush classifies the request.
#[rstest]
#[case(S::UnusedHt, Q::Unused)]
#[case(S::GoodHt, Q::Good)]
#[case(S::BadHt, Q::Bad)]
#[case(S::UglyHt, Q::Ugly)]
fn fsm_eviction_classifies(#[case] state: S, #[case] quality: Q) {
    for condition in [C::EvictedByHt { evicted_tag: 0x40 }, C::EvictedByMt, C::Flush] {
        let step = transition(state, condition).unwrap();
        assert_eq!(step.next, S::Invalid);
        assert_eq!(step.effect, Some(Effect::Classified(quality)));
        assert_eq!(step.victim_tag, VictimTagUpdate::Clear);
    }
}

/// A helper-thread fill counts a new request and keeps any pending victim tag.
#[test]
fn fsm_helper_fill_counts_request() {
    let step = transition(S::Invalid, C::HtMiss).unwrap();
    assert_eq!(step.effect, Some(Effect::TotalHtRequest));
    assert_eq!(step.victim_tag, VictimTagUpdate::Keep);

    let step = transition(S::Invalid, C::MtMiss).unwrap();
    assert_eq!(step.effect, None);
    assert_eq!(step.victim_tag, VictimTagUpdate::Clear);
}

/// A helper thread displacing a main-thread line records the displaced tag.
#[test]
fn fsm_helper_eviction_records_victim() {
    let step = transition(S::Mt, C::EvictedByHt { evicted_tag: 0x1000 }).unwrap();
    assert_eq!(step.next, S::Invalid);
    assert_eq!(step.victim_tag, VictimTagUpdate::Set(0x1000));
    assert_eq!(step.effect, None);
}

/// An unused helper line invalidated by a memory write is classified unused; a used
/// one just leaves.
#[test]
fn fsm_mem_write_invalidation() {
    let unused = transition(S::UnusedHt, C::InvalidatedByMemWrite).unwrap();
    assert_eq!(unused.effect, Some(Effect::Classified(Q::Unused)));

    for state in [S::GoodHt, S::BadHt, S::UglyHt] {
        let step = transition(state, C::InvalidatedByMemWrite).unwrap();
        assert_eq!(step.next, S::Invalid);
        assert_eq!(step.effect, None);
    }
}

// ══════════════════════════════════════════════════════════
// 2. Illegal Transitions
// ══════════════════════════════════════════════════════════

/// Pairs the machine does not define are errors naming both sides.
#[rstest]
#[case(S::Invalid, C::HtHit)]
#[case(S::Invalid, C::MtHit)]
#[case(S::Invalid, C::EvictedByMt)]
#[case(S::Invalid, C::VictimHitByMt)]
#[case(S::Invalid, C::InvalidatedByMemWrite)]
#[case(S::Mt, C::HtMiss)]
#[case(S::Mt, C::VictimHitByMt)]
#[case(S::UnusedHt, C::MtMiss)]
#[case(S::GoodHt, C::HtMiss)]
#[case(S::UglyHt, C::MtMiss)]
fn fsm_rejects_undefined_pairs(#[case] state: S, #[case] condition: C) {
    match transition(state, condition) {
        Err(CacheError::IllegalTransition {
            state: state_name,
            condition: condition_name,
        }) => {
            assert_eq!(state_name, state.name());
            assert_eq!(condition_name, condition.name());
        }
        other => panic!("expected an illegal transition, got {other:?}"),
    }
}

// ══════════════════════════════════════════════════════════
// 3. Naming Schemes
// ══════════════════════════════════════════════════════════

/// Both schemes name the same outcomes differently.
#[test]
fn scheme_names() {
    assert_eq!(GoodBadUgly::state_name(S::GoodHt), "GOOD_HT");
    assert_eq!(UsedPolluting::state_name(S::GoodHt), "USED_HT");
    assert_eq!(UsedPolluting::state_name(S::BadHt), "POLLUTING_HT");
    assert_eq!(UsedPolluting::state_name(S::UglyHt), "USED_POLLUTING_HT");
    assert_eq!(UsedPolluting::state_name(S::Mt), "MT");

    assert_eq!(GoodBadUgly::counter_name(Q::Ugly), "uglyHtRequests");
    assert_eq!(UsedPolluting::counter_name(Q::Ugly), "usedPollutingHtRequests");
    assert_eq!(UsedPolluting::counter_name(Q::Unused), "unusedHtRequests");
}

/// Good and ugly requests helped the main thread; bad and unused ones did not.
#[test]
fn quality_usefulness() {
    let useful: Vec<Q> = Q::ALL.into_iter().filter(|quality| quality.is_useful()).collect();
    assert_eq!(useful, vec![Q::Good, Q::Ugly]);
    assert!(S::BadHt.is_helper_thread());
    assert!(!S::Mt.is_helper_thread());
}
