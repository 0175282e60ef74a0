//! Helper-Thread Request Tracker Tests.
//!
//! Drives the per-slot tracker with serviced requests and invalidations and checks how
//! every helper-thread request is finally classified:
//! - **Good:** used by the main thread before leaving the cache.
//! - **Bad:** displaced a main-thread line the main thread then missed on.
//! - **Ugly:** both.
//! - **Unused:** neither.

use cachesim_core::CacheError;
use cachesim_core::cache::PolicyFeedback;
use cachesim_core::common::{AccessContext, Tag};
use cachesim_core::config::{TrackingConfig, TrackingScheme};
use cachesim_core::stats::{DumpType, StatEvent, StatsMap, StatsReporter};
use cachesim_core::tracking::{
    CacheEvent, Classification, GoodBadUgly, HtRequestQuality, HtRequestState, HtRequestTracking,
    HtRequestVictimTracker, UsedPolluting, build_tracker,
};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

use crate::common::{geometry, init_tracing, lru_cache};

const MAIN: AccessContext = AccessContext::main_thread(0, 0x400);
const HELPER: AccessContext = AccessContext::helper_thread(1, 0x800);

const X: Tag = 0x1000;
const H: Tag = 0x2000;
const Y: Tag = 0x3000;

fn tracker() -> HtRequestVictimTracker<GoodBadUgly> {
    init_tracing();
    HtRequestVictimTracker::new("l2", &geometry(4, 4, 64))
}

fn qualities(classifications: &[Classification]) -> Vec<HtRequestQuality> {
    classifications.iter().map(|classification| classification.quality).collect()
}

// ══════════════════════════════════════════════════════════
// 1. Classification Scenarios
// ══════════════════════════════════════════════════════════

/// Helper fill, main-thread hit, main-thread eviction: a good request.
#[test]
fn tracker_good_request() {
    let mut tracker = tracker();

    let fill = tracker.service_request(&HELPER, 0, 0, H, false, None).unwrap();
    assert!(fill.is_empty());
    assert_eq!(tracker.state(0, 0), HtRequestState::UnusedHt);
    assert_eq!(tracker.total_ht_requests(), 1);

    let _ = tracker.service_request(&MAIN, 0, 0, H, true, None).unwrap();
    assert_eq!(tracker.state(0, 0), HtRequestState::GoodHt);

    let evicted = tracker.service_request(&MAIN, 0, 0, Y, false, Some(H)).unwrap();
    assert_eq!(
        evicted,
        vec![Classification {
            set: 0,
            way: 0,
            thread_id: 1,
            quality: HtRequestQuality::Good,
        }]
    );
    assert_eq!(tracker.state(0, 0), HtRequestState::Mt);
    assert_eq!(tracker.classified(HtRequestQuality::Good), 1);
}

/// A helper line that displaced X, followed by a main-thread miss on X: a bad request.
#[test]
fn tracker_bad_request_via_victim_hit() {
    let mut tracker = tracker();

    // Main-thread X in way 1; the helper thread displaces it with H.
    let _ = tracker.service_request(&MAIN, 0, 1, X, false, None).unwrap();
    let _ = tracker.service_request(&HELPER, 0, 1, H, false, Some(X)).unwrap();
    assert_eq!(tracker.state(0, 1), HtRequestState::UnusedHt);
    assert_eq!(tracker.victim_tag(0, 1), Some(X), "the pending victim survives the fill");

    // The main thread misses on X and refetches it into way 2.
    let refetch = tracker.service_request(&MAIN, 0, 2, X, false, None).unwrap();
    assert!(refetch.is_empty());
    assert_eq!(tracker.state(0, 1), HtRequestState::BadHt);
    assert_eq!(tracker.victim_tag(0, 1), None);
    assert_eq!(tracker.state(0, 2), HtRequestState::Mt);

    let evicted = tracker.service_request(&MAIN, 0, 1, Y, false, Some(H)).unwrap();
    assert_eq!(qualities(&evicted), vec![HtRequestQuality::Bad]);
    assert_eq!(tracker.classified(HtRequestQuality::Bad), 1);
}

/// A bad request later used by the main thread is ugly.
#[test]
fn tracker_ugly_request() {
    let mut tracker = tracker();
    let _ = tracker.service_request(&MAIN, 1, 0, X, false, None).unwrap();
    let _ = tracker.service_request(&HELPER, 1, 0, H, false, Some(X)).unwrap();
    let _ = tracker.service_request(&MAIN, 1, 3, X, false, None).unwrap();
    let _ = tracker.service_request(&MAIN, 1, 0, H, true, None).unwrap();
    assert_eq!(tracker.state(1, 0), HtRequestState::UglyHt);

    let evicted = tracker.service_request(&HELPER, 1, 0, Y, false, Some(H)).unwrap();
    assert_eq!(qualities(&evicted), vec![HtRequestQuality::Ugly]);
    // The evicting helper fill starts a new request.
    assert_eq!(tracker.state(1, 0), HtRequestState::UnusedHt);
    assert_eq!(tracker.total_ht_requests(), 2);
}

/// A helper line evicted before any use is unused; only the main thread's own misses
/// look for victims.
#[test]
fn tracker_unused_request() {
    let mut tracker = tracker();
    let _ = tracker.service_request(&HELPER, 2, 0, H, false, None).unwrap();
    let _ = tracker.service_request(&HELPER, 2, 0, H, true, None).unwrap();
    assert_eq!(tracker.state(2, 0), HtRequestState::UnusedHt);

    let evicted = tracker.service_request(&HELPER, 2, 0, Y, false, Some(H)).unwrap();
    assert_eq!(qualities(&evicted), vec![HtRequestQuality::Unused]);
}

/// Only the first matching slot takes the victim hit, and never the slot being filled.
#[test]
fn tracker_victim_hit_first_match_only() {
    let mut tracker = tracker();
    for way in [0, 1] {
        let _ = tracker.service_request(&MAIN, 3, way, X + way as u64 * 0x40, false, None).unwrap();
    }
    // Both helper fills displaced a line with tag X.
    let _ = tracker.service_request(&HELPER, 3, 0, H, false, Some(X)).unwrap();
    let _ = tracker.service_request(&HELPER, 3, 1, H + 0x40, false, Some(X)).unwrap();

    let _ = tracker.service_request(&MAIN, 3, 2, X, false, None).unwrap();
    assert_eq!(tracker.state(3, 0), HtRequestState::BadHt);
    assert_eq!(tracker.state(3, 1), HtRequestState::UnusedHt);
}

// ══════════════════════════════════════════════════════════
// 2. Invariants
// ══════════════════════════════════════════════════════════

/// Filling a slot that is still tracking a line is an error.
#[test]
fn tracker_rejects_fill_into_tracked_slot() {
    let mut tracker = tracker();
    let _ = tracker.service_request(&MAIN, 0, 0, X, false, None).unwrap();
    let result = tracker.service_request(&MAIN, 0, 0, Y, false, None);
    assert!(matches!(
        result,
        Err(CacheError::SlotNotInvalid {
            set: 0,
            way: 0,
            state: "MT"
        })
    ));
}

/// A hit on an empty slot is an undefined transition.
#[test]
fn tracker_rejects_hit_on_empty_slot() {
    let mut tracker = tracker();
    let result = tracker.service_request(&HELPER, 0, 0, X, true, None);
    assert!(matches!(result, Err(CacheError::IllegalTransition { .. })));
}

/// Invalidating an empty slot twice is rejected; an unused helper line is classified.
#[test]
fn tracker_invalidation() {
    let mut tracker = tracker();
    assert!(matches!(
        tracker.invalidate(0, 0),
        Err(CacheError::DuplicateInvalidate { set: 0, way: 0 })
    ));

    let _ = tracker.service_request(&HELPER, 0, 0, H, false, None).unwrap();
    let event = CacheEvent::LineInvalidatedByMemWrite { set: 0, way: 0 };
    let classified = tracker.handle_event(&event).unwrap();
    assert_eq!(qualities(&classified), vec![HtRequestQuality::Unused]);
    assert_eq!(tracker.state(0, 0), HtRequestState::Invalid);
    assert!(tracker.handle_event(&event).is_err());
}

/// Flush classifies every resident helper line and leaves main-thread lines alone.
#[test]
fn tracker_flush() {
    let mut tracker = tracker();
    let _ = tracker.service_request(&HELPER, 0, 0, H, false, None).unwrap();
    let _ = tracker.service_request(&HELPER, 0, 1, Y, false, None).unwrap();
    let _ = tracker.service_request(&MAIN, 0, 1, Y, true, None).unwrap();
    let _ = tracker.service_request(&MAIN, 1, 0, X, false, None).unwrap();

    let flushed = tracker.flush().unwrap();
    assert_eq!(qualities(&flushed), vec![HtRequestQuality::Unused, HtRequestQuality::Good]);
    assert_eq!(tracker.state(1, 0), HtRequestState::Mt);
    assert_eq!(tracker.state(0, 0), HtRequestState::Invalid);
}

/// Classifications turn into policy feedback.
#[test]
fn classification_feedback() {
    let classification = Classification {
        set: 5,
        way: 1,
        thread_id: 2,
        quality: HtRequestQuality::Ugly,
    };
    assert_eq!(
        classification.feedback(),
        PolicyFeedback::HelperThreadRequest {
            set: 5,
            thread_id: 2,
            useful: true,
        }
    );
}

// ══════════════════════════════════════════════════════════
// 3. Statistics
// ══════════════════════════════════════════════════════════

/// Stats are published under the capability prefix with the scheme's counter names.
#[test]
fn tracker_stat_keys_good_bad_ugly() {
    let mut tracker = tracker();
    let _ = tracker.service_request(&HELPER, 0, 0, H, false, None).unwrap();

    let mut stats = StatsMap::new();
    tracker.handle_stat_event(StatEvent::Poll, &mut stats).unwrap();
    let prefix = "l2.fsmBasedHtRequestLlcVictimTrackingCapability.l2";
    assert_eq!(tracker.stat_prefix(), prefix);
    assert_eq!(stats.count(&format!("{prefix}.totalHtRequests")), Some(1));
    for counter in ["goodHtRequests", "badHtRequests", "uglyHtRequests", "unusedHtRequests"] {
        assert_eq!(stats.count(&format!("{prefix}.{counter}.confirmed")), Some(0), "{counter}");
    }
    assert_eq!(stats.len(), 5);
}

/// The detailed-simulation dump flushes first, so resident requests are counted.
#[test]
fn tracker_detailed_dump_flushes() {
    let mut tracker = HtRequestVictimTracker::<UsedPolluting>::new("llc", &geometry(4, 4, 64));
    let _ = tracker.service_request(&HELPER, 0, 0, H, false, None).unwrap();
    let _ = tracker.service_request(&MAIN, 0, 0, H, true, None).unwrap();

    let mut stats = StatsMap::new();
    tracker.handle_stat_event(StatEvent::Dump(DumpType::Warmup), &mut stats).unwrap();
    let prefix = tracker.stat_prefix();
    assert_eq!(stats.count(&format!("{prefix}.usedHtRequests.confirmed")), Some(0));

    tracker
        .handle_stat_event(StatEvent::Dump(DumpType::DetailedSimulation), &mut stats)
        .unwrap();
    assert_eq!(stats.count(&format!("{prefix}.usedHtRequests.confirmed")), Some(1));
    assert_eq!(stats.count(&format!("{prefix}.pollutingHtRequests.confirmed")), Some(0));

    // The line is still resident in the cache, but its slot no longer tracks it.
    assert_eq!(tracker.state(0, 0), HtRequestState::Invalid);
    assert!(matches!(
        tracker.service_request(&MAIN, 0, 0, H, true, None),
        Err(CacheError::IllegalTransition { .. })
    ));

    tracker.handle_stat_event(StatEvent::Reset, &mut stats).unwrap();
    assert_eq!(tracker.total_ht_requests(), 0);
    assert_eq!(tracker.classified(HtRequestQuality::Good), 0);
}

/// The builder picks the configured naming scheme.
#[test]
fn build_tracker_uses_configured_scheme() {
    let geometry = geometry(4, 4, 64);
    let config = TrackingConfig {
        scheme: TrackingScheme::UsedPolluting,
    };
    let mut tracker = build_tracker("l2", &geometry, &config);
    let event = CacheEvent::ServiceRequest {
        context: HELPER,
        set: 0,
        way: 0,
        tag: H,
        hit: false,
        evicted_tag: None,
    };
    let _ = tracker.handle_event(&event).unwrap();
    let _ = tracker.flush().unwrap();

    let mut stats = StatsMap::new();
    tracker.handle_stat_event(StatEvent::Poll, &mut stats).unwrap();
    let key = "l2.fsmBasedHtRequestLlcVictimTrackingCapability.l2.unusedHtRequests.confirmed";
    assert_eq!(stats.count(key), Some(1));
    assert!(stats.get("l2.fsmBasedHtRequestLlcVictimTrackingCapability.l2.usedHtRequests.confirmed").is_some());
}

// ══════════════════════════════════════════════════════════
// 4. Cache-Driven Properties
// ══════════════════════════════════════════════════════════

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Driven by a real cache, the tracker never errs, and after a flush every
    /// helper-thread request has been classified exactly once.
    #[test]
    fn tracker_conserves_requests(stream in proptest::collection::vec((0_u64..16, any::<bool>()), 1..200)) {
        let mut cache = lru_cache(2, 2);
        let mut tracker = HtRequestVictimTracker::<GoodBadUgly>::new("l2", cache.geometry());

        for (line, helper) in stream {
            let context = if helper { HELPER } else { MAIN };
            let mut access = cache.new_access(context, line * 64);
            cache.commit(&mut access).unwrap();
            let _ = tracker.handle_event(&CacheEvent::from(&access)).unwrap();
        }
        let _ = tracker.flush().unwrap();

        let classified: u64 = HtRequestQuality::ALL.into_iter().map(|quality| tracker.classified(quality)).sum();
        prop_assert_eq!(classified, tracker.total_ht_requests());
        for set in 0..2 {
            for way in 0..2 {
                prop_assert!(!tracker.state(set, way).is_helper_thread());
            }
        }
    }
}
