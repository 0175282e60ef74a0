//! Dead-Block Predictor Tests.
//!
//! Verifies the skewed three-table predictor and the sampler that trains it.

use cachesim_core::predict::dead_block::make_trace;
use cachesim_core::predict::{DeadBlockPredictionSampler, DeadBlockPredictor};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

// ══════════════════════════════════════════════════════════
// 1. Predictor
// ══════════════════════════════════════════════════════════

/// Three "dead" trainings cross the threshold; two do not.
#[test]
fn predictor_learns_after_three_dead_updates() {
    let mut predictor = DeadBlockPredictor::default();
    let trace = make_trace(0x0040_1234);
    assert_eq!(trace, 0x1234);

    predictor.update(0, trace, true);
    predictor.update(0, trace, true);
    // Sum: 3 tables x 2 = 6.
    assert!(!predictor.predict(0, trace));
    assert_eq!(predictor.confidence(0, trace), 6);

    predictor.update(0, trace, true);
    // Sum: 9 >= 8.
    assert!(predictor.predict(0, trace));
}

/// A single reuse silences a saturated trace: even tables drop by one, odd tables halve.
#[test]
fn predictor_reuse_decays_skewed() {
    let mut predictor = DeadBlockPredictor::default();
    let trace = 0x0BEE;
    for _ in 0..10 {
        predictor.update(1, trace, true);
    }
    // Each table saturates at 3.
    assert_eq!(predictor.confidence(1, trace), 9);

    predictor.update(1, trace, false);
    // Tables 0 and 2: 3 -> 2. Table 1: 3 -> 1.
    assert_eq!(predictor.confidence(1, trace), 5);
    assert!(!predictor.predict(1, trace));
}

/// Threads train separate counters for the same trace.
#[test]
fn predictor_is_per_thread() {
    let mut predictor = DeadBlockPredictor::default();
    for _ in 0..3 {
        predictor.update(0, 0x42, true);
    }
    assert!(predictor.predict(0, 0x42));
    assert!(predictor.confidence(1, 0x42) < 8);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    /// Prediction is a pure function of the tables: asking twice never changes the answer.
    #[test]
    fn predictor_predict_is_idempotent(
        trace in 0_u32..0x1_0000,
        thread_id in 0_usize..4,
        updates in proptest::collection::vec(any::<bool>(), 0..16),
    ) {
        let mut predictor = DeadBlockPredictor::default();
        for dead in updates {
            predictor.update(thread_id, trace, dead);
        }
        let first = predictor.predict(thread_id, trace);
        prop_assert_eq!(predictor.predict(thread_id, trace), first);
        prop_assert!(predictor.confidence(thread_id, trace) <= 9);
    }
}

// ══════════════════════════════════════════════════════════
// 2. Sampler
// ══════════════════════════════════════════════════════════

/// A parent with fewer than eight sets still gets one sampler set.
#[test]
fn sampler_size_follows_parent() {
    assert_eq!(DeadBlockPredictionSampler::new(2).num_sets(), 1);
    assert_eq!(DeadBlockPredictionSampler::new(2048).num_sets(), 256);

    let sampler = DeadBlockPredictionSampler::new(16);
    assert_eq!(sampler.sampler_set(8), Some(1));
    assert_eq!(sampler.sampler_set(16), None);
    assert_eq!(sampler.entries(0).len(), 12);
}

/// A fill takes the first invalid way and becomes MRU; older entries shift down.
#[test]
fn sampler_fill_becomes_mru() {
    let mut sampler = DeadBlockPredictionSampler::new(8);
    sampler.access(0, 0, 0x400, 0x1000);
    sampler.access(0, 0, 0x404, 0x2000);

    let entries = sampler.entries(0);
    assert!(entries[0].valid);
    assert!(entries[1].valid);
    assert!(!entries[2].valid);
    assert_eq!(entries[0].partial_tag, 0x1000);
    assert_eq!(entries[1].trace, 0x404);

    // Positions: way 1 MRU, way 0 next, the rest unchanged.
    assert_eq!(entries[1].lru_position, 0);
    assert_eq!(entries[0].lru_position, 1);
    assert_eq!(entries[2].lru_position, 2);
}

/// Streaming distinct tags from one PC trains that PC dead once the sampler wraps.
#[test]
fn sampler_eviction_trains_dead() {
    let mut sampler = DeadBlockPredictionSampler::new(8);
    let pc = 0x1234;

    for index in 0..12_u64 {
        sampler.access(0, 0, pc, index << 6);
    }
    assert!(!sampler.predictor().predict(0, make_trace(pc)));

    for index in 12..15_u64 {
        sampler.access(0, 0, pc, index << 6);
    }
    assert!(sampler.predictor().predict(0, make_trace(pc)));
}

/// A sampler hit trains "not dead" on the entry's previous trace.
#[test]
fn sampler_hit_trains_live() {
    let mut sampler = DeadBlockPredictionSampler::new(8);
    let pc = 0x2222;
    for index in 0..15_u64 {
        sampler.access(0, 0, pc, index << 6);
    }
    let before = sampler.predictor().confidence(0, make_trace(pc));

    // Tag 14 << 6 is still resident.
    sampler.access(0, 0, 0x3333, 14 << 6);
    assert!(sampler.predictor().confidence(0, make_trace(pc)) < before);
}
