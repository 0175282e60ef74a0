//! Reuse-Distance Sampler Tests.
//!
//! The sampler records one reference every `sampling_period` references in a FIFO. A
//! later reference to a recorded address yields its distance; an entry falling off the
//! end yields the maximum distance.

use cachesim_core::common::Quantizer;
use cachesim_core::predict::{ReuseDistanceSample, ReuseDistanceSampler};
use pretty_assertions::assert_eq;

/// The FIFO holds `max_reuse_distance / sampling_period` entries.
#[test]
fn sampler_length_from_period() {
    let sampler = ReuseDistanceSampler::new(4096, 65536, Quantizer::new(15, 8192));
    assert_eq!(sampler.len(), 16);
    assert!(!sampler.is_empty());
    assert_eq!(sampler.quantizer().max_value(), (1 << 15) - 1);
}

/// Only every `period`-th reference is recorded.
#[test]
fn sampler_counts_down_between_samples() {
    let mut sampler = ReuseDistanceSampler::new(3, 12, Quantizer::new(4, 1));
    assert!(sampler.update(0, 0x10, 0x100).is_empty());
    assert_eq!(sampler.sampling_counter(), 2);

    // Not recorded: the counter is running.
    assert!(sampler.update(0, 0x20, 0x200).is_empty());
    assert!(sampler.update(0, 0x30, 0x300).is_empty());
    assert_eq!(sampler.sampling_counter(), 0);

    // 0x200 was never recorded, so touching it again yields nothing.
    assert!(sampler.update(0, 0x40, 0x200).is_empty());
}

/// Re-referencing a recorded address yields its FIFO distance; falling off the end
/// yields the maximum.
#[test]
fn sampler_emits_reuse_and_overflow_samples() {
    // Period 1: every reference is recorded. 4 slots, 3-bit distances.
    let mut sampler = ReuseDistanceSampler::new(1, 4, Quantizer::new(3, 1));

    for index in 1..=4_u64 {
        assert!(sampler.update(0, index, index << 6).is_empty());
    }
    // FIFO (newest first): 4, 3, 2, 1.

    let overflow = sampler.update(0, 5, 5 << 6);
    assert_eq!(
        overflow,
        vec![ReuseDistanceSample {
            leader_thread: 0,
            follower_thread: None,
            pc: 1,
            reuse_distance: 7,
        }]
    );
    // FIFO: 5, 4, 3, 2.

    let reuse = sampler.update(1, 9, 3 << 6);
    assert_eq!(
        reuse,
        vec![
            ReuseDistanceSample {
                leader_thread: 0,
                follower_thread: Some(1),
                pc: 3,
                reuse_distance: 2,
            },
            ReuseDistanceSample {
                leader_thread: 0,
                follower_thread: None,
                pc: 2,
                reuse_distance: 7,
            },
        ]
    );
}

/// A matched entry is consumed and does not overflow later.
#[test]
fn sampler_matched_entry_is_invalidated() {
    let mut sampler = ReuseDistanceSampler::new(1, 2, Quantizer::new(3, 1));
    let _ = sampler.update(0, 1, 0x40);
    let samples = sampler.update(0, 2, 0x40);
    assert_eq!(samples.len(), 1);
    assert_eq!(samples[0].reuse_distance, 0);

    // FIFO: 0x40 (pc 2), 0x40 (pc 1, consumed). The consumed entry drops silently.
    let samples = sampler.update(0, 3, 0x80);
    assert!(samples.is_empty());
}
