//! Reuse-Distance Sampler.
//!
//! Every `sampling_period`-th reference is recorded at the front of a FIFO. Slot `i` of the
//! FIFO therefore holds a reference made roughly `i * sampling_period` references ago. When
//! a later reference touches a recorded address, that distance is emitted as a sample and
//! the slot is retired. References that fall off the end of the FIFO without being touched
//! again are emitted with the largest quantized distance.

use std::collections::VecDeque;

use crate::common::{Quantizer, Tag};

/// One measured reuse distance.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReuseDistanceSample {
    /// Thread that made the sampled reference.
    pub leader_thread: usize,
    /// Thread that re-referenced the address; `None` if it was never re-referenced.
    pub follower_thread: Option<usize>,
    /// PC of the sampled reference.
    pub pc: u64,
    /// Quantized distance.
    pub reuse_distance: u64,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
struct SamplerEntry {
    thread_id: usize,
    pc: u64,
    address: Tag,
    valid: bool,
}

/// FIFO of sampled references.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReuseDistanceSampler {
    entries: VecDeque<SamplerEntry>,
    sampling_period: u64,
    sampling_counter: u64,
    quantizer: Quantizer,
}

impl ReuseDistanceSampler {
    /// Creates a sampler able to measure distances up to `max_reuse_distance`.
    ///
    /// # Arguments
    ///
    /// * `sampling_period` - References between two recorded samples.
    /// * `max_reuse_distance` - Longest distance measured; sets the FIFO length.
    /// * `quantizer` - Quantizer applied to emitted distances.
    pub fn new(sampling_period: u64, max_reuse_distance: u64, quantizer: Quantizer) -> Self {
        let sampling_period = sampling_period.max(1);
        let len = (max_reuse_distance / sampling_period).max(1) as usize;
        Self {
            entries: VecDeque::from(vec![SamplerEntry::default(); len]),
            sampling_period,
            sampling_counter: 0,
            quantizer,
        }
    }

    /// Number of FIFO slots.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if the FIFO has no slots. Never the case for a constructed sampler.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// References left before the next one is recorded.
    #[inline]
    pub const fn sampling_counter(&self) -> u64 {
        self.sampling_counter
    }

    /// Quantizer applied to emitted distances.
    #[inline]
    pub const fn quantizer(&self) -> &Quantizer {
        &self.quantizer
    }

    /// Observes one reference and returns the samples it completes.
    pub fn update(&mut self, thread_id: usize, pc: u64, address: Tag) -> Vec<ReuseDistanceSample> {
        let mut samples = Vec::new();

        if let Some((position, entry)) = self
            .entries
            .iter_mut()
            .enumerate()
            .find(|(_, entry)| entry.valid && entry.address == address)
        {
            entry.valid = false;
            samples.push(ReuseDistanceSample {
                leader_thread: entry.thread_id,
                follower_thread: Some(thread_id),
                pc: entry.pc,
                reuse_distance: self.quantizer.quantize(position as u64 * self.sampling_period),
            });
        }

        if self.sampling_counter == 0 {
            if let Some(victim) = self.entries.pop_back() {
                if victim.valid {
                    samples.push(ReuseDistanceSample {
                        leader_thread: victim.thread_id,
                        follower_thread: None,
                        pc: victim.pc,
                        reuse_distance: self.quantizer.max_value(),
                    });
                }
            }
            self.entries.push_front(SamplerEntry {
                thread_id,
                pc,
                address,
                valid: true,
            });
            self.sampling_counter = self.sampling_period - 1;
        } else {
            self.sampling_counter -= 1;
        }

        samples
    }
}
