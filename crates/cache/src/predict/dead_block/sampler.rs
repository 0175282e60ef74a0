//! Dead-Block Prediction Sampler.
//!
//! A 12-way tag array shadowing one cache set out of every eight. Sampled references train
//! the predictor: a sampler hit means the block's previous trace led to a reuse, and a
//! sampler eviction means it led to a dead block. The sampler keeps its own LRU stack
//! positions, so the predictor learns from a fixed-size history regardless of how the main
//! cache replaces lines.

use super::{DeadBlockPredictor, make_trace};
use crate::common::Tag;
use crate::common::constants::{DBP_PARTIAL_MASK, DBP_SAMPLER_ASSOCIATIVITY, DBP_SAMPLER_MODULUS};

/// One sampler way.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SamplerEntry {
    /// Stack position; 0 is MRU.
    pub lru_position: usize,
    /// Low 16 bits of the sampled tag.
    pub partial_tag: u64,
    /// Trace of the last reference.
    pub trace: u32,
    /// Prediction made at the last reference.
    pub dead: bool,
    /// True once the way has been filled.
    pub valid: bool,
}

impl SamplerEntry {
    const fn new(lru_position: usize) -> Self {
        Self {
            lru_position,
            partial_tag: 0,
            trace: 0,
            dead: false,
            valid: false,
        }
    }
}

/// Sampler sets and the predictor they train.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeadBlockPredictionSampler {
    sets: Vec<Vec<SamplerEntry>>,
    predictor: DeadBlockPredictor,
}

impl DeadBlockPredictionSampler {
    /// Creates a sampler for a parent cache with `parent_sets` sets.
    ///
    /// A parent with fewer than eight sets still gets one sampler set.
    pub fn new(parent_sets: usize) -> Self {
        let num_sets = (parent_sets / DBP_SAMPLER_MODULUS).max(1);
        let set: Vec<_> = (0..DBP_SAMPLER_ASSOCIATIVITY).map(SamplerEntry::new).collect();
        Self {
            sets: vec![set; num_sets],
            predictor: DeadBlockPredictor::default(),
        }
    }

    /// Number of sampler sets.
    #[inline]
    pub fn num_sets(&self) -> usize {
        self.sets.len()
    }

    /// Sampler set mirroring parent set `set`, if that set is sampled.
    #[inline]
    pub fn sampler_set(&self, set: usize) -> Option<usize> {
        (set % DBP_SAMPLER_MODULUS == 0)
            .then_some(set / DBP_SAMPLER_MODULUS)
            .filter(|&sampler_set| sampler_set < self.sets.len())
    }

    /// Entries of sampler set `set`, indexed by way.
    #[inline]
    pub fn entries(&self, set: usize) -> &[SamplerEntry] {
        &self.sets[set]
    }

    /// Predictor trained by this sampler.
    #[inline]
    pub const fn predictor(&self) -> &DeadBlockPredictor {
        &self.predictor
    }

    /// Records a reference to `tag` from `pc` in sampler set `set`.
    ///
    /// A matching way trains "not dead" on its old trace. Otherwise a victim is chosen
    /// (first invalid way, then first predicted-dead way, then the LRU way), trained "dead"
    /// on its old trace and refilled. Either way the entry takes the new trace, a fresh
    /// prediction and the MRU position.
    pub fn access(&mut self, set: usize, thread_id: usize, pc: u64, tag: Tag) {
        let partial_tag = tag & DBP_PARTIAL_MASK;
        let entries = &mut self.sets[set];

        let way = if let Some(way) = entries
            .iter()
            .position(|entry| entry.valid && entry.partial_tag == partial_tag)
        {
            self.predictor.update(thread_id, entries[way].trace, false);
            way
        } else {
            let way = entries
                .iter()
                .position(|entry| !entry.valid)
                .or_else(|| entries.iter().position(|entry| entry.dead))
                .or_else(|| {
                    entries
                        .iter()
                        .position(|entry| entry.lru_position == DBP_SAMPLER_ASSOCIATIVITY - 1)
                })
                .unwrap_or(DBP_SAMPLER_ASSOCIATIVITY - 1);
            self.predictor.update(thread_id, entries[way].trace, true);
            entries[way].partial_tag = partial_tag;
            entries[way].valid = true;
            way
        };

        let trace = make_trace(pc);
        let entry = &mut entries[way];
        entry.trace = trace;
        entry.dead = self.predictor.predict(thread_id, trace);

        let position = entry.lru_position;
        for entry in entries.iter_mut() {
            if entry.lru_position < position {
                entry.lru_position += 1;
            }
        }
        entries[way].lru_position = 0;
    }
}
