//! Dead-Block Predictor.
//!
//! Three tables of 2-bit saturating counters, each indexed by a different hash of the
//! requesting thread and a 16-bit trace of the PC. Training increments all three counters
//! when a sampled block died and decrements them when it was reused. A block is predicted
//! dead when the three counters sum to the threshold or more.
//!
//! Decrements differ per table: odd tables halve their counter, even tables subtract one.
//! This skews the tables so that a single reuse quickly silences a table that had been
//! voting "dead".

/// Sampler that trains the predictor.
pub mod sampler;

pub use sampler::DeadBlockPredictionSampler;

use crate::common::NoThresholdSaturatingCounter;
use crate::common::constants::{DBP_COUNTER_MAX, DBP_INDEX_BITS, DBP_NUM_TABLES, DBP_PARTIAL_MASK, DBP_THRESHOLD};

/// Skewed dead-block prediction tables.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeadBlockPredictor {
    tables: Vec<Vec<NoThresholdSaturatingCounter>>,
    index_mask: u32,
}

impl Default for DeadBlockPredictor {
    fn default() -> Self {
        Self::new(DBP_COUNTER_MAX, DBP_INDEX_BITS)
    }
}

impl DeadBlockPredictor {
    /// Creates zeroed tables of `2^index_bits` counters saturating at `counter_max`.
    pub fn new(counter_max: u32, index_bits: u32) -> Self {
        let counter = NoThresholdSaturatingCounter::new(0, counter_max, 0);
        Self {
            tables: vec![vec![counter; 1 << index_bits]; DBP_NUM_TABLES],
            index_mask: (1 << index_bits) - 1,
        }
    }

    /// Trains every table on the fate of a block last touched by `trace`.
    pub fn update(&mut self, thread_id: usize, trace: u32, dead: bool) {
        for table in 0..self.tables.len() {
            let index = self.index(thread_id, trace, table);
            let counter = &mut self.tables[table][index];
            if dead {
                counter.increment();
            } else if table % 2 == 1 {
                counter.decrement_exponentially();
            } else {
                counter.decrement();
            }
        }
    }

    /// True if a block last touched by `trace` is predicted dead.
    pub fn predict(&self, thread_id: usize, trace: u32) -> bool {
        self.confidence(thread_id, trace) >= DBP_THRESHOLD
    }

    /// Sum of the three counters selected by `(thread_id, trace)`.
    pub fn confidence(&self, thread_id: usize, trace: u32) -> u32 {
        (0..self.tables.len())
            .map(|table| self.tables[table][self.index(thread_id, trace, table)].value())
            .sum()
    }

    fn index(&self, thread_id: usize, trace: u32, table: usize) -> usize {
        let x = (trace as i32) ^ ((thread_id as i32) << 2);
        (skew_hash(x, table as u32) as u32 & self.index_mask) as usize
    }
}

/// Keeps the low 16 bits of `pc`.
#[inline]
pub const fn make_trace(pc: u64) -> u32 {
    (pc & DBP_PARTIAL_MASK) as u32
}

// Jenkins-style three-word mix over 32-bit two's-complement words. Right shifts are
// arithmetic.
const fn mix(mut a: i32, mut b: i32, mut c: i32) -> i32 {
    a = a.wrapping_sub(b);
    a = a.wrapping_sub(c);
    a ^= c >> 13;
    b = b.wrapping_sub(c);
    b = b.wrapping_sub(a);
    b ^= a.wrapping_shl(8);
    c = c.wrapping_sub(a);
    c = c.wrapping_sub(b);
    c ^= b >> 13;
    c
}

const fn f1(x: i32) -> i32 {
    mix(0xfeed_face_u32 as i32, 0xdead_b10c_u32 as i32, x)
}

const fn f2(x: i32) -> i32 {
    mix(0xc001_d00d_u32 as i32, 0xfade_2b1c_u32 as i32, x)
}

const fn skew_hash(x: i32, table: u32) -> i32 {
    f1(x).wrapping_add(f2(x) >> table)
}
