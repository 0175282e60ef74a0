//! Reuse-Distance Prediction Replacement Policy.
//!
//! Each line remembers when it was last referenced (a coarse timestamp) and how long the
//! PC that referenced it usually waits before touching the same line again. On a miss the
//! victim is the line that is either furthest from its predicted next use or has sat idle
//! the longest.
//!
//! Time is measured with a high/low counter: every reference advances the low counter, and
//! every 16384 references advance the 7-bit high counter stored in the timestamps. Predicted
//! distances come from a PC-indexed predictor trained by a reuse-distance sampler that
//! watches the same reference stream.

use super::ReplacementPolicy;
use crate::cache::access::CacheAccess;
use crate::cache::geometry::CacheGeometry;
use crate::cache::mirror::PerLineMetadata;
use crate::common::constants::{
    RDP_DISTANCE_BITS, RDP_DISTANCE_QUANTUM, RDP_SAMPLING_PERIOD, RDP_TIMESTAMP_BITS, RDP_TIMESTAMP_QUANTUM,
};
use crate::common::{AccessContext, CacheError, HighLowCounter, Quantizer, Tag};
use crate::predict::{CacheBasedPredictor, ReuseDistanceSampler};

/// Per-line timestamp and prediction, both quantized.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ReuseMetadata {
    /// High-counter value at the last reference.
    pub timestamp: u64,
    /// Predicted reuse distance of the last referencing PC.
    pub predicted_reuse_distance: u64,
}

/// Reuse-distance prediction state.
#[derive(Debug)]
pub struct ReuseDistancePredictionPolicy {
    lines: PerLineMetadata<ReuseMetadata>,
    clock: HighLowCounter,
    distance_quantizer: Quantizer,
    sampler: ReuseDistanceSampler,
    predictor: CacheBasedPredictor<u64>,
}

impl ReuseDistancePredictionPolicy {
    /// Creates the policy with an empty sampler and predictor.
    ///
    /// # Returns
    ///
    /// The policy, or the error raised while shaping its predictor table.
    pub fn new(geometry: &CacheGeometry) -> Result<Self, CacheError> {
        let distance_quantizer = Quantizer::new(RDP_DISTANCE_BITS, RDP_DISTANCE_QUANTUM);
        let max_reuse_distance = (distance_quantizer.max_value() + 1) * distance_quantizer.quantum();
        Ok(Self {
            lines: PerLineMetadata::new(geometry, ReuseMetadata::default()),
            clock: HighLowCounter::new(RDP_TIMESTAMP_BITS, RDP_TIMESTAMP_QUANTUM),
            distance_quantizer,
            sampler: ReuseDistanceSampler::new(RDP_SAMPLING_PERIOD, max_reuse_distance, distance_quantizer),
            predictor: CacheBasedPredictor::new("reuseDistancePredictor", geometry.line_size())?,
        })
    }

    /// Metadata recorded for the line in `(set, way)`.
    #[inline]
    pub fn metadata(&self, set: usize, way: usize) -> ReuseMetadata {
        *self.lines.get(set, way)
    }

    /// Reference clock.
    #[inline]
    pub const fn clock(&self) -> &HighLowCounter {
        &self.clock
    }

    /// PC-indexed reuse-distance predictor.
    #[inline]
    pub const fn predictor(&self) -> &CacheBasedPredictor<u64> {
        &self.predictor
    }

    fn handle_reference(&mut self, access: &CacheAccess) {
        self.clock.increment();

        let context = access.context();
        for sample in self.sampler.update(context.thread_id, context.pc, access.tag()) {
            if let Err(error) = self.predictor.update(sample.pc, sample.reuse_distance) {
                tracing::warn!(pc = sample.pc, %error, "reuse distance predictor update failed");
            }
        }

        let predicted_reuse_distance = self.predictor.predict(context.pc, 0);
        *self.lines.get_mut(access.set(), access.way()) = ReuseMetadata {
            timestamp: self.clock.high(),
            predicted_reuse_distance,
        };
    }
}

impl ReplacementPolicy for ReuseDistancePredictionPolicy {
    fn name(&self) -> &'static str {
        "reuseDistancePrediction"
    }

    /// Picks the way with the largest remaining time to predicted reuse or idle time.
    ///
    /// A timestamp ahead of the high counter belongs to the previous lap of the wrapping
    /// clock, so "now" is moved one lap forward for that line.
    fn handle_replacement(&self, _context: &AccessContext, set: usize, _tag: Tag) -> usize {
        let timestamps = self.clock.timestamp_quantizer();
        let high = self.clock.high();
        let mut victim_time = 0;
        let mut victim_way = 0;

        for (way, line) in self.lines.set_entries(set).iter().enumerate() {
            let lap = if line.timestamp > high {
                timestamps.max_value() + 1
            } else {
                0
            };
            let now = timestamps.unquantize(high + lap);
            let raw_timestamp = timestamps.unquantize(line.timestamp);
            let reuse_distance = self.distance_quantizer.unquantize(line.predicted_reuse_distance);

            let time_left = (raw_timestamp + reuse_distance).saturating_sub(now);
            if time_left > victim_time {
                victim_time = time_left;
                victim_way = way;
            }

            let time_idle = now.saturating_sub(raw_timestamp);
            if time_idle > victim_time {
                victim_time = time_idle;
                victim_way = way;
            }
        }

        victim_way
    }

    fn handle_promotion_on_hit(&mut self, access: &CacheAccess) {
        self.handle_reference(access);
    }

    fn handle_insertion_on_miss(&mut self, access: &CacheAccess) {
        self.handle_reference(access);
    }
}
