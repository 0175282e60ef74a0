//! Fixed-width counters.
//!
//! Hardware predictors and duelling monitors are built from a handful of small counters:
//! 1. **Saturating Counters:** Clamp at both ends; the thresholded variant reports a
//!    taken/not-taken decision.
//! 2. **Interval Counters:** Count events and keep the total of the last closed interval.
//! 3. **High/Low Counters:** A coarse wrapping clock driven by a fine reference counter.

use super::quantizer::Quantizer;

/// Saturating counter with a taken threshold.
///
/// `update(true)` moves towards `max`, `update(false)` towards `min`. The counter is
/// "taken" while its value is at or above `threshold`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SaturatingCounter {
    min: u32,
    threshold: u32,
    max: u32,
    initial: u32,
    value: u32,
}

impl SaturatingCounter {
    /// Creates a counter holding `initial`, clamped into `[min, max]`.
    pub fn new(min: u32, threshold: u32, max: u32, initial: u32) -> Self {
        let initial = initial.clamp(min, max);
        Self {
            min,
            threshold,
            max,
            initial,
            value: initial,
        }
    }

    /// Increments on `taken`, decrements otherwise.
    #[inline]
    pub const fn update(&mut self, taken: bool) {
        if taken {
            if self.value < self.max {
                self.value += 1;
            }
        } else if self.value > self.min {
            self.value -= 1;
        }
    }

    /// True while the value is at or above the threshold.
    #[inline]
    pub const fn is_taken(&self) -> bool {
        self.value >= self.threshold
    }

    /// Current value.
    #[inline]
    pub const fn value(&self) -> u32 {
        self.value
    }

    /// Restores the initial value.
    #[inline]
    pub const fn reset(&mut self) {
        self.value = self.initial;
    }
}

/// Saturating counter without a decision threshold.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NoThresholdSaturatingCounter {
    min: u32,
    max: u32,
    initial: u32,
    value: u32,
}

impl NoThresholdSaturatingCounter {
    /// Creates a counter holding `initial`, clamped into `[min, max]`.
    pub fn new(min: u32, max: u32, initial: u32) -> Self {
        let initial = initial.clamp(min, max);
        Self {
            min,
            max,
            initial,
            value: initial,
        }
    }

    /// Adds one unless saturated at `max`.
    #[inline]
    pub const fn increment(&mut self) {
        if self.value < self.max {
            self.value += 1;
        }
    }

    /// Subtracts one unless saturated at `min`.
    #[inline]
    pub const fn decrement(&mut self) {
        if self.value > self.min {
            self.value -= 1;
        }
    }

    /// Halves the value, never going below `min`.
    #[inline]
    pub fn decrement_exponentially(&mut self) {
        self.value = (self.value >> 1).max(self.min);
    }

    /// Overwrites the value, clamped into `[min, max]`.
    #[inline]
    pub fn set_value(&mut self, value: u32) {
        self.value = value.clamp(self.min, self.max);
    }

    /// Current value.
    #[inline]
    pub const fn value(&self) -> u32 {
        self.value
    }

    /// Upper saturation bound.
    #[inline]
    pub const fn max(&self) -> u32 {
        self.max
    }

    /// Restores the initial value.
    #[inline]
    pub const fn reset(&mut self) {
        self.value = self.initial;
    }
}

/// Event counter split into intervals.
///
/// `value()` is the running count of the open interval; `last_interval_value()` is the
/// total of the most recently closed one. Decisions are made on closed intervals so that
/// every candidate is compared over the same window.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct IntervalCounter {
    value: u64,
    last_interval_value: u64,
}

impl IntervalCounter {
    /// Creates a zeroed counter.
    pub const fn new() -> Self {
        Self {
            value: 0,
            last_interval_value: 0,
        }
    }

    /// Counts one event in the open interval.
    #[inline]
    pub const fn increment(&mut self) {
        self.value += 1;
    }

    /// Closes the open interval: snapshots its total and starts counting from zero.
    #[inline]
    pub const fn new_interval(&mut self) {
        self.last_interval_value = self.value;
        self.value = 0;
    }

    /// Running count of the open interval.
    #[inline]
    pub const fn value(&self) -> u64 {
        self.value
    }

    /// Total of the last closed interval.
    #[inline]
    pub const fn last_interval_value(&self) -> u64 {
        self.last_interval_value
    }
}

/// Coarse wrapping clock.
///
/// The low counter counts references up to the timestamp quantum; each time it fills, the
/// high counter advances by one and wraps to zero after the quantizer's maximum. The high
/// counter is the quantized "now" stored in per-line timestamps.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HighLowCounter {
    timestamp_quantizer: Quantizer,
    low: u64,
    high: u64,
}

impl HighLowCounter {
    /// Creates a clock with a `high_bits`-wide high counter ticking every `quantum` references.
    pub const fn new(high_bits: u32, quantum: u64) -> Self {
        Self {
            timestamp_quantizer: Quantizer::new(high_bits, quantum),
            low: 0,
            high: 0,
        }
    }

    /// Advances the clock by one reference.
    pub const fn increment(&mut self) {
        self.low += 1;
        if self.low >= self.timestamp_quantizer.quantum() {
            self.low = 0;
            self.high += 1;
            if self.high > self.timestamp_quantizer.max_value() {
                self.high = 0;
            }
        }
    }

    /// Current value of the high counter.
    #[inline]
    pub const fn high(&self) -> u64 {
        self.high
    }

    /// Current value of the low counter.
    #[inline]
    pub const fn low(&self) -> u64 {
        self.low
    }

    /// Quantizer relating high-counter ticks to raw reference counts.
    #[inline]
    pub const fn timestamp_quantizer(&self) -> &Quantizer {
        &self.timestamp_quantizer
    }
}
