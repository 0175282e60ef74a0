//! Global Simulator Constants.
//!
//! This module defines constants shared across the cache core. It includes:
//! 1. **Reproducibility:** The seed every pseudo-random component starts from.
//! 2. **Dead-Block Prediction:** Sampler and predictor table dimensions.
//! 3. **Reuse-Distance Prediction:** Quantizer widths, quanta and the sampling period.

/// Seed shared by every seeded pseudo-random generator in the core.
pub const RANDOM_SEED: u64 = 13;

/// Number of tables in the dead-block predictor.
pub const DBP_NUM_TABLES: usize = 3;

/// Index bits per dead-block predictor table (4096 entries each).
pub const DBP_INDEX_BITS: u32 = 12;

/// Maximum value of a dead-block predictor counter (2-bit counters).
pub const DBP_COUNTER_MAX: u32 = (1 << 2) - 1;

/// Confidence sum at or above which a block is predicted dead.
pub const DBP_THRESHOLD: u32 = 8;

/// Associativity of the dead-block prediction sampler.
pub const DBP_SAMPLER_ASSOCIATIVITY: usize = 12;

/// Only every `DBP_SAMPLER_MODULUS`-th cache set is mirrored in the sampler.
pub const DBP_SAMPLER_MODULUS: usize = 8;

/// Mask keeping the partial tag and trace bits stored by the sampler (16 bits each).
pub const DBP_PARTIAL_MASK: u64 = 0xFFFF;

/// Width of the high (timestamp) part of the reuse-distance clock.
pub const RDP_TIMESTAMP_BITS: u32 = 7;

/// References per tick of the reuse-distance clock's high counter.
pub const RDP_TIMESTAMP_QUANTUM: u64 = 16384;

/// Width of a quantized reuse distance.
pub const RDP_DISTANCE_BITS: u32 = 15;

/// Quantum of a quantized reuse distance.
pub const RDP_DISTANCE_QUANTUM: u64 = 8192;

/// References between two samples taken by the reuse-distance sampler.
pub const RDP_SAMPLING_PERIOD: u64 = 4096;

/// Sets in a PC-indexed cache-based predictor.
pub const PREDICTOR_SETS: usize = 16;

/// Ways in a PC-indexed cache-based predictor.
pub const PREDICTOR_WAYS: usize = 16;

/// Maximum re-reference prediction value for RRIP (3-bit counters).
pub const RRIP_MAX: u32 = (1 << 3) - 1;
