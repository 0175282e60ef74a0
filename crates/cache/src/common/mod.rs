//! Common utilities and types used throughout the cache simulator core.
//!
//! This module provides the leaf building blocks shared by caches, policies and trackers.
//! It includes:
//! 1. **Constants:** Table dimensions, quantizer widths and the shared random seed.
//! 2. **Counters:** Saturating, interval and high/low counters.
//! 3. **Memory Access:** Access types, requester context and the tag type.
//! 4. **Error Handling:** The crate-wide [`CacheError`].
//! 5. **Numeric Helpers:** Bucket quantization and a seeded pseudo-random generator.

/// Common constants used throughout the simulator.
pub mod constants;

/// Saturating, interval and high/low counters.
pub mod counter;

/// Memory access type definitions.
pub mod data;

/// Error types.
pub mod error;

/// Bucket quantization.
pub mod quantizer;

/// Seeded xorshift generator.
pub mod rng;

pub use counter::{HighLowCounter, IntervalCounter, NoThresholdSaturatingCounter, SaturatingCounter};
pub use data::{AccessContext, AccessType, Tag};
pub use error::CacheError;
pub use quantizer::Quantizer;
pub use rng::XorShiftRng;
