//! Predictors used by replacement policies.
//!
//! This module contains the sampling structures and prediction tables behind the
//! prediction-driven policies. It provides:
//! 1. **Dead-Block Prediction:** A skewed three-table predictor trained by a small sampler
//!    that mirrors every eighth cache set.
//! 2. **Reuse-Distance Sampling:** A FIFO of sampled references that measures how many
//!    references pass before an address is touched again.
//! 3. **Cache-Based Prediction:** A PC-indexed, LRU-managed table of values with confidence
//!    counters, built on the crate's own cache.

/// PC-indexed value predictor backed by a small cache.
pub mod cache_based;

/// Dead-block predictor and its training sampler.
pub mod dead_block;

/// Reuse-distance sampler.
pub mod reuse_distance;

pub use cache_based::{CacheBasedPredictor, PredictorEntry};
pub use dead_block::{DeadBlockPredictionSampler, DeadBlockPredictor};
pub use reuse_distance::{ReuseDistanceSample, ReuseDistanceSampler};
