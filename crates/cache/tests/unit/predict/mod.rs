/// Dead-block predictor and sampler tests.
pub mod dead_block;

/// Reuse-distance sampler tests.
pub mod reuse_distance;
