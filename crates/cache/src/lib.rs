//! Multicore cache-hierarchy simulator core.
//!
//! This crate implements the cache-side machinery of a cycle-accurate multicore simulator:
//! 1. **Cache:** Set-associative line storage with two-phase (commit/abort) accesses.
//! 2. **Replacement:** LRU, LFU, Random, dead-block-prediction LRU, reuse-distance
//!    prediction, RRIP, helper-thread-aware LRU and set-dueling composites.
//! 3. **Prediction:** Dead-block and reuse-distance predictors with their samplers.
//! 4. **Set Dueling:** Leader-set assignment, interval scoring and dynamic insertion.
//! 5. **Tracking:** Per-line state machines classifying helper-thread prefetches.
//! 6. **Statistics:** A flat, string-keyed stat map filled on reset/poll/dump events.

/// Set-associative caches, access transactions and replacement policies.
pub mod cache;
/// Common types and helpers (access context, counters, errors, seeded RNG).
pub mod common;
/// Cache core configuration (defaults, enums, JSON loading).
pub mod config;
/// Set-dueling unit and dynamic insertion policy.
pub mod dueling;
/// Dead-block and reuse-distance predictors.
pub mod predict;
/// Statistics collection and reporting.
pub mod stats;
/// Helper-thread request tracking state machines.
pub mod tracking;

/// Generic cache; build one with `Cache::new` or `Cache::from_config`.
pub use crate::cache::Cache;
/// Root configuration type; use `Config::default()` or deserialize from JSON.
pub use crate::config::Config;
/// Crate-wide error type.
pub use crate::common::CacheError;
