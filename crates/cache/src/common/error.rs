//! Error definitions for the cache simulator core.
//!
//! Every failure the core can report is a variant of [`CacheError`]. They fall into two groups:
//! 1. **Configuration errors:** Bad geometry, impossible set-dueling quotas, or unparsable
//!    configuration input. These are raised at construction time, before any access runs.
//! 2. **Invariant violations:** Double commits, illegal FSM transitions, and duplicate
//!    invalidations. These mean the surrounding model drove the core incorrectly, and the
//!    run that produced them should be discarded.

/// Errors raised by caches, policies, predictors and request trackers.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// The geometry cannot describe a set-associative cache.
    #[error("invalid cache geometry: {0}")]
    InvalidGeometry(String),

    /// A configuration value is out of range or inconsistent with another one.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Set dueling needs more leader sets than the cache has.
    #[error("set dueling requires {required} leader sets but the cache only has {available}")]
    InsufficientSets {
        /// Number of sets the leader quotas add up to.
        required: usize,
        /// Number of sets in the cache.
        available: usize,
    },

    /// Configuration input was not valid JSON for the expected schema.
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),

    /// Configuration file could not be read.
    #[error("failed to read configuration: {0}")]
    Io(#[from] std::io::Error),

    /// `commit()` was called on an access that was already committed.
    #[error("cache access to set {set}, way {way} was already committed")]
    AccessAlreadyCommitted {
        /// Set of the access.
        set: usize,
        /// Way of the access.
        way: usize,
    },

    /// `commit()` was called on an access that was aborted.
    #[error("cache access to set {set}, way {way} was aborted")]
    AccessAborted {
        /// Set of the access.
        set: usize,
        /// Way of the access.
        way: usize,
    },

    /// A request-tracking FSM received a condition its current state does not handle.
    #[error("no transition from state {state} on condition {condition}")]
    IllegalTransition {
        /// Name of the state the FSM was in.
        state: &'static str,
        /// Name of the condition that was fired.
        condition: &'static str,
    },

    /// A memory-write invalidation targeted a slot that was already invalid.
    #[error("line [{set}, {way}] invalidated while already invalid")]
    DuplicateInvalidate {
        /// Set of the slot.
        set: usize,
        /// Way of the slot.
        way: usize,
    },

    /// A miss fill reached a slot whose FSM had not returned to INVALID.
    #[error("line [{set}, {way}] must be invalid before a miss fill but is {state}")]
    SlotNotInvalid {
        /// Set of the slot.
        set: usize,
        /// Way of the slot.
        way: usize,
        /// Name of the state the slot was found in.
        state: &'static str,
    },
}
