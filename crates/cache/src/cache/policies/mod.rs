//! Cache Replacement Policies.
//!
//! Implements the algorithms that pick victim lines and maintain per-line metadata.
//!
//! # Policies
//!
//! - `Lru`: Least Recently Used (stack based).
//! - `Lfu`: Least Frequently Used.
//! - `Random`: Seeded uniform random selection.
//! - `DeadBlockPredictionLru`: LRU steered by a sampling dead-block predictor.
//! - `ReuseDistancePrediction`: Evicts by predicted reuse distance and idle time.
//! - `RereferenceIntervalPrediction`: RRIP with dynamic insertion.
//! - `HelperThreadAwareLru`: LRU that demotes consumed helper-thread prefetches.
//! - `SetDueling`: Per-set choice among candidate policies.
//!
//! Victim selection never mutates a policy. All state changes happen when an access is
//! committed, so aborting an access leaves the policy exactly as it was.

/// Dead-block-prediction LRU.
pub mod dead_block;

/// Helper-thread-aware LRU.
pub mod helper_thread_lru;

/// Least Frequently Used replacement policy.
pub mod lfu;

/// Least Recently Used replacement policy.
pub mod lru;

/// Random replacement policy.
pub mod random;

/// Reuse-distance prediction replacement policy.
pub mod reuse_distance;

/// Re-reference interval prediction replacement policy.
pub mod rrip;

/// Set-dueling composite policy.
pub mod set_dueling;

pub use dead_block::DeadBlockPredictionLruPolicy;
pub use helper_thread_lru::HelperThreadAwareLruPolicy;
pub use lfu::LfuPolicy;
pub use lru::LruPolicy;
pub use random::RandomPolicy;
pub use reuse_distance::ReuseDistancePredictionPolicy;
pub use rrip::RereferenceIntervalPredictionPolicy;
pub use set_dueling::SetDuelingPolicy;

use super::access::CacheAccess;
use super::geometry::CacheGeometry;
use crate::common::{AccessContext, CacheError, Tag};
use crate::config::{CacheConfig, ReplacementPolicy as PolicyType};
use crate::stats::{StatEvent, StatsMap};

/// Out-of-band information a policy may learn from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PolicyFeedback {
    /// A helper-thread request filled into `set` has been classified.
    HelperThreadRequest {
        /// Set the request was filled into.
        set: usize,
        /// Thread that issued the request.
        thread_id: usize,
        /// True if the main thread used the prefetched line.
        useful: bool,
    },
    /// One simulated cycle has elapsed.
    CycleElapsed,
}

/// Trait for cache replacement policies.
///
/// Defines the interface for selecting victims and updating per-line metadata.
pub trait ReplacementPolicy: Send + Sync {
    /// Identifier used in logs.
    fn name(&self) -> &'static str;

    /// Selects the way to fill for a miss on `tag` in `set`.
    ///
    /// # Arguments
    ///
    /// * `context` - Requester of the missing access.
    /// * `set` - The cache set index.
    /// * `tag` - Tag of the line being brought in.
    ///
    /// # Returns
    ///
    /// The index of the way to fill.
    fn handle_replacement(&self, context: &AccessContext, set: usize, tag: Tag) -> usize;

    /// Updates metadata for a committed hit on `access.way()`.
    fn handle_promotion_on_hit(&mut self, access: &CacheAccess);

    /// Updates metadata for a committed miss filling `access.way()`.
    fn handle_insertion_on_miss(&mut self, access: &CacheAccess);

    /// Consumes feedback. Most policies ignore it.
    fn handle_feedback(&mut self, feedback: &PolicyFeedback) {
        let _ = feedback;
    }

    /// Reacts to a statistics request. Policies without statistics publish nothing.
    fn handle_stat_event(&mut self, event: StatEvent, stats: &mut StatsMap) -> Result<(), CacheError> {
        let _ = (event, stats);
        Ok(())
    }
}

/// Builds the policy named by `config.policy` for a cache of shape `geometry`.
///
/// # Returns
///
/// The boxed policy, or a configuration error (for example a set-dueling setup that needs
/// more leader sets than the cache has).
pub fn build_policy(config: &CacheConfig, geometry: &CacheGeometry) -> Result<Box<dyn ReplacementPolicy>, CacheError> {
    match config.policy {
        PolicyType::SetDueling => {
            let candidates = config
                .set_dueling
                .candidates
                .iter()
                .map(|&kind| build_candidate(kind, config, geometry))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Box::new(SetDuelingPolicy::new(
                &config.name,
                geometry,
                config.num_threads,
                &config.set_dueling,
                candidates,
            )?))
        }
        kind => build_candidate(kind, config, geometry),
    }
}

fn build_candidate(
    kind: PolicyType,
    config: &CacheConfig,
    geometry: &CacheGeometry,
) -> Result<Box<dyn ReplacementPolicy>, CacheError> {
    let policy: Box<dyn ReplacementPolicy> = match kind {
        PolicyType::Lru => Box::new(LruPolicy::new(geometry)),
        PolicyType::Lfu => Box::new(LfuPolicy::new(geometry)),
        PolicyType::Random => Box::new(RandomPolicy::new(geometry)),
        PolicyType::DeadBlockPredictionLru => Box::new(DeadBlockPredictionLruPolicy::new(geometry)),
        PolicyType::ReuseDistancePrediction => Box::new(ReuseDistancePredictionPolicy::new(geometry)?),
        PolicyType::RereferenceIntervalPrediction => Box::new(RereferenceIntervalPredictionPolicy::new(
            geometry,
            config.num_threads,
            &config.dip,
        )?),
        PolicyType::HelperThreadAwareLru => Box::new(HelperThreadAwareLruPolicy::new(geometry)),
        PolicyType::SetDueling => {
            return Err(CacheError::InvalidConfig(
                "set dueling cannot be nested inside set dueling".to_owned(),
            ));
        }
    };
    Ok(policy)
}
