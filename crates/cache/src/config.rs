//! Configuration system for the cache simulator core.
//!
//! This module defines all configuration structures and enums used to parameterize
//! the core. It provides:
//! 1. **Defaults:** Baseline geometry, set-dueling and insertion-policy constants.
//! 2. **Structures:** Cache, set-dueling, dynamic-insertion and request-tracking configs.
//! 3. **Enums:** Replacement policy, duelling criterion and classification scheme types.
//!
//! Configuration is supplied as JSON by the simulation driver, or use `Config::default()`.

use std::path::Path;

use serde::Deserialize;

use crate::common::CacheError;

/// Default configuration constants for the cache core.
///
/// These values define the baseline last-level cache when not explicitly overridden.
mod defaults {
    /// Default cache name, used as the prefix of every published stat.
    pub const CACHE_NAME: &str = "l2";

    /// Default cache size in bytes (1 MiB).
    pub const CACHE_SIZE: usize = 1024 * 1024;

    /// Default cache line size in bytes (64 bytes).
    pub const CACHE_LINE: usize = 64;

    /// Default cache associativity (8 ways).
    pub const CACHE_WAYS: usize = 8;

    /// Default number of hardware threads sharing the cache.
    pub const NUM_THREADS: usize = 2;

    /// Default number of leader sets per set-dueling monitor.
    pub const SETS_PER_MONITOR: usize = 32;

    /// Default cycles per interval for the main-thread-miss duelling criterion.
    pub const CYCLES_PER_INTERVAL: u64 = 5_000_000;

    /// Default maximum of the DIP policy selection counter.
    ///
    /// The counter saturates at half this value, which is also its taken threshold.
    pub const PSEL_MAX: u32 = 1024;

    /// Default number of leader sets per DIP monitor.
    pub const SDM_SIZE: usize = 32;

    /// Default bimodal throttle: a bimodal fill inserts normally when a roll in
    /// `[0, 100)` is at or below this value.
    pub const BIMODAL_THROTTLE: usize = 5;
}

/// Cache replacement policy algorithms.
///
/// Specifies the algorithm used to select which cache line to evict
/// when a new line must be installed in a full cache set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplacementPolicy {
    /// Least Recently Used replacement policy.
    #[default]
    Lru,
    /// Least Frequently Used replacement policy.
    Lfu,
    /// Seeded uniform random replacement.
    Random,
    /// LRU that evicts lines predicted dead first and inserts predicted-dead lines at LRU.
    DeadBlockPredictionLru,
    /// Evicts the line whose predicted reuse is furthest away or that has idled longest.
    ReuseDistancePrediction,
    /// Re-reference interval prediction with dynamic (normal/bimodal) insertion.
    RereferenceIntervalPrediction,
    /// LRU that demotes helper-thread lines once the main thread has used them.
    HelperThreadAwareLru,
    /// Per-set choice among several candidate policies, arbitrated by set dueling.
    SetDueling,
}

impl ReplacementPolicy {
    /// Stable identifier used in logs and stat keys.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Lru => "lru",
            Self::Lfu => "lfu",
            Self::Random => "random",
            Self::DeadBlockPredictionLru => "deadBlockPredictionLru",
            Self::ReuseDistancePrediction => "reuseDistancePrediction",
            Self::RereferenceIntervalPrediction => "rereferenceIntervalPrediction",
            Self::HelperThreadAwareLru => "helperThreadAwareLru",
            Self::SetDueling => "setDueling",
        }
    }
}

/// How a set-dueling unit decides which candidate policy is best.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuelingCriterion {
    /// Highest ratio of useful to total helper-thread requests in the leader sets.
    /// Intervals close after `num_sets * associativity / 2` evictions.
    #[default]
    HelperThreadUsefulness,
    /// Fewest main-thread misses in the leader sets.
    /// Intervals close after a fixed number of cycles.
    MainThreadMisses,
}

/// Naming scheme for helper-thread request classifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackingScheme {
    /// good / bad / ugly / unused.
    #[default]
    GoodBadUgly,
    /// used / polluting / usedPolluting / unused.
    UsedPolluting,
}

/// Root configuration for the cache core.
///
/// # Examples
///
/// ```
/// use cachesim_core::config::{Config, ReplacementPolicy, TrackingScheme};
///
/// let json = r#"{
///     "llc": {
///         "name": "l2",
///         "size_bytes": 65536,
///         "ways": 4,
///         "policy": "set_dueling",
///         "set_dueling": { "candidates": ["lru", "random"] }
///     },
///     "tracking": { "scheme": "used_polluting" }
/// }"#;
///
/// let config = Config::from_json(json).unwrap();
/// assert_eq!(config.llc.size_bytes, 65536);
/// assert_eq!(config.llc.policy, ReplacementPolicy::SetDueling);
/// assert_eq!(config.tracking.scheme, TrackingScheme::UsedPolluting);
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Last-level cache configuration.
    #[serde(default)]
    pub llc: CacheConfig,
    /// Helper-thread request tracking configuration.
    #[serde(default)]
    pub tracking: TrackingConfig,
}

impl Config {
    /// Parses and validates a JSON configuration.
    pub fn from_json(json: &str) -> Result<Self, CacheError> {
        let config: Self = serde_json::from_str(json)?;
        config.llc.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a JSON configuration file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, CacheError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }
}

/// Individual cache configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    /// Cache name, used as the prefix of published stats
    #[serde(default = "CacheConfig::default_name")]
    pub name: String,

    /// Total cache size in bytes
    #[serde(default = "CacheConfig::default_size")]
    pub size_bytes: usize,

    /// Cache line size in bytes
    #[serde(default = "CacheConfig::default_line")]
    pub line_bytes: usize,

    /// Associativity (number of ways)
    #[serde(default = "CacheConfig::default_ways")]
    pub ways: usize,

    /// Hardware threads sharing the cache
    #[serde(default = "CacheConfig::default_threads")]
    pub num_threads: usize,

    /// Replacement policy
    #[serde(default)]
    pub policy: ReplacementPolicy,

    /// Set-dueling parameters (used by `set_dueling`)
    #[serde(default)]
    pub set_dueling: SetDuelingConfig,

    /// Dynamic insertion parameters (used by `rereference_interval_prediction`)
    #[serde(default)]
    pub dip: DipConfig,
}

impl CacheConfig {
    /// Returns the default cache name.
    fn default_name() -> String {
        defaults::CACHE_NAME.to_owned()
    }

    /// Returns the default cache size in bytes.
    const fn default_size() -> usize {
        defaults::CACHE_SIZE
    }

    /// Returns the default cache line size in bytes.
    const fn default_line() -> usize {
        defaults::CACHE_LINE
    }

    /// Returns the default cache associativity (number of ways).
    const fn default_ways() -> usize {
        defaults::CACHE_WAYS
    }

    /// Returns the default number of hardware threads.
    const fn default_threads() -> usize {
        defaults::NUM_THREADS
    }

    /// Checks values that cannot be expressed in the type system.
    ///
    /// Geometry itself is validated again when the cache is built; this catches the
    /// policy-level mistakes early, before anything is allocated.
    pub fn validate(&self) -> Result<(), CacheError> {
        if self.size_bytes == 0 || self.ways == 0 || self.line_bytes == 0 {
            return Err(CacheError::InvalidConfig(format!(
                "cache '{}' must have non-zero size, ways and line size",
                self.name
            )));
        }
        if !self.line_bytes.is_power_of_two() {
            return Err(CacheError::InvalidConfig(format!(
                "cache '{}' line size {} is not a power of two",
                self.name, self.line_bytes
            )));
        }
        if self.num_threads == 0 {
            return Err(CacheError::InvalidConfig(format!(
                "cache '{}' must be shared by at least one thread",
                self.name
            )));
        }
        if self.policy == ReplacementPolicy::SetDueling {
            if self.set_dueling.candidates.is_empty() {
                return Err(CacheError::InvalidConfig(
                    "set dueling needs at least one candidate policy".to_owned(),
                ));
            }
            if self.set_dueling.candidates.contains(&ReplacementPolicy::SetDueling) {
                return Err(CacheError::InvalidConfig(
                    "set dueling cannot list itself as a candidate".to_owned(),
                ));
            }
        }
        Ok(())
    }
}

impl Default for CacheConfig {
    /// Creates a default cache configuration.
    ///
    /// A 1 MiB, 8-way, 64-byte-line LRU cache shared by two threads.
    fn default() -> Self {
        Self {
            name: defaults::CACHE_NAME.to_owned(),
            size_bytes: defaults::CACHE_SIZE,
            line_bytes: defaults::CACHE_LINE,
            ways: defaults::CACHE_WAYS,
            num_threads: defaults::NUM_THREADS,
            policy: ReplacementPolicy::default(),
            set_dueling: SetDuelingConfig::default(),
            dip: DipConfig::default(),
        }
    }
}

/// Set-dueling configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct SetDuelingConfig {
    /// Candidate policies; the position in this list is the policy id
    #[serde(default = "SetDuelingConfig::default_candidates")]
    pub candidates: Vec<ReplacementPolicy>,

    /// Leader sets per (thread, policy) monitor
    #[serde(default = "SetDuelingConfig::default_sets_per_monitor")]
    pub sets_per_monitor: usize,

    /// How the best policy is chosen
    #[serde(default)]
    pub criterion: DuelingCriterion,

    /// Interval length in cycles for `main_thread_misses`
    #[serde(default = "SetDuelingConfig::default_cycles_per_interval")]
    pub cycles_per_interval: u64,
}

impl SetDuelingConfig {
    /// Returns the default candidates (LRU against dead-block-prediction LRU).
    fn default_candidates() -> Vec<ReplacementPolicy> {
        vec![ReplacementPolicy::Lru, ReplacementPolicy::DeadBlockPredictionLru]
    }

    /// Returns the default number of leader sets per monitor.
    const fn default_sets_per_monitor() -> usize {
        defaults::SETS_PER_MONITOR
    }

    /// Returns the default interval length in cycles.
    const fn default_cycles_per_interval() -> u64 {
        defaults::CYCLES_PER_INTERVAL
    }
}

impl Default for SetDuelingConfig {
    fn default() -> Self {
        Self {
            candidates: Self::default_candidates(),
            sets_per_monitor: defaults::SETS_PER_MONITOR,
            criterion: DuelingCriterion::default(),
            cycles_per_interval: defaults::CYCLES_PER_INTERVAL,
        }
    }
}

/// Dynamic insertion policy (NF/BIP duel) configuration.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct DipConfig {
    /// Maximum of the policy selection counter
    #[serde(default = "DipConfig::default_psel_max")]
    pub psel_max: u32,

    /// Leader sets per thread and fill policy
    #[serde(default = "DipConfig::default_sdm_size")]
    pub sdm_size: usize,

    /// Bimodal throttle (percent)
    #[serde(default = "DipConfig::default_bimodal_throttle")]
    pub bimodal_throttle: usize,
}

impl DipConfig {
    /// Returns the default selection counter maximum.
    const fn default_psel_max() -> u32 {
        defaults::PSEL_MAX
    }

    /// Returns the default leader sets per monitor.
    const fn default_sdm_size() -> usize {
        defaults::SDM_SIZE
    }

    /// Returns the default bimodal throttle.
    const fn default_bimodal_throttle() -> usize {
        defaults::BIMODAL_THROTTLE
    }
}

impl Default for DipConfig {
    fn default() -> Self {
        Self {
            psel_max: defaults::PSEL_MAX,
            sdm_size: defaults::SDM_SIZE,
            bimodal_throttle: defaults::BIMODAL_THROTTLE,
        }
    }
}

/// Helper-thread request tracking configuration.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct TrackingConfig {
    /// Classification naming scheme
    #[serde(default)]
    pub scheme: TrackingScheme,
}
