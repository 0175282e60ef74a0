//! Simulation statistics collection and reporting.
//!
//! Statistics leave the core through a flat, string-keyed map. It provides:
//! 1. **Stat Map:** Dotted keys such as `l2.fsmBasedHtRequestLlcVictimTrackingCapability.l2.totalHtRequests`
//!    mapped to counts or ratios, kept in key order.
//! 2. **Stat Events:** Reset, poll and dump requests raised by the simulation driver.
//! 3. **Reporters:** Components that zero their counters on reset and publish them on poll
//!    or dump.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::common::CacheError;

/// A single published statistic.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum StatValue {
    /// Event count.
    Count(u64),
    /// Derived ratio.
    Ratio(f64),
}

impl StatValue {
    /// The count, if this is a count.
    pub const fn as_count(&self) -> Option<u64> {
        match self {
            Self::Count(value) => Some(*value),
            Self::Ratio(_) => None,
        }
    }
}

impl From<u64> for StatValue {
    fn from(value: u64) -> Self {
        Self::Count(value)
    }
}

impl From<f64> for StatValue {
    fn from(value: f64) -> Self {
        Self::Ratio(value)
    }
}

impl std::fmt::Display for StatValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Count(value) => write!(f, "{value}"),
            Self::Ratio(value) => write!(f, "{value:.4}"),
        }
    }
}

/// Ordered map from dotted stat names to values.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct StatsMap {
    entries: BTreeMap<String, StatValue>,
}

impl StatsMap {
    /// Creates an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Publishes `value` under `key`, replacing any earlier value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<StatValue>) {
        let _ = self.entries.insert(key.into(), value.into());
    }

    /// Value published under `key`.
    pub fn get(&self, key: &str) -> Option<StatValue> {
        self.entries.get(key).copied()
    }

    /// Count published under `key`, if it is a count.
    pub fn count(&self, key: &str) -> Option<u64> {
        self.get(key).and_then(|value| value.as_count())
    }

    /// Number of published stats.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if nothing has been published.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Stats in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, StatValue)> + '_ {
        self.entries.iter().map(|(key, value)| (key.as_str(), *value))
    }

    /// Serializes the map as a JSON object.
    pub fn to_json(&self) -> Result<String, CacheError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Prints the stats whose keys start with one of `prefixes` to stdout.
    ///
    /// Pass an empty slice to print everything.
    pub fn print_sections(&self, prefixes: &[&str]) {
        let want = |key: &str| prefixes.is_empty() || prefixes.iter().any(|p| key.starts_with(p));
        let width = self
            .entries
            .keys()
            .filter(|key| want(key))
            .map(String::len)
            .max()
            .unwrap_or(0);
        println!("\n==========================================================");
        println!("CACHE HIERARCHY STATISTICS");
        println!("==========================================================");
        for (key, value) in self.iter().filter(|(key, _)| want(key)) {
            println!("{key:<width$}  {value}");
        }
        println!("==========================================================");
    }
}

/// Kind of statistics dump requested by the driver.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DumpType {
    /// End of the fast-forward phase.
    FastForward,
    /// End of cache warmup.
    Warmup,
    /// End of detailed (cycle-accurate) simulation.
    DetailedSimulation,
}

/// Statistics request raised by the simulation driver.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StatEvent {
    /// Zero all counters.
    Reset,
    /// Publish current counters without changing any state.
    Poll,
    /// Publish final counters for a simulation phase.
    Dump(DumpType),
}

/// A component that publishes statistics.
pub trait StatsReporter {
    /// Reacts to `event`, publishing into `stats` where the event asks for it.
    fn handle_stat_event(&mut self, event: StatEvent, stats: &mut StatsMap) -> Result<(), CacheError>;
}
