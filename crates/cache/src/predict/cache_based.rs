//! Cache-Based Value Predictor.
//!
//! A small set-associative table, managed by LRU, mapping a key (usually a PC) to the last
//! value observed for it. Each entry carries a confidence counter: repeating the stored
//! value raises it, a different value lowers it, and the stored value is only replaced once
//! confidence has dropped to zero.

use std::fmt;

use crate::cache::policies::LruPolicy;
use crate::cache::{Cache, CacheGeometry, LineState};
use crate::common::constants::{PREDICTOR_SETS, PREDICTOR_WAYS};
use crate::common::{AccessContext, CacheError, SaturatingCounter};

const CONFIDENCE_THRESHOLD: u32 = 0;
const CONFIDENCE_MAX: u32 = 3;

/// Line payload of the predictor table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PredictorEntry<V> {
    valid: bool,
    value: V,
    confidence: SaturatingCounter,
}

impl<V> PredictorEntry<V> {
    /// Stored prediction.
    #[inline]
    pub const fn value(&self) -> &V {
        &self.value
    }

    /// Confidence in the stored prediction.
    #[inline]
    pub const fn confidence(&self) -> &SaturatingCounter {
        &self.confidence
    }
}

impl<V: Clone + Default + fmt::Debug> PredictorEntry<V> {
    fn with_validity(valid: bool) -> Self {
        Self {
            valid,
            value: V::default(),
            confidence: SaturatingCounter::new(0, CONFIDENCE_THRESHOLD, CONFIDENCE_MAX, 0),
        }
    }
}

impl<V: Clone + Default + fmt::Debug> LineState for PredictorEntry<V> {
    fn initial() -> Self {
        Self::with_validity(false)
    }

    fn filled() -> Self {
        Self::with_validity(true)
    }

    fn is_initial(&self) -> bool {
        !self.valid
    }
}

/// Key-indexed predictor of values of type `V`.
#[derive(Debug)]
pub struct CacheBasedPredictor<V> {
    table: Cache<PredictorEntry<V>>,
}

impl<V: Clone + Default + PartialEq + fmt::Debug> CacheBasedPredictor<V> {
    /// Creates an empty 16 x 16 table whose lines are `line_size` keys wide.
    ///
    /// # Returns
    ///
    /// The predictor, or [`CacheError::InvalidGeometry`] if `line_size` is not a power of two.
    pub fn new(name: impl Into<String>, line_size: usize) -> Result<Self, CacheError> {
        let geometry = CacheGeometry::new(PREDICTOR_SETS * PREDICTOR_WAYS * line_size, PREDICTOR_WAYS, line_size)?;
        let policy = Box::new(LruPolicy::new(&geometry));
        Ok(Self {
            table: Cache::new(name, geometry, policy),
        })
    }

    /// Records that `key` produced `observed`.
    pub fn update(&mut self, key: u64, observed: V) -> Result<(), CacheError> {
        let mut access = self.table.new_access(AccessContext::default(), key);
        self.table.commit(&mut access)?;
        let entry = self.table.line_mut(access.set(), access.way()).state_mut();
        if !access.is_hit_in_cache() {
            entry.value = observed;
            entry.confidence.reset();
        } else if entry.value == observed {
            entry.confidence.update(true);
        } else if entry.confidence.value() == 0 {
            entry.value = observed;
        } else {
            entry.confidence.update(false);
        }
        Ok(())
    }

    /// Stored value for `key` if present and confident, `default` otherwise.
    pub fn predict(&self, key: u64, default: V) -> V {
        self.table
            .find_line(key)
            .map(|line| line.state())
            .filter(|entry| entry.confidence.is_taken())
            .map_or(default, |entry| entry.value.clone())
    }

    /// Entry stored for `key`, if any.
    pub fn entry(&self, key: u64) -> Option<&PredictorEntry<V>> {
        self.table.find_line(key).map(|line| line.state())
    }
}
