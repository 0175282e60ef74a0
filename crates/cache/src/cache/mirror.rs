//! Per-line policy metadata.
//!
//! Policies keep private state for every line (frequencies, dead bits, timestamps) in an
//! arena shaped like the owning cache. The arena is addressed with the same `(set, way)`
//! pairs as the cache, but it is owned by the policy and never touched by anyone else.

use super::geometry::CacheGeometry;

/// Flat `num_sets x associativity` arena of `T`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PerLineMetadata<T> {
    entries: Vec<T>,
    associativity: usize,
}

impl<T: Clone> PerLineMetadata<T> {
    /// Creates an arena with every slot set to `initial`.
    pub fn new(geometry: &CacheGeometry, initial: T) -> Self {
        Self {
            entries: vec![initial; geometry.num_lines()],
            associativity: geometry.associativity(),
        }
    }

    /// Overwrites every slot with `value`.
    pub fn fill(&mut self, value: &T) {
        self.entries.iter_mut().for_each(|entry| entry.clone_from(value));
    }
}

impl<T> PerLineMetadata<T> {
    /// Entry for `(set, way)`.
    #[inline]
    pub fn get(&self, set: usize, way: usize) -> &T {
        &self.entries[set * self.associativity + way]
    }

    /// Mutable entry for `(set, way)`.
    #[inline]
    pub fn get_mut(&mut self, set: usize, way: usize) -> &mut T {
        &mut self.entries[set * self.associativity + way]
    }

    /// Entries of one set, indexed by way.
    #[inline]
    pub fn set_entries(&self, set: usize) -> &[T] {
        let base = set * self.associativity;
        &self.entries[base..base + self.associativity]
    }

    /// Mutable entries of one set, indexed by way.
    #[inline]
    pub fn set_entries_mut(&mut self, set: usize) -> &mut [T] {
        let base = set * self.associativity;
        &mut self.entries[base..base + self.associativity]
    }

    /// Ways per set.
    #[inline]
    pub const fn associativity(&self) -> usize {
        self.associativity
    }
}
