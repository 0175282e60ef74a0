//! Cache geometry and address decomposition.
//!
//! A geometry is the immutable triple (size, associativity, line size). Everything indexed
//! "in lockstep" with a cache (line storage, mirror arenas, FSM slots) derives its shape
//! from the same geometry, so a `(set, way)` pair means the same slot everywhere.

use crate::common::{CacheError, Tag};

/// Shape of a set-associative cache.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CacheGeometry {
    size: usize,
    associativity: usize,
    line_size: usize,
    line_size_bits: u32,
    num_sets: usize,
}

impl CacheGeometry {
    /// Creates a geometry.
    ///
    /// # Arguments
    ///
    /// * `size` - Total capacity in bytes.
    /// * `associativity` - Ways per set.
    /// * `line_size` - Bytes per line; must be a power of two.
    ///
    /// # Returns
    ///
    /// The geometry, or [`CacheError::InvalidGeometry`] if any dimension is zero, the line
    /// size is not a power of two, or the capacity does not hold at least one full set.
    pub fn new(size: usize, associativity: usize, line_size: usize) -> Result<Self, CacheError> {
        if size == 0 || associativity == 0 || line_size == 0 {
            return Err(CacheError::InvalidGeometry(format!(
                "size {size}, associativity {associativity} and line size {line_size} must all be non-zero"
            )));
        }
        if !line_size.is_power_of_two() {
            return Err(CacheError::InvalidGeometry(format!(
                "line size {line_size} is not a power of two"
            )));
        }
        let num_sets = size / associativity / line_size;
        if num_sets == 0 {
            return Err(CacheError::InvalidGeometry(format!(
                "{size} bytes cannot hold one set of {associativity} x {line_size}-byte lines"
            )));
        }
        if !num_sets.is_power_of_two() {
            tracing::warn!(
                size,
                associativity,
                line_size,
                num_sets,
                "number of sets is not a power of two"
            );
        }
        Ok(Self {
            size,
            associativity,
            line_size,
            line_size_bits: line_size.trailing_zeros(),
            num_sets,
        })
    }

    /// Total capacity in bytes.
    #[inline]
    pub const fn size(&self) -> usize {
        self.size
    }

    /// Ways per set.
    #[inline]
    pub const fn associativity(&self) -> usize {
        self.associativity
    }

    /// Bytes per line.
    #[inline]
    pub const fn line_size(&self) -> usize {
        self.line_size
    }

    /// Number of sets.
    #[inline]
    pub const fn num_sets(&self) -> usize {
        self.num_sets
    }

    /// Number of line slots (`num_sets * associativity`).
    #[inline]
    pub const fn num_lines(&self) -> usize {
        self.num_sets * self.associativity
    }

    /// Line-aligned tag of `address`.
    #[inline]
    pub const fn tag(&self, address: u64) -> Tag {
        address & !((self.line_size as u64) - 1)
    }

    /// Set `address` maps to. Tags map to the same set as the addresses they cover.
    #[inline]
    pub const fn set(&self, address: u64) -> usize {
        ((address >> self.line_size_bits) % self.num_sets as u64) as usize
    }

    /// Flat index of slot `(set, way)`.
    #[inline]
    pub const fn line_index(&self, set: usize, way: usize) -> usize {
        set * self.associativity + way
    }
}
