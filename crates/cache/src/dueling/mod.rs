//! Set Dueling.
//!
//! Set dueling lets a cache choose between policies at run time by dedicating a few
//! "leader" sets to each candidate and letting every other set follow the current winner.
//! This module provides:
//! 1. **Set-Dueling Unit:** Per-thread leader sets for any number of candidate policies,
//!    scored by helper-thread usefulness or main-thread misses over closed intervals.
//! 2. **Dynamic Insertion Policy:** The two-way normal-fill versus bimodal-fill duel used
//!    by RRIP insertion, decided by per-thread policy-selection counters.

/// Thread-interleaved normal-fill / bimodal-fill duel.
pub mod dip;

/// Leader-set assignment and interval scoring.
pub mod unit;

pub use dip::{DynamicInsertionPolicy, FillKind};
pub use unit::{Binding, SetDuelingUnit};
