//! Per-set recency stacks.
//!
//! Each set keeps its ways ordered from most to least recently used. Moving a way is a
//! remove-and-reinsert, O(W) in the associativity, which is cheap for the small
//! associativities caches actually use.
//!
//! # Performance
//!
//! - **Time Complexity:**
//!   - `set_mru()` / `set_lru()` / `set_stack_position()`: O(W)
//!   - `mru()` / `lru()`: O(1)
//! - **Space Complexity:** O(S × W) where S is the number of sets

/// Recency stacks, one per set. Position 0 is MRU, position `W - 1` is LRU.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LruStack {
    usage: Vec<Vec<usize>>,
}

impl LruStack {
    /// Creates stacks ordered `[0, 1, ..., ways - 1]` for every set.
    ///
    /// # Arguments
    ///
    /// * `sets` - The number of sets in the cache.
    /// * `ways` - The associativity (number of ways) of the cache.
    pub fn new(sets: usize, ways: usize) -> Self {
        Self {
            usage: (0..sets).map(|_| (0..ways).collect()).collect(),
        }
    }

    /// Way at the MRU position of `set`.
    #[inline]
    pub fn mru(&self, set: usize) -> usize {
        self.usage[set][0]
    }

    /// Way at the LRU position of `set`.
    #[inline]
    pub fn lru(&self, set: usize) -> usize {
        let stack = &self.usage[set];
        stack[stack.len() - 1]
    }

    /// Way at `position` in the stack of `set`.
    #[inline]
    pub fn way_at(&self, set: usize, position: usize) -> usize {
        self.usage[set][position]
    }

    /// Position of `way` in the stack of `set`.
    ///
    /// Every way is always somewhere in its set's stack, so the lookup cannot miss for a
    /// way below the associativity; an out-of-range way reports the LRU position.
    pub fn stack_position(&self, set: usize, way: usize) -> usize {
        let stack = &self.usage[set];
        stack
            .iter()
            .position(|&w| w == way)
            .unwrap_or(stack.len() - 1)
    }

    /// Moves `way` to `position`, shifting the ways in between by one.
    pub fn set_stack_position(&mut self, set: usize, way: usize, position: usize) {
        let stack = &mut self.usage[set];
        if let Some(pos) = stack.iter().position(|&w| w == way) {
            let _ = stack.remove(pos);
            stack.insert(position.min(stack.len()), way);
        }
    }

    /// Moves `way` to the MRU position.
    #[inline]
    pub fn set_mru(&mut self, set: usize, way: usize) {
        self.set_stack_position(set, way, 0);
    }

    /// Moves `way` to the LRU position.
    #[inline]
    pub fn set_lru(&mut self, set: usize, way: usize) {
        let last = self.usage[set].len() - 1;
        self.set_stack_position(set, way, last);
    }

    /// Ways of `set` from MRU to LRU.
    #[inline]
    pub fn stack(&self, set: usize) -> &[usize] {
        &self.usage[set]
    }

    /// Number of sets.
    #[inline]
    pub fn num_sets(&self) -> usize {
        self.usage.len()
    }
}
