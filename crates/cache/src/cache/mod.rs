//! Set-Associative Cache.
//!
//! This module implements the generic set-associative cache every other component is built
//! around. It provides:
//! 1. **Line Storage:** A fixed `num_sets x associativity` array of lines allocated once at
//!    construction. Lines are reused in place and never reallocated.
//! 2. **Line State:** A pluggable per-line payload (coherence state, a valid flag, or a
//!    predictor entry) described by the [`LineState`] trait.
//! 3. **Access Transactions:** Lookups produce a [`CacheAccess`]; [`Cache::commit`] is the
//!    single point where line contents and policy state change.
//! 4. **Replacement:** A boxed [`ReplacementPolicy`] picks victims and tracks recency,
//!    frequency or predictions in its own per-line arena.

/// Two-phase access transactions.
pub mod access;

/// Cache geometry and address decomposition.
pub mod geometry;

/// Per-set recency stacks.
pub mod lru_stack;

/// Per-line policy metadata arenas.
pub mod mirror;

/// Cache replacement policy implementations.
pub mod policies;

use std::fmt;

pub use access::{AccessPhase, CacheAccess};
pub use geometry::CacheGeometry;
pub use lru_stack::LruStack;
pub use mirror::PerLineMetadata;
pub use policies::{PolicyFeedback, ReplacementPolicy};

use crate::common::{AccessContext, CacheError, Tag};
use crate::config::CacheConfig;
use crate::stats::{StatEvent, StatsMap, StatsReporter};

/// Per-line payload stored alongside the tag.
pub trait LineState: Clone + fmt::Debug {
    /// State of a line that holds nothing.
    fn initial() -> Self;

    /// State a line takes when a miss fills it.
    fn filled() -> Self;

    /// True for the initial (empty) state.
    fn is_initial(&self) -> bool;
}

impl LineState for bool {
    fn initial() -> Self {
        false
    }

    fn filled() -> Self {
        true
    }

    fn is_initial(&self) -> bool {
        !*self
    }
}

/// MESI coherence state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MesiState {
    /// Dirty and exclusively owned.
    Modified,
    /// Clean and exclusively owned.
    Exclusive,
    /// Clean and possibly held by other caches.
    Shared,
    /// Not present.
    #[default]
    Invalid,
}

impl LineState for MesiState {
    fn initial() -> Self {
        Self::Invalid
    }

    fn filled() -> Self {
        Self::Exclusive
    }

    fn is_initial(&self) -> bool {
        *self == Self::Invalid
    }
}

/// One line slot.
///
/// A line belongs to the same `(set, way)` for the lifetime of its cache. Its tag is `None`
/// while the slot is empty.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CacheLine<S> {
    set: usize,
    way: usize,
    tag: Option<Tag>,
    state: S,
}

impl<S: LineState> CacheLine<S> {
    fn new(set: usize, way: usize) -> Self {
        Self {
            set,
            way,
            tag: None,
            state: S::initial(),
        }
    }

    /// Set this slot belongs to.
    #[inline]
    pub const fn set(&self) -> usize {
        self.set
    }

    /// Way this slot belongs to.
    #[inline]
    pub const fn way(&self) -> usize {
        self.way
    }

    /// Tag of the resident line, if any.
    #[inline]
    pub const fn tag(&self) -> Option<Tag> {
        self.tag
    }

    /// Payload of the slot.
    #[inline]
    pub const fn state(&self) -> &S {
        &self.state
    }

    /// Mutable payload of the slot.
    #[inline]
    pub const fn state_mut(&mut self) -> &mut S {
        &mut self.state
    }

    /// True if the slot holds a line.
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.tag.is_some() && !self.state.is_initial()
    }

    fn invalidate(&mut self) {
        self.tag = None;
        self.state = S::initial();
    }
}

/// Counters kept by every cache.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Committed accesses.
    pub accesses: u64,
    /// Committed accesses that hit.
    pub hits: u64,
    /// Committed misses that displaced a valid line.
    pub evictions: u64,
}

impl CacheStats {
    /// Committed accesses that missed.
    pub const fn misses(&self) -> u64 {
        self.accesses - self.hits
    }
}

/// Set-associative cache with a pluggable line payload and replacement policy.
pub struct Cache<S> {
    name: String,
    geometry: CacheGeometry,
    lines: Vec<CacheLine<S>>,
    policy: Box<dyn ReplacementPolicy>,
    stats: CacheStats,
}

impl<S> fmt::Debug for Cache<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cache")
            .field("name", &self.name)
            .field("geometry", &self.geometry)
            .field("policy", &self.policy.name())
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}

impl<S: LineState> Cache<S> {
    /// Creates a cache with every line empty.
    ///
    /// # Arguments
    ///
    /// * `name` - Name used as the prefix of published stats.
    /// * `geometry` - Shape of the cache; the policy must have been built for the same shape.
    /// * `policy` - Replacement policy owning this cache's per-line metadata.
    pub fn new(name: impl Into<String>, geometry: CacheGeometry, policy: Box<dyn ReplacementPolicy>) -> Self {
        let associativity = geometry.associativity();
        let lines = (0..geometry.num_lines())
            .map(|index| CacheLine::new(index / associativity, index % associativity))
            .collect();
        let name = name.into();
        tracing::debug!(
            cache = %name,
            sets = geometry.num_sets(),
            ways = associativity,
            line_size = geometry.line_size(),
            policy = policy.name(),
            "cache created"
        );
        Self {
            name,
            geometry,
            lines,
            policy,
            stats: CacheStats::default(),
        }
    }

    /// Builds a cache and its replacement policy from configuration.
    ///
    /// # Returns
    ///
    /// The cache, or the configuration error that prevented building it.
    pub fn from_config(config: &CacheConfig) -> Result<Self, CacheError> {
        config.validate()?;
        let geometry = CacheGeometry::new(config.size_bytes, config.ways, config.line_bytes)?;
        let policy = policies::build_policy(config, &geometry)?;
        Ok(Self::new(config.name.clone(), geometry, policy))
    }

    /// Cache name.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Cache geometry.
    #[inline]
    pub const fn geometry(&self) -> &CacheGeometry {
        &self.geometry
    }

    /// Number of sets.
    #[inline]
    pub const fn num_sets(&self) -> usize {
        self.geometry.num_sets()
    }

    /// Ways per set.
    #[inline]
    pub const fn associativity(&self) -> usize {
        self.geometry.associativity()
    }

    /// Line-aligned tag of `address`.
    #[inline]
    pub const fn tag(&self, address: u64) -> Tag {
        self.geometry.tag(address)
    }

    /// Set `address` maps to.
    #[inline]
    pub const fn set(&self, address: u64) -> usize {
        self.geometry.set(address)
    }

    /// Line in slot `(set, way)`.
    #[inline]
    pub fn line(&self, set: usize, way: usize) -> &CacheLine<S> {
        &self.lines[self.geometry.line_index(set, way)]
    }

    /// Mutable line in slot `(set, way)`. Only the payload can be changed through it.
    #[inline]
    pub fn line_mut(&mut self, set: usize, way: usize) -> &mut CacheLine<S> {
        let index = self.geometry.line_index(set, way);
        &mut self.lines[index]
    }

    /// Lines of `set`, indexed by way.
    #[inline]
    pub fn lines(&self, set: usize) -> &[CacheLine<S>] {
        let base = self.geometry.line_index(set, 0);
        &self.lines[base..base + self.geometry.associativity()]
    }

    /// Way holding `address`, if resident.
    pub fn find_way(&self, address: u64) -> Option<usize> {
        let tag = self.tag(address);
        self.lines(self.set(address))
            .iter()
            .position(|line| line.tag == Some(tag) && !line.state.is_initial())
    }

    /// Line holding `address`, if resident.
    pub fn find_line(&self, address: u64) -> Option<&CacheLine<S>> {
        let set = self.set(address);
        self.find_way(address).map(|way| self.line(set, way))
    }

    /// Looks up `address` and describes what committing the access would do.
    ///
    /// Neither the cache nor its policy changes until the access is committed.
    ///
    /// # Arguments
    ///
    /// * `context` - Requester of the access.
    /// * `address` - Address being accessed.
    ///
    /// # Returns
    ///
    /// A pending hit on the resident way, or a pending miss on the way the replacement
    /// policy selected. A miss whose victim slot is empty is not an eviction.
    pub fn new_access(&self, context: AccessContext, address: u64) -> CacheAccess {
        let set = self.set(address);
        let tag = self.tag(address);
        if let Some(way) = self.find_way(address) {
            return CacheAccess::hit(context, address, set, way, tag);
        }
        let way = self.policy.handle_replacement(&context, set, tag);
        let victim = self.line(set, way);
        let victim_tag = if victim.is_valid() { victim.tag } else { None };
        tracing::trace!(
            cache = %self.name,
            set,
            way,
            tag,
            eviction = victim_tag.is_some(),
            "miss"
        );
        CacheAccess::miss(context, address, set, way, tag, victim_tag)
    }

    /// Applies a pending access.
    ///
    /// On a hit the policy promotes the line. On a miss the policy handles the insertion,
    /// then the slot takes the new tag and the filled state.
    ///
    /// # Returns
    ///
    /// [`CacheError::AccessAlreadyCommitted`] or [`CacheError::AccessAborted`] if the access
    /// is no longer pending; nothing is changed in that case.
    pub fn commit(&mut self, access: &mut CacheAccess) -> Result<(), CacheError> {
        access.begin_commit()?;
        self.stats.accesses += 1;
        if access.is_hit_in_cache() {
            self.stats.hits += 1;
            self.policy.handle_promotion_on_hit(access);
        } else {
            if access.is_eviction() {
                self.stats.evictions += 1;
            }
            self.policy.handle_insertion_on_miss(access);
            let line = self.line_mut(access.set(), access.way());
            line.tag = Some(access.tag());
            line.state = S::filled();
        }
        Ok(())
    }

    /// Empties slot `(set, way)`, as a memory-write invalidation does.
    pub fn invalidate(&mut self, set: usize, way: usize) {
        self.line_mut(set, way).invalidate();
    }

    /// Forwards feedback from trackers or the cycle driver to the replacement policy.
    pub fn notify_policy(&mut self, feedback: &PolicyFeedback) {
        self.policy.handle_feedback(feedback);
    }

    /// Replacement policy.
    #[inline]
    pub fn policy(&self) -> &dyn ReplacementPolicy {
        self.policy.as_ref()
    }

    /// Counters since the last reset.
    #[inline]
    pub const fn stats(&self) -> &CacheStats {
        &self.stats
    }
}

impl<S: LineState> StatsReporter for Cache<S> {
    fn handle_stat_event(&mut self, event: StatEvent, stats: &mut StatsMap) -> Result<(), CacheError> {
        match event {
            StatEvent::Reset => self.stats = CacheStats::default(),
            StatEvent::Poll | StatEvent::Dump(_) => {
                let name = &self.name;
                stats.insert(format!("{name}.accesses"), self.stats.accesses);
                stats.insert(format!("{name}.hits"), self.stats.hits);
                stats.insert(format!("{name}.misses"), self.stats.misses());
                stats.insert(format!("{name}.evictions"), self.stats.evictions);
                let ratio = if self.stats.accesses == 0 {
                    0.0
                } else {
                    self.stats.hits as f64 / self.stats.accesses as f64
                };
                stats.insert(format!("{name}.hitRatio"), ratio);
            }
        }
        self.policy.handle_stat_event(event, stats)
    }
}
