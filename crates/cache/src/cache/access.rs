//! Two-phase cache access transactions.
//!
//! A lookup produces a [`CacheAccess`] describing what *would* happen: hit or miss, the way
//! involved, and for misses whether a valid victim must be evicted. Nothing in the cache or
//! its policy changes until [`Cache::commit`](super::Cache::commit) is called. This lets
//! the surrounding coherence layer stall across cycles (writebacks, lock waits) or give up
//! entirely with [`CacheAccess::abort`] without leaving partial state behind.

use crate::common::{AccessContext, CacheError, Tag};

/// Lifecycle of a [`CacheAccess`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AccessPhase {
    /// Computed but not yet applied.
    Pending,
    /// Applied to the cache and its policy.
    Committed,
    /// Discarded without effect.
    Aborted,
}

/// One lookup against a cache.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CacheAccess {
    context: AccessContext,
    address: u64,
    set: usize,
    way: usize,
    tag: Tag,
    hit: bool,
    victim_tag: Option<Tag>,
    phase: AccessPhase,
}

impl CacheAccess {
    /// Access that found `tag` resident in `way`.
    pub(crate) const fn hit(context: AccessContext, address: u64, set: usize, way: usize, tag: Tag) -> Self {
        Self {
            context,
            address,
            set,
            way,
            tag,
            hit: true,
            victim_tag: None,
            phase: AccessPhase::Pending,
        }
    }

    /// Access that missed and will fill `way`, evicting `victim_tag` if the way holds a
    /// valid line.
    pub(crate) const fn miss(
        context: AccessContext,
        address: u64,
        set: usize,
        way: usize,
        tag: Tag,
        victim_tag: Option<Tag>,
    ) -> Self {
        Self {
            context,
            address,
            set,
            way,
            tag,
            hit: false,
            victim_tag,
            phase: AccessPhase::Pending,
        }
    }

    /// Requester of the access.
    #[inline]
    pub const fn context(&self) -> &AccessContext {
        &self.context
    }

    /// Full address that was looked up.
    #[inline]
    pub const fn address(&self) -> u64 {
        self.address
    }

    /// Set the address maps to.
    #[inline]
    pub const fn set(&self) -> usize {
        self.set
    }

    /// Way that hit, or the way chosen to be filled.
    #[inline]
    pub const fn way(&self) -> usize {
        self.way
    }

    /// Line-aligned tag being accessed.
    #[inline]
    pub const fn tag(&self) -> Tag {
        self.tag
    }

    /// True if the line was resident.
    #[inline]
    pub const fn is_hit_in_cache(&self) -> bool {
        self.hit
    }

    /// True if filling the chosen way displaces a valid line.
    #[inline]
    pub const fn is_eviction(&self) -> bool {
        !self.hit && self.victim_tag.is_some()
    }

    /// Tag of the line that will be displaced, if any.
    #[inline]
    pub const fn victim_tag(&self) -> Option<Tag> {
        self.victim_tag
    }

    /// Current lifecycle phase.
    #[inline]
    pub const fn phase(&self) -> AccessPhase {
        self.phase
    }

    /// Discards the access. Aborting twice is a no-op; aborting a committed access fails.
    pub fn abort(&mut self) -> Result<(), CacheError> {
        match self.phase {
            AccessPhase::Committed => Err(CacheError::AccessAlreadyCommitted {
                set: self.set,
                way: self.way,
            }),
            AccessPhase::Pending | AccessPhase::Aborted => {
                self.phase = AccessPhase::Aborted;
                Ok(())
            }
        }
    }

    /// Checks the access can still be committed and marks it committed.
    pub(crate) const fn begin_commit(&mut self) -> Result<(), CacheError> {
        match self.phase {
            AccessPhase::Pending => {
                self.phase = AccessPhase::Committed;
                Ok(())
            }
            AccessPhase::Committed => Err(CacheError::AccessAlreadyCommitted {
                set: self.set,
                way: self.way,
            }),
            AccessPhase::Aborted => Err(CacheError::AccessAborted {
                set: self.set,
                way: self.way,
            }),
        }
    }
}
