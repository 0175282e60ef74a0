//! Events delivered to trackers by the coherence layer.

use crate::cache::CacheAccess;
use crate::common::{AccessContext, Tag};

/// Notification about the tracked cache.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CacheEvent {
    /// A request was serviced by the cache.
    ServiceRequest {
        /// Requester.
        context: AccessContext,
        /// Set accessed.
        set: usize,
        /// Way hit or filled.
        way: usize,
        /// Tag requested.
        tag: Tag,
        /// True if the line was resident.
        hit: bool,
        /// Tag of the line displaced by the fill, if any.
        evicted_tag: Option<Tag>,
    },
    /// A memory write invalidated the line in `(set, way)`.
    LineInvalidatedByMemWrite {
        /// Set of the line.
        set: usize,
        /// Way of the line.
        way: usize,
    },
}

impl CacheEvent {
    /// Service event describing `access`.
    pub const fn from_access(access: &CacheAccess) -> Self {
        Self::ServiceRequest {
            context: *access.context(),
            set: access.set(),
            way: access.way(),
            tag: access.tag(),
            hit: access.is_hit_in_cache(),
            evicted_tag: access.victim_tag(),
        }
    }
}

impl From<&CacheAccess> for CacheEvent {
    fn from(access: &CacheAccess) -> Self {
        Self::from_access(access)
    }
}
