//! Helper-Thread Request Tracking.
//!
//! Classifies every prefetch issued by a helper thread into the last-level cache by what
//! happened to it before it left the cache:
//! 1. **State Machine:** A pure per-slot transition function.
//! 2. **Naming Schemes:** good/bad/ugly or used/polluting labels for the same outcomes.
//! 3. **Events:** Serviced requests and memory-write invalidations from the coherence layer.
//! 4. **Tracker:** The driving loop, its counters and its statistics.

/// Per-slot tracking and the event driving loop.
pub mod capability;

/// Cache events consumed by trackers.
pub mod event;

/// State machine.
pub mod fsm;

/// Classification naming schemes.
pub mod scheme;

pub use capability::{Classification, HtRequestTracking, HtRequestVictimTracker};
pub use event::CacheEvent;
pub use fsm::{HtRequestCondition, HtRequestQuality, HtRequestState, Transition, transition};
pub use scheme::{ClassificationScheme, GoodBadUgly, UsedPolluting};

use crate::cache::CacheGeometry;
use crate::config::{TrackingConfig, TrackingScheme};

/// Builds the tracker selected by `config` for the cache `name` of shape `geometry`.
pub fn build_tracker(
    name: impl Into<String>,
    geometry: &CacheGeometry,
    config: &TrackingConfig,
) -> Box<dyn HtRequestTracking> {
    match config.scheme {
        TrackingScheme::GoodBadUgly => Box::new(HtRequestVictimTracker::<GoodBadUgly>::new(name, geometry)),
        TrackingScheme::UsedPolluting => Box::new(HtRequestVictimTracker::<UsedPolluting>::new(name, geometry)),
    }
}
