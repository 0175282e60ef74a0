//! Dynamic Insertion Policy (DIP).
//!
//! Each thread owns two groups of leader sets: one always inserts with a normal fill, the
//! other with a bimodal fill (normal only `throttle`% of the time). Misses in a thread's
//! leader sets move that thread's policy-selection counter (PSEL) up for normal-fill
//! leaders and down for bimodal leaders. Follower sets read PSEL: while it is taken the
//! thread inserts bimodally, otherwise normally.

use crate::common::{CacheError, SaturatingCounter, XorShiftRng};
use crate::config::DipConfig;

/// Insertion policy a leader set is dedicated to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FillKind {
    /// Always a normal fill.
    Normal,
    /// Bimodal fill.
    Bimodal,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Leader {
    kind: FillKind,
    owner: usize,
}

/// Per-thread NF/BIP set duel.
#[derive(Clone, Debug)]
pub struct DynamicInsertionPolicy {
    leaders: Vec<Option<Leader>>,
    psel: Vec<SaturatingCounter>,
    throttle: usize,
    rng: XorShiftRng,
}

impl DynamicInsertionPolicy {
    /// Assigns `sdm_size` normal-fill and `sdm_size` bimodal leader sets to every thread.
    ///
    /// # Returns
    ///
    /// The policy, or [`CacheError::InsufficientSets`] if `num_sets` is smaller than
    /// `2 * sdm_size * num_threads`.
    pub fn new(num_sets: usize, num_threads: usize, config: &DipConfig) -> Result<Self, CacheError> {
        let leaders_per_kind = config.sdm_size * num_threads;
        let required = leaders_per_kind * 2;
        if num_sets < required {
            tracing::warn!(required, available = num_sets, "not enough sets for dynamic insertion");
            return Err(CacheError::InsufficientSets {
                required,
                available: num_sets,
            });
        }

        let threshold = config.psel_max / 2;
        let mut rng = XorShiftRng::default();
        let mut leaders = vec![None; num_sets];
        for kind in [FillKind::Normal, FillKind::Bimodal] {
            let mut owner = 0;
            let mut owner_sets = config.sdm_size;
            for _ in 0..leaders_per_kind {
                let mut set = rng.next_below(num_sets);
                while leaders[set].is_some() {
                    set = rng.next_below(num_sets);
                }
                leaders[set] = Some(Leader { kind, owner });

                owner_sets -= 1;
                if owner_sets == 0 {
                    owner += 1;
                    owner_sets = config.sdm_size;
                }
            }
        }

        Ok(Self {
            leaders,
            psel: vec![SaturatingCounter::new(0, threshold, threshold, 0); num_threads],
            throttle: config.bimodal_throttle,
            rng,
        })
    }

    /// Leader kind and owner of `set`, or `None` for a follower.
    pub fn leader(&self, set: usize) -> Option<(FillKind, usize)> {
        self.leaders[set].map(|leader| (leader.kind, leader.owner))
    }

    /// Policy-selection counter of `thread_id`.
    pub fn psel(&self, thread_id: usize) -> Option<&SaturatingCounter> {
        self.psel.get(thread_id)
    }

    /// Decides whether a fill by `thread_id` into `set` is a normal fill.
    ///
    /// Bimodal decisions draw from the policy's generator.
    pub fn should_do_normal_fill(&mut self, thread_id: usize, set: usize) -> bool {
        match self.leaders[set] {
            Some(Leader {
                kind: FillKind::Normal,
                owner,
            }) if owner == thread_id => true,
            Some(Leader {
                kind: FillKind::Bimodal,
                owner,
            }) if owner == thread_id => self.bimodal_suggestion(),
            _ => {
                let bimodal_preferred = self.psel.get(thread_id).is_some_and(SaturatingCounter::is_taken);
                !bimodal_preferred || self.bimodal_suggestion()
            }
        }
    }

    /// Trains the owner's PSEL on a miss in a leader set.
    pub fn record_miss(&mut self, set: usize) {
        if let Some(leader) = self.leaders[set] {
            if let Some(psel) = self.psel.get_mut(leader.owner) {
                psel.update(leader.kind == FillKind::Normal);
            }
        }
    }

    fn bimodal_suggestion(&mut self) -> bool {
        self.rng.next_below(100) <= self.throttle
    }
}
