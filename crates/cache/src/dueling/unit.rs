//! Set-Dueling Unit.
//!
//! At construction every `(thread, policy)` pair is given `sets_per_monitor` leader sets,
//! drawn at random (seeded) from the sets not yet taken. A leader set always runs its bound
//! policy for its bound thread; everything else follows the policy that scored best for the
//! requesting thread over the last closed interval.
//!
//! Two scoring criteria are supported:
//! - **Helper-thread usefulness:** useful / total classified helper-thread requests each
//!   thread filled into the leader sets of each policy. Intervals close every `num_sets * associativity / 2`
//!   evictions.
//! - **Main-thread misses:** main-thread misses in each monitor's sets, lowest wins.
//!   Intervals close every `cycles_per_interval` cycles.

use crate::cache::CacheGeometry;
use crate::common::{CacheError, IntervalCounter, XorShiftRng};
use crate::config::{DuelingCriterion, SetDuelingConfig};
use crate::stats::{StatEvent, StatsMap, StatsReporter};

/// Leader-set binding.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Binding {
    /// Thread whose requests this leader set measures.
    pub thread_id: usize,
    /// Candidate policy this leader set always runs.
    pub policy_id: usize,
}

/// Counters of one `(thread, policy)` monitor.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
struct Monitor {
    useful: IntervalCounter,
    total: IntervalCounter,
    misses: IntervalCounter,
}

impl Monitor {
    const fn new_interval(&mut self) {
        self.useful.new_interval();
        self.total.new_interval();
        self.misses.new_interval();
    }

    fn usefulness(&self) -> f64 {
        let total = self.total.last_interval_value();
        if total == 0 {
            0.0
        } else {
            self.useful.last_interval_value() as f64 / total as f64
        }
    }
}

/// Leader-set table and per-monitor scores.
#[derive(Clone, Debug)]
pub struct SetDuelingUnit {
    name: String,
    bindings: Vec<Option<Binding>>,
    /// Indexed `[thread][policy]`.
    monitors: Vec<Vec<Monitor>>,
    criterion: DuelingCriterion,
    evictions_per_interval: u64,
    evictions: u64,
    cycles_per_interval: u64,
    cycles: u64,
    num_intervals: u64,
}

impl SetDuelingUnit {
    /// Assigns leader sets for `num_policies` candidates and `num_threads` threads.
    ///
    /// # Arguments
    ///
    /// * `name` - Prefix of published stats.
    /// * `geometry` - Shape of the cache whose sets duel.
    /// * `num_threads` - Threads that get their own leader sets.
    /// * `num_policies` - Number of candidate policies (monitors per thread).
    /// * `config` - Leader-set count per monitor, scoring criterion and interval length.
    ///
    /// # Returns
    ///
    /// The unit, or [`CacheError::InsufficientSets`] if the cache has fewer sets than
    /// `sets_per_monitor * num_policies * num_threads`.
    pub fn new(
        name: impl Into<String>,
        geometry: &CacheGeometry,
        num_threads: usize,
        num_policies: usize,
        config: &SetDuelingConfig,
    ) -> Result<Self, CacheError> {
        let name = name.into();
        if num_threads == 0 || num_policies == 0 {
            return Err(CacheError::InvalidConfig(format!(
                "set dueling needs at least one thread and one policy, got {num_threads} threads and {num_policies} policies"
            )));
        }

        let num_sets = geometry.num_sets();
        let required = config.sets_per_monitor * num_policies * num_threads;
        if num_sets < required {
            tracing::warn!(unit = %name, required, available = num_sets, "not enough sets for set dueling");
            return Err(CacheError::InsufficientSets {
                required,
                available: num_sets,
            });
        }

        let mut rng = XorShiftRng::default();
        let mut bindings = vec![None; num_sets];
        for thread_id in 0..num_threads {
            for policy_id in 0..num_policies {
                for _ in 0..config.sets_per_monitor {
                    let mut set = rng.next_below(num_sets);
                    while bindings[set].is_some() {
                        set = rng.next_below(num_sets);
                    }
                    bindings[set] = Some(Binding { thread_id, policy_id });
                }
            }
        }

        tracing::debug!(
            unit = %name,
            leaders = required,
            followers = num_sets - required,
            criterion = ?config.criterion,
            "set dueling leaders assigned"
        );

        Ok(Self {
            name,
            bindings,
            monitors: vec![vec![Monitor::default(); num_policies]; num_threads],
            criterion: config.criterion,
            evictions_per_interval: ((num_sets * geometry.associativity()) as u64 / 2).max(1),
            evictions: 0,
            cycles_per_interval: config.cycles_per_interval.max(1),
            cycles: 0,
            num_intervals: 0,
        })
    }

    /// Binding of `set`, or `None` for a follower set.
    #[inline]
    pub fn binding(&self, set: usize) -> Option<Binding> {
        self.bindings[set]
    }

    /// Number of leader sets.
    pub fn num_leaders(&self) -> usize {
        self.bindings.iter().filter(|binding| binding.is_some()).count()
    }

    /// Number of candidate policies.
    #[inline]
    pub fn num_policies(&self) -> usize {
        self.monitors.first().map_or(0, Vec::len)
    }

    /// Intervals closed so far.
    #[inline]
    pub const fn num_intervals(&self) -> u64 {
        self.num_intervals
    }

    /// Policy that `thread_id` uses in `set`.
    ///
    /// A leader set bound to this thread runs its bound policy; any other set follows
    /// [`Self::best_policy_id`].
    pub fn policy_id(&self, set: usize, thread_id: usize) -> usize {
        match self.bindings[set] {
            Some(binding) if binding.thread_id == thread_id => binding.policy_id,
            _ => self.best_policy_id(thread_id),
        }
    }

    /// Policy that scored best for `thread_id` in the last closed interval.
    ///
    /// Ties go to the lowest policy id. Threads without monitors use policy 0.
    pub fn best_policy_id(&self, thread_id: usize) -> usize {
        let Some(monitors) = self.monitors.get(thread_id) else {
            return 0;
        };
        let mut best = 0;
        for (policy_id, monitor) in monitors.iter().enumerate().skip(1) {
            let better = match self.criterion {
                DuelingCriterion::HelperThreadUsefulness => monitor.usefulness() > monitors[best].usefulness(),
                DuelingCriterion::MainThreadMisses => {
                    monitor.misses.last_interval_value() < monitors[best].misses.last_interval_value()
                }
            };
            if better {
                best = policy_id;
            }
        }
        best
    }

    /// Counts a classified helper-thread request that `thread_id` filled into `set`.
    ///
    /// The request is credited to the requester's monitor for the policy the set is bound
    /// to. Follower sets and threads without monitors are not measured.
    pub fn record_request(&mut self, set: usize, thread_id: usize, useful: bool) {
        let Some(binding) = self.bindings[set] else {
            return;
        };
        if let Some(monitor) = self
            .monitors
            .get_mut(thread_id)
            .and_then(|monitors| monitors.get_mut(binding.policy_id))
        {
            monitor.total.increment();
            if useful {
                monitor.useful.increment();
            }
        }
    }

    /// Counts a main-thread miss in `set`.
    pub fn record_miss(&mut self, set: usize) {
        if let Some(binding) = self.bindings[set] {
            self.monitors[binding.thread_id][binding.policy_id].misses.increment();
        }
    }

    /// Counts an eviction. Closes the interval when the usefulness criterion is in use and
    /// enough evictions have been seen.
    pub fn record_eviction(&mut self) {
        if self.criterion != DuelingCriterion::HelperThreadUsefulness {
            return;
        }
        self.evictions += 1;
        if self.evictions >= self.evictions_per_interval {
            self.evictions = 0;
            self.new_interval();
        }
    }

    /// Counts a cycle. Closes the interval when the main-thread-miss criterion is in use
    /// and the interval length has elapsed.
    pub fn advance_cycle(&mut self) {
        if self.criterion != DuelingCriterion::MainThreadMisses {
            return;
        }
        self.cycles += 1;
        if self.cycles >= self.cycles_per_interval {
            self.cycles = 0;
            self.new_interval();
        }
    }

    fn new_interval(&mut self) {
        self.monitors.iter_mut().flatten().for_each(Monitor::new_interval);
        self.num_intervals += 1;
        tracing::debug!(unit = %self.name, interval = self.num_intervals, "set dueling interval closed");
    }
}

impl StatsReporter for SetDuelingUnit {
    fn handle_stat_event(&mut self, event: StatEvent, stats: &mut StatsMap) -> Result<(), CacheError> {
        match event {
            StatEvent::Reset => self.num_intervals = 0,
            StatEvent::Poll | StatEvent::Dump(_) => {
                stats.insert(format!("{}.numIntervals", self.name), self.num_intervals);
            }
        }
        Ok(())
    }
}
