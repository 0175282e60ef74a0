//! Shared fixtures for cache tests.

/// Mock implementations of cache collaborators.
pub mod mocks;

use std::sync::Once;

use cachesim_core::cache::policies::LruPolicy;
use cachesim_core::cache::{Cache, CacheAccess, CacheGeometry, LineState};
use cachesim_core::common::AccessContext;
use tracing_subscriber::EnvFilter;

static TRACING: Once = Once::new();

/// Installs a test-writer subscriber once per test binary.
///
/// Set `RUST_LOG=cachesim_core=trace` to see cache and tracker transitions.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// Builds a geometry of `num_sets` sets of `ways` lines of `line_size` bytes.
pub fn geometry(num_sets: usize, ways: usize, line_size: usize) -> CacheGeometry {
    CacheGeometry::new(num_sets * ways * line_size, ways, line_size).expect("valid geometry")
}

/// Returns the `index`-th distinct line address mapping to `set`.
pub fn address(geometry: &CacheGeometry, set: usize, index: usize) -> u64 {
    ((index * geometry.num_sets() + set) * geometry.line_size()) as u64
}

/// Builds an LRU-managed cache of valid bits.
pub fn lru_cache(num_sets: usize, ways: usize) -> Cache<bool> {
    let geometry = geometry(num_sets, ways, 64);
    Cache::new("l2", geometry, Box::new(LruPolicy::new(&geometry)))
}

/// Looks up `address` and commits the access immediately.
pub fn touch<S: LineState>(cache: &mut Cache<S>, context: AccessContext, address: u64) -> CacheAccess {
    let mut access = cache.new_access(context, address);
    cache.commit(&mut access).expect("fresh access commits");
    access
}

/// Where a probe access lands.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Landing {
    /// A miss into an empty slot.
    Fill,
    /// A hit on a resident line.
    Hit,
    /// A miss that displaces another line.
    Evict,
}

/// Builds a pending access to `address` in `way`, for driving a policy by hand.
///
/// The access comes from a throwaway cache whose mock policy always picks `way`.
pub fn access_at(
    geometry: CacheGeometry,
    context: AccessContext,
    address: u64,
    way: usize,
    landing: Landing,
) -> CacheAccess {
    let mut policy = mocks::policy::MockPolicy::new();
    let _ = policy.expect_name().return_const("probe");
    let _ = policy.expect_handle_replacement().return_const(way);
    let _ = policy.expect_handle_insertion_on_miss().return_const(());
    let _ = policy.expect_handle_promotion_on_hit().return_const(());
    let mut cache: Cache<bool> = Cache::new("probe", geometry, Box::new(policy));

    match landing {
        Landing::Fill => {}
        Landing::Hit => {
            let _ = touch(&mut cache, context, address);
        }
        Landing::Evict => {
            let alias = address + (geometry.num_sets() * geometry.line_size()) as u64;
            let _ = touch(&mut cache, context, alias);
        }
    }
    cache.new_access(context, address)
}
