//! Shared benchmark plumbing: runtime presets, a fixed-seed RNG, and input
//! generators for the tree benchmarks.

use std::time::Duration;

use criterion::BenchmarkGroup;
use criterion::measurement::WallTime;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const RNG_SEED: u64 = 0x5EED_2026;

/// Deterministic RNG so runs are comparable across machines and commits.
pub fn default_rng() -> StdRng {
    StdRng::seed_from_u64(RNG_SEED)
}

pub fn apply_small_runtime_config(group: &mut BenchmarkGroup<'_, WallTime>) {
    group.warm_up_time(Duration::from_millis(200));
    group.measurement_time(Duration::from_millis(500));
    group.sample_size(50);
}

pub fn apply_medium_runtime_config(group: &mut BenchmarkGroup<'_, WallTime>) {
    group.warm_up_time(Duration::from_millis(500));
    group.measurement_time(Duration::from_secs(2));
    group.sample_size(30);
}

pub fn apply_large_runtime_config(group: &mut BenchmarkGroup<'_, WallTime>) {
    group.warm_up_time(Duration::from_secs(1));
    group.measurement_time(Duration::from_secs(5));
    group.sample_size(10);
}

/// Edges of a uniformly random labelled tree on `n` vertices: each vertex
/// attaches to a random earlier one.
pub fn random_tree_edges(rng: &mut StdRng, n: usize) -> Vec<(usize, usize)> {
    let mut edges = Vec::with_capacity(n.saturating_sub(1));
    for v in 1..n {
        edges.push((rng.random_range(0..v), v));
    }
    edges
}

/// Edges of a path 0 - 1 - .. - (n-1), the worst case for naive approaches.
pub fn chain_edges(n: usize) -> Vec<(usize, usize)> {
    (1..n).map(|v| (v - 1, v)).collect()
}

pub fn random_values(rng: &mut StdRng, n: usize) -> Vec<i64> {
    (0..n).map(|_| rng.random_range(-1_000..1_000)).collect()
}
