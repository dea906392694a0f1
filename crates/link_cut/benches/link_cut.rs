use std::hint::black_box;

use criterion::{Criterion, criterion_group, criterion_main};
use link_cut::policy::SumAdd;
use link_cut::{LinkCutTree, SubtreeLinkCutTree};
use rand::Rng;

const N: usize = 10_000;

fn bench_connectivity(c: &mut Criterion) {
    let mut group = c.benchmark_group("connectivity");
    bench::apply_medium_runtime_config(&mut group);

    group.bench_function("chain_cut_link_churn", |b| {
        let mut tree = LinkCutTree::<SumAdd>::new(N);
        for (u, v) in bench::chain_edges(N) {
            tree.link(u, v);
        }
        let mut rng = bench::default_rng();
        b.iter(|| {
            let i = rng.random_range(1..N);
            tree.cut(i - 1, i);
            tree.link(i - 1, i);
        });
    });

    group.bench_function("chain_connected", |b| {
        let mut tree = LinkCutTree::<SumAdd>::new(N);
        for (u, v) in bench::chain_edges(N) {
            tree.link(u, v);
        }
        let mut rng = bench::default_rng();
        b.iter(|| {
            let u = rng.random_range(0..N);
            let v = rng.random_range(0..N);
            black_box(tree.connected(u, v))
        });
    });

    group.finish();
}

fn bench_path_ops(c: &mut Criterion) {
    let mut group = c.benchmark_group("path_ops");
    bench::apply_medium_runtime_config(&mut group);

    let mut rng = bench::default_rng();
    let edges = bench::random_tree_edges(&mut rng, N);
    let values = bench::random_values(&mut rng, N);

    group.bench_function("path_sum", |b| {
        let mut tree = LinkCutTree::<SumAdd>::with_values(&values);
        for &(u, v) in &edges {
            tree.link(u, v);
        }
        let mut rng = bench::default_rng();
        b.iter(|| {
            let u = rng.random_range(0..N);
            let v = rng.random_range(0..N);
            black_box(tree.path_sum(u, v))
        });
    });

    group.bench_function("path_apply", |b| {
        let mut tree = LinkCutTree::<SumAdd>::with_values(&values);
        for &(u, v) in &edges {
            tree.link(u, v);
        }
        let mut rng = bench::default_rng();
        b.iter(|| {
            let u = rng.random_range(0..N);
            let v = rng.random_range(0..N);
            black_box(tree.path_apply(u, v, 1))
        });
    });

    group.bench_function("reroot", |b| {
        let mut tree = LinkCutTree::<SumAdd>::with_values(&values);
        for &(u, v) in &edges {
            tree.link(u, v);
        }
        let mut rng = bench::default_rng();
        b.iter(|| {
            let v = rng.random_range(0..N);
            tree.reroot(v);
        });
    });

    group.finish();
}

fn bench_subtree_ops(c: &mut Criterion) {
    let mut group = c.benchmark_group("subtree_ops");
    bench::apply_medium_runtime_config(&mut group);

    let mut rng = bench::default_rng();
    let edges = bench::random_tree_edges(&mut rng, N);
    let values = bench::random_values(&mut rng, N);

    group.bench_function("subtree_sum", |b| {
        let mut tree = SubtreeLinkCutTree::<SumAdd>::with_values(&values);
        for &(u, v) in &edges {
            tree.link(u, v);
        }
        let mut rng = bench::default_rng();
        b.iter(|| {
            let v = rng.random_range(0..N);
            black_box(tree.subtree_sum(v))
        });
    });

    group.bench_function("subtree_apply", |b| {
        let mut tree = SubtreeLinkCutTree::<SumAdd>::with_values(&values);
        for &(u, v) in &edges {
            tree.link(u, v);
        }
        let mut rng = bench::default_rng();
        b.iter(|| {
            let v = rng.random_range(0..N);
            tree.subtree_apply(v, 1);
        });
    });

    group.bench_function("path_sum", |b| {
        let mut tree = SubtreeLinkCutTree::<SumAdd>::with_values(&values);
        for &(u, v) in &edges {
            tree.link(u, v);
        }
        let mut rng = bench::default_rng();
        b.iter(|| {
            let u = rng.random_range(0..N);
            let v = rng.random_range(0..N);
            black_box(tree.path_sum(u, v))
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_connectivity,
    bench_path_ops,
    bench_subtree_ops
);
criterion_main!(benches);
