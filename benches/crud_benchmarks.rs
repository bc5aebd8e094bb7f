use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use fanout_tree::BTree;
use std::collections::BTreeSet;

const N: usize = 10_000;

/// Orders to sweep: a pointer-heavy low fanout and a cache-friendly wide one.
const ORDERS: [usize; 2] = [8, 64];

// ─── Helper functions to generate key sequences ─────────────────────────────

fn ordered_keys(n: usize) -> Vec<i64> {
    (0..n as i64).collect()
}

fn reverse_ordered_keys(n: usize) -> Vec<i64> {
    (0..n as i64).rev().collect()
}

fn random_keys(n: usize) -> Vec<i64> {
    // Use a simple LCG for a deterministic pseudo-random sequence
    let mut keys = Vec::with_capacity(n);
    let mut x: u64 = 12345;
    for _ in 0..n {
        x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
        keys.push((x >> 33) as i64);
    }
    keys
}

fn filled_tree(order: usize, keys: &[i64]) -> BTree<i64> {
    let mut tree = BTree::with_capacity(order, keys.len()).unwrap();
    tree.extend(keys.iter().copied());
    tree
}

// ─── Insert benchmarks ──────────────────────────────────────────────────────

fn bench_insert(c: &mut Criterion) {
    for (name, keys) in [
        ("insert_ordered", ordered_keys(N)),
        ("insert_reverse", reverse_ordered_keys(N)),
        ("insert_random", random_keys(N)),
    ] {
        let mut group = c.benchmark_group(name);

        for order in ORDERS {
            group.bench_function(BenchmarkId::new("BTree", order), |b| {
                b.iter(|| {
                    let mut tree = BTree::new(order).unwrap();
                    for &key in &keys {
                        tree.insert(key);
                    }
                    tree
                });
            });
        }

        group.bench_function(BenchmarkId::new("BTreeSet", "std"), |b| {
            b.iter(|| {
                let mut set = BTreeSet::new();
                for &key in &keys {
                    set.insert(key);
                }
                set
            });
        });

        group.finish();
    }
}

// ─── Lookup benchmarks ──────────────────────────────────────────────────────

fn bench_contains(c: &mut Criterion) {
    let keys = random_keys(N);
    let probes = random_keys(N * 2);

    let mut group = c.benchmark_group("contains_random");

    for order in ORDERS {
        let tree = filled_tree(order, &keys);
        group.bench_function(BenchmarkId::new("BTree", order), |b| {
            b.iter(|| probes.iter().filter(|&key| tree.contains(key)).count());
        });
    }

    let set: BTreeSet<i64> = keys.iter().copied().collect();
    group.bench_function(BenchmarkId::new("BTreeSet", "std"), |b| {
        b.iter(|| probes.iter().filter(|&key| set.contains(key)).count());
    });

    group.finish();
}

// ─── Remove benchmarks ──────────────────────────────────────────────────────

fn bench_remove(c: &mut Criterion) {
    let keys = random_keys(N);

    let mut group = c.benchmark_group("remove_all");

    for order in ORDERS {
        group.bench_function(BenchmarkId::new("BTree", order), |b| {
            b.iter_batched(
                || filled_tree(order, &keys),
                |mut tree| {
                    for key in &keys {
                        tree.remove(key);
                    }
                    tree
                },
                criterion::BatchSize::SmallInput,
            );
        });
    }

    group.bench_function(BenchmarkId::new("BTreeSet", "std"), |b| {
        b.iter_batched(
            || keys.iter().copied().collect::<BTreeSet<i64>>(),
            |mut set| {
                for key in &keys {
                    set.remove(key);
                }
                set
            },
            criterion::BatchSize::SmallInput,
        );
    });

    group.finish();
}

criterion_group!(benches, bench_insert, bench_contains, bench_remove);
criterion_main!(benches);
