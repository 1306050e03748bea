//! Criterion benchmarks for the point generation engines.
//!
//! Compares direct evaluation of digital-net coordinates with the
//! incremental base-2 cursor, measures the general-base path, and times
//! cycle partitioning across state-space sizes.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use hups_core::cycle::partition_into_cycles;
use hups_core::randomization::{DigitalShift, LeftMatrixScramble};
use hups_core::{
    DigitalNet, IdentityColumns, NetConfig, PointSet, PointSetIterator, TraversalOrder,
};
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Upper-triangular columns with a dimension-dependent pattern.
fn triangular_columns(
    dim: usize,
    c: usize,
    rows: usize,
    _base: u32,
) -> hups_core::Result<Vec<u32>> {
    Ok((0..rows)
        .map(|p| {
            if p == c {
                1
            } else if p < c {
                (((p * 7 + c * 3 + dim) >> 1) & 1) as u32
            } else {
                0
            }
        })
        .collect())
}

fn binary_net(dimension: usize, k: usize, traversal: TraversalOrder) -> DigitalNet {
    let config = NetConfig::new()
        .with_dimension(dimension)
        .with_columns(k)
        .with_rows(31)
        .with_traversal(traversal);
    DigitalNet::from_source(config, triangular_columns).unwrap()
}

/// Benchmark one pass over a base-2 net, direct versus incremental.
fn bench_binary_traversal(c: &mut Criterion) {
    let mut group = c.benchmark_group("binary_traversal");
    let k = 12;

    for dimension in [1, 8, 32] {
        let net = binary_net(dimension, k, TraversalOrder::Natural);
        let gray = binary_net(dimension, k, TraversalOrder::GrayCode);
        let n = 1usize << k;

        group.bench_with_input(BenchmarkId::new("direct", dimension), &net, |b, net| {
            let mut point = vec![0.0; dimension];
            b.iter(|| {
                for i in 0..n {
                    net.point(black_box(i), &mut point).unwrap();
                }
            });
        });

        group.bench_with_input(BenchmarkId::new("cursor", dimension), &net, |b, net| {
            let mut point = vec![0.0; dimension];
            b.iter(|| {
                let mut cursor = net.binary_cursor().unwrap();
                while cursor.has_next_point() {
                    cursor.next_point(black_box(&mut point)).unwrap();
                }
            });
        });

        group.bench_with_input(BenchmarkId::new("gray_cursor", dimension), &gray, |b, net| {
            let mut point = vec![0.0; dimension];
            b.iter(|| {
                let mut cursor = net.binary_cursor().unwrap();
                while cursor.has_next_point() {
                    cursor.next_point(black_box(&mut point)).unwrap();
                }
            });
        });
    }

    group.finish();
}

/// Benchmark randomised evaluation (scramble folded into the matrices).
fn bench_randomised_net(c: &mut Criterion) {
    let mut group = c.benchmark_group("randomised_net");
    let mut rng = StdRng::seed_from_u64(42);
    let dimension = 8;

    let mut net = binary_net(dimension, 10, TraversalOrder::Natural);
    group.bench_function("randomise", |b| {
        b.iter(|| {
            net.randomize(
                LeftMatrixScramble::draw(2, dimension, 31, &mut rng)
                    .unwrap()
                    .into(),
            )
            .unwrap();
            net.randomize(DigitalShift::draw(2, dimension, 31, &mut rng).unwrap().into())
                .unwrap();
            net.unrandomize();
        });
    });

    net.randomize(LeftMatrixScramble::draw(2, dimension, 31, &mut rng).unwrap().into())
        .unwrap();
    group.bench_function("cursor_pass", |b| {
        let mut point = vec![0.0; dimension];
        b.iter(|| {
            let mut cursor = net.binary_cursor().unwrap();
            while cursor.has_next_point() {
                cursor.next_point(black_box(&mut point)).unwrap();
            }
        });
    });

    group.finish();
}

/// Benchmark the general-base evaluation path.
fn bench_general_base(c: &mut Criterion) {
    let mut group = c.benchmark_group("general_base");

    for base in [3u32, 5, 7] {
        let config = NetConfig::new().with_base(base).with_columns(5).with_rows(12);
        let net = DigitalNet::from_source(config, IdentityColumns).unwrap();
        let n = (base as usize).pow(5);
        group.bench_with_input(BenchmarkId::new("van_der_corput", base), &net, |b, net| {
            b.iter(|| {
                for i in 0..n {
                    let _ = net.coordinate(black_box(i), 0);
                }
            });
        });
    }

    group.finish();
}

/// Benchmark cycle partitioning of Korobov recurrences.
fn bench_cycle_partition(c: &mut Criterion) {
    let mut group = c.benchmark_group("cycle_partition");

    for n in [1021u64, 16381, 262139] {
        let states: Vec<u64> = (0..n).collect();
        group.bench_with_input(BenchmarkId::new("korobov", n), &states, |b, states| {
            b.iter(|| partition_into_cycles(black_box(states), |x| 3 * x % n).unwrap());
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_binary_traversal,
    bench_randomised_net,
    bench_general_base,
    bench_cycle_partition
);
criterion_main!(benches);
