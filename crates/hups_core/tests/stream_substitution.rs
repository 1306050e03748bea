//! Point-set iterators used in place of a pseudo-random stream.
//!
//! The same estimator runs under Monte Carlo and quasi-Monte Carlo; only
//! the uniform source changes.

use hups_core::randomization::DigitalShift;
use hups_core::stream::{UniformRng, UniformSource};
use hups_core::{CycleBasedPointSet, CycleConfig, DigitalNet, NetConfig, PointSet};
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Estimates the integral of `u1 * u2` over the unit square (exactly 1/4),
/// one replication per substream.
fn estimate_product<S: UniformSource>(source: &mut S, replications: usize) -> f64 {
    let mut sum = 0.0;
    let mut u = [0.0; 2];
    for _ in 0..replications {
        source.fill_uniform(&mut u).unwrap();
        sum += u[0] * u[1];
        source.reset_next_substream();
    }
    sum / replications as f64
}

fn pascal_columns(dim: usize, c: usize, rows: usize, _base: u32) -> hups_core::Result<Vec<u32>> {
    Ok((0..rows)
        .map(|p| if dim == 0 { (p == c) as u32 } else { (p & c == p) as u32 })
        .collect())
}

#[test]
fn test_monte_carlo_estimate() {
    init_tracing();
    let mut rng = UniformRng::from_seed(2718);
    let estimate = estimate_product(&mut rng, 20_000);
    assert!((estimate - 0.25).abs() < 0.02, "estimate {}", estimate);
}

#[test]
fn test_quasi_monte_carlo_estimate() {
    init_tracing();
    let config = NetConfig::new().with_dimension(2).with_columns(10).with_rows(31);
    let net = DigitalNet::from_source(config, pascal_columns).unwrap();

    let generic = estimate_product(&mut net.iter(), 1024);
    let incremental = estimate_product(&mut net.binary_cursor().unwrap(), 1024);
    assert_eq!(generic, incremental);
    assert!((generic - 0.25).abs() < 5e-3, "estimate {}", generic);
}

#[test]
fn test_randomised_quasi_monte_carlo_estimate() {
    init_tracing();
    let config = NetConfig::new().with_dimension(2).with_columns(10).with_rows(31);
    let mut net = DigitalNet::from_source(config, pascal_columns).unwrap();
    let mut rng = UniformRng::from_seed(31);

    let mut estimates = Vec::new();
    for _ in 0..8 {
        net.randomize(DigitalShift::draw(2, 2, 31, &mut rng).unwrap().into())
            .unwrap();
        estimates.push(estimate_product(&mut net.binary_cursor().unwrap(), 1024));
        net.unrandomize();
    }
    let mean = estimates.iter().sum::<f64>() / estimates.len() as f64;
    assert!((mean - 0.25).abs() < 5e-3, "mean {}", mean);
}

#[test]
fn test_cycle_set_as_uniform_source() {
    init_tracing();
    let n = 1021;
    let states: Vec<u64> = (0..n).collect();
    // 76 generates a good two-dimensional Korobov lattice for n = 1021
    let set = CycleBasedPointSet::from_recurrence(
        &states,
        move |x| 76 * x % n,
        move |x| x as f64 / n as f64,
        CycleConfig::default(),
    )
    .unwrap();
    let estimate = estimate_product(&mut set.iter(), n as usize);
    assert!((estimate - 0.25).abs() < 0.01, "estimate {}", estimate);
}

#[test]
fn test_stream_resets() {
    let net = DigitalNet::van_der_corput(2, 4, 31).unwrap();
    let mut it = net.iter();
    let a = it.next_uniform().unwrap();
    it.reset_next_substream();
    let b = it.next_uniform().unwrap();
    it.reset_start_substream();
    assert_eq!(it.next_uniform().unwrap(), b);
    it.reset_start_stream();
    assert_eq!(it.next_uniform().unwrap(), a);

    let mut rng = UniformRng::from_seed(5);
    let x = rng.next_uniform().unwrap();
    rng.reset_next_substream();
    rng.reset_start_stream();
    assert_eq!(rng.next_uniform().unwrap(), x);
}
