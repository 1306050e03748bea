//! Uniform-stream interface shared by pseudo-random generators and
//! point-set iterators.
//!
//! Simulation code written against [`UniformSource`] runs unchanged under
//! Monte Carlo (with [`UniformRng`]) or quasi-Monte Carlo (with any
//! [`PointSetIterator`]). Substreams map to points: moving to the next
//! substream of an iterator moves to the next point, so one simulation
//! replication consumes the coordinates of one point.
//!
//! # Example
//!
//! ```
//! use hups_core::stream::{UniformRng, UniformSource};
//! use hups_core::{DigitalNet, PointSet};
//!
//! fn mean_of_first_coordinates<S: UniformSource>(source: &mut S, runs: usize) -> f64 {
//!     let mut sum = 0.0;
//!     for _ in 0..runs {
//!         sum += source.next_uniform().unwrap();
//!         source.reset_next_substream();
//!     }
//!     sum / runs as f64
//! }
//!
//! let net = DigitalNet::van_der_corput(2, 4, 31).unwrap();
//! let qmc = mean_of_first_coordinates(&mut net.iter(), 16);
//! assert_eq!(qmc, 15.0 / 32.0);
//!
//! let mc = mean_of_first_coordinates(&mut UniformRng::from_seed(42), 16);
//! assert!(mc > 0.0 && mc < 1.0);
//! ```

use crate::error::Result;
use crate::iterator::PointSetIterator;
use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};

/// Golden-ratio increment used to derive substream seeds.
const SUBSTREAM_STRIDE: u64 = 0x9E37_79B9_7F4A_7C15;

/// A resettable source of uniform values in `[0, 1)`.
pub trait UniformSource {
    /// Next uniform value.
    ///
    /// # Errors
    ///
    /// Point-set iterators fail with `HupsError::OutOfRange` once the
    /// current point or dimension is exhausted; pseudo-random sources
    /// never fail.
    fn next_uniform(&mut self) -> Result<f64>;

    /// Fills `buffer` with successive uniform values.
    fn fill_uniform(&mut self, buffer: &mut [f64]) -> Result<()> {
        for slot in buffer.iter_mut() {
            *slot = self.next_uniform()?;
        }
        Ok(())
    }

    /// Returns to the very beginning of the stream.
    fn reset_start_stream(&mut self);

    /// Returns to the beginning of the current substream.
    fn reset_start_substream(&mut self);

    /// Moves to the beginning of the next substream.
    fn reset_next_substream(&mut self);
}

impl<T: PointSetIterator + ?Sized> UniformSource for T {
    #[inline]
    fn next_uniform(&mut self) -> Result<f64> {
        self.next_coordinate()
    }

    fn fill_uniform(&mut self, buffer: &mut [f64]) -> Result<()> {
        self.next_coordinates(buffer)
    }

    fn reset_start_stream(&mut self) {
        self.reset_to_start();
    }

    fn reset_start_substream(&mut self) {
        self.reset_current_coordinate();
    }

    fn reset_next_substream(&mut self) {
        self.reset_to_next_point();
    }
}

/// Seeded pseudo-random uniform stream.
///
/// Wraps `rand::rngs::StdRng`. The stream is split into substreams; each
/// substream is seeded from the base seed and its ordinal, so restarting a
/// substream reproduces it exactly.
///
/// `UniformRng` also implements [`RngCore`], so it can draw randomisations
/// directly.
///
/// # Examples
///
/// ```
/// use hups_core::stream::{UniformRng, UniformSource};
///
/// let mut rng = UniformRng::from_seed(12345);
/// let a = rng.next_uniform().unwrap();
/// rng.reset_start_substream();
/// assert_eq!(rng.next_uniform().unwrap(), a);
/// ```
#[derive(Debug, Clone)]
pub struct UniformRng {
    inner: StdRng,
    seed: u64,
    substream: u64,
}

impl UniformRng {
    /// Creates a stream initialised with the given seed.
    #[inline]
    pub fn from_seed(seed: u64) -> Self {
        Self {
            inner: StdRng::seed_from_u64(seed),
            seed,
            substream: 0,
        }
    }

    /// Seed used for initialisation.
    #[inline]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Ordinal of the current substream.
    #[inline]
    pub fn substream(&self) -> u64 {
        self.substream
    }

    /// Single uniform value in `[0, 1)`.
    #[inline]
    pub fn gen_uniform(&mut self) -> f64 {
        self.inner.gen()
    }

    fn reseed(&mut self) {
        let derived = self.seed ^ self.substream.wrapping_mul(SUBSTREAM_STRIDE);
        self.inner = StdRng::seed_from_u64(derived);
    }
}

impl UniformSource for UniformRng {
    #[inline]
    fn next_uniform(&mut self) -> Result<f64> {
        Ok(self.gen_uniform())
    }

    fn reset_start_stream(&mut self) {
        self.substream = 0;
        self.reseed();
    }

    fn reset_start_substream(&mut self) {
        self.reseed();
    }

    fn reset_next_substream(&mut self) {
        self.substream = self.substream.wrapping_add(1);
        self.reseed();
    }
}

impl RngCore for UniformRng {
    fn next_u32(&mut self) -> u32 {
        self.inner.next_u32()
    }

    fn next_u64(&mut self) -> u64 {
        self.inner.next_u64()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.inner.fill_bytes(dest)
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> std::result::Result<(), rand::Error> {
        self.inner.try_fill_bytes(dest)
    }
}
