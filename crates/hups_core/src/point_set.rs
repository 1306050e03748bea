//! The shared point-set contract.
//!
//! A point set is conceptually an `n x t` array of reals in `[0, 1)` where
//! `n` and `t` may each be infinite. It is never materialised: coordinates
//! are computed on demand from the generation rule.

use crate::error::{HupsError, Result};
use crate::iterator::PointCursor;
use crate::randomization::{Randomization, RandomizationPipeline};
use std::fmt;

/// Size of a point-set axis: a finite count or unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Extent {
    /// Exactly this many entries.
    Finite(usize),
    /// Unbounded.
    Infinite,
}

impl Extent {
    /// Whether `index` lies inside the extent.
    #[inline]
    pub fn contains(self, index: usize) -> bool {
        match self {
            Extent::Finite(n) => index < n,
            Extent::Infinite => true,
        }
    }

    /// The finite count, if any.
    #[inline]
    pub fn finite(self) -> Option<usize> {
        match self {
            Extent::Finite(n) => Some(n),
            Extent::Infinite => None,
        }
    }

    /// Whether the extent is unbounded.
    #[inline]
    pub fn is_infinite(self) -> bool {
        matches!(self, Extent::Infinite)
    }

    /// Checks `index` against the extent, naming the axis on failure.
    pub(crate) fn check(self, what: &'static str, index: usize) -> Result<()> {
        match self {
            Extent::Finite(n) if index >= n => Err(HupsError::OutOfRange {
                what,
                index: index as u64,
                bound: n as u64,
            }),
            _ => Ok(()),
        }
    }
}

impl fmt::Display for Extent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Extent::Finite(n) => write!(f, "{}", n),
            Extent::Infinite => write!(f, "infinite"),
        }
    }
}

/// Common contract of every point-set construction.
///
/// Implementations differ only in how a coordinate is generated; the
/// traversal protocol, randomisation hooks and stream substitutability are
/// shared. `coordinate(i, j)` must be a pure function of the construction
/// and its active randomisations.
///
/// Point sets are `Sync`: any number of iterators may traverse the same
/// set from different threads. Randomising requires `&mut self`, so it
/// cannot overlap a traversal.
///
/// Wrappers (padding, subsets, caches, ...) implement this trait by
/// delegating to the wrapped set. Every level of wrapping adds one
/// indirection to each coordinate access.
pub trait PointSet: Sync {
    /// Number of points `n`.
    fn num_points(&self) -> Extent;

    /// Number of coordinates per point `t`.
    fn dimension(&self) -> Extent;

    /// Coordinate `j` of point `i`, with randomisations applied.
    ///
    /// # Errors
    ///
    /// `HupsError::OutOfRange` if `i` or `j` exceeds a finite bound.
    fn coordinate(&self, i: usize, j: usize) -> Result<f64>;

    /// Fills `buffer` with the first `buffer.len()` coordinates of point `i`.
    fn point(&self, i: usize, buffer: &mut [f64]) -> Result<()> {
        self.num_points().check("point", i)?;
        if let Some(dim) = self.dimension().finite() {
            if buffer.len() > dim {
                return Err(HupsError::coordinate_out_of_range(buffer.len() - 1, dim));
            }
        }
        for (j, slot) in buffer.iter_mut().enumerate() {
            *slot = self.coordinate(i, j)?;
        }
        Ok(())
    }

    /// Pushes a randomisation.
    ///
    /// # Errors
    ///
    /// `HupsError::UnsupportedRandomization` if the construction cannot
    /// host it; the point set is left unchanged.
    fn randomize(&mut self, randomization: Randomization) -> Result<()>;

    /// Removes all randomisations, restoring the deterministic point set.
    fn unrandomize(&mut self);

    /// Active randomisations.
    fn randomizations(&self) -> &RandomizationPipeline;

    /// Creates an iterator positioned at `(0, 0)`.
    fn iter(&self) -> PointCursor<'_, Self>
    where
        Self: Sized,
    {
        PointCursor::new(self)
    }
}
