//! Point-set traversal protocol.
//!
//! An iterator is a `(point index, coordinate index)` cursor over a point
//! set, starting at `(0, 0)`. It borrows the point set immutably, so it can
//! never outlive it, and it owns its cursor, so distinct iterators over the
//! same set never observe each other's position.
//!
//! Every iterator is also a [`UniformSource`](crate::stream::UniformSource):
//! reading coordinates one after the other is indistinguishable, from the
//! consumer's side, from drawing uniforms out of a pseudo-random stream.
//!
//! # Example
//!
//! ```
//! use hups_core::{DigitalNet, PointSet, PointSetIterator};
//!
//! let net = DigitalNet::van_der_corput(2, 3, 31).unwrap();
//! let mut it = net.iter();
//! let first: Vec<f64> = (0..4).map(|_| {
//!     let x = it.next_coordinate().unwrap();
//!     it.reset_to_next_point();
//!     x
//! }).collect();
//! assert_eq!(first, vec![0.0, 0.5, 0.25, 0.75]);
//! ```

use crate::error::{HupsError, Result};
use crate::point_set::{Extent, PointSet};
use tracing::trace;

/// Stateful cursor over a point set.
///
/// A cursor may sit one past the last point (after reading it); every read
/// from there fails with `HupsError::OutOfRange` until the cursor is moved
/// back. Nothing ever wraps around silently.
pub trait PointSetIterator {
    /// Number of points of the underlying set.
    fn num_points(&self) -> Extent;

    /// Dimension of the underlying set.
    fn dimension(&self) -> Extent;

    /// Index of the current point.
    fn current_point_index(&self) -> usize;

    /// Index of the next coordinate to be returned.
    fn current_coordinate_index(&self) -> usize;

    /// Moves the cursor to (`point`, `coordinate`).
    ///
    /// # Errors
    ///
    /// `HupsError::OutOfRange` if either index exceeds a finite bound; the
    /// cursor is left where it was.
    fn set_cursor(&mut self, point: usize, coordinate: usize) -> Result<()>;

    /// Returns to `(0, 0)`. Randomisations are not affected.
    fn reset_to_start(&mut self);

    /// Returns to coordinate 0 of the current point.
    fn reset_current_coordinate(&mut self);

    /// Moves to coordinate 0 of the next point.
    fn reset_to_next_point(&mut self);

    /// Returns the current coordinate and advances to the next one.
    fn next_coordinate(&mut self) -> Result<f64>;

    /// Whether the current point exists.
    fn has_next_point(&self) -> bool {
        self.num_points().contains(self.current_point_index())
    }

    /// Whether the current coordinate exists.
    fn has_next_coordinate(&self) -> bool {
        self.has_next_point() && self.dimension().contains(self.current_coordinate_index())
    }

    /// Fills `buffer` with the next `buffer.len()` coordinates of the
    /// current point. Bounds are checked before anything is read.
    fn next_coordinates(&mut self, buffer: &mut [f64]) -> Result<()> {
        self.num_points()
            .check("point", self.current_point_index())?;
        if let Some(dim) = self.dimension().finite() {
            let end = self.current_coordinate_index() + buffer.len();
            if end > dim {
                return Err(HupsError::coordinate_out_of_range(end - 1, dim));
            }
        }
        for slot in buffer.iter_mut() {
            *slot = self.next_coordinate()?;
        }
        Ok(())
    }

    /// Fills `buffer` with the first `buffer.len()` coordinates of the
    /// current point, then moves to the next point.
    fn next_point(&mut self, buffer: &mut [f64]) -> Result<()> {
        self.num_points()
            .check("point", self.current_point_index())?;
        if let Some(dim) = self.dimension().finite() {
            if buffer.len() > dim {
                return Err(HupsError::coordinate_out_of_range(buffer.len() - 1, dim));
            }
        }
        self.reset_current_coordinate();
        self.next_coordinates(buffer)?;
        self.reset_to_next_point();
        Ok(())
    }
}

/// Cursor position and bounds shared by the iterator implementations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct CursorState {
    pub(crate) point: usize,
    pub(crate) coordinate: usize,
    points: Extent,
    dims: Extent,
}

impl CursorState {
    pub(crate) fn new(points: Extent, dims: Extent) -> Self {
        Self {
            point: 0,
            coordinate: 0,
            points,
            dims,
        }
    }

    #[inline]
    pub(crate) fn points(&self) -> Extent {
        self.points
    }

    #[inline]
    pub(crate) fn dims(&self) -> Extent {
        self.dims
    }

    pub(crate) fn set(&mut self, point: usize, coordinate: usize) -> Result<()> {
        self.points.check("point", point)?;
        self.dims.check("coordinate", coordinate)?;
        trace!(point, coordinate, "cursor repositioned");
        self.point = point;
        self.coordinate = coordinate;
        Ok(())
    }

    /// Current position, if it can be read.
    #[inline]
    pub(crate) fn readable(&self) -> Result<(usize, usize)> {
        self.points.check("point", self.point)?;
        self.dims.check("coordinate", self.coordinate)?;
        Ok((self.point, self.coordinate))
    }

    #[inline]
    pub(crate) fn reset(&mut self) {
        self.point = 0;
        self.coordinate = 0;
    }

    #[inline]
    pub(crate) fn next_point(&mut self) {
        self.point = self.point.saturating_add(1);
        self.coordinate = 0;
    }
}

/// Random-access iterator over any [`PointSet`].
///
/// Each coordinate is obtained from `PointSet::coordinate`, so the cost per
/// coordinate is that of direct evaluation.
pub struct PointCursor<'a, P: PointSet + ?Sized> {
    set: &'a P,
    state: CursorState,
}

impl<'a, P: PointSet + ?Sized> PointCursor<'a, P> {
    /// Creates a cursor at `(0, 0)`.
    pub fn new(set: &'a P) -> Self {
        Self {
            set,
            state: CursorState::new(set.num_points(), set.dimension()),
        }
    }

    /// The point set being traversed.
    pub fn point_set(&self) -> &'a P {
        self.set
    }
}

impl<P: PointSet + ?Sized> Clone for PointCursor<'_, P> {
    fn clone(&self) -> Self {
        Self {
            set: self.set,
            state: self.state,
        }
    }
}

impl<P: PointSet + ?Sized> PointSetIterator for PointCursor<'_, P> {
    fn num_points(&self) -> Extent {
        self.state.points()
    }

    fn dimension(&self) -> Extent {
        self.state.dims()
    }

    fn current_point_index(&self) -> usize {
        self.state.point
    }

    fn current_coordinate_index(&self) -> usize {
        self.state.coordinate
    }

    fn set_cursor(&mut self, point: usize, coordinate: usize) -> Result<()> {
        self.state.set(point, coordinate)
    }

    fn reset_to_start(&mut self) {
        self.state.reset();
    }

    fn reset_current_coordinate(&mut self) {
        self.state.coordinate = 0;
    }

    fn reset_to_next_point(&mut self) {
        self.state.next_point();
    }

    fn next_coordinate(&mut self) -> Result<f64> {
        let (i, j) = self.state.readable()?;
        let value = self.set.coordinate(i, j)?;
        self.state.coordinate += 1;
        Ok(value)
    }
}
