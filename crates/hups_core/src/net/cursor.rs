//! Incremental traversal of base-2 digital nets.

use super::DigitalNet;
use crate::config::TraversalOrder;
use crate::error::Result;
use crate::iterator::{CursorState, PointSetIterator};
use crate::matrix::bits_to_fraction;
use crate::point_set::{Extent, PointSet};

/// Cursor over a base-2 [`DigitalNet`] that updates each coordinate by XOR.
///
/// For every dimension the cursor remembers the index whose output bits it
/// holds. Reading coordinate `j` of point `t` XORs in the packed columns
/// selected by `cached ^ t`, which is exact because the matrix-vector
/// product is linear over `Z_2`. In natural order consecutive points differ
/// in a run of trailing bits, in Gray-code order in exactly one.
///
/// The matrix lock is only held while reading a column word, never between
/// calls, so a sequence may grow while cursors are alive.
#[derive(Debug, Clone)]
pub struct BinaryNetCursor<'a> {
    net: &'a DigitalNet,
    state: CursorState,
    order: TraversalOrder,
    cached_index: Vec<u64>,
    cached_bits: Vec<u64>,
}

impl<'a> BinaryNetCursor<'a> {
    pub(crate) fn new(net: &'a DigitalNet, order: TraversalOrder) -> Self {
        let dims = net.config().dimension;
        Self {
            net,
            state: CursorState::new(net.num_points(), net.dimension()),
            order,
            cached_index: vec![0; dims],
            cached_bits: vec![0; dims],
        }
    }

    /// Traversal order of this cursor.
    #[inline]
    pub fn traversal(&self) -> TraversalOrder {
        self.order
    }

    /// Index of the net point visited at step `step`.
    #[inline]
    pub fn point_at_step(&self, step: usize) -> usize {
        match self.order {
            TraversalOrder::Natural => step,
            TraversalOrder::GrayCode => step ^ (step >> 1),
        }
    }
}

impl PointSetIterator for BinaryNetCursor<'_> {
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
        let (step, j) = self.state.readable()?;
        let target = self.point_at_step(step);
        if self.net.is_sequence() {
            self.net.ensure_points(target.saturating_add(1))?;
        }
        let mask = self.cached_index[j] ^ target as u64;
        if mask != 0 {
            let bank = self.net.read_bank();
            if let Some(packed) = bank.packed(j) {
                self.cached_bits[j] ^= packed.xor_columns(mask);
            }
            self.cached_index[j] = target as u64;
        }
        let bits = self.cached_bits[j] ^ self.net.shift_bits(j);
        let value = self
            .net
            .finish(j, bits_to_fraction(bits, self.net.num_rows()));
        self.state.coordinate += 1;
        Ok(value)
    }
}
