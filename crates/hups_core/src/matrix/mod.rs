//! # Generator matrices
//!
//! A digital construction in base `b` maps the digit vector of a point
//! index through one generator matrix per coordinate. This module holds the
//! matrix model and the interface through which concrete constructions
//! (Sobol, Faure, Niederreiter, ...) feed columns to it.
//!
//! ## Module Structure
//!
//! - [`GeneratorMatrix`]: general-base matrix, column-major, append-only
//! - [`BinaryMatrix`]: base-2 matrix packed one `u64` per column
//! - [`ColumnSource`]: supplier of generator columns for growth
//! - [`IdentityColumns`]: the extensible van der Corput construction

mod binary;
mod generator;

pub use binary::{bits_to_fraction, pack_digits, BinaryMatrix};
pub use generator::GeneratorMatrix;

pub(crate) use generator::{lower_times, mod_inverse};

use crate::error::Result;

/// Supplier of generator-matrix columns.
///
/// Concrete sequence constructions implement this to let a digital
/// sequence grow on demand. Column `index` must not depend on how many
/// columns were requested before it, so that growth preserves every
/// previously generated point.
///
/// Closures with the matching signature implement the trait:
///
/// ```
/// use hups_core::matrix::{ColumnSource, GeneratorMatrix};
///
/// // Column c of every dimension is e_c: the van der Corput sequence.
/// let source = |_dim: usize, c: usize, rows: usize, _base: u32| -> hups_core::Result<Vec<u32>> {
///     let mut column = vec![0; rows];
///     column[c] = 1;
///     Ok(column)
/// };
///
/// let mut m = GeneratorMatrix::identity(2, 1, 4).unwrap();
/// m.grow_columns(3, &source, 0).unwrap();
/// assert_eq!(m.num_columns(), 3);
/// ```
pub trait ColumnSource: Send + Sync {
    /// Column `index` of dimension `dim`, with `rows` digits in `0..base`.
    fn column(&self, dim: usize, index: usize, rows: usize, base: u32) -> Result<Vec<u32>>;
}

impl<F> ColumnSource for F
where
    F: Fn(usize, usize, usize, u32) -> Result<Vec<u32>> + Send + Sync,
{
    fn column(&self, dim: usize, index: usize, rows: usize, base: u32) -> Result<Vec<u32>> {
        self(dim, index, rows, base)
    }
}

/// Identity columns in every dimension.
///
/// Produces the van der Corput sequence in the base of the matrix, for
/// as many points as the row count allows.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityColumns;

impl ColumnSource for IdentityColumns {
    fn column(&self, _dim: usize, index: usize, rows: usize, _base: u32) -> Result<Vec<u32>> {
        let mut column = vec![0; rows];
        if let Some(entry) = column.get_mut(index) {
            *entry = 1;
        }
        Ok(column)
    }
}
