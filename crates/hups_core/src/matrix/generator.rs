//! Generator matrices over `Z_b`.

use super::ColumnSource;
use crate::config::check_base;
use crate::error::{HupsError, Result};

/// Generator matrix of one coordinate of a digital construction.
///
/// Rows index output digits (row 0 carries weight `b^-1`), columns index
/// input digits of the point index. The matrix is stored column-major so
/// that growth only ever appends: existing columns are never mutated.
///
/// # Invariants
///
/// - `base >= 2`, every entry is in `0..base`
/// - every column has exactly `rows` entries
/// - `num_columns() <= rows`
///
/// # Example
///
/// ```
/// use hups_core::matrix::GeneratorMatrix;
///
/// let m = GeneratorMatrix::identity(2, 3, 5).unwrap();
/// // index 6 = [0, 1, 1] (least significant digit first)
/// assert_eq!(m.apply(&[0, 1, 1]).unwrap(), vec![0, 1, 1, 0, 0]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratorMatrix {
    base: u32,
    rows: usize,
    columns: Vec<Vec<u32>>,
}

impl GeneratorMatrix {
    /// Builds a matrix from explicit columns.
    ///
    /// # Arguments
    ///
    /// * `base` - Modulus of the digit arithmetic
    /// * `rows` - Number of output digits `r`
    /// * `columns` - Columns in index-digit order, each with `rows` entries
    ///
    /// # Errors
    ///
    /// `HupsError::InvalidConstruction` if `base < 2`, a column does not
    /// have `rows` entries, an entry is not a digit of `base`, or there are
    /// more columns than rows.
    pub fn new(base: u32, rows: usize, columns: Vec<Vec<u32>>) -> Result<Self> {
        check_base(base)?;
        if columns.len() > rows {
            return Err(HupsError::InvalidConstruction(format!(
                "{} columns exceed the output precision of {} rows",
                columns.len(),
                rows
            )));
        }
        for (c, column) in columns.iter().enumerate() {
            validate_column(base, rows, c, column)?;
        }
        Ok(Self {
            base,
            rows,
            columns,
        })
    }

    /// The all-zero `rows x cols` matrix.
    pub fn zero(base: u32, cols: usize, rows: usize) -> Result<Self> {
        Self::new(base, rows, vec![vec![0; rows]; cols])
    }

    /// Identity construction: column `c` has a single 1 in row `c`.
    ///
    /// With least-significant-first digit vectors this reproduces the
    /// van der Corput sequence in `base`.
    pub fn identity(base: u32, cols: usize, rows: usize) -> Result<Self> {
        let mut m = Self::zero(base, cols, rows)?;
        for (c, column) in m.columns.iter_mut().enumerate() {
            column[c] = 1;
        }
        Ok(m)
    }

    /// Reflected identity: column `c` has a single 1 in row `cols - 1 - c`.
    ///
    /// With least-significant-first digit vectors point `i` maps to
    /// `i / base^cols`, i.e. the points come out in natural ascending order.
    pub fn reflected_identity(base: u32, cols: usize, rows: usize) -> Result<Self> {
        let mut m = Self::zero(base, cols, rows)?;
        for (c, column) in m.columns.iter_mut().enumerate() {
            column[cols - 1 - c] = 1;
        }
        Ok(m)
    }

    /// Digit base.
    #[inline]
    pub fn base(&self) -> u32 {
        self.base
    }

    /// Number of rows `r`.
    #[inline]
    pub fn num_rows(&self) -> usize {
        self.rows
    }

    /// Number of columns `k`.
    #[inline]
    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    /// Column `c`, or `None` past the last column.
    #[inline]
    pub fn column(&self, c: usize) -> Option<&[u32]> {
        self.columns.get(c).map(Vec::as_slice)
    }

    /// Entry at (`row`, `col`); zero outside the stored block.
    #[inline]
    pub fn entry(&self, row: usize, col: usize) -> u32 {
        self.columns
            .get(col)
            .and_then(|column| column.get(row))
            .copied()
            .unwrap_or(0)
    }

    /// Multiplies the matrix by a digit vector modulo `base`.
    ///
    /// Shorter digit vectors are treated as zero-padded.
    ///
    /// # Errors
    ///
    /// `HupsError::OutOfRange` if `digits` is longer than the number of
    /// columns.
    pub fn apply(&self, digits: &[u32]) -> Result<Vec<u32>> {
        let mut out = vec![0; self.rows];
        self.apply_into(digits, &mut out)?;
        Ok(out)
    }

    /// Allocation-free form of [`GeneratorMatrix::apply`]; `out` must hold
    /// at least `num_rows()` entries.
    pub fn apply_into(&self, digits: &[u32], out: &mut [u32]) -> Result<()> {
        if digits.len() > self.columns.len() {
            return Err(HupsError::OutOfRange {
                what: "digit",
                index: digits.len() as u64,
                bound: self.columns.len() as u64,
            });
        }
        let b = self.base as u64;
        let out = &mut out[..self.rows];
        out.iter_mut().for_each(|y| *y = 0);
        for (column, &a) in self.columns.iter().zip(digits) {
            if a == 0 {
                continue;
            }
            for (y, &m) in out.iter_mut().zip(column) {
                *y = ((*y as u64 + a as u64 * m as u64) % b) as u32;
            }
        }
        Ok(())
    }

    /// Appends columns from `source` until the matrix has `new_count`
    /// columns. Existing columns are left untouched; a smaller `new_count`
    /// is a no-op.
    ///
    /// # Errors
    ///
    /// `HupsError::InvalidConstruction` if `new_count` exceeds the number
    /// of rows or the source yields a malformed column.
    pub fn grow_columns(
        &mut self,
        new_count: usize,
        source: &dyn ColumnSource,
        dim: usize,
    ) -> Result<()> {
        if new_count <= self.columns.len() {
            return Ok(());
        }
        if new_count > self.rows {
            return Err(HupsError::InvalidConstruction(format!(
                "cannot grow to {} columns with {} rows of output precision",
                new_count, self.rows
            )));
        }
        let mut fresh = Vec::with_capacity(new_count - self.columns.len());
        for c in self.columns.len()..new_count {
            let column = source.column(dim, c, self.rows, self.base)?;
            validate_column(self.base, self.rows, c, &column)?;
            fresh.push(column);
        }
        self.columns.extend(fresh);
        Ok(())
    }

    /// Whether the leading `k x k` block is invertible over `Z_b`.
    ///
    /// Gaussian elimination accepts only pivots that are units modulo `b`.
    /// For prime bases this is exact; for composite bases a `false` may be
    /// conservative.
    pub fn leading_block_is_nonsingular(&self) -> bool {
        let k = self.columns.len();
        let b = self.base as u64;
        // Row-major copy of the k x k block.
        let mut a: Vec<Vec<u64>> = (0..k)
            .map(|row| (0..k).map(|col| self.columns[col][row] as u64).collect())
            .collect();
        for col in 0..k {
            let Some(pivot_row) = (col..k).find(|&r| mod_inverse(a[r][col], b).is_some()) else {
                return false;
            };
            a.swap(col, pivot_row);
            let Some(inv) = mod_inverse(a[col][col], b) else {
                return false;
            };
            for r in 0..k {
                if r == col || a[r][col] == 0 {
                    continue;
                }
                let factor = a[r][col] * inv % b;
                for c in col..k {
                    let sub = factor * a[col][c] % b;
                    a[r][c] = (a[r][c] + b - sub) % b;
                }
            }
        }
        true
    }

    /// Returns `lower * self` modulo `base`.
    ///
    /// `lower` is a row-major `r x r` matrix; only its lower triangle is
    /// read. This is the matrix form of a left-matrix scramble.
    pub fn left_multiply(&self, lower: &[Vec<u32>]) -> Self {
        let columns = self
            .columns
            .iter()
            .map(|column| lower_times(lower, column, self.base))
            .collect();
        Self {
            base: self.base,
            rows: self.rows,
            columns,
        }
    }
}

/// Product of a lower-triangular row-major matrix with a digit vector.
pub(crate) fn lower_times(lower: &[Vec<u32>], digits: &[u32], base: u32) -> Vec<u32> {
    let b = base as u64;
    (0..digits.len())
        .map(|p| match lower.get(p) {
            // Rows missing from `lower` act as identity rows.
            None => digits[p],
            Some(row) => row
                .iter()
                .take(p + 1)
                .zip(digits)
                .fold(0u64, |acc, (&l, &d)| (acc + l as u64 * d as u64) % b)
                as u32,
        })
        .collect()
}

fn validate_column(base: u32, rows: usize, index: usize, column: &[u32]) -> Result<()> {
    if column.len() != rows {
        return Err(HupsError::InvalidConstruction(format!(
            "column {} has {} entries, expected {}",
            index,
            column.len(),
            rows
        )));
    }
    if let Some(&bad) = column.iter().find(|&&d| d >= base) {
        return Err(HupsError::InvalidConstruction(format!(
            "column {} holds {} which is not a digit of base {}",
            index, bad, base
        )));
    }
    Ok(())
}

/// Multiplicative inverse of `a` modulo `m`, if `gcd(a, m) = 1`.
pub(crate) fn mod_inverse(a: u64, m: u64) -> Option<u64> {
    let (mut old_r, mut r) = (a as i128 % m as i128, m as i128);
    let (mut old_s, mut s) = (1i128, 0i128);
    while r != 0 {
        let q = old_r / r;
        (old_r, r) = (r, old_r - q * r);
        (old_s, s) = (s, old_s - q * s);
    }
    if old_r != 1 {
        return None;
    }
    Some(old_s.rem_euclid(m as i128) as u64)
}
