//! Packed base-2 generator matrices.

use super::GeneratorMatrix;
use crate::config::DigitOrder;
use crate::error::{HupsError, Result};

/// Bits of an `f64` mantissa.
const MANTISSA_BITS: usize = 53;

/// Base-2 generator matrix with one `u64` word per column.
///
/// Row `p` of a column is stored at bit `rows - 1 - p`, so a packed column
/// read as an integer and divided by `2^rows` is exactly the contribution of
/// that column to the output value. Matrix-vector products become XORs of
/// the columns selected by the set bits of the point index.
///
/// Columns are kept in index-bit order: column `c` is selected by bit `c`
/// of the index, whatever digit order the unpacked matrix used.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinaryMatrix {
    rows: usize,
    columns: Vec<u64>,
}

impl BinaryMatrix {
    /// Packs a base-2 generator matrix.
    ///
    /// With [`DigitOrder::MostSignificantFirst`] the column order is
    /// reversed so that bit `c` of the index still selects packed column `c`.
    ///
    /// # Errors
    ///
    /// `HupsError::InvalidConstruction` if the matrix is not base 2 or has
    /// more than 64 rows.
    pub fn pack(matrix: &GeneratorMatrix, order: DigitOrder) -> Result<Self> {
        if matrix.base() != 2 {
            return Err(HupsError::InvalidConstruction(format!(
                "cannot pack a base-{} matrix into bits",
                matrix.base()
            )));
        }
        let rows = matrix.num_rows();
        if rows > 64 {
            return Err(HupsError::InvalidConstruction(format!(
                "cannot pack {} rows into a 64-bit word",
                rows
            )));
        }
        Ok(Self::pack_validated(matrix, order))
    }

    /// Packs a matrix already known to be base 2 with at most 64 rows.
    pub(crate) fn pack_validated(matrix: &GeneratorMatrix, order: DigitOrder) -> Self {
        let rows = matrix.num_rows();
        let k = matrix.num_columns();
        let columns = (0..k)
            .map(|c| {
                let source = match order {
                    DigitOrder::LeastSignificantFirst => c,
                    DigitOrder::MostSignificantFirst => k - 1 - c,
                };
                (0..rows).fold(0u64, |word, p| {
                    word | ((matrix.entry(p, source) as u64) << (rows - 1 - p))
                })
            })
            .collect();
        Self { rows, columns }
    }

    /// Number of rows.
    #[inline]
    pub fn num_rows(&self) -> usize {
        self.rows
    }

    /// Number of columns.
    #[inline]
    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    /// Packed column `c`.
    #[inline]
    pub fn column(&self, c: usize) -> u64 {
        self.columns.get(c).copied().unwrap_or(0)
    }

    /// Output bits of point `index`: XOR of the columns selected by its
    /// set bits. Bits above the last column are ignored.
    #[inline]
    pub fn apply_index(&self, index: u64) -> u64 {
        self.xor_columns(index)
    }

    /// XOR of the columns selected by `mask`.
    ///
    /// Linear in `mask`, so `xor_columns(a ^ b) == xor_columns(a) ^ xor_columns(b)`;
    /// the incremental cursor relies on this.
    #[inline]
    pub fn xor_columns(&self, mask: u64) -> u64 {
        let mut bits = mask;
        let mut out = 0u64;
        while bits != 0 {
            let c = bits.trailing_zeros() as usize;
            match self.columns.get(c) {
                Some(&column) => out ^= column,
                None => break,
            }
            bits &= bits - 1;
        }
        out
    }

    /// Converts packed output bits to a value in `[0, 1)`.
    ///
    /// Bits beyond the 53rd are truncated so the conversion is exact.
    #[inline]
    pub fn to_fraction(&self, bits: u64) -> f64 {
        bits_to_fraction(bits, self.rows)
    }
}

/// Converts the top `rows` bits of `bits` (MSB-aligned at bit `rows - 1`)
/// to a value in `[0, 1)`.
#[inline]
pub fn bits_to_fraction(bits: u64, rows: usize) -> f64 {
    if rows == 0 {
        return 0.0;
    }
    if rows > MANTISSA_BITS {
        let shift = rows - MANTISSA_BITS;
        (bits >> shift) as f64 / (1u64 << MANTISSA_BITS) as f64
    } else {
        bits as f64 / (1u64 << rows) as f64
    }
}

/// Packs an output digit vector (row 0 first) into bits.
#[inline]
pub fn pack_digits(digits: &[u32], rows: usize) -> u64 {
    digits
        .iter()
        .take(rows)
        .enumerate()
        .fold(0u64, |word, (p, &d)| word | (((d & 1) as u64) << (rows - 1 - p)))
}
