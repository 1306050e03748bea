//! Left-matrix scrambling of digital nets.

use crate::config::check_base;
use crate::error::{HupsError, Result};
use crate::matrix::{lower_times, mod_inverse};
use rand::Rng;

/// Left-matrix scramble (structural randomisation of a digital net).
///
/// Each dimension gets a random lower-triangular `r x r` matrix `L` over
/// `Z_b` whose diagonal entries are units modulo `b`. The generator matrix
/// `C` of that dimension is replaced by `L C`, which is invertible on the
/// leading block whenever `C` is, so every net property survives the
/// scramble. The original matrices are never overwritten; the point set
/// keeps `L` alongside them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeftMatrixScramble {
    base: u32,
    rows: usize,
    lower: Vec<Vec<Vec<u32>>>,
}

impl LeftMatrixScramble {
    /// Builds a scramble from explicit row-major lower-triangular matrices.
    ///
    /// # Errors
    ///
    /// `HupsError::InvalidConstruction` if a matrix is not `rows x rows`,
    /// has a non-zero entry above the diagonal, a digit `>= base`, or a
    /// diagonal entry that is not a unit modulo `base`.
    pub fn new(base: u32, rows: usize, lower: Vec<Vec<Vec<u32>>>) -> Result<Self> {
        check_base(base)?;
        for (dim, matrix) in lower.iter().enumerate() {
            validate_lower(base, rows, dim, matrix)?;
        }
        Ok(Self { base, rows, lower })
    }

    /// Draws a fresh scramble for `dimension` coordinates of `rows` digits.
    pub fn draw<R: Rng + ?Sized>(
        base: u32,
        dimension: usize,
        rows: usize,
        rng: &mut R,
    ) -> Result<Self> {
        check_base(base)?;
        let b = base as u64;
        let lower = (0..dimension)
            .map(|_| {
                (0..rows)
                    .map(|p| {
                        (0..rows)
                            .map(|q| match q.cmp(&p) {
                                std::cmp::Ordering::Less => rng.gen_range(0..base),
                                std::cmp::Ordering::Equal => draw_unit(base, b, rng),
                                std::cmp::Ordering::Greater => 0,
                            })
                            .collect()
                    })
                    .collect()
            })
            .collect();
        Ok(Self { base, rows, lower })
    }

    /// Digit base.
    #[inline]
    pub fn base(&self) -> u32 {
        self.base
    }

    /// Row count `r` of every scrambling matrix.
    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of scrambled dimensions.
    #[inline]
    pub fn dimension(&self) -> usize {
        self.lower.len()
    }

    /// Scrambling matrix of dimension `dim`, row-major.
    #[inline]
    pub fn lower(&self, dim: usize) -> Option<&[Vec<u32>]> {
        self.lower.get(dim).map(Vec::as_slice)
    }

    /// Replaces `digits` by `L digits` for dimension `dim`.
    pub fn apply_digits(&self, dim: usize, digits: &mut [u32]) {
        if let Some(lower) = self.lower.get(dim) {
            let scrambled = lower_times(lower, digits, self.base);
            digits.copy_from_slice(&scrambled);
        }
    }
}

/// Product `a * b` of two row-major lower-triangular `r x r` matrices.
pub(crate) fn compose_lower(a: &[Vec<u32>], b: &[Vec<u32>], base: u32) -> Vec<Vec<u32>> {
    let m = base as u64;
    let r = a.len();
    (0..r)
        .map(|p| {
            (0..r)
                .map(|q| {
                    if q > p {
                        return 0;
                    }
                    (q..=p).fold(0u64, |acc, t| {
                        (acc + a[p][t] as u64 * b[t][q] as u64) % m
                    }) as u32
                })
                .collect()
        })
        .collect()
}

fn draw_unit<R: Rng + ?Sized>(base: u32, b: u64, rng: &mut R) -> u32 {
    loop {
        let d = rng.gen_range(1..base);
        if mod_inverse(d as u64, b).is_some() {
            return d;
        }
    }
}

fn validate_lower(base: u32, rows: usize, dim: usize, matrix: &[Vec<u32>]) -> Result<()> {
    let invalid = |reason: String| {
        Err(HupsError::InvalidConstruction(format!(
            "scrambling matrix of dimension {}: {}",
            dim, reason
        )))
    };
    if matrix.len() != rows || matrix.iter().any(|row| row.len() != rows) {
        return invalid(format!("expected {} x {} entries", rows, rows));
    }
    for (p, row) in matrix.iter().enumerate() {
        for (q, &entry) in row.iter().enumerate() {
            if entry >= base {
                return invalid(format!("{} is not a digit of base {}", entry, base));
            }
            if q > p && entry != 0 {
                return invalid(format!("entry ({}, {}) above the diagonal", p, q));
            }
        }
        if mod_inverse(row[p] as u64, base as u64).is_none() {
            return invalid(format!("diagonal entry {} is not a unit", row[p]));
        }
    }
    Ok(())
}
