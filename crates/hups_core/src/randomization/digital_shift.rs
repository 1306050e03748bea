//! Random digital shift in base b.

use crate::config::check_base;
use crate::error::{HupsError, Result};
use crate::matrix::pack_digits;
use crate::radical_inverse::fraction_to_digits;
use rand::Rng;

/// Random digital shift in base `b`.
///
/// Holds one digit vector `d_1, d_2, ...` per dimension. Each output digit
/// of every generated point is shifted by the matching `d_p` modulo `b`
/// before conversion to a real. For `b = 2` this is a bitwise XOR and the
/// shift is its own inverse.
///
/// A digital shift preserves the equidistribution properties of the
/// underlying net; this is a mathematical property of the construction and
/// is not checked at run time.
///
/// # Examples
///
/// ```
/// use hups_core::randomization::DigitalShift;
///
/// let shift = DigitalShift::new(2, vec![vec![1, 0, 1]]).unwrap();
/// let mut digits = vec![1, 1, 0];
/// shift.apply_digits(0, &mut digits);
/// assert_eq!(digits, vec![0, 1, 1]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DigitalShift {
    base: u32,
    digits: Vec<Vec<u32>>,
}

impl DigitalShift {
    /// Builds a shift from explicit per-dimension digit vectors.
    ///
    /// # Errors
    ///
    /// `HupsError::InvalidConstruction` for `base < 2` or a digit `>= base`.
    pub fn new(base: u32, digits: Vec<Vec<u32>>) -> Result<Self> {
        check_base(base)?;
        if let Some(&bad) = digits.iter().flatten().find(|&&d| d >= base) {
            return Err(HupsError::InvalidConstruction(format!(
                "shift digit {} is not valid in base {}",
                bad, base
            )));
        }
        Ok(Self { base, digits })
    }

    /// Draws `precision` uniform digits for each of `dimension` coordinates.
    pub fn draw<R: Rng + ?Sized>(
        base: u32,
        dimension: usize,
        precision: usize,
        rng: &mut R,
    ) -> Result<Self> {
        check_base(base)?;
        let digits = (0..dimension)
            .map(|_| (0..precision).map(|_| rng.gen_range(0..base)).collect())
            .collect();
        Ok(Self { base, digits })
    }

    /// Builds a shift from one uniform value per dimension, expanded in
    /// base `b` to `precision` digits.
    pub fn from_uniforms(base: u32, uniforms: &[f64], precision: usize) -> Result<Self> {
        check_base(base)?;
        if let Some(bad) = uniforms.iter().find(|u| !(0.0..1.0).contains(*u)) {
            return Err(HupsError::InvalidConstruction(format!(
                "shift value {} is outside [0, 1)",
                bad
            )));
        }
        let digits = uniforms
            .iter()
            .map(|&u| fraction_to_digits(u, base, precision))
            .collect();
        Ok(Self { base, digits })
    }

    /// Digit base.
    #[inline]
    pub fn base(&self) -> u32 {
        self.base
    }

    /// Number of shifted dimensions.
    #[inline]
    pub fn dimension(&self) -> usize {
        self.digits.len()
    }

    /// Shift digits of dimension `dim`; `None` beyond the shifted dimensions.
    #[inline]
    pub fn digits(&self, dim: usize) -> Option<&[u32]> {
        self.digits.get(dim).map(Vec::as_slice)
    }

    /// The shift that undoes this one: `(b - d) mod b` digit-wise.
    ///
    /// For base 2 this is the shift itself.
    pub fn inverse(&self) -> Self {
        let b = self.base;
        Self {
            base: b,
            digits: self
                .digits
                .iter()
                .map(|ds| ds.iter().map(|&d| (b - d) % b).collect())
                .collect(),
        }
    }

    /// Adds the shift of dimension `dim` to `digits` modulo `b`.
    ///
    /// Output digits past the shift precision are left unchanged, as are
    /// dimensions the shift does not cover.
    pub fn apply_digits(&self, dim: usize, digits: &mut [u32]) {
        if let Some(shift) = self.digits.get(dim) {
            for (y, &d) in digits.iter_mut().zip(shift) {
                *y = (*y + d) % self.base;
            }
        }
    }

    /// Shift of dimension `dim` packed into the top `rows` bits of a word.
    /// Only meaningful for base 2.
    pub fn bits(&self, dim: usize, rows: usize) -> u64 {
        self.digits
            .get(dim)
            .map_or(0, |shift| pack_digits(shift, rows))
    }
}
