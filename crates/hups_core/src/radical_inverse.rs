//! Radical inverses and base-b digit expansions.
//!
//! The radical inverse of `i = a_0 + a_1 b + a_2 b^2 + ...` in base `b` is
//! `a_0 / b + a_1 / b^2 + a_2 / b^3 + ...`, i.e. the digits of `i` mirrored
//! around the radix point. Successive radical inverses of `0, 1, 2, ...`
//! form the van der Corput sequence.
//!
//! The digit helpers in this module are shared by the generator-matrix
//! engine (index expansion, digit-to-value map) and by the randomisations
//! (expansion of real coordinates into output digits).
//!
//! # Example
//!
//! ```
//! use hups_core::radical_inverse::radical_inverse;
//!
//! let values: Vec<f64> = (0..4).map(|i| radical_inverse(i, 2, 32).unwrap()).collect();
//! assert_eq!(values, vec![0.0, 0.5, 0.25, 0.75]);
//! ```

use crate::config::{check_base, DigitOrder};
use crate::error::{HupsError, Result};

/// Largest number of bits that converts to `f64` without rounding.
const F64_MANTISSA_BITS: usize = 53;

/// Largest `f64` strictly below 1.
const ONE_MINUS_ULP: f64 = 1.0 - f64::EPSILON / 2.0;

/// Absolute slack on carry detection when `1/base` is not exact in binary.
const CARRY_SLACK: f64 = 64.0 * f64::EPSILON;

/// Radical inverse of `index` in `base`, using at most `precision` digits.
///
/// Digits beyond `precision` are dropped, so the result is truncated
/// towards zero by less than `base^-precision`. Sums that round up to 1
/// are clamped to the largest `f64` below 1.
///
/// # Errors
///
/// `HupsError::InvalidConstruction` if `base < 2`.
pub fn radical_inverse(index: u64, base: u32, precision: usize) -> Result<f64> {
    check_base(base)?;
    let b = base as u64;
    let inv = 1.0 / base as f64;
    let mut factor = inv;
    let mut value = 0.0;
    let mut n = index;
    let mut used = 0;
    while n > 0 && used < precision {
        value += (n % b) as f64 * factor;
        n /= b;
        factor *= inv;
        used += 1;
    }
    Ok(value.min(ONE_MINUS_ULP))
}

/// Base-2 radical inverse by bit reversal.
///
/// Keeps at most `precision` bits, capped at 53 so the result is exact
/// and strictly below 1.
#[inline]
pub fn radical_inverse_base2(index: u64, precision: usize) -> f64 {
    let bits = precision.min(F64_MANTISSA_BITS);
    if bits == 0 {
        return 0.0;
    }
    let reversed = index.reverse_bits() >> (64 - bits);
    reversed as f64 / (1u64 << bits) as f64
}

/// Radical inverse of `i + 1` given the radical inverse `x` of `i`.
///
/// Adds `1/b` with a carry that propagates to the right of the radix point,
/// which avoids re-expanding the index. Exact for power-of-two bases up to
/// 53 digits; for other bases rounding error accumulates over long runs
/// and [`radical_inverse`] should be used to resynchronise.
///
/// # Arguments
///
/// * `x` - Radical inverse of the current index, in `[0, 1)`
/// * `base` - Base of the expansion
///
/// # Errors
///
/// `HupsError::InvalidConstruction` if `base < 2` or `x` is not in `[0, 1)`.
pub fn next_radical_inverse(x: f64, base: u32) -> Result<f64> {
    check_base(base)?;
    if !(0.0..1.0).contains(&x) {
        return Err(HupsError::InvalidConstruction(format!(
            "{} is not a radical inverse in [0, 1)",
            x
        )));
    }
    let inv = 1.0 / base as f64;
    let remaining = 1.0 - x;
    if inv < remaining {
        return Ok((x + inv).min(ONE_MINUS_ULP));
    }
    let slack = if base.is_power_of_two() { 0.0 } else { CARRY_SLACK };
    // Digits equal to b - 1 carry until the first weight below what is left
    // to reach 1.
    let mut h = inv;
    let mut hh;
    loop {
        hh = h;
        h *= inv;
        if h < remaining - slack || h <= slack {
            break;
        }
    }
    Ok(((x - 1.0) + hh + h).clamp(0.0, ONE_MINUS_ULP))
}

/// Expands `index` into exactly `len` base-b digits.
///
/// # Errors
///
/// - `HupsError::InvalidConstruction` if `base < 2`
/// - `HupsError::OutOfRange` if `index >= base^len` (no silent wraparound)
pub fn to_digits(index: u64, base: u32, len: usize, order: DigitOrder) -> Result<Vec<u32>> {
    check_base(base)?;
    let b = base as u64;
    if let Some(bound) = num_traits::checked_pow(b, len) {
        if index >= bound {
            return Err(HupsError::OutOfRange {
                what: "digit expansion",
                index,
                bound,
            });
        }
    }
    let mut digits = Vec::with_capacity(len);
    let mut n = index;
    for _ in 0..len {
        digits.push((n % b) as u32);
        n /= b;
    }
    if order == DigitOrder::MostSignificantFirst {
        digits.reverse();
    }
    Ok(digits)
}

/// Reassembles an integer from its base-b digits.
///
/// # Errors
///
/// - `HupsError::InvalidConstruction` for `base < 2`, a digit `>= base`,
///   or a value that does not fit in 64 bits
pub fn from_digits(digits: &[u32], base: u32, order: DigitOrder) -> Result<u64> {
    check_base(base)?;
    let b = base as u64;
    let overflow = || HupsError::InvalidConstruction("digit vector exceeds 64 bits".to_string());
    let mut value: u64 = 0;
    let mut accumulate = |d: u32| -> Result<()> {
        if d >= base {
            return Err(HupsError::InvalidConstruction(format!(
                "digit {} is not valid in base {}",
                d, base
            )));
        }
        value = value
            .checked_mul(b)
            .and_then(|v| v.checked_add(d as u64))
            .ok_or_else(overflow)?;
        Ok(())
    };
    match order {
        DigitOrder::LeastSignificantFirst => digits.iter().rev().try_for_each(|&d| accumulate(d))?,
        DigitOrder::MostSignificantFirst => digits.iter().try_for_each(|&d| accumulate(d))?,
    }
    Ok(value)
}

/// Digit-to-value map: `sum_p digits[p] * base^-(p+1)`.
///
/// Evaluated by Horner's rule from the least significant output digit.
#[inline]
pub fn digits_to_fraction(digits: &[u32], base: u32) -> f64 {
    let b = base as f64;
    digits.iter().rev().fold(0.0, |acc, &d| (acc + d as f64) / b)
}

/// Expands `x` in `[0, 1)` into its first `precision` base-b digits.
///
/// Values outside `[0, 1)` are reduced modulo 1 first.
pub fn fraction_to_digits(x: f64, base: u32, precision: usize) -> Vec<u32> {
    let b = base as f64;
    let mut rest = x - x.floor();
    let mut digits = Vec::with_capacity(precision);
    for _ in 0..precision {
        rest *= b;
        let d = (rest.floor() as u32).min(base - 1);
        digits.push(d);
        rest -= d as f64;
    }
    digits
}
