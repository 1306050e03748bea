//! # Randomisation of point sets
//!
//! Randomisations turn a deterministic point set into a randomised one
//! while keeping its structure. They are value objects: drawing one
//! consumes randomness from any [`rand::Rng`], after which it is a fixed,
//! reproducible transformation.
//!
//! A point set owns a [`RandomizationPipeline`], an ordered list of
//! randomisations executed in push order. Pushing and clearing only touch
//! auxiliary state derived from the pipeline; generator matrices and
//! stored cycles are never modified, so clearing always restores the exact
//! deterministic output.
//!
//! ## Available Randomisations
//!
//! - [`DigitalShift`]: add random digits modulo `b` (XOR for `b = 2`)
//! - [`RandomShift`]: add a random vector modulo 1
//! - [`LeftMatrixScramble`]: left-multiply generator matrices by random
//!   lower-triangular matrices
//!
//! Digital shifts and scrambles act on output digits; the modulo-1 shift
//! acts on real values. A digit-domain step pushed after a modulo-1 shift
//! is rejected, since the shifted values no longer have the digit
//! structure the step would act on.
//!
//! ## Example
//!
//! ```
//! use hups_core::randomization::{DigitalShift, RandomShift, RandomizationPipeline};
//!
//! let mut pipeline = RandomizationPipeline::new();
//! pipeline.push(DigitalShift::new(2, vec![vec![1, 0]]).unwrap().into()).unwrap();
//! pipeline.push(RandomShift::new(vec![0.125]).unwrap().into()).unwrap();
//!
//! // 0.25 = 0.01b -> digital shift -> 0.11b = 0.75 -> + 0.125
//! assert_eq!(pipeline.apply_coordinate(0, 0.25, 2), 0.875);
//!
//! pipeline.clear();
//! assert_eq!(pipeline.apply_coordinate(0, 0.25, 2), 0.25);
//! ```

mod digital_shift;
mod random_shift;
mod scramble;

pub use digital_shift::DigitalShift;
pub use random_shift::RandomShift;
pub use scramble::LeftMatrixScramble;

use crate::error::{HupsError, Result};
use crate::matrix::{lower_times, pack_digits};
use crate::radical_inverse::{digits_to_fraction, fraction_to_digits};
use scramble::compose_lower;

/// A reversible point-set transformation.
#[derive(Debug, Clone, PartialEq)]
pub enum Randomization {
    /// Random digital shift in base `b`.
    DigitalShift(DigitalShift),
    /// Random shift modulo 1.
    RandomShift(RandomShift),
    /// Left-matrix scramble of the generator matrices.
    LeftMatrixScramble(LeftMatrixScramble),
}

impl Randomization {
    /// Digit base of digit-domain randomisations.
    pub fn base(&self) -> Option<u32> {
        match self {
            Randomization::DigitalShift(s) => Some(s.base()),
            Randomization::LeftMatrixScramble(s) => Some(s.base()),
            Randomization::RandomShift(_) => None,
        }
    }

    /// Whether the randomisation acts on output digits.
    pub fn is_digit_domain(&self) -> bool {
        !matches!(self, Randomization::RandomShift(_))
    }

    /// Number of dimensions covered.
    pub fn dimension(&self) -> usize {
        match self {
            Randomization::DigitalShift(s) => s.dimension(),
            Randomization::RandomShift(s) => s.dimension(),
            Randomization::LeftMatrixScramble(s) => s.dimension(),
        }
    }

    /// Short name, used in logs and error messages.
    pub fn name(&self) -> &'static str {
        match self {
            Randomization::DigitalShift(_) => "digital shift",
            Randomization::RandomShift(_) => "random shift",
            Randomization::LeftMatrixScramble(_) => "left-matrix scramble",
        }
    }
}

impl From<DigitalShift> for Randomization {
    fn from(shift: DigitalShift) -> Self {
        Randomization::DigitalShift(shift)
    }
}

impl From<RandomShift> for Randomization {
    fn from(shift: RandomShift) -> Self {
        Randomization::RandomShift(shift)
    }
}

impl From<LeftMatrixScramble> for Randomization {
    fn from(scramble: LeftMatrixScramble) -> Self {
        Randomization::LeftMatrixScramble(scramble)
    }
}

/// Ordered list of randomisations owned by a point set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RandomizationPipeline {
    steps: Vec<Randomization>,
}

impl RandomizationPipeline {
    /// Creates an empty pipeline.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a randomisation.
    ///
    /// # Errors
    ///
    /// `HupsError::UnsupportedRandomization` if a digit-domain step follows
    /// a modulo-1 shift, or its base differs from earlier digit-domain steps.
    pub fn push(&mut self, randomization: Randomization) -> Result<()> {
        if randomization.is_digit_domain()
            && self
                .steps
                .iter()
                .any(|s| matches!(s, Randomization::RandomShift(_)))
        {
            return Err(HupsError::UnsupportedRandomization(format!(
                "{} cannot follow a modulo-1 shift",
                randomization.name()
            )));
        }
        if let (Some(new), Some(existing)) = (randomization.base(), self.base()) {
            if new != existing {
                return Err(HupsError::UnsupportedRandomization(format!(
                    "{} in base {} mixed with base-{} randomisations",
                    randomization.name(),
                    new,
                    existing
                )));
            }
        }
        self.steps.push(randomization);
        Ok(())
    }

    /// Removes every randomisation.
    pub fn clear(&mut self) {
        self.steps.clear();
    }

    /// Whether the pipeline is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Number of steps.
    #[inline]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Steps in execution order.
    #[inline]
    pub fn steps(&self) -> &[Randomization] {
        &self.steps
    }

    /// Base shared by the digit-domain steps, if any.
    pub fn base(&self) -> Option<u32> {
        self.steps.iter().find_map(Randomization::base)
    }

    /// Applies every step, in order, to coordinate `dim` with value `x`.
    ///
    /// Digit-domain steps work on the first `precision` digits of `x`; the
    /// value is expanded lazily, so an empty pipeline returns `x` exactly.
    pub fn apply_coordinate(&self, dim: usize, x: f64, precision: usize) -> f64 {
        let mut value = x;
        let mut digits: Option<(u32, Vec<u32>)> = None;
        for step in &self.steps {
            match step {
                Randomization::DigitalShift(s) => {
                    let (_, y) = digits
                        .get_or_insert_with(|| (s.base(), fraction_to_digits(value, s.base(), precision)));
                    s.apply_digits(dim, y);
                }
                Randomization::LeftMatrixScramble(s) => {
                    let (_, y) = digits
                        .get_or_insert_with(|| (s.base(), fraction_to_digits(value, s.base(), precision)));
                    s.apply_digits(dim, y);
                }
                Randomization::RandomShift(s) => {
                    if let Some((base, y)) = digits.take() {
                        value = digits_to_fraction(&y, base);
                    }
                    value = s.apply(dim, value);
                }
            }
        }
        if let Some((base, y)) = digits {
            value = digits_to_fraction(&y, base);
        }
        value
    }

    /// Applies every step to a whole point, coordinate `j` of `point`
    /// being dimension `j`.
    pub fn apply(&self, point: &mut [f64], precision: usize) {
        for (dim, x) in point.iter_mut().enumerate() {
            *x = self.apply_coordinate(dim, *x, precision);
        }
    }

    /// Folds the pipeline into per-dimension digit transforms for a net
    /// with `dimension` coordinates and `rows` output digits.
    pub(crate) fn compile(&self, dimension: usize, rows: usize) -> CompiledRandomization {
        let mut compiled = CompiledRandomization {
            lower: vec![None; dimension],
            shift: vec![None; dimension],
            real: Vec::new(),
        };
        for step in &self.steps {
            match step {
                Randomization::DigitalShift(s) => {
                    let b = s.base();
                    for (dim, acc) in compiled.shift.iter_mut().enumerate() {
                        if let Some(d) = s.digits(dim) {
                            let acc = acc.get_or_insert_with(|| vec![0; rows]);
                            for (y, &dp) in acc.iter_mut().zip(d) {
                                *y = (*y + dp) % b;
                            }
                        }
                    }
                }
                Randomization::LeftMatrixScramble(s) => {
                    let b = s.base();
                    for dim in 0..dimension {
                        let Some(l) = s.lower(dim) else { continue };
                        compiled.lower[dim] = Some(match compiled.lower[dim].take() {
                            Some(previous) => compose_lower(l, &previous, b),
                            None => l.to_vec(),
                        });
                        if let Some(d) = compiled.shift[dim].as_mut() {
                            *d = lower_times(l, d, b);
                        }
                    }
                }
                Randomization::RandomShift(s) => compiled.real.push(s.clone()),
            }
        }
        compiled
    }
}

/// Pipeline folded into the form a digital net evaluates directly:
/// output digits become `L (C a) + d`, followed by the modulo-1 shifts.
#[derive(Debug, Clone, Default)]
pub(crate) struct CompiledRandomization {
    lower: Vec<Option<Vec<Vec<u32>>>>,
    shift: Vec<Option<Vec<u32>>>,
    real: Vec<RandomShift>,
}

impl CompiledRandomization {
    /// Accumulated scrambling matrix of `dim`.
    pub(crate) fn lower(&self, dim: usize) -> Option<&[Vec<u32>]> {
        self.lower.get(dim).and_then(|l| l.as_deref())
    }

    /// Accumulated digit shift of `dim`.
    pub(crate) fn shift(&self, dim: usize) -> Option<&[u32]> {
        self.shift.get(dim).and_then(|d| d.as_deref())
    }

    /// Accumulated base-2 shift of `dim` packed into `rows` bits.
    pub(crate) fn shift_bits(&self, dim: usize, rows: usize) -> u64 {
        self.shift(dim).map_or(0, |d| pack_digits(d, rows))
    }

    /// Applies the modulo-1 shifts in push order.
    #[inline]
    pub(crate) fn apply_real(&self, dim: usize, x: f64) -> f64 {
        self.real.iter().fold(x, |value, s| s.apply(dim, value))
    }
}
