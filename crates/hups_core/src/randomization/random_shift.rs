//! Random shift modulo 1.

use crate::error::{HupsError, Result};
use rand::Rng;

/// Random shift modulo 1.
///
/// Adds one uniform value per dimension to every point and reduces the sum
/// modulo 1. Coordinates of dimensions beyond the drawn vector are left
/// unchanged.
#[derive(Debug, Clone, PartialEq)]
pub struct RandomShift {
    shifts: Vec<f64>,
}

impl RandomShift {
    /// Builds a shift from explicit values in `[0, 1)`.
    pub fn new(shifts: Vec<f64>) -> Result<Self> {
        if let Some(bad) = shifts.iter().find(|u| !(0.0..1.0).contains(*u)) {
            return Err(HupsError::InvalidConstruction(format!(
                "shift value {} is outside [0, 1)",
                bad
            )));
        }
        Ok(Self { shifts })
    }

    /// Draws a uniform shift vector of length `dimension`.
    pub fn draw<R: Rng + ?Sized>(dimension: usize, rng: &mut R) -> Self {
        Self {
            shifts: (0..dimension).map(|_| rng.gen::<f64>()).collect(),
        }
    }

    /// Number of shifted dimensions.
    #[inline]
    pub fn dimension(&self) -> usize {
        self.shifts.len()
    }

    /// Shift vector.
    #[inline]
    pub fn shifts(&self) -> &[f64] {
        &self.shifts
    }

    /// `(x + shift[dim]) mod 1`.
    #[inline]
    pub fn apply(&self, dim: usize, x: f64) -> f64 {
        match self.shifts.get(dim) {
            Some(&s) => {
                let y = x + s;
                if y >= 1.0 {
                    y - 1.0
                } else {
                    y
                }
            }
            None => x,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_wraparound() {
        let shift = RandomShift::new(vec![0.75, 0.5]).unwrap();
        assert_relative_eq!(shift.apply(0, 0.5), 0.25);
        assert_eq!(shift.apply(0, 0.25), 0.0);
        assert_relative_eq!(shift.apply(1, 0.25), 0.75);
        assert_eq!(shift.apply(2, 0.3), 0.3);
    }

    #[test]
    fn test_draw_in_unit_interval() {
        let mut rng = StdRng::seed_from_u64(3);
        let shift = RandomShift::draw(16, &mut rng);
        assert_eq!(shift.dimension(), 16);
        assert!(shift.shifts().iter().all(|s| (0.0..1.0).contains(s)));
    }

    #[test]
    fn test_rejects_out_of_range() {
        assert!(RandomShift::new(vec![1.0]).is_err());
        assert!(RandomShift::new(vec![-0.1]).is_err());
        assert!(RandomShift::new(vec![f64::NAN]).is_err());
    }
}
