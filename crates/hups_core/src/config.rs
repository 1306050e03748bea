//! Construction parameters for digital nets and cycle-based point sets.
//!
//! Configuration structs follow the builder-with-validation pattern: start
//! from `Default`, adjust with `with_*` methods, then call `validate()`.
//! They can also be deserialised from TOML, so drivers can keep point-set
//! parameters next to the rest of their simulation settings.
//!
//! # Example
//!
//! ```
//! use hups_core::config::{DigitOrder, NetConfig};
//!
//! let config = NetConfig::from_toml_str(
//!     r#"
//!     base = 3
//!     dimension = 2
//!     num_columns = 4
//!     num_rows = 20
//!     "#,
//! )
//! .unwrap();
//!
//! assert_eq!(config.base, 3);
//! assert_eq!(config.digit_order, DigitOrder::LeastSignificantFirst);
//! assert!(config.validate().is_ok());
//! ```

use crate::error::{HupsError, Result};
use serde::Deserialize;

/// Ordering convention of an index's digit vector.
///
/// Column `c` of a generator matrix multiplies entry `c` of the digit
/// vector. With [`DigitOrder::LeastSignificantFirst`] entry 0 is the least
/// significant base-b digit of the index, which makes the identity matrix
/// produce the van der Corput sequence. With
/// [`DigitOrder::MostSignificantFirst`] the roles of the identity and
/// reflected identity constructions are exchanged.
///
/// Only least-significant-first expansions are stable under column growth,
/// so extensible sequences require it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DigitOrder {
    /// Entry 0 is the least significant digit.
    #[default]
    LeastSignificantFirst,
    /// Entry 0 is the most significant of the `k` digits.
    MostSignificantFirst,
}

/// Point enumeration order used by the base-2 incremental cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TraversalOrder {
    /// Step `i` yields point `i`.
    #[default]
    Natural,
    /// Step `i` yields point `i ^ (i >> 1)`; one column XOR per step.
    GrayCode,
}

/// Storage mode of a cycle-based point set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CycleStorage {
    /// Keep recurrence states; outputs are computed on access.
    #[default]
    States,
    /// Keep precomputed outputs.
    Outputs,
}

/// Parameters of a digital net or digital sequence.
///
/// # Default Values
///
/// | Parameter | Default | Description |
/// |-----------|---------|-------------|
/// | `base` | 2 | Digit base `b` |
/// | `dimension` | 1 | Number of coordinates `s` |
/// | `num_columns` | 10 | Input digits `k`; a net has `b^k` points |
/// | `num_rows` | 31 | Output digits `r` |
/// | `digit_order` | LeastSignificantFirst | Index expansion convention |
/// | `traversal` | Natural | Base-2 cursor enumeration order |
/// | `check_rank` | true | Reject singular leading `k x k` blocks |
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct NetConfig {
    /// Digit base `b >= 2`.
    pub base: u32,
    /// Number of coordinates per point.
    pub dimension: usize,
    /// Number of generator-matrix columns `k`.
    pub num_columns: usize,
    /// Number of generator-matrix rows `r` (output precision).
    pub num_rows: usize,
    /// Index digit ordering convention.
    pub digit_order: DigitOrder,
    /// Enumeration order of the base-2 cursor.
    pub traversal: TraversalOrder,
    /// Whether construction verifies the leading `k x k` block is nonsingular.
    pub check_rank: bool,
}

impl Default for NetConfig {
    fn default() -> Self {
        Self {
            base: 2,
            dimension: 1,
            num_columns: 10,
            num_rows: 31,
            digit_order: DigitOrder::default(),
            traversal: TraversalOrder::default(),
            check_rank: true,
        }
    }
}

impl NetConfig {
    /// Creates a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the digit base.
    pub fn with_base(mut self, base: u32) -> Self {
        self.base = base;
        self
    }

    /// Sets the dimension.
    pub fn with_dimension(mut self, dimension: usize) -> Self {
        self.dimension = dimension;
        self
    }

    /// Sets the number of columns `k`.
    pub fn with_columns(mut self, num_columns: usize) -> Self {
        self.num_columns = num_columns;
        self
    }

    /// Sets the number of rows `r`.
    pub fn with_rows(mut self, num_rows: usize) -> Self {
        self.num_rows = num_rows;
        self
    }

    /// Sets the digit ordering convention.
    pub fn with_digit_order(mut self, digit_order: DigitOrder) -> Self {
        self.digit_order = digit_order;
        self
    }

    /// Sets the base-2 traversal order.
    pub fn with_traversal(mut self, traversal: TraversalOrder) -> Self {
        self.traversal = traversal;
        self
    }

    /// Enables or disables the rank check at construction.
    pub fn with_rank_check(mut self, check_rank: bool) -> Self {
        self.check_rank = check_rank;
        self
    }

    /// Parses a configuration from TOML text.
    ///
    /// Missing keys take their default values. The result is not
    /// validated; call [`NetConfig::validate`] before use.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| HupsError::InvalidConfig(e.to_string()))
    }

    /// Number of points `b^k` addressed by `num_columns`, if it fits in `usize`.
    pub fn num_points(&self) -> Option<usize> {
        num_traits::checked_pow(self.base as usize, self.num_columns)
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns `HupsError::InvalidConstruction` when the base is below 2,
    /// the dimension is zero, `r < k`, `b^k` does not fit in `usize`, or a
    /// base-2 configuration asks for more than 64 rows.
    pub fn validate(&self) -> Result<()> {
        check_base(self.base)?;
        if self.dimension == 0 {
            return Err(HupsError::InvalidConstruction(
                "dimension must be positive".to_string(),
            ));
        }
        if self.num_rows < self.num_columns {
            return Err(HupsError::InvalidConstruction(format!(
                "num_rows ({}) must be at least num_columns ({})",
                self.num_rows, self.num_columns
            )));
        }
        if self.num_points().is_none() {
            return Err(HupsError::InvalidConstruction(format!(
                "{}^{} points exceed the addressable index range",
                self.base, self.num_columns
            )));
        }
        if self.base == 2 && self.num_rows > 64 {
            return Err(HupsError::InvalidConstruction(format!(
                "base-2 nets support at most 64 rows, got {}",
                self.num_rows
            )));
        }
        Ok(())
    }
}

/// Parameters of a cycle-based point set.
///
/// `base` and `precision` describe the digit expansion used when a digital
/// shift is applied to the stored outputs.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CycleConfig {
    /// Storage mode for the cycles.
    pub storage: CycleStorage,
    /// Base of the digit expansion used by digital shifts.
    pub base: u32,
    /// Number of digits kept when expanding outputs.
    pub precision: usize,
}

impl Default for CycleConfig {
    fn default() -> Self {
        Self {
            storage: CycleStorage::default(),
            base: 2,
            precision: 31,
        }
    }
}

impl CycleConfig {
    /// Creates a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the storage mode.
    pub fn with_storage(mut self, storage: CycleStorage) -> Self {
        self.storage = storage;
        self
    }

    /// Sets the digit base and precision used by digital shifts.
    pub fn with_digits(mut self, base: u32, precision: usize) -> Self {
        self.base = base;
        self.precision = precision;
        self
    }

    /// Parses a configuration from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| HupsError::InvalidConfig(e.to_string()))
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<()> {
        check_base(self.base)?;
        if self.precision == 0 {
            return Err(HupsError::InvalidConstruction(
                "precision must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// Rejects bases below 2.
pub(crate) fn check_base(base: u32) -> Result<()> {
    if base < 2 {
        return Err(HupsError::InvalidConstruction(format!(
            "base must be at least 2, got {}",
            base
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = NetConfig::default();
        assert_eq!(config.base, 2);
        assert_eq!(config.num_rows, 31);
        assert_eq!(config.num_points(), Some(1024));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_builder_pattern() {
        let config = NetConfig::new()
            .with_base(5)
            .with_dimension(3)
            .with_columns(3)
            .with_rows(12)
            .with_digit_order(DigitOrder::MostSignificantFirst)
            .with_traversal(TraversalOrder::GrayCode)
            .with_rank_check(false);

        assert_eq!(config.num_points(), Some(125));
        assert_eq!(config.digit_order, DigitOrder::MostSignificantFirst);
        assert!(!config.check_rank);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation_invalid_base() {
        let config = NetConfig::new().with_base(1);
        assert!(matches!(
            config.validate(),
            Err(HupsError::InvalidConstruction(_))
        ));
    }

    #[test]
    fn test_config_validation_rows_below_columns() {
        let config = NetConfig::new().with_columns(8).with_rows(4);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_zero_dimension() {
        let config = NetConfig::new().with_dimension(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_base2_row_limit() {
        let config = NetConfig::new().with_rows(65);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_index_overflow() {
        let config = NetConfig::new().with_base(10).with_columns(40).with_rows(40);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_net_config_from_toml() {
        let config = NetConfig::from_toml_str(
            r#"
            base = 2
            dimension = 4
            num_columns = 6
            digit_order = "most_significant_first"
            traversal = "gray_code"
            "#,
        )
        .unwrap();

        assert_eq!(config.dimension, 4);
        assert_eq!(config.num_rows, 31);
        assert_eq!(config.digit_order, DigitOrder::MostSignificantFirst);
        assert_eq!(config.traversal, TraversalOrder::GrayCode);
    }

    #[test]
    fn test_net_config_from_bad_toml() {
        let result = NetConfig::from_toml_str("base = \"two\"");
        assert!(matches!(result, Err(HupsError::InvalidConfig(_))));
    }

    #[test]
    fn test_cycle_config_from_toml() {
        let config = CycleConfig::from_toml_str("storage = \"outputs\"\nprecision = 16").unwrap();
        assert_eq!(config.storage, CycleStorage::Outputs);
        assert_eq!(config.base, 2);
        assert_eq!(config.precision, 16);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_cycle_config_validation() {
        assert!(CycleConfig::new().with_digits(1, 8).validate().is_err());
        assert!(CycleConfig::new().with_digits(3, 0).validate().is_err());
        assert!(CycleConfig::new().with_digits(3, 10).validate().is_ok());
    }
}
