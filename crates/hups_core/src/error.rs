//! Error types for point-set construction, traversal and randomisation.
//!
//! All failures are synchronous and local: every fallible operation returns
//! [`HupsError`] directly to its caller and nothing is retried.
//!
//! Truncation of digit expansions below `b^-r` is *not* an error. It is a
//! documented, silent loss of precision; callers needing exactness must pick
//! a sufficiently large output precision `r`.

use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, HupsError>;

/// Categorised point-set errors.
///
/// # Variants
/// - `InvalidConstruction`: bad base, dimension, precision or matrix rank
/// - `OutOfRange`: a cursor or index moved past a finite bound
/// - `UnsupportedRandomization`: a randomisation the point set cannot host
/// - `InvalidConfig`: a configuration value failed validation or parsing
///
/// # Examples
/// ```
/// use hups_core::HupsError;
///
/// let err = HupsError::InvalidConstruction("base must be at least 2, got 1".to_string());
/// assert_eq!(
///     format!("{}", err),
///     "Invalid construction: base must be at least 2, got 1"
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HupsError {
    /// Construction parameters are inconsistent. Fatal, never retried.
    #[error("Invalid construction: {0}")]
    InvalidConstruction(String),

    /// An index exceeded a finite point count or dimension bound.
    ///
    /// Recoverable by repositioning or resetting the cursor.
    #[error("{what} index {index} out of range (bound {bound})")]
    OutOfRange {
        /// What was being indexed ("point", "coordinate", "digit", ...)
        what: &'static str,
        /// The offending index
        index: u64,
        /// The exclusive upper bound
        bound: u64,
    },

    /// The randomisation cannot be applied to this point set.
    #[error("Unsupported randomisation: {0}")]
    UnsupportedRandomization(String),

    /// Invalid configuration.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl HupsError {
    /// Shorthand for an [`HupsError::OutOfRange`] on point indices.
    pub(crate) fn point_out_of_range(index: usize, bound: usize) -> Self {
        HupsError::OutOfRange {
            what: "point",
            index: index as u64,
            bound: bound as u64,
        }
    }

    /// Shorthand for an [`HupsError::OutOfRange`] on coordinate indices.
    pub(crate) fn coordinate_out_of_range(index: usize, bound: usize) -> Self {
        HupsError::OutOfRange {
            what: "coordinate",
            index: index as u64,
            bound: bound as u64,
        }
    }
}
