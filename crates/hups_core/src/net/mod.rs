//! Digital nets and sequences.
//!
//! A digital net in base `b` with `k` columns has `b^k` points. Coordinate
//! `j` of point `i` is obtained by expanding `i` into `k` base-b digits,
//! multiplying by the `r x k` generator matrix `C_j` over `Z_b` and reading
//! the result as the fraction `0.y_0 y_1 ... y_{r-1}` in base `b`.
//!
//! Base 2 is special-cased throughout: matrices are packed one word per
//! column and [`BinaryNetCursor`] walks the net with one XOR per changed
//! index bit.
//!
//! # Example
//!
//! ```
//! use hups_core::{DigitalNet, IdentityColumns, NetConfig, PointSet, PointSetIterator};
//!
//! let config = NetConfig::new().with_columns(4).with_rows(31);
//! let seq = DigitalNet::sequence(config, IdentityColumns).unwrap();
//!
//! let mut cursor = seq.binary_cursor().unwrap();
//! let mut sum = 0.0;
//! for _ in 0..64 {
//!     sum += cursor.next_coordinate().unwrap();
//!     cursor.reset_to_next_point();
//! }
//! // the sequence grew past its initial 16 points
//! assert_eq!(seq.num_columns(), 6);
//! assert_eq!(sum / 64.0, 63.0 / 128.0);
//! ```

mod cursor;
mod digital_net;

pub use cursor::BinaryNetCursor;
pub use digital_net::DigitalNet;
