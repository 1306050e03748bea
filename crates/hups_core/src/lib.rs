//! # hups_core: Highly Uniform Point Sets for Quasi-Monte Carlo
//!
//! Deterministic and randomised point sets over the unit hypercube,
//! delivered coordinate by coordinate through an iteration protocol that
//! can stand in for a pseudo-random uniform stream. Simulation code written
//! against [`UniformSource`] runs unchanged under Monte Carlo or
//! quasi-Monte Carlo.
//!
//! ## Components
//!
//! - Radical inverses and digit expansions (`radical_inverse`)
//! - Generator matrices over `Z_b`, packed base-2 matrices (`matrix`)
//! - Digital nets and extensible digital sequences, with an incremental
//!   base-2 cursor (`net`)
//! - The point-set contract and traversal protocol (`point_set`, `iterator`)
//! - Uniform-stream substitutability (`stream`)
//! - Digital shifts, modulo-1 shifts and matrix scrambles (`randomization`)
//! - Cycle-based point sets from finite recurrences (`cycle`)
//! - Configuration (`config`) and errors (`error`)
//!
//! Concrete parameter tables (Sobol direction numbers, Faure or
//! Niederreiter matrices, Halton bases) are not part of this crate; they
//! plug in through [`ColumnSource`] or explicit [`GeneratorMatrix`] values.
//!
//! ## Usage Examples
//!
//! ```rust
//! use hups_core::randomization::DigitalShift;
//! use hups_core::{DigitalNet, PointSet, PointSetIterator};
//! use rand::rngs::StdRng;
//! use rand::SeedableRng;
//!
//! let mut net = DigitalNet::van_der_corput(2, 3, 31).unwrap();
//! let deterministic: Vec<f64> = (0..8).map(|i| net.coordinate(i, 0).unwrap()).collect();
//! assert_eq!(deterministic, vec![0.0, 0.5, 0.25, 0.75, 0.125, 0.625, 0.375, 0.875]);
//!
//! let mut rng = StdRng::seed_from_u64(42);
//! net.randomize(DigitalShift::draw(2, 1, 31, &mut rng).unwrap().into()).unwrap();
//!
//! let mut cursor = net.binary_cursor().unwrap();
//! let mut point = [0.0; 1];
//! cursor.next_point(&mut point).unwrap();
//! assert!(point[0] >= 0.0 && point[0] < 1.0);
//!
//! net.unrandomize();
//! assert_eq!(net.coordinate(3, 0).unwrap(), 0.75);
//! ```
//!
//! ## Thread Safety
//!
//! Point sets are `Send + Sync` and iterators borrow them immutably, so any
//! number of iterators can traverse one point set from different threads.
//! Randomising takes `&mut self` and therefore cannot overlap a traversal.
//! Digital sequences grow their matrices under an internal lock.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]

pub mod config;
pub mod cycle;
pub mod error;
pub mod iterator;
pub mod matrix;
pub mod net;
pub mod point_set;
pub mod radical_inverse;
pub mod randomization;
pub mod stream;

pub use config::{CycleConfig, CycleStorage, DigitOrder, NetConfig, TraversalOrder};
pub use cycle::{CycleBasedPointSet, CycleReplay};
pub use error::{HupsError, Result};
pub use iterator::{PointCursor, PointSetIterator};
pub use matrix::{BinaryMatrix, ColumnSource, GeneratorMatrix, IdentityColumns};
pub use net::{BinaryNetCursor, DigitalNet};
pub use point_set::{Extent, PointSet};
pub use randomization::{
    DigitalShift, LeftMatrixScramble, RandomShift, Randomization, RandomizationPipeline,
};
pub use stream::{UniformRng, UniformSource};
