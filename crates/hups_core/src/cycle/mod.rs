//! Cycle-based point sets.
//!
//! A deterministic recurrence `s -> transition(s)` that permutes a finite
//! state space splits it into disjoint cycles. Korobov lattices and
//! linear feedback shift register generators are of this kind: every
//! starting state yields an infinite periodic sequence of outputs, and the
//! collection of all such sequences is a highly uniform point set.
//!
//! Cycles are stored either as states (outputs recomputed on access, state
//! values open to direct XOR shifts) or as precomputed outputs.

mod partition;
mod point_set;

pub use partition::partition_into_cycles;
pub use point_set::{CycleBasedPointSet, CycleReplay, OutputFn};
