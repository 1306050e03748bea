//! Partition of a finite state space into the cycles of a recurrence.

use crate::error::{HupsError, Result};
use std::collections::HashMap;
use tracing::debug;

/// Splits `states` into the cycles of `transition`.
///
/// Each cycle starts at the first of its states to appear in `states` and
/// lists successive states until the walk returns to its start. Cycles are
/// returned in the order their starting states appear. Every state is
/// visited exactly once, so the cost is `O(|states|)` transition calls and
/// hash lookups; the walk always terminates.
///
/// # Errors
///
/// `HupsError::InvalidConstruction` if `states` is empty or has duplicates,
/// if the transition leaves the state space, or if it is not a permutation
/// of it (two states with the same successor).
///
/// # Examples
///
/// ```
/// use hups_core::cycle::partition_into_cycles;
///
/// let states: Vec<u64> = (0..7).collect();
/// let cycles = partition_into_cycles(&states, |x| 3 * x % 7).unwrap();
/// assert_eq!(cycles, vec![vec![0], vec![1, 3, 2, 6, 4, 5]]);
/// ```
pub fn partition_into_cycles<F>(states: &[u64], transition: F) -> Result<Vec<Vec<u64>>>
where
    F: Fn(u64) -> u64,
{
    if states.is_empty() {
        return Err(HupsError::InvalidConstruction(
            "state space is empty".to_string(),
        ));
    }
    let mut index = HashMap::with_capacity(states.len());
    for (pos, &s) in states.iter().enumerate() {
        if index.insert(s, pos).is_some() {
            return Err(HupsError::InvalidConstruction(format!(
                "state {} listed twice",
                s
            )));
        }
    }

    let mut visited = vec![false; states.len()];
    let mut cycles = Vec::new();
    for (start_pos, &start) in states.iter().enumerate() {
        if visited[start_pos] {
            continue;
        }
        let mut cycle = Vec::new();
        let mut current = start;
        loop {
            let pos = *index.get(&current).ok_or_else(|| {
                HupsError::InvalidConstruction(format!(
                    "transition leaves the state space at {}",
                    current
                ))
            })?;
            if visited[pos] {
                if current == start {
                    break;
                }
                return Err(HupsError::InvalidConstruction(format!(
                    "transition is not a permutation: state {} is reached twice",
                    current
                )));
            }
            visited[pos] = true;
            cycle.push(current);
            current = transition(current);
        }
        cycles.push(cycle);
    }

    debug!(states = states.len(), cycles = cycles.len(), "state space partitioned");
    Ok(cycles)
}
