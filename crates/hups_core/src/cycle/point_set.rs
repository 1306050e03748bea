//! Point sets built from the cycles of a finite recurrence.

use super::partition::partition_into_cycles;
use crate::config::{CycleConfig, CycleStorage};
use crate::error::{HupsError, Result};
use crate::point_set::{Extent, PointSet};
use crate::randomization::{Randomization, RandomizationPipeline};
use std::collections::HashMap;
use std::fmt;
use tracing::debug;

/// Maps a recurrence state to a value in `[0, 1)`.
pub type OutputFn = Box<dyn Fn(u64) -> f64 + Send + Sync>;

enum CycleData {
    /// Successive states; outputs are computed on every access.
    States { cycles: Vec<Vec<u64>>, output: OutputFn },
    /// Successive outputs, computed once.
    Outputs(Vec<Vec<f64>>),
}

/// Point set whose points are the orbits of a finite recurrence.
///
/// The state space is partitioned into cycles. Points enumerate every
/// state cycle by cycle: point `i` starts at the `i`-th state of that
/// enumeration and its coordinate `j` is the output of the state `j` steps
/// further along the same cycle, wrapping around the cycle. There are as
/// many points as states and the dimension is infinite.
///
/// # Examples
///
/// ```
/// use hups_core::{CycleBasedPointSet, CycleConfig, PointSet};
///
/// // Korobov lattice with n = 7 and multiplier 3
/// let states: Vec<u64> = (0..7).collect();
/// let set = CycleBasedPointSet::from_recurrence(
///     &states,
///     |x| 3 * x % 7,
///     |x| x as f64 / 7.0,
///     CycleConfig::default(),
/// )
/// .unwrap();
///
/// assert_eq!(set.cycle_lengths(), vec![1, 6]);
/// let replay: Vec<f64> = set.point_from_initial_state(1).unwrap().take(7).collect();
/// let expected: Vec<f64> = [1, 3, 2, 6, 4, 5, 1].iter().map(|&x| x as f64 / 7.0).collect();
/// assert_eq!(replay, expected);
/// ```
pub struct CycleBasedPointSet {
    config: CycleConfig,
    data: CycleData,
    /// Start of each cycle in the point enumeration.
    offsets: Vec<usize>,
    num_states: usize,
    /// State -> (cycle, position).
    locator: HashMap<u64, (usize, usize)>,
    /// Accumulated XOR applied to the stored states.
    state_mask: u64,
    pipeline: RandomizationPipeline,
}

impl CycleBasedPointSet {
    /// Partitions `states` into the cycles of `transition` and builds the
    /// point set.
    ///
    /// # Arguments
    ///
    /// * `states` - Every state of the recurrence, each listed once
    /// * `transition` - Successor of a state; must permute `states`
    /// * `output` - Maps a state to a value in `[0, 1)`
    /// * `config` - Digit base, precision and storage mode
    ///
    /// # Errors
    ///
    /// `HupsError::InvalidConstruction` if the configuration is invalid or
    /// `transition` is not a permutation of `states`.
    pub fn from_recurrence<T, O>(
        states: &[u64],
        transition: T,
        output: O,
        config: CycleConfig,
    ) -> Result<Self>
    where
        T: Fn(u64) -> u64,
        O: Fn(u64) -> f64 + Send + Sync + 'static,
    {
        config.validate()?;
        let cycles = partition_into_cycles(states, transition)?;
        Self::from_cycles(cycles, output, config)
    }

    /// Builds the point set from cycles computed elsewhere.
    ///
    /// Each inner vector lists successive states of one cycle. The cycles
    /// must be non-empty and disjoint; they are not checked against a
    /// transition function.
    pub fn from_cycles<O>(cycles: Vec<Vec<u64>>, output: O, config: CycleConfig) -> Result<Self>
    where
        O: Fn(u64) -> f64 + Send + Sync + 'static,
    {
        config.validate()?;
        if cycles.is_empty() {
            return Err(HupsError::InvalidConstruction("no cycles given".to_string()));
        }
        let locator = build_locator(&cycles)?;
        let mut offsets = Vec::with_capacity(cycles.len());
        let mut num_states = 0;
        for cycle in &cycles {
            offsets.push(num_states);
            num_states += cycle.len();
        }
        let data = match config.storage {
            CycleStorage::States => CycleData::States {
                cycles,
                output: Box::new(output),
            },
            CycleStorage::Outputs => CycleData::Outputs(
                cycles
                    .iter()
                    .map(|cycle| cycle.iter().map(|&s| output(s)).collect())
                    .collect(),
            ),
        };
        debug!(
            cycles = offsets.len(),
            states = num_states,
            storage = ?config.storage,
            "cycle-based point set constructed"
        );
        Ok(Self {
            config,
            data,
            offsets,
            num_states,
            locator,
            state_mask: 0,
            pipeline: RandomizationPipeline::new(),
        })
    }

    /// Construction parameters.
    #[inline]
    pub fn config(&self) -> &CycleConfig {
        &self.config
    }

    /// Number of cycles.
    #[inline]
    pub fn num_cycles(&self) -> usize {
        self.offsets.len()
    }

    /// Length of every cycle, in enumeration order.
    pub fn cycle_lengths(&self) -> Vec<usize> {
        self.offsets
            .iter()
            .enumerate()
            .map(|(c, &start)| self.cycle_end(c) - start)
            .collect()
    }

    /// Stored state cycles; `None` when outputs are stored instead.
    pub fn cycles(&self) -> Option<&[Vec<u64>]> {
        match &self.data {
            CycleData::States { cycles, .. } => Some(cycles),
            CycleData::Outputs(_) => None,
        }
    }

    /// Lazy, infinite replay of the cycle containing `s0`, starting at
    /// `s0`. Its period is the length of that cycle.
    ///
    /// # Errors
    ///
    /// `HupsError::InvalidConstruction` if `s0` is not a (current) stored
    /// state.
    pub fn point_from_initial_state(&self, s0: u64) -> Result<CycleReplay<'_>> {
        let &(cycle, start) = self.locator.get(&s0).ok_or_else(|| {
            HupsError::InvalidConstruction(format!("state {} is not in any cycle", s0))
        })?;
        Ok(CycleReplay {
            set: self,
            cycle,
            start,
            step: 0,
        })
    }

    /// Index of the point whose coordinate 0 is the output of `state`.
    pub fn point_index_of(&self, state: u64) -> Option<usize> {
        self.locator
            .get(&state)
            .map(|&(cycle, pos)| self.offsets[cycle] + pos)
    }

    /// XORs every stored state with `mask`, without rebuilding the cycles.
    ///
    /// When the output function reads states as base-2 digit strings this
    /// is a digital shift of the whole point set. Masks accumulate; applying
    /// the same mask twice, or calling [`PointSet::unrandomize`], restores
    /// the original states.
    ///
    /// # Errors
    ///
    /// `HupsError::UnsupportedRandomization` when outputs are stored.
    pub fn xor_stored_states(&mut self, mask: u64) -> Result<()> {
        if matches!(self.data, CycleData::Outputs(_)) {
            return Err(HupsError::UnsupportedRandomization(
                "stored outputs cannot be shifted state-wise".to_string(),
            ));
        }
        self.apply_state_mask(mask);
        debug!(mask, accumulated = self.state_mask, "stored states shifted");
        Ok(())
    }

    /// XOR currently applied to the stored states; 0 when unshifted.
    #[inline]
    pub fn state_mask(&self) -> u64 {
        self.state_mask
    }

    /// XOR is a bijection on states, so cycles stay disjoint and the
    /// locator only needs its keys remapped.
    fn apply_state_mask(&mut self, mask: u64) {
        let CycleData::States { cycles, .. } = &mut self.data else {
            return;
        };
        for s in cycles.iter_mut().flatten() {
            *s ^= mask;
        }
        self.locator = self
            .locator
            .drain()
            .map(|(s, place)| (s ^ mask, place))
            .collect();
        self.state_mask ^= mask;
    }

    fn cycle_end(&self, cycle: usize) -> usize {
        self.offsets
            .get(cycle + 1)
            .copied()
            .unwrap_or(self.num_states)
    }

    /// Raw output at `pos` of `cycle`, `pos` taken modulo the cycle length.
    fn raw_value(&self, cycle: usize, pos: usize) -> f64 {
        match &self.data {
            CycleData::States { cycles, output } => {
                let c = &cycles[cycle];
                output(c[pos % c.len()])
            }
            CycleData::Outputs(cycles) => {
                let c = &cycles[cycle];
                c[pos % c.len()]
            }
        }
    }

    fn value(&self, cycle: usize, pos: usize, dim: usize) -> f64 {
        let x = self.raw_value(cycle, pos);
        self.pipeline
            .apply_coordinate(dim, x, self.config.precision)
    }
}

impl PointSet for CycleBasedPointSet {
    fn num_points(&self) -> Extent {
        Extent::Finite(self.num_states)
    }

    fn dimension(&self) -> Extent {
        Extent::Infinite
    }

    fn coordinate(&self, i: usize, j: usize) -> Result<f64> {
        self.num_points().check("point", i)?;
        let cycle = self.offsets.partition_point(|&start| start <= i) - 1;
        let offset = i - self.offsets[cycle];
        let len = self.cycle_end(cycle) - self.offsets[cycle];
        Ok(self.value(cycle, (offset + j % len) % len, j))
    }

    fn randomize(&mut self, randomization: Randomization) -> Result<()> {
        match &randomization {
            Randomization::LeftMatrixScramble(_) => {
                return Err(HupsError::UnsupportedRandomization(
                    "cycle-based point sets have no generator matrices to scramble".to_string(),
                ));
            }
            Randomization::DigitalShift(shift) if shift.base() != self.config.base => {
                return Err(HupsError::UnsupportedRandomization(format!(
                    "digital shift in base {} applied to a base-{} cycle set",
                    shift.base(),
                    self.config.base
                )));
            }
            _ => {}
        }
        let name = randomization.name();
        self.pipeline.push(randomization)?;
        debug!(kind = name, steps = self.pipeline.len(), "randomisation pushed");
        Ok(())
    }

    fn unrandomize(&mut self) {
        self.pipeline.clear();
        self.apply_state_mask(self.state_mask);
        debug!("randomisations cleared");
    }

    fn randomizations(&self) -> &RandomizationPipeline {
        &self.pipeline
    }
}

impl fmt::Debug for CycleBasedPointSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CycleBasedPointSet")
            .field("config", &self.config)
            .field("num_cycles", &self.num_cycles())
            .field("num_states", &self.num_states)
            .field("state_mask", &self.state_mask)
            .field("pipeline", &self.pipeline)
            .finish_non_exhaustive()
    }
}

fn build_locator(cycles: &[Vec<u64>]) -> Result<HashMap<u64, (usize, usize)>> {
    let mut locator = HashMap::with_capacity(cycles.iter().map(Vec::len).sum());
    for (c, cycle) in cycles.iter().enumerate() {
        if cycle.is_empty() {
            return Err(HupsError::InvalidConstruction(format!("cycle {} is empty", c)));
        }
        for (pos, &s) in cycle.iter().enumerate() {
            if locator.insert(s, (c, pos)).is_some() {
                return Err(HupsError::InvalidConstruction(format!(
                    "state {} belongs to more than one cycle",
                    s
                )));
            }
        }
    }
    Ok(locator)
}

/// Periodic replay of one cycle from a chosen initial state.
///
/// Yields coordinate after coordinate forever, with the point set's
/// randomisations applied; coordinate `j` is the output of the state `j`
/// steps after the initial one.
#[derive(Debug, Clone)]
pub struct CycleReplay<'a> {
    set: &'a CycleBasedPointSet,
    cycle: usize,
    start: usize,
    step: usize,
}

impl CycleReplay<'_> {
    /// Length of the replayed cycle.
    pub fn period(&self) -> usize {
        self.set.cycle_end(self.cycle) - self.set.offsets[self.cycle]
    }

    /// Returns to the initial state.
    pub fn restart(&mut self) {
        self.step = 0;
    }

    /// Number of coordinates produced so far.
    pub fn position(&self) -> usize {
        self.step
    }
}

impl Iterator for CycleReplay<'_> {
    type Item = f64;

    fn next(&mut self) -> Option<f64> {
        let pos = (self.start + self.step % self.period()) % self.period();
        let value = self.set.value(self.cycle, pos, self.step);
        self.step = self.step.saturating_add(1);
        Some(value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (usize::MAX, None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::randomization::{DigitalShift, LeftMatrixScramble, RandomShift};
    use approx::assert_relative_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn korobov(storage: CycleStorage) -> CycleBasedPointSet {
        let states: Vec<u64> = (0..7).collect();
        CycleBasedPointSet::from_recurrence(
            &states,
            |x| 3 * x % 7,
            |x| x as f64 / 7.0,
            CycleConfig::new().with_storage(storage),
        )
        .unwrap()
    }

    /// LFSR-like toy: states are 3-bit words, output reads them as binary fractions.
    fn binary_cycles() -> CycleBasedPointSet {
        let states: Vec<u64> = (0..8).collect();
        CycleBasedPointSet::from_recurrence(
            &states,
            |x| (x + 1) % 8,
            |x| x as f64 / 8.0,
            CycleConfig::new().with_digits(2, 3),
        )
        .unwrap()
    }

    #[test]
    fn test_korobov_partition() {
        let set = korobov(CycleStorage::States);
        assert_eq!(set.num_cycles(), 2);
        assert_eq!(set.cycle_lengths(), vec![1, 6]);
        assert_eq!(set.num_points(), Extent::Finite(7));
        assert_eq!(set.dimension(), Extent::Infinite);
        assert_eq!(set.cycles().unwrap()[1], vec![1, 3, 2, 6, 4, 5]);
    }

    #[test]
    fn test_points_wrap_around_cycle() {
        let set = korobov(CycleStorage::States);
        // point 0 is the fixed cycle {0}
        assert_eq!(set.coordinate(0, 5).unwrap(), 0.0);
        // point 3 starts at state 2 (offset 2 in the second cycle)
        let coords: Vec<f64> = (0..8).map(|j| set.coordinate(3, j).unwrap() * 7.0).collect();
        for (c, e) in coords.iter().zip([2.0, 6.0, 4.0, 5.0, 1.0, 3.0, 2.0, 6.0]) {
            assert_relative_eq!(*c, e, epsilon = 1e-12);
        }
        assert!(set.coordinate(7, 0).is_err());
        assert!(set.coordinate(6, 1_000_000).is_ok());
    }

    #[test]
    fn test_storage_modes_agree() {
        let states = korobov(CycleStorage::States);
        let outputs = korobov(CycleStorage::Outputs);
        assert!(outputs.cycles().is_none());
        for i in 0..7 {
            for j in 0..10 {
                assert_eq!(states.coordinate(i, j).unwrap(), outputs.coordinate(i, j).unwrap());
            }
        }
    }

    #[test]
    fn test_replay_matches_points() {
        let set = korobov(CycleStorage::Outputs);
        let mut replay = set.point_from_initial_state(6).unwrap();
        assert_eq!(replay.period(), 6);
        let i = set.point_index_of(6).unwrap();
        let first: Vec<f64> = replay.by_ref().take(13).collect();
        for (j, x) in first.iter().enumerate() {
            assert_eq!(*x, set.coordinate(i, j).unwrap());
        }
        assert_eq!(replay.position(), 13);
        replay.restart();
        assert_eq!(replay.next(), Some(6.0 / 7.0));
        assert!(set.point_from_initial_state(7).is_err());
    }

    #[test]
    fn test_from_cycles_validation() {
        let identity = |x: u64| x as f64;
        assert!(CycleBasedPointSet::from_cycles(vec![], identity, CycleConfig::default()).is_err());
        assert!(
            CycleBasedPointSet::from_cycles(vec![vec![1], vec![]], identity, CycleConfig::default())
                .is_err()
        );
        assert!(CycleBasedPointSet::from_cycles(
            vec![vec![1, 2], vec![2]],
            identity,
            CycleConfig::default()
        )
        .is_err());
        let set = CycleBasedPointSet::from_cycles(
            vec![vec![4, 2], vec![9]],
            |x| x as f64 / 10.0,
            CycleConfig::default(),
        )
        .unwrap();
        assert_eq!(set.point_index_of(9), Some(2));
    }

    #[test]
    fn test_digital_shift_and_reversal() {
        let mut set = binary_cycles();
        let before: Vec<f64> = (0..8).map(|i| set.coordinate(i, 0).unwrap()).collect();
        set.randomize(DigitalShift::new(2, vec![vec![1, 0, 1]]).unwrap().into())
            .unwrap();
        // 0.000b ^ 0.101b
        assert_eq!(set.coordinate(0, 0).unwrap(), 0.625);
        // dimension 1 is not covered by the shift
        assert_eq!(set.coordinate(0, 1).unwrap(), 0.125);
        set.unrandomize();
        let after: Vec<f64> = (0..8).map(|i| set.coordinate(i, 0).unwrap()).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn test_xor_states_matches_digital_shift() {
        let mut shifted = binary_cycles();
        shifted
            .randomize(DigitalShift::new(2, vec![vec![1, 1, 0]; 4]).unwrap().into())
            .unwrap();
        let mut xored = binary_cycles();
        xored.xor_stored_states(0b110).unwrap();
        for i in 0..8 {
            for j in 0..4 {
                assert_eq!(shifted.coordinate(i, j).unwrap(), xored.coordinate(i, j).unwrap());
            }
        }
        xored.xor_stored_states(0b110).unwrap();
        assert_eq!(xored.cycles().unwrap()[0], (0..8).collect::<Vec<u64>>());
    }

    #[test]
    fn test_unrandomize_clears_state_xor() {
        let mut set = binary_cycles();
        let deterministic: Vec<Vec<f64>> = (0..8)
            .map(|i| (0..4).map(|j| set.coordinate(i, j).unwrap()).collect())
            .collect();

        set.xor_stored_states(0b101).unwrap();
        set.xor_stored_states(0b011).unwrap();
        assert_eq!(set.state_mask(), 0b110);
        assert_eq!(set.coordinate(0, 0).unwrap(), 0.75);
        assert_eq!(set.point_index_of(0b110), Some(0));

        set.unrandomize();
        assert_eq!(set.state_mask(), 0);
        for (i, row) in deterministic.iter().enumerate() {
            for (j, &x) in row.iter().enumerate() {
                assert_eq!(set.coordinate(i, j).unwrap(), x);
            }
        }
        assert_eq!(set.point_index_of(3), Some(3));
        assert_eq!(set.cycles().unwrap()[0], (0..8).collect::<Vec<u64>>());
    }

    #[test]
    fn test_xor_rejected_for_outputs() {
        let mut set = korobov(CycleStorage::Outputs);
        assert!(matches!(
            set.xor_stored_states(1),
            Err(HupsError::UnsupportedRandomization(_))
        ));
    }

    #[test]
    fn test_randomize_rejections() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut set = korobov(CycleStorage::States);
        let scramble = LeftMatrixScramble::draw(2, 1, 8, &mut rng).unwrap();
        assert!(set.randomize(scramble.into()).is_err());
        let base3 = DigitalShift::new(3, vec![vec![1]]).unwrap();
        assert!(set.randomize(base3.into()).is_err());
        assert!(set.randomizations().is_empty());
    }

    #[test]
    fn test_random_shift_in_replay() {
        let mut set = korobov(CycleStorage::States);
        set.randomize(RandomShift::new(vec![0.5, 0.25]).unwrap().into())
            .unwrap();
        let replay: Vec<f64> = set.point_from_initial_state(1).unwrap().take(3).collect();
        assert_relative_eq!(replay[0], 1.0 / 7.0 + 0.5, epsilon = 1e-12);
        assert_relative_eq!(replay[1], 3.0 / 7.0 + 0.25, epsilon = 1e-12);
        assert_relative_eq!(replay[2], 2.0 / 7.0, epsilon = 1e-12);
    }
}
