//! Digital nets and digital sequences in base b.

use super::cursor::BinaryNetCursor;
use crate::config::{DigitOrder, NetConfig};
use crate::error::{HupsError, Result};
use crate::matrix::{bits_to_fraction, BinaryMatrix, ColumnSource, GeneratorMatrix, IdentityColumns};
use crate::point_set::{Extent, PointSet};
use crate::radical_inverse::{digits_to_fraction, to_digits};
use crate::randomization::{CompiledRandomization, Randomization, RandomizationPipeline};
use std::fmt;
use std::sync::{PoisonError, RwLock, RwLockReadGuard};
use tracing::debug;

/// Generator matrices of every dimension, raw and with scrambles applied.
///
/// `raw` is only ever appended to. `effective` and `packed` are derived
/// from `raw` and the compiled randomisation and are rebuilt whenever
/// either changes.
#[derive(Debug, Clone)]
pub(crate) struct MatrixBank {
    raw: Vec<GeneratorMatrix>,
    effective: Vec<GeneratorMatrix>,
    packed: Vec<BinaryMatrix>,
}

impl MatrixBank {
    fn new(raw: Vec<GeneratorMatrix>, compiled: &CompiledRandomization, order: DigitOrder) -> Self {
        let mut bank = Self {
            raw,
            effective: Vec::new(),
            packed: Vec::new(),
        };
        bank.refresh(compiled, order);
        bank
    }

    fn num_columns(&self) -> usize {
        self.raw.first().map_or(0, GeneratorMatrix::num_columns)
    }

    /// Packed effective matrix of dimension `dim` (base 2 only).
    #[inline]
    pub(crate) fn packed(&self, dim: usize) -> Option<&BinaryMatrix> {
        self.packed.get(dim)
    }

    fn refresh(&mut self, compiled: &CompiledRandomization, order: DigitOrder) {
        self.effective = self
            .raw
            .iter()
            .enumerate()
            .map(|(dim, m)| match compiled.lower(dim) {
                Some(lower) => m.left_multiply(lower),
                None => m.clone(),
            })
            .collect();
        self.packed = if self.raw.first().is_some_and(|m| m.base() == 2) {
            self.effective
                .iter()
                .map(|m| BinaryMatrix::pack_validated(m, order))
                .collect()
        } else {
            Vec::new()
        };
    }

    /// Grows every dimension to `columns` columns, all or nothing.
    fn grow(
        &mut self,
        columns: usize,
        source: &dyn ColumnSource,
        check_rank: bool,
        compiled: &CompiledRandomization,
        order: DigitOrder,
    ) -> Result<()> {
        let mut grown = self.raw.clone();
        for (dim, m) in grown.iter_mut().enumerate() {
            m.grow_columns(columns, source, dim)?;
            if check_rank && !m.leading_block_is_nonsingular() {
                return Err(HupsError::InvalidConstruction(format!(
                    "leading {} x {} block of dimension {} is singular after growth",
                    columns, columns, dim
                )));
            }
        }
        self.raw = grown;
        self.refresh(compiled, order);
        Ok(())
    }
}

/// Digital net (finite) or digital sequence (extensible) in base `b`.
///
/// Point `i` is produced coordinate by coordinate: the base-b digits of `i`
/// are multiplied by the coordinate's generator matrix over `Z_b`, the
/// resulting output digits are shifted and scrambled by the active
/// randomisations, and the digit-to-value map `sum_p y_p b^-(p+1)` turns
/// them into a real. Output is truncated to `r = num_rows` digits, the only
/// source of numerical error (below `b^-r`).
///
/// For base 2 the matrices are also kept packed one word per column, so a
/// coordinate is a handful of XORs; [`DigitalNet::binary_cursor`] further
/// updates coordinates incrementally between consecutive points.
///
/// A digital sequence owns a [`ColumnSource`] and grows every matrix when
/// an index beyond `b^k` is requested. Growth takes a write lock and only
/// appends columns, so previously generated points never change.
///
/// # Examples
///
/// ```
/// use hups_core::{DigitalNet, GeneratorMatrix, NetConfig, PointSet};
///
/// let config = NetConfig::new().with_base(2).with_dimension(2).with_columns(3).with_rows(3);
/// let net = DigitalNet::new(
///     config,
///     vec![
///         GeneratorMatrix::reflected_identity(2, 3, 3).unwrap(),
///         GeneratorMatrix::identity(2, 3, 3).unwrap(),
///     ],
/// )
/// .unwrap();
///
/// // The 2-D Hammersley point set: (i / 8, radical inverse of i).
/// let mut point = [0.0; 2];
/// net.point(3, &mut point).unwrap();
/// assert_eq!(point, [0.375, 0.75]);
/// ```
pub struct DigitalNet {
    config: NetConfig,
    bank: RwLock<MatrixBank>,
    source: Option<Box<dyn ColumnSource>>,
    extensible: bool,
    pipeline: RandomizationPipeline,
    compiled: CompiledRandomization,
    shift_bits: Vec<u64>,
}

impl DigitalNet {
    /// Builds a finite net from explicit generator matrices.
    ///
    /// The net has `b^k` points with `k = config.num_columns`.
    ///
    /// # Arguments
    ///
    /// * `config` - Base, dimension, `k` columns and `r` rows of every matrix
    /// * `matrices` - One `r x k` generator matrix per dimension, in order
    ///
    /// # Errors
    ///
    /// `HupsError::InvalidConstruction` if the configuration is invalid,
    /// the matrix count differs from the dimension, a matrix does not match
    /// the configured base and shape, or (with `check_rank`) a leading
    /// `k x k` block is singular.
    pub fn new(config: NetConfig, matrices: Vec<GeneratorMatrix>) -> Result<Self> {
        config.validate()?;
        if matrices.len() != config.dimension {
            return Err(HupsError::InvalidConstruction(format!(
                "{} generator matrices supplied for dimension {}",
                matrices.len(),
                config.dimension
            )));
        }
        for (dim, m) in matrices.iter().enumerate() {
            if m.base() != config.base
                || m.num_rows() != config.num_rows
                || m.num_columns() != config.num_columns
            {
                return Err(HupsError::InvalidConstruction(format!(
                    "matrix of dimension {} is {} x {} in base {}, expected {} x {} in base {}",
                    dim,
                    m.num_rows(),
                    m.num_columns(),
                    m.base(),
                    config.num_rows,
                    config.num_columns,
                    config.base
                )));
            }
            if config.check_rank && !m.leading_block_is_nonsingular() {
                return Err(HupsError::InvalidConstruction(format!(
                    "leading {} x {} block of dimension {} is singular",
                    config.num_columns, config.num_columns, dim
                )));
            }
        }
        Ok(Self::assemble(config, matrices, None, false))
    }

    /// Builds a finite net whose `k` columns are taken from `source`.
    ///
    /// The source is kept, so [`DigitalNet::grow_columns`] can later extend
    /// the net to more points.
    pub fn from_source<S: ColumnSource + 'static>(config: NetConfig, source: S) -> Result<Self> {
        let matrices = Self::matrices_from_source(&config, &source)?;
        let mut net = Self::new(config, matrices)?;
        net.source = Some(Box::new(source));
        Ok(net)
    }

    /// Builds an extensible digital sequence fed by `source`.
    ///
    /// The sequence starts with `config.num_columns` columns and grows on
    /// demand up to `config.num_rows` columns, i.e. `b^r` points.
    ///
    /// # Arguments
    ///
    /// * `config` - Initial shape; `num_rows` also caps the growth
    /// * `source` - Supplies column `c` of every dimension on demand
    ///
    /// # Errors
    ///
    /// Besides the checks of [`DigitalNet::new`], sequences require
    /// [`DigitOrder::LeastSignificantFirst`]: with the other convention,
    /// adding a digit would move every existing digit to another column.
    pub fn sequence<S: ColumnSource + 'static>(config: NetConfig, source: S) -> Result<Self> {
        if config.digit_order != DigitOrder::LeastSignificantFirst {
            return Err(HupsError::InvalidConstruction(
                "extensible sequences require least-significant-first digit order".to_string(),
            ));
        }
        let mut net = Self::from_source(config, source)?;
        net.extensible = true;
        debug!(base = net.base(), dimension = net.config.dimension, "digital sequence is extensible");
        Ok(net)
    }

    /// One-dimensional van der Corput net in `base` with `b^k` points.
    pub fn van_der_corput(base: u32, k: usize, rows: usize) -> Result<Self> {
        let config = NetConfig::new()
            .with_base(base)
            .with_dimension(1)
            .with_columns(k)
            .with_rows(rows);
        Self::from_source(config, IdentityColumns)
    }

    fn matrices_from_source(config: &NetConfig, source: &dyn ColumnSource) -> Result<Vec<GeneratorMatrix>> {
        config.validate()?;
        (0..config.dimension)
            .map(|dim| {
                let mut m = GeneratorMatrix::zero(config.base, 0, config.num_rows)?;
                m.grow_columns(config.num_columns, source, dim)?;
                Ok(m)
            })
            .collect()
    }

    fn assemble(
        config: NetConfig,
        matrices: Vec<GeneratorMatrix>,
        source: Option<Box<dyn ColumnSource>>,
        extensible: bool,
    ) -> Self {
        let pipeline = RandomizationPipeline::new();
        let compiled = pipeline.compile(config.dimension, config.num_rows);
        let bank = MatrixBank::new(matrices, &compiled, config.digit_order);
        debug!(
            base = config.base,
            dimension = config.dimension,
            columns = config.num_columns,
            rows = config.num_rows,
            "digital net constructed"
        );
        Self {
            shift_bits: vec![0; config.dimension],
            config,
            bank: RwLock::new(bank),
            source,
            extensible,
            pipeline,
            compiled,
        }
    }

    /// Digit base `b`.
    #[inline]
    pub fn base(&self) -> u32 {
        self.config.base
    }

    /// Output precision `r` in digits.
    #[inline]
    pub fn num_rows(&self) -> usize {
        self.config.num_rows
    }

    /// Current number of generator columns `k`.
    pub fn num_columns(&self) -> usize {
        self.read_bank().num_columns()
    }

    /// Whether the net grows on demand.
    #[inline]
    pub fn is_sequence(&self) -> bool {
        self.extensible
    }

    /// Construction parameters. `num_columns` reflects the initial `k`.
    #[inline]
    pub fn config(&self) -> &NetConfig {
        &self.config
    }

    /// Copy of the unscrambled generator matrix of dimension `dim`.
    pub fn generator_matrix(&self, dim: usize) -> Option<GeneratorMatrix> {
        self.read_bank().raw.get(dim).cloned()
    }

    /// Appends generator columns until every matrix has `new_count`
    /// columns. Requires a column source; never alters existing points.
    ///
    /// # Errors
    ///
    /// `HupsError::InvalidConstruction` if the net has no column source,
    /// uses most-significant-first digits, or the new size is not
    /// representable.
    pub fn grow_columns(&mut self, new_count: usize) -> Result<()> {
        let Some(source) = self.source.as_deref() else {
            return Err(HupsError::InvalidConstruction(
                "net has no column source to grow from".to_string(),
            ));
        };
        if self.config.digit_order != DigitOrder::LeastSignificantFirst {
            return Err(HupsError::InvalidConstruction(
                "growth requires least-significant-first digit order".to_string(),
            ));
        }
        if num_traits::checked_pow(self.config.base as usize, new_count).is_none() {
            return Err(HupsError::InvalidConstruction(format!(
                "{}^{} points exceed the addressable index range",
                self.config.base, new_count
            )));
        }
        let bank = self.bank.get_mut().unwrap_or_else(PoisonError::into_inner);
        let before = bank.num_columns();
        bank.grow(
            new_count,
            source,
            self.config.check_rank,
            &self.compiled,
            self.config.digit_order,
        )?;
        debug!(from = before, to = bank.num_columns(), "generator columns grown");
        Ok(())
    }

    /// Makes sure the first `n` points can be generated, growing a
    /// sequence's matrices if needed. Call once up front to keep later
    /// concurrent traversals free of write locks.
    ///
    /// # Errors
    ///
    /// `HupsError::OutOfRange` if a finite net has fewer than `n` points or
    /// a sequence would need more columns than it has rows.
    pub fn ensure_points(&self, n: usize) -> Result<()> {
        let needed = columns_for(n, self.config.base);
        let current = self.read_bank().num_columns();
        if needed <= current {
            return Ok(());
        }
        let source = match (self.extensible, self.source.as_deref()) {
            (true, Some(source)) => source,
            _ => {
                let bound = num_traits::checked_pow(self.config.base as usize, current)
                    .unwrap_or(usize::MAX);
                return Err(HupsError::point_out_of_range(n - 1, bound));
            }
        };
        if needed > self.config.num_rows {
            let bound = num_traits::checked_pow(self.config.base as u64, self.config.num_rows)
                .unwrap_or(u64::MAX);
            return Err(HupsError::OutOfRange {
                what: "point",
                index: (n - 1) as u64,
                bound,
            });
        }
        let mut bank = self.bank.write().unwrap_or_else(PoisonError::into_inner);
        // Another thread may have grown the matrices meanwhile.
        if bank.num_columns() >= needed {
            return Ok(());
        }
        bank.grow(
            needed,
            source,
            self.config.check_rank,
            &self.compiled,
            self.config.digit_order,
        )?;
        debug!(from = current, to = needed, "digital sequence grown on demand");
        Ok(())
    }

    /// Incremental base-2 cursor.
    ///
    /// Moving from one point to the next XORs only the columns whose index
    /// bits change, instead of recomputing the full product. The values are
    /// bit-identical to [`PointSet::coordinate`]. With
    /// `TraversalOrder::GrayCode` step `i` visits point `i ^ (i >> 1)`.
    ///
    /// # Errors
    ///
    /// `HupsError::InvalidConstruction` if the base is not 2.
    pub fn binary_cursor(&self) -> Result<BinaryNetCursor<'_>> {
        if self.config.base != 2 {
            return Err(HupsError::InvalidConstruction(format!(
                "incremental cursor requires base 2, net has base {}",
                self.config.base
            )));
        }
        Ok(BinaryNetCursor::new(self, self.config.traversal))
    }

    pub(crate) fn read_bank(&self) -> RwLockReadGuard<'_, MatrixBank> {
        self.bank.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Output bits of the base-2 digital shift of `dim`.
    #[inline]
    pub(crate) fn shift_bits(&self, dim: usize) -> u64 {
        self.shift_bits.get(dim).copied().unwrap_or(0)
    }

    /// Applies the modulo-1 shifts of the pipeline.
    #[inline]
    pub(crate) fn finish(&self, dim: usize, x: f64) -> f64 {
        self.compiled.apply_real(dim, x)
    }

    /// Coordinate `dim` of point `index`, bounds already checked.
    fn evaluate(&self, bank: &MatrixBank, index: u64, dim: usize) -> Result<f64> {
        if let Some(packed) = bank.packed(dim) {
            let bits = packed.apply_index(index) ^ self.shift_bits(dim);
            return Ok(self.finish(dim, bits_to_fraction(bits, self.config.num_rows)));
        }
        let b = self.config.base;
        let digits = to_digits(index, b, bank.num_columns(), self.config.digit_order)?;
        let mut y = bank.effective[dim].apply(&digits)?;
        if let Some(shift) = self.compiled.shift(dim) {
            for (yp, &d) in y.iter_mut().zip(shift) {
                *yp = (*yp + d) % b;
            }
        }
        Ok(self.finish(dim, digits_to_fraction(&y, b)))
    }

    fn recompile(&mut self) {
        let rows = self.config.num_rows;
        self.compiled = self.pipeline.compile(self.config.dimension, rows);
        self.shift_bits = if self.config.base == 2 {
            (0..self.config.dimension)
                .map(|dim| self.compiled.shift_bits(dim, rows))
                .collect()
        } else {
            vec![0; self.config.dimension]
        };
        let order = self.config.digit_order;
        self.bank
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .refresh(&self.compiled, order);
    }
}

impl PointSet for DigitalNet {
    fn num_points(&self) -> Extent {
        if self.extensible {
            return Extent::Infinite;
        }
        let k = self.num_columns();
        // validated at construction and growth
        Extent::Finite(num_traits::checked_pow(self.config.base as usize, k).unwrap_or(usize::MAX))
    }

    fn dimension(&self) -> Extent {
        Extent::Finite(self.config.dimension)
    }

    fn coordinate(&self, i: usize, j: usize) -> Result<f64> {
        self.dimension().check("coordinate", j)?;
        if self.extensible {
            self.ensure_points(i.saturating_add(1))?;
        } else {
            self.num_points().check("point", i)?;
        }
        let bank = self.read_bank();
        self.evaluate(&bank, i as u64, j)
    }

    fn randomize(&mut self, randomization: Randomization) -> Result<()> {
        if let Some(base) = randomization.base() {
            if base != self.config.base {
                return Err(HupsError::UnsupportedRandomization(format!(
                    "{} in base {} applied to a base-{} net",
                    randomization.name(),
                    base,
                    self.config.base
                )));
            }
        }
        if let Randomization::LeftMatrixScramble(scramble) = &randomization {
            if scramble.rows() != self.config.num_rows {
                return Err(HupsError::UnsupportedRandomization(format!(
                    "scramble of {} rows applied to a net with {} rows",
                    scramble.rows(),
                    self.config.num_rows
                )));
            }
        }
        let name = randomization.name();
        self.pipeline.push(randomization)?;
        self.recompile();
        debug!(kind = name, steps = self.pipeline.len(), "randomisation pushed");
        Ok(())
    }

    fn unrandomize(&mut self) {
        self.pipeline.clear();
        self.recompile();
        debug!("randomisations cleared");
    }

    fn randomizations(&self) -> &RandomizationPipeline {
        &self.pipeline
    }
}

impl fmt::Debug for DigitalNet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DigitalNet")
            .field("config", &self.config)
            .field("num_columns", &self.num_columns())
            .field("extensible", &self.extensible)
            .field("pipeline", &self.pipeline)
            .finish_non_exhaustive()
    }
}

/// Smallest `k` with `base^k >= n`.
fn columns_for(n: usize, base: u32) -> usize {
    let mut k = 0;
    let mut capacity: u128 = 1;
    while capacity < n as u128 {
        capacity *= base as u128;
        k += 1;
    }
    k
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TraversalOrder;
    use crate::iterator::PointSetIterator;
    use crate::randomization::{DigitalShift, LeftMatrixScramble, RandomShift};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn hammersley(k: usize, rows: usize) -> DigitalNet {
        let config = NetConfig::new()
            .with_dimension(2)
            .with_columns(k)
            .with_rows(rows);
        DigitalNet::new(
            config,
            vec![
                GeneratorMatrix::reflected_identity(2, k, rows).unwrap(),
                GeneratorMatrix::identity(2, k, rows).unwrap(),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_columns_for() {
        assert_eq!(columns_for(0, 2), 0);
        assert_eq!(columns_for(1, 2), 0);
        assert_eq!(columns_for(2, 2), 1);
        assert_eq!(columns_for(9, 2), 4);
        assert_eq!(columns_for(9, 3), 2);
        assert_eq!(columns_for(10, 3), 3);
    }

    #[test]
    fn test_van_der_corput_base2() {
        let net = DigitalNet::van_der_corput(2, 3, 31).unwrap();
        let values: Vec<f64> = (0..8).map(|i| net.coordinate(i, 0).unwrap()).collect();
        assert_eq!(values, vec![0.0, 0.5, 0.25, 0.75, 0.125, 0.625, 0.375, 0.875]);
        assert_eq!(net.num_points(), Extent::Finite(8));
    }

    #[test]
    fn test_hammersley_points() {
        let net = hammersley(3, 3);
        let mut point = [0.0; 2];
        net.point(6, &mut point).unwrap();
        assert_eq!(point, [0.75, 0.375]);
    }

    #[test]
    fn test_bounds() {
        let net = hammersley(3, 3);
        assert!(matches!(
            net.coordinate(8, 0),
            Err(HupsError::OutOfRange { what: "point", .. })
        ));
        assert!(matches!(
            net.coordinate(0, 2),
            Err(HupsError::OutOfRange {
                what: "coordinate",
                ..
            })
        ));
    }

    #[test]
    fn test_construction_errors() {
        let config = NetConfig::new().with_dimension(2).with_columns(2).with_rows(2);
        let identity = GeneratorMatrix::identity(2, 2, 2).unwrap();
        // wrong matrix count
        assert!(DigitalNet::new(config.clone(), vec![identity.clone()]).is_err());
        // wrong shape
        let wide = GeneratorMatrix::identity(2, 2, 3).unwrap();
        assert!(DigitalNet::new(config.clone(), vec![identity.clone(), wide]).is_err());
        // singular leading block
        let singular = GeneratorMatrix::new(2, 2, vec![vec![1, 0], vec![1, 0]]).unwrap();
        assert!(matches!(
            DigitalNet::new(config.clone(), vec![identity.clone(), singular.clone()]),
            Err(HupsError::InvalidConstruction(_))
        ));
        // accepted when the rank check is disabled
        assert!(DigitalNet::new(config.with_rank_check(false), vec![identity, singular]).is_ok());
    }

    #[test]
    fn test_general_base_van_der_corput() {
        let net = DigitalNet::van_der_corput(3, 2, 10).unwrap();
        let expected = [0.0, 1.0 / 3.0, 2.0 / 3.0, 1.0 / 9.0, 4.0 / 9.0, 7.0 / 9.0];
        for (i, e) in expected.iter().enumerate() {
            approx::assert_relative_eq!(net.coordinate(i, 0).unwrap(), *e, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_most_significant_first_swaps_constructions() {
        let config = NetConfig::new()
            .with_columns(3)
            .with_rows(3)
            .with_digit_order(DigitOrder::MostSignificantFirst);
        let net = DigitalNet::new(config, vec![GeneratorMatrix::identity(2, 3, 3).unwrap()]).unwrap();
        let values: Vec<f64> = (0..8).map(|i| net.coordinate(i, 0).unwrap()).collect();
        let natural: Vec<f64> = (0..8).map(|i| i as f64 / 8.0).collect();
        assert_eq!(values, natural);
    }

    #[test]
    fn test_sequence_grows_on_demand() {
        let config = NetConfig::new().with_columns(2).with_rows(20);
        let seq = DigitalNet::sequence(config, IdentityColumns).unwrap();
        assert_eq!(seq.num_points(), Extent::Infinite);
        assert_eq!(seq.num_columns(), 2);

        let early = seq.coordinate(3, 0).unwrap();
        assert_eq!(seq.coordinate(100, 0).unwrap(), crate::radical_inverse::radical_inverse(100, 2, 20).unwrap());
        assert_eq!(seq.num_columns(), 7);
        assert_eq!(seq.coordinate(3, 0).unwrap(), early);
    }

    #[test]
    fn test_sequence_limited_by_rows() {
        let config = NetConfig::new().with_columns(2).with_rows(4);
        let seq = DigitalNet::sequence(config, IdentityColumns).unwrap();
        assert!(seq.coordinate(15, 0).is_ok());
        assert!(matches!(
            seq.coordinate(16, 0),
            Err(HupsError::OutOfRange {
                what: "point",
                index: 16,
                bound: 16
            })
        ));
    }

    #[test]
    fn test_sequence_requires_lsf() {
        let config = NetConfig::new().with_digit_order(DigitOrder::MostSignificantFirst);
        assert!(DigitalNet::sequence(config, IdentityColumns).is_err());
    }

    #[test]
    fn test_explicit_grow_columns() {
        let mut net = DigitalNet::van_der_corput(2, 2, 8).unwrap();
        let before: Vec<f64> = (0..4).map(|i| net.coordinate(i, 0).unwrap()).collect();
        net.grow_columns(4).unwrap();
        assert_eq!(net.num_points(), Extent::Finite(16));
        let after: Vec<f64> = (0..4).map(|i| net.coordinate(i, 0).unwrap()).collect();
        assert_eq!(before, after);

        let mut fixed = hammersley(2, 4);
        assert!(fixed.grow_columns(3).is_err());
    }

    #[test]
    fn test_ensure_points_on_finite_net() {
        let net = DigitalNet::van_der_corput(2, 3, 8).unwrap();
        assert!(net.ensure_points(8).is_ok());
        assert!(matches!(
            net.ensure_points(9),
            Err(HupsError::OutOfRange { what: "point", .. })
        ));
    }

    #[test]
    fn test_digital_shift_and_clear() {
        let mut net = hammersley(4, 4);
        let before: Vec<f64> = (0..16).map(|i| net.coordinate(i, 1).unwrap()).collect();

        let shift = DigitalShift::new(2, vec![vec![0, 0, 0, 0], vec![1, 0, 0, 1]]).unwrap();
        net.randomize(shift.into()).unwrap();
        // radical inverse digits XOR 1001b
        assert_eq!(net.coordinate(0, 1).unwrap(), 0.5625);
        assert_eq!(net.coordinate(1, 1).unwrap(), 0.0625);

        net.unrandomize();
        let after: Vec<f64> = (0..16).map(|i| net.coordinate(i, 1).unwrap()).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn test_randomize_rejections() {
        let mut net = hammersley(3, 3);
        let base3 = DigitalShift::new(3, vec![vec![1]]).unwrap();
        assert!(matches!(
            net.randomize(base3.into()),
            Err(HupsError::UnsupportedRandomization(_))
        ));

        let mut rng = StdRng::seed_from_u64(1);
        let wrong_rows = LeftMatrixScramble::draw(2, 2, 5, &mut rng).unwrap();
        assert!(net.randomize(wrong_rows.into()).is_err());

        net.randomize(RandomShift::new(vec![0.5, 0.5]).unwrap().into())
            .unwrap();
        let late = DigitalShift::new(2, vec![vec![1]]).unwrap();
        assert!(net.randomize(late.into()).is_err());
        assert_eq!(net.randomizations().len(), 1);
    }

    #[test]
    fn test_scramble_preserves_net_property() {
        let mut rng = StdRng::seed_from_u64(21);
        let mut net = hammersley(5, 5);
        net.randomize(LeftMatrixScramble::draw(2, 2, 5, &mut rng).unwrap().into())
            .unwrap();
        for dim in 0..2 {
            let mut cells: Vec<usize> = (0..32)
                .map(|i| (net.coordinate(i, dim).unwrap() * 32.0) as usize)
                .collect();
            cells.sort_unstable();
            assert_eq!(cells, (0..32).collect::<Vec<_>>());
        }
        // raw matrices are untouched
        assert_eq!(
            net.generator_matrix(1).unwrap(),
            GeneratorMatrix::identity(2, 5, 5).unwrap()
        );
    }

    #[test]
    fn test_general_base_shift_matches_pipeline_path() {
        let config = NetConfig::new().with_base(5).with_columns(2).with_rows(6);
        let mut net = DigitalNet::from_source(config, IdentityColumns).unwrap();
        let mut rng = StdRng::seed_from_u64(4);
        let shift = DigitalShift::draw(5, 1, 6, &mut rng).unwrap();
        net.randomize(shift.clone().into()).unwrap();
        for i in 0..25 {
            let mut digits = to_digits(i as u64, 5, 6, DigitOrder::LeastSignificantFirst).unwrap();
            shift.apply_digits(0, &mut digits);
            approx::assert_relative_eq!(
                net.coordinate(i, 0).unwrap(),
                digits_to_fraction(&digits, 5),
                epsilon = 1e-12
            );
        }
    }

    #[test]
    fn test_binary_cursor_requires_base2() {
        let net = DigitalNet::van_der_corput(3, 2, 4).unwrap();
        assert!(net.binary_cursor().is_err());
        let net = DigitalNet::van_der_corput(2, 2, 4).unwrap();
        assert!(net.binary_cursor().is_ok());
    }

    #[test]
    fn test_gray_code_config_reaches_cursor() {
        let config = NetConfig::new()
            .with_columns(3)
            .with_rows(3)
            .with_traversal(TraversalOrder::GrayCode);
        let net = DigitalNet::from_source(config, IdentityColumns).unwrap();
        let mut cursor = net.binary_cursor().unwrap();
        let mut values = Vec::new();
        for _ in 0..4 {
            values.push(cursor.next_coordinate().unwrap());
            cursor.reset_to_next_point();
        }
        // points 0, 1, 3, 2
        assert_eq!(values, vec![0.0, 0.5, 0.75, 0.25]);
    }
}
