//! Sparse matrices stored as rows of sparse vectors
//!
//! One generic type serves both the modular and the rational variant. Row
//! storage suits Gaussian elimination: every elimination step is a row
//! `axpy`, i.e. a merge of two sorted entry lists.
//!
//! # Pivot rule
//!
//! For target column `c`, among the rows not yet holding a pivot, the row
//! whose leading entry sits in column `c` and that has the fewest nonzeros
//! is chosen. Under exact arithmetic numerical stability is irrelevant, and
//! the shortest pivot row introduces the least fill-in when it is added to
//! the other rows.

use std::collections::BTreeMap;
use std::fmt;

use log::trace;
use num_bigint::BigInt;

use crate::cancel::{Checkpoint, Uninterruptible};
use crate::dense::Matrix;
use crate::error::{LinalgError, Result};
use crate::modular::{ModInt, PrimeField};
use crate::rational::Rational;
use crate::scalar::Scalar;
use crate::vector::SparseVector;

/// Sparse matrix over a field, stored by rows
#[derive(Debug, Clone)]
pub struct SparseMatrix<T: Scalar> {
    nrows: usize,
    ncols: usize,
    field: T::Field,
    rows: Vec<SparseVector<T>>,
    /// Pivot columns found by the last echelon call; `None` when unknown
    pivots: Option<Vec<usize>>,
}

/// Sparse matrix over `Z/pZ`
pub type ModularSparseMatrix = SparseMatrix<ModInt>;

/// Sparse matrix over the rationals
pub type RationalSparseMatrix = SparseMatrix<Rational>;

impl<T: Scalar> SparseMatrix<T> {
    /// Zero matrix
    pub fn new(nrows: usize, ncols: usize, field: T::Field) -> Self {
        let rows = (0..nrows)
            .map(|_| SparseVector::new(ncols, field.clone()))
            .collect();
        Self {
            nrows,
            ncols,
            field,
            rows,
            pivots: None,
        }
    }

    /// Build from a flat row-major list of `nrows * ncols` values
    pub fn from_dense(nrows: usize, ncols: usize, field: T::Field, values: &[T]) -> Result<Self> {
        if values.len() != nrows * ncols {
            return Err(LinalgError::Arithmetic(format!(
                "{} values do not fill a {} x {} matrix",
                values.len(),
                nrows,
                ncols
            )));
        }
        let rows = (0..nrows)
            .map(|i| SparseVector::from_dense(field.clone(), &values[i * ncols..(i + 1) * ncols]))
            .collect();
        Ok(Self {
            nrows,
            ncols,
            field,
            rows,
            pivots: None,
        })
    }

    /// Build from dense rows of equal length
    pub fn from_rows(ncols: usize, field: T::Field, rows: &[Vec<T>]) -> Result<Self> {
        let mut m = Self::new(rows.len(), ncols, field);
        for (i, row) in rows.iter().enumerate() {
            if row.len() != ncols {
                return Err(LinalgError::Arithmetic(format!(
                    "row {} has {} entries, expected {}",
                    i,
                    row.len(),
                    ncols
                )));
            }
            m.rows[i] = SparseVector::from_dense(m.field.clone(), row);
        }
        Ok(m)
    }

    /// Create a sparse matrix from COO (coordinate) format
    ///
    /// Zero values are skipped; a repeated coordinate is an error.
    pub fn from_triples<I>(nrows: usize, ncols: usize, field: T::Field, entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = (usize, usize, T)>,
    {
        let mut by_row: Vec<Vec<(usize, T)>> = vec![Vec::new(); nrows];
        for (i, j, x) in entries {
            LinalgError::check_index(i, nrows)?;
            by_row[i].push((j, x));
        }
        let rows = by_row
            .into_iter()
            .map(|pairs| SparseVector::from_pairs(ncols, field.clone(), pairs))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            nrows,
            ncols,
            field,
            rows,
            pivots: None,
        })
    }

    /// Build from a `(row, col) -> value` mapping
    pub fn from_map(
        nrows: usize,
        ncols: usize,
        field: T::Field,
        entries: &BTreeMap<(usize, usize), T>,
    ) -> Result<Self> {
        Self::from_triples(
            nrows,
            ncols,
            field,
            entries.iter().map(|(&(i, j), x)| (i, j, x.clone())),
        )
    }

    /// `n × n` matrix with `value` on the diagonal
    pub fn scalar(n: usize, field: T::Field, value: T) -> Self {
        let mut m = Self::new(n, n, field);
        if !value.is_zero() {
            for (i, row) in m.rows.iter_mut().enumerate() {
                // i < n == degree, cannot fail
                let _ = row.set(i, value.clone());
            }
        }
        m
    }

    pub fn identity(n: usize, field: T::Field) -> Self {
        Self::scalar(n, field, T::one())
    }

    pub fn nrows(&self) -> usize {
        self.nrows
    }

    pub fn ncols(&self) -> usize {
        self.ncols
    }

    pub fn field(&self) -> &T::Field {
        &self.field
    }

    /// Pivot columns from the last echelon call
    pub fn pivots(&self) -> Option<&[usize]> {
        self.pivots.as_deref()
    }

    pub(crate) fn set_pivots(&mut self, pivots: Vec<usize>) {
        self.pivots = Some(pivots);
    }

    /// Rank, known only after `echelon`
    pub fn rank(&self) -> Result<usize> {
        self.pivots.as_ref().map(Vec::len).ok_or_else(|| {
            LinalgError::Arithmetic("rank is unknown until the matrix is echelonized".to_string())
        })
    }

    pub fn get(&self, i: usize, j: usize) -> Result<T> {
        self.row(i)?.get(j)
    }

    pub fn set(&mut self, i: usize, j: usize, x: T) -> Result<()> {
        LinalgError::check_index(i, self.nrows)?;
        self.rows[i].set(j, x)?;
        self.pivots = None;
        Ok(())
    }

    pub fn row(&self, i: usize) -> Result<&SparseVector<T>> {
        LinalgError::check_index(i, self.nrows)?;
        Ok(&self.rows[i])
    }

    pub fn rows(&self) -> &[SparseVector<T>] {
        &self.rows
    }

    /// Replace row `i`; the new row must have degree `ncols` over the same field
    pub fn set_row(&mut self, i: usize, row: SparseVector<T>) -> Result<()> {
        LinalgError::check_index(i, self.nrows)?;
        if row.degree() != self.ncols || row.field() != &self.field {
            return Err(LinalgError::Arithmetic(format!(
                "row of degree {} over {} does not fit a matrix with {} columns over {}",
                row.degree(),
                row.field(),
                self.ncols,
                self.field
            )));
        }
        self.rows[i] = row;
        self.pivots = None;
        Ok(())
    }

    /// Number of nonzero entries
    pub fn nnz(&self) -> usize {
        self.rows.iter().map(SparseVector::num_nonzero).sum()
    }

    /// Fraction of entries that are nonzero
    pub fn density(&self) -> f64 {
        let total = self.nrows * self.ncols;
        if total == 0 {
            return 0.0;
        }
        self.nnz() as f64 / total as f64
    }

    /// Sparsity ratio (fraction of zeros)
    pub fn sparsity(&self) -> f64 {
        1.0 - self.density()
    }

    /// Nonzero entries as `(row, col, value)` in row-major order
    pub fn entries(&self) -> impl Iterator<Item = (usize, usize, &T)> + '_ {
        self.rows
            .iter()
            .enumerate()
            .flat_map(|(i, row)| row.iter().map(move |(j, x)| (i, j, x)))
    }

    pub fn swap_rows(&mut self, i: usize, j: usize) -> Result<()> {
        LinalgError::check_index(i, self.nrows)?;
        LinalgError::check_index(j, self.nrows)?;
        self.rows.swap(i, j);
        self.pivots = None;
        Ok(())
    }

    pub fn scale_row(&mut self, i: usize, k: &T) -> Result<()> {
        LinalgError::check_index(i, self.nrows)?;
        self.rows[i].scale(k);
        self.pivots = None;
        Ok(())
    }

    /// Row `dst` becomes `k` times row `src`
    pub fn set_row_to_multiple_of_row(&mut self, dst: usize, src: usize, k: &T) -> Result<()> {
        LinalgError::check_index(dst, self.nrows)?;
        LinalgError::check_index(src, self.nrows)?;
        self.rows[dst] = self.rows[src].scaled(k);
        self.pivots = None;
        Ok(())
    }

    /// Row `dst` gets `k` times row `src` added to it
    pub fn add_multiple_of_row(&mut self, dst: usize, src: usize, k: &T) -> Result<()> {
        LinalgError::check_index(dst, self.nrows)?;
        LinalgError::check_index(src, self.nrows)?;
        let sum = self.rows[dst].axpy(&self.rows[src], k)?;
        self.rows[dst] = sum;
        self.pivots = None;
        Ok(())
    }

    /// `Σ coeffs[r] * row[r]` accumulated with `axpy`
    pub fn linear_combination_of_rows(&self, coeffs: &[T]) -> Result<SparseVector<T>> {
        if coeffs.len() != self.nrows {
            return Err(LinalgError::Arithmetic(format!(
                "{} coefficients for {} rows",
                coeffs.len(),
                self.nrows
            )));
        }
        let mut acc = SparseVector::new(self.ncols, self.field.clone());
        for (row, k) in self.rows.iter().zip(coeffs) {
            if !k.is_zero() {
                acc.axpy_assign(row, k)?;
            }
        }
        Ok(acc)
    }

    pub fn transpose(&self) -> Self {
        let mut cols: Vec<Vec<(usize, T)>> = vec![Vec::new(); self.ncols];
        for (i, j, x) in self.entries() {
            cols[j].push((i, x.clone()));
        }
        let rows = cols
            .into_iter()
            .map(|pairs| {
                let mut v = SparseVector::new(self.nrows, self.field.clone());
                // pairs arrive in increasing row order with nonzero values
                for (i, x) in pairs {
                    let _ = v.set(i, x);
                }
                v
            })
            .collect();
        Self {
            nrows: self.ncols,
            ncols: self.nrows,
            field: self.field.clone(),
            rows,
            pivots: None,
        }
    }

    /// Dense row-major copy
    pub fn to_dense(&self) -> Matrix<T> {
        let mut data = Vec::with_capacity(self.nrows * self.ncols);
        for row in &self.rows {
            data.extend(row.to_dense());
        }
        Matrix::from_flat(data, self.nrows, self.ncols)
    }

    /// Put the matrix in reduced row-echelon form in place
    pub fn echelon(&mut self) -> Result<()> {
        trace!("echelon: {} x {}, nnz {} ..", self.nrows, self.ncols, self.nnz());
        let pivots = eliminate(&mut self.rows, self.ncols, &self.field, &Uninterruptible)?;
        trace!("echelon: {} x {} => rank {}.", self.nrows, self.ncols, pivots.len());
        self.pivots = Some(pivots);
        Ok(())
    }

    /// `echelon` with a cancellation checkpoint per column
    ///
    /// Elimination runs on a copy of the rows; on cancellation the matrix is
    /// left exactly as it was.
    pub fn echelon_with<C: Checkpoint + ?Sized>(&mut self, cancel: &C) -> Result<()> {
        let mut rows = self.rows.clone();
        let pivots = eliminate(&mut rows, self.ncols, &self.field, cancel)?;
        self.rows = rows;
        self.pivots = Some(pivots);
        Ok(())
    }

    /// Echelonized copy
    pub fn echelon_form(&self) -> Result<Self> {
        let mut e = self.clone();
        e.echelon()?;
        Ok(e)
    }
}

/// Gauss-Jordan elimination with the sparsity-preserving pivot rule
///
/// Returns the pivot columns. Pivot rows end up in `rows[..rank]` in pivot
/// order, scaled to leading coefficient one; the remaining rows are zero.
fn eliminate<T, C>(
    rows: &mut [SparseVector<T>],
    ncols: usize,
    field: &T::Field,
    cancel: &C,
) -> Result<Vec<usize>>
where
    T: Scalar,
    C: Checkpoint + ?Sized,
{
    let mut pivots = Vec::new();
    let mut start_row = 0;

    for c in 0..ncols {
        if start_row == rows.len() {
            break;
        }
        cancel.checkpoint()?;

        // Rows above start_row are pivot rows; every other row is zero left of c.
        let mut best: Option<(usize, usize)> = None;
        for (r, row) in rows.iter().enumerate().skip(start_row) {
            if row.first_position() == Some(c) {
                let nnz = row.num_nonzero();
                if best.map_or(true, |(_, min)| nnz < min) {
                    best = Some((r, nnz));
                }
            }
        }
        let Some((r, _)) = best else {
            continue;
        };

        let lead_inv = rows[r]
            .leading_value()
            .and_then(|x| x.inverse(field))
            .ok_or_else(|| LinalgError::Arithmetic(format!("pivot in column {} is not invertible", c)))?;
        rows[r].scale(&lead_inv);
        rows.swap(r, start_row);
        pivots.push(c);

        let (before, rest) = rows.split_at_mut(start_row);
        if let Some((pivot_row, after)) = rest.split_first_mut() {
            for row in before.iter_mut().chain(after.iter_mut()) {
                let coeff = row.get(c)?;
                if !coeff.is_zero() {
                    row.axpy_assign(pivot_row, &coeff.negated(field))?;
                }
            }
        }
        start_row += 1;
    }

    Ok(pivots)
}

impl<T: Scalar> PartialEq for SparseMatrix<T> {
    /// Entrywise equality; pivot bookkeeping is ignored
    fn eq(&self, other: &Self) -> bool {
        self.nrows == other.nrows
            && self.ncols == other.ncols
            && self.field == other.field
            && self.rows == other.rows
    }
}

impl<T: Scalar> fmt::Display for SparseMatrix<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_dense())
    }
}

impl SparseMatrix<ModInt> {
    pub fn modulus(&self) -> u32 {
        self.field.modulus()
    }

    /// Set entry `(i, j)` to the residue of a signed integer
    pub fn set_int(&mut self, i: usize, j: usize, x: i64) -> Result<()> {
        let r = self.field.reduce_i64(x);
        self.set(i, j, r)
    }

    /// Set entry `(i, j)` to the residue of a big integer
    pub fn set_bigint(&mut self, i: usize, j: usize, x: &BigInt) -> Result<()> {
        let r = self.field.reduce_bigint(x);
        self.set(i, j, r)
    }

    /// Build over `GF(p)` from signed integer rows
    pub fn from_int_rows(p: u64, rows: &[Vec<i64>]) -> Result<Self> {
        let field = PrimeField::new(p)?;
        let ncols = rows.first().map_or(0, Vec::len);
        let reduced: Vec<Vec<ModInt>> = rows
            .iter()
            .map(|row| row.iter().map(|&x| field.reduce_i64(x)).collect())
            .collect();
        Self::from_rows(ncols, field, &reduced)
    }

    /// Residues as nonnegative integers in `[0, p)`
    pub fn lift_to_rationals(&self) -> Result<RationalSparseMatrix> {
        let rows = self
            .rows
            .iter()
            .map(|row| {
                row.map_values(crate::rational::RationalField, |x| {
                    Ok(Rational::from_int(x.value()))
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(SparseMatrix {
            nrows: self.nrows,
            ncols: self.ncols,
            field: crate::rational::RationalField,
            rows,
            pivots: self.pivots.clone(),
        })
    }
}

impl<T: Scalar> SparseMatrix<T> {
    pub(crate) fn from_parts(
        nrows: usize,
        ncols: usize,
        field: T::Field,
        rows: Vec<SparseVector<T>>,
    ) -> Self {
        debug_assert_eq!(rows.len(), nrows);
        debug_assert!(rows.iter().all(|r| r.degree() == ncols));
        Self {
            nrows,
            ncols,
            field,
            rows,
            pivots: None,
        }
    }

    pub(crate) fn rows_mut(&mut self) -> &mut [SparseVector<T>] {
        self.pivots = None;
        &mut self.rows
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cancel::CancelToken;
    use crate::rational::RationalField;

    fn q(n: i64, d: i64) -> Rational {
        Rational::from_ratio(n, d)
    }

    fn qmat(rows: &[&[i64]]) -> RationalSparseMatrix {
        let ncols = rows.first().map_or(0, |r| r.len());
        let rows: Vec<Vec<Rational>> = rows
            .iter()
            .map(|r| r.iter().map(|&x| Rational::from(x)).collect())
            .collect();
        SparseMatrix::from_rows(ncols, RationalField, &rows).unwrap()
    }

    #[test]
    fn test_unreduced_modular_entry() {
        let f = PrimeField::new(7).unwrap();
        let mut m = ModularSparseMatrix::identity(2, f);
        m.set(0, 0, ModInt(7)).unwrap();
        assert_eq!(m.nnz(), 1);
        assert_eq!(m.get(0, 0).unwrap(), ModInt(0));

        m.set(0, 1, ModInt(10)).unwrap();
        assert_eq!(m.get(0, 1).unwrap(), ModInt(3));
        m.echelon().unwrap();
        assert_eq!(m.pivots(), Some(&[1usize][..]));
        assert_eq!(m.rank().unwrap(), 1);
    }

    #[test]
    fn test_constructors_agree() {
        let dense = SparseMatrix::from_dense(
            2,
            3,
            RationalField,
            &[q(1, 1), q(0, 1), q(2, 1), q(0, 1), q(-1, 2), q(0, 1)],
        )
        .unwrap();
        let coo = SparseMatrix::from_triples(
            2,
            3,
            RationalField,
            vec![(1, 1, q(-1, 2)), (0, 2, q(2, 1)), (0, 0, q(1, 1))],
        )
        .unwrap();
        let mut map = BTreeMap::new();
        map.insert((0, 0), q(1, 1));
        map.insert((0, 2), q(2, 1));
        map.insert((1, 1), q(-1, 2));
        let mapped = SparseMatrix::from_map(2, 3, RationalField, &map).unwrap();

        assert_eq!(dense, coo);
        assert_eq!(dense, mapped);
        assert_eq!(dense.nnz(), 3);
        assert!(SparseMatrix::from_triples(2, 3, RationalField, vec![(2, 0, q(1, 1))]).is_err());
        assert!(SparseMatrix::from_triples(2, 3, RationalField, vec![(0, 3, q(1, 1))]).is_err());
    }

    #[test]
    fn test_scalar_matrix() {
        let m = SparseMatrix::scalar(3, RationalField, q(5, 1));
        for i in 0..3 {
            for j in 0..3 {
                let expected = if i == j { q(5, 1) } else { q(0, 1) };
                assert_eq!(m.get(i, j).unwrap(), expected);
            }
        }
        assert_eq!(SparseMatrix::scalar(3, RationalField, q(0, 1)).nnz(), 0);
    }

    #[test]
    fn test_set_row_to_multiple_of_row() {
        let mut m = RationalSparseMatrix::new(3, 3, RationalField);
        m.set(1, 1, q(10, 3)).unwrap();

        m.set_row_to_multiple_of_row(0, 1, &q(6, 1)).unwrap();
        assert_eq!(m.row(0).unwrap().to_dense(), vec![q(0, 1), q(20, 1), q(0, 1)]);

        m.set_row_to_multiple_of_row(2, 1, &q(-10, 1)).unwrap();
        assert_eq!(m.row(2).unwrap().to_dense(), vec![q(0, 1), q(-100, 3), q(0, 1)]);
        assert_eq!(m.row(1).unwrap().to_dense(), vec![q(0, 1), q(10, 3), q(0, 1)]);
    }

    #[test]
    fn test_echelon_2x2() {
        let mut m = qmat(&[&[1, 2], &[3, 4]]);
        m.echelon().unwrap();
        assert_eq!(m.pivots(), Some(&[0usize, 1][..]));
        assert_eq!(m, SparseMatrix::identity(2, RationalField));
        assert_eq!(m.rank().unwrap(), 2);
    }

    #[test]
    fn test_echelon_rank_deficient() {
        let mut m = qmat(&[&[2, 4, 6], &[1, 2, 4], &[3, 6, 10]]);
        m.echelon().unwrap();
        assert_eq!(m.pivots(), Some(&[0usize, 2][..]));
        assert_eq!(m, qmat(&[&[1, 2, 0], &[0, 0, 1], &[0, 0, 0]]));
    }

    #[test]
    fn test_echelon_rational_entries() {
        let rows = vec![
            vec![q(0, 1), q(2, 3), q(1, 1)],
            vec![q(1, 2), q(1, 1), q(0, 1)],
        ];
        let mut m = SparseMatrix::from_rows(3, RationalField, &rows).unwrap();
        m.echelon().unwrap();
        assert_eq!(m.pivots(), Some(&[0usize, 1][..]));
        // x + 2y = 0, (2/3) y + z = 0  =>  y = -3/2 z, x = 3 z
        assert_eq!(m.row(0).unwrap().to_dense(), vec![q(1, 1), q(0, 1), q(-3, 1)]);
        assert_eq!(m.row(1).unwrap().to_dense(), vec![q(0, 1), q(1, 1), q(3, 2)]);
    }

    #[test]
    fn test_echelon_modular() {
        let mut m = ModularSparseMatrix::from_int_rows(7, &[vec![1, 2], vec![3, 6]]).unwrap();
        m.echelon().unwrap();
        assert_eq!(m.pivots(), Some(&[0usize][..]));
        assert_eq!(m.rank().unwrap(), 1);
        assert_eq!(m.get(0, 1).unwrap(), ModInt(2));
        assert!(m.row(1).unwrap().is_zero());

        let mut m = ModularSparseMatrix::from_int_rows(7, &[vec![1, 2], vec![3, 4]]).unwrap();
        m.echelon().unwrap();
        assert_eq!(m.pivots(), Some(&[0usize, 1][..]));
    }

    #[test]
    fn test_set_int_negative() {
        let mut m = ModularSparseMatrix::new(1, 2, PrimeField::new(11).unwrap());
        m.set_int(0, 1, -3).unwrap();
        assert_eq!(m.get(0, 1).unwrap(), ModInt(8));
    }

    #[test]
    fn test_echelon_idempotent() {
        let mut m = qmat(&[&[0, 3, 1, 0], &[2, 0, 0, 1], &[2, 3, 1, 1], &[0, 0, 5, 5]]);
        m.echelon().unwrap();
        let once = m.clone();
        let pivots = m.pivots().map(<[usize]>::to_vec);
        m.echelon().unwrap();
        assert_eq!(m, once);
        assert_eq!(m.pivots().map(<[usize]>::to_vec), pivots);
    }

    #[test]
    fn test_zero_matrix() {
        let mut m = RationalSparseMatrix::new(3, 4, RationalField);
        m.echelon().unwrap();
        assert_eq!(m.pivots(), Some(&[][..]));
        assert_eq!(m.rank().unwrap(), 0);
    }

    #[test]
    fn test_rank_before_echelon() {
        let mut m = qmat(&[&[1, 0], &[0, 1]]);
        assert!(matches!(m.rank(), Err(LinalgError::Arithmetic(_))));
        m.echelon().unwrap();
        assert_eq!(m.rank().unwrap(), 2);
        m.set(0, 1, q(1, 1)).unwrap();
        assert!(matches!(m.rank(), Err(LinalgError::Arithmetic(_))));
    }

    #[test]
    fn test_pivot_prefers_sparse_row() {
        // both rows lead in column 0; the one with fewer nonzeros is the pivot
        let mut m = qmat(&[&[1, 1, 1, 1], &[2, 0, 0, 0]]);
        m.echelon().unwrap();
        assert_eq!(m.pivots(), Some(&[0usize, 1][..]));
        assert_eq!(m, qmat(&[&[1, 0, 0, 0], &[0, 1, 1, 1]]));
    }

    #[test]
    fn test_linear_combination_of_rows() {
        let m = qmat(&[&[1, 0, 2], &[0, 1, -1], &[1, 1, 1]]);
        let v = m
            .linear_combination_of_rows(&[q(2, 1), q(-1, 1), q(0, 1)])
            .unwrap();
        assert_eq!(v.to_dense(), vec![q(2, 1), q(-1, 1), q(5, 1)]);
        assert!(matches!(
            m.linear_combination_of_rows(&[q(1, 1)]),
            Err(LinalgError::Arithmetic(_))
        ));
    }

    #[test]
    fn test_transpose() {
        let m = qmat(&[&[1, 0, 2], &[0, 3, 0]]);
        let t = m.transpose();
        assert_eq!(t, qmat(&[&[1, 0], &[0, 3], &[2, 0]]));
    }

    #[test]
    fn test_echelon_with_cancel_leaves_matrix_untouched() {
        let original = qmat(&[&[1, 2], &[3, 4]]);
        let mut m = original.clone();
        let token = CancelToken::new();
        token.cancel();
        assert!(matches!(m.echelon_with(&token), Err(LinalgError::Cancelled)));
        assert_eq!(m, original);
        assert!(m.pivots().is_none());

        let live = CancelToken::new();
        m.echelon_with(&live).unwrap();
        assert_eq!(m, SparseMatrix::identity(2, RationalField));
    }

    #[test]
    fn test_to_dense() {
        let m = qmat(&[&[1, 0], &[0, -2]]);
        let d = m.to_dense();
        assert_eq!(d.dims(), (2, 2));
        assert_eq!(d.get(1, 1), &q(-2, 1));
    }
}
