//! Operations specific to sparse matrices over the rationals
//!
//! Height, denominators, reduction modulo a prime and the multi-modular
//! entry points. The generic elimination in `sparse` also works here; it is
//! exact but slow, since entries grow without bound during elimination.

use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::{One, Signed, Zero};

use crate::cancel::{Checkpoint, Uninterruptible};
use crate::error::{LinalgError, Result};
use crate::lift::{LiftConfig, LiftStats, MultiModularLifter};
use crate::modular::PrimeField;
use crate::observe::{LiftObserver, LogObserver};
use crate::rational::{Rational, RationalField};
use crate::sparse::{ModularSparseMatrix, RationalSparseMatrix, SparseMatrix};

impl SparseMatrix<Rational> {
    /// Build from rows of machine integers
    pub fn from_i64_rows(ncols: usize, rows: &[Vec<i64>]) -> Result<Self> {
        let rows: Vec<Vec<Rational>> = rows
            .iter()
            .map(|row| row.iter().map(|&x| Rational::from(x)).collect())
            .collect();
        Self::from_rows(ncols, RationalField, &rows)
    }

    /// Largest numerator or denominator magnitude over `scale·self`; at least 1
    pub fn height(&self, scale: &BigInt) -> BigInt {
        let mut h = BigInt::one();
        for (_, _, x) in self.entries() {
            let y = if scale.is_one() {
                x.clone()
            } else {
                x.scale_int(scale)
            };
            let n = y.numer().abs();
            if n > h {
                h = n;
            }
            if y.denom() > &h {
                h = y.denom().clone();
            }
        }
        h
    }

    /// Least common multiple of all entry denominators
    pub fn denom(&self) -> BigInt {
        self.entries()
            .fold(BigInt::one(), |d, (_, _, x)| d.lcm(x.denom()))
    }

    /// Multiply every entry by `denom()`, making the matrix integral
    ///
    /// Returns the multiplier so the caller can divide back.
    pub fn clear_denominators(&mut self) -> Result<BigInt> {
        let d = self.denom();
        if !d.is_one() {
            for row in self.rows_mut() {
                *row = row.map_values(RationalField, |x| Ok(x.scale_int(&d)))?;
            }
        }
        Ok(d)
    }

    /// Divide every entry by a nonzero integer
    pub fn divide_by(&mut self, d: &BigInt) -> Result<()> {
        if d.is_zero() {
            return Err(LinalgError::Value("cannot divide a matrix by zero".to_string()));
        }
        if !d.is_one() {
            for row in self.rows_mut() {
                *row = row.map_values(RationalField, |x| Ok(x.div_int(d)))?;
            }
        }
        Ok(())
    }

    /// Reduce modulo the prime `p`
    ///
    /// With `with_denominators`, denominators are inverted mod `p`, failing
    /// with `LinalgError::NotInvertible` when `p` divides one. Without it only
    /// numerators are reduced, which is correct for integral matrices.
    pub fn reduce_mod(&self, p: u64, with_denominators: bool) -> Result<ModularSparseMatrix> {
        let field = PrimeField::new(p)?;
        let rows = self
            .rows()
            .iter()
            .map(|row| {
                row.map_values(field, |x| {
                    if with_denominators {
                        field.reduce_rational(x)
                    } else {
                        Ok(field.reduce_bigint(x.numer()))
                    }
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(SparseMatrix::from_parts(self.nrows(), self.ncols(), field, rows))
    }

    /// Reduced row-echelon form by multi-modular lifting
    ///
    /// `height_guess` defaults to `100000·H⁴` for the matrix height `H`.
    /// With `proof` the result is checked against a height bound; without it
    /// the result is very likely but not certainly correct. Progress goes to
    /// the `log` facade. The pivots are also recorded on `self`.
    pub fn echelon_multimodular(
        &mut self,
        height_guess: Option<BigInt>,
        proof: bool,
    ) -> Result<RationalSparseMatrix> {
        let config = LiftConfig {
            height_guess,
            proof,
            ..LiftConfig::default()
        };
        let (e, _) = self.echelon_multimodular_with(&config, &mut LogObserver, &Uninterruptible)?;
        Ok(e)
    }

    /// `echelon_multimodular` with explicit configuration, observer and
    /// cancellation checkpoint
    pub fn echelon_multimodular_with<O, C>(
        &mut self,
        config: &LiftConfig,
        observer: &mut O,
        cancel: &C,
    ) -> Result<(RationalSparseMatrix, LiftStats)>
    where
        O: LiftObserver + ?Sized,
        C: Checkpoint + ?Sized,
    {
        MultiModularLifter::with_config(config.clone()).echelon(self, observer, cancel)
    }
}
