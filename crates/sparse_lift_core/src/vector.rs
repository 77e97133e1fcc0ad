//! Sparse vectors with merge-based arithmetic
//!
//! Entries are kept as `(position, value)` pairs sorted by position with no
//! stored zeros. Point access is a binary search; `axpy` is a single linear
//! merge of the two entry lists, which is what elimination spends its time on.

use std::cmp::Ordering;

use crate::error::{LinalgError, Result};
use crate::scalar::Scalar;

/// Fixed-degree sparse vector over a field
#[derive(Debug, Clone, PartialEq)]
pub struct SparseVector<T: Scalar> {
    degree: usize,
    field: T::Field,
    entries: Vec<(usize, T)>,
}

impl<T: Scalar> SparseVector<T> {
    /// Zero vector of the given degree
    pub fn new(degree: usize, field: T::Field) -> Self {
        Self {
            degree,
            field,
            entries: Vec::new(),
        }
    }

    /// Zero vector with room for `nnz` entries
    pub fn with_capacity(degree: usize, field: T::Field, nnz: usize) -> Result<Self> {
        let mut entries = Vec::new();
        entries.try_reserve_exact(nnz)?;
        Ok(Self {
            degree,
            field,
            entries,
        })
    }

    /// Build from `(position, value)` pairs in any order
    ///
    /// Zero values are dropped; a repeated position is an error.
    pub fn from_pairs<I>(degree: usize, field: T::Field, pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (usize, T)>,
    {
        let mut entries: Vec<(usize, T)> = Vec::new();
        for (i, x) in pairs {
            LinalgError::check_index(i, degree)?;
            let x = x.normalize(&field);
            if !x.is_zero() {
                entries.push((i, x));
            }
        }
        entries.sort_by_key(|(i, _)| *i);
        if entries.windows(2).any(|w| w[0].0 == w[1].0) {
            return Err(LinalgError::Value(
                "duplicate position in sparse vector entries".to_string(),
            ));
        }
        Ok(Self {
            degree,
            field,
            entries,
        })
    }

    /// Build from a dense slice, skipping zeros
    pub fn from_dense(field: T::Field, values: &[T]) -> Self {
        let entries = values
            .iter()
            .enumerate()
            .map(|(i, x)| (i, x.normalize(&field)))
            .filter(|(_, x)| !x.is_zero())
            .collect();
        Self {
            degree: values.len(),
            field,
            entries,
        }
    }

    pub fn degree(&self) -> usize {
        self.degree
    }

    pub fn field(&self) -> &T::Field {
        &self.field
    }

    pub fn num_nonzero(&self) -> usize {
        self.entries.len()
    }

    pub fn is_zero(&self) -> bool {
        self.entries.is_empty()
    }

    /// Value at position `i` (zero when absent)
    pub fn get(&self, i: usize) -> Result<T> {
        LinalgError::check_index(i, self.degree)?;
        Ok(match self.search(i) {
            Ok(k) => self.entries[k].1.clone(),
            Err(_) => T::zero(),
        })
    }

    /// Set position `i` to `x`; setting zero removes the entry
    pub fn set(&mut self, i: usize, x: T) -> Result<()> {
        LinalgError::check_index(i, self.degree)?;
        let x = x.normalize(&self.field);
        match (self.search(i), x.is_zero()) {
            (Ok(k), true) => {
                self.entries.remove(k);
            }
            (Ok(k), false) => self.entries[k].1 = x,
            (Err(_), true) => {}
            (Err(k), false) => {
                self.entries.try_reserve(1)?;
                self.entries.insert(k, (i, x));
            }
        }
        self.debug_check();
        Ok(())
    }

    /// Position of the first nonzero entry
    pub fn first_position(&self) -> Option<usize> {
        self.entries.first().map(|(i, _)| *i)
    }

    /// Value of the first nonzero entry
    pub fn leading_value(&self) -> Option<&T> {
        self.entries.first().map(|(_, x)| x)
    }

    /// Positions of the nonzero entries, ascending
    pub fn positions(&self) -> impl Iterator<Item = usize> + '_ {
        self.entries.iter().map(|(i, _)| *i)
    }

    /// Nonzero entries as `(position, value)`, ascending
    pub fn iter(&self) -> impl Iterator<Item = (usize, &T)> + '_ {
        self.entries.iter().map(|(i, x)| (*i, x))
    }

    /// Multiply every entry by `k`; scaling by zero clears the vector
    pub fn scale(&mut self, k: &T) {
        let k = &k.normalize(&self.field);
        if k.is_zero() {
            self.entries.clear();
            return;
        }
        if k.is_one() {
            return;
        }
        let field = &self.field;
        for (_, x) in self.entries.iter_mut() {
            *x = x.times(k, field);
        }
        // a field has no zero divisors, so no entry can have vanished
        self.debug_check();
    }

    /// `self * k` as a new vector
    pub fn scaled(&self, k: &T) -> Self {
        let mut v = self.clone();
        v.scale(k);
        v
    }

    /// `self + k*w` by a single sorted merge
    pub fn axpy(&self, w: &Self, k: &T) -> Result<Self> {
        self.check_compatible(w)?;
        let k = &k.normalize(&self.field);
        if k.is_zero() || w.is_zero() {
            return Ok(self.clone());
        }

        let field = &self.field;
        let mut entries = Vec::new();
        entries.try_reserve(self.entries.len() + w.entries.len())?;

        let (xs, ys) = (&self.entries, &w.entries);
        let (mut a, mut b) = (0, 0);
        while a < xs.len() && b < ys.len() {
            let (i, ref x) = xs[a];
            let (j, ref y) = ys[b];
            match i.cmp(&j) {
                Ordering::Less => {
                    entries.push((i, x.clone()));
                    a += 1;
                }
                Ordering::Greater => {
                    entries.push((j, y.times(k, field)));
                    b += 1;
                }
                Ordering::Equal => {
                    let z = x.plus(&y.times(k, field), field);
                    if !z.is_zero() {
                        entries.push((i, z));
                    }
                    a += 1;
                    b += 1;
                }
            }
        }
        entries.extend(xs[a..].iter().cloned());
        entries.extend(ys[b..].iter().map(|(j, y)| (*j, y.times(k, field))));

        let v = Self {
            degree: self.degree,
            field: self.field.clone(),
            entries,
        };
        v.debug_check();
        Ok(v)
    }

    /// `self += k*w`; the merge result's storage replaces ours
    pub fn axpy_assign(&mut self, w: &Self, k: &T) -> Result<()> {
        let sum = self.axpy(w, k)?;
        self.entries = sum.entries;
        Ok(())
    }

    /// Dense copy of the entries
    pub fn to_dense(&self) -> Vec<T> {
        let mut dense = vec![T::zero(); self.degree];
        for (i, x) in &self.entries {
            dense[*i] = x.clone();
        }
        dense
    }

    pub(crate) fn entries(&self) -> &[(usize, T)] {
        &self.entries
    }

    /// Replace every value through `f`, keeping positions; zeros are dropped
    pub(crate) fn map_values<U, F>(&self, field: U::Field, mut f: F) -> Result<SparseVector<U>>
    where
        U: Scalar,
        F: FnMut(&T) -> Result<U>,
    {
        let mut entries = Vec::new();
        entries.try_reserve_exact(self.entries.len())?;
        for (i, x) in &self.entries {
            let y = f(x)?;
            if !y.is_zero() {
                entries.push((*i, y));
            }
        }
        Ok(SparseVector {
            degree: self.degree,
            field,
            entries,
        })
    }

    fn search(&self, i: usize) -> std::result::Result<usize, usize> {
        self.entries.binary_search_by_key(&i, |(j, _)| *j)
    }

    fn check_compatible(&self, w: &Self) -> Result<()> {
        if self.degree != w.degree {
            return Err(LinalgError::Arithmetic(format!(
                "degree mismatch: {} vs {}",
                self.degree, w.degree
            )));
        }
        if self.field != w.field {
            return Err(LinalgError::Arithmetic(format!(
                "field mismatch: {} vs {}",
                self.field, w.field
            )));
        }
        Ok(())
    }

    #[inline]
    fn debug_check(&self) {
        debug_assert!(self.entries.windows(2).all(|w| w[0].0 < w[1].0));
        debug_assert!(self.entries.iter().all(|(i, x)| *i < self.degree && !x.is_zero()));
    }
}
