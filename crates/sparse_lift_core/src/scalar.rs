//! Scalar interface shared by the modular and rational matrix variants
//!
//! Field arithmetic takes an explicit field context, so a residue does not
//! have to carry its modulus around: the modulus lives once per vector.

use std::fmt;

/// Element of an exact field usable as a sparse-matrix entry
pub trait Scalar: Clone + PartialEq + fmt::Debug + fmt::Display {
    /// Field context (the prime modulus, or a marker for the rationals)
    type Field: Clone + PartialEq + fmt::Debug + fmt::Display;

    fn zero() -> Self;

    fn one() -> Self;

    fn is_zero(&self) -> bool;

    fn is_one(&self) -> bool {
        *self == Self::one()
    }

    /// Canonical representative of `self` in `field`
    ///
    /// Every value stored in a vector passes through here first, so an
    /// unreduced value that represents zero is never stored.
    fn normalize(&self, _field: &Self::Field) -> Self {
        self.clone()
    }

    fn plus(&self, rhs: &Self, field: &Self::Field) -> Self;

    fn times(&self, rhs: &Self, field: &Self::Field) -> Self;

    fn negated(&self, field: &Self::Field) -> Self;

    /// Multiplicative inverse, `None` for zero
    fn inverse(&self, field: &Self::Field) -> Option<Self>;
}
