//! Exact rational number type
//!
//! A rational number using BigInt for numerator and denominator, always kept
//! in lowest terms with a positive denominator.

use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::{One, Signed, Zero};
use std::fmt;
use std::ops::{Add, Div, Mul, Neg, Sub};

use crate::error::{LinalgError, Result};
use crate::scalar::Scalar;

/// Exact rational number (numerator / denominator)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Rational {
    numerator: BigInt,
    denominator: BigInt,
}

/// Marker field context for `Rational` entries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct RationalField;

impl fmt::Display for RationalField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "QQ")
    }
}

impl Rational {
    /// Create a new rational number from numerator and a nonzero denominator
    pub fn new(num: BigInt, den: BigInt) -> Self {
        debug_assert!(!den.is_zero(), "zero denominator");
        let mut r = Self {
            numerator: num,
            denominator: den,
        };
        r.reduce();
        r
    }

    /// Like `new`, but rejects a zero denominator
    pub fn try_new(num: BigInt, den: BigInt) -> Result<Self> {
        if den.is_zero() {
            return Err(LinalgError::Value(format!("{}/0 has a zero denominator", num)));
        }
        Ok(Self::new(num, den))
    }

    /// Create a rational from an integer
    pub fn from_int<T: Into<BigInt>>(n: T) -> Self {
        Self {
            numerator: n.into(),
            denominator: BigInt::one(),
        }
    }

    /// Shorthand for `n/d` with machine integers
    pub fn from_ratio(n: i64, d: i64) -> Self {
        Self::new(BigInt::from(n), BigInt::from(d))
    }

    pub fn numer(&self) -> &BigInt {
        &self.numerator
    }

    pub fn denom(&self) -> &BigInt {
        &self.denominator
    }

    pub fn is_integer(&self) -> bool {
        self.denominator.is_one()
    }

    /// Multiply by an integer
    pub fn scale_int(&self, k: &BigInt) -> Self {
        Self::new(&self.numerator * k, self.denominator.clone())
    }

    /// Divide by a nonzero integer
    pub fn div_int(&self, k: &BigInt) -> Self {
        Self::new(self.numerator.clone(), &self.denominator * k)
    }

    /// Multiplicative inverse, `None` for zero
    pub fn recip(&self) -> Option<Self> {
        if self.numerator.is_zero() {
            return None;
        }
        Some(Self::new(self.denominator.clone(), self.numerator.clone()))
    }

    /// Format as `n` or `n/d` in the given radix
    pub fn to_str_radix(&self, radix: u32) -> String {
        if self.is_integer() {
            self.numerator.to_str_radix(radix)
        } else {
            format!(
                "{}/{}",
                self.numerator.to_str_radix(radix),
                self.denominator.to_str_radix(radix)
            )
        }
    }

    /// Parse `n` or `n/d` in the given radix
    pub fn from_str_radix(s: &str, radix: u32) -> Result<Self> {
        let parse = |part: &str| {
            BigInt::parse_bytes(part.as_bytes(), radix).ok_or_else(|| {
                LinalgError::Value(format!("'{}' is not a base-{} integer", part, radix))
            })
        };
        match s.split_once('/') {
            None => Ok(Self::from_int(parse(s)?)),
            Some((n, d)) => Self::try_new(parse(n)?, parse(d)?),
        }
    }

    /// Reduce to lowest terms
    fn reduce(&mut self) {
        if self.numerator.is_zero() {
            self.denominator = BigInt::one();
            return;
        }

        let g = self.numerator.gcd(&self.denominator);
        if !g.is_one() {
            self.numerator = &self.numerator / &g;
            self.denominator = &self.denominator / &g;
        }

        // Ensure denominator is positive
        if self.denominator.is_negative() {
            self.numerator = -&self.numerator;
            self.denominator = -&self.denominator;
        }
    }
}

impl Default for Rational {
    fn default() -> Self {
        Self::from_int(0)
    }
}

impl fmt::Display for Rational {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.denominator.is_one() {
            write!(f, "{}", self.numerator)
        } else {
            write!(f, "{}/{}", self.numerator, self.denominator)
        }
    }
}

impl From<i64> for Rational {
    fn from(n: i64) -> Self {
        Self::from_int(n)
    }
}

impl From<BigInt> for Rational {
    fn from(n: BigInt) -> Self {
        Self::from_int(n)
    }
}

impl Add for &Rational {
    type Output = Rational;

    fn add(self, other: Self) -> Rational {
        if self.denominator == other.denominator {
            return Rational::new(
                &self.numerator + &other.numerator,
                self.denominator.clone(),
            );
        }
        let num = &self.numerator * &other.denominator + &other.numerator * &self.denominator;
        let den = &self.denominator * &other.denominator;
        Rational::new(num, den)
    }
}

impl Add for Rational {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        &self + &other
    }
}

impl Sub for &Rational {
    type Output = Rational;

    fn sub(self, other: Self) -> Rational {
        let num = &self.numerator * &other.denominator - &other.numerator * &self.denominator;
        let den = &self.denominator * &other.denominator;
        Rational::new(num, den)
    }
}

impl Sub for Rational {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        &self - &other
    }
}

impl Mul for &Rational {
    type Output = Rational;

    fn mul(self, other: Self) -> Rational {
        let num = &self.numerator * &other.numerator;
        let den = &self.denominator * &other.denominator;
        Rational::new(num, den)
    }
}

impl Mul for Rational {
    type Output = Self;

    fn mul(self, other: Self) -> Self {
        &self * &other
    }
}

impl Div for Rational {
    type Output = Self;

    fn div(self, other: Self) -> Self {
        let num = &self.numerator * &other.denominator;
        let den = &self.denominator * &other.numerator;
        Self::new(num, den)
    }
}

impl Neg for Rational {
    type Output = Self;

    fn neg(self) -> Self {
        Self {
            numerator: -self.numerator,
            denominator: self.denominator,
        }
    }
}

impl Neg for &Rational {
    type Output = Rational;

    fn neg(self) -> Rational {
        Rational {
            numerator: -&self.numerator,
            denominator: self.denominator.clone(),
        }
    }
}

impl Scalar for Rational {
    type Field = RationalField;

    fn zero() -> Self {
        Self::from_int(0)
    }

    fn one() -> Self {
        Self::from_int(1)
    }

    fn is_zero(&self) -> bool {
        self.numerator.is_zero()
    }

    fn is_one(&self) -> bool {
        self.numerator.is_one() && self.denominator.is_one()
    }

    fn plus(&self, rhs: &Self, _: &RationalField) -> Self {
        self + rhs
    }

    fn times(&self, rhs: &Self, _: &RationalField) -> Self {
        self * rhs
    }

    fn negated(&self, _: &RationalField) -> Self {
        -self
    }

    fn inverse(&self, _: &RationalField) -> Option<Self> {
        self.recip()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rational_arithmetic() {
        let a = Rational::new(BigInt::from(1), BigInt::from(2));
        let b = Rational::new(BigInt::from(1), BigInt::from(3));

        let sum = a.clone() + b.clone();
        assert_eq!(sum, Rational::new(BigInt::from(5), BigInt::from(6)));

        let prod = a.clone() * b.clone();
        assert_eq!(prod, Rational::new(BigInt::from(1), BigInt::from(6)));

        assert_eq!(a.clone() - a.clone(), Rational::zero());
        assert_eq!(a.clone() / b, Rational::from_ratio(3, 2));
    }

    #[test]
    fn test_rational_reduction() {
        let r = Rational::new(BigInt::from(4), BigInt::from(8));
        assert_eq!(r, Rational::new(BigInt::from(1), BigInt::from(2)));

        let r = Rational::from_ratio(3, -6);
        assert_eq!(r.numer(), &BigInt::from(-1));
        assert_eq!(r.denom(), &BigInt::from(2));
    }

    #[test]
    fn test_radix_32() {
        let r = Rational::from_ratio(-100, 3);
        assert_eq!(r.to_str_radix(32), "-34/3");
        assert_eq!(Rational::from_str_radix("-34/3", 32).unwrap(), r);
        assert_eq!(Rational::from_int(1023).to_str_radix(32), "vv");
        assert_eq!(Rational::from_str_radix("vv", 32).unwrap(), Rational::from_int(1023));
        assert!(Rational::from_str_radix("1/0", 32).is_err());
        assert!(Rational::from_str_radix("1/w", 32).is_err());
    }

    #[test]
    fn test_recip() {
        assert_eq!(Rational::from_ratio(-2, 7).recip(), Some(Rational::from_ratio(-7, 2)));
        assert_eq!(Rational::zero().recip(), None);
    }
}
