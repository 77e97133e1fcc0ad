//! Residues modulo a word-sized prime
//!
//! Residues are stored as `u32` and multiplied in `u64`, so the modulus must
//! satisfy `p <= u32::MAX` (then `p^2` fits in 64 bits).

use std::fmt;

use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::{ToPrimitive, Zero};

use crate::error::{LinalgError, Result};
use crate::primes::is_prime;
use crate::rational::Rational;
use crate::scalar::Scalar;

/// A residue in `[0, p)`; the modulus is supplied by the surrounding `PrimeField`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct ModInt(pub u32);

impl ModInt {
    pub fn value(self) -> u32 {
        self.0
    }
}

impl fmt::Display for ModInt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The prime field `Z/pZ`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PrimeField {
    p: u32,
}

impl PrimeField {
    /// Validate `p` as a modulus: prime, and small enough that `p^2` fits in a `u64`
    pub fn new(p: u64) -> Result<Self> {
        if p > u32::MAX as u64 {
            return Err(LinalgError::Arithmetic(format!(
                "modulus {} too large; products must fit in 64 bits (max {})",
                p,
                u32::MAX
            )));
        }
        if !is_prime(p) {
            return Err(LinalgError::Arithmetic(format!("modulus {} is not prime", p)));
        }
        Ok(Self { p: p as u32 })
    }

    pub fn modulus(&self) -> u32 {
        self.p
    }

    /// Reduce a signed machine integer into `[0, p)`
    pub fn reduce_i64(&self, x: i64) -> ModInt {
        ModInt(x.rem_euclid(self.p as i64) as u32)
    }

    /// Reduce a signed big integer into `[0, p)`
    pub fn reduce_bigint(&self, x: &BigInt) -> ModInt {
        let r = x.mod_floor(&BigInt::from(self.p));
        // mod_floor with a positive modulus lands in [0, p)
        ModInt(r.to_u32().unwrap_or(0))
    }

    /// Reduce `n/d`, inverting the denominator mod p
    pub fn reduce_rational(&self, x: &Rational) -> Result<ModInt> {
        let num = self.reduce_bigint(x.numer());
        if x.is_integer() {
            return Ok(num);
        }
        let den = self.reduce_bigint(x.denom());
        let den_inv = den
            .inverse(self)
            .ok_or(LinalgError::NotInvertible { modulus: self.p })?;
        Ok(num.times(&den_inv, self))
    }

    /// Modular inverse using the extended Euclidean algorithm
    pub fn inv(&self, a: u32) -> Option<u32> {
        if a == 0 {
            return None;
        }

        let p = self.p as i64;
        let mut t: i64 = 0;
        let mut new_t: i64 = 1;
        let mut r = p;
        let mut new_r = (a as i64) % p;

        while new_r != 0 {
            let q = r / new_r;
            let tmp_t = t - q * new_t;
            t = new_t;
            new_t = tmp_t;
            let tmp_r = r - q * new_r;
            r = new_r;
            new_r = tmp_r;
        }

        if r > 1 {
            return None;
        }
        if t < 0 {
            t += p;
        }
        Some(t as u32)
    }
}

impl fmt::Display for PrimeField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "GF({})", self.p)
    }
}

impl Scalar for ModInt {
    type Field = PrimeField;

    fn zero() -> Self {
        ModInt(0)
    }

    fn one() -> Self {
        ModInt(1)
    }

    fn is_zero(&self) -> bool {
        self.0 == 0
    }

    fn normalize(&self, field: &PrimeField) -> Self {
        ModInt(self.0 % field.p)
    }

    fn plus(&self, rhs: &Self, field: &PrimeField) -> Self {
        let s = self.0 as u64 + rhs.0 as u64;
        ModInt((s % field.p as u64) as u32)
    }

    fn times(&self, rhs: &Self, field: &PrimeField) -> Self {
        let prod = self.0 as u64 * rhs.0 as u64;
        ModInt((prod % field.p as u64) as u32)
    }

    fn negated(&self, field: &PrimeField) -> Self {
        if self.0 == 0 {
            *self
        } else {
            ModInt(field.p - self.0)
        }
    }

    fn inverse(&self, field: &PrimeField) -> Option<Self> {
        field.inv(self.0).map(ModInt)
    }
}

/// Residue of a big integer as a `u64` value in `[0, m)`; used by CRT code
pub(crate) fn bigint_mod_u64(n: &BigInt, m: u64) -> u64 {
    if n.is_zero() {
        return 0;
    }
    n.mod_floor(&BigInt::from(m)).to_u64().unwrap_or(0)
}
