//! Rational reconstruction
//!
//! Recovers `n/d` from `a ≡ n·d⁻¹ (mod m)` when `|n|, d ≤ sqrt(m/2)`, by
//! running the extended Euclidean algorithm on `(m, a)` and stopping at the
//! first remainder below the bound. Within that bound the answer is unique.

use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::{One, Signed, Zero};

use crate::error::{LinalgError, Result};
use crate::rational::Rational;

/// Reconstruction bound `floor(sqrt(m/2))`
pub fn bound(m: &BigInt) -> BigInt {
    (m / 2u32).sqrt()
}

/// Reconstruct `n/d` from `a` modulo `m`
///
/// Fails with `LinalgError::Arithmetic` when no fraction within the bound
/// matches.
pub fn rational_reconstruct(a: &BigInt, m: &BigInt) -> Result<Rational> {
    if !m.is_positive() {
        return Err(LinalgError::Value(format!("modulus {} must be positive", m)));
    }
    try_rational_reconstruct(a, m).ok_or_else(|| {
        LinalgError::Arithmetic(format!(
            "rational reconstruction failed modulo a {}-bit integer",
            m.bits()
        ))
    })
}

/// `None` when no fraction within the bound matches; the lifter treats
/// that as "more primes needed"
pub fn try_rational_reconstruct(a: &BigInt, m: &BigInt) -> Option<Rational> {
    if !m.is_positive() {
        return None;
    }
    let a = a.mod_floor(m);
    if a.is_zero() {
        return Some(Rational::default());
    }

    let n_bound = bound(m);
    let (mut r0, mut r1) = (m.clone(), a);
    let (mut t0, mut t1) = (BigInt::zero(), BigInt::one());

    while r1 > n_bound {
        let q = &r0 / &r1;
        let r2 = &r0 - &q * &r1;
        let t2 = &t0 - &q * &t1;
        r0 = std::mem::replace(&mut r1, r2);
        t0 = std::mem::replace(&mut t1, t2);
    }

    if t1.is_zero() || t1.abs() > n_bound || !r1.gcd(&t1).is_one() {
        return None;
    }
    Some(Rational::new(r1, t1))
}
