//! Chinese Remainder Theorem reconstruction
//!
//! Uses the idempotent basis: for primes `p_0..p_k` with product `M`, the
//! coefficient `b_i` is `≡ 1 (mod p_i)` and `≡ 0 (mod p_j)` for `j ≠ i`, so
//! the lift of residues `r_i` is `Σ b_i·r_i mod M`.

use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::{One, Zero};

use crate::error::{LinalgError, Result};
use crate::modular::bigint_mod_u64;
use crate::primes::{is_prime, mod_pow_u128};

/// CRT basis over a set of distinct primes
#[derive(Debug, Clone)]
pub struct CrtBasis {
    primes: Vec<u64>,
    coefficients: Vec<BigInt>,
    product: BigInt,
}

impl CrtBasis {
    /// Precompute the idempotent coefficients for `primes`
    pub fn new(primes: &[u64]) -> Result<Self> {
        for (i, &p) in primes.iter().enumerate() {
            if !is_prime(p) {
                return Err(LinalgError::Arithmetic(format!("CRT modulus {} is not prime", p)));
            }
            if primes[..i].contains(&p) {
                return Err(LinalgError::Arithmetic(format!("CRT modulus {} repeated", p)));
            }
        }

        let product = primes.iter().fold(BigInt::one(), |acc, &p| acc * p);

        let coefficients = primes
            .iter()
            .map(|&p| {
                let cofactor = &product / p;
                // p is prime, so Fermat gives the inverse
                let inv = mod_pow_u128(bigint_mod_u64(&cofactor, p), p - 2, p);
                cofactor * inv
            })
            .collect();

        Ok(Self {
            primes: primes.to_vec(),
            coefficients,
            product,
        })
    }

    pub fn primes(&self) -> &[u64] {
        &self.primes
    }

    /// Product of all primes
    pub fn product(&self) -> &BigInt {
        &self.product
    }

    pub fn len(&self) -> usize {
        self.primes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.primes.is_empty()
    }

    /// The unique integer in `[0, M)` with the given residues
    pub fn lift(&self, residues: &[u64]) -> Result<BigInt> {
        if residues.len() != self.primes.len() {
            return Err(LinalgError::Arithmetic(format!(
                "{} residues for {} primes",
                residues.len(),
                self.primes.len()
            )));
        }
        Ok(self.lift_unchecked(residues.iter().copied()))
    }

    /// Like `lift`, but in the symmetric range `(-M/2, M/2]`
    pub fn lift_signed(&self, residues: &[u64]) -> Result<BigInt> {
        let x = self.lift(residues)?;
        if &x + &x > self.product {
            Ok(x - &self.product)
        } else {
            Ok(x)
        }
    }

    /// Batch lift from a flat array laid out as
    /// `residues[prime_idx * num_values + value_idx]`
    pub fn lift_flat(&self, residues: &[u64], num_values: usize) -> Result<Vec<BigInt>> {
        if residues.len() != self.primes.len() * num_values {
            return Err(LinalgError::Arithmetic(format!(
                "{} residues do not fill {} primes x {} values",
                residues.len(),
                self.primes.len(),
                num_values
            )));
        }
        Ok((0..num_values)
            .map(|v| {
                self.lift_unchecked(
                    (0..self.primes.len()).map(|i| residues[i * num_values + v]),
                )
            })
            .collect())
    }

    fn lift_unchecked<I: Iterator<Item = u64>>(&self, residues: I) -> BigInt {
        let mut acc = BigInt::zero();
        for (b, r) in self.coefficients.iter().zip(residues) {
            if r != 0 {
                acc += b * r;
            }
        }
        acc.mod_floor(&self.product)
    }
}
