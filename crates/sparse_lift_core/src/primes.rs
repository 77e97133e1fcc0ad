//! Prime generation for multi-modular computation
//!
//! Deterministic Miller-Rabin for 64-bit integers plus a `next_prime` oracle
//! and an increasing prime sequence used by the lifter.

/// Default first prime of a lifting run
pub const START_PRIME: u64 = 20011;

/// Deterministic Miller-Rabin primality test for 64-bit integers
pub fn is_prime(n: u64) -> bool {
    if n < 2 {
        return false;
    }
    for small in [2u64, 3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37] {
        if n == small {
            return true;
        }
        if n % small == 0 {
            return false;
        }
    }

    // Write n-1 as 2^r * d
    let mut d = n - 1;
    let mut r = 0u32;
    while d % 2 == 0 {
        d /= 2;
        r += 1;
    }

    // Deterministic witnesses for 64-bit numbers
    let witnesses: [u64; 7] = [2, 325, 9375, 28178, 450775, 9780504, 1795265022];

    for &a in &witnesses {
        if a % n == 0 {
            continue;
        }
        if !miller_rabin_witness(a, d, r, n) {
            return false;
        }
    }
    true
}

fn miller_rabin_witness(a: u64, d: u64, r: u32, n: u64) -> bool {
    let mut x = mod_pow_u128(a, d, n);

    if x == 1 || x == n - 1 {
        return true;
    }

    for _ in 0..r - 1 {
        x = mod_mul_u128(x, x, n);
        if x == n - 1 {
            return true;
        }
    }
    false
}

/// Modular exponentiation using 128-bit intermediate
pub fn mod_pow_u128(mut base: u64, mut exp: u64, modulus: u64) -> u64 {
    let mut result = 1u64 % modulus;
    base %= modulus;

    while exp > 0 {
        if exp % 2 == 1 {
            result = mod_mul_u128(result, base, modulus);
        }
        exp /= 2;
        base = mod_mul_u128(base, base, modulus);
    }
    result
}

/// Modular multiplication using 128-bit intermediate
pub fn mod_mul_u128(a: u64, b: u64, modulus: u64) -> u64 {
    ((a as u128 * b as u128) % modulus as u128) as u64
}

/// Smallest prime strictly greater than `p`, or `None` past the largest
/// prime that fits in a `u64`
pub fn next_prime(p: u64) -> Option<u64> {
    if p < 2 {
        return Some(2);
    }
    let mut candidate = p.checked_add(if p % 2 == 0 { 1 } else { 2 })?;
    while !is_prime(candidate) {
        candidate = candidate.checked_add(2)?;
    }
    Some(candidate)
}

/// Increasing sequence of primes starting at a given prime
///
/// If `start` is not prime, the sequence begins at the next prime above it.
/// The sequence ends instead of overflowing near `u64::MAX`.
#[derive(Debug, Clone)]
pub struct PrimeSequence {
    next: Option<u64>,
}

impl PrimeSequence {
    pub fn new(start: u64) -> Self {
        let next = if is_prime(start) {
            Some(start)
        } else {
            next_prime(start)
        };
        Self { next }
    }
}

impl Default for PrimeSequence {
    fn default() -> Self {
        Self::new(START_PRIME)
    }
}

impl Iterator for PrimeSequence {
    type Item = u64;

    fn next(&mut self) -> Option<u64> {
        let p = self.next?;
        self.next = next_prime(p);
        Some(p)
    }
}
