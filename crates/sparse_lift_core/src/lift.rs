//! Multi-modular echelon form over the rationals
//!
//! Instead of eliminating over the rationals, where entries grow during
//! elimination, the denominator-cleared matrix is echelonized modulo many
//! word-sized primes and the results are lifted back.
//!
//! # Strategy
//!
//! 1. Clear denominators of a private copy; let `H` be the height of the input.
//! 2. Reduce modulo primes `20011, 20021, ...` and echelonize each reduction.
//!    A prime whose pivot pattern is worse than the best seen so far is
//!    unlucky and excluded.
//! 3. Once the product of accepted primes exceeds the target bound, keep
//!    the matrices with the best pattern, combine them with the CRT and
//!    rationally reconstruct each row.
//! 4. In proof mode, accept the result only if `h(d·E)·ncols·H < prod`,
//!    where `d` is the denominator of the result `E`.
//!
//! Reconstruction or verification failure enlarges the target and continues
//! the prime loop; nothing computed so far is thrown away.

use std::cmp::Ordering;
use std::time::Instant;

use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::One;

use crate::cancel::Checkpoint;
use crate::crt::CrtBasis;
use crate::error::{LinalgError, Result};
use crate::observe::{LiftEvent, LiftObserver};
use crate::primes::{PrimeSequence, START_PRIME};
use crate::rational::{Rational, RationalField};
use crate::reconstruct::try_rational_reconstruct;
use crate::sparse::{ModularSparseMatrix, RationalSparseMatrix, SparseMatrix};
use crate::vector::SparseVector;

/// Configuration for the multi-modular lifter
#[derive(Debug, Clone)]
pub struct LiftConfig {
    /// Expected height of the echelon form; `None` means `100000·H⁴`
    pub height_guess: Option<BigInt>,
    /// Verify the lifted result against a height bound
    pub proof: bool,
    /// First prime tried
    pub start_prime: u64,
    /// Consecutive unlucky primes before a `NotConverging` event
    pub warn_after_bad_primes: usize,
    /// Consecutive unlucky primes before giving up; `None` never gives up
    pub max_bad_primes: Option<usize>,
    /// Reconstruction/verification failures before giving up; `None` never gives up
    pub max_retries: Option<usize>,
}

impl Default for LiftConfig {
    fn default() -> Self {
        Self {
            height_guess: None,
            proof: true,
            start_prime: START_PRIME,
            warn_after_bad_primes: 50,
            max_bad_primes: Some(10_000),
            max_retries: None,
        }
    }
}

impl LiftConfig {
    pub fn with_height_guess(mut self, height_guess: BigInt) -> Self {
        self.height_guess = Some(height_guess);
        self
    }

    pub fn with_proof(mut self, proof: bool) -> Self {
        self.proof = proof;
        self
    }

    pub fn with_start_prime(mut self, start_prime: u64) -> Self {
        self.start_prime = start_prime;
        self
    }

    pub fn with_warn_after_bad_primes(mut self, n: usize) -> Self {
        self.warn_after_bad_primes = n;
        self
    }

    pub fn with_max_bad_primes(mut self, n: Option<usize>) -> Self {
        self.max_bad_primes = n;
        self
    }

    pub fn with_max_retries(mut self, n: Option<usize>) -> Self {
        self.max_retries = n;
        self
    }
}

/// Statistics from one lifting run
#[derive(Debug, Clone, Default)]
pub struct LiftStats {
    pub primes_tried: usize,
    pub primes_accepted: usize,
    pub primes_rejected: usize,
    pub primes_skipped: usize,
    /// Reconstruction and verification failures
    pub retries: usize,
    /// Primes the result was lifted from
    pub num_primes: usize,
    /// Bit length of the final modulus
    pub prod_bits: u64,
    /// Whether the height check ran and passed
    pub verified: bool,
    pub phase_times: LiftPhaseTimes,
}

/// Seconds spent per phase
#[derive(Debug, Clone, Default)]
pub struct LiftPhaseTimes {
    pub reduce_total: f64,
    pub echelon_total: f64,
    pub crt_total: f64,
    pub verify_total: f64,
    pub total: f64,
}

/// Compare pivot patterns; `Greater` means `x` is the better pattern
///
/// More pivots are better; at equal rank the lexicographically smaller
/// pattern (pivots further left) is better.
pub fn cmp_pivots(x: &[usize], y: &[usize]) -> Ordering {
    match x.len().cmp(&y.len()) {
        Ordering::Equal => y.cmp(x),
        ord => ord,
    }
}

/// Multi-modular echelon solver
#[derive(Debug, Clone, Default)]
pub struct MultiModularLifter {
    config: LiftConfig,
}

impl MultiModularLifter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: LiftConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &LiftConfig {
        &self.config
    }

    /// Echelon form of `a`; the pivots are also recorded on `a`
    pub fn echelon<O, C>(
        &self,
        a: &mut RationalSparseMatrix,
        observer: &mut O,
        cancel: &C,
    ) -> Result<(RationalSparseMatrix, LiftStats)>
    where
        O: LiftObserver + ?Sized,
        C: Checkpoint + ?Sized,
    {
        let start = Instant::now();
        let mut stats = LiftStats::default();
        let (nrows, ncols) = (a.nrows(), a.ncols());

        if nrows == 0 || ncols == 0 {
            let mut e = a.clone();
            e.set_pivots(Vec::new());
            a.set_pivots(Vec::new());
            stats.verified = true;
            observer.on_event(&LiftEvent::Finished {
                primes: 0,
                rank: 0,
                verified: true,
            });
            return Ok((e, stats));
        }

        if self.config.start_prime > u64::from(u32::MAX) {
            return Err(LinalgError::Value(format!(
                "start prime {} does not fit in 32 bits",
                self.config.start_prime
            )));
        }

        // Bounds refer to the integral matrix that is actually reduced and lifted.
        let mut cleared = a.clone();
        cleared.clear_denominators()?;
        let height = cleared.height(&BigInt::one());

        let height_guess = match &self.config.height_guess {
            Some(h) => h.clone(),
            None => BigInt::from(100_000u32) * height.pow(4),
        };
        let mut target = if self.config.proof {
            &height_guess * ncols * &height + 1u32
        } else {
            &height_guess + 1u32
        };
        let start_cubed = BigInt::from(self.config.start_prime).pow(3);

        observer.on_event(&LiftEvent::Started {
            nrows,
            ncols,
            height_bits: height.bits(),
            target_bits: target.bits(),
        });

        let mut primes = PrimeSequence::new(self.config.start_prime);
        let mut accepted: Vec<(u64, ModularSparseMatrix)> = Vec::new();
        let mut best_pivots: Vec<usize> = Vec::new();
        let mut prod = BigInt::one();
        let mut bad_streak = 0usize;

        loop {
            while prod < target {
                cancel.checkpoint()?;
                let p = primes.next().unwrap_or(u64::MAX);
                if p > u64::from(u32::MAX) {
                    return Err(LinalgError::Value(
                        "ran out of word-sized primes before the lift converged".to_string(),
                    ));
                }
                stats.primes_tried += 1;

                let t = Instant::now();
                let reduced = cleared.reduce_mod(p, true);
                stats.phase_times.reduce_total += t.elapsed().as_secs_f64();
                let mut reduced = match reduced {
                    Ok(m) => m,
                    Err(LinalgError::NotInvertible { .. }) => {
                        stats.primes_skipped += 1;
                        observer.on_event(&LiftEvent::PrimeSkipped { prime: p });
                        continue;
                    }
                    Err(e) => return Err(e),
                };

                let t = Instant::now();
                reduced.echelon_with(cancel)?;
                stats.phase_times.echelon_total += t.elapsed().as_secs_f64();
                let pivots = reduced.pivots().map(<[usize]>::to_vec).unwrap_or_default();

                if nrows >= ncols && pivots.len() == ncols {
                    observer.on_event(&LiftEvent::IdentityShortcut { prime: p });
                    return Ok(self.finish_identity(a, stats, start, observer));
                }

                if accepted.is_empty() || cmp_pivots(&best_pivots, &pivots) != Ordering::Greater {
                    bad_streak = 0;
                    stats.primes_accepted += 1;
                    prod *= p;
                    observer.on_event(&LiftEvent::PrimeAccepted {
                        prime: p,
                        rank: pivots.len(),
                        prod_bits: prod.bits(),
                        target_bits: target.bits(),
                    });
                    best_pivots = pivots;
                    accepted.push((p, reduced));
                } else {
                    bad_streak += 1;
                    stats.primes_rejected += 1;
                    observer.on_event(&LiftEvent::PrimeRejected {
                        prime: p,
                        rank: pivots.len(),
                    });
                    if bad_streak == self.config.warn_after_bad_primes + 1 {
                        observer.on_event(&LiftEvent::NotConverging {
                            consecutive_rejections: bad_streak,
                        });
                    }
                    if let Some(cap) = self.config.max_bad_primes {
                        if bad_streak > cap {
                            return Err(LinalgError::Value(format!(
                                "gave up after {} consecutive primes with a worse pivot pattern",
                                bad_streak
                            )));
                        }
                    }
                }
            }

            // Earlier accepted matrices may have been superseded by a better pattern.
            accepted.retain(|(_, m)| m.pivots() == Some(best_pivots.as_slice()));
            prod = accepted.iter().fold(BigInt::one(), |acc, (p, _)| acc * *p);
            if prod < target {
                continue;
            }

            let t = Instant::now();
            let lifted = lift_rows(&accepted, &prod, nrows, ncols, cancel)?;
            stats.phase_times.crt_total += t.elapsed().as_secs_f64();

            let mut e = match lifted {
                Some(e) => e,
                None => {
                    observer.on_event(&LiftEvent::ReconstructionFailed {
                        primes: accepted.len(),
                        prod_bits: prod.bits(),
                    });
                    self.retry(&mut stats)?;
                    target = &prod * &start_cubed;
                    continue;
                }
            };

            if self.config.proof {
                let t = Instant::now();
                let d = e.denom();
                let h = e.height(&d);
                let ok = h * ncols * &height < prod;
                stats.phase_times.verify_total += t.elapsed().as_secs_f64();
                if !ok {
                    observer.on_event(&LiftEvent::VerificationFailed {
                        primes: accepted.len(),
                        prod_bits: prod.bits(),
                    });
                    self.retry(&mut stats)?;
                    target = &prod * &start_cubed;
                    continue;
                }
            }

            stats.num_primes = accepted.len();
            stats.prod_bits = prod.bits();
            stats.verified = self.config.proof;
            stats.phase_times.total = start.elapsed().as_secs_f64();
            observer.on_event(&LiftEvent::Finished {
                primes: accepted.len(),
                rank: best_pivots.len(),
                verified: self.config.proof,
            });

            a.set_pivots(best_pivots.clone());
            e.set_pivots(best_pivots);
            return Ok((e, stats));
        }
    }

    fn retry(&self, stats: &mut LiftStats) -> Result<()> {
        stats.retries += 1;
        match self.config.max_retries {
            Some(max) if stats.retries > max => Err(LinalgError::Value(format!(
                "rational reconstruction did not succeed after {} retries",
                max
            ))),
            _ => Ok(()),
        }
    }

    /// Full column rank: the echelon form is the identity over zero rows
    fn finish_identity<O: LiftObserver + ?Sized>(
        &self,
        a: &mut RationalSparseMatrix,
        mut stats: LiftStats,
        start: Instant,
        observer: &mut O,
    ) -> (RationalSparseMatrix, LiftStats) {
        let (nrows, ncols) = (a.nrows(), a.ncols());
        let rows = (0..nrows)
            .map(|i| {
                let mut row = SparseVector::new(ncols, RationalField);
                if i < ncols {
                    // i < ncols == degree
                    let _ = row.set(i, Rational::from(1));
                }
                row
            })
            .collect();
        let mut e = SparseMatrix::from_parts(nrows, ncols, RationalField, rows);
        let pivots: Vec<usize> = (0..ncols).collect();

        stats.num_primes = 1;
        stats.verified = true;
        stats.phase_times.total = start.elapsed().as_secs_f64();
        observer.on_event(&LiftEvent::Finished {
            primes: 1,
            rank: ncols,
            verified: true,
        });

        a.set_pivots(pivots.clone());
        e.set_pivots(pivots);
        (e, stats)
    }
}

/// CRT and rational reconstruction of every row
///
/// `Ok(None)` when some entry does not reconstruct within the bound of `prod`.
fn lift_rows<C: Checkpoint + ?Sized>(
    accepted: &[(u64, ModularSparseMatrix)],
    prod: &BigInt,
    nrows: usize,
    ncols: usize,
    cancel: &C,
) -> Result<Option<RationalSparseMatrix>> {
    let primes: Vec<u64> = accepted.iter().map(|(p, _)| *p).collect();
    let basis = CrtBasis::new(&primes)?;
    let k = accepted.len();

    let mut rows = Vec::with_capacity(nrows);
    for i in 0..nrows {
        cancel.checkpoint()?;
        let mut positions: Vec<usize> = accepted
            .iter()
            .flat_map(|(_, m)| m.rows()[i].positions())
            .collect();
        positions.sort_unstable();
        positions.dedup();

        let n = positions.len();
        let mut residues = vec![0u64; k * n];
        for (pi, (_, m)) in accepted.iter().enumerate() {
            let row = &m.rows()[i];
            for (v, &j) in positions.iter().enumerate() {
                residues[pi * n + v] = u64::from(row.get(j)?.value());
            }
        }
        let lifted = basis.lift_flat(&residues, n)?;

        // Running denominator: entries of one row tend to share it, so the
        // residue times the denominator so far reconstructs with small height.
        let mut den = BigInt::one();
        let mut entries = Vec::with_capacity(n);
        for (&j, x) in positions.iter().zip(lifted) {
            let y = (x * &den).mod_floor(prod);
            let Some(r) = try_rational_reconstruct(&y, prod) else {
                return Ok(None);
            };
            let value = r.div_int(&den);
            den = den.lcm(value.denom());
            entries.push((j, value));
        }
        rows.push(SparseVector::from_pairs(ncols, RationalField, entries)?);
    }

    Ok(Some(SparseMatrix::from_parts(nrows, ncols, RationalField, rows)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cancel::{CancelToken, Uninterruptible};
    use crate::observe::SilentObserver;

    fn q(n: i64, d: i64) -> Rational {
        Rational::from_ratio(n, d)
    }

    #[test]
    fn test_cmp_pivots() {
        assert_eq!(cmp_pivots(&[0, 1, 2], &[0, 1]), Ordering::Greater);
        assert_eq!(cmp_pivots(&[0, 1], &[0, 1, 2]), Ordering::Less);
        assert_eq!(cmp_pivots(&[0, 1], &[0, 2]), Ordering::Greater);
        assert_eq!(cmp_pivots(&[0, 2], &[0, 1]), Ordering::Less);
        assert_eq!(cmp_pivots(&[1, 3], &[1, 3]), Ordering::Equal);
        assert_eq!(cmp_pivots(&[], &[]), Ordering::Equal);
    }

    #[test]
    fn test_config_builder() {
        let c = LiftConfig::default()
            .with_proof(false)
            .with_height_guess(BigInt::from(1000))
            .with_max_retries(Some(3));
        assert!(!c.proof);
        assert_eq!(c.height_guess, Some(BigInt::from(1000)));
        assert_eq!(c.start_prime, 20011);
        assert_eq!(c.max_bad_primes, Some(10_000));
        assert_eq!(c.max_retries, Some(3));
    }

    #[test]
    fn test_identity_shortcut() {
        let mut a = RationalSparseMatrix::from_i64_rows(2, &[vec![1, 2], vec![3, 4], vec![5, 6]])
            .unwrap();
        let mut events: Vec<LiftEvent> = Vec::new();
        let (e, stats) = MultiModularLifter::new()
            .echelon(&mut a, &mut events, &Uninterruptible)
            .unwrap();

        assert_eq!(e.pivots(), Some(&[0usize, 1][..]));
        assert_eq!(e.get(0, 0).unwrap(), q(1, 1));
        assert_eq!(e.get(1, 1).unwrap(), q(1, 1));
        assert_eq!(e.nnz(), 2);
        assert_eq!(stats.num_primes, 1);
        assert!(events
            .iter()
            .any(|ev| matches!(ev, LiftEvent::IdentityShortcut { prime: 20011 })));
    }

    #[test]
    fn test_rank_deficient_lift() {
        let mut a = RationalSparseMatrix::from_i64_rows(
            4,
            &[vec![2, 4, 0, 6], vec![1, 2, 1, 3], vec![3, 6, 1, 9]],
        )
        .unwrap();
        let mut direct = a.clone();
        direct.echelon().unwrap();

        let mut events: Vec<LiftEvent> = Vec::new();
        let (e, stats) = MultiModularLifter::new()
            .echelon(&mut a, &mut events, &Uninterruptible)
            .unwrap();

        assert_eq!(e, direct);
        assert_eq!(e.pivots(), Some(&[0usize, 2][..]));
        assert_eq!(a.pivots(), Some(&[0usize, 2][..]));
        assert!(stats.verified);
        assert!(stats.num_primes >= 1);
        assert!(matches!(events.first(), Some(LiftEvent::Started { nrows: 3, ncols: 4, .. })));
        assert!(matches!(
            events.last(),
            Some(LiftEvent::Finished { rank: 2, verified: true, .. })
        ));
    }

    #[test]
    fn test_unlucky_prime_is_rejected() {
        // modulo 20011 the second row loses its pivot in column 1
        let mut a =
            RationalSparseMatrix::from_i64_rows(3, &[vec![1, 0, 1], vec![0, 20011, 1]]).unwrap();
        let mut direct = a.clone();
        direct.echelon().unwrap();

        let mut events: Vec<LiftEvent> = Vec::new();
        let (e, stats) = MultiModularLifter::new()
            .echelon(&mut a, &mut events, &Uninterruptible)
            .unwrap();

        assert_eq!(e, direct);
        assert_eq!(e.pivots(), Some(&[0usize, 1][..]));
        assert!(stats.primes_accepted >= 2);
        assert!(events.iter().any(|ev| matches!(
            ev,
            LiftEvent::PrimeAccepted { prime: 20011, rank: 2, .. }
        )));
        // the 20011 matrix has a worse pattern and must not take part in the lift
        assert!(stats.num_primes < stats.primes_accepted);
    }

    #[test]
    fn test_unproven_mode() {
        let rows = vec![vec![q(1, 3), q(2, 1)], vec![q(2, 3), q(4, 1)]];
        let mut a = SparseMatrix::from_rows(2, RationalField, &rows).unwrap();
        let config = LiftConfig::default().with_proof(false);
        let (e, stats) = MultiModularLifter::with_config(config)
            .echelon(&mut a, &mut SilentObserver, &Uninterruptible)
            .unwrap();
        assert!(!stats.verified);
        assert_eq!(e.pivots(), Some(&[0usize][..]));
        assert_eq!(e.get(0, 1).unwrap(), q(6, 1));
        assert!(e.row(1).unwrap().is_zero());
    }

    #[test]
    fn test_tiny_height_guess_retries() {
        // echelon form has entries 1000/999 and 1001/997, far beyond what a
        // single prime can reconstruct; the lifter must enlarge the modulus
        let mut a = RationalSparseMatrix::from_i64_rows(
            3,
            &[vec![999, 0, 1000], vec![0, 997, 1001], vec![999, 997, 2001]],
        )
        .unwrap();
        let mut direct = a.clone();
        direct.echelon().unwrap();
        assert_eq!(direct.get(0, 2).unwrap(), q(1000, 999));

        let config = LiftConfig::default().with_height_guess(BigInt::one());
        let mut events: Vec<LiftEvent> = Vec::new();
        let (e, stats) = MultiModularLifter::with_config(config)
            .echelon(&mut a, &mut events, &Uninterruptible)
            .unwrap();
        assert_eq!(e, direct);
        assert!(stats.retries >= 1);
        assert!(events.iter().any(|ev| matches!(
            ev,
            LiftEvent::ReconstructionFailed { .. } | LiftEvent::VerificationFailed { .. }
        )));
    }

    #[test]
    fn test_retry_budget_exhausted() {
        let mut a = RationalSparseMatrix::from_i64_rows(
            3,
            &[vec![999, 0, 1000], vec![0, 997, 1001], vec![999, 997, 2001]],
        )
        .unwrap();
        let config = LiftConfig::default()
            .with_height_guess(BigInt::one())
            .with_max_retries(Some(0));
        let result = MultiModularLifter::with_config(config).echelon(
            &mut a,
            &mut SilentObserver,
            &Uninterruptible,
        );
        assert!(matches!(result, Err(LinalgError::Value(_))));
    }

    #[test]
    fn test_large_coprime_denominators() {
        // clearing denominators grows the height from 17 to 71 bits, so the
        // bounds must come from the cleared matrix
        let rows = vec![
            vec![q(94859, 30758), q(0, 1), q(66281, 47662)],
            vec![q(9661, 1934), q(11969, 18266), q(-63843, 53369)],
        ];
        let mut a = SparseMatrix::from_rows(3, RationalField, &rows).unwrap();
        let mut direct = a.clone();
        direct.echelon().unwrap();

        let (e, stats) = MultiModularLifter::new()
            .echelon(&mut a, &mut SilentObserver, &Uninterruptible)
            .unwrap();
        assert!(stats.verified);
        assert_eq!(e, direct);
        assert_eq!(e.pivots(), Some(&[0usize, 1][..]));
        assert!(stats.prod_bits > 115);
    }

    #[test]
    fn test_start_prime_above_u32_is_rejected() {
        let mut a = RationalSparseMatrix::from_i64_rows(2, &[vec![1, 2], vec![3, 4]]).unwrap();
        let config = LiftConfig::default().with_start_prime(u64::MAX - 58);
        let result = MultiModularLifter::with_config(config).echelon(
            &mut a,
            &mut SilentObserver,
            &Uninterruptible,
        );
        assert!(matches!(result, Err(LinalgError::Value(_))));
        assert!(a.pivots().is_none());
    }

    #[test]
    fn test_lift_rows_polls_checkpoint() {
        let a = RationalSparseMatrix::from_i64_rows(2, &[vec![1, 2], vec![2, 4]]).unwrap();
        let mut accepted = Vec::new();
        let mut prod = BigInt::one();
        for p in [20011u64, 20021] {
            let mut m = a.reduce_mod(p, false).unwrap();
            m.echelon().unwrap();
            accepted.push((p, m));
            prod *= p;
        }

        let lifted = lift_rows(&accepted, &prod, 2, 2, &Uninterruptible).unwrap();
        assert_eq!(lifted.unwrap().get(0, 1).unwrap(), q(2, 1));

        let token = CancelToken::new();
        token.cancel();
        assert!(matches!(
            lift_rows(&accepted, &prod, 2, 2, &token),
            Err(LinalgError::Cancelled)
        ));
    }

    #[test]
    fn test_cancelled_lift() {
        let mut a = RationalSparseMatrix::from_i64_rows(2, &[vec![1, 2], vec![2, 4]]).unwrap();
        let token = CancelToken::new();
        token.cancel();
        let result = MultiModularLifter::new().echelon(&mut a, &mut SilentObserver, &token);
        assert!(matches!(result, Err(LinalgError::Cancelled)));
        assert!(a.pivots().is_none());
    }

    #[test]
    fn test_empty_dimensions() {
        let mut a = RationalSparseMatrix::new(0, 3, RationalField);
        let (e, _) = MultiModularLifter::new()
            .echelon(&mut a, &mut SilentObserver, &Uninterruptible)
            .unwrap();
        assert_eq!(e.rank().unwrap(), 0);
        assert_eq!(a.rank().unwrap(), 0);
    }
}
