//! Progress events emitted by the multi-modular lifter
//!
//! The lifter reports what it does through an injected `LiftObserver`
//! instead of global verbosity switches. `LogObserver` forwards events to the
//! `log` facade; a `Vec<LiftEvent>` collects them.

use log::{debug, trace, warn};

/// Structured progress event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LiftEvent {
    /// Lifting started on a cleared `nrows × ncols` matrix
    Started {
        nrows: usize,
        ncols: usize,
        height_bits: u64,
        target_bits: u64,
    },
    /// Prime divides a denominator; not usable
    PrimeSkipped { prime: u64 },
    /// Echelon form mod `prime` has a pivot pattern at least as good as the best so far
    PrimeAccepted {
        prime: u64,
        rank: usize,
        prod_bits: u64,
        target_bits: u64,
    },
    /// Echelon form mod `prime` has a worse pivot pattern (unlucky prime)
    PrimeRejected { prime: u64, rank: usize },
    /// Many consecutive primes were rejected
    NotConverging { consecutive_rejections: usize },
    /// Full column rank mod `prime`; the echelon form is the identity
    IdentityShortcut { prime: u64 },
    /// Rational reconstruction failed with the current modulus
    ReconstructionFailed { primes: usize, prod_bits: u64 },
    /// The height check of the lifted matrix failed
    VerificationFailed { primes: usize, prod_bits: u64 },
    /// Done; `verified` is false when the height check was skipped
    Finished {
        primes: usize,
        rank: usize,
        verified: bool,
    },
}

/// Receiver of lifting progress events
pub trait LiftObserver {
    fn on_event(&mut self, event: &LiftEvent);
}

/// Discards every event
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentObserver;

impl LiftObserver for SilentObserver {
    fn on_event(&mut self, _: &LiftEvent) {}
}

/// Forwards events to the `log` facade
#[derive(Debug, Clone, Copy, Default)]
pub struct LogObserver;

impl LiftObserver for LogObserver {
    fn on_event(&mut self, event: &LiftEvent) {
        match event {
            LiftEvent::Started {
                nrows,
                ncols,
                height_bits,
                target_bits,
            } => debug!(
                "multimodular echelon on {nrows} x {ncols}: height {height_bits} bits, target {target_bits} bits"
            ),
            LiftEvent::PrimeSkipped { prime } => trace!("  skip p={prime} (divides a denominator)"),
            LiftEvent::PrimeAccepted {
                prime,
                rank,
                prod_bits,
                target_bits,
            } => trace!("  p={prime}: rank {rank}, {prod_bits}/{target_bits} bits"),
            LiftEvent::PrimeRejected { prime, rank } => {
                debug!("  p={prime}: excluded (bad pivots, rank {rank})")
            }
            LiftEvent::NotConverging {
                consecutive_rejections,
            } => warn!(
                "echelon multi-modular possibly not converging ({consecutive_rejections} consecutive bad primes)"
            ),
            LiftEvent::IdentityShortcut { prime } => {
                debug!("full column rank mod p={prime}: echelon form is the identity")
            }
            LiftEvent::ReconstructionFailed { primes, prod_bits } => debug!(
                "rational reconstruction failed with {primes} primes ({prod_bits} bits); adding primes"
            ),
            LiftEvent::VerificationFailed { primes, prod_bits } => debug!(
                "height check failed with {primes} primes ({prod_bits} bits); adding primes"
            ),
            LiftEvent::Finished {
                primes,
                rank,
                verified,
            } => debug!("multimodular echelon done: rank {rank}, {primes} primes, verified={verified}"),
        }
    }
}

impl LiftObserver for Vec<LiftEvent> {
    fn on_event(&mut self, event: &LiftEvent) {
        self.push(event.clone());
    }
}

impl<O: LiftObserver + ?Sized> LiftObserver for &mut O {
    fn on_event(&mut self, event: &LiftEvent) {
        (**self).on_event(event)
    }
}
