//! Sparse Lift Core Library
//!
//! Exact reduced row-echelon forms of sparse matrices over prime fields and
//! over the rationals.
//!
//! # Overview
//!
//! Elimination over the rationals is exact but slow, because entries grow
//! without bound. The multi-modular path instead echelonizes the matrix
//! modulo many word-sized primes, where every entry stays small, and lifts
//! the results back with the Chinese Remainder Theorem and rational
//! reconstruction. An optional height check turns the probable result into
//! a proven one.
//!
//! # Key Components
//!
//! - [`vector`] - Sparse vectors with merge-based `axpy`
//! - [`sparse`] - Sparse matrices and sparsity-preserving Gauss-Jordan elimination
//! - [`modular`] / [`rational`] - The two scalar types
//! - [`primes`] - Primality testing and the prime sequence
//! - [`crt`] / [`reconstruct`] - Lifting residues back to rationals
//! - [`lift`] - The multi-modular echelon driver
//! - [`codec`] - Stable text serialization
//!
//! # Example
//!
//! ```
//! use sparse_lift_core::RationalSparseMatrix;
//!
//! let mut m = RationalSparseMatrix::from_i64_rows(2, &[vec![1, 2], vec![3, 4]])?;
//! let e = m.echelon_multimodular(None, true)?;
//! assert_eq!(e.pivots(), Some(&[0, 1][..]));
//! # Ok::<(), sparse_lift_core::LinalgError>(())
//! ```

pub mod cancel;
pub mod codec;
pub mod crt;
pub mod dense;
pub mod error;
pub mod lift;
pub mod modular;
pub mod observe;
pub mod primes;
pub mod rational;
mod rational_matrix;
pub mod reconstruct;
pub mod scalar;
pub mod sparse;
pub mod vector;

mod proptests;

pub use cancel::{CancelToken, Checkpoint, Uninterruptible};
pub use codec::RowMajorTextCodec;
pub use crt::CrtBasis;
pub use dense::Matrix;
pub use error::{LinalgError, Result};
pub use lift::{cmp_pivots, LiftConfig, LiftPhaseTimes, LiftStats, MultiModularLifter};
pub use modular::{ModInt, PrimeField};
pub use observe::{LiftEvent, LiftObserver, LogObserver, SilentObserver};
pub use primes::{is_prime, next_prime, PrimeSequence, START_PRIME};
pub use rational::{Rational, RationalField};
pub use reconstruct::{rational_reconstruct, try_rational_reconstruct};
pub use scalar::Scalar;
pub use sparse::{ModularSparseMatrix, RationalSparseMatrix, SparseMatrix};
pub use vector::SparseVector;
