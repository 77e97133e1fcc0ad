//! Multi-modular echelon form against direct rational elimination

use num_bigint::BigInt;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use sparse_lift_core::{
    CancelToken, LiftConfig, LiftEvent, LinalgError, MultiModularLifter, Rational, RationalField,
    RationalSparseMatrix, RowMajorTextCodec, SilentObserver, SparseMatrix, Uninterruptible,
};

/// Random sparse matrix with about `nnz_per_row` entries per row
fn random_matrix(
    rng: &mut StdRng,
    nrows: usize,
    ncols: usize,
    nnz_per_row: usize,
    bound: i64,
    with_denominators: bool,
) -> RationalSparseMatrix {
    let mut triples = Vec::new();
    for i in 0..nrows {
        let mut cols: Vec<usize> = (0..nnz_per_row).map(|_| rng.gen_range(0..ncols)).collect();
        cols.sort_unstable();
        cols.dedup();
        for j in cols {
            let n = rng.gen_range(-bound..=bound);
            let d = if with_denominators { rng.gen_range(1..=bound) } else { 1 };
            triples.push((i, j, Rational::from_ratio(n, d)));
        }
    }
    SparseMatrix::from_triples(nrows, ncols, RationalField, triples).unwrap()
}

fn assert_paths_agree(m: &RationalSparseMatrix) {
    let mut direct = m.clone();
    direct.echelon().unwrap();

    let mut input = m.clone();
    let lifted = input.echelon_multimodular(None, true).unwrap();

    assert_eq!(lifted, direct);
    assert_eq!(lifted.pivots(), direct.pivots());
    assert_eq!(input.pivots(), direct.pivots());
    assert_eq!(&input, m, "input entries must not change");
}

#[test]
fn integral_matrices_agree() {
    let mut rng = StdRng::seed_from_u64(0x5eed);
    for &(r, c) in &[(4, 4), (6, 9), (10, 7), (12, 12)] {
        let m = random_matrix(&mut rng, r, c, 3, 20, false);
        assert_paths_agree(&m);
    }
}

#[test]
fn rational_matrices_agree() {
    let mut rng = StdRng::seed_from_u64(42);
    for &(r, c) in &[(3, 5), (5, 5), (8, 6)] {
        let m = random_matrix(&mut rng, r, c, 2, 9, true);
        assert_paths_agree(&m);
    }
}

#[test]
fn large_coprime_denominators_agree() {
    let q = Rational::from_ratio;
    let rows = vec![
        vec![q(94859, 30758), q(0, 1), q(66281, 47662)],
        vec![q(9661, 1934), q(11969, 18266), q(-63843, 53369)],
    ];
    let m = SparseMatrix::from_rows(3, RationalField, &rows).unwrap();
    assert_paths_agree(&m);

    let mut rng = StdRng::seed_from_u64(0xdead);
    for _ in 0..40 {
        let (r, c) = (rng.gen_range(1..=3), rng.gen_range(2..=4));
        let m = random_matrix(&mut rng, r, c, 2, 60_000, true);
        assert_paths_agree(&m);
    }
}

#[test]
fn rank_deficient_matrix_agrees() {
    let mut rng = StdRng::seed_from_u64(7);
    let base = random_matrix(&mut rng, 4, 8, 3, 10, false);
    // stack the rows on top of a combination of them
    let mut rows: Vec<Vec<Rational>> = base.to_dense().to_rows();
    let combo = base
        .linear_combination_of_rows(&[
            Rational::from(2),
            Rational::from(-1),
            Rational::from_ratio(1, 3),
            Rational::from(0),
        ])
        .unwrap();
    rows.push(combo.to_dense());
    let m = SparseMatrix::from_rows(8, RationalField, &rows).unwrap();
    assert_paths_agree(&m);
    assert!(m.clone().echelon_form().unwrap().rank().unwrap() <= 4);
}

#[test]
fn zero_matrix_under_both_paths() {
    let m = RationalSparseMatrix::new(3, 5, RationalField);
    let direct = m.echelon_form().unwrap();
    assert_eq!(direct.pivots(), Some(&[][..]));
    assert_eq!(direct.rank().unwrap(), 0);
    assert_paths_agree(&m);
}

#[test]
fn collected_events_trace_the_run() {
    let mut rng = StdRng::seed_from_u64(99);
    let mut m = random_matrix(&mut rng, 5, 8, 3, 50, true);
    let mut events: Vec<LiftEvent> = Vec::new();
    let (_, stats) = MultiModularLifter::with_config(LiftConfig::default())
        .echelon(&mut m, &mut events, &Uninterruptible)
        .unwrap();

    assert!(matches!(events.first(), Some(LiftEvent::Started { .. })));
    assert!(matches!(events.last(), Some(LiftEvent::Finished { verified: true, .. })));
    let accepted = events
        .iter()
        .filter(|e| matches!(e, LiftEvent::PrimeAccepted { .. }))
        .count();
    assert_eq!(accepted, stats.primes_accepted);
    assert!(stats.primes_tried >= stats.primes_accepted);
    assert!(stats.prod_bits > 0);
}

#[test]
fn cancellation_from_another_thread() {
    let mut m = RationalSparseMatrix::from_i64_rows(2, &[vec![1, 1], vec![2, 2]]).unwrap();
    let token = CancelToken::new();
    let remote = token.clone();
    std::thread::spawn(move || remote.cancel()).join().unwrap();

    let result = m.echelon_multimodular_with(&LiftConfig::default(), &mut SilentObserver, &token);
    assert!(matches!(result, Err(LinalgError::Cancelled)));
}

#[test]
fn explicit_height_guess() {
    let mut m = RationalSparseMatrix::from_i64_rows(
        3,
        &[vec![3, 1, 0], vec![0, 5, 2], vec![1, 0, 7]],
    )
    .unwrap();
    let mut direct = m.clone();
    direct.echelon().unwrap();
    let e = m
        .echelon_multimodular(Some(BigInt::from(10_000)), true)
        .unwrap();
    assert_eq!(e, direct);
}

#[test]
fn lifted_result_survives_the_codec() {
    let mut rng = StdRng::seed_from_u64(3);
    let mut m = random_matrix(&mut rng, 6, 6, 2, 15, true);
    let e = m.echelon_multimodular(None, true).unwrap();
    let text = RowMajorTextCodec::encode_rows(&e);
    let back = RowMajorTextCodec::decode_rows(6, 6, &text).unwrap();
    assert_eq!(back, e);
}
