//! Random sparse test matrices
//!
//! Rows carry a dominant diagonal entry plus a few off-diagonal entries that
//! are mostly ±1, like constraint matrices met in practice.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use sparse_lift_core::{
    LinalgError, Rational, RationalField, RationalSparseMatrix, RowMajorTextCodec, SparseMatrix,
};
use std::collections::HashSet;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

/// Shape and value distribution of a generated matrix
#[derive(Debug, Clone)]
pub struct GenerateParams {
    pub rows: usize,
    pub cols: usize,
    pub nnz_per_row: usize,
    pub bound: i64,
    pub seed: u64,
    pub denominators: bool,
}

pub fn generate_sparse(params: &GenerateParams) -> Result<RationalSparseMatrix, LinalgError> {
    if params.bound < 1 {
        return Err(LinalgError::Value(format!(
            "bound must be at least 1, got {}",
            params.bound
        )));
    }
    let mut rng = StdRng::seed_from_u64(params.seed);
    let mut triples = Vec::new();

    for row in 0..params.rows {
        let mut used_cols = HashSet::new();

        if row < params.cols {
            let hi = params.bound.max(2);
            let diag = rng.gen_range(hi / 2..=hi);
            triples.push((row, row, value(&mut rng, diag, params)));
            used_cols.insert(row);
        }

        if params.cols == 0 {
            continue;
        }
        let num_extra = params.nnz_per_row.saturating_sub(1);
        for _ in 0..num_extra {
            let col = rng.gen_range(0..params.cols);
            if used_cols.insert(col) {
                let n = match rng.gen_range(0..10) {
                    0..=3 => 1,
                    4..=6 => -1,
                    _ => rng.gen_range(-params.bound..=params.bound),
                };
                if n != 0 {
                    triples.push((row, col, value(&mut rng, n, params)));
                }
            }
        }
    }

    SparseMatrix::from_triples(params.rows, params.cols, RationalField, triples)
}

fn value(rng: &mut StdRng, numerator: i64, params: &GenerateParams) -> Rational {
    let d = if params.denominators {
        rng.gen_range(1..=params.bound)
    } else {
        1
    };
    Rational::from_ratio(numerator, d)
}

pub fn run_generate(params: &GenerateParams, output: &Path) -> Result<(), LinalgError> {
    let m = generate_sparse(params)?;
    let mut out = BufWriter::new(File::create(output)?);
    RowMajorTextCodec::write_matrix(&m, &mut out)?;

    println!(
        "Generated {} × {} matrix: {} nonzeros ({:.1}% sparse), seed {}",
        m.nrows(),
        m.ncols(),
        m.nnz(),
        m.sparsity() * 100.0,
        params.seed
    );
    println!("Written to: {}", output.display());
    Ok(())
}
