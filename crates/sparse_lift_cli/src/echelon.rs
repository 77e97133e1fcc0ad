//! `echelon` subcommand

use log::info;
use num_bigint::BigInt;
use sha2::{Digest, Sha256};
use sparse_lift_core::{
    LiftConfig, LinalgError, LogObserver, RationalSparseMatrix, RowMajorTextCodec,
    Uninterruptible,
};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::PathBuf;
use std::time::Instant;

use crate::Method;

pub struct EchelonArgs {
    pub input: PathBuf,
    pub output: Option<PathBuf>,
    pub method: Method,
    pub prime: u64,
    pub height_guess: Option<BigInt>,
    pub proof: bool,
}

/// What one echelon run produced, for the results box
pub struct EchelonReport {
    pub method: Method,
    pub nrows: usize,
    pub ncols: usize,
    pub nnz_in: usize,
    pub nnz_out: usize,
    pub rank: usize,
    pub num_primes: usize,
    pub total_ms: f64,
    pub verified: bool,
    pub result_hash: String,
}

pub fn run_echelon(args: &EchelonArgs) -> Result<(), LinalgError> {
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║             Sparse Lift - Echelon Form                       ║");
    println!("╚══════════════════════════════════════════════════════════════╝");
    println!();

    let input = File::open(&args.input)?;
    let mut m = RowMajorTextCodec::read_matrix(BufReader::new(input))?;
    info!("read {} x {} matrix from {}", m.nrows(), m.ncols(), args.input.display());

    println!("Input:      {}", args.input.display());
    println!("Size:       {} × {}", m.nrows(), m.ncols());
    println!("Nonzeros:   {} ({:.1}% sparse)", m.nnz(), m.sparsity() * 100.0);
    println!("Method:     {:?}", args.method);
    println!();

    let (e, report) = echelonize(&mut m, args)?;
    print_report(&report);

    if let Some(path) = &args.output {
        let mut out = BufWriter::new(File::create(path)?);
        RowMajorTextCodec::write_matrix(&e, &mut out)?;
        info!("wrote {} nonzeros to {}", e.nnz(), path.display());
        println!("\nEchelon form written to: {}", path.display());
    }
    Ok(())
}

/// Run the selected method on `m`
pub fn echelonize(
    m: &mut RationalSparseMatrix,
    args: &EchelonArgs,
) -> Result<(RationalSparseMatrix, EchelonReport), LinalgError> {
    let (nrows, ncols, nnz_in) = (m.nrows(), m.ncols(), m.nnz());
    let start = Instant::now();

    let (e, num_primes, verified) = match args.method {
        Method::Multimodular => {
            let config = LiftConfig {
                height_guess: args.height_guess.clone(),
                proof: args.proof,
                ..LiftConfig::default()
            };
            let (e, stats) =
                m.echelon_multimodular_with(&config, &mut LogObserver, &Uninterruptible)?;
            (e, stats.num_primes, stats.verified)
        }
        Method::Direct => (m.echelon_form()?, 0, true),
        Method::Modular => {
            let mut reduced = m.reduce_mod(args.prime, true)?;
            reduced.echelon()?;
            (reduced.lift_to_rationals()?, 1, false)
        }
    };
    let total_ms = start.elapsed().as_secs_f64() * 1000.0;

    let report = EchelonReport {
        method: args.method,
        nrows,
        ncols,
        nnz_in,
        nnz_out: e.nnz(),
        rank: e.rank()?,
        num_primes,
        total_ms,
        verified,
        result_hash: compute_result_hash(&e),
    };
    Ok((e, report))
}

/// SHA-256 of the serialized echelon form
pub fn compute_result_hash(e: &RationalSparseMatrix) -> String {
    let mut hasher = Sha256::new();
    hasher.update(format!("{} {}\n", e.nrows(), e.ncols()).as_bytes());
    hasher.update(RowMajorTextCodec::encode_rows(e).as_bytes());
    format!("{:x}", hasher.finalize())
}

fn print_report(r: &EchelonReport) {
    println!("┌──────────────────────────────────────────────────────────────┐");
    println!("│ Results                                                      │");
    println!("├──────────────────────────────────────────────────────────────┤");
    println!("│ Dimensions:       {:>6} × {:<6}                             │", r.nrows, r.ncols);
    println!("│ Rank (pivots):    {:>6}                                     │", r.rank);
    println!("│ Nonzeros in/out:  {:>6} / {:<6}                             │", r.nnz_in, r.nnz_out);
    if r.method != Method::Direct {
        println!("│ Primes used:      {:>6}                                     │", r.num_primes);
    }
    println!("│ Total time:       {:>10.3} ms                               │", r.total_ms);
    println!(
        "│ Result hash:      {:>16}                           │",
        &r.result_hash[..16.min(r.result_hash.len())]
    );
    println!(
        "│ Verified:         {:>6}                                     │",
        if r.verified { "✓" } else { "✗" }
    );
    println!("└──────────────────────────────────────────────────────────────┘");
}
