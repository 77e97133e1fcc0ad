//! Sparse Lift CLI
//!
//! Exact reduced row-echelon forms of sparse rational matrices.
//!
//! # Usage
//! ```bash
//! # Generate a random 200 × 300 matrix with 4 nonzeros per row
//! sparse-lift generate --rows 200 --cols 300 --nnz-per-row 4 --output m.txt
//!
//! # Echelonize it by multi-modular lifting
//! sparse-lift echelon --input m.txt --output e.txt
//!
//! # Compare direct rational elimination against lifting
//! sparse-lift bench --max-size 128
//! ```
//!
//! Set `RUST_LOG=debug` (or `trace`) to follow the prime loop.

mod bench;
mod echelon;
mod generate;

use clap::{Parser, Subcommand, ValueEnum};
use num_bigint::BigInt;
use sparse_lift_core::LinalgError;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "sparse-lift")]
#[command(about = "Exact sparse echelon forms via multi-modular lifting")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Put a serialized matrix in reduced row-echelon form
    Echelon {
        /// Matrix file ('<nrows> <ncols>' header, then one line per row)
        #[arg(long)]
        input: PathBuf,

        /// Where to write the echelon form
        #[arg(long)]
        output: Option<PathBuf>,

        /// Elimination method
        #[arg(long, value_enum, default_value = "multimodular")]
        method: Method,

        /// Prime for the modular method
        #[arg(long, default_value = "20011")]
        prime: u64,

        /// Expected height of the result (multimodular only)
        #[arg(long)]
        height_guess: Option<BigInt>,

        /// Skip the height check of the lifted result
        #[arg(long)]
        no_proof: bool,
    },

    /// Generate a random sparse rational matrix
    Generate {
        /// Number of rows
        #[arg(long)]
        rows: usize,

        /// Number of columns
        #[arg(long)]
        cols: usize,

        /// Average nonzeros per row
        #[arg(long, default_value = "4")]
        nnz_per_row: usize,

        /// Bound on numerators (and denominators)
        #[arg(long, default_value = "100")]
        bound: i64,

        /// RNG seed
        #[arg(long, default_value = "42")]
        seed: u64,

        /// Draw non-trivial denominators
        #[arg(long)]
        denominators: bool,

        /// Output file
        #[arg(long)]
        output: PathBuf,
    },

    /// Benchmark direct rational elimination against multi-modular lifting
    Bench {
        /// Maximum matrix size
        #[arg(long, default_value = "128")]
        max_size: usize,

        /// Average nonzeros per row
        #[arg(long, default_value = "4")]
        nnz_per_row: usize,

        /// Export results to CSV
        #[arg(long)]
        export: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Method {
    /// CRT lifting from many primes
    Multimodular,
    /// Gauss-Jordan elimination over the rationals
    Direct,
    /// Echelon form modulo a single prime
    Modular,
}

fn main() {
    env_logger::Builder::from_default_env()
        .format_timestamp(None)
        .format_module_path(false)
        .init();

    let cli = Cli::parse();

    let result: Result<(), LinalgError> = match cli.command {
        Commands::Echelon {
            input,
            output,
            method,
            prime,
            height_guess,
            no_proof,
        } => echelon::run_echelon(&echelon::EchelonArgs {
            input,
            output,
            method,
            prime,
            height_guess,
            proof: !no_proof,
        }),
        Commands::Generate {
            rows,
            cols,
            nnz_per_row,
            bound,
            seed,
            denominators,
            output,
        } => generate::run_generate(
            &generate::GenerateParams {
                rows,
                cols,
                nnz_per_row,
                bound,
                seed,
                denominators,
            },
            &output,
        ),
        Commands::Bench {
            max_size,
            nnz_per_row,
            export,
        } => bench::run_bench(max_size, nnz_per_row, export),
    };

    if let Err(e) = result {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}
