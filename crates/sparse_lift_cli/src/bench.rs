//! Direct vs multi-modular benchmark
//!
//! Rational elimination suffers from coefficient growth; lifting from word-sized
//! primes keeps every elimination step on machine integers.

use sparse_lift_core::{LiftConfig, LinalgError, SilentObserver, Uninterruptible};
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::generate::{generate_sparse, GenerateParams};

/// Result from one benchmark size
#[derive(Debug, Clone)]
pub struct BenchResult {
    pub n: usize,
    pub nnz: usize,
    pub sparsity: f64,
    pub rank: usize,
    pub direct_ms: f64,
    pub lifted_ms: f64,
    pub num_primes: usize,
    pub speedup: f64,
    pub agree: bool,
}

pub fn run_bench(
    max_size: usize,
    nnz_per_row: usize,
    export: Option<PathBuf>,
) -> Result<(), LinalgError> {
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║         Direct vs Multi-Modular Echelon Benchmark            ║");
    println!("╚══════════════════════════════════════════════════════════════╝");
    println!();
    println!("Configuration:");
    println!("  Max size:        {}", max_size);
    println!("  NNZ per row:     {}", nnz_per_row);
    println!();

    // Test sizes - geometric progression
    let sizes: Vec<usize> = (0..)
        .map(|i| 8 * (1 << i))
        .take_while(|&s| s <= max_size)
        .collect();

    let mut results = Vec::new();

    println!("┌──────┬────────┬──────────┬──────┬────────────┬────────────┬────────┬─────────┬───────┐");
    println!("│   n  │   nnz  │ sparsity │ rank │ Direct(ms) │ Lifted(ms) │ primes │ Speedup │ Agree │");
    println!("├──────┼────────┼──────────┼──────┼────────────┼────────────┼────────┼─────────┼───────┤");

    for n in sizes {
        let r = benchmark_size(n, nnz_per_row)?;
        println!(
            "│ {:>4} │ {:>6} │ {:>7.1}% │ {:>4} │ {:>10.2} │ {:>10.2} │ {:>6} │ {:>6.2}x │ {:>5} │",
            r.n,
            r.nnz,
            r.sparsity * 100.0,
            r.rank,
            r.direct_ms,
            r.lifted_ms,
            r.num_primes,
            r.speedup,
            if r.agree { "✓" } else { "✗" },
        );
        results.push(r);
    }

    println!("└──────┴────────┴──────────┴──────┴────────────┴────────────┴────────┴─────────┴───────┘");

    println!();
    println!("Key Observations:");
    if let Some(best) = results.iter().max_by(|a, b| a.speedup.total_cmp(&b.speedup)) {
        println!("  • Best lifting speedup: {:.2}x at n={}", best.speedup, best.n);
    }
    if let Some(c) = results.iter().find(|r| r.speedup > 1.0) {
        println!("  • Lifting wins for n ≥ {}", c.n);
    }
    if results.iter().any(|r| !r.agree) {
        println!("  • WARNING: direct and lifted echelon forms differ");
    }

    if let Some(path) = export {
        export_results(&path, &results)?;
        println!("\n✓ Results exported to: {}", path.display());
    }
    Ok(())
}

fn benchmark_size(n: usize, nnz_per_row: usize) -> Result<BenchResult, LinalgError> {
    let m = generate_sparse(&GenerateParams {
        rows: n,
        cols: n,
        nnz_per_row,
        bound: 10,
        seed: 42,
        denominators: true,
    })?;

    let direct_start = Instant::now();
    let direct = m.echelon_form()?;
    let direct_ms = direct_start.elapsed().as_secs_f64() * 1000.0;

    let mut input = m.clone();
    let lifted_start = Instant::now();
    let (lifted, stats) = input.echelon_multimodular_with(
        &LiftConfig::default(),
        &mut SilentObserver,
        &Uninterruptible,
    )?;
    let lifted_ms = lifted_start.elapsed().as_secs_f64() * 1000.0;

    let speedup = if lifted_ms > 0.0 { direct_ms / lifted_ms } else { 1.0 };

    Ok(BenchResult {
        n,
        nnz: m.nnz(),
        sparsity: m.sparsity(),
        rank: direct.rank()?,
        direct_ms,
        lifted_ms,
        num_primes: stats.num_primes,
        speedup,
        agree: direct == lifted && direct.pivots() == lifted.pivots(),
    })
}

fn export_results(path: &Path, results: &[BenchResult]) -> Result<(), LinalgError> {
    let mut file = File::create(path)?;
    writeln!(file, "n,nnz,sparsity,rank,direct_ms,lifted_ms,num_primes,speedup,agree")?;
    for r in results {
        writeln!(
            file,
            "{},{},{:.4},{},{:.6},{:.6},{},{:.4},{}",
            r.n, r.nnz, r.sparsity, r.rank, r.direct_ms, r.lifted_ms, r.num_primes, r.speedup,
            r.agree
        )?;
    }
    Ok(())
}
