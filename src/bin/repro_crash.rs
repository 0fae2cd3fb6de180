//! Reproduce AFL crashes without AFL instrumentation
//!
//! Usage: cargo run --bin repro_crash -- <crash_file>
//!
//! Set `RUST_LOG=canopy=trace` to see rotations, splits and growth as the
//! input replays.

use std::fs;
use std::process::ExitCode;

use canopy::oracle::Op;
use canopy::oracle::Oracle;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() != 2 {
        eprintln!("Usage: {} <crash_file>", args[0]);
        return ExitCode::FAILURE;
    }
    let data = match fs::read(&args[1]) {
        Ok(data) => data,
        Err(err) => {
            eprintln!("Failed to read {}: {}", args[1], err);
            return ExitCode::FAILURE;
        }
    };

    eprintln!("Input: {} bytes", data.len());
    eprintln!("Hex: {}", data.iter().map(|b| format!("{:02x}", b)).collect::<Vec<_>>().join(" "));

    let mut oracle = match Oracle::new() {
        Ok(oracle) => oracle,
        Err(err) => {
            eprintln!("Oracle setup failed: {}", err);
            return ExitCode::FAILURE;
        }
    };

    let mut remaining = data.as_slice();
    let mut op_num = 0;
    while let Some((op, rest)) = Op::from_bytes(remaining) {
        remaining = rest;
        op_num += 1;

        eprintln!("Op {}: {:?} (len before={})", op_num, op, oracle.len());
        if let Err(err) = oracle.apply(op) {
            eprintln!("  Failed: {}", err);
            return ExitCode::FAILURE;
        }
        oracle.check();
    }

    eprintln!("\nFinal len={}", oracle.len());
    eprintln!("All checks passed!");
    return ExitCode::SUCCESS;
}
