mod generator;
mod loader;

use anyhow::{bail, Context, Result};
use batchgcd_core::{Algorithm, Collision, Deduplicator, EngineError, RunConfig};
use clap::{Parser, Subcommand};
use std::io::Write;
use std::path::PathBuf;
use std::str::FromStr;

#[derive(Parser)]
#[command(name = "batchgcd", version, about = "Batch-GCD collision finder for RSA moduli")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run one of the four batch-GCD engines over a set of moduli files.
    Run {
        /// One or more hex-per-line or CSV (hex first field) input files.
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// pairwise | mulaccum | smoothparts | smoothparts_lowmem
        #[arg(long, default_value = "smoothparts")]
        algorithm: String,

        /// Worker count; defaults to hardware parallelism.
        #[arg(long)]
        threads: Option<usize>,

        /// Spill directory for the low-memory engine; defaults to the system temp dir.
        #[arg(long)]
        work_dir: Option<PathBuf>,

        /// Accepted for interface parity with the reference tool; this build
        /// has no profiler wired up, so it only logs that the path was
        /// ignored. Use `perf`/`cargo flamegraph` externally instead.
        #[arg(long)]
        cpuprofile: Option<PathBuf>,
    },
    /// Generate synthetic RSA-like moduli, mirroring the reference `mkmoduli` tool.
    Generate {
        #[arg(long)]
        count: u64,

        #[arg(long, default_value_t = 2048)]
        bits: u64,

        /// Fraction (0.0-1.0) of high primes reused as a later modulus's factor.
        #[arg(long, default_value_t = 0.0)]
        dup_rate: f64,

        #[arg(long)]
        seed: Option<u64>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Run { inputs, algorithm, threads, work_dir, cpuprofile } => {
            run_command(inputs, algorithm, threads, work_dir, cpuprofile)
        }
        Command::Generate { count, bits, dup_rate, seed } => generate_command(count, bits, dup_rate, seed),
    }
}

fn run_command(
    inputs: Vec<PathBuf>,
    algorithm: String,
    threads: Option<usize>,
    work_dir: Option<PathBuf>,
    cpuprofile: Option<PathBuf>,
) -> Result<()> {
    let algorithm = Algorithm::from_str(&algorithm).map_err(anyhow::Error::from)?;

    if let Some(path) = cpuprofile {
        tracing::warn!(path = %path.display(), "--cpuprofile is accepted but not wired to a profiler in this build; ignoring");
    }

    let mut cfg = RunConfig::default();
    if let Some(threads) = threads {
        cfg.threads = threads;
    }
    if let Some(work_dir) = work_dir {
        cfg.work_dir = work_dir;
    }

    tracing::info!(files = inputs.len(), %algorithm, "loading moduli");
    let moduli = loader::load(&inputs)?;
    tracing::info!(count = moduli.len(), "loaded moduli, starting engine");

    let (tx, rx) = crossbeam_channel::bounded(cfg.channel_capacity);
    let engine_cfg = cfg.clone();
    let handle = std::thread::spawn(move || batchgcd_core::run(algorithm, moduli, tx, &engine_cfg));

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let mut dedup = Deduplicator::new();
    let mut emitted = 0usize;
    for collision in rx.iter() {
        verify(&collision)?;
        if dedup.accept(&collision) {
            writeln!(out, "{collision}")?;
            emitted += 1;
        }
    }

    handle.join().expect("engine thread panicked").context("engine run failed")?;
    tracing::info!(emitted, "engine finished");
    Ok(())
}

fn verify(collision: &Collision) -> Result<()> {
    if !collision.is_valid() {
        bail!(EngineError::SelfTestFailed(collision.modulus().to_hex()));
    }
    Ok(())
}

fn generate_command(count: u64, bits: u64, dup_rate: f64, seed: Option<u64>) -> Result<()> {
    if !(0.0..=1.0).contains(&dup_rate) {
        bail!("--dup-rate must be between 0.0 and 1.0, got {dup_rate}");
    }
    if bits < 16 {
        bail!("--bits must be at least 16, got {bits}");
    }

    let moduli = generator::generate(&generator::GenerateOptions { count, bits, dup_rate, seed });
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    for m in &moduli {
        writeln!(out, "{}", m.to_hex())?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    // Pairwise is O(N^2) GCDs, so a literal "few thousand 2048-bit moduli"
    // batch would dominate the test suite's runtime; this scales the batch
    // down while still exercising the generator (not hand-picked small
    // values) and a genuine planted shared-factor rate across all engines.
    #[test]
    fn all_engines_agree_on_a_generated_batch() {
        let opts = generator::GenerateOptions { count: 300, bits: 512, dup_rate: 0.05, seed: Some(1234) };
        let moduli = generator::generate(&opts);
        let cfg = RunConfig::default();

        let mut all_keys = Vec::new();
        for algo in [Algorithm::Pairwise, Algorithm::MulAccum, Algorithm::SmoothParts, Algorithm::SmoothPartsLowMem] {
            let (tx, rx) = crossbeam_channel::unbounded();
            batchgcd_core::run(algo, moduli.clone(), tx, &cfg).unwrap();
            let mut keys: Vec<String> = rx.iter().map(|c| c.to_string()).collect();
            keys.sort();
            keys.dedup();
            all_keys.push((algo, keys));
        }
        let (_, first) = &all_keys[0];
        assert!(!first.is_empty(), "planted dup_rate should have produced at least one collision");
        for (algo, keys) in &all_keys[1..] {
            assert_eq!(keys, first, "{algo} disagreed with {}", all_keys[0].0);
        }
    }

    #[test]
    fn low_memory_engine_leaves_no_temp_files_behind() {
        let opts = generator::GenerateOptions { count: 300, bits: 512, dup_rate: 0.1, seed: Some(99) };
        let moduli = generator::generate(&opts);

        let work_dir = tempfile::tempdir().unwrap();
        let mut cfg = RunConfig::default();
        cfg.work_dir = work_dir.path().to_path_buf();

        let (tx, rx) = crossbeam_channel::unbounded();
        batchgcd_core::run(Algorithm::SmoothPartsLowMem, moduli, tx, &cfg).unwrap();
        for collision in rx.iter() {
            assert!(collision.is_valid());
        }

        let remaining: Vec<_> = std::fs::read_dir(work_dir.path()).unwrap().collect();
        assert!(remaining.is_empty(), "temp files left behind: {remaining:?}");
    }
}
