//! Headless lane-siege runner.
//!
//! Runs matches without any presentation layer, controlled via JSON on
//! stdin/stdout or by scripted strategies.
//!
//! # Usage
//!
//! ```bash
//! # Interactive mode - read commands from stdin
//! cargo run -p siege_headless
//!
//! # Interactive with a fixed seed, recording a replay
//! cargo run -p siege_headless -- run --seed 42 --record session.replay
//!
//! # Run a batch of scripted matches
//! cargo run -p siege_headless -- batch --strategy turtle --count 500 --output results/
//!
//! # Verify determinism of one seed
//! cargo run -p siege_headless -- verify --seed 12345 --runs 5
//! ```
//!
//! # Protocol
//!
//! Input (stdin): JSON commands, one per line
//! Output (stdout): JSON responses, one per line
//! Logs (stderr): Debug information

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use siege_core::replay::Replay;
use siege_headless::{
    batch::{run_batch, verify_determinism, BatchConfig},
    game_runner::DEFAULT_MAX_DURATION_MS,
    runner::{HeadlessConfig, HeadlessRunner},
    strategies::Strategy,
};

#[derive(Parser)]
#[command(name = "siege_headless")]
#[command(about = "Headless lane-siege runner for scripted play and CI")]
#[command(version)]
struct Cli {
    /// Enable verbose logging to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a single interactive match over stdin/stdout
    Run {
        /// Simulation seed
        #[arg(long, default_value = "0")]
        seed: u64,

        /// Alternative unit catalog (RON)
        #[arg(long)]
        catalog: Option<PathBuf>,

        /// Write the session replay to this file on exit
        #[arg(long)]
        record: Option<PathBuf>,
    },

    /// Run a batch of scripted matches for balance testing
    Batch {
        /// Player strategy: balanced, rush, turtle or a RON file
        #[arg(short, long, default_value = "balanced")]
        strategy: String,

        /// Number of matches to run
        #[arg(short, long, default_value = "100")]
        count: u32,

        /// Maximum parallel matches (0 = auto)
        #[arg(short, long, default_value = "0")]
        parallel: u32,

        /// Starting random seed
        #[arg(long, default_value = "0")]
        seed: u64,

        /// Stages to play per match
        #[arg(long, default_value = "1")]
        stages: u32,

        /// Virtual time limit per match in minutes
        #[arg(long, default_value = "10")]
        duration_minutes: u64,

        /// Output directory for results
        #[arg(short, long, default_value = "results")]
        output: PathBuf,
    },

    /// Verify determinism by running the same seed several times
    Verify {
        /// Player strategy
        #[arg(short, long, default_value = "balanced")]
        strategy: String,

        /// Seed to verify
        #[arg(long, default_value = "12345")]
        seed: u64,

        /// Number of verification runs
        #[arg(short, long, default_value = "5")]
        runs: u32,
    },

    /// Re-run a recorded replay and check its final hash
    Replay {
        /// Replay file path
        #[arg(short, long)]
        file: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();

    // Logs go to stderr; stdout is for protocol
    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(true),
        )
        .with(filter)
        .init();

    match cli.command {
        Some(Commands::Run {
            seed,
            catalog,
            record,
        }) => cmd_run(seed, catalog, record),
        Some(Commands::Batch {
            strategy,
            count,
            parallel,
            seed,
            stages,
            duration_minutes,
            output,
        }) => cmd_batch(
            strategy,
            count,
            parallel,
            seed,
            stages,
            duration_minutes,
            output,
        ),
        Some(Commands::Verify {
            strategy,
            seed,
            runs,
        }) => cmd_verify(&strategy, seed, runs),
        Some(Commands::Replay { file }) => cmd_replay(file),
        None => cmd_run(0, None, None),
    }
}

/// Run a single interactive match
fn cmd_run(seed: u64, catalog: Option<PathBuf>, record: Option<PathBuf>) {
    let config = HeadlessConfig {
        seed,
        catalog_path: catalog,
        replay_path: record,
    };
    let runner = HeadlessRunner::with_config(config);
    if let Err(e) = runner.run() {
        tracing::error!(error = %e, "session failed");
        std::process::exit(1);
    }
}

/// Run a batch of matches
fn cmd_batch(
    strategy: String,
    count: u32,
    parallel: u32,
    seed: u64,
    stages: u32,
    duration_minutes: u64,
    output: PathBuf,
) {
    let config = BatchConfig {
        strategy,
        match_count: count,
        parallel,
        seed_start: seed,
        max_stage: stages.max(1),
        max_duration_ms: duration_minutes.saturating_mul(60_000),
        output_dir: Some(output.clone()),
    };

    tracing::info!(
        strategy = %config.strategy,
        count,
        seed,
        stages,
        output = %output.display(),
        "Batch configuration"
    );

    let results = match run_batch(config) {
        Ok(results) => results,
        Err(e) => {
            eprintln!("FATAL: {e}");
            std::process::exit(1);
        }
    };

    let results_path = output.join("batch_results.json");
    if let Err(e) = results.save(&results_path) {
        tracing::error!(error = %e, path = %results_path.display(), "Failed to save results");
        eprintln!("FATAL: Failed to save results: {e}");
        std::process::exit(1);
    }

    let summary = &results.summary;
    eprintln!("\n{}", "=".repeat(50));
    eprintln!("BATCH COMPLETE");
    eprintln!("{}", "=".repeat(50));
    eprintln!("Matches played: {}", summary.total_matches);
    if !results.errors.is_empty() {
        eprintln!("Matches FAILED: {}", results.errors.len());
    }
    eprintln!("Duration: {:.1}s", results.duration_seconds);
    eprintln!(
        "Player wins: {} ({:.1}%)",
        summary.player_wins,
        summary.player_win_rate * 100.0
    );
    eprintln!("Opponent wins: {}", summary.opponent_wins);
    eprintln!("Timeouts: {}", summary.timeouts);
    eprintln!("Avg stages cleared: {:.2}", summary.avg_stages_cleared);
    eprintln!("Avg match length: {:.1}s", summary.avg_duration_ms / 1000.0);

    for error in results.errors.iter().take(10) {
        eprintln!(
            "  Match {} (seed {}): {}",
            error.match_index, error.seed, error.message
        );
    }

    eprintln!("\nResults saved to: {}", results_path.display());
}

/// Verify determinism
fn cmd_verify(strategy: &str, seed: u64, runs: u32) {
    tracing::info!(strategy, seed, runs, "Verifying determinism");

    let strategy = match Strategy::resolve(strategy) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Failed to load strategy: {e}");
            std::process::exit(1);
        }
    };

    match verify_determinism(&strategy, seed, runs, DEFAULT_MAX_DURATION_MS) {
        Ok(report) if report.is_deterministic() => {
            eprintln!("PASS: All {runs} runs produced identical results");
            if let Some(hash) = report.hashes.first() {
                eprintln!("  Final hash: {hash:016x}");
            }
        }
        Ok(report) => {
            eprintln!("FAIL: Non-determinism detected!");
            for (i, hash) in report.hashes.iter().enumerate() {
                eprintln!("  Run {i}: {hash:016x}");
            }
            if !report.replay_verified {
                eprintln!("  Replay did not reproduce the first run");
            }
            std::process::exit(1);
        }
        Err(e) => {
            eprintln!("FAIL: Error during verification: {e}");
            std::process::exit(1);
        }
    }
}

/// Verify a recorded replay
fn cmd_replay(file: PathBuf) {
    tracing::info!("Verifying replay: {}", file.display());

    let replay = match Replay::load(&file) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Failed to load replay: {e}");
            std::process::exit(1);
        }
    };

    eprintln!("Loaded replay:");
    eprintln!("  Seed: {}", replay.seed);
    eprintln!("  Commands: {}", replay.command_count());
    eprintln!("  Duration: {} ms", replay.final_at);

    match replay.verify() {
        Ok(hash) => {
            eprintln!("PASS: Replay verification successful");
            eprintln!("  Hash: {hash:016x}");
        }
        Err(e) => {
            eprintln!("FAIL: {e}");
            std::process::exit(1);
        }
    }
}
