//! Batch match runner for balance testing.
//!
//! Runs many seeded matches in parallel using rayon and aggregates the
//! results into a [`BatchSummary`].

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Instant;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use siege_core::components::Millis;
use tracing::{debug, info, warn};

use crate::error::HeadlessError;
use crate::game_runner::{run_match, MatchConfig, DEFAULT_MAX_DURATION_MS};
use crate::metrics::{BatchSummary, MatchMetrics};
use crate::strategies::Strategy;

/// Configuration for a batch run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Player strategy: a built-in name or a RON path
    pub strategy: String,
    /// Number of matches to run
    pub match_count: u32,
    /// Maximum parallel matches (0 = use rayon default)
    pub parallel: u32,
    /// Starting seed; match `i` uses `seed_start + i`
    pub seed_start: u64,
    /// Stages to play per match
    pub max_stage: u32,
    /// Virtual time limit per match
    pub max_duration_ms: Millis,
    /// Output directory for results
    pub output_dir: Option<PathBuf>,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            strategy: "balanced".to_string(),
            match_count: 100,
            parallel: 0,
            seed_start: 0,
            max_stage: 1,
            max_duration_ms: DEFAULT_MAX_DURATION_MS,
            output_dir: None,
        }
    }
}

impl BatchConfig {
    /// Create config for a strategy
    pub fn new(strategy: &str, match_count: u32) -> Self {
        Self {
            strategy: strategy.to_string(),
            match_count,
            ..Default::default()
        }
    }

    /// Set seed start
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed_start = seed;
        self
    }

    /// Set the per-match time limit
    pub fn with_max_duration(mut self, ms: Millis) -> Self {
        self.max_duration_ms = ms;
        self
    }

    /// Set output directory
    pub fn with_output(mut self, dir: PathBuf) -> Self {
        self.output_dir = Some(dir);
        self
    }
}

/// Results from a batch run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchResults {
    /// Configuration used
    pub config: BatchConfig,
    /// Individual match metrics, in seed order
    pub matches: Vec<MatchMetrics>,
    /// Aggregate summary
    pub summary: BatchSummary,
    /// Total wall-clock runtime
    pub duration_seconds: f64,
    /// Errors encountered
    pub errors: Vec<BatchError>,
}

impl BatchResults {
    /// Save results to JSON file
    pub fn save(&self, path: &Path) -> Result<(), HeadlessError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Load results from JSON file
    pub fn load(path: &Path) -> Result<Self, HeadlessError> {
        let json = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&json)?)
    }
}

/// Error during batch run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchError {
    /// Match index
    pub match_index: u32,
    /// Seed used
    pub seed: u64,
    /// Error message
    pub message: String,
}

/// Run a batch of matches
pub fn run_batch(config: BatchConfig) -> Result<BatchResults, HeadlessError> {
    let strategy = Strategy::resolve(&config.strategy)?;
    let start = Instant::now();
    let completed = AtomicU32::new(0);

    info!(
        strategy = %strategy.name,
        matches = config.match_count,
        seed_start = config.seed_start,
        "Starting batch run"
    );

    if config.parallel > 0 {
        rayon::ThreadPoolBuilder::new()
            .num_threads(config.parallel as usize)
            .build_global()
            .ok(); // Ignore if already set
    }

    let results: Vec<Result<MatchMetrics, BatchError>> = (0..config.match_count)
        .into_par_iter()
        .map(|i| {
            let seed = config.seed_start.wrapping_add(u64::from(i));
            let match_config = MatchConfig::new(seed, strategy.clone())
                .with_stages(config.max_stage)
                .with_max_duration(config.max_duration_ms);
            match run_match(&match_config) {
                Ok(outcome) => {
                    let done = completed.fetch_add(1, Ordering::Relaxed) + 1;
                    if done % 10 == 0 {
                        debug!("Progress: {}/{}", done, config.match_count);
                    }
                    Ok(outcome.metrics)
                }
                Err(e) => {
                    warn!("Match {} failed: {}", i, e);
                    Err(BatchError {
                        match_index: i,
                        seed,
                        message: e.to_string(),
                    })
                }
            }
        })
        .collect();

    let (matches, errors): (Vec<_>, Vec<_>) = results.into_iter().partition(Result::is_ok);
    let matches: Vec<MatchMetrics> = matches.into_iter().filter_map(Result::ok).collect();
    let errors: Vec<BatchError> = errors.into_iter().filter_map(Result::err).collect();

    let summary = BatchSummary::from_matches(&matches);
    let duration_seconds = start.elapsed().as_secs_f64();

    info!(
        "Batch complete: {} matches in {:.1}s ({:.1} matches/sec)",
        matches.len(),
        duration_seconds,
        matches.len() as f64 / duration_seconds.max(0.001)
    );

    Ok(BatchResults {
        config,
        matches,
        summary,
        duration_seconds,
        errors,
    })
}

/// Outcome of a determinism check.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeterminismReport {
    /// Seed checked.
    pub seed: u64,
    /// Final hash of every run.
    pub hashes: Vec<u64>,
    /// Whether the first run's replay reproduced its hash.
    pub replay_verified: bool,
}

impl DeterminismReport {
    /// All runs agree and the replay reproduced them.
    #[must_use]
    pub fn is_deterministic(&self) -> bool {
        self.replay_verified && self.hashes.windows(2).all(|w| w[0] == w[1])
    }
}

/// Run the same seed `runs` times and replay the first run.
pub fn verify_determinism(
    strategy: &Strategy,
    seed: u64,
    runs: u32,
    max_duration_ms: Millis,
) -> Result<DeterminismReport, HeadlessError> {
    let config = MatchConfig::new(seed, strategy.clone()).with_max_duration(max_duration_ms);
    let mut hashes = Vec::with_capacity(runs as usize);
    let mut first_replay = None;
    for _ in 0..runs.max(1) {
        let outcome = run_match(&config)?;
        hashes.push(outcome.metrics.final_state_hash);
        first_replay.get_or_insert(outcome.replay);
    }
    let replay_verified = match first_replay {
        Some(replay) => match replay.verify() {
            Ok(_) => true,
            Err(e) => {
                warn!(error = %e, "replay verification failed");
                false
            }
        },
        None => false,
    };
    Ok(DeterminismReport {
        seed,
        hashes,
        replay_verified,
    })
}
