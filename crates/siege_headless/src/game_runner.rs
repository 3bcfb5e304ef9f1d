//! Runs one complete scripted match.
//!
//! The player is driven by a [`StrategyExecutor`], the opponent by the
//! built-in director. Every command the strategy issues is recorded into a
//! [`Replay`], so a finished match can be re-verified later.

use serde::{Deserialize, Serialize};
use siege_core::catalog::UnitCatalog;
use siege_core::components::Millis;
use siege_core::faction::Faction;
use siege_core::replay::Replay;
use siege_core::scheduler::Scheduler;
use siege_core::simulation::{Phase, SimConfig, Simulation};
use siege_core::snapshot::GameSnapshot;
use tracing::{debug, info};

use crate::error::HeadlessError;
use crate::metrics::MatchMetrics;
use crate::strategies::{Strategy, StrategyExecutor};

/// Default cap on match length (virtual time).
pub const DEFAULT_MAX_DURATION_MS: Millis = 10 * 60 * 1000;

/// Configuration for a single match.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchConfig {
    /// Simulation seed.
    pub seed: u64,
    /// Player strategy.
    pub strategy: Strategy,
    /// Keep advancing stages until this one has been played.
    pub max_stage: u32,
    /// Stop after this much virtual time.
    pub max_duration_ms: Millis,
    /// Alternative unit roster.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub catalog: Option<UnitCatalog>,
}

impl MatchConfig {
    /// One stage with the given strategy.
    #[must_use]
    pub fn new(seed: u64, strategy: Strategy) -> Self {
        Self {
            seed,
            strategy,
            max_stage: 1,
            max_duration_ms: DEFAULT_MAX_DURATION_MS,
            catalog: None,
        }
    }

    /// Play up to `max_stage` stages.
    #[must_use]
    pub fn with_stages(mut self, max_stage: u32) -> Self {
        self.max_stage = max_stage.max(1);
        self
    }

    /// Cap the match length.
    #[must_use]
    pub fn with_max_duration(mut self, ms: Millis) -> Self {
        self.max_duration_ms = ms;
        self
    }
}

/// Everything a finished match leaves behind.
#[derive(Debug, Clone)]
pub struct MatchOutcome {
    /// Collected metrics.
    pub metrics: MatchMetrics,
    /// Recorded replay, finalized at the end state.
    pub replay: Replay,
}

/// Play one match to completion.
pub fn run_match(config: &MatchConfig) -> Result<MatchOutcome, HeadlessError> {
    let sim_config = SimConfig::with_seed(config.seed);
    let mut sim = match &config.catalog {
        Some(catalog) => Simulation::with_catalog(sim_config, catalog.clone()),
        None => Simulation::new(sim_config),
    };
    for id in &config.strategy.army {
        sim.catalog().template(id)?;
    }
    let mut scheduler = Scheduler::new();
    let mut executor = StrategyExecutor::new(config.strategy.clone());
    let mut replay = Replay::new(&sim)?;
    let mut metrics = MatchMetrics::new(config.seed, executor.name());

    debug!(seed = config.seed, strategy = executor.name(), "match started");

    let winner = loop {
        if let Phase::Over { winner } = sim.phase() {
            if winner == Faction::Player {
                metrics.stages_cleared += 1;
            }
            if winner == Faction::Opponent || sim.stage() >= config.max_stage {
                break Some(winner);
            }
            let command = siege_core::replay::MatchCommand::AdvanceStage;
            replay.record(sim.now(), command.clone());
            metrics.record_command(sim.apply(&command).is_ok());
        }
        if sim.now() >= config.max_duration_ms {
            break None;
        }

        let snapshot = GameSnapshot::capture(&sim);
        for command in executor.decide(&snapshot, sim.catalog()) {
            replay.record(sim.now(), command.clone());
            metrics.record_command(sim.apply(&command).is_ok());
        }

        let step = executor
            .interval()
            .min(config.max_duration_ms.saturating_sub(sim.now()).max(1));
        let report = scheduler.run_for(&mut sim, step);
        metrics.absorb(&report);
    };

    replay.finalize(&sim);
    metrics.finalize(sim.now(), sim.stage(), winner, sim.state_hash());

    info!(
        seed = config.seed,
        winner = ?winner,
        stages_cleared = metrics.stages_cleared,
        duration_ms = metrics.duration_ms,
        "match finished"
    );

    Ok(MatchOutcome { metrics, replay })
}

#[cfg(test)]
mod tests {
    use super::*;
    use siege_core::error::GameError;

    fn short(seed: u64) -> MatchConfig {
        MatchConfig::new(seed, Strategy::default()).with_max_duration(20_000)
    }

    #[test]
    fn test_match_is_reproducible() {
        let a = run_match(&short(11)).unwrap();
        let b = run_match(&short(11)).unwrap();
        assert_eq!(a.metrics, b.metrics);
        assert_eq!(a.replay.final_hash, b.replay.final_hash);
    }

    #[test]
    fn test_recorded_replay_verifies() {
        let outcome = run_match(&short(5)).unwrap();
        assert!(outcome.replay.command_count() > 0);
        let hash = outcome.replay.verify().unwrap();
        assert_eq!(hash, outcome.metrics.final_state_hash);
    }

    #[test]
    fn test_time_limit_respected() {
        let outcome = run_match(&short(3)).unwrap();
        assert!(outcome.metrics.duration_ms <= 20_000);
        assert!(outcome.metrics.ticks > 0);
        assert!(outcome.metrics.player.units_spawned > 0);
    }

    #[test]
    fn test_army_outside_catalog_fails_fast() {
        let mut catalog = UnitCatalog::standard();
        catalog.units.retain(|u| u.id != "giant");
        let mut strategy = Strategy::default();
        strategy.army[7] = "giant".to_string();
        let config = MatchConfig {
            catalog: Some(catalog),
            ..MatchConfig::new(2, strategy)
        };
        assert!(matches!(
            run_match(&config),
            Err(HeadlessError::Game(GameError::UnknownTemplate(id))) if id == "giant"
        ));
    }

    #[test]
    fn test_stage_cap_is_at_least_one() {
        let config = MatchConfig::new(1, Strategy::rush()).with_stages(0);
        assert_eq!(config.max_stage, 1);
    }
}
