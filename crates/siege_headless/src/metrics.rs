//! Match metrics for balance analysis.

use serde::{Deserialize, Serialize};
use siege_core::components::{EntityId, Millis};
use siege_core::director::DirectorDecision;
use siege_core::faction::Faction;
use siege_core::scheduler::RunReport;

/// Per-faction totals for one match.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SideMetrics {
    /// Units that entered the lane.
    pub units_spawned: u32,
    /// Units that died.
    pub units_lost: u32,
    /// Damage dealt to the enemy base by this side's units.
    pub base_damage_dealt: u32,
}

/// Complete metrics for a single match.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchMetrics {
    /// Random seed used.
    pub seed: u64,
    /// Player strategy name.
    pub strategy: String,
    /// Winner of the last stage played (None = time limit).
    pub winner: Option<Faction>,
    /// Stages the player cleared.
    pub stages_cleared: u32,
    /// Stage the match ended on.
    pub final_stage: u32,
    /// Virtual clock at the end.
    pub duration_ms: Millis,
    /// Simulation ticks run.
    pub ticks: u64,
    /// Player side totals.
    pub player: SideMetrics,
    /// Opponent side totals.
    pub opponent: SideMetrics,
    /// Gold delivered by player miners.
    pub gold_mined: u32,
    /// Turret shots that landed.
    pub turret_hits: u32,
    /// Commands the strategy issued.
    pub commands_issued: u32,
    /// Commands the match refused.
    pub commands_rejected: u32,
    /// Director activations that spawned nothing because the squad was full.
    pub director_capped: u32,
    /// Final simulation state hash (for determinism validation).
    pub final_state_hash: u64,
    #[serde(skip)]
    opponent_ids: Vec<EntityId>,
}

impl MatchMetrics {
    /// Create metrics for a new match.
    #[must_use]
    pub fn new(seed: u64, strategy: impl Into<String>) -> Self {
        Self {
            seed,
            strategy: strategy.into(),
            ..Default::default()
        }
    }

    /// Fold one scheduler run into the totals.
    pub fn absorb(&mut self, report: &RunReport) {
        for decision in &report.director {
            match decision {
                DirectorDecision::SpawnedMiner(id) | DirectorDecision::Spawned { id, .. } => {
                    self.opponent_ids.push(*id);
                }
                DirectorDecision::SquadFull { .. } => self.director_capped += 1,
                _ => {}
            }
        }
        for events in &report.ticks {
            self.ticks += 1;
            for id in &events.spawned {
                self.side_of(*id).units_spawned += 1;
            }
            for id in &events.deaths {
                self.side_of(*id).units_lost += 1;
            }
            self.player.base_damage_dealt = self
                .player
                .base_damage_dealt
                .saturating_add(events.base_damage.against(Faction::Opponent));
            self.opponent.base_damage_dealt = self
                .opponent
                .base_damage_dealt
                .saturating_add(events.base_damage.against(Faction::Player));
            self.gold_mined = self.gold_mined.saturating_add(events.deposited);
            self.turret_hits += events.projectile_hits as u32;
        }
    }

    /// Record a strategy command and whether it was accepted.
    pub fn record_command(&mut self, accepted: bool) {
        self.commands_issued += 1;
        if !accepted {
            self.commands_rejected += 1;
        }
    }

    /// Finalize the match with its outcome.
    pub fn finalize(
        &mut self,
        duration_ms: Millis,
        final_stage: u32,
        winner: Option<Faction>,
        hash: u64,
    ) {
        self.duration_ms = duration_ms;
        self.final_stage = final_stage;
        self.winner = winner;
        self.final_state_hash = hash;
    }

    fn side_of(&mut self, id: EntityId) -> &mut SideMetrics {
        if self.opponent_ids.contains(&id) {
            &mut self.opponent
        } else {
            &mut self.player
        }
    }
}

/// Aggregate statistics across a batch.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchSummary {
    /// Total matches played.
    pub total_matches: u32,
    /// Matches whose last stage the player won.
    pub player_wins: u32,
    /// Matches the opponent won.
    pub opponent_wins: u32,
    /// Matches stopped by the time limit.
    pub timeouts: u32,
    /// Player win rate (0.0-1.0).
    pub player_win_rate: f64,
    /// Average stages cleared.
    pub avg_stages_cleared: f64,
    /// Average match length.
    pub avg_duration_ms: f64,
    /// Shortest match.
    pub min_duration_ms: Millis,
    /// Longest match.
    pub max_duration_ms: Millis,
    /// Average gold mined by the player.
    pub avg_gold_mined: f64,
    /// Average player losses.
    pub avg_player_losses: f64,
    /// Average opponent losses.
    pub avg_opponent_losses: f64,
}

impl BatchSummary {
    /// Calculate summary from a list of match metrics.
    #[must_use]
    pub fn from_matches(matches: &[MatchMetrics]) -> Self {
        if matches.is_empty() {
            return Self::default();
        }
        let count = matches.len() as f64;
        let mut summary = Self {
            total_matches: matches.len() as u32,
            min_duration_ms: Millis::MAX,
            ..Default::default()
        };

        let mut stages = 0u64;
        let mut duration = 0u64;
        let mut gold = 0u64;
        let mut player_losses = 0u64;
        let mut opponent_losses = 0u64;

        for m in matches {
            match m.winner {
                Some(Faction::Player) => summary.player_wins += 1,
                Some(Faction::Opponent) => summary.opponent_wins += 1,
                None => summary.timeouts += 1,
            }
            stages += u64::from(m.stages_cleared);
            duration += m.duration_ms;
            gold += u64::from(m.gold_mined);
            player_losses += u64::from(m.player.units_lost);
            opponent_losses += u64::from(m.opponent.units_lost);
            summary.min_duration_ms = summary.min_duration_ms.min(m.duration_ms);
            summary.max_duration_ms = summary.max_duration_ms.max(m.duration_ms);
        }

        summary.player_win_rate = f64::from(summary.player_wins) / count;
        summary.avg_stages_cleared = stages as f64 / count;
        summary.avg_duration_ms = duration as f64 / count;
        summary.avg_gold_mined = gold as f64 / count;
        summary.avg_player_losses = player_losses as f64 / count;
        summary.avg_opponent_losses = opponent_losses as f64 / count;
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use siege_core::combat::BaseDamage;
    use siege_core::simulation::TickEvents;

    fn finished(seed: u64, winner: Option<Faction>, duration_ms: Millis) -> MatchMetrics {
        let mut m = MatchMetrics::new(seed, "test");
        m.finalize(duration_ms, 1, winner, seed);
        m
    }

    #[test]
    fn test_absorb_splits_sides_by_director_ids() {
        let mut metrics = MatchMetrics::new(1, "test");
        let report = RunReport {
            ticks: vec![TickEvents {
                spawned: vec![1, 2],
                deaths: vec![2],
                base_damage: BaseDamage {
                    player: 5,
                    opponent: 40,
                },
                deposited: 20,
                ..TickEvents::default()
            }],
            director: vec![DirectorDecision::SpawnedMiner(2)],
        };
        metrics.absorb(&report);

        assert_eq!(metrics.ticks, 1);
        assert_eq!(metrics.player.units_spawned, 1);
        assert_eq!(metrics.opponent.units_spawned, 1);
        assert_eq!(metrics.opponent.units_lost, 1);
        assert_eq!(metrics.player.units_lost, 0);
        assert_eq!(metrics.player.base_damage_dealt, 40);
        assert_eq!(metrics.opponent.base_damage_dealt, 5);
        assert_eq!(metrics.gold_mined, 20);
    }

    #[test]
    fn test_record_command() {
        let mut metrics = MatchMetrics::new(1, "test");
        metrics.record_command(true);
        metrics.record_command(false);
        assert_eq!(metrics.commands_issued, 2);
        assert_eq!(metrics.commands_rejected, 1);
    }

    #[test]
    fn test_summary_counts_outcomes() {
        let matches = vec![
            finished(1, Some(Faction::Player), 60_000),
            finished(2, Some(Faction::Opponent), 30_000),
            finished(3, None, 90_000),
            finished(4, Some(Faction::Player), 45_000),
        ];
        let summary = BatchSummary::from_matches(&matches);
        assert_eq!(summary.total_matches, 4);
        assert_eq!(summary.player_wins, 2);
        assert_eq!(summary.opponent_wins, 1);
        assert_eq!(summary.timeouts, 1);
        assert!((summary.player_win_rate - 0.5).abs() < f64::EPSILON);
        assert_eq!(summary.min_duration_ms, 30_000);
        assert_eq!(summary.max_duration_ms, 90_000);
    }

    #[test]
    fn test_empty_summary() {
        let summary = BatchSummary::from_matches(&[]);
        assert_eq!(summary.total_matches, 0);
        assert_eq!(summary.min_duration_ms, 0);
    }
}
