//! The opponent's decision loop.
//!
//! The director runs on its own timer and issues spawns through the same
//! command surface the player uses. Economy comes first: it tops up its
//! miners before buying anything else.

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::components::{EntityId, Millis};
use crate::faction::Faction;
use crate::simulation::Simulation;

/// Fastest director cadence.
pub const MIN_PERIOD_MS: Millis = 400;

/// Director cadence on stage 0.
pub const BASE_PERIOD_MS: Millis = 1800;

/// Cadence reduction per stage.
pub const PERIOD_STEP_MS: Millis = 180;

/// Interval between activations at `stage`.
#[must_use]
pub fn period_ms(stage: u32) -> Millis {
    BASE_PERIOD_MS
        .saturating_sub(PERIOD_STEP_MS.saturating_mul(Millis::from(stage)))
        .max(MIN_PERIOD_MS)
}

/// Every fifth stage is a boss stage.
#[must_use]
pub const fn is_boss_stage(stage: u32) -> bool {
    stage % 5 == 0
}

/// Most miners the opponent adds on top of its base pair.
pub const MAX_EXTRA_MINERS: u32 = 10;

/// Miners the opponent wants alive: `2 + min(10, floor(stage / 1.2))`.
#[must_use]
pub const fn target_miner_count(stage: u32) -> u32 {
    let extra = stage.saturating_mul(5) / 6;
    if extra > MAX_EXTRA_MINERS {
        2 + MAX_EXTRA_MINERS
    } else {
        2 + extra
    }
}

/// Chance in percent that an activation buys a combat unit.
///
/// Not clamped: from stage 12 on this reaches 100 and every roll succeeds.
#[must_use]
pub const fn spawn_chance_percent(stage: u32) -> u32 {
    if is_boss_stage(stage) {
        80
    } else {
        40u32.saturating_add(5u32.saturating_mul(stage))
    }
}

/// Maximum live non-miner opponent units.
#[must_use]
pub const fn squad_cap(stage: u32) -> u32 {
    if is_boss_stage(stage) {
        20
    } else {
        8u32.saturating_add(2u32.saturating_mul(stage))
    }
}

/// Outcome of one director activation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DirectorDecision {
    /// The match is not in the playing phase.
    Inactive,
    /// A miner was spawned.
    SpawnedMiner(EntityId),
    /// A combat unit was spawned.
    Spawned {
        /// Template spawned.
        template: String,
        /// New entity id.
        id: EntityId,
    },
    /// A unit was picked but the squad is at its cap.
    SquadFull {
        /// Template that was picked.
        template: String,
    },
    /// The spawn roll failed.
    RollFailed,
    /// No combat unit is affordable.
    NothingAffordable,
}

/// Run one director activation against `sim`.
pub fn activate(sim: &mut Simulation) -> DirectorDecision {
    if !sim.phase().is_playing() {
        return DirectorDecision::Inactive;
    }
    let stage = sim.stage();
    let gold = sim.gold(Faction::Opponent);
    let (miners, squad) = sim.opponent_unit_counts();

    if let Some(miner) = sim.catalog().miner() {
        if miners < target_miner_count(stage) as usize && gold >= miner.stats.cost {
            let miner_id = miner.id.clone();
            if let Ok(id) = sim.spawn_unit(&miner_id, Faction::Opponent) {
                debug!(stage, id, "director spawned miner");
                return DirectorDecision::SpawnedMiner(id);
            }
        }
    }

    let affordable: Vec<String> = sim
        .catalog()
        .combat_units()
        .filter(|u| u.stats.cost <= gold)
        .map(|u| u.id.clone())
        .collect();
    if affordable.is_empty() {
        return DirectorDecision::NothingAffordable;
    }

    let roll: u32 = sim.rng_mut().gen_range(0..100);
    if roll >= spawn_chance_percent(stage) {
        return DirectorDecision::RollFailed;
    }
    let pick = sim.rng_mut().gen_range(0..affordable.len());
    let template = affordable[pick].clone();

    if squad >= squad_cap(stage) as usize {
        debug!(stage, squad, %template, "director squad at cap");
        return DirectorDecision::SquadFull { template };
    }

    match sim.spawn_unit(&template, Faction::Opponent) {
        Ok(id) => {
            debug!(stage, id, %template, "director spawned unit");
            DirectorDecision::Spawned { template, id }
        }
        Err(rejection) => {
            debug!(%rejection, "director spawn rejected");
            DirectorDecision::NothingAffordable
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_period_shrinks_to_floor() {
        assert_eq!(period_ms(1), 1620);
        assert_eq!(period_ms(7), 540);
        assert_eq!(period_ms(8), 400);
        assert_eq!(period_ms(50), 400);
    }

    #[test]
    fn test_boss_stage_overrides() {
        assert!(is_boss_stage(5));
        assert!(!is_boss_stage(4));
        assert_eq!(spawn_chance_percent(5), 80);
        assert_eq!(squad_cap(5), 20);
        assert_eq!(spawn_chance_percent(4), 60);
        assert_eq!(squad_cap(4), 16);
    }

    #[test]
    fn test_spawn_chance_is_unclamped() {
        assert_eq!(spawn_chance_percent(12), 100);
        assert_eq!(spawn_chance_percent(13), 105);
    }

    #[test]
    fn test_target_miner_count() {
        assert_eq!(target_miner_count(1), 2);
        assert_eq!(target_miner_count(2), 3);
        assert_eq!(target_miner_count(6), 7);
        assert_eq!(target_miner_count(12), 12);
        assert_eq!(target_miner_count(13), 12);
        assert_eq!(target_miner_count(40), 12);
    }
}
