//! Read-only view of a match for presentation layers.

use serde::{Deserialize, Serialize};

use crate::abilities::Ability;
use crate::components::{Entity, Health, Millis, Projectile, Stance};
use crate::economy::Upgrades;
use crate::faction::Faction;
use crate::simulation::{Phase, Simulation, TickEvents};

/// Cooldown state of one loadout ability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CooldownView {
    /// The ability.
    pub ability: Ability,
    /// Clock time it becomes usable.
    pub ready_at: Millis,
    /// Whether it can be cast right now.
    pub ready: bool,
}

/// Everything a renderer or sound layer reads once per tick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSnapshot {
    /// Clock time of the snapshot.
    pub now: Millis,
    /// Current phase.
    pub phase: Phase,
    /// Current stage.
    pub stage: u32,
    /// Player stance.
    pub stance: Stance,
    /// Player gold.
    pub gold: u32,
    /// Opponent gold.
    pub opponent_gold: u32,
    /// Player base health.
    pub player_base: Health,
    /// Opponent base health.
    pub opponent_base: Health,
    /// Visible units (garrisoned units are hidden).
    pub entities: Vec<Entity>,
    /// Turret shots in flight.
    pub projectiles: Vec<Projectile>,
    /// Loadout cooldowns.
    pub cooldowns: Vec<CooldownView>,
    /// Remaining buff time.
    pub buff_remaining_ms: Millis,
    /// Upgrade levels.
    pub upgrades: Upgrades,
    /// Unlocked unit ids.
    pub unlocked: Vec<String>,
    /// Events of the previous tick.
    pub events: TickEvents,
}

impl GameSnapshot {
    /// Capture the current state of `sim`.
    #[must_use]
    pub fn capture(sim: &Simulation) -> Self {
        let now = sim.now();
        Self {
            now,
            phase: sim.phase(),
            stage: sim.stage(),
            stance: sim.stance(),
            gold: sim.gold(Faction::Player),
            opponent_gold: sim.gold(Faction::Opponent),
            player_base: sim.base_health(Faction::Player),
            opponent_base: sim.base_health(Faction::Opponent),
            entities: sim
                .entities()
                .iter()
                .filter(|e| !e.is_garrisoned())
                .cloned()
                .collect(),
            projectiles: sim.projectiles().to_vec(),
            cooldowns: sim
                .loadout()
                .iter()
                .map(|&ability| CooldownView {
                    ability,
                    ready_at: sim.cooldowns().ready_at(ability),
                    ready: sim.cooldowns().is_ready(ability, now),
                })
                .collect(),
            buff_remaining_ms: sim.buff_remaining_ms(),
            upgrades: *sim.upgrades(),
            unlocked: sim.unlocked().to_vec(),
            events: sim.last_events().clone(),
        }
    }

    /// Units belonging to `faction`.
    pub fn units_of(&self, faction: Faction) -> impl Iterator<Item = &Entity> {
        self.entities.iter().filter(move |e| e.faction == faction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::UnitState;
    use crate::simulation::SimConfig;

    #[test]
    fn test_snapshot_hides_garrisoned_units() {
        let mut sim = Simulation::new(SimConfig::default());
        let army: Vec<String> = [
            "miner", "sword", "archidon", "spearton", "zombie", "ninja", "bomber", "giant",
        ]
        .iter()
        .map(|s| (*s).to_string())
        .collect();
        sim.confirm_army(&army, &[Ability::Purge, Ability::Firestorm])
            .unwrap();
        sim.begin_play();
        let a = sim.spawn_unit("sword", Faction::Player).unwrap();
        let b = sim.spawn_unit("zombie", Faction::Player).unwrap();
        sim.entity_mut(b).unwrap().state = UnitState::Garrisoned;

        let snapshot = GameSnapshot::capture(&sim);
        assert_eq!(snapshot.entities.len(), 1);
        assert_eq!(snapshot.entities[0].id, a);
        assert_eq!(snapshot.gold, 500 - 125 - 100);
        assert_eq!(snapshot.cooldowns.len(), 2);
        assert!(snapshot.cooldowns.iter().all(|c| c.ready));
        assert_eq!(snapshot.units_of(Faction::Opponent).count(), 0);
    }
}
