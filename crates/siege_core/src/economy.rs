//! Gold, permanent upgrades and stage progression formulas.
//!
//! All calculations use saturating integer math.

use serde::{Deserialize, Serialize};

use crate::catalog::UnitStats;
use crate::faction::Faction;

/// Player gold at the start of a match.
pub const PLAYER_STARTING_GOLD: u32 = 500;

/// Opponent gold at the start of a match.
pub const OPPONENT_STARTING_GOLD: u32 = 600;

/// Base health on stage 1 for both sides.
pub const STARTING_BASE_HEALTH: u32 = 1000;

/// Gold a miner carries per trip.
pub const MINER_CARGO: u32 = 20;

/// Gold held by each faction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Treasury {
    /// Player gold.
    pub player: u32,
    /// Opponent gold.
    pub opponent: u32,
}

impl Default for Treasury {
    fn default() -> Self {
        Self {
            player: PLAYER_STARTING_GOLD,
            opponent: OPPONENT_STARTING_GOLD,
        }
    }
}

impl Treasury {
    /// Gold held by a faction.
    #[must_use]
    pub const fn gold(&self, faction: Faction) -> u32 {
        match faction {
            Faction::Player => self.player,
            Faction::Opponent => self.opponent,
        }
    }

    fn slot(&mut self, faction: Faction) -> &mut u32 {
        match faction {
            Faction::Player => &mut self.player,
            Faction::Opponent => &mut self.opponent,
        }
    }

    /// Check if a faction can afford a cost.
    #[must_use]
    pub const fn can_afford(&self, faction: Faction, cost: u32) -> bool {
        self.gold(faction) >= cost
    }

    /// Deduct `cost` if affordable.
    ///
    /// Returns true if the transaction succeeded.
    pub fn try_spend(&mut self, faction: Faction, cost: u32) -> bool {
        let gold = self.slot(faction);
        if *gold >= cost {
            *gold -= cost;
            true
        } else {
            false
        }
    }

    /// Add gold to a faction.
    pub fn deposit(&mut self, faction: Faction, amount: u32) {
        let gold = self.slot(faction);
        *gold = gold.saturating_add(amount);
    }

    /// Overwrite a faction's gold.
    pub fn set(&mut self, faction: Faction, amount: u32) {
        *self.slot(faction) = amount;
    }
}

/// Permanent upgrade tracks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UpgradeTrack {
    /// Extra damage for player spawns.
    Damage,
    /// Extra max health for player spawns and base.
    Health,
    /// Present in the state shape; no command purchases it.
    Mining,
}

impl UpgradeTrack {
    /// Whether a command path exists for this track.
    #[must_use]
    pub const fn is_purchasable(self) -> bool {
        !matches!(self, Self::Mining)
    }
}

/// Purchased upgrade levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Upgrades {
    /// Damage level.
    pub damage: u32,
    /// Health level.
    pub health: u32,
    /// Mining level (unreachable).
    pub mining: u32,
}

impl Upgrades {
    /// Current level of a track.
    #[must_use]
    pub const fn level(&self, track: UpgradeTrack) -> u32 {
        match track {
            UpgradeTrack::Damage => self.damage,
            UpgradeTrack::Health => self.health,
            UpgradeTrack::Mining => self.mining,
        }
    }

    /// Increment a track.
    pub fn increment(&mut self, track: UpgradeTrack) {
        let level = match track {
            UpgradeTrack::Damage => &mut self.damage,
            UpgradeTrack::Health => &mut self.health,
            UpgradeTrack::Mining => &mut self.mining,
        };
        *level = level.saturating_add(1);
    }

    /// Price of the next level of a track.
    #[must_use]
    pub const fn next_cost(&self, track: UpgradeTrack) -> u32 {
        upgrade_cost(self.level(track))
    }
}

/// Cost of buying the level after `current_level`.
#[must_use]
pub const fn upgrade_cost(current_level: u32) -> u32 {
    400u32.saturating_add(400u32.saturating_mul(current_level))
}

/// Apply spawn-time bonuses to a template's stats.
///
/// Player units scale with purchased upgrades, opponent units with the stage.
/// Current health is raised together with max health so spawns start full.
#[must_use]
pub fn spawn_stats(base: UnitStats, faction: Faction, upgrades: &Upgrades, stage: u32) -> UnitStats {
    let (damage_bonus, health_bonus) = match faction {
        Faction::Player => (
            8u32.saturating_mul(upgrades.damage),
            60u32.saturating_mul(upgrades.health),
        ),
        Faction::Opponent => (2u32.saturating_mul(stage), 25u32.saturating_mul(stage)),
    };
    UnitStats {
        damage: base.damage.saturating_add(damage_bonus),
        max_health: base.max_health.saturating_add(health_bonus),
        health: base.max_health.saturating_add(health_bonus),
        ..base
    }
}

/// Gold granted to the player when clearing `stage`.
#[must_use]
pub const fn stage_reward(stage: u32) -> u32 {
    600u32.saturating_add(150u32.saturating_mul(stage))
}

/// Opponent gold after clearing `stage`.
#[must_use]
pub const fn opponent_stage_gold(stage: u32) -> u32 {
    800u32.saturating_add(300u32.saturating_mul(stage))
}

/// Opponent base health after clearing `stage`.
#[must_use]
pub const fn opponent_base_health(stage: u32) -> u32 {
    1000u32.saturating_add(750u32.saturating_mul(stage))
}

/// Player base health for a given health upgrade level.
#[must_use]
pub const fn player_base_health(health_level: u32) -> u32 {
    1000u32.saturating_add(120u32.saturating_mul(health_level))
}
