//! Entity store data: units, projectiles, health.
//!
//! Components are plain data. Behaviour lives in [`crate::combat`],
//! [`crate::movement`] and [`crate::simulation`].

use serde::{Deserialize, Serialize};

use crate::catalog::{UnitClass, UnitStats};
use crate::faction::Faction;
use crate::math::{fixed_serde, option_fixed_serde, Fixed, Vec2Fixed};

/// Unique identifier for entities.
pub type EntityId = u64;

/// Simulation time in integer milliseconds.
pub type Millis = u64;

/// Battle stance applied to player non-miner units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Stance {
    /// Advance toward the opponent base.
    #[default]
    Attack,
    /// Hold a band just in front of the home base.
    Defend,
    /// Withdraw into the home base.
    Garrison,
}

/// Behavioural state of a unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum UnitState {
    /// Standing still.
    #[default]
    Idle,
    /// Walking along the lane.
    Moving,
    /// Engaged with a target.
    Attacking,
    /// Harvesting at a mine.
    Mining,
    /// Carrying cargo home.
    Returning,
    /// Health reached zero; removed before the tick ends.
    Dying,
    /// Withdrawn into the home base.
    Garrisoned,
    /// Suppressed by Frost until `frozen_until`.
    Frozen,
}

/// Health of a unit or base.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Health {
    /// Current health points.
    pub current: u32,
    /// Maximum health points.
    pub max: u32,
}

impl Health {
    /// Create new health at full.
    #[must_use]
    pub const fn new(max: u32) -> Self {
        Self { current: max, max }
    }

    /// Check if health reached zero.
    #[must_use]
    pub const fn is_dead(&self) -> bool {
        self.current == 0
    }

    /// Apply damage, returning actual damage dealt.
    /// Health never drops below zero.
    pub fn apply_damage(&mut self, amount: u32) -> u32 {
        let actual = amount.min(self.current);
        self.current -= actual;
        actual
    }

    /// Restore to full, optionally with a new maximum.
    pub fn reset(&mut self, max: u32) {
        self.max = max;
        self.current = max;
    }

    /// Get health as a percentage (0-100).
    #[must_use]
    pub fn percentage(&self) -> u32 {
        if self.max == 0 {
            0
        } else {
            (u64::from(self.current) * 100 / u64::from(self.max)) as u32
        }
    }
}

/// A live unit.
///
/// `stats` is a copy of the template's stats with spawn-time bonuses
/// already applied. Later upgrades never touch it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Entity {
    /// Unique id.
    pub id: EntityId,
    /// Owning side.
    pub faction: Faction,
    /// Template the unit was spawned from.
    pub template_id: String,
    /// Class tag copied from the template.
    pub class: UnitClass,
    /// Effective stats.
    pub stats: UnitStats,
    /// Lane position; `y` is cosmetic.
    pub position: Vec2Fixed,
    /// Current and maximum health.
    pub health: Health,
    /// Behavioural state.
    pub state: UnitState,
    /// Clock time of the last attack (0 if never).
    pub last_attack_at: Millis,
    /// Incremented once per tick while alive.
    pub anim_frame: u64,
    /// Gold carried by a miner.
    pub cargo: u32,
    /// Clock time at which Frost wears off.
    pub frozen_until: Option<Millis>,
    /// Lane x the unit was ordered to walk to.
    #[serde(with = "option_fixed_serde")]
    pub manual_target_x: Option<Fixed>,
}

impl Entity {
    /// Whether this unit runs the mining cycle.
    #[must_use]
    pub const fn is_miner(&self) -> bool {
        self.class.is_miner()
    }

    /// Whether the unit is frozen.
    #[must_use]
    pub fn is_frozen(&self) -> bool {
        self.state == UnitState::Frozen
    }

    /// Whether the unit is withdrawn into its base.
    #[must_use]
    pub fn is_garrisoned(&self) -> bool {
        self.state == UnitState::Garrisoned
    }

    /// Whether the unit can be targeted by enemies.
    #[must_use]
    pub fn is_targetable(&self) -> bool {
        !self.health.is_dead() && !self.is_garrisoned()
    }

    /// Whether the attack cooldown has elapsed at `now`.
    #[must_use]
    pub fn attack_ready(&self, now: Millis) -> bool {
        now.saturating_sub(self.last_attack_at) > self.stats.attack_interval_ms
    }

    /// Lane x coordinate.
    #[must_use]
    pub fn x(&self) -> Fixed {
        self.position.x
    }
}

/// A turret shot in flight.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Projectile {
    /// Current position.
    pub position: Vec2Fixed,
    /// Aim point fixed at launch.
    pub target_position: Vec2Fixed,
    /// Entity the damage is credited to on arrival.
    pub target: EntityId,
    /// Distance covered per tick.
    #[serde(with = "fixed_serde")]
    pub speed: Fixed,
    /// Damage applied on arrival.
    pub damage: u32,
    /// Faction whose turret fired.
    pub source: Faction,
}
