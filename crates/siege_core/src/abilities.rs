//! Cooldown-gated global spells.
//!
//! An ability affects every opponent unit at once. There is no targeting
//! and no positional constraint.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::components::{Entity, EntityId, Millis, UnitState};
use crate::faction::Faction;

/// Number of abilities in a loadout.
pub const LOADOUT_SIZE: usize = 2;

/// How long Frost holds its targets.
pub const FROST_DURATION_MS: Millis = 6000;

/// The three castable abilities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Ability {
    /// Removes every opponent unit.
    Purge,
    /// Flat damage to every opponent unit.
    Firestorm,
    /// Freezes every opponent unit.
    Frost,
}

impl Ability {
    /// All abilities.
    pub const ALL: [Self; 3] = [Self::Purge, Self::Firestorm, Self::Frost];

    /// Cooldown started by a cast.
    #[must_use]
    pub const fn cooldown_ms(self) -> Millis {
        match self {
            Self::Purge => 45_000,
            Self::Firestorm => 20_000,
            Self::Frost => 30_000,
        }
    }

    /// Name shown to players.
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Purge => "Blood Rain",
            Self::Firestorm => "Fire",
            Self::Frost => "Cold",
        }
    }

    /// Firestorm damage at a given stage.
    #[must_use]
    pub const fn firestorm_damage(stage: u32) -> u32 {
        350u32.saturating_add(40u32.saturating_mul(stage))
    }
}

/// Per-ability cooldown expiry times. Missing entries mean ready.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Cooldowns {
    expiry: BTreeMap<Ability, Millis>,
}

impl Cooldowns {
    /// Clock time at which `ability` becomes usable (0 if never cast).
    #[must_use]
    pub fn ready_at(&self, ability: Ability) -> Millis {
        self.expiry.get(&ability).copied().unwrap_or(0)
    }

    /// Whether `ability` can be cast at `now`.
    #[must_use]
    pub fn is_ready(&self, ability: Ability, now: Millis) -> bool {
        now >= self.ready_at(ability)
    }

    /// Start the cooldown for `ability`.
    pub fn start(&mut self, ability: Ability, now: Millis) {
        self.expiry
            .insert(ability, now.saturating_add(ability.cooldown_ms()));
    }

    /// Clear every cooldown.
    pub fn clear(&mut self) {
        self.expiry.clear();
    }

    /// Iterate over recorded expiries.
    pub fn iter(&self) -> impl Iterator<Item = (Ability, Millis)> + '_ {
        self.expiry.iter().map(|(a, t)| (*a, *t))
    }
}

/// What a cast did to the entity store.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AbilityEffect {
    /// Units removed by the cast.
    pub removed: Vec<EntityId>,
    /// Damage dealt per surviving or removed unit.
    pub damaged: Vec<(EntityId, u32)>,
    /// Units put into the frozen state.
    pub frozen: Vec<EntityId>,
}

/// Apply `ability` to the opponent units in `entities`.
///
/// Player units are never touched.
pub fn apply(ability: Ability, entities: &mut Vec<Entity>, stage: u32, now: Millis) -> AbilityEffect {
    let mut effect = AbilityEffect::default();
    let targets = |e: &Entity| e.faction == Faction::Opponent;

    match ability {
        Ability::Purge => {
            effect.removed = entities.iter().filter(|e| targets(e)).map(|e| e.id).collect();
            entities.retain(|e| !targets(e));
        }
        Ability::Firestorm => {
            let damage = Ability::firestorm_damage(stage);
            for entity in entities.iter_mut().filter(|e| targets(e)) {
                let dealt = entity.health.apply_damage(damage);
                effect.damaged.push((entity.id, dealt));
                if entity.health.is_dead() {
                    effect.removed.push(entity.id);
                }
            }
            entities.retain(|e| !e.health.is_dead());
        }
        Ability::Frost => {
            let until = now.saturating_add(FROST_DURATION_MS);
            for entity in entities.iter_mut().filter(|e| targets(e)) {
                entity.state = UnitState::Frozen;
                entity.frozen_until = Some(until);
                effect.frozen.push(entity.id);
            }
        }
    }

    effect
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::UnitCatalog;
    use crate::components::Health;
    use crate::math::Vec2Fixed;

    fn unit(id: EntityId, faction: Faction, template: &str, health: u32) -> Entity {
        let catalog = UnitCatalog::standard();
        let template = catalog.get(template).unwrap();
        Entity {
            id,
            faction,
            template_id: template.id.clone(),
            class: template.class,
            stats: template.stats,
            position: Vec2Fixed::from_ints(600, 380),
            health: Health {
                current: health,
                max: template.stats.max_health,
            },
            state: UnitState::Moving,
            last_attack_at: 0,
            anim_frame: 0,
            cargo: 0,
            frozen_until: None,
            manual_target_x: None,
        }
    }

    #[test]
    fn test_cooldown_predicate() {
        let mut cooldowns = Cooldowns::default();
        assert!(cooldowns.is_ready(Ability::Purge, 0));
        cooldowns.start(Ability::Purge, 1000);
        assert_eq!(cooldowns.ready_at(Ability::Purge), 46_000);
        assert!(!cooldowns.is_ready(Ability::Purge, 45_999));
        assert!(cooldowns.is_ready(Ability::Purge, 46_000));
        assert!(cooldowns.is_ready(Ability::Frost, 1000));
        cooldowns.clear();
        assert!(cooldowns.is_ready(Ability::Purge, 1000));
    }

    #[test]
    fn test_purge_spares_player_units() {
        let mut entities = vec![
            unit(1, Faction::Player, "sword", 100),
            unit(2, Faction::Opponent, "sword", 100),
            unit(3, Faction::Opponent, "giant", 1500),
        ];
        let effect = apply(Ability::Purge, &mut entities, 1, 0);
        assert_eq!(effect.removed, vec![2, 3]);
        assert_eq!(entities.len(), 1);
        assert_eq!(entities[0].id, 1);
    }

    #[test]
    fn test_firestorm_kills_weak_units_only() {
        let mut entities = vec![
            unit(1, Faction::Opponent, "sword", 100),
            unit(2, Faction::Opponent, "giant", 1500),
            unit(3, Faction::Player, "sword", 100),
        ];
        let effect = apply(Ability::Firestorm, &mut entities, 2, 0);
        assert_eq!(effect.removed, vec![1]);
        let giant = entities.iter().find(|e| e.id == 2).unwrap();
        assert_eq!(giant.health.current, 1500 - 430);
        assert_eq!(entities.iter().find(|e| e.id == 3).unwrap().health.current, 100);
    }

    #[test]
    fn test_frost_sets_expiry() {
        let mut entities = vec![
            unit(1, Faction::Opponent, "sword", 100),
            unit(2, Faction::Player, "sword", 100),
        ];
        let effect = apply(Ability::Frost, &mut entities, 1, 2500);
        assert_eq!(effect.frozen, vec![1]);
        assert_eq!(entities[0].state, UnitState::Frozen);
        assert_eq!(entities[0].frozen_until, Some(8500));
        assert_eq!(entities[0].health.current, 100);
        assert_eq!(entities[1].state, UnitState::Moving);
    }
}
