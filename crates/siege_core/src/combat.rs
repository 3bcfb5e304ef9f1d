//! Targeting, the per-tick damage ledger and base turrets.
//!
//! Combat never touches unit health during the scan. Every hit lands in a
//! [`DamageLedger`] that the tick applies to all units at once, so the
//! outcome does not depend on the order units are stored in.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::components::{Entity, EntityId, Millis, Projectile, UnitState};
use crate::faction::Faction;
use crate::lane::{self, BASE_ASSAULT_RANGE, TURRET_AIM_OFFSET};
use crate::math::{fx, Fixed, Vec2Fixed};

/// Minimum time between turret shots.
pub const TURRET_INTERVAL_MS: Millis = 1500;

/// Damage carried by a turret projectile.
pub const TURRET_DAMAGE: u32 = 30;

/// Distance a projectile covers per tick.
pub const PROJECTILE_SPEED: i32 = 8;

/// A projectile closer than this to its aim point has arrived.
pub const PROJECTILE_HIT_RADIUS: i32 = 10;

/// Accumulated incoming damage for one tick.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DamageLedger {
    incoming: BTreeMap<EntityId, u32>,
}

impl DamageLedger {
    /// Create an empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue `amount` against `target`.
    pub fn add(&mut self, target: EntityId, amount: u32) {
        let slot = self.incoming.entry(target).or_insert(0);
        *slot = slot.saturating_add(amount);
    }

    /// Fold another ledger into this one.
    pub fn merge(&mut self, other: &Self) {
        for (target, amount) in other.iter() {
            self.add(target, amount);
        }
    }

    /// Damage queued against `target`.
    #[must_use]
    pub fn get(&self, target: EntityId) -> u32 {
        self.incoming.get(&target).copied().unwrap_or(0)
    }

    /// Whether nothing was queued.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.incoming.is_empty()
    }

    /// Iterate over queued damage in id order.
    pub fn iter(&self) -> impl Iterator<Item = (EntityId, u32)> + '_ {
        self.incoming.iter().map(|(id, dmg)| (*id, *dmg))
    }
}

/// Damage dealt straight to each base by units standing next to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BaseDamage {
    /// Damage to the player base.
    pub player: u32,
    /// Damage to the opponent base.
    pub opponent: u32,
}

impl BaseDamage {
    /// Damage dealt to `base`.
    #[must_use]
    pub const fn against(&self, base: Faction) -> u32 {
        match base {
            Faction::Player => self.player,
            Faction::Opponent => self.opponent,
        }
    }

    fn add(&mut self, base: Faction, amount: u32) {
        let slot = match base {
            Faction::Player => &mut self.player,
            Faction::Opponent => &mut self.opponent,
        };
        *slot = slot.saturating_add(amount);
    }
}

/// What a single unit decided to do during the scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Decision {
    Strike { target: EntityId, damage: u32 },
    Assault { base: Faction, damage: u32 },
    Release,
    Hold,
}

/// Result of the combat scan.
#[derive(Debug, Clone, Default)]
pub struct CombatOutcome {
    /// Damage queued against units.
    pub ledger: DamageLedger,
    /// Damage applied to bases.
    pub base_damage: BaseDamage,
    /// `(attacker, target)` pairs that struck this tick.
    pub strikes: Vec<(EntityId, EntityId)>,
}

/// Engagement range of a unit in lane units.
#[must_use]
pub fn engagement_range(range_stat: u32) -> Fixed {
    let range = range_stat.saturating_mul(40).saturating_add(40);
    Fixed::saturating_from_num(range)
}

/// Nearest targetable enemy within range, first found on ties.
fn nearest_enemy(attacker: &Entity, entities: &[Entity]) -> Option<EntityId> {
    let mut best = engagement_range(attacker.stats.range);
    let mut found = None;
    for other in entities {
        if other.faction == attacker.faction || !other.is_targetable() {
            continue;
        }
        let d = lane::lane_distance(other.x(), attacker.x());
        if d < best {
            best = d;
            found = Some(other.id);
        }
    }
    found
}

fn decide(attacker: &Entity, entities: &[Entity], now: Millis) -> Decision {
    if attacker.is_frozen() || attacker.is_garrisoned() || attacker.health.is_dead() {
        return Decision::Hold;
    }
    let ready = attacker.attack_ready(now);
    if let Some(target) = nearest_enemy(attacker, entities) {
        return if ready {
            Decision::Strike {
                target,
                damage: attacker.stats.damage,
            }
        } else {
            Decision::Hold
        };
    }
    let base = attacker.faction.enemy();
    if lane::lane_distance(lane::base_x(base), attacker.x()) < fx(BASE_ASSAULT_RANGE) {
        if ready {
            Decision::Assault {
                base,
                damage: attacker.stats.damage,
            }
        } else {
            Decision::Hold
        }
    } else {
        Decision::Release
    }
}

/// Run the targeting scan over every unit.
///
/// Decisions are made against the pre-tick view of `entities`; only the
/// attackers' own cooldown and state are written afterwards.
pub fn resolve_combat(entities: &mut [Entity], now: Millis) -> CombatOutcome {
    let decisions: Vec<Decision> = entities
        .iter()
        .map(|attacker| decide(attacker, entities, now))
        .collect();

    let mut outcome = CombatOutcome::default();
    for (attacker, decision) in entities.iter_mut().zip(decisions) {
        match decision {
            Decision::Strike { target, damage } => {
                outcome.ledger.add(target, damage);
                outcome.strikes.push((attacker.id, target));
                attacker.last_attack_at = now;
                attacker.state = UnitState::Attacking;
            }
            Decision::Assault { base, damage } => {
                outcome.base_damage.add(base, damage);
                attacker.last_attack_at = now;
                attacker.state = UnitState::Attacking;
            }
            Decision::Release => {
                if attacker.state == UnitState::Attacking {
                    attacker.state = UnitState::Idle;
                }
            }
            Decision::Hold => {}
        }
    }
    outcome
}

/// Last firing time of each base turret.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Turrets {
    /// Player turret.
    pub player_last_shot: Millis,
    /// Opponent turret.
    pub opponent_last_shot: Millis,
}

impl Turrets {
    fn last_shot(&mut self, base: Faction) -> &mut Millis {
        match base {
            Faction::Player => &mut self.player_last_shot,
            Faction::Opponent => &mut self.opponent_last_shot,
        }
    }

    /// Fire each ready turret at the first hostile unit in its zone.
    ///
    /// The target is the first match in store order, not the nearest.
    pub fn fire(&mut self, entities: &[Entity], now: Millis) -> Vec<Projectile> {
        let mut launched = Vec::new();
        for base in Faction::ALL {
            let last = self.last_shot(base);
            if now.saturating_sub(*last) <= TURRET_INTERVAL_MS {
                continue;
            }
            let target = entities.iter().find(|e| {
                e.faction != base && e.is_targetable() && lane::in_turret_reach(base, e.x())
            });
            if let Some(target) = target {
                launched.push(Projectile {
                    position: lane::turret_origin(base),
                    target_position: Vec2Fixed::new(
                        target.position.x,
                        target.position.y - fx(TURRET_AIM_OFFSET),
                    ),
                    target: target.id,
                    speed: fx(PROJECTILE_SPEED),
                    damage: TURRET_DAMAGE,
                    source: base,
                });
                *last = now;
            }
        }
        launched
    }
}

/// Move projectiles toward their aim points.
///
/// Projectiles that have arrived are removed and their damage queued in
/// `ledger`. Returns the number of arrivals.
pub fn advance_projectiles(projectiles: &mut Vec<Projectile>, ledger: &mut DamageLedger) -> usize {
    let hit_radius = fx(PROJECTILE_HIT_RADIUS);
    let before = projectiles.len();
    projectiles.retain_mut(|p| {
        if p.position.distance(p.target_position) < hit_radius {
            ledger.add(p.target, p.damage);
            return false;
        }
        let direction = (p.target_position - p.position).normalize();
        p.position = p.position + direction.scale(p.speed);
        true
    });
    before - projectiles.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::UnitCatalog;
    use crate::components::Health;

    fn unit(id: EntityId, faction: Faction, template: &str, x: i32) -> Entity {
        let catalog = UnitCatalog::standard();
        let template = catalog.get(template).unwrap();
        Entity {
            id,
            faction,
            template_id: template.id.clone(),
            class: template.class,
            stats: template.stats,
            position: Vec2Fixed::from_ints(x, 380),
            health: Health::new(template.stats.max_health),
            state: UnitState::Moving,
            last_attack_at: 0,
            anim_frame: 0,
            cargo: 0,
            frozen_until: None,
            manual_target_x: None,
        }
    }

    #[test]
    fn test_engagement_range() {
        assert_eq!(engagement_range(1), fx(80));
        assert_eq!(engagement_range(12), fx(520));
    }

    #[test]
    fn test_strike_queues_damage_without_applying() {
        let mut entities = vec![
            unit(1, Faction::Player, "sword", 500),
            unit(2, Faction::Opponent, "sword", 550),
        ];
        let outcome = resolve_combat(&mut entities, 5000);
        assert_eq!(outcome.ledger.get(2), 15);
        assert_eq!(outcome.ledger.get(1), 15);
        assert_eq!(entities[1].health.current, 100);
        assert_eq!(entities[0].state, UnitState::Attacking);
        assert_eq!(entities[0].last_attack_at, 5000);
    }

    #[test]
    fn test_cooldown_blocks_strike() {
        let mut entities = vec![
            unit(1, Faction::Player, "sword", 500),
            unit(2, Faction::Opponent, "sword", 550),
        ];
        entities[0].last_attack_at = 4500;
        let outcome = resolve_combat(&mut entities, 5300);
        assert_eq!(outcome.ledger.get(2), 0);
        // 800ms exactly is not enough; the interval must be exceeded.
        let outcome = resolve_combat(&mut entities, 5301);
        assert_eq!(outcome.ledger.get(2), 15);
    }

    #[test]
    fn test_nearest_target_first_found_on_tie() {
        let mut entities = vec![
            unit(1, Faction::Player, "archidon", 500),
            unit(2, Faction::Opponent, "sword", 560),
            unit(3, Faction::Opponent, "sword", 440),
            unit(4, Faction::Opponent, "sword", 530),
        ];
        let outcome = resolve_combat(&mut entities, 5000);
        assert!(outcome.strikes.contains(&(1, 4)));

        entities[3].position.x = fx(700);
        entities[0].last_attack_at = 0;
        let outcome = resolve_combat(&mut entities, 10_000);
        assert!(outcome.strikes.contains(&(1, 2)));
    }

    #[test]
    fn test_out_of_range_unit_is_ignored() {
        let mut entities = vec![
            unit(1, Faction::Player, "sword", 500),
            unit(2, Faction::Opponent, "sword", 580),
        ];
        let outcome = resolve_combat(&mut entities, 5000);
        assert!(outcome.ledger.is_empty());
    }

    #[test]
    fn test_base_assault_when_adjacent() {
        let mut entities = vec![unit(1, Faction::Player, "sword", 1030)];
        let outcome = resolve_combat(&mut entities, 5000);
        assert_eq!(outcome.base_damage.against(Faction::Opponent), 15);
        assert_eq!(outcome.base_damage.against(Faction::Player), 0);
        assert_eq!(entities[0].state, UnitState::Attacking);
    }

    #[test]
    fn test_attacking_released_without_target() {
        let mut entities = vec![unit(1, Faction::Player, "sword", 600)];
        entities[0].state = UnitState::Attacking;
        resolve_combat(&mut entities, 5000);
        assert_eq!(entities[0].state, UnitState::Idle);
    }

    #[test]
    fn test_frozen_and_garrisoned_do_not_fight() {
        let mut entities = vec![
            unit(1, Faction::Player, "sword", 500),
            unit(2, Faction::Opponent, "sword", 520),
        ];
        entities[1].state = UnitState::Frozen;
        let outcome = resolve_combat(&mut entities, 5000);
        assert_eq!(outcome.ledger.get(2), 15);
        assert_eq!(outcome.ledger.get(1), 0);

        entities[0].state = UnitState::Garrisoned;
        entities[0].last_attack_at = 0;
        let outcome = resolve_combat(&mut entities, 10_000);
        assert!(outcome.ledger.is_empty());
    }

    #[test]
    fn test_turret_fires_at_first_in_store_order() {
        let entities = vec![
            unit(1, Faction::Opponent, "sword", 450),
            unit(2, Faction::Opponent, "sword", 200),
        ];
        let mut turrets = Turrets::default();
        let shots = turrets.fire(&entities, 2000);
        assert_eq!(shots.len(), 1);
        assert_eq!(shots[0].target, 1);
        assert_eq!(shots[0].target_position, Vec2Fixed::from_ints(450, 350));
        assert_eq!(shots[0].position, Vec2Fixed::from_ints(100, 240));
        assert!(turrets.fire(&entities, 3500).is_empty());
        assert_eq!(turrets.fire(&entities, 3501).len(), 1);
    }

    #[test]
    fn test_opponent_turret_covers_far_side() {
        let entities = vec![
            unit(1, Faction::Player, "sword", 700),
            unit(2, Faction::Player, "spearton", 750),
        ];
        let mut turrets = Turrets::default();
        let shots = turrets.fire(&entities, 2000);
        assert_eq!(shots.len(), 1);
        assert_eq!(shots[0].source, Faction::Opponent);
        assert_eq!(shots[0].target, 2);
        assert_eq!(shots[0].position, Vec2Fixed::from_ints(1100, 240));
        assert_eq!(shots[0].target_position, Vec2Fixed::from_ints(750, 350));
        assert_eq!(turrets.opponent_last_shot, 2000);
        assert_eq!(turrets.player_last_shot, 0);
    }

    #[test]
    fn test_projectile_travels_then_lands_in_ledger() {
        let mut projectiles = vec![Projectile {
            position: Vec2Fixed::from_ints(100, 240),
            target_position: Vec2Fixed::from_ints(140, 240),
            target: 7,
            speed: fx(PROJECTILE_SPEED),
            damage: TURRET_DAMAGE,
            source: Faction::Player,
        }];
        let mut ledger = DamageLedger::new();
        let mut ticks = 0;
        while !projectiles.is_empty() {
            advance_projectiles(&mut projectiles, &mut ledger);
            ticks += 1;
            assert!(ticks < 20);
        }
        assert!(ticks > 1);
        assert_eq!(ledger.get(7), TURRET_DAMAGE);
    }
}
