//! Per-unit behavioural state machine, run after combat each tick.

use crate::components::{Entity, Stance, UnitState};
use crate::economy::MINER_CARGO;
use crate::faction::Faction;
use crate::lane::{self, ARRIVAL_RADIUS, DEFEND_INNER_X, DEFEND_OUTER_X, MANUAL_HOLD_RADIUS};
use crate::math::{fx, ratio, Fixed};

/// Speed stat is multiplied by this to get lane units per tick.
pub const SPEED_FACTOR: (i32, i32) = (1, 4);

/// Garrison retreat multiplier.
pub const GARRISON_SPEED: (i32, i32) = (3, 2);

/// Mining finishes on ticks where the animation counter is a multiple of this.
pub const MINING_PERIOD: u64 = 100;

/// Side-wide inputs to movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveContext {
    /// Current player stance.
    pub stance: Stance,
    /// Whether the temporary speed buff is running.
    pub buff_active: bool,
}

/// Lane units per tick for `entity`.
#[must_use]
pub fn unit_speed(entity: &Entity, buff_active: bool) -> Fixed {
    let base = Fixed::saturating_from_num(entity.stats.speed) * ratio(SPEED_FACTOR.0, SPEED_FACTOR.1);
    if buff_active && entity.faction == Faction::Player {
        base * fx(2)
    } else {
        base
    }
}

fn step_toward(entity: &mut Entity, target_x: Fixed, speed: Fixed) {
    let x = entity.position.x;
    entity.position.x = if target_x > x { x + speed } else { x - speed };
}

fn advance(entity: &mut Entity, speed: Fixed) {
    entity.position.x += speed * fx(entity.faction.advance_sign());
}

/// Move one unit. Returns gold deposited at the home base.
///
/// Frozen units must be filtered out by the caller.
pub fn step(entity: &mut Entity, ctx: &MoveContext) -> u32 {
    let speed = unit_speed(entity, ctx.buff_active);
    let player_garrison = entity.faction == Faction::Player && ctx.stance == Stance::Garrison;
    let mut deposited = 0;

    if entity.is_miner() && !player_garrison {
        deposited = mine(entity, speed);
    } else if entity.faction == Faction::Player {
        if let Some(target_x) = entity.manual_target_x {
            if lane::lane_distance(target_x, entity.x()) <= fx(MANUAL_HOLD_RADIUS) {
                entity.state = UnitState::Idle;
            } else {
                entity.state = UnitState::Moving;
                let distance = lane::lane_distance(target_x, entity.x());
                step_toward(entity, target_x, speed.min(distance));
            }
        } else {
            match ctx.stance {
                Stance::Garrison => {
                    let home = lane::base_x(Faction::Player);
                    if lane::lane_distance(home, entity.x()) < fx(ARRIVAL_RADIUS) {
                        entity.state = UnitState::Garrisoned;
                    } else {
                        entity.state = UnitState::Moving;
                        let retreat = speed * ratio(GARRISON_SPEED.0, GARRISON_SPEED.1);
                        step_toward(entity, home, retreat);
                    }
                }
                Stance::Attack => {
                    if entity.state != UnitState::Attacking {
                        entity.state = UnitState::Moving;
                        advance(entity, speed);
                    }
                }
                Stance::Defend => {
                    let x = entity.x();
                    let walking = x > fx(DEFEND_OUTER_X) || x < fx(DEFEND_INNER_X);
                    if walking && entity.state != UnitState::Attacking {
                        entity.state = UnitState::Moving;
                    }
                    if x > fx(DEFEND_OUTER_X) {
                        entity.position.x -= speed;
                    } else if x < fx(DEFEND_INNER_X) {
                        entity.position.x += speed;
                    } else {
                        entity.state = UnitState::Idle;
                    }
                }
            }
        }
    } else if entity.state != UnitState::Attacking {
        entity.state = UnitState::Moving;
        advance(entity, speed);
    }

    entity.position.x = lane::clamp_x(entity.position.x);
    deposited
}

/// Two-leg mining cycle. Opponent cargo is discarded at the base.
fn mine(entity: &mut Entity, speed: Fixed) -> u32 {
    let arrival = fx(ARRIVAL_RADIUS);
    if entity.cargo == 0 {
        let mine_x = lane::mine_x(entity.faction);
        if lane::lane_distance(mine_x, entity.x()) < arrival {
            entity.state = UnitState::Mining;
            if entity.anim_frame % MINING_PERIOD == 0 {
                entity.cargo = MINER_CARGO;
            }
        } else {
            entity.state = UnitState::Moving;
            step_toward(entity, mine_x, speed);
        }
        0
    } else {
        let home = lane::base_x(entity.faction);
        if lane::lane_distance(home, entity.x()) < arrival {
            let cargo = std::mem::take(&mut entity.cargo);
            entity.state = UnitState::Idle;
            if entity.faction == Faction::Player {
                cargo
            } else {
                0
            }
        } else {
            entity.state = UnitState::Returning;
            step_toward(entity, home, speed);
            0
        }
    }
}
