//! Lane geometry.
//!
//! The battlefield is a single horizontal lane. `x` is the combat axis,
//! `y` only spreads units vertically for presentation.

use crate::faction::Faction;
use crate::math::{fx, Fixed, Vec2Fixed};

/// Width of the lane.
pub const LANE_WIDTH: i32 = 1200;

/// Ground line that units stand on.
pub const GROUND_Y: i32 = 380;

/// Player base x-coordinate.
pub const PLAYER_BASE_X: i32 = 100;

/// Opponent base x-coordinate.
pub const OPPONENT_BASE_X: i32 = LANE_WIDTH - 100;

/// Player gold mine x-coordinate.
pub const PLAYER_MINE_X: i32 = 250;

/// Opponent gold mine x-coordinate.
pub const OPPONENT_MINE_X: i32 = 950;

/// Half-height of the random vertical spread applied at spawn.
pub const SPAWN_JITTER: i32 = 20;

/// Distance at which a unit counts as having reached a waypoint.
pub const ARRIVAL_RADIUS: i32 = 20;

/// Distance from which a unit with no other target can strike a base.
pub const BASE_ASSAULT_RANGE: i32 = 80;

/// Defend stance: units behind this line walk forward.
pub const DEFEND_INNER_X: i32 = 250;

/// Defend stance: units beyond this line fall back.
pub const DEFEND_OUTER_X: i32 = 300;

/// Height above the ground where base turrets fire from.
pub const TURRET_HEIGHT: i32 = 140;

/// Vertical aim offset for turret shots (aims at the torso).
pub const TURRET_AIM_OFFSET: i32 = 30;

/// Player turret engages opponents whose x is below this.
pub const PLAYER_TURRET_REACH_X: i32 = 500;

/// Opponent turret engages player units whose x is above this.
pub const OPPONENT_TURRET_REACH_X: i32 = LANE_WIDTH - PLAYER_TURRET_REACH_X;

/// A manual move order is complete within this distance.
pub const MANUAL_HOLD_RADIUS: i32 = 5;

/// Base x-coordinate for a faction.
#[must_use]
pub fn base_x(faction: Faction) -> Fixed {
    match faction {
        Faction::Player => fx(PLAYER_BASE_X),
        Faction::Opponent => fx(OPPONENT_BASE_X),
    }
}

/// Mine x-coordinate for a faction.
#[must_use]
pub fn mine_x(faction: Faction) -> Fixed {
    match faction {
        Faction::Player => fx(PLAYER_MINE_X),
        Faction::Opponent => fx(OPPONENT_MINE_X),
    }
}

/// Where a faction's turret projectiles originate.
#[must_use]
pub fn turret_origin(faction: Faction) -> Vec2Fixed {
    Vec2Fixed::new(base_x(faction), fx(GROUND_Y - TURRET_HEIGHT))
}

/// Whether a hostile unit at `x` is inside the turret zone of `base`.
#[must_use]
pub fn in_turret_reach(base: Faction, x: Fixed) -> bool {
    match base {
        Faction::Player => x < fx(PLAYER_TURRET_REACH_X),
        Faction::Opponent => x > fx(OPPONENT_TURRET_REACH_X),
    }
}

/// Clamp an x-coordinate to the lane.
#[must_use]
pub fn clamp_x(x: Fixed) -> Fixed {
    x.clamp(Fixed::ZERO, fx(LANE_WIDTH))
}

/// Unsigned horizontal distance.
#[must_use]
pub fn lane_distance(a: Fixed, b: Fixed) -> Fixed {
    (a - b).abs()
}
