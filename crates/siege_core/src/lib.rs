//! # Siege Core
//!
//! Deterministic simulation engine for a two-faction lane battle.
//!
//! Two economies (player and opponent) spawn units that march along a single
//! horizontal lane toward each other's base, fight, mine gold and cast
//! global abilities until one base falls. This crate contains **only** the
//! state-transition logic:
//! - No rendering
//! - No audio
//! - No wall-clock reads (time is passed in as integer milliseconds)
//! - No unseeded randomness (a serialisable ChaCha stream lives in the state)
//! - No floating-point math in the simulation (uses fixed-point)
//!
//! ## Crate Structure
//!
//! - [`catalog`] - Unit templates and the built-in roster
//! - [`components`] - Entity, projectile and health data
//! - [`economy`] - Gold, upgrades and stage formulas
//! - [`combat`] - Targeting, damage ledger, base turrets
//! - [`movement`] - Per-unit behavioural state machine
//! - [`abilities`] - Cooldown-gated global spells
//! - [`director`] - The opponent's decision loop
//! - [`simulation`] - Game state container, command surface and tick
//! - [`scheduler`] - Run-to-completion timer queue driving the match
//! - [`snapshot`] - Read-only view for presentation layers
//! - [`replay`] - Command recording and deterministic playback

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod abilities;
pub mod catalog;
pub mod combat;
pub mod components;
pub mod director;
pub mod economy;
pub mod error;
pub mod faction;
pub mod lane;
pub mod math;
pub mod movement;
pub mod replay;
pub mod scheduler;
pub mod simulation;
pub mod snapshot;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::abilities::{Ability, AbilityEffect, Cooldowns};
    pub use crate::catalog::{UnitCatalog, UnitClass, UnitStats, UnitTemplate};
    pub use crate::components::{Entity, EntityId, Health, Millis, Projectile, Stance, UnitState};
    pub use crate::director::DirectorDecision;
    pub use crate::economy::{UpgradeTrack, Upgrades};
    pub use crate::error::{GameError, Rejection, Result};
    pub use crate::faction::Faction;
    pub use crate::math::{Fixed, Vec2Fixed};
    pub use crate::replay::{MatchCommand, Replay};
    pub use crate::scheduler::Scheduler;
    pub use crate::simulation::{Phase, SimConfig, Simulation, TickEvents};
    pub use crate::snapshot::GameSnapshot;
}
