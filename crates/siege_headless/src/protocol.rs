//! JSON protocol for headless match control.
//!
//! The headless runner communicates via JSON lines (one JSON object per line):
//!
//! **Input (stdin):** Commands from the controller
//! **Output (stdout):** Responses and state updates
//!
//! # Protocol Flow
//!
//! 1. Runner starts, outputs `{"type":"ready","version":"1.0",...}`
//! 2. The controller confirms an army, then alternates commands and `advance`
//! 3. Runner outputs state after each `advance` (or on `query`)
//! 4. When a base falls, outputs `{"type":"game_over","winner":"Player",...}`
//!
//! # Example Session
//!
//! ```text
//! <- {"type":"ready","version":"1.0","seed":7,"now":0}
//! -> {"cmd":"confirm_army","units":["miner","sword",...],"abilities":["Firestorm","Frost"]}
//! <- {"type":"ack","cmd":"confirm_army"}
//! -> {"cmd":"advance","ms":2000}
//! <- {"type":"state","now":2000,"phase":"playing",...}
//! -> {"cmd":"spawn","unit":"sword"}
//! <- {"type":"spawned","entity_id":1,"unit":"sword"}
//! -> {"cmd":"cast","ability":"Frost"}
//! <- {"type":"rejected","cmd":"cast","reason":"Frost is on cooldown until 30000ms"}
//! ```

use serde::{Deserialize, Serialize};
use siege_core::abilities::Ability;
use siege_core::components::{Entity, EntityId, Health, Millis, Stance, UnitState};
use siege_core::economy::{UpgradeTrack, Upgrades};
use siege_core::faction::Faction;
use siege_core::snapshot::{CooldownView, GameSnapshot};

/// Protocol version reported in the ready line.
pub const PROTOCOL_VERSION: &str = "1.0";

// ============================================================================
// Input Commands (controller -> runner)
// ============================================================================

/// Commands that can be sent to the headless runner.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "cmd", rename_all = "snake_case")]
pub enum Command {
    /// Advance the virtual clock by `ms` milliseconds (default: one frame).
    Advance {
        #[serde(default = "default_advance_ms")]
        ms: Millis,
    },

    /// Query current match state without advancing time.
    Query,

    /// Spawn a player unit at the home base.
    Spawn { unit: String },

    /// Change the battle stance.
    Stance { stance: Stance },

    /// Cast a loadout ability.
    Cast { ability: Ability },

    /// Buy one upgrade level.
    Upgrade { track: UpgradeTrack },

    /// Lock in eight units and two abilities.
    ConfirmArmy {
        units: Vec<String>,
        abilities: Vec<Ability>,
    },

    /// Move on after a stage victory.
    AdvanceStage,

    /// Start a fresh match.
    Restart,

    /// Send player units to lane position `x`.
    Move { ids: Vec<EntityId>, x: i32 },

    /// Debug: overwrite gold (player by default).
    SetGold {
        amount: u32,
        #[serde(default)]
        faction: Option<Faction>,
    },

    /// Debug: start the speed buff.
    GrantBuff { ms: Millis },

    /// Report the current state hash (for determinism verification).
    Hash,

    /// Write the session replay to a file.
    SaveReplay { path: String },

    /// End the session.
    Quit,
}

fn default_advance_ms() -> Millis {
    siege_core::simulation::DEFAULT_FRAME_INTERVAL_MS
}

// ============================================================================
// Output Responses (runner -> controller)
// ============================================================================

/// Responses sent from the headless runner.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Response {
    /// Runner is ready to accept commands.
    Ready {
        version: String,
        seed: u64,
        now: Millis,
    },

    /// Command accepted.
    Ack { cmd: String },

    /// Command understood but refused by the match; nothing changed.
    Rejected { cmd: String, reason: String },

    /// Input could not be processed.
    Error {
        message: String,
        cmd: Option<String>,
    },

    /// Current match state.
    State(Box<MatchState>),

    /// A unit was spawned.
    Spawned { entity_id: EntityId, unit: String },

    /// State hash for determinism verification.
    StateHash { now: Millis, hash: u64 },

    /// A base fell.
    GameOver {
        winner: Faction,
        stage: u32,
        now: Millis,
    },

    /// Goodbye message before shutdown.
    Bye,
}

// ============================================================================
// State Types
// ============================================================================

/// Match state in protocol form (positions as floats).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchState {
    pub now: Millis,
    pub phase: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub winner: Option<Faction>,
    pub stage: u32,
    pub stance: Stance,
    pub gold: u32,
    pub opponent_gold: u32,
    pub player_base: HealthState,
    pub opponent_base: HealthState,
    pub units: Vec<UnitView>,
    pub projectiles: usize,
    pub cooldowns: Vec<CooldownView>,
    pub buff_remaining_ms: Millis,
    pub upgrades: Upgrades,
    pub hash: u64,
}

/// One unit on the lane.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnitView {
    pub id: EntityId,
    pub unit: String,
    pub faction: Faction,
    pub x: f64,
    pub y: f64,
    pub health: HealthState,
    pub state: UnitState,
    #[serde(skip_serializing_if = "is_zero")]
    pub cargo: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frozen_until: Option<Millis>,
}

/// Health state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthState {
    pub current: u32,
    pub max: u32,
}

#[allow(clippy::trivially_copy_pass_by_ref)]
fn is_zero(value: &u32) -> bool {
    *value == 0
}

impl From<Health> for HealthState {
    fn from(health: Health) -> Self {
        Self {
            current: health.current,
            max: health.max,
        }
    }
}

impl From<&Entity> for UnitView {
    fn from(entity: &Entity) -> Self {
        Self {
            id: entity.id,
            unit: entity.template_id.clone(),
            faction: entity.faction,
            x: entity.position.x.to_num::<f64>(),
            y: entity.position.y.to_num::<f64>(),
            health: entity.health.into(),
            state: entity.state,
            cargo: entity.cargo,
            frozen_until: entity.frozen_until,
        }
    }
}

impl MatchState {
    /// Build the protocol view of a snapshot.
    #[must_use]
    pub fn from_snapshot(snapshot: &GameSnapshot, hash: u64) -> Self {
        Self {
            now: snapshot.now,
            phase: snapshot.phase.name().to_string(),
            winner: snapshot.phase.winner(),
            stage: snapshot.stage,
            stance: snapshot.stance,
            gold: snapshot.gold,
            opponent_gold: snapshot.opponent_gold,
            player_base: snapshot.player_base.into(),
            opponent_base: snapshot.opponent_base.into(),
            units: snapshot.entities.iter().map(UnitView::from).collect(),
            projectiles: snapshot.projectiles.len(),
            cooldowns: snapshot.cooldowns.clone(),
            buff_remaining_ms: snapshot.buff_remaining_ms,
            upgrades: snapshot.upgrades,
            hash,
        }
    }
}

// ============================================================================
// Helpers
// ============================================================================

impl Response {
    /// Create a ready response.
    pub fn ready(seed: u64, now: Millis) -> Self {
        Self::Ready {
            version: PROTOCOL_VERSION.to_string(),
            seed,
            now,
        }
    }

    /// Create an acknowledgment.
    pub fn ack(cmd: &str) -> Self {
        Self::Ack {
            cmd: cmd.to_string(),
        }
    }

    /// Create a rejection.
    pub fn rejected(cmd: &str, reason: impl ToString) -> Self {
        Self::Rejected {
            cmd: cmd.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Create an error response.
    pub fn error(message: impl Into<String>, cmd: Option<&str>) -> Self {
        Self::Error {
            message: message.into(),
            cmd: cmd.map(String::from),
        }
    }

    /// Serialize to JSON line (with newline).
    pub fn to_json_line(&self) -> String {
        let mut json = serde_json::to_string(self).unwrap_or_else(|e| {
            format!(r#"{{"type":"error","message":"Serialization failed: {e}"}}"#)
        });
        json.push('\n');
        json
    }
}

impl Command {
    /// Parse from a JSON line.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Get command name for acknowledgment.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Advance { .. } => "advance",
            Self::Query => "query",
            Self::Spawn { .. } => "spawn",
            Self::Stance { .. } => "stance",
            Self::Cast { .. } => "cast",
            Self::Upgrade { .. } => "upgrade",
            Self::ConfirmArmy { .. } => "confirm_army",
            Self::AdvanceStage => "advance_stage",
            Self::Restart => "restart",
            Self::Move { .. } => "move",
            Self::SetGold { .. } => "set_gold",
            Self::GrantBuff { .. } => "grant_buff",
            Self::Hash => "hash",
            Self::SaveReplay { .. } => "save_replay",
            Self::Quit => "quit",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_advance_command() {
        let cmd = Command::from_json(r#"{"cmd":"advance","ms":250}"#).unwrap();
        assert!(matches!(cmd, Command::Advance { ms: 250 }));
    }

    #[test]
    fn test_default_advance_is_one_frame() {
        let cmd = Command::from_json(r#"{"cmd":"advance"}"#).unwrap();
        assert!(matches!(cmd, Command::Advance { ms: 16 }));
    }

    #[test]
    fn test_parse_confirm_army() {
        let json = r#"{"cmd":"confirm_army","units":["miner","sword"],"abilities":["Purge","Frost"]}"#;
        let cmd = Command::from_json(json).unwrap();
        match cmd {
            Command::ConfirmArmy { units, abilities } => {
                assert_eq!(units, vec!["miner", "sword"]);
                assert_eq!(abilities, vec![Ability::Purge, Ability::Frost]);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_parse_stance_and_move() {
        let cmd = Command::from_json(r#"{"cmd":"stance","stance":"Garrison"}"#).unwrap();
        assert!(matches!(
            cmd,
            Command::Stance {
                stance: Stance::Garrison
            }
        ));

        let cmd = Command::from_json(r#"{"cmd":"move","ids":[3,4],"x":640}"#).unwrap();
        assert!(matches!(cmd, Command::Move { ref ids, x: 640 } if ids == &[3, 4]));
    }

    #[test]
    fn test_set_gold_defaults_to_player() {
        let cmd = Command::from_json(r#"{"cmd":"set_gold","amount":900}"#).unwrap();
        assert!(matches!(
            cmd,
            Command::SetGold {
                amount: 900,
                faction: None
            }
        ));
    }

    #[test]
    fn test_unknown_command_fails_to_parse() {
        assert!(Command::from_json(r#"{"cmd":"teleport","id":1}"#).is_err());
    }

    #[test]
    fn test_rejected_response_line() {
        let line = Response::rejected("spawn", "Unit not unlocked: dragon").to_json_line();
        assert!(line.ends_with('\n'));
        assert!(line.contains(r#""type":"rejected""#));
        assert!(line.contains("dragon"));
    }

    #[test]
    fn test_game_over_line() {
        let line = Response::GameOver {
            winner: Faction::Player,
            stage: 2,
            now: 90_000,
        }
        .to_json_line();
        assert!(line.contains(r#""type":"game_over""#));
        assert!(line.contains(r#""winner":"Player""#));
    }

    #[test]
    fn test_health_state_from_health() {
        let state: HealthState = Health::new(1000).into();
        assert_eq!(
            state,
            HealthState {
                current: 1000,
                max: 1000
            }
        );
    }
}
