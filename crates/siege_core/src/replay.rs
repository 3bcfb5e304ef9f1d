//! Replay system for recording and playing back matches.
//!
//! A replay stores the initial simulation state and the timestamped stream
//! of player commands. Playback feeds the commands through a fresh
//! [`Scheduler`] and must land on the recorded final state hash.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::abilities::Ability;
use crate::components::{EntityId, Millis, Stance};
use crate::economy::UpgradeTrack;
use crate::error::{GameError, Result};
use crate::faction::Faction;
use crate::scheduler::Scheduler;
use crate::simulation::Simulation;

/// A command issued into the match from outside the simulation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchCommand {
    /// Spawn a player unit.
    Spawn {
        /// Template id.
        unit: String,
    },
    /// Change the battle stance.
    SetStance(Stance),
    /// Cast an ability.
    Cast(Ability),
    /// Buy an upgrade level.
    BuyUpgrade(UpgradeTrack),
    /// Confirm the army selection.
    ConfirmArmy {
        /// Eight unit ids.
        units: Vec<String>,
        /// Two abilities.
        abilities: Vec<Ability>,
    },
    /// Move to the next stage after a victory.
    AdvanceStage,
    /// Start a fresh match.
    Restart,
    /// Send units to a lane position.
    OrderMove {
        /// Units to move.
        ids: Vec<EntityId>,
        /// Lane x.
        x: i32,
    },
    /// Debug: overwrite gold.
    SetGold {
        /// Faction whose gold is set.
        faction: Faction,
        /// New amount.
        amount: u32,
    },
    /// Debug: start the speed buff.
    GrantBuff {
        /// Buff duration.
        ms: Millis,
    },
}

/// A command and the clock time it was applied at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimedCommand {
    /// Clock time.
    pub at: Millis,
    /// The command.
    pub command: MatchCommand,
}

/// Replay file format version for compatibility.
pub const REPLAY_VERSION: u32 = 1;

/// Complete replay data structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Replay {
    /// Replay format version.
    pub version: u32,
    /// Random seed used for the match.
    pub seed: u64,
    /// Serialized initial simulation state.
    pub initial_state: Vec<u8>,
    /// Commands in the order they were applied.
    pub commands: Vec<TimedCommand>,
    /// Clock time at which recording stopped.
    pub final_at: Millis,
    /// State hash at `final_at`.
    pub final_hash: u64,
}

impl Replay {
    /// Start a replay from a simulation's current state.
    ///
    /// # Errors
    /// Returns an error if the state cannot be serialized.
    pub fn new(initial_state: &Simulation) -> Result<Self> {
        Ok(Self {
            version: REPLAY_VERSION,
            seed: initial_state.config().seed,
            initial_state: initial_state.serialize()?,
            commands: Vec::new(),
            final_at: initial_state.now(),
            final_hash: initial_state.state_hash(),
        })
    }

    /// Record a command applied at clock time `at`.
    pub fn record(&mut self, at: Millis, command: MatchCommand) {
        self.commands.push(TimedCommand { at, command });
    }

    /// Finalize the replay with the end state.
    pub fn finalize(&mut self, sim: &Simulation) {
        self.final_at = sim.now();
        self.final_hash = sim.state_hash();
    }

    /// Get the initial simulation state for playback.
    ///
    /// # Errors
    /// Returns an error if state deserialization fails.
    pub fn restore_initial_state(&self) -> Result<Simulation> {
        Simulation::deserialize(&self.initial_state)
    }

    /// Re-run the match and return the final simulation.
    ///
    /// # Errors
    /// Returns an error if the initial state cannot be restored.
    pub fn play(&self) -> Result<Simulation> {
        let mut sim = self.restore_initial_state()?;
        let mut scheduler = Scheduler::new();
        for timed in &self.commands {
            scheduler.run_until(&mut sim, timed.at);
            // Rejected commands were no-ops when recorded too.
            let _ = sim.apply(&timed.command);
        }
        scheduler.run_until(&mut sim, self.final_at);
        Ok(sim)
    }

    /// Re-run the match and compare against the recorded hash.
    ///
    /// # Errors
    /// Returns [`GameError::DesyncDetected`] if the hashes differ.
    pub fn verify(&self) -> Result<u64> {
        let sim = self.play()?;
        let replayed_hash = sim.state_hash();
        if replayed_hash != self.final_hash {
            return Err(GameError::DesyncDetected {
                at_ms: self.final_at,
                recorded_hash: self.final_hash,
                replayed_hash,
            });
        }
        info!(
            commands = self.commands.len(),
            at = self.final_at,
            "replay verified"
        );
        Ok(replayed_hash)
    }

    /// Save the replay to a file.
    ///
    /// # Errors
    /// Returns an error if serialization or file writing fails.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let bytes = bincode::serialize(self)
            .map_err(|e| GameError::InvalidState(format!("Failed to serialize replay: {e}")))?;
        std::fs::write(path.as_ref(), bytes)
            .map_err(|e| GameError::InvalidState(format!("Failed to write replay file: {e}")))?;
        Ok(())
    }

    /// Load a replay from a file.
    ///
    /// # Errors
    /// Returns an error if file reading, deserialization or the version check fails.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let bytes = std::fs::read(path.as_ref())
            .map_err(|e| GameError::InvalidState(format!("Failed to read replay file: {e}")))?;
        let replay: Self = bincode::deserialize(&bytes)
            .map_err(|e| GameError::InvalidState(format!("Failed to deserialize replay: {e}")))?;

        if replay.version != REPLAY_VERSION {
            return Err(GameError::InvalidState(format!(
                "Replay version mismatch: expected {REPLAY_VERSION}, got {}",
                replay.version
            )));
        }

        Ok(replay)
    }

    /// Get the total number of commands in the replay.
    #[must_use]
    pub fn command_count(&self) -> usize {
        self.commands.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::SimConfig;

    fn army_command() -> MatchCommand {
        MatchCommand::ConfirmArmy {
            units: [
                "miner", "sword", "archidon", "spearton", "zombie", "ninja", "bomber", "giant",
            ]
            .iter()
            .map(|s| (*s).to_string())
            .collect(),
            abilities: vec![Ability::Firestorm, Ability::Frost],
        }
    }

    fn record_match() -> Replay {
        let mut sim = Simulation::new(SimConfig::with_seed(99));
        let mut scheduler = Scheduler::new();
        let mut replay = Replay::new(&sim).unwrap();
        let script = [
            (0, army_command()),
            (2000, MatchCommand::Spawn { unit: "miner".into() }),
            (2500, MatchCommand::Spawn { unit: "sword".into() }),
            (4000, MatchCommand::SetStance(Stance::Defend)),
            (6000, MatchCommand::Cast(Ability::Frost)),
            (6100, MatchCommand::Spawn { unit: "giant".into() }),
        ];
        for (at, command) in script {
            scheduler.run_until(&mut sim, at);
            let _ = sim.apply(&command);
            replay.record(sim.now(), command);
        }
        scheduler.run_until(&mut sim, 12_000);
        replay.finalize(&sim);
        replay
    }

    #[test]
    fn test_replay_verifies() {
        let replay = record_match();
        assert_eq!(replay.command_count(), 6);
        assert_eq!(replay.verify().unwrap(), replay.final_hash);
    }

    #[test]
    fn test_tampered_replay_desyncs() {
        let mut replay = record_match();
        replay.commands.remove(2);
        assert!(matches!(
            replay.verify(),
            Err(GameError::DesyncDetected { .. })
        ));
    }

    #[test]
    fn test_replay_file_roundtrip() {
        let replay = record_match();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("match.replay");
        replay.save(&path).unwrap();
        let loaded = Replay::load(&path).unwrap();
        assert_eq!(loaded.final_hash, replay.final_hash);
        assert_eq!(loaded.commands, replay.commands);
        loaded.verify().unwrap();
    }

    #[test]
    fn test_version_mismatch_rejected() {
        let mut replay = record_match();
        replay.version = REPLAY_VERSION + 1;
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("old.replay");
        replay.save(&path).unwrap();
        assert!(Replay::load(&path).is_err());
    }
}
