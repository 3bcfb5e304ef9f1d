//! Error types for the game simulation.

use thiserror::Error;

use crate::abilities::Ability;
use crate::components::Millis;
use crate::economy::UpgradeTrack;

/// Result type alias using [`GameError`].
pub type Result<T> = std::result::Result<T, GameError>;

/// Top-level error type for failures outside the command surface.
#[derive(Debug, Error)]
pub enum GameError {
    /// Failed to load or validate a unit catalog.
    #[error("Failed to load unit catalog: {0}")]
    CatalogLoadError(String),

    /// Data file parsing error.
    #[error("Failed to parse data file '{path}': {message}")]
    DataParseError {
        /// Path to the file that failed to parse.
        path: String,
        /// Error message.
        message: String,
    },

    /// A unit id that the catalog does not define.
    #[error("Unknown unit template: {0}")]
    UnknownTemplate(String),

    /// Invalid game state.
    #[error("Invalid game state: {0}")]
    InvalidState(String),

    /// Replay playback diverged from the recorded result.
    #[error("Desync detected at {at_ms}ms: recorded hash {recorded_hash}, replayed hash {replayed_hash}")]
    DesyncDetected {
        /// Clock time where the comparison was made.
        at_ms: Millis,
        /// Hash stored in the replay.
        recorded_hash: u64,
        /// Hash produced by playback.
        replayed_hash: u64,
    },
}

/// Reason a command was refused.
///
/// A rejected command never changes the game state, so ignoring the
/// returned error is equivalent to a silent no-op.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Rejection {
    /// Not enough gold for the purchase.
    #[error("Insufficient gold: need {required}, have {available}")]
    InsufficientGold {
        /// Amount required.
        required: u32,
        /// Amount available.
        available: u32,
    },

    /// Ability is still cooling down.
    #[error("{ability:?} is on cooldown until {ready_at}ms")]
    OnCooldown {
        /// The ability that was cast.
        ability: Ability,
        /// Clock time at which it becomes usable.
        ready_at: Millis,
    },

    /// Ability was not chosen in the loadout.
    #[error("{0:?} is not in the selected loadout")]
    NotInLoadout(Ability),

    /// Unit id not present in the catalog.
    #[error("Unknown unit: {0}")]
    UnknownUnit(String),

    /// Unit exists but the player has not unlocked it.
    #[error("Unit not unlocked: {0}")]
    Locked(String),

    /// Army selection did not have the required shape.
    #[error("Invalid loadout: {0}")]
    InvalidLoadout(String),

    /// Command is not valid in the current match phase.
    #[error("Command not valid during {0}")]
    WrongPhase(&'static str),

    /// Upgrade track has no purchase path.
    #[error("Upgrade track {0:?} cannot be purchased")]
    UnpurchasableTrack(UpgradeTrack),
}
