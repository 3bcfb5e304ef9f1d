//! Faction identifiers.

use serde::{Deserialize, Serialize};

/// One of the two sides of the lane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Faction {
    /// The human-controlled side, based on the left of the lane.
    Player,
    /// The director-controlled side, based on the right of the lane.
    Opponent,
}

impl Faction {
    /// Both factions in a fixed order.
    pub const ALL: [Self; 2] = [Self::Player, Self::Opponent];

    /// The other side.
    #[must_use]
    pub const fn enemy(self) -> Self {
        match self {
            Self::Player => Self::Opponent,
            Self::Opponent => Self::Player,
        }
    }

    /// Whether this is the player's side.
    #[must_use]
    pub const fn is_player(self) -> bool {
        matches!(self, Self::Player)
    }

    /// Get the display name for this faction.
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Player => "Player",
            Self::Opponent => "Opponent",
        }
    }

    /// Direction of advance along the lane (+1 rightwards, -1 leftwards).
    #[must_use]
    pub const fn advance_sign(self) -> i32 {
        match self {
            Self::Player => 1,
            Self::Opponent => -1,
        }
    }
}
