//! Error type for the headless runner.

use siege_core::error::GameError;
use thiserror::Error;

use crate::strategies::StrategyError;

/// Failures that stop a session, match or batch.
#[derive(Debug, Error)]
pub enum HeadlessError {
    /// Strategy could not be loaded.
    #[error(transparent)]
    Strategy(#[from] StrategyError),

    /// Simulation-level failure (catalog, serialization, replay).
    #[error(transparent)]
    Game(#[from] GameError),

    /// Reading input or writing output failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Results could not be encoded or decoded.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
