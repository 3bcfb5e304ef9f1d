//! Headless match runner for scripted play and CI verification.
//!
//! This crate drives [`siege_core`] without any presentation layer:
//!
//! - **Interactive control**: a controller plays over JSON lines on stdin/stdout
//! - **Scripted play**: RON strategies pilot the player side against the director
//! - **Balance runs**: many seeded matches in parallel with an aggregate summary
//! - **Determinism checks**: repeated seeds and recorded replays must agree
//!
//! # Protocol
//!
//! Communication uses JSON lines (one JSON object per line):
//!
//! - **stdin**: Commands from the controller (advance, spawn, cast, ...)
//! - **stdout**: Responses and state (JSON)
//! - **stderr**: Logs (human-readable)
//!
//! See [`protocol`] module for the full command/response reference.
//!
//! # Example
//!
//! ```bash
//! # Run interactively
//! echo '{"cmd":"advance","ms":1000}' | cargo run -p siege_headless
//!
//! # Balance run with the rush strategy
//! cargo run -p siege_headless -- batch --strategy rush --count 200
//!
//! # Verify a saved replay
//! cargo run -p siege_headless -- replay --file match.replay
//! ```

pub mod batch;
pub mod error;
pub mod game_runner;
pub mod metrics;
pub mod protocol;
pub mod runner;
pub mod strategies;

pub use batch::{run_batch, verify_determinism, BatchConfig, BatchResults, DeterminismReport};
pub use error::HeadlessError;
pub use game_runner::{run_match, MatchConfig, MatchOutcome};
pub use metrics::{BatchSummary, MatchMetrics};
pub use protocol::{Command, Response};
pub use runner::{HeadlessConfig, HeadlessRunner, Session};
pub use strategies::{Strategy, StrategyExecutor};
