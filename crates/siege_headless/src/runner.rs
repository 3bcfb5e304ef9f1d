//! Interactive JSON-lines session.
//!
//! One [`Session`] owns a simulation, its scheduler and a replay of every
//! state-changing command. [`HeadlessRunner`] feeds it lines from any reader
//! and writes responses to any writer, so the same loop serves stdin/stdout
//! and in-memory tests.

use std::io::{BufRead, Write};
use std::path::PathBuf;

use siege_core::catalog::UnitCatalog;
use siege_core::faction::Faction;
use siege_core::replay::{MatchCommand, Replay};
use siege_core::scheduler::Scheduler;
use siege_core::simulation::{SimConfig, Simulation};
use siege_core::snapshot::GameSnapshot;
use tracing::{debug, info, warn};

use crate::error::HeadlessError;
use crate::protocol::{Command, MatchState, Response};

/// Headless runner configuration.
#[derive(Debug, Clone, Default)]
pub struct HeadlessConfig {
    /// Simulation seed.
    pub seed: u64,
    /// Alternative unit roster (RON).
    pub catalog_path: Option<PathBuf>,
    /// Write the session replay here when the session ends.
    pub replay_path: Option<PathBuf>,
}

/// Simulation, timers and recording for one controller.
#[derive(Debug)]
pub struct Session {
    sim: Simulation,
    scheduler: Scheduler,
    replay: Replay,
    game_over_reported: bool,
    finished: bool,
}

impl Session {
    /// Start a session on a fresh match.
    pub fn new(seed: u64, catalog: Option<UnitCatalog>) -> Result<Self, HeadlessError> {
        let config = SimConfig::with_seed(seed);
        let sim = match catalog {
            Some(catalog) => Simulation::with_catalog(config, catalog),
            None => Simulation::new(config),
        };
        let replay = Replay::new(&sim)?;
        Ok(Self {
            sim,
            scheduler: Scheduler::new(),
            replay,
            game_over_reported: false,
            finished: false,
        })
    }

    /// The simulation being driven.
    #[must_use]
    pub fn simulation(&self) -> &Simulation {
        &self.sim
    }

    /// Whether `quit` has been received.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// The replay recorded so far, finalized at the current state.
    #[must_use]
    pub fn replay(&self) -> Replay {
        let mut replay = self.replay.clone();
        replay.finalize(&self.sim);
        replay
    }

    /// The opening line of the session.
    #[must_use]
    pub fn ready(&self) -> Response {
        Response::ready(self.sim.config().seed, self.sim.now())
    }

    /// Current state in protocol form.
    #[must_use]
    pub fn state(&self) -> Response {
        let snapshot = GameSnapshot::capture(&self.sim);
        Response::State(Box::new(MatchState::from_snapshot(
            &snapshot,
            self.sim.state_hash(),
        )))
    }

    /// Handle one parsed command.
    pub fn handle(&mut self, command: Command) -> Vec<Response> {
        let name = command.name();
        let mut responses = Vec::new();
        match command {
            Command::Advance { ms } => {
                let report = self.scheduler.run_for(&mut self.sim, ms);
                debug!(ms, ticks = report.ticks.len(), now = self.sim.now(), "advanced");
                responses.push(self.state());
            }
            Command::Query => responses.push(self.state()),
            Command::Hash => responses.push(Response::StateHash {
                now: self.sim.now(),
                hash: self.sim.state_hash(),
            }),
            Command::Spawn { unit } => {
                let result = self.sim.spawn_unit(&unit, Faction::Player);
                self.replay
                    .record(self.sim.now(), MatchCommand::Spawn { unit: unit.clone() });
                responses.push(match result {
                    Ok(entity_id) => Response::Spawned { entity_id, unit },
                    Err(rejection) => Response::rejected(name, rejection),
                });
            }
            Command::SaveReplay { path } => match self.replay().save(&path) {
                Ok(()) => {
                    info!(path = %path, commands = self.replay.command_count(), "replay saved");
                    responses.push(Response::ack(name));
                }
                Err(e) => responses.push(Response::error(e.to_string(), Some(name))),
            },
            Command::Quit => {
                self.finished = true;
                responses.push(Response::Bye);
                return responses;
            }
            other => {
                if let Some(match_command) = to_match_command(other) {
                    responses.push(self.apply(name, match_command));
                }
            }
        }

        match self.sim.phase().winner() {
            Some(winner) if !self.game_over_reported => {
                self.game_over_reported = true;
                responses.push(Response::GameOver {
                    winner,
                    stage: self.sim.stage(),
                    now: self.sim.now(),
                });
            }
            Some(_) => {}
            None => self.game_over_reported = false,
        }
        responses
    }

    fn apply(&mut self, name: &str, command: MatchCommand) -> Response {
        let result = self.sim.apply(&command);
        self.replay.record(self.sim.now(), command);
        match result {
            Ok(()) => Response::ack(name),
            Err(rejection) => Response::rejected(name, rejection),
        }
    }
}

fn to_match_command(command: Command) -> Option<MatchCommand> {
    Some(match command {
        Command::Spawn { unit } => MatchCommand::Spawn { unit },
        Command::Stance { stance } => MatchCommand::SetStance(stance),
        Command::Cast { ability } => MatchCommand::Cast(ability),
        Command::Upgrade { track } => MatchCommand::BuyUpgrade(track),
        Command::ConfirmArmy { units, abilities } => MatchCommand::ConfirmArmy { units, abilities },
        Command::AdvanceStage => MatchCommand::AdvanceStage,
        Command::Restart => MatchCommand::Restart,
        Command::Move { ids, x } => MatchCommand::OrderMove { ids, x },
        Command::SetGold { amount, faction } => MatchCommand::SetGold {
            faction: faction.unwrap_or(Faction::Player),
            amount,
        },
        Command::GrantBuff { ms } => MatchCommand::GrantBuff { ms },
        Command::Advance { .. }
        | Command::Query
        | Command::Hash
        | Command::SaveReplay { .. }
        | Command::Quit => return None,
    })
}

/// Headless runner for controller-driven play.
pub struct HeadlessRunner {
    config: HeadlessConfig,
}

impl HeadlessRunner {
    /// Create a runner with custom configuration.
    pub fn with_config(config: HeadlessConfig) -> Self {
        Self { config }
    }

    /// Run a session over stdin/stdout.
    pub fn run(&self) -> Result<Session, HeadlessError> {
        let stdin = std::io::stdin();
        let stdout = std::io::stdout();
        self.run_with(stdin.lock(), stdout.lock())
    }

    /// Run a session over any line reader and writer.
    ///
    /// Returns when the input ends or `quit` is received.
    pub fn run_with<R: BufRead, W: Write>(
        &self,
        input: R,
        mut output: W,
    ) -> Result<Session, HeadlessError> {
        let catalog = match &self.config.catalog_path {
            Some(path) => Some(UnitCatalog::load(path)?),
            None => None,
        };
        let mut session = Session::new(self.config.seed, catalog)?;
        info!(seed = self.config.seed, "Starting interactive session");

        write_response(&mut output, &session.ready())?;
        for line in input.lines() {
            let line = line?;
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            match Command::from_json(line) {
                Ok(command) => {
                    for response in session.handle(command) {
                        write_response(&mut output, &response)?;
                    }
                }
                Err(e) => {
                    warn!(error = %e, "unparseable command");
                    let error = Response::error(format!("Parse error: {e}"), None);
                    write_response(&mut output, &error)?;
                }
            }
            if session.is_finished() {
                break;
            }
        }

        if let Some(path) = &self.config.replay_path {
            session.replay().save(path)?;
            info!(path = %path.display(), "replay written");
        }
        Ok(session)
    }
}

fn write_response<W: Write>(output: &mut W, response: &Response) -> Result<(), HeadlessError> {
    output.write_all(response.to_json_line().as_bytes())?;
    output.flush()?;
    Ok(())
}
