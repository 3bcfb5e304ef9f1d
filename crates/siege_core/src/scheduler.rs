//! Run-to-completion timer queue that drives a match.
//!
//! The frame tick, the opponent director, the buff countdown and the stage
//! intro each run as a task on one virtual millisecond clock. Tasks are
//! ordered by due time, then by the order they were queued, and each runs
//! to completion before the next starts. Periodic tasks exist only while
//! the match is playing.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use tracing::debug;

use crate::components::Millis;
use crate::director::{self, DirectorDecision};
use crate::simulation::{Phase, Simulation, TickEvents, BUFF_DECAY_STEP_MS};

/// A unit of scheduled work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Task {
    /// One simulation tick.
    Frame,
    /// One opponent director activation.
    Director,
    /// One buff countdown step.
    BuffCountdown,
    /// End of the stage intro.
    StageIntroEnd,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct Scheduled {
    due: Millis,
    seq: u64,
    task: Task,
}

/// Everything that happened while running the queue.
#[derive(Debug, Clone, Default)]
pub struct RunReport {
    /// Events of every tick, in order.
    pub ticks: Vec<TickEvents>,
    /// Every director activation, in order.
    pub director: Vec<DirectorDecision>,
}

/// Timer queue over a virtual clock.
#[derive(Debug, Clone, Default)]
pub struct Scheduler {
    queue: BinaryHeap<Reverse<Scheduled>>,
    seq: u64,
    periodic_armed: bool,
    intro_armed: Option<Millis>,
}

impl Scheduler {
    /// Create an empty scheduler.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of pending tasks.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Due time of the next task.
    #[must_use]
    pub fn next_due(&self) -> Option<Millis> {
        self.queue.peek().map(|Reverse(s)| s.due)
    }

    /// Whether the periodic timers are armed.
    #[must_use]
    pub const fn is_running(&self) -> bool {
        self.periodic_armed
    }

    fn push(&mut self, due: Millis, task: Task) {
        let seq = self.seq;
        self.seq += 1;
        self.queue.push(Reverse(Scheduled { due, seq, task }));
    }

    fn clear(&mut self) {
        if !self.queue.is_empty() {
            debug!(dropped = self.queue.len(), "timers torn down");
        }
        self.queue.clear();
        self.periodic_armed = false;
        self.intro_armed = None;
    }

    /// Arm or tear down timers to match the simulation phase.
    pub fn sync(&mut self, sim: &Simulation) {
        let now = sim.now();
        match sim.phase() {
            Phase::Playing => {
                if !self.periodic_armed {
                    self.clear();
                    self.push(now + sim.config().frame_interval_ms.max(1), Task::Frame);
                    self.push(now + director::period_ms(sim.stage()), Task::Director);
                    self.push(now + BUFF_DECAY_STEP_MS, Task::BuffCountdown);
                    self.periodic_armed = true;
                }
            }
            Phase::StageIntro { ends_at } => {
                if self.periodic_armed || self.intro_armed != Some(ends_at) {
                    self.clear();
                    self.push(ends_at, Task::StageIntroEnd);
                    self.intro_armed = Some(ends_at);
                }
            }
            Phase::SelectingArmy | Phase::Over { .. } => self.clear(),
        }
    }

    /// Run every task due at or before `until`, then set the clock to `until`.
    pub fn run_until(&mut self, sim: &mut Simulation, until: Millis) -> RunReport {
        let mut report = RunReport::default();
        self.sync(sim);
        while let Some(Reverse(next)) = self.queue.peek().copied() {
            if next.due > until {
                break;
            }
            self.queue.pop();
            sim.advance_to(next.due);
            self.run_task(sim, next.task, &mut report);
            self.sync(sim);
        }
        sim.advance_to(until);
        report
    }

    /// Run for `duration` past the current clock.
    pub fn run_for(&mut self, sim: &mut Simulation, duration: Millis) -> RunReport {
        let until = sim.now().saturating_add(duration);
        self.run_until(sim, until)
    }

    fn run_task(&mut self, sim: &mut Simulation, task: Task, report: &mut RunReport) {
        let now = sim.now();
        match task {
            Task::Frame => {
                report.ticks.push(sim.tick());
                if sim.phase().is_playing() {
                    self.push(now + sim.config().frame_interval_ms.max(1), Task::Frame);
                }
            }
            Task::Director => {
                report.director.push(director::activate(sim));
                if sim.phase().is_playing() {
                    self.push(now + director::period_ms(sim.stage()), Task::Director);
                }
            }
            Task::BuffCountdown => {
                sim.decay_buff();
                if sim.phase().is_playing() {
                    self.push(now + BUFF_DECAY_STEP_MS, Task::BuffCountdown);
                }
            }
            Task::StageIntroEnd => {
                self.intro_armed = None;
                sim.begin_play();
            }
        }
    }
}
