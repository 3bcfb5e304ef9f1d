//! Determinism testing utilities.
//!
//! Provides a harness for verifying that the simulation produces identical
//! results given identical inputs.
//!
//! # Testing Strategy
//!
//! A seeded match must replay bit-for-bit. Sources of non-determinism include:
//!
//! - **Floating-point math**: lane positions use [`siege_core::math::Fixed`].
//! - **HashMap iteration order**: the entity store is a `Vec` in insertion
//!   order and the damage ledger is a `BTreeMap`.
//! - **System randomness**: spawn jitter and the director draw from a
//!   seeded ChaCha stream stored inside the simulation.
//! - **Wall clock**: time is passed in as integer milliseconds.

use std::thread;

use siege_core::components::Millis;
use siege_core::scheduler::Scheduler;
use siege_core::simulation::Simulation;

/// Result of a determinism test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeterminismResult {
    /// Whether all runs produced identical results.
    pub is_deterministic: bool,
    /// Hashes from each run.
    pub hashes: Vec<u64>,
    /// Number of steps simulated.
    pub steps: u64,
}

impl DeterminismResult {
    /// Get all unique hashes (should be 1 for a deterministic simulation).
    #[must_use]
    pub fn unique_hashes(&self) -> Vec<u64> {
        let mut unique: Vec<u64> = self.hashes.clone();
        unique.sort_unstable();
        unique.dedup();
        unique
    }

    /// Assert that the simulation was deterministic, with a detailed error message.
    ///
    /// # Panics
    ///
    /// Panics if the simulation produced different hashes across runs.
    pub fn assert_deterministic(&self) {
        if !self.is_deterministic {
            let unique = self.unique_hashes();
            panic!(
                "Simulation is non-deterministic!\n\
                 Runs: {}\n\
                 Steps: {}\n\
                 Unique hashes: {} (expected 1)\n\
                 All hashes: {:?}",
                self.hashes.len(),
                self.steps,
                unique.len(),
                self.hashes
            );
        }
    }
}

/// Run a state machine multiple times and verify determinism.
///
/// # Arguments
///
/// * `runs` - Number of times to run
/// * `steps` - Number of steps per run
/// * `setup` - Creates the initial state
/// * `step` - Advances the state by one step
/// * `hash` - Computes the state hash
pub fn verify_determinism<S, Setup, Step, HashFn>(
    runs: usize,
    steps: u64,
    setup: Setup,
    step: Step,
    hash: HashFn,
) -> DeterminismResult
where
    Setup: Fn() -> S,
    Step: Fn(&mut S),
    HashFn: Fn(&S) -> u64,
{
    let mut hashes = Vec::with_capacity(runs);

    for _ in 0..runs {
        let mut state = setup();
        for _ in 0..steps {
            step(&mut state);
        }
        hashes.push(hash(&state));
    }

    let is_deterministic = hashes.windows(2).all(|w| w[0] == w[1]);

    DeterminismResult {
        is_deterministic,
        hashes,
        steps,
    }
}

/// Drive a match through a fresh scheduler for `duration` and hash it.
pub fn run_scheduled(mut sim: Simulation, duration: Millis) -> u64 {
    let mut scheduler = Scheduler::new();
    scheduler.run_for(&mut sim, duration);
    sim.state_hash()
}

/// Run N scheduled matches on scoped threads and collect their hashes.
///
/// # Panics
///
/// Panics if a worker thread panics.
pub fn run_parallel_matches<F>(setup_fn: F, num_sims: usize, duration: Millis) -> Vec<u64>
where
    F: Fn() -> Simulation + Sync,
{
    thread::scope(|s| {
        let handles: Vec<_> = (0..num_sims)
            .map(|_| s.spawn(|| run_scheduled(setup_fn(), duration)))
            .collect();

        handles
            .into_iter()
            .map(|h| h.join().expect("simulation thread panicked"))
            .collect()
    })
}

/// Compare two scheduled runs step by step, finding the first divergence.
///
/// Each step advances both matches by `step_ms`.
///
/// # Returns
///
/// `None` if the runs agree, `Some(step)` at the first step whose hashes differ.
pub fn find_first_divergence<F>(setup_fn: F, steps: u64, step_ms: Millis) -> Option<u64>
where
    F: Fn() -> Simulation,
{
    let mut sim1 = setup_fn();
    let mut sim2 = setup_fn();
    let mut sched1 = Scheduler::new();
    let mut sched2 = Scheduler::new();

    if sim1.state_hash() != sim2.state_hash() {
        return Some(0);
    }

    for step in 1..=steps {
        sched1.run_for(&mut sim1, step_ms);
        sched2.run_for(&mut sim2, step_ms);

        if sim1.state_hash() != sim2.state_hash() {
            return Some(step);
        }
    }

    None
}

/// Verify that a serialization round-trip preserves state exactly, and that
/// the restored match keeps evolving identically.
pub fn verify_serialization_determinism<F>(setup_fn: F, duration: Millis) -> bool
where
    F: Fn() -> Simulation,
{
    let mut sim = setup_fn();
    let mut scheduler = Scheduler::new();
    scheduler.run_for(&mut sim, duration);

    let Ok(bytes) = sim.serialize() else {
        return false;
    };
    let Ok(restored) = Simulation::deserialize(&bytes) else {
        return false;
    };
    if restored.state_hash() != sim.state_hash() {
        return false;
    }

    run_scheduled(sim, duration) == run_scheduled(restored, duration)
}

/// Proptest strategies for simulation testing.
pub mod strategies {
    use proptest::prelude::*;
    use siege_core::abilities::Ability;
    use siege_core::catalog::UnitCatalog;
    use siege_core::components::Stance;
    use siege_core::economy::UpgradeTrack;
    use siege_core::lane::LANE_WIDTH;
    use siege_core::replay::MatchCommand;

    /// Any unit id from the built-in roster.
    pub fn arb_unit_id() -> impl Strategy<Value = String> {
        let ids: Vec<String> = UnitCatalog::standard()
            .units
            .into_iter()
            .map(|u| u.id)
            .collect();
        proptest::sample::select(ids)
    }

    /// Any lane x-coordinate.
    pub fn arb_lane_x() -> impl Strategy<Value = i32> {
        0..=LANE_WIDTH
    }

    /// Any stance.
    pub fn arb_stance() -> impl Strategy<Value = Stance> {
        prop_oneof![
            Just(Stance::Attack),
            Just(Stance::Defend),
            Just(Stance::Garrison),
        ]
    }

    /// Any ability.
    pub fn arb_ability() -> impl Strategy<Value = Ability> {
        proptest::sample::select(Ability::ALL.to_vec())
    }

    /// Any upgrade track, including the unpurchasable one.
    pub fn arb_upgrade_track() -> impl Strategy<Value = UpgradeTrack> {
        prop_oneof![
            Just(UpgradeTrack::Damage),
            Just(UpgradeTrack::Health),
            Just(UpgradeTrack::Mining),
        ]
    }

    /// A player command a human could issue mid-battle.
    pub fn arb_battle_command() -> impl Strategy<Value = MatchCommand> {
        prop_oneof![
            4 => arb_unit_id().prop_map(|unit| MatchCommand::Spawn { unit }),
            2 => arb_stance().prop_map(MatchCommand::SetStance),
            1 => arb_ability().prop_map(MatchCommand::Cast),
            1 => arb_upgrade_track().prop_map(MatchCommand::BuyUpgrade),
            1 => (proptest::collection::vec(1u64..40, 1..4), arb_lane_x())
                .prop_map(|(ids, x)| MatchCommand::OrderMove { ids, x }),
        ]
    }

    /// A script of `(delay_ms, command)` pairs.
    pub fn arb_command_script(
        max_len: usize,
    ) -> impl Strategy<Value = Vec<(u64, MatchCommand)>> {
        proptest::collection::vec((0u64..2000, arb_battle_command()), 0..max_len)
    }
}

#[cfg(test)]
mod tests {
    use super::strategies::*;
    use super::*;
    use crate::fixtures;
    use proptest::prelude::*;
    use siege_core::faction::Faction;

    #[test]
    fn test_verify_determinism_simple() {
        let result = verify_determinism(3, 100, || 0u64, |s| *s += 1, |s| *s);
        result.assert_deterministic();
        assert_eq!(result.unique_hashes(), vec![100]);
    }

    #[test]
    fn test_skirmish_is_deterministic() {
        let result = verify_determinism(
            3,
            300,
            || fixtures::skirmish(17),
            |sim| fixtures::tick_frames(sim, 1, 16),
            Simulation::state_hash,
        );
        result.assert_deterministic();
    }

    #[test]
    fn test_scheduled_match_has_no_divergence() {
        assert_eq!(
            find_first_divergence(|| fixtures::confirmed_match(8), 40, 500),
            None
        );
    }

    #[test]
    fn test_serialization_preserves_running_match() {
        assert!(verify_serialization_determinism(
            || fixtures::confirmed_match(21),
            8000
        ));
    }

    #[test]
    fn test_parallel_matches_agree() {
        let hashes = run_parallel_matches(|| fixtures::confirmed_match(4), 4, 15_000);
        assert!(hashes.windows(2).all(|w| w[0] == w[1]));
    }

    #[test]
    fn test_different_seeds_diverge() {
        let a = run_scheduled(fixtures::confirmed_match(1), 20_000);
        let b = run_scheduled(fixtures::confirmed_match(2), 20_000);
        assert_ne!(a, b);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(16))]

        #[test]
        fn prop_command_scripts_are_reproducible(
            seed in any::<u64>(),
            script in arb_command_script(20),
        ) {
            let run = || {
                let (mut sim, mut scheduler) = fixtures::scheduled_match(seed);
                sim.set_gold(Faction::Player, 5000);
                for (delay, command) in &script {
                    scheduler.run_for(&mut sim, *delay);
                    let _ = sim.apply(command);
                }
                scheduler.run_for(&mut sim, 1000);
                sim.state_hash()
            };
            prop_assert_eq!(run(), run());
        }
    }
}
