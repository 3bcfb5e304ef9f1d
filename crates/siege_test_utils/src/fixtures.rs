//! Match fixtures for tests and benchmarks.
//!
//! Every fixture goes through the public command surface, so a fixture
//! match is always one a real player could have reached.

use siege_core::abilities::Ability;
use siege_core::components::{EntityId, Millis};
use siege_core::faction::Faction;
use siege_core::math::Fixed;
use siege_core::scheduler::Scheduler;
use siege_core::simulation::{Phase, SimConfig, Simulation};

/// An eight-unit army that includes the miner.
pub const STANDARD_ARMY: [&str; 8] = [
    "miner", "sword", "archidon", "spearton", "zombie", "ninja", "bomber", "giant",
];

/// Ability pair used by most fixtures.
pub const STANDARD_LOADOUT: [Ability; 2] = [Ability::Firestorm, Ability::Frost];

/// [`STANDARD_ARMY`] as owned strings.
#[must_use]
pub fn standard_army() -> Vec<String> {
    STANDARD_ARMY.iter().map(|s| (*s).to_string()).collect()
}

/// A match that has confirmed its army but is still in the intro.
///
/// # Panics
///
/// Panics if the standard army is rejected.
#[must_use]
pub fn confirmed_match(seed: u64) -> Simulation {
    confirmed_match_with(seed, &STANDARD_LOADOUT)
}

/// Like [`confirmed_match`] with a chosen loadout.
///
/// # Panics
///
/// Panics if the army or loadout is rejected.
#[must_use]
pub fn confirmed_match_with(seed: u64, loadout: &[Ability]) -> Simulation {
    let mut sim = Simulation::new(SimConfig::with_seed(seed));
    sim.confirm_army(&standard_army(), loadout)
        .expect("standard army is valid");
    sim
}

/// A match in the playing phase at clock 0, with no timers involved.
#[must_use]
pub fn playing_match(seed: u64) -> Simulation {
    let mut sim = confirmed_match(seed);
    sim.begin_play();
    sim
}

/// A playing match with `loadout`.
#[must_use]
pub fn playing_match_with(seed: u64, loadout: &[Ability]) -> Simulation {
    let mut sim = confirmed_match_with(seed, loadout);
    sim.begin_play();
    sim
}

/// A match driven through its intro by a scheduler.
///
/// Returns the scheduler so callers can keep driving the same timers.
#[must_use]
pub fn scheduled_match(seed: u64) -> (Simulation, Scheduler) {
    let mut sim = confirmed_match(seed);
    let mut scheduler = Scheduler::new();
    let Phase::StageIntro { ends_at } = sim.phase() else {
        return (sim, scheduler);
    };
    scheduler.run_until(&mut sim, ends_at);
    (sim, scheduler)
}

/// Spawn a unit with unlimited gold and place it at lane `x`.
///
/// # Panics
///
/// Panics if the spawn is rejected.
pub fn spawn_at(sim: &mut Simulation, template: &str, faction: Faction, x: i32) -> EntityId {
    let gold = sim.gold(faction);
    sim.set_gold(faction, u32::MAX / 2);
    let id = sim
        .spawn_unit(template, faction)
        .expect("fixture spawn succeeds");
    sim.set_gold(faction, gold);
    sim.teleport(id, Fixed::from_num(x));
    id
}

/// Tick `count` frames, stepping the clock by `frame_ms` before each.
pub fn tick_frames(sim: &mut Simulation, count: u64, frame_ms: Millis) {
    for _ in 0..count {
        let next = sim.now() + frame_ms;
        sim.advance_to(next);
        sim.tick();
    }
}

/// A busy mid-game battle used by determinism tests.
#[must_use]
pub fn skirmish(seed: u64) -> Simulation {
    let mut sim = playing_match(seed);
    sim.advance_to(2000);
    for (i, unit) in ["sword", "archidon", "spearton", "zombie", "miner"]
        .iter()
        .enumerate()
    {
        let offset = i as i32 * 15;
        spawn_at(&mut sim, unit, Faction::Player, 450 + offset);
        spawn_at(&mut sim, unit, Faction::Opponent, 650 - offset);
    }
    sim
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_playing_match_is_playing() {
        let sim = playing_match(1);
        assert_eq!(sim.phase(), Phase::Playing);
        assert_eq!(sim.loadout(), &STANDARD_LOADOUT);
    }

    #[test]
    fn test_scheduled_match_reaches_play() {
        let (sim, scheduler) = scheduled_match(1);
        assert_eq!(sim.phase(), Phase::Playing);
        assert!(scheduler.is_running());
    }

    #[test]
    fn test_spawn_at_preserves_gold() {
        let mut sim = playing_match(1);
        let id = spawn_at(&mut sim, "giant", Faction::Player, 640);
        assert_eq!(sim.gold(Faction::Player), 500);
        assert_eq!(sim.entity(id).unwrap().x(), Fixed::from_num(640));
    }

    #[test]
    fn test_skirmish_has_both_sides() {
        let sim = skirmish(5);
        assert_eq!(sim.entities().len(), 10);
    }
}
