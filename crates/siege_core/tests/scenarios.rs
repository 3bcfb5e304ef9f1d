//! End-to-end scenarios through the public command surface.

use siege_core::director::{self, DirectorDecision};
use siege_core::prelude::*;
use siege_test_utils::fixtures::{self, spawn_at, tick_frames};

#[test]
fn exact_gold_buys_a_miner() {
    let mut sim = fixtures::playing_match(1);
    sim.set_gold(Faction::Player, 150);
    let id = sim.spawn_unit("miner", Faction::Player).unwrap();
    assert_eq!(sim.gold(Faction::Player), 0);
    let miner = sim.entity(id).unwrap();
    assert_eq!(miner.cargo, 0);
    assert_eq!(miner.state, UnitState::Idle);
    assert_eq!(miner.class, UnitClass::Miner);
}

#[test]
fn unaffordable_purchases_change_nothing() {
    let mut sim = fixtures::playing_match(2);
    sim.set_gold(Faction::Player, 399);
    let before = sim.state_hash();
    assert!(sim.spawn_unit("giant", Faction::Player).is_err());
    assert!(sim.buy_upgrade(UpgradeTrack::Damage).is_err());
    assert!(sim.buy_upgrade(UpgradeTrack::Health).is_err());
    assert_eq!(sim.state_hash(), before);
    assert_eq!(sim.gold(Faction::Player), 399);
    assert_eq!(*sim.upgrades(), Upgrades::default());
}

#[test]
fn spawned_stats_include_faction_bonus() {
    let mut sim = fixtures::playing_match(3);
    sim.set_gold(Faction::Player, 10_000);
    sim.buy_upgrade(UpgradeTrack::Damage).unwrap();
    sim.buy_upgrade(UpgradeTrack::Health).unwrap();
    sim.buy_upgrade(UpgradeTrack::Health).unwrap();
    let template = sim.catalog().get("spearton").unwrap().stats;

    let player = sim.spawn_unit("spearton", Faction::Player).unwrap();
    let stats = sim.entity(player).unwrap().stats;
    assert_eq!(stats.damage, template.damage + 8);
    assert_eq!(stats.max_health, template.max_health + 120);
    assert_eq!(sim.entity(player).unwrap().health.current, stats.max_health);

    sim.set_gold(Faction::Opponent, 10_000);
    let opponent = sim.spawn_unit("spearton", Faction::Opponent).unwrap();
    let stats = sim.entity(opponent).unwrap().stats;
    assert_eq!(stats.damage, template.damage + 2);
    assert_eq!(stats.max_health, template.max_health + 25);
}

#[test]
fn adjacent_attacker_finishes_weak_base() {
    let mut sim = fixtures::playing_match(4);
    sim.advance_to(5000);
    sim.set_base_health(Faction::Opponent, 25);
    let id = spawn_at(&mut sim, "sword", Faction::Player, 1050);
    sim.entity_mut(id).unwrap().stats.damage = 30;

    let events = sim.tick();
    assert!(sim.base_health(Faction::Opponent).is_dead());
    assert_eq!(events.base_damage.opponent, 30);
    assert_eq!(events.winner, Some(Faction::Player));
    assert_eq!(
        sim.phase(),
        Phase::Over {
            winner: Faction::Player
        }
    );
}

#[test]
fn frost_holds_opponents_until_expiry() {
    let mut sim = fixtures::playing_match_with(5, &[Ability::Frost, Ability::Purge]);
    sim.advance_to(1000);
    let sword = spawn_at(&mut sim, "sword", Faction::Player, 600);
    let giants: Vec<EntityId> = [620, 640, 660]
        .iter()
        .map(|&x| spawn_at(&mut sim, "giant", Faction::Opponent, x))
        .collect();

    let effect = sim.cast_ability(Ability::Frost).unwrap();
    assert_eq!(effect.frozen, giants);
    for id in &giants {
        let giant = sim.entity(*id).unwrap();
        assert_eq!(giant.state, UnitState::Frozen);
        assert_eq!(giant.frozen_until, Some(7000));
    }
    let positions: Vec<Fixed> = giants.iter().map(|id| sim.entity(*id).unwrap().x()).collect();

    // Up to and including the expiry timestamp nothing moves or attacks.
    while sim.now() < 7000 {
        let next = (sim.now() + 16).min(7000);
        sim.advance_to(next);
        sim.tick();
        for (id, x) in giants.iter().zip(&positions) {
            let giant = sim.entity(*id).unwrap();
            assert_eq!(giant.state, UnitState::Frozen);
            assert_eq!(giant.x(), *x);
        }
        assert_eq!(sim.entity(sword).unwrap().health.current, 100);
    }

    sim.advance_to(7001);
    sim.tick();
    for id in &giants {
        assert_eq!(sim.entity(*id).unwrap().state, UnitState::Idle);
    }
}

#[test]
fn cooldown_cast_is_a_no_op() {
    let mut sim = fixtures::playing_match(6);
    spawn_at(&mut sim, "zombie", Faction::Opponent, 800);
    sim.cast_ability(Ability::Firestorm).unwrap();
    sim.advance_to(10_000);
    spawn_at(&mut sim, "giant", Faction::Opponent, 900);

    let before = sim.state_hash();
    let entities = sim.entities().to_vec();
    let gold = sim.gold(Faction::Player);
    assert!(matches!(
        sim.cast_ability(Ability::Firestorm),
        Err(Rejection::OnCooldown {
            ability: Ability::Firestorm,
            ready_at: 20_000
        })
    ));
    assert_eq!(sim.entities(), entities.as_slice());
    assert_eq!(sim.gold(Faction::Player), gold);
    assert_eq!(sim.state_hash(), before);

    sim.advance_to(20_000);
    assert!(sim.cast_ability(Ability::Firestorm).is_ok());
}

#[test]
fn dead_units_never_survive_a_tick() {
    let mut sim = fixtures::skirmish(7);
    for _ in 0..600 {
        tick_frames(&mut sim, 1, 16);
        for entity in sim.entities() {
            assert!(entity.health.current > 0);
            assert!(entity.health.current <= entity.stats.max_health);
        }
        for id in &sim.last_events().deaths {
            assert!(sim.entity(*id).is_none());
        }
    }
}

#[test]
fn turret_shot_lands_after_travel() {
    let mut sim = fixtures::playing_match(8);
    sim.advance_to(2000);
    let target = spawn_at(&mut sim, "giant", Faction::Opponent, 420);
    sim.entity_mut(target).unwrap().stats.speed = 0;

    let events = sim.tick();
    assert_eq!(events.projectiles_launched, 1);
    assert!(events.damage_taken.is_empty());

    let mut landed = None;
    for frame in 1..200 {
        let events = sim.tick();
        if let Some(&(_, dmg)) = events.damage_taken.iter().find(|(id, _)| *id == target) {
            landed = Some((frame, dmg));
            break;
        }
    }
    let (frame, damage) = landed.expect("turret shot never landed");
    assert!(frame > 1);
    assert_eq!(damage, 30);
}

#[test]
fn player_miner_delivers_gold() {
    let mut sim = fixtures::playing_match(9);
    sim.set_gold(Faction::Player, 150);
    sim.spawn_unit("miner", Faction::Player).unwrap();
    let mut delivered = 0;
    for _ in 0..2000 {
        tick_frames(&mut sim, 1, 16);
        delivered += sim.last_events().deposited;
        if delivered > 0 {
            break;
        }
    }
    assert_eq!(delivered, 20);
    assert_eq!(sim.gold(Faction::Player), 20);
}

#[test]
fn garrison_hides_units_from_combat() {
    let mut sim = fixtures::playing_match(10);
    sim.advance_to(3000);
    let sword = spawn_at(&mut sim, "sword", Faction::Player, 110);
    sim.set_stance(Stance::Garrison);
    sim.tick();
    assert_eq!(sim.entity(sword).unwrap().state, UnitState::Garrisoned);
    assert!(GameSnapshot::capture(&sim).entities.is_empty());

    let enemy = spawn_at(&mut sim, "sword", Faction::Opponent, 150);
    sim.advance_to(5000);
    sim.tick();
    assert_eq!(sim.entity(sword).unwrap().health.current, 100);
    assert_eq!(sim.entity(enemy).unwrap().state, UnitState::Attacking);
}

#[test]
fn director_prioritises_miners_then_caps_squad() {
    let mut sim = fixtures::playing_match(11);
    assert_eq!(director::target_miner_count(sim.stage()), 2);
    assert!(matches!(
        director::activate(&mut sim),
        DirectorDecision::SpawnedMiner(_)
    ));
    assert!(matches!(
        director::activate(&mut sim),
        DirectorDecision::SpawnedMiner(_)
    ));
    assert_eq!(sim.opponent_unit_counts(), (2, 0));

    for i in 0..director::squad_cap(sim.stage()) {
        spawn_at(&mut sim, "zombie", Faction::Opponent, 900 + i as i32);
    }
    sim.set_gold(Faction::Opponent, 50_000);
    let mut saw_cap = false;
    for _ in 0..50 {
        match director::activate(&mut sim) {
            DirectorDecision::SquadFull { .. } => saw_cap = true,
            DirectorDecision::Spawned { .. } => panic!("spawned past the squad cap"),
            _ => {}
        }
    }
    assert!(saw_cap);
}

#[test]
fn director_idle_outside_play() {
    let mut sim = fixtures::confirmed_match(12);
    assert_eq!(director::activate(&mut sim), DirectorDecision::Inactive);
    assert!(sim.entities().is_empty());
}

#[test]
fn boss_stage_uses_boss_numbers() {
    let mut sim = fixtures::playing_match(13);
    while sim.stage() < 5 {
        sim.set_base_health(Faction::Opponent, 0);
        sim.tick();
        sim.advance_stage().unwrap();
        sim.begin_play();
    }
    assert!(director::is_boss_stage(sim.stage()));
    assert_eq!(director::spawn_chance_percent(sim.stage()), 80);
    assert_eq!(director::squad_cap(sim.stage()), 20);
    assert_eq!(director::period_ms(sim.stage()), 900);
    assert_eq!(director::spawn_chance_percent(6), 70);
}

#[test]
fn full_match_reaches_a_verdict() {
    let (mut sim, mut scheduler) = fixtures::scheduled_match(14);
    sim.set_gold(Faction::Player, 100_000);
    let mut elapsed = 0;
    while sim.phase().is_playing() && elapsed < 600_000 {
        scheduler.run_for(&mut sim, 1000);
        elapsed += 1000;
        let _ = sim.spawn_unit("sword", Faction::Player);
    }
    assert!(sim.phase().winner().is_some());
    assert_eq!(scheduler.pending(), 0);
}
