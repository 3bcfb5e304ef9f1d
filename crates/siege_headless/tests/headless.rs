//! End-to-end tests for the headless runner.

use std::path::PathBuf;

use siege_core::replay::Replay;
use siege_headless::game_runner::{run_match, MatchConfig};
use siege_headless::protocol::Command;
use siege_headless::runner::{HeadlessConfig, HeadlessRunner, Session};
use siege_headless::strategies::Strategy;
use siege_test_utils::fixtures::STANDARD_ARMY;

fn strategy_file(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("strategies")
        .join(name)
}

fn confirm_line() -> String {
    let units: Vec<String> = STANDARD_ARMY.iter().map(|u| format!("\"{u}\"")).collect();
    format!(
        r#"{{"cmd":"confirm_army","units":[{}],"abilities":["Firestorm","Frost"]}}"#,
        units.join(",")
    )
}

#[test]
fn bundled_strategies_load() {
    let balanced = Strategy::load(strategy_file("balanced.ron")).unwrap();
    assert_eq!(balanced, Strategy::default());

    let raid = Strategy::load(strategy_file("ninja_raid.ron")).unwrap();
    assert_eq!(raid.name, "NinjaRaid");
}

#[test]
fn bundled_strategy_plays_a_match() {
    let strategy = Strategy::resolve(strategy_file("ninja_raid.ron").to_str().unwrap()).unwrap();
    let outcome = run_match(&MatchConfig::new(21, strategy).with_max_duration(30_000)).unwrap();
    assert!(outcome.metrics.player.units_spawned >= 2);
    assert_eq!(
        outcome.replay.verify().unwrap(),
        outcome.metrics.final_state_hash
    );
}

#[test]
fn multi_stage_match_records_advance() {
    let mut strategy = Strategy::rush();
    strategy.decision_interval_ms = 100;
    let config = MatchConfig::new(8, strategy)
        .with_stages(3)
        .with_max_duration(120_000);
    let outcome = run_match(&config).unwrap();
    assert!(outcome.metrics.final_stage >= 1);
    assert!(outcome.metrics.stages_cleared <= 3);
    outcome.replay.verify().unwrap();
}

#[test]
fn session_replay_file_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let replay_path = dir.path().join("session.replay");

    let input = [
        confirm_line(),
        r#"{"cmd":"advance","ms":2000}"#.to_string(),
        r#"{"cmd":"spawn","unit":"miner"}"#.to_string(),
        r#"{"cmd":"spawn","unit":"sword"}"#.to_string(),
        r#"{"cmd":"advance","ms":10000}"#.to_string(),
        r#"{"cmd":"stance","stance":"Garrison"}"#.to_string(),
        r#"{"cmd":"advance","ms":4000}"#.to_string(),
        r#"{"cmd":"quit"}"#.to_string(),
    ]
    .join("\n");

    let runner = HeadlessRunner::with_config(HeadlessConfig {
        seed: 77,
        catalog_path: None,
        replay_path: Some(replay_path.clone()),
    });
    let mut output = Vec::new();
    let session = runner.run_with(input.as_bytes(), &mut output).unwrap();

    let replay = Replay::load(&replay_path).unwrap();
    assert_eq!(replay.seed, 77);
    assert_eq!(replay.command_count(), 4);
    assert_eq!(replay.verify().unwrap(), session.simulation().state_hash());
}

#[test]
fn sessions_with_same_seed_agree() {
    let script = [
        confirm_line(),
        r#"{"cmd":"advance","ms":2500}"#.to_string(),
        r#"{"cmd":"spawn","unit":"archidon"}"#.to_string(),
        r#"{"cmd":"advance","ms":20000}"#.to_string(),
    ];
    let run = || {
        let mut session = Session::new(3, None).unwrap();
        for line in &script {
            session.handle(Command::from_json(line).unwrap());
        }
        session.simulation().state_hash()
    };
    assert_eq!(run(), run());
}
