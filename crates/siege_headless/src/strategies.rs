//! Scripted player strategies for headless playtesting.
//!
//! A strategy picks the army and loadout, runs an opening build order and
//! then keeps reinforcing, upgrading, casting and switching stance from the
//! per-tick snapshot. The opponent is always the built-in director.

use std::collections::VecDeque;
use std::path::Path;

use serde::{Deserialize, Serialize};
use siege_core::abilities::{Ability, LOADOUT_SIZE};
use siege_core::catalog::{UnitCatalog, ARMY_SIZE};
use siege_core::components::{Millis, Stance};
use siege_core::economy::UpgradeTrack;
use siege_core::faction::Faction;
use siege_core::replay::MatchCommand;
use siege_core::simulation::Phase;
use siege_core::snapshot::GameSnapshot;
use thiserror::Error;
use tracing::{debug, warn};

/// Error type for strategy operations.
#[derive(Error, Debug)]
pub enum StrategyError {
    /// File not found.
    #[error("Strategy file not found: {0}")]
    FileNotFound(String),
    /// Failed to read file.
    #[error("Failed to read strategy file: {0}")]
    ReadError(#[from] std::io::Error),
    /// Failed to parse RON.
    #[error("Failed to parse strategy: {0}")]
    ParseError(#[from] ron::error::SpannedError),
    /// Parsed, but not playable.
    #[error("Invalid strategy '{name}': {reason}")]
    Invalid {
        /// Strategy name.
        name: String,
        /// What is wrong with it.
        reason: String,
    },
}

/// A complete player strategy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Strategy {
    /// Strategy name.
    pub name: String,
    /// Human-readable description.
    pub description: String,
    /// The eight units to unlock.
    pub army: Vec<String>,
    /// The two abilities to bring.
    pub loadout: Vec<Ability>,
    /// Opening, executed once per stage.
    pub build_order: Vec<BuildOrderItem>,
    /// Units spawned in rotation once the build order is done.
    pub reinforcements: Vec<String>,
    /// Keep at least this many miners alive.
    pub target_miners: u32,
    /// Upgrades bought in this order whenever the reserve allows.
    pub upgrades: Vec<UpgradeTrack>,
    /// Gold kept back from upgrades and reinforcements.
    pub gold_reserve: u32,
    /// Switch to attack once this many combat units are on the lane.
    pub attack_at_army: u32,
    /// Garrison when the base drops below this health percentage.
    pub garrison_below_percent: u32,
    /// Cast abilities once this many opponent combat units are on the lane.
    pub cast_threshold: u32,
    /// Time between decisions.
    pub decision_interval_ms: Millis,
}

impl Default for Strategy {
    fn default() -> Self {
        Self {
            name: "Balanced".to_string(),
            description: "Two miners, a sword screen, then archers behind spearton".to_string(),
            army: standard_army(),
            loadout: vec![Ability::Firestorm, Ability::Frost],
            build_order: vec![
                BuildOrderItem::Unit("miner".to_string()),
                BuildOrderItem::Unit("sword".to_string()),
                BuildOrderItem::Unit("miner".to_string()),
                BuildOrderItem::Unit("sword".to_string()),
                BuildOrderItem::WaitForGold(300),
                BuildOrderItem::Unit("archidon".to_string()),
            ],
            reinforcements: vec![
                "sword".to_string(),
                "archidon".to_string(),
                "spearton".to_string(),
                "sword".to_string(),
            ],
            target_miners: 3,
            upgrades: vec![UpgradeTrack::Damage, UpgradeTrack::Health],
            gold_reserve: 200,
            attack_at_army: 5,
            garrison_below_percent: 25,
            cast_threshold: 4,
            decision_interval_ms: 250,
        }
    }
}

fn standard_army() -> Vec<String> {
    [
        "miner", "sword", "archidon", "spearton", "zombie", "ninja", "bomber", "giant",
    ]
    .iter()
    .map(|s| (*s).to_string())
    .collect()
}

impl Strategy {
    /// Load a strategy from a RON file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, StrategyError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(StrategyError::FileNotFound(path.display().to_string()));
        }
        let contents = std::fs::read_to_string(path)?;
        Self::from_ron_str(&contents)
    }

    /// Load from a RON string.
    pub fn from_ron_str(ron: &str) -> Result<Self, StrategyError> {
        let strategy: Strategy = ron::from_str(ron)?;
        strategy.validate()?;
        Ok(strategy)
    }

    /// Resolve a built-in name (`balanced`, `rush`, `turtle`) or a RON path.
    pub fn resolve(name_or_path: &str) -> Result<Self, StrategyError> {
        match Self::builtin(name_or_path) {
            Some(strategy) => Ok(strategy),
            None => Self::load(name_or_path),
        }
    }

    /// Look up a built-in strategy by name.
    #[must_use]
    pub fn builtin(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "balanced" | "default" => Some(Self::default()),
            "rush" => Some(Self::rush()),
            "turtle" => Some(Self::turtle()),
            _ => None,
        }
    }

    /// Cheap units early and constant pressure.
    #[must_use]
    pub fn rush() -> Self {
        Self {
            name: "Rush".to_string(),
            description: "One miner, then swords and zombies straight down the lane".to_string(),
            build_order: vec![
                BuildOrderItem::Unit("sword".to_string()),
                BuildOrderItem::Unit("sword".to_string()),
                BuildOrderItem::Unit("miner".to_string()),
                BuildOrderItem::Unit("zombie".to_string()),
            ],
            reinforcements: vec![
                "sword".to_string(),
                "zombie".to_string(),
                "bomber".to_string(),
            ],
            target_miners: 1,
            upgrades: vec![UpgradeTrack::Damage],
            gold_reserve: 0,
            attack_at_army: 2,
            garrison_below_percent: 0,
            cast_threshold: 3,
            ..Self::default()
        }
    }

    /// Mine hard, hold the defend band and build a heavy army.
    #[must_use]
    pub fn turtle() -> Self {
        Self {
            name: "Turtle".to_string(),
            description: "Four miners behind a spearton wall, attack with giants".to_string(),
            loadout: vec![Ability::Purge, Ability::Frost],
            build_order: vec![
                BuildOrderItem::Unit("miner".to_string()),
                BuildOrderItem::Unit("miner".to_string()),
                BuildOrderItem::Unit("miner".to_string()),
                BuildOrderItem::WaitForGold(500),
                BuildOrderItem::Unit("spearton".to_string()),
                BuildOrderItem::Upgrade(UpgradeTrack::Health),
            ],
            reinforcements: vec![
                "spearton".to_string(),
                "archidon".to_string(),
                "giant".to_string(),
            ],
            target_miners: 4,
            upgrades: vec![UpgradeTrack::Health, UpgradeTrack::Damage],
            gold_reserve: 400,
            attack_at_army: 8,
            garrison_below_percent: 40,
            cast_threshold: 6,
            ..Self::default()
        }
    }

    /// Check the army and loadout shape.
    pub fn validate(&self) -> Result<(), StrategyError> {
        let invalid = |reason: String| StrategyError::Invalid {
            name: self.name.clone(),
            reason,
        };
        if self.army.len() != ARMY_SIZE {
            return Err(invalid(format!(
                "army needs {ARMY_SIZE} units, has {}",
                self.army.len()
            )));
        }
        if self.loadout.len() != LOADOUT_SIZE {
            return Err(invalid(format!(
                "loadout needs {LOADOUT_SIZE} abilities, has {}",
                self.loadout.len()
            )));
        }
        if self.decision_interval_ms == 0 {
            return Err(invalid("decision interval must be positive".to_string()));
        }
        let unit_ids = self
            .build_order
            .iter()
            .filter_map(|item| match item {
                BuildOrderItem::Unit(id) => Some(id),
                _ => None,
            })
            .chain(&self.reinforcements);
        for id in unit_ids {
            if !self.army.contains(id) {
                return Err(invalid(format!("'{id}' is not in the army")));
            }
        }
        let upgrades = self.upgrades.iter().chain(self.build_order.iter().filter_map(
            |item| match item {
                BuildOrderItem::Upgrade(track) => Some(track),
                _ => None,
            },
        ));
        for track in upgrades {
            if !track.is_purchasable() {
                return Err(invalid(format!("{track:?} cannot be bought")));
            }
        }
        Ok(())
    }
}

/// A single item in a build order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BuildOrderItem {
    /// Spawn a unit.
    Unit(String),
    /// Buy an upgrade level.
    Upgrade(UpgradeTrack),
    /// Wait until gold reaches an amount.
    WaitForGold(u32),
    /// Wait until this long after the stage started.
    WaitForMs(Millis),
}

/// Runtime state for executing a strategy.
#[derive(Debug, Clone)]
pub struct StrategyExecutor {
    strategy: Strategy,
    build_queue: VecDeque<BuildOrderItem>,
    next_reinforcement: usize,
    stage_started_at: Option<Millis>,
    stage: u32,
}

impl StrategyExecutor {
    /// Create a new executor for a strategy.
    #[must_use]
    pub fn new(strategy: Strategy) -> Self {
        let build_queue = strategy.build_order.iter().cloned().collect();
        Self {
            strategy,
            build_queue,
            next_reinforcement: 0,
            stage_started_at: None,
            stage: 0,
        }
    }

    /// Get the strategy name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.strategy.name
    }

    /// Time between decisions.
    #[must_use]
    pub fn interval(&self) -> Millis {
        self.strategy.decision_interval_ms.max(1)
    }

    /// Fraction of the opening already executed.
    #[must_use]
    pub fn progress(&self) -> f64 {
        if self.strategy.build_order.is_empty() {
            1.0
        } else {
            1.0 - self.build_queue.len() as f64 / self.strategy.build_order.len() as f64
        }
    }

    /// Decide the commands to issue against the current snapshot.
    ///
    /// Commands are ordered so that each one is affordable after the
    /// previous ones have been paid for.
    pub fn decide(&mut self, snapshot: &GameSnapshot, catalog: &UnitCatalog) -> Vec<MatchCommand> {
        match snapshot.phase {
            Phase::SelectingArmy => {
                return vec![MatchCommand::ConfirmArmy {
                    units: self.strategy.army.clone(),
                    abilities: self.strategy.loadout.clone(),
                }];
            }
            Phase::Playing => {}
            Phase::StageIntro { .. } | Phase::Over { .. } => return Vec::new(),
        }

        if self.stage != snapshot.stage || self.stage_started_at.is_none() {
            self.stage = snapshot.stage;
            self.stage_started_at = Some(snapshot.now);
            self.build_queue = self.strategy.build_order.iter().cloned().collect();
            debug!(strategy = %self.strategy.name, stage = self.stage, "opening started");
        }

        let mut commands = Vec::new();
        let mut gold = snapshot.gold;

        if let Some(stance) = self.desired_stance(snapshot) {
            commands.push(MatchCommand::SetStance(stance));
        }
        if let Some(ability) = self.ability_to_cast(snapshot) {
            commands.push(MatchCommand::Cast(ability));
        }

        self.run_build_order(snapshot, catalog, &mut gold, &mut commands);
        if !self.build_queue.is_empty() {
            return commands;
        }

        let miners = snapshot
            .units_of(Faction::Player)
            .filter(|e| e.is_miner())
            .count() as u32;
        if miners < self.strategy.target_miners {
            if let Some(miner) = catalog.miner().filter(|m| self.strategy.army.contains(&m.id)) {
                if gold >= miner.stats.cost {
                    gold -= miner.stats.cost;
                    commands.push(MatchCommand::Spawn {
                        unit: miner.id.clone(),
                    });
                }
            }
        }

        let mut upgrades = snapshot.upgrades;
        for &track in &self.strategy.upgrades {
            let cost = upgrades.next_cost(track);
            if gold >= cost.saturating_add(self.strategy.gold_reserve) {
                gold -= cost;
                upgrades.increment(track);
                commands.push(MatchCommand::BuyUpgrade(track));
                break;
            }
        }

        if !self.strategy.reinforcements.is_empty() {
            let index = self.next_reinforcement % self.strategy.reinforcements.len();
            let unit = &self.strategy.reinforcements[index];
            match catalog.get(unit) {
                Some(template)
                    if gold >= template.stats.cost.saturating_add(self.strategy.gold_reserve) =>
                {
                    commands.push(MatchCommand::Spawn { unit: unit.clone() });
                    self.next_reinforcement = self.next_reinforcement.wrapping_add(1);
                }
                Some(_) => {}
                None => {
                    warn!(unit = %unit, "reinforcement not in catalog, skipped");
                    self.next_reinforcement = self.next_reinforcement.wrapping_add(1);
                }
            }
        }

        commands
    }

    fn run_build_order(
        &mut self,
        snapshot: &GameSnapshot,
        catalog: &UnitCatalog,
        gold: &mut u32,
        commands: &mut Vec<MatchCommand>,
    ) {
        let started = self.stage_started_at.unwrap_or(snapshot.now);
        let mut upgrades = snapshot.upgrades;
        while let Some(item) = self.build_queue.front() {
            match item {
                BuildOrderItem::Unit(id) => {
                    let Some(template) = catalog.get(id) else {
                        warn!(unit = %id, "build order unit not in catalog, skipped");
                        self.build_queue.pop_front();
                        continue;
                    };
                    if *gold < template.stats.cost {
                        return;
                    }
                    *gold -= template.stats.cost;
                    commands.push(MatchCommand::Spawn { unit: id.clone() });
                }
                BuildOrderItem::Upgrade(track) => {
                    let cost = upgrades.next_cost(*track);
                    if *gold < cost {
                        return;
                    }
                    *gold -= cost;
                    upgrades.increment(*track);
                    commands.push(MatchCommand::BuyUpgrade(*track));
                }
                BuildOrderItem::WaitForGold(amount) => {
                    if *gold < *amount {
                        return;
                    }
                }
                BuildOrderItem::WaitForMs(ms) => {
                    if snapshot.now < started.saturating_add(*ms) {
                        return;
                    }
                }
            }
            self.build_queue.pop_front();
        }
    }

    fn desired_stance(&self, snapshot: &GameSnapshot) -> Option<Stance> {
        let base = snapshot.player_base;
        let wanted = if u64::from(base.current) * 100
            < u64::from(base.max) * u64::from(self.strategy.garrison_below_percent)
        {
            Stance::Garrison
        } else {
            let army = snapshot
                .units_of(Faction::Player)
                .filter(|e| !e.is_miner())
                .count() as u32;
            if army >= self.strategy.attack_at_army {
                Stance::Attack
            } else {
                Stance::Defend
            }
        };
        (wanted != snapshot.stance).then_some(wanted)
    }

    fn ability_to_cast(&self, snapshot: &GameSnapshot) -> Option<Ability> {
        let threats = snapshot
            .units_of(Faction::Opponent)
            .filter(|e| !e.is_miner())
            .count() as u32;
        if threats < self.strategy.cast_threshold {
            return None;
        }
        snapshot
            .cooldowns
            .iter()
            .find(|view| view.ready)
            .map(|view| view.ability)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use siege_core::simulation::{SimConfig, Simulation};

    fn playing_snapshot(gold: u32) -> (Simulation, GameSnapshot) {
        let mut sim = Simulation::new(SimConfig::with_seed(1));
        let strategy = Strategy::default();
        sim.confirm_army(&strategy.army, &strategy.loadout).unwrap();
        sim.begin_play();
        sim.set_gold(Faction::Player, gold);
        let snapshot = GameSnapshot::capture(&sim);
        (sim, snapshot)
    }

    #[test]
    fn test_builtin_strategies_are_valid() {
        for name in ["balanced", "rush", "turtle"] {
            let strategy = Strategy::builtin(name).unwrap();
            strategy.validate().unwrap();
        }
        assert!(Strategy::builtin("nonsense").is_none());
    }

    #[test]
    fn test_parse_ron_strategy() {
        let strategy = Strategy::rush();
        let text =
            ron::ser::to_string_pretty(&strategy, ron::ser::PrettyConfig::default()).unwrap();
        let parsed = Strategy::from_ron_str(&text).unwrap();
        assert_eq!(parsed, strategy);
    }

    #[test]
    fn test_invalid_loadout_rejected() {
        let mut strategy = Strategy::default();
        strategy.loadout = vec![Ability::Frost];
        assert!(matches!(
            strategy.validate(),
            Err(StrategyError::Invalid { .. })
        ));
    }

    #[test]
    fn test_mining_upgrade_rejected() {
        let mut strategy = Strategy::default();
        strategy.upgrades = vec![UpgradeTrack::Mining];
        assert!(strategy.validate().is_err());
    }

    #[test]
    fn test_reinforcement_outside_army_rejected() {
        let mut strategy = Strategy::default();
        strategy.reinforcements = vec!["dragon".to_string()];
        assert!(strategy.validate().is_err());
    }

    #[test]
    fn test_missing_file() {
        let result = Strategy::load("/definitely/not/here.ron");
        assert!(matches!(result, Err(StrategyError::FileNotFound(_))));
    }

    #[test]
    fn test_confirms_army_during_selection() {
        let sim = Simulation::new(SimConfig::with_seed(1));
        let mut executor = StrategyExecutor::new(Strategy::default());
        let commands = executor.decide(&GameSnapshot::capture(&sim), sim.catalog());
        assert!(matches!(
            commands.as_slice(),
            [MatchCommand::ConfirmArmy { units, .. }] if units.len() == ARMY_SIZE
        ));
    }

    #[test]
    fn test_opening_stops_at_first_unaffordable_item() {
        // 150 buys the first miner only; the sword costs 125 more.
        let (sim, snapshot) = playing_snapshot(150);
        let mut executor = StrategyExecutor::new(Strategy::default());
        let commands = executor.decide(&snapshot, sim.catalog());
        let spawns: Vec<_> = commands
            .iter()
            .filter_map(|c| match c {
                MatchCommand::Spawn { unit } => Some(unit.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(spawns, vec!["miner"]);
        assert!(executor.progress() > 0.0 && executor.progress() < 1.0);
    }

    #[test]
    fn test_defends_with_small_army() {
        let (sim, snapshot) = playing_snapshot(0);
        let mut executor = StrategyExecutor::new(Strategy::default());
        let commands = executor.decide(&snapshot, sim.catalog());
        assert!(commands.contains(&MatchCommand::SetStance(Stance::Defend)));
    }

    #[test]
    fn test_nothing_during_intro() {
        let mut sim = Simulation::new(SimConfig::with_seed(1));
        let strategy = Strategy::default();
        sim.confirm_army(&strategy.army, &strategy.loadout).unwrap();
        let mut executor = StrategyExecutor::new(strategy);
        assert!(executor
            .decide(&GameSnapshot::capture(&sim), sim.catalog())
            .is_empty());
    }
}
