//! Game state container, command surface and the per-tick transition.
//!
//! [`Simulation`] owns every piece of match state. Commands validate
//! against the current state and either apply fully or return a
//! [`Rejection`] with the state untouched. [`Simulation::tick`] threads
//! turrets, projectiles, combat, damage, movement and the economy into one
//! atomic step.

use std::collections::hash_map::DefaultHasher;
use std::collections::HashSet;
use std::hash::{Hash, Hasher};

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace};

use crate::abilities::{self, Ability, AbilityEffect, Cooldowns, LOADOUT_SIZE};
use crate::catalog::{UnitCatalog, ARMY_SIZE};
use crate::combat::{self, BaseDamage, DamageLedger, Turrets};
use crate::components::{Entity, EntityId, Health, Millis, Projectile, Stance, UnitState};
use crate::economy::{self, Treasury, UpgradeTrack, Upgrades, STARTING_BASE_HEALTH};
use crate::error::{GameError, Rejection, Result};
use crate::faction::Faction;
use crate::lane::{self, GROUND_Y, SPAWN_JITTER};
use crate::math::{fx, ratio, Fixed, Vec2Fixed};
use crate::movement::{self, MoveContext};
use crate::replay::MatchCommand;

/// Length of the stage intro.
pub const STAGE_INTRO_MS: Millis = 1800;

/// Buff countdown decrement per buff timer activation.
pub const BUFF_DECAY_STEP_MS: Millis = 100;

/// Default scheduler frame cadence (roughly 60 Hz).
pub const DEFAULT_FRAME_INTERVAL_MS: Millis = 16;

/// Simulation configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SimConfig {
    /// Seed for the spawn-jitter and director random stream.
    pub seed: u64,
    /// Interval between simulation frames when driven by the scheduler.
    pub frame_interval_ms: Millis,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            frame_interval_ms: DEFAULT_FRAME_INTERVAL_MS,
        }
    }
}

impl SimConfig {
    /// Default configuration with a specific seed.
    #[must_use]
    pub fn with_seed(seed: u64) -> Self {
        Self {
            seed,
            ..Self::default()
        }
    }
}

/// Match phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    /// Waiting for the player to confirm an army.
    SelectingArmy,
    /// Splash before a stage starts.
    StageIntro {
        /// Clock time at which play begins.
        ends_at: Millis,
    },
    /// The battle is running.
    Playing,
    /// A base has fallen.
    Over {
        /// The side whose base survived.
        winner: Faction,
    },
}

impl Phase {
    /// Short lowercase name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::SelectingArmy => "selecting_army",
            Self::StageIntro { .. } => "stage_intro",
            Self::Playing => "playing",
            Self::Over { .. } => "over",
        }
    }

    /// Whether the battle is running.
    #[must_use]
    pub const fn is_playing(&self) -> bool {
        matches!(self, Self::Playing)
    }

    /// Winner, if the match is over.
    #[must_use]
    pub const fn winner(&self) -> Option<Faction> {
        match self {
            Self::Over { winner } => Some(*winner),
            _ => None,
        }
    }
}

/// Events generated during a simulation tick.
///
/// Presentation layers use these to trigger transient feedback.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TickEvents {
    /// Clock time of the tick.
    pub at: Millis,
    /// Damage each unit took from the ledger.
    pub damage_taken: Vec<(EntityId, u32)>,
    /// Units spawned since the previous tick.
    pub spawned: Vec<EntityId>,
    /// Units removed because their health reached zero.
    pub deaths: Vec<EntityId>,
    /// Damage dealt to each base.
    pub base_damage: BaseDamage,
    /// Turret shots fired.
    pub projectiles_launched: usize,
    /// Turret shots that arrived.
    pub projectile_hits: usize,
    /// Gold delivered by player miners.
    pub deposited: u32,
    /// Set on the tick a base falls.
    pub winner: Option<Faction>,
}

/// The core game simulation.
///
/// # System Execution Order
///
/// Each tick, while the phase is [`Phase::Playing`]:
/// 1. **Turrets** - each ready base turret launches a projectile
/// 2. **Projectiles** - shots advance; arrivals go to the damage ledger
/// 3. **Combat** - every unit picks a target against the pre-tick state
/// 4. **Damage** - the ledger is applied to every unit at once; dead units are removed
/// 5. **Movement** - surviving, unfrozen units run their state machine
/// 6. **Terminal check** - opponent base first, so a double knockout is a player win
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Simulation {
    config: SimConfig,
    catalog: UnitCatalog,
    clock: Millis,
    frame: u64,
    rng: ChaCha8Rng,
    next_entity_id: EntityId,
    entities: Vec<Entity>,
    projectiles: Vec<Projectile>,
    turrets: Turrets,
    treasury: Treasury,
    player_base: Health,
    opponent_base: Health,
    stage: u32,
    stance: Stance,
    phase: Phase,
    unlocked: Vec<String>,
    loadout: Vec<Ability>,
    cooldowns: Cooldowns,
    buff_remaining_ms: Millis,
    upgrades: Upgrades,
    pending_spawns: Vec<EntityId>,
    last_events: TickEvents,
}

impl Simulation {
    /// Create a new match with the built-in roster.
    ///
    /// # Example
    ///
    /// ```
    /// use siege_core::simulation::{Phase, SimConfig, Simulation};
    ///
    /// let sim = Simulation::new(SimConfig::with_seed(7));
    /// assert_eq!(sim.phase(), Phase::SelectingArmy);
    /// assert_eq!(sim.stage(), 1);
    /// ```
    #[must_use]
    pub fn new(config: SimConfig) -> Self {
        Self::with_catalog(config, UnitCatalog::standard())
    }

    /// Create a new match with a custom roster.
    #[must_use]
    pub fn with_catalog(config: SimConfig, catalog: UnitCatalog) -> Self {
        let unlocked = catalog.initial_unlocks();
        Self {
            config,
            catalog,
            clock: 0,
            frame: 0,
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            next_entity_id: 1,
            entities: Vec::new(),
            projectiles: Vec::new(),
            turrets: Turrets::default(),
            treasury: Treasury::default(),
            player_base: Health::new(STARTING_BASE_HEALTH),
            opponent_base: Health::new(STARTING_BASE_HEALTH),
            stage: 1,
            stance: Stance::Attack,
            phase: Phase::SelectingArmy,
            unlocked,
            loadout: Vec::new(),
            cooldowns: Cooldowns::default(),
            buff_remaining_ms: 0,
            upgrades: Upgrades::default(),
            pending_spawns: Vec::new(),
            last_events: TickEvents::default(),
        }
    }

    // ------------------------------------------------------------------
    // Read access
    // ------------------------------------------------------------------

    /// Configuration the match was created with.
    #[must_use]
    pub const fn config(&self) -> &SimConfig {
        &self.config
    }

    /// Unit roster.
    #[must_use]
    pub const fn catalog(&self) -> &UnitCatalog {
        &self.catalog
    }

    /// Current clock time.
    #[must_use]
    pub const fn now(&self) -> Millis {
        self.clock
    }

    /// Number of ticks run while playing.
    #[must_use]
    pub const fn frame(&self) -> u64 {
        self.frame
    }

    /// Live units in insertion order.
    #[must_use]
    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    /// Look up a live unit.
    #[must_use]
    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.entities.iter().find(|e| e.id == id)
    }

    /// Turret shots in flight.
    #[must_use]
    pub fn projectiles(&self) -> &[Projectile] {
        &self.projectiles
    }

    /// Gold held by a faction.
    #[must_use]
    pub const fn gold(&self, faction: Faction) -> u32 {
        self.treasury.gold(faction)
    }

    /// Health of a faction's base.
    #[must_use]
    pub const fn base_health(&self, faction: Faction) -> Health {
        match faction {
            Faction::Player => self.player_base,
            Faction::Opponent => self.opponent_base,
        }
    }

    /// Current stage.
    #[must_use]
    pub const fn stage(&self) -> u32 {
        self.stage
    }

    /// Current player stance.
    #[must_use]
    pub const fn stance(&self) -> Stance {
        self.stance
    }

    /// Current phase.
    #[must_use]
    pub const fn phase(&self) -> Phase {
        self.phase
    }

    /// Unit ids the player may spawn.
    #[must_use]
    pub fn unlocked(&self) -> &[String] {
        &self.unlocked
    }

    /// Abilities the player may cast.
    #[must_use]
    pub fn loadout(&self) -> &[Ability] {
        &self.loadout
    }

    /// Ability cooldown expiries.
    #[must_use]
    pub const fn cooldowns(&self) -> &Cooldowns {
        &self.cooldowns
    }

    /// Remaining temporary buff time.
    #[must_use]
    pub const fn buff_remaining_ms(&self) -> Millis {
        self.buff_remaining_ms
    }

    /// Purchased upgrade levels.
    #[must_use]
    pub const fn upgrades(&self) -> &Upgrades {
        &self.upgrades
    }

    /// Events from the most recent tick.
    #[must_use]
    pub const fn last_events(&self) -> &TickEvents {
        &self.last_events
    }

    /// Count of live opponent miners and non-miners.
    #[must_use]
    pub fn opponent_unit_counts(&self) -> (usize, usize) {
        self.entities
            .iter()
            .filter(|e| e.faction == Faction::Opponent)
            .fold((0, 0), |(miners, squad), e| {
                if e.is_miner() {
                    (miners + 1, squad)
                } else {
                    (miners, squad + 1)
                }
            })
    }

    pub(crate) fn rng_mut(&mut self) -> &mut ChaCha8Rng {
        &mut self.rng
    }

    // ------------------------------------------------------------------
    // Clock
    // ------------------------------------------------------------------

    /// Move the clock forward to `now`. The clock never runs backwards.
    pub fn advance_to(&mut self, now: Millis) {
        self.clock = self.clock.max(now);
    }

    // ------------------------------------------------------------------
    // Command surface
    // ------------------------------------------------------------------

    /// Spawn a unit for `faction` at its home base.
    ///
    /// Allowed from the stage intro until the match is over. Player spawns
    /// require the template to be unlocked. Spawned ids are
    /// reported in the next tick's [`TickEvents::spawned`].
    pub fn spawn_unit(
        &mut self,
        template_id: &str,
        faction: Faction,
    ) -> std::result::Result<EntityId, Rejection> {
        if matches!(self.phase, Phase::SelectingArmy | Phase::Over { .. }) {
            return Err(self.reject(Rejection::WrongPhase(self.phase.name())));
        }
        let Some(template) = self.catalog.get(template_id) else {
            return Err(self.reject(Rejection::UnknownUnit(template_id.to_string())));
        };
        if faction.is_player() && !self.unlocked.iter().any(|id| id == template_id) {
            return Err(self.reject(Rejection::Locked(template_id.to_string())));
        }
        let cost = template.stats.cost;
        let stats = economy::spawn_stats(template.stats, faction, &self.upgrades, self.stage);
        let class = template.class;
        let template_id = template.id.clone();

        if !self.treasury.try_spend(faction, cost) {
            return Err(self.reject(Rejection::InsufficientGold {
                required: cost,
                available: self.treasury.gold(faction),
            }));
        }

        let jitter = self.rng.gen_range(-SPAWN_JITTER * 100..SPAWN_JITTER * 100);
        let id = self.next_entity_id;
        self.next_entity_id += 1;
        self.entities.push(Entity {
            id,
            faction,
            template_id,
            class,
            stats,
            position: Vec2Fixed::new(lane::base_x(faction), fx(GROUND_Y) + ratio(jitter, 100)),
            health: Health::new(stats.max_health),
            state: UnitState::Idle,
            last_attack_at: 0,
            anim_frame: 0,
            cargo: 0,
            frozen_until: None,
            manual_target_x: None,
        });
        self.pending_spawns.push(id);
        Ok(id)
    }

    /// Change the player stance. Clears every manual move order.
    pub fn set_stance(&mut self, stance: Stance) {
        self.stance = stance;
        for entity in &mut self.entities {
            entity.manual_target_x = None;
        }
    }

    /// Order player combat units to walk to `x`, overriding the stance.
    ///
    /// Unknown ids, opponent units and miners are skipped. Returns the
    /// number of units that took the order.
    pub fn order_move(&mut self, ids: &[EntityId], x: Fixed) -> usize {
        let target = lane::clamp_x(x);
        let mut ordered = 0;
        for entity in &mut self.entities {
            if entity.faction.is_player() && !entity.is_miner() && ids.contains(&entity.id) {
                entity.manual_target_x = Some(target);
                ordered += 1;
            }
        }
        ordered
    }

    /// Cast an ability from the loadout.
    pub fn cast_ability(
        &mut self,
        ability: Ability,
    ) -> std::result::Result<AbilityEffect, Rejection> {
        if !self.phase.is_playing() {
            return Err(self.reject(Rejection::WrongPhase(self.phase.name())));
        }
        if !self.loadout.contains(&ability) {
            return Err(self.reject(Rejection::NotInLoadout(ability)));
        }
        if !self.cooldowns.is_ready(ability, self.clock) {
            return Err(self.reject(Rejection::OnCooldown {
                ability,
                ready_at: self.cooldowns.ready_at(ability),
            }));
        }
        self.cooldowns.start(ability, self.clock);
        let effect = abilities::apply(ability, &mut self.entities, self.stage, self.clock);
        info!(
            ?ability,
            removed = effect.removed.len(),
            frozen = effect.frozen.len(),
            "ability cast"
        );
        Ok(effect)
    }

    /// Buy the next level of an upgrade track. Returns the new level.
    pub fn buy_upgrade(&mut self, track: UpgradeTrack) -> std::result::Result<u32, Rejection> {
        if !track.is_purchasable() {
            return Err(self.reject(Rejection::UnpurchasableTrack(track)));
        }
        let cost = self.upgrades.next_cost(track);
        if !self.treasury.try_spend(Faction::Player, cost) {
            return Err(self.reject(Rejection::InsufficientGold {
                required: cost,
                available: self.treasury.player,
            }));
        }
        self.upgrades.increment(track);
        Ok(self.upgrades.level(track))
    }

    /// Lock in the army and ability loadout, then start the stage intro.
    ///
    /// Needs exactly eight distinct known units and two distinct abilities.
    pub fn confirm_army(
        &mut self,
        units: &[String],
        loadout: &[Ability],
    ) -> std::result::Result<(), Rejection> {
        if self.phase != Phase::SelectingArmy {
            return Err(self.reject(Rejection::WrongPhase(self.phase.name())));
        }
        let distinct: HashSet<&str> = units.iter().map(String::as_str).collect();
        if units.len() != ARMY_SIZE || distinct.len() != ARMY_SIZE {
            return Err(self.reject(Rejection::InvalidLoadout(format!(
                "expected {ARMY_SIZE} distinct units, got {}",
                distinct.len()
            ))));
        }
        if let Some(unknown) = units.iter().find(|id| !self.catalog.contains(id)) {
            return Err(self.reject(Rejection::UnknownUnit(unknown.clone())));
        }
        let distinct_abilities: HashSet<Ability> = loadout.iter().copied().collect();
        if loadout.len() != LOADOUT_SIZE || distinct_abilities.len() != LOADOUT_SIZE {
            return Err(self.reject(Rejection::InvalidLoadout(format!(
                "expected {LOADOUT_SIZE} distinct abilities"
            ))));
        }

        self.unlocked = units.to_vec();
        self.loadout = loadout.to_vec();
        self.enter_intro();
        Ok(())
    }

    /// Advance to the next stage after a player victory.
    ///
    /// Rewards are computed from the stage that was just cleared.
    pub fn advance_stage(&mut self) -> std::result::Result<u32, Rejection> {
        if self.phase.winner() != Some(Faction::Player) {
            return Err(self.reject(Rejection::WrongPhase(self.phase.name())));
        }
        let cleared = self.stage;
        self.stage += 1;
        self.treasury
            .deposit(Faction::Player, economy::stage_reward(cleared));
        self.treasury
            .set(Faction::Opponent, economy::opponent_stage_gold(cleared));
        self.player_base
            .reset(economy::player_base_health(self.upgrades.health));
        self.opponent_base
            .reset(economy::opponent_base_health(cleared));
        self.entities.clear();
        self.projectiles.clear();
        self.pending_spawns.clear();
        self.cooldowns.clear();
        self.buff_remaining_ms = 0;
        self.stance = Stance::Attack;
        self.enter_intro();
        Ok(self.stage)
    }

    /// Discard the match and return to army selection.
    ///
    /// The random stream and clock carry on.
    pub fn restart(&mut self) {
        let rng = self.rng.clone();
        let clock = self.clock;
        let next_entity_id = self.next_entity_id;
        *self = Self::with_catalog(self.config, self.catalog.clone());
        self.rng = rng;
        self.clock = clock;
        self.next_entity_id = next_entity_id;
        info!("match restarted");
    }

    /// Leave the stage intro. Returns false if not in the intro.
    pub fn begin_play(&mut self) -> bool {
        if let Phase::StageIntro { .. } = self.phase {
            self.phase = Phase::Playing;
            info!(stage = self.stage, "stage started");
            true
        } else {
            false
        }
    }

    /// Count the buff down by one step.
    pub fn decay_buff(&mut self) {
        self.buff_remaining_ms = self.buff_remaining_ms.saturating_sub(BUFF_DECAY_STEP_MS);
    }

    /// Apply a recorded command.
    pub fn apply(&mut self, command: &MatchCommand) -> std::result::Result<(), Rejection> {
        match command {
            MatchCommand::Spawn { unit } => self.spawn_unit(unit, Faction::Player).map(|_| ()),
            MatchCommand::SetStance(stance) => {
                self.set_stance(*stance);
                Ok(())
            }
            MatchCommand::Cast(ability) => self.cast_ability(*ability).map(|_| ()),
            MatchCommand::BuyUpgrade(track) => self.buy_upgrade(*track).map(|_| ()),
            MatchCommand::ConfirmArmy { units, abilities } => self.confirm_army(units, abilities),
            MatchCommand::AdvanceStage => self.advance_stage().map(|_| ()),
            MatchCommand::Restart => {
                self.restart();
                Ok(())
            }
            MatchCommand::OrderMove { ids, x } => {
                self.order_move(ids, fx(*x));
                Ok(())
            }
            MatchCommand::SetGold { faction, amount } => {
                self.set_gold(*faction, *amount);
                Ok(())
            }
            MatchCommand::GrantBuff { ms } => {
                self.grant_buff(*ms);
                Ok(())
            }
        }
    }

    fn enter_intro(&mut self) {
        self.phase = Phase::StageIntro {
            ends_at: self.clock.saturating_add(STAGE_INTRO_MS),
        };
        info!(stage = self.stage, "stage intro");
    }

    fn reject(&self, rejection: Rejection) -> Rejection {
        debug!(%rejection, at = self.clock, "command rejected");
        rejection
    }

    // ------------------------------------------------------------------
    // Debug hooks
    // ------------------------------------------------------------------

    /// Overwrite a faction's gold.
    pub fn set_gold(&mut self, faction: Faction, amount: u32) {
        self.treasury.set(faction, amount);
    }

    /// Overwrite a base's current health (capped at its maximum).
    pub fn set_base_health(&mut self, faction: Faction, current: u32) {
        let base = match faction {
            Faction::Player => &mut self.player_base,
            Faction::Opponent => &mut self.opponent_base,
        };
        base.current = current.min(base.max);
    }

    /// Start or extend the temporary speed buff.
    pub fn grant_buff(&mut self, ms: Millis) {
        self.buff_remaining_ms = ms;
    }

    /// Place a unit at lane position `x`. Returns false if the id is unknown.
    pub fn teleport(&mut self, id: EntityId, x: Fixed) -> bool {
        match self.entities.iter_mut().find(|e| e.id == id) {
            Some(entity) => {
                entity.position.x = lane::clamp_x(x);
                true
            }
            None => false,
        }
    }

    /// Mutable access to a unit.
    pub fn entity_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.iter_mut().find(|e| e.id == id)
    }

    // ------------------------------------------------------------------
    // Tick
    // ------------------------------------------------------------------

    /// Advance the battle by one frame at the current clock time.
    ///
    /// Does nothing outside [`Phase::Playing`] except flush spawn events.
    pub fn tick(&mut self) -> TickEvents {
        let now = self.clock;
        let mut events = TickEvents {
            at: now,
            spawned: std::mem::take(&mut self.pending_spawns),
            ..TickEvents::default()
        };
        if !self.phase.is_playing() {
            self.last_events = events.clone();
            return events;
        }
        self.frame += 1;

        // 1-2. Turrets and projectiles.
        let mut ledger = DamageLedger::new();
        let launched = self.turrets.fire(&self.entities, now);
        events.projectiles_launched = launched.len();
        self.projectiles.extend(launched);
        events.projectile_hits = combat::advance_projectiles(&mut self.projectiles, &mut ledger);

        // 3. Combat against the pre-tick view.
        let outcome = combat::resolve_combat(&mut self.entities, now);
        ledger.merge(&outcome.ledger);
        self.player_base
            .apply_damage(outcome.base_damage.player);
        self.opponent_base
            .apply_damage(outcome.base_damage.opponent);
        events.base_damage = outcome.base_damage;

        // 4-5. Damage, removal, movement.
        let ctx = MoveContext {
            stance: self.stance,
            buff_active: self.buff_remaining_ms > 0,
        };
        for entity in &mut self.entities {
            entity.anim_frame += 1;
            let was_frozen = entity.is_frozen();
            if was_frozen && entity.frozen_until.map_or(true, |until| now > until) {
                entity.state = UnitState::Idle;
                entity.frozen_until = None;
            }
            let incoming = ledger.get(entity.id);
            if incoming > 0 {
                let dealt = entity.health.apply_damage(incoming);
                events.damage_taken.push((entity.id, dealt));
            }
            if entity.health.is_dead() {
                entity.state = UnitState::Dying;
                events.deaths.push(entity.id);
                continue;
            }
            if !was_frozen {
                events.deposited += movement::step(entity, &ctx);
            }
        }
        self.entities.retain(|e| !e.health.is_dead());
        self.treasury.deposit(Faction::Player, events.deposited);

        // 6. Terminal check.
        let winner = if self.opponent_base.is_dead() {
            Some(Faction::Player)
        } else if self.player_base.is_dead() {
            Some(Faction::Opponent)
        } else {
            None
        };
        if let Some(winner) = winner {
            self.phase = Phase::Over { winner };
            events.winner = Some(winner);
            info!(stage = self.stage, ?winner, at = now, "match over");
        }

        trace!(frame = self.frame, hash = self.state_hash(), "tick");
        self.last_events = events.clone();
        events
    }

    // ------------------------------------------------------------------
    // Hashing and serialization
    // ------------------------------------------------------------------

    /// Compute a deterministic hash of the gameplay state.
    ///
    /// Two simulations with identical state produce identical hashes.
    #[must_use]
    pub fn state_hash(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.clock.hash(&mut hasher);
        self.frame.hash(&mut hasher);
        self.rng.get_word_pos().hash(&mut hasher);
        self.next_entity_id.hash(&mut hasher);
        self.entities.hash(&mut hasher);
        self.projectiles.hash(&mut hasher);
        self.turrets.hash(&mut hasher);
        self.treasury.hash(&mut hasher);
        self.player_base.hash(&mut hasher);
        self.opponent_base.hash(&mut hasher);
        self.stage.hash(&mut hasher);
        self.stance.hash(&mut hasher);
        self.phase.hash(&mut hasher);
        self.unlocked.hash(&mut hasher);
        self.loadout.hash(&mut hasher);
        self.cooldowns.hash(&mut hasher);
        self.buff_remaining_ms.hash(&mut hasher);
        self.upgrades.hash(&mut hasher);
        hasher.finish()
    }

    /// Serialize simulation state to bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn serialize(&self) -> Result<Vec<u8>> {
        bincode::serialize(self)
            .map_err(|e| GameError::InvalidState(format!("Failed to serialize simulation: {e}")))
    }

    /// Deserialize simulation state from bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if deserialization fails.
    pub fn deserialize(data: &[u8]) -> Result<Self> {
        bincode::deserialize(data).map_err(|e| {
            GameError::InvalidState(format!("Failed to deserialize simulation: {e}"))
        })
    }
}

impl Default for Simulation {
    fn default() -> Self {
        Self::new(SimConfig::default())
    }
}
