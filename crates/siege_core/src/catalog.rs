//! Unit templates and the built-in roster.
//!
//! The catalog is read-only during a match. Entities copy a template's
//! stats when they spawn and never look back at the catalog afterwards.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::components::Millis;
use crate::error::{GameError, Result};

/// Number of units the player must pick when confirming an army.
pub const ARMY_SIZE: usize = 8;

/// Number of templates unlocked before army selection.
pub const INITIAL_UNLOCKS: usize = 4;

/// Closed set of unit classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnitClass {
    /// Gathers gold; follows the mining cycle instead of the stance.
    Miner,
    /// Basic melee frontline.
    Warrior,
    /// Long range support.
    Ranger,
    /// High health, low damage frontline.
    Tank,
    /// Slow, heavy-hitting caster.
    Mage,
    /// Massive, slow, devastating power.
    Giant,
    /// Heals or buffs friendly units.
    Support,
    /// Unique units with specific roles.
    Special,
}

impl UnitClass {
    /// Short description of the class role.
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::Miner => "Gathers gold and resources.",
            Self::Warrior => "Basic melee frontline.",
            Self::Ranger => "Long range support.",
            Self::Tank => "High health, low damage frontline.",
            Self::Mage => "Area of effect magic and spells.",
            Self::Giant => "Massive, slow, devastating power.",
            Self::Support => "Heals or buffs friendly units.",
            Self::Special => "Unique units with specific roles.",
        }
    }

    /// Whether units of this class run the mining cycle.
    #[must_use]
    pub const fn is_miner(self) -> bool {
        matches!(self, Self::Miner)
    }
}

/// Base statistics of a unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UnitStats {
    /// Starting health.
    pub health: u32,
    /// Maximum health.
    pub max_health: u32,
    /// Damage per attack.
    pub damage: u32,
    /// Lane speed before scaling (see [`crate::movement::SPEED_FACTOR`]).
    pub speed: u32,
    /// Range rating; engagement range is `range * 40 + 40`.
    pub range: u32,
    /// Gold cost.
    pub cost: u32,
    /// Minimum time between attacks.
    pub attack_interval_ms: Millis,
}

/// Data-driven unit definition.
///
/// # Example RON
///
/// ```ron
/// UnitTemplate(
///     id: "sword",
///     name: "Sword",
///     class: Warrior,
///     stats: UnitStats(
///         health: 100,
///         max_health: 100,
///         damage: 15,
///         speed: 8,
///         range: 1,
///         cost: 125,
///         attack_interval_ms: 800,
///     ),
///     ability: "Dash",
///     lore: "Standard infantry of the Order.",
/// )
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitTemplate {
    /// Unique string identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Class tag.
    pub class: UnitClass,
    /// Base stats.
    pub stats: UnitStats,
    /// Flavour ability name.
    #[serde(default)]
    pub ability: String,
    /// Flavour text.
    #[serde(default)]
    pub lore: String,
}

impl UnitTemplate {
    #[allow(clippy::too_many_arguments)]
    fn standard(
        id: &str,
        name: &str,
        class: UnitClass,
        health: u32,
        damage: u32,
        speed: u32,
        range: u32,
        cost: u32,
        attack_interval_ms: Millis,
        ability: &str,
        lore: &str,
    ) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            class,
            stats: UnitStats {
                health,
                max_health: health,
                damage,
                speed,
                range,
                cost,
                attack_interval_ms,
            },
            ability: ability.to_string(),
            lore: lore.to_string(),
        }
    }
}

/// Ordered collection of unit templates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitCatalog {
    /// Templates in roster order.
    pub units: Vec<UnitTemplate>,
}

impl UnitCatalog {
    /// The built-in twelve-unit roster.
    #[must_use]
    pub fn standard() -> Self {
        use UnitClass::*;
        let units = vec![
            UnitTemplate::standard("miner", "Miner", Miner, 60, 2, 8, 1, 150, 1000, "Gold Rush", "The backbone of the Order economy."),
            UnitTemplate::standard("sword", "Sword", Warrior, 100, 15, 8, 1, 125, 800, "Dash", "Standard infantry of the Order."),
            UnitTemplate::standard("archidon", "Archidon", Ranger, 80, 12, 6, 12, 300, 1200, "Fire Arrow", "Their arrows block out the sun."),
            UnitTemplate::standard("spearton", "Spearton", Tank, 400, 20, 4, 1, 500, 1500, "Shield Wall", "Unmovable defenders."),
            UnitTemplate::standard("magic_kill", "Magic Kill", Mage, 120, 45, 3, 10, 800, 3000, "Blast", "Masters of raw arcane power."),
            UnitTemplate::standard("giant", "Giant", Giant, 1500, 80, 2, 2, 1500, 4000, "Earthquake", "Colossal engines of war."),
            UnitTemplate::standard("dragon", "Dragon", Special, 800, 60, 5, 8, 2000, 2500, "Inferno", "Ancient rulers of the skies."),
            UnitTemplate::standard("bomber", "Bomber", Special, 50, 150, 9, 1, 200, 500, "Explode", "They only have one job, and it's a blast."),
            UnitTemplate::standard("zombie", "Zombie", Warrior, 180, 10, 3, 1, 100, 1200, "Undying", "The dead do not rest in Inamorta."),
            UnitTemplate::standard("ninja", "Ninja", Special, 90, 35, 12, 1, 450, 600, "Vanish", "Strike fast, strike true."),
            UnitTemplate::standard("blood_improver", "Blood Improver", Support, 120, 5, 6, 4, 400, 1000, "Revitalize", "Alchemy used to mend broken spirits."),
            UnitTemplate::standard("arachdon", "Arachdon", Special, 250, 25, 7, 5, 600, 1200, "Web Trap", "Eight-legged nightmares from the caves."),
        ];
        Self { units }
    }

    /// Parse a catalog from RON text and validate it.
    ///
    /// # Errors
    ///
    /// Returns an error if the text does not parse or fails [`validate`](Self::validate).
    pub fn from_ron_str(source: &str) -> Result<Self> {
        let catalog: Self = ron::from_str(source).map_err(|e| GameError::DataParseError {
            path: "<inline>".to_string(),
            message: e.to_string(),
        })?;
        catalog.validate()?;
        Ok(catalog)
    }

    /// Load a catalog from a RON file and validate it.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed, or validated.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|e| GameError::DataParseError {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        let catalog: Self = ron::from_str(&source).map_err(|e| GameError::DataParseError {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        catalog.validate()?;
        Ok(catalog)
    }

    /// Serialize the catalog to pretty RON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_ron_string(&self) -> Result<String> {
        ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
            .map_err(|e| GameError::InvalidState(format!("Failed to serialize catalog: {e}")))
    }

    /// Check structural invariants of the roster.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::CatalogLoadError`] describing the first problem found.
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for unit in &self.units {
            if unit.id.is_empty() || unit.name.is_empty() {
                return Err(GameError::CatalogLoadError(
                    "unit id and name must be non-empty".to_string(),
                ));
            }
            if !seen.insert(unit.id.as_str()) {
                return Err(GameError::CatalogLoadError(format!(
                    "duplicate unit id '{}'",
                    unit.id
                )));
            }
            let stats = unit.stats;
            if stats.health == 0 || stats.health > stats.max_health {
                return Err(GameError::CatalogLoadError(format!(
                    "unit '{}' must satisfy 0 < health <= max_health",
                    unit.id
                )));
            }
            if stats.attack_interval_ms == 0 {
                return Err(GameError::CatalogLoadError(format!(
                    "unit '{}' has a zero attack interval",
                    unit.id
                )));
            }
        }
        if self.miner().is_none() {
            return Err(GameError::CatalogLoadError(
                "catalog has no Miner template".to_string(),
            ));
        }
        Ok(())
    }

    /// Look up a template by id.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&UnitTemplate> {
        self.units.iter().find(|u| u.id == id)
    }

    /// Look up a template that must exist.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::UnknownTemplate`] if `id` is not in the roster.
    pub fn template(&self, id: &str) -> Result<&UnitTemplate> {
        self.get(id)
            .ok_or_else(|| GameError::UnknownTemplate(id.to_string()))
    }

    /// Whether a template id exists.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// The first Miner-class template.
    #[must_use]
    pub fn miner(&self) -> Option<&UnitTemplate> {
        self.units.iter().find(|u| u.class.is_miner())
    }

    /// Templates that are not Miners, in roster order.
    pub fn combat_units(&self) -> impl Iterator<Item = &UnitTemplate> {
        self.units.iter().filter(|u| !u.class.is_miner())
    }

    /// Ids unlocked at the start of a match.
    #[must_use]
    pub fn initial_unlocks(&self) -> Vec<String> {
        self.units
            .iter()
            .take(INITIAL_UNLOCKS)
            .map(|u| u.id.clone())
            .collect()
    }

    /// Number of templates.
    #[must_use]
    pub fn len(&self) -> usize {
        self.units.len()
    }

    /// Whether the catalog has no templates.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }
}

impl Default for UnitCatalog {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_lookup_reports_unknown_id() {
        let catalog = UnitCatalog::standard();
        assert_eq!(catalog.template("giant").unwrap().id, "giant");
        assert!(matches!(
            catalog.template("catapult"),
            Err(GameError::UnknownTemplate(id)) if id == "catapult"
        ));
    }

    #[test]
    fn test_standard_roster_is_valid() {
        let catalog = UnitCatalog::standard();
        assert_eq!(catalog.len(), 12);
        catalog.validate().unwrap();
    }

    #[test]
    fn test_miner_lookup() {
        let catalog = UnitCatalog::standard();
        let miner = catalog.miner().unwrap();
        assert_eq!(miner.id, "miner");
        assert_eq!(miner.stats.cost, 150);
        assert!(catalog.combat_units().all(|u| u.class != UnitClass::Miner));
    }

    #[test]
    fn test_initial_unlocks_are_first_four() {
        let unlocks = UnitCatalog::standard().initial_unlocks();
        assert_eq!(unlocks, vec!["miner", "sword", "archidon", "spearton"]);
    }

    #[test]
    fn test_ron_roundtrip_preserves_roster() {
        let catalog = UnitCatalog::standard();
        let text = catalog.to_ron_string().unwrap();
        let parsed = UnitCatalog::from_ron_str(&text).unwrap();
        assert_eq!(parsed, catalog);
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let mut catalog = UnitCatalog::standard();
        let dup = catalog.units[1].clone();
        catalog.units.push(dup);
        assert!(matches!(
            catalog.validate(),
            Err(GameError::CatalogLoadError(_))
        ));
    }

    #[test]
    fn test_catalog_without_miner_rejected() {
        let mut catalog = UnitCatalog::standard();
        catalog.units.retain(|u| !u.class.is_miner());
        assert!(catalog.validate().is_err());
    }

    #[test]
    fn test_health_above_max_rejected() {
        let mut catalog = UnitCatalog::standard();
        catalog.units[2].stats.health = catalog.units[2].stats.max_health + 1;
        assert!(catalog.validate().is_err());
    }
}
