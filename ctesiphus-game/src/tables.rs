//! Static content tables: map sizes plus D36-keyed locations and conditions.
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::OnceLock;

use crate::dice::RewardValue;
use crate::hex::{GridBounds, HexPosition};

const DEFAULT_TABLES_DATA: &str = include_str!("../assets/tables.json");

/// Tier of the map a hex belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HexKind {
    Surface,
    Tomb,
}

impl HexKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Surface => "surface",
            Self::Tomb => "tomb",
        }
    }
}

impl fmt::Display for HexKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a location does for the player who explores or searches it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LocationEffect {
    #[serde(rename = "none")]
    None,
    #[serde(rename = "base")]
    Base,
    #[serde(rename = "freeEncamp")]
    FreeEncamp,
    #[serde(rename = "gainSP")]
    GainSupply,
    #[serde(rename = "gainCP")]
    GainCampaignPoints,
    #[serde(rename = "searchSP")]
    SearchSupply,
    #[serde(rename = "searchCP")]
    SearchCampaignPoints,
    #[serde(rename = "cheapScout")]
    CheapScout,
    #[serde(rename = "bonusResupply")]
    BonusResupply,
    #[serde(rename = "tombEntrance")]
    TombEntrance,
    #[serde(rename = "nullField")]
    NullField,
    #[serde(rename = "freeMovement")]
    FreeMovement,
    #[serde(rename = "portal")]
    Portal,
}

/// Standing condition rolled alongside a location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConditionEffect {
    #[serde(rename = "none")]
    None,
    #[serde(rename = "combat")]
    Combat,
    #[serde(rename = "movementCost")]
    MovementCost,
    #[serde(rename = "enterCost")]
    EnterCost,
    #[serde(rename = "noScout")]
    NoScout,
    #[serde(rename = "noActions")]
    NoActions,
    #[serde(rename = "lockdown")]
    Lockdown,
    #[serde(rename = "terrain")]
    Terrain,
    #[serde(rename = "bonusResupply")]
    BonusResupply,
    #[serde(rename = "reducedResupply")]
    ReducedResupply,
    #[serde(rename = "bonusBattleCP")]
    BonusBattleCampaignPoints,
    #[serde(rename = "cheapEncamp")]
    CheapEncamp,
    #[serde(rename = "bonusSearch")]
    BonusSearch,
    #[serde(rename = "bonusSearchCP")]
    BonusSearchCampaignPoints,
    #[serde(rename = "hostileNPC")]
    HostileNpc,
    #[serde(rename = "threatIncrease")]
    ThreatIncrease,
}

/// One row of a content table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableEntry<E> {
    pub name: String,
    pub description: String,
    pub effect: E,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<RewardValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modifier: Option<i32>,
}

pub type LocationEntry = TableEntry<LocationEffect>;
pub type ConditionEntry = TableEntry<ConditionEffect>;

/// Location and condition tables for one map tier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierTables {
    pub locations: BTreeMap<u8, LocationEntry>,
    pub conditions: BTreeMap<u8, ConditionEntry>,
}

/// Fixed content assigned to starting bases instead of a roll.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaseCampEntry {
    pub location_key: u8,
    pub condition_key: u8,
    pub location: LocationEntry,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableCatalog {
    pub base: BaseCampEntry,
    pub surface: TierTables,
    pub tomb: TierTables,
}

impl TableCatalog {
    /// Parse a catalog from JSON.
    ///
    /// # Errors
    ///
    /// Returns the underlying `serde_json` error when the document does not
    /// match the catalog shape.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    #[must_use]
    pub const fn tier(&self, kind: HexKind) -> &TierTables {
        match kind {
            HexKind::Surface => &self.surface,
            HexKind::Tomb => &self.tomb,
        }
    }

    /// Location entry for `key`, including the base camp row on the surface.
    #[must_use]
    pub fn location(&self, kind: HexKind, key: u8) -> Option<&LocationEntry> {
        if kind == HexKind::Surface && key == self.base.location_key {
            return Some(&self.base.location);
        }
        self.tier(kind).locations.get(&key)
    }

    #[must_use]
    pub fn condition(&self, kind: HexKind, key: u8) -> Option<&ConditionEntry> {
        self.tier(kind).conditions.get(&key)
    }
}

/// Catalog compiled into the crate.
///
/// # Panics
///
/// Panics if the bundled asset is malformed, which the unit tests rule out.
pub fn default_catalog() -> &'static TableCatalog {
    static CATALOG: OnceLock<TableCatalog> = OnceLock::new();
    CATALOG.get_or_init(|| TableCatalog::from_json(DEFAULT_TABLES_DATA).expect("valid tables.json"))
}

/// Map dimensions selected by player count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapConfig {
    pub name: String,
    pub rows: u32,
    pub cols: u32,
    pub surface_rows: u32,
    pub tomb_rows: u32,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            name: String::from("Standard (4 Players)"),
            rows: 7,
            cols: 7,
            surface_rows: 3,
            tomb_rows: 4,
        }
    }
}

impl MapConfig {
    #[must_use]
    pub fn for_player_count(players: usize) -> Option<Self> {
        let (label, rows, cols, surface_rows) = match players {
            2 => ("Small", 5, 5, 2),
            3 => ("Medium", 6, 6, 3),
            4 => ("Standard", 7, 7, 3),
            5 => ("Large", 8, 7, 3),
            6 => ("Extra Large", 8, 8, 3),
            _ => return None,
        };
        Some(Self {
            name: format!("{label} ({players} Players)"),
            rows,
            cols,
            surface_rows,
            tomb_rows: rows - surface_rows,
        })
    }

    #[must_use]
    pub const fn bounds(&self) -> GridBounds {
        GridBounds::new(self.rows, self.cols)
    }

    #[must_use]
    pub const fn kind_of(&self, pos: HexPosition) -> HexKind {
        if pos.row < self.surface_rows {
            HexKind::Surface
        } else {
            HexKind::Tomb
        }
    }

    /// Structural sanity: a non-empty grid with both tiers adding up.
    #[must_use]
    pub const fn is_consistent(&self) -> bool {
        self.rows > 0
            && self.cols > 0
            && self.surface_rows < self.rows
            && self.tomb_rows == self.rows - self.surface_rows
    }
}

const THREAT_LEVEL_NAMES: [&str; 7] = [
    "Dormant",
    "Stirring",
    "Alert",
    "Active",
    "Hostile",
    "Aggressive",
    "Awakened",
];

/// Display name for a threat level; anything past the table is "Awakened".
#[must_use]
pub fn threat_level_name(level: u8) -> &'static str {
    let idx = usize::from(level.clamp(1, 7)) - 1;
    THREAT_LEVEL_NAMES[idx]
}
