//! Per-player campaign record.
use serde::{Deserialize, Serialize};

use crate::constants::{STARTING_CP, STARTING_SP};
use crate::hex::{HexPosition, distance};
use crate::ledger::HistoryEntry;

/// Index of a player within the campaign roster.
pub type PlayerId = usize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    #[serde(default)]
    pub team_name: String,
    pub color: String,
    pub position: HexPosition,
    pub supply_points: i32,
    pub campaign_points: i32,
    /// First entry is the starting base and is never removed.
    pub bases: Vec<HexPosition>,
    #[serde(default)]
    pub camps: Vec<HexPosition>,
    #[serde(default)]
    pub hexes_explored: u32,
    #[serde(default)]
    pub operatives_killed: u32,
    #[serde(default)]
    pub games_played: u32,
    #[serde(default)]
    pub games_won: u32,
    #[serde(default)]
    pub games_lost: u32,
    /// Derived from the priority resolver; not authoritative.
    #[serde(default)]
    pub priority: u32,
    #[serde(default)]
    pub history: Vec<HistoryEntry>,
}

impl Player {
    #[must_use]
    pub fn new(id: PlayerId, name: &str, color: &str, start: HexPosition) -> Self {
        Self {
            id,
            name: name.to_string(),
            team_name: default_team_name(id),
            color: color.to_string(),
            position: start,
            supply_points: STARTING_SP,
            campaign_points: STARTING_CP,
            bases: vec![start],
            camps: Vec::new(),
            hexes_explored: 0,
            operatives_killed: 0,
            games_played: 0,
            games_won: 0,
            games_lost: 0,
            priority: 0,
            history: Vec::new(),
        }
    }

    #[must_use]
    pub fn has_base_at(&self, pos: HexPosition) -> bool {
        self.bases.contains(&pos)
    }

    #[must_use]
    pub fn has_camp_at(&self, pos: HexPosition) -> bool {
        self.camps.contains(&pos)
    }

    #[must_use]
    pub fn has_structure_at(&self, pos: HexPosition) -> bool {
        self.has_base_at(pos) || self.has_camp_at(pos)
    }

    /// Bases followed by camps.
    pub fn structures(&self) -> impl Iterator<Item = HexPosition> + '_ {
        self.bases.iter().chain(self.camps.iter()).copied()
    }

    /// Distance from the current position to the closest base or camp.
    #[must_use]
    pub fn distance_to_nearest_structure(&self) -> Option<u32> {
        self.structures()
            .map(|pos| distance(self.position, pos))
            .min()
    }

    #[must_use]
    pub fn starting_base(&self) -> Option<HexPosition> {
        self.bases.first().copied()
    }
}

#[must_use]
pub fn default_player_name(id: PlayerId) -> String {
    format!("Player {}", id + 1)
}

#[must_use]
pub fn default_team_name(id: PlayerId) -> String {
    format!("Kill Team {}", id + 1)
}
