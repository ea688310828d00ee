//! End-of-campaign standings.
//!
//! Each category ranks the roster on one statistic. A player earns
//! `roster size - rank index` points per category, and the champion is the
//! player with the highest sum.
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::player::{Player, PlayerId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StandingCategory {
    /// Campaign points.
    Warlord,
    /// Hexes explored.
    Explorer,
    /// Operatives killed.
    Headhunter,
    /// Supply remaining.
    Pioneer,
    /// Games played.
    Trooper,
}

impl StandingCategory {
    pub const ALL: [Self; 5] = [
        Self::Warlord,
        Self::Explorer,
        Self::Headhunter,
        Self::Pioneer,
        Self::Trooper,
    ];

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Warlord => "Warlord",
            Self::Explorer => "Explorer",
            Self::Headhunter => "Headhunter",
            Self::Pioneer => "Pioneer",
            Self::Trooper => "Trooper",
        }
    }

    #[must_use]
    pub const fn stat_name(self) -> &'static str {
        match self {
            Self::Warlord => "CP",
            Self::Explorer => "hexes explored",
            Self::Headhunter => "operatives killed",
            Self::Pioneer => "SP remaining",
            Self::Trooper => "games played",
        }
    }

    #[must_use]
    pub fn score(self, player: &Player) -> i64 {
        match self {
            Self::Warlord => i64::from(player.campaign_points),
            Self::Explorer => i64::from(player.hexes_explored),
            Self::Headhunter => i64::from(player.operatives_killed),
            Self::Pioneer => i64::from(player.supply_points),
            Self::Trooper => i64::from(player.games_played),
        }
    }
}

impl fmt::Display for StandingCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryEntry {
    pub player_id: PlayerId,
    pub value: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRanking {
    pub category: StandingCategory,
    /// Best first; ties keep roster order.
    pub entries: Vec<CategoryEntry>,
}

impl CategoryRanking {
    #[must_use]
    pub fn leader(&self) -> Option<PlayerId> {
        self.entries.first().map(|e| e.player_id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverallScore {
    pub player_id: PlayerId,
    pub score: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Standings {
    pub categories: Vec<CategoryRanking>,
    /// Best first.
    pub overall: Vec<OverallScore>,
}

impl Standings {
    #[must_use]
    pub fn champion(&self) -> Option<PlayerId> {
        self.overall.first().map(|s| s.player_id)
    }

    #[must_use]
    pub fn category(&self, category: StandingCategory) -> Option<&CategoryRanking> {
        self.categories.iter().find(|c| c.category == category)
    }
}

#[must_use]
pub fn compute_standings(players: &[Player]) -> Standings {
    let roster = u32::try_from(players.len()).unwrap_or(u32::MAX);
    let mut totals: Vec<OverallScore> = players
        .iter()
        .map(|p| OverallScore {
            player_id: p.id,
            score: 0,
        })
        .collect();

    let categories = StandingCategory::ALL
        .iter()
        .map(|&category| {
            let mut entries: Vec<CategoryEntry> = players
                .iter()
                .map(|p| CategoryEntry {
                    player_id: p.id,
                    value: category.score(p),
                })
                .collect();
            entries.sort_by(|a, b| b.value.cmp(&a.value));
            for (idx, entry) in entries.iter().enumerate() {
                let points = roster.saturating_sub(u32::try_from(idx).unwrap_or(u32::MAX));
                if let Some(total) = totals.iter_mut().find(|t| t.player_id == entry.player_id) {
                    total.score += points;
                }
            }
            CategoryRanking { category, entries }
        })
        .collect();

    totals.sort_by(|a, b| b.score.cmp(&a.score));
    Standings {
        categories,
        overall: totals,
    }
}
