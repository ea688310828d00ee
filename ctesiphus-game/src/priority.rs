//! Turn priority: the weakest kill team chooses first.
use serde::{Deserialize, Serialize};

use crate::player::{Player, PlayerId};

/// Priority assigned to one player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriorityRank {
    pub player_id: PlayerId,
    /// 1-based; players tied on both keys share a value.
    pub priority: u32,
    pub campaign_points: i32,
    pub supply_points: i32,
}

impl PriorityRank {
    const fn key(&self) -> (i32, i32) {
        (self.campaign_points, self.supply_points)
    }
}

/// Rank players by ascending campaign points, then ascending supply.
///
/// The sort is stable, so fully tied players keep roster order and share the
/// same priority (competition ranking: 1, 1, 3).
#[must_use]
pub fn determine_priority(players: &[Player]) -> Vec<PriorityRank> {
    let mut ranks: Vec<PriorityRank> = players
        .iter()
        .map(|p| PriorityRank {
            player_id: p.id,
            priority: 1,
            campaign_points: p.campaign_points,
            supply_points: p.supply_points,
        })
        .collect();
    ranks.sort_by_key(PriorityRank::key);

    let mut current = 1;
    for idx in 1..ranks.len() {
        if ranks[idx].key() != ranks[idx - 1].key() {
            current = u32::try_from(idx + 1).unwrap_or(u32::MAX);
        }
        ranks[idx].priority = current;
    }
    ranks
}

/// True when two or more players tie for first priority and a roll-off is
/// needed to break it.
#[must_use]
pub fn needs_roll_off(players: &[Player]) -> bool {
    let Some(lowest_cp) = players.iter().map(|p| p.campaign_points).min() else {
        return false;
    };
    let contenders: Vec<&Player> = players
        .iter()
        .filter(|p| p.campaign_points == lowest_cp)
        .collect();
    let Some(lowest_sp) = contenders.iter().map(|p| p.supply_points).min() else {
        return false;
    };
    contenders
        .iter()
        .filter(|p| p.supply_points == lowest_sp)
        .count()
        >= 2
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hex::HexPosition;

    fn player(id: PlayerId, cp: i32, sp: i32) -> Player {
        let mut p = Player::new(id, &format!("P{id}"), "#000000", HexPosition::new(0, 0));
        p.campaign_points = cp;
        p.supply_points = sp;
        p
    }

    #[test]
    fn empty_and_single_inputs() {
        assert!(determine_priority(&[]).is_empty());
        let single = determine_priority(&[player(0, 4, 2)]);
        assert_eq!(single.len(), 1);
        assert_eq!(single[0].priority, 1);
        assert!(!needs_roll_off(&[player(0, 4, 2)]));
    }

    #[test]
    fn lowest_cp_goes_first_then_lowest_sp() {
        let players = [player(0, 3, 5), player(1, 1, 8), player(2, 1, 2), player(3, 2, 0)];
        let ranks = determine_priority(&players);
        let order: Vec<_> = ranks.iter().map(|r| (r.player_id, r.priority)).collect();
        assert_eq!(order, vec![(2, 1), (1, 2), (3, 3), (0, 4)]);
    }

    #[test]
    fn ties_share_competition_rank() {
        let players = [player(0, 1, 3), player(1, 1, 3), player(2, 2, 0)];
        let ranks = determine_priority(&players);
        let order: Vec<_> = ranks.iter().map(|r| (r.player_id, r.priority)).collect();
        assert_eq!(order, vec![(0, 1), (1, 1), (2, 3)]);
    }

    #[test]
    fn roll_off_only_for_first_place_ties() {
        assert!(needs_roll_off(&[player(0, 0, 10), player(1, 0, 10)]));
        assert!(!needs_roll_off(&[player(0, 0, 9), player(1, 0, 10)]));
        assert!(!needs_roll_off(&[
            player(0, 0, 1),
            player(1, 2, 4),
            player(2, 2, 4)
        ]));
    }
}
