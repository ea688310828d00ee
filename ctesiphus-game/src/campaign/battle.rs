use serde::{Deserialize, Serialize};
use std::fmt;

use super::{Campaign, RuleViolation};
use crate::constants::{BYE_REWARD, DEFEAT_REWARD, DRAW_REWARD, VICTORY_REWARD};
use crate::event::EventKind;
use crate::player::PlayerId;

/// Outcome of a tabletop game played during the battle phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BattleResult {
    Victory,
    Draw,
    Defeat,
    Bye,
}

impl BattleResult {
    pub const ALL: [Self; 4] = [Self::Victory, Self::Draw, Self::Defeat, Self::Bye];

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Victory => "Victory",
            Self::Draw => "Draw",
            Self::Defeat => "Defeat",
            Self::Bye => "Bye",
        }
    }

    /// `(supply, campaign points)` awarded for this result.
    #[must_use]
    pub const fn rewards(self) -> (i32, i32) {
        match self {
            Self::Victory => VICTORY_REWARD,
            Self::Draw => DRAW_REWARD,
            Self::Defeat => DEFEAT_REWARD,
            Self::Bye => BYE_REWARD,
        }
    }
}

impl fmt::Display for BattleResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BattleRecord {
    pub player: PlayerId,
    pub result: BattleResult,
    pub operatives_killed: u32,
    /// Supply credited after clamping.
    pub supply_gained: i32,
    pub campaign_points_gained: i32,
}

impl Campaign {
    /// Record the current player's battle result for this turn.
    ///
    /// # Errors
    ///
    /// Refuses a second result in the same turn and any call outside a
    /// running campaign.
    pub fn record_battle(
        &mut self,
        result: BattleResult,
        operatives_killed: u32,
    ) -> Result<BattleRecord, RuleViolation> {
        let actor = self.ensure_active()?;
        if self.state.battle_recorded {
            return self.refuse(RuleViolation::BattleAlreadyRecorded);
        }
        let (sp, cp) = result.rewards();
        let label = result.label();
        let entry = self.apply_to(actor, sp, cp, format!("Battle result: {label}"));
        let (supply_gained, campaign_points_gained) =
            entry.map_or((0, 0), |e| (e.sp_change(), e.cp_change()));

        let name = self.player_name(actor);
        if let Some(player) = self.state.player_mut(actor) {
            player.games_played = player.games_played.saturating_add(1);
            match result {
                BattleResult::Victory => player.games_won = player.games_won.saturating_add(1),
                BattleResult::Defeat => player.games_lost = player.games_lost.saturating_add(1),
                BattleResult::Draw | BattleResult::Bye => {}
            }
            player.operatives_killed = player.operatives_killed.saturating_add(operatives_killed);
        }
        self.state.battle_recorded = true;
        log::debug!("player {actor} recorded {label}");
        self.emit(
            EventKind::Battle,
            format!("{name}: {label} (+{cp} CP, +{sp} SP)"),
        );
        Ok(BattleRecord {
            player: actor,
            result,
            operatives_killed,
            supply_gained,
            campaign_points_gained,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::campaign::tests::campaign;

    #[test]
    fn reward_table_matches_results() {
        assert_eq!(BattleResult::Victory.rewards(), (0, 1));
        assert_eq!(BattleResult::Draw.rewards(), (1, 0));
        assert_eq!(BattleResult::Defeat.rewards(), (1, 0));
        assert_eq!(BattleResult::Bye.rewards(), (2, 0));
        assert_eq!(BattleResult::Bye.to_string(), "Bye");
    }

    #[test]
    fn victory_updates_counters_and_ledger() {
        let mut campaign = campaign(2);
        campaign.next_phase().unwrap();
        let record = campaign.record_battle(BattleResult::Victory, 3).unwrap();
        assert_eq!(record.campaign_points_gained, 1);
        assert_eq!(record.supply_gained, 0);

        let player = &campaign.state().players[0];
        assert_eq!(player.campaign_points, 1);
        assert_eq!((player.games_played, player.games_won, player.games_lost), (1, 1, 0));
        assert_eq!(player.operatives_killed, 3);
        assert_eq!(player.history[0].reason, "Battle result: Victory");
        assert!(campaign.state().battle_recorded);

        let event = campaign.state().last_event().unwrap();
        assert_eq!(event.kind, EventKind::Battle);
        assert_eq!(event.message, "Player 1: Victory (+1 CP, +0 SP)");
    }

    #[test]
    fn defeat_at_full_supply_is_clamped() {
        let mut campaign = campaign(2);
        let record = campaign.record_battle(BattleResult::Defeat, 0).unwrap();
        assert_eq!(record.supply_gained, 0);
        let player = &campaign.state().players[0];
        assert_eq!(player.supply_points, 10);
        assert_eq!(player.games_lost, 1);
    }

    #[test]
    fn second_result_in_a_turn_is_refused() {
        let mut campaign = campaign(2);
        campaign.record_battle(BattleResult::Draw, 0).unwrap();
        let before = campaign.state().players[0].clone();
        assert_eq!(
            campaign.record_battle(BattleResult::Victory, 2),
            Err(RuleViolation::BattleAlreadyRecorded)
        );
        assert_eq!(campaign.state().players[0], before);
    }

    #[test]
    fn counters_saturate_instead_of_wrapping() {
        let mut campaign = campaign(2);
        {
            let player = &mut campaign.state_mut().players[0];
            player.operatives_killed = u32::MAX;
            player.games_played = u32::MAX;
            player.games_won = u32::MAX;
        }
        campaign.next_phase().unwrap();
        campaign.record_battle(BattleResult::Victory, 5).unwrap();
        let player = &campaign.state().players[0];
        assert_eq!(player.operatives_killed, u32::MAX);
        assert_eq!(player.games_played, u32::MAX);
        assert_eq!(player.games_won, u32::MAX);
        assert_eq!(player.campaign_points, 1);
    }
}
