use serde::{Deserialize, Serialize};

use super::{Campaign, RuleViolation};
use crate::constants::{THREAT_MAX, THREAT_PER_ROUND};
use crate::event::EventKind;
use crate::phase::Phase;
use crate::player::PlayerId;

/// Result of a successful [`Campaign::next_phase`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PhaseAdvance {
    /// Same player, next phase.
    Phase { phase: Phase },
    /// Next player's turn begins at movement.
    NextPlayer { player: PlayerId },
    /// Round rolled over and threat rose.
    NewRound { round: u32, threat_level: u8 },
    /// Threat reached the target; the campaign is over.
    CampaignEnded { round: u32, threat_level: u8 },
}

impl Campaign {
    /// Advance the phase/turn/round pointers.
    ///
    /// # Errors
    ///
    /// Refuses while the battle phase has no recorded result, and when the
    /// campaign is not running.
    pub fn next_phase(&mut self) -> Result<PhaseAdvance, RuleViolation> {
        self.ensure_active()?;
        let phase = self.state.current_phase;
        if phase.is_mandatory() && !self.state.battle_recorded {
            return self.refuse(RuleViolation::BattleNotRecorded);
        }

        if !phase.ends_turn() {
            let next = phase.next();
            debug_assert!(phase.can_transition_to(next));
            self.state.current_phase = next;
            log::debug!("phase {phase} -> {next}");
            self.emit(EventKind::System, format!("Phase changed to {next}"));
            return Ok(PhaseAdvance::Phase { phase: next });
        }

        self.state.current_phase = Phase::Movement;
        self.state.battle_recorded = false;

        if !self.state.is_last_player() {
            self.state.current_player_index += 1;
            let player = self.state.current_player_index;
            log::debug!("turn passes to player {player}");
            let name = self.player_name(player);
            self.emit(EventKind::System, format!("{name}'s turn"));
            return Ok(PhaseAdvance::NextPlayer { player });
        }

        self.state.current_player_index = 0;
        self.state.current_round = self.state.current_round.saturating_add(1);
        self.state.threat_level = self
            .state
            .threat_level
            .saturating_add(THREAT_PER_ROUND)
            .min(THREAT_MAX);
        let round = self.state.current_round;
        let threat_level = self.state.threat_level;

        if threat_level >= self.state.target_threat_level {
            self.state.game_ended = true;
            log::info!("campaign ended in round {round} at threat {threat_level}");
            self.emit(
                EventKind::System,
                format!("Campaign ended! Final threat level: {threat_level}"),
            );
            return Ok(PhaseAdvance::CampaignEnded {
                round,
                threat_level,
            });
        }

        log::debug!("round {round} begins at threat {threat_level}");
        self.emit(
            EventKind::System,
            format!("Round {round} begins. Threat level: {threat_level}"),
        );
        Ok(PhaseAdvance::NewRound {
            round,
            threat_level,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::campaign::BattleResult;
    use crate::campaign::tests::campaign;

    fn finish_turn(campaign: &mut Campaign) -> PhaseAdvance {
        campaign.next_phase().unwrap();
        campaign.record_battle(BattleResult::Bye, 0).unwrap();
        campaign.next_phase().unwrap();
        campaign.next_phase().unwrap();
        campaign.next_phase().unwrap()
    }

    #[test]
    fn battle_phase_blocks_until_recorded() {
        let mut campaign = campaign(2);
        assert_eq!(
            campaign.next_phase(),
            Ok(PhaseAdvance::Phase {
                phase: Phase::Battle
            })
        );
        let events = campaign.state().event_log.len();
        assert_eq!(campaign.next_phase(), Err(RuleViolation::BattleNotRecorded));
        assert_eq!(campaign.state().current_phase, Phase::Battle);
        assert_eq!(campaign.state().event_log.len(), events + 1);
        assert_eq!(
            campaign.state().last_event().map(|e| e.kind),
            Some(EventKind::Error)
        );

        campaign.record_battle(BattleResult::Draw, 1).unwrap();
        assert_eq!(
            campaign.next_phase(),
            Ok(PhaseAdvance::Phase {
                phase: Phase::Action
            })
        );
    }

    #[test]
    fn turns_rotate_then_round_advances() {
        let mut campaign = campaign(2);
        assert_eq!(
            finish_turn(&mut campaign),
            PhaseAdvance::NextPlayer { player: 1 }
        );
        assert!(!campaign.state().battle_recorded);
        assert_eq!(campaign.state().current_phase, Phase::Movement);
        assert_eq!(
            finish_turn(&mut campaign),
            PhaseAdvance::NewRound {
                round: 2,
                threat_level: 2
            }
        );
        assert_eq!(campaign.state().current_player_index, 0);
    }

    #[test]
    fn campaign_ends_exactly_at_target() {
        let mut campaign = campaign(2);
        campaign.state_mut().target_threat_level = 3;
        finish_turn(&mut campaign);
        finish_turn(&mut campaign);
        assert!(!campaign.state().game_ended);
        finish_turn(&mut campaign);
        let last = finish_turn(&mut campaign);
        assert_eq!(
            last,
            PhaseAdvance::CampaignEnded {
                round: 3,
                threat_level: 3
            }
        );
        assert!(campaign.state().game_ended);
        assert_eq!(campaign.next_phase(), Err(RuleViolation::CampaignOver));
    }

    #[test]
    fn round_counter_saturates() {
        let mut campaign = campaign(2);
        campaign.state_mut().current_round = u32::MAX;
        finish_turn(&mut campaign);
        assert_eq!(
            finish_turn(&mut campaign),
            PhaseAdvance::NewRound {
                round: u32::MAX,
                threat_level: 2
            }
        );
        assert!(!campaign.state().game_ended);
    }
}
