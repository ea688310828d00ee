use chrono::{DateTime, Utc};
use ctesiphus_game::{
    ActionOutcome, BattleResult, Campaign, CampaignAction, CampaignSettings, EventKind, GridBounds,
    HexPosition, Phase, PhaseAdvance, RuleViolation, neighbors, validate_state,
};

fn epoch() -> DateTime<Utc> {
    DateTime::<Utc>::UNIX_EPOCH
}

fn start(players: usize, seed: u64) -> Campaign {
    Campaign::start_with_clock(CampaignSettings::for_players(players).with_seed(seed), epoch)
        .unwrap()
}

/// Advance through battle, action and threat with a bye and no action.
fn pass_turn(campaign: &mut Campaign) -> PhaseAdvance {
    assert_eq!(campaign.state().current_phase, Phase::Movement);
    campaign.next_phase().unwrap();
    campaign.record_battle(BattleResult::Bye, 0).unwrap();
    campaign.next_phase().unwrap();
    campaign.next_phase().unwrap();
    campaign.next_phase().unwrap()
}

#[test]
fn game_start_scenario() {
    let settings = CampaignSettings::for_players(2).with_names(["Alice", "Bob"]);
    let campaign = Campaign::start_with_clock(settings, epoch).unwrap();
    let state = campaign.state();
    assert_eq!(state.players.len(), 2);
    for player in &state.players {
        assert_eq!(player.supply_points, 10);
        assert_eq!(player.campaign_points, 0);
    }
    assert_eq!(state.players[1].name, "Bob");
    assert_eq!(state.current_phase, Phase::Movement);
    assert_eq!(state.current_round, 1);
    assert_eq!(state.threat_level, 1);
    assert!(!state.game_ended);
    assert_eq!(state.map_config.name, "Small (2 Players)");
}

#[test]
fn supply_floor_scenario() {
    let mut campaign = start(2, 1);
    campaign.state_mut().players[0].supply_points = 3;
    let position = campaign.state().players[0].position;
    let events = campaign.state().event_log.len();

    let result = campaign.move_player(0, HexPosition::new(3, 3), 5);
    assert!(matches!(result, Err(RuleViolation::InsufficientSupply { .. })));
    let player = &campaign.state().players[0];
    assert_eq!(player.supply_points, 3);
    assert_eq!(player.position, position);
    assert_eq!(campaign.state().event_log.len(), events + 1);
    assert_eq!(campaign.state().last_event().unwrap().kind, EventKind::Error);
}

#[test]
fn resupply_cap_scenario() {
    let mut campaign = start(2, 2);
    campaign.next_phase().unwrap();
    campaign.record_battle(BattleResult::Victory, 0).unwrap();
    campaign.next_phase().unwrap();
    campaign.state_mut().players[0].supply_points = 9;

    let outcome = campaign.perform_action(CampaignAction::Resupply).unwrap();
    assert_eq!(outcome, ActionOutcome::Resupplied { gained: 1 });
    let player = &campaign.state().players[0];
    assert_eq!(player.supply_points, 10);
    let entry = player.history.last().unwrap();
    assert_eq!(entry.sp_change(), 1);
    assert_eq!(entry.reason, "Resupply action");
    assert_eq!(entry.phase, Phase::Action);
}

#[test]
fn mandatory_battle_scenario() {
    let mut campaign = start(3, 3);
    campaign.next_phase().unwrap();
    let events = campaign.state().event_log.len();

    assert_eq!(campaign.next_phase(), Err(RuleViolation::BattleNotRecorded));
    assert_eq!(campaign.state().current_phase, Phase::Battle);
    assert_eq!(campaign.state().event_log.len(), events + 1);
    assert_eq!(campaign.state().last_event().unwrap().kind, EventKind::Error);

    campaign.record_battle(BattleResult::Defeat, 2).unwrap();
    assert_eq!(
        campaign.next_phase(),
        Ok(PhaseAdvance::Phase {
            phase: Phase::Action
        })
    );
}

#[test]
fn campaign_end_scenario() {
    let settings = CampaignSettings::for_players(3)
        .with_seed(4)
        .with_target_threat(4);
    let mut campaign = Campaign::start_with_clock(settings, epoch).unwrap();

    let mut rounds_completed = 0;
    loop {
        let advance = pass_turn(&mut campaign);
        let state = campaign.state();
        match advance {
            PhaseAdvance::NextPlayer { .. } => assert!(!state.game_ended),
            PhaseAdvance::NewRound { threat_level, .. } => {
                rounds_completed += 1;
                assert!(threat_level < state.target_threat_level);
                assert!(!state.game_ended);
            }
            PhaseAdvance::CampaignEnded {
                round,
                threat_level,
            } => {
                rounds_completed += 1;
                assert_eq!(threat_level, 4);
                assert_eq!(round, 4);
                assert!(state.game_ended);
                break;
            }
            PhaseAdvance::Phase { .. } => panic!("threat phase should end the turn"),
        }
    }
    assert_eq!(rounds_completed, 3);
    assert_eq!(
        campaign.record_battle(BattleResult::Bye, 0),
        Err(RuleViolation::CampaignOver)
    );
}

#[test]
fn full_campaign_keeps_invariants() {
    let settings = CampaignSettings::for_players(4)
        .with_seed(0x5EED)
        .with_target_threat(5);
    let mut campaign = Campaign::start_with_clock(settings, epoch).unwrap();
    let bounds: GridBounds = campaign.state().map_config.bounds();
    let results = [
        BattleResult::Victory,
        BattleResult::Defeat,
        BattleResult::Draw,
        BattleResult::Bye,
    ];

    let mut turn = 0usize;
    while !campaign.state().game_ended {
        let actor = campaign.state().current_player_index;
        let here = campaign.state().players[actor].position;
        let next = neighbors(here, bounds)
            .into_iter()
            .find(|pos| campaign.state().hex(*pos).is_some_and(|h| !h.explored))
            .or_else(|| neighbors(here, bounds).first().copied());
        if let Some(target) = next {
            if campaign.state().players[actor].supply_points >= 1 {
                campaign.move_player(actor, target, 1).unwrap();
            }
        }
        campaign.next_phase().unwrap();
        campaign
            .record_battle(results[turn % results.len()], (turn % 3) as u32)
            .unwrap();
        campaign.next_phase().unwrap();

        let action = match turn % 3 {
            0 => CampaignAction::Search,
            1 => CampaignAction::Encamp {
                cost: campaign.calculate_encamp_cost(actor).unwrap_or(0),
            },
            _ => CampaignAction::Resupply,
        };
        // Encamping can be refused on an occupied hex or with too little SP.
        let _ = campaign.perform_action(action);
        campaign.next_phase().unwrap();
        campaign.next_phase().unwrap();
        turn += 1;

        assert!(validate_state(campaign.state()).is_empty());
        for player in &campaign.state().players {
            assert!((0..=10).contains(&player.supply_points));
        }
    }

    let state = campaign.state();
    assert_eq!(state.threat_level, 5);
    assert_eq!(turn, 4 * 4);
    assert_eq!(
        state.players.iter().map(|p| p.games_played).sum::<u32>(),
        16
    );
    assert!(state.explored_count() > 4);
    let standings = campaign.standings();
    assert_eq!(standings.overall.len(), 4);
    assert!(standings.champion().is_some());
}
