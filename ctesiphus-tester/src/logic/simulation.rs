use std::cell::RefCell;
use std::collections::HashMap;
use std::convert::Infallible;
use std::hash::Hasher;

use chrono::{DateTime, Utc};
use ctesiphus_game::{
    BattleResult, Campaign, CampaignEngine, CampaignSettings, CampaignState, CampaignStorage,
    PhaseAdvance, RuleViolation, validate_state,
};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use twox_hash::XxHash64;

use crate::logic::policy::{GameplayStrategy, PlayerPolicy};

/// Simulations pin time so identical seeds hash identically.
fn simulation_clock() -> DateTime<Utc> {
    DateTime::<Utc>::UNIX_EPOCH
}

/// Configuration for a simulation session.
#[derive(Debug, Clone, Copy)]
pub struct SimulationConfig {
    pub seed: u64,
    pub players: usize,
    pub strategy: GameplayStrategy,
    pub target_threat: u8,
    pub solo_mode: bool,
    /// Save and reload through the storage seam at every round boundary.
    pub roundtrip_each_round: bool,
    pub max_turns: u32,
}

impl SimulationConfig {
    #[must_use]
    pub const fn new(players: usize, strategy: GameplayStrategy, seed: u64) -> Self {
        Self {
            seed,
            players,
            strategy,
            target_threat: 7,
            solo_mode: false,
            roundtrip_each_round: false,
            max_turns: 400,
        }
    }

    #[must_use]
    pub const fn with_target_threat(mut self, target: u8) -> Self {
        self.target_threat = target;
        self
    }

    #[must_use]
    pub const fn with_solo_mode(mut self, solo: bool) -> Self {
        self.solo_mode = solo;
        self
    }

    #[must_use]
    pub const fn with_roundtrip(mut self, roundtrip: bool) -> Self {
        self.roundtrip_each_round = roundtrip;
        self
    }

    fn settings(&self) -> CampaignSettings {
        CampaignSettings::for_players(self.players)
            .with_seed(self.seed)
            .with_target_threat(self.target_threat)
            .with_solo_mode(self.solo_mode)
    }
}

/// Outcome of one player's full turn.
#[derive(Debug, Clone)]
pub struct TurnRecord {
    pub round: u32,
    pub player: usize,
    pub moved: bool,
    pub battle: BattleResult,
    pub action: Option<String>,
    pub advance: Option<PhaseAdvance>,
}

#[derive(Debug, Clone)]
pub struct SimulationSummary {
    pub seed: u64,
    pub strategy: GameplayStrategy,
    pub players: usize,
    pub turns: Vec<TurnRecord>,
    pub game_ended: bool,
    /// Rule refusals raised by the engine during play.
    pub refusals: usize,
    /// Broken invariants; any entry fails the run.
    pub violations: Vec<String>,
    pub champion: Option<String>,
    pub state_hash: u64,
    pub final_state: CampaignState,
}

#[derive(Default)]
struct MemoryStorage {
    snapshots: RefCell<HashMap<String, String>>,
}

impl CampaignStorage for MemoryStorage {
    type Error = Infallible;

    fn load_snapshot(&self, id: &str) -> Result<Option<String>, Self::Error> {
        Ok(self.snapshots.borrow().get(id).cloned())
    }

    fn save_snapshot(&self, id: &str, snapshot: &str) -> Result<(), Self::Error> {
        self.snapshots
            .borrow_mut()
            .insert(id.to_string(), snapshot.to_string());
        Ok(())
    }

    fn delete_snapshot(&self, id: &str) -> Result<(), Self::Error> {
        self.snapshots.borrow_mut().remove(id);
        Ok(())
    }
}

/// Core deterministic simulation harness used by the tester.
pub struct SimulationSession {
    config: SimulationConfig,
    campaign: Campaign,
    policy: Box<dyn PlayerPolicy + Send>,
    battle_rng: ChaCha20Rng,
    engine: CampaignEngine<MemoryStorage>,
    refusals: usize,
    violations: Vec<String>,
    turns: Vec<TurnRecord>,
}

impl SimulationSession {
    /// # Errors
    ///
    /// Returns an error if the configured settings are rejected.
    pub fn new(config: SimulationConfig) -> anyhow::Result<Self> {
        let campaign = Campaign::start_with_clock(config.settings(), simulation_clock)?;
        let policy = config.strategy.create_policy(config.seed);
        log::debug!(
            "seed {}: {} players under the {} policy",
            config.seed,
            config.players,
            policy.name()
        );
        Ok(Self {
            policy,
            battle_rng: ChaCha20Rng::seed_from_u64(config.seed.rotate_left(17)),
            engine: CampaignEngine::new(MemoryStorage::default()),
            config,
            campaign,
            refusals: 0,
            violations: Vec::new(),
            turns: Vec::new(),
        })
    }

    /// Play until the campaign ends or the turn budget runs out.
    ///
    /// # Errors
    ///
    /// Returns an error when a save/load roundtrip fails.
    pub fn run(mut self) -> anyhow::Result<SimulationSummary> {
        while !self.campaign.state().game_ended
            && self.turns.len() < self.config.max_turns as usize
        {
            let record = self.play_turn();
            let new_round = matches!(record.advance, Some(PhaseAdvance::NewRound { .. }));
            self.turns.push(record);
            if new_round && self.config.roundtrip_each_round {
                self.roundtrip()?;
            }
            if !self.violations.is_empty() {
                break;
            }
        }
        Ok(self.finish())
    }

    /// One player's turn: movement, battle, action, threat.
    pub fn play_turn(&mut self) -> TurnRecord {
        let round = self.campaign.state().current_round;
        let player = self.campaign.state().current_player_index;

        let moved = match self.policy.plan_move(&self.campaign, player) {
            Some(plan) => {
                self.guarded(|c| c.move_player(player, plan.target, plan.cost).map(drop))
            }
            None => false,
        };
        let advanced = self.guarded(|c| c.next_phase().map(drop));
        debug_assert!(advanced);

        let battle = self.roll_battle();
        let kills = self.battle_rng.gen_range(0..=3);
        self.guarded(|c| c.record_battle(battle, kills).map(drop));
        self.guarded(|c| c.next_phase().map(drop));

        let action = self.policy.plan_action(&self.campaign, player);
        if let Some(action) = action {
            self.guarded(|c| c.perform_action(action).map(drop));
        }
        self.guarded(|c| c.next_phase().map(drop));

        let mut advance = None;
        let before = self.campaign.state().clone();
        match self.campaign.next_phase() {
            Ok(step) => advance = Some(step),
            Err(err) => self.note_refusal(&before, &err),
        }
        self.check_invariants();

        TurnRecord {
            round,
            player,
            moved,
            battle,
            action: action.map(|a| a.kind().to_string()),
            advance,
        }
    }

    fn roll_battle(&mut self) -> BattleResult {
        match self.battle_rng.gen_range(0..10) {
            0..=3 => BattleResult::Victory,
            4..=6 => BattleResult::Defeat,
            7 | 8 => BattleResult::Draw,
            _ => BattleResult::Bye,
        }
    }

    /// Run an engine call; a refusal must leave everything but the event
    /// log untouched.
    fn guarded(&mut self, op: impl FnOnce(&mut Campaign) -> Result<(), RuleViolation>) -> bool {
        let before = self.campaign.state().clone();
        match op(&mut self.campaign) {
            Ok(()) => {
                self.check_invariants();
                true
            }
            Err(err) => {
                self.note_refusal(&before, &err);
                false
            }
        }
    }

    fn note_refusal(&mut self, before: &CampaignState, err: &RuleViolation) {
        self.refusals += 1;
        log::debug!("seed {} refused: {err}", self.config.seed);
        let mut after = self.campaign.state().clone();
        if after.event_log.len() != before.event_log.len() + 1 {
            self.violations
                .push(format!("refusal '{err}' did not log exactly one event"));
        }
        after.event_log.truncate(before.event_log.len());
        if &after != before {
            self.violations
                .push(format!("refusal '{err}' mutated campaign state"));
        }
    }

    fn check_invariants(&mut self) {
        let state = self.campaign.state();
        for issue in validate_state(state) {
            self.violations.push(format!(
                "round {} player {}: {issue}",
                state.current_round, state.current_player_index
            ));
        }
    }

    fn roundtrip(&mut self) -> anyhow::Result<()> {
        let id = format!("sim-{}", self.config.seed);
        self.engine.save(&id, &self.campaign)?;
        let loaded = self
            .engine
            .load(&id)?
            .ok_or_else(|| anyhow::anyhow!("snapshot {id} vanished"))?;
        self.campaign = loaded.with_clock(simulation_clock);
        Ok(())
    }

    fn finish(self) -> SimulationSummary {
        let standings = self.campaign.standings();
        let state = self.campaign.into_state();
        let champion = standings
            .champion()
            .and_then(|id| state.player(id))
            .map(|p| p.name.clone());
        let bytes = serde_json::to_vec(&state).unwrap_or_default();
        let mut hasher = XxHash64::with_seed(0);
        hasher.write(&bytes);
        SimulationSummary {
            seed: self.config.seed,
            strategy: self.config.strategy,
            players: self.config.players,
            turns: self.turns,
            game_ended: state.game_ended,
            refusals: self.refusals,
            violations: self.violations,
            champion,
            state_hash: hasher.finish(),
            final_state: state,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn balanced_campaign_runs_to_completion() {
        let config = SimulationConfig::new(3, GameplayStrategy::Balanced, 42).with_target_threat(4);
        let summary = SimulationSession::new(config).unwrap().run().unwrap();
        assert!(summary.game_ended);
        assert!(summary.violations.is_empty(), "{:?}", summary.violations);
        assert_eq!(summary.turns.len(), 3 * 3);
        assert_eq!(summary.final_state.threat_level, 4);
        assert!(summary.champion.is_some());
    }

    #[test]
    fn same_seed_same_hash() {
        let config = SimulationConfig::new(4, GameplayStrategy::Random, 7);
        let a = SimulationSession::new(config).unwrap().run().unwrap();
        let b = SimulationSession::new(config).unwrap().run().unwrap();
        assert_eq!(a.state_hash, b.state_hash);
    }

    #[test]
    fn roundtrips_do_not_change_the_outcome() {
        let config = SimulationConfig::new(2, GameplayStrategy::Aggressive, 11);
        let plain = SimulationSession::new(config).unwrap().run().unwrap();
        let saved = SimulationSession::new(config.with_roundtrip(true))
            .unwrap()
            .run()
            .unwrap();
        assert!(saved.violations.is_empty(), "{:?}", saved.violations);
        assert_eq!(plain.state_hash, saved.state_hash);
    }

    #[test]
    fn invalid_player_count_is_rejected() {
        let config = SimulationConfig::new(9, GameplayStrategy::Balanced, 1);
        assert!(SimulationSession::new(config).is_err());
    }
}
