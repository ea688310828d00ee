use anyhow::{Result, ensure};

use crate::logic::policy::GameplayStrategy;
use crate::logic::simulation::{SimulationConfig, SimulationSummary};

/// Check applied to every finished simulation of a scenario.
pub type Expectation = fn(&SimulationSummary) -> Result<()>;

/// Everything needed to run one scenario against a seed.
#[derive(Debug, Clone)]
pub struct SimulationPlan {
    pub players: usize,
    pub strategy: GameplayStrategy,
    pub target_threat: u8,
    pub solo_mode: bool,
    pub roundtrip_each_round: bool,
    pub expectations: Vec<Expectation>,
}

impl SimulationPlan {
    #[must_use]
    pub fn new(players: usize, strategy: GameplayStrategy) -> Self {
        Self {
            players,
            strategy,
            target_threat: 7,
            solo_mode: false,
            roundtrip_each_round: false,
            expectations: vec![expect_no_violations],
        }
    }

    #[must_use]
    pub const fn with_target_threat(mut self, target: u8) -> Self {
        self.target_threat = target;
        self
    }

    #[must_use]
    pub const fn with_solo_mode(mut self) -> Self {
        self.solo_mode = true;
        self
    }

    #[must_use]
    pub const fn with_roundtrip(mut self) -> Self {
        self.roundtrip_each_round = true;
        self
    }

    #[must_use]
    pub fn require(mut self, expectation: Expectation) -> Self {
        self.expectations.push(expectation);
        self
    }

    #[must_use]
    pub const fn config(&self, seed: u64) -> SimulationConfig {
        SimulationConfig::new(self.players, self.strategy, seed)
            .with_target_threat(self.target_threat)
            .with_solo_mode(self.solo_mode)
            .with_roundtrip(self.roundtrip_each_round)
    }
}

#[derive(Debug, Clone)]
pub struct TestScenario {
    pub key: &'static str,
    pub name: String,
    pub description: &'static str,
    pub plan: SimulationPlan,
}

fn expect_no_violations(summary: &SimulationSummary) -> Result<()> {
    ensure!(
        summary.violations.is_empty(),
        "{} invariant violation(s), first: {}",
        summary.violations.len(),
        summary.violations[0]
    );
    Ok(())
}

fn expect_completed(summary: &SimulationSummary) -> Result<()> {
    ensure!(summary.game_ended, "campaign halted after {} turns", summary.turns.len());
    Ok(())
}

/// Without solo threat, the campaign ends exactly when the round count
/// reaches the target threat.
fn expect_round_count_matches_threat(summary: &SimulationSummary) -> Result<()> {
    let state = &summary.final_state;
    ensure!(
        state.threat_level == state.target_threat_level,
        "final threat {} differs from target {}",
        state.threat_level,
        state.target_threat_level
    );
    ensure!(
        state.current_round == u32::from(state.target_threat_level),
        "ended in round {} for target {}",
        state.current_round,
        state.target_threat_level
    );
    let expected_turns = summary.players * (usize::from(state.target_threat_level) - 1);
    ensure!(
        summary.turns.len() == expected_turns,
        "played {} turns, expected {expected_turns}",
        summary.turns.len()
    );
    Ok(())
}

fn expect_exploration(summary: &SimulationSummary) -> Result<()> {
    let explored = summary.final_state.explored_count();
    ensure!(
        explored > summary.players,
        "only {explored} hexes explored by {} players",
        summary.players
    );
    Ok(())
}

fn expect_every_battle_recorded(summary: &SimulationSummary) -> Result<()> {
    let played: u32 = summary
        .final_state
        .players
        .iter()
        .map(|p| p.games_played)
        .sum();
    ensure!(
        played as usize == summary.turns.len(),
        "{played} battles recorded over {} turns",
        summary.turns.len()
    );
    Ok(())
}

fn expect_champion(summary: &SimulationSummary) -> Result<()> {
    ensure!(summary.champion.is_some(), "no champion crowned");
    Ok(())
}

fn build_catalog() -> Vec<TestScenario> {
    let standard = |players, strategy| {
        SimulationPlan::new(players, strategy)
            .require(expect_completed)
            .require(expect_round_count_matches_threat)
            .require(expect_every_battle_recorded)
    };
    vec![
        TestScenario {
            key: "smoke",
            name: "Smoke".to_string(),
            description: "Two-player balanced campaign to a short threat target",
            plan: standard(2, GameplayStrategy::Balanced).with_target_threat(3),
        },
        TestScenario {
            key: "full-campaign",
            name: "Full Campaign".to_string(),
            description: "Four players, default target threat, standings at the end",
            plan: standard(4, GameplayStrategy::Balanced)
                .require(expect_exploration)
                .require(expect_champion),
        },
        TestScenario {
            key: "max-players",
            name: "Max Players".to_string(),
            description: "Six aggressive players on the extra large map",
            plan: standard(6, GameplayStrategy::Aggressive).require(expect_exploration),
        },
        TestScenario {
            key: "cautious",
            name: "Cautious Play".to_string(),
            description: "Three cautious players who hoard supply",
            plan: standard(3, GameplayStrategy::Cautious),
        },
        TestScenario {
            key: "random-play",
            name: "Random Play".to_string(),
            description: "Random intents, including ones the engine must refuse",
            plan: standard(5, GameplayStrategy::Random),
        },
        TestScenario {
            key: "solo-tomb",
            name: "Solo Tomb".to_string(),
            description: "Solo mode, where tomb conditions can raise threat mid-round",
            plan: SimulationPlan::new(2, GameplayStrategy::Aggressive)
                .with_solo_mode()
                .with_target_threat(10)
                .require(expect_completed)
                .require(expect_every_battle_recorded),
        },
        TestScenario {
            key: "persistence",
            name: "Persistence Roundtrip".to_string(),
            description: "Save and reload through the storage seam every round",
            plan: standard(3, GameplayStrategy::Random).with_roundtrip(),
        },
    ]
}

/// Keys and descriptions for `--list-scenarios`.
#[must_use]
pub fn list_scenarios() -> Vec<(&'static str, &'static str)> {
    build_catalog()
        .into_iter()
        .map(|s| (s.key, s.description))
        .collect()
}

#[must_use]
pub fn get_scenario(key: &str) -> Option<TestScenario> {
    build_catalog().into_iter().find(|s| s.key == key)
}

/// Expand `all` into every catalog key.
#[must_use]
pub fn expand_scenarios(requested: &[String]) -> Vec<String> {
    let mut scenarios: Vec<String> = requested
        .iter()
        .filter(|s| *s != "all")
        .cloned()
        .collect();
    if requested.iter().any(|s| s == "all") {
        for (key, _) in list_scenarios() {
            if !scenarios.iter().any(|s| s == key) {
                scenarios.push(key.to_string());
            }
        }
    }
    scenarios
}
