use colored::Colorize;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

use crate::logic::scenarios::{SimulationPlan, TestScenario};
use crate::logic::simulation::{SimulationSession, SimulationSummary};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioResult {
    pub scenario_name: String,
    pub seed: u64,
    pub passed: bool,
    pub iterations_run: usize,
    pub successful_iterations: usize,
    pub failures: Vec<String>,
    /// Turns played across every iteration.
    pub total_turns: usize,
    /// Engine refusals across every iteration.
    pub total_refusals: usize,
    #[serde(with = "duration_serde")]
    pub average_duration: Duration,
    #[serde(with = "duration_vec_serde")]
    pub performance_data: Vec<Duration>,
}

pub struct LogicTester {
    verbose: bool,
}

impl LogicTester {
    pub const fn new(verbose: bool) -> Self {
        Self { verbose }
    }

    pub fn run_scenario(
        &self,
        scenario: &TestScenario,
        seeds: &[u64],
        iterations: usize,
    ) -> Vec<ScenarioResult> {
        let mut results = Vec::new();

        for &seed in seeds {
            if self.verbose {
                println!(
                    "🧪 Testing scenario: {} ({} players, {} strategy, seed {})",
                    scenario.name.bright_white(),
                    scenario.plan.players,
                    scenario.plan.strategy,
                    seed
                );
            }

            results.push(self.run_single_scenario(scenario, seed, iterations));
        }

        results
    }

    fn run_single_scenario(
        &self,
        scenario: &TestScenario,
        seed: u64,
        iterations: usize,
    ) -> ScenarioResult {
        let tally = self.run_simulation_iterations(&scenario.plan, seed, iterations);

        let average_duration = if tally.performance_data.is_empty() {
            Duration::ZERO
        } else {
            tally.performance_data.iter().sum::<Duration>()
                / u32::try_from(tally.performance_data.len()).unwrap_or(1)
        };

        ScenarioResult {
            scenario_name: scenario.name.clone(),
            seed,
            passed: tally.failures.is_empty(),
            iterations_run: iterations,
            successful_iterations: tally.successes,
            failures: tally.failures,
            total_turns: tally.turns,
            total_refusals: tally.refusals,
            average_duration,
            performance_data: tally.performance_data,
        }
    }

    fn run_simulation_iterations(
        &self,
        plan: &SimulationPlan,
        seed: u64,
        iterations: usize,
    ) -> IterationTally {
        let mut tally = IterationTally::default();

        for i in 0..iterations {
            let start_time = Instant::now();
            let iteration_seed = seed.wrapping_add(u64::try_from(i).unwrap_or(u64::MAX));

            let summary = match SimulationSession::new(plan.config(iteration_seed))
                .and_then(SimulationSession::run)
            {
                Ok(summary) => summary,
                Err(err) => {
                    tally.failures.push(format!(
                        "Iteration {} (seed {iteration_seed}): simulation aborted: {err:#}",
                        i + 1
                    ));
                    continue;
                }
            };
            tally.turns += summary.turns.len();
            tally.refusals += summary.refusals;

            if let Some(err) = evaluate_expectations(plan, &summary) {
                let context = summarize_last_turns(&summary);
                let status = if summary.game_ended {
                    "ended"
                } else {
                    "halted"
                };
                tally.failures.push(format!(
                    "Iteration {} (strategy {}, seed {}, turns {}, status {}, threat {}/{}): {} | {}",
                    i + 1,
                    summary.strategy,
                    summary.seed,
                    summary.turns.len(),
                    status,
                    summary.final_state.threat_level,
                    summary.final_state.target_threat_level,
                    err,
                    context
                ));

                if self.verbose {
                    println!(
                        "  ❌ Iteration {}/{} failed: {}",
                        i + 1,
                        iterations,
                        err.red()
                    );
                    println!("     ↳ Seed {} | {}", summary.seed, context);
                }
            } else {
                tally.successes += 1;
                let duration = start_time.elapsed();
                tally.performance_data.push(duration);

                if self.verbose {
                    println!(
                        "  ✅ Iteration {}/{} passed ({duration:?}) turns:{} refusals:{} champion:{}",
                        i + 1,
                        iterations,
                        summary.turns.len(),
                        summary.refusals,
                        summary.champion.as_deref().unwrap_or("-")
                    );
                }
            }
        }

        tally
    }
}

#[derive(Default)]
struct IterationTally {
    successes: usize,
    failures: Vec<String>,
    performance_data: Vec<Duration>,
    turns: usize,
    refusals: usize,
}

fn evaluate_expectations(plan: &SimulationPlan, summary: &SimulationSummary) -> Option<String> {
    plan.expectations
        .iter()
        .find_map(|expectation| expectation(summary).err().map(|err| err.to_string()))
}

fn summarize_last_turns(summary: &SimulationSummary) -> String {
    if summary.turns.is_empty() {
        return "no turns played".to_string();
    }

    summary
        .turns
        .iter()
        .rev()
        .take(3)
        .map(|turn| {
            format!(
                "round {} player {}: moved={} battle={} action={}",
                turn.round,
                turn.player,
                turn.moved,
                turn.battle,
                turn.action.as_deref().unwrap_or("none")
            )
        })
        .collect::<Vec<_>>()
        .join(" | ")
}

mod duration_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        duration.as_millis().serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u128::deserialize(deserializer)?;
        Ok(Duration::from_millis(u64::try_from(millis).unwrap_or(0)))
    }
}

mod duration_vec_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(durations: &[Duration], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let millis: Vec<u128> = durations.iter().map(Duration::as_millis).collect();
        millis.serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<Duration>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis_vec = Vec::<u128>::deserialize(deserializer)?;
        Ok(millis_vec
            .into_iter()
            .map(|m| Duration::from_millis(u64::try_from(m).unwrap_or(0)))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::scenarios::get_scenario;

    #[test]
    fn smoke_scenario_passes_for_each_seed() {
        let scenario = get_scenario("smoke").unwrap();
        let results = LogicTester::new(false).run_scenario(&scenario, &[1, 2], 2);
        assert_eq!(results.len(), 2);
        for result in &results {
            assert!(result.passed, "{:?}", result.failures);
            assert_eq!(result.successful_iterations, 2);
            // Two players over two full rounds, twice.
            assert_eq!(result.total_turns, 8);
        }
    }

    #[test]
    fn failing_expectation_is_reported() {
        let mut scenario = get_scenario("smoke").unwrap();
        scenario
            .plan
            .expectations
            .push(|_| Err(anyhow::anyhow!("always wrong")));
        let results = LogicTester::new(false).run_scenario(&scenario, &[3], 1);
        assert!(!results[0].passed);
        assert!(results[0].failures[0].contains("always wrong"));
        assert_eq!(results[0].successful_iterations, 0);
    }

    #[test]
    fn durations_serialize_as_millis() {
        let result = ScenarioResult {
            scenario_name: "Smoke".to_string(),
            seed: 1,
            passed: true,
            iterations_run: 1,
            successful_iterations: 1,
            failures: Vec::new(),
            total_turns: 4,
            total_refusals: 0,
            average_duration: Duration::from_millis(12),
            performance_data: vec![Duration::from_millis(12)],
        };
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["average_duration"], 12);
        let back: ScenarioResult = serde_json::from_value(json).unwrap();
        assert_eq!(back.performance_data, vec![Duration::from_millis(12)]);
    }
}
