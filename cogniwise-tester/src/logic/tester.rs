use colored::Colorize;
use cogniwise_game::{AgeBand, AssessmentConfig, DomainScores, NormalizedScores};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

use super::policy::PlayerProfile;
use super::scenarios::{Scenario, restart_stage};
use super::simulation::{SessionRun, SimulationPlan, simulate};
use crate::submit::{SubmissionOutcome, SubmitTarget, submit_run};

/// Outcome of one scenario for a single band, profile and seed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioResult {
    pub scenario_name: String,
    pub band: AgeBand,
    pub profile: PlayerProfile,
    pub seed: u64,
    pub passed: bool,
    pub iterations_run: usize,
    pub successful_iterations: usize,
    pub failures: Vec<String>,
    pub runs: Vec<RunRecord>,
    #[serde(with = "duration_serde")]
    pub average_duration: Duration,
}

/// Scores of one completed iteration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunRecord {
    pub iteration: usize,
    pub seed: u64,
    pub risk_score: u8,
    pub is_high_risk: bool,
    pub raw: DomainScores,
    pub normalized: NormalizedScores,
    pub actions: usize,
    pub scored: usize,
    pub ignored: usize,
    pub virtual_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submission: Option<SubmissionOutcome>,
}

impl RunRecord {
    fn from_run(iteration: usize, run: &SessionRun) -> Self {
        Self {
            iteration,
            seed: run.seed,
            risk_score: run.result.risk_score(),
            is_high_risk: run.result.is_high_risk(),
            raw: *run.result.raw(),
            normalized: *run.result.normalized(),
            actions: run.actions,
            scored: run.scored,
            ignored: run.ignored,
            virtual_ms: run.virtual_ms,
            submission: None,
        }
    }
}

/// What a tester invocation sweeps over.
#[derive(Debug, Clone)]
pub struct SweepPlan {
    pub bands: Vec<AgeBand>,
    pub profiles: Vec<PlayerProfile>,
    pub seeds: Vec<u64>,
    pub iterations: usize,
    pub config: AssessmentConfig,
}

pub struct LogicTester {
    verbose: bool,
    submit: Option<SubmitTarget>,
}

impl LogicTester {
    #[must_use]
    pub const fn new(verbose: bool, submit: Option<SubmitTarget>) -> Self {
        Self { verbose, submit }
    }

    pub fn run_scenario(&self, scenario: &Scenario, sweep: &SweepPlan) -> Vec<ScenarioResult> {
        let mut results = Vec::new();

        for &band in &sweep.bands {
            for profile in scenario.profiles(&sweep.profiles) {
                for &seed in &sweep.seeds {
                    if self.verbose {
                        println!(
                            "🧪 Testing scenario: {} (band: {band} profile: {profile} seed: {seed})",
                            scenario.key.bright_white()
                        );
                    }
                    results.push(self.run_single(scenario, sweep, band, profile, seed));
                }
            }
        }

        results
    }

    fn run_single(
        &self,
        scenario: &Scenario,
        sweep: &SweepPlan,
        band: AgeBand,
        profile: PlayerProfile,
        seed: u64,
    ) -> ScenarioResult {
        let mut failures = Vec::new();
        let mut runs = Vec::new();
        let mut timings = Vec::new();

        for i in 0..sweep.iterations {
            let start_time = Instant::now();
            let iteration_seed = seed.wrapping_add(u64::try_from(i).unwrap_or(u64::MAX));
            let mut plan = SimulationPlan::new(band, profile, iteration_seed, sweep.config.clone());
            if scenario.restart {
                plan = plan.with_restart_at(restart_stage(band));
            }

            match self.run_iteration(scenario, &plan, i) {
                Ok(record) => {
                    let duration = start_time.elapsed();
                    timings.push(duration);
                    if self.verbose {
                        println!(
                            "  ✅ Iteration {}/{} passed ({duration:?}) risk:{} actions:{}",
                            i + 1,
                            sweep.iterations,
                            record.risk_score,
                            record.actions
                        );
                    }
                    runs.push(record);
                }
                Err(err) => {
                    let message = format!(
                        "Iteration {} (band {band}, profile {profile}, seed {iteration_seed}): {err:#}",
                        i + 1
                    );
                    if self.verbose {
                        println!("  ❌ {}", message.clone().red());
                    }
                    failures.push(message);
                }
            }
        }

        let average_duration = if timings.is_empty() {
            Duration::ZERO
        } else {
            timings.iter().sum::<Duration>() / u32::try_from(timings.len()).unwrap_or(1)
        };

        ScenarioResult {
            scenario_name: scenario.key.to_string(),
            band,
            profile,
            seed,
            passed: failures.is_empty(),
            iterations_run: sweep.iterations,
            successful_iterations: runs.len(),
            failures,
            runs,
            average_duration,
        }
    }

    fn run_iteration(
        &self,
        scenario: &Scenario,
        plan: &SimulationPlan,
        iteration: usize,
    ) -> anyhow::Result<RunRecord> {
        let run = simulate(plan)?;
        scenario.check(&run)?;

        if scenario.replay {
            let replay = simulate(plan)?;
            anyhow::ensure!(
                replay.result == run.result
                    && replay.actions == run.actions
                    && replay.cues == run.cues
                    && replay.virtual_ms == run.virtual_ms,
                "replay diverged: risk {} vs {}, actions {} vs {}, ended at {} vs {} ms",
                run.result.risk_score(),
                replay.result.risk_score(),
                run.actions,
                replay.actions,
                run.virtual_ms,
                replay.virtual_ms
            );
        }

        let mut record = RunRecord::from_run(iteration, &run);
        if let Some(target) = &self.submit {
            let outcome = submit_run(target, run.session);
            if let Some(error) = &outcome.error {
                anyhow::bail!("submission failed after {} attempts: {error}", outcome.attempts);
            }
            if self.verbose {
                println!(
                    "  📨 Submitted: backend risk {:.1}% level 3 {}",
                    outcome.final_risk_percent.unwrap_or_default(),
                    if outcome.unlocked { "unlocked" } else { "locked" }
                );
            }
            record.submission = Some(outcome);
        }
        Ok(record)
    }
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
