use anyhow::{Result, ensure};
use cogniwise_game::{AgeBand, Domain, SessionResult, StageKind};

use super::policy::PlayerProfile;
use super::simulation::SessionRun;

pub type Expectation = fn(&SessionRun) -> Result<()>;

/// A named check run against every band × profile × seed it applies to.
#[derive(Clone)]
pub struct Scenario {
    pub key: &'static str,
    pub description: &'static str,
    /// Fixed profile; `None` runs every profile requested on the command line.
    pub profile: Option<PlayerProfile>,
    pub restart: bool,
    /// Play each seed twice and require identical outcomes.
    pub replay: bool,
    pub expectations: Vec<Expectation>,
}

impl Scenario {
    fn new(key: &'static str, description: &'static str) -> Self {
        Self {
            key,
            description,
            profile: None,
            restart: false,
            replay: false,
            expectations: vec![
                risk_in_range,
                raw_within_ceilings,
                matches_recomputation,
                no_pending_timers,
                ends_complete,
            ],
        }
    }

    fn for_profile(mut self, profile: PlayerProfile) -> Self {
        self.profile = Some(profile);
        self
    }

    fn with_restart(mut self) -> Self {
        self.restart = true;
        self
    }

    fn with_replay(mut self) -> Self {
        self.replay = true;
        self
    }

    fn with_expectation(mut self, expectation: Expectation) -> Self {
        self.expectations.push(expectation);
        self
    }

    /// Profiles this scenario runs for, given the command-line selection.
    #[must_use]
    pub fn profiles(&self, requested: &[PlayerProfile]) -> Vec<PlayerProfile> {
        self.profile.map_or_else(|| requested.to_vec(), |fixed| vec![fixed])
    }

    /// Run every expectation, returning the first failure.
    ///
    /// # Errors
    ///
    /// Returns the message of the first expectation that does not hold.
    pub fn check(&self, run: &SessionRun) -> Result<()> {
        for expectation in &self.expectations {
            expectation(run)?;
        }
        Ok(())
    }
}

pub fn catalog() -> Vec<Scenario> {
    vec![
        Scenario::new("smoke", "Every profile completes with sane scoring"),
        Scenario::new(
            "attentive-low-risk",
            "Attentive players are never flagged high risk",
        )
        .for_profile(PlayerProfile::Attentive)
        .with_expectation(not_high_risk),
        Scenario::new(
            "inattentive-high-risk",
            "Inattentive players are always flagged high risk",
        )
        .for_profile(PlayerProfile::Inattentive)
        .with_expectation(high_risk),
        Scenario::new(
            "deterministic-replay",
            "Same seed and profile replay to the same result",
        )
        .with_replay(),
        Scenario::new(
            "restart-recovers",
            "Restarting during the second game still produces a clean result",
        )
        .with_restart()
        .with_expectation(restarted),
    ]
}

#[must_use]
pub fn find_scenario(key: &str) -> Option<Scenario> {
    catalog()
        .into_iter()
        .find(|scenario| scenario.key.eq_ignore_ascii_case(key.trim()))
}

#[must_use]
pub fn list_scenarios() -> Vec<(&'static str, &'static str)> {
    catalog()
        .into_iter()
        .map(|scenario| (scenario.key, scenario.description))
        .collect()
}

/// Stage the restart scenario interrupts: the entry of the band's second game.
#[must_use]
pub const fn restart_stage(band: AgeBand) -> StageKind {
    match band {
        AgeBand::Adult => StageKind::Recall,
        AgeBand::Child => StageKind::EmotionPop,
        AgeBand::Elderly => StageKind::NameLearn,
    }
}

fn risk_in_range(run: &SessionRun) -> Result<()> {
    ensure!(
        run.result.risk_score() <= 100,
        "risk score {} outside 0..=100",
        run.result.risk_score()
    );
    let norms = run.result.normalized();
    for value in [norms.a, norms.b, norms.c] {
        ensure!(
            (0.0..=1.0).contains(&value),
            "normalized score {value} outside the unit interval"
        );
    }
    Ok(())
}

fn raw_within_ceilings(run: &SessionRun) -> Result<()> {
    let raw = run.result.raw();
    for domain in Domain::ALL {
        let value = raw.get(domain).value();
        let ceiling = run.ceilings.get(domain);
        ensure!(
            (0.0..=ceiling).contains(&value),
            "{domain:?} raw score {value} outside 0..={ceiling}"
        );
    }
    Ok(())
}

fn matches_recomputation(run: &SessionRun) -> Result<()> {
    let recomputed = SessionResult::compute(run.band, *run.result.raw());
    ensure!(
        recomputed == run.result,
        "result {:?} differs from recomputation {:?}",
        run.result,
        recomputed
    );
    Ok(())
}

fn no_pending_timers(run: &SessionRun) -> Result<()> {
    ensure!(
        run.pending_timers == 0,
        "{} timers still pending after completion",
        run.pending_timers
    );
    Ok(())
}

fn ends_complete(run: &SessionRun) -> Result<()> {
    ensure!(
        run.stages.last() == Some(&StageKind::Complete),
        "stage path ended at {:?}",
        run.stages.last()
    );
    Ok(())
}

fn not_high_risk(run: &SessionRun) -> Result<()> {
    ensure!(
        !run.result.is_high_risk(),
        "{} player flagged high risk ({})",
        run.profile,
        run.result.risk_score()
    );
    Ok(())
}

fn high_risk(run: &SessionRun) -> Result<()> {
    ensure!(
        run.result.is_high_risk(),
        "{} player not flagged high risk ({})",
        run.profile,
        run.result.risk_score()
    );
    Ok(())
}

fn restarted(run: &SessionRun) -> Result<()> {
    ensure!(run.restarted, "session never reached the restart point");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::simulation::{SimulationPlan, simulate};
    use cogniwise_game::{AssessmentConfig, DomainScore, DomainScores};

    fn attentive_run(band: AgeBand) -> SessionRun {
        let config = AssessmentConfig::default_config().compressed(10).unwrap();
        simulate(&SimulationPlan::new(band, PlayerProfile::Attentive, 5, config)).unwrap()
    }

    #[test]
    fn attentive_raw_scores_stay_within_ceilings() {
        for band in AgeBand::ALL {
            let run = attentive_run(band);
            raw_within_ceilings(&run).unwrap();
        }
        let elderly = attentive_run(AgeBand::Elderly);
        let perfect = DomainScores {
            a: DomainScore::new(3.0),
            b: DomainScore::new(2.0),
            c: DomainScore::new(3.0),
        };
        assert_eq!(elderly.result.raw(), &perfect);
    }

    #[test]
    fn raw_score_above_ceiling_is_rejected() {
        let mut run = attentive_run(AgeBand::Adult);
        let inflated = DomainScores {
            b: DomainScore::new(run.ceilings.b + 10.0),
            ..*run.result.raw()
        };
        run.result = SessionResult::compute(AgeBand::Adult, inflated);
        let err = raw_within_ceilings(&run).unwrap_err();
        assert!(err.to_string().contains("B raw score"));
    }

    #[test]
    fn catalog_keys_are_unique_and_findable() {
        let scenarios = catalog();
        for scenario in &scenarios {
            assert!(find_scenario(scenario.key).is_some(), "{}", scenario.key);
            assert_eq!(
                scenarios.iter().filter(|other| other.key == scenario.key).count(),
                1
            );
        }
        assert!(find_scenario("missing").is_none());
    }

    #[test]
    fn fixed_profiles_override_selection() {
        let attentive = find_scenario("attentive-low-risk").unwrap();
        assert_eq!(
            attentive.profiles(&[PlayerProfile::Random, PlayerProfile::Typical]),
            vec![PlayerProfile::Attentive]
        );
        let smoke = find_scenario("smoke").unwrap();
        assert_eq!(
            smoke.profiles(&[PlayerProfile::Random]),
            vec![PlayerProfile::Random]
        );
    }
}
