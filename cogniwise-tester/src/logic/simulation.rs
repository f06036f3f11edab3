use anyhow::{Result, bail};
use cogniwise_game::{
    Action, AgeBand, AssessmentConfig, Assessment, DomainCaps, Level2Session, Millis, Response,
    SessionResult, StageKind,
};

use super::policy::{PlayerPolicy, PlayerProfile};

/// Virtual delay between consecutive inputs when no timer is pending.
pub const THINK_TIME_MS: Millis = 350;
const MAX_STEPS: usize = 200_000;

/// One scripted playthrough request.
#[derive(Debug, Clone)]
pub struct SimulationPlan {
    pub band: AgeBand,
    pub profile: PlayerProfile,
    pub seed: u64,
    pub config: AssessmentConfig,
    /// Restart the session the first time this stage is entered.
    pub restart_at: Option<StageKind>,
}

impl SimulationPlan {
    #[must_use]
    pub const fn new(
        band: AgeBand,
        profile: PlayerProfile,
        seed: u64,
        config: AssessmentConfig,
    ) -> Self {
        Self {
            band,
            profile,
            seed,
            config,
            restart_at: None,
        }
    }

    #[must_use]
    pub const fn with_restart_at(mut self, stage: StageKind) -> Self {
        self.restart_at = Some(stage);
        self
    }
}

/// Everything observed while playing one session to completion.
#[derive(Debug, Clone)]
pub struct SessionRun {
    pub band: AgeBand,
    pub profile: PlayerProfile,
    pub seed: u64,
    pub result: SessionResult,
    /// Highest raw score each domain could reach under the plan's timings.
    pub ceilings: DomainCaps,
    pub session: Level2Session,
    pub stages: Vec<StageKind>,
    pub actions: usize,
    pub scored: usize,
    pub ignored: usize,
    pub cues: usize,
    pub virtual_ms: Millis,
    pub pending_timers: usize,
    pub restarted: bool,
}

/// Play `plan` to completion on the virtual clock.
///
/// The clock jumps from one timer deadline to the next; when nothing is
/// scheduled it moves by [`THINK_TIME_MS`] as long as the player keeps acting.
///
/// # Errors
///
/// Fails when the session stalls with no timers and no player input, or runs
/// past the step limit.
pub fn simulate(plan: &SimulationPlan) -> Result<SessionRun> {
    let mut session = Level2Session::new(plan.band, plan.config.clone(), plan.seed);
    let mut policy = plan.profile.create_policy(plan.seed);
    let mut run = RunCounters::default();
    let mut stages = vec![session.stage_kind()];
    let mut restart_pending = plan.restart_at;
    let mut now: Millis = 0;

    for _ in 0..MAX_STEPS {
        if restart_pending.is_some_and(|stage| stage == session.stage_kind()) {
            restart_pending = None;
            run.restarted = true;
            policy.reset();
            apply(&mut session, &mut run, Action::Restart, now);
            track_stage(&mut stages, session.stage_kind());
        }

        let actions = policy.decide(&session);
        for &action in &actions {
            apply(&mut session, &mut run, action, now);
        }
        run.cues += session.drain_cues().len();
        track_stage(&mut stages, session.stage_kind());

        if let Some(result) = session.result().copied() {
            log::debug!(
                "{} {} seed {} finished at {now} ms with risk {}",
                plan.band,
                policy.profile(),
                plan.seed,
                result.risk_score()
            );
            return Ok(SessionRun {
                band: plan.band,
                profile: plan.profile,
                seed: plan.seed,
                result,
                ceilings: plan.config.score_ceilings(plan.band),
                pending_timers: session.pending_timers(),
                session,
                stages,
                actions: run.actions,
                scored: run.scored,
                ignored: run.ignored,
                cues: run.cues,
                virtual_ms: now,
                restarted: run.restarted,
            });
        }

        now = match session.next_deadline() {
            Some(deadline) => deadline.max(now),
            None if !actions.is_empty() => now.saturating_add(THINK_TIME_MS),
            None => bail!(
                "{} session stalled in {} at {now} ms with no timers pending",
                plan.band,
                session.stage_kind()
            ),
        };
        session.advance_to(now);
        track_stage(&mut stages, session.stage_kind());
    }

    bail!(
        "{} session did not finish within {MAX_STEPS} steps (stage {})",
        plan.band,
        session.stage_kind()
    )
}

#[derive(Debug, Default)]
struct RunCounters {
    actions: usize,
    scored: usize,
    ignored: usize,
    cues: usize,
    restarted: bool,
}

fn apply(session: &mut Level2Session, run: &mut RunCounters, action: Action, now: Millis) {
    run.actions += 1;
    match session.act(action, now) {
        Response::Scored(_) => run.scored += 1,
        Response::Ignored => run.ignored += 1,
        Response::Accepted => {}
    }
}

fn track_stage(stages: &mut Vec<StageKind>, stage: StageKind) {
    if stages.last() != Some(&stage) {
        stages.push(stage);
    }
}
