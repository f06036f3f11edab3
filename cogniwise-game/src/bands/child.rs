//! Child band: find-the-baby, emotion pop and the Wonder Train.
use super::{Action, Assessment, Response, SessionCore, StageKind};
use crate::age_band::AgeBand;
use crate::config::AssessmentConfig;
use crate::feedback::Cue;
use crate::scoring::{Domain, DomainScores, SessionResult};
use crate::timers::Millis;
use crate::trials::balloons::next_target;
use crate::trials::pattern::{evaluate_pattern, next_pattern};
use crate::trials::search::{evaluate_search, next_search};
use crate::trials::{BalloonField, BalloonId, Emotion, PatternTrial, SearchTrial, Shape};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ChildTimer {
    ToEmotionPop,
    PopOver,
    Spawn,
    Rise,
    Retarget,
    NextPattern,
    PatternDone,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchStage {
    pub trial: SearchTrial,
    /// 1-based round.
    pub round: u32,
    /// Last baby found; waiting for the handoff.
    pub locked: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PopStage {
    pub field: BalloonField,
    pub target: Emotion,
    pub ends_at: Millis,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PatternStage {
    pub trial: PatternTrial,
    pub round: u32,
    /// Answered; the next train arrives when the feedback lock expires.
    pub locked: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ChildStage {
    Intro,
    Search(SearchStage),
    EmotionPop(PopStage),
    Pattern(PatternStage),
    Complete(SessionResult),
}

impl ChildStage {
    #[must_use]
    pub const fn kind(&self) -> StageKind {
        match self {
            Self::Intro => StageKind::Intro,
            Self::Search(_) => StageKind::Search,
            Self::EmotionPop(_) => StageKind::EmotionPop,
            Self::Pattern(_) => StageKind::Pattern,
            Self::Complete(_) => StageKind::Complete,
        }
    }
}

/// Child session: intro, find-the-baby, emotion pop, pattern train, complete.
#[derive(Debug, Clone)]
pub struct ChildAssessment {
    core: SessionCore<ChildTimer>,
    stage: ChildStage,
}

impl ChildAssessment {
    #[must_use]
    pub fn new(config: AssessmentConfig, seed: u64) -> Self {
        Self {
            core: SessionCore::new(AgeBand::Child, config, seed),
            stage: ChildStage::Intro,
        }
    }

    #[must_use]
    pub const fn stage(&self) -> &ChildStage {
        &self.stage
    }

    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.core.rng.seed()
    }

    fn transition(&mut self, next: ChildStage) {
        self.core.leave_stage(self.stage.kind(), next.kind());
        self.stage = next;
    }

    fn enter_search(&mut self) {
        let trial = next_search(self.core.rng.search());
        self.transition(ChildStage::Search(SearchStage {
            trial,
            round: 1,
            locked: false,
        }));
    }

    fn enter_emotion_pop(&mut self, now: Millis) {
        let timing = self.core.config.child.clone();
        self.transition(ChildStage::EmotionPop(PopStage {
            field: BalloonField::new(),
            target: Emotion::Happy,
            ends_at: now.saturating_add(timing.pop_duration_ms),
        }));
        let timers = &mut self.core.timers;
        timers.once(now, timing.pop_duration_ms, ChildTimer::PopOver);
        timers.every(now, timing.pop_spawn_ms, ChildTimer::Spawn);
        timers.every(now, timing.pop_tick_ms, ChildTimer::Rise);
        timers.every(now, timing.pop_retarget_ms, ChildTimer::Retarget);
    }

    fn enter_pattern(&mut self) {
        let trial = next_pattern(1, self.core.rng.pattern());
        self.transition(ChildStage::Pattern(PatternStage {
            trial,
            round: 1,
            locked: false,
        }));
    }

    fn complete(&mut self) {
        let result = self.core.finish();
        self.transition(ChildStage::Complete(result));
    }

    fn on_timer(&mut self, timer: ChildTimer, due: Millis) {
        match timer {
            ChildTimer::ToEmotionPop => self.enter_emotion_pop(due),
            ChildTimer::PopOver => {
                if let ChildStage::EmotionPop(stage) = &mut self.stage {
                    stage.field.clear();
                }
                self.enter_pattern();
            }
            ChildTimer::Spawn => {
                if let ChildStage::EmotionPop(stage) = &mut self.stage {
                    stage.field.spawn(self.core.rng.balloons());
                }
            }
            ChildTimer::Rise => {
                if let ChildStage::EmotionPop(stage) = &mut self.stage {
                    stage.field.tick();
                }
            }
            ChildTimer::Retarget => {
                if let ChildStage::EmotionPop(stage) = &mut self.stage {
                    stage.target = next_target(self.core.rng.balloons());
                    log::trace!("emotion target now {} at {due}ms", stage.target);
                }
            }
            ChildTimer::NextPattern => {
                if let ChildStage::Pattern(stage) = &mut self.stage {
                    stage.round += 1;
                    stage.trial = next_pattern(stage.round, self.core.rng.pattern());
                    stage.locked = false;
                }
            }
            ChildTimer::PatternDone => self.complete(),
        }
    }

    fn press(&mut self, index: usize, now: Millis) -> Response {
        let timing = &self.core.config.child;
        let (rounds, handoff) = (timing.search_rounds, timing.search_handoff_ms);
        let ChildStage::Search(stage) = &mut self.stage else {
            return Response::Ignored;
        };
        if stage.locked {
            return Response::Ignored;
        }
        let Some(verdict) = evaluate_search(&stage.trial, index) else {
            return Response::Ignored;
        };
        if !verdict.correct {
            self.core.cue(Cue::ThatsAToy);
            return Response::Scored(verdict);
        }
        self.core.scores.apply(Domain::A, verdict.delta);
        self.core.cue(Cue::BabyFound);
        if stage.round >= rounds {
            stage.locked = true;
            self.core.timers.once(now, handoff, ChildTimer::ToEmotionPop);
        } else {
            stage.round += 1;
            stage.trial = next_search(self.core.rng.search());
        }
        Response::Scored(verdict)
    }

    fn pop(&mut self, id: BalloonId) -> Response {
        let ChildStage::EmotionPop(stage) = &mut self.stage else {
            return Response::Ignored;
        };
        let Some(verdict) = stage.field.pop(id, stage.target) else {
            return Response::Ignored;
        };
        if verdict.correct {
            self.core.scores.apply(Domain::B, verdict.delta);
        } else {
            self.core.cue(Cue::LookFor {
                target: stage.target,
            });
        }
        Response::Scored(verdict)
    }

    fn choose_shape(&mut self, shape: Shape, now: Millis) -> Response {
        let timing = &self.core.config.child;
        let (rounds, lock) = (timing.pattern_rounds, timing.pattern_feedback_ms);
        let ChildStage::Pattern(stage) = &mut self.stage else {
            return Response::Ignored;
        };
        if stage.locked {
            return Response::Ignored;
        }
        stage.locked = true;
        let verdict = evaluate_pattern(&stage.trial, shape);
        self.core.scores.apply(Domain::C, verdict.delta);
        self.core.cue(if verdict.correct {
            Cue::TrainCorrect
        } else {
            Cue::TrainMissed
        });
        let next = if stage.round >= rounds {
            ChildTimer::PatternDone
        } else {
            ChildTimer::NextPattern
        };
        self.core.timers.once(now, lock, next);
        Response::Scored(verdict)
    }

    fn restart(&mut self) {
        self.core.reset();
        self.transition(ChildStage::Intro);
    }
}

impl Assessment for ChildAssessment {
    fn band(&self) -> AgeBand {
        AgeBand::Child
    }

    fn stage_kind(&self) -> StageKind {
        self.stage.kind()
    }

    fn scores(&self) -> &DomainScores {
        &self.core.scores
    }

    fn result(&self) -> Option<&SessionResult> {
        match &self.stage {
            ChildStage::Complete(result) => Some(result),
            _ => None,
        }
    }

    fn act(&mut self, action: Action, now: Millis) -> Response {
        self.advance_to(now);
        let now = self.core.clock;
        match action {
            Action::Restart => {
                self.restart();
                Response::Accepted
            }
            Action::Begin if matches!(self.stage, ChildStage::Intro) => {
                self.enter_search();
                Response::Accepted
            }
            Action::Press(index) => self.press(index, now),
            Action::Pop(id) => self.pop(id),
            Action::Shape(shape) => self.choose_shape(shape, now),
            _ => Response::Ignored,
        }
    }

    fn advance_to(&mut self, now: Millis) {
        while let Some((due, timer)) = self.core.pop_due(now) {
            self.on_timer(timer, due);
        }
        self.core.settle(now);
    }

    fn next_deadline(&self) -> Option<Millis> {
        self.core.timers.next_due()
    }

    fn pending_timers(&self) -> usize {
        self.core.timers.len()
    }

    fn drain_cues(&mut self) -> Vec<Cue> {
        std::mem::take(&mut self.core.cues)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trials::Verdict;

    fn session() -> ChildAssessment {
        let mut session = ChildAssessment::new(AssessmentConfig::default_config(), 7);
        session.act(Action::Begin, 0);
        session
    }

    fn find_baby(session: &mut ChildAssessment, now: Millis) -> Response {
        let ChildStage::Search(stage) = session.stage() else {
            panic!("expected search");
        };
        let index = stage.trial.baby_index().unwrap();
        session.act(Action::Press(index), now)
    }

    #[test]
    fn toy_picks_give_feedback_only() {
        let mut session = session();
        let ChildStage::Search(stage) = session.stage() else {
            panic!("expected search");
        };
        let baby = stage.trial.baby_index().unwrap();
        let toy = (baby + 1) % 9;
        assert_eq!(
            session.act(Action::Press(toy), 10),
            Response::Scored(Verdict::miss(0.0))
        );
        assert_eq!(session.drain_cues(), vec![Cue::ThatsAToy]);
        assert_eq!(session.scores().a.value(), 0.0);
    }

    #[test]
    fn fifth_baby_hands_off_after_delay() {
        let mut session = session();
        for round in 0..5 {
            assert!(find_baby(&mut session, 100 * round).verdict().unwrap().correct);
        }
        assert!((session.scores().a.value() - 5.0).abs() < f64::EPSILON);
        assert_eq!(session.stage_kind(), StageKind::Search);
        // locked during the handoff
        assert_eq!(session.act(Action::Press(0), 500), Response::Ignored);
        session.advance_to(400 + 1_499);
        assert_eq!(session.stage_kind(), StageKind::Search);
        session.advance_to(400 + 1_500);
        assert_eq!(session.stage_kind(), StageKind::EmotionPop);
    }

    #[test]
    fn emotion_pop_runs_for_its_duration() {
        let mut session = session();
        for round in 0..5 {
            find_baby(&mut session, round);
        }
        let start = 4 + 1_500;
        session.advance_to(start + 1_200);
        let ChildStage::EmotionPop(stage) = session.stage() else {
            panic!("expected emotion pop");
        };
        assert_eq!(stage.field.len(), 1);
        assert_eq!(stage.target, Emotion::Happy);
        assert_eq!(stage.ends_at, start + 25_000);

        session.advance_to(start + 24_999);
        assert_eq!(session.stage_kind(), StageKind::EmotionPop);
        session.advance_to(start + 25_000);
        assert_eq!(session.stage_kind(), StageKind::Pattern);
        assert_eq!(session.pending_timers(), 0);
    }

    #[test]
    fn pattern_answers_lock_until_next_train() {
        let mut session = session();
        for round in 0..5 {
            find_baby(&mut session, round);
        }
        session.advance_to(30_000);
        let ChildStage::Pattern(stage) = session.stage() else {
            panic!("expected pattern");
        };
        let answer = stage.trial.answer;
        assert_eq!(
            session.act(Action::Shape(answer), 30_000),
            Response::Scored(Verdict::hit(10.0))
        );
        assert_eq!(session.act(Action::Shape(answer), 30_500), Response::Ignored);
        session.advance_to(31_000);
        let ChildStage::Pattern(stage) = session.stage() else {
            panic!("expected pattern");
        };
        assert_eq!(stage.round, 2);
        assert!(!stage.locked);
    }
}
