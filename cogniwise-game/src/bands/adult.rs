//! Adult band: attention vigilance grid, working memory sequence and
//! colour-word response inhibition.
use super::{Action, Assessment, Response, SessionCore, StageKind};
use crate::age_band::AgeBand;
use crate::config::AssessmentConfig;
use crate::feedback::Cue;
use crate::scoring::{Domain, DomainScores, SessionResult};
use crate::timers::{Millis, TimerId};
use crate::trials::conflict::{evaluate_color, next_card};
use crate::trials::recall::{evaluate_recall, extend_sequence};
use crate::trials::signal::{GRID_CELLS, next_signal};
use crate::trials::{ConflictCard, Ink, RecallProgress, RecallSequence, SignalGrid, Verdict};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AdultTimer {
    SignalTick,
    /// Hide the signal with this generation stamp.
    HideSignal(u32),
    ToRecall,
    RecallStep,
    /// Clear the playback highlight of the n-th shown element.
    RecallUnlight(usize),
    RecallRelease,
    /// Clear the flash raised by the n-th entered element.
    RecallFlashOff(usize),
    NextRecallRound,
    ToConflict,
    NextCard,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignalStage {
    pub grid: SignalGrid,
    /// Signals shown so far in this stage.
    pub round: u32,
    /// Round limit reached; presses are ignored until the handoff fires.
    pub closing: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecallPhase {
    /// The target sequence is being played back; input is locked.
    Showing,
    Accepting,
    /// Round decided, waiting for the handoff.
    Resolved,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecallStage {
    pub target: RecallSequence,
    pub entered: RecallSequence,
    pub phase: RecallPhase,
    /// Cell currently highlighted, either by playback or by a click flash.
    pub lit: Option<u8>,
    played: usize,
    step_timer: Option<TimerId>,
}

impl RecallStage {
    fn new(target: RecallSequence) -> Self {
        Self {
            target,
            entered: RecallSequence::new(),
            phase: RecallPhase::Showing,
            lit: None,
            played: 0,
            step_timer: None,
        }
    }

    /// Sequence length for this level.
    #[must_use]
    pub fn level(&self) -> usize {
        self.target.len()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConflictStage {
    pub card: ConflictCard,
    /// 1-based index of the visible card.
    pub card_number: u32,
    pub answered: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AdultStage {
    Intro,
    Signal(SignalStage),
    Recall(RecallStage),
    Conflict(ConflictStage),
    Complete(SessionResult),
}

impl AdultStage {
    #[must_use]
    pub const fn kind(&self) -> StageKind {
        match self {
            Self::Intro => StageKind::Intro,
            Self::Signal(_) => StageKind::Signal,
            Self::Recall(_) => StageKind::Recall,
            Self::Conflict(_) => StageKind::Conflict,
            Self::Complete(_) => StageKind::Complete,
        }
    }
}

/// Adult session: intro, signal grid, recall, conflict cards, complete.
#[derive(Debug, Clone)]
pub struct AdultAssessment {
    core: SessionCore<AdultTimer>,
    stage: AdultStage,
}

impl AdultAssessment {
    #[must_use]
    pub fn new(config: AssessmentConfig, seed: u64) -> Self {
        Self {
            core: SessionCore::new(AgeBand::Adult, config, seed),
            stage: AdultStage::Intro,
        }
    }

    #[must_use]
    pub const fn stage(&self) -> &AdultStage {
        &self.stage
    }

    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.core.rng.seed()
    }

    fn transition(&mut self, next: AdultStage) {
        self.core.leave_stage(self.stage.kind(), next.kind());
        self.stage = next;
    }

    fn enter_signal(&mut self, now: Millis) {
        self.transition(AdultStage::Signal(SignalStage {
            grid: SignalGrid::new(),
            round: 0,
            closing: false,
        }));
        let period = self.core.config.adult.signal_period_ms;
        self.core.timers.every(now, period, AdultTimer::SignalTick);
    }

    fn on_signal_tick(&mut self, due: Millis) {
        let timing = &self.core.config.adult;
        let (limit, visible, handoff) = (
            timing.signal_rounds,
            timing.signal_visible_ms,
            timing.handoff_ms,
        );
        let AdultStage::Signal(stage) = &mut self.stage else {
            return;
        };
        if stage.closing {
            return;
        }
        let next_round = stage.round.saturating_add(1);
        if next_round > limit {
            stage.closing = true;
            stage.grid.clear();
            self.core.timers.cancel_all();
            self.core.timers.once(due, handoff, AdultTimer::ToRecall);
            return;
        }
        stage.round = next_round;
        stage.grid.show(next_signal(self.core.rng.signal()));
        let generation = stage.grid.shown();
        self.core
            .timers
            .once(due, visible, AdultTimer::HideSignal(generation));
    }

    fn start_recall_level(&mut self, now: Millis, previous: &[u8]) {
        let target = extend_sequence(previous, self.core.rng.recall());
        self.transition(AdultStage::Recall(RecallStage::new(target)));
        let step = self.core.config.adult.recall_step_ms;
        let id = self.core.timers.every(now, step, AdultTimer::RecallStep);
        if let AdultStage::Recall(stage) = &mut self.stage {
            stage.step_timer = Some(id);
        }
    }

    fn on_recall_step(&mut self, due: Millis) {
        let timing = &self.core.config.adult;
        let (lit_ms, release_ms) = (timing.recall_lit_ms, timing.recall_release_ms);
        let AdultStage::Recall(stage) = &mut self.stage else {
            return;
        };
        if let Some(&cell) = stage.target.get(stage.played) {
            stage.lit = Some(cell);
            stage.played += 1;
            self.core
                .timers
                .once(due, lit_ms, AdultTimer::RecallUnlight(stage.played));
        }
        if stage.played >= stage.target.len() {
            if let Some(id) = stage.step_timer.take() {
                self.core.timers.cancel(id);
            }
            self.core
                .timers
                .once(due, release_ms, AdultTimer::RecallRelease);
        }
    }

    fn enter_conflict(&mut self, now: Millis) {
        let card = next_card(self.core.rng.conflict());
        self.transition(AdultStage::Conflict(ConflictStage {
            card,
            card_number: 1,
            answered: false,
        }));
        let period = self.core.config.adult.conflict_card_ms;
        self.core.timers.every(now, period, AdultTimer::NextCard);
    }

    fn on_next_card(&mut self, due: Millis) {
        let limit = self.core.config.adult.conflict_cards;
        let AdultStage::Conflict(stage) = &mut self.stage else {
            return;
        };
        if stage.card_number >= limit {
            self.complete();
            return;
        }
        stage.card_number += 1;
        stage.card = next_card(self.core.rng.conflict());
        stage.answered = false;
        log::trace!("conflict card {} at {due}ms", stage.card_number);
    }

    fn complete(&mut self) {
        let result = self.core.finish();
        self.transition(AdultStage::Complete(result));
    }

    fn on_timer(&mut self, timer: AdultTimer, due: Millis) {
        match timer {
            AdultTimer::SignalTick => self.on_signal_tick(due),
            AdultTimer::HideSignal(generation) => {
                if let AdultStage::Signal(stage) = &mut self.stage {
                    stage.grid.hide(generation);
                }
            }
            AdultTimer::ToRecall => self.start_recall_level(due, &[]),
            AdultTimer::RecallStep => self.on_recall_step(due),
            AdultTimer::RecallUnlight(shown) => {
                if let AdultStage::Recall(stage) = &mut self.stage
                    && stage.phase == RecallPhase::Showing
                    && stage.played == shown
                {
                    stage.lit = None;
                }
            }
            AdultTimer::RecallRelease => {
                if let AdultStage::Recall(stage) = &mut self.stage {
                    stage.lit = None;
                    stage.phase = RecallPhase::Accepting;
                }
            }
            AdultTimer::RecallFlashOff(entered) => {
                if let AdultStage::Recall(stage) = &mut self.stage
                    && stage.entered.len() == entered
                {
                    stage.lit = None;
                }
            }
            AdultTimer::NextRecallRound => {
                if let AdultStage::Recall(stage) = &self.stage {
                    let previous = stage.target.clone();
                    self.start_recall_level(due, &previous);
                }
            }
            AdultTimer::ToConflict => self.enter_conflict(due),
            AdultTimer::NextCard => self.on_next_card(due),
        }
    }

    fn press(&mut self, index: usize, now: Millis) -> Response {
        match &mut self.stage {
            AdultStage::Signal(stage) => {
                if stage.closing {
                    return Response::Ignored;
                }
                let Some(verdict) = stage.grid.press(index) else {
                    return Response::Ignored;
                };
                self.core.scores.apply(Domain::A, verdict.delta);
                self.core.cue(if verdict.correct {
                    Cue::GoodReflex
                } else {
                    Cue::WrongSignal
                });
                Response::Scored(verdict)
            }
            AdultStage::Recall(stage) => {
                if stage.phase != RecallPhase::Accepting || index >= GRID_CELLS {
                    return Response::Ignored;
                }
                let Ok(cell) = u8::try_from(index) else {
                    return Response::Ignored;
                };
                let timing = &self.core.config.adult;
                let (flash_ms, handoff_ms, max_length) = (
                    timing.recall_flash_ms,
                    timing.handoff_ms,
                    usize::from(timing.recall_max_length),
                );
                stage.entered.push(cell);
                stage.lit = Some(cell);
                self.core.timers.once(
                    now,
                    flash_ms,
                    AdultTimer::RecallFlashOff(stage.entered.len()),
                );
                match evaluate_recall(&stage.target, &stage.entered) {
                    RecallProgress::Pending => Response::Scored(Verdict::hit(0.0)),
                    RecallProgress::Broken => {
                        stage.phase = RecallPhase::Resolved;
                        self.core.cue(Cue::SequenceBroken);
                        self.core
                            .timers
                            .once(now, handoff_ms, AdultTimer::ToConflict);
                        Response::Scored(Verdict::miss(0.0))
                    }
                    RecallProgress::Complete { bonus } => {
                        stage.phase = RecallPhase::Resolved;
                        self.core.scores.apply(Domain::B, bonus);
                        let next = if stage.target.len() < max_length {
                            AdultTimer::NextRecallRound
                        } else {
                            AdultTimer::ToConflict
                        };
                        self.core.timers.once(now, handoff_ms, next);
                        Response::Scored(Verdict::hit(bonus))
                    }
                }
            }
            _ => Response::Ignored,
        }
    }

    fn choose_color(&mut self, ink: Ink) -> Response {
        let AdultStage::Conflict(stage) = &mut self.stage else {
            return Response::Ignored;
        };
        if stage.answered {
            return Response::Ignored;
        }
        stage.answered = true;
        let verdict = evaluate_color(&stage.card, ink);
        self.core.scores.apply(Domain::C, verdict.delta);
        self.core.cue(if verdict.correct {
            Cue::ColorCorrect
        } else {
            Cue::ReadTheInk
        });
        Response::Scored(verdict)
    }

    fn restart(&mut self) {
        self.core.reset();
        self.transition(AdultStage::Intro);
    }
}

impl Assessment for AdultAssessment {
    fn band(&self) -> AgeBand {
        AgeBand::Adult
    }

    fn stage_kind(&self) -> StageKind {
        self.stage.kind()
    }

    fn scores(&self) -> &DomainScores {
        &self.core.scores
    }

    fn result(&self) -> Option<&SessionResult> {
        match &self.stage {
            AdultStage::Complete(result) => Some(result),
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
            Action::Begin if matches!(self.stage, AdultStage::Intro) => {
                self.enter_signal(now);
                Response::Accepted
            }
            Action::Press(index) => self.press(index, now),
            Action::Color(ink) => self.choose_color(ink),
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
