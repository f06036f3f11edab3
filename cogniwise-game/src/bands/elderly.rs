//! Elderly band: shopping list recall, name association and category sort.
//!
//! Apart from the short lock after each name answer the band is paced
//! entirely by the player.
use super::{Action, Assessment, Response, SessionCore, StageKind};
use crate::age_band::AgeBand;
use crate::config::AssessmentConfig;
use crate::feedback::Cue;
use crate::numbers::count_to_f64;
use crate::scoring::{Domain, DomainScores, SessionResult};
use crate::timers::Millis;
use crate::trials::boards::{
    CATEGORY_BOARD, NAME_CARDS, SHOPPING_BOARD, SHOPPING_PICKS, evaluate_name,
    score_category_sort, score_recall,
};
use crate::trials::{NameCard, Selection, Verdict};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ElderlyTimer {
    AfterName,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ElderlyStage {
    Intro,
    ShoppingStudy,
    ShoppingRecall(Selection),
    /// Learning the face at this index of [`NAME_CARDS`].
    NameLearn { card: usize },
    NameQuiz { card: usize, answered: bool },
    CategorySort(Selection),
    Complete(SessionResult),
}

impl ElderlyStage {
    #[must_use]
    pub const fn kind(&self) -> StageKind {
        match self {
            Self::Intro => StageKind::Intro,
            Self::ShoppingStudy => StageKind::ShoppingStudy,
            Self::ShoppingRecall(_) => StageKind::ShoppingRecall,
            Self::NameLearn { .. } => StageKind::NameLearn,
            Self::NameQuiz { .. } => StageKind::NameQuiz,
            Self::CategorySort(_) => StageKind::CategorySort,
            Self::Complete(_) => StageKind::Complete,
        }
    }

    /// Name card shown in the learn or quiz stage.
    #[must_use]
    pub fn name_card(&self) -> Option<&'static NameCard> {
        match self {
            Self::NameLearn { card } | Self::NameQuiz { card, .. } => NAME_CARDS.get(*card),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ElderlyAssessment {
    core: SessionCore<ElderlyTimer>,
    stage: ElderlyStage,
}

impl ElderlyAssessment {
    #[must_use]
    pub fn new(config: AssessmentConfig, seed: u64) -> Self {
        Self {
            core: SessionCore::new(AgeBand::Elderly, config, seed),
            stage: ElderlyStage::Intro,
        }
    }

    #[must_use]
    pub const fn stage(&self) -> &ElderlyStage {
        &self.stage
    }

    fn transition(&mut self, next: ElderlyStage) {
        self.core.leave_stage(self.stage.kind(), next.kind());
        self.stage = next;
    }

    fn begin(&mut self) -> Response {
        let next = match self.stage {
            ElderlyStage::Intro => ElderlyStage::ShoppingStudy,
            ElderlyStage::ShoppingStudy => {
                ElderlyStage::ShoppingRecall(Selection::limited(SHOPPING_PICKS))
            }
            ElderlyStage::NameLearn { card } => ElderlyStage::NameQuiz {
                card,
                answered: false,
            },
            _ => return Response::Ignored,
        };
        self.transition(next);
        Response::Accepted
    }

    fn toggle(&mut self, index: usize) -> Response {
        let changed = match &mut self.stage {
            ElderlyStage::ShoppingRecall(selection) => {
                selection.toggle(index, SHOPPING_BOARD.len())
            }
            ElderlyStage::CategorySort(selection) => selection.toggle(index, CATEGORY_BOARD.len()),
            _ => false,
        };
        if changed {
            Response::Accepted
        } else {
            Response::Ignored
        }
    }

    fn submit(&mut self) -> Response {
        match &self.stage {
            ElderlyStage::ShoppingRecall(selection) => {
                if selection.len() != SHOPPING_PICKS {
                    return Response::Ignored;
                }
                let score = score_recall(&SHOPPING_BOARD, selection);
                self.core.scores.set(Domain::A, score);
                self.transition(ElderlyStage::NameLearn { card: 0 });
                Response::Scored(Verdict {
                    correct: score >= count_to_f64(SHOPPING_PICKS),
                    delta: score,
                })
            }
            ElderlyStage::CategorySort(selection) => {
                let score = score_category_sort(&CATEGORY_BOARD, selection);
                let targets = CATEGORY_BOARD.iter().filter(|item| item.is_target).count();
                self.core.scores.set(Domain::C, score);
                let result = self.core.finish();
                self.transition(ElderlyStage::Complete(result));
                Response::Scored(Verdict {
                    correct: score >= count_to_f64(targets),
                    delta: score,
                })
            }
            _ => Response::Ignored,
        }
    }

    fn answer_name(&mut self, option: usize, now: Millis) -> Response {
        let lock = self.core.config.elderly.name_feedback_ms;
        let ElderlyStage::NameQuiz { card, answered } = &mut self.stage else {
            return Response::Ignored;
        };
        if *answered {
            return Response::Ignored;
        }
        let Some(name_card) = NAME_CARDS.get(*card) else {
            return Response::Ignored;
        };
        let Some(chosen) = name_card.options().get(option).copied() else {
            return Response::Ignored;
        };
        *answered = true;
        let verdict = evaluate_name(name_card, chosen);
        self.core.scores.apply(Domain::B, verdict.delta);
        self.core.cue(if verdict.correct {
            Cue::NameRecalled
        } else {
            Cue::NameMissed
        });
        self.core.timers.once(now, lock, ElderlyTimer::AfterName);
        Response::Scored(verdict)
    }

    fn on_timer(&mut self, timer: ElderlyTimer) {
        match timer {
            ElderlyTimer::AfterName => {
                let ElderlyStage::NameQuiz { card, .. } = self.stage else {
                    return;
                };
                let next_card = card + 1;
                if next_card < NAME_CARDS.len() {
                    self.transition(ElderlyStage::NameLearn { card: next_card });
                } else {
                    self.transition(ElderlyStage::CategorySort(Selection::unlimited()));
                }
            }
        }
    }

    fn restart(&mut self) {
        self.core.reset();
        self.transition(ElderlyStage::Intro);
    }
}

impl Assessment for ElderlyAssessment {
    fn band(&self) -> AgeBand {
        AgeBand::Elderly
    }

    fn stage_kind(&self) -> StageKind {
        self.stage.kind()
    }

    fn scores(&self) -> &DomainScores {
        &self.core.scores
    }

    fn result(&self) -> Option<&SessionResult> {
        match &self.stage {
            ElderlyStage::Complete(result) => Some(result),
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
            Action::Begin => self.begin(),
            Action::Toggle(index) => self.toggle(index),
            Action::Submit => self.submit(),
            Action::Name(option) => self.answer_name(option, now),
            _ => Response::Ignored,
        }
    }

    fn advance_to(&mut self, now: Millis) {
        while let Some((_, timer)) = self.core.pop_due(now) {
            self.on_timer(timer);
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
