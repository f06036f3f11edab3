//! Per-band session state machines.
//!
//! Each machine owns its stage value, its domain scores, its random streams
//! and a [`TimerSet`]. Inputs and clock advances are the only way to move it;
//! every stage exit cancels the whole timer set before the next stage
//! schedules anything.
use serde::{Deserialize, Serialize};

use crate::age_band::AgeBand;
use crate::config::AssessmentConfig;
use crate::feedback::Cue;
use crate::rng::RngBundle;
use crate::scoring::{DomainScores, SessionResult};
use crate::timers::{Millis, TimerSet};
use crate::trials::{BalloonId, Ink, Shape, Verdict};

pub mod adult;
pub mod child;
pub mod elderly;

pub use adult::{AdultAssessment, AdultStage};
pub use child::{ChildAssessment, ChildStage};
pub use elderly::{ElderlyAssessment, ElderlyStage};

/// Player input, interpreted by whichever stage is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", content = "value", rename_all = "snake_case")]
pub enum Action {
    /// Leave an intro or study screen.
    Begin,
    /// Press a grid cell (signal grid, recall grid, find-the-baby grid).
    Press(usize),
    Color(Ink),
    Pop(BalloonId),
    Shape(Shape),
    /// Toggle an item on an elderly board.
    Toggle(usize),
    /// Pick a name option by its displayed position.
    Name(usize),
    Submit,
    Restart,
}

/// How a machine treated an action.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "response", rename_all = "snake_case")]
pub enum Response {
    /// Not valid for the current stage or window; nothing changed.
    Ignored,
    /// Changed state without being scored.
    Accepted,
    Scored(Verdict),
}

impl Response {
    #[must_use]
    pub const fn is_ignored(&self) -> bool {
        matches!(self, Self::Ignored)
    }

    #[must_use]
    pub const fn verdict(&self) -> Option<Verdict> {
        match self {
            Self::Scored(verdict) => Some(*verdict),
            _ => None,
        }
    }
}

/// Band-independent name of the active stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageKind {
    Intro,
    Signal,
    Recall,
    Conflict,
    Search,
    EmotionPop,
    Pattern,
    ShoppingStudy,
    ShoppingRecall,
    NameLearn,
    NameQuiz,
    CategorySort,
    Complete,
}

impl StageKind {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Intro => "intro",
            Self::Signal => "signal",
            Self::Recall => "recall",
            Self::Conflict => "conflict",
            Self::Search => "search",
            Self::EmotionPop => "emotion_pop",
            Self::Pattern => "pattern",
            Self::ShoppingStudy => "shopping_study",
            Self::ShoppingRecall => "shopping_recall",
            Self::NameLearn => "name_learn",
            Self::NameQuiz => "name_quiz",
            Self::CategorySort => "category_sort",
            Self::Complete => "complete",
        }
    }
}

impl std::fmt::Display for StageKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Common surface of the three band machines.
pub trait Assessment {
    fn band(&self) -> AgeBand;

    fn stage_kind(&self) -> StageKind;

    /// Running raw domain scores; frozen once the session completes.
    fn scores(&self) -> &DomainScores;

    fn result(&self) -> Option<&SessionResult>;

    /// Apply an action at `now`. Overdue timers fire first, so the action is
    /// always judged against the stimulus that is current at `now`.
    fn act(&mut self, action: Action, now: Millis) -> Response;

    /// Fire every timer due at or before `now`, in deadline order.
    fn advance_to(&mut self, now: Millis);

    fn next_deadline(&self) -> Option<Millis>;

    fn pending_timers(&self) -> usize;

    fn drain_cues(&mut self) -> Vec<Cue>;

    fn is_complete(&self) -> bool {
        self.result().is_some()
    }
}

/// State shared by every band machine.
#[derive(Debug, Clone)]
pub(crate) struct SessionCore<T> {
    pub band: AgeBand,
    pub config: AssessmentConfig,
    pub timers: TimerSet<T>,
    pub rng: RngBundle,
    pub scores: DomainScores,
    pub cues: Vec<Cue>,
    pub clock: Millis,
}

impl<T: Copy> SessionCore<T> {
    pub fn new(band: AgeBand, config: AssessmentConfig, seed: u64) -> Self {
        Self {
            band,
            config,
            timers: TimerSet::new(),
            rng: RngBundle::from_user_seed(seed),
            scores: DomainScores::default(),
            cues: Vec::new(),
            clock: 0,
        }
    }

    /// Drop every timer owned by the stage being left.
    pub fn leave_stage(&mut self, from: StageKind, to: StageKind) {
        let cancelled = self.timers.cancel_all();
        log::debug!(
            "{} session: {from} -> {to} at {}ms (cancelled {cancelled} timers)",
            self.band,
            self.clock
        );
    }

    /// Next timer due at or before `now`, advancing the session clock to its deadline.
    pub fn pop_due(&mut self, now: Millis) -> Option<(Millis, T)> {
        let (due, kind) = self.timers.pop_due(now)?;
        self.clock = self.clock.max(due);
        Some((due, kind))
    }

    pub fn settle(&mut self, now: Millis) {
        self.clock = self.clock.max(now);
    }

    pub fn finish(&mut self) -> SessionResult {
        let result = SessionResult::compute(self.band, self.scores);
        log::info!(
            "{} session complete: risk {} (high risk: {})",
            self.band,
            result.risk_score(),
            result.is_high_risk()
        );
        result
    }

    /// Zero scores and drop queued cues. Random streams carry on, so a retry
    /// sees fresh stimuli.
    pub fn reset(&mut self) {
        self.scores.reset();
        self.cues.clear();
    }

    pub fn cue(&mut self, cue: Cue) {
        self.cues.push(cue);
    }
}
