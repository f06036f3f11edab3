use clap::ValueEnum;
use cogniwise_game::bands::adult::{RecallPhase, RecallStage};
use cogniwise_game::bands::child::{PatternStage, PopStage, SearchStage};
use cogniwise_game::trials::CellKind;
use cogniwise_game::trials::boards::{CATEGORY_BOARD, SHOPPING_BOARD, SHOPPING_PICKS};
use cogniwise_game::trials::{BalloonId, Emotion};
use cogniwise_game::{Action, AdultStage, ChildStage, ElderlyStage, Level2Session};
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Scripted stand-in for a person playing the Level-2 games.
pub trait PlayerPolicy {
    fn profile(&self) -> PlayerProfile;

    /// Actions to apply right now, given the visible session state.
    fn decide(&mut self, session: &Level2Session) -> Vec<Action>;

    /// Forget per-session memory after a restart.
    fn reset(&mut self);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum PlayerProfile {
    /// Never misses, never slips
    Attentive,
    /// Mostly right with the occasional slip
    Typical,
    /// Fast hands: presses every signal and pops every balloon
    Impulsive,
    /// Answers nothing correctly
    Inattentive,
    /// Coin-flip on every decision
    Random,
}

/// Behavioral knobs behind a profile.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Traits {
    /// Probability a judged answer is the right one.
    pub accuracy: f64,
    /// Probability of responding to a target stimulus at all.
    pub reacts: f64,
    /// Responds to distractors as well.
    pub impulsive: bool,
}

impl PlayerProfile {
    pub const ALL: [Self; 5] = [
        Self::Attentive,
        Self::Typical,
        Self::Impulsive,
        Self::Inattentive,
        Self::Random,
    ];

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Attentive => "attentive",
            Self::Typical => "typical",
            Self::Impulsive => "impulsive",
            Self::Inattentive => "inattentive",
            Self::Random => "random",
        }
    }

    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|profile| profile.label().eq_ignore_ascii_case(value.trim()))
    }

    #[must_use]
    pub const fn traits(self) -> Traits {
        match self {
            Self::Attentive => Traits {
                accuracy: 1.0,
                reacts: 1.0,
                impulsive: false,
            },
            Self::Typical => Traits {
                accuracy: 0.85,
                reacts: 0.85,
                impulsive: false,
            },
            Self::Impulsive => Traits {
                accuracy: 0.7,
                reacts: 1.0,
                impulsive: true,
            },
            Self::Inattentive => Traits {
                accuracy: 0.0,
                reacts: 0.0,
                impulsive: false,
            },
            Self::Random => Traits {
                accuracy: 0.5,
                reacts: 0.5,
                impulsive: false,
            },
        }
    }

    /// Create a policy instance for this profile.
    #[must_use]
    pub fn create_policy(self, seed: u64) -> Box<dyn PlayerPolicy + Send> {
        Box::new(ScriptedPlayer::new(self, seed))
    }
}

impl fmt::Display for PlayerProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One policy for every profile; the profile's [`Traits`] drive each choice.
#[derive(Debug, Clone)]
pub struct ScriptedPlayer {
    profile: PlayerProfile,
    traits: Traits,
    rng: ChaCha20Rng,
    seen_signal: Option<u32>,
    search_miss_round: Option<u32>,
    considered: HashSet<(BalloonId, Emotion)>,
}

impl ScriptedPlayer {
    #[must_use]
    pub fn new(profile: PlayerProfile, seed: u64) -> Self {
        Self {
            profile,
            traits: profile.traits(),
            rng: ChaCha20Rng::seed_from_u64(seed),
            seen_signal: None,
            search_miss_round: None,
            considered: HashSet::new(),
        }
    }

    fn chance(&mut self, probability: f64) -> bool {
        if probability >= 1.0 {
            true
        } else if probability <= 0.0 {
            false
        } else {
            self.rng.gen_bool(probability)
        }
    }

    fn adult(&mut self, stage: &AdultStage) -> Vec<Action> {
        match stage {
            AdultStage::Intro => vec![Action::Begin],
            AdultStage::Signal(signal) => {
                if signal.closing || self.seen_signal == Some(signal.grid.shown()) {
                    return Vec::new();
                }
                let Some((cell, kind)) = signal.grid.active() else {
                    return Vec::new();
                };
                self.seen_signal = Some(signal.grid.shown());
                let press = match kind {
                    CellKind::Target => self.chance(self.traits.reacts),
                    CellKind::Distractor => self.traits.impulsive,
                };
                if press {
                    vec![Action::Press(cell)]
                } else {
                    Vec::new()
                }
            }
            AdultStage::Recall(recall) => self.recall(recall),
            AdultStage::Conflict(conflict) => {
                if conflict.answered {
                    return Vec::new();
                }
                let chosen = if self.chance(self.traits.accuracy) {
                    conflict.card.ink
                } else {
                    conflict.card.word
                };
                vec![Action::Color(chosen)]
            }
            AdultStage::Complete(_) => Vec::new(),
        }
    }

    fn recall(&mut self, recall: &RecallStage) -> Vec<Action> {
        if recall.phase != RecallPhase::Accepting {
            return Vec::new();
        }
        let mut presses = Vec::new();
        for &expected in recall.target.iter().skip(recall.entered.len()) {
            if self.chance(self.traits.accuracy) {
                presses.push(Action::Press(usize::from(expected)));
            } else {
                presses.push(Action::Press(usize::from((expected + 1) % 9)));
                break;
            }
        }
        presses
    }

    fn child(&mut self, stage: &ChildStage) -> Vec<Action> {
        match stage {
            ChildStage::Intro => vec![Action::Begin],
            ChildStage::Search(search) => self.search(search),
            ChildStage::EmotionPop(pop) => self.pop(pop),
            ChildStage::Pattern(pattern) => self.pattern(pattern),
            ChildStage::Complete(_) => Vec::new(),
        }
    }

    fn search(&mut self, search: &SearchStage) -> Vec<Action> {
        if search.locked {
            return Vec::new();
        }
        let Some(baby) = search.trial.baby_index() else {
            return Vec::new();
        };
        // One wrong pick per round at most, so every profile finds the baby.
        if self.search_miss_round == Some(search.round) || self.chance(self.traits.accuracy) {
            return vec![Action::Press(baby)];
        }
        self.search_miss_round = Some(search.round);
        let toys: Vec<usize> = (0..search.trial.cells.len())
            .filter(|&index| index != baby)
            .collect();
        let pick = toys.choose(&mut self.rng).copied().unwrap_or(baby);
        vec![Action::Press(pick)]
    }

    fn pop(&mut self, pop: &PopStage) -> Vec<Action> {
        let mut actions = Vec::new();
        for balloon in pop.field.balloons() {
            if !self.considered.insert((balloon.id, pop.target)) {
                continue;
            }
            let wanted = if balloon.emotion == pop.target {
                self.chance(self.traits.reacts)
            } else {
                self.traits.impulsive
            };
            if wanted {
                actions.push(Action::Pop(balloon.id));
            }
        }
        actions
    }

    fn pattern(&mut self, pattern: &PatternStage) -> Vec<Action> {
        if pattern.locked {
            return Vec::new();
        }
        let trial = &pattern.trial;
        let chosen = if self.chance(self.traits.accuracy) {
            trial.answer
        } else {
            trial
                .options
                .iter()
                .copied()
                .find(|&shape| shape != trial.answer)
                .unwrap_or(trial.answer)
        };
        vec![Action::Shape(chosen)]
    }

    fn elderly(&mut self, stage: &ElderlyStage) -> Vec<Action> {
        match stage {
            ElderlyStage::Intro | ElderlyStage::ShoppingStudy | ElderlyStage::NameLearn { .. } => {
                vec![Action::Begin]
            }
            ElderlyStage::ShoppingRecall(selection) => {
                if !selection.is_empty() {
                    return Vec::new();
                }
                self.shopping_picks()
            }
            ElderlyStage::NameQuiz { answered: true, .. } | ElderlyStage::Complete(_) => {
                Vec::new()
            }
            ElderlyStage::NameQuiz { .. } => {
                let Some(card) = stage.name_card() else {
                    return Vec::new();
                };
                let answer = card.answer_index();
                let option = if self.chance(self.traits.accuracy) {
                    answer
                } else {
                    (answer + 1) % card.options().len()
                };
                vec![Action::Name(option)]
            }
            ElderlyStage::CategorySort(selection) => {
                if !selection.is_empty() {
                    return Vec::new();
                }
                let mut actions = Vec::new();
                for (index, item) in CATEGORY_BOARD.iter().enumerate() {
                    let pick = if item.is_target {
                        self.chance(self.traits.accuracy)
                    } else {
                        self.traits.impulsive || !self.chance(self.traits.accuracy)
                    };
                    if pick {
                        actions.push(Action::Toggle(index));
                    }
                }
                actions.push(Action::Submit);
                actions
            }
        }
    }

    fn shopping_picks(&mut self) -> Vec<Action> {
        let mut distractors = SHOPPING_BOARD
            .iter()
            .enumerate()
            .filter(|(_, item)| !item.is_target)
            .map(|(index, _)| index);
        let targets: Vec<usize> = SHOPPING_BOARD
            .iter()
            .enumerate()
            .filter(|(_, item)| item.is_target)
            .map(|(index, _)| index)
            .collect();

        let mut picks = Vec::with_capacity(SHOPPING_PICKS);
        for target in targets.into_iter().take(SHOPPING_PICKS) {
            if self.chance(self.traits.accuracy) {
                picks.push(target);
            } else if let Some(distractor) = distractors.next() {
                picks.push(distractor);
            }
        }
        let mut actions: Vec<Action> = picks.into_iter().map(Action::Toggle).collect();
        actions.push(Action::Submit);
        actions
    }
}

impl PlayerPolicy for ScriptedPlayer {
    fn profile(&self) -> PlayerProfile {
        self.profile
    }

    fn decide(&mut self, session: &Level2Session) -> Vec<Action> {
        match session {
            Level2Session::Adult(adult) => self.adult(adult.stage()),
            Level2Session::Child(child) => self.child(child.stage()),
            Level2Session::Elderly(elderly) => self.elderly(elderly.stage()),
        }
    }

    fn reset(&mut self) {
        self.seen_signal = None;
        self.search_miss_round = None;
        self.considered.clear();
    }
}
