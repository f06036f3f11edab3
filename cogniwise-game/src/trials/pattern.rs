//! Wonder Train pattern completion.
use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use super::Verdict;

pub const CORRECT_POINTS: f64 = 10.0;
pub const SHOWN_CARS: usize = 5;
pub const OPTION_COUNT: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Shape {
    Red,
    Blue,
    Yellow,
    Green,
}

impl Shape {
    pub const PALETTE: [Self; 4] = [Self::Red, Self::Blue, Self::Yellow, Self::Green];

    #[must_use]
    pub const fn glyph(self) -> &'static str {
        match self {
            Self::Red => "🟥",
            Self::Blue => "🟦",
            Self::Yellow => "🟨",
            Self::Green => "🟩",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatternRule {
    /// `A B A B A` → `B`
    AlternatingPair,
    /// `A B C A B` → `C`
    ThreeCycle,
    /// `A A B B A` → `A`
    PairedRepeat,
}

impl PatternRule {
    fn build(self, [a, b, c]: [Shape; 3]) -> ([Shape; SHOWN_CARS], Shape) {
        match self {
            Self::AlternatingPair => ([a, b, a, b, a], b),
            Self::ThreeCycle => ([a, b, c, a, b], c),
            Self::PairedRepeat => ([a, a, b, b, a], a),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternTrial {
    pub rule: PatternRule,
    pub shown: [Shape; SHOWN_CARS],
    pub answer: Shape,
    pub options: [Shape; OPTION_COUNT],
}

/// Odd rounds pick between the alternating pair and the three-cycle; even
/// rounds always use the paired repeat.
pub fn next_pattern<R: Rng + ?Sized>(round: u32, rng: &mut R) -> PatternTrial {
    let mut palette = Shape::PALETTE;
    palette.shuffle(rng);
    let symbols = [palette[0], palette[1], palette[2]];

    let rule = if round % 2 == 0 {
        PatternRule::PairedRepeat
    } else if rng.gen_bool(0.5) {
        PatternRule::AlternatingPair
    } else {
        PatternRule::ThreeCycle
    };
    let (shown, answer) = rule.build(symbols);

    let mut distractors: Vec<Shape> = Shape::PALETTE
        .into_iter()
        .filter(|shape| *shape != answer)
        .collect();
    distractors.shuffle(rng);
    let mut options = [answer, distractors[0], distractors[1]];
    options.shuffle(rng);

    PatternTrial {
        rule,
        shown,
        answer,
        options,
    }
}

#[must_use]
pub fn evaluate_pattern(trial: &PatternTrial, chosen: Shape) -> Verdict {
    if chosen == trial.answer {
        Verdict::hit(CORRECT_POINTS)
    } else {
        Verdict::miss(0.0)
    }
}
