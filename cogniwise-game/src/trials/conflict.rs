//! Colour-word interference cards. The printed word always names a different
//! colour than the ink it is printed in; the ink is the answer.
use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use super::Verdict;

pub const CORRECT_POINTS: f64 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Ink {
    Red,
    Blue,
    Green,
    Yellow,
}

impl Ink {
    pub const ALL: [Self; 4] = [Self::Red, Self::Blue, Self::Green, Self::Yellow];

    /// Upper-case word printed on the card.
    #[must_use]
    pub const fn word(self) -> &'static str {
        match self {
            Self::Red => "RED",
            Self::Blue => "BLUE",
            Self::Green => "GREEN",
            Self::Yellow => "YELLOW",
        }
    }

    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Red => "red",
            Self::Blue => "blue",
            Self::Green => "green",
            Self::Yellow => "yellow",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConflictCard {
    pub word: Ink,
    pub ink: Ink,
}

impl ConflictCard {
    #[must_use]
    pub fn is_congruent(&self) -> bool {
        self.word == self.ink
    }
}

/// Draw a word uniformly, then an ink uniformly among the other three colours.
pub fn next_card<R: Rng + ?Sized>(rng: &mut R) -> ConflictCard {
    let word = Ink::ALL[rng.gen_range(0..Ink::ALL.len())];
    let others: Vec<Ink> = Ink::ALL.into_iter().filter(|ink| *ink != word).collect();
    let ink = others.choose(rng).copied().unwrap_or(Ink::Red);
    ConflictCard { word, ink }
}

#[must_use]
pub fn evaluate_color(card: &ConflictCard, chosen: Ink) -> Verdict {
    if chosen == card.ink {
        Verdict::hit(CORRECT_POINTS)
    } else {
        Verdict::miss(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    #[test]
    fn cards_are_never_congruent() {
        let mut rng = SmallRng::seed_from_u64(99);
        for _ in 0..500 {
            assert!(!next_card(&mut rng).is_congruent());
        }
    }

    #[test]
    fn ink_is_the_answer() {
        let card = ConflictCard {
            word: Ink::Red,
            ink: Ink::Blue,
        };
        assert_eq!(evaluate_color(&card, Ink::Blue), Verdict::hit(CORRECT_POINTS));
        assert_eq!(evaluate_color(&card, Ink::Red), Verdict::miss(0.0));
    }
}
