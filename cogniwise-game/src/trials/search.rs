//! Find-the-baby grid: one baby hidden among eight toys.
use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use super::Verdict;

pub const SEARCH_CELLS: usize = 9;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchToken {
    Baby,
    Train,
    Car,
    Teddy,
    Ball,
    Dog,
    Cat,
    Rabbit,
    Fox,
    Frog,
    Robot,
}

impl SearchToken {
    pub const TOYS: [Self; 10] = [
        Self::Train,
        Self::Car,
        Self::Teddy,
        Self::Ball,
        Self::Dog,
        Self::Cat,
        Self::Rabbit,
        Self::Fox,
        Self::Frog,
        Self::Robot,
    ];

    #[must_use]
    pub const fn glyph(self) -> &'static str {
        match self {
            Self::Baby => "👶",
            Self::Train => "🚂",
            Self::Car => "🚗",
            Self::Teddy => "🧸",
            Self::Ball => "⚽",
            Self::Dog => "🐶",
            Self::Cat => "🐱",
            Self::Rabbit => "🐰",
            Self::Fox => "🦊",
            Self::Frog => "🐸",
            Self::Robot => "🤖",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchTrial {
    pub cells: [SearchToken; SEARCH_CELLS],
}

impl SearchTrial {
    /// Index of the single baby cell.
    #[must_use]
    pub fn baby_index(&self) -> Option<usize> {
        self.cells.iter().position(|token| *token == SearchToken::Baby)
    }
}

/// Eight toys drawn with replacement plus one baby, shuffled.
pub fn next_search<R: Rng + ?Sized>(rng: &mut R) -> SearchTrial {
    let mut cells = [SearchToken::Baby; SEARCH_CELLS];
    for cell in cells.iter_mut().take(SEARCH_CELLS - 1) {
        *cell = SearchToken::TOYS[rng.gen_range(0..SearchToken::TOYS.len())];
    }
    cells.shuffle(rng);
    SearchTrial { cells }
}

/// `None` for an index off the grid; otherwise +1 for the baby and a plain miss for toys.
#[must_use]
pub fn evaluate_search(trial: &SearchTrial, index: usize) -> Option<Verdict> {
    trial.cells.get(index).map(|token| match token {
        SearchToken::Baby => Verdict::hit(1.0),
        _ => Verdict::miss(0.0),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    #[test]
    fn exactly_one_baby_per_grid() {
        let mut rng = SmallRng::seed_from_u64(17);
        for _ in 0..200 {
            let trial = next_search(&mut rng);
            let babies = trial
                .cells
                .iter()
                .filter(|token| **token == SearchToken::Baby)
                .count();
            assert_eq!(babies, 1);
        }
    }

    #[test]
    fn only_the_baby_scores() {
        let mut rng = SmallRng::seed_from_u64(4);
        let trial = next_search(&mut rng);
        let baby = trial.baby_index().unwrap();
        assert_eq!(evaluate_search(&trial, baby), Some(Verdict::hit(1.0)));
        let toy = (baby + 1) % SEARCH_CELLS;
        assert_eq!(evaluate_search(&trial, toy), Some(Verdict::miss(0.0)));
        assert_eq!(evaluate_search(&trial, SEARCH_CELLS), None);
    }
}
