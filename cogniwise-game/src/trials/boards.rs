//! Fixed elderly boards: shopping list, name association and category sort.
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use super::Verdict;
use crate::numbers::count_to_f64;

/// Items the player must pick on the shopping recall board.
pub const SHOPPING_PICKS: usize = 3;
pub const SORT_WRONG_PENALTY: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardItem {
    pub id: &'static str,
    pub label: &'static str,
    pub is_target: bool,
}

const fn item(id: &'static str, label: &'static str, is_target: bool) -> BoardItem {
    BoardItem {
        id,
        label,
        is_target,
    }
}

/// Shopping recall grid, targets interleaved with distractors.
pub const SHOPPING_BOARD: [BoardItem; 6] = [
    item("apple", "Apple", true),
    item("car", "Car", false),
    item("hammer", "Hammer", false),
    item("bread", "Sandwich", true),
    item("milk", "Coffee", true),
    item("plant", "Flower", false),
];

/// Category sort grid; the animals are the targets.
pub const CATEGORY_BOARD: [BoardItem; 6] = [
    item("dog", "Dog", true),
    item("chair", "Chair", false),
    item("bed", "Bed", false),
    item("cat", "Cat", true),
    item("sofa", "Sofa", false),
    item("fish", "Fish", true),
];

/// The items shown on the shopping study screen.
pub fn shopping_list() -> impl Iterator<Item = &'static BoardItem> {
    SHOPPING_BOARD.iter().filter(|item| item.is_target)
}

/// Toggled board indices with an optional pick limit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    picked: SmallVec<[usize; 6]>,
    limit: Option<usize>,
}

impl Selection {
    #[must_use]
    pub fn limited(limit: usize) -> Self {
        Self {
            picked: SmallVec::new(),
            limit: Some(limit),
        }
    }

    #[must_use]
    pub fn unlimited() -> Self {
        Self::default()
    }

    /// Toggle `index` on a board of `board_len` items.
    ///
    /// Returns false when nothing changed: the index is off the board, or the
    /// selection is full and `index` is not already picked.
    pub fn toggle(&mut self, index: usize, board_len: usize) -> bool {
        if index >= board_len {
            return false;
        }
        if let Some(position) = self.picked.iter().position(|picked| *picked == index) {
            self.picked.remove(position);
            return true;
        }
        if self.limit.is_some_and(|limit| self.picked.len() >= limit) {
            return false;
        }
        self.picked.push(index);
        true
    }

    #[must_use]
    pub fn contains(&self, index: usize) -> bool {
        self.picked.contains(&index)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.picked.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.picked.is_empty()
    }

    #[must_use]
    pub fn indices(&self) -> &[usize] {
        &self.picked
    }

    fn split(&self, board: &[BoardItem]) -> (usize, usize) {
        self.picked
            .iter()
            .filter_map(|index| board.get(*index))
            .fold((0, 0), |(hits, misses), item| {
                if item.is_target {
                    (hits + 1, misses)
                } else {
                    (hits, misses + 1)
                }
            })
    }
}

/// Count of selected targets.
#[must_use]
pub fn score_recall(board: &[BoardItem], selection: &Selection) -> f64 {
    count_to_f64(selection.split(board).0)
}

/// `max(0, correct - 0.5 * incorrect)`.
#[must_use]
pub fn score_category_sort(board: &[BoardItem], selection: &Selection) -> f64 {
    let (hits, misses) = selection.split(board);
    (count_to_f64(hits) - SORT_WRONG_PENALTY * count_to_f64(misses)).max(0.0)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NameCard {
    pub name: &'static str,
    pub distractors: [&'static str; 2],
}

pub const NAME_CARDS: [NameCard; 2] = [
    NameCard {
        name: "Robert",
        distractors: ["James", "William"],
    },
    NameCard {
        name: "Sarah",
        distractors: ["Mary", "Linda"],
    },
];

impl NameCard {
    /// Quiz options in alphabetical order.
    #[must_use]
    pub fn options(&self) -> [&'static str; 3] {
        let mut options = [self.name, self.distractors[0], self.distractors[1]];
        options.sort_unstable();
        options
    }

    /// Index of the correct option in [`Self::options`].
    #[must_use]
    pub fn answer_index(&self) -> usize {
        self.options()
            .iter()
            .position(|option| *option == self.name)
            .unwrap_or(0)
    }
}

#[must_use]
pub fn evaluate_name(card: &NameCard, chosen: &str) -> Verdict {
    if chosen == card.name {
        Verdict::hit(1.0)
    } else {
        Verdict::miss(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shopping_selection_caps_at_three() {
        let mut selection = Selection::limited(SHOPPING_PICKS);
        assert!(selection.toggle(0, SHOPPING_BOARD.len()));
        assert!(selection.toggle(1, SHOPPING_BOARD.len()));
        assert!(selection.toggle(3, SHOPPING_BOARD.len()));
        assert!(!selection.toggle(4, SHOPPING_BOARD.len()));
        assert!(selection.toggle(1, SHOPPING_BOARD.len()));
        assert!(selection.toggle(4, SHOPPING_BOARD.len()));
        assert!(!selection.toggle(6, SHOPPING_BOARD.len()));
        assert!((score_recall(&SHOPPING_BOARD, &selection) - 3.0).abs() < f64::EPSILON);
    }

    #[test]
    fn study_list_names_the_three_targets() {
        let ids: Vec<&str> = shopping_list().map(|item| item.id).collect();
        assert_eq!(ids, ["apple", "bread", "milk"]);
    }

    #[test]
    fn category_sort_penalizes_wrong_picks() {
        let mut selection = Selection::unlimited();
        for index in 0..CATEGORY_BOARD.len() {
            selection.toggle(index, CATEGORY_BOARD.len());
        }
        // 3 animals, 3 furniture: 3 - 1.5
        assert!((score_category_sort(&CATEGORY_BOARD, &selection) - 1.5).abs() < f64::EPSILON);

        let mut furniture_only = Selection::unlimited();
        furniture_only.toggle(1, CATEGORY_BOARD.len());
        furniture_only.toggle(2, CATEGORY_BOARD.len());
        assert!((score_category_sort(&CATEGORY_BOARD, &furniture_only)).abs() < f64::EPSILON);
    }

    #[test]
    fn name_options_are_sorted() {
        assert_eq!(NAME_CARDS[0].options(), ["James", "Robert", "William"]);
        assert_eq!(NAME_CARDS[1].options(), ["Linda", "Mary", "Sarah"]);
        assert_eq!(NAME_CARDS[1].answer_index(), 2);
        assert!(evaluate_name(&NAME_CARDS[0], "Robert").correct);
        assert!(!evaluate_name(&NAME_CARDS[0], "James").correct);
    }
}
