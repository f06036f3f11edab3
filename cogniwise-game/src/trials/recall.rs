//! Working memory sequence: grow a cell sequence by one each level and check
//! the player's reproduction prefix by prefix.
use rand::Rng;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use super::signal::GRID_CELLS;

pub const POINTS_PER_ELEMENT: f64 = 10.0;

pub type RecallSequence = SmallVec<[u8; 9]>;

/// Copy `previous` and append one uniformly drawn cell index.
pub fn extend_sequence<R: Rng + ?Sized>(previous: &[u8], rng: &mut R) -> RecallSequence {
    let mut next = RecallSequence::from_slice(previous);
    // GRID_CELLS is 9, so every index fits a u8.
    next.push(rng.gen_range(0..GRID_CELLS as u8));
    next
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecallProgress {
    /// Correct so far, more input expected.
    Pending,
    /// The newest input diverged from the target.
    Broken,
    /// The full sequence was reproduced.
    Complete { bonus: f64 },
}

/// Check `entered` as a prefix of `target`.
#[must_use]
pub fn evaluate_recall(target: &[u8], entered: &[u8]) -> RecallProgress {
    if entered.len() > target.len() || !target.starts_with(entered) {
        return RecallProgress::Broken;
    }
    if entered.len() == target.len() {
        RecallProgress::Complete {
            bonus: crate::numbers::count_to_f64(target.len()) * POINTS_PER_ELEMENT,
        }
    } else {
        RecallProgress::Pending
    }
}
