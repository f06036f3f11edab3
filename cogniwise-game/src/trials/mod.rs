//! Stimulus generators and answer evaluators for every mini-game.
//!
//! Generators only consume randomness; evaluators are pure. Neither knows
//! about stages, timers or round limits, which belong to the session machines.
use serde::{Deserialize, Serialize};

pub mod balloons;
pub mod boards;
pub mod conflict;
pub mod pattern;
pub mod recall;
pub mod search;
pub mod signal;

pub use balloons::{Balloon, BalloonField, BalloonId, Emotion};
pub use boards::{BoardItem, NameCard, Selection};
pub use conflict::{ConflictCard, Ink};
pub use pattern::{PatternRule, PatternTrial, Shape};
pub use recall::{RecallProgress, RecallSequence};
pub use search::{SearchToken, SearchTrial};
pub use signal::{CellKind, Signal, SignalCell, SignalGrid};

/// Correctness and score change produced by one evaluated action.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Verdict {
    pub correct: bool,
    pub delta: f64,
}

impl Verdict {
    #[must_use]
    pub const fn hit(delta: f64) -> Self {
        Self {
            correct: true,
            delta,
        }
    }

    #[must_use]
    pub const fn miss(delta: f64) -> Self {
        Self {
            correct: false,
            delta,
        }
    }
}
