//! Emotion pop: balloons rise across a 0–110 field while a single target
//! emotion is active.
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::Verdict;

pub const SPAWN_Y: f64 = 110.0;
/// Balloons at or above this height (y at or below this value) have left the field.
pub const EXIT_Y: f64 = -20.0;
pub const RISE_PER_TICK: f64 = 1.0;
pub const SPAWN_X_MIN: f64 = 10.0;
pub const SPAWN_X_MAX: f64 = 90.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Emotion {
    Happy,
    Sad,
    Angry,
    Surprised,
}

impl Emotion {
    pub const ALL: [Self; 4] = [Self::Happy, Self::Sad, Self::Angry, Self::Surprised];
    /// Emotions that can be the active target; surprised only ever distracts.
    pub const TARGETS: [Self; 3] = [Self::Happy, Self::Sad, Self::Angry];

    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Happy => "happy",
            Self::Sad => "sad",
            Self::Angry => "angry",
            Self::Surprised => "surprised",
        }
    }
}

impl std::fmt::Display for Emotion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BalloonId(u64);

impl BalloonId {
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Balloon {
    pub id: BalloonId,
    pub emotion: Emotion,
    pub x: f64,
    pub y: f64,
}

pub fn next_target<R: Rng + ?Sized>(rng: &mut R) -> Emotion {
    Emotion::TARGETS[rng.gen_range(0..Emotion::TARGETS.len())]
}

#[must_use]
pub fn evaluate_pop(emotion: Emotion, target: Emotion) -> Verdict {
    if emotion == target {
        Verdict::hit(1.0)
    } else {
        Verdict::miss(0.0)
    }
}

/// Balloons currently on screen, in spawn order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BalloonField {
    balloons: Vec<Balloon>,
    next_id: u64,
}

impl BalloonField {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn spawn<R: Rng + ?Sized>(&mut self, rng: &mut R) -> BalloonId {
        let id = BalloonId(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        let emotion = Emotion::ALL[rng.gen_range(0..Emotion::ALL.len())];
        let x = rng.gen_range(SPAWN_X_MIN..SPAWN_X_MAX);
        self.balloons.push(Balloon {
            id,
            emotion,
            x,
            y: SPAWN_Y,
        });
        id
    }

    /// Move every balloon up one step and drop those that left the field.
    /// Returns how many were dropped.
    pub fn tick(&mut self) -> usize {
        let before = self.balloons.len();
        for balloon in &mut self.balloons {
            balloon.y -= RISE_PER_TICK;
        }
        self.balloons.retain(|balloon| balloon.y > EXIT_Y);
        before - self.balloons.len()
    }

    /// Remove the balloon and score it against `target`. Unknown ids yield `None`.
    pub fn pop(&mut self, id: BalloonId, target: Emotion) -> Option<Verdict> {
        let index = self.balloons.iter().position(|balloon| balloon.id == id)?;
        let balloon = self.balloons.remove(index);
        Some(evaluate_pop(balloon.emotion, target))
    }

    pub fn clear(&mut self) {
        self.balloons.clear();
    }

    #[must_use]
    pub fn balloons(&self) -> &[Balloon] {
        &self.balloons
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.balloons.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.balloons.is_empty()
    }

    #[must_use]
    pub fn find(&self, emotion: Emotion) -> Option<&Balloon> {
        self.balloons.iter().find(|balloon| balloon.emotion == emotion)
    }
}
