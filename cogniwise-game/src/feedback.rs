//! Short player-facing cues raised by evaluated actions.
use serde::{Deserialize, Serialize};

use crate::trials::Emotion;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "cue", rename_all = "snake_case")]
pub enum Cue {
    GoodReflex,
    WrongSignal,
    SequenceBroken,
    ColorCorrect,
    ReadTheInk,
    BabyFound,
    ThatsAToy,
    LookFor { target: Emotion },
    TrainCorrect,
    TrainMissed,
    NameRecalled,
    NameMissed,
}

/// Tone used when rendering a cue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    Positive,
    Corrective,
}

impl Cue {
    #[must_use]
    pub fn message(self) -> String {
        match self {
            Self::GoodReflex => "Good reflex!".to_string(),
            Self::WrongSignal => "Wrong signal!".to_string(),
            Self::SequenceBroken => "Sequence broken!".to_string(),
            Self::ColorCorrect => "Correct!".to_string(),
            Self::ReadTheInk => "Don't read the word! Match the color.".to_string(),
            Self::BabyFound => "Found the baby! Great job!".to_string(),
            Self::ThatsAToy => "That's a toy! Find the baby face.".to_string(),
            Self::LookFor { target } => {
                format!("Oops! Look for {} faces!", target.key().to_uppercase())
            }
            Self::TrainCorrect => "Choo choo! Correct!".to_string(),
            Self::TrainMissed => "Try again next time!".to_string(),
            Self::NameRecalled => "That's right!".to_string(),
            Self::NameMissed => "Not quite.".to_string(),
        }
    }

    #[must_use]
    pub const fn tone(self) -> Tone {
        match self {
            Self::GoodReflex
            | Self::ColorCorrect
            | Self::BabyFound
            | Self::TrainCorrect
            | Self::NameRecalled => Tone::Positive,
            Self::WrongSignal
            | Self::SequenceBroken
            | Self::ReadTheInk
            | Self::ThatsAToy
            | Self::LookFor { .. }
            | Self::TrainMissed
            | Self::NameMissed => Tone::Corrective,
        }
    }
}

impl std::fmt::Display for Cue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn emotion_prompt_names_the_target() {
        let cue = Cue::LookFor {
            target: Emotion::Happy,
        };
        assert_eq!(cue.to_string(), "Oops! Look for HAPPY faces!");
        assert_eq!(cue.tone(), Tone::Corrective);
    }

    #[test]
    fn cues_serialize_tagged() {
        let json = serde_json::to_string(&Cue::LookFor {
            target: Emotion::Sad,
        })
        .unwrap();
        assert_eq!(json, r#"{"cue":"look_for","target":"sad"}"#);
    }
}
