//! Age bands select which three mini-games run and which weight table applies.
use serde::{Deserialize, Serialize};

use crate::scoring::{DomainCaps, DomainWeights};

/// Oldest age routed to the child games.
pub const CHILD_MAX_AGE: u32 = 12;
/// Oldest age routed to the adult games.
pub const ADULT_MAX_AGE: u32 = 59;

/// Age band of the person being assessed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgeBand {
    Child,
    Adult,
    Elderly,
}

impl AgeBand {
    pub const ALL: [Self; 3] = [Self::Child, Self::Adult, Self::Elderly];

    /// Resolve the band from a profile age in years.
    #[must_use]
    pub const fn from_age(age: u32) -> Self {
        if age <= CHILD_MAX_AGE {
            Self::Child
        } else if age <= ADULT_MAX_AGE {
            Self::Adult
        } else {
            Self::Elderly
        }
    }

    /// Wire identifier used by the results API (`age_group`).
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Child => "child",
            Self::Adult => "adult",
            Self::Elderly => "elderly",
        }
    }

    /// Parse a wire identifier, case-insensitively.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|band| band.key().eq_ignore_ascii_case(value.trim()))
    }

    /// Fixed domain weights for this band.
    #[must_use]
    pub const fn weights(self) -> DomainWeights {
        match self {
            Self::Adult => DomainWeights::new(0.35, 0.35, 0.30),
            Self::Child | Self::Elderly => DomainWeights::new(0.40, 0.30, 0.30),
        }
    }

    /// Raw-score caps used to normalize each domain.
    #[must_use]
    pub const fn caps(self) -> DomainCaps {
        match self {
            Self::Adult => DomainCaps::new(100.0, 100.0, 80.0),
            Self::Child => DomainCaps::new(5.0, 10.0, 50.0),
            Self::Elderly => DomainCaps::new(3.0, 2.0, 3.0),
        }
    }

    /// Domain labels in A, B, C order.
    #[must_use]
    pub const fn domain_labels(self) -> [&'static str; 3] {
        match self {
            Self::Adult => ["attention_focus", "working_memory", "inhibition_control"],
            Self::Child => ["social_attention", "emotion_recognition", "sensory_motor"],
            Self::Elderly => ["memory_recall", "name_association", "category_sort"],
        }
    }

    /// Player-facing titles of the three mini-games.
    #[must_use]
    pub const fn game_titles(self) -> [&'static str; 3] {
        match self {
            Self::Adult => [
                "Attention Vigilance Task",
                "Working Memory Sequence",
                "Response Inhibition Task",
            ],
            Self::Child => ["Find the Baby", "Emotion Pop", "Wonder Train"],
            Self::Elderly => ["Shopping List", "Name Association", "Category Sort"],
        }
    }
}

impl std::fmt::Display for AgeBand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

/// Display label for the module header, finer grained than the band.
#[must_use]
pub const fn cohort_label(age: u32) -> &'static str {
    match AgeBand::from_age(age) {
        AgeBand::Child => "Child",
        AgeBand::Elderly => "Elderly",
        AgeBand::Adult => {
            if age >= 41 {
                "Older Adult"
            } else if age >= 30 {
                "Mid-Life Adult"
            } else {
                "Young Adult"
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn band_boundaries_follow_profile_age() {
        assert_eq!(AgeBand::from_age(0), AgeBand::Child);
        assert_eq!(AgeBand::from_age(12), AgeBand::Child);
        assert_eq!(AgeBand::from_age(13), AgeBand::Adult);
        assert_eq!(AgeBand::from_age(59), AgeBand::Adult);
        assert_eq!(AgeBand::from_age(60), AgeBand::Elderly);
    }

    #[test]
    fn cohort_labels_split_adults() {
        assert_eq!(cohort_label(8), "Child");
        assert_eq!(cohort_label(13), "Young Adult");
        assert_eq!(cohort_label(29), "Young Adult");
        assert_eq!(cohort_label(30), "Mid-Life Adult");
        assert_eq!(cohort_label(40), "Mid-Life Adult");
        assert_eq!(cohort_label(41), "Older Adult");
        assert_eq!(cohort_label(75), "Elderly");
    }

    #[test]
    fn every_weight_table_sums_to_one() {
        for band in AgeBand::ALL {
            assert!(band.weights().validate().is_ok(), "{band} weights");
        }
    }

    #[test]
    fn wire_keys_roundtrip() {
        for band in AgeBand::ALL {
            assert_eq!(AgeBand::parse(band.key()), Some(band));
            let json = serde_json::to_string(&band).unwrap();
            assert_eq!(json, format!("\"{}\"", band.key()));
        }
        assert_eq!(AgeBand::parse(" Adult "), Some(AgeBand::Adult));
        assert_eq!(AgeBand::parse("teen"), None);
    }
}
