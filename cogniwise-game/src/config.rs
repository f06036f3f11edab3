//! Timing and round-limit configuration for the three assessment bands.
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::age_band::AgeBand;
use crate::numbers::count_to_f64;
use crate::scoring::DomainCaps;
use crate::timers::Millis;
use crate::trials::boards::{CATEGORY_BOARD, NAME_CARDS, SHOPPING_PICKS};
use crate::trials::{conflict, pattern, recall, signal};

const DEFAULT_ASSESSMENT_DATA: &str = include_str!("../assets/assessment.json");

/// Largest sequence the 3x3 recall grid can meaningfully ask for.
pub const RECALL_LENGTH_LIMIT: u8 = 9;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct AssessmentConfig {
    #[serde(default)]
    pub adult: AdultTiming,
    #[serde(default)]
    pub child: ChildTiming,
    #[serde(default)]
    pub elderly: ElderlyTiming,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdultTiming {
    #[serde(default = "AdultTiming::default_signal_period_ms")]
    pub signal_period_ms: Millis,
    #[serde(default = "AdultTiming::default_signal_visible_ms")]
    pub signal_visible_ms: Millis,
    #[serde(default = "AdultTiming::default_signal_rounds")]
    pub signal_rounds: u32,
    #[serde(default = "AdultTiming::default_recall_step_ms")]
    pub recall_step_ms: Millis,
    #[serde(default = "AdultTiming::default_recall_lit_ms")]
    pub recall_lit_ms: Millis,
    #[serde(default = "AdultTiming::default_recall_release_ms")]
    pub recall_release_ms: Millis,
    #[serde(default = "AdultTiming::default_recall_flash_ms")]
    pub recall_flash_ms: Millis,
    #[serde(default = "AdultTiming::default_recall_max_length")]
    pub recall_max_length: u8,
    #[serde(default = "AdultTiming::default_conflict_card_ms")]
    pub conflict_card_ms: Millis,
    #[serde(default = "AdultTiming::default_conflict_cards")]
    pub conflict_cards: u32,
    #[serde(default = "AdultTiming::default_handoff_ms")]
    pub handoff_ms: Millis,
}

impl AdultTiming {
    const fn default_signal_period_ms() -> Millis {
        1000
    }

    const fn default_signal_visible_ms() -> Millis {
        750
    }

    const fn default_signal_rounds() -> u32 {
        15
    }

    const fn default_recall_step_ms() -> Millis {
        1000
    }

    const fn default_recall_lit_ms() -> Millis {
        600
    }

    const fn default_recall_release_ms() -> Millis {
        800
    }

    const fn default_recall_flash_ms() -> Millis {
        200
    }

    const fn default_recall_max_length() -> u8 {
        5
    }

    const fn default_conflict_card_ms() -> Millis {
        2000
    }

    const fn default_conflict_cards() -> u32 {
        10
    }

    const fn default_handoff_ms() -> Millis {
        1000
    }
}

impl Default for AdultTiming {
    fn default() -> Self {
        Self {
            signal_period_ms: Self::default_signal_period_ms(),
            signal_visible_ms: Self::default_signal_visible_ms(),
            signal_rounds: Self::default_signal_rounds(),
            recall_step_ms: Self::default_recall_step_ms(),
            recall_lit_ms: Self::default_recall_lit_ms(),
            recall_release_ms: Self::default_recall_release_ms(),
            recall_flash_ms: Self::default_recall_flash_ms(),
            recall_max_length: Self::default_recall_max_length(),
            conflict_card_ms: Self::default_conflict_card_ms(),
            conflict_cards: Self::default_conflict_cards(),
            handoff_ms: Self::default_handoff_ms(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChildTiming {
    #[serde(default = "ChildTiming::default_search_rounds")]
    pub search_rounds: u32,
    #[serde(default = "ChildTiming::default_search_handoff_ms")]
    pub search_handoff_ms: Millis,
    #[serde(default = "ChildTiming::default_pop_spawn_ms")]
    pub pop_spawn_ms: Millis,
    #[serde(default = "ChildTiming::default_pop_tick_ms")]
    pub pop_tick_ms: Millis,
    #[serde(default = "ChildTiming::default_pop_retarget_ms")]
    pub pop_retarget_ms: Millis,
    #[serde(default = "ChildTiming::default_pop_duration_ms")]
    pub pop_duration_ms: Millis,
    #[serde(default = "ChildTiming::default_pattern_rounds")]
    pub pattern_rounds: u32,
    #[serde(default = "ChildTiming::default_pattern_feedback_ms")]
    pub pattern_feedback_ms: Millis,
}

impl ChildTiming {
    const fn default_search_rounds() -> u32 {
        5
    }

    const fn default_search_handoff_ms() -> Millis {
        1500
    }

    const fn default_pop_spawn_ms() -> Millis {
        1200
    }

    const fn default_pop_tick_ms() -> Millis {
        30
    }

    const fn default_pop_retarget_ms() -> Millis {
        8000
    }

    const fn default_pop_duration_ms() -> Millis {
        25_000
    }

    const fn default_pattern_rounds() -> u32 {
        5
    }

    const fn default_pattern_feedback_ms() -> Millis {
        1000
    }
}

impl Default for ChildTiming {
    fn default() -> Self {
        Self {
            search_rounds: Self::default_search_rounds(),
            search_handoff_ms: Self::default_search_handoff_ms(),
            pop_spawn_ms: Self::default_pop_spawn_ms(),
            pop_tick_ms: Self::default_pop_tick_ms(),
            pop_retarget_ms: Self::default_pop_retarget_ms(),
            pop_duration_ms: Self::default_pop_duration_ms(),
            pattern_rounds: Self::default_pattern_rounds(),
            pattern_feedback_ms: Self::default_pattern_feedback_ms(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElderlyTiming {
    #[serde(default = "ElderlyTiming::default_name_feedback_ms")]
    pub name_feedback_ms: Millis,
}

impl ElderlyTiming {
    const fn default_name_feedback_ms() -> Millis {
        500
    }
}

impl Default for ElderlyTiming {
    fn default() -> Self {
        Self {
            name_feedback_ms: Self::default_name_feedback_ms(),
        }
    }
}

/// Errors raised when timing invariants are violated.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{field} must be greater than zero")]
    Zero { field: &'static str },
    #[error("{field} ({value} ms) must be shorter than {limit_field} ({limit} ms)")]
    NotShorter {
        field: &'static str,
        value: Millis,
        limit_field: &'static str,
        limit: Millis,
    },
    #[error("recall_max_length must be between 1 and {max} (got {value})")]
    RecallLength { value: u8, max: u8 },
    #[error("failed to parse assessment config: {0}")]
    Parse(String),
}

fn non_zero(field: &'static str, value: u64) -> Result<(), ConfigError> {
    if value == 0 {
        Err(ConfigError::Zero { field })
    } else {
        Ok(())
    }
}

fn shorter(
    field: &'static str,
    value: Millis,
    limit_field: &'static str,
    limit: Millis,
) -> Result<(), ConfigError> {
    if value < limit {
        Ok(())
    } else {
        Err(ConfigError::NotShorter {
            field,
            value,
            limit_field,
            limit,
        })
    }
}

fn scale(value: Millis, divisor: u64) -> Millis {
    (value / divisor.max(1)).max(1)
}

/// Scale a visible window together with its period, keeping the window strictly shorter.
fn scale_window(window: Millis, period: Millis, divisor: u64) -> (Millis, Millis) {
    let period = scale(period, divisor).max(2);
    (scale(window, divisor).min(period - 1), period)
}

impl AssessmentConfig {
    /// Parse the bundled asset, falling back to compiled defaults.
    #[must_use]
    pub fn load_from_static() -> Self {
        serde_json::from_str(DEFAULT_ASSESSMENT_DATA).unwrap_or_default()
    }

    #[must_use]
    pub fn default_config() -> Self {
        Self::load_from_static()
    }

    /// Parse and validate a JSON override.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed JSON, or the first violated invariant.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let cfg: Self =
            serde_json::from_str(json).map_err(|err| ConfigError::Parse(err.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Check periods are positive and visible windows fit inside their periods.
    ///
    /// # Errors
    ///
    /// Returns the first violated invariant.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let adult = &self.adult;
        non_zero("adult.signal_period_ms", adult.signal_period_ms)?;
        non_zero("adult.signal_rounds", u64::from(adult.signal_rounds))?;
        shorter(
            "adult.signal_visible_ms",
            adult.signal_visible_ms,
            "adult.signal_period_ms",
            adult.signal_period_ms,
        )?;
        non_zero("adult.recall_step_ms", adult.recall_step_ms)?;
        shorter(
            "adult.recall_lit_ms",
            adult.recall_lit_ms,
            "adult.recall_step_ms",
            adult.recall_step_ms,
        )?;
        if adult.recall_max_length == 0 || adult.recall_max_length > RECALL_LENGTH_LIMIT {
            return Err(ConfigError::RecallLength {
                value: adult.recall_max_length,
                max: RECALL_LENGTH_LIMIT,
            });
        }
        non_zero("adult.conflict_card_ms", adult.conflict_card_ms)?;
        non_zero("adult.conflict_cards", u64::from(adult.conflict_cards))?;

        let child = &self.child;
        non_zero("child.search_rounds", u64::from(child.search_rounds))?;
        non_zero("child.pop_spawn_ms", child.pop_spawn_ms)?;
        non_zero("child.pop_tick_ms", child.pop_tick_ms)?;
        non_zero("child.pop_retarget_ms", child.pop_retarget_ms)?;
        non_zero("child.pop_duration_ms", child.pop_duration_ms)?;
        non_zero("child.pattern_rounds", u64::from(child.pattern_rounds))?;
        Ok(())
    }

    /// Highest raw score each domain can reach for `band` under these timings.
    ///
    /// Unlike [`AgeBand::caps`], which only normalizes, these are hard ceilings:
    /// emotion pop is bounded by the number of balloons the stage spawns.
    #[must_use]
    pub fn score_ceilings(&self, band: AgeBand) -> DomainCaps {
        match band {
            AgeBand::Adult => {
                let adult = &self.adult;
                let levels: u32 = (1..=u32::from(adult.recall_max_length)).sum();
                DomainCaps::new(
                    f64::from(adult.signal_rounds) * signal::TARGET_POINTS,
                    f64::from(levels) * recall::POINTS_PER_ELEMENT,
                    f64::from(adult.conflict_cards) * conflict::CORRECT_POINTS,
                )
            }
            AgeBand::Child => {
                let child = &self.child;
                let spawns = child.pop_duration_ms / child.pop_spawn_ms.max(1);
                DomainCaps::new(
                    f64::from(child.search_rounds),
                    f64::from(u32::try_from(spawns).unwrap_or(u32::MAX)),
                    f64::from(child.pattern_rounds) * pattern::CORRECT_POINTS,
                )
            }
            AgeBand::Elderly => DomainCaps::new(
                count_to_f64(SHOPPING_PICKS),
                count_to_f64(NAME_CARDS.len()),
                count_to_f64(CATEGORY_BOARD.iter().filter(|item| item.is_target).count()),
            ),
        }
    }

    /// Shrink every duration by `divisor` (minimum 1 ms), keeping round limits.
    ///
    /// Used for fast automated sweeps. Visible windows stay shorter than their
    /// periods, and the result is validated again.
    ///
    /// # Errors
    ///
    /// Returns the first invariant the shrunk timings violate.
    pub fn compressed(&self, divisor: u64) -> Result<Self, ConfigError> {
        let adult = &self.adult;
        let child = &self.child;
        let (signal_visible_ms, signal_period_ms) =
            scale_window(adult.signal_visible_ms, adult.signal_period_ms, divisor);
        let (recall_lit_ms, recall_step_ms) =
            scale_window(adult.recall_lit_ms, adult.recall_step_ms, divisor);
        let cfg = Self {
            adult: AdultTiming {
                signal_period_ms,
                signal_visible_ms,
                recall_step_ms,
                recall_lit_ms,
                recall_release_ms: scale(adult.recall_release_ms, divisor),
                recall_flash_ms: scale(adult.recall_flash_ms, divisor),
                conflict_card_ms: scale(adult.conflict_card_ms, divisor),
                handoff_ms: scale(adult.handoff_ms, divisor),
                ..adult.clone()
            },
            child: ChildTiming {
                search_handoff_ms: scale(child.search_handoff_ms, divisor),
                pop_spawn_ms: scale(child.pop_spawn_ms, divisor),
                pop_tick_ms: scale(child.pop_tick_ms, divisor),
                pop_retarget_ms: scale(child.pop_retarget_ms, divisor),
                pop_duration_ms: scale(child.pop_duration_ms, divisor),
                pattern_feedback_ms: scale(child.pattern_feedback_ms, divisor),
                ..child.clone()
            },
            elderly: ElderlyTiming {
                name_feedback_ms: scale(self.elderly.name_feedback_ms, divisor),
            },
        };
        cfg.validate()?;
        Ok(cfg)
    }
}
