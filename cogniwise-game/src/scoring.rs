//! Domain score accumulation, normalization and risk aggregation.
//!
//! Every age band produces three raw domain scores. Each is normalized against
//! the band's cap, weighted, and folded into a single 0–100 risk score where
//! higher means more concerning.
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::age_band::AgeBand;
use crate::numbers::{clamp_unit, round_percent};

/// Risk scores at or above this value are flagged as high risk.
pub const HIGH_RISK_THRESHOLD: u8 = 55;

const WEIGHT_SUM_TOLERANCE: f64 = 1e-9;

/// One of the three scored domains of a band, in submission order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Domain {
    A,
    B,
    C,
}

impl Domain {
    pub const ALL: [Self; 3] = [Self::A, Self::B, Self::C];
}

/// Non-negative running score for a single domain.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DomainScore(f64);

impl DomainScore {
    pub const ZERO: Self = Self(0.0);

    /// Construct a score, flooring negative or non-finite input at zero.
    #[must_use]
    pub fn new(value: f64) -> Self {
        if value.is_finite() && value > 0.0 {
            Self(value)
        } else {
            Self::ZERO
        }
    }

    #[must_use]
    pub const fn value(self) -> f64 {
        self.0
    }

    /// Apply a signed delta; the running total never drops below zero.
    pub fn apply(&mut self, delta: f64) {
        *self = Self::new(self.0 + delta);
    }
}

/// The three raw domain accumulators owned by a running session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DomainScores {
    pub a: DomainScore,
    pub b: DomainScore,
    pub c: DomainScore,
}

impl DomainScores {
    #[must_use]
    pub const fn get(&self, domain: Domain) -> DomainScore {
        match domain {
            Domain::A => self.a,
            Domain::B => self.b,
            Domain::C => self.c,
        }
    }

    pub fn apply(&mut self, domain: Domain, delta: f64) {
        let slot = match domain {
            Domain::A => &mut self.a,
            Domain::B => &mut self.b,
            Domain::C => &mut self.c,
        };
        slot.apply(delta);
    }

    /// Replace one domain outright (used by submit-once boards).
    pub fn set(&mut self, domain: Domain, value: f64) {
        let slot = match domain {
            Domain::A => &mut self.a,
            Domain::B => &mut self.b,
            Domain::C => &mut self.c,
        };
        *slot = DomainScore::new(value);
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Per-domain weights; a valid table sums to 1.0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DomainWeights {
    pub a: f64,
    pub b: f64,
    pub c: f64,
}

/// Errors raised when a weight table is unusable.
#[derive(Debug, Error, PartialEq)]
pub enum WeightError {
    #[error("weight for domain {domain:?} must be within 0..=1 (got {value:.3})")]
    OutOfRange { domain: Domain, value: f64 },
    #[error("domain weights must sum to 1.0 (got {sum:.6})")]
    SumMismatch { sum: f64 },
}

impl DomainWeights {
    #[must_use]
    pub const fn new(a: f64, b: f64, c: f64) -> Self {
        Self { a, b, c }
    }

    #[must_use]
    pub fn sum(&self) -> f64 {
        self.a + self.b + self.c
    }

    /// Check each weight is a proportion and that the table sums to one.
    ///
    /// # Errors
    ///
    /// Returns [`WeightError`] describing the first violated constraint.
    pub fn validate(&self) -> Result<(), WeightError> {
        for (domain, value) in Domain::ALL.into_iter().zip([self.a, self.b, self.c]) {
            if !(0.0..=1.0).contains(&value) {
                return Err(WeightError::OutOfRange { domain, value });
            }
        }
        let sum = self.sum();
        if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(WeightError::SumMismatch { sum });
        }
        Ok(())
    }
}

/// Raw-score maximum per domain.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DomainCaps {
    pub a: f64,
    pub b: f64,
    pub c: f64,
}

impl DomainCaps {
    #[must_use]
    pub const fn new(a: f64, b: f64, c: f64) -> Self {
        Self { a, b, c }
    }

    #[must_use]
    pub const fn get(&self, domain: Domain) -> f64 {
        match domain {
            Domain::A => self.a,
            Domain::B => self.b,
            Domain::C => self.c,
        }
    }

    /// Normalize all three raw scores against these caps.
    #[must_use]
    pub fn normalize(&self, raw: &DomainScores) -> NormalizedScores {
        NormalizedScores {
            a: normalize(raw.a.value(), self.a),
            b: normalize(raw.b.value(), self.b),
            c: normalize(raw.c.value(), self.c),
        }
    }
}

/// `min(1, raw / cap)`, clamped to the unit interval. A non-positive cap yields 0.
#[must_use]
pub fn normalize(raw: f64, cap: f64) -> f64 {
    if cap <= 0.0 {
        return 0.0;
    }
    clamp_unit(raw / cap)
}

/// Three normalized domain scores, each within `[0, 1]`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct NormalizedScores {
    pub a: f64,
    pub b: f64,
    pub c: f64,
}

impl NormalizedScores {
    #[must_use]
    pub fn new(a: f64, b: f64, c: f64) -> Self {
        Self {
            a: clamp_unit(a),
            b: clamp_unit(b),
            c: clamp_unit(c),
        }
    }

    #[must_use]
    pub fn weighted(&self, weights: &DomainWeights) -> f64 {
        weights.a * clamp_unit(self.a)
            + weights.b * clamp_unit(self.b)
            + weights.c * clamp_unit(self.c)
    }
}

/// Outcome of the risk aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub risk_score: u8,
    pub is_high_risk: bool,
}

/// Whether a risk score crosses the high-risk threshold.
#[must_use]
pub const fn is_high_risk(risk_score: u8) -> bool {
    risk_score >= HIGH_RISK_THRESHOLD
}

/// Fold normalized scores into a risk score: `round((1 - Σ w·norm) * 100)`.
#[must_use]
pub fn aggregate(norms: &NormalizedScores, weights: &DomainWeights) -> RiskAssessment {
    let weighted = norms.weighted(weights);
    let risk_score = round_percent((1.0 - weighted) * 100.0);
    RiskAssessment {
        risk_score,
        is_high_risk: is_high_risk(risk_score),
    }
}

/// Immutable outcome of a finished session.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SessionResult {
    band: AgeBand,
    raw: DomainScores,
    normalized: NormalizedScores,
    risk: RiskAssessment,
}

impl SessionResult {
    /// Normalize raw scores with the band's caps and aggregate with its weights.
    #[must_use]
    pub fn compute(band: AgeBand, raw: DomainScores) -> Self {
        let normalized = band.caps().normalize(&raw);
        let risk = aggregate(&normalized, &band.weights());
        Self {
            band,
            raw,
            normalized,
            risk,
        }
    }

    #[must_use]
    pub const fn band(&self) -> AgeBand {
        self.band
    }

    #[must_use]
    pub const fn raw(&self) -> &DomainScores {
        &self.raw
    }

    #[must_use]
    pub const fn normalized(&self) -> &NormalizedScores {
        &self.normalized
    }

    #[must_use]
    pub const fn risk_score(&self) -> u8 {
        self.risk.risk_score
    }

    #[must_use]
    pub const fn is_high_risk(&self) -> bool {
        self.risk.is_high_risk
    }

    #[must_use]
    pub const fn risk(&self) -> RiskAssessment {
        self.risk
    }
}
