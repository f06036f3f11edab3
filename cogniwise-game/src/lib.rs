//! Cogniwise Level-2 Assessment Engine
//!
//! Platform-agnostic core of the Level-2 cognitive screening: three timed
//! mini-games per age band, each driven by a deterministic state machine on a
//! virtual millisecond clock, folded into a single weighted risk score.
//! This crate has no UI or network dependencies; hosts supply input, time and
//! a [`ResultSubmitter`].

pub mod age_band;
pub mod api;
pub mod bands;
pub mod config;
pub mod feedback;
pub mod host;
pub mod numbers;
pub mod result;
pub mod rng;
#[cfg(feature = "async")]
pub mod runtime;
pub mod scoring;
pub mod session;
pub mod timers;
pub mod trials;

// Re-export commonly used types
pub use age_band::{AgeBand, cohort_label};
pub use api::{GameScores, Level2Record, Level3Decision, SUBMIT_PATH, SubmitRequest, SubmitResponse};
pub use bands::{
    Action, AdultAssessment, AdultStage, Assessment, ChildAssessment, ChildStage,
    ElderlyAssessment, ElderlyStage, Response, StageKind,
};
pub use config::{AdultTiming, AssessmentConfig, ChildTiming, ConfigError, ElderlyTiming};
pub use feedback::{Cue, Tone};
pub use host::{ResultSubmitter, SessionHost, SubmitError};
pub use result::{DomainLine, ResultSummary};
pub use rng::RngBundle;
#[cfg(feature = "async")]
pub use runtime::RealtimeDriver;
pub use scoring::{
    Domain, DomainCaps, DomainScore, DomainScores, DomainWeights, HIGH_RISK_THRESHOLD,
    NormalizedScores, RiskAssessment, SessionResult, WeightError, aggregate, normalize,
};
pub use session::Level2Session;
pub use timers::{Millis, TimerId, TimerSet};
pub use trials::Verdict;
