//! Wire types for the Level-2 results endpoint.
use serde::{Deserialize, Serialize};

use crate::age_band::AgeBand;
use crate::scoring::{HIGH_RISK_THRESHOLD, NormalizedScores, SessionResult};

/// Path of the submission endpoint, relative to the API base URL.
pub const SUBMIT_PATH: &str = "/api/level2/submit";

/// Normalized per-game scores, each in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GameScores {
    pub game1: f64,
    pub game2: f64,
    pub game3: f64,
}

impl From<&NormalizedScores> for GameScores {
    fn from(scores: &NormalizedScores) -> Self {
        Self {
            game1: scores.a,
            game2: scores.b,
            game3: scores.c,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmitRequest {
    pub user_id: String,
    pub age_group: AgeBand,
    pub game_scores: GameScores,
}

impl SubmitRequest {
    #[must_use]
    pub fn from_result(user_id: impl Into<String>, result: &SessionResult) -> Self {
        Self {
            user_id: user_id.into(),
            age_group: result.band(),
            game_scores: GameScores::from(result.normalized()),
        }
    }
}

/// Stored Level-2 record echoed back by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Level2Record {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub age_group: Option<String>,
    #[serde(default)]
    pub domain_scores: serde_json::Value,
    #[serde(default)]
    pub final_risk_score: Option<f64>,
    pub final_risk_percent: f64,
    #[serde(default)]
    pub assessed_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmitResponse {
    pub results: Level2Record,
    #[serde(default)]
    pub level3_unlocked: bool,
}

/// Whether Level 3 opens after a submission.
///
/// The backend's risk percentage is authoritative. The local high-risk flag
/// is kept for display while the round trip is in flight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Level3Decision {
    pub unlocked: bool,
    pub final_risk_percent: f64,
    pub optimistic_high_risk: bool,
    pub record_id: Option<i64>,
}

impl Level3Decision {
    #[must_use]
    pub fn from_response(response: &SubmitResponse, local: &SessionResult) -> Self {
        let final_risk_percent = response.results.final_risk_percent;
        Self {
            unlocked: response.level3_unlocked
                || final_risk_percent >= f64::from(HIGH_RISK_THRESHOLD),
            final_risk_percent,
            optimistic_high_risk: local.is_high_risk(),
            record_id: response.results.id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::{DomainScore, DomainScores};

    fn child_result() -> SessionResult {
        SessionResult::compute(
            AgeBand::Child,
            DomainScores {
                a: DomainScore::new(5.0),
                b: DomainScore::new(0.0),
                c: DomainScore::new(25.0),
            },
        )
    }

    #[test]
    fn request_carries_normalized_scores() {
        let request = SubmitRequest::from_result("user-1", &child_result());
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["user_id"], "user-1");
        assert_eq!(json["age_group"], "child");
        assert_eq!(json["game_scores"]["game1"], 1.0);
        assert_eq!(json["game_scores"]["game2"], 0.0);
        assert_eq!(json["game_scores"]["game3"], 0.5);
    }

    #[test]
    fn backend_percent_overrides_flag() {
        let body = r#"{
            "results": {"id": 12, "final_risk_percent": 61.5, "domain_scores": {"social": 0.2}},
            "level3_unlocked": false
        }"#;
        let response: SubmitResponse = serde_json::from_str(body).unwrap();
        let decision = Level3Decision::from_response(&response, &child_result());
        assert!(decision.unlocked);
        assert!(!decision.optimistic_high_risk);
        assert_eq!(decision.record_id, Some(12));
    }

    #[test]
    fn low_backend_risk_stays_locked() {
        let body = r#"{"results": {"final_risk_percent": 20.0}}"#;
        let response: SubmitResponse = serde_json::from_str(body).unwrap();
        let decision = Level3Decision::from_response(&response, &child_result());
        assert!(!decision.unlocked);
        assert_eq!(decision.record_id, None);
    }
}
