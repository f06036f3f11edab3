//! Completion screen copy for a finished session.
use serde::{Deserialize, Serialize};

use crate::age_band::AgeBand;
use crate::scoring::SessionResult;

/// One scored domain as shown on the completion screen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomainLine {
    pub label: String,
    pub game: String,
    /// Normalized score as a whole percentage.
    pub percent: u8,
}

/// Everything the completion screen shows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultSummary {
    pub band: AgeBand,
    pub headline: String,
    pub message: String,
    /// Label of the primary button (unlock, see results, finish).
    pub action: String,
    pub risk_score: u8,
    pub is_high_risk: bool,
    pub domains: Vec<DomainLine>,
}

impl ResultSummary {
    #[must_use]
    pub fn from_result(result: &SessionResult) -> Self {
        let band = result.band();
        let high = result.is_high_risk();
        let (headline, message, action) = copy_for(band, high);
        let norms = result.normalized();
        let domains = band
            .domain_labels()
            .into_iter()
            .zip(band.game_titles())
            .zip([norms.a, norms.b, norms.c])
            .map(|((label, game), norm)| DomainLine {
                label: label.to_string(),
                game: game.to_string(),
                percent: crate::numbers::round_percent(norm * 100.0),
            })
            .collect();
        Self {
            band,
            headline: headline.to_string(),
            message: message.to_string(),
            action: action.to_string(),
            risk_score: result.risk_score(),
            is_high_risk: high,
            domains,
        }
    }
}

const fn copy_for(band: AgeBand, high: bool) -> (&'static str, &'static str, &'static str) {
    match (band, high) {
        (AgeBand::Adult, true) => (
            "High Risk Detected",
            "Your reaction time and inhibition control metrics suggest potential executive function challenges. We recommend proceeding to Level 3.",
            "Unlock Level 3",
        ),
        (AgeBand::Adult, false) => (
            "Performance Optimal",
            "Your cognitive processing speed and working memory are functioning well within expected parameters.",
            "Complete",
        ),
        (AgeBand::Child, true) => (
            "Adventure Complete!",
            "We found some tricky parts. Let's look closer.",
            "See Results",
        ),
        (AgeBand::Child, false) => ("Adventure Complete!", "You are a Superstar!", "Finish"),
        (AgeBand::Elderly, true) => (
            "Assessment Complete",
            "Thank you. We have recorded your responses for review.",
            "View Results",
        ),
        (AgeBand::Elderly, false) => (
            "Assessment Complete",
            "Excellent work! Your memory is sharp.",
            "Finish",
        ),
    }
}

impl std::fmt::Display for ResultSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "{} (risk {}%)", self.headline, self.risk_score)?;
        writeln!(f, "{}", self.message)?;
        for line in &self.domains {
            writeln!(f, "  {:<20} {:>3}%  {}", line.label, line.percent, line.game)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::{DomainScore, DomainScores};

    #[test]
    fn adult_high_risk_copy() {
        let result = SessionResult::compute(AgeBand::Adult, DomainScores::default());
        let summary = ResultSummary::from_result(&result);
        assert_eq!(summary.headline, "High Risk Detected");
        assert_eq!(summary.action, "Unlock Level 3");
        assert_eq!(summary.risk_score, 100);
        assert!(summary.domains.iter().all(|line| line.percent == 0));
    }

    #[test]
    fn child_low_risk_copy_lists_games() {
        let result = SessionResult::compute(
            AgeBand::Child,
            DomainScores {
                a: DomainScore::new(5.0),
                b: DomainScore::new(10.0),
                c: DomainScore::new(50.0),
            },
        );
        let summary = ResultSummary::from_result(&result);
        assert_eq!(summary.message, "You are a Superstar!");
        assert_eq!(summary.domains[0].game, "Find the Baby");
        assert_eq!(summary.domains[2].percent, 100);
        assert!(summary.to_string().starts_with("Adventure Complete! (risk 0%)"));
    }
}
