//! Session host: mounts the band machine and hands the finished result to a
//! platform-provided submitter.
use thiserror::Error;

use crate::age_band::AgeBand;
use crate::api::{Level3Decision, SubmitRequest, SubmitResponse};
use crate::bands::{Action, Assessment, Response};
use crate::config::AssessmentConfig;
use crate::result::ResultSummary;
use crate::session::Level2Session;
use crate::timers::Millis;

/// Delivers a finished session to the results backend.
/// Platform-specific implementations should provide this.
pub trait ResultSubmitter {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Send one submission.
    ///
    /// # Errors
    ///
    /// Returns an error if the request could not be delivered or the backend rejected it.
    fn submit(&mut self, request: &SubmitRequest) -> Result<SubmitResponse, Self::Error>;
}

#[derive(Debug, Error)]
pub enum SubmitError<E>
where
    E: std::error::Error + 'static,
{
    #[error("session has not produced a result yet")]
    Incomplete,
    #[error("failed to save results")]
    Transport(#[source] E),
}

/// Owns one session and the submitter its result is forwarded to.
///
/// The host never retries on its own; a failed submission leaves the result
/// in place so the caller can call [`SessionHost::submit`] again.
pub struct SessionHost<S>
where
    S: ResultSubmitter,
{
    user_id: String,
    session: Level2Session,
    submitter: S,
    decision: Option<Level3Decision>,
    attempts: u32,
}

impl<S> SessionHost<S>
where
    S: ResultSubmitter,
{
    pub fn new(
        user_id: impl Into<String>,
        band: AgeBand,
        config: AssessmentConfig,
        seed: u64,
        submitter: S,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            session: Level2Session::new(band, config, seed),
            submitter,
            decision: None,
            attempts: 0,
        }
    }

    /// Adopt a session that was driven elsewhere, possibly already complete.
    pub fn from_session(user_id: impl Into<String>, session: Level2Session, submitter: S) -> Self {
        Self {
            user_id: user_id.into(),
            session,
            submitter,
            decision: None,
            attempts: 0,
        }
    }

    #[must_use]
    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    #[must_use]
    pub const fn session(&self) -> &Level2Session {
        &self.session
    }

    /// Forward an action to the session. A restart also forgets any prior decision.
    pub fn act(&mut self, action: Action, now: Millis) -> Response {
        if action == Action::Restart {
            self.decision = None;
            self.attempts = 0;
        }
        self.session.act(action, now)
    }

    pub fn advance_to(&mut self, now: Millis) {
        self.session.advance_to(now);
    }

    /// Request for the finished session, if any.
    #[must_use]
    pub fn pending_request(&self) -> Option<SubmitRequest> {
        self.session
            .result()
            .map(|result| SubmitRequest::from_result(self.user_id.clone(), result))
    }

    #[must_use]
    pub fn summary(&self) -> Option<ResultSummary> {
        self.session.result().map(ResultSummary::from_result)
    }

    #[must_use]
    pub const fn decision(&self) -> Option<&Level3Decision> {
        self.decision.as_ref()
    }

    /// Submission attempts made for the current result.
    #[must_use]
    pub const fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Submit the finished result and record the Level-3 decision.
    ///
    /// # Errors
    ///
    /// Returns [`SubmitError::Incomplete`] before the session completes and
    /// [`SubmitError::Transport`] when the submitter fails.
    pub fn submit(&mut self) -> Result<Level3Decision, SubmitError<S::Error>> {
        let Some(result) = self.session.result().copied() else {
            return Err(SubmitError::Incomplete);
        };
        let request = SubmitRequest::from_result(self.user_id.clone(), &result);
        self.attempts = self.attempts.saturating_add(1);
        match self.submitter.submit(&request) {
            Ok(response) => {
                let decision = Level3Decision::from_response(&response, &result);
                log::info!(
                    "level-2 submitted for {} (backend risk {:.1}%, level 3 {})",
                    self.user_id,
                    decision.final_risk_percent,
                    if decision.unlocked { "unlocked" } else { "locked" }
                );
                self.decision = Some(decision.clone());
                Ok(decision)
            }
            Err(err) => {
                log::warn!(
                    "level-2 submission attempt {} for {} failed: {err}",
                    self.attempts,
                    self.user_id
                );
                Err(SubmitError::Transport(err))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::Level2Record;

    #[derive(Debug, Error)]
    #[error("offline")]
    struct Offline;

    /// Fails the first `failures` calls, then answers with `percent`.
    struct FlakySubmitter {
        failures: u32,
        percent: f64,
        seen: Vec<SubmitRequest>,
    }

    impl ResultSubmitter for FlakySubmitter {
        type Error = Offline;

        fn submit(&mut self, request: &SubmitRequest) -> Result<SubmitResponse, Offline> {
            self.seen.push(request.clone());
            if self.failures > 0 {
                self.failures -= 1;
                return Err(Offline);
            }
            Ok(SubmitResponse {
                results: Level2Record {
                    id: Some(1),
                    user_id: Some(request.user_id.clone()),
                    age_group: Some(request.age_group.key().to_string()),
                    domain_scores: serde_json::Value::Null,
                    final_risk_score: None,
                    final_risk_percent: self.percent,
                    assessed_at: None,
                },
                level3_unlocked: false,
            })
        }
    }

    fn finished_elderly_host(submitter: FlakySubmitter) -> SessionHost<FlakySubmitter> {
        let mut host = SessionHost::new(
            "elder-1",
            AgeBand::Elderly,
            AssessmentConfig::default_config(),
            5,
            submitter,
        );
        host.act(Action::Begin, 0);
        host.act(Action::Begin, 0);
        for index in [0, 3, 4] {
            host.act(Action::Toggle(index), 0);
        }
        host.act(Action::Submit, 0);
        for card in 0..2 {
            let at = 1_000 * (card + 1);
            host.act(Action::Begin, at);
            host.act(Action::Name(0), at);
            host.advance_to(at + 500);
        }
        host.act(Action::Submit, 5_000);
        host
    }

    #[test]
    fn submit_before_completion_is_rejected() {
        let mut host = SessionHost::new(
            "u",
            AgeBand::Adult,
            AssessmentConfig::default_config(),
            1,
            FlakySubmitter {
                failures: 0,
                percent: 10.0,
                seen: Vec::new(),
            },
        );
        assert!(matches!(host.submit(), Err(SubmitError::Incomplete)));
        assert!(host.submitter.seen.is_empty());
    }

    #[test]
    fn failed_submission_keeps_result_for_retry() {
        let mut host = finished_elderly_host(FlakySubmitter {
            failures: 1,
            percent: 70.0,
            seen: Vec::new(),
        });
        assert!(host.session().is_complete());
        assert!(matches!(host.submit(), Err(SubmitError::Transport(Offline))));
        assert!(host.session().is_complete());
        assert!(host.decision().is_none());

        let decision = host.submit().unwrap();
        assert!(decision.unlocked);
        assert_eq!(host.attempts(), 2);
        assert_eq!(host.submitter.seen[0], host.submitter.seen[1]);
        assert_eq!(host.submitter.seen[0].user_id, "elder-1");
    }

    #[test]
    fn restart_forgets_decision() {
        let mut host = finished_elderly_host(FlakySubmitter {
            failures: 0,
            percent: 10.0,
            seen: Vec::new(),
        });
        host.submit().unwrap();
        assert!(host.decision().is_some());
        assert!(host.summary().is_some());
        host.act(Action::Restart, 9_000);
        assert!(host.decision().is_none());
        assert!(host.pending_request().is_none());
    }
}
