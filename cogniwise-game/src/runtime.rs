//! Wall-clock driver for running a session inside a tokio runtime.
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::Instant;

use crate::bands::{Action, Assessment};
use crate::feedback::Cue;
use crate::scoring::SessionResult;
use crate::timers::Millis;

/// Maps the session's virtual clock onto tokio time, starting at construction.
pub struct RealtimeDriver<A> {
    session: A,
    started: Instant,
    cues: Option<mpsc::UnboundedSender<Cue>>,
}

impl<A: Assessment> RealtimeDriver<A> {
    pub fn new(session: A) -> Self {
        Self {
            session,
            started: Instant::now(),
            cues: None,
        }
    }

    /// Forward feedback cues to `sink` as they are raised.
    #[must_use]
    pub fn with_cue_sink(mut self, sink: mpsc::UnboundedSender<Cue>) -> Self {
        self.cues = Some(sink);
        self
    }

    pub const fn session(&self) -> &A {
        &self.session
    }

    pub fn into_session(self) -> A {
        self.session
    }

    #[must_use]
    pub fn elapsed_ms(&self) -> Millis {
        Millis::try_from(self.started.elapsed().as_millis()).unwrap_or(Millis::MAX)
    }

    fn flush_cues(&mut self) {
        let cues = self.session.drain_cues();
        if let Some(sink) = &self.cues {
            for cue in cues {
                if sink.send(cue).is_err() {
                    log::debug!("cue sink closed, dropping feedback");
                    self.cues = None;
                    break;
                }
            }
        }
    }

    /// Run until the session completes, sleeping until each timer deadline and
    /// applying inputs as they arrive.
    ///
    /// Returns `None` if `inputs` closes first.
    pub async fn run(&mut self, inputs: &mut mpsc::Receiver<Action>) -> Option<SessionResult> {
        loop {
            if let Some(result) = self.session.result() {
                return Some(*result);
            }
            let deadline = self.session.next_deadline();
            let wake = deadline.map_or(self.started, |due| {
                self.started + Duration::from_millis(due)
            });
            tokio::select! {
                action = inputs.recv() => {
                    let Some(action) = action else {
                        log::debug!(
                            "input channel closed during {} stage",
                            self.session.stage_kind()
                        );
                        return None;
                    };
                    let now = self.elapsed_ms();
                    self.session.act(action, now);
                }
                () = tokio::time::sleep_until(wake), if deadline.is_some() => {
                    let now = self.elapsed_ms();
                    self.session.advance_to(now);
                }
            }
            self.flush_cues();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::age_band::AgeBand;
    use crate::bands::StageKind;
    use crate::config::AssessmentConfig;
    use crate::session::Level2Session;
    use tokio::time::sleep;

    fn elderly() -> Level2Session {
        Level2Session::new(AgeBand::Elderly, AssessmentConfig::default_config(), 11)
    }

    #[tokio::test(start_paused = true)]
    async fn elderly_session_completes_through_channel() {
        let (tx, mut rx) = mpsc::channel(8);
        let (cue_tx, mut cue_rx) = mpsc::unbounded_channel();
        let pacer = tokio::spawn(async move {
            for action in [
                Action::Begin,
                Action::Begin,
                Action::Toggle(0),
                Action::Toggle(3),
                Action::Toggle(4),
                Action::Submit,
                Action::Begin,
                Action::Name(1),
            ] {
                tx.send(action).await.unwrap();
                sleep(Duration::from_millis(10)).await;
            }
            // wait out the name lock
            sleep(Duration::from_millis(600)).await;
            for action in [Action::Begin, Action::Name(2)] {
                tx.send(action).await.unwrap();
                sleep(Duration::from_millis(10)).await;
            }
            sleep(Duration::from_millis(600)).await;
            let sort = [
                Action::Toggle(0),
                Action::Toggle(3),
                Action::Toggle(5),
                Action::Submit,
            ];
            for action in sort {
                tx.send(action).await.unwrap();
            }
            tx
        });

        let mut driver = RealtimeDriver::new(elderly()).with_cue_sink(cue_tx);
        let result = driver.run(&mut rx).await.unwrap();
        let _tx = pacer.await.unwrap();

        assert_eq!(result.band(), AgeBand::Elderly);
        assert_eq!(result.risk_score(), 0);
        assert_eq!(driver.session().pending_timers(), 0);
        assert_eq!(cue_rx.recv().await, Some(Cue::NameRecalled));
        assert_eq!(cue_rx.recv().await, Some(Cue::NameRecalled));
    }

    #[tokio::test(start_paused = true)]
    async fn closed_channel_returns_none() {
        let (tx, mut rx) = mpsc::channel(1);
        tx.send(Action::Begin).await.unwrap();
        drop(tx);
        let mut driver = RealtimeDriver::new(elderly());
        assert!(driver.run(&mut rx).await.is_none());
        assert_eq!(driver.session().stage_kind(), StageKind::ShoppingStudy);
    }
}
