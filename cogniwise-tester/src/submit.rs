use anyhow::{Context, Result};
use cogniwise_game::{
    Level2Session, ResultSubmitter, SUBMIT_PATH, SessionHost, SubmitRequest, SubmitResponse,
};
use serde::{Deserialize, Serialize};
use std::time::Duration;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Backend the tester forwards finished sessions to.
#[derive(Debug, Clone)]
pub struct SubmitTarget {
    pub base_url: String,
    pub user_id: String,
}

/// Blocking HTTP client posting results to `<base>/api/level2/submit`.
#[derive(Debug, Clone)]
pub struct HttpSubmitter {
    client: reqwest::blocking::Client,
    endpoint: String,
}

impl HttpSubmitter {
    /// Build a client for `base_url`.
    ///
    /// # Errors
    ///
    /// Returns an error if the TLS backend cannot be initialized.
    pub fn new(base_url: &str) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self {
            client,
            endpoint: endpoint(base_url),
        })
    }
}

impl ResultSubmitter for HttpSubmitter {
    type Error = reqwest::Error;

    fn submit(&mut self, request: &SubmitRequest) -> Result<SubmitResponse, reqwest::Error> {
        log::debug!("POST {} for {}", self.endpoint, request.user_id);
        self.client
            .post(&self.endpoint)
            .json(request)
            .send()?
            .error_for_status()?
            .json::<SubmitResponse>()
    }
}

fn endpoint(base_url: &str) -> String {
    format!("{}{SUBMIT_PATH}", base_url.trim_end_matches('/'))
}

/// Level-3 decision (or failure) recorded for one submitted run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SubmissionOutcome {
    pub attempts: u32,
    pub unlocked: bool,
    pub final_risk_percent: Option<f64>,
    pub record_id: Option<i64>,
    pub error: Option<String>,
}

/// Submit a finished session, retrying once on failure.
pub fn submit_run(target: &SubmitTarget, session: Level2Session) -> SubmissionOutcome {
    let submitter = match HttpSubmitter::new(&target.base_url) {
        Ok(submitter) => submitter,
        Err(err) => {
            return SubmissionOutcome {
                error: Some(format!("{err:#}")),
                ..SubmissionOutcome::default()
            };
        }
    };
    let mut host = SessionHost::from_session(target.user_id.clone(), session, submitter);

    let outcome = host.submit().or_else(|err| {
        log::warn!("retrying submission for {}: {err}", target.user_id);
        host.submit()
    });

    match outcome {
        Ok(decision) => SubmissionOutcome {
            attempts: host.attempts(),
            unlocked: decision.unlocked,
            final_risk_percent: Some(decision.final_risk_percent),
            record_id: decision.record_id,
            error: None,
        },
        Err(err) => SubmissionOutcome {
            attempts: host.attempts(),
            error: Some(error_chain(&err)),
            ..SubmissionOutcome::default()
        },
    }
}

fn error_chain(err: &(dyn std::error::Error + 'static)) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

#[cfg(test)]
mod tests {
    use super::*;
    use cogniwise_game::{Action, AgeBand, Assessment, AssessmentConfig};
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::thread;

    const OK_BODY: &str = r#"{"results":{"id":42,"final_risk_percent":61.5},"level3_unlocked":false}"#;

    /// Serves one canned HTTP response per entry, then stops.
    fn serve(responses: Vec<(u16, &'static str)>) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        thread::spawn(move || {
            for (status, body) in responses {
                let (mut stream, _) = listener.accept().unwrap();
                drain_request(&mut stream);
                let reply = format!(
                    "HTTP/1.1 {status} X\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                    body.len()
                );
                stream.write_all(reply.as_bytes()).unwrap();
            }
        });
        format!("http://{addr}/")
    }

    /// Read headers and the declared body so closing never resets the client.
    fn drain_request(stream: &mut std::net::TcpStream) {
        let mut request = Vec::new();
        let mut buf = [0u8; 1024];
        loop {
            let read = stream.read(&mut buf).unwrap_or(0);
            if read == 0 {
                return;
            }
            request.extend_from_slice(&buf[..read]);
            let text = String::from_utf8_lossy(&request).to_string();
            let Some(header_end) = text.find("\r\n\r\n") else {
                continue;
            };
            let body_len = text[..header_end]
                .lines()
                .find_map(|line| {
                    let (name, value) = line.split_once(':')?;
                    name.eq_ignore_ascii_case("content-length")
                        .then(|| value.trim().parse::<usize>().ok())
                        .flatten()
                })
                .unwrap_or(0);
            if request.len() >= header_end + 4 + body_len {
                return;
            }
        }
    }

    fn finished_elderly() -> Level2Session {
        let mut session =
            Level2Session::new(AgeBand::Elderly, AssessmentConfig::default_config(), 1);
        session.act(Action::Begin, 0);
        session.act(Action::Begin, 0);
        for index in [1, 2, 4] {
            session.act(Action::Toggle(index), 0);
        }
        session.act(Action::Submit, 0);
        let mut now = 0;
        while !session.is_complete() {
            session.act(Action::Begin, now);
            session.act(Action::Name(0), now);
            now += 1_000;
            session.advance_to(now);
            session.act(Action::Submit, now);
        }
        session
    }

    #[test]
    fn endpoint_joins_without_double_slash() {
        assert_eq!(endpoint("http://api.test/"), "http://api.test/api/level2/submit");
        assert_eq!(endpoint("http://api.test"), "http://api.test/api/level2/submit");
    }

    #[test]
    fn retries_once_after_server_error() {
        let base_url = serve(vec![(500, "{}"), (200, OK_BODY)]);
        let target = SubmitTarget {
            base_url,
            user_id: "qa-bot".to_string(),
        };
        let outcome = submit_run(&target, finished_elderly());
        assert_eq!(outcome.error, None);
        assert_eq!(outcome.attempts, 2);
        assert!(outcome.unlocked);
        assert_eq!(outcome.record_id, Some(42));
    }

    #[test]
    fn reports_failure_after_second_attempt() {
        let base_url = serve(vec![(503, "{}"), (503, "{}")]);
        let target = SubmitTarget {
            base_url,
            user_id: "qa-bot".to_string(),
        };
        let outcome = submit_run(&target, finished_elderly());
        assert_eq!(outcome.attempts, 2);
        assert!(outcome.error.is_some());
        assert!(!outcome.unlocked);
    }
}
