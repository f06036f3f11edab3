//! Band-agnostic wrapper mounting one of the three assessment machines.
use crate::age_band::AgeBand;
use crate::bands::{
    Action, AdultAssessment, Assessment, ChildAssessment, ElderlyAssessment, Response, StageKind,
};
use crate::config::AssessmentConfig;
use crate::feedback::Cue;
use crate::scoring::{DomainScores, SessionResult};
use crate::timers::Millis;

/// A Level-2 assessment for whichever band the profile resolved to.
#[derive(Debug, Clone)]
pub enum Level2Session {
    Child(ChildAssessment),
    Adult(AdultAssessment),
    Elderly(ElderlyAssessment),
}

impl Level2Session {
    #[must_use]
    pub fn new(band: AgeBand, config: AssessmentConfig, seed: u64) -> Self {
        log::debug!("mounting {band} assessment (seed {seed})");
        match band {
            AgeBand::Child => Self::Child(ChildAssessment::new(config, seed)),
            AgeBand::Adult => Self::Adult(AdultAssessment::new(config, seed)),
            AgeBand::Elderly => Self::Elderly(ElderlyAssessment::new(config, seed)),
        }
    }

    /// Mount the band for a profile age.
    #[must_use]
    pub fn for_age(age: u32, config: AssessmentConfig, seed: u64) -> Self {
        Self::new(AgeBand::from_age(age), config, seed)
    }

    #[must_use]
    pub const fn as_child(&self) -> Option<&ChildAssessment> {
        match self {
            Self::Child(session) => Some(session),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_adult(&self) -> Option<&AdultAssessment> {
        match self {
            Self::Adult(session) => Some(session),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_elderly(&self) -> Option<&ElderlyAssessment> {
        match self {
            Self::Elderly(session) => Some(session),
            _ => None,
        }
    }

    fn inner(&self) -> &dyn Assessment {
        match self {
            Self::Child(session) => session,
            Self::Adult(session) => session,
            Self::Elderly(session) => session,
        }
    }

    fn inner_mut(&mut self) -> &mut dyn Assessment {
        match self {
            Self::Child(session) => session,
            Self::Adult(session) => session,
            Self::Elderly(session) => session,
        }
    }
}

impl Assessment for Level2Session {
    fn band(&self) -> AgeBand {
        self.inner().band()
    }

    fn stage_kind(&self) -> StageKind {
        self.inner().stage_kind()
    }

    fn scores(&self) -> &DomainScores {
        self.inner().scores()
    }

    fn result(&self) -> Option<&SessionResult> {
        self.inner().result()
    }

    fn act(&mut self, action: Action, now: Millis) -> Response {
        self.inner_mut().act(action, now)
    }

    fn advance_to(&mut self, now: Millis) {
        self.inner_mut().advance_to(now);
    }

    fn next_deadline(&self) -> Option<Millis> {
        self.inner().next_deadline()
    }

    fn pending_timers(&self) -> usize {
        self.inner().pending_timers()
    }

    fn drain_cues(&mut self) -> Vec<Cue> {
        self.inner_mut().drain_cues()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn age_selects_machine() {
        let config = AssessmentConfig::default_config();
        assert!(Level2Session::for_age(6, config.clone(), 1).as_child().is_some());
        assert!(Level2Session::for_age(35, config.clone(), 1).as_adult().is_some());
        assert!(Level2Session::for_age(72, config, 1).as_elderly().is_some());
    }

    #[test]
    fn delegates_to_mounted_band() {
        let mut session = Level2Session::new(AgeBand::Elderly, AssessmentConfig::default(), 3);
        assert_eq!(session.band(), AgeBand::Elderly);
        assert_eq!(session.stage_kind(), StageKind::Intro);
        assert_eq!(session.act(Action::Begin, 0), Response::Accepted);
        assert_eq!(session.stage_kind(), StageKind::ShoppingStudy);
        assert!(!session.is_complete());
    }
}
