//! Display state for each screen of the workflow.
//!
//! These are plain data: the workflow writes them, front ends read snapshots of them.

use crate::case::{CaseDetail, CaseSummary, ViewMode};
use crate::composer::SignoutComposer;
use crate::error::ClientResult;
use crate::score::RubricScore;
use crate::signout::{Signout, SignoutId};

/// Something fetched from the service.
///
/// `Absent` (the identifier does not exist) is kept apart from `Failed` (the fetch itself
/// went wrong) so the two render differently.
#[derive(Debug, Clone, PartialEq)]
pub enum Loadable<T> {
    Loading,
    Ready(T),
    Absent,
    Failed(String),
}

impl<T> Loadable<T> {
    pub fn from_result(result: ClientResult<T>) -> Self {
        match result {
            Ok(value) => Self::Ready(value),
            Err(err) if err.is_not_found() => Self::Absent,
            Err(err) => Self::Failed(err.user_message()),
        }
    }

    pub fn ready(&self) -> Option<&T> {
        match self {
            Self::Ready(value) => Some(value),
            _ => None,
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }
}

/// Scoring area of the signout page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScorePanel {
    pub score: Option<RubricScore>,
    /// A score request is outstanding; the trigger should be disabled.
    pub busy: bool,
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CasePage {
    pub case_id: String,
    pub mode: ViewMode,
    pub detail: Loadable<CaseDetail>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SignoutPage {
    pub signout_id: SignoutId,
    pub signout: Loadable<Signout>,
    pub scoring: ScorePanel,
}

/// The screen currently in front of the trainee.
#[derive(Debug, Clone)]
pub enum Screen {
    Home,
    Cases(Loadable<Vec<CaseSummary>>),
    Case(CasePage),
    Compose(SignoutComposer),
    Signout(SignoutPage),
}

impl Screen {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Home => "home",
            Self::Cases(_) => "cases",
            Self::Case(_) => "case",
            Self::Compose(_) => "compose",
            Self::Signout(_) => "signout",
        }
    }

    pub fn as_signout(&self) -> Option<&SignoutPage> {
        match self {
            Self::Signout(page) => Some(page),
            _ => None,
        }
    }

    pub fn as_composer(&self) -> Option<&SignoutComposer> {
        match self {
            Self::Compose(composer) => Some(composer),
            _ => None,
        }
    }

    pub fn as_case(&self) -> Option<&CasePage> {
        match self {
            Self::Case(page) => Some(page),
            _ => None,
        }
    }
}
