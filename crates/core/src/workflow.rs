//! Workflow orchestrator: case view → compose → created signout → scoring.
//!
//! The workflow owns only sequencing state: the current [`Screen`] and a navigation
//! generation counter. Every navigation bumps the generation; every async operation captures
//! it before suspending and drops its result if the generation moved on in the meantime, so
//! a slow response for one view can never land in another.
//!
//! The session lock is never held across an `.await`.

use std::collections::HashSet;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, info, warn};

use crate::case::{CaseSummary, ViewMode};
use crate::client::{HealthStatus, SignoutService};
use crate::composer::{ComposerError, SignoutComposer, SignoutDraft, SubmitOutcome};
use crate::config::RescorePolicy;
use crate::error::ClientResult;
use crate::signout::{SignoutId, SignoutMetadata};
use crate::view::{CasePage, Loadable, ScorePanel, Screen, SignoutPage};

/// Result of a navigation that fetches data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    Loaded,
    NotFound,
    Failed(String),
    /// The user navigated elsewhere before the response arrived.
    Discarded,
}

impl<T> From<&ClientResult<T>> for LoadOutcome {
    fn from(result: &ClientResult<T>) -> Self {
        match result {
            Ok(_) => Self::Loaded,
            Err(err) if err.is_not_found() => Self::NotFound,
            Err(err) => Self::Failed(err.user_message()),
        }
    }
}

/// Result of a scoring request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScoreOutcome {
    /// A fresh score replaced whatever was displayed.
    Applied,
    /// A request for this signout is still outstanding; nothing was sent.
    Busy,
    /// Not on a signout page, or the signout does not exist.
    NoSignout,
    Failed(String),
    /// The user navigated elsewhere before the response arrived.
    Discarded,
}

#[derive(Debug, thiserror::Error)]
pub enum WorkflowError {
    #[error("no case is loaded")]
    NoCaseLoaded,
    #[error("no signout is being composed")]
    NotComposing,
    #[error("the signout has not been created yet")]
    NoCreatedSignout,
    #[error(transparent)]
    Composer(#[from] ComposerError),
}

struct Session {
    generation: u64,
    screen: Screen,
    /// Signouts with a score request outstanding, across navigations.
    scoring_in_flight: HashSet<SignoutId>,
}

impl Session {
    /// Forget an outstanding score request and clear the busy flag if its page is shown.
    fn finish_scoring(&mut self, signout_id: &SignoutId) {
        self.scoring_in_flight.remove(signout_id);
        if let Screen::Signout(page) = &mut self.screen {
            if &page.signout_id == signout_id {
                page.scoring.busy = false;
            }
        }
    }
}

/// Marks a signout as being scored until dropped, including when the request future is
/// dropped before the service answers.
struct ScoringInFlight<'a> {
    session: &'a Mutex<Session>,
    signout_id: SignoutId,
}

impl Drop for ScoringInFlight<'_> {
    fn drop(&mut self) {
        self.session.lock().finish_scoring(&self.signout_id);
    }
}

/// Returns the composer to `Failed` if a submit future is dropped before its response is
/// applied. Does nothing once disarmed or after the user navigated away.
struct SubmitInFlight<'a> {
    session: &'a Mutex<Session>,
    generation: u64,
    armed: bool,
}

impl Drop for SubmitInFlight<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let mut session = self.session.lock();
        if session.generation != self.generation {
            return;
        }
        if let Screen::Compose(composer) = &mut session.screen {
            composer.cancel_submit();
        }
    }
}

/// Sequences the case, composer, signout and scoring operations for one user.
pub struct Workflow<S: ?Sized> {
    service: Arc<S>,
    rescore_policy: RescorePolicy,
    session: Mutex<Session>,
}

impl<S> Workflow<S>
where
    S: SignoutService + ?Sized,
{
    pub fn new(service: Arc<S>, rescore_policy: RescorePolicy) -> Self {
        Self {
            service,
            rescore_policy,
            session: Mutex::new(Session {
                generation: 0,
                screen: Screen::Home,
                scoring_in_flight: HashSet::new(),
            }),
        }
    }

    /// Snapshot of the current screen.
    pub fn screen(&self) -> Screen {
        self.session.lock().screen.clone()
    }

    /// Replace the screen and start a new generation.
    fn navigate(&self, screen: Screen) -> u64 {
        let mut session = self.session.lock();
        session.generation += 1;
        debug!(generation = session.generation, screen = screen.name(), "navigate");
        session.screen = screen;
        session.generation
    }

    /// Run `apply` against the screen if it still belongs to `generation`.
    fn apply_if_current(&self, generation: u64, apply: impl FnOnce(&mut Screen)) -> bool {
        let mut session = self.session.lock();
        if session.generation != generation {
            warn!(
                stale = generation,
                current = session.generation,
                "discarding response for a view that is no longer shown"
            );
            return false;
        }
        apply(&mut session.screen);
        true
    }

    pub async fn health(&self) -> ClientResult<HealthStatus> {
        self.service.health().await
    }

    pub async fn open_case_list(&self) -> LoadOutcome {
        let generation = self.navigate(Screen::Cases(Loadable::Loading));
        let result = self.service.list_cases().await;
        let outcome = LoadOutcome::from(&result);
        let cases: Loadable<Vec<CaseSummary>> = Loadable::from_result(result);

        if self.apply_if_current(generation, |screen| *screen = Screen::Cases(cases)) {
            outcome
        } else {
            LoadOutcome::Discarded
        }
    }

    pub async fn open_case(&self, case_id: &str, mode: ViewMode) -> LoadOutcome {
        let generation = self.navigate(Screen::Case(CasePage {
            case_id: case_id.to_string(),
            mode: mode.clone(),
            detail: Loadable::Loading,
        }));

        let result = self.service.get_case(case_id, &mode).await;
        let outcome = LoadOutcome::from(&result);
        let detail = Loadable::from_result(result);

        let applied = self.apply_if_current(generation, |screen| {
            if let Screen::Case(page) = screen {
                page.detail = detail;
            }
        });
        if applied {
            outcome
        } else {
            LoadOutcome::Discarded
        }
    }

    /// Signouts already written for a case. Does not change the screen.
    pub async fn case_signouts(&self, case_id: &str) -> Loadable<Vec<SignoutMetadata>> {
        Loadable::from_result(self.service.list_signouts(case_id).await)
    }

    /// Open an empty composer for `case_id`.
    pub fn start_signout(&self, case_id: &str) {
        self.navigate(Screen::Compose(SignoutComposer::new(case_id)));
    }

    /// Open an empty composer for the case currently on screen.
    pub fn start_signout_for_current_case(&self) -> Result<(), WorkflowError> {
        let case_id = {
            let session = self.session.lock();
            session
                .screen
                .as_case()
                .and_then(|page| page.detail.ready())
                .map(|detail| detail.case_id.clone())
                .ok_or(WorkflowError::NoCaseLoaded)?
        };
        self.start_signout(&case_id);
        Ok(())
    }

    /// Edit the draft in the open composer.
    pub fn edit_signout(&self, edit: impl FnOnce(&mut SignoutDraft)) -> Result<(), WorkflowError> {
        let mut session = self.session.lock();
        let Screen::Compose(composer) = &mut session.screen else {
            return Err(WorkflowError::NotComposing);
        };
        edit(composer.edit()?);
        Ok(())
    }

    /// Return a failed composer to editing without losing its fields.
    pub fn resume_editing(&self) -> Result<(), WorkflowError> {
        let mut session = self.session.lock();
        let Screen::Compose(composer) = &mut session.screen else {
            return Err(WorkflowError::NotComposing);
        };
        composer.resume_editing()?;
        Ok(())
    }

    /// Submit the open composer.
    ///
    /// Validation failures never reach the service. A submit while one is outstanding is
    /// ignored.
    pub async fn submit_signout(&self) -> SubmitOutcome {
        let (generation, payload) = {
            let mut session = self.session.lock();
            let generation = session.generation;
            let Screen::Compose(composer) = &mut session.screen else {
                return SubmitOutcome::Ignored;
            };
            match composer.begin_submit() {
                Ok(Some(payload)) => (generation, payload),
                Ok(None) | Err(ComposerError::NotEditable { .. }) => return SubmitOutcome::Ignored,
                Err(ComposerError::ValidationFailed { missing }) => {
                    debug!(?missing, "signout rejected before submission");
                    return SubmitOutcome::Invalid(missing);
                }
            }
        };

        let mut in_flight = SubmitInFlight {
            session: &self.session,
            generation,
            armed: true,
        };
        let result = self.service.create_signout(&payload).await;
        in_flight.armed = false;

        let mut outcome = SubmitOutcome::Discarded;
        let applied = self.apply_if_current(generation, |screen| {
            if let Screen::Compose(composer) = screen {
                outcome = composer.complete_submit(result.clone());
            }
        });
        if !applied {
            if let Ok(created) = &result {
                warn!(signout_id = %created.signout_id, "signout created after the composer was closed");
            }
        }
        outcome
    }

    /// Navigate to the signout the open composer just created.
    pub async fn open_created_signout(&self) -> Result<LoadOutcome, WorkflowError> {
        let signout_id = {
            let session = self.session.lock();
            let composer = session
                .screen
                .as_composer()
                .ok_or(WorkflowError::NotComposing)?;
            composer
                .created_signout()
                .cloned()
                .ok_or(WorkflowError::NoCreatedSignout)?
        };
        Ok(self.open_signout(signout_id).await)
    }

    pub async fn open_signout(&self, signout_id: SignoutId) -> LoadOutcome {
        let generation = {
            let mut session = self.session.lock();
            let busy = session.scoring_in_flight.contains(&signout_id);
            session.generation += 1;
            session.screen = Screen::Signout(SignoutPage {
                signout_id: signout_id.clone(),
                signout: Loadable::Loading,
                scoring: ScorePanel {
                    busy,
                    ..ScorePanel::default()
                },
            });
            session.generation
        };

        let result = self.service.get_signout(&signout_id).await;
        let outcome = LoadOutcome::from(&result);
        let signout = Loadable::from_result(result);

        let applied = self.apply_if_current(generation, |screen| {
            if let Screen::Signout(page) = screen {
                page.signout = signout;
            }
        });
        if applied {
            outcome
        } else {
            LoadOutcome::Discarded
        }
    }

    /// Ask the service to score the signout on screen.
    ///
    /// At most one request per signout is outstanding; dropping the returned future releases
    /// it. A successful answer replaces the displayed score entirely; a failure follows the
    /// configured [`RescorePolicy`].
    pub async fn request_score(&self) -> ScoreOutcome {
        let (generation, signout_id) = {
            let mut session = self.session.lock();
            let generation = session.generation;
            let Some(page) = session.screen.as_signout() else {
                return ScoreOutcome::NoSignout;
            };
            if page.signout.is_absent() {
                return ScoreOutcome::NoSignout;
            }
            let signout_id = page.signout_id.clone();
            if !session.scoring_in_flight.insert(signout_id.clone()) {
                debug!(%signout_id, "score request already outstanding");
                return ScoreOutcome::Busy;
            }
            if let Screen::Signout(page) = &mut session.screen {
                page.scoring.busy = true;
            }
            (generation, signout_id)
        };
        let in_flight = ScoringInFlight {
            session: &self.session,
            signout_id: signout_id.clone(),
        };

        let result = self.service.score_signout(&signout_id).await;
        drop(in_flight);

        let mut session = self.session.lock();
        let current = session.generation == generation;
        let Screen::Signout(page) = &mut session.screen else {
            warn!(%signout_id, "discarding score: signout page closed");
            return ScoreOutcome::Discarded;
        };
        if page.signout_id != signout_id {
            warn!(%signout_id, shown = %page.signout_id, "discarding score for another signout");
            return ScoreOutcome::Discarded;
        }
        if !current {
            warn!(%signout_id, "discarding score for a reopened signout page");
            return ScoreOutcome::Discarded;
        }

        match result {
            Ok(score) => {
                info!(%signout_id, rubric_version = %score.rubric_version, "score displayed");
                page.scoring.score = Some(score);
                page.scoring.error = None;
                ScoreOutcome::Applied
            }
            Err(err) => {
                let message = err.user_message();
                warn!(%signout_id, error = %err, "scoring failed");
                if self.rescore_policy == RescorePolicy::ClearScore {
                    page.scoring.score = None;
                }
                page.scoring.error = Some(message.clone());
                ScoreOutcome::Failed(message)
            }
        }
    }
}
