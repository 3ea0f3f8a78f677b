//! Signout composer: the create form as an explicit state machine.
//!
//! ```text
//! Editing ──submit(valid)──▶ Submitting ──ok──▶ Created
//!    ▲                          │
//!    └──resume_editing── Failed ◀┘ err
//! ```
//!
//! Validation happens before any request is built, so an incomplete draft never reaches the
//! service. While a create request is outstanding further submits are no-ops, which keeps a
//! double click from creating two signouts. Field values survive a failed attempt.
//!
//! The transitions are split into [`SignoutComposer::begin_submit`] and
//! [`SignoutComposer::complete_submit`] so a caller that shares the composer (the workflow)
//! can release its lock while the request is in flight. If the caller gives up on the request,
//! [`SignoutComposer::cancel_submit`] returns the form to `Failed` with the draft intact.

use tracing::{debug, info, warn};

use crate::error::ClientResult;
use crate::signout::{IllnessSeverity, NewSignout, SignoutCreated, SignoutField, SignoutId};
use signout_types::{optional_text, NonEmptyText};

const INTERRUPTED_MESSAGE: &str =
    "The signout was not confirmed as saved. Check your entries and submit again.";

/// The user-editable fields of a signout, kept together so there is one validity predicate.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SignoutDraft {
    pub illness_severity: IllnessSeverity,
    pub patient_summary: String,
    pub action_list: String,
    pub situational_awareness: String,
    pub contingency_plans: String,
    pub receiver_synthesis: String,
    /// Optional; blank is sent as `null`.
    pub free_text: String,
}

impl SignoutDraft {
    pub fn field(&self, field: SignoutField) -> &str {
        match field {
            SignoutField::PatientSummary => &self.patient_summary,
            SignoutField::ActionList => &self.action_list,
            SignoutField::SituationalAwareness => &self.situational_awareness,
            SignoutField::ContingencyPlans => &self.contingency_plans,
            SignoutField::ReceiverSynthesis => &self.receiver_synthesis,
        }
    }

    pub fn field_mut(&mut self, field: SignoutField) -> &mut String {
        match field {
            SignoutField::PatientSummary => &mut self.patient_summary,
            SignoutField::ActionList => &mut self.action_list,
            SignoutField::SituationalAwareness => &mut self.situational_awareness,
            SignoutField::ContingencyPlans => &mut self.contingency_plans,
            SignoutField::ReceiverSynthesis => &mut self.receiver_synthesis,
        }
    }

    /// Required fields that are blank, in form order.
    ///
    /// The action list counts as blank when it decomposes into zero items.
    pub fn missing_fields(&self) -> Vec<SignoutField> {
        SignoutField::REQUIRED
            .into_iter()
            .filter(|&field| match field {
                SignoutField::ActionList => signout_types::action_items(&self.action_list).is_empty(),
                other => self.field(other).trim().is_empty(),
            })
            .collect()
    }

    /// Validate and shape the draft into a create payload.
    ///
    /// # Errors
    ///
    /// `ComposerError::ValidationFailed` naming every blank required field.
    pub fn to_new_signout(&self, case_id: &str) -> Result<NewSignout, ComposerError> {
        let missing = self.missing_fields();
        if !missing.is_empty() {
            return Err(ComposerError::ValidationFailed { missing });
        }

        let text = |field: SignoutField| {
            NonEmptyText::new(self.field(field))
                .map_err(|_| ComposerError::ValidationFailed {
                    missing: vec![field],
                })
        };

        Ok(NewSignout {
            case_id: case_id.to_string(),
            illness_severity: self.illness_severity,
            patient_summary: text(SignoutField::PatientSummary)?,
            action_list: text(SignoutField::ActionList)?,
            situational_awareness: text(SignoutField::SituationalAwareness)?,
            contingency_plans: text(SignoutField::ContingencyPlans)?,
            receiver_synthesis: text(SignoutField::ReceiverSynthesis)?,
            free_text: optional_text(Some(&self.free_text)),
        })
    }
}

/// Where the composer is in its lifecycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ComposerState {
    Editing,
    Submitting,
    Created { signout_id: SignoutId },
    Failed { message: String },
}

impl ComposerState {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Editing => "editing",
            Self::Submitting => "submitting",
            Self::Created { .. } => "created",
            Self::Failed { .. } => "failed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ComposerError {
    #[error("required fields are empty: {}", join_labels(.missing))]
    ValidationFailed { missing: Vec<SignoutField> },
    #[error("the signout cannot be edited while {state}")]
    NotEditable { state: &'static str },
}

fn join_labels(fields: &[SignoutField]) -> String {
    fields
        .iter()
        .map(|f| f.label())
        .collect::<Vec<_>>()
        .join(", ")
}

/// What a submit attempt did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The service created the signout.
    Created(SignoutId),
    /// Rejected locally; no request was sent.
    Invalid(Vec<SignoutField>),
    /// The request failed; the draft is intact and may be resubmitted.
    Failed(String),
    /// A request is already in flight or the signout already exists; nothing was sent.
    Ignored,
    /// The response arrived after the user left the form and was not applied.
    Discarded,
}

/// The create-signout form for one case.
#[derive(Debug, Clone)]
pub struct SignoutComposer {
    case_id: String,
    draft: SignoutDraft,
    state: ComposerState,
}

impl SignoutComposer {
    pub fn new(case_id: impl Into<String>) -> Self {
        Self {
            case_id: case_id.into(),
            draft: SignoutDraft::default(),
            state: ComposerState::Editing,
        }
    }

    pub fn case_id(&self) -> &str {
        &self.case_id
    }

    pub fn draft(&self) -> &SignoutDraft {
        &self.draft
    }

    pub fn state(&self) -> &ComposerState {
        &self.state
    }

    /// Whether the submit action should be enabled.
    pub fn can_submit(&self) -> bool {
        matches!(self.state, ComposerState::Editing | ComposerState::Failed { .. })
    }

    /// The created signout, once the service has assigned an id.
    pub fn created_signout(&self) -> Option<&SignoutId> {
        match &self.state {
            ComposerState::Created { signout_id } => Some(signout_id),
            _ => None,
        }
    }

    /// Mutable access to the draft.
    ///
    /// Editing after a failure implicitly returns to `Editing`.
    ///
    /// # Errors
    ///
    /// `ComposerError::NotEditable` while submitting or once created.
    pub fn edit(&mut self) -> Result<&mut SignoutDraft, ComposerError> {
        match self.state {
            ComposerState::Editing => {}
            ComposerState::Failed { .. } => self.state = ComposerState::Editing,
            ComposerState::Submitting | ComposerState::Created { .. } => {
                return Err(ComposerError::NotEditable {
                    state: self.state.name(),
                })
            }
        }
        Ok(&mut self.draft)
    }

    /// Leave the `Failed` state, keeping every field value.
    pub fn resume_editing(&mut self) -> Result<(), ComposerError> {
        self.edit().map(|_| ())
    }

    /// First half of a submit.
    ///
    /// Returns `Ok(Some(payload))` and moves to `Submitting` when a request should be sent,
    /// `Ok(None)` when a request is already outstanding or the signout already exists.
    ///
    /// # Errors
    ///
    /// `ComposerError::ValidationFailed` if required fields are blank; the state is
    /// unchanged and nothing should be sent.
    pub fn begin_submit(&mut self) -> Result<Option<NewSignout>, ComposerError> {
        if !self.can_submit() {
            debug!(state = self.state.name(), "submit ignored");
            return Ok(None);
        }

        let payload = self.draft.to_new_signout(&self.case_id)?;
        self.state = ComposerState::Submitting;
        Ok(Some(payload))
    }

    /// Second half of a submit: apply the service's answer.
    ///
    /// Ignored unless a request is outstanding.
    pub fn complete_submit(&mut self, result: ClientResult<SignoutCreated>) -> SubmitOutcome {
        if self.state != ComposerState::Submitting {
            warn!(state = self.state.name(), "create response arrived with no request outstanding");
            return SubmitOutcome::Ignored;
        }

        match result {
            Ok(created) => {
                info!(signout_id = %created.signout_id, case_id = %self.case_id, "composer: signout created");
                self.state = ComposerState::Created {
                    signout_id: created.signout_id.clone(),
                };
                SubmitOutcome::Created(created.signout_id)
            }
            Err(err) => {
                warn!(error = %err, case_id = %self.case_id, "composer: create failed");
                let message = err.user_message();
                self.state = ComposerState::Failed {
                    message: message.clone(),
                };
                SubmitOutcome::Failed(message)
            }
        }
    }

    /// Abandon an outstanding create request whose response will never be applied.
    ///
    /// Moves `Submitting` to `Failed` so the trainee can edit and resubmit; every field is
    /// kept. Returns `false` when no request was outstanding.
    pub fn cancel_submit(&mut self) -> bool {
        if self.state != ComposerState::Submitting {
            return false;
        }
        warn!(case_id = %self.case_id, "composer: create request abandoned");
        self.state = ComposerState::Failed {
            message: INTERRUPTED_MESSAGE.to_string(),
        };
        true
    }
}
