//! # Signout Core
//!
//! Client-side logic for the signout simulator: trainees read a clinical case, write a
//! structured shift handoff ("signout") for it, and ask the service to score it against a
//! versioned rubric.
//!
//! This crate contains:
//! - the data model for cases, signouts and rubric scores
//! - the HTTP client for the external signout service (`client`)
//! - the signout composer state machine (`composer`)
//! - the workflow orchestrator that sequences views and discards stale responses (`workflow`)
//!
//! **No presentation concerns**: rendering lives in the `signout` binary. Scoring, persistence
//! and case authoring belong to the external service.

pub mod case;
pub mod client;
pub mod composer;
pub mod config;
pub mod constants;
pub mod error;
pub mod score;
pub mod signout;
pub mod validation;
pub mod view;
pub mod workflow;

pub use case::{CaseDetail, CaseSnapshot, CaseSummary, ClinicalValue, HiddenTruth, ViewMode};
pub use client::{ApiClient, HealthStatus, SignoutService};
pub use composer::{ComposerError, ComposerState, SignoutComposer, SignoutDraft, SubmitOutcome};
pub use config::{CallerSide, ClientConfig, RescorePolicy};
pub use error::{ClientError, ClientResult, ConfigError, ConfigResult, Operation, Resource};
pub use score::RubricScore;
pub use signout::{
    IllnessSeverity, NewSignout, Signout, SignoutCreated, SignoutField, SignoutId, SignoutMetadata,
};
pub use view::{CasePage, Loadable, ScorePanel, Screen, SignoutPage};
pub use workflow::{LoadOutcome, ScoreOutcome, Workflow, WorkflowError};

// Re-export the validated text primitives so callers need only one dependency.
pub use signout_types::{NonEmptyText, TextError};
