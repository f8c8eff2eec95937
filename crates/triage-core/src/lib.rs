//! Service request triage core.
//!
//! This crate provides:
//!
//! - **Classification**: keyword rules mapping request text to a priority,
//!   department and category via [`classifier::Classifier`].
//! - **Lifecycle tracking**: the fixed forward-only sequence
//!   `NEW → TRIAGE → ASSIGNED → IN_PROGRESS → RESOLVED → CLOSED` via
//!   [`workflow::WorkflowTracker`].
//! - **Data model**: the [`request::Request`] record and its enumerated
//!   fields.
//!
//! Everything here is synchronous and single-owner.  Callers hand in the
//! request they own; the core never keeps state of its own beyond the
//! immutable rule table.

pub mod classifier;
pub mod error;
pub mod request;
pub mod workflow;

pub use classifier::{Classification, Classifier, Defaults, Rule, RuleTable, builtin_rules};
pub use error::{Result, TriageError};
pub use request::{
    Channel, Department, NewRequest, Priority, Request, RequestParts, RequesterType,
};
pub use workflow::{
    AdvanceOutcome, Clock, LifecycleState, StepClock, SystemClock, WorkflowTracker,
};
