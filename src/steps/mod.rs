//! Step progression for the guided session
//!
//! - `catalog`: what each step looks like and which endpoint it hits
//! - `interpreter`: pure classification of responses into outcomes
//! - `engine`: the state machine that runs one step per user action

pub mod catalog;
pub mod engine;
pub mod interpreter;

pub use catalog::{StepInfo, Surface};
pub use engine::StepEngine;
pub use interpreter::{interpret, requires_owner_query};

use thiserror::Error;

use crate::api::TransportError;
use crate::presenter::Field;
use crate::session::{SessionField, Step};

/// What a response means for the step that produced it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// The step is done; move to the given step
    Advance(Step),
    /// Stay on the step but ask the user for one more input
    NeedsField(Field),
    /// Nothing recognized; show the message and stay
    Retry,
}

/// Reasons a step could not be run to an outcome.
///
/// None of these are fatal: the step is unchanged and the user can submit
/// again.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A user input is empty; nothing was sent
    #[error("{} is required", .0.label())]
    MissingInput(Field),

    /// A value from an earlier step is missing
    #[error("no {0} in this session yet")]
    MissingField(SessionField),
}
