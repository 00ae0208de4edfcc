//! The presentation seam between the step engine and whatever renders it
//!
//! The engine only ever talks to a `Presenter`: it asks for inputs, reads
//! their values, and tells it what to show. The terminal wizard in `ui` is
//! one implementation; `RecordingPresenter` is the test double.

pub mod recording;

pub use recording::{PresenterEvent, RecordingPresenter};

use std::fmt;

use crate::api::PetSummary;
use crate::session::Step;
use crate::steps::catalog::StepInfo;

/// Inputs the user may be asked for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Field {
    Username,
    Password,
    Age,
    AuthKey,
    NewUsername,
    PetName,
    PetType,
    Role,
}

/// Roles offered at the change-role step
pub const ROLE_OPTIONS: &[&str] = &["admin", "vet", "student"];

impl Field {
    /// Wire name of the field
    pub fn name(&self) -> &'static str {
        match self {
            Field::Username => "username",
            Field::Password => "password",
            Field::Age => "age",
            Field::AuthKey => "authKey",
            Field::NewUsername => "newUsername",
            Field::PetName => "name",
            Field::PetType => "type",
            Field::Role => "role",
        }
    }

    /// Label shown next to the input
    pub fn label(&self) -> &'static str {
        match self {
            Field::Username => "Username",
            Field::Password => "Password",
            Field::Age => "Age",
            Field::AuthKey => "Auth Key",
            Field::NewUsername => "New Username",
            Field::PetName => "Pet Name",
            Field::PetType => "Pet Type",
            Field::Role => "Role",
        }
    }

    pub fn kind(&self) -> FieldKind {
        match self {
            Field::Password => FieldKind::Password,
            Field::Age => FieldKind::Number,
            Field::Role => FieldKind::Select(ROLE_OPTIONS),
            _ => FieldKind::Text,
        }
    }

    /// Build a request for this field with its default label and kind
    pub fn request(self) -> FieldRequest {
        FieldRequest {
            field: self,
            label: self.label(),
            kind: self.kind(),
            prefill: None,
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    /// Masked text
    Password,
    Number,
    /// One of a fixed set of options
    Select(&'static [&'static str]),
}

/// A request to show an input
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldRequest {
    pub field: Field,
    pub label: &'static str,
    pub kind: FieldKind,
    /// Initial value of the input
    pub prefill: Option<String>,
}

impl FieldRequest {
    pub fn with_prefill(mut self, prefill: Option<String>) -> Self {
        self.prefill = prefill;
        self
    }
}

/// How a message should be styled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Severity {
    #[default]
    Info,
    Success,
    Warning,
    Error,
}

impl Severity {
    /// Classify a message by its wording.
    ///
    /// Later rules win: a message with both an unlock token and the word
    /// "required" is a warning.
    pub fn classify(text: &str) -> Severity {
        let mut severity = Severity::Info;
        if text.contains("ITMC{") {
            severity = Severity::Success;
        }
        if text.contains("error") || text.contains("Error") {
            severity = Severity::Error;
        }
        if text.contains("Uh oh") || text.contains("required") {
            severity = Severity::Warning;
        }
        severity
    }
}

/// What the user asked for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserAction {
    /// Run the current step
    Submit,
    Quit,
}

/// Everything the step engine needs from a user-facing surface.
pub trait Presenter {
    /// Show an input for `request.field` unless one is already present.
    /// Returns true if a new input was added.
    fn request_field(&mut self, request: FieldRequest) -> bool;

    /// Current content of an input, if it is shown
    fn field_value(&self, field: Field) -> Option<String>;

    fn show_message(&mut self, text: &str, severity: Severity);

    fn show_list(&mut self, items: &[PetSummary], title: &str);

    fn clear_list(&mut self);

    /// Replace the input surface with the one for `step`
    fn advance_to(&mut self, step: Step, info: &'static StepInfo);

    /// Update the progress display without touching the inputs
    fn update_progress(&mut self, step: Step);

    /// One-shot notification that the whole run is done
    fn complete(&mut self);
}
