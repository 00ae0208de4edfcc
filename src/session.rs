//! In-memory session state for one guided run

use std::fmt;

use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("step {0} is outside 1..={max}", max = Step::LAST.0)]
    StepOutOfRange(u8),
}

/// A step number in `1..=15`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Step(u8);

impl Step {
    pub const FIRST: Step = Step(1);
    pub const LAST: Step = Step(15);

    pub fn new(n: u8) -> Result<Self, SessionError> {
        if (Self::FIRST.0..=Self::LAST.0).contains(&n) {
            Ok(Step(n))
        } else {
            Err(SessionError::StepOutOfRange(n))
        }
    }

    pub fn number(self) -> u8 {
        self.0
    }

    /// The following step, saturating at the last one
    pub fn next(self) -> Step {
        Step((self.0 + 1).min(Self::LAST.0))
    }

    /// Every step in order
    pub fn all() -> impl Iterator<Item = Step> {
        (Self::FIRST.0..=Self::LAST.0).map(Step)
    }

    /// Fraction of the run completed when this step is current
    pub fn progress_ratio(self) -> f64 {
        f64::from(self.0) / f64::from(Self::LAST.0)
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Values learned from earlier steps
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionField {
    Username,
    Password,
    /// Auth key issued at signup, replayed at login
    SecondaryKey,
    /// Service-assigned user id
    PrincipalId,
    /// Id of the pet created in step 6
    ResourceId,
    Role,
}

impl SessionField {
    pub fn name(&self) -> &'static str {
        match self {
            SessionField::Username => "username",
            SessionField::Password => "password",
            SessionField::SecondaryKey => "secondaryKey",
            SessionField::PrincipalId => "principalId",
            SessionField::ResourceId => "resourceId",
            SessionField::Role => "role",
        }
    }
}

impl fmt::Display for SessionField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Session data accumulated across steps.
///
/// Plain holder: no validation, no persistence. Only the step engine writes
/// to it, and only after a completed exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionState {
    step: Step,
    username: Option<String>,
    password: Option<String>,
    secondary_key: Option<String>,
    principal_id: Option<String>,
    resource_id: Option<String>,
    role: Option<String>,
    complete: bool,
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionState {
    pub fn new() -> Self {
        Self {
            step: Step::FIRST,
            username: None,
            password: None,
            secondary_key: None,
            principal_id: None,
            resource_id: None,
            role: None,
            complete: false,
        }
    }

    pub fn current_step(&self) -> Step {
        self.step
    }

    pub fn set_step(&mut self, step: Step) {
        self.step = step;
    }

    pub fn get(&self, field: SessionField) -> Option<&str> {
        self.slot(field).as_deref()
    }

    pub fn set(&mut self, field: SessionField, value: impl Into<String>) {
        *self.slot_mut(field) = Some(value.into());
    }

    pub fn has(&self, field: SessionField) -> bool {
        self.slot(field).is_some()
    }

    /// True once the final step has succeeded
    pub fn is_complete(&self) -> bool {
        self.complete
    }

    pub fn mark_complete(&mut self) {
        self.complete = true;
    }

    fn slot(&self, field: SessionField) -> &Option<String> {
        match field {
            SessionField::Username => &self.username,
            SessionField::Password => &self.password,
            SessionField::SecondaryKey => &self.secondary_key,
            SessionField::PrincipalId => &self.principal_id,
            SessionField::ResourceId => &self.resource_id,
            SessionField::Role => &self.role,
        }
    }

    fn slot_mut(&mut self, field: SessionField) -> &mut Option<String> {
        match field {
            SessionField::Username => &mut self.username,
            SessionField::Password => &mut self.password,
            SessionField::SecondaryKey => &mut self.secondary_key,
            SessionField::PrincipalId => &mut self.principal_id,
            SessionField::ResourceId => &mut self.resource_id,
            SessionField::Role => &mut self.role,
        }
    }
}
