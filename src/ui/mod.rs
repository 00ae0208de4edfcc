//! Terminal wizard: the interactive `Presenter`
//!
//! `Wizard` is a plain model the step engine writes into; `render` draws it
//! and `App` (in `app.rs`) feeds it key events.

pub mod form_field;
pub mod render;
pub mod terminal_guard;

pub use form_field::{FormEntry, FormField, StepForm};
pub use terminal_guard::{install_panic_hook, TerminalGuard};

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::api::PetSummary;
use crate::presenter::{Field, FieldRequest, Presenter, Severity, UserAction};
use crate::session::Step;
use crate::steps::catalog::{self, StepInfo};

/// Pets currently on screen
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Listing {
    pub title: String,
    pub pets: Vec<PetSummary>,
}

pub struct Wizard {
    step: Step,
    info: &'static StepInfo,
    pub form: StepForm,
    message: Option<(String, Severity)>,
    listing: Option<Listing>,
    completed: bool,
    /// Set while a step is in flight; input is ignored
    pub busy: bool,
    base_url: String,
}

impl Wizard {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            step: Step::FIRST,
            info: catalog::info(Step::FIRST),
            form: StepForm::default(),
            message: None,
            listing: None,
            completed: false,
            busy: false,
            base_url: base_url.into(),
        }
    }

    pub fn step(&self) -> Step {
        self.step
    }

    pub fn info(&self) -> &'static StepInfo {
        self.info
    }

    pub fn message(&self) -> Option<(&str, Severity)> {
        self.message.as_ref().map(|(text, s)| (text.as_str(), *s))
    }

    pub fn listing(&self) -> Option<&Listing> {
        self.listing.as_ref()
    }

    pub fn is_completed(&self) -> bool {
        self.completed
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Map a key press to a user action, editing the form on the way
    pub fn handle_key(&mut self, key: KeyEvent) -> Option<UserAction> {
        if key.code == KeyCode::Esc
            || (key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL))
        {
            return Some(UserAction::Quit);
        }
        if self.busy || self.completed {
            return None;
        }

        match key.code {
            KeyCode::Enter => Some(UserAction::Submit),
            KeyCode::Tab | KeyCode::Down => {
                self.form.next_field();
                None
            }
            KeyCode::BackTab | KeyCode::Up => {
                self.form.prev_field();
                None
            }
            code => {
                if let Some(field) = self.form.focused_field_mut() {
                    field.handle_key(code);
                }
                None
            }
        }
    }
}

impl Presenter for Wizard {
    fn request_field(&mut self, request: FieldRequest) -> bool {
        self.form.add(&request)
    }

    fn field_value(&self, field: Field) -> Option<String> {
        self.form.value(field)
    }

    fn show_message(&mut self, text: &str, severity: Severity) {
        self.message = Some((text.to_string(), severity));
    }

    fn show_list(&mut self, items: &[PetSummary], title: &str) {
        self.listing = Some(Listing {
            title: title.to_string(),
            pets: items.to_vec(),
        });
    }

    fn clear_list(&mut self) {
        self.listing = None;
    }

    fn advance_to(&mut self, step: Step, info: &'static StepInfo) {
        self.step = step;
        self.info = info;
        self.form.clear();
    }

    fn update_progress(&mut self, step: Step) {
        self.step = step;
    }

    fn complete(&mut self) {
        self.completed = true;
    }
}
