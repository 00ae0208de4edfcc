//! Presenter double that keeps a log of every call

use std::collections::BTreeMap;

use super::{Field, FieldRequest, Presenter, Severity};
use crate::api::PetSummary;
use crate::session::Step;
use crate::steps::catalog::StepInfo;

/// A call made on the presenter
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PresenterEvent {
    FieldRequested(FieldRequest),
    Message(String, Severity),
    List { title: String, count: usize },
    ListCleared,
    AdvancedTo(Step),
    Progress(Step),
    Complete,
}

/// In-memory presenter for tests.
///
/// Inputs behave like a form: `request_field` adds an input holding its
/// prefill, `fill` plays the user typing into it.
#[derive(Debug, Default)]
pub struct RecordingPresenter {
    inputs: BTreeMap<Field, String>,
    pub events: Vec<PresenterEvent>,
}

impl RecordingPresenter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Type a value into an input, creating it if needed
    pub fn fill(&mut self, field: Field, value: &str) -> &mut Self {
        self.inputs.insert(field, value.to_string());
        self
    }

    /// Whether an input for `field` is shown
    pub fn has_input(&self, field: Field) -> bool {
        self.inputs.contains_key(&field)
    }

    /// Number of times an input for `field` was added
    pub fn requests_for(&self, field: Field) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, PresenterEvent::FieldRequested(r) if r.field == field))
            .count()
    }

    /// The most recent message shown
    pub fn last_message(&self) -> Option<(&str, Severity)> {
        self.events.iter().rev().find_map(|e| match e {
            PresenterEvent::Message(text, severity) => Some((text.as_str(), *severity)),
            _ => None,
        })
    }

    pub fn completions(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, PresenterEvent::Complete))
            .count()
    }
}

impl Presenter for RecordingPresenter {
    fn request_field(&mut self, request: FieldRequest) -> bool {
        if self.inputs.contains_key(&request.field) {
            return false;
        }
        self.inputs
            .insert(request.field, request.prefill.clone().unwrap_or_default());
        self.events.push(PresenterEvent::FieldRequested(request));
        true
    }

    fn field_value(&self, field: Field) -> Option<String> {
        self.inputs.get(&field).cloned()
    }

    fn show_message(&mut self, text: &str, severity: Severity) {
        self.events
            .push(PresenterEvent::Message(text.to_string(), severity));
    }

    fn show_list(&mut self, items: &[PetSummary], title: &str) {
        self.events.push(PresenterEvent::List {
            title: title.to_string(),
            count: items.len(),
        });
    }

    fn clear_list(&mut self) {
        self.events.push(PresenterEvent::ListCleared);
    }

    fn advance_to(&mut self, step: Step, _info: &'static StepInfo) {
        self.inputs.clear();
        self.events.push(PresenterEvent::AdvancedTo(step));
    }

    fn update_progress(&mut self, step: Step) {
        self.events.push(PresenterEvent::Progress(step));
    }

    fn complete(&mut self) {
        self.events.push(PresenterEvent::Complete);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_field_is_idempotent() {
        let mut presenter = RecordingPresenter::new();
        assert!(presenter.request_field(Field::Age.request()));
        assert!(!presenter.request_field(Field::Age.request()));
        assert_eq!(presenter.requests_for(Field::Age), 1);
    }

    #[test]
    fn test_prefill_becomes_value_and_fill_overrides() {
        let mut presenter = RecordingPresenter::new();
        presenter.request_field(Field::AuthKey.request().with_prefill(Some("k1".to_string())));
        assert_eq!(presenter.field_value(Field::AuthKey).as_deref(), Some("k1"));

        presenter.fill(Field::AuthKey, "k2");
        assert_eq!(presenter.field_value(Field::AuthKey).as_deref(), Some("k2"));
        assert!(presenter.field_value(Field::Role).is_none());
    }
}
