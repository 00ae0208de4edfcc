//! The guided-session state machine
//!
//! `StepEngine` owns the session and runs exactly one step per user action:
//! it gathers inputs, issues the step's request(s), classifies the response
//! and applies the outcome. Everything user-facing goes through a
//! `Presenter`.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use serde_json::{json, Map, Value};
use tracing::{debug, info, warn};

use super::catalog;
use super::interpreter::{interpret, requires_owner_query};
use super::{EngineError, StepOutcome};
use crate::api::{Method, RemoteResponse, Request, Transport};
use crate::config::Config;
use crate::presenter::{Field, Presenter, Severity};
use crate::session::{SessionField, SessionState, Step};

/// The result of one step's exchange, before it is judged
struct Exchange {
    /// The response the outcome is derived from
    response: RemoteResponse,
    /// Session values to commit if the step advances
    captures: Vec<(SessionField, String)>,
    /// Message replacing the response's own when the step advances
    advance_note: Option<String>,
}

impl Exchange {
    fn new(response: RemoteResponse) -> Self {
        Self {
            response,
            captures: Vec::new(),
            advance_note: None,
        }
    }

    fn capture(mut self, field: SessionField, value: Option<String>) -> Self {
        if let Some(value) = value {
            self.captures.push((field, value));
        }
        self
    }
}

pub struct StepEngine {
    transport: Arc<dyn Transport>,
    session: SessionState,
    completion_delay: Duration,
    /// Inputs already requested on the current surface
    requested: BTreeSet<Field>,
}

impl StepEngine {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            session: SessionState::new(),
            completion_delay: Duration::from_millis(1000),
            requested: BTreeSet::new(),
        }
    }

    pub fn from_config(transport: Arc<dyn Transport>, config: &Config) -> Self {
        Self::new(transport).with_completion_delay(config.session.completion_delay())
    }

    /// Pause between the final step succeeding and the completion notice
    pub fn with_completion_delay(mut self, delay: Duration) -> Self {
        self.completion_delay = delay;
        self
    }

    /// Resume from an existing session instead of a fresh one
    pub fn with_session(mut self, session: SessionState) -> Self {
        self.session = session;
        self
    }

    pub fn session(&self) -> &SessionState {
        &self.session
    }

    pub fn current_step(&self) -> Step {
        self.session.current_step()
    }

    pub fn is_complete(&self) -> bool {
        self.session.is_complete()
    }

    /// Render the surface for the current step
    pub fn start(&mut self, presenter: &mut dyn Presenter) {
        self.render_surface(presenter);
    }

    /// Run the current step once.
    ///
    /// Returns `Ok(None)` without touching the transport once the session is
    /// complete. Errors have already been shown through the presenter; the
    /// step is unchanged and can be submitted again.
    pub async fn run_current(
        &mut self,
        presenter: &mut dyn Presenter,
    ) -> Result<Option<StepOutcome>, EngineError> {
        if self.session.is_complete() {
            debug!("Session already complete, ignoring action");
            return Ok(None);
        }

        let step = self.session.current_step();
        debug!(step = step.number(), "Running step");

        match self.exchange(step, presenter).await {
            Ok(exchange) => Ok(Some(self.settle(step, exchange, presenter).await)),
            Err(err) => {
                self.report(&err, presenter);
                Err(err)
            }
        }
    }

    async fn exchange(
        &mut self,
        step: Step,
        presenter: &mut dyn Presenter,
    ) -> Result<Exchange, EngineError> {
        match step.number() {
            1 | 2 => self.signup(presenter).await,
            3 | 4 => self.login(presenter).await,
            5 => self.edit_username(presenter).await,
            6 => self.add_pet(presenter).await,
            7 => self.view_my_pets(presenter).await,
            8 => self.fetch_all_pets(step, presenter).await,
            9 => self.change_role(presenter).await,
            10 => self.view_all_pets(presenter).await,
            11 => self.simple(Method::Get, "/stats/pets/count", presenter).await,
            12 => self.delete_pet(presenter).await,
            13 => self.simple(Method::Get, "/stats/users/ages", presenter).await,
            14 => self.simple(Method::Get, "/stats/users/count", presenter).await,
            _ => self.simple(Method::Post, "/logout", presenter).await,
        }
    }

    async fn signup(&mut self, presenter: &mut dyn Presenter) -> Result<Exchange, EngineError> {
        let username = self.required_input(presenter, Field::Username)?;
        let password = self.required_input(presenter, Field::Password)?;
        let age = self.branch_input(presenter, Field::Age)?;

        let mut payload = Map::new();
        payload.insert("username".into(), json!(username));
        payload.insert("password".into(), json!(password));
        if let Some(age) = age {
            payload.insert("age".into(), age_value(&age));
        }

        let request = Request::new(Method::Post, "/signup").with_payload(Value::Object(payload));
        let response = self.send(request, None, presenter).await?;

        let id = response.string_field("id");
        let code = response.string_field("code");
        Ok(Exchange::new(response)
            .capture(SessionField::Username, Some(username))
            .capture(SessionField::Password, Some(password))
            .capture(SessionField::PrincipalId, id)
            .capture(SessionField::SecondaryKey, code))
    }

    async fn login(&mut self, presenter: &mut dyn Presenter) -> Result<Exchange, EngineError> {
        let username = self.required_input(presenter, Field::Username)?;
        let password = self.required_input(presenter, Field::Password)?;
        let auth_key = self.branch_input(presenter, Field::AuthKey)?;

        let mut payload = Map::new();
        payload.insert("username".into(), json!(username));
        payload.insert("password".into(), json!(password));
        if let Some(key) = auth_key {
            payload.insert("authKey".into(), json!(key));
        }

        let request = Request::new(Method::Post, "/login").with_payload(Value::Object(payload));
        let response = self.send(request, None, presenter).await?;
        Ok(Exchange::new(response)
            .capture(SessionField::Username, Some(username))
            .capture(SessionField::Password, Some(password)))
    }

    async fn edit_username(
        &mut self,
        presenter: &mut dyn Presenter,
    ) -> Result<Exchange, EngineError> {
        let id = self.session_value(SessionField::PrincipalId)?;
        let new_username = self.required_input(presenter, Field::NewUsername)?;

        let request = Request::new(Method::Patch, format!("/users/{id}"))
            .with_payload(json!({ "username": new_username }));
        let response = self.send(request, None, presenter).await?;
        Ok(Exchange::new(response).capture(SessionField::Username, Some(new_username)))
    }

    async fn add_pet(&mut self, presenter: &mut dyn Presenter) -> Result<Exchange, EngineError> {
        let name = self.required_input(presenter, Field::PetName)?;
        let kind = self.branch_input(presenter, Field::PetType)?;

        let mut payload = Map::new();
        payload.insert("name".into(), json!(name));
        if let Some(kind) = kind {
            let owner = self.session_value(SessionField::PrincipalId)?;
            payload.insert("type".into(), json!(kind));
            payload.insert("ownerId".into(), json!(owner));
        }

        let request = Request::new(Method::Post, "/pets/new").with_payload(Value::Object(payload));
        let response = self.send(request, None, presenter).await?;
        let pet_id = response.string_field("petId");
        Ok(Exchange::new(response).capture(SessionField::ResourceId, pet_id))
    }

    async fn view_my_pets(
        &mut self,
        presenter: &mut dyn Presenter,
    ) -> Result<Exchange, EngineError> {
        let id = self.session_value(SessionField::PrincipalId)?;
        let request = Request::new(Method::Get, format!("/users/{id}/pets"));
        let response = self.send(request, Some("Pets retrieved"), presenter).await?;
        if let Some(pets) = response.pets() {
            presenter.show_list(&pets, "Your Pets");
        }
        Ok(Exchange::new(response))
    }

    /// List all pets; if the service asks for the owner, ask again with it.
    ///
    /// A qualified listing without a `user` object falls back to looking the
    /// principal up directly.
    async fn fetch_all_pets(
        &mut self,
        step: Step,
        presenter: &mut dyn Presenter,
    ) -> Result<Exchange, EngineError> {
        let first = self
            .send(Request::new(Method::Get, "/pets"), None, presenter)
            .await?;
        if !requires_owner_query(step, &first) {
            return Ok(role_exchange(first));
        }

        let id = self.session_value(SessionField::PrincipalId)?;
        debug!(%id, "Listing requires owner, retrying qualified");
        let qualified = self
            .send(
                Request::new(Method::Get, format!("/pets?userId={id}")),
                None,
                presenter,
            )
            .await?;
        if qualified.user().is_some() {
            return Ok(role_exchange(qualified));
        }

        debug!(%id, "Qualified listing carried no user, looking up principal");
        let lookup = self
            .send(Request::new(Method::Get, format!("/users/{id}")), None, presenter)
            .await?;
        Ok(role_exchange(lookup))
    }

    async fn change_role(&mut self, presenter: &mut dyn Presenter) -> Result<Exchange, EngineError> {
        let id = self.session_value(SessionField::PrincipalId)?;
        let role = self.required_input(presenter, Field::Role)?;

        let request = Request::new(Method::Patch, format!("/users/{id}"))
            .with_payload(json!({ "role": role }));
        let response = self.send(request, None, presenter).await?;
        Ok(Exchange::new(response).capture(SessionField::Role, Some(role)))
    }

    async fn view_all_pets(
        &mut self,
        presenter: &mut dyn Presenter,
    ) -> Result<Exchange, EngineError> {
        let id = self.session_value(SessionField::PrincipalId)?;
        let request = Request::new(Method::Get, format!("/pets?userId={id}"));
        let response = self
            .send(request, Some("All pets retrieved"), presenter)
            .await?;
        if let Some(pets) = response.pets() {
            presenter.show_list(&pets, "All Pets");
        }
        Ok(Exchange::new(response))
    }

    async fn delete_pet(&mut self, presenter: &mut dyn Presenter) -> Result<Exchange, EngineError> {
        let pet_id = self.session_value(SessionField::ResourceId)?;
        let request = Request::new(Method::Delete, format!("/pets/{pet_id}"));
        let response = self.send(request, None, presenter).await?;
        Ok(Exchange::new(response))
    }

    async fn simple(
        &mut self,
        method: Method,
        path: &str,
        presenter: &mut dyn Presenter,
    ) -> Result<Exchange, EngineError> {
        let response = self.send(Request::new(method, path), None, presenter).await?;
        Ok(Exchange::new(response))
    }

    /// Issue a request and show whatever the service said
    async fn send(
        &self,
        request: Request,
        fallback: Option<&str>,
        presenter: &mut dyn Presenter,
    ) -> Result<RemoteResponse, EngineError> {
        let response = self.transport.send(request).await?;
        let text = match (response.message(), fallback) {
            (None, Some(fallback)) => fallback.to_string(),
            _ => response.display_text(),
        };
        presenter.show_message(&text, Severity::classify(&text));
        Ok(response)
    }

    async fn settle(
        &mut self,
        step: Step,
        exchange: Exchange,
        presenter: &mut dyn Presenter,
    ) -> StepOutcome {
        let outcome = interpret(step, &exchange.response);

        match outcome {
            StepOutcome::Advance(next) => {
                for (field, value) in exchange.captures {
                    self.session.set(field, value);
                }
                if let Some(note) = exchange.advance_note {
                    presenter.show_message(&note, Severity::classify(&note));
                }
                if step.number() == 11 {
                    presenter.clear_list();
                }

                if step == Step::LAST {
                    self.finish(presenter).await;
                } else {
                    info!(from = step.number(), to = next.number(), "Step advanced");
                    self.session.set_step(next);
                    self.render_surface(presenter);
                }
            }
            StepOutcome::NeedsField(field) => {
                let target = catalog::branch_step(step);
                if target != step {
                    info!(from = step.number(), to = target.number(), %field, "Step branched");
                    self.session.set_step(target);
                    presenter.update_progress(target);
                } else {
                    debug!(step = step.number(), %field, "Service asked for another field");
                }
                self.ensure_requested(presenter, field);
            }
            StepOutcome::Retry => {
                debug!(step = step.number(), "Response not recognized, staying");
            }
        }

        outcome
    }

    async fn finish(&mut self, presenter: &mut dyn Presenter) {
        self.session.mark_complete();
        presenter.update_progress(Step::LAST);
        if !self.completion_delay.is_zero() {
            tokio::time::sleep(self.completion_delay).await;
        }
        info!("Session complete");
        presenter.complete();
    }

    fn render_surface(&mut self, presenter: &mut dyn Presenter) {
        let step = self.session.current_step();
        let info = catalog::info(step);
        self.requested.clear();
        presenter.advance_to(step, info);
        for field in info.fields() {
            self.ensure_requested(presenter, *field);
        }
    }

    /// Ask the presenter for an input once per surface
    fn ensure_requested(&mut self, presenter: &mut dyn Presenter, field: Field) {
        if self.requested.insert(field) {
            let request = field.request().with_prefill(self.prefill(field));
            presenter.request_field(request);
        }
    }

    fn prefill(&self, field: Field) -> Option<String> {
        let source = match field {
            Field::Username => SessionField::Username,
            Field::Password => SessionField::Password,
            Field::AuthKey => SessionField::SecondaryKey,
            _ => return None,
        };
        self.session.get(source).map(str::to_string)
    }

    /// Form value, falling back to the matching session value
    fn input(&self, presenter: &dyn Presenter, field: Field) -> Option<String> {
        presenter
            .field_value(field)
            .filter(|value| !value.trim().is_empty())
            .or_else(|| self.prefill(field))
    }

    fn required_input(
        &mut self,
        presenter: &mut dyn Presenter,
        field: Field,
    ) -> Result<String, EngineError> {
        if let Some(value) = self.input(presenter, field) {
            return Ok(value);
        }
        self.ensure_requested(presenter, field);
        Err(EngineError::MissingInput(field))
    }

    /// An input that is only sent once the service has asked for it
    fn branch_input(
        &mut self,
        presenter: &mut dyn Presenter,
        field: Field,
    ) -> Result<Option<String>, EngineError> {
        if self.requested.contains(&field) {
            self.required_input(presenter, field).map(Some)
        } else {
            Ok(None)
        }
    }

    fn session_value(&self, field: SessionField) -> Result<String, EngineError> {
        self.session
            .get(field)
            .map(str::to_string)
            .ok_or(EngineError::MissingField(field))
    }

    fn report(&self, err: &EngineError, presenter: &mut dyn Presenter) {
        let step = self.session.current_step().number();
        match err {
            EngineError::Transport(cause) => {
                warn!(step, error = %cause, "Exchange failed");
                presenter.show_message(&format!("Error: {cause}"), Severity::Error);
            }
            EngineError::MissingInput(field) => {
                debug!(step, %field, "Input missing, nothing sent");
                presenter.show_message(&err.to_string(), Severity::Warning);
            }
            EngineError::MissingField(field) => {
                warn!(step, %field, "Session value missing");
                presenter.show_message(&format!("Error: {err}"), Severity::Error);
            }
        }
    }
}

/// Judge step 8 on `response`, noting the role for display
fn role_exchange(response: RemoteResponse) -> Exchange {
    let role = response.user().and_then(|user| user.role);
    let note = role
        .as_ref()
        .map(|role| format!("{}\nYour role: {role}", response.display_text()));
    let mut exchange = Exchange::new(response).capture(SessionField::Role, role);
    exchange.advance_note = note;
    exchange
}

/// Ages are sent as numbers when they parse as one
fn age_value(raw: &str) -> Value {
    raw.trim()
        .parse::<u64>()
        .map_or_else(|_| json!(raw), |age| json!(age))
}
