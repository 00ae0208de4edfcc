//! End-to-end runs of the step engine against a scripted service
//!
//! Every test drives the public library API: a `MockTransport` plays the
//! service and a `RecordingPresenter` plays the user.

use std::sync::Arc;
use std::time::Duration;

use prelim::api::{Method, MockTransport, RemoteResponse};
use prelim::presenter::{Field, Presenter, PresenterEvent, RecordingPresenter, Severity};
use prelim::session::{SessionField, SessionState, Step};
use prelim::steps::{catalog, EngineError, StepEngine, StepOutcome};
use serde_json::json;

// ─── Helpers ─────────────────────────────────────────────────────────────────

fn step(n: u8) -> Step {
    Step::new(n).unwrap()
}

fn engine(mock: &MockTransport) -> StepEngine {
    StepEngine::new(Arc::new(mock.clone())).with_completion_delay(Duration::ZERO)
}

/// Session as it looks once signup and pet creation are done
fn signed_up_session(at: u8) -> SessionState {
    let mut session = SessionState::new();
    session.set(SessionField::Username, "alice");
    session.set(SessionField::Password, "pw");
    session.set(SessionField::PrincipalId, "u1");
    session.set(SessionField::SecondaryKey, "k1");
    session.set(SessionField::ResourceId, "p1");
    session.set_step(step(at));
    session
}

/// Engine at step `at` with its surface rendered and every input filled
fn engine_at(mock: &MockTransport, at: u8) -> (StepEngine, RecordingPresenter) {
    let mut engine = engine(mock).with_session(signed_up_session(at));
    let mut presenter = RecordingPresenter::new();
    engine.start(&mut presenter);
    for field in catalog::info(step(at)).fields() {
        let value = if *field == Field::Role { "vet" } else { "x" };
        presenter.fill(*field, value);
    }
    (engine, presenter)
}

async fn submit(engine: &mut StepEngine, presenter: &mut RecordingPresenter) -> StepOutcome {
    engine
        .run_current(presenter)
        .await
        .expect("step should run")
        .expect("session should not be complete")
}

// ─── Full run ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_full_run_through_all_steps() {
    let mock = MockTransport::new();
    mock.respond_message("Age is required")
        .respond(
            RemoteResponse::from_message("Signed up ITMC{2.a}")
                .with_field("id", "u1")
                .with_field("code", "k1"),
        )
        .respond_message("Please provide your authentication key")
        .respond_message("Welcome back ITMC{4.b}")
        .respond_message("Username updated ITMC{5.c}")
        .respond_message("ownerId, name, type required")
        .respond(RemoteResponse::from_message("Pet added ITMC{6.d}").with_field("petId", "p1"))
        .respond(
            RemoteResponse::from_message("ITMC{7.e}").with_field(
                "pets",
                json!([{"_id": "p1", "name": "Rex", "type": "dog", "owner": "u1"}]),
            ),
        )
        .respond_message("userId query required")
        .respond(
            RemoteResponse::from_message("ITMC{8.f}")
                .with_field("user", json!({"_id": "u1", "role": "student"})),
        )
        .respond_message("Role changed ITMC{9.g}")
        .respond(
            RemoteResponse::from_message("ITMC{10.h}").with_field(
                "pets",
                json!([
                    {"_id": "p1", "name": "Rex", "type": "dog", "owner": {"username": "alice2"}},
                    {"_id": "p2", "name": "Tom", "type": "cat", "owner": {"username": "bob"}}
                ]),
            ),
        )
        .respond_message("ITMC{11.i}")
        .respond_message("Pet deleted ITMC{12.j}")
        .respond_message("ITMC{13.k}")
        .respond_message("ITMC{14.l}")
        .respond_message("Logged out ITMC{15.m}");

    let mut engine = engine(&mock);
    let mut presenter = RecordingPresenter::new();
    engine.start(&mut presenter);

    // 1-2: signup, age requested then supplied
    presenter.fill(Field::Username, "alice").fill(Field::Password, "pw");
    assert_eq!(
        submit(&mut engine, &mut presenter).await,
        StepOutcome::NeedsField(Field::Age)
    );
    presenter.fill(Field::Age, "30");
    assert_eq!(
        submit(&mut engine, &mut presenter).await,
        StepOutcome::Advance(step(3))
    );

    // 3-4: login, auth key requested and prefilled
    assert_eq!(
        submit(&mut engine, &mut presenter).await,
        StepOutcome::NeedsField(Field::AuthKey)
    );
    assert_eq!(presenter.field_value(Field::AuthKey).as_deref(), Some("k1"));
    assert_eq!(
        submit(&mut engine, &mut presenter).await,
        StepOutcome::Advance(step(5))
    );

    // 5: new username
    presenter.fill(Field::NewUsername, "alice2");
    submit(&mut engine, &mut presenter).await;
    assert_eq!(engine.session().get(SessionField::Username), Some("alice2"));

    // 6: pet, type requested then supplied
    presenter.fill(Field::PetName, "Rex");
    assert_eq!(
        submit(&mut engine, &mut presenter).await,
        StepOutcome::NeedsField(Field::PetType)
    );
    presenter.fill(Field::PetType, "dog");
    submit(&mut engine, &mut presenter).await;
    assert_eq!(engine.session().get(SessionField::ResourceId), Some("p1"));

    // 7-8: listings
    submit(&mut engine, &mut presenter).await;
    assert_eq!(
        submit(&mut engine, &mut presenter).await,
        StepOutcome::Advance(step(9))
    );
    assert_eq!(engine.session().get(SessionField::Role), Some("student"));

    // 9: role
    presenter.fill(Field::Role, "vet");
    submit(&mut engine, &mut presenter).await;
    assert_eq!(engine.session().get(SessionField::Role), Some("vet"));

    // 10-15
    for _ in 10..=15 {
        submit(&mut engine, &mut presenter).await;
    }

    assert!(engine.is_complete());
    assert_eq!(engine.current_step(), Step::LAST);
    assert_eq!(presenter.completions(), 1);
    assert_eq!(mock.remaining(), 0);

    let calls: Vec<(Method, String)> = mock
        .requests()
        .into_iter()
        .map(|r| (r.method, r.path))
        .collect();
    let expected = [
        (Method::Post, "/signup"),
        (Method::Post, "/signup"),
        (Method::Post, "/login"),
        (Method::Post, "/login"),
        (Method::Patch, "/users/u1"),
        (Method::Post, "/pets/new"),
        (Method::Post, "/pets/new"),
        (Method::Get, "/users/u1/pets"),
        (Method::Get, "/pets"),
        (Method::Get, "/pets?userId=u1"),
        (Method::Patch, "/users/u1"),
        (Method::Get, "/pets?userId=u1"),
        (Method::Get, "/stats/pets/count"),
        (Method::Delete, "/pets/p1"),
        (Method::Get, "/stats/users/ages"),
        (Method::Get, "/stats/users/count"),
        (Method::Post, "/logout"),
    ];
    let expected: Vec<(Method, String)> = expected
        .iter()
        .map(|(m, p)| (*m, (*p).to_string()))
        .collect();
    assert_eq!(calls, expected);

    let payloads: Vec<_> = mock.requests().into_iter().map(|r| r.payload).collect();
    assert_eq!(
        payloads[3],
        Some(json!({"username": "alice", "password": "pw", "authKey": "k1"}))
    );
    assert_eq!(payloads[4], Some(json!({"username": "alice2"})));
    assert_eq!(payloads[10], Some(json!({"role": "vet"})));

    let lists: Vec<_> = presenter
        .events
        .iter()
        .filter_map(|e| match e {
            PresenterEvent::List { title, count } => Some((title.as_str(), *count)),
            _ => None,
        })
        .collect();
    assert_eq!(lists, [("Your Pets", 1), ("All Pets", 2)]);
    assert!(presenter.events.contains(&PresenterEvent::ListCleared));
}

// ─── Properties ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_unrelated_response_changes_nothing_at_any_step() {
    for n in 1..=15u8 {
        let mock = MockTransport::new();
        mock.respond_message("Something unrelated");
        let (mut engine, mut presenter) = engine_at(&mock, n);
        let before = engine.session().clone();

        let outcome = submit(&mut engine, &mut presenter).await;

        assert_eq!(outcome, StepOutcome::Retry, "step {n}");
        assert_eq!(engine.session(), &before, "step {n}");
        assert_eq!(
            presenter.last_message(),
            Some(("Something unrelated", Severity::Info)),
            "step {n}"
        );
    }
}

#[tokio::test]
async fn test_token_advances_every_simple_step() {
    for n in [5u8, 7, 9, 10, 11, 12, 13, 14] {
        let mock = MockTransport::new();
        mock.respond_message(&format!("ITMC{{{n}.ok}}"));
        let (mut engine, mut presenter) = engine_at(&mock, n);

        let outcome = submit(&mut engine, &mut presenter).await;

        assert_eq!(outcome, StepOutcome::Advance(step(n + 1)), "step {n}");
        assert_eq!(engine.current_step(), step(n + 1));
        assert!(presenter
            .events
            .contains(&PresenterEvent::AdvancedTo(step(n + 1))));
    }
}

#[tokio::test]
async fn test_repeated_field_request_adds_one_input() {
    let mock = MockTransport::new();
    mock.respond_message("Please provide your authentication key")
        .respond_message("Please provide your authentication key");
    let (mut engine, mut presenter) = engine_at(&mock, 3);

    submit(&mut engine, &mut presenter).await;
    submit(&mut engine, &mut presenter).await;

    assert_eq!(presenter.requests_for(Field::AuthKey), 1);
    assert_eq!(engine.current_step(), step(4));
}

#[tokio::test]
async fn test_terminal_state_is_sticky() {
    let mock = MockTransport::new();
    mock.respond_message("ITMC{15.done}");
    let (mut engine, mut presenter) = engine_at(&mock, 15);

    submit(&mut engine, &mut presenter).await;
    let snapshot = engine.session().clone();

    for _ in 0..3 {
        assert_eq!(engine.run_current(&mut presenter).await.unwrap(), None);
    }
    assert_eq!(engine.session(), &snapshot);
    assert_eq!(engine.current_step(), Step::LAST);
    assert_eq!(mock.request_count(), 1);
    assert_eq!(presenter.completions(), 1);
}

#[tokio::test]
async fn test_completion_waits_for_delay() {
    let mock = MockTransport::new();
    mock.respond_message("ITMC{15.done}");
    let mut engine = StepEngine::new(Arc::new(mock.clone()))
        .with_session(signed_up_session(15))
        .with_completion_delay(Duration::from_millis(50));
    let mut presenter = RecordingPresenter::new();

    let started = std::time::Instant::now();
    engine.run_current(&mut presenter).await.unwrap();

    assert!(started.elapsed() >= Duration::from_millis(50));
    assert_eq!(presenter.completions(), 1);
}

// ─── Step 8 ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_owner_query_makes_exactly_one_more_call() {
    let mock = MockTransport::new();
    mock.respond_message("userId query required").respond(
        RemoteResponse::from_message("Here")
            .with_field("user", json!({"_id": "u1", "role": "admin"})),
    );
    let (mut engine, mut presenter) = engine_at(&mock, 8);

    let outcome = submit(&mut engine, &mut presenter).await;

    assert_eq!(outcome, StepOutcome::Advance(step(9)));
    assert_eq!(mock.request_count(), 2);
    assert_eq!(mock.requests()[1].path, "/pets?userId=u1");
    assert!(presenter
        .events
        .contains(&PresenterEvent::Message("Here\nYour role: admin".into(), Severity::Info)));
}

#[tokio::test]
async fn test_owner_query_outcome_comes_from_second_response() {
    let mock = MockTransport::new();
    mock.respond_message("userId query required")
        .fail("connection reset");
    let (mut engine, mut presenter) = engine_at(&mock, 8);
    let before = engine.session().clone();

    let err = engine.run_current(&mut presenter).await.unwrap_err();

    assert!(matches!(err, EngineError::Transport(_)));
    assert_eq!(engine.session(), &before);
    assert_eq!(
        presenter.last_message(),
        Some(("Error: Network error: connection reset", Severity::Error))
    );
}

#[tokio::test]
async fn test_plain_listing_without_user_stays() {
    let mock = MockTransport::new();
    mock.respond(RemoteResponse::from_message("Pets").with_field("pets", json!([])));
    let (mut engine, mut presenter) = engine_at(&mock, 8);

    assert_eq!(submit(&mut engine, &mut presenter).await, StepOutcome::Retry);
    assert_eq!(mock.request_count(), 1);
    assert_eq!(engine.current_step(), step(8));
}

// ─── Scenarios ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_signup_with_age_stores_identity() {
    let mock = MockTransport::new();
    mock.respond_message("Age is required").respond(
        RemoteResponse::from_message("ITMC{2.xyz}")
            .with_field("id", "u1")
            .with_field("code", "k1"),
    );
    let mut engine = engine(&mock);
    let mut presenter = RecordingPresenter::new();
    engine.start(&mut presenter);
    presenter.fill(Field::Username, "alice").fill(Field::Password, "pw");

    submit(&mut engine, &mut presenter).await;
    assert_eq!(engine.current_step(), step(2));
    presenter.fill(Field::Age, "30");
    submit(&mut engine, &mut presenter).await;

    assert_eq!(engine.current_step(), step(3));
    assert_eq!(engine.session().get(SessionField::PrincipalId), Some("u1"));
    assert_eq!(engine.session().get(SessionField::SecondaryKey), Some("k1"));
}

#[tokio::test]
async fn test_network_failure_is_shown_and_recoverable() {
    let mock = MockTransport::new();
    mock.fail("dns error").respond_message("ITMC{13.ok}");
    let (mut engine, mut presenter) = engine_at(&mock, 13);

    assert!(engine.run_current(&mut presenter).await.is_err());
    assert_eq!(engine.current_step(), step(13));

    assert_eq!(
        submit(&mut engine, &mut presenter).await,
        StepOutcome::Advance(step(14))
    );
}

#[tokio::test]
async fn test_message_less_response_is_shown_as_json() {
    let mock = MockTransport::new();
    mock.respond(RemoteResponse::default().with_field("count", 4));
    let (mut engine, mut presenter) = engine_at(&mock, 14);

    assert_eq!(submit(&mut engine, &mut presenter).await, StepOutcome::Retry);
    assert_eq!(
        presenter.last_message(),
        Some((r#"{"count":4}"#, Severity::Info))
    );
}

#[tokio::test]
async fn test_odd_shaped_bodies_stay_on_the_step() {
    let mock = MockTransport::new();
    mock.respond(RemoteResponse::from_value(json!([{"count": 4}])))
        .respond(RemoteResponse::from_value(json!({"message": 11})));
    let (mut engine, mut presenter) = engine_at(&mock, 11);

    assert_eq!(submit(&mut engine, &mut presenter).await, StepOutcome::Retry);
    assert_eq!(
        presenter.last_message(),
        Some((r#"[{"count":4}]"#, Severity::Info))
    );

    assert_eq!(submit(&mut engine, &mut presenter).await, StepOutcome::Retry);
    assert_eq!(
        presenter.last_message(),
        Some((r#"{"message":11}"#, Severity::Info))
    );
    assert_eq!(engine.current_step(), step(11));
}
