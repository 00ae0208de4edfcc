//! Classification of service responses into step outcomes
//!
//! All matching against the service's free-text messages lives here. The
//! phrases and `ITMC{<step>.` unlock tokens are the service's wording and are
//! matched exactly and case-sensitively. Field-request phrases are checked
//! before unlock tokens.

use crate::api::RemoteResponse;
use crate::presenter::Field;
use crate::session::Step;

use super::StepOutcome;

const AGE_REQUIRED: &str = "Age is required";
const AUTH_KEY_REQUIRED: &str = "authentication key";
const PET_TYPE_REQUIRED: &str = "ownerId, name, type required";
const OWNER_QUERY_REQUIRED: &str = "userId query required";

/// Unlock token prefix emitted when step `n` is completed
pub fn unlock_token(n: u8) -> String {
    format!("ITMC{{{n}.")
}

/// Decide what a response means for `step`
pub fn interpret(step: Step, response: &RemoteResponse) -> StepOutcome {
    let unlocked = |n: u8| response.message_contains(&unlock_token(n));
    let to = |n: u8| StepOutcome::Advance(Step::new(n).unwrap_or(Step::LAST));

    match step.number() {
        1 | 2 => {
            if response.message_contains(AGE_REQUIRED) {
                StepOutcome::NeedsField(Field::Age)
            } else if unlocked(2) {
                to(3)
            } else {
                StepOutcome::Retry
            }
        }
        3 | 4 => {
            if response.message_contains(AUTH_KEY_REQUIRED) {
                StepOutcome::NeedsField(Field::AuthKey)
            } else if unlocked(4) {
                to(5)
            } else {
                StepOutcome::Retry
            }
        }
        6 => {
            if response.message_contains(PET_TYPE_REQUIRED) {
                StepOutcome::NeedsField(Field::PetType)
            } else if unlocked(6) {
                to(7)
            } else {
                StepOutcome::Retry
            }
        }
        // Step 8 is judged on the principal, not a token
        8 => {
            if response.user().is_some() {
                to(9)
            } else {
                StepOutcome::Retry
            }
        }
        n => {
            if unlocked(n) {
                StepOutcome::Advance(step.next())
            } else {
                StepOutcome::Retry
            }
        }
    }
}

/// Whether the service wants the step 8 listing qualified by owner
pub fn requires_owner_query(step: Step, response: &RemoteResponse) -> bool {
    step.number() == 8 && response.message_contains(OWNER_QUERY_REQUIRED)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn step(n: u8) -> Step {
        Step::new(n).unwrap()
    }

    fn msg(text: &str) -> RemoteResponse {
        RemoteResponse::from_message(text)
    }

    #[test]
    fn test_unlock_token_format() {
        assert_eq!(unlock_token(2), "ITMC{2.");
        assert_eq!(unlock_token(11), "ITMC{11.");
    }

    #[test]
    fn test_signup_branches() {
        assert_eq!(
            interpret(step(1), &msg("Age is required")),
            StepOutcome::NeedsField(Field::Age)
        );
        assert_eq!(
            interpret(step(2), &msg("Welcome! ITMC{2.xyz}")),
            StepOutcome::Advance(step(3))
        );
        assert_eq!(
            interpret(step(1), &msg("ITMC{2.xyz}")),
            StepOutcome::Advance(step(3))
        );
        assert_eq!(interpret(step(2), &msg("Username taken")), StepOutcome::Retry);
    }

    #[test]
    fn test_field_request_checked_before_token() {
        assert_eq!(
            interpret(step(1), &msg("ITMC{2.x} but Age is required")),
            StepOutcome::NeedsField(Field::Age)
        );
        assert_eq!(
            interpret(step(6), &msg("ITMC{6.x} ownerId, name, type required")),
            StepOutcome::NeedsField(Field::PetType)
        );
    }

    #[test]
    fn test_login_branches() {
        assert_eq!(
            interpret(step(3), &msg("Please provide your authentication key")),
            StepOutcome::NeedsField(Field::AuthKey)
        );
        assert_eq!(
            interpret(step(4), &msg("ITMC{4.abc}")),
            StepOutcome::Advance(step(5))
        );
        assert_eq!(
            interpret(step(3), &msg("Invalid credentials")),
            StepOutcome::Retry
        );
    }

    #[test]
    fn test_matching_is_case_sensitive() {
        assert_eq!(interpret(step(1), &msg("age is required")), StepOutcome::Retry);
        assert_eq!(interpret(step(5), &msg("itmc{5.abc}")), StepOutcome::Retry);
    }

    #[test]
    fn test_tokens_only_count_for_their_own_step() {
        assert_eq!(interpret(step(5), &msg("ITMC{6.abc}")), StepOutcome::Retry);
        // "ITMC{1" prefixes "ITMC{11." but the trailing dot keeps them apart
        assert_eq!(interpret(step(11), &msg("ITMC{1.abc}")), StepOutcome::Retry);
        assert_eq!(interpret(step(1), &msg("ITMC{12.abc}")), StepOutcome::Retry);
    }

    #[test]
    fn test_simple_token_steps_advance_by_one() {
        for n in [5u8, 7, 9, 10, 11, 12, 13, 14] {
            let token = format!("{}abc}}", unlock_token(n));
            assert_eq!(
                interpret(step(n), &msg(&token)),
                StepOutcome::Advance(step(n + 1)),
                "step {n}"
            );
        }
    }

    #[test]
    fn test_final_step_advances_to_itself() {
        assert_eq!(
            interpret(step(15), &msg("Bye ITMC{15.end}")),
            StepOutcome::Advance(step(15))
        );
    }

    #[test]
    fn test_step_eight_needs_user_object() {
        let with_user = msg("Here you go").with_field("user", json!({"role": "student"}));
        assert_eq!(interpret(step(8), &with_user), StepOutcome::Advance(step(9)));

        let without_user = msg("ITMC{8.abc}");
        assert_eq!(interpret(step(8), &without_user), StepOutcome::Retry);
    }

    #[test]
    fn test_owner_query_only_on_step_eight() {
        let response = msg("userId query required");
        assert!(requires_owner_query(step(8), &response));
        assert!(!requires_owner_query(step(10), &response));
        assert!(!requires_owner_query(step(8), &msg("ok")));
    }

    #[test]
    fn test_missing_message_is_retry() {
        let response = RemoteResponse::default().with_field("count", 3);
        for s in Step::all() {
            assert_eq!(interpret(s, &response), StepOutcome::Retry, "step {s}");
        }
    }
}
