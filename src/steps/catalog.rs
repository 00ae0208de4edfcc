//! Static description of every step: title, endpoint and input surface

use crate::presenter::Field;
use crate::session::Step;

/// Title shown once the run is finished
pub const COMPLETE_TITLE: &str = "Prelims Complete";

/// What the user interacts with at a step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Surface {
    /// Inputs plus a submit button
    Form {
        fields: &'static [Field],
        submit: &'static str,
    },
    /// A single button
    Action { label: &'static str },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepInfo {
    /// Step that introduces this surface (signup and login span two steps)
    pub number: u8,
    pub title: &'static str,
    /// Endpoint hit when the step runs, for display
    pub endpoint: &'static str,
    pub surface: Surface,
}

impl StepInfo {
    /// Heading such as "Step 3: Login"
    pub fn heading(&self) -> String {
        format!("Step {}: {}", self.number, self.title)
    }

    /// Inputs shown when the surface is first rendered
    pub fn fields(&self) -> &'static [Field] {
        match self.surface {
            Surface::Form { fields, .. } => fields,
            Surface::Action { .. } => &[],
        }
    }

    /// Label of the button that runs the step
    pub fn trigger_label(&self) -> &'static str {
        match self.surface {
            Surface::Form { submit, .. } => submit,
            Surface::Action { label } => label,
        }
    }
}

const SIGNUP: StepInfo = StepInfo {
    number: 1,
    title: "Signup",
    endpoint: "POST /signup",
    surface: Surface::Form {
        fields: &[Field::Username, Field::Password],
        submit: "Submit",
    },
};

const LOGIN: StepInfo = StepInfo {
    number: 3,
    title: "Login",
    endpoint: "POST /login",
    surface: Surface::Form {
        fields: &[Field::Username, Field::Password],
        submit: "Login",
    },
};

static CATALOG: [StepInfo; 15] = [
    SIGNUP,
    SIGNUP,
    LOGIN,
    LOGIN,
    StepInfo {
        number: 5,
        title: "Edit Username",
        endpoint: "PATCH /users/{id}",
        surface: Surface::Form {
            fields: &[Field::NewUsername],
            submit: "Update Username",
        },
    },
    StepInfo {
        number: 6,
        title: "Add Pet",
        endpoint: "POST /pets/new",
        surface: Surface::Form {
            fields: &[Field::PetName],
            submit: "Add Pet",
        },
    },
    StepInfo {
        number: 7,
        title: "View My Pets",
        endpoint: "GET /users/{id}/pets",
        surface: Surface::Action {
            label: "View My Pets",
        },
    },
    StepInfo {
        number: 8,
        title: "Fetch All Pets",
        endpoint: "GET /pets",
        surface: Surface::Action {
            label: "Fetch All Pets",
        },
    },
    StepInfo {
        number: 9,
        title: "Change Role",
        endpoint: "PATCH /users/{id}",
        surface: Surface::Form {
            fields: &[Field::Role],
            submit: "Change Role",
        },
    },
    StepInfo {
        number: 10,
        title: "View All Pets",
        endpoint: "GET /pets?userId={id}",
        surface: Surface::Action {
            label: "View All Pets",
        },
    },
    StepInfo {
        number: 11,
        title: "Pet Count Statistics",
        endpoint: "GET /stats/pets/count",
        surface: Surface::Action {
            label: "Pet Count Stats",
        },
    },
    StepInfo {
        number: 12,
        title: "Delete Pet",
        endpoint: "DELETE /pets/{petId}",
        surface: Surface::Action {
            label: "Delete My Pet",
        },
    },
    StepInfo {
        number: 13,
        title: "User Age Statistics",
        endpoint: "GET /stats/users/ages",
        surface: Surface::Action {
            label: "User Age Stats",
        },
    },
    StepInfo {
        number: 14,
        title: "User Count Statistics",
        endpoint: "GET /stats/users/count",
        surface: Surface::Action {
            label: "User Count Stats",
        },
    },
    StepInfo {
        number: 15,
        title: "Logout",
        endpoint: "POST /logout",
        surface: Surface::Action { label: "Logout" },
    },
];

/// Look up the description of a step
pub fn info(step: Step) -> &'static StepInfo {
    &CATALOG[usize::from(step.number() - 1)]
}

/// The step shown after a field-request branch: signup and login move to
/// their second half, other steps stay put
pub fn branch_step(step: Step) -> Step {
    match step.number() {
        1 | 3 => step.next(),
        _ => step,
    }
}
