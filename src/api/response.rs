//! Response bodies returned by the pet service

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A structured response from the remote service.
///
/// Only `message` has a fixed meaning; everything else (`id`, `code`, `petId`,
/// `pets`, `user`, ...) is step-specific payload kept in `fields`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RemoteResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
    /// Body that was valid JSON but not an object
    #[serde(skip)]
    other: Option<Value>,
}

impl RemoteResponse {
    /// Create a response carrying only a message
    pub fn from_message(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            fields: Map::new(),
            other: None,
        }
    }

    /// Interpret any JSON body.
    ///
    /// A `message` that is not a string stays in `fields`, and a body that
    /// is not an object is kept whole. Neither case has a message, so both
    /// are shown as JSON.
    pub fn from_value(body: Value) -> Self {
        match body {
            Value::Object(mut fields) => {
                let message = match fields.remove("message") {
                    Some(Value::String(text)) => Some(text),
                    Some(other) => {
                        fields.insert("message".to_string(), other);
                        None
                    }
                    None => None,
                };
                Self {
                    message,
                    fields,
                    other: None,
                }
            }
            other => Self {
                other: Some(other),
                ..Self::default()
            },
        }
    }

    /// Add a payload field (builder style, mostly for scripted transports)
    pub fn with_field(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.fields.insert(key.to_string(), value.into());
        self
    }

    /// The free-text message, if the service sent one
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// Check whether the message contains `needle` (exact, case-sensitive)
    pub fn message_contains(&self, needle: &str) -> bool {
        self.message().is_some_and(|m| m.contains(needle))
    }

    /// Text to show the user: the message, or the whole body as JSON
    pub fn display_text(&self) -> String {
        match self.message() {
            Some(message) => message.to_string(),
            None => match &self.other {
                Some(body) => body.to_string(),
                None => serde_json::to_string(self).unwrap_or_default(),
            },
        }
    }

    /// Read an identifier-like field, accepting JSON strings and numbers
    pub fn string_field(&self, key: &str) -> Option<String> {
        self.fields.get(key).and_then(scalar_to_string)
    }

    /// Pets listed in the response, if a `pets` array is present
    pub fn pets(&self) -> Option<Vec<PetSummary>> {
        let pets = self.fields.get("pets")?.as_array()?;
        Some(pets.iter().map(PetSummary::from_value).collect())
    }

    /// The `user` object, if present
    pub fn user(&self) -> Option<UserInfo> {
        let user = self.fields.get("user")?.as_object()?;
        Some(UserInfo {
            id: user
                .get("_id")
                .or_else(|| user.get("id"))
                .and_then(scalar_to_string),
            username: user.get("username").and_then(scalar_to_string),
            role: user.get("role").and_then(scalar_to_string),
        })
    }
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// One pet as shown in a listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PetSummary {
    pub id: String,
    pub name: String,
    pub kind: String,
    pub owner: String,
}

impl PetSummary {
    fn from_value(value: &Value) -> Self {
        let text = |key: &str| value.get(key).and_then(scalar_to_string);

        // owner is either a populated user object or a bare reference
        let owner = match value.get("owner") {
            Some(Value::Object(owner)) => owner.get("username").and_then(scalar_to_string),
            Some(other) => scalar_to_string(other),
            None => None,
        };

        Self {
            id: text("_id").or_else(|| text("id")).unwrap_or_default(),
            name: text("name").unwrap_or_default(),
            kind: text("type").unwrap_or_default(),
            owner: owner.unwrap_or_else(|| "Unknown".to_string()),
        }
    }
}

/// The principal as returned under `user`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserInfo {
    pub id: Option<String>,
    pub username: Option<String>,
    pub role: Option<String>,
}
