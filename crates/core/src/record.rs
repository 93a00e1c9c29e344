use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::attendance::Attendance;
use crate::error::{DomainError, DomainResult};

/// Message returned to clients when a submission lacks a required field.
pub const REQUIRED_FIELDS_MESSAGE: &str = "Name, Surname, and Email are required.";

/// A boolean-like form flag.
///
/// Front-ends send these either as JSON booleans or as strings (`"yes"`, `"on"`, ...).
/// Anything else (numbers, objects, ...) is kept as [`Flag::Other`]. The value is
/// stored exactly as received so the document round-trips.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Flag {
    Bool(bool),
    Text(String),
    Other(Value),
}

impl Flag {
    /// Whether the flag reads as "on".
    pub fn is_set(&self) -> bool {
        match self {
            Flag::Bool(b) => *b,
            Flag::Text(s) => matches!(
                s.trim().to_ascii_lowercase().as_str(),
                "yes" | "true" | "on" | "1"
            ),
            Flag::Other(Value::Number(n)) => n.as_f64().is_some_and(|n| n != 0.0),
            Flag::Other(Value::Array(_) | Value::Object(_)) => true,
            Flag::Other(_) => false,
        }
    }
}

/// A free-form optional field (`isComing`, `address`, `plusOneName`, `notes`).
///
/// Usually a string, but any JSON value is accepted and stored verbatim.
/// Non-string values never count as an answer or a name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FormValue {
    Text(String),
    Other(Value),
}

impl FormValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FormValue::Text(s) => Some(s.as_str()),
            FormValue::Other(_) => None,
        }
    }
}

impl From<&str> for FormValue {
    fn from(value: &str) -> Self {
        FormValue::Text(value.to_string())
    }
}

impl From<String> for FormValue {
    fn from(value: String) -> Self {
        FormValue::Text(value)
    }
}

/// One guest's response, as persisted.
///
/// Records carry no identifier; they are distinguished only by position in the
/// collection. `name`, `surname` and `email` are always non-empty for records
/// built through [`SubmitRsvp::validate`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RsvpRecord {
    pub name: String,
    pub surname: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_coming: Option<FormValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<FormValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bringing_someone: Option<Flag>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plus_one_name: Option<FormValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub need_car: Option<Flag>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_notes: Option<Flag>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<FormValue>,
}

impl RsvpRecord {
    /// Minimal record with only the required fields set.
    pub fn new(name: impl Into<String>, surname: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            surname: surname.into(),
            email: email.into(),
            is_coming: None,
            address: None,
            bringing_someone: None,
            plus_one_name: None,
            need_car: None,
            has_notes: None,
            notes: None,
        }
    }

    pub fn with_is_coming(mut self, is_coming: impl Into<String>) -> Self {
        self.is_coming = Some(FormValue::Text(is_coming.into()));
        self
    }

    pub fn attendance(&self) -> Attendance {
        Attendance::from_answer(self.is_coming.as_ref().and_then(FormValue::as_text))
    }

    /// "Name Surname", as used in greetings and summaries.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.name, self.surname)
    }
}

/// Raw submission payload (unvalidated).
///
/// Mirrors [`RsvpRecord`] but every field is optional so that missing
/// required fields surface as a validation failure instead of a parse error.
/// Unknown fields are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SubmitRsvp {
    pub name: Option<String>,
    pub surname: Option<String>,
    pub email: Option<String>,
    pub is_coming: Option<FormValue>,
    pub address: Option<FormValue>,
    pub bringing_someone: Option<Flag>,
    pub plus_one_name: Option<FormValue>,
    pub need_car: Option<Flag>,
    pub has_notes: Option<Flag>,
    pub notes: Option<FormValue>,
}

impl SubmitRsvp {
    /// Validation gate: `name`, `surname` and `email` must be present and non-empty.
    pub fn validate(self) -> DomainResult<RsvpRecord> {
        let (Some(name), Some(surname), Some(email)) = (
            non_empty(self.name),
            non_empty(self.surname),
            non_empty(self.email),
        ) else {
            return Err(DomainError::validation(REQUIRED_FIELDS_MESSAGE));
        };

        Ok(RsvpRecord {
            name,
            surname,
            email,
            is_coming: self.is_coming,
            address: self.address,
            bringing_someone: self.bringing_someone,
            plus_one_name: self.plus_one_name,
            need_car: self.need_car,
            has_notes: self.has_notes,
            notes: self.notes,
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}
