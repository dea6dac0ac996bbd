//! Structured request validation.
//!
//! Identity requests carry a type tag and a mapping of fields. Each known
//! type has a fixed set of required fields; a request is accepted only when
//! every one of them is present and non-empty. Extra fields are ignored.

use serde::Serialize;
use serde_json::{Map, Value, json};

/// Required fields per request type, in reporting order.
pub const REQUIRED_FIELDS: &[(&str, &[&str])] = &[
    ("create_user", &["email", "first_name", "last_name"]),
    ("grant_access", &["user_id", "resource_id"]),
    ("assign_group", &["user_id", "group_id"]),
];

/// Look up the required fields for a request type.
pub fn required_fields(request_type: &str) -> Option<&'static [&'static str]> {
    REQUIRED_FIELDS
        .iter()
        .find(|(name, _)| *name == request_type)
        .map(|(_, fields)| *fields)
}

/// All request types the validator knows about.
pub fn request_types() -> impl Iterator<Item = &'static str> {
    REQUIRED_FIELDS.iter().map(|(name, _)| *name)
}

/// A value counts as missing when it is `null`, a blank string, or an empty
/// array or object.
pub fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        Value::Bool(_) | Value::Number(_) => false,
    }
}

/// A request that passed validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Acceptance {
    pub request_type: String,
}

/// Why a request was rejected.
///
/// The display strings are the messages returned to the model by the
/// `validate_request` tool.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Unknown request_type: {0}")]
    UnknownRequestType(String),

    #[error("Missing fields: {}", fields.join(", "))]
    MissingFields {
        request_type: String,
        fields: Vec<String>,
    },
}

impl ValidationError {
    /// Missing field names, in table order. Empty for unknown types.
    pub fn missing_fields(&self) -> &[String] {
        match self {
            ValidationError::UnknownRequestType(_) => &[],
            ValidationError::MissingFields { fields, .. } => fields,
        }
    }
}

/// Stateless validator over the static required-field table.
#[derive(Debug, Clone, Copy, Default)]
pub struct RequestValidator;

impl RequestValidator {
    pub fn validate(
        &self,
        request_type: &str,
        fields: &Map<String, Value>,
    ) -> Result<Acceptance, ValidationError> {
        validate(request_type, fields)
    }
}

/// Validate a request's fields against the table.
///
/// All missing fields are reported at once, in table order.
pub fn validate(
    request_type: &str,
    fields: &Map<String, Value>,
) -> Result<Acceptance, ValidationError> {
    let required = required_fields(request_type)
        .ok_or_else(|| ValidationError::UnknownRequestType(request_type.to_string()))?;

    let missing: Vec<String> = required
        .iter()
        .filter(|field| fields.get(**field).is_none_or(is_empty_value))
        .map(|field| field.to_string())
        .collect();

    if missing.is_empty() {
        Ok(Acceptance {
            request_type: request_type.to_string(),
        })
    } else {
        tracing::debug!(request_type, missing = ?missing, "Request rejected");
        Err(ValidationError::MissingFields {
            request_type: request_type.to_string(),
            fields: missing,
        })
    }
}

/// Validate arbitrary JSON data. Anything other than an object has no
/// fields, so every required field is reported missing.
pub fn validate_value(request_type: &str, data: &Value) -> Result<Acceptance, ValidationError> {
    static EMPTY: std::sync::LazyLock<Map<String, Value>> = std::sync::LazyLock::new(Map::new);

    match data {
        Value::Object(fields) => validate(request_type, fields),
        _ => validate(request_type, &EMPTY),
    }
}

/// Render a validation outcome as the report returned to the model:
/// `{"valid": true}` or `{"valid": false, "error": "..."}`.
pub fn report(result: &Result<Acceptance, ValidationError>) -> Value {
    match result {
        Ok(_) => json!({ "valid": true }),
        Err(e) => json!({ "valid": false, "error": e.to_string() }),
    }
}
