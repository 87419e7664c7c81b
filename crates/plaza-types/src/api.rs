use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::Post;
use crate::validate::{Fields, ValidationErrors, Violation};

// -- Profile --

/// Partial profile update. Absent fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserProfile {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

impl UpdateUserProfile {
    pub const NAME_MIN_CHARS: usize = 1;
    /// Counted in Unicode scalar values. A JavaScript client counting UTF-16
    /// code units sees names with astral-plane characters (emoji) as longer,
    /// so a 50-emoji name passes here but may be refused client-side.
    pub const NAME_MAX_CHARS: usize = 50;

    pub fn from_fields(fields: &Fields) -> Result<Self, ValidationErrors> {
        let mut errors = ValidationErrors::default();

        let name = optional_string(fields, "name", &mut errors);
        let avatar_url = optional_string(fields, "avatarUrl", &mut errors);
        errors.into_result()?;

        let update = Self { name, avatar_url };
        update.validate()?;
        Ok(update)
    }

    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::default();

        if let Some(name) = &self.name {
            let len = name.chars().count();
            if len < Self::NAME_MIN_CHARS {
                errors.push("name", Violation::TooShort { min: Self::NAME_MIN_CHARS });
            } else if len > Self::NAME_MAX_CHARS {
                errors.push("name", Violation::TooLong { max: Self::NAME_MAX_CHARS });
            }
        }

        if let Some(avatar_url) = &self.avatar_url {
            if url::Url::parse(avatar_url).is_err() {
                errors.push("avatarUrl", Violation::InvalidUrl);
            }
        }

        errors.into_result()
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.avatar_url.is_none()
    }
}

fn optional_string(fields: &Fields, field: &str, errors: &mut ValidationErrors) -> Option<String> {
    match fields.get(field) {
        None => None,
        Some(Value::String(s)) => Some(s.clone()),
        Some(_) => {
            errors.push(field, Violation::InvalidType { expected: "string" });
            None
        }
    }
}

// -- Ingestion --

/// Reply to a comment, like or tip submission. `post` carries the counters
/// as they stand after the event was applied (or found to be a replay).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestResponse {
    pub id: String,
    pub created: bool,
    pub post: Post,
}

// -- Errors --

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<ValidationErrors>,
}
