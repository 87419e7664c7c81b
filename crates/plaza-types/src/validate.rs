use std::collections::HashMap;
use std::fmt;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::amount::TokenAmount;
use crate::schema::{ColumnDef, ColumnType, TableSchema};

/// Field map as received from a caller, keyed by wire field name.
pub type Fields = Map<String, Value>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(tag = "code", rename_all = "snake_case")]
pub enum Violation {
    #[error("is required")]
    Required,
    #[error("must not be null")]
    Null,
    #[error("expected {expected}")]
    InvalidType { expected: &'static str },
    #[error("invalid amount: {reason}")]
    InvalidAmount { reason: String },
    #[error("must be at least {min} characters")]
    TooShort { min: usize },
    #[error("must be at most {max} characters")]
    TooLong { max: usize },
    #[error("must be a valid URL")]
    InvalidUrl,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    #[serde(flatten)]
    pub violation: Violation,
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.violation)
    }
}

/// Every field that failed validation, in the order the fields were checked.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(transparent)]
#[error("validation failed: {}", join(.0))]
pub struct ValidationErrors(Vec<FieldError>);

fn join(errors: &[FieldError]) -> String {
    errors.iter().map(FieldError::to_string).collect::<Vec<_>>().join("; ")
}

impl ValidationErrors {
    pub fn push(&mut self, field: impl Into<String>, violation: Violation) {
        self.0.push(FieldError {
            field: field.into(),
            violation,
        });
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn errors(&self) -> &[FieldError] {
        &self.0
    }

    /// The violation recorded for `field`, if any.
    pub fn get(&self, field: &str) -> Option<&Violation> {
        self.0.iter().find(|e| e.field == field).map(|e| &e.violation)
    }

    /// `Ok(())` when nothing was recorded.
    pub fn into_result(self) -> Result<(), Self> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

/// A checked column value.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Integer(i64),
    Amount(TokenAmount),
    Null,
}

/// Values that passed [`check`], keyed by wire field name. Absent optional
/// fields are simply missing.
#[derive(Debug, Default)]
pub struct Record {
    values: HashMap<&'static str, FieldValue>,
}

impl Record {
    #[cfg(test)]
    fn contains(&self, field: &str) -> bool {
        self.values.contains_key(field)
    }

    fn take(&mut self, field: &'static str) -> Option<FieldValue> {
        self.values.remove(field)
    }

    pub fn text(&mut self, field: &'static str) -> Result<String, ValidationErrors> {
        match self.take(field) {
            Some(FieldValue::Text(s)) => Ok(s),
            other => Err(mismatch(field, other, ColumnType::Text)),
        }
    }

    pub fn optional_text(&mut self, field: &'static str) -> Result<Option<String>, ValidationErrors> {
        match self.take(field) {
            None | Some(FieldValue::Null) => Ok(None),
            Some(FieldValue::Text(s)) => Ok(Some(s)),
            other => Err(mismatch(field, other, ColumnType::Text)),
        }
    }

    pub fn integer(&mut self, field: &'static str) -> Result<i64, ValidationErrors> {
        match self.take(field) {
            Some(FieldValue::Integer(n)) => Ok(n),
            other => Err(mismatch(field, other, ColumnType::Integer)),
        }
    }

    pub fn optional_integer(&mut self, field: &'static str) -> Result<Option<i64>, ValidationErrors> {
        match self.take(field) {
            None | Some(FieldValue::Null) => Ok(None),
            Some(FieldValue::Integer(n)) => Ok(Some(n)),
            other => Err(mismatch(field, other, ColumnType::Integer)),
        }
    }

    pub fn amount(&mut self, field: &'static str) -> Result<TokenAmount, ValidationErrors> {
        match self.take(field) {
            Some(FieldValue::Amount(a)) => Ok(a),
            other => Err(mismatch(field, other, ColumnType::Amount)),
        }
    }

    pub fn optional_amount(
        &mut self,
        field: &'static str,
    ) -> Result<Option<TokenAmount>, ValidationErrors> {
        match self.take(field) {
            None | Some(FieldValue::Null) => Ok(None),
            Some(FieldValue::Amount(a)) => Ok(Some(a)),
            other => Err(mismatch(field, other, ColumnType::Amount)),
        }
    }
}

fn mismatch(field: &str, found: Option<FieldValue>, ty: ColumnType) -> ValidationErrors {
    let violation = match found {
        None => Violation::Required,
        Some(FieldValue::Null) => Violation::Null,
        Some(_) => Violation::InvalidType {
            expected: ty.expected(),
        },
    };
    let mut errors = ValidationErrors::default();
    errors.push(field, violation);
    errors
}

/// Check `fields` against the insertable columns of `schema`.
///
/// Server-assigned columns and unknown keys are dropped. Every column is
/// checked before returning, so the error lists all failing fields at once.
pub fn check(schema: &TableSchema, fields: &Fields) -> Result<Record, ValidationErrors> {
    let mut record = Record::default();
    let mut errors = ValidationErrors::default();

    for column in schema.insert_columns() {
        match check_column(column, fields.get(column.field)) {
            Ok(Some(value)) => {
                record.values.insert(column.field, value);
            }
            Ok(None) => {}
            Err(violation) => errors.push(column.field, violation),
        }
    }

    errors.into_result().map(|()| record)
}

fn check_column(column: &ColumnDef, value: Option<&Value>) -> Result<Option<FieldValue>, Violation> {
    let value = match value {
        None if column.required_on_insert() => return Err(Violation::Required),
        None => return Ok(None),
        Some(Value::Null) if column.nullable => return Ok(Some(FieldValue::Null)),
        Some(Value::Null) => return Err(Violation::Null),
        Some(v) => v,
    };

    let invalid = || Violation::InvalidType {
        expected: column.ty.expected(),
    };

    let checked = match column.ty {
        ColumnType::Id | ColumnType::Text => FieldValue::Text(value.as_str().ok_or_else(invalid)?.to_owned()),
        ColumnType::Integer => FieldValue::Integer(value.as_i64().ok_or_else(invalid)?),
        ColumnType::Amount => {
            let s = value.as_str().ok_or_else(invalid)?;
            let amount = s.parse::<TokenAmount>().map_err(|e| Violation::InvalidAmount {
                reason: e.to_string(),
            })?;
            FieldValue::Amount(amount)
        }
        // Timestamps are always server-assigned.
        ColumnType::Timestamp => return Err(invalid()),
    };

    Ok(Some(checked))
}
