//! Field-level validation for form input

pub mod rules;

pub use rules::*;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;
use validator::{Validate, ValidationErrors};

use crate::error::{codes, ApiError, ServiceResult};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    pub is_valid: bool,
    pub errors: HashMap<String, Vec<String>>,
}

impl ValidationResult {
    pub fn success() -> Self {
        Self {
            is_valid: true,
            errors: HashMap::new(),
        }
    }

    /// Converts derive errors, reporting fields under their camelCase wire
    /// names.
    pub fn from_validation_errors(errors: ValidationErrors) -> Self {
        let mut result = Self::success();

        for (field, field_errors) in errors.field_errors() {
            let field = wire_field_name(field);
            for error in field_errors {
                let message = match &error.message {
                    Some(message) => message.to_string(),
                    None => format!("Validation failed for field '{}'", field),
                };
                result.add_error(&field, &message);
            }
        }

        result
    }

    /// Moves the errors recorded under `from` to `to`.
    pub fn rename_field(&mut self, from: &str, to: &str) {
        if let Some(messages) = self.errors.remove(from) {
            self.errors.entry(to.to_string()).or_default().extend(messages);
        }
    }

    pub fn add_error(&mut self, field: &str, message: &str) {
        self.is_valid = false;
        self.errors
            .entry(field.to_string())
            .or_default()
            .push(message.to_string());
    }

    pub fn merge(&mut self, other: ValidationResult) {
        if !other.is_valid {
            self.is_valid = false;
        }

        for (field, errors) in other.errors {
            self.errors.entry(field).or_default().extend(errors);
        }
    }

    pub fn has_error(&self, field: &str) -> bool {
        self.errors.get(field).is_some_and(|errors| !errors.is_empty())
    }

    /// `Ok(())` when valid, otherwise a `VALIDATION_ERROR` carrying the
    /// field errors as details.
    pub fn into_result(self) -> ServiceResult<()> {
        if self.is_valid {
            return Ok(());
        }

        let mut fields: Vec<&String> = self.errors.keys().collect();
        fields.sort();
        let message = format!(
            "Validation failed for: {}",
            fields
                .iter()
                .map(|f| f.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        );

        let details: Map<String, Value> = self
            .errors
            .into_iter()
            .map(|(field, messages)| (field, Value::from(messages)))
            .collect();

        Err(ApiError::new(codes::VALIDATION_ERROR, message).with_details(details))
    }
}

fn wire_field_name(field: &str) -> String {
    let mut name = String::with_capacity(field.len());
    let mut upper_next = false;
    for c in field.chars() {
        if c == '_' {
            upper_next = true;
        } else if upper_next {
            name.extend(c.to_uppercase());
            upper_next = false;
        } else {
            name.push(c);
        }
    }
    name
}

pub trait Validatable {
    fn validate_comprehensive(&self) -> ValidationResult;
}

impl<T> Validatable for T
where
    T: Validate,
{
    fn validate_comprehensive(&self) -> ValidationResult {
        match self.validate() {
            Ok(_) => ValidationResult::success(),
            Err(errors) => ValidationResult::from_validation_errors(errors),
        }
    }
}

/// Full validation of a form, including checks the derive cannot express.
pub trait FormValidation {
    fn validate_form(&self) -> ValidationResult;
}
