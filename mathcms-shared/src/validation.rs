/// Field-level validation errors
///
/// Payload structs derive `validator::Validate`; this module flattens
/// `ValidationErrors` into the `{ field, message }` list the API returns.

use serde::{Deserialize, Serialize};
use validator::{ValidationErrors, ValidationErrorsKind};

/// A single failed field rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    /// Field that failed validation (camelCase, as sent by the client)
    pub field: String,

    /// Error message
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Flattens validator output into a list sorted by field name
///
/// Nested struct errors are reported with dotted paths (`title.en`), list
/// entries with an index (`versions[0].fileUrl`).
pub fn field_errors(errors: &ValidationErrors) -> Vec<FieldError> {
    prefixed_field_errors(errors, "")
}

/// Like [`field_errors`], with every path prefixed by `prefix.`
pub fn prefixed_field_errors(errors: &ValidationErrors, prefix: &str) -> Vec<FieldError> {
    let mut list = Vec::new();
    collect(errors, prefix, &mut list);
    list.sort_by(|a, b| a.field.cmp(&b.field));
    list
}

fn collect(errors: &ValidationErrors, prefix: &str, out: &mut Vec<FieldError>) {
    for (name, kind) in errors.errors() {
        let name: &str = name;
        let path = if prefix.is_empty() {
            to_camel_case(name)
        } else {
            format!("{}.{}", prefix, to_camel_case(name))
        };

        match kind {
            ValidationErrorsKind::Field(errors) => {
                out.extend(errors.iter().map(|error| FieldError {
                    field: path.clone(),
                    message: error
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("{} is invalid", path)),
                }));
            }
            ValidationErrorsKind::Struct(inner) => collect(inner, &path, out),
            ValidationErrorsKind::List(items) => {
                for (index, inner) in items {
                    collect(inner, &format!("{}[{}]", path, index), out);
                }
            }
        }
    }
}

/// Unwraps a field that `#[validate(required)]` already checked
pub fn required<T>(value: Option<T>, field: &str) -> Result<T, Vec<FieldError>> {
    value.ok_or_else(|| vec![FieldError::new(field, format!("{} is required", field))])
}

/// Field error when `value`, once trimmed, is shorter than `min` characters
///
/// Length validators run on the raw payload, so whitespace-only input
/// passes them; entities re-check their required text after trimming.
pub fn require_text(field: &str, value: &str, min: usize, message: &str) -> Option<FieldError> {
    if value.trim().chars().count() < min {
        Some(FieldError::new(field, message))
    } else {
        None
    }
}

/// Collects optional field errors into a validation result
pub fn collect_errors<I>(errors: I) -> Result<(), Vec<FieldError>>
where
    I: IntoIterator<Item = Option<FieldError>>,
{
    let errors: Vec<FieldError> = errors.into_iter().flatten().collect();
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Validator for `#RRGGBB` colour strings
pub fn validate_hex_color(value: &str) -> Result<(), validator::ValidationError> {
    let valid = value.len() == 7
        && value.starts_with('#')
        && value[1..].chars().all(|c| c.is_ascii_hexdigit());

    if valid {
        Ok(())
    } else {
        let mut error = validator::ValidationError::new("hex_color");
        error.message = Some("Color must be a hex value like #3B82F6".into());
        Err(error)
    }
}

/// Validator rejecting lists that contain blank entries
pub fn validate_no_blank_entries(values: &[String]) -> Result<(), validator::ValidationError> {
    if values.iter().any(|v| v.trim().is_empty()) {
        let mut error = validator::ValidationError::new("blank_entry");
        error.message = Some("Entries must not be blank".into());
        return Err(error);
    }
    Ok(())
}

fn to_camel_case(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    let mut upper = false;
    for c in field.chars() {
        if c == '_' {
            upper = true;
        } else if upper {
            out.extend(c.to_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}
