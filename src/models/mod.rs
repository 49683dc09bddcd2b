pub mod song;
pub mod user;

use thiserror::Error;

/// A field-level rule violation, carried up to the API as a 400.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct ValidationError(pub String);

impl ValidationError {
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }
}

/// Trims a required text field and enforces a length cap.
pub(crate) fn required_text(
    field: &str,
    value: &str,
    max_len: usize,
) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::new(format!(
            "{field} cannot be empty or only whitespace"
        )));
    }
    if trimmed.chars().count() > max_len {
        return Err(ValidationError::new(format!(
            "{field} must be {max_len} characters or less"
        )));
    }
    Ok(trimmed.to_string())
}

/// Trims an optional text field; blank values collapse to `None`.
pub(crate) fn optional_text(
    field: &str,
    value: Option<String>,
    max_len: usize,
) -> Result<Option<String>, ValidationError> {
    match value.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(trimmed) if trimmed.chars().count() > max_len => Err(ValidationError::new(format!(
            "{field} must be {max_len} characters or less"
        ))),
        Some(trimmed) => Ok(Some(trimmed.to_string())),
    }
}
