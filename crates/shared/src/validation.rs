//! Common validation utilities.

use validator::ValidationError;

/// Maximum accepted length of a mail subject.
pub const MAX_SUBJECT_LENGTH: usize = 255;

/// Validates that a text field contains something other than whitespace.
pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("blank");
        err.message = Some("Value must not be blank".into());
        Err(err)
    } else {
        Ok(())
    }
}

/// Validates that a subject fits on one header line.
pub fn validate_subject(subject: &str) -> Result<(), ValidationError> {
    validate_not_blank(subject)?;

    if subject.chars().count() > MAX_SUBJECT_LENGTH {
        let mut err = ValidationError::new("subject_length");
        err.message = Some("Subject must be at most 255 characters".into());
        return Err(err);
    }

    if subject.contains(['\r', '\n']) {
        let mut err = ValidationError::new("subject_line_break");
        err.message = Some("Subject must not contain line breaks".into());
        return Err(err);
    }

    Ok(())
}
