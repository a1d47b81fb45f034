use std::borrow::Cow;

use validator::{Validate, ValidationError, ValidationErrors};

pub fn validate<T: Validate>(val: &T) -> Result<(), ValidationErrors> {
    val.validate()
}

/// Rejects values made only of whitespace, which `length(min = 1)` lets through.
pub fn non_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("blank");
        err.message = Some(Cow::from("must not be blank"));
        return Err(err);
    }
    Ok(())
}

pub fn field_error(field: &'static str, code: &'static str, message: &str) -> ValidationErrors {
    let mut err = ValidationError::new(code);
    err.message = Some(Cow::from(message.to_string()));
    let mut errors = ValidationErrors::new();
    errors.add(field, err);
    errors
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_strings_are_rejected() {
        assert!(non_blank("Board review").is_ok());
        assert!(non_blank("   ").is_err());
    }

    #[test]
    fn field_error_names_the_field() {
        let errors = field_error("departments", "required", "select at least one department");
        assert!(errors.field_errors().contains_key("departments"));
    }
}
