use crate::error::{SdsError, SdsResult};
use sdsheet_models::is_cas_format;
use validator::{Validate, ValidationErrors, ValidationErrorsKind};

pub fn validate_model<T: Validate>(model: &T) -> SdsResult<()> {
    match model.validate() {
        Ok(()) => Ok(()),
        Err(errors) => {
            let error_messages = format_validation_errors(&errors);
            Err(SdsError::validation("config", error_messages))
        }
    }
}

pub fn format_validation_errors(errors: &ValidationErrors) -> String {
    let mut messages = Vec::new();
    collect_messages("", errors, &mut messages);
    messages.join(", ")
}

fn collect_messages(prefix: &str, errors: &ValidationErrors, messages: &mut Vec<String>) {
    for (field, kind) in errors.errors() {
        let path = if prefix.is_empty() {
            field.to_string()
        } else {
            format!("{}.{}", prefix, field)
        };

        match kind {
            ValidationErrorsKind::Field(field_errors) => {
                for error in field_errors {
                    let message = match &error.message {
                        Some(message) => format!("{}: {}", path, message),
                        None => format!("Validation failed for field '{}': {}", path, error.code),
                    };
                    messages.push(message);
                }
            }
            ValidationErrorsKind::Struct(nested) => collect_messages(&path, nested, messages),
            ValidationErrorsKind::List(items) => {
                for (index, nested) in items {
                    collect_messages(&format!("{}[{}]", path, index), nested, messages);
                }
            }
        }
    }
}

/// Checks a CAS registry number's format and check digit
pub fn validate_cas_number(cas_number: &str) -> SdsResult<()> {
    if !is_cas_format(cas_number) {
        return Err(SdsError::validation(
            "cas_number",
            "Invalid CAS number format. Expected format: XXXXXX-XX-X",
        ));
    }

    let digits: Vec<u32> = cas_number.chars().filter_map(|c| c.to_digit(10)).collect();
    let (check_digit, body) = match digits.split_last() {
        Some((check, body)) => (*check, body),
        None => return Err(SdsError::validation("cas_number", "Empty CAS number")),
    };

    let sum: u32 = body
        .iter()
        .rev()
        .enumerate()
        .map(|(i, digit)| digit * (i as u32 + 1))
        .sum();

    if sum % 10 != check_digit {
        return Err(SdsError::validation(
            "cas_number",
            "Invalid CAS number check digit",
        ));
    }

    Ok(())
}

pub fn validate_file_type(file_name: &str, allowed_types: &[&str]) -> SdsResult<()> {
    let extension = std::path::Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or("");

    if !allowed_types.contains(&extension.to_lowercase().as_str()) {
        return Err(SdsError::validation(
            "file_type",
            format!("File type '{}' not allowed. Allowed types: {}", extension, allowed_types.join(", ")),
        ));
    }

    Ok(())
}

pub fn validate_file_size(file_size: u64, max_size: u64) -> SdsResult<()> {
    if file_size > max_size {
        return Err(SdsError::validation(
            "file_size",
            format!("File size {} bytes exceeds maximum allowed size {} bytes", file_size, max_size),
        ));
    }

    Ok(())
}
