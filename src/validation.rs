//! Input validation for dataset and triage data.

use crate::error::{Result, SiftError};

/// Maximum allowed length for an inbox entry.
pub const MAX_ENTRY_LENGTH: usize = 500;

/// Maximum allowed length for a project or goal name.
pub const MAX_NAME_LENGTH: usize = 200;

/// Maximum allowed length for a dataset name.
pub const MAX_DATASET_NAME_LENGTH: usize = 50;

/// Characters forbidden in dataset names to prevent path traversal.
const FORBIDDEN_NAME_CHARS: &[char] = &['/', '\\', '\0'];

/// Validates a raw inbox entry.
pub fn validate_entry_text(text: &str) -> Result<()> {
    if text.trim().is_empty() {
        return Err(SiftError::Validation(
            "Inbox entry cannot be empty".to_string(),
        ));
    }
    if text.len() > MAX_ENTRY_LENGTH {
        return Err(SiftError::Validation(format!(
            "Inbox entry exceeds maximum length of {} characters",
            MAX_ENTRY_LENGTH
        )));
    }
    Ok(())
}

/// Validates a project or goal name.
pub fn validate_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(SiftError::Validation("Name cannot be empty".to_string()));
    }
    if name.len() > MAX_NAME_LENGTH {
        return Err(SiftError::Validation(format!(
            "Name exceeds maximum length of {} characters",
            MAX_NAME_LENGTH
        )));
    }
    Ok(())
}

/// Validates a tag name.
pub fn validate_tag(tag: &str) -> Result<()> {
    if tag.is_empty() {
        return Err(SiftError::Validation("Tag cannot be empty".to_string()));
    }
    if tag.len() > 50 {
        return Err(SiftError::Validation(
            "Tag exceeds maximum length of 50 characters".to_string(),
        ));
    }
    Ok(())
}

/// Validates a dataset name, which doubles as a file stem on disk.
pub fn validate_dataset_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(SiftError::Validation(
            "Dataset name cannot be empty".to_string(),
        ));
    }
    if name.len() > MAX_DATASET_NAME_LENGTH {
        return Err(SiftError::Validation(format!(
            "Dataset name exceeds maximum length of {} characters",
            MAX_DATASET_NAME_LENGTH
        )));
    }
    if name.contains("..") {
        return Err(SiftError::Validation(
            "Dataset name cannot contain '..' (path traversal)".to_string(),
        ));
    }
    for c in FORBIDDEN_NAME_CHARS {
        if name.contains(*c) {
            return Err(SiftError::Validation(format!(
                "Dataset name cannot contain '{}'",
                c
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_entry_text_empty() {
        assert!(validate_entry_text("   ").is_err());
    }

    #[test]
    fn test_validate_entry_text_valid() {
        assert!(validate_entry_text("Buy milk").is_ok());
    }

    #[test]
    fn test_validate_entry_text_too_long() {
        let long = "a".repeat(MAX_ENTRY_LENGTH + 1);
        assert!(validate_entry_text(&long).is_err());
    }

    #[test]
    fn test_validate_dataset_name_path_traversal() {
        assert!(validate_dataset_name("../../../etc/passwd").is_err());
        assert!(validate_dataset_name("work").is_ok());
    }

    #[test]
    fn test_validate_dataset_name_forbidden_chars() {
        assert!(validate_dataset_name("work/home").is_err());
        assert!(validate_dataset_name("work\\home").is_err());
    }

    #[test]
    fn test_validate_dataset_name_too_long() {
        let long = "a".repeat(MAX_DATASET_NAME_LENGTH + 1);
        assert!(validate_dataset_name(&long).is_err());
    }
}
