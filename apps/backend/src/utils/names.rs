//! Display names for sessions, teams and participants.

use unicode_normalization::UnicodeNormalization;

use crate::errors::domain::{DomainError, ValidationKind};

pub const MAX_NAME_CHARS: usize = 40;

/// NFKC-normalize, trim and collapse inner whitespace.
///
/// `what` names the field in the error detail ("team name", ...).
pub fn normalize_name(raw: &str, what: &str) -> Result<String, DomainError> {
    let normalized: String = raw.nfkc().collect();
    let name = normalized.split_whitespace().collect::<Vec<_>>().join(" ");
    let len = name.chars().count();
    if len == 0 {
        return Err(DomainError::validation(
            ValidationKind::InvalidName,
            format!("{what} must not be empty"),
        ));
    }
    if len > MAX_NAME_CHARS {
        return Err(DomainError::validation(
            ValidationKind::InvalidName,
            format!("{what} must be at most {MAX_NAME_CHARS} characters"),
        ));
    }
    Ok(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collapses_whitespace_and_normalizes() {
        assert_eq!(normalize_name("  Red   Team ", "team name").unwrap(), "Red Team");
        // Fullwidth letters fold to ASCII under NFKC.
        assert_eq!(normalize_name("ＲＥＤ", "team name").unwrap(), "RED");
    }

    #[test]
    fn test_rejects_empty_and_long() {
        let err = normalize_name(" \t ", "team name").unwrap_err();
        assert!(matches!(
            err,
            DomainError::Validation(ValidationKind::InvalidName, ref d) if d.contains("team name")
        ));
        assert!(normalize_name(&"x".repeat(MAX_NAME_CHARS + 1), "name").is_err());
        assert!(normalize_name(&"x".repeat(MAX_NAME_CHARS), "name").is_ok());
    }
}
