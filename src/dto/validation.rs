//! Validation helpers for DTOs.

use validator::ValidationError;

/// Rejects names made only of whitespace.
pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("blank");
        err.message = Some("must not be blank".into());
        return Err(err);
    }

    Ok(())
}

/// Requires at least one member with a non-blank name.
pub fn validate_members(members: &[String]) -> Result<(), ValidationError> {
    if members.iter().all(|name| name.trim().is_empty()) {
        let mut err = ValidationError::new("members_empty");
        err.message = Some("each team needs at least one named member".into());
        return Err(err);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_not_blank() {
        assert!(validate_not_blank("Red").is_ok());
        assert!(validate_not_blank("").is_err());
        assert!(validate_not_blank(" \t").is_err());
    }

    #[test]
    fn test_validate_members() {
        assert!(validate_members(&["Ana".into(), "".into()]).is_ok());
        assert!(validate_members(&[]).is_err());
        assert!(validate_members(&["  ".into()]).is_err());
    }
}
