//! Input validation shared by every signup path.

use crate::error::{WardenError, WardenResult};

pub const USERNAME_MIN: usize = 3;
pub const USERNAME_MAX: usize = 50;
pub const EMAIL_MAX: usize = 100;
pub const PASSWORD_MAX: usize = 100;
pub const CLIENT_NAME_MAX: usize = 64;

pub fn validate_username(username: &str) -> WardenResult<()> {
    let len = username.chars().count();
    if username.trim() != username {
        return Err(WardenError::validation(
            "username must not start or end with whitespace",
        ));
    }
    if !(USERNAME_MIN..=USERNAME_MAX).contains(&len) {
        return Err(WardenError::validation(format!(
            "username must be between {USERNAME_MIN} and {USERNAME_MAX} characters"
        )));
    }
    Ok(())
}

/// Structural check only: one `@`, non-empty local part, dotted domain.
pub fn validate_email(email: &str) -> WardenResult<()> {
    let invalid = || WardenError::validation("email is not a valid address");

    if email.is_empty() || email.chars().count() > EMAIL_MAX {
        return Err(WardenError::validation(format!(
            "email must be between 1 and {EMAIL_MAX} characters"
        )));
    }
    if email.chars().any(char::is_whitespace) {
        return Err(invalid());
    }
    let (local, domain) = email.split_once('@').ok_or_else(invalid)?;
    if local.is_empty() || domain.contains('@') {
        return Err(invalid());
    }
    let mut labels = domain.split('.');
    let well_formed = domain.contains('.') && labels.all(|label| !label.is_empty());
    if !well_formed {
        return Err(invalid());
    }
    Ok(())
}

pub fn validate_password(password: &str, min_len: usize) -> WardenResult<()> {
    let len = password.chars().count();
    if len < min_len || len > PASSWORD_MAX {
        return Err(WardenError::validation(format!(
            "password must be between {min_len} and {PASSWORD_MAX} characters"
        )));
    }
    Ok(())
}

pub fn validate_client_name(client_name: &str) -> WardenResult<()> {
    if client_name.trim().is_empty() {
        return Err(WardenError::validation("client_name is required"));
    }
    if client_name.chars().count() > CLIENT_NAME_MAX {
        return Err(WardenError::validation(format!(
            "client_name must be at most {CLIENT_NAME_MAX} characters"
        )));
    }
    Ok(())
}

/// Login inputs only need to be present; length rules would leak policy.
pub fn require(field: &str, value: &str) -> WardenResult<()> {
    if value.is_empty() {
        return Err(WardenError::validation(format!("{field} is required")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn username_bounds() {
        assert!(validate_username("al").is_err());
        assert!(validate_username("ali").is_ok());
        assert!(validate_username(&"x".repeat(51)).is_err());
        assert!(validate_username(" alice").is_err());
    }

    #[test]
    fn email_shapes() {
        assert!(validate_email("alice@example.com").is_ok());
        assert!(validate_email("alice@example").is_err());
        assert!(validate_email("@example.com").is_err());
        assert!(validate_email("alice@@example.com").is_err());
        assert!(validate_email("alice@example..com").is_err());
        assert!(validate_email("al ice@example.com").is_err());
        assert!(validate_email("").is_err());
    }

    #[test]
    fn password_bounds() {
        assert!(validate_password("short", 8).is_err());
        assert!(validate_password("longenough", 8).is_ok());
        assert!(validate_password(&"p".repeat(101), 8).is_err());
    }

    #[test]
    fn client_name_required() {
        assert!(validate_client_name("   ").is_err());
        assert!(validate_client_name("acme").is_ok());
        assert!(validate_client_name(&"c".repeat(65)).is_err());
    }

    #[test]
    fn errors_are_validation_kind() {
        let err = require("username", "").unwrap_err();
        assert!(matches!(err, WardenError::Validation { .. }));
    }
}
