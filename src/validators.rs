/// Input validators for the HTTP layer.
///
/// The session core accepts any well-typed input; these checks keep garbage
/// and oversized values away from it (and from bcrypt) at the edge.

use lazy_static::lazy_static;
use regex::Regex;

use crate::auth::MAX_PASSWORD_BYTES;
use crate::error::ValidationError;

const MAX_EMAIL_LENGTH: usize = 254; // RFC 5321
const MIN_EMAIL_LENGTH: usize = 5;
const MIN_PASSWORD_LENGTH: usize = 6;

lazy_static! {
    // RFC 5322 simplified email regex
    static ref EMAIL_REGEX: Regex = Regex::new(
        r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$"
    ).unwrap();
}

/// Validates an email address and returns it trimmed
pub fn is_valid_email(email: &str) -> Result<String, ValidationError> {
    let trimmed = email.trim();

    if trimmed.is_empty() {
        return Err(ValidationError::EmptyField("email"));
    }

    if trimmed.len() < MIN_EMAIL_LENGTH {
        return Err(ValidationError::TooShort("email", MIN_EMAIL_LENGTH));
    }

    if trimmed.len() > MAX_EMAIL_LENGTH {
        return Err(ValidationError::TooLong("email", MAX_EMAIL_LENGTH));
    }

    if !EMAIL_REGEX.is_match(trimmed) {
        return Err(ValidationError::InvalidFormat("email".to_string()));
    }

    // Local part limit from RFC 5321
    if let Some(at_pos) = trimmed.find('@') {
        if at_pos > 64 {
            return Err(ValidationError::InvalidFormat("email".to_string()));
        }
    }

    Ok(trimmed.to_string())
}

/// Validates a password. Passwords are not trimmed.
pub fn is_valid_password(password: &str) -> Result<(), ValidationError> {
    if password.trim().is_empty() {
        return Err(ValidationError::EmptyField("password"));
    }

    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(ValidationError::TooShort("password", MIN_PASSWORD_LENGTH));
    }

    if password.len() > MAX_PASSWORD_BYTES {
        return Err(ValidationError::TooLong("password", MAX_PASSWORD_BYTES));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_emails() {
        assert!(is_valid_email("user@example.com").is_ok());
        assert!(is_valid_email("john.doe+tag@sub.example.co.uk").is_ok());
        assert_eq!(is_valid_email("  a@x.com  ").unwrap(), "a@x.com");
    }

    #[test]
    fn test_invalid_emails() {
        assert_eq!(is_valid_email(""), Err(ValidationError::EmptyField("email")));
        assert_eq!(is_valid_email("a@b"), Err(ValidationError::TooShort("email", 5)));
        assert!(is_valid_email("notanemail").is_err());
        assert!(is_valid_email("user@").is_err());
        assert!(is_valid_email("@example.com").is_err());
        assert!(is_valid_email("user@@example.com").is_err());
    }

    #[test]
    fn test_email_length_limits() {
        let long_local = format!("{}@example.com", "a".repeat(65));
        assert!(is_valid_email(&long_local).is_err());

        let too_long = format!("{}@{}.com", "a".repeat(60), "b".repeat(200));
        assert_eq!(is_valid_email(&too_long), Err(ValidationError::TooLong("email", 254)));
    }

    #[test]
    fn test_valid_passwords() {
        assert!(is_valid_password("secret").is_ok());
        assert!(is_valid_password(&"p".repeat(72)).is_ok());
    }

    #[test]
    fn test_invalid_passwords() {
        assert_eq!(is_valid_password("      "), Err(ValidationError::EmptyField("password")));
        assert_eq!(is_valid_password("pw1"), Err(ValidationError::TooShort("password", 6)));
        assert_eq!(
            is_valid_password(&"p".repeat(73)),
            Err(ValidationError::TooLong("password", 72))
        );
    }
}
