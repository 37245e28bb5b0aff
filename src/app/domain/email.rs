use validator::ValidationError;

/// Email domain type. Once constructed, guaranteed to be valid, trimmed, and lowercase.
/// Users are looked up by email, so two spellings of one address must compare equal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Email(String);

impl Email {
    /// Maximum email length per RFC 5321.
    const MAX_LEN: usize = 254;

    /// Create a new Email from a string. Trims whitespace and lowercases before validating.
    pub fn new(email: impl AsRef<str>) -> Result<Self, ValidationError> {
        let normalized = email.as_ref().trim().to_lowercase();

        if normalized.len() > Self::MAX_LEN {
            return Err(invalid("email_too_long", "Email address is too long"));
        }

        let (local, domain) = normalized
            .split_once('@')
            .ok_or_else(|| invalid("invalid_email", "Invalid email address format"))?;

        let allowed = |c: char| c.is_alphanumeric() || matches!(c, '.' | '-' | '_' | '+');
        let domain_ok = domain.contains('.')
            && !domain.starts_with('.')
            && !domain.ends_with('.')
            && domain.chars().all(allowed);

        if local.is_empty() || !local.chars().all(allowed) || !domain_ok {
            return Err(invalid("invalid_email", "Invalid email address format"));
        }

        Ok(Self(normalized))
    }

    /// Get the email as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn invalid(code: &'static str, message: &'static str) -> ValidationError {
    let mut error = ValidationError::new(code);
    error.message = Some(message.into());
    error
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_email() {
        let email = Email::new("test@example.com").unwrap();
        assert_eq!(email.as_str(), "test@example.com");
    }

    #[test]
    fn email_trimmed_and_lowercased() {
        let email = Email::new("  TeSt@ExAmPlE.CoM  ").unwrap();
        assert_eq!(email.as_str(), "test@example.com");
    }

    #[test]
    fn invalid_email_format() {
        assert!(Email::new("notanemail").is_err());
        assert!(Email::new("@example.com").is_err());
        assert!(Email::new("a b@example.com").is_err());
        assert!(Email::new("user@localhost").is_err());
    }

    #[test]
    fn email_too_long() {
        let long_email = "a".repeat(250) + "@example.com";
        assert!(Email::new(long_email).is_err());
    }
}
