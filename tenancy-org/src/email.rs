//! Email normalization and syntactic validation
//!
//! Invitations are keyed by normalized email, so both the stored value and
//! every comparison go through [`normalize`] first. Validation is
//! deliberately syntactic only: one `@`, a non-empty local part, a domain
//! with at least one interior dot, no whitespace. Deliverability is the
//! mail collaborator's problem.

/// Normalize a raw email for storage and comparison.
///
/// Trims surrounding whitespace and lowercases ASCII. Case-insensitive
/// comparison of the duplicate-invitation check relies on this.
///
/// # Examples
///
/// ```
/// use tenancy_org::email;
///
/// assert_eq!(email::normalize("  New@Example.COM "), "new@example.com");
/// ```
pub fn normalize(raw: &str) -> String {
    raw.trim().to_ascii_lowercase()
}

/// Check whether a normalized email is syntactically plausible.
///
/// # Examples
///
/// ```
/// use tenancy_org::email;
///
/// assert!(email::is_valid("new@example.com"));
/// assert!(!email::is_valid("no-at-sign"));
/// assert!(!email::is_valid("two@@example.com"));
/// assert!(!email::is_valid("@example.com"));
/// assert!(!email::is_valid("user@nodot"));
/// ```
pub fn is_valid(email: &str) -> bool {
    if email.is_empty() || email.chars().any(char::is_whitespace) {
        return false;
    }
    let mut parts = email.split('@');
    let (Some(local), Some(domain), None) = (parts.next(), parts.next(), parts.next()) else {
        return false;
    };
    if local.is_empty() || domain.is_empty() {
        return false;
    }
    domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("  USER@Example.Com "), "user@example.com");
        assert_eq!(normalize("plain@x.io"), "plain@x.io");
    }

    #[test]
    fn test_valid_addresses() {
        assert!(is_valid("user@example.com"));
        assert!(is_valid("first.last+tag@sub.example.co"));
    }

    #[test]
    fn test_invalid_addresses() {
        assert!(!is_valid(""));
        assert!(!is_valid("no-at-sign"));
        assert!(!is_valid("@example.com"));
        assert!(!is_valid("user@"));
        assert!(!is_valid("user@nodot"));
        assert!(!is_valid("user@.com"));
        assert!(!is_valid("user@example.com."));
        assert!(!is_valid("us er@example.com"));
        assert!(!is_valid("a@b@example.com"));
    }
}
