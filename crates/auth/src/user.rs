use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use vitrina_core::{DomainError, DomainResult, TenantId, UserId};

use crate::Role;

/// A user account row.
///
/// `password_hash` carries the `salt$digest` encoding from
/// [`crate::hash_password`]; it never leaves the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserAccount {
    pub id: UserId,
    pub tenant_id: TenantId,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub display_name: String,
    pub role: Role,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Normalize an email for storage and comparison (trim + lower-case).
///
/// Validation is deliberately shallow: one `@` with something on both sides.
pub fn normalize_email(email: &str) -> DomainResult<String> {
    let email = email.trim().to_lowercase();
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && domain.contains('.') => Ok(email),
        _ => Err(DomainError::validation(format!("invalid email '{email}'"))),
    }
}

/// Minimal password policy applied at registration.
pub fn validate_new_password(password: &str) -> DomainResult<()> {
    if password.chars().count() < 8 {
        return Err(DomainError::validation(
            "password must be at least 8 characters",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_is_lowercased_and_trimmed() {
        assert_eq!(
            normalize_email("  Ada@Example.COM ").unwrap(),
            "ada@example.com"
        );
    }

    #[test]
    fn bad_emails_are_rejected() {
        assert!(normalize_email("").is_err());
        assert!(normalize_email("no-at-sign").is_err());
        assert!(normalize_email("@example.com").is_err());
        assert!(normalize_email("a@nodot").is_err());
    }

    #[test]
    fn password_policy() {
        assert!(validate_new_password("hunter22").is_ok());
        assert!(validate_new_password("short").is_err());
    }
}
