//! Well-known role name constants.
//!
//! These must match the `ck_profiles_role` check constraint in
//! `20261017000001_create_profiles.sql`.

use crate::error::CoreError;

pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_BROKER: &str = "broker";
pub const ROLE_INVESTOR: &str = "investor";

/// All valid role names.
pub const VALID_ROLES: &[&str] = &[ROLE_ADMIN, ROLE_BROKER, ROLE_INVESTOR];

/// Validate that a role name is one of [`VALID_ROLES`].
pub fn validate_role(role: &str) -> Result<(), CoreError> {
    if VALID_ROLES.contains(&role) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Invalid role '{role}'. Must be one of: {}",
            VALID_ROLES.join(", ")
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_known_roles() {
        for role in VALID_ROLES {
            assert!(validate_role(role).is_ok());
        }
    }

    #[test]
    fn rejects_unknown_role() {
        assert!(validate_role("superuser").is_err());
        assert!(validate_role("").is_err());
    }
}
