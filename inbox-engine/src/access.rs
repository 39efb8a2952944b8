//! Role checks shared by engine operations.

use inbox_core::User;

use crate::error::{EngineError, Result};

/// Viewers may read but never send or start conversations.
pub fn require_sender(user: &User) -> Result<()> {
    if user.role.can_send() {
        Ok(())
    } else {
        Err(EngineError::Forbidden(
            "Viewers cannot send messages. Only editors and admins can send messages.".to_string(),
        ))
    }
}

pub fn require_admin(user: &User) -> Result<()> {
    if user.role.is_admin() {
        Ok(())
    } else {
        Err(EngineError::Forbidden("Forbidden".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use inbox_core::UserRole;

    fn user(role: UserRole) -> User {
        User {
            id: "u".to_string(),
            email: "u@x.io".to_string(),
            first_name: "U".to_string(),
            last_name: "Ser".to_string(),
            role,
            email_verified: true,
            image: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_require_sender() {
        assert!(require_sender(&user(UserRole::Admin)).is_ok());
        assert!(require_sender(&user(UserRole::Editor)).is_ok());
        assert!(matches!(
            require_sender(&user(UserRole::Viewer)),
            Err(EngineError::Forbidden(_))
        ));
    }

    #[test]
    fn test_require_admin() {
        assert!(require_admin(&user(UserRole::Admin)).is_ok());
        assert!(require_admin(&user(UserRole::Editor)).is_err());
        assert!(require_admin(&user(UserRole::Viewer)).is_err());
    }
}
