//! Directory user record
//!
//! The engine does not own user accounts; it only needs to resolve an email
//! to a user id (for invitation checks and approve-by-email) and a user id
//! to a display name (for the notification). This record is what the user
//! directory capability returns.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A platform user as seen by the membership engine.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserRecord {
    /// User ID
    pub id: Uuid,

    /// Primary email, normalized
    pub email: String,

    /// Display name for notifications, if the profile has one
    pub display_name: Option<String>,
}

impl UserRecord {
    /// Creates a user record.
    pub fn new(id: Uuid, email: impl Into<String>) -> Self {
        Self {
            id,
            email: email.into(),
            display_name: None,
        }
    }

    /// Set the display name.
    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }

    /// Name to show in outbound mail; falls back to the email.
    pub fn notification_name(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.email)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notification_name_fallback() {
        let user = UserRecord::new(Uuid::now_v7(), "a@example.com");
        assert_eq!(user.notification_name(), "a@example.com");

        let named = user.with_display_name("Ada");
        assert_eq!(named.notification_name(), "Ada");
    }
}
