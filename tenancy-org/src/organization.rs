//! Organization domain model
//!
//! Organizations are the top-level tenant entities. On the write side an
//! organization is just identity plus descriptive fields; its policies,
//! invitations, and membership requests are separate rows owned by the
//! store, and the engine never treats the organization as an aggregate root
//! for them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A tenant organization.
///
/// # Examples
///
/// ```
/// use uuid::Uuid;
/// use tenancy_org::Organization;
///
/// let owner_id = Uuid::now_v7();
/// let org = Organization::new("Acme Corp", owner_id);
/// assert_eq!(org.name, "Acme Corp");
/// assert_eq!(org.owner_id, owner_id);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Organization {
    /// Unique identifier for the organization
    pub id: Uuid,

    /// Human-readable name
    pub name: String,

    /// Optional description
    pub description: Option<String>,

    /// Owner user ID (the user the organization was created for)
    pub owner_id: Uuid,

    /// When the organization was created
    pub created_at: DateTime<Utc>,

    /// When the organization was last updated
    pub updated_at: DateTime<Utc>,
}

impl Organization {
    /// Creates a new organization.
    ///
    /// The organization is created with a newly generated UUID v7 ID and
    /// current timestamps. The owner's actual access is granted by a
    /// separate system-admin policy, written in the same transaction by the
    /// engine's bootstrap operation.
    ///
    /// # Arguments
    ///
    /// * `name` - The organization name
    /// * `owner_id` - The user ID who owns this organization
    pub fn new(name: impl Into<String>, owner_id: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            name: name.into(),
            description: None,
            owner_id,
            created_at: now,
            updated_at: now,
        }
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_organization_creation() {
        let owner_id = Uuid::now_v7();
        let org = Organization::new("Acme Corp", owner_id).with_description("Makers of anvils");

        assert_eq!(org.name, "Acme Corp");
        assert_eq!(org.owner_id, owner_id);
        assert_eq!(org.description.as_deref(), Some("Makers of anvils"));
    }
}
