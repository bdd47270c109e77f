//! Resource-audience policy model
//!
//! A policy is the authorization edge of the system: it grants one audience
//! (a user or a team) one privilege on one resource (an organization or a
//! team). At most one active policy may exist per
//! (resource id, audience type, audience id) tuple; the store layer is
//! expected to back this invariant with a uniqueness constraint.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::privilege::{AudienceType, OrganizationPrivilege, Privilege, ResourceType};

/// A (resource, audience, privilege) authorization edge.
///
/// Policies are created on organization creation (owner → system admin), on
/// membership-request approval (requester → member), or by explicit role
/// assignment. They are deleted on member removal, and the only field ever
/// mutated in place is the privilege value.
///
/// # Examples
///
/// ```
/// use uuid::Uuid;
/// use tenancy_org::{OrganizationPrivilege, ResourceAudiencePolicy};
///
/// let org_id = Uuid::now_v7();
/// let user_id = Uuid::now_v7();
/// let policy = ResourceAudiencePolicy::organization_user(
///     org_id,
///     user_id,
///     OrganizationPrivilege::Member,
/// );
/// assert_eq!(policy.resource_id, org_id);
/// assert_eq!(policy.audience_id, user_id);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResourceAudiencePolicy {
    /// Unique policy ID
    pub id: Uuid,

    /// The resource this policy grants access to
    pub resource_id: Uuid,

    /// What kind of resource that is
    pub resource_type: ResourceType,

    /// What kind of subject is granted access
    pub audience_type: AudienceType,

    /// The subject granted access
    pub audience_id: Uuid,

    /// The granted level, scoped to the resource type
    pub privilege: Privilege,

    /// When the policy was created
    pub created_at: DateTime<Utc>,

    /// When the privilege was last changed
    pub updated_at: DateTime<Utc>,
}

impl ResourceAudiencePolicy {
    /// Creates a new policy edge.
    ///
    /// # Arguments
    ///
    /// * `resource_id` - The resource being granted
    /// * `resource_type` - The kind of resource
    /// * `audience_type` - The kind of subject
    /// * `audience_id` - The subject
    /// * `privilege` - The granted level
    pub fn new(
        resource_id: Uuid,
        resource_type: ResourceType,
        audience_type: AudienceType,
        audience_id: Uuid,
        privilege: Privilege,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            resource_id,
            resource_type,
            audience_type,
            audience_id,
            privilege,
            created_at: now,
            updated_at: now,
        }
    }

    /// Creates an organization-membership policy for a user.
    ///
    /// This is the common case: a user holding an organization-scoped
    /// privilege in an organization.
    pub fn organization_user(
        organization_id: Uuid,
        user_id: Uuid,
        privilege: OrganizationPrivilege,
    ) -> Self {
        Self::new(
            organization_id,
            ResourceType::Organization,
            AudienceType::User,
            user_id,
            Privilege::Organization(privilege),
        )
    }

    /// Check whether this policy matches an audience key.
    pub fn matches_audience(&self, audience_type: AudienceType, audience_id: Uuid) -> bool {
        self.audience_type == audience_type && self.audience_id == audience_id
    }

    /// Check whether this policy is a user's membership in the given resource.
    pub fn is_user_policy_for(&self, resource_id: Uuid, user_id: Uuid) -> bool {
        self.resource_id == resource_id && self.matches_audience(AudienceType::User, user_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_organization_user_policy() {
        let org_id = Uuid::now_v7();
        let user_id = Uuid::now_v7();
        let policy = ResourceAudiencePolicy::organization_user(
            org_id,
            user_id,
            OrganizationPrivilege::SystemAdmin,
        );

        assert_eq!(policy.resource_type, ResourceType::Organization);
        assert_eq!(policy.audience_type, AudienceType::User);
        assert!(policy.privilege.is_system_admin());
        assert!(policy.is_user_policy_for(org_id, user_id));
        assert!(!policy.is_user_policy_for(org_id, Uuid::now_v7()));
    }

    #[test]
    fn test_matches_audience() {
        let org_id = Uuid::now_v7();
        let team_id = Uuid::now_v7();
        let policy = ResourceAudiencePolicy::new(
            org_id,
            ResourceType::Organization,
            AudienceType::Team,
            team_id,
            Privilege::Organization(OrganizationPrivilege::Member),
        );

        assert!(policy.matches_audience(AudienceType::Team, team_id));
        assert!(!policy.matches_audience(AudienceType::User, team_id));
    }
}
