//! Organization invitation model
//!
//! An invitation is an outstanding offer of organization membership sent to
//! an email address that is not yet a member. At most one unresolved
//! invitation may exist per (organization, normalized email) pair.
//!
//! Invitations are never deleted by the engine; acceptance is resolved out
//! of band (signup or the membership-request flow), and the notification
//! outcome is tracked on the row itself via [`DeliveryStatus`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::privilege::OrganizationPrivilege;

/// Outcome of the invitation notification attempt.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryStatus {
    /// Notification has not been attempted yet
    Pending,

    /// Notification was handed to the mail collaborator successfully
    Sent,

    /// Notification failed; the invitation row itself is unaffected
    Failed {
        /// Why delivery failed
        reason: String,
    },
}

/// An outstanding offer of organization membership.
///
/// # Examples
///
/// ```
/// use uuid::Uuid;
/// use tenancy_org::{DeliveryStatus, OrganizationInvitation, OrganizationPrivilege};
///
/// let org_id = Uuid::now_v7();
/// let inviter = Uuid::now_v7();
/// let invitation = OrganizationInvitation::new(
///     org_id,
///     "new@example.com",
///     inviter,
///     OrganizationPrivilege::Member,
/// );
/// assert_eq!(invitation.delivery, DeliveryStatus::Pending);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrganizationInvitation {
    /// Unique invitation ID
    pub id: Uuid,

    /// The inviting organization
    pub organization_id: Uuid,

    /// Target email, stored normalized (trimmed, lowercased)
    pub email: String,

    /// Who issued the invitation
    pub invited_by: Uuid,

    /// The privilege the invitee will receive on acceptance
    pub privilege: OrganizationPrivilege,

    /// Notification delivery outcome
    pub delivery: DeliveryStatus,

    /// When the invitation was issued
    pub created_at: DateTime<Utc>,
}

impl OrganizationInvitation {
    /// Creates a new invitation with delivery pending.
    ///
    /// The email is expected to already be normalized by the caller; the
    /// engine normalizes before the duplicate check so the stored value and
    /// the compared value are the same string.
    pub fn new(
        organization_id: Uuid,
        email: impl Into<String>,
        invited_by: Uuid,
        privilege: OrganizationPrivilege,
    ) -> Self {
        Self {
            id: Uuid::now_v7(),
            organization_id,
            email: email.into(),
            invited_by,
            privilege,
            delivery: DeliveryStatus::Pending,
            created_at: Utc::now(),
        }
    }

    /// The acceptance link embedded in the notification email.
    ///
    /// Path-relative; the mail collaborator prefixes its configured base
    /// URL.
    pub fn invitation_link(&self) -> String {
        format!(
            "/organizations/{}/invitations/{}/accept",
            self.organization_id, self.id
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invitation_creation() {
        let org_id = Uuid::now_v7();
        let inviter = Uuid::now_v7();
        let invitation = OrganizationInvitation::new(
            org_id,
            "new@example.com",
            inviter,
            OrganizationPrivilege::Admin,
        );

        assert_eq!(invitation.organization_id, org_id);
        assert_eq!(invitation.invited_by, inviter);
        assert_eq!(invitation.privilege, OrganizationPrivilege::Admin);
        assert_eq!(invitation.delivery, DeliveryStatus::Pending);
    }

    #[test]
    fn test_invitation_link() {
        let invitation = OrganizationInvitation::new(
            Uuid::now_v7(),
            "new@example.com",
            Uuid::now_v7(),
            OrganizationPrivilege::Member,
        );

        let link = invitation.invitation_link();
        assert!(link.contains(&invitation.organization_id.to_string()));
        assert!(link.ends_with("/accept"));
    }
}
