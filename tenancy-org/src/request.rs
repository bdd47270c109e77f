//! Organization membership request model
//!
//! A membership request is a self-service ask by an existing platform user
//! to join an organization. Requests are created by the signup/join surface
//! (outside this workspace) and consumed by the engine's approval workflow.
//! The only transition the engine performs is pending → approved, and it is
//! irreversible within the engine's contract.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifecycle state of a membership request.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    /// Awaiting an admin decision
    Pending,

    /// Approved; a member policy was created in the same transaction
    Approved,

    /// Rejected (part of the enum; not exercised by the engine's flows)
    Rejected,
}

impl RequestStatus {
    /// Get string representation of the status.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }
}

/// A self-service ask to join an organization.
///
/// # Examples
///
/// ```
/// use uuid::Uuid;
/// use tenancy_org::{OrganizationMembershipRequest, RequestStatus};
///
/// let request = OrganizationMembershipRequest::new(Uuid::now_v7(), Uuid::now_v7());
/// assert!(request.is_pending());
/// assert_eq!(request.status, RequestStatus::Pending);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrganizationMembershipRequest {
    /// Unique request ID
    pub id: Uuid,

    /// The organization being asked to join
    pub organization_id: Uuid,

    /// The user asking to join
    pub user_id: Uuid,

    /// Current lifecycle state
    pub status: RequestStatus,

    /// When the request was created
    pub created_at: DateTime<Utc>,

    /// When the request was approved or rejected
    pub resolved_at: Option<DateTime<Utc>>,
}

impl OrganizationMembershipRequest {
    /// Creates a new pending request.
    pub fn new(organization_id: Uuid, user_id: Uuid) -> Self {
        Self {
            id: Uuid::now_v7(),
            organization_id,
            user_id,
            status: RequestStatus::Pending,
            created_at: Utc::now(),
            resolved_at: None,
        }
    }

    /// Check whether the request is still awaiting a decision.
    pub fn is_pending(&self) -> bool {
        self.status == RequestStatus::Pending
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_starts_pending() {
        let org_id = Uuid::now_v7();
        let user_id = Uuid::now_v7();
        let request = OrganizationMembershipRequest::new(org_id, user_id);

        assert_eq!(request.organization_id, org_id);
        assert_eq!(request.user_id, user_id);
        assert!(request.is_pending());
        assert!(request.resolved_at.is_none());
    }

    #[test]
    fn test_status_as_str() {
        assert_eq!(RequestStatus::Pending.as_str(), "pending");
        assert_eq!(RequestStatus::Approved.as_str(), "approved");
        assert_eq!(RequestStatus::Rejected.as_str(), "rejected");
    }
}
