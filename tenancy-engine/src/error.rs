//! Error types for membership and access-control operations
//!
//! The taxonomy splits into authorization, validation, conflict, and
//! infrastructure kinds. Authorization and validation errors are produced
//! before any transaction opens; conflicts abort their transaction;
//! infrastructure errors carry the underlying store cause but are shown to
//! callers generically.

use thiserror::Error;

use crate::store::StoreError;

/// Membership-engine error types.
#[derive(Debug, Error)]
pub enum EngineError {
    // -- Authorization ------------------------------------------------------
    /// Caller lacks the scope, privilege, or self-action allowance
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Caller holds no membership policy in the target organization
    #[error("You are not a member of this organization")]
    NotAMember,

    /// The request context carries no authenticated user
    #[error("No authenticated user in request context")]
    NoIdentity,

    // -- Validation ---------------------------------------------------------
    /// Malformed email address
    #[error("Invalid email address: {0}")]
    InvalidEmail(String),

    /// Privilege is not valid for the target resource type
    #[error("Invalid privilege for this resource: {0}")]
    InvalidPrivilege(String),

    /// Name missing or over the length limit
    #[error("Invalid name: {0}")]
    InvalidName(String),

    /// Color is not a hex code
    #[error("Invalid color code: {0}")]
    InvalidColorCode(String),

    /// A required identifier was not provided
    #[error("Missing required id: {0}")]
    MissingRequiredId(&'static str),

    // -- Conflict -----------------------------------------------------------
    /// An unresolved invitation for this email already exists
    #[error("An invitation for {0} is already outstanding")]
    DuplicateInvitation(String),

    /// The target is already an organization member
    #[error("User is already a member of this organization")]
    AlreadyMember,

    /// The target is already on the team roster
    #[error("User is already a member of this team")]
    AlreadyTeamMember,

    /// A team with this name already exists in the organization
    #[error("A team named \"{0}\" already exists in this organization")]
    DuplicateTeamName(String),

    /// No membership policy exists for the target user
    #[error("No membership policy found for this user")]
    PolicyNotFound,

    /// The team does not exist
    #[error("Team not found")]
    TeamNotFound,

    /// The roster entry does not exist
    #[error("Team membership not found")]
    MembershipNotFound,

    /// No pending membership request exists for the target user
    #[error("No pending membership request for this user")]
    RequestNotFound,

    /// No policy in the organization matches the audience
    #[error("Audience not found in this organization")]
    AudienceNotFound,

    /// The target user is not a member of the organization
    #[error("User is not a member of this organization")]
    NotOrganizationMember,

    // -- Infrastructure -----------------------------------------------------
    /// Underlying store or transaction failure
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

impl EngineError {
    /// Check whether this is an infrastructure-class failure.
    ///
    /// Infrastructure failures are routed to the telemetry sink with their
    /// cause; everything else is a normal domain outcome.
    pub fn is_infrastructure(&self) -> bool {
        matches!(self, EngineError::Store(_))
    }

    /// Get error code for API responses.
    pub fn error_code(&self) -> &'static str {
        match self {
            EngineError::Forbidden(_) => "FORBIDDEN",
            EngineError::NotAMember => "NOT_A_MEMBER",
            EngineError::NoIdentity => "NO_IDENTITY",
            EngineError::InvalidEmail(_) => "INVALID_EMAIL",
            EngineError::InvalidPrivilege(_) => "INVALID_PRIVILEGE",
            EngineError::InvalidName(_) => "INVALID_NAME",
            EngineError::InvalidColorCode(_) => "INVALID_COLOR_CODE",
            EngineError::MissingRequiredId(_) => "MISSING_REQUIRED_ID",
            EngineError::DuplicateInvitation(_) => "DUPLICATE_INVITATION",
            EngineError::AlreadyMember => "ALREADY_MEMBER",
            EngineError::AlreadyTeamMember => "ALREADY_TEAM_MEMBER",
            EngineError::DuplicateTeamName(_) => "DUPLICATE_TEAM_NAME",
            EngineError::PolicyNotFound => "POLICY_NOT_FOUND",
            EngineError::TeamNotFound => "TEAM_NOT_FOUND",
            EngineError::MembershipNotFound => "MEMBERSHIP_NOT_FOUND",
            EngineError::RequestNotFound => "REQUEST_NOT_FOUND",
            EngineError::AudienceNotFound => "AUDIENCE_NOT_FOUND",
            EngineError::NotOrganizationMember => "NOT_ORGANIZATION_MEMBER",
            EngineError::Store(_) => "INTERNAL_ERROR",
        }
    }

    /// Stable message suitable for direct display.
    ///
    /// Authorization, validation, and conflict errors show their own
    /// message; infrastructure errors are masked so internal detail never
    /// reaches a user.
    pub fn user_message(&self) -> String {
        match self {
            EngineError::Store(_) => {
                "Something went wrong. Please try again later.".to_string()
            }
            other => other.to_string(),
        }
    }
}

/// Map a store constraint violation to its domain conflict.
///
/// When a transactional insert loses a race, the persistence-layer
/// uniqueness backstop rejects it; callers surface that the same way a
/// lost pre-check would. Other store failures stay infrastructure.
pub(crate) fn constraint_as(err: StoreError, conflict: EngineError) -> EngineError {
    match err {
        StoreError::Constraint(_) => conflict,
        other => EngineError::Store(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_infrastructure_classification() {
        assert!(EngineError::Store(StoreError::Unavailable("db down".into())).is_infrastructure());
        assert!(!EngineError::AlreadyMember.is_infrastructure());
        assert!(!EngineError::Forbidden("nope".into()).is_infrastructure());
    }

    #[test]
    fn test_user_message_masks_store_detail() {
        let err = EngineError::Store(StoreError::Unavailable("pg: connection refused".into()));
        assert!(!err.user_message().contains("pg:"));

        let conflict = EngineError::DuplicateTeamName("Platform".into());
        assert!(conflict.user_message().contains("Platform"));
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(EngineError::NotAMember.error_code(), "NOT_A_MEMBER");
        assert_eq!(
            EngineError::Store(StoreError::Canceled).error_code(),
            "INTERNAL_ERROR"
        );
    }
}
