//! Request principal
//!
//! The engine never reads identity out of ambient context. Every operation
//! takes an explicit [`RequestPrincipal`] describing the already
//! authenticated actor: their coarse platform role, their user id (absence
//! is a valid, checked state), the organizations their session may touch,
//! and the single organization the session is currently bound to for
//! team-scoped operations.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Coarse-grained platform role carried by a session.
///
/// This is deliberately not the per-organization privilege: it gates only
/// platform-level operations (currently, organization creation).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum PlatformRole {
    /// Regular authenticated user
    User,

    /// Platform administrator
    Admin,
}

impl PlatformRole {
    /// Parse role from string representation.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "user" => Some(Self::User),
            "admin" => Some(Self::Admin),
            _ => None,
        }
    }

    /// Get string representation of the role.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Admin => "admin",
        }
    }
}

impl Default for PlatformRole {
    fn default() -> Self {
        Self::User
    }
}

/// The authenticated actor behind an engine operation.
///
/// # Examples
///
/// ```
/// use uuid::Uuid;
/// use tenancy_org::{PlatformRole, RequestPrincipal};
///
/// let user_id = Uuid::now_v7();
/// let org_id = Uuid::now_v7();
/// let principal = RequestPrincipal::new(PlatformRole::User, Some(user_id))
///     .with_organizations(vec![org_id]);
/// assert!(principal.can_access_organization(org_id));
/// assert!(!principal.can_access_organization(Uuid::now_v7()));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RequestPrincipal {
    /// Coarse platform role
    pub role: PlatformRole,

    /// The acting user, when the session carries one
    pub user_id: Option<Uuid>,

    /// Organizations this session is allowed to act on
    #[serde(default)]
    pub organization_ids: Vec<Uuid>,

    /// The single organization the session is bound to for team operations
    pub current_organization_id: Option<Uuid>,
}

impl RequestPrincipal {
    /// Creates a principal with no organization scope.
    pub fn new(role: PlatformRole, user_id: Option<Uuid>) -> Self {
        Self {
            role,
            user_id,
            organization_ids: Vec::new(),
            current_organization_id: None,
        }
    }

    /// Set the accessible organization ids.
    pub fn with_organizations(mut self, organization_ids: Vec<Uuid>) -> Self {
        self.organization_ids = organization_ids;
        self
    }

    /// Bind the session to a current organization.
    pub fn with_current_organization(mut self, organization_id: Uuid) -> Self {
        self.current_organization_id = Some(organization_id);
        self
    }

    /// Check whether this session may act on an organization.
    pub fn can_access_organization(&self, organization_id: Uuid) -> bool {
        self.organization_ids.contains(&organization_id)
    }

    /// Check whether this principal is the given user.
    ///
    /// False when the session carries no user id.
    pub fn is_user(&self, user_id: Uuid) -> bool {
        self.user_id == Some(user_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_platform_role_parse() {
        assert_eq!(PlatformRole::parse("admin"), Some(PlatformRole::Admin));
        assert_eq!(PlatformRole::parse("USER"), Some(PlatformRole::User));
        assert_eq!(PlatformRole::parse("root"), None);
    }

    #[test]
    fn test_organization_scope() {
        let org_a = Uuid::now_v7();
        let org_b = Uuid::now_v7();
        let principal = RequestPrincipal::new(PlatformRole::User, Some(Uuid::now_v7()))
            .with_organizations(vec![org_a]);

        assert!(principal.can_access_organization(org_a));
        assert!(!principal.can_access_organization(org_b));
    }

    #[test]
    fn test_is_user_without_identity() {
        let principal = RequestPrincipal::new(PlatformRole::User, None);
        assert!(!principal.is_user(Uuid::now_v7()));
    }
}
