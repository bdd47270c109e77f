//! Privilege enumerations and policy keying types
//!
//! Privileges are scoped to a resource type: the levels that can be granted
//! on an organization are a distinct set from the levels that can be granted
//! on a team. A policy stores one or the other, never a bare integer.

use serde::{Deserialize, Serialize};

/// The kind of resource a policy is attached to.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ResourceType {
    /// A top-level tenant organization
    Organization,

    /// A sub-group within an organization
    Team,
}

impl ResourceType {
    /// Get string representation of the resource type.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Organization => "organization",
            Self::Team => "team",
        }
    }
}

/// The kind of subject a policy grants access to.
///
/// Both audience kinds are structurally identical at the policy level:
/// a policy row is keyed by (audience type, audience id).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum AudienceType {
    /// An individual user
    User,

    /// A team acting as a group subject
    Team,
}

impl AudienceType {
    /// Get string representation of the audience type.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Team => "team",
        }
    }
}

/// Privilege level within an organization.
///
/// Privileges are hierarchical, with each level inheriting the access of
/// lower levels. The hierarchy is: Member < Admin < SystemAdmin.
///
/// # Examples
///
/// ```
/// use tenancy_org::OrganizationPrivilege;
///
/// let privilege = OrganizationPrivilege::Admin;
/// assert!(!privilege.is_system_admin());
/// assert!(OrganizationPrivilege::SystemAdmin > privilege);
/// ```
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum OrganizationPrivilege {
    /// Baseline membership (read access, participation)
    Member = 1,

    /// Can manage day-to-day organization content
    Admin = 2,

    /// Full organization control including membership management
    SystemAdmin = 3,
}

impl OrganizationPrivilege {
    /// Check if this is the top privilege tier.
    ///
    /// System admins are the only members allowed to remove other members
    /// or approve membership requests.
    pub fn is_system_admin(&self) -> bool {
        *self >= OrganizationPrivilege::SystemAdmin
    }

    /// Parse privilege from string representation.
    ///
    /// # Examples
    ///
    /// ```
    /// use tenancy_org::OrganizationPrivilege;
    ///
    /// assert_eq!(
    ///     OrganizationPrivilege::parse("system_admin"),
    ///     Some(OrganizationPrivilege::SystemAdmin)
    /// );
    /// assert_eq!(OrganizationPrivilege::parse("MEMBER"), Some(OrganizationPrivilege::Member));
    /// assert_eq!(OrganizationPrivilege::parse("owner"), None);
    /// ```
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "member" => Some(Self::Member),
            "admin" => Some(Self::Admin),
            "system_admin" => Some(Self::SystemAdmin),
            _ => None,
        }
    }

    /// Get string representation of the privilege.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Member => "member",
            Self::Admin => "admin",
            Self::SystemAdmin => "system_admin",
        }
    }

    /// Get a human-readable display name for the privilege.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Member => "Member",
            Self::Admin => "Admin",
            Self::SystemAdmin => "System Admin",
        }
    }
}

impl Default for OrganizationPrivilege {
    fn default() -> Self {
        Self::Member
    }
}

/// Privilege level within a team.
///
/// The hierarchy is: Member < Lead.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum TeamPrivilege {
    /// Baseline team membership
    Member = 1,

    /// Can manage the team roster and settings
    Lead = 2,
}

impl TeamPrivilege {
    /// Parse privilege from string representation.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "member" => Some(Self::Member),
            "lead" => Some(Self::Lead),
            _ => None,
        }
    }

    /// Get string representation of the privilege.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Member => "member",
            Self::Lead => "lead",
        }
    }
}

impl Default for TeamPrivilege {
    fn default() -> Self {
        Self::Member
    }
}

/// A privilege tagged with the resource type it applies to.
///
/// Policies store this union so that an organization policy can never carry
/// a team-scoped level and vice versa. Callers passing a privilege into a
/// mutating operation are validated against the target resource type before
/// any write happens.
///
/// # Examples
///
/// ```
/// use tenancy_org::{OrganizationPrivilege, Privilege, ResourceType};
///
/// let privilege = Privilege::Organization(OrganizationPrivilege::Member);
/// assert_eq!(privilege.resource_type(), ResourceType::Organization);
/// assert!(privilege.as_organization().is_some());
/// assert!(privilege.as_team().is_none());
/// ```
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Privilege {
    /// An organization-scoped privilege
    Organization(OrganizationPrivilege),

    /// A team-scoped privilege
    Team(TeamPrivilege),
}

impl Privilege {
    /// The resource type this privilege is valid for.
    pub fn resource_type(&self) -> ResourceType {
        match self {
            Self::Organization(_) => ResourceType::Organization,
            Self::Team(_) => ResourceType::Team,
        }
    }

    /// Extract the organization-scoped level, if this is one.
    pub fn as_organization(&self) -> Option<OrganizationPrivilege> {
        match self {
            Self::Organization(p) => Some(*p),
            Self::Team(_) => None,
        }
    }

    /// Extract the team-scoped level, if this is one.
    pub fn as_team(&self) -> Option<TeamPrivilege> {
        match self {
            Self::Team(p) => Some(*p),
            Self::Organization(_) => None,
        }
    }

    /// Check if this is the top organization privilege tier.
    pub fn is_system_admin(&self) -> bool {
        matches!(self, Self::Organization(p) if p.is_system_admin())
    }

    /// Get string representation of the underlying level.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Organization(p) => p.as_str(),
            Self::Team(p) => p.as_str(),
        }
    }
}
