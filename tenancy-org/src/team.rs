//! Team domain models
//!
//! Teams are organization-scoped sub-groups. A team roster may only contain
//! users who already hold a membership policy in the same organization; the
//! engine checks that precondition before every roster insert.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Maximum length of a team name, in characters.
pub const MAX_TEAM_NAME_LEN: usize = 24;

/// Maximum length of a team description, in characters.
pub const MAX_TEAM_DESCRIPTION_LEN: usize = 64;

/// An organization-scoped sub-group of existing members.
///
/// Team names are unique within an organization (exact, case-sensitive
/// match), checked transactionally at creation. The metadata blob holds
/// presentation attributes the engine does not interpret.
///
/// # Examples
///
/// ```
/// use uuid::Uuid;
/// use tenancy_org::Team;
///
/// let org_id = Uuid::now_v7();
/// let creator = Uuid::now_v7();
/// let team = Team::new(org_id, "Platform", None, "#1f6feb", creator);
/// assert_eq!(team.name, "Platform");
/// assert!(team.members.is_empty());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Team {
    /// Unique team ID
    pub id: Uuid,

    /// The organization this team belongs to
    pub organization_id: Uuid,

    /// Team name (unique within the organization, ≤ 24 chars)
    pub name: String,

    /// Optional description (≤ 64 chars)
    pub description: Option<String>,

    /// Display color as a hex code (`#RGB` or `#RRGGBB`)
    pub color: String,

    /// Who created the team
    pub created_by: Uuid,

    /// Opaque presentation attributes
    #[serde(default)]
    pub metadata: serde_json::Value,

    /// Current roster
    #[serde(default)]
    pub members: Vec<TeamMembership>,

    /// When the team was created
    pub created_at: DateTime<Utc>,

    /// When the team was last updated
    pub updated_at: DateTime<Utc>,
}

impl Team {
    /// Creates a new team with an empty roster.
    ///
    /// Field validation (name/description length, color syntax) is the
    /// engine's responsibility and happens before construction.
    pub fn new(
        organization_id: Uuid,
        name: impl Into<String>,
        description: Option<String>,
        color: impl Into<String>,
        created_by: Uuid,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            organization_id,
            name: name.into(),
            description,
            color: color.into(),
            created_by,
            metadata: serde_json::Value::Null,
            members: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Find the roster entry for a user, if present.
    pub fn member_for_user(&self, user_id: Uuid) -> Option<&TeamMembership> {
        self.members.iter().find(|m| m.user_id == user_id)
    }

    /// Find a roster entry by membership ID, if present.
    pub fn membership_by_id(&self, membership_id: Uuid) -> Option<&TeamMembership> {
        self.members.iter().find(|m| m.id == membership_id)
    }

    /// Check whether a hex color code is syntactically valid.
    ///
    /// Accepts `#RGB` and `#RRGGBB`.
    ///
    /// # Examples
    ///
    /// ```
    /// use tenancy_org::Team;
    ///
    /// assert!(Team::is_valid_color("#1f6feb"));
    /// assert!(Team::is_valid_color("#fff"));
    /// assert!(!Team::is_valid_color("1f6feb"));
    /// assert!(!Team::is_valid_color("#12345g"));
    /// ```
    pub fn is_valid_color(color: &str) -> bool {
        let Some(digits) = color.strip_prefix('#') else {
            return false;
        };
        (digits.len() == 3 || digits.len() == 6) && digits.chars().all(|c| c.is_ascii_hexdigit())
    }
}

/// A roster entry linking a team to an organization member.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TeamMembership {
    /// Unique membership ID
    pub id: Uuid,

    /// Team ID
    pub team_id: Uuid,

    /// User ID (must hold an organization policy in the team's organization)
    pub user_id: Uuid,

    /// Who added this user (if applicable)
    pub added_by: Option<Uuid>,

    /// When the user was added
    pub added_at: DateTime<Utc>,
}

impl TeamMembership {
    /// Creates a new roster entry.
    pub fn new(team_id: Uuid, user_id: Uuid) -> Self {
        Self {
            id: Uuid::now_v7(),
            team_id,
            user_id,
            added_by: None,
            added_at: Utc::now(),
        }
    }

    /// Set who added this user to the team.
    pub fn with_added_by(mut self, adder_id: Uuid) -> Self {
        self.added_by = Some(adder_id);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_team_creation() {
        let org_id = Uuid::now_v7();
        let creator = Uuid::now_v7();
        let team = Team::new(org_id, "Platform", Some("Infra group".to_string()), "#1f6feb", creator);

        assert_eq!(team.organization_id, org_id);
        assert_eq!(team.created_by, creator);
        assert_eq!(team.description.as_deref(), Some("Infra group"));
        assert!(team.members.is_empty());
    }

    #[test]
    fn test_roster_lookup() {
        let mut team = Team::new(Uuid::now_v7(), "Platform", None, "#fff", Uuid::now_v7());
        let user_id = Uuid::now_v7();
        let membership = TeamMembership::new(team.id, user_id);
        let membership_id = membership.id;
        team.members.push(membership);

        assert!(team.member_for_user(user_id).is_some());
        assert!(team.member_for_user(Uuid::now_v7()).is_none());
        assert!(team.membership_by_id(membership_id).is_some());
        assert!(team.membership_by_id(Uuid::now_v7()).is_none());
    }

    #[test]
    fn test_color_validation() {
        assert!(Team::is_valid_color("#1f6feb"));
        assert!(Team::is_valid_color("#FFF"));
        assert!(!Team::is_valid_color("#ffff"));
        assert!(!Team::is_valid_color("blue"));
        assert!(!Team::is_valid_color("#12345g"));
        assert!(!Team::is_valid_color(""));
    }

    #[test]
    fn test_membership_with_added_by() {
        let adder = Uuid::now_v7();
        let membership = TeamMembership::new(Uuid::now_v7(), Uuid::now_v7()).with_added_by(adder);
        assert_eq!(membership.added_by, Some(adder));
    }
}
