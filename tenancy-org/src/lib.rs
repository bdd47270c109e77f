//! # Tenancy Organization Models
//!
//! This crate provides the domain model for multi-tenant membership and
//! access control: organizations, the policies that grant access to them,
//! invitations, self-service membership requests, and teams.
//!
//! ## Overview
//!
//! The tenancy-org crate defines:
//! - **Organizations**: Top-level tenant entities
//! - **Policies**: (resource, audience, privilege) authorization edges
//! - **Privileges**: Resource-type-scoped access levels
//! - **Invitations**: Outstanding membership offers sent by email
//! - **Membership requests**: Self-service join asks awaiting approval
//! - **Teams**: Organization-scoped sub-groups of existing members
//! - **Principals**: The authenticated actor behind every operation
//!
//! ## Architecture
//!
//! ```text
//! RequestPrincipal
//!   └─ Organization
//!        ├─ ResourceAudiencePolicy (audience: user or team)
//!        ├─ OrganizationInvitation
//!        ├─ OrganizationMembershipRequest
//!        └─ Team
//!              └─ TeamMembership (members must hold an org policy)
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use tenancy_org::{Organization, OrganizationPrivilege, ResourceAudiencePolicy};
//! use uuid::Uuid;
//!
//! let owner_id = Uuid::now_v7();
//! let org = Organization::new("Acme Corp", owner_id);
//!
//! // The owner's policy is what actually grants access.
//! let policy = ResourceAudiencePolicy::organization_user(
//!     org.id,
//!     owner_id,
//!     OrganizationPrivilege::SystemAdmin,
//! );
//! assert!(policy.privilege.is_system_admin());
//! ```
//!
//! ## Integration
//!
//! This crate is consumed by `tenancy-engine`, which layers the
//! authorization gate, workflows, and store contracts on top of these
//! models. The models themselves perform no I/O.

pub mod email;
pub mod invitation;
pub mod organization;
pub mod policy;
pub mod principal;
pub mod privilege;
pub mod request;
pub mod team;
pub mod user;

// Re-export main types for convenience
pub use invitation::{DeliveryStatus, OrganizationInvitation};
pub use organization::Organization;
pub use policy::ResourceAudiencePolicy;
pub use principal::{PlatformRole, RequestPrincipal};
pub use privilege::{AudienceType, OrganizationPrivilege, Privilege, ResourceType, TeamPrivilege};
pub use request::{OrganizationMembershipRequest, RequestStatus};
pub use team::{Team, TeamMembership, MAX_TEAM_DESCRIPTION_LEN, MAX_TEAM_NAME_LEN};
pub use user::UserRecord;
