//! Store contracts
//!
//! The engine owns no persistent state; it consumes capability-scoped store
//! traits and two unit-of-work entry points. Each workflow depends only on
//! the operations it needs, and the full composition is expressed by the
//! [`TenancyStore`] supertrait that the top level wires in.
//!
//! Multi-row invariants rely entirely on the unit-of-work: a block runs
//! against a transactional view, and everything performed through that view
//! commits together or not at all. The pre-check-then-insert pattern inside
//! the blocks is optimistic; the persistence layer is expected to carry
//! uniqueness constraints as the last line of defense under races, surfaced
//! here as [`StoreError::Constraint`].

use async_trait::async_trait;
use futures::future::BoxFuture;
use thiserror::Error;
use uuid::Uuid;

use tenancy_org::{
    AudienceType, DeliveryStatus, Organization, OrganizationInvitation,
    OrganizationMembershipRequest, Privilege, RequestStatus, ResourceAudiencePolicy, Team,
    TeamMembership, UserRecord,
};

use crate::error::EngineError;

/// Store error types.
///
/// Cancellation of the caller's unit of work shows up as [`Canceled`]
/// from whatever store call observed it; the engine forwards it without
/// transformation and performs no further work.
///
/// [`Canceled`]: StoreError::Canceled
#[derive(Debug, Error)]
pub enum StoreError {
    /// The store could not be reached or failed internally
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// A row-level constraint rejected the write
    #[error("constraint violation: {0}")]
    Constraint(String),

    /// The caller's unit of work was canceled
    #[error("operation canceled")]
    Canceled,
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Read/write access to policy rows outside a transaction.
///
/// Single-row mutations with no multi-row invariant (privilege update,
/// member removal) go through here directly.
#[async_trait]
pub trait PolicyStore: Send + Sync {
    /// All policies attached to a resource.
    async fn policies_for_resource(&self, resource_id: Uuid)
        -> StoreResult<Vec<ResourceAudiencePolicy>>;

    /// The policy for one audience on one resource, if any.
    async fn find_policy(
        &self,
        resource_id: Uuid,
        audience_type: AudienceType,
        audience_id: Uuid,
    ) -> StoreResult<Option<ResourceAudiencePolicy>>;

    /// Update the privilege value of an existing policy.
    async fn update_policy_privilege(
        &self,
        policy_id: Uuid,
        privilege: Privilege,
    ) -> StoreResult<ResourceAudiencePolicy>;

    /// Delete a policy row.
    async fn delete_policy(&self, policy_id: Uuid) -> StoreResult<()>;
}

/// Lookup into the platform user directory.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Resolve a normalized email to a user, if one exists.
    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<UserRecord>>;

    /// Fetch a user by id.
    async fn get_user(&self, user_id: Uuid) -> StoreResult<Option<UserRecord>>;
}

/// Read access to invitation rows outside a transaction.
#[async_trait]
pub trait InvitationStore: Send + Sync {
    /// Outstanding (unresolved) invitations for an organization.
    async fn invitations_for_organization(
        &self,
        organization_id: Uuid,
    ) -> StoreResult<Vec<OrganizationInvitation>>;

    /// Record the notification outcome on an invitation row.
    ///
    /// Happens outside the issuing transaction; the invitation is already
    /// durable when this is called.
    async fn set_delivery_status(
        &self,
        invitation_id: Uuid,
        status: DeliveryStatus,
    ) -> StoreResult<()>;
}

/// Read access to membership-request rows outside a transaction.
#[async_trait]
pub trait MembershipRequestStore: Send + Sync {
    /// Pending requests for one organization.
    async fn pending_requests_for_organization(
        &self,
        organization_id: Uuid,
    ) -> StoreResult<Vec<OrganizationMembershipRequest>>;

    /// Pending requests across all organizations.
    async fn all_pending_requests(&self) -> StoreResult<Vec<OrganizationMembershipRequest>>;

    /// The pending request of one user in one organization, if any.
    async fn find_pending_request(
        &self,
        organization_id: Uuid,
        user_id: Uuid,
    ) -> StoreResult<Option<OrganizationMembershipRequest>>;
}

/// Read access to organization rows.
#[async_trait]
pub trait OrganizationStore: Send + Sync {
    /// Fetch an organization by id.
    async fn get_organization(&self, organization_id: Uuid) -> StoreResult<Option<Organization>>;
}

/// Read access to team rows outside a transaction.
#[async_trait]
pub trait TeamStore: Send + Sync {
    /// Fetch a team (with roster) by id.
    async fn get_team(&self, team_id: Uuid) -> StoreResult<Option<Team>>;

    /// All teams in an organization.
    async fn teams_for_organization(&self, organization_id: Uuid) -> StoreResult<Vec<Team>>;
}

/// Transactional view for organization-scoped mutations.
///
/// Reads through this view observe a snapshot consistent with the writes
/// the block has already performed; nothing is visible outside until the
/// block returns `Ok` and the unit of work commits.
#[async_trait]
pub trait OrganizationTxStore: Send + Sync {
    /// Insert an organization row.
    async fn insert_organization(&self, organization: Organization) -> StoreResult<Organization>;

    /// All policies attached to a resource, as of this transaction.
    async fn policies_for_resource(&self, resource_id: Uuid)
        -> StoreResult<Vec<ResourceAudiencePolicy>>;

    /// Insert a policy row.
    ///
    /// Fails with [`StoreError::Constraint`] if a policy already exists for
    /// the same (resource, audience type, audience id) tuple.
    async fn insert_policy(
        &self,
        policy: ResourceAudiencePolicy,
    ) -> StoreResult<ResourceAudiencePolicy>;

    /// Outstanding invitations for an organization, as of this transaction.
    async fn invitations_for_organization(
        &self,
        organization_id: Uuid,
    ) -> StoreResult<Vec<OrganizationInvitation>>;

    /// Insert an invitation row.
    ///
    /// Fails with [`StoreError::Constraint`] if an unresolved invitation
    /// already exists for the same (organization, email) pair.
    async fn insert_invitation(
        &self,
        invitation: OrganizationInvitation,
    ) -> StoreResult<OrganizationInvitation>;

    /// The pending request of one user in one organization, if any.
    async fn find_pending_request(
        &self,
        organization_id: Uuid,
        user_id: Uuid,
    ) -> StoreResult<Option<OrganizationMembershipRequest>>;

    /// Move a membership request to a new status.
    async fn set_request_status(
        &self,
        request_id: Uuid,
        status: RequestStatus,
    ) -> StoreResult<OrganizationMembershipRequest>;
}

/// Transactional view for team-scoped mutations.
#[async_trait]
pub trait TeamTxStore: Send + Sync {
    /// All teams in an organization, as of this transaction.
    async fn teams_for_organization(&self, organization_id: Uuid) -> StoreResult<Vec<Team>>;

    /// Fetch a team (with roster) by id, as of this transaction.
    async fn get_team(&self, team_id: Uuid) -> StoreResult<Option<Team>>;

    /// Insert a team row.
    async fn insert_team(&self, team: Team) -> StoreResult<Team>;

    /// Replace a team row (rename and similar single-team updates).
    async fn update_team(&self, team: Team) -> StoreResult<Team>;

    /// Delete a team row and its roster.
    async fn delete_team(&self, team_id: Uuid) -> StoreResult<()>;

    /// Insert a roster entry.
    ///
    /// Fails with [`StoreError::Constraint`] if the user is already on the
    /// team's roster.
    async fn insert_team_membership(&self, membership: TeamMembership)
        -> StoreResult<TeamMembership>;

    /// Delete a roster entry.
    async fn delete_team_membership(&self, team_id: Uuid, membership_id: Uuid) -> StoreResult<()>;
}

/// A block of work to run against an organization transactional view.
pub type OrgTxBlock<'a, Tx, T> =
    Box<dyn for<'t> FnOnce(&'t Tx) -> BoxFuture<'t, Result<T, EngineError>> + Send + 'a>;

/// A block of work to run against a team transactional view.
pub type TeamTxBlock<'a, Tx, T> =
    Box<dyn for<'t> FnOnce(&'t Tx) -> BoxFuture<'t, Result<T, EngineError>> + Send + 'a>;

/// Unit-of-work entry points.
///
/// Each method begins a transactional view, runs the supplied block against
/// it, and commits everything the block performed if it returned `Ok`, or
/// rolls all of it back if it returned `Err`. Domain conflicts detected
/// inside a block abort the same way infrastructure failures do: nothing
/// partial survives.
pub trait UnitOfWork: Send + Sync {
    /// The organization-scoped transactional view type.
    type OrgTx: OrganizationTxStore;

    /// The team-scoped transactional view type.
    type TeamTx: TeamTxStore;

    /// Run a block within an organization-scoped transaction.
    fn with_organization_tx<'a, T>(
        &'a self,
        block: OrgTxBlock<'a, Self::OrgTx, T>,
    ) -> BoxFuture<'a, Result<T, EngineError>>
    where
        T: Send + 'a;

    /// Run a block within a team-scoped transaction.
    fn with_team_tx<'a, T>(
        &'a self,
        block: TeamTxBlock<'a, Self::TeamTx, T>,
    ) -> BoxFuture<'a, Result<T, EngineError>>
    where
        T: Send + 'a;
}

/// The full store composition the engine is wired with at the top level.
pub trait TenancyStore:
    PolicyStore
    + UserDirectory
    + InvitationStore
    + MembershipRequestStore
    + OrganizationStore
    + TeamStore
    + UnitOfWork
    + 'static
{
}

impl<S> TenancyStore for S where
    S: PolicyStore
        + UserDirectory
        + InvitationStore
        + MembershipRequestStore
        + OrganizationStore
        + TeamStore
        + UnitOfWork
        + 'static
{
}
