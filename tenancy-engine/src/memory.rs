//! In-memory store implementation
//!
//! This is suitable for single-process use and testing. Transactions run
//! against a cloned snapshot of the state and copy back on commit, so a
//! block that returns `Err` really does leave nothing behind; the
//! atomicity tests rely on that.
//!
//! The outer state lock is held for the duration of a transaction, which
//! serializes them; the row-level uniqueness checks in the transactional
//! views play the part of the persistence-layer constraint backstop.

use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use futures::future::BoxFuture;
use tokio::sync::Mutex;
use uuid::Uuid;

use tenancy_org::{
    AudienceType, DeliveryStatus, Organization, OrganizationInvitation,
    OrganizationMembershipRequest, Privilege, RequestStatus, ResourceAudiencePolicy, Team,
    TeamMembership, UserRecord,
};

use crate::store::{
    InvitationStore, MembershipRequestStore, OrgTxBlock, OrganizationStore, OrganizationTxStore,
    PolicyStore, StoreError, StoreResult, TeamStore, TeamTxBlock, TeamTxStore, UnitOfWork,
    UserDirectory,
};

/// Store statistics.
#[derive(Debug, Clone, Default)]
pub struct StoreStats {
    /// Mutations performed outside a transaction
    pub direct_writes: u64,
    /// Committed transactions
    pub tx_commits: u64,
    /// Rolled-back transactions
    pub tx_rollbacks: u64,
}

#[derive(Debug, Clone, Default)]
struct MemoryState {
    organizations: Vec<Organization>,
    policies: Vec<ResourceAudiencePolicy>,
    invitations: Vec<OrganizationInvitation>,
    requests: Vec<OrganizationMembershipRequest>,
    teams: Vec<Team>,
    users: Vec<UserRecord>,
}

/// In-memory tenancy store.
///
/// # Examples
///
/// ```rust,no_run
/// use tenancy_engine::memory::MemoryStore;
/// use tenancy_org::UserRecord;
/// use uuid::Uuid;
///
/// # async fn example() {
/// let store = MemoryStore::new();
/// store
///     .add_user(UserRecord::new(Uuid::now_v7(), "a@example.com"))
///     .await;
/// # }
/// ```
pub struct MemoryStore {
    state: Mutex<MemoryState>,
    direct_writes: AtomicU64,
    tx_commits: AtomicU64,
    tx_rollbacks: AtomicU64,
    /// Remaining tx writes before an injected failure; -1 disables.
    fail_after_tx_writes: Arc<AtomicI64>,
}

impl std::fmt::Debug for MemoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryStore")
            .field("direct_writes", &self.direct_writes.load(Ordering::Relaxed))
            .field("tx_commits", &self.tx_commits.load(Ordering::Relaxed))
            .finish()
    }
}

impl MemoryStore {
    /// Create an empty in-memory store.
    pub fn new() -> Self {
        Self {
            state: Mutex::new(MemoryState::default()),
            direct_writes: AtomicU64::new(0),
            tx_commits: AtomicU64::new(0),
            tx_rollbacks: AtomicU64::new(0),
            fail_after_tx_writes: Arc::new(AtomicI64::new(-1)),
        }
    }

    /// Get store stats.
    pub fn stats(&self) -> StoreStats {
        StoreStats {
            direct_writes: self.direct_writes.load(Ordering::Relaxed),
            tx_commits: self.tx_commits.load(Ordering::Relaxed),
            tx_rollbacks: self.tx_rollbacks.load(Ordering::Relaxed),
        }
    }

    /// Make the (n+1)th transactional write fail with an injected
    /// infrastructure error. Single-shot; used to exercise rollback paths.
    pub fn fail_after_tx_writes(&self, n: i64) {
        self.fail_after_tx_writes.store(n, Ordering::SeqCst);
    }

    // -- seeding helpers ----------------------------------------------------

    /// Seed a directory user.
    pub async fn add_user(&self, user: UserRecord) {
        self.state.lock().await.users.push(user);
    }

    /// Seed an organization row.
    pub async fn add_organization(&self, organization: Organization) {
        self.state.lock().await.organizations.push(organization);
    }

    /// Seed a policy row.
    pub async fn add_policy(&self, policy: ResourceAudiencePolicy) {
        self.state.lock().await.policies.push(policy);
    }

    /// Seed an invitation row.
    pub async fn add_invitation(&self, invitation: OrganizationInvitation) {
        self.state.lock().await.invitations.push(invitation);
    }

    /// Seed a membership request.
    pub async fn add_request(&self, request: OrganizationMembershipRequest) {
        self.state.lock().await.requests.push(request);
    }

    /// Seed a team row.
    pub async fn add_team(&self, team: Team) {
        self.state.lock().await.teams.push(team);
    }

    // -- inspection helpers -------------------------------------------------

    /// Number of organization rows.
    pub async fn organization_count(&self) -> usize {
        self.state.lock().await.organizations.len()
    }

    /// Number of policy rows.
    pub async fn policy_count(&self) -> usize {
        self.state.lock().await.policies.len()
    }

    /// Number of invitation rows.
    pub async fn invitation_count(&self) -> usize {
        self.state.lock().await.invitations.len()
    }

    /// Fetch a membership request by id.
    pub async fn get_request(&self, request_id: Uuid) -> Option<OrganizationMembershipRequest> {
        self.state
            .lock()
            .await
            .requests
            .iter()
            .find(|r| r.id == request_id)
            .cloned()
    }

    /// Fetch an invitation by id.
    pub async fn get_invitation(&self, invitation_id: Uuid) -> Option<OrganizationInvitation> {
        self.state
            .lock()
            .await
            .invitations
            .iter()
            .find(|i| i.id == invitation_id)
            .cloned()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Check the failure-injection gate before a transactional write.
fn check_write_gate(gate: &AtomicI64) -> StoreResult<()> {
    if gate.load(Ordering::SeqCst) < 0 {
        return Ok(());
    }
    if gate.fetch_sub(1, Ordering::SeqCst) == 0 {
        return Err(StoreError::Unavailable("injected write failure".to_string()));
    }
    Ok(())
}

// ============================================================================
// Non-transactional reads and single-row writes
// ============================================================================

#[async_trait]
impl PolicyStore for MemoryStore {
    async fn policies_for_resource(
        &self,
        resource_id: Uuid,
    ) -> StoreResult<Vec<ResourceAudiencePolicy>> {
        let state = self.state.lock().await;
        Ok(state
            .policies
            .iter()
            .filter(|p| p.resource_id == resource_id)
            .cloned()
            .collect())
    }

    async fn find_policy(
        &self,
        resource_id: Uuid,
        audience_type: AudienceType,
        audience_id: Uuid,
    ) -> StoreResult<Option<ResourceAudiencePolicy>> {
        let state = self.state.lock().await;
        Ok(state
            .policies
            .iter()
            .find(|p| p.resource_id == resource_id && p.matches_audience(audience_type, audience_id))
            .cloned())
    }

    async fn update_policy_privilege(
        &self,
        policy_id: Uuid,
        privilege: Privilege,
    ) -> StoreResult<ResourceAudiencePolicy> {
        let mut state = self.state.lock().await;
        let policy = state
            .policies
            .iter_mut()
            .find(|p| p.id == policy_id)
            .ok_or_else(|| StoreError::Unavailable(format!("no such policy: {policy_id}")))?;
        policy.privilege = privilege;
        policy.updated_at = Utc::now();
        self.direct_writes.fetch_add(1, Ordering::Relaxed);
        Ok(policy.clone())
    }

    async fn delete_policy(&self, policy_id: Uuid) -> StoreResult<()> {
        let mut state = self.state.lock().await;
        let before = state.policies.len();
        state.policies.retain(|p| p.id != policy_id);
        if state.policies.len() == before {
            return Err(StoreError::Unavailable(format!("no such policy: {policy_id}")));
        }
        self.direct_writes.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}

#[async_trait]
impl UserDirectory for MemoryStore {
    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<UserRecord>> {
        let state = self.state.lock().await;
        Ok(state.users.iter().find(|u| u.email == email).cloned())
    }

    async fn get_user(&self, user_id: Uuid) -> StoreResult<Option<UserRecord>> {
        let state = self.state.lock().await;
        Ok(state.users.iter().find(|u| u.id == user_id).cloned())
    }
}

#[async_trait]
impl InvitationStore for MemoryStore {
    async fn invitations_for_organization(
        &self,
        organization_id: Uuid,
    ) -> StoreResult<Vec<OrganizationInvitation>> {
        let state = self.state.lock().await;
        Ok(state
            .invitations
            .iter()
            .filter(|i| i.organization_id == organization_id)
            .cloned()
            .collect())
    }

    async fn set_delivery_status(
        &self,
        invitation_id: Uuid,
        status: DeliveryStatus,
    ) -> StoreResult<()> {
        let mut state = self.state.lock().await;
        let invitation = state
            .invitations
            .iter_mut()
            .find(|i| i.id == invitation_id)
            .ok_or_else(|| StoreError::Unavailable(format!("no such invitation: {invitation_id}")))?;
        invitation.delivery = status;
        self.direct_writes.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}

#[async_trait]
impl MembershipRequestStore for MemoryStore {
    async fn pending_requests_for_organization(
        &self,
        organization_id: Uuid,
    ) -> StoreResult<Vec<OrganizationMembershipRequest>> {
        let state = self.state.lock().await;
        Ok(state
            .requests
            .iter()
            .filter(|r| r.organization_id == organization_id && r.is_pending())
            .cloned()
            .collect())
    }

    async fn all_pending_requests(&self) -> StoreResult<Vec<OrganizationMembershipRequest>> {
        let state = self.state.lock().await;
        Ok(state.requests.iter().filter(|r| r.is_pending()).cloned().collect())
    }

    async fn find_pending_request(
        &self,
        organization_id: Uuid,
        user_id: Uuid,
    ) -> StoreResult<Option<OrganizationMembershipRequest>> {
        let state = self.state.lock().await;
        Ok(state
            .requests
            .iter()
            .find(|r| r.organization_id == organization_id && r.user_id == user_id && r.is_pending())
            .cloned())
    }
}

#[async_trait]
impl OrganizationStore for MemoryStore {
    async fn get_organization(&self, organization_id: Uuid) -> StoreResult<Option<Organization>> {
        let state = self.state.lock().await;
        Ok(state.organizations.iter().find(|o| o.id == organization_id).cloned())
    }
}

#[async_trait]
impl TeamStore for MemoryStore {
    async fn get_team(&self, team_id: Uuid) -> StoreResult<Option<Team>> {
        let state = self.state.lock().await;
        Ok(state.teams.iter().find(|t| t.id == team_id).cloned())
    }

    async fn teams_for_organization(&self, organization_id: Uuid) -> StoreResult<Vec<Team>> {
        let state = self.state.lock().await;
        Ok(state
            .teams
            .iter()
            .filter(|t| t.organization_id == organization_id)
            .cloned()
            .collect())
    }
}

// ============================================================================
// Transactional views
// ============================================================================

/// Organization-scoped transactional view over a cloned snapshot.
pub struct MemoryOrgTx {
    pending: std::sync::Mutex<MemoryState>,
    gate: Arc<AtomicI64>,
}

impl MemoryOrgTx {
    fn pending(&self) -> std::sync::MutexGuard<'_, MemoryState> {
        self.pending.lock().unwrap_or_else(|p| p.into_inner())
    }
}

#[async_trait]
impl OrganizationTxStore for MemoryOrgTx {
    async fn insert_organization(&self, organization: Organization) -> StoreResult<Organization> {
        check_write_gate(&self.gate)?;
        self.pending().organizations.push(organization.clone());
        Ok(organization)
    }

    async fn policies_for_resource(
        &self,
        resource_id: Uuid,
    ) -> StoreResult<Vec<ResourceAudiencePolicy>> {
        Ok(self
            .pending()
            .policies
            .iter()
            .filter(|p| p.resource_id == resource_id)
            .cloned()
            .collect())
    }

    async fn insert_policy(
        &self,
        policy: ResourceAudiencePolicy,
    ) -> StoreResult<ResourceAudiencePolicy> {
        check_write_gate(&self.gate)?;
        let mut pending = self.pending();
        let duplicate = pending.policies.iter().any(|p| {
            p.resource_id == policy.resource_id
                && p.matches_audience(policy.audience_type, policy.audience_id)
        });
        if duplicate {
            return Err(StoreError::Constraint(format!(
                "policy already exists for audience {}",
                policy.audience_id
            )));
        }
        pending.policies.push(policy.clone());
        Ok(policy)
    }

    async fn invitations_for_organization(
        &self,
        organization_id: Uuid,
    ) -> StoreResult<Vec<OrganizationInvitation>> {
        Ok(self
            .pending()
            .invitations
            .iter()
            .filter(|i| i.organization_id == organization_id)
            .cloned()
            .collect())
    }

    async fn insert_invitation(
        &self,
        invitation: OrganizationInvitation,
    ) -> StoreResult<OrganizationInvitation> {
        check_write_gate(&self.gate)?;
        let mut pending = self.pending();
        let duplicate = pending
            .invitations
            .iter()
            .any(|i| i.organization_id == invitation.organization_id && i.email == invitation.email);
        if duplicate {
            return Err(StoreError::Constraint(format!(
                "invitation already exists for {}",
                invitation.email
            )));
        }
        pending.invitations.push(invitation.clone());
        Ok(invitation)
    }

    async fn find_pending_request(
        &self,
        organization_id: Uuid,
        user_id: Uuid,
    ) -> StoreResult<Option<OrganizationMembershipRequest>> {
        Ok(self
            .pending()
            .requests
            .iter()
            .find(|r| r.organization_id == organization_id && r.user_id == user_id && r.is_pending())
            .cloned())
    }

    async fn set_request_status(
        &self,
        request_id: Uuid,
        status: RequestStatus,
    ) -> StoreResult<OrganizationMembershipRequest> {
        check_write_gate(&self.gate)?;
        let mut pending = self.pending();
        let request = pending
            .requests
            .iter_mut()
            .find(|r| r.id == request_id)
            .ok_or_else(|| StoreError::Unavailable(format!("no such request: {request_id}")))?;
        request.status = status;
        if status != RequestStatus::Pending {
            request.resolved_at = Some(Utc::now());
        }
        Ok(request.clone())
    }
}

/// Team-scoped transactional view over a cloned snapshot.
pub struct MemoryTeamTx {
    pending: std::sync::Mutex<MemoryState>,
    gate: Arc<AtomicI64>,
}

impl MemoryTeamTx {
    fn pending(&self) -> std::sync::MutexGuard<'_, MemoryState> {
        self.pending.lock().unwrap_or_else(|p| p.into_inner())
    }
}

#[async_trait]
impl TeamTxStore for MemoryTeamTx {
    async fn teams_for_organization(&self, organization_id: Uuid) -> StoreResult<Vec<Team>> {
        Ok(self
            .pending()
            .teams
            .iter()
            .filter(|t| t.organization_id == organization_id)
            .cloned()
            .collect())
    }

    async fn get_team(&self, team_id: Uuid) -> StoreResult<Option<Team>> {
        Ok(self.pending().teams.iter().find(|t| t.id == team_id).cloned())
    }

    async fn insert_team(&self, team: Team) -> StoreResult<Team> {
        check_write_gate(&self.gate)?;
        let mut pending = self.pending();
        let duplicate = pending
            .teams
            .iter()
            .any(|t| t.organization_id == team.organization_id && t.name == team.name);
        if duplicate {
            return Err(StoreError::Constraint(format!(
                "team name already taken: {}",
                team.name
            )));
        }
        pending.teams.push(team.clone());
        Ok(team)
    }

    async fn update_team(&self, team: Team) -> StoreResult<Team> {
        check_write_gate(&self.gate)?;
        let mut pending = self.pending();
        let slot = pending
            .teams
            .iter_mut()
            .find(|t| t.id == team.id)
            .ok_or_else(|| StoreError::Unavailable(format!("no such team: {}", team.id)))?;
        *slot = team.clone();
        Ok(team)
    }

    async fn delete_team(&self, team_id: Uuid) -> StoreResult<()> {
        check_write_gate(&self.gate)?;
        let mut pending = self.pending();
        let before = pending.teams.len();
        pending.teams.retain(|t| t.id != team_id);
        if pending.teams.len() == before {
            return Err(StoreError::Unavailable(format!("no such team: {team_id}")));
        }
        Ok(())
    }

    async fn insert_team_membership(
        &self,
        membership: TeamMembership,
    ) -> StoreResult<TeamMembership> {
        check_write_gate(&self.gate)?;
        let mut pending = self.pending();
        let team = pending
            .teams
            .iter_mut()
            .find(|t| t.id == membership.team_id)
            .ok_or_else(|| {
                StoreError::Unavailable(format!("no such team: {}", membership.team_id))
            })?;
        if team.member_for_user(membership.user_id).is_some() {
            return Err(StoreError::Constraint(format!(
                "user {} already on roster",
                membership.user_id
            )));
        }
        team.members.push(membership.clone());
        team.updated_at = Utc::now();
        Ok(membership)
    }

    async fn delete_team_membership(&self, team_id: Uuid, membership_id: Uuid) -> StoreResult<()> {
        check_write_gate(&self.gate)?;
        let mut pending = self.pending();
        let team = pending
            .teams
            .iter_mut()
            .find(|t| t.id == team_id)
            .ok_or_else(|| StoreError::Unavailable(format!("no such team: {team_id}")))?;
        let before = team.members.len();
        team.members.retain(|m| m.id != membership_id);
        if team.members.len() == before {
            return Err(StoreError::Unavailable(format!(
                "no such membership: {membership_id}"
            )));
        }
        team.updated_at = Utc::now();
        Ok(())
    }
}

impl UnitOfWork for MemoryStore {
    type OrgTx = MemoryOrgTx;
    type TeamTx = MemoryTeamTx;

    fn with_organization_tx<'a, T>(
        &'a self,
        block: OrgTxBlock<'a, Self::OrgTx, T>,
    ) -> BoxFuture<'a, Result<T, crate::error::EngineError>>
    where
        T: Send + 'a,
    {
        Box::pin(async move {
            // Holding the state lock for the whole transaction serializes
            // concurrent units of work.
            let mut state = self.state.lock().await;
            let tx = MemoryOrgTx {
                pending: std::sync::Mutex::new(state.clone()),
                gate: self.fail_after_tx_writes.clone(),
            };
            match block(&tx).await {
                Ok(value) => {
                    *state = tx.pending.into_inner().unwrap_or_else(|p| p.into_inner());
                    self.tx_commits.fetch_add(1, Ordering::Relaxed);
                    Ok(value)
                }
                Err(err) => {
                    self.tx_rollbacks.fetch_add(1, Ordering::Relaxed);
                    Err(err)
                }
            }
        })
    }

    fn with_team_tx<'a, T>(
        &'a self,
        block: TeamTxBlock<'a, Self::TeamTx, T>,
    ) -> BoxFuture<'a, Result<T, crate::error::EngineError>>
    where
        T: Send + 'a,
    {
        Box::pin(async move {
            let mut state = self.state.lock().await;
            let tx = MemoryTeamTx {
                pending: std::sync::Mutex::new(state.clone()),
                gate: self.fail_after_tx_writes.clone(),
            };
            match block(&tx).await {
                Ok(value) => {
                    *state = tx.pending.into_inner().unwrap_or_else(|p| p.into_inner());
                    self.tx_commits.fetch_add(1, Ordering::Relaxed);
                    Ok(value)
                }
                Err(err) => {
                    self.tx_rollbacks.fetch_add(1, Ordering::Relaxed);
                    Err(err)
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EngineError;
    use tenancy_org::OrganizationPrivilege;

    #[tokio::test]
    async fn test_tx_commit_is_visible() {
        let store = MemoryStore::new();
        let org = Organization::new("Acme", Uuid::now_v7());
        let org_id = org.id;

        store
            .with_organization_tx(Box::new(move |tx| {
                Box::pin(async move {
                    tx.insert_organization(org).await?;
                    Ok(())
                })
            }))
            .await
            .unwrap();

        assert!(store.get_organization(org_id).await.unwrap().is_some());
        assert_eq!(store.stats().tx_commits, 1);
    }

    #[tokio::test]
    async fn test_tx_error_rolls_back() {
        let store = MemoryStore::new();
        let org = Organization::new("Acme", Uuid::now_v7());
        let org_id = org.id;

        let result: Result<(), _> = store
            .with_organization_tx(Box::new(move |tx| {
                Box::pin(async move {
                    tx.insert_organization(org).await?;
                    Err(EngineError::AlreadyMember)
                })
            }))
            .await;

        assert!(result.is_err());
        assert!(store.get_organization(org_id).await.unwrap().is_none());
        assert_eq!(store.stats().tx_rollbacks, 1);
    }

    #[tokio::test]
    async fn test_policy_uniqueness_backstop() {
        let store = MemoryStore::new();
        let org_id = Uuid::now_v7();
        let user_id = Uuid::now_v7();

        let result: Result<(), _> = store
            .with_organization_tx(Box::new(move |tx| {
                Box::pin(async move {
                    tx.insert_policy(ResourceAudiencePolicy::organization_user(
                        org_id,
                        user_id,
                        OrganizationPrivilege::Member,
                    ))
                    .await?;
                    let second = tx
                        .insert_policy(ResourceAudiencePolicy::organization_user(
                            org_id,
                            user_id,
                            OrganizationPrivilege::Admin,
                        ))
                        .await;
                    assert!(matches!(second, Err(StoreError::Constraint(_))));
                    Ok(())
                })
            }))
            .await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_injected_failure_fires_once() {
        let store = MemoryStore::new();
        store.fail_after_tx_writes(0);

        let org = Organization::new("Acme", Uuid::now_v7());
        let result: Result<(), _> = store
            .with_organization_tx(Box::new(move |tx| {
                Box::pin(async move {
                    tx.insert_organization(org).await?;
                    Ok(())
                })
            }))
            .await;
        assert!(result.is_err());

        // Gate disarms after firing.
        let org = Organization::new("Acme", Uuid::now_v7());
        let result: Result<(), _> = store
            .with_organization_tx(Box::new(move |tx| {
                Box::pin(async move {
                    tx.insert_organization(org).await?;
                    Ok(())
                })
            }))
            .await;
        assert!(result.is_ok());
    }
}
