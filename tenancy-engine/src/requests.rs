//! Membership-request workflow
//!
//! Lists pending self-service join requests and approves them. Approval is
//! the one transition this engine performs (pending → approved) and it is
//! atomic with the creation of the new member's policy: both writes commit
//! together or neither does.

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use tenancy_org::{
    AudienceType, OrganizationMembershipRequest, OrganizationPrivilege, RequestPrincipal,
    RequestStatus, ResourceAudiencePolicy,
};

use crate::error::{constraint_as, EngineError, EngineResult};
use crate::gate;
use crate::notify::TelemetrySink;
use crate::store::{OrganizationTxStore, TenancyStore};

/// Narrow seam used by the invitation workflow's post-commit phase.
///
/// Keeps the two state machines independently testable: the invitation
/// side only knows "approve the pending request for this email, if there
/// is one".
#[async_trait]
pub trait PendingRequestApprover: Send + Sync {
    /// Approve the pending request matching an email, if any.
    ///
    /// Returns `true` when a request was found and approved, `false` when
    /// the email resolves to no user or the user has no pending request.
    async fn approve_pending_for_email(
        &self,
        principal: &RequestPrincipal,
        organization_id: Uuid,
        email: &str,
    ) -> EngineResult<bool>;
}

/// Reported to telemetry when the caller's policy is not unique, which the
/// policy invariant says should never happen.
#[derive(Debug, Error)]
#[error("data integrity: {count} policies match user {user_id} in organization {organization_id}")]
struct DuplicateCallerPolicy {
    count: usize,
    user_id: Uuid,
    organization_id: Uuid,
}

/// Workflow over organization membership requests.
pub struct MembershipRequestWorkflow<S> {
    store: Arc<S>,
    telemetry: Arc<dyn TelemetrySink>,
}

impl<S: TenancyStore> MembershipRequestWorkflow<S> {
    /// Create the workflow with its collaborators.
    pub fn new(store: Arc<S>, telemetry: Arc<dyn TelemetrySink>) -> Self {
        Self { store, telemetry }
    }

    /// Pending requests for one organization.
    pub async fn list_pending_by_organization(
        &self,
        organization_id: Uuid,
    ) -> EngineResult<Vec<OrganizationMembershipRequest>> {
        self.store
            .pending_requests_for_organization(organization_id)
            .await
            .map_err(|e| crate::notify::surface_store(&*self.telemetry, "requests.list_pending", e))
    }

    /// Pending requests across all organizations.
    pub async fn list_all_pending(&self) -> EngineResult<Vec<OrganizationMembershipRequest>> {
        self.store
            .all_pending_requests()
            .await
            .map_err(|e| crate::notify::surface_store(&*self.telemetry, "requests.list_all_pending", e))
    }

    /// Approve a pending membership request.
    ///
    /// The caller must be a system admin of the organization, resolved from
    /// the transactional policy snapshot. On success the requester gains a
    /// base member policy and the request row flips to approved; both
    /// writes commit together or neither does.
    pub async fn approve(
        &self,
        principal: &RequestPrincipal,
        organization_id: Uuid,
        requester_id: Uuid,
    ) -> EngineResult<ResourceAudiencePolicy> {
        let caller = gate::require_identity(principal)?;
        let telemetry = Arc::clone(&self.telemetry);

        let result = self
            .store
            .with_organization_tx(Box::new(move |tx| {
                Box::pin(async move {
                    let policies = tx.policies_for_resource(organization_id).await?;

                    let caller_matches: Vec<&ResourceAudiencePolicy> = policies
                        .iter()
                        .filter(|p| p.matches_audience(AudienceType::User, caller))
                        .collect();
                    if caller_matches.len() > 1 {
                        // Should be impossible under the uniqueness
                        // invariant; last match wins but the state is bad.
                        telemetry.report(
                            "requests.approve",
                            &DuplicateCallerPolicy {
                                count: caller_matches.len(),
                                user_id: caller,
                                organization_id,
                            },
                        );
                    }
                    gate::require_system_admin(caller_matches.last().copied())?;

                    if policies
                        .iter()
                        .any(|p| p.matches_audience(AudienceType::User, requester_id))
                    {
                        return Err(EngineError::AlreadyMember);
                    }

                    let request = tx
                        .find_pending_request(organization_id, requester_id)
                        .await?
                        .ok_or(EngineError::RequestNotFound)?;

                    let policy = tx
                        .insert_policy(ResourceAudiencePolicy::organization_user(
                            organization_id,
                            requester_id,
                            OrganizationPrivilege::Member,
                        ))
                        .await
                        .map_err(|e| constraint_as(e, EngineError::AlreadyMember))?;

                    tx.set_request_status(request.id, RequestStatus::Approved).await?;
                    Ok(policy)
                })
            }))
            .await;

        match result {
            Ok(policy) => {
                tracing::debug!(
                    organization_id = %organization_id,
                    user_id = %requester_id,
                    "membership request approved"
                );
                Ok(policy)
            }
            Err(e) => Err(crate::notify::report_infrastructure(
                &*self.telemetry,
                "requests.approve",
                e,
            )),
        }
    }
}

#[async_trait]
impl<S: TenancyStore> PendingRequestApprover for MembershipRequestWorkflow<S> {
    async fn approve_pending_for_email(
        &self,
        principal: &RequestPrincipal,
        organization_id: Uuid,
        email: &str,
    ) -> EngineResult<bool> {
        let Some(user) = self
            .store
            .find_user_by_email(email)
            .await
            .map_err(|e| crate::notify::surface_store(&*self.telemetry, "requests.approve_by_email", e))?
        else {
            return Ok(false);
        };

        let pending = self
            .store
            .find_pending_request(organization_id, user.id)
            .await
            .map_err(|e| crate::notify::surface_store(&*self.telemetry, "requests.approve_by_email", e))?;
        if pending.is_none() {
            return Ok(false);
        }

        self.approve(principal, organization_id, user.id).await?;
        Ok(true)
    }
}
