//! Membership policy engine
//!
//! Privilege assignment and removal, organization bootstrap, and audience
//! validation. Single-row mutations go straight to the policy store; the
//! one multi-row sequence here (organization + owner policy) runs in the
//! organization unit of work.

use std::sync::Arc;

use uuid::Uuid;

use tenancy_org::{
    AudienceType, Organization, OrganizationPrivilege, Privilege, RequestPrincipal,
    ResourceAudiencePolicy,
};

use crate::error::{EngineError, EngineResult};
use crate::gate;
use crate::notify::TelemetrySink;
use crate::store::{OrganizationTxStore, TenancyStore};

/// Engine for organization-membership policies.
pub struct MembershipPolicyEngine<S> {
    store: Arc<S>,
    telemetry: Arc<dyn TelemetrySink>,
}

impl<S: TenancyStore> MembershipPolicyEngine<S> {
    /// Create the engine with its collaborators.
    pub fn new(store: Arc<S>, telemetry: Arc<dyn TelemetrySink>) -> Self {
        Self { store, telemetry }
    }

    /// Change a member's organization privilege.
    ///
    /// Gate: organization access, self-exclusion, and the privilege must be
    /// organization-scoped. Updating to the privilege the member already
    /// holds is an idempotent no-op that returns the existing policy
    /// without issuing a write, so the operation is safe to retry.
    pub async fn update_privilege(
        &self,
        principal: &RequestPrincipal,
        organization_id: Uuid,
        target_user_id: Uuid,
        privilege: Privilege,
    ) -> EngineResult<ResourceAudiencePolicy> {
        gate::require_organization_access(principal, organization_id)?;
        gate::require_self_exclusion(principal, target_user_id)?;
        let requested = privilege
            .as_organization()
            .ok_or_else(|| EngineError::InvalidPrivilege(privilege.as_str().to_string()))?;

        let policy = self
            .store
            .find_policy(organization_id, AudienceType::User, target_user_id)
            .await
            .map_err(|e| crate::notify::surface_store(&*self.telemetry, "membership.update_privilege", e))?
            .ok_or(EngineError::PolicyNotFound)?;

        if policy.privilege == Privilege::Organization(requested) {
            tracing::debug!(
                organization_id = %organization_id,
                user_id = %target_user_id,
                "privilege unchanged, skipping write"
            );
            return Ok(policy);
        }

        self.store
            .update_policy_privilege(policy.id, Privilege::Organization(requested))
            .await
            .map_err(|e| crate::notify::surface_store(&*self.telemetry, "membership.update_privilege", e))
    }

    /// Remove a member from an organization by deleting their policy.
    ///
    /// Gate: organization access, self-exclusion, and the caller must hold
    /// system-admin privilege in the organization (`NotAMember` when the
    /// caller holds no policy at all).
    pub async fn remove_member(
        &self,
        principal: &RequestPrincipal,
        organization_id: Uuid,
        target_user_id: Uuid,
    ) -> EngineResult<()> {
        gate::require_organization_access(principal, organization_id)?;
        gate::require_self_exclusion(principal, target_user_id)?;
        let caller = gate::require_identity(principal)?;

        let caller_policy = self
            .store
            .find_policy(organization_id, AudienceType::User, caller)
            .await
            .map_err(|e| crate::notify::surface_store(&*self.telemetry, "membership.remove_member", e))?;
        gate::require_system_admin(caller_policy.as_ref())?;

        let target_policy = self
            .store
            .find_policy(organization_id, AudienceType::User, target_user_id)
            .await
            .map_err(|e| crate::notify::surface_store(&*self.telemetry, "membership.remove_member", e))?
            .ok_or(EngineError::PolicyNotFound)?;

        self.store
            .delete_policy(target_policy.id)
            .await
            .map_err(|e| crate::notify::surface_store(&*self.telemetry, "membership.remove_member", e))?;

        tracing::debug!(
            organization_id = %organization_id,
            user_id = %target_user_id,
            "member removed"
        );
        Ok(())
    }

    /// Create an organization with its owner policy, atomically.
    ///
    /// Gate: platform-admin coarse role. The organization row and the
    /// owner's system-admin policy commit together or not at all, so a
    /// brand-new organization always starts with exactly one authoritative
    /// admin.
    pub async fn create_organization(
        &self,
        principal: &RequestPrincipal,
        name: &str,
        description: Option<String>,
        owner_id: Uuid,
    ) -> EngineResult<Organization> {
        gate::require_platform_admin_role(principal)?;
        if name.trim().is_empty() {
            return Err(EngineError::InvalidName("name must not be empty".to_string()));
        }

        let name = name.to_string();
        let result = self
            .store
            .with_organization_tx(Box::new(move |tx| {
                Box::pin(async move {
                    let mut org = Organization::new(name, owner_id);
                    if let Some(description) = description {
                        org = org.with_description(description);
                    }
                    let org = tx.insert_organization(org).await?;
                    tx.insert_policy(ResourceAudiencePolicy::organization_user(
                        org.id,
                        owner_id,
                        OrganizationPrivilege::SystemAdmin,
                    ))
                    .await?;
                    Ok(org)
                })
            }))
            .await;

        result.map_err(|e| {
            crate::notify::report_infrastructure(&*self.telemetry, "membership.create_organization", e)
        })
    }

    /// Check that an audience is present in an organization's policy set.
    ///
    /// Returns the first structural match; the uniqueness invariant
    /// guarantees at most one exists.
    pub async fn validate_audience_in_organization(
        &self,
        organization_id: Uuid,
        audience_type: AudienceType,
        audience_id: Uuid,
    ) -> EngineResult<ResourceAudiencePolicy> {
        let policies = self
            .store
            .policies_for_resource(organization_id)
            .await
            .map_err(|e| crate::notify::surface_store(&*self.telemetry, "membership.validate_audience", e))?;

        policies
            .into_iter()
            .find(|p| p.matches_audience(audience_type, audience_id))
            .ok_or(EngineError::AudienceNotFound)
    }
}
