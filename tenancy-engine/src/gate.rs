//! Authorization gate
//!
//! Pure predicates over the request principal and (for privilege checks)
//! the caller's own resolved policy. No side effects beyond the returned
//! error; every mutating workflow runs the relevant checks here before it
//! opens a transaction or touches any row.

use uuid::Uuid;

use tenancy_org::{PlatformRole, RequestPrincipal, ResourceAudiencePolicy};

use crate::error::{EngineError, EngineResult};

/// Require that the session may act on the organization.
pub fn require_organization_access(
    principal: &RequestPrincipal,
    organization_id: Uuid,
) -> EngineResult<()> {
    if principal.can_access_organization(organization_id) {
        Ok(())
    } else {
        Err(EngineError::Forbidden(
            "organization is not in the session scope".to_string(),
        ))
    }
}

/// Require an authenticated user and return their id.
pub fn require_identity(principal: &RequestPrincipal) -> EngineResult<Uuid> {
    principal.user_id.ok_or(EngineError::NoIdentity)
}

/// Require that the caller is not targeting their own membership record.
///
/// Compares user ids by value. An actor must not alter or remove their own
/// membership through the role-change/removal paths.
pub fn require_self_exclusion(
    principal: &RequestPrincipal,
    target_user_id: Uuid,
) -> EngineResult<()> {
    let caller = require_identity(principal)?;
    if caller == target_user_id {
        Err(EngineError::Forbidden(
            "cannot change your own membership".to_string(),
        ))
    } else {
        Ok(())
    }
}

/// Require that the caller's resolved policy carries the top privilege tier.
///
/// `NotAMember` when the caller has no policy at all, which is distinct
/// from holding one with insufficient privilege.
pub fn require_system_admin(
    policy: Option<&ResourceAudiencePolicy>,
) -> EngineResult<&ResourceAudiencePolicy> {
    let policy = policy.ok_or(EngineError::NotAMember)?;
    if policy.privilege.is_system_admin() {
        Ok(policy)
    } else {
        Err(EngineError::Forbidden(
            "system admin privilege required".to_string(),
        ))
    }
}

/// Require the platform-admin coarse role.
///
/// Used only by organization creation.
pub fn require_platform_admin_role(principal: &RequestPrincipal) -> EngineResult<()> {
    if principal.role == PlatformRole::Admin {
        Ok(())
    } else {
        Err(EngineError::Forbidden(
            "platform admin role required".to_string(),
        ))
    }
}

/// Require that the session is bound to the given organization and return
/// the caller's user id.
///
/// Team operations are always scoped to the single organization bound to
/// the session, never to the broader accessible-organization list.
pub fn require_bound_organization(
    principal: &RequestPrincipal,
    organization_id: Uuid,
) -> EngineResult<Uuid> {
    let caller = require_identity(principal)?;
    if principal.current_organization_id == Some(organization_id) {
        Ok(caller)
    } else {
        Err(EngineError::Forbidden(
            "session is not bound to this organization".to_string(),
        ))
    }
}
