//! Invitation workflow
//!
//! Per (organization, email) the state machine is:
//! `{none} → invited → {member | invited (duplicate rejected)}`.
//!
//! Issuance is transactional; the post-commit phase (auto-approval of a
//! matching pending request, else the notification email) is best-effort
//! and can never invalidate the committed invitation row.

use std::sync::Arc;

use uuid::Uuid;

use tenancy_org::{
    email, AudienceType, DeliveryStatus, OrganizationInvitation, Privilege, RequestPrincipal,
};

use crate::error::{constraint_as, EngineError, EngineResult};
use crate::gate;
use crate::notify::{InvitationNotifier, TelemetrySink};
use crate::requests::PendingRequestApprover;
use crate::store::{OrganizationTxStore, StoreError, TenancyStore};

/// One entry of a bulk invitation.
#[derive(Debug, Clone)]
pub struct InviteItem {
    /// Raw target email (normalized by the workflow)
    pub email: String,
    /// Requested privilege
    pub privilege: Privilege,
}

/// A per-email failure within a bulk invitation.
#[derive(Debug)]
pub struct BulkInviteFailure {
    /// The raw email the failure applies to
    pub email: String,
    /// Why this item failed
    pub error: EngineError,
}

/// Result of a bulk invitation: partial success is a normal outcome.
#[derive(Debug, Default)]
pub struct BulkInviteOutcome {
    /// Invitations created
    pub invitations: Vec<OrganizationInvitation>,
    /// Per-email failures, in input order
    pub failures: Vec<BulkInviteFailure>,
}

/// Workflow for issuing organization invitations.
pub struct InvitationWorkflow<S, A> {
    store: Arc<S>,
    approver: Arc<A>,
    notifier: Arc<dyn InvitationNotifier>,
    telemetry: Arc<dyn TelemetrySink>,
}

impl<S, A> InvitationWorkflow<S, A>
where
    S: TenancyStore,
    A: PendingRequestApprover,
{
    /// Create the workflow with its collaborators.
    pub fn new(
        store: Arc<S>,
        approver: Arc<A>,
        notifier: Arc<dyn InvitationNotifier>,
        telemetry: Arc<dyn TelemetrySink>,
    ) -> Self {
        Self {
            store,
            approver,
            notifier,
            telemetry,
        }
    }

    /// Invite an email address into an organization.
    ///
    /// Gate: organization access. The duplicate-invitation and
    /// existing-member checks run against the transactional snapshot; the
    /// insert commits before any notification is attempted, so the
    /// invitation row survives a notification failure.
    pub async fn invite_member(
        &self,
        principal: &RequestPrincipal,
        organization_id: Uuid,
        raw_email: &str,
        privilege: Privilege,
    ) -> EngineResult<OrganizationInvitation> {
        gate::require_organization_access(principal, organization_id)?;
        self.invite_gated(principal, organization_id, raw_email, privilege).await
    }

    /// Invite a batch of email addresses.
    ///
    /// The gate runs once at entry. Each item is then processed
    /// independently: one failing email becomes a structured per-email
    /// error and never aborts the remaining items.
    pub async fn bulk_invite(
        &self,
        principal: &RequestPrincipal,
        organization_id: Uuid,
        items: Vec<InviteItem>,
    ) -> EngineResult<BulkInviteOutcome> {
        gate::require_organization_access(principal, organization_id)?;

        let mut outcome = BulkInviteOutcome::default();
        for item in items {
            match self
                .invite_gated(principal, organization_id, &item.email, item.privilege)
                .await
            {
                Ok(invitation) => outcome.invitations.push(invitation),
                Err(error) => outcome.failures.push(BulkInviteFailure {
                    email: item.email,
                    error,
                }),
            }
        }
        Ok(outcome)
    }

    /// Issue one invitation; the caller has already passed the gate.
    async fn invite_gated(
        &self,
        principal: &RequestPrincipal,
        organization_id: Uuid,
        raw_email: &str,
        privilege: Privilege,
    ) -> EngineResult<OrganizationInvitation> {
        let normalized = email::normalize(raw_email);
        if !email::is_valid(&normalized) {
            return Err(EngineError::InvalidEmail(raw_email.to_string()));
        }
        let requested = privilege
            .as_organization()
            .ok_or_else(|| EngineError::InvalidPrivilege(privilege.as_str().to_string()))?;
        let inviter = gate::require_identity(principal)?;

        // Directory lookup is read-only; the membership decision itself is
        // made against the transactional policy snapshot below.
        let existing_user = self
            .store
            .find_user_by_email(&normalized)
            .await
            .map_err(|e| crate::notify::surface_store(&*self.telemetry, "invitation.invite", e))?;

        let tx_email = normalized.clone();
        let result = self
            .store
            .with_organization_tx(Box::new(move |tx| {
                Box::pin(async move {
                    let outstanding = tx.invitations_for_organization(organization_id).await?;
                    if outstanding.iter().any(|i| i.email == tx_email) {
                        return Err(EngineError::DuplicateInvitation(tx_email));
                    }

                    if let Some(user) = existing_user {
                        let policies = tx.policies_for_resource(organization_id).await?;
                        if policies
                            .iter()
                            .any(|p| p.matches_audience(AudienceType::User, user.id))
                        {
                            return Err(EngineError::AlreadyMember);
                        }
                    }

                    let dup_email = tx_email.clone();
                    let invitation =
                        OrganizationInvitation::new(organization_id, tx_email, inviter, requested);
                    tx.insert_invitation(invitation)
                        .await
                        .map_err(|e| constraint_as(e, EngineError::DuplicateInvitation(dup_email)))
                })
            }))
            .await;

        let invitation = result.map_err(|e| {
            crate::notify::report_infrastructure(&*self.telemetry, "invitation.invite", e)
        })?;

        tracing::debug!(
            organization_id = %organization_id,
            invitation_id = %invitation.id,
            "invitation created"
        );

        self.after_commit(principal, &invitation).await;
        Ok(invitation)
    }

    /// Best-effort phase after the invitation row is durable.
    ///
    /// Tries auto-approval through the request-workflow seam first; when
    /// that does not apply, sends the notification email. Failures are
    /// reported to telemetry and otherwise swallowed.
    async fn after_commit(&self, principal: &RequestPrincipal, invitation: &OrganizationInvitation) {
        match self
            .approver
            .approve_pending_for_email(principal, invitation.organization_id, &invitation.email)
            .await
        {
            Ok(true) => {
                tracing::debug!(
                    invitation_id = %invitation.id,
                    "pending membership request auto-approved, skipping notification"
                );
                return;
            }
            Ok(false) => {}
            Err(err) => {
                // The invitee should still get an actionable email.
                self.telemetry.report("invitation.auto_approve", &err);
            }
        }
        self.send_notification(invitation).await;
    }

    async fn send_notification(&self, invitation: &OrganizationInvitation) {
        let organization = match self.store.get_organization(invitation.organization_id).await {
            Ok(Some(organization)) => organization,
            Ok(None) => {
                self.telemetry.report(
                    "invitation.notify",
                    &StoreError::Unavailable(format!(
                        "no such organization: {}",
                        invitation.organization_id
                    )),
                );
                return;
            }
            Err(err) => {
                self.telemetry.report("invitation.notify", &err);
                return;
            }
        };

        let inviter_name = match self.store.get_user(invitation.invited_by).await {
            Ok(Some(user)) => user.notification_name().to_string(),
            Ok(None) => "A teammate".to_string(),
            Err(err) => {
                self.telemetry.report("invitation.notify", &err);
                "A teammate".to_string()
            }
        };

        let outcome = self
            .notifier
            .send_invitation_email(
                &organization.name,
                &invitation.email,
                &inviter_name,
                &invitation.invitation_link(),
            )
            .await;

        let status = match outcome {
            Ok(()) => DeliveryStatus::Sent,
            Err(err) => {
                self.telemetry.report("invitation.notify", &err);
                DeliveryStatus::Failed {
                    reason: err.to_string(),
                }
            }
        };

        if let Err(err) = self.store.set_delivery_status(invitation.id, status).await {
            self.telemetry.report("invitation.notify", &err);
        }
    }
}
