//! End-to-end tests for the membership and team workflows.
//!
//! These run the real engines against the in-memory store, whose
//! snapshot-clone transactions give actual commit/rollback semantics, so
//! the atomicity properties are exercised for real. The recording
//! notifier and telemetry sink make the best-effort post-commit phase
//! observable.

use std::sync::Arc;

use uuid::Uuid;

use tenancy_engine::memory::MemoryStore;
use tenancy_engine::{
    EngineError, FailingNotifier, InvitationWorkflow, InviteItem, MembershipPolicyEngine,
    MembershipRequestWorkflow, RecordingNotifier, RecordingSink, TeamRosterEngine,
};
use tenancy_org::{
    Organization, OrganizationMembershipRequest, OrganizationPrivilege, PlatformRole, Privilege,
    RequestPrincipal, RequestStatus, ResourceAudiencePolicy, TeamPrivilege, UserRecord,
};

/// Test fixture wiring all engines to one in-memory store.
struct Fixture {
    store: Arc<MemoryStore>,
    telemetry: Arc<RecordingSink>,
    notifier: Arc<RecordingNotifier>,
    membership: MembershipPolicyEngine<MemoryStore>,
    requests: Arc<MembershipRequestWorkflow<MemoryStore>>,
    invitations: InvitationWorkflow<MemoryStore, MembershipRequestWorkflow<MemoryStore>>,
    teams: TeamRosterEngine<MemoryStore>,
}

impl Fixture {
    fn new() -> Self {
        let store = Arc::new(MemoryStore::new());
        let telemetry = Arc::new(RecordingSink::new());
        let notifier = Arc::new(RecordingNotifier::new());

        let membership = MembershipPolicyEngine::new(store.clone(), telemetry.clone());
        let requests = Arc::new(MembershipRequestWorkflow::new(
            store.clone(),
            telemetry.clone(),
        ));
        let invitations = InvitationWorkflow::new(
            store.clone(),
            requests.clone(),
            notifier.clone(),
            telemetry.clone(),
        );
        let teams = TeamRosterEngine::new(store.clone(), telemetry.clone());

        Self {
            store,
            telemetry,
            notifier,
            membership,
            requests,
            invitations,
            teams,
        }
    }

    /// Seed an organization with a system admin and return
    /// (org id, admin id, admin principal).
    async fn seed_org_with_admin(&self) -> (Uuid, Uuid, RequestPrincipal) {
        let admin_id = Uuid::now_v7();
        let org = Organization::new("Acme Corp", admin_id);
        let org_id = org.id;
        self.store.add_organization(org).await;
        self.store
            .add_user(
                UserRecord::new(admin_id, "admin@acme.test").with_display_name("Ada Admin"),
            )
            .await;
        self.store
            .add_policy(ResourceAudiencePolicy::organization_user(
                org_id,
                admin_id,
                OrganizationPrivilege::SystemAdmin,
            ))
            .await;
        (org_id, admin_id, org_principal(admin_id, org_id))
    }

    /// Seed an organization member with a directory entry.
    async fn seed_member(&self, org_id: Uuid, email: &str) -> Uuid {
        let user_id = Uuid::now_v7();
        self.store.add_user(UserRecord::new(user_id, email)).await;
        self.store
            .add_policy(ResourceAudiencePolicy::organization_user(
                org_id,
                user_id,
                OrganizationPrivilege::Member,
            ))
            .await;
        user_id
    }
}

fn org_principal(user_id: Uuid, org_id: Uuid) -> RequestPrincipal {
    RequestPrincipal::new(PlatformRole::User, Some(user_id)).with_organizations(vec![org_id])
}

fn team_principal(user_id: Uuid, org_id: Uuid) -> RequestPrincipal {
    org_principal(user_id, org_id).with_current_organization(org_id)
}

fn member_privilege() -> Privilege {
    Privilege::Organization(OrganizationPrivilege::Member)
}

// ============================================================================
// Membership policy
// ============================================================================

#[tokio::test]
async fn idempotent_privilege_update_issues_no_write() {
    let fx = Fixture::new();
    let (org_id, _, admin) = fx.seed_org_with_admin().await;
    let member_id = fx.seed_member(org_id, "member@acme.test").await;

    let policy = fx
        .membership
        .update_privilege(&admin, org_id, member_id, member_privilege())
        .await
        .unwrap();
    assert_eq!(
        policy.privilege,
        Privilege::Organization(OrganizationPrivilege::Member)
    );
    assert_eq!(fx.store.stats().direct_writes, 0);

    // An actual change does write.
    fx.membership
        .update_privilege(
            &admin,
            org_id,
            member_id,
            Privilege::Organization(OrganizationPrivilege::Admin),
        )
        .await
        .unwrap();
    assert_eq!(fx.store.stats().direct_writes, 1);
}

#[tokio::test]
async fn self_action_is_always_forbidden() {
    let fx = Fixture::new();
    let (org_id, admin_id, admin) = fx.seed_org_with_admin().await;

    let update = fx
        .membership
        .update_privilege(
            &admin,
            org_id,
            admin_id,
            Privilege::Organization(OrganizationPrivilege::Admin),
        )
        .await;
    assert!(matches!(update, Err(EngineError::Forbidden(_))));

    let removal = fx.membership.remove_member(&admin, org_id, admin_id).await;
    assert!(matches!(removal, Err(EngineError::Forbidden(_))));
}

#[tokio::test]
async fn update_privilege_rejects_team_scoped_level() {
    let fx = Fixture::new();
    let (org_id, _, admin) = fx.seed_org_with_admin().await;
    let member_id = fx.seed_member(org_id, "member@acme.test").await;

    let result = fx
        .membership
        .update_privilege(&admin, org_id, member_id, Privilege::Team(TeamPrivilege::Lead))
        .await;
    assert!(matches!(result, Err(EngineError::InvalidPrivilege(_))));
}

#[tokio::test]
async fn update_privilege_requires_existing_policy() {
    let fx = Fixture::new();
    let (org_id, _, admin) = fx.seed_org_with_admin().await;

    let result = fx
        .membership
        .update_privilege(&admin, org_id, Uuid::now_v7(), member_privilege())
        .await;
    assert!(matches!(result, Err(EngineError::PolicyNotFound)));
}

#[tokio::test]
async fn remove_member_distinguishes_non_member_caller_from_non_admin() {
    let fx = Fixture::new();
    let (org_id, _, _) = fx.seed_org_with_admin().await;
    let member_id = fx.seed_member(org_id, "member@acme.test").await;
    let target_id = fx.seed_member(org_id, "target@acme.test").await;

    // Caller with no policy at all.
    let outsider = org_principal(Uuid::now_v7(), org_id);
    let result = fx.membership.remove_member(&outsider, org_id, target_id).await;
    assert!(matches!(result, Err(EngineError::NotAMember)));

    // Caller with a policy, but not system admin.
    let plain = org_principal(member_id, org_id);
    let result = fx.membership.remove_member(&plain, org_id, target_id).await;
    assert!(matches!(result, Err(EngineError::Forbidden(_))));
}

#[tokio::test]
async fn remove_member_deletes_the_policy() {
    let fx = Fixture::new();
    let (org_id, _, admin) = fx.seed_org_with_admin().await;
    let member_id = fx.seed_member(org_id, "member@acme.test").await;

    assert_eq!(fx.store.policy_count().await, 2);
    fx.membership
        .remove_member(&admin, org_id, member_id)
        .await
        .unwrap();
    assert_eq!(fx.store.policy_count().await, 1);
}

#[tokio::test]
async fn organization_bootstrap_is_atomic() {
    let fx = Fixture::new();
    let platform_admin = RequestPrincipal::new(PlatformRole::Admin, Some(Uuid::now_v7()));
    let owner_id = Uuid::now_v7();

    let org = fx
        .membership
        .create_organization(&platform_admin, "Acme Corp", None, owner_id)
        .await
        .unwrap();
    assert_eq!(fx.store.organization_count().await, 1);
    assert_eq!(fx.store.policy_count().await, 1);
    let policy = fx
        .membership
        .validate_audience_in_organization(
            org.id,
            tenancy_org::AudienceType::User,
            owner_id,
        )
        .await
        .unwrap();
    assert!(policy.privilege.is_system_admin());
}

#[tokio::test]
async fn organization_bootstrap_never_commits_half() {
    let fx = Fixture::new();
    let platform_admin = RequestPrincipal::new(PlatformRole::Admin, Some(Uuid::now_v7()));

    // Organization insert succeeds, owner-policy insert fails.
    fx.store.fail_after_tx_writes(1);
    let result = fx
        .membership
        .create_organization(&platform_admin, "Acme Corp", None, Uuid::now_v7())
        .await;
    assert!(matches!(result, Err(EngineError::Store(_))));
    assert_eq!(fx.store.organization_count().await, 0);
    assert_eq!(fx.store.policy_count().await, 0);
    assert!(!fx.telemetry.reports().is_empty());
}

#[tokio::test]
async fn audience_validation_fails_for_absent_audience() {
    let fx = Fixture::new();
    let (org_id, _, _) = fx.seed_org_with_admin().await;

    let result = fx
        .membership
        .validate_audience_in_organization(org_id, tenancy_org::AudienceType::User, Uuid::now_v7())
        .await;
    assert!(matches!(result, Err(EngineError::AudienceNotFound)));
}

#[tokio::test]
async fn organization_creation_requires_platform_admin() {
    let fx = Fixture::new();
    let plain = RequestPrincipal::new(PlatformRole::User, Some(Uuid::now_v7()));

    let result = fx
        .membership
        .create_organization(&plain, "Acme Corp", None, Uuid::now_v7())
        .await;
    assert!(matches!(result, Err(EngineError::Forbidden(_))));
}

// ============================================================================
// Invitations
// ============================================================================

#[tokio::test]
async fn invitation_is_unique_per_email() {
    let fx = Fixture::new();
    let (org_id, _, admin) = fx.seed_org_with_admin().await;

    fx.invitations
        .invite_member(&admin, org_id, "new@x.com", member_privilege())
        .await
        .unwrap();

    // Case/format-insensitive comparison, different privilege.
    let second = fx
        .invitations
        .invite_member(
            &admin,
            org_id,
            "  New@X.COM ",
            Privilege::Organization(OrganizationPrivilege::Admin),
        )
        .await;
    assert!(matches!(second, Err(EngineError::DuplicateInvitation(_))));
    assert_eq!(fx.store.invitation_count().await, 1);
}

#[tokio::test]
async fn inviting_an_existing_member_is_rejected() {
    let fx = Fixture::new();
    let (org_id, _, admin) = fx.seed_org_with_admin().await;
    fx.seed_member(org_id, "member@acme.test").await;

    let result = fx
        .invitations
        .invite_member(&admin, org_id, "member@acme.test", member_privilege())
        .await;
    assert!(matches!(result, Err(EngineError::AlreadyMember)));
    assert_eq!(fx.store.invitation_count().await, 0);
}

#[tokio::test]
async fn invite_validates_email_and_privilege() {
    let fx = Fixture::new();
    let (org_id, _, admin) = fx.seed_org_with_admin().await;

    let bad_email = fx
        .invitations
        .invite_member(&admin, org_id, "not-an-email", member_privilege())
        .await;
    assert!(matches!(bad_email, Err(EngineError::InvalidEmail(_))));

    let bad_privilege = fx
        .invitations
        .invite_member(
            &admin,
            org_id,
            "new@x.com",
            Privilege::Team(TeamPrivilege::Member),
        )
        .await;
    assert!(matches!(bad_privilege, Err(EngineError::InvalidPrivilege(_))));
    assert_eq!(fx.store.invitation_count().await, 0);
}

#[tokio::test]
async fn invite_requires_organization_scope() {
    let fx = Fixture::new();
    let (org_id, admin_id, _) = fx.seed_org_with_admin().await;

    // Same user, but the session does not carry the organization.
    let unscoped = RequestPrincipal::new(PlatformRole::User, Some(admin_id));
    let result = fx
        .invitations
        .invite_member(&unscoped, org_id, "new@x.com", member_privilege())
        .await;
    assert!(matches!(result, Err(EngineError::Forbidden(_))));
}

#[tokio::test]
async fn bulk_invite_is_partial_success() {
    let fx = Fixture::new();
    let (org_id, _, admin) = fx.seed_org_with_admin().await;
    fx.seed_member(org_id, "second@x.com").await;

    let outcome = fx
        .invitations
        .bulk_invite(
            &admin,
            org_id,
            vec![
                InviteItem {
                    email: "first@x.com".to_string(),
                    privilege: member_privilege(),
                },
                InviteItem {
                    email: "second@x.com".to_string(),
                    privilege: member_privilege(),
                },
                InviteItem {
                    email: "third@x.com".to_string(),
                    privilege: member_privilege(),
                },
            ],
        )
        .await
        .unwrap();

    assert_eq!(outcome.invitations.len(), 2);
    assert_eq!(outcome.failures.len(), 1);
    assert_eq!(outcome.failures[0].email, "second@x.com");
    assert!(matches!(outcome.failures[0].error, EngineError::AlreadyMember));
    // The third item was processed despite the second failing.
    assert!(outcome.invitations.iter().any(|i| i.email == "third@x.com"));
}

#[tokio::test]
async fn invite_sends_notification_when_no_pending_request() {
    let fx = Fixture::new();
    let (org_id, _, admin) = fx.seed_org_with_admin().await;

    let invitation = fx
        .invitations
        .invite_member(&admin, org_id, "new@x.com", member_privilege())
        .await
        .unwrap();

    let sent = fx.notifier.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].recipient, "new@x.com");
    assert_eq!(sent[0].organization_name, "Acme Corp");
    assert_eq!(sent[0].inviter_name, "Ada Admin");
    assert_eq!(sent[0].invitation_link, invitation.invitation_link());

    // Delivery outcome is recorded on the row.
    let stored = fx.store.get_invitation(invitation.id).await.unwrap();
    assert_eq!(stored.delivery, tenancy_org::DeliveryStatus::Sent);
}

#[tokio::test]
async fn invite_auto_approves_pending_request_instead_of_mailing() {
    let fx = Fixture::new();
    let (org_id, _, admin) = fx.seed_org_with_admin().await;

    let requester_id = Uuid::now_v7();
    fx.store
        .add_user(UserRecord::new(requester_id, "joiner@x.com"))
        .await;
    let request = OrganizationMembershipRequest::new(org_id, requester_id);
    let request_id = request.id;
    fx.store.add_request(request).await;

    fx.invitations
        .invite_member(&admin, org_id, "joiner@x.com", member_privilege())
        .await
        .unwrap();

    // The requester became a member without an email round trip.
    let approved = fx.store.get_request(request_id).await.unwrap();
    assert_eq!(approved.status, RequestStatus::Approved);
    let policy = fx
        .membership
        .validate_audience_in_organization(org_id, tenancy_org::AudienceType::User, requester_id)
        .await
        .unwrap();
    assert_eq!(
        policy.privilege,
        Privilege::Organization(OrganizationPrivilege::Member)
    );
    assert!(fx.notifier.sent().is_empty());
    // The invitation row itself is still the durable record.
    assert_eq!(fx.store.invitation_count().await, 1);
}

#[tokio::test]
async fn notification_failure_does_not_lose_the_invitation() {
    let fx = Fixture::new();
    let (org_id, _, admin) = fx.seed_org_with_admin().await;

    let failing = InvitationWorkflow::new(
        fx.store.clone(),
        fx.requests.clone(),
        Arc::new(FailingNotifier::new("smtp down")),
        fx.telemetry.clone(),
    );

    let invitation = failing
        .invite_member(&admin, org_id, "new@x.com", member_privilege())
        .await
        .unwrap();

    assert_eq!(fx.store.invitation_count().await, 1);
    let stored = fx.store.get_invitation(invitation.id).await.unwrap();
    assert!(matches!(
        stored.delivery,
        tenancy_org::DeliveryStatus::Failed { .. }
    ));
    assert!(fx
        .telemetry
        .reports()
        .iter()
        .any(|r| r.contains("smtp down")));
}

#[tokio::test]
async fn duplicate_invite_scenario() {
    // Organization O1 has system admin A. A invites new@x.com as member:
    // invitation created, notification attempted. A invites the same email
    // again as admin: DuplicateInvitation, no new row.
    let fx = Fixture::new();
    let (org_id, _, admin) = fx.seed_org_with_admin().await;

    fx.invitations
        .invite_member(&admin, org_id, "new@x.com", member_privilege())
        .await
        .unwrap();
    assert_eq!(fx.notifier.sent().len(), 1);

    let second = fx
        .invitations
        .invite_member(
            &admin,
            org_id,
            "new@x.com",
            Privilege::Organization(OrganizationPrivilege::Admin),
        )
        .await;
    assert!(matches!(second, Err(EngineError::DuplicateInvitation(_))));
    assert_eq!(fx.store.invitation_count().await, 1);
}

// ============================================================================
// Membership requests
// ============================================================================

#[tokio::test]
async fn approval_creates_policy_and_flips_request_atomically() {
    let fx = Fixture::new();
    let (org_id, _, admin) = fx.seed_org_with_admin().await;

    let requester_id = Uuid::now_v7();
    let request = OrganizationMembershipRequest::new(org_id, requester_id);
    let request_id = request.id;
    fx.store.add_request(request).await;

    let policy = fx.requests.approve(&admin, org_id, requester_id).await.unwrap();
    assert_eq!(
        policy.privilege,
        Privilege::Organization(OrganizationPrivilege::Member)
    );
    assert_eq!(
        fx.store.get_request(request_id).await.unwrap().status,
        RequestStatus::Approved
    );
}

#[tokio::test]
async fn approval_rolls_back_when_second_write_fails() {
    let fx = Fixture::new();
    let (org_id, _, admin) = fx.seed_org_with_admin().await;

    let requester_id = Uuid::now_v7();
    let request = OrganizationMembershipRequest::new(org_id, requester_id);
    let request_id = request.id;
    fx.store.add_request(request).await;

    // Policy insert succeeds, request-status write fails.
    fx.store.fail_after_tx_writes(1);
    let result = fx.requests.approve(&admin, org_id, requester_id).await;
    assert!(matches!(result, Err(EngineError::Store(_))));

    // Neither write survived.
    assert_eq!(fx.store.policy_count().await, 1); // only the admin's
    assert_eq!(
        fx.store.get_request(request_id).await.unwrap().status,
        RequestStatus::Pending
    );
}

#[tokio::test]
async fn approval_rejects_existing_member() {
    let fx = Fixture::new();
    let (org_id, _, admin) = fx.seed_org_with_admin().await;
    let member_id = fx.seed_member(org_id, "member@acme.test").await;
    fx.store
        .add_request(OrganizationMembershipRequest::new(org_id, member_id))
        .await;

    let result = fx.requests.approve(&admin, org_id, member_id).await;
    assert!(matches!(result, Err(EngineError::AlreadyMember)));
    assert_eq!(fx.store.policy_count().await, 2);
}

#[tokio::test]
async fn approval_requires_system_admin_caller() {
    let fx = Fixture::new();
    let (org_id, _, _) = fx.seed_org_with_admin().await;
    let member_id = fx.seed_member(org_id, "member@acme.test").await;

    let requester_id = Uuid::now_v7();
    fx.store
        .add_request(OrganizationMembershipRequest::new(org_id, requester_id))
        .await;

    let plain = org_principal(member_id, org_id);
    let result = fx.requests.approve(&plain, org_id, requester_id).await;
    assert!(matches!(result, Err(EngineError::Forbidden(_))));

    let outsider = org_principal(Uuid::now_v7(), org_id);
    let result = fx.requests.approve(&outsider, org_id, requester_id).await;
    assert!(matches!(result, Err(EngineError::NotAMember)));

    let anonymous = RequestPrincipal::new(PlatformRole::User, None);
    let result = fx.requests.approve(&anonymous, org_id, requester_id).await;
    assert!(matches!(result, Err(EngineError::NoIdentity)));
}

#[tokio::test]
async fn approval_with_duplicate_caller_policies_uses_the_last() {
    let fx = Fixture::new();
    let caller_id = Uuid::now_v7();
    let org = Organization::new("Acme Corp", caller_id);
    let org_id = org.id;
    fx.store.add_organization(org).await;

    // Two policies for the same caller, lower tier first. The uniqueness
    // invariant says this state should not exist; the engine still has to
    // decide.
    fx.store
        .add_policy(ResourceAudiencePolicy::organization_user(
            org_id,
            caller_id,
            OrganizationPrivilege::Member,
        ))
        .await;
    fx.store
        .add_policy(ResourceAudiencePolicy::organization_user(
            org_id,
            caller_id,
            OrganizationPrivilege::SystemAdmin,
        ))
        .await;

    let requester_id = Uuid::now_v7();
    fx.store
        .add_request(OrganizationMembershipRequest::new(org_id, requester_id))
        .await;

    // The last policy decides the gate; under a first-match rule the
    // member-tier policy would have refused this approval.
    fx.requests
        .approve(&org_principal(caller_id, org_id), org_id, requester_id)
        .await
        .unwrap();

    // The bad state is surfaced out of band.
    assert!(fx
        .telemetry
        .reports()
        .iter()
        .any(|r| r.contains("data integrity")));
}

#[tokio::test]
async fn pending_listings_filter_by_status_and_org() {
    let fx = Fixture::new();
    let (org_a, _, _) = fx.seed_org_with_admin().await;
    let org_b = Uuid::now_v7();

    fx.store
        .add_request(OrganizationMembershipRequest::new(org_a, Uuid::now_v7()))
        .await;
    fx.store
        .add_request(OrganizationMembershipRequest::new(org_b, Uuid::now_v7()))
        .await;

    assert_eq!(
        fx.requests.list_pending_by_organization(org_a).await.unwrap().len(),
        1
    );
    assert_eq!(fx.requests.list_all_pending().await.unwrap().len(), 2);
}

// ============================================================================
// Teams
// ============================================================================

#[tokio::test]
async fn team_names_are_unique_per_organization() {
    let fx = Fixture::new();
    let (org_a, admin_id, _) = fx.seed_org_with_admin().await;
    let org_b = Uuid::now_v7();

    let principal_a = team_principal(admin_id, org_a);
    fx.teams
        .create_team(&principal_a, org_a, "Platform", None, "#1f6feb")
        .await
        .unwrap();

    let duplicate = fx
        .teams
        .create_team(&principal_a, org_a, "Platform", None, "#aabbcc")
        .await;
    assert!(matches!(duplicate, Err(EngineError::DuplicateTeamName(_))));

    // Same name in a different organization is fine.
    let principal_b = team_principal(admin_id, org_b);
    fx.teams
        .create_team(&principal_b, org_b, "Platform", None, "#1f6feb")
        .await
        .unwrap();
}

#[tokio::test]
async fn team_operations_require_bound_organization() {
    let fx = Fixture::new();
    let (org_id, admin_id, admin) = fx.seed_org_with_admin().await;

    // Org access without the session binding is not enough.
    let result = fx
        .teams
        .create_team(&admin, org_id, "Platform", None, "#1f6feb")
        .await;
    assert!(matches!(result, Err(EngineError::Forbidden(_))));

    // Bound to a different organization.
    let elsewhere = team_principal(admin_id, Uuid::now_v7());
    let result = fx
        .teams
        .create_team(&elsewhere, org_id, "Platform", None, "#1f6feb")
        .await;
    assert!(matches!(result, Err(EngineError::Forbidden(_))));
}

#[tokio::test]
async fn team_validation_rules() {
    let fx = Fixture::new();
    let (org_id, admin_id, _) = fx.seed_org_with_admin().await;
    let principal = team_principal(admin_id, org_id);

    let long_name = "a".repeat(25);
    let result = fx
        .teams
        .create_team(&principal, org_id, &long_name, None, "#1f6feb")
        .await;
    assert!(matches!(result, Err(EngineError::InvalidName(_))));

    let long_description = Some("d".repeat(65));
    let result = fx
        .teams
        .create_team(&principal, org_id, "Platform", long_description, "#1f6feb")
        .await;
    assert!(matches!(result, Err(EngineError::InvalidName(_))));

    let result = fx
        .teams
        .create_team(&principal, org_id, "Platform", None, "blue")
        .await;
    assert!(matches!(result, Err(EngineError::InvalidColorCode(_))));

    let result = fx
        .teams
        .rename_team(&principal, org_id, None, "Platform")
        .await;
    assert!(matches!(result, Err(EngineError::MissingRequiredId(_))));
}

#[tokio::test]
async fn roster_requires_organization_membership() {
    let fx = Fixture::new();
    let (org_id, admin_id, _) = fx.seed_org_with_admin().await;
    let principal = team_principal(admin_id, org_id);

    let team = fx
        .teams
        .create_team(&principal, org_id, "Platform", None, "#1f6feb")
        .await
        .unwrap();

    let outsider = Uuid::now_v7();
    let result = fx
        .teams
        .add_user_to_team(&principal, org_id, team.id, outsider)
        .await;
    assert!(matches!(result, Err(EngineError::NotOrganizationMember)));
}

#[tokio::test]
async fn roster_add_and_remove() {
    let fx = Fixture::new();
    let (org_id, admin_id, _) = fx.seed_org_with_admin().await;
    let principal = team_principal(admin_id, org_id);
    let member_id = fx.seed_member(org_id, "member@acme.test").await;

    let team = fx
        .teams
        .create_team(&principal, org_id, "Platform", None, "#1f6feb")
        .await
        .unwrap();

    let membership = fx
        .teams
        .add_user_to_team(&principal, org_id, team.id, member_id)
        .await
        .unwrap();
    assert_eq!(membership.added_by, Some(admin_id));

    // At most once per roster.
    let again = fx
        .teams
        .add_user_to_team(&principal, org_id, team.id, member_id)
        .await;
    assert!(matches!(again, Err(EngineError::AlreadyTeamMember)));

    fx.teams
        .remove_user_from_team(&principal, org_id, team.id, membership.id)
        .await
        .unwrap();

    let gone = fx
        .teams
        .remove_user_from_team(&principal, org_id, team.id, membership.id)
        .await;
    assert!(matches!(gone, Err(EngineError::MembershipNotFound)));
}

#[tokio::test]
async fn team_rename_and_delete() {
    let fx = Fixture::new();
    let (org_id, admin_id, _) = fx.seed_org_with_admin().await;
    let principal = team_principal(admin_id, org_id);

    let team = fx
        .teams
        .create_team(&principal, org_id, "Platform", None, "#1f6feb")
        .await
        .unwrap();

    let renamed = fx
        .teams
        .rename_team(&principal, org_id, Some(team.id), "Infra")
        .await
        .unwrap();
    assert_eq!(renamed.name, "Infra");

    fx.teams
        .delete_team(&principal, org_id, Some(team.id))
        .await
        .unwrap();

    let missing = fx
        .teams
        .rename_team(&principal, org_id, Some(team.id), "Ghost")
        .await;
    assert!(matches!(missing, Err(EngineError::TeamNotFound)));
}
