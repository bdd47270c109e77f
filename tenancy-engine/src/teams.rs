//! Team roster engine
//!
//! Team CRUD and roster management. Every operation requires the session
//! to be bound to the team's organization; a team is a sub-grouping of
//! existing organization members, never of outsiders.

use std::sync::Arc;

use uuid::Uuid;

use tenancy_org::{
    AudienceType, RequestPrincipal, Team, TeamMembership, MAX_TEAM_DESCRIPTION_LEN,
    MAX_TEAM_NAME_LEN,
};

use crate::error::{constraint_as, EngineError, EngineResult};
use crate::gate;
use crate::notify::TelemetrySink;
use crate::store::{TeamTxStore, TenancyStore};

fn validate_team_name(name: &str) -> EngineResult<()> {
    if name.trim().is_empty() {
        return Err(EngineError::InvalidName("team name must not be empty".to_string()));
    }
    if name.chars().count() > MAX_TEAM_NAME_LEN {
        return Err(EngineError::InvalidName(format!(
            "team name must be at most {MAX_TEAM_NAME_LEN} characters"
        )));
    }
    Ok(())
}

fn validate_team_description(description: Option<&str>) -> EngineResult<()> {
    if let Some(description) = description {
        if description.chars().count() > MAX_TEAM_DESCRIPTION_LEN {
            return Err(EngineError::InvalidName(format!(
                "team description must be at most {MAX_TEAM_DESCRIPTION_LEN} characters"
            )));
        }
    }
    Ok(())
}

/// Engine for teams and their rosters.
pub struct TeamRosterEngine<S> {
    store: Arc<S>,
    telemetry: Arc<dyn TelemetrySink>,
}

impl<S: TenancyStore> TeamRosterEngine<S> {
    /// Create the engine with its collaborators.
    pub fn new(store: Arc<S>, telemetry: Arc<dyn TelemetrySink>) -> Self {
        Self { store, telemetry }
    }

    /// Create a team within the bound organization.
    ///
    /// Name uniqueness (exact, case-sensitive) is checked against the
    /// transactional snapshot of the organization's teams.
    pub async fn create_team(
        &self,
        principal: &RequestPrincipal,
        organization_id: Uuid,
        name: &str,
        description: Option<String>,
        color: &str,
    ) -> EngineResult<Team> {
        let caller = gate::require_bound_organization(principal, organization_id)?;
        validate_team_name(name)?;
        validate_team_description(description.as_deref())?;
        if !Team::is_valid_color(color) {
            return Err(EngineError::InvalidColorCode(color.to_string()));
        }

        let name = name.to_string();
        let color = color.to_string();
        let result = self
            .store
            .with_team_tx(Box::new(move |tx| {
                Box::pin(async move {
                    let teams = tx.teams_for_organization(organization_id).await?;
                    if teams.iter().any(|t| t.name == name) {
                        return Err(EngineError::DuplicateTeamName(name));
                    }

                    let dup_name = name.clone();
                    let team = Team::new(organization_id, name, description, color, caller);
                    tx.insert_team(team)
                        .await
                        .map_err(|e| constraint_as(e, EngineError::DuplicateTeamName(dup_name)))
                })
            }))
            .await;

        result.map_err(|e| {
            crate::notify::report_infrastructure(&*self.telemetry, "teams.create", e)
        })
    }

    /// Rename a team.
    ///
    /// Re-validates the name length; uniqueness on rename is left to the
    /// store backstop.
    pub async fn rename_team(
        &self,
        principal: &RequestPrincipal,
        organization_id: Uuid,
        team_id: Option<Uuid>,
        new_name: &str,
    ) -> EngineResult<Team> {
        let team_id = team_id.ok_or(EngineError::MissingRequiredId("team id"))?;
        gate::require_bound_organization(principal, organization_id)?;
        validate_team_name(new_name)?;

        let new_name = new_name.to_string();
        let result = self
            .store
            .with_team_tx(Box::new(move |tx| {
                Box::pin(async move {
                    let mut team = tx
                        .get_team(team_id)
                        .await?
                        .filter(|t| t.organization_id == organization_id)
                        .ok_or(EngineError::TeamNotFound)?;
                    team.name = new_name;
                    team.updated_at = chrono::Utc::now();
                    tx.update_team(team).await.map_err(EngineError::Store)
                })
            }))
            .await;

        result.map_err(|e| {
            crate::notify::report_infrastructure(&*self.telemetry, "teams.rename", e)
        })
    }

    /// Delete a team and its roster.
    pub async fn delete_team(
        &self,
        principal: &RequestPrincipal,
        organization_id: Uuid,
        team_id: Option<Uuid>,
    ) -> EngineResult<()> {
        let team_id = team_id.ok_or(EngineError::MissingRequiredId("team id"))?;
        gate::require_bound_organization(principal, organization_id)?;

        let result = self
            .store
            .with_team_tx(Box::new(move |tx| {
                Box::pin(async move {
                    tx.get_team(team_id)
                        .await?
                        .filter(|t| t.organization_id == organization_id)
                        .ok_or(EngineError::TeamNotFound)?;
                    tx.delete_team(team_id).await.map_err(EngineError::Store)
                })
            }))
            .await;

        result.map_err(|e| {
            crate::notify::report_infrastructure(&*self.telemetry, "teams.delete", e)
        })
    }

    /// Add an organization member to a team roster.
    ///
    /// The organization-membership precondition is a read-only check and
    /// deliberately runs outside the transaction; the roster scan and
    /// insert run inside it.
    pub async fn add_user_to_team(
        &self,
        principal: &RequestPrincipal,
        organization_id: Uuid,
        team_id: Uuid,
        user_id: Uuid,
    ) -> EngineResult<TeamMembership> {
        let caller = gate::require_bound_organization(principal, organization_id)?;

        let policy = self
            .store
            .find_policy(organization_id, AudienceType::User, user_id)
            .await
            .map_err(|e| crate::notify::surface_store(&*self.telemetry, "teams.add_user", e))?;
        if policy.is_none() {
            return Err(EngineError::NotOrganizationMember);
        }

        let result = self
            .store
            .with_team_tx(Box::new(move |tx| {
                Box::pin(async move {
                    let team = tx
                        .get_team(team_id)
                        .await?
                        .filter(|t| t.organization_id == organization_id)
                        .ok_or(EngineError::TeamNotFound)?;
                    if team.member_for_user(user_id).is_some() {
                        return Err(EngineError::AlreadyTeamMember);
                    }

                    let membership = TeamMembership::new(team_id, user_id).with_added_by(caller);
                    tx.insert_team_membership(membership)
                        .await
                        .map_err(|e| constraint_as(e, EngineError::AlreadyTeamMember))
                })
            }))
            .await;

        result.map_err(|e| {
            crate::notify::report_infrastructure(&*self.telemetry, "teams.add_user", e)
        })
    }

    /// Remove a roster entry by membership id.
    pub async fn remove_user_from_team(
        &self,
        principal: &RequestPrincipal,
        organization_id: Uuid,
        team_id: Uuid,
        membership_id: Uuid,
    ) -> EngineResult<()> {
        gate::require_bound_organization(principal, organization_id)?;

        let result = self
            .store
            .with_team_tx(Box::new(move |tx| {
                Box::pin(async move {
                    let team = tx
                        .get_team(team_id)
                        .await?
                        .filter(|t| t.organization_id == organization_id)
                        .ok_or(EngineError::TeamNotFound)?;
                    if team.membership_by_id(membership_id).is_none() {
                        return Err(EngineError::MembershipNotFound);
                    }
                    tx.delete_team_membership(team_id, membership_id)
                        .await
                        .map_err(EngineError::Store)
                })
            }))
            .await;

        result.map_err(|e| {
            crate::notify::report_infrastructure(&*self.telemetry, "teams.remove_user", e)
        })
    }
}
