//! Team directory: owns team and user records, team membership, and the
//! user-centric review assignment listing.

use serde::{Deserialize, Serialize};
use sqlx::{Executor, Sqlite};
use tracing::info;

use crate::database::models::{PrStatus, User};
use crate::database::{queries, Database};
use crate::error::ServiceError;

/// Member payload accepted by `add_team`. Activity defaults to true, as it
/// does for every new user.
#[derive(Debug, Clone, Deserialize)]
pub struct NewMember {
    pub username: String,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

#[derive(Debug, Clone, Serialize)]
pub struct MemberView {
    pub id: i64,
    pub username: String,
    pub is_active: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct TeamWithMembers {
    pub id: i64,
    pub team_name: String,
    pub members: Vec<MemberView>,
}

/// User projection carrying the team name instead of its id.
#[derive(Debug, Clone, Serialize)]
pub struct UserWithTeam {
    pub id: i64,
    pub username: String,
    pub team: String,
    pub is_active: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReviewedPullRequest {
    pub id: i64,
    pub pull_request_name: String,
    pub status: PrStatus,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReviewAssignments {
    pub user_id: i64,
    pub pull_requests: Vec<ReviewedPullRequest>,
}

#[derive(Clone)]
pub struct TeamDirectory {
    db: Database,
}

impl TeamDirectory {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Create a team and all of its initial members as one unit. Nothing
    /// is written when the name is already taken.
    pub async fn add_team(
        &self,
        team_name: &str,
        members: Vec<NewMember>,
    ) -> Result<TeamWithMembers, ServiceError> {
        if team_name.trim().is_empty() {
            return Err(ServiceError::MissingField("team_name"));
        }

        let mut tx = self.db.begin().await?;

        if queries::get_team_by_name(&mut *tx, team_name).await?.is_some() {
            return Err(ServiceError::TeamExists(team_name.to_string()));
        }

        let team_id: i64 =
            sqlx::query_scalar("INSERT INTO teams (team_name) VALUES (?) RETURNING id")
                .bind(team_name)
                .fetch_one(&mut *tx)
                .await?;

        let mut created = Vec::with_capacity(members.len());
        for member in members {
            let user_id: i64 = sqlx::query_scalar(
                "INSERT INTO users (username, team_id, is_active) VALUES (?, ?, ?) RETURNING id",
            )
            .bind(&member.username)
            .bind(team_id)
            .bind(member.is_active)
            .fetch_one(&mut *tx)
            .await?;
            created.push(MemberView {
                id: user_id,
                username: member.username,
                is_active: member.is_active,
            });
        }

        tx.commit().await?;

        info!("created team {} with {} member(s)", team_name, created.len());

        Ok(TeamWithMembers {
            id: team_id,
            team_name: team_name.to_string(),
            members: created,
        })
    }

    pub async fn get_team(&self, team_name: &str) -> Result<TeamWithMembers, ServiceError> {
        let team = queries::get_team_by_name(self.db.pool(), team_name)
            .await?
            .ok_or_else(|| ServiceError::not_found("team", team_name))?;
        let members = queries::team_members(self.db.pool(), team.id).await?;

        Ok(TeamWithMembers {
            id: team.id,
            team_name: team.team_name,
            members: members
                .into_iter()
                .map(|user| MemberView {
                    id: user.id,
                    username: user.username,
                    is_active: user.is_active,
                })
                .collect(),
        })
    }

    /// Toggle a user's activity flag. Existing reviewer assignments are
    /// deliberately left untouched; activity only gates future selection.
    pub async fn set_user_active(
        &self,
        user_id: i64,
        is_active: bool,
    ) -> Result<UserWithTeam, ServiceError> {
        let mut user = queries::get_user(self.db.pool(), user_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("user", user_id))?;

        sqlx::query("UPDATE users SET is_active = ? WHERE id = ?")
            .bind(is_active)
            .bind(user_id)
            .execute(self.db.pool())
            .await?;
        user.is_active = is_active;

        info!("set user {} is_active={}", user_id, is_active);

        self.user_with_team(self.db.pool(), user).await
    }

    /// Move a user to another team. Rejected while the user authors any
    /// open pull request, since reviewer selection is scoped to the
    /// author's team.
    pub async fn change_team(
        &self,
        user_id: i64,
        new_team_name: &str,
    ) -> Result<UserWithTeam, ServiceError> {
        let mut tx = self.db.begin().await?;

        let mut user = queries::get_user(&mut *tx, user_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("user", user_id))?;
        let team = queries::get_team_by_name(&mut *tx, new_team_name)
            .await?
            .ok_or_else(|| ServiceError::not_found("team", new_team_name))?;

        if queries::has_open_authored_pr(&mut *tx, user_id).await? {
            return Err(ServiceError::OpenPullRequest(user_id));
        }

        sqlx::query("UPDATE users SET team_id = ? WHERE id = ?")
            .bind(team.id)
            .bind(user_id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        user.team_id = team.id;

        info!("moved user {} to team {}", user_id, new_team_name);

        Ok(UserWithTeam {
            id: user.id,
            username: user.username,
            team: team.team_name,
            is_active: user.is_active,
        })
    }

    /// Pull requests on which the user currently sits as a reviewer.
    pub async fn review_assignments(&self, user_id: i64) -> Result<ReviewAssignments, ServiceError> {
        queries::get_user(self.db.pool(), user_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("user", user_id))?;
        let pull_requests = queries::review_assignments_for(self.db.pool(), user_id).await?;

        Ok(ReviewAssignments {
            user_id,
            pull_requests: pull_requests
                .into_iter()
                .map(|pr| ReviewedPullRequest {
                    id: pr.id,
                    pull_request_name: pr.pull_request_name,
                    status: pr.status,
                })
                .collect(),
        })
    }

    async fn user_with_team<'e, E>(&self, executor: E, user: User) -> Result<UserWithTeam, ServiceError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let team_name: String = sqlx::query_scalar("SELECT team_name FROM teams WHERE id = ?")
            .bind(user.team_id)
            .fetch_one(executor)
            .await?;
        Ok(UserWithTeam {
            id: user.id,
            username: user.username,
            team: team_name,
            is_active: user.is_active,
        })
    }
}
