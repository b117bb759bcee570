//! Row-level lookups shared by the directory, lifecycle, and stats
//! components. Each function takes any executor so callers can run them
//! against the pool or inside an open transaction.

use sqlx::{Executor, Sqlite};

use crate::database::models::{PrStatus, PullRequest, Team, User};

pub async fn get_team_by_name<'e, E>(executor: E, team_name: &str) -> Result<Option<Team>, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query_as::<_, Team>("SELECT id, team_name FROM teams WHERE team_name = ?")
        .bind(team_name)
        .fetch_optional(executor)
        .await
}

pub async fn team_members<'e, E>(executor: E, team_id: i64) -> Result<Vec<User>, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query_as::<_, User>(
        "SELECT id, username, team_id, is_active FROM users WHERE team_id = ? ORDER BY id",
    )
    .bind(team_id)
    .fetch_all(executor)
    .await
}

pub async fn get_user<'e, E>(executor: E, user_id: i64) -> Result<Option<User>, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query_as::<_, User>("SELECT id, username, team_id, is_active FROM users WHERE id = ?")
        .bind(user_id)
        .fetch_optional(executor)
        .await
}

pub async fn get_pull_request<'e, E>(
    executor: E,
    pull_request_id: i64,
) -> Result<Option<PullRequest>, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query_as::<_, PullRequest>(
        "SELECT id, pull_request_name, author_id, status, created_at, merged_at \
         FROM pull_requests WHERE id = ?",
    )
    .bind(pull_request_id)
    .fetch_optional(executor)
    .await
}

pub async fn pull_request_name_exists<'e, E>(
    executor: E,
    pull_request_name: &str,
) -> Result<bool, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    let found: Option<i64> =
        sqlx::query_scalar("SELECT id FROM pull_requests WHERE pull_request_name = ?")
            .bind(pull_request_name)
            .fetch_optional(executor)
            .await?;
    Ok(found.is_some())
}

pub async fn reviewer_ids<'e, E>(executor: E, pull_request_id: i64) -> Result<Vec<i64>, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query_scalar("SELECT user_id FROM pr_reviewers WHERE pull_request_id = ? ORDER BY user_id")
        .bind(pull_request_id)
        .fetch_all(executor)
        .await
}

/// Active members of a team, excluding one user. The base of every
/// reviewer pool.
pub async fn active_teammates<'e, E>(
    executor: E,
    team_id: i64,
    excluded_user_id: i64,
) -> Result<Vec<User>, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query_as::<_, User>(
        "SELECT id, username, team_id, is_active FROM users \
         WHERE team_id = ? AND is_active = 1 AND id != ? ORDER BY id",
    )
    .bind(team_id)
    .bind(excluded_user_id)
    .fetch_all(executor)
    .await
}

pub async fn has_open_authored_pr<'e, E>(executor: E, user_id: i64) -> Result<bool, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    let found: Option<i64> =
        sqlx::query_scalar("SELECT id FROM pull_requests WHERE author_id = ? AND status = ? LIMIT 1")
            .bind(user_id)
            .bind(PrStatus::Open)
            .fetch_optional(executor)
            .await?;
    Ok(found.is_some())
}

/// Every pull request on which the user is currently an assigned reviewer.
pub async fn review_assignments_for<'e, E>(
    executor: E,
    user_id: i64,
) -> Result<Vec<PullRequest>, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query_as::<_, PullRequest>(
        "SELECT p.id, p.pull_request_name, p.author_id, p.status, p.created_at, p.merged_at \
         FROM pull_requests p \
         JOIN pr_reviewers r ON r.pull_request_id = p.id \
         WHERE r.user_id = ? ORDER BY p.id",
    )
    .bind(user_id)
    .fetch_all(executor)
    .await
}
