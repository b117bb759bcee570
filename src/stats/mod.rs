//! Read-only rollups over users and pull requests. No side effects and no
//! ordering guarantee beyond the stable per-call ordering of the query.

use serde::Serialize;

use crate::database::Database;
use crate::error::ServiceError;

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct UserStatsRow {
    pub user_id: i64,
    pub username: String,
    pub assignments_count: i64,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct PrStatsRow {
    pub pull_request_id: i64,
    pub pull_request_name: String,
    pub reviewers_count: i64,
}

#[derive(Clone)]
pub struct Statistics {
    db: Database,
}

impl Statistics {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// One row per user with the number of PRs they currently review.
    /// Users with no assignments appear with a zero count.
    pub async fn user_stats(&self) -> Result<Vec<UserStatsRow>, ServiceError> {
        let rows = sqlx::query_as::<_, UserStatsRow>(
            "SELECT u.id AS user_id, u.username, COUNT(r.user_id) AS assignments_count \
             FROM users u \
             LEFT JOIN pr_reviewers r ON r.user_id = u.id \
             GROUP BY u.id, u.username \
             ORDER BY u.id",
        )
        .fetch_all(self.db.pool())
        .await?;
        Ok(rows)
    }

    /// One row per pull request with its current reviewer count.
    pub async fn pr_stats(&self) -> Result<Vec<PrStatsRow>, ServiceError> {
        let rows = sqlx::query_as::<_, PrStatsRow>(
            "SELECT p.id AS pull_request_id, p.pull_request_name, COUNT(r.user_id) AS reviewers_count \
             FROM pull_requests p \
             LEFT JOIN pr_reviewers r ON r.pull_request_id = p.id \
             GROUP BY p.id, p.pull_request_name \
             ORDER BY p.id",
        )
        .fetch_all(self.db.pool())
        .await?;
        Ok(rows)
    }
}
