//! Pull request lifecycle: creation with automatic reviewer assignment,
//! idempotent merge, and mid-review reviewer reassignment.
//!
//! Every mutation runs inside a single transaction so that the PR row and
//! its reviewer links always change as one unit. Conflict checks happen
//! inside the same transaction, so a rejected operation leaves no partial
//! effect behind.

use std::sync::{Arc, Mutex};

use chrono::Utc;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use tracing::info;

use crate::database::models::{PrStatus, PullRequest};
use crate::database::{queries, Database};
use crate::error::ServiceError;
use crate::review::policy;

/// A pull request together with its current reviewer set, as returned to
/// the boundary layer.
#[derive(Debug, Clone, Serialize)]
pub struct PullRequestWithReviewers {
    #[serde(flatten)]
    pub pull_request: PullRequest,
    pub assigned_reviewers: Vec<i64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReassignOutcome {
    pub pr: PullRequestWithReviewers,
    pub replaced_by: i64,
}

#[derive(Clone)]
pub struct PullRequestService {
    db: Database,
    rng: Arc<Mutex<StdRng>>,
}

impl PullRequestService {
    pub fn new(db: Database) -> Self {
        Self::with_rng(db, StdRng::from_entropy())
    }

    /// Constructor with an explicit RNG, used by tests that need
    /// deterministic draws.
    pub fn with_rng(db: Database, rng: StdRng) -> Self {
        Self {
            db,
            rng: Arc::new(Mutex::new(rng)),
        }
    }

    /// Create a pull request and assign up to two reviewers drawn from the
    /// author's active teammates. An author with no eligible teammates gets
    /// a PR with an empty reviewer set.
    pub async fn create(
        &self,
        pull_request_name: &str,
        author_id: i64,
    ) -> Result<PullRequestWithReviewers, ServiceError> {
        if pull_request_name.trim().is_empty() {
            return Err(ServiceError::MissingField("pull_request_name"));
        }

        let mut tx = self.db.begin().await?;

        if queries::pull_request_name_exists(&mut *tx, pull_request_name).await? {
            return Err(ServiceError::PullRequestExists(pull_request_name.to_string()));
        }
        let author = queries::get_user(&mut *tx, author_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("user", author_id))?;

        let candidates = queries::active_teammates(&mut *tx, author.team_id, author.id).await?;
        let mut reviewers = {
            let mut rng = self.rng.lock().expect("rng lock poisoned");
            policy::select_initial_reviewers(&mut *rng, &candidates, policy::DEFAULT_REVIEWER_COUNT)
        };
        reviewers.sort_unstable();

        let created_at = Utc::now();
        let pull_request_id: i64 = sqlx::query_scalar(
            "INSERT INTO pull_requests (pull_request_name, author_id, status, created_at) \
             VALUES (?, ?, ?, ?) RETURNING id",
        )
        .bind(pull_request_name)
        .bind(author.id)
        .bind(PrStatus::Open)
        .bind(created_at)
        .fetch_one(&mut *tx)
        .await?;

        for reviewer_id in &reviewers {
            sqlx::query("INSERT INTO pr_reviewers (pull_request_id, user_id) VALUES (?, ?)")
                .bind(pull_request_id)
                .bind(reviewer_id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;

        info!(
            "created pull request {} ({}) with {} reviewer(s)",
            pull_request_id,
            pull_request_name,
            reviewers.len()
        );

        Ok(PullRequestWithReviewers {
            pull_request: PullRequest {
                id: pull_request_id,
                pull_request_name: pull_request_name.to_string(),
                author_id: author.id,
                status: PrStatus::Open,
                created_at,
                merged_at: None,
            },
            assigned_reviewers: reviewers,
        })
    }

    /// Merge a pull request. Merging an already merged PR returns its
    /// current state untouched; `merged_at` is set exactly once.
    pub async fn merge(&self, pull_request_id: i64) -> Result<PullRequestWithReviewers, ServiceError> {
        let mut tx = self.db.begin().await?;

        let mut pr = queries::get_pull_request(&mut *tx, pull_request_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("pull request", pull_request_id))?;
        let reviewers = queries::reviewer_ids(&mut *tx, pull_request_id).await?;

        if pr.status == PrStatus::Merged {
            return Ok(PullRequestWithReviewers {
                pull_request: pr,
                assigned_reviewers: reviewers,
            });
        }

        let merged_at = Utc::now();
        sqlx::query("UPDATE pull_requests SET status = ?, merged_at = ? WHERE id = ?")
            .bind(PrStatus::Merged)
            .bind(merged_at)
            .bind(pull_request_id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        info!("merged pull request {}", pull_request_id);

        pr.status = PrStatus::Merged;
        pr.merged_at = Some(merged_at);
        Ok(PullRequestWithReviewers {
            pull_request: pr,
            assigned_reviewers: reviewers,
        })
    }

    /// Swap one assigned reviewer for a randomly chosen active teammate of
    /// the outgoing reviewer. Removal and addition are a single atomic
    /// step: when no candidate exists the original assignment stays intact.
    pub async fn reassign(
        &self,
        pull_request_id: i64,
        old_user_id: i64,
    ) -> Result<ReassignOutcome, ServiceError> {
        let mut tx = self.db.begin().await?;

        let pr = queries::get_pull_request(&mut *tx, pull_request_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("pull request", pull_request_id))?;
        let old_reviewer = queries::get_user(&mut *tx, old_user_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("user", old_user_id))?;

        if pr.status == PrStatus::Merged {
            return Err(ServiceError::PullRequestMerged(pr.id));
        }

        let current = queries::reviewer_ids(&mut *tx, pull_request_id).await?;
        if !current.contains(&old_reviewer.id) {
            return Err(ServiceError::NotAssigned {
                user_id: old_reviewer.id,
                pull_request_id: pr.id,
            });
        }

        let teammates =
            queries::active_teammates(&mut *tx, old_reviewer.team_id, old_reviewer.id).await?;
        // The author is excluded here as well: the no-self-review invariant
        // must hold even when the author sits on the old reviewer's team.
        let candidates: Vec<_> = teammates
            .into_iter()
            .filter(|user| user.id != pr.author_id && !current.contains(&user.id))
            .collect();

        let new_reviewer_id = {
            let mut rng = self.rng.lock().expect("rng lock poisoned");
            policy::select_replacement(&mut *rng, &candidates)
        }
        .ok_or(ServiceError::NoCandidate)?;

        sqlx::query("DELETE FROM pr_reviewers WHERE pull_request_id = ? AND user_id = ?")
            .bind(pull_request_id)
            .bind(old_reviewer.id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("INSERT INTO pr_reviewers (pull_request_id, user_id) VALUES (?, ?)")
            .bind(pull_request_id)
            .bind(new_reviewer_id)
            .execute(&mut *tx)
            .await?;

        let reviewers = queries::reviewer_ids(&mut *tx, pull_request_id).await?;
        tx.commit().await?;

        info!(
            "reassigned reviewer {} -> {} on pull request {}",
            old_user_id, new_reviewer_id, pull_request_id
        );

        Ok(ReassignOutcome {
            pr: PullRequestWithReviewers {
                pull_request: pr,
                assigned_reviewers: reviewers,
            },
            replaced_by: new_reviewer_id,
        })
    }
}
