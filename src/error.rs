use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("{0} is required")]
    MissingField(&'static str),

    #[error("{0} not found")]
    NotFound(String),

    #[error("team {0} already exists")]
    TeamExists(String),

    #[error("pull request {0} already exists")]
    PullRequestExists(String),

    #[error("user {0} has an open pull request")]
    OpenPullRequest(i64),

    #[error("cannot reassign on merged pull request {0}")]
    PullRequestMerged(i64),

    #[error("user {user_id} is not assigned to pull request {pull_request_id}")]
    NotAssigned { user_id: i64, pull_request_id: i64 },

    #[error("no active replacement candidate in team")]
    NoCandidate,

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl ServiceError {
    pub fn not_found(entity: &str, id: impl std::fmt::Display) -> Self {
        Self::NotFound(format!("{} {}", entity, id))
    }

    /// Stable machine-readable code carried in every error body.
    pub fn code(&self) -> &'static str {
        match self {
            Self::MissingField(_) => "MISSING_FIELD",
            Self::NotFound(_) => "NOT_FOUND",
            Self::TeamExists(_) => "TEAM_EXISTS",
            Self::PullRequestExists(_) => "PR_EXISTS",
            Self::OpenPullRequest(_) => "OPEN_PR",
            Self::PullRequestMerged(_) => "PR_MERGED",
            Self::NotAssigned { .. } => "NOT_ASSIGNED",
            Self::NoCandidate => "NO_CANDIDATE",
            Self::Database(_) => "INTERNAL",
        }
    }

    // Duplicate team names map to 400, duplicate PR names to 409.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::MissingField(_) | Self::TeamExists(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::PullRequestExists(_)
            | Self::OpenPullRequest(_)
            | Self::PullRequestMerged(_)
            | Self::NotAssigned { .. }
            | Self::NoCandidate => StatusCode::CONFLICT,
            Self::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        if let Self::Database(err) = &self {
            tracing::error!("database error: {}", err);
        }
        let body = Json(serde_json::json!({
            "error": {
                "code": self.code(),
                "message": self.to_string(),
            }
        }));
        (self.status_code(), body).into_response()
    }
}
