//! HTTP boundary. Thin handlers that check required fields, call the
//! matching component, and wrap the result in the wire envelope. All
//! domain decisions live below this layer.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::database::Database;
use crate::directory::{NewMember, TeamDirectory};
use crate::error::ServiceError;
use crate::review::PullRequestService;
use crate::stats::Statistics;

#[derive(Clone)]
pub struct AppState {
    pub directory: TeamDirectory,
    pub pull_requests: PullRequestService,
    pub stats: Statistics,
}

impl AppState {
    pub fn new(db: Database) -> Self {
        Self {
            directory: TeamDirectory::new(db.clone()),
            pull_requests: PullRequestService::new(db.clone()),
            stats: Statistics::new(db),
        }
    }
}

pub fn router(state: AppState) -> Router {
    let api = Router::new()
        .route("/team/add", post(add_team))
        .route("/team/get", get(get_team))
        .route("/users/setIsActive", post(set_user_active))
        .route("/users/changeTeam", post(change_team))
        .route("/users/getReview", get(get_review_assignments))
        .route("/pullRequest/create", post(create_pull_request))
        .route("/pullRequest/merge", post(merge_pull_request))
        .route("/pullRequest/reassign", post(reassign_reviewer))
        .route("/statisticsUser", get(user_statistics))
        .route("/statisticsPR", get(pr_statistics));

    Router::new()
        .route("/health", get(health_check))
        .nest("/api", api)
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()).into_inner())
        .with_state(state)
}

async fn health_check() -> Json<serde_json::Value> {
    Json(json!({
        "status": "healthy",
        "service": "review-service",
        "timestamp": chrono::Utc::now()
    }))
}

#[derive(Deserialize)]
struct AddTeamRequest {
    team_name: Option<String>,
    #[serde(default)]
    members: Vec<NewMember>,
}

async fn add_team(
    State(state): State<AppState>,
    Json(req): Json<AddTeamRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let team_name = req.team_name.ok_or(ServiceError::MissingField("team_name"))?;
    let team = state.directory.add_team(&team_name, req.members).await?;
    Ok((StatusCode::CREATED, Json(json!({ "team": team }))))
}

#[derive(Deserialize)]
struct TeamQuery {
    team_name: Option<String>,
}

async fn get_team(
    State(state): State<AppState>,
    Query(query): Query<TeamQuery>,
) -> Result<impl IntoResponse, ServiceError> {
    let team_name = query.team_name.ok_or(ServiceError::MissingField("team_name"))?;
    let team = state.directory.get_team(&team_name).await?;
    Ok(Json(json!({ "team": team })))
}

#[derive(Deserialize)]
struct SetActiveRequest {
    user_id: Option<i64>,
    is_active: Option<bool>,
}

async fn set_user_active(
    State(state): State<AppState>,
    Json(req): Json<SetActiveRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let user_id = req.user_id.ok_or(ServiceError::MissingField("user_id"))?;
    let is_active = req.is_active.ok_or(ServiceError::MissingField("is_active"))?;
    let user = state.directory.set_user_active(user_id, is_active).await?;
    Ok(Json(json!({ "user": user })))
}

#[derive(Deserialize)]
struct ChangeTeamRequest {
    user_id: Option<i64>,
    team_name: Option<String>,
}

async fn change_team(
    State(state): State<AppState>,
    Json(req): Json<ChangeTeamRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let user_id = req.user_id.ok_or(ServiceError::MissingField("user_id"))?;
    let team_name = req.team_name.ok_or(ServiceError::MissingField("team_name"))?;
    let user = state.directory.change_team(user_id, &team_name).await?;
    Ok(Json(json!({ "user": user })))
}

#[derive(Deserialize)]
struct UserQuery {
    user_id: Option<i64>,
}

async fn get_review_assignments(
    State(state): State<AppState>,
    Query(query): Query<UserQuery>,
) -> Result<impl IntoResponse, ServiceError> {
    let user_id = query.user_id.ok_or(ServiceError::MissingField("user_id"))?;
    let assignments = state.directory.review_assignments(user_id).await?;
    Ok(Json(assignments))
}

#[derive(Deserialize)]
struct CreatePullRequestRequest {
    pull_request_name: Option<String>,
    author_id: Option<i64>,
}

async fn create_pull_request(
    State(state): State<AppState>,
    Json(req): Json<CreatePullRequestRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let name = req
        .pull_request_name
        .ok_or(ServiceError::MissingField("pull_request_name"))?;
    let author_id = req.author_id.ok_or(ServiceError::MissingField("author_id"))?;
    let pr = state.pull_requests.create(&name, author_id).await?;
    Ok((StatusCode::CREATED, Json(json!({ "pr": pr }))))
}

#[derive(Deserialize)]
struct MergeRequest {
    pull_request_id: Option<i64>,
}

async fn merge_pull_request(
    State(state): State<AppState>,
    Json(req): Json<MergeRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let pull_request_id = req
        .pull_request_id
        .ok_or(ServiceError::MissingField("pull_request_id"))?;
    let pr = state.pull_requests.merge(pull_request_id).await?;
    Ok(Json(json!({ "pr": pr })))
}

#[derive(Deserialize)]
struct ReassignRequest {
    pull_request_id: Option<i64>,
    old_user_id: Option<i64>,
}

async fn reassign_reviewer(
    State(state): State<AppState>,
    Json(req): Json<ReassignRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let pull_request_id = req
        .pull_request_id
        .ok_or(ServiceError::MissingField("pull_request_id"))?;
    let old_user_id = req.old_user_id.ok_or(ServiceError::MissingField("old_user_id"))?;
    let outcome = state
        .pull_requests
        .reassign(pull_request_id, old_user_id)
        .await?;
    Ok(Json(json!({
        "pr": outcome.pr,
        "replaced_by": outcome.replaced_by
    })))
}

async fn user_statistics(State(state): State<AppState>) -> Result<impl IntoResponse, ServiceError> {
    Ok(Json(state.stats.user_stats().await?))
}

async fn pr_statistics(State(state): State<AppState>) -> Result<impl IntoResponse, ServiceError> {
    Ok(Json(state.stats.pr_stats().await?))
}
