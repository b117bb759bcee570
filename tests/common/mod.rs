//! Shared harness for integration tests: an in-memory database with the
//! schema applied, plus the three components wired to it.

#![allow(dead_code)]

use review_service::database::Database;
use review_service::directory::{NewMember, TeamDirectory, TeamWithMembers};
use review_service::review::PullRequestService;
use review_service::stats::Statistics;

pub struct TestApp {
    pub directory: TeamDirectory,
    pub pull_requests: PullRequestService,
    pub stats: Statistics,
}

pub async fn setup() -> TestApp {
    let db = Database::new_in_memory()
        .await
        .expect("Failed to create database");
    db.run_migrations().await.expect("Failed to run migrations");

    TestApp {
        directory: TeamDirectory::new(db.clone()),
        pull_requests: PullRequestService::new(db.clone()),
        stats: Statistics::new(db),
    }
}

pub fn member(username: &str, is_active: bool) -> NewMember {
    NewMember {
        username: username.to_string(),
        is_active,
    }
}

/// Create a team from `(username, is_active)` pairs.
pub async fn team_with(
    app: &TestApp,
    team_name: &str,
    members: &[(&str, bool)],
) -> TeamWithMembers {
    let members = members
        .iter()
        .map(|(name, active)| member(name, *active))
        .collect();
    app.directory
        .add_team(team_name, members)
        .await
        .expect("Failed to create team")
}

/// Id of the named member within a created team.
pub fn member_id(team: &TeamWithMembers, username: &str) -> i64 {
    team.members
        .iter()
        .find(|m| m.username == username)
        .unwrap_or_else(|| panic!("no member {} in {}", username, team.team_name))
        .id
}
