//! Tests for the user and pull request statistics rollups.

mod common;

use common::{member_id, setup, team_with};

#[tokio::test]
async fn user_stats_counts_assignments_and_includes_zero_rows() {
    let app = setup().await;
    let team = team_with(
        &app,
        "alpha",
        &[("alice", true), ("bob", true), ("carol", false)],
    )
    .await;
    let alice = member_id(&team, "alice");
    let bob = member_id(&team, "bob");
    let carol = member_id(&team, "carol");

    // Bob is the only eligible reviewer, so he picks up both PRs.
    app.pull_requests.create("p1", alice).await.unwrap();
    app.pull_requests.create("p2", alice).await.unwrap();

    let stats = app.stats.user_stats().await.unwrap();
    assert_eq!(stats.len(), 3);

    let row = |id: i64| stats.iter().find(|r| r.user_id == id).unwrap();
    assert_eq!(row(bob).assignments_count, 2);
    assert_eq!(row(alice).assignments_count, 0);
    assert_eq!(row(carol).assignments_count, 0);
}

#[tokio::test]
async fn pr_stats_reports_reviewer_counts() {
    let app = setup().await;
    let team = team_with(
        &app,
        "alpha",
        &[("alice", true), ("bob", true), ("carol", true), ("dave", true)],
    )
    .await;
    let alice = member_id(&team, "alice");
    let dave = member_id(&team, "dave");

    let p1 = app.pull_requests.create("p1", alice).await.unwrap();
    let p2 = app.pull_requests.create("p2", dave).await.unwrap();

    let stats = app.stats.pr_stats().await.unwrap();
    assert_eq!(stats.len(), 2);
    for row in &stats {
        assert_eq!(row.reviewers_count, 2);
    }
    assert!(stats.iter().any(|r| r.pull_request_id == p1.pull_request.id
        && r.pull_request_name == "p1"));
    assert!(stats.iter().any(|r| r.pull_request_id == p2.pull_request.id
        && r.pull_request_name == "p2"));
}

#[tokio::test]
async fn reassignment_shifts_counts_without_changing_totals() {
    let app = setup().await;
    let team = team_with(
        &app,
        "alpha",
        &[("alice", true), ("bob", true), ("carol", true), ("dave", true)],
    )
    .await;
    let alice = member_id(&team, "alice");

    let pr = app.pull_requests.create("p1", alice).await.unwrap();
    let old_reviewer = pr.assigned_reviewers[0];
    let outcome = app
        .pull_requests
        .reassign(pr.pull_request.id, old_reviewer)
        .await
        .unwrap();

    let stats = app.stats.user_stats().await.unwrap();
    let row = |id: i64| stats.iter().find(|r| r.user_id == id).unwrap();
    assert_eq!(row(old_reviewer).assignments_count, 0);
    assert_eq!(row(outcome.replaced_by).assignments_count, 1);

    let total: i64 = stats.iter().map(|r| r.assignments_count).sum();
    assert_eq!(total, 2);
}
