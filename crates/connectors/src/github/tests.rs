//! Tests for the GitHub connector

use chrono::NaiveDate;

use super::*;
use crate::config::GitHubConnectorConfig;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn commit(id: &str, y: i32, m: u32, d: u32) -> ActivityRecord {
    ActivityRecord::new(id, ActivityKind::Commit, date(y, m, d), "alice")
}

// =============================================================================
// construction
// =============================================================================

#[test]
fn test_new_with_defaults() {
    let github = GitHub::new(&GitHubConnectorConfig::default(), "ghp_test").unwrap();
    assert_eq!(github.api_url, "https://api.github.com");
    assert_eq!(github.page_size, 100);
}

#[test]
fn test_trailing_slash_stripped_from_api_url() {
    let config = GitHubConnectorConfig {
        api_url: "https://github.example.com/api/".into(),
        ..Default::default()
    };
    let github = GitHub::new(&config, "ghp_test").unwrap();
    assert_eq!(github.api_url, "https://github.example.com/api");
}

// =============================================================================
// finalize: watermark window, in-fetch dedup, candidate watermark
// =============================================================================

#[test]
fn test_finalize_keeps_watermark_day() {
    let outcome = finalize(
        ActivityKind::Commit,
        vec![
            commit("old", 2024, 1, 1),
            commit("boundary", 2024, 1, 5),
            commit("new", 2024, 1, 6),
        ],
        Some(date(2024, 1, 5)),
        date(2024, 12, 31),
    );
    let ids: Vec<_> = outcome.records.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, ["boundary", "new"]);
}

#[test]
fn test_finalize_dedups_within_fetch() {
    let outcome = finalize(
        ActivityKind::Commit,
        vec![commit("a", 2024, 1, 1), commit("a", 2024, 1, 1)],
        None,
        date(2024, 12, 31),
    );
    assert_eq!(outcome.records.len(), 1);
}

#[test]
fn test_finalize_drops_future_dates() {
    let outcome = finalize(
        ActivityKind::Commit,
        vec![commit("now", 2024, 3, 1), commit("future", 2024, 6, 1)],
        None,
        date(2024, 3, 15),
    );
    let ids: Vec<_> = outcome.records.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, ["now"]);
    assert_eq!(outcome.candidate_watermark, Some(date(2024, 3, 1)));
}

#[test]
fn test_finalize_candidate_is_max_observed_date() {
    let outcome = finalize(
        ActivityKind::Commit,
        vec![commit("a", 2024, 1, 3), commit("b", 2024, 1, 9), commit("c", 2024, 1, 4)],
        None,
        date(2024, 12, 31),
    );
    assert_eq!(outcome.candidate_watermark, Some(date(2024, 1, 9)));
}

#[test]
fn test_finalize_empty_fetch_has_no_candidate() {
    let outcome = finalize(
        ActivityKind::IssueOpened,
        vec![],
        Some(date(2024, 1, 1)),
        date(2024, 12, 31),
    );
    assert!(outcome.records.is_empty());
    assert_eq!(outcome.candidate_watermark, None);
}

// =============================================================================
// response parsing
// =============================================================================

#[test]
fn test_parse_commit_history_response() {
    let body = r#"{
        "data": {
            "repository": {
                "defaultBranchRef": {
                    "target": {
                        "history": {
                            "pageInfo": {"hasNextPage": true, "endCursor": "abc123"},
                            "edges": [
                                {"node": {
                                    "oid": "deadbeef",
                                    "authoredDate": "2024-01-02T15:04:05Z",
                                    "author": {"name": "Alice", "user": {"login": "alice"}}
                                }}
                            ]
                        }
                    }
                }
            }
        }
    }"#;
    let envelope: GraphQlResponse<CommitData> = serde_json::from_str(body).unwrap();
    let history = envelope
        .data
        .unwrap()
        .repository
        .unwrap()
        .default_branch_ref
        .unwrap()
        .target
        .unwrap()
        .history;
    assert_eq!(history.edges.len(), 1);
    assert_eq!(history.edges[0].node.oid, "deadbeef");
    assert_eq!(
        history.page_info.next_cursor().unwrap().as_str(),
        "abc123"
    );
}

#[test]
fn test_parse_issue_response_with_offset_timestamps() {
    let body = r#"{
        "data": {
            "repository": {
                "issues": {
                    "pageInfo": {"hasNextPage": false, "endCursor": null},
                    "edges": [
                        {"node": {
                            "number": 7,
                            "state": "CLOSED",
                            "createdAt": "2024-01-02T20:00:00-05:00",
                            "closedAt": "2024-02-01T00:30:00Z",
                            "author": null
                        }}
                    ]
                }
            }
        }
    }"#;
    let envelope: GraphQlResponse<IssuesData> = serde_json::from_str(body).unwrap();
    let issues = envelope.data.unwrap().repository.unwrap().issues;
    let node = &issues.edges[0].node;
    // offset timestamps normalize to UTC
    assert_eq!(node.created_at.date_naive(), date(2024, 1, 3));
    assert!(issues.page_info.next_cursor().is_none());
}

#[test]
fn test_graphql_errors_without_data() {
    let body = r#"{"errors": [{"message": "Field 'bogus' doesn't exist"}]}"#;
    let envelope: GraphQlResponse<IssuesData> = serde_json::from_str(body).unwrap();
    assert!(envelope.data.is_none());
    assert_eq!(envelope.errors.unwrap()[0].message, "Field 'bogus' doesn't exist");
}

#[test]
fn test_missing_repository_is_none() {
    let body = r#"{"data": {"repository": null}}"#;
    let envelope: GraphQlResponse<CommitData> = serde_json::from_str(body).unwrap();
    assert!(envelope.data.unwrap().repository.is_none());
}

// =============================================================================
// helpers
// =============================================================================

#[test]
fn test_actor_login_fallback_for_deleted_accounts() {
    assert_eq!(actor_login(&None), "ghost");
    assert_eq!(
        actor_login(&Some(Actor { login: "bob".into() })),
        "bob"
    );
}

#[test]
fn test_start_of_day_is_midnight_utc() {
    let ts = start_of_day(date(2024, 3, 15));
    assert_eq!(ts.to_rfc3339(), "2024-03-15T00:00:00+00:00");
}

#[test]
fn test_queries_paginate_and_filter() {
    for query in [COMMIT_HISTORY_QUERY, ISSUES_QUERY, PULL_REQUESTS_QUERY] {
        assert!(query.contains("pageInfo"));
        assert!(query.contains("endCursor"));
        assert!(query.contains("$after"));
    }
    assert!(COMMIT_HISTORY_QUERY.contains("$since: GitTimestamp"));
    assert!(ISSUES_QUERY.contains("filterBy: {since: $since}"));
}
