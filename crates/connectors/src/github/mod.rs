//! GitHub connector for pulling repository activity
//!
//! Fetches commit, issue and pull request history through the GraphQL API
//! and maps it into [`ActivityRecord`]s. Every fetch is constrained to the
//! caller's watermark: the watermark day itself is refetched (the API
//! returns boundary overlap there) and the merge engine drops ids that are
//! already cached.
//!
//! Query shapes follow the GraphQL connections convention:
//! `pageInfo { hasNextPage endCursor }` drives the paginator, and quota
//! state comes from the `X-RateLimit-*` response headers.

use std::collections::HashSet;

use chrono::{DateTime, NaiveDate, Utc};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use tally_model::{ActivityKind, ActivityRecord, FetchOutcome, RepoId};

use crate::clock::{Clock, SystemClock};
use crate::config::GitHubConnectorConfig;
use crate::error::ConnectorError;
use crate::http::{build_client, classify_status, rate_limit_from_headers};
use crate::pagination::{Cursor, Page, PageFetcher, Paginator, PaginatorConfig};
use crate::traits::ActivitySource;

/// Placeholder author for events whose GitHub account no longer exists
const GHOST_AUTHOR: &str = "ghost";

/// GitHub activity connector
pub struct GitHub<C: Clock = SystemClock> {
    token: String,
    api_url: String,
    client: reqwest::Client,
    paginator: PaginatorConfig,
    page_size: u32,
    clock: C,
}

impl GitHub {
    /// Create a connector with the given configuration and bearer token
    ///
    /// # Errors
    ///
    /// Returns error if HTTP client creation fails (e.g., TLS or proxy
    /// misconfiguration)
    pub fn new(
        config: &GitHubConnectorConfig,
        token: impl Into<String>,
    ) -> Result<Self, ConnectorError> {
        Self::with_clock(config, token, SystemClock)
    }
}

impl<C: Clock> GitHub<C> {
    /// Create a connector with an explicit clock (tests)
    pub fn with_clock(
        config: &GitHubConnectorConfig,
        token: impl Into<String>,
        clock: C,
    ) -> Result<Self, ConnectorError> {
        let client = build_client(config.timeout_secs)?;
        Ok(Self {
            token: token.into(),
            api_url: config.api_url.trim_end_matches('/').to_string(),
            client,
            paginator: config.paginator_config(),
            page_size: config.page_size,
            clock,
        })
    }

    /// POST a GraphQL query and deserialize the `data` payload
    async fn post_graphql<T: DeserializeOwned>(
        &self,
        query: &str,
        variables: serde_json::Value,
        entity: &str,
    ) -> Result<(T, Option<crate::pagination::RateLimitInfo>), ConnectorError> {
        let response = self
            .client
            .post(format!("{}/graphql", self.api_url))
            .bearer_auth(&self.token)
            .json(&json!({ "query": query, "variables": variables }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(classify_status(response, entity));
        }

        let rate_limit = rate_limit_from_headers(response.headers());
        let envelope: GraphQlResponse<T> = response.json().await?;

        match (envelope.data, envelope.errors) {
            (Some(data), _) => Ok((data, rate_limit)),
            (None, Some(errors)) => {
                let joined = errors
                    .iter()
                    .map(|e| e.message.as_str())
                    .collect::<Vec<_>>()
                    .join("; ");
                Err(ConnectorError::MalformedQuery(joined))
            }
            (None, None) => Err(ConnectorError::MalformedQuery(
                "response carried neither data nor errors".into(),
            )),
        }
    }

    async fn fetch_commit_records(
        &self,
        repo: &RepoId,
        since: Option<DateTime<Utc>>,
    ) -> Result<Vec<ActivityRecord>, ConnectorError> {
        let pager = CommitPager {
            github: self,
            repo,
            since,
        };
        let mut paginator = Paginator::with_clock(pager, self.paginator.clone(), &self.clock);
        let nodes = paginator.collect_all().await?;
        Ok(nodes
            .into_iter()
            .map(|node| {
                let author = node
                    .author
                    .as_ref()
                    .and_then(|a| a.user.as_ref().map(|u| u.login.clone()).or_else(|| a.name.clone()))
                    .unwrap_or_else(|| GHOST_AUTHOR.to_string());
                ActivityRecord::new(
                    node.oid,
                    ActivityKind::Commit,
                    node.authored_date.date_naive(),
                    author,
                )
            })
            .collect())
    }

    async fn fetch_issue_records(
        &self,
        repo: &RepoId,
        kind: ActivityKind,
        since: Option<DateTime<Utc>>,
    ) -> Result<Vec<ActivityRecord>, ConnectorError> {
        let pager = IssuePager {
            github: self,
            repo,
            since,
        };
        let mut paginator = Paginator::with_clock(pager, self.paginator.clone(), &self.clock);
        let nodes = paginator.collect_all().await?;
        Ok(nodes
            .into_iter()
            .filter_map(|node| {
                let author = actor_login(&node.author);
                match kind {
                    ActivityKind::IssueOpened => Some(ActivityRecord::new(
                        format!("issue-{}-opened", node.number),
                        kind,
                        node.created_at.date_naive(),
                        author,
                    )),
                    ActivityKind::IssueClosed => {
                        // still-open issues have no closed event yet
                        let closed_at = node.closed_at.filter(|_| node.state != "OPEN")?;
                        Some(ActivityRecord::new(
                            format!("issue-{}-closed", node.number),
                            kind,
                            closed_at.date_naive(),
                            author,
                        ))
                    }
                    _ => None,
                }
            })
            .collect())
    }

    async fn fetch_pull_records(
        &self,
        repo: &RepoId,
        kind: ActivityKind,
    ) -> Result<Vec<ActivityRecord>, ConnectorError> {
        let pager = PullPager { github: self, repo };
        let mut paginator = Paginator::with_clock(pager, self.paginator.clone(), &self.clock);
        let nodes = paginator.collect_all().await?;
        Ok(nodes
            .into_iter()
            .filter_map(|node| {
                let author = actor_login(&node.author);
                match kind {
                    ActivityKind::PullRequestOpened => Some(ActivityRecord::new(
                        format!("pr-{}-opened", node.number),
                        kind,
                        node.created_at.date_naive(),
                        author,
                    )),
                    ActivityKind::PullRequestMerged => {
                        let merged_at = node.merged_at?;
                        Some(ActivityRecord::new(
                            format!("pr-{}-merged", node.number),
                            kind,
                            merged_at.date_naive(),
                            author,
                        ))
                    }
                    _ => None,
                }
            })
            .collect())
    }
}

impl<C: Clock> ActivitySource for GitHub<C> {
    async fn fetch_activity(
        &self,
        repo: &RepoId,
        kind: ActivityKind,
        watermark: Option<NaiveDate>,
    ) -> Result<FetchOutcome, ConnectorError> {
        let since = watermark.map(start_of_day);
        let records = match kind {
            ActivityKind::Commit => self.fetch_commit_records(repo, since).await?,
            ActivityKind::IssueOpened | ActivityKind::IssueClosed => {
                self.fetch_issue_records(repo, kind, since).await?
            }
            // pullRequests has no server-side since filter; fetched in full
            // and narrowed below
            ActivityKind::PullRequestOpened | ActivityKind::PullRequestMerged => {
                self.fetch_pull_records(repo, kind).await?
            }
        };
        let outcome = finalize(kind, records, watermark, self.clock.now().date_naive());
        debug!(
            repo = %repo,
            kind = %kind,
            records = outcome.records.len(),
            candidate_watermark = ?outcome.candidate_watermark,
            "fetched activity"
        );
        Ok(outcome)
    }
}

/// Midnight UTC at the start of a date
fn start_of_day(date: NaiveDate) -> DateTime<Utc> {
    DateTime::from_naive_utc_and_offset(date.and_hms_opt(0, 0, 0).expect("valid time"), Utc)
}

fn actor_login(actor: &Option<Actor>) -> String {
    actor
        .as_ref()
        .map(|a| a.login.clone())
        .unwrap_or_else(|| GHOST_AUTHOR.to_string())
}

/// Narrow raw records to the watermark window, dedup within the fetch, and
/// derive the candidate watermark from what survived
///
/// Records dated after `today` are dropped: series never contain future
/// dates, even when a source's clock is skewed.
fn finalize(
    kind: ActivityKind,
    mut records: Vec<ActivityRecord>,
    watermark: Option<NaiveDate>,
    today: NaiveDate,
) -> FetchOutcome {
    if let Some(mark) = watermark {
        // the watermark day is kept: boundary overlap, merge drops known ids
        records.retain(|r| r.date >= mark);
    }
    records.retain(|r| r.date <= today);
    let mut seen = HashSet::new();
    records.retain(|r| seen.insert(r.id.clone()));
    let candidate_watermark = records.iter().map(|r| r.date).max();
    FetchOutcome {
        kind,
        records,
        candidate_watermark,
    }
}

// --- Paginators ---

struct CommitPager<'a, C: Clock> {
    github: &'a GitHub<C>,
    repo: &'a RepoId,
    since: Option<DateTime<Utc>>,
}

impl<C: Clock> PageFetcher for CommitPager<'_, C> {
    type Item = CommitNode;

    async fn fetch_page(&self, cursor: Option<&Cursor>) -> Result<Page<CommitNode>, ConnectorError> {
        let variables = json!({
            "owner": self.repo.owner(),
            "name": self.repo.name(),
            "first": self.github.page_size,
            "after": cursor.map(Cursor::as_str),
            "since": self.since.map(|t| t.to_rfc3339_opts(chrono::SecondsFormat::Secs, true)),
        });
        let (data, rate_limit): (CommitData, _) = self
            .github
            .post_graphql(COMMIT_HISTORY_QUERY, variables, &self.repo.to_string())
            .await?;

        let repository = data
            .repository
            .ok_or_else(|| ConnectorError::NotFound(self.repo.to_string()))?;
        // a repository with no default branch has no commit history yet
        let Some(history) = repository
            .default_branch_ref
            .and_then(|r| r.target)
            .map(|t| t.history)
        else {
            return Ok(Page {
                items: vec![],
                next_cursor: None,
                rate_limit,
            });
        };

        Ok(Page {
            items: history.edges.into_iter().map(|e| e.node).collect(),
            next_cursor: history.page_info.next_cursor(),
            rate_limit,
        })
    }
}

struct IssuePager<'a, C: Clock> {
    github: &'a GitHub<C>,
    repo: &'a RepoId,
    since: Option<DateTime<Utc>>,
}

impl<C: Clock> PageFetcher for IssuePager<'_, C> {
    type Item = IssueNode;

    async fn fetch_page(&self, cursor: Option<&Cursor>) -> Result<Page<IssueNode>, ConnectorError> {
        let variables = json!({
            "owner": self.repo.owner(),
            "name": self.repo.name(),
            "first": self.github.page_size,
            "after": cursor.map(Cursor::as_str),
            "since": self.since.map(|t| t.to_rfc3339_opts(chrono::SecondsFormat::Secs, true)),
        });
        let (data, rate_limit): (IssuesData, _) = self
            .github
            .post_graphql(ISSUES_QUERY, variables, &self.repo.to_string())
            .await?;

        let repository = data
            .repository
            .ok_or_else(|| ConnectorError::NotFound(self.repo.to_string()))?;
        let connection = repository.issues;

        Ok(Page {
            items: connection.edges.into_iter().map(|e| e.node).collect(),
            next_cursor: connection.page_info.next_cursor(),
            rate_limit,
        })
    }
}

struct PullPager<'a, C: Clock> {
    github: &'a GitHub<C>,
    repo: &'a RepoId,
}

impl<C: Clock> PageFetcher for PullPager<'_, C> {
    type Item = PullNode;

    async fn fetch_page(&self, cursor: Option<&Cursor>) -> Result<Page<PullNode>, ConnectorError> {
        let variables = json!({
            "owner": self.repo.owner(),
            "name": self.repo.name(),
            "first": self.github.page_size,
            "after": cursor.map(Cursor::as_str),
        });
        let (data, rate_limit): (PullsData, _) = self
            .github
            .post_graphql(PULL_REQUESTS_QUERY, variables, &self.repo.to_string())
            .await?;

        let repository = data
            .repository
            .ok_or_else(|| ConnectorError::NotFound(self.repo.to_string()))?;
        let connection = repository.pull_requests;

        Ok(Page {
            items: connection.edges.into_iter().map(|e| e.node).collect(),
            next_cursor: connection.page_info.next_cursor(),
            rate_limit,
        })
    }
}

// --- GraphQL queries ---

const COMMIT_HISTORY_QUERY: &str = r#"
query($owner: String!, $name: String!, $first: Int!, $after: String, $since: GitTimestamp) {
    repository(owner: $owner, name: $name) {
        defaultBranchRef {
            target {
                ... on Commit {
                    history(first: $first, after: $after, since: $since) {
                        pageInfo {
                            hasNextPage
                            endCursor
                        }
                        edges {
                            node {
                                oid
                                authoredDate
                                author {
                                    name
                                    user {
                                        login
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }
    }
}
"#;

const ISSUES_QUERY: &str = r#"
query($owner: String!, $name: String!, $first: Int!, $after: String, $since: DateTime) {
    repository(owner: $owner, name: $name) {
        issues(first: $first, after: $after, filterBy: {since: $since}, orderBy: {field: CREATED_AT, direction: ASC}) {
            pageInfo {
                hasNextPage
                endCursor
            }
            edges {
                node {
                    number
                    state
                    createdAt
                    closedAt
                    author {
                        login
                    }
                }
            }
        }
    }
}
"#;

const PULL_REQUESTS_QUERY: &str = r#"
query($owner: String!, $name: String!, $first: Int!, $after: String) {
    repository(owner: $owner, name: $name) {
        pullRequests(first: $first, after: $after, orderBy: {field: CREATED_AT, direction: ASC}) {
            pageInfo {
                hasNextPage
                endCursor
            }
            edges {
                node {
                    number
                    createdAt
                    mergedAt
                    author {
                        login
                    }
                }
            }
        }
    }
}
"#;

// --- API response types ---

#[derive(Debug, Deserialize)]
struct GraphQlResponse<T> {
    data: Option<T>,
    errors: Option<Vec<GraphQlError>>,
}

#[derive(Debug, Deserialize)]
struct GraphQlError {
    message: String,
}

#[derive(Debug, Deserialize)]
struct PageInfo {
    #[serde(rename = "hasNextPage")]
    has_next_page: bool,
    #[serde(rename = "endCursor")]
    end_cursor: Option<String>,
}

impl PageInfo {
    fn next_cursor(&self) -> Option<Cursor> {
        if self.has_next_page {
            self.end_cursor.clone().map(Cursor::from)
        } else {
            None
        }
    }
}

#[derive(Debug, Deserialize)]
struct Edge<N> {
    node: N,
}

#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "N: serde::Deserialize<'de>"))]
struct Connection<N> {
    #[serde(rename = "pageInfo")]
    page_info: PageInfo,
    #[serde(default)]
    edges: Vec<Edge<N>>,
}

#[derive(Debug, Deserialize)]
struct CommitData {
    repository: Option<CommitRepository>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CommitRepository {
    default_branch_ref: Option<BranchRef>,
}

#[derive(Debug, Deserialize)]
struct BranchRef {
    target: Option<CommitTarget>,
}

#[derive(Debug, Deserialize)]
struct CommitTarget {
    history: Connection<CommitNode>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CommitNode {
    oid: String,
    authored_date: DateTime<Utc>,
    author: Option<GitActor>,
}

#[derive(Debug, Deserialize)]
struct GitActor {
    name: Option<String>,
    user: Option<UserRef>,
}

#[derive(Debug, Deserialize)]
struct UserRef {
    login: String,
}

#[derive(Debug, Deserialize)]
struct IssuesData {
    repository: Option<IssuesRepository>,
}

#[derive(Debug, Deserialize)]
struct IssuesRepository {
    issues: Connection<IssueNode>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IssueNode {
    number: u64,
    state: String,
    created_at: DateTime<Utc>,
    closed_at: Option<DateTime<Utc>>,
    author: Option<Actor>,
}

#[derive(Debug, Deserialize)]
struct PullsData {
    repository: Option<PullsRepository>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PullsRepository {
    pull_requests: Connection<PullNode>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PullNode {
    number: u64,
    created_at: DateTime<Utc>,
    merged_at: Option<DateTime<Utc>>,
    author: Option<Actor>,
}

#[derive(Debug, Deserialize)]
struct Actor {
    login: String,
}

#[cfg(test)]
mod tests;
