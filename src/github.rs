use std::{
  collections::HashSet,
  sync::{Arc, atomic::AtomicBool},
};

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::error::ChronicleError;

/// A closed GitHub issue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Issue {
  pub number: u64,
  pub title: String,
  pub author: String,
  pub closed_at: DateTime<Utc>,
  pub closed: bool,
  pub not_planned: bool,
  pub labels: HashSet<String>,
  pub url: String,
}

/// A merged GitHub pull request, with the issues it declares as "closing".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequest {
  pub number: u64,
  pub title: String,
  pub author: String,
  pub merged_at: DateTime<Utc>,
  pub labels: HashSet<String>,
  pub url: String,
  pub merge_commit: String,
  pub linked_issues: Vec<Issue>,
}

/// A published GitHub release. Drafts are fetched but never qualify as "the last release".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Release {
  pub version: String,
  pub date: DateTime<Utc>,
  pub is_latest: bool,
  pub is_draft: bool,
}

pub trait ForgeAdapter {
  fn merged_pull_requests(&self, owner: &str, repo: &str, since: Option<DateTime<Utc>>) -> Result<Vec<PullRequest>, ChronicleError>;
  fn closed_issues(&self, owner: &str, repo: &str, since: Option<DateTime<Utc>>) -> Result<Vec<Issue>, ChronicleError>;
  fn release(&self, owner: &str, repo: &str, reference: &str) -> Result<Option<Release>, ChronicleError>;
  fn releases(&self, owner: &str, repo: &str) -> Result<Vec<Release>, ChronicleError>;
}

/// Termination rule for a single paginated PR/issue batch. A candidate is processed iff its
/// "closing" timestamp is at or after `since`; paging terminates once a candidate's `updated_at`
/// AND closing timestamp both fall strictly before `since`.
pub fn should_process_candidate(closing_timestamp: DateTime<Utc>, since: Option<DateTime<Utc>>) -> bool {
  match since {
    Some(since) => closing_timestamp >= since,
    None => true,
  }
}

pub fn should_terminate_page(updated_at: DateTime<Utc>, closing_timestamp: DateTime<Utc>, since: Option<DateTime<Utc>>) -> bool {
  match since {
    Some(since) => updated_at < since && closing_timestamp < since,
    None => false,
  }
}

#[derive(Debug, Deserialize)]
struct GraphQlEnvelope<T> {
  data: Option<T>,
  errors: Option<Vec<GraphQlError>>,
}

#[derive(Debug, Deserialize)]
struct GraphQlError {
  message: String,
}

#[derive(Debug, Deserialize)]
struct PullRequestsResponse {
  repository: Option<PullRequestsRepository>,
}

#[derive(Debug, Deserialize)]
struct PullRequestsRepository {
  #[serde(rename = "pullRequests")]
  pull_requests: Connection<PrNode>,
}

#[derive(Debug, Deserialize)]
struct IssuesResponse {
  repository: Option<IssuesRepository>,
}

#[derive(Debug, Deserialize)]
struct IssuesRepository {
  issues: Connection<IssueNode>,
}

#[derive(Debug, Deserialize)]
struct Connection<T> {
  nodes: Vec<T>,
  #[serde(rename = "pageInfo")]
  page_info: PageInfo,
}

#[derive(Debug, Deserialize)]
struct PageInfo {
  #[serde(rename = "hasNextPage")]
  has_next_page: bool,
  #[serde(rename = "endCursor")]
  end_cursor: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Author {
  login: Option<String>,
}

#[derive(Debug, Deserialize)]
struct LabelsConnection {
  nodes: Vec<LabelNode>,
}

#[derive(Debug, Deserialize)]
struct LabelNode {
  name: String,
}

#[derive(Debug, Deserialize)]
struct MergeCommit {
  oid: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PrNode {
  number: u64,
  title: String,
  url: String,
  author: Option<Author>,
  #[serde(rename = "mergedAt")]
  merged_at: DateTime<Utc>,
  #[serde(rename = "updatedAt")]
  updated_at: DateTime<Utc>,
  #[serde(rename = "mergeCommit")]
  merge_commit: Option<MergeCommit>,
  labels: Option<LabelsConnection>,
  #[serde(rename = "closingIssuesReferences")]
  closing_issues_references: Option<Connection<IssueNode>>,
}

#[derive(Debug, Deserialize)]
struct IssueNode {
  number: u64,
  title: String,
  url: String,
  author: Option<Author>,
  #[serde(rename = "closedAt")]
  closed_at: Option<DateTime<Utc>>,
  #[serde(rename = "updatedAt")]
  updated_at: Option<DateTime<Utc>>,
  closed: bool,
  #[serde(rename = "stateReason")]
  state_reason: Option<String>,
  labels: Option<LabelsConnection>,
}

fn labels_of(labels: &Option<LabelsConnection>) -> HashSet<String> {
  labels
    .as_ref()
    .map(|connection| connection.nodes.iter().map(|node| node.name.clone()).collect())
    .unwrap_or_default()
}

fn issue_from_node(node: IssueNode) -> Issue {
  let closed_at = node.closed_at.unwrap_or_else(Utc::now);
  Issue {
    number: node.number,
    title: node.title,
    author: node.author.and_then(|a| a.login).unwrap_or_default(),
    closed_at,
    closed: node.closed,
    not_planned: node.state_reason.as_deref().is_some_and(|r| r.eq_ignore_ascii_case("NOT_PLANNED")),
    labels: labels_of(&node.labels),
    url: node.url,
  }
}

#[derive(Debug, Clone, Deserialize)]
struct RestRelease {
  tag_name: String,
  published_at: Option<DateTime<Utc>>,
  created_at: DateTime<Utc>,
  draft: bool,
  #[serde(default)]
  prerelease: bool,
}

/// Reads merged PRs, closed issues and releases from a GitHub-compatible forge, authenticated via
/// a process-wide token. Pagination is internal; the GraphQL endpoint is used for PRs/issues and
/// the REST endpoint for releases, mirroring the split in the upstream summarizer.
pub struct GithubClient {
  agent: ureq::Agent,
  token: String,
  host: String,
  graphql_url: String,
  rest_base: String,
  cancelled: Arc<AtomicBool>,
}

impl GithubClient {
  pub fn new(token: String, host: String) -> Self {
    let graphql_url = std::env::var("CHRONICLER_GITHUB_GRAPHQL_URL").unwrap_or_else(|_| format!("https://api.{host}/graphql"));
    let rest_base = std::env::var("CHRONICLER_GITHUB_API_BASE").unwrap_or_else(|_| format!("https://api.{host}"));

    Self {
      agent: ureq::AgentBuilder::new().build(),
      token,
      host,
      graphql_url,
      rest_base,
      cancelled: Arc::new(AtomicBool::new(false)),
    }
  }

  pub fn cancellation_handle(&self) -> Arc<AtomicBool> { Arc::clone(&self.cancelled) }

  fn is_cancelled(&self) -> bool { self.cancelled.load(std::sync::atomic::Ordering::Relaxed) }

  fn graphql<T: for<'de> Deserialize<'de>>(&self, query: &str, variables: serde_json::Value) -> Result<T, ChronicleError> {
    let body = serde_json::json!({ "query": query, "variables": variables });

    let response = self
      .agent
      .post(&self.graphql_url)
      .set("Authorization", &format!("Bearer {}", self.token))
      .set("User-Agent", "chronicler")
      .send_json(body)
      .map_err(|error| ChronicleError::ForgeTransport(error.to_string()))?;

    let envelope: GraphQlEnvelope<T> = response.into_json().map_err(|error| ChronicleError::ForgeTransport(error.to_string()))?;

    if let Some(errors) = envelope.errors
      && !errors.is_empty()
    {
      let messages = errors.into_iter().map(|e| e.message).collect::<Vec<_>>().join("; ");
      return Err(ChronicleError::ForgeTransport(messages));
    }

    envelope
      .data
      .ok_or_else(|| ChronicleError::ForgeTransport("empty GraphQL response".to_string()))
  }

  fn user_url(&self, login: &str) -> String { format!("https://{}/{}", self.host, login) }
}

const PR_QUERY: &str = r#"
query($owner: String!, $repo: String!, $cursor: String) {
  repository(owner: $owner, name: $repo) {
    pullRequests(first: 50, states: MERGED, after: $cursor, orderBy: {field: UPDATED_AT, direction: DESC}) {
      pageInfo { hasNextPage endCursor }
      nodes {
        number title url mergedAt updatedAt
        author { login }
        mergeCommit { oid }
        labels(first: 50) { nodes { name } }
        closingIssuesReferences(first: 10) {
          nodes {
            number title url closedAt updatedAt closed stateReason
            author { login }
            labels(first: 50) { nodes { name } }
          }
        }
      }
    }
  }
}
"#;

const ISSUE_QUERY: &str = r#"
query($owner: String!, $repo: String!, $cursor: String) {
  repository(owner: $owner, name: $repo) {
    issues(first: 100, states: CLOSED, after: $cursor, orderBy: {field: UPDATED_AT, direction: DESC}) {
      pageInfo { hasNextPage endCursor }
      nodes {
        number title url closedAt updatedAt closed stateReason
        author { login }
        labels(first: 100) { nodes { name } }
      }
    }
  }
}
"#;

impl ForgeAdapter for GithubClient {
  fn merged_pull_requests(&self, owner: &str, repo: &str, since: Option<DateTime<Utc>>) -> Result<Vec<PullRequest>, ChronicleError> {
    let mut all = Vec::new();
    let mut cursor: Option<String> = None;

    loop {
      if self.is_cancelled() {
        break;
      }

      let variables = serde_json::json!({ "owner": owner, "repo": repo, "cursor": cursor });
      let response: PullRequestsResponse = self.graphql(PR_QUERY, variables)?;
      let Some(repository) = response.repository else {
        break;
      };

      let mut terminate = false;
      for node in repository.pull_requests.nodes {
        if should_terminate_page(node.updated_at, node.merged_at, since) {
          terminate = true;
          break;
        }
        if !should_process_candidate(node.merged_at, since) {
          continue;
        }

        let linked_issues = node
          .closing_issues_references
          .map(|connection| connection.nodes.into_iter().map(issue_from_node).collect())
          .unwrap_or_default();

        all.push(PullRequest {
          number: node.number,
          title: node.title,
          author: node.author.and_then(|a| a.login).unwrap_or_default(),
          merged_at: node.merged_at,
          labels: labels_of(&node.labels),
          url: node.url,
          merge_commit: node.merge_commit.and_then(|m| m.oid).unwrap_or_default(),
          linked_issues,
        });
      }

      if terminate || !repository.pull_requests.page_info.has_next_page {
        break;
      }
      cursor = repository.pull_requests.page_info.end_cursor;
    }

    Ok(all)
  }

  fn closed_issues(&self, owner: &str, repo: &str, since: Option<DateTime<Utc>>) -> Result<Vec<Issue>, ChronicleError> {
    let mut all = Vec::new();
    let mut cursor: Option<String> = None;

    loop {
      if self.is_cancelled() {
        break;
      }

      let variables = serde_json::json!({ "owner": owner, "repo": repo, "cursor": cursor });
      let response: IssuesResponse = self.graphql(ISSUE_QUERY, variables)?;
      let Some(repository) = response.repository else {
        break;
      };

      let mut terminate = false;
      for node in repository.issues.nodes {
        let closed_at = node.closed_at.unwrap_or_else(Utc::now);
        let updated_at = node.updated_at.unwrap_or(closed_at);

        if should_terminate_page(updated_at, closed_at, since) {
          terminate = true;
          break;
        }
        if !should_process_candidate(closed_at, since) {
          continue;
        }

        all.push(issue_from_node(node));
      }

      if terminate || !repository.issues.page_info.has_next_page {
        break;
      }
      cursor = repository.issues.page_info.end_cursor;
    }

    Ok(all)
  }

  fn release(&self, owner: &str, repo: &str, reference: &str) -> Result<Option<Release>, ChronicleError> {
    let url = format!("{}/repos/{owner}/{repo}/releases/tags/{reference}", self.rest_base);
    let response = self
      .agent
      .get(&url)
      .set("Authorization", &format!("Bearer {}", self.token))
      .set("Accept", "application/vnd.github+json")
      .set("User-Agent", "chronicler")
      .call();

    match response {
      Ok(response) => {
        let release: RestRelease = response.into_json().map_err(|error| ChronicleError::ForgeTransport(error.to_string()))?;
        Ok(Some(to_release(release)))
      }
      Err(ureq::Error::Status(404, _)) => Ok(None),
      Err(error) => Err(ChronicleError::ForgeTransport(error.to_string())),
    }
  }

  fn releases(&self, owner: &str, repo: &str) -> Result<Vec<Release>, ChronicleError> {
    let url = format!("{}/repos/{owner}/{repo}/releases?per_page=100", self.rest_base);
    let response = self
      .agent
      .get(&url)
      .set("Authorization", &format!("Bearer {}", self.token))
      .set("Accept", "application/vnd.github+json")
      .set("User-Agent", "chronicler")
      .call()
      .map_err(|error| ChronicleError::ForgeTransport(error.to_string()))?;

    let mut releases: Vec<RestRelease> = response.into_json().map_err(|error| ChronicleError::ForgeTransport(error.to_string()))?;
    releases.sort_by_key(|r| r.published_at.unwrap_or(r.created_at));

    Ok(releases.into_iter().map(to_release).collect())
  }
}

fn to_release(release: RestRelease) -> Release {
  Release {
    version: release.tag_name,
    date: release.published_at.unwrap_or(release.created_at),
    is_latest: false,
    is_draft: release.draft,
  }
}

/// The last published (non-draft) release, chronologically, or `None` if there isn't one.
pub fn latest_non_draft(releases: &[Release]) -> Option<&Release> { releases.iter().filter(|r| !r.is_draft).next_back() }
