use chrono::{DateTime, Utc};

use crate::{
  change::ChangeTypeIndex,
  github::{Issue, PullRequest},
};

/// A named predicate over closed issues. Composes into a chain; an issue survives only if every
/// filter in the chain accepts it.
pub trait IssueFilter {
  fn accepts(&self, issue: &Issue) -> bool;
  fn describe(&self) -> String;
}

/// A named predicate over merged pull requests, mirroring `IssueFilter`.
pub trait PrFilter {
  fn accepts(&self, pr: &PullRequest) -> bool;
  fn describe(&self) -> String;
}

struct ClosedAtOrAfter(DateTime<Utc>);
impl IssueFilter for ClosedAtOrAfter {
  fn accepts(&self, issue: &Issue) -> bool { issue.closed_at >= self.0 }
  fn describe(&self) -> String { format!("closed at or after {}", self.0) }
}

pub fn closed_at_or_after(since: DateTime<Utc>) -> Box<dyn IssueFilter> { Box::new(ClosedAtOrAfter(since)) }

struct ClosedAfter(DateTime<Utc>);
impl IssueFilter for ClosedAfter {
  fn accepts(&self, issue: &Issue) -> bool { issue.closed_at > self.0 }
  fn describe(&self) -> String { format!("closed strictly after {}", self.0) }
}

pub fn closed_after(since: DateTime<Utc>) -> Box<dyn IssueFilter> { Box::new(ClosedAfter(since)) }

struct ClosedAtOrBefore(DateTime<Utc>);
impl IssueFilter for ClosedAtOrBefore {
  fn accepts(&self, issue: &Issue) -> bool { issue.closed_at <= self.0 }
  fn describe(&self) -> String { format!("closed at or before {}", self.0) }
}

pub fn closed_at_or_before(until: DateTime<Utc>) -> Box<dyn IssueFilter> { Box::new(ClosedAtOrBefore(until)) }

struct ClosedBefore(DateTime<Utc>);
impl IssueFilter for ClosedBefore {
  fn accepts(&self, issue: &Issue) -> bool { issue.closed_at < self.0 }
  fn describe(&self) -> String { format!("closed strictly before {}", self.0) }
}

pub fn closed_before(until: DateTime<Utc>) -> Box<dyn IssueFilter> { Box::new(ClosedBefore(until)) }

struct WithLabel(String);
impl IssueFilter for WithLabel {
  fn accepts(&self, issue: &Issue) -> bool { issue.labels.contains(&self.0) }
  fn describe(&self) -> String { format!("has label {:?}", self.0) }
}

pub fn with_label(label: impl Into<String>) -> Box<dyn IssueFilter> { Box::new(WithLabel(label.into())) }

struct WithoutLabel(String);
impl IssueFilter for WithoutLabel {
  fn accepts(&self, issue: &Issue) -> bool { !issue.labels.contains(&self.0) }
  fn describe(&self) -> String { format!("lacks label {:?}", self.0) }
}

pub fn without_label(label: impl Into<String>) -> Box<dyn IssueFilter> { Box::new(WithoutLabel(label.into())) }

struct WithAnyChangeType(ChangeTypeIndex);
impl IssueFilter for WithAnyChangeType {
  fn accepts(&self, issue: &Issue) -> bool { !self.0.change_types(&issue.labels).is_empty() }
  fn describe(&self) -> String { "matches at least one configured change type".to_string() }
}

pub fn with_any_change_type(index: ChangeTypeIndex) -> Box<dyn IssueFilter> { Box::new(WithAnyChangeType(index)) }

struct WithoutAnyLabel(Vec<String>);
impl PrFilter for WithoutAnyLabel {
  fn accepts(&self, pr: &PullRequest) -> bool { !self.0.iter().any(|label| pr.labels.contains(label)) }
  fn describe(&self) -> String { format!("lacks all of {:?}", self.0) }
}

pub fn without_any_label(labels: Vec<String>) -> Box<dyn PrFilter> { Box::new(WithoutAnyLabel(labels)) }

struct MergedAtOrAfter(DateTime<Utc>);
impl PrFilter for MergedAtOrAfter {
  fn accepts(&self, pr: &PullRequest) -> bool { pr.merged_at >= self.0 }
  fn describe(&self) -> String { format!("merged at or after {}", self.0) }
}

pub fn merged_at_or_after(since: DateTime<Utc>) -> Box<dyn PrFilter> { Box::new(MergedAtOrAfter(since)) }

struct MergedAfter(DateTime<Utc>);
impl PrFilter for MergedAfter {
  fn accepts(&self, pr: &PullRequest) -> bool { pr.merged_at > self.0 }
  fn describe(&self) -> String { format!("merged strictly after {}", self.0) }
}

pub fn merged_after(since: DateTime<Utc>) -> Box<dyn PrFilter> { Box::new(MergedAfter(since)) }

struct MergedAtOrBefore(DateTime<Utc>);
impl PrFilter for MergedAtOrBefore {
  fn accepts(&self, pr: &PullRequest) -> bool { pr.merged_at <= self.0 }
  fn describe(&self) -> String { format!("merged at or before {}", self.0) }
}

pub fn merged_at_or_before(until: DateTime<Utc>) -> Box<dyn PrFilter> { Box::new(MergedAtOrBefore(until)) }

struct MergedBefore(DateTime<Utc>);
impl PrFilter for MergedBefore {
  fn accepts(&self, pr: &PullRequest) -> bool { pr.merged_at < self.0 }
  fn describe(&self) -> String { format!("merged strictly before {}", self.0) }
}

pub fn merged_before(until: DateTime<Utc>) -> Box<dyn PrFilter> { Box::new(MergedBefore(until)) }

struct WithoutClosedLinkedIssue;
impl PrFilter for WithoutClosedLinkedIssue {
  fn accepts(&self, pr: &PullRequest) -> bool { !pr.linked_issues.iter().any(|issue| issue.closed) }
  fn describe(&self) -> String { "has no closed linked issue".to_string() }
}

pub fn without_closed_linked_issue() -> Box<dyn PrFilter> { Box::new(WithoutClosedLinkedIssue) }

struct WithClosedLinkedIssue;
impl PrFilter for WithClosedLinkedIssue {
  fn accepts(&self, pr: &PullRequest) -> bool { pr.linked_issues.iter().any(|issue| issue.closed) }
  fn describe(&self) -> String { "has at least one closed linked issue".to_string() }
}

pub fn with_closed_linked_issue() -> Box<dyn PrFilter> { Box::new(WithClosedLinkedIssue) }

struct WithoutOpenLinkedIssue;
impl PrFilter for WithoutOpenLinkedIssue {
  fn accepts(&self, pr: &PullRequest) -> bool { !pr.linked_issues.iter().any(|issue| !issue.closed) }
  fn describe(&self) -> String { "has no still-open linked issue".to_string() }
}

pub fn without_open_linked_issue() -> Box<dyn PrFilter> { Box::new(WithoutOpenLinkedIssue) }

struct ExcludeIssuesNotPlanned;
impl IssueFilter for ExcludeIssuesNotPlanned {
  fn accepts(&self, issue: &Issue) -> bool { !issue.not_planned }
  fn describe(&self) -> String { "excludes issues closed as not planned".to_string() }
}

pub fn exclude_issues_not_planned() -> Box<dyn IssueFilter> { Box::new(ExcludeIssuesNotPlanned) }

struct MergeCommitIn(Vec<String>);
impl PrFilter for MergeCommitIn {
  fn accepts(&self, pr: &PullRequest) -> bool { self.0.contains(&pr.merge_commit) }
  fn describe(&self) -> String { "merge commit is within the resolved commit range".to_string() }
}

pub fn merge_commit_in(commits: Vec<String>) -> Box<dyn PrFilter> { Box::new(MergeCommitIn(commits)) }

/// Partitions issues into (accepted, rejected); an issue is accepted only if every filter
/// accepts it.
pub fn apply_issue_filters(issues: Vec<Issue>, filters: &[Box<dyn IssueFilter>]) -> (Vec<Issue>, Vec<Issue>) {
  issues.into_iter().partition(|issue| filters.iter().all(|filter| filter.accepts(issue)))
}

/// Partitions pull requests into (accepted, rejected), same semantics as `apply_issue_filters`.
pub fn apply_pr_filters(prs: Vec<PullRequest>, filters: &[Box<dyn PrFilter>]) -> (Vec<PullRequest>, Vec<PullRequest>) {
  prs.into_iter().partition(|pr| filters.iter().all(|filter| filter.accepts(pr)))
}
