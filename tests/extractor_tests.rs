use std::collections::HashSet;

use chronicler::{
  change::{ChangeTypeEntry, ChangeTypeIndex, EntryKind},
  extractor::{ExtractionOptions, extract_changes},
  github::{Issue, PullRequest},
};
use chrono::{TimeZone, Utc};

fn change_types() -> ChangeTypeIndex {
  ChangeTypeIndex::from_entries(&[ChangeTypeEntry {
    name: "bug-fix".to_string(),
    title: "Bug Fixes".to_string(),
    semver_kind: "patch".to_string(),
    labels: vec!["bug".to_string()],
  }])
  .unwrap()
}

fn options(change_types: ChangeTypeIndex) -> ExtractionOptions {
  ExtractionOptions {
    change_types,
    host: "github.com".to_string(),
    require_pr_for_issues: false,
    include_unlabeled_prs: false,
    include_unlabeled_issues: false,
    include_issue_pr_authors: false,
    include_issue_prs: false,
  }
}

fn ts(year: i32, month: u32, day: u32) -> chrono::DateTime<Utc> { Utc.with_ymd_and_hms(year, month, day, 0, 0, 0).unwrap() }

fn issue(number: u64, title: &str, closed: bool, labels: &[&str]) -> Issue {
  Issue {
    number,
    title: title.to_string(),
    author: "alice".to_string(),
    closed_at: ts(2026, 1, number as u32 + 1),
    closed,
    not_planned: false,
    labels: labels.iter().map(|l| l.to_string()).collect::<HashSet<_>>(),
    url: format!("https://github.com/octo/widgets/issues/{number}"),
  }
}

fn pr(number: u64, title: &str, labels: &[&str], linked_issues: Vec<Issue>) -> PullRequest {
  PullRequest {
    number,
    title: title.to_string(),
    author: "bob".to_string(),
    merged_at: ts(2026, 1, number as u32 + 1),
    labels: labels.iter().map(|l| l.to_string()).collect::<HashSet<_>>(),
    url: format!("https://github.com/octo/widgets/pull/{number}"),
    merge_commit: format!("commit-{number}"),
    linked_issues,
  }
}

#[test]
fn closed_linked_issue_takes_precedence_over_its_pr() {
  let linked = issue(1, "Fix crash on startup", true, &["bug"]);
  let prs = vec![pr(10, "Merge PR #10", &[], vec![linked.clone()])];

  let changes = extract_changes(&prs, &[], &options(change_types()));

  assert_eq!(changes.len(), 1);
  assert_eq!(changes[0].text, "Fix crash on startup");
  assert_eq!(changes[0].entry_kind, EntryKind::Issue);
}

#[test]
fn pr_with_a_recognized_label_reports_itself_instead_of_its_linked_issue() {
  let linked = issue(1, "Fix crash on startup", true, &["bug"]);
  let prs = vec![pr(10, "fix: startup crash", &["bug"], vec![linked])];

  let changes = extract_changes(&prs, &[], &options(change_types()));

  assert_eq!(changes.len(), 1);
  assert_eq!(changes[0].text, "fix: startup crash");
  assert_eq!(changes[0].entry_kind, EntryKind::Pr);
}

#[test]
fn still_open_linked_issue_suppresses_issue_entries_and_falls_back_to_the_pr() {
  let linked = issue(1, "Still being investigated", false, &["bug"]);
  let prs = vec![pr(10, "fix: partial workaround", &["bug"], vec![linked])];

  let changes = extract_changes(&prs, &[], &options(change_types()));

  assert_eq!(changes.len(), 1);
  assert_eq!(changes[0].text, "fix: partial workaround");
  assert_eq!(changes[0].entry_kind, EntryKind::Pr);
}

#[test]
fn orphan_issues_are_reported_unless_a_pr_is_required() {
  let orphan = issue(2, "Typo in docs", true, &["bug"]);

  let included = extract_changes(&[], &[orphan.clone()], &options(change_types()));
  assert_eq!(included.len(), 1);

  let mut opts = options(change_types());
  opts.require_pr_for_issues = true;
  let excluded = extract_changes(&[], &[orphan], &opts);
  assert!(excluded.is_empty());
}

#[test]
fn unlabeled_prs_are_dropped_unless_explicitly_included() {
  let unlabeled_pr = pr(11, "chore: tidy up", &[], vec![]);

  let dropped = extract_changes(&[unlabeled_pr.clone()], &[], &options(change_types()));
  assert!(dropped.is_empty());

  let mut opts = options(change_types());
  opts.include_unlabeled_prs = true;
  let included = extract_changes(&[unlabeled_pr], &[], &opts);
  assert_eq!(included.len(), 1);
  assert_eq!(included[0].types[0].name, "unknown");
}
