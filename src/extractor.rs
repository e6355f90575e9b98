use std::collections::HashSet;

use crate::{
  change::{Change, ChangeOrigin, ChangeType, ChangeTypeIndex, EntryKind, Reference},
  github::{Issue, PullRequest},
};

/// Tunables that shape how raw PRs/issues become user-facing `Change` entries. Everything here
/// corresponds to a `github.*` configuration knob.
pub struct ExtractionOptions {
  pub change_types: ChangeTypeIndex,
  pub host: String,
  /// Drop closed issues that have no linked merged PR instead of reporting them on their own.
  pub require_pr_for_issues: bool,
  pub include_unlabeled_prs: bool,
  pub include_unlabeled_issues: bool,
  /// When an issue is reported via its closing PR, also attribute the PR's author alongside the
  /// issue's own author.
  pub include_issue_pr_authors: bool,
  /// When an issue is reported via its closing PR, also reference the PR itself.
  pub include_issue_prs: bool,
}

fn author_reference(login: &str, host: &str) -> Reference { Reference { text: format!("@{login}"), url: format!("https://{host}/{login}") } }

fn classify(index: &ChangeTypeIndex, labels: &HashSet<String>, include_unlabeled: bool) -> Option<Vec<ChangeType>> {
  let types = index.change_types(labels);
  if !types.is_empty() {
    return Some(types);
  }
  include_unlabeled.then(|| vec![ChangeType::unknown()])
}

fn change_from_issue(issue: &Issue, options: &ExtractionOptions, closing_pr: Option<&PullRequest>) -> Option<Change> {
  let types = classify(&options.change_types, &issue.labels, options.include_unlabeled_issues)?;

  let mut references = vec![Reference { text: format!("#{}", issue.number), url: issue.url.clone() }, author_reference(&issue.author, &options.host)];

  if let Some(pr) = closing_pr {
    if options.include_issue_prs {
      references.push(Reference { text: format!("#{}", pr.number), url: pr.url.clone() });
    }
    if options.include_issue_pr_authors && pr.author != issue.author {
      references.push(author_reference(&pr.author, &options.host));
    }
  }

  Some(Change { text: issue.title.clone(), types, timestamp: issue.closed_at, references, entry_kind: EntryKind::Issue, origin: ChangeOrigin::Issue(issue.clone()) })
}

fn change_from_pr(pr: &PullRequest, options: &ExtractionOptions) -> Option<Change> {
  let types = classify(&options.change_types, &pr.labels, options.include_unlabeled_prs)?;

  Some(Change {
    text: pr.title.clone(),
    types,
    timestamp: pr.merged_at,
    references: vec![Reference { text: format!("#{}", pr.number), url: pr.url.clone() }, author_reference(&pr.author, &options.host)],
    entry_kind: EntryKind::Pr,
    origin: ChangeOrigin::Pr(pr.clone()),
  })
}

/// Turns already-filtered merged PRs and closed issues into the `Change` list a release is built
/// from, applying the six precedence rules in order:
///
/// 1. A merged PR with closed, planned linked issues reports those issues instead of itself.
/// 2. Rule 1 is overridden when the PR's own labels map to a recognized change type: the PR always
///    reports itself then, and its linked issues are informational only.
/// 3. A PR with any still-open linked issue suppresses issue-derived entries and falls back to
///    reporting the PR itself — the work isn't "done" from the issue's perspective yet.
/// 4. `require_pr_for_issues` drops closed issues that never got consumed by a PR above.
/// 5. Unlabeled PRs/issues are dropped unless the matching `include_unlabeled_*` flag is set, in
///    which case they're filed under the catch-all "unknown" change type.
/// 6. Issues closed as not-planned never produce a change (enforced upstream by the issue filter
///    chain, not here).
pub fn extract_changes(prs: &[PullRequest], issues: &[Issue], options: &ExtractionOptions) -> Vec<Change> {
  let mut changes = Vec::new();
  let mut consumed_issues = HashSet::new();

  for pr in prs {
    let has_open_linked_issue = pr.linked_issues.iter().any(|issue| !issue.closed);
    let closed_linked_issues = pr.linked_issues.iter().filter(|issue| issue.closed).collect::<Vec<_>>();
    let pr_has_recognized_type = !options.change_types.change_types(&pr.labels).is_empty();

    if !has_open_linked_issue && !closed_linked_issues.is_empty() && !pr_has_recognized_type {
      for issue in closed_linked_issues {
        consumed_issues.insert(issue.number);
        changes.extend(change_from_issue(issue, options, Some(pr)));
      }
    } else {
      changes.extend(change_from_pr(pr, options));
    }

    for issue in &pr.linked_issues {
      consumed_issues.insert(issue.number);
    }
  }

  if !options.require_pr_for_issues {
    for issue in issues {
      if consumed_issues.contains(&issue.number) {
        continue;
      }
      changes.extend(change_from_issue(issue, options, None));
    }
  }

  changes.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
  changes
}
