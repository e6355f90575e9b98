use std::{collections::HashSet, path::Path};

use anyhow::{Context, Result, anyhow};

use crate::{
  change::{ChangeTypeIndex, significance},
  cli::{CreateArgs, ForgeArgs, NextVersionArgs},
  config::EffectiveConfig,
  error::ChronicleError,
  extractor::{ExtractionOptions, extract_changes},
  filters::{apply_issue_filters, apply_pr_filters, closed_at_or_after, closed_at_or_before, exclude_issues_not_planned, merge_commit_in, merged_at_or_before, with_any_change_type, without_any_label},
  git::{CommitRange, GitRepository, VcsAdapter},
  github::{ForgeAdapter, GithubClient},
  presenter::{self, PresenterFormat},
  release::{UNRELEASED, assemble},
  scope::{ChangePoint, ChangeScope, resolve_scope},
  version::next_unique_version,
};

struct ResolvedForge {
  owner: String,
  repo: String,
  host: String,
  client: GithubClient,
  change_types: ChangeTypeIndex,
}

fn resolve_forge(path: &Path, forge: &ForgeArgs, since_tag: Option<&str>, until_tag: Option<&str>, config: &EffectiveConfig) -> Result<(GitRepository, ChangeScope, ResolvedForge)> {
  let git = GitRepository::discover(path)?;
  let remote_url = git.remote_url()?;
  let (remote_owner, remote_repo) = crate::release::parse_remote(&remote_url)?;

  let owner = forge.owner.clone().unwrap_or(remote_owner);
  let repo = forge.repo.clone().unwrap_or(remote_repo);
  let host = forge.host.clone().unwrap_or_else(|| config.host.clone());

  let token = forge
    .token
    .clone()
    .or_else(|| config.token.clone())
    .ok_or_else(|| anyhow!("no GitHub token configured (set --token, CHRONICLER_GITHUB_TOKEN or GITHUB_TOKEN)"))?;

  let scope = resolve_scope(&git, since_tag.or(config.since_tag.as_deref()), until_tag.or(config.until_tag.as_deref()))?;

  let change_types = ChangeTypeIndex::from_entries(&config.change_types)?;

  Ok((git, scope, ResolvedForge { owner, repo, host: host.clone(), client: GithubClient::new(token, host), change_types }))
}

fn effective_flag(flag: bool, config_value: bool) -> bool { flag || config_value }

fn collect_changes(git: &GitRepository, scope: &ChangeScope, forge: &ForgeArgs, resolved: &ResolvedForge, config: &EffectiveConfig) -> Result<(Vec<crate::change::Change>, crate::change::ChangeKind)> {
  let since_ts = scope.since.as_ref().and_then(ChangePoint::timestamp);
  let until_ts = scope.until.timestamp();

  let mut prs = if config.include_prs { resolved.client.merged_pull_requests(&resolved.owner, &resolved.repo, since_ts)? } else { Vec::new() };
  let issues = if config.include_issues { resolved.client.closed_issues(&resolved.owner, &resolved.repo, since_ts)? } else { Vec::new() };

  let issues_require_linked_prs = effective_flag(forge.issues_require_linked_prs, config.issues_require_linked_prs);
  let include_unlabeled_prs = effective_flag(forge.include_unlabeled_prs, config.include_unlabeled_prs);
  let include_unlabeled_issues = effective_flag(forge.include_unlabeled_issues, config.include_unlabeled_issues);
  let include_issues_not_planned = effective_flag(forge.include_issues_not_planned, config.include_issues_not_planned);
  let include_issue_pr_authors = effective_flag(forge.include_issue_pr_authors, config.include_issue_pr_authors);
  let include_issue_prs = effective_flag(forge.include_issue_prs, config.include_issue_prs);
  let consider_pr_merge_commits = effective_flag(forge.consider_pr_merge_commits, config.consider_pr_merge_commits);

  // `issues_require_linked_prs` with no PR traversal path at all can never surface a single
  // issue, since nothing would ever be linked against — that's a misconfiguration, not an empty
  // result.
  if issues_require_linked_prs && !config.include_prs {
    return Err(ChronicleError::BadConfig("issues-require-linked-prs needs PR traversal, but include-prs is disabled".to_string()).into());
  }

  prs.sort_by(|a, b| a.number.cmp(&b.number));
  prs.dedup_by(|a, b| a.number == b.number);

  let mut pr_filters: Vec<Box<dyn crate::filters::PrFilter>> = vec![without_any_label(config.exclude_labels.clone())];

  if let Some(until) = until_ts {
    pr_filters.push(merged_at_or_before(until));
  }

  if consider_pr_merge_commits {
    // A PR merged chronologically before `since` can still belong to this range if its merge
    // commit is reachable within it (e.g. a backport).
    let commit_range = CommitRange {
      since_ref: scope.since.as_ref().map(|point| point.reference().to_string()).unwrap_or_default(),
      until_ref: scope.until.reference().to_string(),
      include_start: false,
      include_end: true,
    };
    let commits_in_range = git.commits_between(&commit_range)?.into_iter().collect::<Vec<_>>();
    pr_filters.push(merge_commit_in(commits_in_range));
  }

  let mut issue_filters: Vec<Box<dyn crate::filters::IssueFilter>> = Vec::new();
  if let Some(since) = since_ts {
    issue_filters.push(closed_at_or_after(since));
  }
  if let Some(until) = until_ts {
    issue_filters.push(closed_at_or_before(until));
  }
  if !include_issues_not_planned {
    issue_filters.push(exclude_issues_not_planned());
  }
  if !include_unlabeled_issues {
    issue_filters.push(with_any_change_type(resolved.change_types.clone()));
  }

  let (accepted_prs, _) = apply_pr_filters(prs, &pr_filters);
  let (accepted_issues, _) = apply_issue_filters(issues, &issue_filters);

  let options = ExtractionOptions {
    change_types: resolved.change_types.clone(),
    host: resolved.host.clone(),
    require_pr_for_issues: issues_require_linked_prs,
    include_unlabeled_prs,
    include_unlabeled_issues,
    include_issue_pr_authors,
    include_issue_prs,
  };

  let changes = extract_changes(&accepted_prs, &accepted_issues, &options);
  let kind = significance(&changes);

  Ok((changes, kind))
}

fn base_version(scope: &ChangeScope) -> String {
  match &scope.since {
    Some(ChangePoint::Tag(tag)) => tag.name.clone(),
    _ => "0.0.0".to_string(),
  }
}

/// The release's version is the resolved end tag when one exists, else the speculated version
/// when asked for, else the `(Unreleased)` placeholder. When speculating with no qualifying
/// changes found, `bump_on_no_changes` decides between a patch bump and an error.
fn resolve_release_version(
  scope: &ChangeScope,
  significance: crate::change::ChangeKind,
  speculate: bool,
  enforce_v0: bool,
  bump_on_no_changes: bool,
  existing_tags: &HashSet<String>,
) -> Result<(String, Option<crate::version::SpeculatedVersion>)> {
  if let ChangePoint::Tag(tag) = &scope.until {
    return Ok((tag.name.clone(), None));
  }

  if speculate {
    let base = base_version(scope);
    let version = next_unique_version(&base, significance, enforce_v0, bump_on_no_changes, existing_tags)?;
    let rendered = crate::version::render(&version.unique, version.v_prefixed);
    return Ok((rendered, Some(version)));
  }

  Ok((UNRELEASED.to_string(), None))
}

pub fn execute_create(args: &CreateArgs, config: &EffectiveConfig) -> Result<()> {
  let (git, scope, resolved) = resolve_forge(&args.path, &args.forge, args.since_tag.as_deref(), args.until_tag.as_deref(), config)?;
  let (changes, significance) = collect_changes(&git, &scope, &args.forge, &resolved, config)?;

  let no_changes_ok = effective_flag(args.forge.no_changes_ok, config.no_changes_ok);
  if changes.is_empty() && !no_changes_ok {
    return Err(ChronicleError::NoChanges.into());
  }

  let enforce_v0 = effective_flag(args.enforce_v0, config.enforce_v0);
  let speculate = effective_flag(args.speculate_next_version, config.speculate_next_version);
  let existing_tags = git.tags()?.into_iter().map(|tag| tag.name).collect::<HashSet<_>>();

  let (version_label, speculated) = match resolve_release_version(&scope, significance, speculate, enforce_v0, no_changes_ok, &existing_tags) {
    Ok(resolved) => resolved,
    Err(error) if no_changes_ok => {
      log::debug!("no version could be resolved ({error}), falling back to {}", UNRELEASED);
      (UNRELEASED.to_string(), None)
    }
    Err(error) => return Err(error),
  };

  let title = args.title.clone().or_else(|| config.title.clone());
  let release = assemble(&resolved.host, &resolved.owner, &resolved.repo, &scope, changes, version_label, title);

  let output_format = args.output.unwrap_or_else(|| config.output.as_deref().map(PresenterFormat::from_config_str).unwrap_or(PresenterFormat::Markdown));

  let rendered = match output_format {
    PresenterFormat::Markdown => presenter::markdown::render(&release, &resolved.change_types),
    PresenterFormat::Json => presenter::json::render(&release)?,
  };

  println!("{rendered}");

  let version_file = args.version_file.clone().or_else(|| config.version_file.clone().map(std::path::PathBuf::from));
  if let Some(path) = version_file {
    if let Some(version) = &speculated {
      let rendered_version = crate::version::render(&version.unique, version.v_prefixed);
      std::fs::write(&path, format!("{rendered_version}\n")).with_context(|| format!("writing speculated version to {}", path.display()))?;
    } else {
      log::warn!("--version-file given but no version was speculated; nothing written");
    }
  }

  Ok(())
}

pub fn execute_next_version(args: &NextVersionArgs, config: &EffectiveConfig) -> Result<()> {
  let (git, scope, resolved) = resolve_forge(&args.path, &args.forge, args.since_tag.as_deref(), args.until_tag.as_deref(), config)?;
  let (_changes, significance) = collect_changes(&git, &scope, &args.forge, &resolved, config)?;

  let base = base_version(&scope);
  let enforce_v0 = effective_flag(args.enforce_v0, config.enforce_v0);
  let no_changes_ok = effective_flag(args.forge.no_changes_ok, config.no_changes_ok);

  let version = if args.allow_collision {
    crate::version::next_ideal_version(&base, significance, enforce_v0, no_changes_ok)?
  } else {
    let existing_tags = git.tags()?.into_iter().map(|tag| tag.name).collect::<HashSet<_>>();
    next_unique_version(&base, significance, enforce_v0, no_changes_ok, &existing_tags)?
  };

  println!("{}", crate::version::render(&version.unique, version.v_prefixed));
  Ok(())
}

pub fn execute_version() { println!("{}", env!("CARGO_PKG_VERSION")); }
