use std::{
  collections::HashMap,
  fs,
  path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::change::ChangeTypeEntry;

const DEFAULT_HOST: &str = "github.com";

const DEFAULT_CHANGE_TYPES: &[(&str, &str, &str, &[&str])] = &[
  ("breaking", "Breaking Changes", "major", &["breaking", "breaking-change"]),
  ("feature", "Features", "minor", &["enhancement", "feature"]),
  ("bug-fix", "Bug Fixes", "patch", &["bug", "bugfix"]),
  ("security", "Security Fixes", "patch", &["security"]),
  ("deprecation", "Deprecations", "minor", &["deprecation", "deprecated"]),
  ("documentation", "Documentation", "patch", &["documentation", "docs"]),
  ("removal", "Removals", "major", &["removal", "removed"]),
];

#[derive(Debug, Clone, Deserialize)]
pub struct ChangeTypeConfigEntry {
  pub name: String,
  pub title: String,
  #[serde(rename = "semver-field", alias = "semver")]
  pub semver: String,
  #[serde(default)]
  pub labels: Vec<String>,
}

impl From<ChangeTypeConfigEntry> for ChangeTypeEntry {
  fn from(entry: ChangeTypeConfigEntry) -> Self {
    ChangeTypeEntry { name: entry.name, title: entry.title, semver_kind: entry.semver, labels: entry.labels }
  }
}

fn default_change_types() -> Vec<ChangeTypeConfigEntry> {
  DEFAULT_CHANGE_TYPES
    .iter()
    .map(|(name, title, semver, labels)| ChangeTypeConfigEntry {
      name: (*name).to_string(),
      title: (*title).to_string(),
      semver: (*semver).to_string(),
      labels: labels.iter().map(ToString::to_string).collect(),
    })
    .collect()
}

/// The `github:` nested table — everything that shapes how artifacts are fetched and admitted.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub struct GithubFileConfig {
  pub host: Option<String>,
  pub token: Option<String>,
  pub exclude_labels: Option<Vec<String>>,
  pub include_prs: Option<bool>,
  pub include_issues: Option<bool>,
  pub include_unlabeled_prs: Option<bool>,
  pub include_unlabeled_issues: Option<bool>,
  pub include_issue_pr_authors: Option<bool>,
  pub include_issue_prs: Option<bool>,
  pub include_issues_not_planned: Option<bool>,
  pub issues_require_linked_prs: Option<bool>,
  pub consider_pr_merge_commits: Option<bool>,
  pub no_changes_ok: Option<bool>,
  pub changes: Option<Vec<ChangeTypeConfigEntry>>,
}

/// Root-level config — the run-shaping knobs that mirror `create`'s own flags.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub struct FileConfig {
  pub output: Option<String>,
  pub version_file: Option<String>,
  pub since_tag: Option<String>,
  pub until_tag: Option<String>,
  pub title: Option<String>,
  pub speculate_next_version: Option<bool>,
  pub enforce_v0: Option<bool>,
  #[serde(default)]
  pub github: GithubFileConfig,
}

/// Flag-sourced overrides, highest-precedence source in `EffectiveConfig::from_sources`.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
  pub host: Option<String>,
  pub token: Option<String>,
  pub since_tag: Option<String>,
  pub until_tag: Option<String>,
  pub title: Option<String>,
  pub output: Option<String>,
  pub version_file: Option<String>,
  pub speculate_next_version: Option<bool>,
  pub enforce_v0: Option<bool>,
  pub include_prs: Option<bool>,
  pub include_issues: Option<bool>,
  pub issues_require_linked_prs: Option<bool>,
  pub include_unlabeled_prs: Option<bool>,
  pub include_unlabeled_issues: Option<bool>,
  pub include_issues_not_planned: Option<bool>,
  pub include_issue_pr_authors: Option<bool>,
  pub include_issue_prs: Option<bool>,
  pub consider_pr_merge_commits: Option<bool>,
  pub exclude_labels: Option<Vec<String>>,
  pub no_changes_ok: Option<bool>,
  pub verbosity: u8,
  pub quiet: bool,
}

#[derive(Debug, Clone)]
pub struct EffectiveConfig {
  pub host: String,
  pub token: Option<String>,
  pub since_tag: Option<String>,
  pub until_tag: Option<String>,
  pub title: Option<String>,
  pub output: Option<String>,
  pub version_file: Option<String>,
  pub speculate_next_version: bool,
  pub enforce_v0: bool,
  pub include_prs: bool,
  pub include_issues: bool,
  pub issues_require_linked_prs: bool,
  pub include_unlabeled_prs: bool,
  pub include_unlabeled_issues: bool,
  pub include_issues_not_planned: bool,
  pub include_issue_pr_authors: bool,
  pub include_issue_prs: bool,
  pub consider_pr_merge_commits: bool,
  pub exclude_labels: Vec<String>,
  pub no_changes_ok: bool,
  pub change_types: Vec<ChangeTypeEntry>,
  pub verbosity: u8,
  pub quiet: bool,
}

impl EffectiveConfig {
  /// Merges flags, environment (`CHRONICLER_GITHUB_*`), the config file and defaults, in that
  /// precedence order. Root-level run-shaping settings (`title`, `output`, `version-file`, …) are
  /// only layered flag-over-file, since the reference forge's environment surface is limited to
  /// the access token.
  pub fn from_sources(config: Option<FileConfig>, env: &HashMap<String, String>, flags: ConfigOverrides) -> Self {
    let config = config.unwrap_or_default();
    let env_var = |key: &str| env.get(key).cloned();
    let env_bool = |key: &str| env_var(key).map(|v| matches!(v.as_str(), "1" | "true" | "yes"));

    let host = flags.host.or_else(|| env_var("CHRONICLER_GITHUB_HOST")).or_else(|| config.github.host.clone()).unwrap_or_else(|| DEFAULT_HOST.to_string());

    let token = flags
      .token
      .or_else(|| env_var("CHRONICLER_GITHUB_TOKEN"))
      .or_else(|| env_var("GITHUB_TOKEN"))
      .or_else(|| config.github.token.clone());

    let since_tag = flags.since_tag.or_else(|| config.since_tag.clone());
    let until_tag = flags.until_tag.or_else(|| config.until_tag.clone());
    let title = flags.title.or_else(|| config.title.clone());
    let output = flags.output.or_else(|| config.output.clone());
    let version_file = flags.version_file.or_else(|| config.version_file.clone());
    let speculate_next_version = flags.speculate_next_version.or(config.speculate_next_version).unwrap_or(false);

    let enforce_v0 = flags.enforce_v0.or_else(|| env_bool("CHRONICLER_GITHUB_ENFORCE_V0")).or(config.enforce_v0).unwrap_or(false);

    let include_prs = flags.include_prs.or_else(|| env_bool("CHRONICLER_GITHUB_INCLUDE_PRS")).or(config.github.include_prs).unwrap_or(true);

    let include_issues = flags.include_issues.or_else(|| env_bool("CHRONICLER_GITHUB_INCLUDE_ISSUES")).or(config.github.include_issues).unwrap_or(true);

    let issues_require_linked_prs = flags
      .issues_require_linked_prs
      .or_else(|| env_bool("CHRONICLER_GITHUB_ISSUES_REQUIRE_LINKED_PRS"))
      .or(config.github.issues_require_linked_prs)
      .unwrap_or(false);

    let include_unlabeled_prs = flags
      .include_unlabeled_prs
      .or_else(|| env_bool("CHRONICLER_GITHUB_INCLUDE_UNLABELED_PRS"))
      .or(config.github.include_unlabeled_prs)
      .unwrap_or(true);

    let include_unlabeled_issues = flags
      .include_unlabeled_issues
      .or_else(|| env_bool("CHRONICLER_GITHUB_INCLUDE_UNLABELED_ISSUES"))
      .or(config.github.include_unlabeled_issues)
      .unwrap_or(true);

    let include_issues_not_planned = flags
      .include_issues_not_planned
      .or_else(|| env_bool("CHRONICLER_GITHUB_INCLUDE_ISSUES_NOT_PLANNED"))
      .or(config.github.include_issues_not_planned)
      .unwrap_or(false);

    let include_issue_pr_authors = flags
      .include_issue_pr_authors
      .or_else(|| env_bool("CHRONICLER_GITHUB_INCLUDE_ISSUE_PR_AUTHORS"))
      .or(config.github.include_issue_pr_authors)
      .unwrap_or(false);

    let include_issue_prs = flags
      .include_issue_prs
      .or_else(|| env_bool("CHRONICLER_GITHUB_INCLUDE_ISSUE_PRS"))
      .or(config.github.include_issue_prs)
      .unwrap_or(false);

    let consider_pr_merge_commits = flags
      .consider_pr_merge_commits
      .or_else(|| env_bool("CHRONICLER_GITHUB_CONSIDER_PR_MERGE_COMMITS"))
      .or(config.github.consider_pr_merge_commits)
      .unwrap_or(true);

    let exclude_labels = flags.exclude_labels.or_else(|| config.github.exclude_labels.clone()).unwrap_or_else(|| vec!["skip-changelog".to_string(), "no-changelog".to_string()]);

    let no_changes_ok = flags.no_changes_ok.or_else(|| env_bool("CHRONICLER_GITHUB_NO_CHANGES_OK")).or(config.github.no_changes_ok).unwrap_or(false);

    let change_types = config.github.changes.clone().unwrap_or_else(default_change_types).into_iter().map(ChangeTypeEntry::from).collect();

    Self {
      host,
      token,
      since_tag,
      until_tag,
      title,
      output,
      version_file,
      speculate_next_version,
      enforce_v0,
      include_prs,
      include_issues,
      issues_require_linked_prs,
      include_unlabeled_prs,
      include_unlabeled_issues,
      include_issues_not_planned,
      include_issue_pr_authors,
      include_issue_prs,
      consider_pr_merge_commits,
      exclude_labels,
      no_changes_ok,
      change_types,
      verbosity: flags.verbosity,
      quiet: flags.quiet,
    }
  }
}

fn read_config(path: &Path) -> Result<FileConfig> {
  let content = fs::read_to_string(path).with_context(|| format!("Cannot read config file: {}", path.display()))?;
  serde_yaml::from_str::<FileConfig>(&content).with_context(|| format!("Invalid YAML in config file: {}", path.display()))
}

/// Loads the layered config file: an optional global `~/.config/chronicler.yml`, overlaid by a
/// local `chronicler.yml` in the current directory, or a single explicit `--config` path.
pub fn load_file(config_path_override: Option<&Path>) -> Result<Option<FileConfig>> {
  if let Some(path) = config_path_override {
    return read_config(path).map(Some);
  }

  let global = if let Some(home) = std::env::var_os("HOME") {
    PathBuf::from(home).join(".config/chronicler.yml")
  } else {
    PathBuf::from(".config/chronicler.yml")
  };

  let local = PathBuf::from("chronicler.yml");

  let mut result = if global.exists() { Some(read_config(&global)?) } else { None };

  if local.exists() {
    let overlay = read_config(&local)?;
    let mut merged = result.unwrap_or_default();

    merged.output = overlay.output.or(merged.output);
    merged.version_file = overlay.version_file.or(merged.version_file);
    merged.since_tag = overlay.since_tag.or(merged.since_tag);
    merged.until_tag = overlay.until_tag.or(merged.until_tag);
    merged.title = overlay.title.or(merged.title);
    merged.speculate_next_version = overlay.speculate_next_version.or(merged.speculate_next_version);
    merged.enforce_v0 = overlay.enforce_v0.or(merged.enforce_v0);

    merged.github.host = overlay.github.host.or(merged.github.host);
    merged.github.token = overlay.github.token.or(merged.github.token);
    merged.github.exclude_labels = overlay.github.exclude_labels.or(merged.github.exclude_labels);
    merged.github.include_prs = overlay.github.include_prs.or(merged.github.include_prs);
    merged.github.include_issues = overlay.github.include_issues.or(merged.github.include_issues);

    merged.github.include_unlabeled_prs = overlay.github.include_unlabeled_prs.or(merged.github.include_unlabeled_prs);
    merged.github.include_unlabeled_issues = overlay.github.include_unlabeled_issues.or(merged.github.include_unlabeled_issues);
    merged.github.include_issue_pr_authors = overlay.github.include_issue_pr_authors.or(merged.github.include_issue_pr_authors);
    merged.github.include_issue_prs = overlay.github.include_issue_prs.or(merged.github.include_issue_prs);
    merged.github.include_issues_not_planned = overlay.github.include_issues_not_planned.or(merged.github.include_issues_not_planned);
    merged.github.issues_require_linked_prs = overlay.github.issues_require_linked_prs.or(merged.github.issues_require_linked_prs);
    merged.github.consider_pr_merge_commits = overlay.github.consider_pr_merge_commits.or(merged.github.consider_pr_merge_commits);
    merged.github.no_changes_ok = overlay.github.no_changes_ok.or(merged.github.no_changes_ok);
    merged.github.changes = overlay.github.changes.or(merged.github.changes);

    result = Some(merged);
  }

  Ok(result)
}
