use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::presenter::PresenterFormat;

#[derive(clap::Args, Debug, Default)]
pub struct ForgeArgs {
  /// Override the GitHub API/forge host (default github.com).
  #[arg(long)]
  pub host: Option<String>,

  /// Override the GitHub access token (falls back to GITHUB_TOKEN).
  #[arg(long)]
  pub token: Option<String>,

  /// Override the detected owner.
  #[arg(long)]
  pub owner: Option<String>,

  /// Override the detected repository.
  #[arg(long)]
  pub repo: Option<String>,

  /// Drop closed issues that were never referenced by a merged PR.
  #[arg(long)]
  pub issues_require_linked_prs: bool,

  /// Include unlabeled merged PRs under "Additional Changes" instead of dropping them.
  #[arg(long)]
  pub include_unlabeled_prs: bool,

  /// Include unlabeled closed issues under "Additional Changes" instead of dropping them.
  #[arg(long)]
  pub include_unlabeled_issues: bool,

  /// Include issues closed as "not planned" instead of dropping them.
  #[arg(long)]
  pub include_issues_not_planned: bool,

  /// When an issue is reported via its closing PR, also attribute the PR's author.
  #[arg(long)]
  pub include_issue_pr_authors: bool,

  /// When an issue is reported via its closing PR, also reference the PR itself.
  #[arg(long)]
  pub include_issue_prs: bool,

  /// Re-admit a PR whose merge commit is reachable in range even though it merged before the window.
  #[arg(long)]
  pub consider_pr_merge_commits: bool,

  /// Succeed with an empty release instead of erroring when no changes are found.
  #[arg(long)]
  pub no_changes_ok: bool,
}

#[derive(clap::Args, Debug)]
pub struct CreateArgs {
  /// Path to the repository to summarize.
  #[arg(default_value = ".")]
  pub path: PathBuf,

  /// Start the range at this tag/commit instead of auto-detecting the previous release.
  #[arg(long = "since-tag", short = 's')]
  pub since_tag: Option<String>,

  /// End the range at this tag/commit instead of HEAD.
  #[arg(long = "until-tag", short = 'u')]
  pub until_tag: Option<String>,

  /// Override the release's title (defaults to its version).
  #[arg(long, short = 't')]
  pub title: Option<String>,

  /// Output format (defaults to `md`, overridable via config's `output` field).
  #[arg(long, short = 'o', value_enum)]
  pub output: Option<PresenterFormat>,

  /// Speculate the next version instead of using the resolved end tag.
  #[arg(long = "speculate-next-version", short = 'n')]
  pub speculate_next_version: bool,

  /// Treat a 0.x major bump as minor instead (no stable API to break yet).
  #[arg(long = "enforce-v0", short = 'e')]
  pub enforce_v0: bool,

  /// Write the speculated version string to this file.
  #[arg(long = "version-file")]
  pub version_file: Option<PathBuf>,

  #[command(flatten)]
  pub forge: ForgeArgs,
}

#[derive(clap::Args, Debug)]
pub struct NextVersionArgs {
  /// Path to the repository to summarize.
  #[arg(default_value = ".")]
  pub path: PathBuf,

  /// Start the range at this tag/commit instead of auto-detecting the previous release.
  #[arg(long = "since-tag", short = 's')]
  pub since_tag: Option<String>,

  /// End the range at this tag/commit instead of HEAD.
  #[arg(long = "until-tag", short = 'u')]
  pub until_tag: Option<String>,

  /// Treat a 0.x major bump as minor instead (no stable API to break yet).
  #[arg(long = "enforce-v0", short = 'e')]
  pub enforce_v0: bool,

  /// Allow returning a version that collides with an existing tag instead of skipping forward.
  #[arg(long)]
  pub allow_collision: bool,

  #[command(flatten)]
  pub forge: ForgeArgs,
}

#[derive(Subcommand, Debug)]
pub enum Command {
  /// Summarize merged PRs and closed issues into a release changelog.
  #[command(alias = "c")]
  Create(CreateArgs),
  /// Speculate the next semantic version without rendering a full release.
  #[command(alias = "n")]
  NextVersion(NextVersionArgs),
  /// Print the tool's own version.
  Version,
}

impl Command {
  pub fn name(&self) -> &'static str {
    match self {
      Self::Create(_) => "create",
      Self::NextVersion(_) => "next-version",
      Self::Version => "version",
    }
  }
}

#[derive(Parser, Debug)]
#[command(version, about)]
pub struct Args {
  /// Optional explicit config file path.
  #[arg(long, short = 'c', global = true)]
  pub config: Option<PathBuf>,

  /// Increase logging verbosity (repeatable).
  #[arg(long, short = 'v', global = true, action = clap::ArgAction::Count)]
  pub verbose: u8,

  /// Only log errors.
  #[arg(long, short = 'q', global = true, conflicts_with = "verbose")]
  pub quiet: bool,

  #[command(subcommand)]
  pub command: Command,
}
