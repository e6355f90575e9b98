use regex::Regex;

use crate::{change::Change, error::ChronicleError, scope::ChangeScope};

/// Placeholder version used when neither an end tag nor a speculated version could be resolved.
pub const UNRELEASED: &str = "(Unreleased)";

/// A fully assembled release, ready to be handed to a presenter.
#[derive(Debug, Clone)]
pub struct ReleaseDescription {
  pub owner: String,
  pub repo: String,
  pub version: String,
  pub title: String,
  pub previous_version: Option<String>,
  pub changes: Vec<Change>,
  pub compare_url: Option<String>,
}

/// Splits a GitHub remote URL (`https://github.com/owner/repo.git`, `git@github.com:owner/repo.git`,
/// or the bare `owner/repo` shorthand) into `(owner, repo)`.
pub fn parse_remote(remote_url: &str) -> Result<(String, String), ChronicleError> {
  let patterns = [
    r"^https?://[^/]+/(?P<owner>[^/]+)/(?P<repo>[^/]+?)(?:\.git)?/?$",
    r"^git@[^:]+:(?P<owner>[^/]+)/(?P<repo>[^/]+?)(?:\.git)?$",
    r"^(?P<owner>[^/]+)/(?P<repo>[^/]+)$",
  ];

  for pattern in patterns {
    let regex = Regex::new(pattern).expect("static remote URL pattern is valid");
    if let Some(captures) = regex.captures(remote_url.trim()) {
      return Ok((captures["owner"].to_string(), captures["repo"].to_string()));
    }
  }

  Err(ChronicleError::BadConfig(format!("cannot determine owner/repo from remote {remote_url:?}")))
}

fn compare_url(host: &str, owner: &str, repo: &str, previous: &str, current: &str) -> String { format!("https://{host}/{owner}/{repo}/compare/{previous}...{current}") }

/// Assembles the final release description from a resolved scope, the extracted changes, and an
/// already-resolved version label (the end tag, a speculated version, or [`UNRELEASED`]).
pub fn assemble(host: &str, owner: &str, repo: &str, scope: &ChangeScope, changes: Vec<Change>, version: String, title: Option<String>) -> ReleaseDescription {
  let previous_version = scope.since.as_ref().map(crate::scope::ChangePoint::label);

  let compare_url = if version == UNRELEASED {
    None
  } else {
    previous_version.as_ref().map(|previous| compare_url(host, owner, repo, previous, &version))
  };

  let title = title.unwrap_or_else(|| version.clone());

  ReleaseDescription { owner: owner.to_string(), repo: repo.to_string(), version, title, previous_version, changes, compare_url }
}
