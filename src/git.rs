use std::path::Path;

use chrono::{DateTime, TimeZone, Utc};
use git2::{ObjectType, Oid, Repository, Sort};

use crate::error::ChronicleError;

/// A resolved git tag, distinguishing annotated tags (their own tagger timestamp) from
/// lightweight tags (the committer timestamp of the commit they point at).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
  pub name: String,
  pub timestamp: DateTime<Utc>,
  pub commit: String,
  pub annotated: bool,
}

/// A commit-range query: walk from `until_ref` back toward `since_ref`, inclusivity independent
/// per endpoint. An empty `since_ref` walks to the root.
#[derive(Debug, Clone)]
pub struct CommitRange {
  pub since_ref: String,
  pub until_ref: String,
  pub include_start: bool,
  pub include_end: bool,
}

pub trait VcsAdapter {
  fn remote_url(&self) -> Result<String, ChronicleError>;
  fn head_tag_or_commit(&self) -> Result<String, ChronicleError>;
  fn head_tag(&self) -> Result<Option<String>, ChronicleError>;
  fn first_commit(&self) -> Result<Option<String>, ChronicleError>;
  fn search_tag(&self, name: &str) -> Result<Option<Tag>, ChronicleError>;
  fn tags(&self) -> Result<Vec<Tag>, ChronicleError>;
  fn commits_between(&self, range: &CommitRange) -> Result<Vec<String>, ChronicleError>;
}

pub fn is_repository(path: &Path) -> bool { Repository::discover(path).is_ok() }

fn transport_err(message: impl Into<String>) -> ChronicleError { ChronicleError::RefNotFound(message.into()) }

fn git_time_to_utc(seconds: i64) -> DateTime<Utc> { Utc.timestamp_opt(seconds, 0).single().unwrap_or(DateTime::<Utc>::UNIX_EPOCH) }

/// Resolves a git reference (tag or commit-ish) into a `Tag`, distinguishing annotated tags from
/// lightweight ones. Returns `Ok(None)` when the name cannot be resolved at all, and
/// `Err(RefNotFound)` when it resolves to something that isn't (or doesn't peel to) a commit.
fn resolve_tag(repo: &Repository, name: &str) -> Result<Option<Tag>, ChronicleError> {
  let reference_name = format!("refs/tags/{name}");

  let object = match repo.revparse_single(&reference_name) {
    Ok(object) => object,
    Err(_) => match repo.revparse_single(name) {
      Ok(object) => object,
      Err(_) => return Ok(None),
    },
  };

  if let Some(tag) = object.as_tag() {
    let commit = tag
      .target()
      .map_err(|e| transport_err(e.to_string()))?
      .peel_to_commit()
      .map_err(|e| transport_err(e.to_string()))?;

    let timestamp = tag
      .tagger()
      .map(|sig| git_time_to_utc(sig.when().seconds()))
      .unwrap_or_else(|| git_time_to_utc(commit.time().seconds()));

    return Ok(Some(Tag {
      name: name.to_string(),
      timestamp,
      commit: commit.id().to_string(),
      annotated: true,
    }));
  }

  let commit = object.peel_to_commit().map_err(|e| transport_err(e.to_string()))?;

  Ok(Some(Tag {
    name: name.to_string(),
    timestamp: git_time_to_utc(commit.time().seconds()),
    commit: commit.id().to_string(),
    annotated: false,
  }))
}

pub struct GitRepository {
  repo: Repository,
}

impl GitRepository {
  pub fn discover(path: &Path) -> Result<Self, ChronicleError> {
    let repo = Repository::discover(path).map_err(|_| ChronicleError::NotARepository(path.display().to_string()))?;
    Ok(Self { repo })
  }

  fn resolve_oid(&self, reference: &str) -> Result<Oid, ChronicleError> {
    self
      .repo
      .revparse_single(reference)
      .map_err(|_| ChronicleError::RefNotFound(reference.to_string()))?
      .peel(ObjectType::Commit)
      .map_err(|_| ChronicleError::RefNotFound(reference.to_string()))
      .map(|object| object.id())
  }
}

impl VcsAdapter for GitRepository {
  fn remote_url(&self) -> Result<String, ChronicleError> {
    let remote = self
      .repo
      .find_remote("origin")
      .map_err(|e| ChronicleError::ForgeTransport(e.to_string()))?;

    remote
      .url()
      .map(ToString::to_string)
      .ok_or_else(|| ChronicleError::ForgeTransport("remote 'origin' has no URL".to_string()))
  }

  fn head_tag_or_commit(&self) -> Result<String, ChronicleError> {
    if let Some(tag) = self.head_tag()? {
      return Ok(tag);
    }

    let head = self.repo.head().map_err(|e| transport_err(e.to_string()))?;
    let oid = head.target().ok_or_else(|| transport_err("HEAD is not a direct reference"))?;
    Ok(oid.to_string())
  }

  fn head_tag(&self) -> Result<Option<String>, ChronicleError> {
    let head = self.repo.head().map_err(|e| transport_err(e.to_string()))?;
    let Some(head_oid) = head.target() else {
      return Ok(None);
    };

    let tag_names = self
      .repo
      .tag_names(None)
      .map_err(|e| transport_err(e.to_string()))?
      .iter()
      .flatten()
      .map(ToString::to_string)
      .collect::<Vec<_>>();

    for name in tag_names {
      if let Ok(Some(tag)) = resolve_tag(&self.repo, &name) {
        let tag_commit_oid = Oid::from_str(&tag.commit).map_err(|e| transport_err(e.to_string()))?;
        if tag_commit_oid == head_oid {
          return Ok(Some(name));
        }
      }
    }

    Ok(None)
  }

  fn first_commit(&self) -> Result<Option<String>, ChronicleError> {
    let head = match self.repo.head() {
      Ok(head) => head,
      Err(_) => return Ok(None),
    };
    let Some(head_oid) = head.target() else {
      return Ok(None);
    };

    let mut revwalk = self.repo.revwalk().map_err(|e| transport_err(e.to_string()))?;
    revwalk.push(head_oid).map_err(|e| transport_err(e.to_string()))?;
    revwalk.set_sorting(Sort::TOPOLOGICAL).map_err(|e| transport_err(e.to_string()))?;

    let root = revwalk.filter_map(std::result::Result::ok).last().map(|oid| oid.to_string());

    Ok(root)
  }

  fn search_tag(&self, name: &str) -> Result<Option<Tag>, ChronicleError> { resolve_tag(&self.repo, name) }

  fn tags(&self) -> Result<Vec<Tag>, ChronicleError> {
    let names = self
      .repo
      .tag_names(None)
      .map_err(|e| transport_err(e.to_string()))?
      .iter()
      .flatten()
      .map(ToString::to_string)
      .collect::<Vec<_>>();

    let mut tags = names
      .into_iter()
      .filter_map(|name| resolve_tag(&self.repo, &name).ok().flatten())
      .collect::<Vec<_>>();

    tags.sort_by_key(|tag| std::cmp::Reverse(tag.timestamp));
    Ok(tags)
  }

  fn commits_between(&self, range: &CommitRange) -> Result<Vec<String>, ChronicleError> {
    let until_oid = self.resolve_oid(&range.until_ref)?;

    let mut revwalk = self.repo.revwalk().map_err(|e| transport_err(e.to_string()))?;
    revwalk.set_sorting(Sort::TIME).map_err(|e| transport_err(e.to_string()))?;
    revwalk.push(until_oid).map_err(|e| transport_err(e.to_string()))?;

    if !range.since_ref.is_empty() {
      let since_oid = self.resolve_oid(&range.since_ref)?;
      revwalk.hide(since_oid).map_err(|e| transport_err(e.to_string()))?;
    }

    let mut commits = revwalk.filter_map(std::result::Result::ok).map(|oid| oid.to_string()).collect::<Vec<_>>();

    if !range.include_end && commits.first().map(|first| first == &until_oid.to_string()).unwrap_or(false) {
      commits.remove(0);
    }

    if !range.include_start
      && !range.since_ref.is_empty()
      && let Ok(since_oid) = self.resolve_oid(&range.since_ref)
      && let Some(position) = commits.iter().position(|commit| commit == &since_oid.to_string())
    {
      commits.remove(position);
    }

    Ok(commits)
  }
}
