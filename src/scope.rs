use chrono::{DateTime, Utc};

use crate::{
  error::ChronicleError,
  git::{Tag, VcsAdapter},
};

/// One endpoint of a change range: either an existing tag, or the repository's root commit when
/// there is no prior tag at all.
#[derive(Debug, Clone)]
pub enum ChangePoint {
  Tag(Tag),
  RootCommit(String),
}

impl ChangePoint {
  pub fn reference(&self) -> &str {
    match self {
      Self::Tag(tag) => &tag.commit,
      Self::RootCommit(commit) => commit,
    }
  }

  pub fn timestamp(&self) -> Option<DateTime<Utc>> {
    match self {
      Self::Tag(tag) => Some(tag.timestamp),
      Self::RootCommit(_) => None,
    }
  }

  pub fn label(&self) -> String {
    match self {
      Self::Tag(tag) => tag.name.clone(),
      Self::RootCommit(commit) => commit.clone(),
    }
  }
}

/// The resolved range a single run summarizes: everything after `since` up to and including `until`.
#[derive(Debug, Clone)]
pub struct ChangeScope {
  pub since: Option<ChangePoint>,
  pub until: ChangePoint,
}

/// Resolves the range to summarize.
///
/// `until` defaults to HEAD's tag if HEAD is tagged, otherwise HEAD's commit directly. `since`
/// defaults to the tag immediately preceding `until`; when no prior tag exists, falls back to the
/// repository's root commit so a first-ever release still has a bounded range. A repository with
/// no commits at all is `NoHistory`.
pub fn resolve_scope(vcs: &dyn VcsAdapter, explicit_since: Option<&str>, explicit_until: Option<&str>) -> Result<ChangeScope, ChronicleError> {
  let until = match explicit_until {
    Some(reference) => resolve_point(vcs, reference)?,
    None => {
      let head_reference = vcs.head_tag_or_commit()?;
      resolve_point(vcs, &head_reference)?
    }
  };

  let since = match explicit_since {
    Some(reference) => Some(resolve_point(vcs, reference)?),
    None => previous_tag(vcs, &until)?.map(ChangePoint::Tag).or(root_commit_point(vcs)?),
  };

  Ok(ChangeScope { since, until })
}

fn resolve_point(vcs: &dyn VcsAdapter, reference: &str) -> Result<ChangePoint, ChronicleError> {
  if let Some(tag) = vcs.search_tag(reference)? {
    return Ok(ChangePoint::Tag(tag));
  }

  Ok(ChangePoint::RootCommit(reference.to_string()))
}

/// The tag chronologically immediately before `until`, or `None` if `until` is the oldest tag
/// (or untagged, in which case all tags qualify).
fn previous_tag(vcs: &dyn VcsAdapter, until: &ChangePoint) -> Result<Option<Tag>, ChronicleError> {
  let mut tags = vcs.tags()?;
  tags.sort_by_key(|tag| std::cmp::Reverse(tag.timestamp));

  let until_commit = until.reference();
  let until_index = tags.iter().position(|tag| tag.commit == until_commit);

  match until_index {
    Some(index) => Ok(tags.into_iter().nth(index + 1)),
    None => Ok(tags.into_iter().next()),
  }
}

fn root_commit_point(vcs: &dyn VcsAdapter) -> Result<Option<ChangePoint>, ChronicleError> {
  match vcs.first_commit()? {
    Some(commit) => Ok(Some(ChangePoint::RootCommit(commit))),
    None => Err(ChronicleError::NoHistory),
  }
}
