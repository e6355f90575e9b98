use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};

use crate::{error::ChronicleError, github::Issue, github::PullRequest};

/// The semver weight carried by a change. Ordering is total and drives the version bump decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ChangeKind {
  Unknown,
  Patch,
  Minor,
  Major,
}

impl ChangeKind {
  pub fn parse(raw: &str) -> Option<Self> {
    match raw.to_ascii_lowercase().as_str() {
      "major" => Some(Self::Major),
      "minor" => Some(Self::Minor),
      "patch" => Some(Self::Patch),
      _ => None,
    }
  }

  pub fn as_str(self) -> &'static str {
    match self {
      Self::Unknown => "unknown",
      Self::Patch => "patch",
      Self::Minor => "minor",
      Self::Major => "major",
    }
  }
}

/// A named change category, e.g. `bug-fix`, carrying the semver weight it contributes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ChangeType {
  pub name: String,
  pub title: String,
  pub kind: ChangeKind,
}

impl ChangeType {
  pub fn unknown() -> Self {
    Self {
      name: "unknown".to_string(),
      title: "Additional Changes".to_string(),
      kind: ChangeKind::Unknown,
    }
  }
}

/// One raw entry from configuration: a label set mapped to a named, weighted change type.
#[derive(Debug, Clone)]
pub struct ChangeTypeEntry {
  pub name: String,
  pub title: String,
  pub semver_kind: String,
  pub labels: Vec<String>,
}

/// Maps label strings to change types. Later entries (by config order) win on label collision.
#[derive(Debug, Clone, Default)]
pub struct ChangeTypeIndex {
  by_label: HashMap<String, ChangeType>,
  ordered_types: Vec<ChangeType>,
}

impl ChangeTypeIndex {
  pub fn from_entries(entries: &[ChangeTypeEntry]) -> Result<Self, ChronicleError> {
    let mut by_label = HashMap::new();
    let mut ordered_types = Vec::new();

    for entry in entries {
      let kind = ChangeKind::parse(&entry.semver_kind).ok_or_else(|| {
        ChronicleError::BadConfig(format!(
          "unrecognized semver-field {:?} for change type {:?}",
          entry.semver_kind, entry.name
        ))
      })?;

      let change_type = ChangeType {
        name: entry.name.clone(),
        title: entry.title.clone(),
        kind,
      };

      ordered_types.push(change_type.clone());

      for label in &entry.labels {
        by_label.insert(label.clone(), change_type.clone());
      }
    }

    Ok(Self { by_label, ordered_types })
  }

  pub fn names(&self) -> Vec<String> { self.by_label.keys().cloned().collect() }

  /// Returns the set of change types matched by any of the given labels, order-independent.
  pub fn change_types(&self, labels: &HashSet<String>) -> Vec<ChangeType> {
    let mut seen = HashSet::new();
    let mut results = Vec::new();

    for label in labels {
      if let Some(change_type) = self.by_label.get(label)
        && seen.insert(change_type.name.clone())
      {
        results.push(change_type.clone());
      }
    }

    results
  }

  pub fn ordered_types(&self) -> &[ChangeType] { &self.ordered_types }
}

/// Where a reader finds more information about a change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
  pub text: String,
  pub url: String,
}

/// The artifact a `Change` was derived from, kept for debugging and rendering decisions.
#[derive(Debug, Clone)]
pub enum ChangeOrigin {
  Pr(PullRequest),
  Issue(Issue),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
  Pr,
  Issue,
}

/// The smallest unit within a release that gets summarized.
#[derive(Debug, Clone)]
pub struct Change {
  pub text: String,
  pub types: Vec<ChangeType>,
  pub timestamp: DateTime<Utc>,
  pub references: Vec<Reference>,
  pub entry_kind: EntryKind,
  pub origin: ChangeOrigin,
}

/// The maximum kind across all types of all changes, or `Unknown` for an empty slice.
pub fn significance(changes: &[Change]) -> ChangeKind {
  changes
    .iter()
    .flat_map(|change| change.types.iter())
    .map(|change_type| change_type.kind)
    .max()
    .unwrap_or(ChangeKind::Unknown)
}
