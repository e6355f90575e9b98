use std::fmt::Write as _;

use crate::{
  change::{Change, ChangeKind, ChangeTypeIndex},
  release::ReleaseDescription,
};

/// Renders a reference: PR/issue references become markdown links, author handles stay bare
/// (`@login`, not `[@login](url)`) since GitHub autolinks them anyway.
fn render_reference(reference: &crate::change::Reference) -> String {
  if reference.text.starts_with('@') { reference.text.clone() } else { format!("[{}]({})", reference.text, reference.url) }
}

/// A bullet always ends with a single period, regardless of whether the source title did.
fn render_bullet(change: &Change) -> String {
  let mut text = change.text.trim_end().trim_end_matches('.').to_string();
  text.push('.');

  let references = change.references.iter().map(render_reference).collect::<Vec<_>>().join(", ");

  if references.is_empty() { text } else { format!("{text} ({references})") }
}

fn changes_of(release: &ReleaseDescription, predicate: impl Fn(&Change) -> bool) -> Vec<&Change> { release.changes.iter().filter(|change| predicate(change)).collect() }

/// Renders a release as a markdown section: one `###` heading per configured change type, in
/// configured order, followed by an "Additional Changes" bucket for unknown/unlabeled entries.
pub fn render(release: &ReleaseDescription, change_types: &ChangeTypeIndex) -> String {
  let mut out = String::new();
  let _ = writeln!(out, "## {}", release.title);

  for change_type in change_types.ordered_types() {
    let matching = changes_of(release, |change| change.types.iter().any(|t| t.name == change_type.name));
    if matching.is_empty() {
      continue;
    }

    let _ = writeln!(out, "\n### {}\n", change_type.title);
    for change in matching {
      let _ = writeln!(out, "- {}", render_bullet(change));
    }
  }

  let unknown = changes_of(release, |change| change.types.iter().any(|t| t.kind == ChangeKind::Unknown));
  if !unknown.is_empty() {
    let _ = writeln!(out, "\n### Additional Changes\n");
    for change in unknown {
      let _ = writeln!(out, "- {}", render_bullet(change));
    }
  }

  if let Some(compare_url) = &release.compare_url {
    let _ = writeln!(out, "\n**Full Changelog**: {compare_url}");
  }

  out
}
