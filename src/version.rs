use std::collections::HashSet;

use semver::Version;

use crate::{change::ChangeKind, error::ChronicleError};

/// The result of speculating the next version: the ideal bump, plus the actual version to use
/// once existing tags are taken into account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpeculatedVersion {
  pub ideal: Version,
  pub unique: Version,
  pub v_prefixed: bool,
}

fn parse_existing(raw: &str) -> Result<(Version, bool), ChronicleError> {
  let v_prefixed = raw.starts_with('v');
  let trimmed = raw.strip_prefix('v').unwrap_or(raw);
  Version::parse(trimmed).map(|version| (version, v_prefixed)).map_err(|_| ChronicleError::BadVersion(raw.to_string()))
}

/// Parses a bare base version string (`v1.2.3` or `1.2.3`) without bumping it.
pub fn parse_bare(raw: &str) -> Result<(Version, bool), ChronicleError> { parse_existing(raw) }

/// Bumps `base` by `kind`, per standard semver precedence (major resets minor/patch, minor resets
/// patch, patch only increments patch). `Unknown` leaves the version unchanged.
fn bump(base: &Version, kind: ChangeKind) -> Version {
  match kind {
    ChangeKind::Major => Version::new(base.major + 1, 0, 0),
    ChangeKind::Minor => Version::new(base.major, base.minor + 1, 0),
    ChangeKind::Patch => Version::new(base.major, base.minor, base.patch + 1),
    ChangeKind::Unknown => base.clone(),
  }
}

/// A major bump against a pre-1.0 base (`enforce_v0`) is demoted to a minor bump instead, since
/// major version zero has no stable public API to break yet.
fn enforce_v0(base: &Version, kind: ChangeKind) -> ChangeKind {
  if base.major == 0 && kind == ChangeKind::Major { ChangeKind::Minor } else { kind }
}

/// Computes the ideal next version for the given base and aggregate change significance, without
/// regard to whether that version already exists as a tag. When `significance` is `Unknown` (no
/// qualifying changes were found), `bump_on_no_changes` decides whether that's still speculated as
/// a patch bump or treated as an error.
pub fn next_ideal_version(base_raw: &str, significance: ChangeKind, enforce_zero_major: bool, bump_on_no_changes: bool) -> Result<SpeculatedVersion, ChronicleError> {
  let (base, v_prefixed) = parse_existing(base_raw)?;

  if significance == ChangeKind::Unknown && !bump_on_no_changes {
    return Err(ChronicleError::NoChanges);
  }

  let significance = if significance == ChangeKind::Unknown { ChangeKind::Patch } else { significance };
  let effective_kind = if enforce_zero_major { enforce_v0(&base, significance) } else { significance };
  let ideal = bump(&base, effective_kind);

  Ok(SpeculatedVersion { ideal: ideal.clone(), unique: ideal, v_prefixed })
}

/// A speculated version is never retried past this many patch increments; a collision that
/// persists this long means the tag space is exhausted or the base version is wrong, not that one
/// more increment will help.
const MAX_COLLISION_RETRIES: u32 = 1000;

/// Computes the next version, skipping forward past any version already present in `existing_tags`
/// (patch-incrementing) so the speculated version never collides with a real tag.
pub fn next_unique_version(base_raw: &str, significance: ChangeKind, enforce_zero_major: bool, bump_on_no_changes: bool, existing_tags: &HashSet<String>) -> Result<SpeculatedVersion, ChronicleError> {
  let ideal_result = next_ideal_version(base_raw, significance, enforce_zero_major, bump_on_no_changes)?;
  let mut candidate = ideal_result.ideal.clone();

  for _ in 0..MAX_COLLISION_RETRIES {
    let rendered = render(&candidate, ideal_result.v_prefixed);
    if !existing_tags.contains(&rendered) {
      return Ok(SpeculatedVersion { ideal: ideal_result.ideal, unique: candidate, v_prefixed: ideal_result.v_prefixed });
    }
    candidate = Version::new(candidate.major, candidate.minor, candidate.patch + 1);
  }

  Err(ChronicleError::TagCollision(render(&candidate, ideal_result.v_prefixed)))
}

/// Renders a version back into the same `v`-prefix style as the base it was derived from.
pub fn render(version: &Version, v_prefixed: bool) -> String {
  if v_prefixed { format!("v{version}") } else { version.to_string() }
}
