use std::collections::HashSet;

use chronicler::{
  change::ChangeKind,
  version::{next_ideal_version, next_unique_version, render},
};

#[test]
fn patch_bump_increments_patch_only() {
  let speculated = next_ideal_version("v1.2.3", ChangeKind::Patch, false, false).unwrap();
  assert_eq!(render(&speculated.ideal, speculated.v_prefixed), "v1.2.4");
}

#[test]
fn minor_bump_resets_patch() {
  let speculated = next_ideal_version("1.2.3", ChangeKind::Minor, false, false).unwrap();
  assert_eq!(speculated.ideal.to_string(), "1.3.0");
}

#[test]
fn major_bump_resets_minor_and_patch() {
  let speculated = next_ideal_version("v1.2.3", ChangeKind::Major, false, false).unwrap();
  assert_eq!(render(&speculated.ideal, speculated.v_prefixed), "v2.0.0");
}

#[test]
fn enforce_v0_demotes_major_to_minor_below_1_0() {
  let speculated = next_ideal_version("v0.4.1", ChangeKind::Major, true, false).unwrap();
  assert_eq!(render(&speculated.ideal, speculated.v_prefixed), "v0.5.0");
}

#[test]
fn enforce_v0_is_a_no_op_once_past_1_0() {
  let speculated = next_ideal_version("v1.4.1", ChangeKind::Major, true, false).unwrap();
  assert_eq!(render(&speculated.ideal, speculated.v_prefixed), "v2.0.0");
}

#[test]
fn unknown_significance_without_no_changes_ok_is_an_error() {
  let err = next_ideal_version("v1.0.0", ChangeKind::Unknown, false, false).unwrap_err();
  assert!(matches!(err, chronicler::error::ChronicleError::NoChanges));
}

#[test]
fn unknown_significance_with_no_changes_ok_bumps_patch() {
  let speculated = next_ideal_version("0.1.5", ChangeKind::Unknown, false, true).unwrap();
  assert_eq!(render(&speculated.ideal, speculated.v_prefixed), "0.1.6");
}

#[test]
fn unique_version_skips_past_existing_tags() {
  let existing = HashSet::from(["v1.1.0".to_string(), "v1.1.1".to_string()]);
  let speculated = next_unique_version("v1.0.0", ChangeKind::Minor, false, false, &existing).unwrap();

  assert_eq!(render(&speculated.ideal, speculated.v_prefixed), "v1.1.0");
  assert_eq!(render(&speculated.unique, speculated.v_prefixed), "v1.1.2");
}
