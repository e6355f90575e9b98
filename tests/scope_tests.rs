mod common;

use chronicler::{
  git::{GitRepository, VcsAdapter},
  scope::{ChangePoint, resolve_scope},
};

#[test]
fn resolves_since_to_previous_tag_and_until_to_head_tag() {
  let temp = common::create_repo("octo", "widgets");

  common::commit_with_date(temp.path(), "feat: add gadget", "2026-02-01T00:00:00Z");
  common::lightweight_tag(temp.path(), "v0.2.0");

  let vcs = GitRepository::discover(temp.path()).unwrap();
  let scope = resolve_scope(&vcs, None, None).unwrap();

  assert_eq!(scope.until.label(), "v0.2.0");
  match &scope.since {
    Some(ChangePoint::Tag(tag)) => assert_eq!(tag.name, "v0.1.0"),
    other => panic!("expected a tag, got {other:?}"),
  }
}

#[test]
fn falls_back_to_root_commit_when_no_prior_tag_exists() {
  let temp = common::init_repo();
  common::add_remote(&temp, "octo", "widgets");
  std::fs::write(temp.path().join("README.md"), "# fixture\n").unwrap();
  common::commit_with_date(temp.path(), "chore: init", "2026-01-01T00:00:00Z");

  let vcs = GitRepository::discover(temp.path()).unwrap();
  let scope = resolve_scope(&vcs, None, None).unwrap();

  assert!(matches!(scope.since, Some(ChangePoint::RootCommit(_))));
}

#[test]
fn distinguishes_annotated_from_lightweight_tags() {
  let temp = common::create_repo("octo", "widgets");
  common::commit_with_date(temp.path(), "feat: add gadget", "2026-02-01T00:00:00Z");
  common::annotated_tag(temp.path(), "v0.2.0", "Release v0.2.0");

  let vcs = GitRepository::discover(temp.path()).unwrap();
  let tag = vcs.search_tag("v0.2.0").unwrap().expect("tag should resolve");

  assert!(tag.annotated);

  let lightweight = vcs.search_tag("v0.1.0").unwrap().expect("tag should resolve");
  assert!(!lightweight.annotated);
}
