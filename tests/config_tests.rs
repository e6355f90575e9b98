use std::collections::HashMap;

use chronicler::config::{ConfigOverrides, EffectiveConfig};
use serial_test::serial;

#[test]
#[serial]
fn flags_win_over_env_which_wins_over_file_defaults() {
  let mut env = HashMap::new();
  env.insert("CHRONICLER_GITHUB_HOST".to_string(), "env.example.com".to_string());
  env.insert("CHRONICLER_GITHUB_ENFORCE_V0".to_string(), "true".to_string());

  let overrides = ConfigOverrides { host: Some("flag.example.com".to_string()), ..ConfigOverrides::default() };

  let config = EffectiveConfig::from_sources(None, &env, overrides);

  assert_eq!(config.host, "flag.example.com");
  assert!(config.enforce_v0);
  assert!(config.include_unlabeled_prs, "defaults to including unlabeled PRs");
}

#[test]
#[serial]
fn defaults_apply_with_no_sources_at_all() {
  let config = EffectiveConfig::from_sources(None, &HashMap::new(), ConfigOverrides::default());

  assert_eq!(config.host, "github.com");
  assert!(!config.enforce_v0);
  assert!(!config.include_issues_not_planned);
  assert!(config.include_prs);
  assert!(config.include_issues);
  assert!(config.consider_pr_merge_commits);
  assert_eq!(config.exclude_labels, vec!["skip-changelog".to_string(), "no-changelog".to_string()]);
  assert!(!config.change_types.is_empty(), "ships with a default change-type table");
}

#[test]
#[serial]
fn create_flags_override_root_level_run_shaping_fields() {
  let overrides = ConfigOverrides {
    since_tag: Some("v1.0.0".to_string()),
    until_tag: Some("v1.1.0".to_string()),
    title: Some("My Release".to_string()),
    output: Some("json".to_string()),
    version_file: Some("VERSION".to_string()),
    speculate_next_version: Some(true),
    ..ConfigOverrides::default()
  };

  let config = EffectiveConfig::from_sources(None, &HashMap::new(), overrides);

  assert_eq!(config.since_tag.as_deref(), Some("v1.0.0"));
  assert_eq!(config.until_tag.as_deref(), Some("v1.1.0"));
  assert_eq!(config.title.as_deref(), Some("My Release"));
  assert_eq!(config.output.as_deref(), Some("json"));
  assert_eq!(config.version_file.as_deref(), Some("VERSION"));
  assert!(config.speculate_next_version);
}

#[test]
#[serial]
fn issues_require_linked_prs_and_include_issue_pr_authors_are_config_driven() {
  let mut env = HashMap::new();
  env.insert("CHRONICLER_GITHUB_ISSUES_REQUIRE_LINKED_PRS".to_string(), "true".to_string());
  env.insert("CHRONICLER_GITHUB_INCLUDE_ISSUE_PR_AUTHORS".to_string(), "true".to_string());

  let config = EffectiveConfig::from_sources(None, &env, ConfigOverrides::default());

  assert!(config.issues_require_linked_prs);
  assert!(config.include_issue_pr_authors);
}
