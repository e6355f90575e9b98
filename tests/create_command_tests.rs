mod common;

use assert_cmd::Command;
use predicates::prelude::*;

#[test]
fn create_renders_a_markdown_release_from_a_merged_feature_pr() {
  let temp = common::create_repo("octo", "widgets");
  common::commit_with_date(temp.path(), "feat: add export command", "2026-02-10T00:00:00Z");
  let head_oid = common::git(temp.path(), &["rev-parse", "HEAD"]).trim().to_string();

  let pr_response = format!(
    r#"{{
      "data": {{
        "repository": {{
          "pullRequests": {{
            "pageInfo": {{ "hasNextPage": false, "endCursor": null }},
            "nodes": [
              {{
                "number": 42,
                "title": "Add export command",
                "url": "https://github.com/octo/widgets/pull/42",
                "mergedAt": "2026-02-10T00:00:00Z",
                "updatedAt": "2026-02-10T00:00:00Z",
                "author": {{ "login": "bob" }},
                "mergeCommit": {{ "oid": "{head_oid}" }},
                "labels": {{ "nodes": [{{ "name": "feature" }}] }},
                "closingIssuesReferences": {{ "nodes": [] }}
              }}
            ]
          }}
        }}
      }}
    }}"#
  );

  let issues_response = r#"{
    "data": {
      "repository": {
        "issues": {
          "pageInfo": { "hasNextPage": false, "endCursor": null },
          "nodes": []
        }
      }
    }
  }"#
  .to_string();

  let forge = common::FakeForge::start(vec![
    common::StubbedResponse { matcher: "pullRequests(first", body: pr_response },
    common::StubbedResponse { matcher: "issues(first: 100", body: issues_response },
  ]);

  let mut cmd = Command::cargo_bin("chronicler").unwrap();
  cmd
    .current_dir(temp.path())
    .arg("create")
    .arg("--speculate-next-version")
    .env("CHRONICLER_GITHUB_TOKEN", "test-token")
    .env("CHRONICLER_GITHUB_GRAPHQL_URL", format!("{}/graphql", forge.base_url))
    .env("CHRONICLER_GITHUB_API_BASE", forge.base_url.clone());

  cmd
    .assert()
    .success()
    .stdout(predicate::str::contains("## v0.2.0"))
    .stdout(predicate::str::contains("Add export command"))
    .stdout(predicate::str::contains("#42"))
    .stdout(predicate::str::contains("@bob"));
}

#[test]
fn create_fails_without_changes_unless_no_changes_ok_is_set() {
  let temp = common::create_repo("octo", "widgets");
  common::commit_with_date(temp.path(), "chore: nothing interesting", "2026-02-10T00:00:00Z");

  let empty_connection = r#"{
    "data": {
      "repository": {
        "pullRequests": { "pageInfo": { "hasNextPage": false, "endCursor": null }, "nodes": [] },
        "issues": { "pageInfo": { "hasNextPage": false, "endCursor": null }, "nodes": [] }
      }
    }
  }"#;

  let forge = common::FakeForge::start(vec![common::StubbedResponse { matcher: "query", body: empty_connection.to_string() }]);

  let mut cmd = Command::cargo_bin("chronicler").unwrap();
  cmd
    .current_dir(temp.path())
    .arg("create")
    .env("CHRONICLER_GITHUB_TOKEN", "test-token")
    .env("CHRONICLER_GITHUB_GRAPHQL_URL", format!("{}/graphql", forge.base_url))
    .env("CHRONICLER_GITHUB_API_BASE", forge.base_url.clone());
  cmd.assert().failure();

  let mut ok_cmd = Command::cargo_bin("chronicler").unwrap();
  ok_cmd
    .current_dir(temp.path())
    .arg("create")
    .arg("--no-changes-ok")
    .env("CHRONICLER_GITHUB_TOKEN", "test-token")
    .env("CHRONICLER_GITHUB_GRAPHQL_URL", format!("{}/graphql", forge.base_url))
    .env("CHRONICLER_GITHUB_API_BASE", forge.base_url.clone());
  ok_cmd.assert().success();
}
