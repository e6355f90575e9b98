use serde::Serialize;

use crate::{error::ChronicleError, release::ReleaseDescription};

#[derive(Serialize)]
struct JsonRelease<'a> {
  owner: &'a str,
  repo: &'a str,
  version: &'a str,
  title: &'a str,
  previous_version: Option<&'a str>,
  compare_url: Option<&'a str>,
  changes: Vec<JsonChange<'a>>,
}

#[derive(Serialize)]
struct JsonChange<'a> {
  text: &'a str,
  types: Vec<&'a str>,
  references: Vec<JsonReference<'a>>,
}

#[derive(Serialize)]
struct JsonReference<'a> {
  text: &'a str,
  url: &'a str,
}

/// Renders a release as a self-contained JSON document, intended for consumption by other tooling
/// rather than direct human reading.
pub fn render(release: &ReleaseDescription) -> Result<String, ChronicleError> {
  let dto = JsonRelease {
    owner: &release.owner,
    repo: &release.repo,
    version: &release.version,
    title: &release.title,
    previous_version: release.previous_version.as_deref(),
    compare_url: release.compare_url.as_deref(),
    changes: release
      .changes
      .iter()
      .map(|change| JsonChange {
        text: &change.text,
        types: change.types.iter().map(|t| t.name.as_str()).collect(),
        references: change.references.iter().map(|r| JsonReference { text: &r.text, url: &r.url }).collect(),
      })
      .collect(),
  };

  serde_json::to_string_pretty(&dto).map_err(|error| ChronicleError::BadConfig(error.to_string()))
}
