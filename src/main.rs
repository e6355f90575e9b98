use std::collections::HashMap;

use anyhow::Result;
use chronicler::{
  cli::{Args, Command, ForgeArgs},
  commands::{execute_create, execute_next_version, execute_version},
  config::{ConfigOverrides, EffectiveConfig, load_file},
  logging,
  presenter::PresenterFormat,
};
use clap::Parser;

fn forge_overrides(forge: &ForgeArgs) -> ConfigOverrides {
  ConfigOverrides {
    host: forge.host.clone(),
    token: forge.token.clone(),
    issues_require_linked_prs: forge.issues_require_linked_prs.then_some(true),
    include_unlabeled_prs: forge.include_unlabeled_prs.then_some(true),
    include_unlabeled_issues: forge.include_unlabeled_issues.then_some(true),
    include_issues_not_planned: forge.include_issues_not_planned.then_some(true),
    include_issue_pr_authors: forge.include_issue_pr_authors.then_some(true),
    include_issue_prs: forge.include_issue_prs.then_some(true),
    consider_pr_merge_commits: forge.consider_pr_merge_commits.then_some(true),
    no_changes_ok: forge.no_changes_ok.then_some(true),
    ..ConfigOverrides::default()
  }
}

fn main() -> Result<()> {
  let args = match Args::try_parse() {
    Ok(opts) => opts,
    Err(e) => match e.kind() {
      clap::error::ErrorKind::DisplayVersion => {
        println!("{}", env!("CARGO_PKG_VERSION"));
        return Ok(());
      }
      _ => e.exit(),
    },
  };

  logging::init(args.verbose, args.quiet);

  let file_cfg = load_file(args.config.as_deref())?;

  let overrides = match &args.command {
    Command::Create(create) => ConfigOverrides {
      since_tag: create.since_tag.clone(),
      until_tag: create.until_tag.clone(),
      title: create.title.clone(),
      output: create.output.map(PresenterFormat::as_config_str).map(String::from),
      version_file: create.version_file.as_ref().map(|path| path.display().to_string()),
      speculate_next_version: create.speculate_next_version.then_some(true),
      enforce_v0: create.enforce_v0.then_some(true),
      verbosity: args.verbose,
      quiet: args.quiet,
      ..forge_overrides(&create.forge)
    },
    Command::NextVersion(next) => ConfigOverrides {
      since_tag: next.since_tag.clone(),
      until_tag: next.until_tag.clone(),
      enforce_v0: next.enforce_v0.then_some(true),
      verbosity: args.verbose,
      quiet: args.quiet,
      ..forge_overrides(&next.forge)
    },
    Command::Version => ConfigOverrides { verbosity: args.verbose, quiet: args.quiet, ..ConfigOverrides::default() },
  };

  let config = EffectiveConfig::from_sources(file_cfg, &HashMap::from_iter(std::env::vars()), overrides);

  log::debug!("configuration loaded for command '{}'", args.command.name());

  match &args.command {
    Command::Create(create_args) => execute_create(create_args, &config)?,
    Command::NextVersion(next_args) => execute_next_version(next_args, &config)?,
    Command::Version => execute_version(),
  }

  Ok(())
}
