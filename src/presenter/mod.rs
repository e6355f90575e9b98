pub mod json;
pub mod markdown;

/// Which renderer a run should use, selected by the `--output`/`-o` flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum PresenterFormat {
  #[value(name = "md")]
  Markdown,
  Json,
}

impl PresenterFormat {
  /// Parses the config file's `output: md|json` string, defaulting to markdown on anything else.
  pub fn from_config_str(value: &str) -> Self {
    match value {
      "json" => Self::Json,
      _ => Self::Markdown,
    }
  }

  pub fn as_config_str(self) -> &'static str {
    match self {
      Self::Markdown => "md",
      Self::Json => "json",
    }
  }
}
