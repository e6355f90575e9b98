use thiserror::Error;

/// The semantic error taxonomy shared by every component of the change-summarization pipeline.
#[derive(Debug, Error)]
pub enum ChronicleError {
  #[error("not a git repository: {0}")]
  NotARepository(String),

  #[error("unable to resolve ref {0:?}")]
  RefNotFound(String),

  #[error("no prior release exists and no starting reference was given")]
  NoLastRelease,

  #[error("repository has no history (no root commit could be determined)")]
  NoHistory,

  #[error("forge request failed: {0}")]
  ForgeTransport(String),

  #[error("invalid semver version {0:?}")]
  BadVersion(String),

  #[error("no changes found that would affect the version")]
  NoChanges,

  #[error("speculated version collides with existing tag {0:?}")]
  TagCollision(String),

  #[error("invalid configuration: {0}")]
  BadConfig(String),
}
