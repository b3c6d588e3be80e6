use std::path::PathBuf;

/// One file of the dependency graph. Every pipeline pass replaces `content` as a whole.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceUnit {
  pub path: PathBuf,
  pub content: String,
}

impl SourceUnit {
  pub fn new(path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
    Self { path: path.into(), content: content.into() }
  }
}
