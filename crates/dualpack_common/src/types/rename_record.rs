use std::path::PathBuf;

/// `original_name` declared in `file` is known as `synthetic_name` in the bundle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenameRecord {
  pub original_name: String,
  pub file: PathBuf,
  pub synthetic_name: String,
}
