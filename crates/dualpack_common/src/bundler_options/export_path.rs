use std::path::{Path, PathBuf};

use serde::Deserialize;

/// `"."` for the package root, `"./<name>"` for a subpath export.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize)]
#[serde(transparent)]
pub struct ExportPath(String);

impl ExportPath {
  pub fn new(value: impl Into<String>) -> Self {
    Self(value.into())
  }

  pub fn as_str(&self) -> &str {
    &self.0
  }

  pub fn is_main(&self) -> bool {
    matches!(self.0.as_str(), "." | "./")
  }

  /// `utils` for `./utils`, `None` for the main export.
  pub fn subpath(&self) -> Option<&str> {
    if self.is_main() {
      return None;
    }
    let name = self.0.strip_prefix("./").unwrap_or(&self.0).trim_end_matches('/');
    (!name.is_empty()).then_some(name)
  }

  /// Output directory of this export below `out_dir`.
  pub fn out_dir(&self, out_dir: &Path) -> PathBuf {
    self.subpath().map_or_else(|| out_dir.to_path_buf(), |name| out_dir.join(name))
  }
}

impl std::fmt::Display for ExportPath {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(&self.0)
  }
}

#[test]
fn subpath_exports_get_their_own_directory() {
  let dist = Path::new("dist");
  assert_eq!(ExportPath::new(".").out_dir(dist), PathBuf::from("dist"));
  assert_eq!(ExportPath::new("./utils").out_dir(dist), Path::new("dist").join("utils"));
  assert_eq!(ExportPath::new("./utils").subpath(), Some("utils"));
  assert!(ExportPath::new(".").is_main());
}
