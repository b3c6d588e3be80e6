use std::path::PathBuf;

use crate::OutputFormat;

/// Written files of one entry point, consumed by the package manifest patcher.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct OutputArtifactSet {
  pub commonjs: Option<PathBuf>,
  pub commonjs_types: Option<PathBuf>,
  pub esm: Option<PathBuf>,
  pub esm_types: Option<PathBuf>,
  pub main: Option<PathBuf>,
  pub module: Option<PathBuf>,
  pub types: Option<PathBuf>,
}

impl OutputArtifactSet {
  /// Records the artifacts of one compiled format and refreshes `main`/`module`/`types`.
  pub fn record(&mut self, format: OutputFormat, js: Option<PathBuf>, types: Option<PathBuf>) {
    match format {
      OutputFormat::Esm => {
        self.esm = js;
        self.esm_types = types;
      }
      OutputFormat::Cjs => {
        self.commonjs = js;
        self.commonjs_types = types;
      }
    }

    self.main = self.commonjs.clone().or_else(|| self.esm.clone());
    self.types = self.commonjs_types.clone().or_else(|| self.esm_types.clone());
    self.module = self.esm.clone();
  }
}

#[test]
fn commonjs_wins_main_and_types() {
  let mut set = OutputArtifactSet::default();
  set.record(OutputFormat::Esm, Some("dist/index.mjs".into()), Some("dist/index.d.mts".into()));
  assert_eq!(set.main, Some("dist/index.mjs".into()));

  set.record(OutputFormat::Cjs, Some("dist/index.cjs".into()), Some("dist/index.d.cts".into()));
  assert_eq!(set.main, Some("dist/index.cjs".into()));
  assert_eq!(set.types, Some("dist/index.d.cts".into()));
  assert_eq!(set.module, Some("dist/index.mjs".into()));
}
