use std::path::PathBuf;

/// Names the entry file exposes once bundled.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ExportSurface {
  pub named: Vec<String>,
  pub has_default: bool,
}

impl ExportSurface {
  /// Both kinds present, CommonJS consumers only see the default export.
  pub fn is_ambiguous_for_commonjs(&self) -> bool {
    self.has_default && !self.named.is_empty()
  }
}

#[derive(Debug)]
pub struct BundleResult {
  /// The whole dependency graph as one module.
  pub code: String,
  pub entry: PathBuf,
  pub export_surface: ExportSurface,
}
