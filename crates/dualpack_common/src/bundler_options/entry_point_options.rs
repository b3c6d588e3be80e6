use std::path::PathBuf;

use serde::Deserialize;

use crate::{ExportPath, ModuleFormat};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct EntryPointOptions {
  pub entry: String,
  pub export_path: ExportPath,
  pub format: Option<ModuleFormat>,
  pub tsconfig: Option<PathBuf>,
  pub rename_duplicates: Option<bool>,
}
