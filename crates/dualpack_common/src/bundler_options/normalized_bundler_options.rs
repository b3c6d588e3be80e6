use std::path::PathBuf;

use crate::{ESTarget, ExportPath, ModuleFormat};

#[derive(Debug, Clone)]
pub struct NormalizedEntryPoint {
  /// As written in the config, relative to `cwd`.
  pub entry: String,
  pub export_path: ExportPath,
  pub format: ModuleFormat,
  pub tsconfig: Option<PathBuf>,
  pub rename_duplicates: bool,
  /// `target` of the options, else `compilerOptions.target` of the entry's tsconfig.
  pub target: ESTarget,
  /// Absolute output directory of this entry point.
  pub out_dir: PathBuf,
}

#[allow(clippy::struct_excessive_bools)] // Using raw booleans is more clear in this case
#[derive(Debug)]
pub struct NormalizedBundlerOptions {
  // --- Input
  pub entry_points: Vec<NormalizedEntryPoint>,
  pub cwd: PathBuf,
  pub allow_commonjs: bool,
  pub node_env: bool,
  pub type_check: bool,
  pub preserve_namespaces: Vec<String>,

  // --- Output
  pub out_dir: PathBuf,
  pub allow_update_package_json: bool,
  pub target: ESTarget,
  pub source_map: bool,
  pub remove_unused: bool,

  // --- Plugins
  pub minify: bool,
  pub banner: Option<String>,
}
